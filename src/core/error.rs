//! Purpose: Single error model for binding and dispatch failures.
//! Exports: `Error`, `ErrorKind`, `to_jsonrpc_code`.
//! Role: Every fallible operation in the crate returns this one type.
//! Invariants: `Display` renders the user-facing message only; kinds carry classification.
//! Invariants: Callable errors keep the callable's message verbatim.
use std::error::Error as StdError;
use std::fmt;

const PARSE_ERROR_CODE: i32 = -32700;
const INVALID_PARAMS_CODE: i32 = -32602;
const INTERNAL_ERROR_CODE: i32 = -32603;
const SERVER_ERROR_CODE: i32 = -32000;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    NotCallable,
    InvalidJson,
    TooFewArguments,
    TooManyArguments,
    IncorrectType,
    VariadicNotSupported,
    Callable,
    Decode,
    Internal,
}

impl ErrorKind {
    fn default_message(self) -> &'static str {
        match self {
            ErrorKind::NotCallable => "Must pass a function",
            ErrorKind::InvalidJson => "Invalid JSON",
            ErrorKind::TooFewArguments => "Too few arguments passed",
            ErrorKind::TooManyArguments => "Too many arguments passed",
            ErrorKind::IncorrectType => "Incorrect type",
            ErrorKind::VariadicNotSupported => "Variadic functions are not yet supported",
            ErrorKind::Callable => "callable failed",
            ErrorKind::Decode => "failed to decode argument",
            ErrorKind::Internal => "internal error",
        }
    }
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    observed: Option<String>,
    expected: Option<String>,
    argument: Option<usize>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            observed: None,
            expected: None,
            argument: None,
            source: None,
        }
    }

    /// Type mismatch between a JSON element and its declared parameter.
    pub fn incorrect_type(observed: impl Into<String>, expected: impl Into<String>) -> Self {
        let observed = observed.into();
        let expected = expected.into();
        Self::new(ErrorKind::IncorrectType)
            .with_message(format!("Incorrect type {observed}, expected {expected}"))
            .with_observed(observed)
            .with_expected(expected)
    }

    /// Wraps an error returned by an invoked callable.
    pub fn callable(err: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        let source = err.into();
        let mut error = Self::new(ErrorKind::Callable).with_message(source.to_string());
        error.source = Some(source);
        error
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        self.message
            .as_deref()
            .unwrap_or_else(|| self.kind.default_message())
    }

    pub fn observed(&self) -> Option<&str> {
        self.observed.as_deref()
    }

    pub fn expected(&self) -> Option<&str> {
        self.expected.as_deref()
    }

    pub fn argument(&self) -> Option<usize> {
        self.argument
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_observed(mut self, observed: impl Into<String>) -> Self {
        self.observed = Some(observed.into());
        self
    }

    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    pub fn with_argument(mut self, argument: usize) -> Self {
        self.argument = Some(argument);
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

pub fn to_jsonrpc_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::InvalidJson => PARSE_ERROR_CODE,
        ErrorKind::NotCallable => INTERNAL_ERROR_CODE,
        ErrorKind::TooFewArguments
        | ErrorKind::TooManyArguments
        | ErrorKind::IncorrectType
        | ErrorKind::VariadicNotSupported
        | ErrorKind::Decode => INVALID_PARAMS_CODE,
        ErrorKind::Callable => SERVER_ERROR_CODE,
        ErrorKind::Internal => INTERNAL_ERROR_CODE,
    }
}
