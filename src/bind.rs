//! Purpose: Bind positional JSON argument text to a resolved signature.
//! Exports: `BindOptions`, `bind`, `arguments_of_func`, `arguments_of_method`.
//! Role: Argument Binder; validates arity and coerces each element to its declared type.
//! Invariants: A declared leading context is synthesized, never read from JSON.
//! Invariants: Any failure returns one error and no partial argument list.
//! Invariants: Kind mismatches at any depth are `IncorrectType` named in JSON terms.
//! Invariants: Binding state lives in a per-call `Config`; nothing is shared across calls.

use crate::core::context::{Context, ContextFactory, default_context_factory};
use crate::core::error::{Error, ErrorKind};
use crate::core::types::{MethodType, TypeDesc, name_of};
use crate::core::value::{AnyValue, Arguments};
use crate::json::parse::{self, JsonKind};
use crate::signature::Signature;
use serde_json::error::Category;
use serde_json::value::RawValue;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct BindOptions {
    pub context_factory: ContextFactory,
}

impl BindOptions {
    pub fn new() -> Self {
        Self {
            context_factory: default_context_factory(),
        }
    }

    /// Sets how a context is produced when the callable expects one.
    pub fn with_context_factory(
        mut self,
        factory: impl Fn() -> Context + Send + Sync + 'static,
    ) -> Self {
        self.context_factory = Arc::new(factory);
        self
    }
}

impl Default for BindOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BindOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindOptions")
            .field("context_factory", &"<fn>")
            .finish()
    }
}

struct Config {
    context_factory: ContextFactory,
    arity: usize,
    offset: usize,
    context_index: usize,
}

impl Config {
    fn new(options: &BindOptions, signature: &Signature) -> Self {
        Self {
            context_factory: Arc::clone(&options.context_factory),
            arity: signature.num_in(),
            offset: signature.offset(),
            context_index: signature.offset(),
        }
    }
}

pub fn arguments_of_func(
    ty: &TypeDesc,
    args: &str,
    options: &BindOptions,
) -> Result<Arguments, Error> {
    let signature = Signature::of_function(ty)?;
    bind(&signature, args, options)
}

pub fn arguments_of_method(
    method: &MethodType,
    args: &str,
    options: &BindOptions,
) -> Result<Arguments, Error> {
    bind(&Signature::of_method(method), args, options)
}

/// Produces the argument list for `signature` from a JSON array.
pub fn bind(signature: &Signature, args: &str, options: &BindOptions) -> Result<Arguments, Error> {
    let mut config = Config::new(options, signature);

    if signature.is_variadic() {
        return Err(Error::new(ErrorKind::VariadicNotSupported));
    }

    let mut arguments = Arguments::with_capacity(config.arity);
    if signature.context_index() == Some(config.context_index) {
        arguments.push(AnyValue::new((config.context_factory)()));
        config.offset += 1;
        config.arity -= 1;
    }
    tracing::debug!(
        arity = config.arity,
        context = signature.has_context(),
        method = signature.is_method(),
        "binding arguments"
    );

    let params = parse::decode_array(args).map_err(decode_array_error)?;

    if params.len() < config.arity {
        return Err(Error::new(ErrorKind::TooFewArguments));
    }
    if params.len() > config.arity {
        return Err(Error::new(ErrorKind::TooManyArguments));
    }

    for (index, raw) in params.into_iter().enumerate() {
        let param = &signature.params()[config.offset + index];
        let kind = parse::kind_of(raw);
        if !accepts(param.ty(), kind) {
            return Err(
                Error::incorrect_type(kind.as_str(), name_of(param.ty())).with_argument(index)
            );
        }
        let value = param
            .decode(raw.get())
            .map_err(|err| coerce_error(param.ty(), raw, err).with_argument(index))?;
        tracing::trace!(index, ty = %param.ty(), "coerced argument");
        arguments.push(value);
    }

    Ok(arguments)
}

fn decode_array_error(err: serde_json::Error) -> Error {
    match err.classify() {
        Category::Syntax | Category::Eof => Error::new(ErrorKind::InvalidJson).with_source(err),
        Category::Data | Category::Io => Error::new(ErrorKind::Decode)
            .with_message(err.to_string())
            .with_source(err),
    }
}

/// Maps a failed coercion to `IncorrectType` when it is a kind mismatch.
///
/// Sequences and maps are walked to name the innermost offending value;
/// anything serde sees below that (record fields, numeric range) is read back
/// from its error. Other data errors, like a missing field, stay `Decode`.
fn coerce_error(ty: &TypeDesc, raw: &RawValue, err: serde_json::Error) -> Error {
    let Some(mismatch) = parse::type_mismatch(&err) else {
        return Error::new(ErrorKind::Decode)
            .with_message(err.to_string())
            .with_source(err);
    };
    let nested = serde_json::from_str::<serde_json::Value>(raw.get())
        .ok()
        .and_then(|value| nested_mismatch(ty, &value));
    let (observed, expected) = match nested {
        Some((kind, inner)) => (kind, name_of(inner)),
        None => (
            mismatch.observed,
            mismatch
                .expected
                .map_or_else(|| name_of(ty), str::to_string),
        ),
    };
    Error::incorrect_type(observed.as_str(), expected).with_source(err)
}

/// First value whose kind the descriptor at its position rejects.
fn nested_mismatch<'a>(
    ty: &'a TypeDesc,
    value: &serde_json::Value,
) -> Option<(JsonKind, &'a TypeDesc)> {
    let kind = JsonKind::of_value(value);
    match ty {
        TypeDesc::Pointer(_) if kind == JsonKind::Null => None,
        TypeDesc::Pointer(inner) => nested_mismatch(inner, value),
        TypeDesc::Any => None,
        _ if !accepts(ty, kind) => Some((kind, ty)),
        TypeDesc::Seq(elem) => value
            .as_array()?
            .iter()
            .find_map(|item| nested_mismatch(elem, item)),
        TypeDesc::Map(elem) => value
            .as_object()?
            .values()
            .find_map(|item| nested_mismatch(elem, item)),
        _ => None,
    }
}

/// Shallow compatibility of a JSON kind with a declared descriptor.
fn accepts(ty: &TypeDesc, kind: JsonKind) -> bool {
    match (ty, kind) {
        (TypeDesc::Pointer(_), JsonKind::Null) => true,
        (TypeDesc::Pointer(inner), kind) => accepts(inner, kind),
        (TypeDesc::Any, _) => true,
        (TypeDesc::Number(_), JsonKind::Number)
        | (TypeDesc::Bool, JsonKind::Bool)
        | (TypeDesc::String, JsonKind::String)
        | (TypeDesc::Seq(_), JsonKind::Array)
        | (TypeDesc::Map(_) | TypeDesc::Record(_), JsonKind::Object) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{BindOptions, accepts, bind};
    use crate::core::context::Context;
    use crate::core::error::ErrorKind;
    use crate::core::reflect::JsonType;
    use crate::core::types::{FuncType, ParamType, TypeDesc};
    use crate::json::parse::JsonKind;
    use crate::signature::Signature;
    use std::collections::HashMap;
    use std::error::Error as _;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn signature(params: Vec<ParamType>) -> Signature {
        let ty = TypeDesc::Func(Box::new(FuncType::new(params, Vec::new())));
        Signature::of_function(&ty).expect("signature")
    }

    #[test]
    fn null_only_fits_nullable_slots() {
        assert!(accepts(&<Option<i32>>::descriptor(), JsonKind::Null));
        assert!(accepts(&serde_json::Value::descriptor(), JsonKind::Null));
        assert!(!accepts(&i32::descriptor(), JsonKind::Null));
        assert!(!accepts(&<Vec<i32>>::descriptor(), JsonKind::Null));
        assert!(accepts(&<Option<Vec<i32>>>::descriptor(), JsonKind::Array));
        assert!(!accepts(&<Option<Vec<i32>>>::descriptor(), JsonKind::Object));
    }

    #[test]
    fn context_is_never_fed_from_json() {
        assert!(!accepts(&Context::descriptor(), JsonKind::Object));
        assert!(!accepts(&Context::descriptor(), JsonKind::Null));
    }

    #[test]
    fn factory_runs_once_per_bind() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let options = BindOptions::new().with_context_factory(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Context::background()
        });
        let sig = signature(vec![ParamType::of::<Context>(), ParamType::of::<i32>()]);

        bind(&sig, "[1]", &options).expect("first");
        bind(&sig, "[2]", &options).expect("second");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn factory_is_not_called_without_context_param() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let options = BindOptions::new().with_context_factory(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Context::background()
        });
        let sig = signature(vec![ParamType::of::<i32>()]);

        bind(&sig, "[1]", &options).expect("bind");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn non_array_text_propagates_decode_error() {
        let sig = signature(vec![ParamType::of::<i32>()]);
        let err = bind(&sig, r#"{"a": 1}"#, &BindOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn nested_mismatch_reports_element_and_position() {
        let sig = signature(vec![ParamType::of::<String>(), ParamType::of::<Vec<i32>>()]);
        let err = bind(&sig, r#"["ok", [1, "x"]]"#, &BindOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncorrectType);
        assert_eq!(err.to_string(), "Incorrect type string, expected number");
        assert_eq!(err.argument(), Some(1));
        assert!(err.source().is_some());
    }

    #[test]
    fn numbers_out_of_range_are_incorrect_type() {
        let sig = signature(vec![ParamType::of::<u8>()]);
        let err = bind(&sig, "[300]", &BindOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncorrectType);
        assert_eq!(err.observed(), Some("number"));
        assert_eq!(err.expected(), Some("number"));

        let sig = signature(vec![ParamType::of::<i32>()]);
        let err = bind(&sig, "[1.5]", &BindOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncorrectType);
    }

    #[test]
    fn map_values_are_checked_by_kind() {
        let sig = signature(vec![ParamType::of::<HashMap<String, Option<bool>>>()]);
        bind(&sig, r#"[{"a": true, "b": null}]"#, &BindOptions::default()).expect("bind");
        let err = bind(&sig, r#"[{"a": "yes"}]"#, &BindOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "Incorrect type string, expected boolean");
    }

    #[test]
    fn incorrect_type_names_argument_position() {
        let sig = signature(vec![ParamType::of::<i32>(), ParamType::of::<bool>()]);
        let err = bind(&sig, "[1, 2]", &BindOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncorrectType);
        assert_eq!(err.to_string(), "Incorrect type number, expected boolean");
        assert_eq!(err.argument(), Some(1));
    }
}
