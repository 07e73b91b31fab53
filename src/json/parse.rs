//! Purpose: Internal decode entrypoints for positional argument text.
//! Exports: `decode_array`, `JsonKind`, `kind_of`, `TypeMismatch`, `type_mismatch`.
//! Role: Parser boundary that centralizes serde_json raw-value usage.
//! Invariants: Elements are returned as unparsed fragments, in order.
//! Notes: Error mapping is done by callsites so domain context stays explicit.

use serde_json::error::Category;
use serde_json::value::RawValue;

pub(crate) fn decode_array(input: &str) -> Result<Vec<&RawValue>, serde_json::Error> {
    serde_json::from_str(input)
}

/// Top-level kind of a JSON fragment.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum JsonKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl JsonKind {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            JsonKind::Null => "null",
            JsonKind::Bool => "bool",
            JsonKind::Number => "number",
            JsonKind::String => "string",
            JsonKind::Array => "array",
            JsonKind::Object => "object",
        }
    }

    pub(crate) fn of_value(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => JsonKind::Null,
            serde_json::Value::Bool(_) => JsonKind::Bool,
            serde_json::Value::Number(_) => JsonKind::Number,
            serde_json::Value::String(_) => JsonKind::String,
            serde_json::Value::Array(_) => JsonKind::Array,
            serde_json::Value::Object(_) => JsonKind::Object,
        }
    }
}

/// Classifies a fragment that serde_json has already validated.
pub(crate) fn kind_of(raw: &RawValue) -> JsonKind {
    match raw.get().trim_start().as_bytes().first() {
        Some(b'n') => JsonKind::Null,
        Some(b't' | b'f') => JsonKind::Bool,
        Some(b'"') => JsonKind::String,
        Some(b'[') => JsonKind::Array,
        Some(b'{') => JsonKind::Object,
        _ => JsonKind::Number,
    }
}

/// JSON-domain view of a serde "invalid type/value/length" failure.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct TypeMismatch {
    pub(crate) observed: JsonKind,
    pub(crate) expected: Option<&'static str>,
}

/// Recovers the observed and expected kinds from a data error.
///
/// serde_json only exposes these through its message, so this reads the
/// `invalid type: <unexpected>, expected <expected>` form. Missing or unknown
/// fields and custom messages are not mismatches and return `None`.
pub(crate) fn type_mismatch(err: &serde_json::Error) -> Option<TypeMismatch> {
    if err.classify() != Category::Data {
        return None;
    }
    let message = err.to_string();
    let message = match message.rsplit_once(" at line ") {
        Some((head, _)) => head,
        None => message.as_str(),
    };
    if let Some(rest) = message.strip_prefix("invalid length ") {
        let expected = rest.split_once(", expected ").map(|(_, exp)| exp);
        return Some(TypeMismatch {
            observed: JsonKind::Array,
            expected: expected.and_then(expected_kind),
        });
    }
    let rest = message
        .strip_prefix("invalid type: ")
        .or_else(|| message.strip_prefix("invalid value: "))?;
    let (unexpected, expected) = rest.split_once(", expected ")?;
    Some(TypeMismatch {
        observed: unexpected_kind(unexpected)?,
        expected: expected_kind(expected),
    })
}

fn unexpected_kind(unexpected: &str) -> Option<JsonKind> {
    let kind = if unexpected == "null" || unexpected == "unit value" {
        JsonKind::Null
    } else if unexpected.starts_with("boolean") {
        JsonKind::Bool
    } else if unexpected.starts_with("integer") || unexpected.starts_with("floating point") {
        JsonKind::Number
    } else if unexpected.starts_with("string") || unexpected.starts_with("character") {
        JsonKind::String
    } else if unexpected == "sequence" {
        JsonKind::Array
    } else if unexpected == "map" {
        JsonKind::Object
    } else {
        return None;
    };
    Some(kind)
}

fn expected_kind(expected: &str) -> Option<&'static str> {
    const NUMBERS: [&str; 14] = [
        "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128", "usize",
        "f32", "f64",
    ];
    let name = if NUMBERS.contains(&expected) || expected.contains("integer") {
        "number"
    } else if expected == "a string" || expected == "a character" {
        "string"
    } else if expected == "a boolean" {
        "boolean"
    } else if expected == "a sequence" || expected.contains("tuple") {
        "array"
    } else if expected == "a map" || expected.starts_with("struct ") {
        "object"
    } else {
        return None;
    };
    Some(name)
}
