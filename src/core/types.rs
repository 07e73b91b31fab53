//! Purpose: Closed type-descriptor model used for every dispatch decision.
//! Exports: `TypeDesc`, `NumberKind`, `FuncType`, `MethodType`, `ParamType`, `name_of`.
//! Role: Static reflection output; produced once per callable by `JsonType`/`Handler`.
//! Invariants: Descriptors are immutable values; naming never drives control flow.
//! Invariants: `Pointer` is the only nullable descriptor besides `Any`.

use crate::core::reflect::JsonType;
use crate::core::value::AnyValue;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NumberKind {
    Int,
    Uint,
    Float,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TypeDesc {
    Number(NumberKind),
    Bool,
    String,
    Seq(Box<TypeDesc>),
    Map(Box<TypeDesc>),
    Record(&'static str),
    Pointer(Box<TypeDesc>),
    /// Untyped JSON (`serde_json::Value`).
    Any,
    Context,
    Error,
    Receiver(&'static str),
    Func(Box<FuncType>),
}

impl TypeDesc {
    pub fn is_context(&self) -> bool {
        matches!(self, TypeDesc::Context)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, TypeDesc::Error)
    }

    /// Strips every pointer layer.
    pub fn unwrap_pointer(&self) -> &TypeDesc {
        let mut ty = self;
        while let TypeDesc::Pointer(inner) = ty {
            ty = inner;
        }
        ty
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&name_of(self))
    }
}

/// JSON-domain name of a descriptor, for diagnostics.
pub fn name_of(ty: &TypeDesc) -> String {
    match ty.unwrap_pointer() {
        TypeDesc::Number(_) => "number".to_string(),
        TypeDesc::Seq(elem) => format!("array of {}s", name_of(elem)),
        TypeDesc::Bool => "boolean".to_string(),
        TypeDesc::String => "string".to_string(),
        TypeDesc::Map(_) | TypeDesc::Record(_) => "object".to_string(),
        _ => "unknown".to_string(),
    }
}

pub type Decoder = fn(&str) -> Result<AnyValue, serde_json::Error>;

/// One declared parameter: its descriptor plus the coercion into a fresh value.
#[derive(Clone, Debug)]
pub struct ParamType {
    ty: TypeDesc,
    decode: Decoder,
    variadic: bool,
}

impl ParamType {
    pub fn of<T: JsonType>() -> Self {
        Self {
            ty: T::descriptor(),
            decode: decode_any::<T>,
            variadic: T::VARIADIC,
        }
    }

    /// Receiver slot of a method; never decoded from JSON.
    pub fn receiver<R: 'static>() -> Self {
        Self {
            ty: TypeDesc::Receiver(std::any::type_name::<R>()),
            decode: decode_receiver,
            variadic: false,
        }
    }

    pub fn ty(&self) -> &TypeDesc {
        &self.ty
    }

    pub fn is_variadic(&self) -> bool {
        self.variadic
    }

    pub fn decode(&self, raw: &str) -> Result<AnyValue, serde_json::Error> {
        (self.decode)(raw)
    }
}

impl PartialEq for ParamType {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty && self.variadic == other.variadic
    }
}

impl Eq for ParamType {}

fn decode_any<T: JsonType>(raw: &str) -> Result<AnyValue, serde_json::Error> {
    T::decode(raw).map(AnyValue::new)
}

fn decode_receiver(_raw: &str) -> Result<AnyValue, serde_json::Error> {
    Err(serde::de::Error::custom("a method receiver cannot be decoded from JSON"))
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FuncType {
    params: Vec<ParamType>,
    results: Vec<TypeDesc>,
    variadic: bool,
}

impl FuncType {
    /// Variadic when the last parameter is a variadic slot.
    pub fn new(params: Vec<ParamType>, results: Vec<TypeDesc>) -> Self {
        let variadic = params.last().is_some_and(ParamType::is_variadic);
        Self {
            params,
            results,
            variadic,
        }
    }

    pub fn params(&self) -> &[ParamType] {
        &self.params
    }

    pub fn param(&self, index: usize) -> Option<&ParamType> {
        self.params.get(index)
    }

    pub fn num_in(&self) -> usize {
        self.params.len()
    }

    pub fn results(&self) -> &[TypeDesc] {
        &self.results
    }

    pub fn is_variadic(&self) -> bool {
        self.variadic
    }
}

/// A method's function type; parameter 0 is always the receiver.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MethodType {
    func: FuncType,
}

impl MethodType {
    pub fn new<R: 'static>(mut params: Vec<ParamType>, results: Vec<TypeDesc>) -> Self {
        params.insert(0, ParamType::receiver::<R>());
        Self {
            func: FuncType::new(params, results),
        }
    }

    pub fn func(&self) -> &FuncType {
        &self.func
    }

    pub fn receiver(&self) -> &TypeDesc {
        self.func.params[0].ty()
    }
}

#[cfg(test)]
mod tests {
    use super::{NumberKind, TypeDesc, name_of};
    use std::collections::HashMap;

    use crate::core::context::Context;
    use crate::core::reflect::JsonType;

    #[derive(serde::Serialize, serde::Deserialize)]
    struct Empty {}
    crate::json_object!(Empty);

    #[test]
    fn name_table_matches_json_domain() {
        let cases = [
            (i32::descriptor(), "number"),
            (f64::descriptor(), "number"),
            (<String as JsonType>::descriptor(), "string"),
            (bool::descriptor(), "boolean"),
            (Empty::descriptor(), "object"),
            (<HashMap<String, String>>::descriptor(), "object"),
            (<Vec<String>>::descriptor(), "array of strings"),
            (<Vec<bool>>::descriptor(), "array of booleans"),
            (<Vec<i64>>::descriptor(), "array of numbers"),
        ];

        for (ty, name) in cases {
            assert_eq!(name_of(&ty), name);
        }
    }

    #[test]
    fn pointers_are_unwrapped_before_naming() {
        assert_eq!(name_of(&<Option<Empty>>::descriptor()), "object");
        assert_eq!(name_of(&<Option<Option<u8>>>::descriptor()), "number");
        assert_eq!(name_of(&<Vec<Option<f32>>>::descriptor()), "array of numbers");
        assert_eq!(
            name_of(&<Vec<Vec<bool>>>::descriptor()),
            "array of array of booleanss"
        );
    }

    #[test]
    fn unrecognized_descriptors_are_unknown() {
        assert_eq!(name_of(&Context::descriptor()), "unknown");
        assert_eq!(name_of(&TypeDesc::Error), "unknown");
        assert_eq!(name_of(&serde_json::Value::descriptor()), "unknown");
        assert_eq!(name_of(&TypeDesc::Receiver("Svc")), "unknown");
        assert_eq!(name_of(&TypeDesc::Number(NumberKind::Uint)), "number");
    }
}
