//! Purpose: Runtime values flowing between the binder, callables and the dispatcher.
//! Exports: `AnyValue`, `Arguments`, `Output`, `ResultSet`.
//! Role: Type-erased carrier that keeps each value's descriptor beside it.
//! Invariants: An `AnyValue` always holds a value whose descriptor it reports.
//! Invariants: A `ResultSet` never contains a non-nil error.

use crate::core::error::Error;
use crate::core::reflect::JsonType;
use crate::core::types::TypeDesc;
use std::any::Any;
use std::fmt;

type Encoder = fn(&(dyn Any + Send + 'static)) -> Result<serde_json::Value, serde_json::Error>;

pub struct AnyValue {
    ty: TypeDesc,
    inner: Box<dyn Any + Send>,
    encode: Encoder,
}

impl AnyValue {
    pub fn new<T: JsonType>(value: T) -> Self {
        Self {
            ty: T::descriptor(),
            inner: Box::new(value),
            encode: encode_any::<T>,
        }
    }

    /// The nil value of an error-typed result slot.
    pub fn nil_error() -> Self {
        Self {
            ty: TypeDesc::Error,
            inner: Box::new(()),
            encode: encode_null,
        }
    }

    pub fn ty(&self) -> &TypeDesc {
        &self.ty
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.inner.is::<T>()
    }

    pub fn is_nil(&self) -> bool {
        self.ty.is_error() && self.inner.is::<()>()
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    pub fn downcast<T: 'static>(self) -> Result<T, AnyValue> {
        let Self { ty, inner, encode } = self;
        match inner.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(inner) => Err(Self { ty, inner, encode }),
        }
    }

    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        (self.encode)(self.inner.as_ref())
    }
}

impl fmt::Debug for AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("AnyValue");
        debug.field("ty", &self.ty);
        match self.to_json() {
            Ok(json) => debug.field("value", &json),
            Err(_) => debug.field("value", &"<opaque>"),
        };
        debug.finish()
    }
}

fn encode_any<T: JsonType>(
    value: &(dyn Any + Send + 'static),
) -> Result<serde_json::Value, serde_json::Error> {
    match value.downcast_ref::<T>() {
        Some(value) => value.encode(),
        None => Err(serde::ser::Error::custom("value does not match its descriptor")),
    }
}

fn encode_null(
    _value: &(dyn Any + Send + 'static),
) -> Result<serde_json::Value, serde_json::Error> {
    Ok(serde_json::Value::Null)
}

/// Fully coerced arguments in declared parameter order.
#[derive(Debug, Default)]
pub struct Arguments {
    values: Vec<AnyValue>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, value: AnyValue) {
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&AnyValue> {
        self.values.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AnyValue> {
        self.values.iter()
    }

    pub fn into_vec(self) -> Vec<AnyValue> {
        self.values
    }
}

impl From<Vec<AnyValue>> for Arguments {
    fn from(values: Vec<AnyValue>) -> Self {
        Self { values }
    }
}

impl IntoIterator for Arguments {
    type Item = AnyValue;
    type IntoIter = std::vec::IntoIter<AnyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

/// A raw output of an invoked callable, before classification.
#[derive(Debug)]
pub enum Output {
    Value(AnyValue),
    Error(Option<Error>),
}

impl Output {
    pub fn value<T: JsonType>(value: T) -> Self {
        Output::Value(AnyValue::new(value))
    }
}

#[derive(Debug, Default)]
pub struct ResultSet {
    values: Vec<AnyValue>,
}

impl ResultSet {
    pub(crate) fn from_values(values: Vec<AnyValue>) -> Self {
        Self { values }
    }

    /// Number of declared outputs, nil error slots included.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&AnyValue> {
        self.values.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AnyValue> {
        self.values.iter()
    }

    /// Outputs that are not error slots.
    pub fn values(&self) -> impl Iterator<Item = &AnyValue> {
        self.values.iter().filter(|value| !value.ty().is_error())
    }

    pub fn into_values(self) -> Vec<AnyValue> {
        self.values
            .into_iter()
            .filter(|value| !value.ty().is_error())
            .collect()
    }

    /// Encodes the non-error outputs as a JSON array.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        self.values()
            .map(AnyValue::to_json)
            .collect::<Result<Vec<_>, _>>()
            .map(serde_json::Value::Array)
    }
}

impl IntoIterator for ResultSet {
    type Item = AnyValue;
    type IntoIter = std::vec::IntoIter<AnyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{AnyValue, ResultSet};
    use crate::core::types::{NumberKind, TypeDesc};
    use serde_json::json;

    #[test]
    fn any_value_keeps_descriptor_and_value() {
        let value = AnyValue::new(vec![1_i32, 2]);
        assert_eq!(
            value.ty(),
            &TypeDesc::Seq(Box::new(TypeDesc::Number(NumberKind::Int)))
        );
        assert!(value.is::<Vec<i32>>());
        assert_eq!(value.downcast_ref::<Vec<i32>>(), Some(&vec![1, 2]));
        assert_eq!(value.to_json().expect("encode"), json!([1, 2]));
    }

    #[test]
    fn downcast_to_wrong_type_returns_value_back() {
        let value = AnyValue::new("hi".to_string());
        let value = value.downcast::<i32>().expect_err("mismatch");
        assert_eq!(value.downcast::<String>().expect("string"), "hi");
    }

    #[test]
    fn result_set_skips_nil_errors_in_values_and_json() {
        let results = ResultSet::from_values(vec![AnyValue::new(3_i64), AnyValue::nil_error()]);
        assert_eq!(results.len(), 2);
        assert!(results.get(1).expect("slot").is_nil());
        assert_eq!(results.values().count(), 1);
        assert_eq!(results.to_json().expect("encode"), json!([3]));
        assert_eq!(results.into_values().len(), 1);
    }
}
