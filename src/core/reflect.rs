//! Purpose: Compile-time registration of parameter and result types.
//! Exports: `JsonType`, `Returns`, `Variadic`, `json_object!`.
//! Role: Replaces runtime reflection; every bindable type reports a `TypeDesc`.
//! Invariants: `decode` produces a fresh owned value from one raw JSON fragment.
//! Invariants: Containers decode element-wise through their element's `JsonType`.
//! Notes: Caller records opt in through `json_object!` and serde derives.

use crate::core::context::Context;
use crate::core::error::Error;
use crate::core::types::{NumberKind, TypeDesc};
use crate::core::value::Output;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;
use std::collections::{BTreeMap, HashMap};
use std::error::Error as StdError;

pub trait JsonType: Send + Sized + 'static {
    /// Set only by `Variadic`; marks a variable-length trailing parameter.
    const VARIADIC: bool = false;

    fn descriptor() -> TypeDesc;

    fn decode(raw: &str) -> Result<Self, serde_json::Error>;

    fn encode(&self) -> Result<serde_json::Value, serde_json::Error>;
}

/// Declared outputs of a callable.
pub trait Returns {
    fn descriptors() -> Vec<TypeDesc>;

    fn into_outputs(self) -> Vec<Output>;
}

#[doc(hidden)]
pub type DecodeResult<T> = Result<T, serde_json::Error>;

#[doc(hidden)]
pub type EncodeResult = Result<serde_json::Value, serde_json::Error>;

#[doc(hidden)]
pub fn decode_serde<T: DeserializeOwned>(raw: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(raw)
}

#[doc(hidden)]
pub fn encode_serde<T: Serialize>(value: &T) -> Result<serde_json::Value, serde_json::Error> {
    serde_json::to_value(value)
}

/// Registers serde records as JSON objects usable as parameters and results.
///
/// Binding follows the record's serde attributes. A record without
/// `#[serde(default)]` rejects an object that omits a field with a `Decode`
/// error (`missing field ...`); add the attribute to fill omitted fields with
/// their `Default` values instead.
#[macro_export]
macro_rules! json_object {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::JsonType for $ty {
                fn descriptor() -> $crate::TypeDesc {
                    $crate::TypeDesc::Record(stringify!($ty))
                }

                fn decode(raw: &str) -> $crate::core::reflect::DecodeResult<Self> {
                    $crate::core::reflect::decode_serde(raw)
                }

                fn encode(&self) -> $crate::core::reflect::EncodeResult {
                    $crate::core::reflect::encode_serde(self)
                }
            }

            impl $crate::Returns for $ty {
                fn descriptors() -> ::std::vec::Vec<$crate::TypeDesc> {
                    ::std::vec![<$ty as $crate::JsonType>::descriptor()]
                }

                fn into_outputs(self) -> ::std::vec::Vec<$crate::Output> {
                    ::std::vec![$crate::Output::value(self)]
                }
            }
        )+
    };
}

macro_rules! impl_scalar {
    ($($ty:ty => $desc:expr),+ $(,)?) => {
        $(
            impl JsonType for $ty {
                fn descriptor() -> TypeDesc {
                    $desc
                }

                fn decode(raw: &str) -> Result<Self, serde_json::Error> {
                    decode_serde(raw)
                }

                fn encode(&self) -> Result<serde_json::Value, serde_json::Error> {
                    encode_serde(self)
                }
            }
        )+
        impl_single_return!($($ty),+);
    };
}

macro_rules! impl_single_return {
    (<T> $($ty:ty),+) => {
        $(
            impl<T: JsonType> Returns for $ty {
                fn descriptors() -> Vec<TypeDesc> {
                    vec![<$ty as JsonType>::descriptor()]
                }

                fn into_outputs(self) -> Vec<Output> {
                    vec![Output::value(self)]
                }
            }
        )+
    };
    ($($ty:ty),+) => {
        $(
            impl Returns for $ty {
                fn descriptors() -> Vec<TypeDesc> {
                    vec![<$ty as JsonType>::descriptor()]
                }

                fn into_outputs(self) -> Vec<Output> {
                    vec![Output::value(self)]
                }
            }
        )+
    };
}

impl_scalar!(
    i8 => TypeDesc::Number(NumberKind::Int),
    i16 => TypeDesc::Number(NumberKind::Int),
    i32 => TypeDesc::Number(NumberKind::Int),
    i64 => TypeDesc::Number(NumberKind::Int),
    isize => TypeDesc::Number(NumberKind::Int),
    u8 => TypeDesc::Number(NumberKind::Uint),
    u16 => TypeDesc::Number(NumberKind::Uint),
    u32 => TypeDesc::Number(NumberKind::Uint),
    u64 => TypeDesc::Number(NumberKind::Uint),
    usize => TypeDesc::Number(NumberKind::Uint),
    f32 => TypeDesc::Number(NumberKind::Float),
    f64 => TypeDesc::Number(NumberKind::Float),
    bool => TypeDesc::Bool,
    String => TypeDesc::String,
    serde_json::Value => TypeDesc::Any,
);

impl<T: JsonType> JsonType for Vec<T> {
    fn descriptor() -> TypeDesc {
        TypeDesc::Seq(Box::new(T::descriptor()))
    }

    fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        let items: Vec<&RawValue> = serde_json::from_str(raw)?;
        items.into_iter().map(|item| T::decode(item.get())).collect()
    }

    fn encode(&self) -> Result<serde_json::Value, serde_json::Error> {
        self.iter()
            .map(T::encode)
            .collect::<Result<Vec<_>, _>>()
            .map(serde_json::Value::Array)
    }
}

/// Nullable slot: JSON `null` decodes to `None`.
impl<T: JsonType> JsonType for Option<T> {
    fn descriptor() -> TypeDesc {
        TypeDesc::Pointer(Box::new(T::descriptor()))
    }

    fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        if raw.trim() == "null" {
            return Ok(None);
        }
        T::decode(raw).map(Some)
    }

    fn encode(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            Some(value) => value.encode(),
            None => Ok(serde_json::Value::Null),
        }
    }
}

impl<T: JsonType> JsonType for Box<T> {
    fn descriptor() -> TypeDesc {
        T::descriptor()
    }

    fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        T::decode(raw).map(Box::new)
    }

    fn encode(&self) -> Result<serde_json::Value, serde_json::Error> {
        self.as_ref().encode()
    }
}

impl<T: JsonType> JsonType for HashMap<String, T> {
    fn descriptor() -> TypeDesc {
        TypeDesc::Map(Box::new(T::descriptor()))
    }

    fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        let entries: HashMap<String, &RawValue> = serde_json::from_str(raw)?;
        entries
            .into_iter()
            .map(|(key, value)| T::decode(value.get()).map(|value| (key, value)))
            .collect()
    }

    fn encode(&self) -> Result<serde_json::Value, serde_json::Error> {
        encode_entries(self.iter())
    }
}

impl<T: JsonType> JsonType for BTreeMap<String, T> {
    fn descriptor() -> TypeDesc {
        TypeDesc::Map(Box::new(T::descriptor()))
    }

    fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        let entries: BTreeMap<String, &RawValue> = serde_json::from_str(raw)?;
        entries
            .into_iter()
            .map(|(key, value)| T::decode(value.get()).map(|value| (key, value)))
            .collect()
    }

    fn encode(&self) -> Result<serde_json::Value, serde_json::Error> {
        encode_entries(self.iter())
    }
}

fn encode_entries<'a, T: JsonType>(
    entries: impl Iterator<Item = (&'a String, &'a T)>,
) -> Result<serde_json::Value, serde_json::Error> {
    let mut object = serde_json::Map::new();
    for (key, value) in entries {
        object.insert(key.clone(), value.encode()?);
    }
    Ok(serde_json::Value::Object(object))
}

impl_single_return!(<T> Vec<T>, Option<T>, Box<T>, HashMap<String, T>, BTreeMap<String, T>);

/// Injected by the binder, never decoded from caller JSON.
impl JsonType for Context {
    fn descriptor() -> TypeDesc {
        TypeDesc::Context
    }

    fn decode(_raw: &str) -> Result<Self, serde_json::Error> {
        Err(serde::de::Error::custom(
            "an execution context cannot be decoded from JSON",
        ))
    }

    fn encode(&self) -> Result<serde_json::Value, serde_json::Error> {
        Ok(serde_json::Value::Null)
    }
}

/// Variable-length trailing parameter. Detected so binding can reject it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Variadic<T>(pub Vec<T>);

impl<T: JsonType> JsonType for Variadic<T> {
    const VARIADIC: bool = true;

    fn descriptor() -> TypeDesc {
        TypeDesc::Seq(Box::new(T::descriptor()))
    }

    fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        <Vec<T>>::decode(raw).map(Variadic)
    }

    fn encode(&self) -> Result<serde_json::Value, serde_json::Error> {
        self.0.encode()
    }
}

impl Returns for () {
    fn descriptors() -> Vec<TypeDesc> {
        Vec::new()
    }

    fn into_outputs(self) -> Vec<Output> {
        Vec::new()
    }
}

macro_rules! impl_tuple_return {
    ($($ty:ident),+) => {
        impl<$($ty: JsonType),+> Returns for ($($ty,)+) {
            fn descriptors() -> Vec<TypeDesc> {
                vec![$($ty::descriptor()),+]
            }

            #[allow(non_snake_case)]
            fn into_outputs(self) -> Vec<Output> {
                let ($($ty,)+) = self;
                vec![$(Output::value($ty)),+]
            }
        }
    };
}

impl_tuple_return!(A, B);
impl_tuple_return!(A, B, C);
impl_tuple_return!(A, B, C, D);

/// The error slot is always last and is nil on `Ok`.
impl<T, E> Returns for Result<T, E>
where
    T: Returns,
    E: Into<Box<dyn StdError + Send + Sync>>,
{
    fn descriptors() -> Vec<TypeDesc> {
        let mut descriptors = T::descriptors();
        descriptors.push(TypeDesc::Error);
        descriptors
    }

    fn into_outputs(self) -> Vec<Output> {
        match self {
            Ok(value) => {
                let mut outputs = value.into_outputs();
                outputs.push(Output::Error(None));
                outputs
            }
            Err(err) => vec![Output::Error(Some(Error::callable(err)))],
        }
    }
}
