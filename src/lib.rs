//! Purpose: Invoke statically typed functions and methods with positional JSON arguments.
//! Exports: `core` (descriptors, values, context, errors) plus the flat binding surface below.
//! Role: Binding layer between untyped JSON transports and typed in-process callables.
//! Invariants: Each bind-and-call builds fresh signature, config, and argument values.
//! Invariants: Failures surface as one `Error`; no partial results are exposed.
pub mod bind;
pub mod call;
pub mod core;
pub mod json;
pub mod signature;

pub use crate::bind::{BindOptions, arguments_of_func, arguments_of_method, bind};
pub use crate::call::{
    Callable, Handler, MethodHandler, call_func, call_func_args, call_method, call_method_args,
    dispatch, type_of_fn, type_of_method,
};
pub use crate::core::context::{Context, ContextFactory};
pub use crate::core::error::{Error, ErrorKind, to_jsonrpc_code};
pub use crate::core::reflect::{JsonType, Returns, Variadic};
pub use crate::core::types::{FuncType, MethodType, NumberKind, ParamType, TypeDesc, name_of};
pub use crate::core::value::{AnyValue, Arguments, Output, ResultSet};
pub use crate::json::normalize;
pub use crate::signature::Signature;
