// Core modules implementing type descriptors, runtime values, the context, and errors.
pub mod context;
pub mod error;
pub mod reflect;
pub mod types;
pub mod value;
