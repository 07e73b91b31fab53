//! Purpose: JSON boundary shared by the binder and callers.
//! Exports: `normalize`, plus the internal `parse` decode helpers.
//! Role: Single seam for JSON decoding so callsites avoid ad hoc parsing.
//! Invariants: Argument text is decoded through `parse` only.
//! Invariants: Helper APIs stay small and deterministic (no hidden global state).

mod normalizer;
pub(crate) mod parse;

pub use normalizer::normalize;
