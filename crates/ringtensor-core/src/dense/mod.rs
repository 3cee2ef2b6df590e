//! Dense tensors stored as a flat row-major buffer.
//!
//! The type lives in [`types`]; operations are grouped by concern into the
//! private sub-modules below and attached as inherent methods.

pub mod types;

mod comparison;
mod creation;
mod elementwise;
mod indexing;
mod interop;
mod shape_ops;

pub use types::DenseTensor;
