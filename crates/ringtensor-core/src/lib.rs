//! # ringtensor-core
//!
//! Foundations shared by every ringtensor crate:
//!
//! - **Scalar algebra** ([`Semiring`], [`Ring`], [`Field`]): the capability
//!   contract every tensor element satisfies. Implemented for `bool`, the
//!   primitive integers, `f32`/`f64` and their complex counterparts.
//! - **Shapes** ([`Shape`]): immutable dims with row-major strides and
//!   overflow-checked entry counts.
//! - **Dense tensors** ([`DenseTensor`]): flat row-major storage with
//!   element-wise arithmetic, axis permutation, slicing and ndarray interop.
//! - **Configuration** ([`ComputeConfig`]): thresholds and block sizes that
//!   drive kernel selection.
//! - **Concurrency helpers** ([`concurrency`]): fan-out over disjoint output
//!   bands on the shared worker pool.
//!
//! ## Quick Start
//!
//! ```rust
//! use ringtensor_core::{ComputeConfig, DenseTensor};
//!
//! let a = DenseTensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
//! let b = DenseTensor::<f64>::identity(2).unwrap();
//!
//! let sum = a.add(&b).unwrap();
//! assert_eq!(sum.data(), &[2.0, 2.0, 3.0, 5.0]);
//!
//! let cfg = ComputeConfig::sequential();
//! let prod = a.elem_mult_with(&b, &cfg).unwrap();
//! assert_eq!(prod.data(), &[1.0, 0.0, 0.0, 4.0]);
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel` (default): run concurrent kernels on the shared worker pool
//! - `serde`: serialization for shapes, configs and dense tensors

pub mod concurrency;
pub mod config;
pub mod dense;
pub mod error;
pub mod scalar;
pub mod shape;

pub use config::{ComputeConfig, MatMulAlgorithm, MatVecAlgorithm, MultTransposeAlgorithm};
pub use dense::DenseTensor;
pub use error::{CoreError, CoreResult};
pub use scalar::{Field, Ring, Semiring};
pub use shape::{Dims, Shape};
