//! # ringtensor-kernels
//!
//! Dense product kernels over any [`Semiring`](ringtensor_core::Semiring).
//!
//! ## Overview
//!
//! - **Matrix-matrix kernels** ([`matmul`](mod@matmul)): i-j-k, i-k-j and
//!   tiled variants, each with a concurrent counterpart that splits the
//!   output into row bands
//! - **Matrix-vector kernels** ([`matvec`](mod@matvec)): plain and tiled,
//!   sequential and concurrent
//! - **`A * B^T` kernels** ([`mult_transpose`](mod@mult_transpose))
//! - **Dispatcher** ([`dispatch`]): picks a kernel from operand sizes and a
//!   [`ComputeConfig`](ringtensor_core::ComputeConfig), validates shapes and
//!   wraps the result
//! - **Tensor contraction** ([`tensordot`]): reduces `tensor_dot` to one
//!   matrix product via permutation and reshaping
//!
//! ## Quick Start
//!
//! ```rust
//! use ringtensor_core::DenseTensor;
//! use ringtensor_kernels::DenseProduct;
//!
//! let a = DenseTensor::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
//! let x = DenseTensor::from_vec(vec![1.0, -1.0], &[2]).unwrap();
//!
//! let y = a.matvec(&x).unwrap();
//! assert_eq!(y.data(), &[-1.0, -1.0]);
//!
//! let g = a.mult_transpose(&a).unwrap();
//! assert_eq!(g.data(), &[5.0, 11.0, 11.0, 25.0]);
//! ```
//!
//! The raw kernels in [`mod@matmul`], [`mod@matvec`] and
//! [`mod@mult_transpose`] do not validate their inputs; use the dispatcher
//! functions unless the shapes are already known to be compatible.

pub mod dispatch;
pub mod error;
pub mod matmul;
pub mod matvec;
pub mod mult_transpose;
pub mod tensordot;

pub use dispatch::{
    matmul, matmul_with, matvec, matvec_with, mult_transpose, mult_transpose_with, run_matmul,
    run_matvec, run_mult_transpose, select_matmul, select_matvec, select_mult_transpose,
    DenseProduct,
};
pub use error::{KernelError, KernelResult};
pub use tensordot::{tensor_dot, tensor_dot_with, tensor_inner, ContractionPlan};
