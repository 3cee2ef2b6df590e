//! # ringtensor-sparse
//!
//! Sparse tensors over any [`Semiring`](ringtensor_core::Semiring).
//!
//! This crate provides:
//! - COO (Coordinate) tensors, matrices and vectors
//! - CSR (Compressed Sparse Row) matrices
//! - Sorted two-pointer merges for element-wise arithmetic
//! - Sparse x sparse, sparse x dense and sparse x vector products, each with
//!   a concurrent variant chosen by
//!   [`ComputeConfig::sparse_concurrent_threshold`](ringtensor_core::ComputeConfig)
//! - Tensor contraction (`tensor_dot`) on coordinate tensors
//!
//! ## Storage invariants
//!
//! Coordinate containers keep their entries in row-major order and CSR rows
//! keep their columns sorted. Constructors validate lengths and bounds but
//! leave ordering to the caller; `sort_indices` restores it. Entries that
//! evaluate to zero are never pruned implicitly; `drop_zeros` does that on
//! request.
//!
//! ## Example
//!
//! ```
//! use ringtensor_sparse::{CooMatrix, SparseStorage};
//!
//! let a = CooMatrix::new(vec![0, 1], vec![0, 1], vec![1, 2], 2, 2).unwrap();
//! let b = CooMatrix::new(vec![0, 1], vec![0, 1], vec![3, 4], 2, 2).unwrap();
//!
//! let csr = a.to_csr();
//! let product = csr.matmul(&b.to_csr()).unwrap();
//! assert_eq!(product.data(), &[3, 0, 0, 8]);
//! assert_eq!(csr.density(), 0.5);
//! ```

pub mod convert;
pub mod coo;
pub mod coo_matmul;
pub mod coo_matrix;
pub mod coo_vector;
pub mod csr;
pub mod csr_ops;
pub mod error;
pub mod merge;
pub mod ops;
pub mod search;
pub mod sort;
pub mod tensordot;

pub use coo::{CooError, CooTensor};
pub use coo_matrix::CooMatrix;
pub use coo_vector::CooVector;
pub use csr::{CsrError, CsrMatrix};
pub use error::{SparseError, SparseResult};
pub use ops::SparseStorage;
