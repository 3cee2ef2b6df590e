//! # ringtensor
//!
//! Dense and sparse tensors whose elements only need to form a semiring.
//!
//! This is the **meta crate** that re-exports all ringtensor components for
//! convenient access.
//!
//! ## Quick Start
//!
//! ```
//! use ringtensor::prelude::*;
//!
//! let a = DenseTensor::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]])?;
//! let b = DenseTensor::<f64>::identity(2)?;
//! assert_eq!(a.matmul(&b)?, a);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Components
//!
//! ### Core ([`core`])
//!
//! Scalar capability traits ([`Semiring`](crate::core::Semiring),
//! [`Ring`](crate::core::Ring), [`Field`](crate::core::Field)), shapes,
//! [`ComputeConfig`](crate::core::ComputeConfig) and the dense tensor.
//!
//! ```
//! use ringtensor::core::DenseTensor;
//!
//! let t = DenseTensor::<i32>::ones(&[2, 3, 4]).unwrap();
//! let reshaped = t.reshape(&[6, 4]).unwrap();
//! assert_eq!(reshaped.dims(), &[6, 4]);
//! ```
//!
//! ### Dense kernels ([`kernels`])
//!
//! Matrix-matrix, matrix-vector and `A * B^T` kernels with a size-based
//! dispatcher, plus dense `tensor_dot`.
//!
//! ```
//! use ringtensor::core::DenseTensor;
//! use ringtensor::kernels::tensor_dot;
//!
//! let a = DenseTensor::from_vec((0..6).collect::<Vec<i64>>(), &[2, 3]).unwrap();
//! let full = tensor_dot(&a, &a, &[0, 1], &[0, 1]).unwrap();
//! assert_eq!(full.data(), &[55]);
//! ```
//!
//! ### Sparse tensors ([`sparse`])
//!
//! COO tensors, matrices and vectors, CSR matrices, merges and products.
//!
//! ```
//! use ringtensor::sparse::CooTensor;
//!
//! let coo = CooTensor::new(vec![vec![0, 0], vec![1, 1]], vec![1.0, 2.0], &[2, 2]).unwrap();
//! assert_eq!(coo.nnz(), 2);
//! ```
//!
//! ## Features
//!
//! - `parallel` (default): concurrent kernels on the shared rayon pool
//! - `serde`: serialization for shapes and containers
//!
//! ## Logging
//!
//! Dispatch decisions are logged with `tracing` at `debug` level and format
//! conversions at `trace` level. No subscriber is installed by the library;
//! see the programs in `demos/` for one way to enable output.

pub use ringtensor_core as core;
pub use ringtensor_kernels as kernels;
pub use ringtensor_sparse as sparse;

pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! # Example
    //!
    //! ```
    //! use ringtensor::prelude::*;
    //!
    //! let m = CsrMatrix::<f64>::zeros(3, 3);
    //! assert_eq!(m.sparsity(), 1.0);
    //! ```

    // Core types
    pub use crate::core::{
        ComputeConfig, CoreError, CoreResult, DenseTensor, Field, MatMulAlgorithm, Ring, Semiring,
        Shape,
    };

    // Dense products
    pub use crate::kernels::{tensor_dot, DenseProduct, KernelError, KernelResult};

    // Sparse types
    pub use crate::sparse::{
        CooMatrix, CooTensor, CooVector, CsrMatrix, SparseError, SparseResult, SparseStorage,
    };
}
