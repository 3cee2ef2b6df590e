//! Tunables for kernel selection.
//!
//! [`ComputeConfig`] is a plain value. Operations that can choose between a
//! sequential and a concurrent kernel take it as an argument (the `*_with`
//! method variants); the plain methods use [`ComputeConfig::default`].
//! There is no process-wide mutable configuration.
//!
//! ```
//! use ringtensor_core::{ComputeConfig, MatMulAlgorithm};
//!
//! let cfg = ComputeConfig::new()
//!     .block_size(32)
//!     .matmul_concurrent_threshold(1_000)
//!     .force_matmul(MatMulAlgorithm::Reordered);
//! assert_eq!(cfg.block_size, 32);
//! assert_eq!(cfg.matmul_algorithm, Some(MatMulAlgorithm::Reordered));
//! ```

use std::fmt;

/// Dense matrix-matrix multiplication kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MatMulAlgorithm {
    /// i-j-k loop order.
    Standard,
    /// i-k-j loop order, streams rows of both operands.
    Reordered,
    /// Square tiles of `block_size`, i-j-k inside each tile.
    Blocked,
    /// Square tiles, i-k-j inside each tile.
    BlockedReordered,
    ConcurrentStandard,
    ConcurrentReordered,
    ConcurrentBlocked,
    ConcurrentBlockedReordered,
}

impl MatMulAlgorithm {
    pub const ALL: [MatMulAlgorithm; 8] = [
        MatMulAlgorithm::Standard,
        MatMulAlgorithm::Reordered,
        MatMulAlgorithm::Blocked,
        MatMulAlgorithm::BlockedReordered,
        MatMulAlgorithm::ConcurrentStandard,
        MatMulAlgorithm::ConcurrentReordered,
        MatMulAlgorithm::ConcurrentBlocked,
        MatMulAlgorithm::ConcurrentBlockedReordered,
    ];

    pub fn is_concurrent(self) -> bool {
        matches!(
            self,
            MatMulAlgorithm::ConcurrentStandard
                | MatMulAlgorithm::ConcurrentReordered
                | MatMulAlgorithm::ConcurrentBlocked
                | MatMulAlgorithm::ConcurrentBlockedReordered
        )
    }
}

/// Dense matrix-vector multiplication kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MatVecAlgorithm {
    StandardVector,
    BlockedVector,
    ConcurrentStandardVector,
    ConcurrentBlockedVector,
}

impl MatVecAlgorithm {
    pub const ALL: [MatVecAlgorithm; 4] = [
        MatVecAlgorithm::StandardVector,
        MatVecAlgorithm::BlockedVector,
        MatVecAlgorithm::ConcurrentStandardVector,
        MatVecAlgorithm::ConcurrentBlockedVector,
    ];
}

/// Kernels computing `A * B^T` without materializing the transpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MultTransposeAlgorithm {
    MultTranspose,
    MultTransposeBlocked,
    MultTransposeConcurrent,
    MultTransposeBlockedConcurrent,
}

impl MultTransposeAlgorithm {
    pub const ALL: [MultTransposeAlgorithm; 4] = [
        MultTransposeAlgorithm::MultTranspose,
        MultTransposeAlgorithm::MultTransposeBlocked,
        MultTransposeAlgorithm::MultTransposeConcurrent,
        MultTransposeAlgorithm::MultTransposeBlockedConcurrent,
    ];
}

macro_rules! display_as_debug {
    ($($t:ty),*) => {
        $(
            impl fmt::Display for $t {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    fmt::Debug::fmt(self, f)
                }
            }
        )*
    };
}

display_as_debug!(MatMulAlgorithm, MatVecAlgorithm, MultTransposeAlgorithm);

/// Thresholds and block sizes used when selecting compute kernels.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComputeConfig {
    /// Tile edge for blocked kernels (default: 64)
    pub block_size: usize,
    /// Left-operand entry count above which matmul runs concurrently (default: 50_000)
    pub matmul_concurrent_threshold: usize,
    /// Largest operand dimension from which blocked kernels are used (default: 256)
    pub blocked_threshold: usize,
    /// Matrix entry count above which mat-vec runs concurrently (default: 360_000)
    pub matvec_concurrent_threshold: usize,
    /// Entry count above which dense element-wise products run concurrently (default: 50_000)
    pub elem_mult_concurrent_threshold: usize,
    /// Entry count above which dense element-wise quotients run concurrently (default: 50_000)
    pub elem_div_concurrent_threshold: usize,
    /// Stored-entry count above which sparse products run concurrently (default: 10_000)
    pub sparse_concurrent_threshold: usize,
    /// Forces a matmul kernel, bypassing selection
    pub matmul_algorithm: Option<MatMulAlgorithm>,
    /// Forces a mat-vec kernel, bypassing selection
    pub matvec_algorithm: Option<MatVecAlgorithm>,
    /// Forces an `A * B^T` kernel, bypassing selection
    pub mult_transpose_algorithm: Option<MultTransposeAlgorithm>,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            block_size: 64,
            matmul_concurrent_threshold: 50_000,
            blocked_threshold: 256,
            matvec_concurrent_threshold: 360_000,
            elem_mult_concurrent_threshold: 50_000,
            elem_div_concurrent_threshold: 50_000,
            sparse_concurrent_threshold: 10_000,
            matmul_algorithm: None,
            matvec_algorithm: None,
            mult_transpose_algorithm: None,
        }
    }
}

impl ComputeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration that never selects a concurrent kernel.
    pub fn sequential() -> Self {
        Self {
            matmul_concurrent_threshold: usize::MAX,
            matvec_concurrent_threshold: usize::MAX,
            elem_mult_concurrent_threshold: usize::MAX,
            elem_div_concurrent_threshold: usize::MAX,
            sparse_concurrent_threshold: usize::MAX,
            ..Self::default()
        }
    }

    /// Set the tile edge for blocked kernels (clamped to at least 1)
    pub fn block_size(mut self, size: usize) -> Self {
        self.block_size = size.max(1);
        self
    }

    pub fn matmul_concurrent_threshold(mut self, threshold: usize) -> Self {
        self.matmul_concurrent_threshold = threshold;
        self
    }

    pub fn blocked_threshold(mut self, threshold: usize) -> Self {
        self.blocked_threshold = threshold;
        self
    }

    pub fn matvec_concurrent_threshold(mut self, threshold: usize) -> Self {
        self.matvec_concurrent_threshold = threshold;
        self
    }

    pub fn elem_mult_concurrent_threshold(mut self, threshold: usize) -> Self {
        self.elem_mult_concurrent_threshold = threshold;
        self
    }

    pub fn elem_div_concurrent_threshold(mut self, threshold: usize) -> Self {
        self.elem_div_concurrent_threshold = threshold;
        self
    }

    pub fn sparse_concurrent_threshold(mut self, threshold: usize) -> Self {
        self.sparse_concurrent_threshold = threshold;
        self
    }

    /// Always use `algorithm` for dense matrix-matrix products
    pub fn force_matmul(mut self, algorithm: MatMulAlgorithm) -> Self {
        self.matmul_algorithm = Some(algorithm);
        self
    }

    /// Always use `algorithm` for dense matrix-vector products
    pub fn force_matvec(mut self, algorithm: MatVecAlgorithm) -> Self {
        self.matvec_algorithm = Some(algorithm);
        self
    }

    /// Always use `algorithm` for dense `A * B^T` products
    pub fn force_mult_transpose(mut self, algorithm: MultTransposeAlgorithm) -> Self {
        self.mult_transpose_algorithm = Some(algorithm);
        self
    }
}
