//! Unified error type for sparse containers and operations.
//!
//! - **`SparseError`**: top-level enum returned by every fallible sparse API
//! - **Format errors**: [`CooError`](crate::coo::CooError) and
//!   [`CsrError`](crate::csr::CsrError) describe malformed storage arrays
//! - **Core errors**: shape mismatches, bounds and overflow checks and
//!   unsupported operations come from
//!   [`CoreError`](ringtensor_core::CoreError)
//!
//! # Examples
//!
//! ```
//! use ringtensor_sparse::{CsrMatrix, SparseError};
//! use ringtensor_core::CoreError;
//!
//! let a = CsrMatrix::<f64>::zeros(2, 2);
//! match a.div(&a) {
//!     Err(SparseError::Core(CoreError::Unsupported { op, .. })) => assert_eq!(op, "div"),
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```

use ringtensor_core::CoreError;
use ringtensor_kernels::KernelError;
use thiserror::Error;

/// Top-level error type for all sparse operations
#[derive(Error, Debug)]
pub enum SparseError {
    /// Shape, bounds, overflow or unsupported-operation errors
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Errors raised by the dense kernels (tensor-dot validation, dense products)
    #[error(transparent)]
    Kernel(#[from] KernelError),

    /// COO storage errors
    #[error("COO error: {0}")]
    Coo(#[from] crate::coo::CooError),

    /// CSR storage errors
    #[error("CSR error: {0}")]
    Csr(#[from] crate::csr::CsrError),
}

/// Result alias for sparse operations
pub type SparseResult<T> = Result<T, SparseError>;

impl SparseError {
    /// Operand shapes differ for the element-wise or product operation `op`.
    pub fn shape_mismatch(op: &'static str, expected: &[usize], got: &[usize]) -> Self {
        SparseError::Core(CoreError::shape_mismatch(op, expected, got))
    }

    /// `op` is not defined for the container type `C`.
    pub fn unsupported<C: ?Sized>(op: &'static str) -> Self {
        SparseError::Core(CoreError::unsupported::<C>(op))
    }

    pub fn out_of_bounds(index: &[usize], shape: &[usize]) -> Self {
        SparseError::Core(CoreError::out_of_bounds(index, shape))
    }

    pub fn is_shape_mismatch(&self) -> bool {
        matches!(
            self,
            SparseError::Core(CoreError::ShapeMismatch { .. })
                | SparseError::Kernel(KernelError::DimensionMismatch { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_mismatch_helper() {
        let err = SparseError::shape_mismatch("add", &[3, 3], &[3, 4]);
        assert!(err.is_shape_mismatch());
        assert_eq!(
            err.to_string(),
            "Shape mismatch in add: expected [3, 3], got [3, 4]"
        );
    }

    #[test]
    fn test_unsupported_names_type() {
        let err = SparseError::unsupported::<crate::CsrMatrix<f32>>("div");
        assert!(err.to_string().contains("CsrMatrix<f32>"));
    }

    #[test]
    fn test_kernel_error_conversion() {
        let err: SparseError =
            KernelError::invalid_axes("tensor_dot", &[3], 2, "axis 3 out of range").into();
        assert!(matches!(err, SparseError::Kernel(_)));
        assert!(!err.is_shape_mismatch());
    }
}
