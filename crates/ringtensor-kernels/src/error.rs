//! Error types for the dense kernels.

use ringtensor_core::CoreError;
use std::fmt;

/// Error type for kernel entry points.
#[derive(Debug, Clone, PartialEq)]
pub enum KernelError {
    /// Operand dims are incompatible for the operation.
    DimensionMismatch {
        operation: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
        context: String,
    },

    /// Contraction axes are malformed.
    InvalidAxes {
        operation: &'static str,
        axes: Vec<usize>,
        rank: usize,
        reason: String,
    },

    /// Error raised by a core container or shape.
    Core(CoreError),
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelError::DimensionMismatch {
                operation,
                expected,
                actual,
                context,
            } => write!(
                f,
                "{}: dimension mismatch - expected {:?}, got {:?} ({})",
                operation, expected, actual, context
            ),
            KernelError::InvalidAxes {
                operation,
                axes,
                rank,
                reason,
            } => write!(
                f,
                "{}: invalid axes {:?} for rank {} - {}",
                operation, axes, rank, reason
            ),
            KernelError::Core(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for KernelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            KernelError::Core(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CoreError> for KernelError {
    fn from(err: CoreError) -> Self {
        KernelError::Core(err)
    }
}

impl KernelError {
    pub fn dimension_mismatch(
        operation: &'static str,
        expected: &[usize],
        actual: &[usize],
        context: impl Into<String>,
    ) -> Self {
        KernelError::DimensionMismatch {
            operation,
            expected: expected.to_vec(),
            actual: actual.to_vec(),
            context: context.into(),
        }
    }

    pub fn invalid_axes(
        operation: &'static str,
        axes: &[usize],
        rank: usize,
        reason: impl Into<String>,
    ) -> Self {
        KernelError::InvalidAxes {
            operation,
            axes: axes.to_vec(),
            rank,
            reason: reason.into(),
        }
    }
}

/// Result alias for kernel entry points.
pub type KernelResult<T> = Result<T, KernelError>;
