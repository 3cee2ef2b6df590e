//! Error types shared by every ringtensor crate.
//!
//! Shape and index problems are reported before any computation runs, so a
//! failed operation never leaves a partially written result behind.
//!
//! # Examples
//!
//! ```
//! use ringtensor_core::{CoreError, Shape};
//!
//! let shape = Shape::new(&[2, 3]);
//! let err = shape.flat_index(&[2, 0]).unwrap_err();
//! assert!(matches!(err, CoreError::IndexOutOfBounds { .. }));
//! ```

use thiserror::Error;

/// Errors raised by shapes, dense tensors and the dense kernels.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Operand shapes are incompatible for the named operation.
    #[error("Shape mismatch in {op}: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        op: &'static str,
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    /// A multi-index does not lie inside the shape.
    #[error("Index {index:?} out of bounds for shape {shape:?}")]
    IndexOutOfBounds { index: Vec<usize>, shape: Vec<usize> },

    /// The number of entries of a shape does not fit in an allocatable length.
    #[error("Entry count of shape {shape:?} overflows the addressable range")]
    Overflow { shape: Vec<usize> },

    /// The operation is not defined for the element or container type.
    #[error("Operation {op} is not supported for {type_name}")]
    Unsupported {
        op: &'static str,
        type_name: &'static str,
    },

    /// Axis lists are malformed (duplicates, out of range, wrong length).
    #[error("Invalid axes: {0}")]
    InvalidAxes(String),

    /// A buffer length disagrees with the shape it is paired with.
    #[error("Length mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    /// Shape is not usable for the requested operation.
    #[error("Invalid shape: {0}")]
    InvalidShape(String),
}

/// Result alias used throughout ringtensor-core.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Shape mismatch between two operands of `op`.
    pub fn shape_mismatch(op: &'static str, expected: &[usize], got: &[usize]) -> Self {
        CoreError::ShapeMismatch {
            op,
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    /// Operation `op` unsupported for the concrete type `C`.
    pub fn unsupported<C: ?Sized>(op: &'static str) -> Self {
        CoreError::Unsupported {
            op,
            type_name: std::any::type_name::<C>(),
        }
    }

    pub fn out_of_bounds(index: &[usize], shape: &[usize]) -> Self {
        CoreError::IndexOutOfBounds {
            index: index.to_vec(),
            shape: shape.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = CoreError::shape_mismatch("add", &[2, 3], &[3, 2]);
        assert_eq!(
            err.to_string(),
            "Shape mismatch in add: expected [2, 3], got [3, 2]"
        );

        let err = CoreError::LengthMismatch {
            expected: 4,
            got: 5,
        };
        assert!(err.to_string().contains("expected 4, got 5"));
    }

    #[test]
    fn test_unsupported_names_type() {
        let err = CoreError::unsupported::<Vec<u8>>("div");
        match err {
            CoreError::Unsupported { op, type_name } => {
                assert_eq!(op, "div");
                assert!(type_name.contains("Vec"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
