//! Approximate comparison of dense tensors.

use super::types::DenseTensor;
use crate::scalar::Ring;

impl<T: Ring> DenseTensor<T> {
    /// `true` when shapes match and every pair of entries satisfies
    /// `|a - b| <= atol + rtol * |b|`.
    ///
    /// ```
    /// use ringtensor_core::DenseTensor;
    ///
    /// let a = DenseTensor::from_vec(vec![1.0, 2.0], &[2]).unwrap();
    /// let b = DenseTensor::from_vec(vec![1.0 + 1e-12, 2.0], &[2]).unwrap();
    /// assert!(a.allclose(&b, 1e-9, 1e-12));
    /// ```
    pub fn allclose(&self, other: &Self, rtol: f64, atol: f64) -> bool {
        self.shape == other.shape
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| a.sub(b).magnitude() <= atol + rtol * b.magnitude())
    }

    /// Largest entry-wise difference magnitude, `None` if shapes differ.
    pub fn max_abs_diff(&self, other: &Self) -> Option<f64> {
        if self.shape != other.shape {
            return None;
        }
        Some(
            self.data
                .iter()
                .zip(other.data.iter())
                .map(|(a, b)| a.sub(b).magnitude())
                .fold(0.0, f64::max),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allclose() {
        let a = DenseTensor::from_vec(vec![1.0, 2.0, 3.0], &[3]).unwrap();
        let b = DenseTensor::from_vec(vec![1.0, 2.0 + 1e-7, 3.0], &[3]).unwrap();
        assert!(a.allclose(&b, 1e-6, 0.0));
        assert!(!a.allclose(&b, 1e-9, 1e-9));

        let c = DenseTensor::from_vec(vec![1.0, 2.0, 3.0], &[1, 3]).unwrap();
        assert!(!a.allclose(&c, 1.0, 1.0));
    }

    #[test]
    fn test_max_abs_diff() {
        let a = DenseTensor::from_vec(vec![1, 5, -2], &[3]).unwrap();
        let b = DenseTensor::from_vec(vec![1, 2, 2], &[3]).unwrap();
        assert_eq!(a.max_abs_diff(&b), Some(4.0));
    }
}
