//! Element-wise arithmetic on dense tensors.
//!
//! All binary operations require identical shapes and report
//! [`CoreError::ShapeMismatch`](crate::CoreError::ShapeMismatch) before
//! touching any data. Element-wise products and quotients switch to the
//! worker pool above their own thresholds in [`ComputeConfig`].

use super::types::DenseTensor;
use crate::concurrency;
use crate::config::ComputeConfig;
use crate::error::CoreResult;
use crate::scalar::{Field, Ring, Semiring};

impl<T: Clone> DenseTensor<T> {
    /// Applies `f` to every entry.
    pub fn map<U, F>(&self, f: F) -> DenseTensor<U>
    where
        F: FnMut(&T) -> U,
    {
        DenseTensor::from_parts_unchecked(self.shape.clone(), self.data.iter().map(f).collect())
    }

    fn zip_with<F>(&self, op: &'static str, other: &Self, f: F) -> CoreResult<Self>
    where
        F: Fn(&T, &T) -> T,
    {
        self.ensure_same_shape(op, other)?;
        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| f(a, b))
            .collect();
        Ok(Self::from_parts_unchecked(self.shape.clone(), data))
    }

    fn zip_with_threshold<F>(
        &self,
        op: &'static str,
        other: &Self,
        threshold: usize,
        f: F,
    ) -> CoreResult<Self>
    where
        T: Send + Sync,
        F: Fn(&T, &T) -> T + Send + Sync,
    {
        self.ensure_same_shape(op, other)?;
        let data = if self.len() > threshold {
            tracing::trace!(op, len = self.len(), "element-wise op on worker pool");
            concurrency::zip_map(&self.data, &other.data, f)
        } else {
            self.data
                .iter()
                .zip(other.data.iter())
                .map(|(a, b)| f(a, b))
                .collect()
        };
        Ok(Self::from_parts_unchecked(self.shape.clone(), data))
    }
}

impl<T: Semiring> DenseTensor<T> {
    pub fn add(&self, other: &Self) -> CoreResult<Self> {
        self.zip_with("add", other, Semiring::add)
    }

    /// Element-wise (Hadamard) product.
    pub fn elem_mult(&self, other: &Self) -> CoreResult<Self> {
        self.elem_mult_with(other, &ComputeConfig::default())
    }

    pub fn elem_mult_with(&self, other: &Self, cfg: &ComputeConfig) -> CoreResult<Self> {
        self.zip_with_threshold(
            "elem_mult",
            other,
            cfg.elem_mult_concurrent_threshold,
            Semiring::mult,
        )
    }

    pub fn add_scalar(&self, b: &T) -> Self {
        self.map(|a| a.add(b))
    }

    pub fn mult_scalar(&self, b: &T) -> Self {
        self.map(|a| a.mult(b))
    }

    /// Sum of all entries.
    pub fn sum(&self) -> T {
        let mut acc = T::zero();
        for v in &self.data {
            acc.add_assign(v);
        }
        acc
    }

    /// Number of entries that are not the additive identity.
    pub fn count_nonzero(&self) -> usize {
        self.data.iter().filter(|v| !v.is_zero()).count()
    }
}

impl<T: Ring> DenseTensor<T> {
    pub fn sub(&self, other: &Self) -> CoreResult<Self> {
        self.zip_with("sub", other, Ring::sub)
    }

    pub fn sub_scalar(&self, b: &T) -> Self {
        self.map(|a| a.sub(b))
    }

    /// Additive inverse of every entry.
    pub fn neg(&self) -> Self {
        self.map(Ring::add_inv)
    }
}

impl<T: Field> DenseTensor<T> {
    /// Element-wise quotient.
    pub fn elem_div(&self, other: &Self) -> CoreResult<Self> {
        self.elem_div_with(other, &ComputeConfig::default())
    }

    pub fn elem_div_with(&self, other: &Self, cfg: &ComputeConfig) -> CoreResult<Self> {
        self.zip_with_threshold(
            "elem_div",
            other,
            cfg.elem_div_concurrent_threshold,
            Field::div,
        )
    }

    pub fn div_scalar(&self, b: &T) -> Self {
        self.map(|a| a.div(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CoreError;

    #[test]
    fn test_add_sub() {
        let a = DenseTensor::from_vec(vec![1, 2, 3, 4], &[2, 2]).unwrap();
        let b = DenseTensor::from_vec(vec![10, 20, 30, 40], &[2, 2]).unwrap();
        assert_eq!(a.add(&b).unwrap().data(), &[11, 22, 33, 44]);
        assert_eq!(b.sub(&a).unwrap().data(), &[9, 18, 27, 36]);
    }

    #[test]
    fn test_shape_mismatch_reported() {
        let a = DenseTensor::<f64>::zeros(&[2, 3]).unwrap();
        let b = DenseTensor::<f64>::zeros(&[3, 2]).unwrap();
        match a.add(&b) {
            Err(CoreError::ShapeMismatch { op, .. }) => assert_eq!(op, "add"),
            other => panic!("expected shape mismatch, got {other:?}"),
        }
        assert!(a.elem_div(&b).is_err());
    }

    #[test]
    fn test_elem_mult_concurrent_matches_sequential() {
        let n = 1_000;
        let a = DenseTensor::from_vec((0..n as i64).collect(), &[n]).unwrap();
        let b = DenseTensor::from_vec((0..n as i64).rev().collect(), &[n]).unwrap();

        let seq = a.elem_mult_with(&b, &ComputeConfig::sequential()).unwrap();
        let par_cfg = ComputeConfig::new().elem_mult_concurrent_threshold(0);
        let par = a.elem_mult_with(&b, &par_cfg).unwrap();
        assert_eq!(seq, par);
        assert_eq!(seq.data()[1], 998);
    }

    #[test]
    fn test_elem_div_thresholds_independent() {
        let a = DenseTensor::from_vec(vec![1.0, 4.0, 9.0], &[3]).unwrap();
        let b = DenseTensor::from_vec(vec![1.0, 2.0, 3.0], &[3]).unwrap();
        let cfg = ComputeConfig::sequential().elem_div_concurrent_threshold(1);
        assert_eq!(a.elem_div_with(&b, &cfg).unwrap().data(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_scalar_ops() {
        let a = DenseTensor::from_vec(vec![2.0, 4.0], &[2]).unwrap();
        assert_eq!(a.add_scalar(&1.0).data(), &[3.0, 5.0]);
        assert_eq!(a.sub_scalar(&1.0).data(), &[1.0, 3.0]);
        assert_eq!(a.mult_scalar(&0.5).data(), &[1.0, 2.0]);
        assert_eq!(a.div_scalar(&2.0).data(), &[1.0, 2.0]);
        assert_eq!(a.neg().data(), &[-2.0, -4.0]);
        assert_eq!(a.sum(), 6.0);
    }

    #[test]
    fn test_bool_semiring_ops() {
        let a = DenseTensor::from_vec(vec![true, false, true], &[3]).unwrap();
        let b = DenseTensor::from_vec(vec![false, false, true], &[3]).unwrap();
        assert_eq!(a.add(&b).unwrap().data(), &[true, false, true]);
        assert_eq!(a.elem_mult(&b).unwrap().data(), &[false, false, true]);
        assert_eq!(a.count_nonzero(), 2);
    }
}
