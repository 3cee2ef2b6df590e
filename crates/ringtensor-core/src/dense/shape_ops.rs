//! Reshaping and axis permutation.

use super::types::DenseTensor;
use crate::error::CoreResult;
use crate::scalar::Ring;
use crate::shape::{Dims, Shape};
use smallvec::smallvec;

impl<T: Clone> DenseTensor<T> {
    /// Same entries under new dims. The entry counts must match exactly.
    ///
    /// ```
    /// use ringtensor_core::DenseTensor;
    ///
    /// let t = DenseTensor::from_vec((0..6).collect::<Vec<i32>>(), &[2, 3]).unwrap();
    /// let r = t.reshape(&[3, 2]).unwrap();
    /// assert_eq!(r[&[2, 1]], 5);
    /// assert!(t.reshape(&[4, 2]).is_err());
    /// ```
    pub fn reshape(&self, dims: &[usize]) -> CoreResult<Self> {
        let shape = Shape::new(dims);
        self.shape.ensure_same_total(&shape)?;
        Ok(Self::from_parts_unchecked(shape, self.data.clone()))
    }

    /// Consuming variant of [`reshape`](Self::reshape); reuses the buffer.
    pub fn into_reshape(self, dims: &[usize]) -> CoreResult<Self> {
        let shape = Shape::new(dims);
        self.shape.ensure_same_total(&shape)?;
        Ok(Self::from_parts_unchecked(shape, self.data))
    }

    /// Rank-1 view of all entries in row-major order.
    pub fn flatten(&self) -> Self {
        Self::from_parts_unchecked(Shape::vector(self.len()), self.data.clone())
    }

    /// Tensor whose axis `i` is axis `axes[i]` of `self`.
    pub fn permute(&self, axes: &[usize]) -> CoreResult<Self> {
        let shape = self.shape.permute_axes(axes)?;
        let rank = shape.rank();
        let src_strides = self.shape.strides();
        let step: Dims = axes.iter().map(|&a| src_strides[a]).collect();
        let dims = shape.dims();

        let mut data = Vec::with_capacity(self.len());
        let mut idx: Dims = smallvec![0; rank];
        let mut src = 0usize;
        for _ in 0..self.len() {
            data.push(self.data[src].clone());
            // odometer over destination indices, tracking the source offset
            for k in (0..rank).rev() {
                idx[k] += 1;
                src += step[k];
                if idx[k] < dims[k] {
                    break;
                }
                src -= step[k] * dims[k];
                idx[k] = 0;
            }
        }
        Ok(Self::from_parts_unchecked(shape, data))
    }

    pub fn swap_axes(&self, axis1: usize, axis2: usize) -> CoreResult<Self> {
        let mut axes: Vec<usize> = (0..self.rank()).collect();
        self.shape.swap_axes(axis1, axis2)?;
        axes.swap(axis1, axis2);
        self.permute(&axes)
    }

    /// Exchanges the first and last axes. For a matrix this is the usual
    /// transpose; tensors of rank below 2 are returned unchanged.
    pub fn transpose(&self) -> Self {
        let rank = self.rank();
        if rank < 2 {
            return self.clone();
        }
        match self.swap_axes(0, rank - 1) {
            Ok(t) => t,
            Err(_) => unreachable!("axes 0 and rank-1 are always valid"),
        }
    }
}

impl<T: Ring> DenseTensor<T> {
    /// Element-wise complex conjugate.
    pub fn conj(&self) -> Self {
        Self::from_parts_unchecked(
            self.shape.clone(),
            self.data.iter().map(Ring::conj).collect(),
        )
    }

    /// Conjugate transpose (Hermitian adjoint for matrices).
    pub fn conj_transpose(&self) -> Self {
        let mut t = self.transpose();
        for v in t.data.iter_mut() {
            *v = v.conj();
        }
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scirs2_core::num_complex::Complex;

    #[test]
    fn test_transpose_matrix() {
        let m = DenseTensor::from_rows(&[vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        let t = m.transpose();
        assert_eq!(t.dims(), &[3, 2]);
        assert_eq!(t.data(), &[1, 4, 2, 5, 3, 6]);
        assert_eq!(t.transpose(), m);
    }

    #[test]
    fn test_permute_rank3() {
        let t = DenseTensor::from_vec((0..24).collect::<Vec<i64>>(), &[2, 3, 4]).unwrap();
        let p = t.permute(&[2, 0, 1]).unwrap();
        assert_eq!(p.dims(), &[4, 2, 3]);
        for i in 0..2 {
            for j in 0..3 {
                for k in 0..4 {
                    assert_eq!(p[&[k, i, j]], t[&[i, j, k]]);
                }
            }
        }
        assert!(t.permute(&[0, 1]).is_err());
    }

    #[test]
    fn test_permute_identity_and_scalar() {
        let t = DenseTensor::from_vec(vec![1.0, 2.0], &[2]).unwrap();
        assert_eq!(t.permute(&[0]).unwrap(), t);

        let s = DenseTensor::from_vec(vec![3.0], &[]).unwrap();
        assert_eq!(s.permute(&[]).unwrap().data(), &[3.0]);
    }

    #[test]
    fn test_reshape_and_flatten() {
        let t = DenseTensor::from_vec((0..12).collect::<Vec<u32>>(), &[3, 4]).unwrap();
        let r = t.reshape(&[2, 2, 3]).unwrap();
        assert_eq!(r.data(), t.data());
        assert!(t.reshape(&[5]).is_err());
        assert_eq!(t.flatten().dims(), &[12]);
    }

    #[test]
    fn test_conj_transpose() {
        let m = DenseTensor::from_rows(&[
            vec![Complex::new(1.0, 2.0), Complex::new(0.0, -1.0)],
        ])
        .unwrap();
        let h = m.conj_transpose();
        assert_eq!(h.dims(), &[2, 1]);
        assert_eq!(h.data()[0], Complex::new(1.0, -2.0));
        assert_eq!(h.data()[1], Complex::new(0.0, 1.0));
    }
}
