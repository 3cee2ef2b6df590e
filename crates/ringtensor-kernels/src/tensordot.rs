//! Tensor contraction by reduction to matrix multiplication.
//!
//! Contracting axes `a_axes` of `A` with `b_axes` of `B`:
//!
//! 1. permute `A` to (free axes, contracted axes) and `B` to
//!    (contracted axes, free axes), free axes keeping their relative order
//! 2. view the results as `(prod free_a) x (prod contracted)` and
//!    `(prod contracted) x (prod free_b)` matrices
//! 3. multiply with the dense dispatcher
//! 4. reshape to `free_a dims ++ free_b dims`
//!
//! A full contraction yields a single entry with shape `[1]`.
//!
//! ```
//! use ringtensor_core::DenseTensor;
//! use ringtensor_kernels::tensor_dot;
//!
//! let a = DenseTensor::from_vec((0..24).collect::<Vec<i64>>(), &[2, 3, 4]).unwrap();
//! let b = DenseTensor::from_vec((0..12).collect::<Vec<i64>>(), &[4, 3]).unwrap();
//!
//! let c = tensor_dot(&a, &b, &[1, 2], &[1, 0]).unwrap();
//! assert_eq!(c.dims(), &[2]);
//! ```

use crate::dispatch::matmul_with;
use crate::error::{KernelError, KernelResult};
use ringtensor_core::{ComputeConfig, CoreError, DenseTensor, Semiring};

/// Axis bookkeeping for one contraction, shared by the dense and sparse
/// implementations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractionPlan {
    /// Permutation bringing `A` to (free, contracted) order.
    pub a_perm: Vec<usize>,
    /// Permutation bringing `B` to (contracted, free) order.
    pub b_perm: Vec<usize>,
    pub free_a_dims: Vec<usize>,
    pub free_b_dims: Vec<usize>,
    /// Product of the free extents of `A` (rows of the left matrix).
    pub free_a_len: usize,
    /// Product of the contracted extents (inner dimension).
    pub contracted_len: usize,
    /// Product of the free extents of `B` (columns of the right matrix).
    pub free_b_len: usize,
}

impl ContractionPlan {
    /// Validates the axis lists and derives the permutations.
    pub fn new(
        a_dims: &[usize],
        b_dims: &[usize],
        a_axes: &[usize],
        b_axes: &[usize],
    ) -> KernelResult<Self> {
        if a_axes.len() != b_axes.len() {
            return Err(KernelError::invalid_axes(
                "tensor_dot",
                a_axes,
                a_dims.len(),
                format!(
                    "{} axes given for the left operand but {} for the right",
                    a_axes.len(),
                    b_axes.len()
                ),
            ));
        }
        check_axes(a_axes, a_dims.len())?;
        check_axes(b_axes, b_dims.len())?;
        for (&ax, &bx) in a_axes.iter().zip(b_axes) {
            if a_dims[ax] != b_dims[bx] {
                return Err(KernelError::dimension_mismatch(
                    "tensor_dot",
                    &[a_dims[ax]],
                    &[b_dims[bx]],
                    format!("left axis {ax} and right axis {bx} have different extents"),
                ));
            }
        }

        let free_a: Vec<usize> = (0..a_dims.len()).filter(|i| !a_axes.contains(i)).collect();
        let free_b: Vec<usize> = (0..b_dims.len()).filter(|i| !b_axes.contains(i)).collect();

        let a_perm: Vec<usize> = free_a.iter().chain(a_axes).copied().collect();
        let b_perm: Vec<usize> = b_axes.iter().chain(free_b.iter()).copied().collect();
        let free_a_dims: Vec<usize> = free_a.iter().map(|&i| a_dims[i]).collect();
        let free_b_dims: Vec<usize> = free_b.iter().map(|&i| b_dims[i]).collect();

        let overflow = |dims: &[usize]| KernelError::from(CoreError::Overflow { shape: dims.to_vec() });
        let product = |dims: &[usize]| {
            dims.iter()
                .try_fold(1usize, |acc, &d| acc.checked_mul(d))
                .ok_or_else(|| overflow(dims))
        };
        let contracted: Vec<usize> = a_axes.iter().map(|&i| a_dims[i]).collect();

        Ok(Self {
            free_a_len: product(&free_a_dims)?,
            contracted_len: product(&contracted)?,
            free_b_len: product(&free_b_dims)?,
            a_perm,
            b_perm,
            free_a_dims,
            free_b_dims,
        })
    }

    /// Dims of the contraction result; `[1]` when nothing stays free.
    pub fn output_dims(&self) -> Vec<usize> {
        let mut dims: Vec<usize> = self
            .free_a_dims
            .iter()
            .chain(self.free_b_dims.iter())
            .copied()
            .collect();
        if dims.is_empty() {
            dims.push(1);
        }
        dims
    }
}

fn check_axes(axes: &[usize], rank: usize) -> KernelResult<()> {
    for (i, &axis) in axes.iter().enumerate() {
        if axis >= rank {
            return Err(KernelError::invalid_axes(
                "tensor_dot",
                axes,
                rank,
                format!("axis {axis} out of range"),
            ));
        }
        if axes[..i].contains(&axis) {
            return Err(KernelError::invalid_axes(
                "tensor_dot",
                axes,
                rank,
                format!("axis {axis} repeated"),
            ));
        }
    }
    Ok(())
}

fn is_identity(perm: &[usize]) -> bool {
    perm.iter().enumerate().all(|(i, &p)| i == p)
}

/// Contracts `a_axes` of `a` with `b_axes` of `b` using the default config.
pub fn tensor_dot<T: Semiring>(
    a: &DenseTensor<T>,
    b: &DenseTensor<T>,
    a_axes: &[usize],
    b_axes: &[usize],
) -> KernelResult<DenseTensor<T>> {
    tensor_dot_with(a, b, a_axes, b_axes, &ComputeConfig::default())
}

pub fn tensor_dot_with<T: Semiring>(
    a: &DenseTensor<T>,
    b: &DenseTensor<T>,
    a_axes: &[usize],
    b_axes: &[usize],
    cfg: &ComputeConfig,
) -> KernelResult<DenseTensor<T>> {
    let plan = ContractionPlan::new(a.dims(), b.dims(), a_axes, b_axes)?;
    tracing::debug!(
        lhs = %a.shape(),
        rhs = %b.shape(),
        free_a = plan.free_a_len,
        inner = plan.contracted_len,
        free_b = plan.free_b_len,
        "dense tensor_dot"
    );

    let a_mat = if is_identity(&plan.a_perm) {
        a.reshape(&[plan.free_a_len, plan.contracted_len])?
    } else {
        a.permute(&plan.a_perm)?
            .into_reshape(&[plan.free_a_len, plan.contracted_len])?
    };
    let b_mat = if is_identity(&plan.b_perm) {
        b.reshape(&[plan.contracted_len, plan.free_b_len])?
    } else {
        b.permute(&plan.b_perm)?
            .into_reshape(&[plan.contracted_len, plan.free_b_len])?
    };

    let product = matmul_with(&a_mat, &b_mat, cfg)?;
    Ok(product.into_reshape(&plan.output_dims())?)
}

/// Full contraction of two equally shaped tensors: `sum(a * b)`.
pub fn tensor_inner<T: Semiring>(a: &DenseTensor<T>, b: &DenseTensor<T>) -> KernelResult<T> {
    if a.shape() != b.shape() {
        return Err(KernelError::dimension_mismatch(
            "tensor_inner",
            a.dims(),
            b.dims(),
            "operands must have identical shapes",
        ));
    }
    let mut acc = T::zero();
    for (x, y) in a.data().iter().zip(b.data()) {
        acc.fma_assign(x, y);
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::matmul;

    #[test]
    fn test_plan_axes() {
        let plan = ContractionPlan::new(&[2, 3, 4], &[4, 3, 5], &[1, 2], &[1, 0]).unwrap();
        assert_eq!(plan.a_perm, vec![0, 1, 2]);
        assert_eq!(plan.b_perm, vec![1, 0, 2]);
        assert_eq!(plan.free_a_len, 2);
        assert_eq!(plan.contracted_len, 12);
        assert_eq!(plan.free_b_len, 5);
        assert_eq!(plan.output_dims(), vec![2, 5]);
    }

    #[test]
    fn test_plan_rejects_bad_axes() {
        assert!(ContractionPlan::new(&[2, 3], &[3, 2], &[0], &[0, 1]).is_err());
        assert!(ContractionPlan::new(&[2, 3], &[3, 2], &[2], &[0]).is_err());
        assert!(ContractionPlan::new(&[2, 3], &[3, 2], &[1, 1], &[0, 0]).is_err());
        assert!(matches!(
            ContractionPlan::new(&[2, 3], &[3, 2], &[0], &[0]),
            Err(KernelError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_single_axis_matches_matmul() {
        let a = DenseTensor::from_vec((0..6).collect::<Vec<i64>>(), &[2, 3]).unwrap();
        let b = DenseTensor::from_vec((0..12).map(|v| 2 * v - 5).collect::<Vec<i64>>(), &[3, 4]).unwrap();
        assert_eq!(tensor_dot(&a, &b, &[1], &[0]).unwrap(), matmul(&a, &b).unwrap());
    }

    #[test]
    fn test_rank3_against_loops() {
        let a = DenseTensor::from_vec((0..24).collect::<Vec<i64>>(), &[2, 3, 4]).unwrap();
        let b = DenseTensor::from_vec((0..60).map(|v| v % 7).collect::<Vec<i64>>(), &[4, 3, 5]).unwrap();
        let c = tensor_dot(&a, &b, &[1, 2], &[1, 0]).unwrap();
        assert_eq!(c.dims(), &[2, 5]);
        for i in 0..2 {
            for m in 0..5 {
                let mut expected = 0;
                for j in 0..3 {
                    for k in 0..4 {
                        expected += a[&[i, j, k]] * b[&[k, j, m]];
                    }
                }
                assert_eq!(c[&[i, m]], expected);
            }
        }
    }

    #[test]
    fn test_full_contraction_is_shape_one() {
        let a = DenseTensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
        let c = tensor_dot(&a, &a, &[0, 1], &[0, 1]).unwrap();
        assert_eq!(c.dims(), &[1]);
        assert_eq!(c.data(), &[30.0]);
        assert_eq!(tensor_inner(&a, &a).unwrap(), 30.0);
    }

    #[test]
    fn test_outer_product() {
        let x = DenseTensor::from_vec(vec![1, 2], &[2]).unwrap();
        let y = DenseTensor::from_vec(vec![3, 4, 5], &[3]).unwrap();
        let c = tensor_dot(&x, &y, &[], &[]).unwrap();
        assert_eq!(c.dims(), &[2, 3]);
        assert_eq!(c.data(), &[3, 4, 5, 6, 8, 10]);
    }

    #[test]
    fn test_rank1_result() {
        let m = DenseTensor::from_vec(vec![1, 2, 3, 4, 5, 6], &[2, 3]).unwrap();
        let v = DenseTensor::from_vec(vec![1, 0, 1], &[3]).unwrap();
        let c = tensor_dot(&m, &v, &[1], &[0]).unwrap();
        assert_eq!(c.dims(), &[2]);
        assert_eq!(c.data(), &[4, 10]);
    }
}
