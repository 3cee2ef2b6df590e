//! Kernel selection and validated entry points for dense products.
//!
//! Selection compares the left operand's entry count with the concurrency
//! thresholds of [`ComputeConfig`] (sequential below, concurrent above) and
//! switches to a tiled kernel once the largest dimension reaches
//! `blocked_threshold`. Small problems use the i-k-j ("reordered") kernel,
//! which has unit stride in its inner loop. A kernel forced through the
//! config always wins.
//!
//! # Examples
//!
//! ```
//! use ringtensor_core::{ComputeConfig, DenseTensor, MatMulAlgorithm};
//! use ringtensor_kernels::{matmul_with, select_matmul};
//!
//! let a = DenseTensor::from_vec(vec![1, 2, 3, 4], &[2, 2]).unwrap();
//! let b = DenseTensor::<i32>::identity(2).unwrap();
//! let cfg = ComputeConfig::default();
//!
//! assert_eq!(select_matmul(a.shape(), b.shape(), &cfg), MatMulAlgorithm::Reordered);
//! assert_eq!(matmul_with(&a, &b, &cfg).unwrap(), a);
//! ```

use crate::error::{KernelError, KernelResult};
use ringtensor_core::{
    ComputeConfig, DenseTensor, MatMulAlgorithm, MatVecAlgorithm, MultTransposeAlgorithm,
    Semiring, Shape,
};

/// Picks the matrix-matrix kernel for `a_shape x b_shape`.
pub fn select_matmul(a_shape: &Shape, b_shape: &Shape, cfg: &ComputeConfig) -> MatMulAlgorithm {
    if let Some(forced) = cfg.matmul_algorithm {
        return forced;
    }
    let (rows1, cols1, cols2) = (a_shape.dim(0), a_shape.dim(1), b_shape.dim(1));
    let concurrent = rows1 > 1 && rows1.saturating_mul(cols1) > cfg.matmul_concurrent_threshold;
    let blocked = rows1.max(cols1).max(cols2) >= cfg.blocked_threshold;

    match (concurrent, blocked) {
        (false, false) => MatMulAlgorithm::Reordered,
        (false, true) => MatMulAlgorithm::BlockedReordered,
        (true, false) => MatMulAlgorithm::ConcurrentReordered,
        (true, true) => MatMulAlgorithm::ConcurrentBlockedReordered,
    }
}

/// Picks the matrix-vector kernel for an `a_shape` matrix.
pub fn select_matvec(a_shape: &Shape, cfg: &ComputeConfig) -> MatVecAlgorithm {
    if let Some(forced) = cfg.matvec_algorithm {
        return forced;
    }
    let (rows, cols) = (a_shape.dim(0), a_shape.dim(1));
    let concurrent = rows > 1 && rows.saturating_mul(cols) > cfg.matvec_concurrent_threshold;
    let blocked = cols >= cfg.blocked_threshold;

    match (concurrent, blocked) {
        (false, false) => MatVecAlgorithm::StandardVector,
        (false, true) => MatVecAlgorithm::BlockedVector,
        (true, false) => MatVecAlgorithm::ConcurrentStandardVector,
        (true, true) => MatVecAlgorithm::ConcurrentBlockedVector,
    }
}

/// Picks the `A * B^T` kernel.
pub fn select_mult_transpose(
    a_shape: &Shape,
    b_shape: &Shape,
    cfg: &ComputeConfig,
) -> MultTransposeAlgorithm {
    if let Some(forced) = cfg.mult_transpose_algorithm {
        return forced;
    }
    let (rows1, inner, rows2) = (a_shape.dim(0), a_shape.dim(1), b_shape.dim(0));
    let concurrent = rows1 > 1 && rows1.saturating_mul(inner) > cfg.matmul_concurrent_threshold;
    let blocked = rows1.max(inner).max(rows2) >= cfg.blocked_threshold;

    match (concurrent, blocked) {
        (false, false) => MultTransposeAlgorithm::MultTranspose,
        (false, true) => MultTransposeAlgorithm::MultTransposeBlocked,
        (true, false) => MultTransposeAlgorithm::MultTransposeConcurrent,
        (true, true) => MultTransposeAlgorithm::MultTransposeBlockedConcurrent,
    }
}

/// Runs a specific matrix-matrix kernel. Shapes are trusted.
pub fn run_matmul<T: Semiring>(
    algorithm: MatMulAlgorithm,
    a: &[T],
    a_shape: &Shape,
    b: &[T],
    b_shape: &Shape,
    block: usize,
) -> Vec<T> {
    match algorithm {
        MatMulAlgorithm::Standard => crate::matmul::standard(a, a_shape, b, b_shape),
        MatMulAlgorithm::Reordered => crate::matmul::reordered(a, a_shape, b, b_shape),
        MatMulAlgorithm::Blocked => crate::matmul::blocked(a, a_shape, b, b_shape, block),
        MatMulAlgorithm::BlockedReordered => {
            crate::matmul::blocked_reordered(a, a_shape, b, b_shape, block)
        }
        MatMulAlgorithm::ConcurrentStandard => crate::matmul::concurrent_standard(a, a_shape, b, b_shape),
        MatMulAlgorithm::ConcurrentReordered => {
            crate::matmul::concurrent_reordered(a, a_shape, b, b_shape)
        }
        MatMulAlgorithm::ConcurrentBlocked => {
            crate::matmul::concurrent_blocked(a, a_shape, b, b_shape, block)
        }
        MatMulAlgorithm::ConcurrentBlockedReordered => {
            crate::matmul::concurrent_blocked_reordered(a, a_shape, b, b_shape, block)
        }
    }
}

pub fn run_matvec<T: Semiring>(
    algorithm: MatVecAlgorithm,
    a: &[T],
    a_shape: &Shape,
    x: &[T],
    block: usize,
) -> Vec<T> {
    match algorithm {
        MatVecAlgorithm::StandardVector => crate::matvec::standard_vector(a, a_shape, x),
        MatVecAlgorithm::BlockedVector => crate::matvec::blocked_vector(a, a_shape, x, block),
        MatVecAlgorithm::ConcurrentStandardVector => {
            crate::matvec::concurrent_standard_vector(a, a_shape, x)
        }
        MatVecAlgorithm::ConcurrentBlockedVector => {
            crate::matvec::concurrent_blocked_vector(a, a_shape, x, block)
        }
    }
}

pub fn run_mult_transpose<T: Semiring>(
    algorithm: MultTransposeAlgorithm,
    a: &[T],
    a_shape: &Shape,
    b: &[T],
    b_shape: &Shape,
    block: usize,
) -> Vec<T> {
    match algorithm {
        MultTransposeAlgorithm::MultTranspose => {
            crate::mult_transpose::mult_transpose(a, a_shape, b, b_shape)
        }
        MultTransposeAlgorithm::MultTransposeBlocked => {
            crate::mult_transpose::mult_transpose_blocked(a, a_shape, b, b_shape, block)
        }
        MultTransposeAlgorithm::MultTransposeConcurrent => {
            crate::mult_transpose::mult_transpose_concurrent(a, a_shape, b, b_shape)
        }
        MultTransposeAlgorithm::MultTransposeBlockedConcurrent => {
            crate::mult_transpose::mult_transpose_blocked_concurrent(a, a_shape, b, b_shape, block)
        }
    }
}

fn ensure_matrix<T>(operation: &'static str, t: &DenseTensor<T>) -> KernelResult<()> {
    if t.is_matrix() {
        Ok(())
    } else {
        Err(KernelError::dimension_mismatch(
            operation,
            &[t.nrows(), t.ncols()],
            t.dims(),
            "operand must be a matrix",
        ))
    }
}

/// Matrix product with the default configuration.
pub fn matmul<T: Semiring>(a: &DenseTensor<T>, b: &DenseTensor<T>) -> KernelResult<DenseTensor<T>> {
    matmul_with(a, b, &ComputeConfig::default())
}

/// Matrix product `a x b`, validated and dispatched according to `cfg`.
pub fn matmul_with<T: Semiring>(
    a: &DenseTensor<T>,
    b: &DenseTensor<T>,
    cfg: &ComputeConfig,
) -> KernelResult<DenseTensor<T>> {
    ensure_matrix("matmul", a)?;
    ensure_matrix("matmul", b)?;
    if a.ncols() != b.nrows() {
        return Err(KernelError::dimension_mismatch(
            "matmul",
            &[a.ncols(), b.ncols()],
            b.dims(),
            format!("left operand has shape {}", a.shape()),
        ));
    }
    let out_shape = Shape::matrix(a.nrows(), b.ncols());
    out_shape.total_entries()?;

    let algorithm = select_matmul(a.shape(), b.shape(), cfg);
    tracing::debug!(
        %algorithm,
        lhs = %a.shape(),
        rhs = %b.shape(),
        "dense matmul"
    );
    let data = run_matmul(algorithm, a.data(), a.shape(), b.data(), b.shape(), cfg.block_size);
    Ok(DenseTensor::from_parts(out_shape, data)?)
}

pub fn matvec<T: Semiring>(a: &DenseTensor<T>, x: &DenseTensor<T>) -> KernelResult<DenseTensor<T>> {
    matvec_with(a, x, &ComputeConfig::default())
}

/// Matrix-vector product `a x x`.
pub fn matvec_with<T: Semiring>(
    a: &DenseTensor<T>,
    x: &DenseTensor<T>,
    cfg: &ComputeConfig,
) -> KernelResult<DenseTensor<T>> {
    ensure_matrix("matvec", a)?;
    if !x.is_vector() || x.len() != a.ncols() {
        return Err(KernelError::dimension_mismatch(
            "matvec",
            &[a.ncols()],
            x.dims(),
            format!("matrix has shape {}", a.shape()),
        ));
    }
    let algorithm = select_matvec(a.shape(), cfg);
    tracing::debug!(%algorithm, lhs = %a.shape(), "dense matvec");
    let data = run_matvec(algorithm, a.data(), a.shape(), x.data(), cfg.block_size);
    Ok(DenseTensor::from_parts(Shape::vector(a.nrows()), data)?)
}

pub fn mult_transpose<T: Semiring>(
    a: &DenseTensor<T>,
    b: &DenseTensor<T>,
) -> KernelResult<DenseTensor<T>> {
    mult_transpose_with(a, b, &ComputeConfig::default())
}

/// `a x b^T` without building the transpose of `b`.
pub fn mult_transpose_with<T: Semiring>(
    a: &DenseTensor<T>,
    b: &DenseTensor<T>,
    cfg: &ComputeConfig,
) -> KernelResult<DenseTensor<T>> {
    ensure_matrix("mult_transpose", a)?;
    ensure_matrix("mult_transpose", b)?;
    if a.ncols() != b.ncols() {
        return Err(KernelError::dimension_mismatch(
            "mult_transpose",
            &[b.nrows(), a.ncols()],
            b.dims(),
            "operands must have the same number of columns",
        ));
    }
    let out_shape = Shape::matrix(a.nrows(), b.nrows());
    out_shape.total_entries()?;

    let algorithm = select_mult_transpose(a.shape(), b.shape(), cfg);
    tracing::debug!(%algorithm, lhs = %a.shape(), rhs = %b.shape(), "dense mult_transpose");
    let data = run_mult_transpose(algorithm, a.data(), a.shape(), b.data(), b.shape(), cfg.block_size);
    Ok(DenseTensor::from_parts(out_shape, data)?)
}

/// Method syntax for the dense products.
pub trait DenseProduct<T: Semiring> {
    fn matmul(&self, rhs: &DenseTensor<T>) -> KernelResult<DenseTensor<T>>;
    fn matvec(&self, x: &DenseTensor<T>) -> KernelResult<DenseTensor<T>>;
    fn mult_transpose(&self, rhs: &DenseTensor<T>) -> KernelResult<DenseTensor<T>>;
}

impl<T: Semiring> DenseProduct<T> for DenseTensor<T> {
    fn matmul(&self, rhs: &DenseTensor<T>) -> KernelResult<DenseTensor<T>> {
        matmul(self, rhs)
    }

    fn matvec(&self, x: &DenseTensor<T>) -> KernelResult<DenseTensor<T>> {
        matvec(self, x)
    }

    fn mult_transpose(&self, rhs: &DenseTensor<T>) -> KernelResult<DenseTensor<T>> {
        mult_transpose(self, rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_small_and_forced() {
        let cfg = ComputeConfig::default();
        let s = Shape::matrix(10, 10);
        assert_eq!(select_matmul(&s, &s, &cfg), MatMulAlgorithm::Reordered);

        let forced = cfg.clone().force_matmul(MatMulAlgorithm::Blocked);
        assert_eq!(select_matmul(&s, &s, &forced), MatMulAlgorithm::Blocked);
    }

    #[test]
    fn test_selection_thresholds() {
        let cfg = ComputeConfig::new()
            .matmul_concurrent_threshold(100)
            .blocked_threshold(50);
        let small = Shape::matrix(5, 5);
        let tall = Shape::matrix(40, 5);
        let wide = Shape::matrix(5, 60);

        assert_eq!(select_matmul(&small, &small, &cfg), MatMulAlgorithm::Reordered);
        assert_eq!(select_matmul(&tall, &small, &cfg), MatMulAlgorithm::ConcurrentReordered);
        assert_eq!(
            select_matmul(&small, &wide, &cfg),
            MatMulAlgorithm::BlockedReordered
        );
        assert_eq!(
            select_matmul(&Shape::matrix(60, 60), &Shape::matrix(60, 2), &cfg),
            MatMulAlgorithm::ConcurrentBlockedReordered
        );
        // a single left row never fans out
        assert_eq!(
            select_matmul(&Shape::matrix(1, 1000), &Shape::matrix(1000, 1), &cfg.clone().blocked_threshold(usize::MAX)),
            MatMulAlgorithm::Reordered
        );
    }

    #[test]
    fn test_matvec_selection() {
        let cfg = ComputeConfig::new()
            .matvec_concurrent_threshold(10)
            .blocked_threshold(8);
        assert_eq!(select_matvec(&Shape::matrix(2, 2), &cfg), MatVecAlgorithm::StandardVector);
        assert_eq!(select_matvec(&Shape::matrix(1, 9), &cfg), MatVecAlgorithm::BlockedVector);
        assert_eq!(
            select_matvec(&Shape::matrix(6, 3), &cfg),
            MatVecAlgorithm::ConcurrentStandardVector
        );
        assert_eq!(
            select_matvec(&Shape::matrix(6, 9), &cfg),
            MatVecAlgorithm::ConcurrentBlockedVector
        );
    }

    #[test]
    fn test_matmul_shape_mismatch() {
        let a = DenseTensor::<f64>::zeros(&[2, 3]).unwrap();
        let b = DenseTensor::<f64>::zeros(&[2, 3]).unwrap();
        assert!(matches!(
            matmul(&a, &b),
            Err(KernelError::DimensionMismatch { operation: "matmul", .. })
        ));

        let v = DenseTensor::<f64>::zeros(&[3]).unwrap();
        assert!(matmul(&a, &v).is_err());
        assert!(matvec(&a, &DenseTensor::<f64>::zeros(&[2]).unwrap()).is_err());
        assert!(mult_transpose(&a, &DenseTensor::<f64>::zeros(&[3, 2]).unwrap()).is_err());
    }

    #[test]
    fn test_identity_times_vector_every_kernel() {
        let eye = DenseTensor::<i32>::identity(3).unwrap();
        let x = DenseTensor::from_vec(vec![4, 5, 6], &[3]).unwrap();
        for algorithm in MatVecAlgorithm::ALL {
            let cfg = ComputeConfig::new().block_size(2).force_matvec(algorithm);
            assert_eq!(matvec_with(&eye, &x, &cfg).unwrap(), x);
        }

        let col = x.reshape(&[3, 1]).unwrap();
        for algorithm in MatMulAlgorithm::ALL {
            let cfg = ComputeConfig::new().block_size(2).force_matmul(algorithm);
            assert_eq!(matmul_with(&eye, &col, &cfg).unwrap(), col);
        }
    }

    #[test]
    fn test_mult_transpose_equals_matmul_of_transpose() {
        let a = DenseTensor::from_vec((0..6).collect::<Vec<i64>>(), &[2, 3]).unwrap();
        let b = DenseTensor::from_vec((0..12).map(|v| v - 6).collect::<Vec<i64>>(), &[4, 3]).unwrap();
        let expected = a.matmul(&b.transpose()).unwrap();
        for algorithm in MultTransposeAlgorithm::ALL {
            let data = run_mult_transpose(algorithm, a.data(), a.shape(), b.data(), b.shape(), 2);
            assert_eq!(data, expected.data());

            let cfg = ComputeConfig::new().block_size(2).force_mult_transpose(algorithm);
            assert_eq!(select_mult_transpose(a.shape(), b.shape(), &cfg), algorithm);
            assert_eq!(mult_transpose_with(&a, &b, &cfg).unwrap(), expected);
        }
        assert_eq!(a.mult_transpose(&b).unwrap(), expected);
    }
}
