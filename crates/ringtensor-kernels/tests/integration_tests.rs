//! Integration tests for ringtensor-kernels with ringtensor-core
//!
//! These tests drive the dispatcher with dense tensors built through the core
//! crate, across scalar types and forced kernel choices.

use ringtensor_core::{
    ComputeConfig, DenseTensor, MatMulAlgorithm, MatVecAlgorithm, MultTransposeAlgorithm,
};
use ringtensor_kernels::{
    matmul, matmul_with, matvec, matvec_with, mult_transpose, run_mult_transpose, tensor_dot,
    tensor_inner, DenseProduct, KernelError,
};
use scirs2_core::num_complex::Complex;

#[test]
fn test_matmul_two_by_two() -> anyhow::Result<()> {
    let a = DenseTensor::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]])?;
    let b = DenseTensor::from_rows(&[vec![5.0, 6.0], vec![7.0, 8.0]])?;

    let c = matmul(&a, &b)?;
    assert_eq!(c.dims(), &[2, 2]);
    assert_eq!(c.data(), &[19.0, 22.0, 43.0, 50.0]);
    Ok(())
}

#[test]
fn test_every_forced_kernel_agrees() -> anyhow::Result<()> {
    let a = DenseTensor::from_vec((0..35).map(|x| x % 7 - 3).collect::<Vec<i64>>(), &[5, 7])?;
    let b = DenseTensor::from_vec((0..28).map(|x| x % 5 - 2).collect::<Vec<i64>>(), &[7, 4])?;
    let expected = matmul_with(&a, &b, &ComputeConfig::sequential())?;

    for algorithm in MatMulAlgorithm::ALL {
        let cfg = ComputeConfig::new().block_size(3).force_matmul(algorithm);
        assert_eq!(matmul_with(&a, &b, &cfg)?, expected, "{algorithm}");
    }

    let x = DenseTensor::from_vec(vec![1, -1, 2, 0, 3, -2, 1], &[7])?;
    let expected = matvec(&a, &x)?;
    for algorithm in MatVecAlgorithm::ALL {
        let cfg = ComputeConfig::new().block_size(2).force_matvec(algorithm);
        assert_eq!(matvec_with(&a, &x, &cfg)?, expected, "{algorithm}");
    }
    Ok(())
}

#[test]
fn test_mult_transpose_matches_explicit_transpose() -> anyhow::Result<()> {
    let a = DenseTensor::from_vec((0..12).collect::<Vec<i32>>(), &[3, 4])?;
    let b = DenseTensor::from_vec((0..20).map(|x| 10 - x).collect::<Vec<i32>>(), &[5, 4])?;
    let expected = matmul(&a, &b.transpose())?;

    assert_eq!(mult_transpose(&a, &b)?, expected);
    assert_eq!(a.mult_transpose(&b)?, expected);
    for algorithm in MultTransposeAlgorithm::ALL {
        let data = run_mult_transpose(algorithm, a.data(), a.shape(), b.data(), b.shape(), 2);
        assert_eq!(data, expected.data(), "{algorithm}");
    }
    Ok(())
}

#[test]
fn test_complex_matmul() -> anyhow::Result<()> {
    let i = Complex::new(0.0, 1.0);
    let one = Complex::new(1.0, 0.0);
    let a = DenseTensor::from_vec(vec![one, i, i, one], &[2, 2])?;

    // [[1, i], [i, 1]]^2 = [[0, 2i], [2i, 0]]
    let c = a.matmul(&a)?;
    assert_eq!(c.data(), &[Complex::new(0.0, 0.0), i + i, i + i, Complex::new(0.0, 0.0)]);
    Ok(())
}

#[test]
fn test_boolean_matmul_is_reachability() -> anyhow::Result<()> {
    // Edges 0 -> 1 -> 2
    let adj = DenseTensor::from_vec(
        vec![false, true, false, false, false, true, false, false, false],
        &[3, 3],
    )?;
    let two_steps = adj.matmul(&adj)?;
    assert_eq!(
        two_steps.data(),
        &[false, false, true, false, false, false, false, false, false]
    );
    Ok(())
}

#[test]
fn test_dimension_errors() {
    let a = DenseTensor::<f64>::zeros(&[2, 3]).unwrap();
    let b = DenseTensor::<f64>::zeros(&[2, 3]).unwrap();
    let cube = DenseTensor::<f64>::zeros(&[2, 2, 2]).unwrap();

    assert!(matches!(matmul(&a, &b), Err(KernelError::DimensionMismatch { .. })));
    assert!(matches!(matmul(&cube, &a), Err(KernelError::DimensionMismatch { .. })));
    assert!(matvec(&a, &DenseTensor::zeros(&[2]).unwrap()).is_err());
    assert!(mult_transpose(&a, &DenseTensor::zeros(&[3, 2]).unwrap()).is_err());
    assert!(mult_transpose(&a, &b).is_ok());
}

#[test]
fn test_zero_extent_products() -> anyhow::Result<()> {
    let a = DenseTensor::<i64>::zeros(&[3, 0])?;
    let b = DenseTensor::<i64>::zeros(&[0, 4])?;
    let c = matmul(&a, &b)?;
    assert_eq!(c.dims(), &[3, 4]);
    assert!(c.data().iter().all(|&v| v == 0));

    let empty = DenseTensor::<i64>::zeros(&[0, 5])?;
    let x = DenseTensor::from_vec(vec![1i64; 5], &[5])?;
    assert_eq!(matvec(&empty, &x)?.dims(), &[0]);
    Ok(())
}

#[test]
fn test_tensor_dot_workflow() -> anyhow::Result<()> {
    let a = DenseTensor::from_vec((0..24).collect::<Vec<i64>>(), &[2, 3, 4])?;
    let b = DenseTensor::from_vec((0..12).collect::<Vec<i64>>(), &[3, 4])?;

    let c = tensor_dot(&a, &b, &[1, 2], &[0, 1])?;
    assert_eq!(c.dims(), &[2]);
    let manual: Vec<i64> = (0..2)
        .map(|i| (0..12).map(|k| (i * 12 + k) * k).sum())
        .collect();
    assert_eq!(c.data(), manual.as_slice());

    let full = tensor_dot(&a, &a, &[0, 1, 2], &[0, 1, 2])?;
    assert_eq!(full.dims(), &[1]);
    assert_eq!(full.data()[0], tensor_inner(&a, &a)?);
    Ok(())
}

#[test]
fn test_tensor_dot_invalid_axes() {
    let a = DenseTensor::<f64>::zeros(&[2, 3]).unwrap();
    assert!(matches!(
        tensor_dot(&a, &a, &[0], &[1]),
        Err(KernelError::DimensionMismatch { .. })
    ));
    assert!(matches!(
        tensor_dot(&a, &a, &[0, 0], &[0, 1]),
        Err(KernelError::InvalidAxes { .. })
    ));
    assert!(matches!(
        tensor_dot(&a, &a, &[5], &[0]),
        Err(KernelError::InvalidAxes { .. })
    ));
}
