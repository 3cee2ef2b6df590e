//! Property-based tests for the dense kernels
//!
//! Integer entries with wrapping arithmetic make every kernel's result exact,
//! so all kernel variants must agree bit for bit.

use proptest::prelude::*;
use ringtensor_core::{
    ComputeConfig, DenseTensor, MatMulAlgorithm, MatVecAlgorithm, MultTransposeAlgorithm,
};
use ringtensor_kernels::{
    matmul, matmul_with, matvec, run_matmul, run_matvec, run_mult_transpose, tensor_dot,
};

fn matrix_strategy(
    max_rows: usize,
    max_cols: usize,
) -> impl Strategy<Value = DenseTensor<i64>> {
    (1..=max_rows, 1..=max_cols).prop_flat_map(|(r, c)| {
        prop::collection::vec(-50i64..50, r * c)
            .prop_map(move |data| DenseTensor::from_vec(data, &[r, c]).unwrap())
    })
}

/// A pair `(a, b)` with `a.ncols() == b.nrows()`.
fn product_pair() -> impl Strategy<Value = (DenseTensor<i64>, DenseTensor<i64>)> {
    (1usize..12, 1usize..12, 1usize..12).prop_flat_map(|(m, k, n)| {
        (
            prop::collection::vec(-50i64..50, m * k),
            prop::collection::vec(-50i64..50, k * n),
        )
            .prop_map(move |(a, b)| {
                (
                    DenseTensor::from_vec(a, &[m, k]).unwrap(),
                    DenseTensor::from_vec(b, &[k, n]).unwrap(),
                )
            })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: all matmul kernels agree for any block size
    #[test]
    fn prop_matmul_kernels_agree((a, b) in product_pair(), block in 1usize..8) {
        let reference = run_matmul(
            MatMulAlgorithm::Standard, a.data(), a.shape(), b.data(), b.shape(), block,
        );
        for algorithm in MatMulAlgorithm::ALL {
            let got = run_matmul(algorithm, a.data(), a.shape(), b.data(), b.shape(), block);
            prop_assert_eq!(&got, &reference, "{}", algorithm);
        }
    }

    /// Property: all matvec kernels agree with matmul against a column
    #[test]
    fn prop_matvec_kernels_agree(a in matrix_strategy(10, 10), block in 1usize..6) {
        let x: Vec<i64> = (0..a.ncols() as i64).map(|i| i - 3).collect();
        let column = DenseTensor::from_vec(x.clone(), &[a.ncols(), 1]).unwrap();
        let reference = matmul(&a, &column).unwrap().into_vec();
        for algorithm in MatVecAlgorithm::ALL {
            let got = run_matvec(algorithm, a.data(), a.shape(), &x, block);
            prop_assert_eq!(&got, &reference, "{}", algorithm);
        }
        let vector = DenseTensor::from_vec(x, &[a.ncols()]).unwrap();
        prop_assert_eq!(matvec(&a, &vector).unwrap().into_vec(), reference);
    }

    /// Property: A * B^T equals matmul with an explicit transpose
    #[test]
    fn prop_mult_transpose_agrees((a, bt) in product_pair(), block in 1usize..6) {
        let b = bt.transpose();
        let reference = matmul(&a, &bt).unwrap().into_vec();
        for algorithm in MultTransposeAlgorithm::ALL {
            let got = run_mult_transpose(algorithm, a.data(), a.shape(), b.data(), b.shape(), block);
            prop_assert_eq!(&got, &reference, "{}", algorithm);
        }
    }

    /// Property: dispatch never changes the result
    #[test]
    fn prop_dispatch_is_transparent((a, b) in product_pair(), threshold in 0usize..200) {
        let cfg = ComputeConfig::new()
            .matmul_concurrent_threshold(threshold)
            .blocked_threshold(threshold / 20 + 1)
            .block_size(3);
        prop_assert_eq!(
            matmul_with(&a, &b, &cfg).unwrap(),
            matmul_with(&a, &b, &ComputeConfig::sequential()).unwrap()
        );
    }

    /// Property: (A B)^T = B^T A^T
    #[test]
    fn prop_transpose_of_product((a, b) in product_pair()) {
        let lhs = matmul(&a, &b).unwrap().transpose();
        let rhs = matmul(&b.transpose(), &a.transpose()).unwrap();
        prop_assert_eq!(lhs, rhs);
    }

    /// Property: single-axis tensor_dot on matrices is matmul
    #[test]
    fn prop_tensor_dot_matches_matmul((a, b) in product_pair()) {
        prop_assert_eq!(tensor_dot(&a, &b, &[1], &[0]).unwrap(), matmul(&a, &b).unwrap());
        // contracting both transposed operands gives (A B)^T
        let swapped = tensor_dot(&b, &a, &[0], &[1]).unwrap();
        prop_assert_eq!(swapped, matmul(&a, &b).unwrap().transpose());
    }
}
