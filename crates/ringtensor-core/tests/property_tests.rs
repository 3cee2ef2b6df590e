//! Property-based tests for shapes and dense tensors

use proptest::prelude::*;
use ringtensor_core::{DenseTensor, Ring, Semiring, Shape};

fn dims_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(1usize..5, 1..=4)
}

/// Dims together with a permutation of their axes.
fn dims_and_perm() -> impl Strategy<Value = (Vec<usize>, Vec<usize>)> {
    dims_strategy().prop_flat_map(|dims| {
        let axes: Vec<usize> = (0..dims.len()).collect();
        (Just(dims), Just(axes).prop_shuffle())
    })
}

fn tensor_for(dims: &[usize]) -> DenseTensor<i64> {
    let total: usize = dims.iter().product();
    DenseTensor::from_vec((0..total as i64).collect(), dims).unwrap()
}

proptest! {
    /// Property: nd_index inverts flat_index over the whole shape
    #[test]
    fn prop_flat_nd_roundtrip(dims in dims_strategy()) {
        let shape = Shape::new(&dims);
        for flat in 0..shape.total_entries().unwrap() {
            let nd = shape.nd_index(flat).unwrap();
            prop_assert_eq!(shape.flat_index(&nd).unwrap(), flat);
        }
        let total = shape.total_entries().unwrap();
        prop_assert!(shape.nd_index(total).is_err());
    }

    /// Property: permuting by a permutation and then by its inverse is identity
    #[test]
    fn prop_permute_inverse((dims, perm) in dims_and_perm()) {
        let t = tensor_for(&dims);
        let mut inverse = vec![0; perm.len()];
        for (i, &p) in perm.iter().enumerate() {
            inverse[p] = i;
        }
        let permuted = t.permute(&perm).unwrap();
        let expected_shape = Shape::new(&dims).permute_axes(&perm).unwrap();
        prop_assert_eq!(permuted.dims(), expected_shape.dims());
        prop_assert_eq!(permuted.permute(&inverse).unwrap(), t);
    }

    /// Property: permute moves each entry to the permuted index
    #[test]
    fn prop_permute_moves_entries((dims, perm) in dims_and_perm()) {
        let t = tensor_for(&dims);
        let permuted = t.permute(&perm).unwrap();
        for flat in 0..t.len() {
            let idx = t.shape().nd_index(flat).unwrap();
            let moved: Vec<usize> = perm.iter().map(|&a| idx[a]).collect();
            prop_assert_eq!(permuted.get(&moved).unwrap(), t.get(&idx).unwrap());
        }
    }

    /// Property: reshape keeps row-major order
    #[test]
    fn prop_reshape_keeps_order(dims in dims_strategy()) {
        let t = tensor_for(&dims);
        let flat = t.reshape(&[t.len()]).unwrap();
        prop_assert_eq!(flat.data(), t.data());
        prop_assert!(t.reshape(&[t.len() + 1]).is_err());
    }

    /// Property: a - b + b = a and a + 0 = a with wrapping integers
    #[test]
    fn prop_ring_identities(
        a in prop::collection::vec(any::<i32>(), 12),
        b in prop::collection::vec(any::<i32>(), 12),
    ) {
        let ta = DenseTensor::from_vec(a, &[3, 4]).unwrap();
        let tb = DenseTensor::from_vec(b, &[3, 4]).unwrap();
        prop_assert_eq!(ta.sub(&tb).unwrap().add(&tb).unwrap(), ta.clone());
        prop_assert_eq!(ta.add(&DenseTensor::zeros(&[3, 4]).unwrap()).unwrap(), ta.clone());
        prop_assert_eq!(ta.elem_mult(&DenseTensor::ones(&[3, 4]).unwrap()).unwrap(), ta);
    }

    /// Property: scalar traits agree with native arithmetic
    #[test]
    fn prop_scalar_ops(a in -1000i64..1000, b in -1000i64..1000, c in -1000i64..1000) {
        prop_assert_eq!(Semiring::add(&a, &b), a + b);
        prop_assert_eq!(Semiring::mult(&a, &b), a * b);
        prop_assert_eq!(Ring::sub(&a, &b), a - b);
        prop_assert_eq!(a.add_inv(), -a);
        let mut acc = c;
        acc.fma_assign(&a, &b);
        prop_assert_eq!(acc, c + a * b);
    }
}
