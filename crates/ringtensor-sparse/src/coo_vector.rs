//! Sparse vectors in coordinate form.

use ringtensor_core::{CoreError, DenseTensor, Ring, Semiring, Shape};

use crate::convert::{accumulate_to_dense, nonzero_entries, scatter_to_dense};
use crate::coo::{CooError, CooTensor};
use crate::error::{SparseError, SparseResult};
use crate::merge::{
    coo_vector_add, coo_vector_elem_mult, coo_vector_inner, coo_vector_sub,
};
use crate::ops::{check_same_shape, SparseStorage};
use crate::search::{binary_search_range, decode_insertion_point};
use crate::sort::{apply_permutation, sorted_permutation};

/// Sparse vector of length `len`: sorted positions with their values.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CooVector<T> {
    indices: Vec<usize>,
    values: Vec<T>,
    shape: Shape,
}

impl<T: Clone> CooVector<T> {
    /// Validates lengths and bounds. Order is not checked; call
    /// [`sort_indices`](Self::sort_indices) on unsorted input.
    pub fn new(indices: Vec<usize>, values: Vec<T>, len: usize) -> Result<Self, CooError> {
        if indices.len() != values.len() {
            return Err(CooError::LengthMismatch {
                indices: indices.len(),
                values: values.len(),
            });
        }
        if let Some(&i) = indices.iter().find(|&&i| i >= len) {
            return Err(CooError::IndexOutOfBounds {
                index: vec![i],
                shape: vec![len],
            });
        }
        Ok(Self {
            indices,
            values,
            shape: Shape::vector(len),
        })
    }

    pub fn zeros(len: usize) -> Self {
        Self {
            indices: Vec::new(),
            values: Vec::new(),
            shape: Shape::vector(len),
        }
    }

    pub(crate) fn from_parts_unchecked(indices: Vec<usize>, values: Vec<T>, len: usize) -> Self {
        Self {
            indices,
            values,
            shape: Shape::vector(len),
        }
    }

    pub fn len(&self) -> usize {
        self.shape.dim(0)
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }

    pub fn into_parts(self) -> (Vec<usize>, Vec<T>) {
        (self.indices, self.values)
    }

    pub fn is_sorted(&self) -> bool {
        self.indices.windows(2).all(|w| w[0] <= w[1])
    }

    pub fn sort_indices(&mut self) {
        let perm = sorted_permutation(self.indices.len(), |i, j| {
            self.indices[i].cmp(&self.indices[j])
        });
        self.indices = apply_permutation(&self.indices, &perm);
        self.values = apply_permutation(&self.values, &perm);
    }

    /// Rank-1 coordinate tensor with the same entries.
    pub fn to_tensor(&self) -> CooTensor<T> {
        CooTensor::from_parts_unchecked(
            self.indices.iter().map(|&i| vec![i]).collect(),
            self.values.clone(),
            self.shape.clone(),
        )
    }

    fn check_position(&self, i: usize) -> SparseResult<()> {
        if i >= self.len() {
            return Err(SparseError::out_of_bounds(&[i], self.shape.dims()));
        }
        Ok(())
    }
}

impl<T: Semiring> CooVector<T> {
    /// Value at `i`, zero when no entry is stored.
    pub fn get(&self, i: usize) -> SparseResult<T> {
        self.check_position(i)?;
        let found = binary_search_range(&self.indices, 0, self.indices.len(), i);
        Ok(if found >= 0 {
            self.values[found as usize].clone()
        } else {
            T::zero()
        })
    }

    /// Overwrites the entry at `i`, inserting it in order when absent.
    pub fn set(&mut self, i: usize, value: T) -> SparseResult<()> {
        self.check_position(i)?;
        let found = binary_search_range(&self.indices, 0, self.indices.len(), i);
        if found >= 0 {
            self.values[found as usize] = value;
        } else {
            let at = decode_insertion_point(found);
            self.indices.insert(at, i);
            self.values.insert(at, value);
        }
        Ok(())
    }

    /// Sorts and sums entries sharing a position.
    pub fn coalesce(&mut self) {
        self.sort_indices();
        let mut indices: Vec<usize> = Vec::with_capacity(self.indices.len());
        let mut values: Vec<T> = Vec::with_capacity(self.values.len());
        for (&i, v) in self.indices.iter().zip(&self.values) {
            match (indices.last(), values.last_mut()) {
                (Some(&last), Some(acc)) if last == i => acc.add_assign(v),
                _ => {
                    indices.push(i);
                    values.push(v.clone());
                }
            }
        }
        self.indices = indices;
        self.values = values;
    }

    /// Removes explicitly stored zeros.
    pub fn drop_zeros(&mut self) {
        let indices = std::mem::take(&mut self.indices);
        let values = std::mem::take(&mut self.values);
        (self.indices, self.values) = indices
            .into_iter()
            .zip(values)
            .filter(|(_, v)| !v.is_zero())
            .unzip();
    }

    pub fn to_dense(&self) -> SparseResult<DenseTensor<T>> {
        let data = scatter_to_dense(&self.shape, self.indices.iter().copied().zip(&self.values))?;
        Ok(DenseTensor::from_parts(self.shape.clone(), data)?)
    }

    /// Non-zero entries of a rank-1 dense tensor.
    pub fn from_dense(dense: &DenseTensor<T>, sparsity_hint: f64) -> SparseResult<Self> {
        if !dense.is_vector() {
            return Err(CoreError::InvalidShape(format!(
                "from_dense requires a vector, got shape {}",
                dense.shape()
            ))
            .into());
        }
        let (indices, values) = nonzero_entries(dense.data(), sparsity_hint);
        Ok(Self::from_parts_unchecked(indices, values, dense.len()))
    }

    pub fn add(&self, other: &Self) -> SparseResult<Self> {
        check_same_shape("add", &self.shape, &other.shape)?;
        let (values, indices) =
            coo_vector_add(&self.values, &self.indices, &other.values, &other.indices);
        Ok(Self::from_parts_unchecked(indices, values, self.len()))
    }

    pub fn elem_mult(&self, other: &Self) -> SparseResult<Self> {
        check_same_shape("elem_mult", &self.shape, &other.shape)?;
        let (values, indices) =
            coo_vector_elem_mult(&self.values, &self.indices, &other.values, &other.indices);
        Ok(Self::from_parts_unchecked(indices, values, self.len()))
    }

    /// Sum of products over the positions stored in both vectors.
    pub fn inner(&self, other: &Self) -> SparseResult<T> {
        check_same_shape("inner", &self.shape, &other.shape)?;
        Ok(coo_vector_inner(
            &self.values,
            &self.indices,
            &other.values,
            &other.indices,
        ))
    }

    /// Dense `self + b` in every position.
    pub fn add_scalar(&self, b: &T) -> SparseResult<DenseTensor<T>> {
        let data = accumulate_to_dense(
            &self.shape,
            b.clone(),
            self.indices.iter().copied().zip(&self.values),
        )?;
        Ok(DenseTensor::from_parts(self.shape.clone(), data)?)
    }

    /// Scales every stored value; the sparsity pattern is unchanged.
    pub fn mult_scalar(&self, b: &T) -> Self {
        Self::from_parts_unchecked(
            self.indices.clone(),
            self.values.iter().map(|v| v.mult(b)).collect(),
            self.len(),
        )
    }
}

impl<T: Ring> CooVector<T> {
    pub fn sub(&self, other: &Self) -> SparseResult<Self> {
        check_same_shape("sub", &self.shape, &other.shape)?;
        let (values, indices) =
            coo_vector_sub(&self.values, &self.indices, &other.values, &other.indices);
        Ok(Self::from_parts_unchecked(indices, values, self.len()))
    }

    /// Dense `self - b`.
    pub fn sub_scalar(&self, b: &T) -> SparseResult<DenseTensor<T>> {
        self.add_scalar(&b.add_inv())
    }

    pub fn conj(&self) -> Self {
        Self::from_parts_unchecked(
            self.indices.clone(),
            self.values.iter().map(Ring::conj).collect(),
            self.len(),
        )
    }
}

impl<T: Semiring> SparseStorage for CooVector<T> {
    type Elem = T;

    fn dims(&self) -> &[usize] {
        self.shape.dims()
    }

    fn nnz(&self) -> usize {
        self.values.len()
    }

    fn to_dense(&self) -> SparseResult<DenseTensor<T>> {
        CooVector::to_dense(self)
    }
}
