//! Checked element access, slicing and row/column swaps.

use super::types::DenseTensor;
use crate::error::{CoreError, CoreResult};
use crate::scalar::Semiring;
use crate::shape::Shape;
use std::ops::Range;

impl<T> DenseTensor<T> {
    /// Entry at `index`, bounds checked.
    pub fn get(&self, index: &[usize]) -> CoreResult<&T> {
        let flat = self.shape.flat_index(index)?;
        Ok(&self.data[flat])
    }

    /// Overwrites the entry at `index`. Nothing is written when the index is
    /// out of bounds.
    pub fn set(&mut self, index: &[usize], value: T) -> CoreResult<()> {
        let flat = self.shape.flat_index(index)?;
        self.data[flat] = value;
        Ok(())
    }

    /// Exchanges rows `i` and `j` of a matrix in place.
    pub fn swap_rows(&mut self, i: usize, j: usize) -> CoreResult<()> {
        self.ensure_matrix("swap_rows")?;
        let (rows, cols) = (self.nrows(), self.ncols());
        if i >= rows || j >= rows {
            return Err(CoreError::out_of_bounds(&[i.max(j)], &[rows]));
        }
        if i == j {
            return Ok(());
        }
        let (lo, hi) = (i.min(j), i.max(j));
        let (head, tail) = self.data.split_at_mut(hi * cols);
        head[lo * cols..(lo + 1) * cols].swap_with_slice(&mut tail[..cols]);
        Ok(())
    }

    /// Exchanges columns `i` and `j` of a matrix in place.
    pub fn swap_cols(&mut self, i: usize, j: usize) -> CoreResult<()> {
        self.ensure_matrix("swap_cols")?;
        let cols = self.ncols();
        if i >= cols || j >= cols {
            return Err(CoreError::out_of_bounds(&[i.max(j)], &[cols]));
        }
        if i != j {
            for row in self.data.chunks_mut(cols) {
                row.swap(i, j);
            }
        }
        Ok(())
    }
}

impl<T: Clone> DenseTensor<T> {
    /// Row `i` of a matrix as a vector.
    pub fn row(&self, i: usize) -> CoreResult<DenseTensor<T>> {
        self.ensure_matrix("row")?;
        let cols = self.ncols();
        if i >= self.nrows() {
            return Err(CoreError::out_of_bounds(&[i], &[self.nrows()]));
        }
        Ok(Self::from_parts_unchecked(
            Shape::vector(cols),
            self.data[i * cols..(i + 1) * cols].to_vec(),
        ))
    }

    /// Column `j` of a matrix as a vector.
    pub fn col(&self, j: usize) -> CoreResult<DenseTensor<T>> {
        self.ensure_matrix("col")?;
        let cols = self.ncols();
        if j >= cols {
            return Err(CoreError::out_of_bounds(&[j], &[cols]));
        }
        let data: Vec<T> = self.data.iter().skip(j).step_by(cols).cloned().collect();
        Ok(Self::from_parts_unchecked(Shape::vector(data.len()), data))
    }

    /// Copy of the sub-matrix `rows x cols`.
    pub fn get_slice(&self, rows: Range<usize>, cols: Range<usize>) -> CoreResult<Self> {
        self.ensure_matrix("get_slice")?;
        self.check_window(&rows, &cols)?;
        let ncols = self.ncols();
        let mut data = Vec::with_capacity(rows.len() * cols.len());
        for r in rows.clone() {
            data.extend_from_slice(&self.data[r * ncols + cols.start..r * ncols + cols.end]);
        }
        Ok(Self::from_parts_unchecked(
            Shape::matrix(rows.len(), cols.len()),
            data,
        ))
    }

    /// Writes `values` into this matrix with its top-left corner at
    /// `(row, col)`. The whole window must fit.
    pub fn set_slice(&mut self, values: &DenseTensor<T>, row: usize, col: usize) -> CoreResult<()> {
        self.ensure_matrix("set_slice")?;
        values.ensure_matrix("set_slice")?;
        let (vr, vc) = (values.nrows(), values.ncols());
        let rows = row..row.saturating_add(vr);
        let cols = col..col.saturating_add(vc);
        self.check_window(&rows, &cols)?;

        let ncols = self.ncols();
        for (i, src) in values.data.chunks(vc.max(1)).take(vr).enumerate() {
            let start = (row + i) * ncols + col;
            self.data[start..start + vc].clone_from_slice(&src[..vc]);
        }
        Ok(())
    }

    fn check_window(&self, rows: &Range<usize>, cols: &Range<usize>) -> CoreResult<()> {
        if rows.start > rows.end
            || cols.start > cols.end
            || rows.end > self.nrows()
            || cols.end > self.ncols()
        {
            return Err(CoreError::out_of_bounds(
                &[rows.end, cols.end],
                self.dims(),
            ));
        }
        Ok(())
    }
}

impl<T: Semiring> DenseTensor<T> {
    /// Sum of the main diagonal of a square matrix.
    pub fn trace(&self) -> CoreResult<T> {
        if !self.is_square() {
            return Err(CoreError::InvalidShape(format!(
                "trace requires a square matrix, got shape {}",
                self.shape
            )));
        }
        let n = self.nrows();
        let mut acc = T::zero();
        for i in 0..n {
            acc.add_assign(&self.data[i * n + i]);
        }
        Ok(acc)
    }
}
