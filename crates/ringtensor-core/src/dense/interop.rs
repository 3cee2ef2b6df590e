//! Conversions to and from `scirs2_core` ndarrays.

use super::types::DenseTensor;
use crate::error::{CoreError, CoreResult};
use crate::shape::Shape;
use scirs2_core::ndarray_ext::{Array, ArrayView, IxDyn};

impl<T: Clone> DenseTensor<T> {
    /// Copies an ndarray of any memory layout, in logical row-major order.
    pub fn from_array(array: &Array<T, IxDyn>) -> Self {
        let shape = Shape::new(array.shape());
        Self::from_parts_unchecked(shape, array.iter().cloned().collect())
    }

    pub fn to_array(&self) -> CoreResult<Array<T, IxDyn>> {
        Array::from_shape_vec(IxDyn(self.dims()), self.data.clone()).map_err(|e| {
            CoreError::InvalidShape(format!("cannot build ndarray of shape {}: {e}", self.shape))
        })
    }
}

impl<T> DenseTensor<T> {
    /// Borrowed ndarray view over the same buffer.
    pub fn view(&self) -> CoreResult<ArrayView<'_, T, IxDyn>> {
        ArrayView::from_shape(IxDyn(self.dims()), &self.data).map_err(|e| {
            CoreError::InvalidShape(format!("cannot view shape {}: {e}", self.shape))
        })
    }
}
