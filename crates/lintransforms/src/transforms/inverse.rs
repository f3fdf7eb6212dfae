use lintransforms_linalg::inv;
use ndarray::{Array3, ArrayD, Axis, IxDyn};

use super::Transformation;
use crate::error::TransformError;

/// Matrix inverse over the trailing two axes, batched over the leading ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inverse;

impl Transformation for Inverse {
    fn name(&self) -> String {
        "Inverse".to_string()
    }

    fn apply(&self, x: &ArrayD<f64>) -> Result<ArrayD<f64>, TransformError> {
        let ndim = x.ndim();
        if ndim < 2 {
            return Err(TransformError::TooFewDimensions { min: 2, ndim });
        }

        let (rows, cols) = (x.shape()[ndim - 2], x.shape()[ndim - 1]);
        if rows != cols {
            return Err(TransformError::NotSquare(rows, cols));
        }
        if rows == 0 {
            return Ok(x.clone());
        }

        let batch = x.shape()[..ndim - 2].iter().product::<usize>();
        let stacked = x.as_standard_layout().into_shape((batch, rows, cols))?;

        let mut out = Array3::<f64>::zeros((batch, rows, cols));
        for (src, mut dst) in stacked.outer_iter().zip(out.axis_iter_mut(Axis(0))) {
            dst.assign(&inv(src)?);
        }

        Ok(out.into_shape(IxDyn(x.shape()))?)
    }
}
