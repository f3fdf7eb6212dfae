use ndarray::{ArrayD, ArrayView2, IxDyn};

use crate::error::TransformError;

mod elementwise;
mod inverse;
mod matrix;
mod shear;

pub use elementwise::{Dilation, Identity, Reflection, Translation};
pub use inverse::Inverse;
pub use matrix::{Linear, Projection, Rotation};
pub use shear::Shear;

/// A transformation of an n-dimensional array.
///
/// Implementations never mutate their input.
pub trait Transformation: Send + Sync {
    /// Human readable name of the transformation.
    fn name(&self) -> String;

    /// Apply the transformation to `x` and return the result as a new array.
    fn apply(&self, x: &ArrayD<f64>) -> Result<ArrayD<f64>, TransformError>;
}

impl<T: Transformation + ?Sized> Transformation for Box<T> {
    fn name(&self) -> String {
        (**self).name()
    }

    fn apply(&self, x: &ArrayD<f64>) -> Result<ArrayD<f64>, TransformError> {
        (**self).apply(x)
    }
}

/// Contract the trailing axis of `x` with the rows of `m`.
///
/// An array of shape `[..., k]` times a `(k, n)` matrix gives `[..., n]`.
pub(crate) fn matmul_trailing(
    x: &ArrayD<f64>,
    m: ArrayView2<f64>,
) -> Result<ArrayD<f64>, TransformError> {
    let ndim = x.ndim();
    if ndim == 0 {
        return Err(TransformError::TooFewDimensions { min: 1, ndim });
    }

    let k = x.shape()[ndim - 1];
    if k != m.nrows() {
        return Err(TransformError::ShapeMismatch(
            x.shape().to_vec(),
            m.shape().to_vec(),
        ));
    }

    let lead = x.shape()[..ndim - 1].iter().product::<usize>();
    let flat = x.as_standard_layout().into_shape((lead, k))?;
    let out = flat.dot(&m);

    let mut out_shape = x.shape().to_vec();
    out_shape[ndim - 1] = m.ncols();

    Ok(out.into_shape(IxDyn(&out_shape))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array3};

    #[test]
    fn test_matmul_trailing_batched() -> Result<(), Box<dyn std::error::Error>> {
        let x = Array3::from_shape_fn((2, 3, 2), |(b, i, j)| (b * 6 + i * 2 + j) as f64).into_dyn();
        let m = array![[1.0, 0.0, 1.0], [0.0, 1.0, 1.0]];

        let out = matmul_trailing(&x, m.view())?;
        assert_eq!(out.shape(), &[2, 3, 3]);
        // row [2, 3] of the first batch
        assert_eq!(out[[0, 1, 0]], 2.0);
        assert_eq!(out[[0, 1, 1]], 3.0);
        assert_eq!(out[[0, 1, 2]], 5.0);
        // row [10, 11] of the second batch
        assert_eq!(out[[1, 2, 2]], 21.0);
        Ok(())
    }

    #[test]
    fn test_matmul_trailing_non_standard_layout() -> Result<(), Box<dyn std::error::Error>> {
        let x = array![[1.0, 2.0], [3.0, 4.0]].reversed_axes().into_dyn();
        let m = array![[1.0], [1.0]];
        let out = matmul_trailing(&x, m.view())?;
        assert_eq!(out, array![[4.0], [6.0]].into_dyn());
        Ok(())
    }

    #[test]
    fn test_matmul_trailing_rejects_scalar() {
        let x = ndarray::arr0(1.0).into_dyn();
        let m = array![[1.0]];
        assert!(matches!(
            matmul_trailing(&x, m.view()),
            Err(TransformError::TooFewDimensions { min: 1, ndim: 0 })
        ));
    }
}
