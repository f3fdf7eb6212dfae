use ndarray::{Array1, ArrayD};

use super::Transformation;
use crate::error::TransformError;

/// The identity transformation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Transformation for Identity {
    fn name(&self) -> String {
        "Identity".to_string()
    }

    fn apply(&self, x: &ArrayD<f64>) -> Result<ArrayD<f64>, TransformError> {
        Ok(x.clone())
    }
}

/// Adds a fixed offset along the trailing axis.
#[derive(Debug, Clone)]
pub struct Translation {
    offset: Array1<f64>,
}

impl Translation {
    /// Create a translation by `offset`.
    pub fn new(offset: Array1<f64>) -> Self {
        Self { offset }
    }

    /// The offset added to every trailing lane.
    pub fn offset(&self) -> &Array1<f64> {
        &self.offset
    }
}

impl Transformation for Translation {
    fn name(&self) -> String {
        format!("Translation(offset={:?})", self.offset.to_vec())
    }

    fn apply(&self, x: &ArrayD<f64>) -> Result<ArrayD<f64>, TransformError> {
        if x.shape().last() != Some(&self.offset.len()) {
            return Err(TransformError::ShapeMismatch(
                x.shape().to_vec(),
                self.offset.shape().to_vec(),
            ));
        }

        let mut out = x.to_owned();
        out += &self.offset;
        Ok(out)
    }
}

/// Negates the array after checking that `axis` exists.
///
/// Only the validation depends on the axis: every element of the array is
/// negated.
#[derive(Debug, Clone, Copy)]
pub struct Reflection {
    axis: usize,
}

impl Reflection {
    /// Create a reflection about `axis`.
    pub fn new(axis: usize) -> Self {
        Self { axis }
    }

    /// The axis checked before reflecting.
    pub fn axis(&self) -> usize {
        self.axis
    }
}

impl Transformation for Reflection {
    fn name(&self) -> String {
        format!("Reflection(axis={})", self.axis)
    }

    fn apply(&self, x: &ArrayD<f64>) -> Result<ArrayD<f64>, TransformError> {
        if self.axis >= x.ndim() {
            return Err(TransformError::InvalidAxis {
                axis: self.axis,
                ndim: x.ndim(),
            });
        }

        Ok(x.mapv(|v| -v))
    }
}

/// Uniform scaling of every element.
#[derive(Debug, Clone, Copy)]
pub struct Dilation {
    factor: f64,
}

impl Dilation {
    /// Create a dilation by `factor`.
    pub fn new(factor: f64) -> Self {
        Self { factor }
    }

    /// The scale factor.
    pub fn factor(&self) -> f64 {
        self.factor
    }
}

impl Transformation for Dilation {
    fn name(&self) -> String {
        format!("Dilation(factor={:?})", self.factor)
    }

    fn apply(&self, x: &ArrayD<f64>) -> Result<ArrayD<f64>, TransformError> {
        Ok(x.mapv(|v| v * self.factor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_identity_copies() -> Result<(), TransformError> {
        let x = array![[1.0, 2.0], [3.0, 4.0]].into_dyn();
        assert_eq!(Identity.apply(&x)?, x);
        assert_eq!(Identity.name(), "Identity");
        Ok(())
    }

    #[test]
    fn test_translation() -> Result<(), TransformError> {
        let t = Translation::new(array![1.0, -1.0]);
        let x = array![[0.0, 0.0], [2.0, 3.0]].into_dyn();
        assert_eq!(t.apply(&x)?, array![[1.0, -1.0], [3.0, 2.0]].into_dyn());
        assert_eq!(t.name(), "Translation(offset=[1.0, -1.0])");

        let bad = array![[0.0, 0.0, 0.0]].into_dyn();
        assert!(matches!(
            t.apply(&bad),
            Err(TransformError::ShapeMismatch(_, _))
        ));
        Ok(())
    }

    #[test]
    fn test_reflection_negates_everything() -> Result<(), TransformError> {
        let x = array![[1.0, -2.0], [3.0, 0.5]].into_dyn();
        let out = Reflection::new(1).apply(&x)?;
        assert_eq!(out, array![[-1.0, 2.0], [-3.0, -0.5]].into_dyn());
        // the input is untouched
        assert_eq!(x[[0, 0]], 1.0);
        Ok(())
    }

    #[test]
    fn test_reflection_invalid_axis() {
        let x = array![1.0, 2.0].into_dyn();
        assert!(matches!(
            Reflection::new(1).apply(&x),
            Err(TransformError::InvalidAxis { axis: 1, ndim: 1 })
        ));
        assert_eq!(Reflection::new(3).name(), "Reflection(axis=3)");
    }

    #[test]
    fn test_dilation() -> Result<(), TransformError> {
        let d = Dilation::new(2.0);
        assert_eq!(d.name(), "Dilation(factor=2.0)");

        let x = array![[1.0, 2.5], [-3.0, 0.0]].into_dyn();
        let out = Dilation::new(0.5).apply(&d.apply(&x)?)?;
        for (a, b) in out.iter().zip(x.iter()) {
            assert_relative_eq!(a, b);
        }
        Ok(())
    }
}
