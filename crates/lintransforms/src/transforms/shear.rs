use ndarray::{ArrayD, Axis};

use super::Transformation;
use crate::error::TransformError;

/// Shear along `source_axis`: the first lane of that axis receives `factor`
/// times the second lane.
///
/// The axes are ordered so `(axis, source_axis)` are trailing before the
/// lanes are combined, and the result is returned in the input's axis order.
#[derive(Debug, Clone, Copy)]
pub struct Shear {
    factor: f64,
    axis: usize,
    source_axis: usize,
}

impl Shear {
    /// Create a shear.
    ///
    /// # Arguments
    ///
    /// * `factor` - The shear factor.
    /// * `axis` - The axis ordered before `source_axis`.
    /// * `source_axis` - The axis whose lanes are combined. Must have length >= 2.
    pub fn new(factor: f64, axis: usize, source_axis: usize) -> Self {
        Self {
            factor,
            axis,
            source_axis,
        }
    }

    fn validate(&self, shape: &[usize]) -> Result<(), TransformError> {
        let ndim = shape.len();
        for axis in [self.axis, self.source_axis] {
            if axis >= ndim {
                return Err(TransformError::InvalidAxis { axis, ndim });
            }
        }
        if self.axis == self.source_axis {
            return Err(TransformError::DuplicateAxis(self.axis));
        }
        let len = shape[self.source_axis];
        if len < 2 {
            return Err(TransformError::AxisTooShort {
                axis: self.source_axis,
                len,
                min: 2,
            });
        }
        Ok(())
    }
}

impl Transformation for Shear {
    fn name(&self) -> String {
        format!(
            "Shear(factor={:?}, axis={}, source_axis={})",
            self.factor, self.axis, self.source_axis
        )
    }

    fn apply(&self, x: &ArrayD<f64>) -> Result<ArrayD<f64>, TransformError> {
        self.validate(x.shape())?;

        let ndim = x.ndim();
        let mut order = (0..ndim)
            .filter(|&a| a != self.axis && a != self.source_axis)
            .collect::<Vec<_>>();
        order.extend([self.axis, self.source_axis]);

        // mutate through a permuted view so `out` keeps the input's axis order
        let mut out = x.to_owned();
        let mut permuted = out.view_mut().permuted_axes(order);
        let last = Axis(ndim - 1);
        let source = permuted.index_axis(last, 1).to_owned();
        permuted
            .index_axis_mut(last, 0)
            .scaled_add(self.factor, &source);

        Ok(out)
    }
}
