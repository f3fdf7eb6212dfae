use ndarray::{array, Array2, ArrayD};

use super::{matmul_trailing, Transformation};
use crate::error::TransformError;

/// Right-multiplication of the trailing axis by a matrix.
#[derive(Debug, Clone)]
pub struct Linear {
    matrix: Array2<f64>,
}

impl Linear {
    /// Create a linear map from a `(k, n)` matrix.
    pub fn new(matrix: Array2<f64>) -> Self {
        Self { matrix }
    }

    /// The transformation matrix.
    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }
}

impl Transformation for Linear {
    fn name(&self) -> String {
        let (r, c) = self.matrix.dim();
        format!("Linear(shape=({r}, {c}))")
    }

    fn apply(&self, x: &ArrayD<f64>) -> Result<ArrayD<f64>, TransformError> {
        matmul_trailing(x, self.matrix.view())
    }
}

/// Rotation by a square matrix, applied as `x · R`.
///
/// The matrix is not checked for orthogonality.
#[derive(Debug, Clone)]
pub struct Rotation {
    matrix: Array2<f64>,
}

impl Rotation {
    /// Create a rotation from a square matrix.
    ///
    /// # Errors
    ///
    /// [`TransformError::NotSquare`] if the matrix is not square.
    pub fn new(matrix: Array2<f64>) -> Result<Self, TransformError> {
        let (r, c) = matrix.dim();
        if r != c {
            return Err(TransformError::NotSquare(r, c));
        }
        Ok(Self { matrix })
    }

    /// Planar rotation by `angle` radians.
    pub fn from_angle(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            matrix: array![[c, -s], [s, c]],
        }
    }

    /// 3-D rotation of `angle` radians about `axis` (Rodrigues' formula).
    ///
    /// # Errors
    ///
    /// [`TransformError::InvalidParameter`] if the axis is the zero vector.
    pub fn from_axis_angle(axis: [f64; 3], angle: f64) -> Result<Self, TransformError> {
        let norm = axis.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm < 1e-10 {
            return Err(TransformError::InvalidParameter(
                "axis",
                "cannot compute a rotation about the zero vector".to_string(),
            ));
        }
        let [x, y, z] = axis.map(|v| v / norm);

        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;

        let matrix = array![
            [c + x * x * t, x * y * t - z * s, x * z * t + y * s],
            [x * y * t + z * s, c + y * y * t, y * z * t - x * s],
            [x * z * t - y * s, y * z * t + x * s, c + z * z * t],
        ];

        Ok(Self { matrix })
    }

    /// The rotation matrix.
    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    /// The rotation undoing this one, assuming the matrix is orthogonal.
    pub fn transposed(&self) -> Self {
        Self {
            matrix: self.matrix.t().to_owned(),
        }
    }
}

impl Transformation for Rotation {
    fn name(&self) -> String {
        "Rotation".to_string()
    }

    fn apply(&self, x: &ArrayD<f64>) -> Result<ArrayD<f64>, TransformError> {
        matmul_trailing(x, self.matrix.view())
    }
}

/// Projection by a `(r, c)` matrix `P`, applied as `x · Pᵗ`.
#[derive(Debug, Clone)]
pub struct Projection {
    matrix: Array2<f64>,
}

impl Projection {
    /// Create a projection from its matrix.
    pub fn new(matrix: Array2<f64>) -> Self {
        Self { matrix }
    }

    /// The projection matrix.
    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }
}

impl Transformation for Projection {
    fn name(&self) -> String {
        let (r, c) = self.matrix.dim();
        format!("Projection(shape=({r}, {c}))")
    }

    fn apply(&self, x: &ArrayD<f64>) -> Result<ArrayD<f64>, TransformError> {
        matmul_trailing(x, self.matrix.t())
    }
}
