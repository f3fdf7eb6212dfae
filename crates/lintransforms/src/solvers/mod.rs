use ndarray::Array2;

use crate::error::SolverError;

mod direct;
mod mlp;
mod regularized;

pub use direct::{Exact, LeastSquares, OrthogonalProjection, PseudoInverse};
pub use mlp::{Mlp, MlpConfig};
pub use regularized::{MultiTaskLasso, Ridge};

/// Fits a transformation matrix from paired inputs and outputs.
pub trait Solver: Send + Sync {
    /// Human readable name of the solver.
    ///
    /// Results of [`crate::Pipeline::solve`] are keyed by this name.
    fn name(&self) -> String;

    /// Solve for the transformation mapping `x` to `y`.
    ///
    /// # Arguments
    ///
    /// * `x` - The inputs with shape (n_samples, n_features).
    /// * `y` - The outputs with shape (n_samples, n_targets).
    fn solve(&self, x: &Array2<f64>, y: &Array2<f64>) -> Result<Array2<f64>, SolverError>;
}

impl<T: Solver + ?Sized> Solver for Box<T> {
    fn name(&self) -> String {
        (**self).name()
    }

    fn solve(&self, x: &Array2<f64>, y: &Array2<f64>) -> Result<Array2<f64>, SolverError> {
        (**self).solve(x, y)
    }
}

/// Check that a regularisation strength is finite and non-negative.
pub(crate) fn validate_alpha(alpha: f64) -> Result<(), SolverError> {
    if !alpha.is_finite() || alpha < 0.0 {
        return Err(SolverError::InvalidConfig(format!(
            "alpha must be finite and non-negative, got {alpha}"
        )));
    }
    Ok(())
}
