use lintransforms_linalg::{
    multi_task_lasso, ridge, LassoOptions, RegressionFit, RidgeOptions,
};
use ndarray::Array2;

use super::{validate_alpha, Solver};
use crate::error::SolverError;

/// Ridge regression, `‖y − xW − b‖² + α‖W‖²`.
///
/// As a [`Solver`] it returns the coefficients with shape (n_targets, n_features).
#[derive(Debug, Clone)]
pub struct Ridge {
    alpha: f64,
    options: RidgeOptions,
}

impl Ridge {
    /// Create a ridge solver with default options.
    ///
    /// # Errors
    ///
    /// [`SolverError::InvalidConfig`] if `alpha` is negative or not finite.
    pub fn new(alpha: f64) -> Result<Self, SolverError> {
        Self::with_options(alpha, RidgeOptions::default())
    }

    /// Create a ridge solver with explicit options.
    pub fn with_options(alpha: f64, options: RidgeOptions) -> Result<Self, SolverError> {
        validate_alpha(alpha)?;
        Ok(Self { alpha, options })
    }

    /// Create a ridge solver with options parsed from a JSON object.
    ///
    /// Missing keys take their default value; unknown keys are rejected.
    ///
    /// ```
    /// use lintransforms::solvers::Ridge;
    ///
    /// let solver = Ridge::from_json(0.5, r#"{"fit_intercept": false, "solver": "svd"}"#)?;
    /// assert!(!solver.options().fit_intercept);
    /// assert!(Ridge::from_json(0.5, r#"{"normalize": true}"#).is_err());
    /// # Ok::<(), lintransforms::SolverError>(())
    /// ```
    pub fn from_json(alpha: f64, options: &str) -> Result<Self, SolverError> {
        Self::with_options(alpha, serde_json::from_str(options)?)
    }

    /// The regularisation strength.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// The fitting options.
    pub fn options(&self) -> &RidgeOptions {
        &self.options
    }

    /// Fit the model and return the coefficients together with the intercept.
    pub fn fit(&self, x: &Array2<f64>, y: &Array2<f64>) -> Result<RegressionFit, SolverError> {
        Ok(ridge(x.view(), y.view(), self.alpha, &self.options)?)
    }
}

impl Solver for Ridge {
    fn name(&self) -> String {
        format!("Ridge(alpha={:?})", self.alpha)
    }

    fn solve(&self, x: &Array2<f64>, y: &Array2<f64>) -> Result<Array2<f64>, SolverError> {
        Ok(self.fit(x, y)?.coef)
    }
}

/// Multi-task lasso, `(1/2n)‖Y − XW − b‖²_F + α‖W‖₂₁`.
///
/// The `ℓ2,1` penalty zeroes whole feature rows across all targets. As a
/// [`Solver`] it returns the coefficients with shape (n_targets, n_features).
#[derive(Debug, Clone)]
pub struct MultiTaskLasso {
    alpha: f64,
    options: LassoOptions,
}

impl MultiTaskLasso {
    /// Create a multi-task lasso solver with default options.
    pub fn new(alpha: f64) -> Result<Self, SolverError> {
        Self::with_options(alpha, LassoOptions::default())
    }

    /// Create a multi-task lasso solver with explicit options.
    ///
    /// # Errors
    ///
    /// [`SolverError::InvalidConfig`] if `alpha` is negative or not finite, or
    /// if `tol` is not positive.
    pub fn with_options(alpha: f64, options: LassoOptions) -> Result<Self, SolverError> {
        validate_alpha(alpha)?;
        if !(options.tol.is_finite() && options.tol > 0.0) {
            return Err(SolverError::InvalidConfig(format!(
                "tol must be positive and finite, got {}",
                options.tol
            )));
        }
        Ok(Self { alpha, options })
    }

    /// Create a multi-task lasso solver with options parsed from a JSON object.
    pub fn from_json(alpha: f64, options: &str) -> Result<Self, SolverError> {
        Self::with_options(alpha, serde_json::from_str(options)?)
    }

    /// The regularisation strength.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// The fitting options.
    pub fn options(&self) -> &LassoOptions {
        &self.options
    }

    /// Fit the model and return the coefficients, the intercept and the number of passes.
    pub fn fit(&self, x: &Array2<f64>, y: &Array2<f64>) -> Result<RegressionFit, SolverError> {
        Ok(multi_task_lasso(
            x.view(),
            y.view(),
            self.alpha,
            &self.options,
        )?)
    }
}

impl Solver for MultiTaskLasso {
    fn name(&self) -> String {
        format!("MultiTaskLasso(alpha={:?})", self.alpha)
    }

    fn solve(&self, x: &Array2<f64>, y: &Array2<f64>) -> Result<Array2<f64>, SolverError> {
        Ok(self.fit(x, y)?.coef)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use lintransforms_linalg::RidgeSolver;
    use ndarray::array;

    fn design() -> (Array2<f64>, Array2<f64>) {
        // y0 = x0 + 2 x1, y1 = -x0
        let x = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0], [2.0, 1.0], [1.0, 3.0]];
        let w = array![[1.0, 2.0], [-1.0, 0.0]];
        let y = x.dot(&w.t());
        (x, y)
    }

    #[test]
    fn test_ridge_names_and_validation() {
        assert!(matches!(Ridge::new(-1.0), Err(SolverError::InvalidConfig(_))));
        assert!(matches!(Ridge::new(f64::NAN), Err(SolverError::InvalidConfig(_))));
        assert!(matches!(
            Ridge::from_json(1.0, r#"{"max_iter": 3}"#),
            Err(SolverError::Config(_))
        ));
        assert_eq!(Ridge::new(1.0).map(|r| r.name()).ok().as_deref(), Some("Ridge(alpha=1.0)"));
    }

    #[test]
    fn test_ridge_recovers_weights() -> Result<(), Box<dyn std::error::Error>> {
        let (x, y) = design();
        let options = RidgeOptions {
            fit_intercept: false,
            solver: RidgeSolver::Svd,
        };
        let coef = Ridge::with_options(0.0, options)?.solve(&x, &y)?;
        assert_eq!(coef.dim(), (2, 2));
        let expected = array![[1.0, 2.0], [-1.0, 0.0]];
        for (a, e) in coef.iter().zip(expected.iter()) {
            assert_relative_eq!(a, e, epsilon = 1e-9);
        }
        Ok(())
    }

    #[test]
    fn test_lasso_validation() {
        let options = LassoOptions {
            tol: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            MultiTaskLasso::with_options(0.1, options),
            Err(SolverError::InvalidConfig(_))
        ));
        assert!(matches!(
            MultiTaskLasso::from_json(0.1, r#"{"selection": "shuffled"}"#),
            Err(SolverError::Config(_))
        ));
    }

    #[test]
    fn test_lasso_large_alpha_zeroes_coefficients() -> Result<(), Box<dyn std::error::Error>> {
        let (x, y) = design();
        let solver = MultiTaskLasso::new(1e3)?;
        assert_eq!(solver.name(), "MultiTaskLasso(alpha=1000.0)");

        let coef = solver.solve(&x, &y)?;
        assert_eq!(coef.dim(), (2, 2));
        assert!(coef.iter().all(|&c| c == 0.0));
        Ok(())
    }

    #[test]
    fn test_lasso_from_json_random_selection() -> Result<(), Box<dyn std::error::Error>> {
        let (x, y) = design();
        let solver = MultiTaskLasso::from_json(
            1e-4,
            r#"{"selection": "random", "random_state": 3, "fit_intercept": false, "max_iter": 10000, "tol": 1e-10}"#,
        )?;
        let fit = solver.fit(&x, &y)?;
        let expected = array![[1.0, 2.0], [-1.0, 0.0]];
        for (a, e) in fit.coef.iter().zip(expected.iter()) {
            assert_relative_eq!(a, e, epsilon = 1e-2);
        }
        Ok(())
    }
}
