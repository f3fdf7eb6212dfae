use faer::prelude::SpSolver;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Deserialize;

use crate::{
    convert::{array2_to_faer, faer_to_array2},
    decomposition::svd,
    error::LinalgError,
};

/// Singular values at or below this threshold are dropped by the SVD ridge solver.
const RIDGE_SVD_CUTOFF: f64 = 1e-15;

/// Fitted parameters of a linear regression model.
#[derive(Debug, Clone)]
pub struct RegressionFit {
    /// Coefficients with shape (n_targets, n_features).
    pub coef: Array2<f64>,
    /// Intercept per target. All zeros when the intercept is not fitted.
    pub intercept: Array1<f64>,
    /// Number of iterations run by iterative solvers; zero for closed-form fits.
    pub n_iter: usize,
}

/// Linear solver used to fit the ridge model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RidgeSolver {
    /// Cholesky on the regularised normal equations, falling back to SVD when
    /// they are not positive definite.
    #[default]
    Auto,
    /// Cholesky on the regularised normal equations only.
    Cholesky,
    /// Spectral filtering through the SVD of the design matrix.
    Svd,
}

/// Options for [`ridge`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RidgeOptions {
    /// Whether to fit an intercept by centering the data first.
    pub fit_intercept: bool,
    /// Linear solver used to fit the model.
    pub solver: RidgeSolver,
}

impl Default for RidgeOptions {
    fn default() -> Self {
        Self {
            fit_intercept: true,
            solver: RidgeSolver::Auto,
        }
    }
}

/// Order in which coordinates are visited by coordinate descent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// Visit features in order.
    #[default]
    Cyclic,
    /// Visit a uniformly random feature at every step.
    Random,
}

/// Options for [`multi_task_lasso`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LassoOptions {
    /// Whether to fit an intercept by centering the data first.
    pub fit_intercept: bool,
    /// Maximum number of passes over the features.
    pub max_iter: usize,
    /// Tolerance on the coefficient updates and on the duality gap.
    pub tol: f64,
    /// Order in which coordinates are visited.
    pub selection: Selection,
    /// Seed for [`Selection::Random`]. Seeded from the OS when unset.
    pub random_state: Option<u64>,
}

impl Default for LassoOptions {
    fn default() -> Self {
        Self {
            fit_intercept: true,
            max_iter: 1000,
            tol: 1e-4,
            selection: Selection::Cyclic,
            random_state: None,
        }
    }
}

/// Centered copies of the design and target matrices with their column means.
struct Centered {
    x: Array2<f64>,
    y: Array2<f64>,
    x_mean: Array1<f64>,
    y_mean: Array1<f64>,
}

fn center(
    x: ArrayView2<f64>,
    y: ArrayView2<f64>,
    fit_intercept: bool,
) -> Result<Centered, LinalgError> {
    if x.nrows() != y.nrows() {
        let (xr, xc) = x.dim();
        let (yr, yc) = y.dim();
        return Err(LinalgError::IncompatibleDimensions([xr, xc], [yr, yc]));
    }

    if !fit_intercept {
        return Ok(Centered {
            x: x.to_owned(),
            y: y.to_owned(),
            x_mean: Array1::zeros(x.ncols()),
            y_mean: Array1::zeros(y.ncols()),
        });
    }

    let x_mean = x.mean_axis(Axis(0)).ok_or(LinalgError::EmptyInput)?;
    let y_mean = y.mean_axis(Axis(0)).ok_or(LinalgError::EmptyInput)?;

    Ok(Centered {
        x: &x - &x_mean,
        y: &y - &y_mean,
        x_mean,
        y_mean,
    })
}

/// Fit ridge regression by solving `(x^T x + alpha I) w = x^T y`.
///
/// Minimises `||y - x w - b||^2 + alpha ||w||^2`.
///
/// # Arguments
///
/// * `x` - The design matrix with shape (n_samples, n_features).
/// * `y` - The targets with shape (n_samples, n_targets).
/// * `alpha` - The regularisation strength.
/// * `options` - Intercept handling and linear solver.
///
/// # Returns
///
/// The fitted coefficients with shape (n_targets, n_features) and the intercept.
///
/// PRECONDITION: `alpha` is finite and non-negative.
pub fn ridge(
    x: ArrayView2<f64>,
    y: ArrayView2<f64>,
    alpha: f64,
    options: &RidgeOptions,
) -> Result<RegressionFit, LinalgError> {
    let data = center(x, y, options.fit_intercept)?;

    let weights = match options.solver {
        RidgeSolver::Cholesky => ridge_cholesky(&data.x, &data.y, alpha)?,
        RidgeSolver::Svd => ridge_svd(&data.x, &data.y, alpha),
        RidgeSolver::Auto => match ridge_cholesky(&data.x, &data.y, alpha) {
            Ok(weights) => weights,
            Err(err) => {
                log::debug!("ridge: cholesky failed ({err}), falling back to svd");
                ridge_svd(&data.x, &data.y, alpha)
            }
        },
    };

    // b = y_mean - x_mean * w
    let intercept = &data.y_mean - &data.x_mean.dot(&weights);

    Ok(RegressionFit {
        coef: weights.reversed_axes(),
        intercept,
        n_iter: 0,
    })
}

fn ridge_cholesky(
    x: &Array2<f64>,
    y: &Array2<f64>,
    alpha: f64,
) -> Result<Array2<f64>, LinalgError> {
    let mut gram = x.t().dot(x);
    gram.diag_mut().mapv_inplace(|v| v + alpha);
    let rhs = x.t().dot(y);

    let llt = array2_to_faer(gram.view())
        .cholesky(faer::Side::Lower)
        .map_err(|_| LinalgError::NotPositiveDefinite)?;
    let weights = llt.solve(array2_to_faer(rhs.view()));

    Ok(faer_to_array2(weights.as_ref()))
}

fn ridge_svd(x: &Array2<f64>, y: &Array2<f64>, alpha: f64) -> Array2<f64> {
    let decomposition = svd(x.view());

    // w = v * diag(s / (s^2 + alpha)) * u^T * y
    let mut uty = decomposition.u.t().dot(y);
    for (mut row, &s) in uty.axis_iter_mut(Axis(0)).zip(decomposition.s.iter()) {
        let d = if s > RIDGE_SVD_CUTOFF {
            s / (s * s + alpha)
        } else {
            0.0
        };
        row.mapv_inplace(|v| v * d);
    }

    decomposition.vt.t().dot(&uty)
}

/// Fit the multi-task lasso by block coordinate descent.
///
/// Minimises `(1 / (2 n)) ||y - x w - b||_F^2 + alpha ||w||_21` where `||w||_21`
/// sums the euclidean norms of the per-feature rows of `w`, so features are
/// selected jointly across all targets.
///
/// # Arguments
///
/// * `x` - The design matrix with shape (n_samples, n_features).
/// * `y` - The targets with shape (n_samples, n_targets).
/// * `alpha` - The regularisation strength.
/// * `options` - Intercept handling and convergence criteria.
///
/// # Returns
///
/// The fitted coefficients with shape (n_targets, n_features), the intercept
/// and the number of passes run.
///
/// PRECONDITION: `alpha` is finite and non-negative, `options.tol` is positive.
pub fn multi_task_lasso(
    x: ArrayView2<f64>,
    y: ArrayView2<f64>,
    alpha: f64,
    options: &LassoOptions,
) -> Result<RegressionFit, LinalgError> {
    let data = center(x, y, options.fit_intercept)?;
    let (n_samples, n_features) = data.x.dim();
    let n_tasks = data.y.ncols();

    if n_samples == 0 {
        return Err(LinalgError::EmptyInput);
    }

    let l1_reg = alpha * n_samples as f64;
    let y_norm_sq = data.y.iter().map(|v| v * v).sum::<f64>();
    let gap_tol = options.tol * y_norm_sq;

    let norm_cols_x = data
        .x
        .axis_iter(Axis(1))
        .map(|col| col.dot(&col))
        .collect::<Vec<_>>();

    // rows of w are the per-feature coefficients across targets
    let mut w = Array2::<f64>::zeros((n_features, n_tasks));
    let mut residual = data.y.clone();

    let mut rng = match options.random_state {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut n_iter = 0;
    let mut converged = false;

    while n_iter < options.max_iter {
        n_iter += 1;
        let mut w_max = 0.0f64;
        let mut d_w_max = 0.0f64;

        for step in 0..n_features {
            let j = match options.selection {
                Selection::Cyclic => step,
                Selection::Random => rng.random_range(0..n_features),
            };

            let norm = norm_cols_x[j];
            if norm == 0.0 {
                continue;
            }

            let x_j = data.x.column(j);
            let w_j_old = w.row(j).to_owned();

            // tmp = x_j^T r + ||x_j||^2 w_j
            let mut tmp = x_j.dot(&residual);
            tmp.scaled_add(norm, &w_j_old);

            // block soft-thresholding
            let tmp_norm = tmp.dot(&tmp).sqrt();
            let shrink = if tmp_norm > 0.0 {
                (1.0 - l1_reg / tmp_norm).max(0.0) / norm
            } else {
                0.0
            };
            let w_j_new = tmp * shrink;

            let delta = &w_j_new - &w_j_old;
            if delta.iter().any(|&d| d != 0.0) {
                for (mut r_row, &x_ij) in residual.axis_iter_mut(Axis(0)).zip(x_j.iter()) {
                    r_row.scaled_add(-x_ij, &delta);
                }
            }

            d_w_max = delta.iter().fold(d_w_max, |acc, d| acc.max(d.abs()));
            w_max = w_j_new.iter().fold(w_max, |acc, v| acc.max(v.abs()));
            w.row_mut(j).assign(&w_j_new);
        }

        if w_max == 0.0 || d_w_max / w_max < options.tol {
            let gap = duality_gap(&data.x, &data.y, &w, &residual, l1_reg);
            if gap <= gap_tol {
                log::debug!("multi-task lasso converged after {n_iter} iterations, gap {gap:e}");
                converged = true;
                break;
            }
        }
    }

    if !converged {
        log::warn!(
            "multi-task lasso did not converge after {} iterations; consider increasing max_iter",
            options.max_iter
        );
    }

    let intercept = &data.y_mean - &data.x_mean.dot(&w);

    Ok(RegressionFit {
        coef: w.reversed_axes(),
        intercept,
        n_iter,
    })
}

/// Duality gap of the multi-task lasso objective at the current iterate.
fn duality_gap(
    x: &Array2<f64>,
    y: &Array2<f64>,
    w: &Array2<f64>,
    residual: &Array2<f64>,
    l1_reg: f64,
) -> f64 {
    let xta = x.t().dot(residual);
    let dual_norm_xta = xta
        .axis_iter(Axis(0))
        .map(|row| row.dot(&row).sqrt())
        .fold(0.0f64, f64::max);

    let r_norm_sq = residual.iter().map(|v| v * v).sum::<f64>();
    let (scale, mut gap) = if dual_norm_xta > l1_reg {
        let scale = l1_reg / dual_norm_xta;
        (scale, 0.5 * r_norm_sq * (1.0 + scale * scale))
    } else {
        (1.0, r_norm_sq)
    };

    let w_21 = w
        .axis_iter(Axis(0))
        .map(|row| row.dot(&row).sqrt())
        .sum::<f64>();
    let ry = residual
        .iter()
        .zip(y.iter())
        .map(|(r, y)| r * y)
        .sum::<f64>();

    gap += l1_reg * w_21 - scale * ry;
    gap
}
