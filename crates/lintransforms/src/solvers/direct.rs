use lintransforms_linalg::{inv, lstsq, matrix_rank, pinv, solve, LinalgError};
use ndarray::Array2;

use super::Solver;
use crate::error::SolverError;

/// `β = pinv(x) · y` through the Moore-Penrose pseudo-inverse.
#[derive(Debug, Clone, Copy, Default)]
pub struct PseudoInverse;

impl Solver for PseudoInverse {
    fn name(&self) -> String {
        "Moore-Penrose Pseudo-Inverse".to_string()
    }

    fn solve(&self, x: &Array2<f64>, y: &Array2<f64>) -> Result<Array2<f64>, SolverError> {
        let x_pinv = pinv(x.view());
        if x_pinv.ncols() != y.nrows() {
            let (pr, pc) = x_pinv.dim();
            let (yr, yc) = y.dim();
            return Err(SolverError::ShapeMismatch([pr, pc], [yr, yc]));
        }
        Ok(x_pinv.dot(y))
    }
}

/// Minimum-norm least-squares solution of `x · β ≈ y`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeastSquares;

impl Solver for LeastSquares {
    fn name(&self) -> String {
        "Least Squares".to_string()
    }

    fn solve(&self, x: &Array2<f64>, y: &Array2<f64>) -> Result<Array2<f64>, SolverError> {
        Ok(lstsq(x.view(), y.view())?.solution)
    }
}

/// Exact solution of `x · β = y` for a square, full-rank `x`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Exact;

impl Solver for Exact {
    fn name(&self) -> String {
        "Exact Solver".to_string()
    }

    fn solve(&self, x: &Array2<f64>, y: &Array2<f64>) -> Result<Array2<f64>, SolverError> {
        if x.nrows() != y.nrows() {
            let (xr, xc) = x.dim();
            let (yr, yc) = y.dim();
            return Err(SolverError::ShapeMismatch([xr, xc], [yr, yc]));
        }
        Ok(solve(x.view(), y.view())?)
    }
}

/// How [`OrthogonalProjection`] builds the projection for a given rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProjectionMethod {
    /// Full column rank: `x (xᵗx)⁻¹ xᵗ`.
    NormalEquations,
    /// Full row rank but not full column rank: `x · pinv(x)`.
    PseudoInverse,
    /// Neither full column nor full row rank: `x · pinv(x)` with a warning.
    RankDeficient,
}

fn projection_method(rank: usize, m: usize, n: usize) -> ProjectionMethod {
    if rank == n {
        ProjectionMethod::NormalEquations
    } else if rank < m {
        ProjectionMethod::RankDeficient
    } else {
        ProjectionMethod::PseudoInverse
    }
}

/// Projection onto the column space of `x`.
///
/// Only `x` is used; as a [`Solver`] the outputs are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrthogonalProjection;

impl OrthogonalProjection {
    /// Compute the `(n_samples, n_samples)` projection matrix onto the column space of `x`.
    ///
    /// Uses `x (xᵗx)⁻¹ xᵗ` when `x` has full column rank and `x · pinv(x)`
    /// otherwise. A warning is logged when `x` has neither full column nor full
    /// row rank.
    pub fn solve(&self, x: &Array2<f64>) -> Result<Array2<f64>, SolverError> {
        let (m, n) = x.dim();
        if m == 0 || n == 0 {
            return Ok(Array2::zeros((m, m)));
        }

        let rank = matrix_rank(x.view());
        match projection_method(rank, m, n) {
            ProjectionMethod::NormalEquations => {
                let gram = x.t().dot(x);
                match inv(gram.view()) {
                    Ok(gram_inv) => return Ok(x.dot(&gram_inv).dot(&x.t())),
                    // the gram matrix squares the condition number of x
                    Err(LinalgError::Singular) => log::debug!(
                        "x^T x is numerically singular, projecting with the pseudo-inverse"
                    ),
                    Err(e) => return Err(e.into()),
                }
            }
            ProjectionMethod::RankDeficient => log::warn!(
                "x of shape ({m}, {n}) has rank {rank}, projecting with the pseudo-inverse"
            ),
            ProjectionMethod::PseudoInverse => {}
        }

        Ok(x.dot(&pinv(x.view())))
    }
}

impl Solver for OrthogonalProjection {
    fn name(&self) -> String {
        "Orthogonal Projection".to_string()
    }

    fn solve(&self, x: &Array2<f64>, _y: &Array2<f64>) -> Result<Array2<f64>, SolverError> {
        OrthogonalProjection::solve(self, x)
    }
}
