use faer::prelude::SpSolver;
use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::{
    convert::{array2_to_faer, faer_to_array2},
    decomposition::{default_rcond, matrix_rank, svd},
    error::LinalgError,
};

/// Result of a least-squares solve.
#[derive(Debug, Clone)]
pub struct LstsqSolution {
    /// Minimum-norm solution with shape (n, k).
    pub solution: Array2<f64>,
    /// Squared residual norm per right-hand side. Empty unless the system is
    /// overdetermined and `a` has full column rank.
    pub residuals: Array1<f64>,
    /// Effective rank of `a`.
    pub rank: usize,
    /// Singular values of `a` in non-increasing order.
    pub singular_values: Array1<f64>,
}

fn ensure_square(a: ArrayView2<f64>) -> Result<usize, LinalgError> {
    let (nrows, ncols) = a.dim();
    if nrows != ncols {
        return Err(LinalgError::NotSquare(nrows, ncols));
    }
    Ok(nrows)
}

fn ensure_same_rows(a: ArrayView2<f64>, b: ArrayView2<f64>) -> Result<(), LinalgError> {
    if a.nrows() != b.nrows() {
        let (ar, ac) = a.dim();
        let (br, bc) = b.dim();
        return Err(LinalgError::IncompatibleDimensions([ar, ac], [br, bc]));
    }
    Ok(())
}

/// Solve the square linear system `a * x = b` exactly.
///
/// # Arguments
///
/// * `a` - The coefficient matrix with shape (n, n).
/// * `b` - The right-hand side with shape (n, k).
///
/// # Returns
///
/// The solution with shape (n, k).
///
/// # Errors
///
/// [`LinalgError::NotSquare`] if `a` is not square, [`LinalgError::Singular`] if
/// `a` is rank-deficient and [`LinalgError::IncompatibleDimensions`] if the number
/// of rows of `b` differs from `n`.
pub fn solve(a: ArrayView2<f64>, b: ArrayView2<f64>) -> Result<Array2<f64>, LinalgError> {
    let n = ensure_square(a)?;
    ensure_same_rows(a, b)?;

    if n == 0 {
        return Ok(Array2::zeros((0, b.ncols())));
    }

    if matrix_rank(a) < n {
        return Err(LinalgError::Singular);
    }

    let lu = array2_to_faer(a).partial_piv_lu();
    let x = lu.solve(array2_to_faer(b));

    Ok(faer_to_array2(x.as_ref()))
}

/// Compute the inverse of a square matrix.
///
/// # Errors
///
/// [`LinalgError::NotSquare`] if `a` is not square and [`LinalgError::Singular`]
/// if it cannot be inverted.
///
/// Example:
///
/// ```
/// use lintransforms_linalg::inv;
/// use ndarray::array;
///
/// let a = array![[2.0, 0.0], [0.0, 4.0]];
/// let a_inv = inv(a.view()).unwrap();
/// assert_eq!(a_inv, array![[0.5, 0.0], [0.0, 0.25]]);
/// ```
pub fn inv(a: ArrayView2<f64>) -> Result<Array2<f64>, LinalgError> {
    let n = ensure_square(a)?;
    solve(a, Array2::eye(n).view())
}

/// Solve `a * x = b` in the least-squares sense.
///
/// Returns the minimum-norm solution. Singular values of `a` below
/// `max(m, n) * eps * s_max` are treated as zero.
///
/// # Arguments
///
/// * `a` - The coefficient matrix with shape (m, n).
/// * `b` - The right-hand side with shape (m, k).
///
/// # Errors
///
/// [`LinalgError::IncompatibleDimensions`] if `a` and `b` have a different number of rows.
pub fn lstsq(a: ArrayView2<f64>, b: ArrayView2<f64>) -> Result<LstsqSolution, LinalgError> {
    ensure_same_rows(a, b)?;
    let (m, n) = a.dim();

    let decomposition = svd(a);
    let cutoff = decomposition.max_singular_value() * default_rcond((m, n));
    let rank = decomposition.rank_with_tol(cutoff);

    // x = v * diag(1 / s) * u^T * b restricted to the significant singular values
    let mut utb = decomposition.u.t().dot(&b);
    for (mut row, &s) in utb.axis_iter_mut(Axis(0)).zip(decomposition.s.iter()) {
        let scale = if s > cutoff { 1.0 / s } else { 0.0 };
        row.mapv_inplace(|v| v * scale);
    }
    let solution = decomposition.vt.t().dot(&utb);

    let residuals = if rank == n && m > n {
        let diff = &b - &a.dot(&solution);
        diff.map_axis(Axis(0), |col| col.iter().map(|v| v * v).sum::<f64>())
    } else {
        Array1::zeros(0)
    };

    Ok(LstsqSolution {
        solution,
        residuals,
        rank,
        singular_values: decomposition.s,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_solve_identity() -> Result<(), Box<dyn std::error::Error>> {
        let a = Array2::<f64>::eye(2);
        let b = array![[2.0], [3.0]];
        let x = solve(a.view(), b.view())?;
        assert_relative_eq!(x[[0, 0]], 2.0, epsilon = 1e-12);
        assert_relative_eq!(x[[1, 0]], 3.0, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_solve_general() -> Result<(), Box<dyn std::error::Error>> {
        let a = array![[3.0, 1.0], [1.0, 2.0]];
        let b = array![[9.0, 1.0], [8.0, 2.0]];
        let x = solve(a.view(), b.view())?;
        let back = a.dot(&x);
        for (r, e) in back.iter().zip(b.iter()) {
            assert_relative_eq!(r, e, epsilon = 1e-10);
        }
        assert_relative_eq!(x[[0, 0]], 2.0, epsilon = 1e-10);
        assert_relative_eq!(x[[1, 0]], 3.0, epsilon = 1e-10);
        Ok(())
    }

    #[test]
    fn test_solve_singular() {
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        let b = array![[1.0], [2.0]];
        assert_eq!(solve(a.view(), b.view()), Err(LinalgError::Singular));
    }

    #[test]
    fn test_solve_not_square() {
        let a = array![[1.0, 2.0, 3.0], [2.0, 4.0, 5.0]];
        let b = array![[1.0], [2.0]];
        assert_eq!(solve(a.view(), b.view()), Err(LinalgError::NotSquare(2, 3)));
    }

    #[test]
    fn test_solve_incompatible_rhs() {
        let a = Array2::<f64>::eye(2);
        let b = array![[1.0], [2.0], [3.0]];
        assert_eq!(
            solve(a.view(), b.view()),
            Err(LinalgError::IncompatibleDimensions([2, 2], [3, 1]))
        );
    }

    #[test]
    fn test_inv_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
        let a = array![[4.0, 7.0, 1.0], [2.0, 6.0, 0.0], [1.0, 0.0, 3.0]];
        let a_inv = inv(a.view())?;
        let eye = a.dot(&a_inv);
        for ((i, j), v) in eye.indexed_iter() {
            let expected = if i == j { 1.0 } else { 0.0 };
            assert_relative_eq!(*v, expected, epsilon = 1e-10);
        }
        Ok(())
    }

    #[test]
    fn test_lstsq_overdetermined() -> Result<(), Box<dyn std::error::Error>> {
        // fit y = 1 + 2 t through exact samples
        let a = array![[1.0, 0.0], [1.0, 1.0], [1.0, 2.0], [1.0, 3.0]];
        let b = array![[1.0], [3.0], [5.0], [7.0]];
        let result = lstsq(a.view(), b.view())?;
        assert_eq!(result.rank, 2);
        assert_eq!(result.solution.dim(), (2, 1));
        assert_relative_eq!(result.solution[[0, 0]], 1.0, epsilon = 1e-10);
        assert_relative_eq!(result.solution[[1, 0]], 2.0, epsilon = 1e-10);
        assert_eq!(result.residuals.len(), 1);
        assert_relative_eq!(result.residuals[0], 0.0, epsilon = 1e-10);
        Ok(())
    }

    #[test]
    fn test_lstsq_rank_deficient_minimum_norm() -> Result<(), Box<dyn std::error::Error>> {
        let a = array![[1.0, 1.0], [1.0, 1.0]];
        let b = array![[2.0], [2.0]];
        let result = lstsq(a.view(), b.view())?;
        assert_eq!(result.rank, 1);
        assert_eq!(result.residuals.len(), 0);
        assert_relative_eq!(result.solution[[0, 0]], 1.0, epsilon = 1e-10);
        assert_relative_eq!(result.solution[[1, 0]], 1.0, epsilon = 1e-10);
        Ok(())
    }

    #[test]
    fn test_lstsq_incompatible() {
        let a = Array2::<f64>::eye(3);
        let b = Array2::<f64>::zeros((2, 1));
        assert!(matches!(
            lstsq(a.view(), b.view()),
            Err(LinalgError::IncompatibleDimensions(_, _))
        ));
    }
}
