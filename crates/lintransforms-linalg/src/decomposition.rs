use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::convert::array2_to_faer;

/// Thin singular value decomposition `a = u * diag(s) * vt`.
#[derive(Debug, Clone)]
pub struct Svd {
    /// Left singular vectors with shape (m, k).
    pub u: Array2<f64>,
    /// Singular values in non-increasing order with length k.
    pub s: Array1<f64>,
    /// Transposed right singular vectors with shape (k, n).
    pub vt: Array2<f64>,
}

impl Svd {
    /// The largest singular value, or zero for an empty matrix.
    pub fn max_singular_value(&self) -> f64 {
        self.s.iter().fold(0.0, |acc: f64, &v| acc.max(v))
    }

    /// Number of singular values strictly greater than `tol`.
    pub fn rank_with_tol(&self, tol: f64) -> usize {
        self.s.iter().filter(|&&v| v > tol).count()
    }
}

/// Compute the thin singular value decomposition of a matrix.
///
/// # Arguments
///
/// * `a` - The input matrix with shape (m, n).
///
/// # Returns
///
/// The decomposition with `k = min(m, n)` singular triplets.
pub fn svd(a: ArrayView2<f64>) -> Svd {
    let (m, n) = a.dim();
    let k = m.min(n);

    if k == 0 {
        return Svd {
            u: Array2::zeros((m, 0)),
            s: Array1::zeros(0),
            vt: Array2::zeros((0, n)),
        };
    }

    let decomposition = array2_to_faer(a).svd();
    let (u, s, v) = (
        decomposition.u(),
        decomposition.s_diagonal(),
        decomposition.v(),
    );

    Svd {
        u: Array2::from_shape_fn((m, k), |(i, j)| u.read(i, j)),
        s: Array1::from_shape_fn(k, |i| s.read(i)),
        vt: Array2::from_shape_fn((k, n), |(i, j)| v.read(j, i)),
    }
}

/// Default relative cutoff for small singular values: `max(m, n) * eps`.
pub(crate) fn default_rcond(shape: (usize, usize)) -> f64 {
    shape.0.max(shape.1) as f64 * f64::EPSILON
}

/// Compute the rank of a matrix.
///
/// Singular values below `max(m, n) * eps * s_max` are treated as zero.
///
/// Example:
///
/// ```
/// use lintransforms_linalg::matrix_rank;
/// use ndarray::array;
///
/// let a = array![[1.0, 2.0], [2.0, 4.0]];
/// assert_eq!(matrix_rank(a.view()), 1);
/// ```
pub fn matrix_rank(a: ArrayView2<f64>) -> usize {
    let decomposition = svd(a);
    let tol = decomposition.max_singular_value() * default_rcond(a.dim());
    decomposition.rank_with_tol(tol)
}

/// Compute the Moore-Penrose pseudo-inverse of a matrix.
///
/// Uses the default cutoff `max(m, n) * eps` relative to the largest singular value.
///
/// # Arguments
///
/// * `a` - The input matrix with shape (m, n).
///
/// # Returns
///
/// The pseudo-inverse with shape (n, m).
pub fn pinv(a: ArrayView2<f64>) -> Array2<f64> {
    pinv_with_rcond(a, default_rcond(a.dim()))
}

/// Compute the Moore-Penrose pseudo-inverse with an explicit relative cutoff.
///
/// Singular values at or below `rcond * s_max` are discarded.
pub fn pinv_with_rcond(a: ArrayView2<f64>, rcond: f64) -> Array2<f64> {
    let decomposition = svd(a);
    let cutoff = rcond * decomposition.max_singular_value();

    // scale the columns of u by the inverted singular values
    let inv_s = decomposition
        .s
        .mapv(|v| if v > cutoff { 1.0 / v } else { 0.0 });
    let mut u_scaled = decomposition.u;
    for (mut col, &scale) in u_scaled.axis_iter_mut(Axis(1)).zip(inv_s.iter()) {
        col.mapv_inplace(|v| v * scale);
    }

    // pinv = v * diag(1 / s) * u^T
    decomposition.vt.t().dot(&u_scaled.t())
}
