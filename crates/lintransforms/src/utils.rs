use lintransforms_linalg::matrix_rank;
use ndarray::{ArrayBase, ArrayD, ArrayView2, Axis, Data, Dimension, Ix2};

use crate::error::TransformError;

/// Absolute tolerance of the approximate comparisons.
const ATOL: f64 = 1e-8;
/// Relative tolerance of the approximate comparisons.
const RTOL: f64 = 1e-5;

fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= ATOL + RTOL * b.abs()
}

fn as_matrix<S, D>(x: &ArrayBase<S, D>) -> Option<ArrayView2<'_, f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    x.view().into_dimensionality::<Ix2>().ok()
}

/// Whether `x` is a 2-D array with as many rows as columns.
pub fn is_square<S, D>(x: &ArrayBase<S, D>) -> bool
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    as_matrix(x).is_some_and(|m| m.nrows() == m.ncols())
}

/// Whether `x` is square and approximately equal to its transpose.
pub fn is_symmetric<S, D>(x: &ArrayBase<S, D>) -> bool
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    match as_matrix(x) {
        Some(m) if m.nrows() == m.ncols() => {
            m.iter().zip(m.t().iter()).all(|(&a, &b)| is_close(a, b))
        }
        _ => false,
    }
}

/// Whether `x` is square and `x · x ≈ x`.
pub fn is_idempotent<S, D>(x: &ArrayBase<S, D>) -> bool
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    match as_matrix(x) {
        Some(m) if m.nrows() == m.ncols() => m
            .dot(&m)
            .iter()
            .zip(m.iter())
            .all(|(&a, &b)| is_close(a, b)),
        _ => false,
    }
}

/// Whether the rank of the 2-D array `x` equals `min(rows, cols)`.
pub fn is_full_rank<S, D>(x: &ArrayBase<S, D>) -> bool
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    as_matrix(x).is_some_and(|m| matrix_rank(m) == m.nrows().min(m.ncols()))
}

/// Mix two arrays so that they correlate with coefficient `r`.
///
/// A new axis is inserted at `axis` in both arrays, and the result is
/// `r · x1 + sqrt(1 − r²) · x2`.
///
/// # Errors
///
/// If the shapes differ, `axis` is greater than the number of dimensions or
/// `|r| > 1`.
pub fn correlate(
    x1: &ArrayD<f64>,
    x2: &ArrayD<f64>,
    r: f64,
    axis: usize,
) -> Result<ArrayD<f64>, TransformError> {
    if x1.shape() != x2.shape() {
        return Err(TransformError::ShapeMismatch(
            x1.shape().to_vec(),
            x2.shape().to_vec(),
        ));
    }
    if axis > x1.ndim() {
        return Err(TransformError::InvalidAxis {
            axis,
            ndim: x1.ndim() + 1,
        });
    }
    if r.is_nan() || r.abs() > 1.0 {
        return Err(TransformError::InvalidParameter(
            "r",
            format!("must lie in [-1, 1], got {r}"),
        ));
    }

    let a = x1.view().insert_axis(Axis(axis));
    let b = x2.view().insert_axis(Axis(axis));

    Ok(&a * r + &b * (1.0 - r * r).sqrt())
}
