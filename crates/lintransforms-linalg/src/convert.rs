use ndarray::{Array2, ArrayView2};

/// Utility function to copy an `ndarray` matrix into an owned faer matrix.
///
/// # Arguments
///
/// * `array` - A 2d array of any memory layout.
///
/// # Returns
///
/// A faer matrix with the same shape and values.
pub fn array2_to_faer(array: ArrayView2<f64>) -> faer::Mat<f64> {
    let (nrows, ncols) = array.dim();
    faer::Mat::from_fn(nrows, ncols, |i, j| array[[i, j]])
}

/// Utility function to copy a faer matrix into an owned `ndarray` matrix.
///
/// # Arguments
///
/// * `mat` - A faer matrix view.
///
/// # Returns
///
/// A row-major `ndarray` matrix with the same shape and values.
pub fn faer_to_array2(mat: faer::MatRef<'_, f64>) -> Array2<f64> {
    Array2::from_shape_fn((mat.nrows(), mat.ncols()), |(i, j)| mat.read(i, j))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_array2_to_faer() {
        let array = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let mat = array2_to_faer(array.view());
        assert_eq!(mat.nrows(), 2);
        assert_eq!(mat.ncols(), 3);
        assert_eq!(mat.read(0, 0), 1.0);
        assert_eq!(mat.read(0, 2), 3.0);
        assert_eq!(mat.read(1, 0), 4.0);
        assert_eq!(mat.read(1, 2), 6.0);
    }

    #[test]
    fn test_array2_to_faer_transposed_view() {
        let array = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let mat = array2_to_faer(array.t());
        assert_eq!(mat.nrows(), 3);
        assert_eq!(mat.ncols(), 2);
        assert_eq!(mat.read(2, 1), 6.0);
        assert_eq!(mat.read(0, 1), 4.0);
    }

    #[test]
    fn test_faer_to_array2() {
        let array = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let mat = array2_to_faer(array.view());
        let back = faer_to_array2(mat.as_ref());
        assert_eq!(back, array);
    }
}
