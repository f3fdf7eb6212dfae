/// An error type for the linear algebra routines.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LinalgError {
    /// The matrix is not square.
    #[error("Last 2 dimensions of the array must be square, got ({0}, {1})")]
    NotSquare(usize, usize),

    /// The matrix is singular to working precision.
    #[error("Singular matrix")]
    Singular,

    /// The operands do not have compatible shapes.
    #[error("Incompatible dimensions: {0:?} and {1:?}")]
    IncompatibleDimensions([usize; 2], [usize; 2]),

    /// A Cholesky factorization was requested on a matrix that is not positive definite.
    #[error("Matrix is not positive definite")]
    NotPositiveDefinite,

    /// The input has no samples.
    #[error("Input has no samples")]
    EmptyInput,
}
