/// An error type for the network operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum NnError {
    /// A buffer does not have the length implied by its shape.
    #[error("Size mismatch for {name}: expected {expected} elements, got {actual}")]
    SizeMismatch {
        /// Name of the offending buffer.
        name: &'static str,
        /// Expected number of elements.
        expected: usize,
        /// Actual number of elements.
        actual: usize,
    },

    /// A layer or network was configured with a zero-sized dimension.
    #[error("Invalid dimension for {0}: must be greater than zero")]
    ZeroDimension(&'static str),

    /// Training options are out of range.
    #[error("Invalid training option `{0}`: {1}")]
    InvalidOption(&'static str, String),
}
