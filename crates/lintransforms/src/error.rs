use lintransforms_linalg::LinalgError;
use lintransforms_nn::NnError;

/// An error type for the transformations.
#[derive(thiserror::Error, Debug)]
pub enum TransformError {
    /// An axis index is out of range.
    #[error("Axis {axis} is out of bounds for array of dimension {ndim}")]
    InvalidAxis {
        /// The requested axis.
        axis: usize,
        /// Number of dimensions of the array.
        ndim: usize,
    },

    /// Two axes that must be distinct are the same.
    #[error("Axes must be distinct, got axis {0} twice")]
    DuplicateAxis(usize),

    /// An axis is shorter than the operation requires.
    #[error("Axis {axis} has length {len}, expected at least {min}")]
    AxisTooShort {
        /// The offending axis.
        axis: usize,
        /// Its length.
        len: usize,
        /// The minimum length.
        min: usize,
    },

    /// The array has fewer dimensions than the operation requires.
    #[error("Expected an array with at least {min} dimensions, got {ndim}")]
    TooFewDimensions {
        /// The minimum number of dimensions.
        min: usize,
        /// Number of dimensions of the array.
        ndim: usize,
    },

    /// Two shapes are incompatible.
    #[error("Shapes {0:?} and {1:?} are not aligned")]
    ShapeMismatch(Vec<usize>, Vec<usize>),

    /// A matrix parameter must be square.
    #[error("Matrix must be square, got ({0}, {1})")]
    NotSquare(usize, usize),

    /// A scalar parameter is out of range.
    #[error("Invalid value for `{0}`: {1}")]
    InvalidParameter(&'static str, String),

    /// An array could not be reshaped.
    #[error("Failed to reshape the array. {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// A linear algebra routine failed.
    #[error(transparent)]
    Linalg(#[from] LinalgError),
}

/// An error type for the solvers.
#[derive(thiserror::Error, Debug)]
pub enum SolverError {
    /// A linear algebra routine failed.
    ///
    /// This is the only category captured by [`crate::Pipeline::solve`].
    #[error(transparent)]
    Linalg(#[from] LinalgError),

    /// The inputs do not have compatible shapes.
    #[error("Shapes {0:?} and {1:?} are not aligned")]
    ShapeMismatch([usize; 2], [usize; 2]),

    /// Solver options could not be parsed.
    #[error("Failed to parse solver options. {0}")]
    Config(#[from] serde_json::Error),

    /// Solver options are out of range.
    #[error("Invalid solver configuration: {0}")]
    InvalidConfig(String),

    /// The neural network failed.
    #[error(transparent)]
    Network(#[from] NnError),

    /// An array could not be reshaped.
    #[error("Failed to reshape the array. {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// A model was queried before it was trained.
    #[error("The model has not been trained yet")]
    NotTrained,
}

impl SolverError {
    /// Whether the error comes from a linear algebra routine.
    pub fn is_linalg(&self) -> bool {
        matches!(self, SolverError::Linalg(_))
    }
}
