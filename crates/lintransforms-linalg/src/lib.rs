#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! All routines take and return `ndarray` matrices of `f64`. The factorizations
//! themselves are delegated to `faer`.

/// Conversions between `ndarray` matrices and `faer` matrices.
pub mod convert;

/// Singular value decomposition, rank and pseudo-inverse.
pub mod decomposition;

/// Error types for the linear algebra routines.
pub mod error;

/// Regularised linear regression (ridge, multi-task lasso).
pub mod regression;

/// Linear system solvers: exact solve, inverse and least squares.
pub mod solve;

pub use decomposition::{matrix_rank, pinv, pinv_with_rcond, svd, Svd};
pub use error::LinalgError;
pub use regression::{
    multi_task_lasso, ridge, LassoOptions, RegressionFit, RidgeOptions, RidgeSolver, Selection,
};
pub use solve::{inv, lstsq, solve, LstsqSolution};
