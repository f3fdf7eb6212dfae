#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! Transformations map an n-dimensional `f64` array to a new array; solvers
//! fit a transformation matrix from paired inputs and outputs. A [`Pipeline`]
//! chains transformations and runs a set of solvers side by side.
//!
//! # Example
//!
//! ```rust
//! use lintransforms::{
//!     Exact, LeastSquares, Pipeline, PseudoInverse, Rotation, SolveOutcome, Transformation,
//! };
//! use ndarray::{array, Array2};
//!
//! let rotation = Rotation::from_angle(std::f64::consts::FRAC_PI_2);
//! let x = array![[1.0, 0.0], [0.0, 1.0]];
//! let y: Array2<f64> = rotation.apply(&x.clone().into_dyn())?.into_dimensionality()?;
//!
//! let pipeline = Pipeline::new()
//!     .with_solver(PseudoInverse)
//!     .with_solver(LeastSquares)
//!     .with_solver(Exact);
//!
//! for (name, outcome) in pipeline.solve(&x, &y)? {
//!     match outcome {
//!         SolveOutcome::Solution(matrix) => println!("{name}: {matrix}"),
//!         SolveOutcome::Failed(message) => println!("{name} failed: {message}"),
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Error types for the transformations and solvers.
pub mod error;

/// Chaining transformations and running solvers.
pub mod pipeline;

/// Solvers fitting a transformation matrix from data.
pub mod solvers;

/// Linear transformations of n-dimensional arrays.
pub mod transforms;

/// Matrix predicates and correlated data generation.
pub mod utils;

pub use error::{SolverError, TransformError};
pub use pipeline::{Pipeline, SolveOutcome};
pub use solvers::{
    Exact, LeastSquares, Mlp, MlpConfig, MultiTaskLasso, OrthogonalProjection, PseudoInverse,
    Ridge, Solver,
};
pub use transforms::{
    Dilation, Identity, Inverse, Linear, Projection, Reflection, Rotation, Shear, Transformation,
    Translation,
};

pub use lintransforms_linalg as linalg;
pub use lintransforms_nn as nn;
