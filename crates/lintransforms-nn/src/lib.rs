#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Feed-forward networks
//!
//! A small multi-layer perceptron trained with Adam on mini-batches. All
//! buffers are flat, row-major `f32` slices with one sample per row.
//!
//! ## Example
//!
//! ```rust
//! use lintransforms_nn::{Activation, MlpNetwork, TrainOptions};
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(0);
//! let mut net = MlpNetwork::new(2, &[8], 1, Activation::Tanh, &mut rng)?;
//!
//! // y = x0 + x1
//! let x = [0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0];
//! let y = [0.0, 1.0, 1.0, 2.0];
//! let options = TrainOptions { epochs: 10, batch_size: 2, ..Default::default() };
//! let report = net.train(&x, &y, 4, &options, &mut rng)?;
//! assert_eq!(report.epoch_losses.len(), 10);
//! # Ok::<(), lintransforms_nn::NnError>(())
//! ```

/// Activation functions.
pub mod activation;

/// Error types for the network operations.
pub mod error;

/// Linear (fully-connected) layer.
///
/// Forward and backward passes are implemented with `matrixmultiply::sgemm`.
pub mod linear;

/// Loss functions.
pub mod loss;

/// Multi-layer perceptron and its training loop.
pub mod mlp;

/// Gradient-based optimisers.
pub mod optim;

pub use activation::Activation;
pub use error::NnError;
pub use linear::Linear;
pub use loss::Loss;
pub use mlp::{MlpNetwork, TrainOptions, TrainReport};
pub use optim::Adam;
