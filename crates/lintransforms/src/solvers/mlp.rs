use std::sync::{Mutex, PoisonError};

use lintransforms_nn::{Activation, Loss, MlpNetwork, TrainOptions, TrainReport};
use ndarray::Array2;
use rand::{rngs::StdRng, SeedableRng};
use serde::Deserialize;

use super::Solver;
use crate::error::SolverError;

/// Configuration of the [`Mlp`] solver.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct MlpConfig {
    /// Number of input features.
    pub input_dim: usize,
    /// Number of outputs.
    pub output_dim: usize,
    /// Width of every hidden layer.
    pub hidden_layers: Vec<usize>,
    /// Adam learning rate.
    pub lr: f32,
    /// Number of passes over the data.
    pub epochs: usize,
    /// Mini-batch size.
    pub batch_size: usize,
    /// Log the loss every 100 epochs.
    pub verbose: bool,
    /// Hidden-layer activation.
    pub activation: Activation,
    /// Training loss.
    pub loss: Loss,
    /// Seed for the initial weights and the shuffling. Seeded from the OS when unset.
    pub seed: Option<u64>,
}

impl Default for MlpConfig {
    fn default() -> Self {
        Self {
            input_dim: 0,
            output_dim: 0,
            hidden_layers: vec![64, 32],
            lr: 1e-3,
            epochs: 500,
            batch_size: 32,
            verbose: false,
            activation: Activation::Relu,
            loss: Loss::Mse,
            seed: None,
        }
    }
}

impl MlpConfig {
    /// Default configuration for the given input and output sizes.
    pub fn new(input_dim: usize, output_dim: usize) -> Self {
        Self {
            input_dim,
            output_dim,
            ..Default::default()
        }
    }

    fn validate(&self) -> Result<(), SolverError> {
        if self.input_dim == 0 || self.output_dim == 0 {
            return Err(SolverError::InvalidConfig(format!(
                "input_dim and output_dim must be greater than zero, got {} and {}",
                self.input_dim, self.output_dim
            )));
        }
        if self.hidden_layers.contains(&0) {
            return Err(SolverError::InvalidConfig(
                "hidden layer widths must be greater than zero".to_string(),
            ));
        }
        if !(self.lr.is_finite() && self.lr > 0.0) {
            return Err(SolverError::InvalidConfig(format!(
                "lr must be positive and finite, got {}",
                self.lr
            )));
        }
        if self.batch_size == 0 {
            return Err(SolverError::InvalidConfig(
                "batch_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    fn train_options(&self) -> TrainOptions {
        TrainOptions {
            lr: self.lr,
            epochs: self.epochs,
            batch_size: self.batch_size,
            loss: self.loss,
            verbose: self.verbose,
        }
    }
}

/// Regresses the map `x → y` with a multi-layer perceptron.
///
/// Every call to [`Solver::solve`] trains a fresh network; the last trained
/// network is kept and can be queried with [`Mlp::predict`].
#[derive(Debug)]
pub struct Mlp {
    config: MlpConfig,
    trained: Mutex<Option<(MlpNetwork, TrainReport)>>,
}

impl Mlp {
    /// Create the solver.
    ///
    /// # Errors
    ///
    /// [`SolverError::InvalidConfig`] if a dimension, the learning rate or the
    /// batch size is out of range.
    pub fn new(config: MlpConfig) -> Result<Self, SolverError> {
        config.validate()?;
        Ok(Self {
            config,
            trained: Mutex::new(None),
        })
    }

    /// Create the solver from a JSON configuration. Unknown keys are rejected.
    pub fn from_json(config: &str) -> Result<Self, SolverError> {
        Self::new(serde_json::from_str(config)?)
    }

    /// The solver configuration.
    pub fn config(&self) -> &MlpConfig {
        &self.config
    }

    /// The last trained network, if any.
    pub fn trained(&self) -> Option<MlpNetwork> {
        self.lock().as_ref().map(|(net, _)| net.clone())
    }

    /// Report of the last training run, if any.
    pub fn report(&self) -> Option<TrainReport> {
        self.lock().as_ref().map(|(_, report)| report.clone())
    }

    /// Predict outputs for `x` with the last trained network.
    ///
    /// # Errors
    ///
    /// [`SolverError::NotTrained`] if [`Solver::solve`] has not been called.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array2<f64>, SolverError> {
        let guard = self.lock();
        let (net, _) = guard.as_ref().ok_or(SolverError::NotTrained)?;
        self.check_cols(x, self.config.input_dim)?;
        forward(net, x)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<(MlpNetwork, TrainReport)>> {
        self.trained.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_cols(&self, a: &Array2<f64>, expected: usize) -> Result<(), SolverError> {
        if a.ncols() != expected {
            let (r, c) = a.dim();
            return Err(SolverError::ShapeMismatch([r, c], [r, expected]));
        }
        Ok(())
    }
}

fn to_f32(a: &Array2<f64>) -> Vec<f32> {
    a.iter().map(|&v| v as f32).collect()
}

fn forward(net: &MlpNetwork, x: &Array2<f64>) -> Result<Array2<f64>, SolverError> {
    let n_samples = x.nrows();
    let out = net.forward(&to_f32(x), n_samples)?;
    Ok(Array2::from_shape_vec(
        (n_samples, net.output_dim()),
        out.into_iter().map(f64::from).collect(),
    )?)
}

impl Solver for Mlp {
    fn name(&self) -> String {
        format!(
            "MLP(hidden={:?}, lr={:?})",
            self.config.hidden_layers, self.config.lr
        )
    }

    fn solve(&self, x: &Array2<f64>, y: &Array2<f64>) -> Result<Array2<f64>, SolverError> {
        self.check_cols(x, self.config.input_dim)?;
        self.check_cols(y, self.config.output_dim)?;
        if x.nrows() != y.nrows() {
            let (xr, xc) = x.dim();
            let (yr, yc) = y.dim();
            return Err(SolverError::ShapeMismatch([xr, xc], [yr, yc]));
        }

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut net = MlpNetwork::new(
            self.config.input_dim,
            &self.config.hidden_layers,
            self.config.output_dim,
            self.config.activation,
            &mut rng,
        )?;
        let report = net.train(
            &to_f32(x),
            &to_f32(y),
            x.nrows(),
            &self.config.train_options(),
            &mut rng,
        )?;

        let predictions = forward(&net, x)?;
        *self.lock() = Some((net, report));

        Ok(predictions)
    }
}
