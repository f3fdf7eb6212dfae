use rand::{seq::SliceRandom, Rng};

use crate::{
    activation::Activation,
    error::NnError,
    linear::{check_len, Linear, LinearGrad},
    loss::Loss,
    optim::Adam,
};

/// Log the training loss every this many epochs when verbose.
const LOG_EVERY_EPOCHS: usize = 100;

/// Options of the mini-batch training loop.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainOptions {
    /// Adam learning rate.
    pub lr: f32,
    /// Number of passes over the data.
    pub epochs: usize,
    /// Number of samples per gradient step. The last batch of an epoch may be smaller.
    pub batch_size: usize,
    /// Loss minimised by the optimiser.
    pub loss: Loss,
    /// Log the epoch loss at `info` level every 100 epochs.
    pub verbose: bool,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            lr: 1e-3,
            epochs: 500,
            batch_size: 32,
            loss: Loss::Mse,
            verbose: false,
        }
    }
}

impl TrainOptions {
    fn validate(&self) -> Result<(), NnError> {
        if !(self.lr.is_finite() && self.lr > 0.0) {
            return Err(NnError::InvalidOption(
                "lr",
                format!("must be positive and finite, got {}", self.lr),
            ));
        }
        if self.batch_size == 0 {
            return Err(NnError::InvalidOption(
                "batch_size",
                "must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Summary of a training run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainReport {
    /// Mean batch loss of every epoch.
    pub epoch_losses: Vec<f32>,
}

impl TrainReport {
    /// Loss of the last epoch, if any epoch ran.
    pub fn final_loss(&self) -> Option<f32> {
        self.epoch_losses.last().copied()
    }
}

/// A multi-layer perceptron: linear layers with an activation between them.
///
/// The output layer is linear.
#[derive(Debug, Clone, PartialEq)]
pub struct MlpNetwork {
    layers: Vec<Linear>,
    activation: Activation,
}

impl MlpNetwork {
    /// Create a randomly initialised network.
    ///
    /// # Arguments
    ///
    /// * `input_dim` - Number of input features.
    /// * `hidden_layers` - Width of every hidden layer, in order.
    /// * `output_dim` - Number of outputs.
    /// * `activation` - Activation applied after every hidden layer.
    /// * `rng` - Source of randomness for the initial parameters.
    pub fn new<R: Rng + ?Sized>(
        input_dim: usize,
        hidden_layers: &[usize],
        output_dim: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Result<Self, NnError> {
        let mut layers = Vec::with_capacity(hidden_layers.len() + 1);
        let mut in_dim = input_dim;
        for &hidden_dim in hidden_layers {
            layers.push(Linear::new(in_dim, hidden_dim, rng)?);
            in_dim = hidden_dim;
        }
        layers.push(Linear::new(in_dim, output_dim, rng)?);

        Ok(Self { layers, activation })
    }

    /// Number of input features.
    pub fn input_dim(&self) -> usize {
        self.layers.first().map_or(0, Linear::input_dim)
    }

    /// Number of outputs.
    pub fn output_dim(&self) -> usize {
        self.layers.last().map_or(0, Linear::output_dim)
    }

    /// The layers of the network, input first.
    pub fn layers(&self) -> &[Linear] {
        &self.layers
    }

    /// The hidden-layer activation.
    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Predict the outputs for a batch of `batch_size` rows.
    pub fn forward(&self, x: &[f32], batch_size: usize) -> Result<Vec<f32>, NnError> {
        let mut activations = self.forward_cached(x, batch_size)?;
        Ok(activations.pop().unwrap_or_default())
    }

    /// Forward pass keeping the input of every layer; the last entry is the output.
    fn forward_cached(&self, x: &[f32], batch_size: usize) -> Result<Vec<Vec<f32>>, NnError> {
        let mut activations = Vec::with_capacity(self.layers.len() + 1);
        activations.push(x.to_vec());

        let last = self.layers.len() - 1;
        for (i, layer) in self.layers.iter().enumerate() {
            let mut out = layer.forward(&activations[i], batch_size)?;
            if i != last {
                self.activation.forward_inplace(&mut out);
            }
            activations.push(out);
        }

        Ok(activations)
    }

    /// Run one optimisation step on a batch and return its loss before the update.
    pub fn train_batch(
        &mut self,
        x: &[f32],
        y: &[f32],
        batch_size: usize,
        loss: Loss,
        optimizer: &mut Adam,
    ) -> Result<f32, NnError> {
        check_len("target", y, batch_size * self.output_dim())?;

        let activations = self.forward_cached(x, batch_size)?;
        let pred = &activations[self.layers.len()];
        let value = loss.value(pred, y);

        // backpropagate from the output layer
        let mut grad = loss.gradient(pred, y);
        let mut grads: Vec<LinearGrad> = Vec::with_capacity(self.layers.len());
        let last = self.layers.len() - 1;
        for (i, layer) in self.layers.iter().enumerate().rev() {
            if i != last {
                self.activation
                    .backward_inplace(&activations[i + 1], &mut grad);
            }
            let (grad_input, layer_grad) = layer.backward(&activations[i], &grad, batch_size)?;
            grads.push(layer_grad);
            grad = grad_input;
        }
        grads.reverse();

        optimizer.next_step();
        for (i, (layer, layer_grad)) in self.layers.iter_mut().zip(grads.iter()).enumerate() {
            optimizer.update(2 * i, &mut layer.weight, &layer_grad.weight);
            optimizer.update(2 * i + 1, &mut layer.bias, &layer_grad.bias);
        }

        Ok(value)
    }

    /// Train the network on `n_samples` rows with Adam over shuffled mini-batches.
    ///
    /// # Arguments
    ///
    /// * `x` - Inputs of shape `[n_samples, input_dim]`.
    /// * `y` - Targets of shape `[n_samples, output_dim]`.
    /// * `n_samples` - Number of rows.
    /// * `options` - Optimiser and loop settings.
    /// * `rng` - Source of randomness for the shuffling.
    pub fn train<R: Rng + ?Sized>(
        &mut self,
        x: &[f32],
        y: &[f32],
        n_samples: usize,
        options: &TrainOptions,
        rng: &mut R,
    ) -> Result<TrainReport, NnError> {
        options.validate()?;
        let (input_dim, output_dim) = (self.input_dim(), self.output_dim());
        check_len("input", x, n_samples * input_dim)?;
        check_len("target", y, n_samples * output_dim)?;

        let mut optimizer = Adam::new(options.lr);
        let mut report = TrainReport {
            epoch_losses: Vec::with_capacity(options.epochs),
        };
        if n_samples == 0 {
            return Ok(report);
        }

        let mut indices = (0..n_samples).collect::<Vec<_>>();
        let mut xb = Vec::with_capacity(options.batch_size * input_dim);
        let mut yb = Vec::with_capacity(options.batch_size * output_dim);

        for epoch in 0..options.epochs {
            indices.shuffle(rng);

            let mut total = 0.0;
            let mut num_batches = 0;
            for batch in indices.chunks(options.batch_size) {
                xb.clear();
                yb.clear();
                for &idx in batch {
                    xb.extend_from_slice(&x[idx * input_dim..(idx + 1) * input_dim]);
                    yb.extend_from_slice(&y[idx * output_dim..(idx + 1) * output_dim]);
                }
                total += self.train_batch(&xb, &yb, batch.len(), options.loss, &mut optimizer)?;
                num_batches += 1;
            }

            let epoch_loss = total / num_batches as f32;
            report.epoch_losses.push(epoch_loss);

            if options.verbose && (epoch + 1) % LOG_EVERY_EPOCHS == 0 {
                log::info!("[{}/{}] Loss: {:.4}", epoch + 1, options.epochs, epoch_loss);
            }
        }

        log::debug!(
            "trained mlp for {} epochs, final loss {:?}",
            options.epochs,
            report.final_loss()
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_mlp_shapes() -> Result<(), NnError> {
        let mut rng = StdRng::seed_from_u64(0);
        let net = MlpNetwork::new(3, &[8, 4], 2, Activation::Relu, &mut rng)?;
        assert_eq!(net.input_dim(), 3);
        assert_eq!(net.output_dim(), 2);
        assert_eq!(net.layers().len(), 3);

        let out = net.forward(&[0.0; 15], 5)?;
        assert_eq!(out.len(), 10);
        Ok(())
    }

    #[test]
    fn test_mlp_no_hidden_layers_is_linear() -> Result<(), NnError> {
        let mut rng = StdRng::seed_from_u64(0);
        let net = MlpNetwork::new(2, &[], 1, Activation::Relu, &mut rng)?;
        let layer = &net.layers()[0];
        let out = net.forward(&[1.0, 2.0], 1)?;
        let expected = layer.weight[0] + 2.0 * layer.weight[1] + layer.bias[0];
        approx::assert_relative_eq!(out[0], expected, epsilon = 1e-6);
        Ok(())
    }

    #[test]
    fn test_mlp_learns_linear_map() -> Result<(), NnError> {
        let mut rng = StdRng::seed_from_u64(42);
        let mut net = MlpNetwork::new(2, &[16], 1, Activation::Tanh, &mut rng)?;

        // y = 0.5 x0 - 0.25 x1 on a small grid
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..8 {
            for j in 0..8 {
                let (a, b) = (i as f32 / 7.0 - 0.5, j as f32 / 7.0 - 0.5);
                x.extend_from_slice(&[a, b]);
                y.push(0.5 * a - 0.25 * b);
            }
        }

        let options = TrainOptions {
            lr: 1e-2,
            epochs: 300,
            batch_size: 16,
            ..Default::default()
        };
        let report = net.train(&x, &y, 64, &options, &mut rng)?;
        assert_eq!(report.epoch_losses.len(), 300);

        let first = report.epoch_losses[0];
        let last = report.final_loss().unwrap_or(f32::INFINITY);
        assert!(last < first);
        assert!(last < 5e-3, "final loss too high: {last}");
        Ok(())
    }

    #[test]
    fn test_train_rejects_bad_options() -> Result<(), NnError> {
        let mut rng = StdRng::seed_from_u64(0);
        let mut net = MlpNetwork::new(1, &[2], 1, Activation::Relu, &mut rng)?;
        let options = TrainOptions {
            batch_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            net.train(&[1.0], &[1.0], 1, &options, &mut rng),
            Err(NnError::InvalidOption("batch_size", _))
        ));
        assert!(matches!(
            net.train(&[1.0, 2.0], &[1.0], 1, &TrainOptions::default(), &mut rng),
            Err(NnError::SizeMismatch { name: "input", .. })
        ));
        Ok(())
    }
}
