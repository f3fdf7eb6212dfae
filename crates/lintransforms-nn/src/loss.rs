use serde::Deserialize;

/// Regression loss averaged over every element of the batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Loss {
    /// Mean squared error.
    #[default]
    Mse,
    /// Mean absolute error.
    L1,
}

impl Loss {
    /// Loss value for a batch of predictions.
    ///
    /// PRECONDITION: `pred` and `target` have the same length.
    pub fn value(&self, pred: &[f32], target: &[f32]) -> f32 {
        if pred.is_empty() {
            return 0.0;
        }
        let total: f32 = pred
            .iter()
            .zip(target)
            .map(|(p, t)| match self {
                Loss::Mse => (p - t) * (p - t),
                Loss::L1 => (p - t).abs(),
            })
            .sum();
        total / pred.len() as f32
    }

    /// Gradient of [`Loss::value`] with respect to `pred`.
    pub fn gradient(&self, pred: &[f32], target: &[f32]) -> Vec<f32> {
        let scale = 1.0 / pred.len().max(1) as f32;
        pred.iter()
            .zip(target)
            .map(|(p, t)| match self {
                Loss::Mse => 2.0 * (p - t) * scale,
                Loss::L1 => {
                    let d = p - t;
                    if d > 0.0 {
                        scale
                    } else if d < 0.0 {
                        -scale
                    } else {
                        0.0
                    }
                }
            })
            .collect()
    }
}
