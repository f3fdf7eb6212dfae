use serde::Deserialize;

/// Element-wise activation applied after every hidden layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// `max(0, x)`
    #[default]
    Relu,
    /// `tanh(x)`
    Tanh,
    /// `1 / (1 + exp(-x))`
    Sigmoid,
    /// `x`
    Identity,
}

impl Activation {
    /// Apply the activation in place.
    pub fn forward_inplace(&self, values: &mut [f32]) {
        match self {
            Activation::Relu => values.iter_mut().for_each(|v| *v = v.max(0.0)),
            Activation::Tanh => values.iter_mut().for_each(|v| *v = v.tanh()),
            Activation::Sigmoid => values
                .iter_mut()
                .for_each(|v| *v = 1.0 / (1.0 + (-*v).exp())),
            Activation::Identity => {}
        }
    }

    /// Multiply `grad` in place by the derivative of the activation.
    ///
    /// The derivative is expressed in terms of the activation output.
    pub fn backward_inplace(&self, output: &[f32], grad: &mut [f32]) {
        let derivative = |y: f32| match self {
            Activation::Relu => {
                if y > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::Tanh => 1.0 - y * y,
            Activation::Sigmoid => y * (1.0 - y),
            Activation::Identity => 1.0,
        };

        for (g, &y) in grad.iter_mut().zip(output) {
            *g *= derivative(y);
        }
    }
}
