use rand::Rng;

use crate::error::NnError;

/// Linear layer forward pass implemented using `matrixmultiply::sgemm`.
///
/// Computes `dst = src * weight^T + bias`.
///
/// # Arguments
///
/// * `src` - Input tensor of shape `[B, D]`
/// * `weight` - Weight tensor of shape `[N, D]`
/// * `bias` - Bias tensor of shape `[N]`
/// * `dst` - Output tensor of shape `[B, N]`
/// * `batch_size` - Batch size
/// * `input_dim` - Input dimension
/// * `output_dim` - Output dimension
///
/// # Example
///
/// ```
/// use lintransforms_nn::linear::linear_layer_gemm;
///
/// let src = [[1.0, 2.0, 3.0]];
/// let weight = [[0.1, 0.2, 0.3], [0.4, 0.5, 0.6]];
/// let bias = [0.1, 0.2];
///
/// let mut dst = [[0.0, 0.0]];
///
/// linear_layer_gemm(
///     src.as_flattened(),
///     weight.as_flattened(),
///     &bias,
///     dst.as_flattened_mut(),
///     1,
///     3,
///     2,
/// );
///
/// assert_eq!(dst, [[1.5000001, 3.4]]);
/// ```
pub fn linear_layer_gemm(
    src: &[f32],     // Shape: [B, D] flattened
    weight: &[f32],  // Shape: [N, D] flattened (row-major format)
    bias: &[f32],    // Shape: [N]
    dst: &mut [f32], // Shape: [B, N] flattened
    batch_size: usize,
    input_dim: usize,
    output_dim: usize,
) {
    assert_eq!(src.len(), batch_size * input_dim, "Input size mismatch");
    assert_eq!(dst.len(), batch_size * output_dim, "Output size mismatch");
    assert_eq!(weight.len(), output_dim * input_dim, "Weight size mismatch");
    assert_eq!(bias.len(), output_dim, "Bias size mismatch");

    let (m, k, n) = (batch_size, input_dim, output_dim);

    // 1. Set bias for each output row
    for output_row in dst.chunks_exact_mut(output_dim) {
        output_row.copy_from_slice(bias);
    }

    // 2. dst = src * weight^T + bias
    //    (beta = 1.0, so GEMM adds to the bias-initialized output)
    unsafe {
        matrixmultiply::sgemm(
            /* m */ m,
            /* k */ k,
            /* n */ n,
            /* alpha */ 1.0,
            /* a */ src.as_ptr(),
            /* rsa */ k as isize,
            /* csa */ 1,
            /* b */ weight.as_ptr(),
            /* rsb */ 1,
            /* csb */ k as isize,
            /* beta */ 1.0,
            /* c */ dst.as_mut_ptr(),
            /* rsc */ n as isize,
            /* csc */ 1,
        );
    }
}

/// Gradients of a [`Linear`] layer's parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGrad {
    /// Gradient with respect to the weight, shape `[N, D]`.
    pub weight: Vec<f32>,
    /// Gradient with respect to the bias, shape `[N]`.
    pub bias: Vec<f32>,
}

/// A fully-connected layer `y = x * W^T + b`.
#[derive(Debug, Clone, PartialEq)]
pub struct Linear {
    /// Weight matrix of shape `[N, D]`, row-major.
    pub weight: Vec<f32>,
    /// Bias vector of shape `[N]`.
    pub bias: Vec<f32>,
    input_dim: usize,
    output_dim: usize,
}

impl Linear {
    /// Create a layer with parameters drawn from `U(-1/sqrt(D), 1/sqrt(D))`.
    ///
    /// # Errors
    ///
    /// If either dimension is zero.
    pub fn new<R: Rng + ?Sized>(
        input_dim: usize,
        output_dim: usize,
        rng: &mut R,
    ) -> Result<Self, NnError> {
        if input_dim == 0 {
            return Err(NnError::ZeroDimension("input_dim"));
        }
        if output_dim == 0 {
            return Err(NnError::ZeroDimension("output_dim"));
        }

        let bound = 1.0 / (input_dim as f32).sqrt();
        let weight = (0..output_dim * input_dim)
            .map(|_| rng.random_range(-bound..bound))
            .collect();
        let bias = (0..output_dim)
            .map(|_| rng.random_range(-bound..bound))
            .collect();

        Ok(Self {
            weight,
            bias,
            input_dim,
            output_dim,
        })
    }

    /// Create a layer from explicit parameters.
    ///
    /// # Errors
    ///
    /// If the buffers do not match the dimensions or a dimension is zero.
    pub fn from_parts(
        weight: Vec<f32>,
        bias: Vec<f32>,
        input_dim: usize,
        output_dim: usize,
    ) -> Result<Self, NnError> {
        if input_dim == 0 {
            return Err(NnError::ZeroDimension("input_dim"));
        }
        if output_dim == 0 {
            return Err(NnError::ZeroDimension("output_dim"));
        }
        check_len("weight", &weight, output_dim * input_dim)?;
        check_len("bias", &bias, output_dim)?;

        Ok(Self {
            weight,
            bias,
            input_dim,
            output_dim,
        })
    }

    /// Number of input features.
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    /// Number of output features.
    pub fn output_dim(&self) -> usize {
        self.output_dim
    }

    /// Forward pass over a batch of `batch_size` rows.
    pub fn forward(&self, src: &[f32], batch_size: usize) -> Result<Vec<f32>, NnError> {
        check_len("input", src, batch_size * self.input_dim)?;

        let mut dst = vec![0.0; batch_size * self.output_dim];
        linear_layer_gemm(
            src,
            &self.weight,
            &self.bias,
            &mut dst,
            batch_size,
            self.input_dim,
            self.output_dim,
        );

        Ok(dst)
    }

    /// Backward pass.
    ///
    /// # Arguments
    ///
    /// * `src` - The input seen by the forward pass, shape `[B, D]`.
    /// * `grad_output` - Gradient of the loss with respect to the output, shape `[B, N]`.
    /// * `batch_size` - Batch size.
    ///
    /// # Returns
    ///
    /// The gradient with respect to the input, shape `[B, D]`, and the parameter gradients.
    pub fn backward(
        &self,
        src: &[f32],
        grad_output: &[f32],
        batch_size: usize,
    ) -> Result<(Vec<f32>, LinearGrad), NnError> {
        check_len("input", src, batch_size * self.input_dim)?;
        check_len("grad_output", grad_output, batch_size * self.output_dim)?;

        let (b, d, n) = (batch_size, self.input_dim, self.output_dim);

        let mut grad_weight = vec![0.0; n * d];
        let mut grad_input = vec![0.0; b * d];

        // dW = dY^T * X
        unsafe {
            matrixmultiply::sgemm(
                n,
                b,
                d,
                1.0,
                grad_output.as_ptr(),
                1,
                n as isize,
                src.as_ptr(),
                d as isize,
                1,
                0.0,
                grad_weight.as_mut_ptr(),
                d as isize,
                1,
            );
        }

        // dX = dY * W
        unsafe {
            matrixmultiply::sgemm(
                b,
                n,
                d,
                1.0,
                grad_output.as_ptr(),
                n as isize,
                1,
                self.weight.as_ptr(),
                d as isize,
                1,
                0.0,
                grad_input.as_mut_ptr(),
                d as isize,
                1,
            );
        }

        // db = sum over the batch of dY
        let mut grad_bias = vec![0.0; n];
        for row in grad_output.chunks_exact(n) {
            for (acc, g) in grad_bias.iter_mut().zip(row) {
                *acc += g;
            }
        }

        Ok((
            grad_input,
            LinearGrad {
                weight: grad_weight,
                bias: grad_bias,
            },
        ))
    }
}

pub(crate) fn check_len(name: &'static str, buf: &[f32], expected: usize) -> Result<(), NnError> {
    if buf.len() != expected {
        return Err(NnError::SizeMismatch {
            name,
            expected,
            actual: buf.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;

    #[test]
    fn test_linear_layer_gemm_batch_size_2() {
        let src = [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let weight = [[0.1, 0.2, 0.3], [0.4, 0.5, 0.6]];
        let bias = [0.1, 0.2];

        let mut dst = [[0.0, 0.0], [0.0, 0.0]];
        linear_layer_gemm(
            src.as_flattened(),
            weight.as_flattened(),
            &bias,
            dst.as_flattened_mut(),
            2,
            3,
            2,
        );

        // from pytorch
        let expected = [[1.5, 3.4], [3.3, 7.9]];
        for (actual, expected) in dst.iter().zip(expected.iter()) {
            for (a, e) in actual.iter().zip(expected.iter()) {
                assert_relative_eq!(a, e, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn test_linear_forward_size_mismatch() -> Result<(), NnError> {
        let layer = Linear::from_parts(vec![1.0, 0.0], vec![0.0], 2, 1)?;
        assert_eq!(
            layer.forward(&[1.0, 2.0, 3.0], 1),
            Err(NnError::SizeMismatch {
                name: "input",
                expected: 2,
                actual: 3
            })
        );
        Ok(())
    }

    #[test]
    fn test_linear_backward_gradients() -> Result<(), NnError> {
        // y = x * W^T + b with W = [[1, 2, 3], [4, 5, 6]]
        let layer = Linear::from_parts(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![0.5, -0.5], 3, 2)?;
        let src = [1.0, 0.0, -1.0, 2.0, 1.0, 0.0];
        let grad_output = [1.0, 0.0, 0.0, 1.0];

        let (grad_input, grad) = layer.backward(&src, &grad_output, 2)?;

        // dX = dY * W
        assert_eq!(grad_input, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        // dW = dY^T * X
        assert_eq!(grad.weight, vec![1.0, 0.0, -1.0, 2.0, 1.0, 0.0]);
        // db = column sums of dY
        assert_eq!(grad.bias, vec![1.0, 1.0]);
        Ok(())
    }

    #[test]
    fn test_linear_init_bounds() -> Result<(), NnError> {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let layer = Linear::new(16, 4, &mut rng)?;
        let bound = 0.25;
        assert_eq!(layer.weight.len(), 64);
        assert!(layer.weight.iter().all(|w| w.abs() <= bound));
        assert!(layer.bias.iter().all(|b| b.abs() <= bound));
        assert_eq!(Linear::new(0, 4, &mut rng), Err(NnError::ZeroDimension("input_dim")));
        Ok(())
    }
}
