use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::{math::matrix::Matrix, activation::activation::ActivationFunction};

/// Fully connected layer: `a = f(x · W + b)`.
///
/// `weights` is `input_size x size`, `biases` is `1 x size`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub size: usize,
    pub input_size: usize,
    pub weights: Matrix,
    pub biases: Matrix,
    pub activator: ActivationFunction,
}

/// Values a forward pass leaves behind for backpropagation, one row per sample.
#[derive(Debug, Clone)]
pub struct LayerTrace {
    /// Pre-activation values `z = x · W + b`.
    pub pre_activation: Matrix,
    /// Activated output `a = f(z)`.
    pub activation: Matrix,
}

impl Layer {
    pub fn new<R: Rng>(size: usize, input_size: usize, activation: ActivationFunction, rng: &mut R) -> Layer {
        let limit = activation.init_limit(input_size, size);
        Layer {
            size,
            input_size,
            weights: Matrix::uniform(input_size, size, limit, rng),
            biases: Matrix::zeros(1, size),
            activator: activation,
        }
    }

    /// Forward pass over a batch (`samples x input_size`).
    pub fn forward(&self, input: &Matrix) -> LayerTrace {
        let z = (input * &self.weights).add_row(&self.biases);
        let a = z.map(|x| self.activator.function(x));
        LayerTrace {
            pre_activation: z,
            activation: a,
        }
    }

    /// Computes gradient adjustments. Returns `(weights_grad, biases_grad, input_delta)`.
    ///
    /// `output_delta` is ∂C/∂a for this layer's activations over the batch;
    /// `input_delta` is ∂C/∂x, the error handed to the previous layer.
    pub fn compute_gradients(
        &self,
        output_delta: &Matrix,
        inputs: &Matrix,
        trace: &LayerTrace,
    ) -> (Matrix, Matrix, Matrix) {
        // δ = ∂C/∂a ⊙ f'(z)
        let act_derivative = trace.pre_activation.map(|x| self.activator.derivative(x));
        let layer_delta = output_delta.hadamard(&act_derivative);

        let weights_grad = &inputs.transpose() * &layer_delta;
        let biases_grad = layer_delta.sum_rows();
        let input_delta = &layer_delta * &self.weights.transpose();

        (weights_grad, biases_grad, input_delta)
    }

    /// Applies pre-computed gradients scaled by lr.
    pub fn apply_gradients(&mut self, weights_grad: &Matrix, biases_grad: &Matrix, lr: f64) {
        self.weights = &self.weights - &weights_grad.map(|x| x * lr);
        self.biases = &self.biases - &biases_grad.map(|x| x * lr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::{rngs::StdRng, SeedableRng};

    fn fixed_layer(activation: ActivationFunction) -> Layer {
        let mut layer = Layer::new(2, 3, activation, &mut StdRng::seed_from_u64(1));
        layer.weights = Matrix::from_data(vec![
            vec![0.1, -0.2],
            vec![0.4, 0.3],
            vec![-0.5, 0.2],
        ]);
        layer.biases = Matrix::from_data(vec![vec![0.05, -0.1]]);
        layer
    }

    #[test]
    fn new_layer_has_declared_shape_and_zero_bias() {
        let layer = Layer::new(4, 3, ActivationFunction::ReLU, &mut StdRng::seed_from_u64(3));
        assert_eq!((layer.weights.rows, layer.weights.cols), (3, 4));
        assert_eq!(layer.biases, Matrix::zeros(1, 4));
        let limit = ActivationFunction::ReLU.init_limit(3, 4);
        assert!(layer.weights.data.iter().flatten().all(|w| w.abs() <= limit));
    }

    #[test]
    fn forward_is_affine_then_activation() {
        let layer = fixed_layer(ActivationFunction::ReLU);
        let input = Matrix::from_data(vec![vec![1.0, 2.0, 3.0]]);
        let trace = layer.forward(&input);
        // z0 = 0.1 + 0.8 - 1.5 + 0.05, z1 = -0.2 + 0.6 + 0.6 - 0.1
        assert_abs_diff_eq!(trace.pre_activation.data[0][0], -0.55, epsilon = 1e-12);
        assert_abs_diff_eq!(trace.pre_activation.data[0][1], 0.9, epsilon = 1e-12);
        assert_abs_diff_eq!(trace.activation.data[0][0], 0.0);
        assert_abs_diff_eq!(trace.activation.data[0][1], 0.9, epsilon = 1e-12);
    }

    #[test]
    fn weight_gradient_matches_finite_difference() {
        let layer = fixed_layer(ActivationFunction::Sigmoid);
        let input = Matrix::from_data(vec![vec![0.3, -0.7, 1.1], vec![1.0, 0.5, -0.2]]);
        let target = Matrix::from_data(vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        let cost = |l: &Layer| {
            let a = l.forward(&input).activation;
            (&a - &target).map(|d| d * d).sum()
        };

        let trace = layer.forward(&input);
        let delta = (&trace.activation - &target).map(|d| 2.0 * d);
        let (w_grad, b_grad, _) = layer.compute_gradients(&delta, &input, &trace);

        let h = 1e-6;
        let mut plus = layer.clone();
        plus.weights.data[1][0] += h;
        let mut minus = layer.clone();
        minus.weights.data[1][0] -= h;
        let numeric = (cost(&plus) - cost(&minus)) / (2.0 * h);
        assert_abs_diff_eq!(w_grad.data[1][0], numeric, epsilon = 1e-6);

        let mut plus = layer.clone();
        plus.biases.data[0][1] += h;
        let mut minus = layer.clone();
        minus.biases.data[0][1] -= h;
        let numeric = (cost(&plus) - cost(&minus)) / (2.0 * h);
        assert_abs_diff_eq!(b_grad.data[0][1], numeric, epsilon = 1e-6);
    }

    #[test]
    fn apply_gradients_steps_against_gradient() {
        let mut layer = fixed_layer(ActivationFunction::Sigmoid);
        let before = layer.clone();
        let w_grad = Matrix::from_data(vec![vec![1.0, 0.0], vec![0.0, 0.0], vec![0.0, -2.0]]);
        let b_grad = Matrix::from_data(vec![vec![0.5, 0.0]]);
        layer.apply_gradients(&w_grad, &b_grad, 0.1);
        assert_abs_diff_eq!(layer.weights.data[0][0], before.weights.data[0][0] - 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(layer.weights.data[2][1], before.weights.data[2][1] + 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(layer.biases.data[0][0], before.biases.data[0][0] - 0.05, epsilon = 1e-12);
    }
}
