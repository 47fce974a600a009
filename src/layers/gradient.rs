use crate::error::{check_len, NnError, Result};
use crate::layers::dense::DenseLayer;
use crate::loss::LossFunction;
use crate::math::Matrix;
use crate::train::regulariser::Regulariser;

/// Step size for `Gradient::apply_deltas`.
#[derive(Debug, Clone, Copy)]
pub enum LearningRate<'a> {
    /// One rate for every weight.
    Scalar(f64),
    /// One rate per weight cell, same shape as the weights.
    PerWeight(&'a Matrix),
}

/// Backpropagation accumulator for one dense layer.
///
/// A trainer keeps one `Gradient` per layer, indexed in lockstep with the
/// network's layers.  Each backpropagation call seeds `output_error_derivatives`
/// (from the loss for the output layer, from the next layer's
/// `input_error_derivatives` otherwise), recomputes `input_error_derivatives`
/// for the previous layer, and adds this example's contribution to
/// `weight_deltas`.  `apply_deltas` writes the accumulated step into the layer
/// and zeroes everything.
#[derive(Debug, Clone)]
pub struct Gradient {
    inputs: usize,
    outputs: usize,
    input_error_derivatives: Vec<f64>,
    output_error_derivatives: Vec<f64>,
    weight_deltas: Matrix,
}

impl Gradient {
    pub fn new(layer: &DenseLayer) -> Gradient {
        let (rows, cols) = layer.weights().shape();
        Gradient {
            inputs: layer.inputs(),
            outputs: layer.outputs(),
            input_error_derivatives: vec![0.0; layer.inputs()],
            output_error_derivatives: vec![0.0; layer.outputs()],
            weight_deltas: Matrix::zeros(rows, cols),
        }
    }

    /// ∂loss/∂input for each raw input of the bound layer.  Seeds the previous
    /// layer's backpropagation.
    pub fn input_error_derivatives(&self) -> &[f64] {
        &self.input_error_derivatives
    }

    /// ∂loss/∂output for each output of the bound layer.
    pub fn output_error_derivatives(&self) -> &[f64] {
        &self.output_error_derivatives
    }

    /// Weight deltas accumulated since the last `apply_deltas`.
    pub fn weight_deltas(&self) -> &Matrix {
        &self.weight_deltas
    }

    /// Backpropagation through the network's final layer.
    pub fn backpropagate_output(
        &mut self,
        layer: &DenseLayer,
        target: &[f64],
        loss: &LossFunction,
        regularisers: &[Regulariser],
    ) -> Result<()> {
        self.check_layer(layer)?;
        let output = layer.cached_output().ok_or(NnError::StaleForwardPass)?;
        check_len("loss target", self.outputs, target.len())?;

        for i in 0..self.outputs {
            self.output_error_derivatives[i] = loss.error_derivative(output, target, i)?;
        }
        self.accumulate(layer, regularisers)
    }

    /// Backpropagation through an interior layer, chaining from the gradient
    /// of the layer after it.
    pub fn backpropagate_hidden(
        &mut self,
        layer: &DenseLayer,
        next: &Gradient,
        regularisers: &[Regulariser],
    ) -> Result<()> {
        self.check_layer(layer)?;
        check_len("chained layer gradient", self.outputs, next.inputs)?;

        self.output_error_derivatives
            .copy_from_slice(&next.input_error_derivatives);
        self.accumulate(layer, regularisers)
    }

    /// Subtracts `rate ⊙ weight_deltas` from the layer's weights, then zeroes
    /// the deltas and both error-derivative vectors.
    pub fn apply_deltas(&mut self, layer: &mut DenseLayer, rate: LearningRate<'_>) -> Result<()> {
        self.check_layer(layer)?;
        match rate {
            LearningRate::Scalar(rate) => layer.weights_mut().sub_scaled(&self.weight_deltas, rate)?,
            LearningRate::PerWeight(rates) => {
                layer.weights_mut().sub_hadamard(rates, &self.weight_deltas)?
            }
        }
        self.reset();
        Ok(())
    }

    /// Zeroes the deltas and error derivatives without touching the layer.
    pub fn reset(&mut self) {
        self.weight_deltas.zero();
        self.input_error_derivatives.iter_mut().for_each(|d| *d = 0.0);
        self.output_error_derivatives.iter_mut().for_each(|d| *d = 0.0);
    }

    /// Common step once `output_error_derivatives` is seeded.
    ///
    /// Only the diagonal activation derivative is used, also for interdependent
    /// activations such as softmax.
    fn accumulate(&mut self, layer: &DenseLayer, regularisers: &[Regulariser]) -> Result<()> {
        if layer.pre_activation().is_none() {
            return Err(NnError::StaleForwardPass);
        }
        let activation = layer.activation();
        let weights = layer.weights();
        let input = layer.biased_input();

        // ∂output_i/∂pre_activation_i · ∂loss/∂output_i
        let local: Vec<f64> = (0..self.outputs)
            .map(|i| activation.diagonal_derivative(i) * self.output_error_derivatives[i])
            .collect();

        // Raw input i sits behind the bias, at weight column i + 1.
        for i in 0..self.inputs {
            self.input_error_derivatives[i] = (0..self.outputs)
                .map(|j| weights[(j, i + 1)] * local[j])
                .sum();
        }

        for (i, row) in self.weight_deltas.data.iter_mut().enumerate() {
            for (j, delta) in row.iter_mut().enumerate() {
                let penalty: f64 = regularisers
                    .iter()
                    .map(|r| r.loss_derivative(weights[(i, j)]))
                    .sum();
                *delta += local[i] * input[j] + penalty;
            }
        }
        Ok(())
    }

    fn check_layer(&self, layer: &DenseLayer) -> Result<()> {
        check_len("gradient layer inputs", self.inputs, layer.inputs())?;
        check_len("gradient layer outputs", self.outputs, layer.outputs())
    }
}
