use crate::activation::{Activation, ActivationFunction};
use crate::error::{check_len, Result};
use crate::math::Matrix;

/// Fully connected layer.
///
/// Weights are `outputs × (inputs + 1)`; column 0 is the bias.  The raw input
/// is stored with a leading 1 prepended, so `weights · input` is the
/// pre-activation with the bias folded in.
///
/// The pre-activation and output are memoised against a revision counter that
/// every input, weight or activation change bumps.  `output()` recomputes at
/// most once per revision.
#[derive(Debug, Clone)]
pub struct DenseLayer {
    inputs: usize,
    outputs: usize,
    weights: Matrix,
    activation: Activation,
    biased_input: Vec<f64>,
    pre_activation: Vec<f64>,
    output: Vec<f64>,
    revision: u64,
    computed: Option<u64>,
}

impl DenseLayer {
    /// New layer with zero weights and an all-zero input.  `inputs` excludes
    /// the bias term.
    pub fn new(inputs: usize, outputs: usize, activation: ActivationFunction) -> DenseLayer {
        let mut biased_input = vec![0.0; inputs + 1];
        biased_input[0] = 1.0;

        DenseLayer {
            inputs,
            outputs,
            weights: Matrix::zeros(outputs, inputs + 1),
            activation: Activation::new(activation),
            biased_input,
            pre_activation: vec![0.0; outputs],
            output: vec![0.0; outputs],
            revision: 0,
            computed: None,
        }
    }

    pub fn inputs(&self) -> usize {
        self.inputs
    }

    pub fn outputs(&self) -> usize {
        self.outputs
    }

    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    /// Replaces the weight matrix.  Its shape must be `outputs × (inputs + 1)`.
    pub fn set_weights(&mut self, weights: Matrix) -> Result<()> {
        check_len("dense weight rows", self.outputs, weights.rows)?;
        check_len("dense weight columns", self.inputs + 1, weights.cols)?;
        self.weights = weights;
        self.invalidate();
        Ok(())
    }

    /// Mutable access to the weights for in-place updates; invalidates the
    /// cached output.
    pub(crate) fn weights_mut(&mut self) -> &mut Matrix {
        self.invalidate();
        &mut self.weights
    }

    pub fn activation(&self) -> &Activation {
        &self.activation
    }

    pub fn set_activation(&mut self, function: ActivationFunction) {
        self.activation = Activation::new(function);
        self.invalidate();
    }

    /// Stores `input` behind the constant bias term.  Fails before touching
    /// any state if the length is not `inputs`.
    pub fn set_input(&mut self, input: &[f64]) -> Result<()> {
        check_len("dense layer input", self.inputs, input.len())?;
        self.biased_input[1..].copy_from_slice(input);
        self.invalidate();
        Ok(())
    }

    /// The processed input, `[1, x_0, …, x_{n-1}]`.
    pub fn biased_input(&self) -> &[f64] {
        &self.biased_input
    }

    /// Output for the current input and weights, recomputed only if stale.
    pub fn output(&mut self) -> Result<&[f64]> {
        if !self.is_current() {
            self.refresh()?;
        }
        Ok(&self.output)
    }

    /// `set_input` followed by `output`.
    pub fn forward(&mut self, input: &[f64]) -> Result<&[f64]> {
        self.set_input(input)?;
        self.output()
    }

    /// Computes the output for `input` without touching the cache.
    pub fn evaluate(&self, input: &[f64]) -> Result<Vec<f64>> {
        check_len("dense layer input", self.inputs, input.len())?;
        let mut biased = Vec::with_capacity(self.inputs + 1);
        biased.push(1.0);
        biased.extend_from_slice(input);

        let z = self.weights.mul_vec(&biased)?;
        let mut activation = Activation::new(self.activation.function());
        activation.peek(&z);
        Ok(activation.values().to_vec())
    }

    /// True while the cached pre-activation and output match the current
    /// input, weights and activation.
    pub fn is_current(&self) -> bool {
        self.computed == Some(self.revision)
    }

    /// Cached pre-activation, or `None` if the cache is stale.
    pub fn pre_activation(&self) -> Option<&[f64]> {
        self.is_current().then_some(self.pre_activation.as_slice())
    }

    /// Cached output, or `None` if the cache is stale.
    pub fn cached_output(&self) -> Option<&[f64]> {
        self.is_current().then_some(self.output.as_slice())
    }

    fn refresh(&mut self) -> Result<()> {
        let z = self.weights.mul_vec(&self.biased_input)?;
        self.activation.peek(&z);
        self.output.clear();
        self.output.extend_from_slice(self.activation.values());
        self.pre_activation = z;
        self.computed = Some(self.revision);
        Ok(())
    }

    fn invalidate(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
