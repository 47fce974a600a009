use crate::activation::ActivationFunction;
use crate::error::{NnError, Result};

/// Sparsely connected layer: connections kept per neuron rather than as a
/// weight matrix.  Only the shape is stored; every operation reports
/// `NotImplemented`.
#[derive(Debug, Clone)]
pub struct SparseLayer {
    inputs: usize,
    outputs: usize,
    activation: ActivationFunction,
}

impl SparseLayer {
    pub fn new(inputs: usize, outputs: usize, activation: ActivationFunction) -> SparseLayer {
        SparseLayer { inputs, outputs, activation }
    }

    pub fn inputs(&self) -> usize {
        self.inputs
    }

    pub fn outputs(&self) -> usize {
        self.outputs
    }

    pub fn activation(&self) -> ActivationFunction {
        self.activation
    }

    pub fn set_input(&mut self, _input: &[f64]) -> Result<()> {
        Err(NnError::NotImplemented("sparse layer input"))
    }

    pub fn output(&mut self) -> Result<&[f64]> {
        Err(NnError::NotImplemented("sparse layer forward pass"))
    }

    pub fn evaluate(&self, _input: &[f64]) -> Result<Vec<f64>> {
        Err(NnError::NotImplemented("sparse layer forward pass"))
    }
}
