pub mod dense;
pub mod gradient;
pub mod sparse;

pub use dense::DenseLayer;
pub use gradient::{Gradient, LearningRate};
pub use sparse::SparseLayer;

use serde::{Deserialize, Serialize};

use crate::activation::ActivationFunction;
use crate::error::{NnError, Result};
use crate::math::Matrix;

/// Which variant a layer is, with its dimensions.  Trainers use this to
/// size per-weight or per-neuron learning rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerShape {
    Dense { inputs: usize, outputs: usize },
    Sparse { inputs: usize, outputs: usize },
}

/// A network layer.  Each variant supplies its own forward pass and gradient
/// construction; callers never inspect the variant to decide behaviour.
#[derive(Debug, Clone)]
pub enum Layer {
    Dense(DenseLayer),
    Sparse(SparseLayer),
}

impl Layer {
    pub fn dense(inputs: usize, outputs: usize, activation: ActivationFunction) -> Layer {
        Layer::Dense(DenseLayer::new(inputs, outputs, activation))
    }

    pub fn sparse(inputs: usize, outputs: usize, activation: ActivationFunction) -> Layer {
        Layer::Sparse(SparseLayer::new(inputs, outputs, activation))
    }

    pub fn inputs(&self) -> usize {
        match self {
            Layer::Dense(l) => l.inputs(),
            Layer::Sparse(l) => l.inputs(),
        }
    }

    pub fn outputs(&self) -> usize {
        match self {
            Layer::Dense(l) => l.outputs(),
            Layer::Sparse(l) => l.outputs(),
        }
    }

    pub fn shape(&self) -> LayerShape {
        let (inputs, outputs) = (self.inputs(), self.outputs());
        match self {
            Layer::Dense(_) => LayerShape::Dense { inputs, outputs },
            Layer::Sparse(_) => LayerShape::Sparse { inputs, outputs },
        }
    }

    pub fn set_input(&mut self, input: &[f64]) -> Result<()> {
        match self {
            Layer::Dense(l) => l.set_input(input),
            Layer::Sparse(l) => l.set_input(input),
        }
    }

    pub fn output(&mut self) -> Result<&[f64]> {
        match self {
            Layer::Dense(l) => l.output(),
            Layer::Sparse(l) => l.output(),
        }
    }

    /// Uncached forward pass.
    pub fn evaluate(&self, input: &[f64]) -> Result<Vec<f64>> {
        match self {
            Layer::Dense(l) => l.evaluate(input),
            Layer::Sparse(l) => l.evaluate(input),
        }
    }

    /// A fresh, zeroed gradient accumulator for this layer.
    pub fn gradient(&self) -> Result<Gradient> {
        match self {
            Layer::Dense(l) => Ok(Gradient::new(l)),
            Layer::Sparse(_) => Err(NnError::NotImplemented("sparse layer gradient")),
        }
    }

    pub fn weights(&self) -> Result<&Matrix> {
        self.as_dense().map(DenseLayer::weights)
    }

    pub fn set_weights(&mut self, weights: Matrix) -> Result<()> {
        self.as_dense_mut()?.set_weights(weights)
    }

    pub fn as_dense(&self) -> Result<&DenseLayer> {
        match self {
            Layer::Dense(l) => Ok(l),
            Layer::Sparse(_) => Err(NnError::NotImplemented("sparse layer weights")),
        }
    }

    pub fn as_dense_mut(&mut self) -> Result<&mut DenseLayer> {
        match self {
            Layer::Dense(l) => Ok(l),
            Layer::Sparse(_) => Err(NnError::NotImplemented("sparse layer weights")),
        }
    }
}

impl From<DenseLayer> for Layer {
    fn from(layer: DenseLayer) -> Self {
        Layer::Dense(layer)
    }
}

impl From<SparseLayer> for Layer {
    fn from(layer: SparseLayer) -> Self {
        Layer::Sparse(layer)
    }
}
