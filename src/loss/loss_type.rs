use serde::{Serialize, Deserialize};

use crate::error::{check_len, NnError, Result};
use crate::loss::{BinaryCrossEntropy, NegativeLogProb, SquaredError};

/// Selects the loss the trainer minimises.
///
/// - `SquaredError`       — pair with Identity or Sigmoid outputs.
/// - `NegativeLogProb`    — pair with a Softmax output and one-hot targets.
/// - `BinaryCrossEntropy` — single Sigmoid output, target 0 or 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossFunction {
    SquaredError,
    NegativeLogProb,
    BinaryCrossEntropy,
}

impl LossFunction {
    /// Scalar loss between a network output and its target.
    pub fn error(&self, output: &[f64], target: &[f64]) -> Result<f64> {
        check_len("loss target", output.len(), target.len())?;
        match self {
            LossFunction::SquaredError => Ok(SquaredError::error(output, target)),
            LossFunction::NegativeLogProb => Ok(NegativeLogProb::error(output, target)),
            LossFunction::BinaryCrossEntropy => {
                check_len("binary cross-entropy output", 1, output.len())?;
                Ok(BinaryCrossEntropy::error(output[0], target[0]))
            }
        }
    }

    /// ∂loss/∂output[i].
    pub fn error_derivative(&self, output: &[f64], target: &[f64], i: usize) -> Result<f64> {
        check_len("loss target", output.len(), target.len())?;
        if i >= output.len() {
            return Err(NnError::out_of_range("loss output", i, output.len()));
        }
        match self {
            LossFunction::SquaredError => Ok(SquaredError::derivative(output, target, i)),
            LossFunction::NegativeLogProb => Ok(NegativeLogProb::derivative(output, target, i)),
            LossFunction::BinaryCrossEntropy => {
                check_len("binary cross-entropy output", 1, output.len())?;
                Ok(BinaryCrossEntropy::derivative(output[0], target[0]))
            }
        }
    }
}
