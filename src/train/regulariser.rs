use serde::{Serialize, Deserialize};

use crate::error::Result;
use crate::network::Network;

/// A weight penalty added both to the scalar loss and to every weight delta.
///
/// Penalties cover all dense weights, bias columns included.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regulariser {
    /// `λ Σ |w|`
    L1 { strength: f64 },
    /// `½ λ Σ w²`
    L2 { strength: f64 },
}

impl Regulariser {
    /// Penalty over every weight of the network.  Fails on sparse layers.
    pub fn loss(&self, network: &Network) -> Result<f64> {
        let mut total = 0.0;
        for layer in network.layers() {
            total += layer.weights()?.iter().map(|w| self.weight_loss(w)).sum::<f64>();
        }
        Ok(total)
    }

    /// ∂penalty/∂w for a single weight.
    pub fn loss_derivative(&self, weight: f64) -> f64 {
        match *self {
            Regulariser::L1 { strength } => {
                if weight > 0.0 {
                    strength
                } else if weight < 0.0 {
                    -strength
                } else {
                    0.0
                }
            }
            Regulariser::L2 { strength } => strength * weight,
        }
    }

    fn weight_loss(&self, weight: f64) -> f64 {
        match *self {
            Regulariser::L1 { strength } => strength * weight.abs(),
            Regulariser::L2 { strength } => 0.5 * strength * weight * weight,
        }
    }
}
