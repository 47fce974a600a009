use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::error::{check_len, NnError, Result};
use crate::layers::Layer;
use crate::math::Matrix;
use crate::network::Network;

/// Weight initialisation strategy applied at the start of every training run.
///
/// - `Uniform` — every weight from U(min, max); `zero_bias` then clears column 0
/// - `Xavier`  — N(0, 1/fan_in), suited to Sigmoid and Tanh
/// - `He`      — N(0, 2/fan_in), suited to ReLU
/// - `Custom`  — explicit weight matrices, one per layer, shapes checked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Initialiser {
    Uniform { min: f64, max: f64, zero_bias: bool },
    Xavier,
    He,
    Custom(Vec<Matrix>),
}

impl Initialiser {
    pub fn initialise<R: Rng + ?Sized>(&self, network: &mut Network, rng: &mut R) -> Result<()> {
        if let Initialiser::Custom(matrices) = self {
            check_len("custom initialiser matrices", network.layers().len(), matrices.len())?;
        }

        for index in 0..network.layers().len() {
            let layer = match network.layer_mut(index)? {
                Layer::Dense(layer) => layer,
                Layer::Sparse(_) => {
                    return Err(NnError::NotImplemented("sparse layer initialisation"))
                }
            };
            let (rows, cols) = layer.weights().shape();

            let weights = match self {
                Initialiser::Uniform { min, max, zero_bias } => {
                    let mut weights = Matrix::random_uniform(rows, cols, *min, *max, rng);
                    if *zero_bias {
                        weights.data.iter_mut().for_each(|row| row[0] = 0.0);
                    }
                    weights
                }
                Initialiser::Xavier => Matrix::xavier(rows, cols, rng),
                Initialiser::He => Matrix::he(rows, cols, rng),
                Initialiser::Custom(matrices) => matrices[index].clone(),
            };
            layer.set_weights(weights)?;
        }
        Ok(())
    }
}
