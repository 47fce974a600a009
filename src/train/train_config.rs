use serde::{Serialize, Deserialize};

use crate::error::Result;
use crate::loss::LossFunction;
use crate::train::initialiser::Initialiser;
use crate::train::regulariser::Regulariser;

/// Serializable trainer options, applied with `Trainer::from_config`.
///
/// # Fields
/// - `learning_rate`             — scalar step size; also the fill value for individual rates
/// - `individual_learning_rates` — store one rate per weight instead of one shared rate
/// - `stochastic`                — apply deltas after every point instead of every batch
/// - `evaluation_frequency`      — epochs between evaluation snapshots
/// - `seed`                      — RNG seed for initialisation and batch selection;
///                                 `None` seeds from entropy
/// - `loss`, `initialiser`       — required before training can start
/// - `regularisers`              — weight penalties, summed
/// - `epoch_limit`               — registers an `EpochLimit` termination condition
///
/// Batch selectors and custom termination conditions are closures and are
/// attached to the trainer directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub learning_rate: f64,
    pub individual_learning_rates: bool,
    pub stochastic: bool,
    pub evaluation_frequency: usize,
    pub seed: Option<u64>,
    pub loss: Option<LossFunction>,
    pub initialiser: Option<Initialiser>,
    pub regularisers: Vec<Regulariser>,
    pub epoch_limit: Option<usize>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            learning_rate: 0.0,
            individual_learning_rates: false,
            stochastic: false,
            evaluation_frequency: 10,
            seed: None,
            loss: None,
            initialiser: None,
            regularisers: Vec::new(),
            epoch_limit: None,
        }
    }
}

impl TrainConfig {
    /// Serializes the config to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a `TrainConfig` from a JSON file.  Missing fields take
    /// their defaults.
    pub fn load_json(path: &str) -> Result<TrainConfig> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let json = r#"{
            "learning_rate": 0.15,
            "loss": "squared_error",
            "initialiser": { "uniform": { "min": -0.2, "max": 0.2, "zero_bias": false } },
            "regularisers": [ { "l2": { "strength": 0.001 } } ],
            "epoch_limit": 100
        }"#;
        let config: TrainConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.evaluation_frequency, 10);
        assert!(!config.stochastic);
        assert_eq!(config.loss, Some(LossFunction::SquaredError));
        assert_eq!(
            config.initialiser,
            Some(Initialiser::Uniform { min: -0.2, max: 0.2, zero_bias: false })
        );
        assert_eq!(config.regularisers, vec![Regulariser::L2 { strength: 0.001 }]);
    }

    #[test]
    fn json_file_round_trip() {
        let config = TrainConfig {
            learning_rate: 0.05,
            stochastic: true,
            seed: Some(42),
            loss: Some(LossFunction::NegativeLogProb),
            initialiser: Some(Initialiser::He),
            ..TrainConfig::default()
        };
        let path = std::env::temp_dir().join(format!("strata-nn-config-{}.json", std::process::id()));
        let path = path.to_str().unwrap();
        config.save_json(path).unwrap();
        let loaded = TrainConfig::load_json(path).unwrap();
        std::fs::remove_file(path).unwrap();
        assert_eq!(loaded, config);
    }
}
