use serde::{Serialize, Deserialize};

use crate::activation::ActivationFunction;
use crate::error::{NnError, Result};
use crate::network::network::Network;

/// Connection style of a hidden layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    #[default]
    Dense,
    Sparse,
}

/// Describes one hidden layer in a network specification.
///
/// Fields:
/// - `nodes`      — number of neurons in this layer
/// - `activation` — activation function applied after the linear transform
/// - `kind`       — dense (default) or sparse connections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub nodes: usize,
    pub activation: ActivationFunction,
    #[serde(default)]
    pub kind: LayerKind,
}

/// A serializable description of a network architecture.
///
/// Only the topology is recorded, never weights; `build()` yields a network
/// with zeroed weights for a trainer's initialiser to fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Human-readable name.
    pub name: String,
    pub inputs: usize,
    pub outputs: usize,
    /// Hidden layers, input side first.
    #[serde(default)]
    pub hidden: Vec<LayerSpec>,
    pub output_activation: ActivationFunction,
}

impl NetworkSpec {
    pub fn build(&self) -> Result<Network> {
        if self.inputs == 0 || self.outputs == 0 {
            return Err(NnError::InvalidArgument(format!(
                "network '{}' needs at least one input and one output",
                self.name
            )));
        }
        if let Some(i) = self.hidden.iter().position(|l| l.nodes == 0) {
            return Err(NnError::InvalidArgument(format!(
                "hidden layer {i} of network '{}' has no nodes",
                self.name
            )));
        }

        let network = self.hidden.iter().fold(
            Network::new(self.inputs, self.outputs),
            |network, layer| match layer.kind {
                LayerKind::Dense => network.add_hidden_layer(layer.nodes, layer.activation),
                LayerKind::Sparse => network.add_sparse_layer(layer.nodes, layer.activation),
            },
        );
        Ok(network.add_output_layer(self.output_activation))
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a `NetworkSpec` from a JSON file.
    pub fn load_json(path: &str) -> Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::LayerShape;

    #[test]
    fn parses_and_builds_from_json() {
        let json = r#"{
            "name": "xor",
            "inputs": 2,
            "outputs": 1,
            "hidden": [ { "nodes": 5, "activation": "Sigmoid" } ],
            "output_activation": "Sigmoid"
        }"#;
        let spec: NetworkSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.hidden[0].kind, LayerKind::Dense);

        let network = spec.build().unwrap();
        assert_eq!(
            network.shape(),
            vec![
                LayerShape::Dense { inputs: 2, outputs: 5 },
                LayerShape::Dense { inputs: 5, outputs: 1 },
            ]
        );
    }

    #[test]
    fn zero_node_layer_is_rejected() {
        let spec = NetworkSpec {
            name: "bad".into(),
            inputs: 2,
            outputs: 1,
            hidden: vec![LayerSpec { nodes: 0, activation: ActivationFunction::ReLU, kind: LayerKind::Dense }],
            output_activation: ActivationFunction::Identity,
        };
        assert!(matches!(spec.build(), Err(NnError::InvalidArgument(_))));
    }

    #[test]
    fn json_file_round_trip() {
        let spec = NetworkSpec {
            name: "classifier".into(),
            inputs: 2,
            outputs: 4,
            hidden: vec![LayerSpec {
                nodes: 5,
                activation: ActivationFunction::LeakyReLU { alpha: 0.01 },
                kind: LayerKind::Dense,
            }],
            output_activation: ActivationFunction::Softmax,
        };
        let path = std::env::temp_dir().join(format!("strata-nn-spec-{}.json", std::process::id()));
        let path = path.to_str().unwrap();
        spec.save_json(path).unwrap();
        let loaded = NetworkSpec::load_json(path).unwrap();
        std::fs::remove_file(path).unwrap();
        assert_eq!(loaded, spec);
    }
}
