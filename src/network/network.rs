use crate::activation::ActivationFunction;
use crate::error::{check_len, NnError, Result};
use crate::layers::{Layer, LayerShape};

/// An ordered chain of layers.  The output count of layer `i` always equals
/// the input count of layer `i + 1`; appending a layer that breaks the chain
/// fails.
#[derive(Debug, Clone)]
pub struct Network {
    inputs: usize,
    outputs: usize,
    layers: Vec<Layer>,
}

impl Network {
    /// Declares the input and output widths.  Add layers with
    /// `add_hidden_layer` / `add_output_layer`.
    pub fn new(inputs: usize, outputs: usize) -> Network {
        Network { inputs, outputs, layers: Vec::new() }
    }

    pub fn inputs(&self) -> usize {
        self.inputs
    }

    pub fn outputs(&self) -> usize {
        self.outputs
    }

    /// Appends a dense layer of `nodes` neurons fed by the previous layer (or
    /// the network input).
    pub fn add_hidden_layer(mut self, nodes: usize, activation: ActivationFunction) -> Network {
        let inputs = self.next_input_count();
        self.layers.push(Layer::dense(inputs, nodes, activation));
        self
    }

    /// Appends a dense layer with the network's declared output width.
    pub fn add_output_layer(self, activation: ActivationFunction) -> Network {
        let outputs = self.outputs;
        self.add_hidden_layer(outputs, activation)
    }

    /// Appends `count` hidden layers of `nodes` neurons each.
    pub fn add_multiple_layers(
        self,
        count: usize,
        nodes: usize,
        activation: ActivationFunction,
    ) -> Network {
        (0..count).fold(self, |network, _| network.add_hidden_layer(nodes, activation))
    }

    /// Appends a sparse layer of `nodes` neurons.
    pub fn add_sparse_layer(mut self, nodes: usize, activation: ActivationFunction) -> Network {
        let inputs = self.next_input_count();
        self.layers.push(Layer::sparse(inputs, nodes, activation));
        self
    }

    /// Appends an already-built layer, checking it chains onto the last one.
    pub fn push_layer(&mut self, layer: Layer) -> Result<()> {
        check_len("appended layer inputs", self.next_input_count(), layer.inputs())?;
        self.layers.push(layer);
        Ok(())
    }

    /// Input width the next appended layer must have.
    pub fn next_input_count(&self) -> usize {
        self.layers.last().map_or(self.inputs, Layer::outputs)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Result<&Layer> {
        self.layers
            .get(index)
            .ok_or_else(|| NnError::out_of_range("layer", index, self.layers.len()))
    }

    pub fn layer_mut(&mut self, index: usize) -> Result<&mut Layer> {
        let len = self.layers.len();
        self.layers
            .get_mut(index)
            .ok_or_else(|| NnError::out_of_range("layer", index, len))
    }

    pub fn shape(&self) -> Vec<LayerShape> {
        self.layers.iter().map(Layer::shape).collect()
    }

    /// Checks the network has layers and its last layer matches the declared
    /// output width.
    pub fn validate(&self) -> Result<()> {
        let last = self
            .layers
            .last()
            .ok_or_else(|| NnError::InvalidArgument("network has no layers".into()))?;
        check_len("network output layer", self.outputs, last.outputs())
    }

    /// Feeds `input` through every layer immediately, leaving each layer's
    /// pre-activation and output materialised for backpropagation.
    pub fn set_input(&mut self, input: &[f64]) -> Result<()> {
        check_len("network input", self.inputs, input.len())?;
        self.validate()?;

        self.layers[0].set_input(input)?;
        for i in 1..self.layers.len() {
            let (done, rest) = self.layers.split_at_mut(i);
            rest[0].set_input(done[i - 1].output()?)?;
        }
        self.output().map(|_| ())
    }

    /// Output of the final layer for the current input.
    pub fn output(&mut self) -> Result<&[f64]> {
        match self.layers.last_mut() {
            Some(layer) => layer.output(),
            None => Err(NnError::InvalidArgument("network has no layers".into())),
        }
    }

    /// `set_input` followed by `output`.
    pub fn output_of(&mut self, input: &[f64]) -> Result<&[f64]> {
        self.set_input(input)?;
        self.output()
    }

    /// Forward pass that leaves every layer cache untouched.
    pub fn predict(&self, input: &[f64]) -> Result<Vec<f64>> {
        check_len("network input", self.inputs, input.len())?;
        self.validate()?;
        self.layers
            .iter()
            .try_fold(input.to_vec(), |current, layer| layer.evaluate(&current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Matrix;

    fn weighted_2_2_1() -> Network {
        let mut network = Network::new(2, 1)
            .add_hidden_layer(2, ActivationFunction::Sigmoid)
            .add_output_layer(ActivationFunction::Sigmoid);
        network.layers[0]
            .set_weights(Matrix::from_data(vec![vec![0.1, -0.3, 0.7], vec![0.2, 0.4, -0.6]]).unwrap())
            .unwrap();
        network.layers[1]
            .set_weights(Matrix::from_data(vec![vec![-0.5, 0.9, 0.25]]).unwrap())
            .unwrap();
        network
    }

    #[test]
    fn builder_infers_input_counts() {
        let network = Network::new(3, 2)
            .add_multiple_layers(2, 4, ActivationFunction::ReLU)
            .add_output_layer(ActivationFunction::Softmax);
        assert_eq!(
            network.shape(),
            vec![
                LayerShape::Dense { inputs: 3, outputs: 4 },
                LayerShape::Dense { inputs: 4, outputs: 4 },
                LayerShape::Dense { inputs: 4, outputs: 2 },
            ]
        );
        assert!(network.validate().is_ok());
    }

    #[test]
    fn output_layer_without_hidden_layers_uses_network_inputs() {
        let network = Network::new(3, 1).add_output_layer(ActivationFunction::Identity);
        assert_eq!(network.shape(), vec![LayerShape::Dense { inputs: 3, outputs: 1 }]);
    }

    #[test]
    fn push_layer_rejects_broken_chain() {
        let mut network = Network::new(2, 1).add_hidden_layer(3, ActivationFunction::Tanh);
        let err = network
            .push_layer(Layer::dense(2, 1, ActivationFunction::Sigmoid))
            .unwrap_err();
        assert!(matches!(err, NnError::DimensionMismatch { expected: 3, actual: 2, .. }));
        assert!(network.push_layer(Layer::dense(3, 1, ActivationFunction::Sigmoid)).is_ok());
    }

    #[test]
    fn forward_pass_is_deterministic() {
        let mut network = weighted_2_2_1();
        let first = network.output_of(&[0.3, -1.1]).unwrap().to_vec();
        let second = network.output_of(&[0.3, -1.1]).unwrap().to_vec();
        assert_eq!(first, second);
        assert_eq!(network.predict(&[0.3, -1.1]).unwrap(), first);
    }

    #[test]
    fn set_input_materialises_every_layer() {
        let mut network = weighted_2_2_1();
        network.set_input(&[1.0, 0.0]).unwrap();
        for layer in network.layers() {
            assert!(layer.as_dense().unwrap().pre_activation().is_some());
        }
        let hidden = network.layers[0].as_dense().unwrap().cached_output().unwrap().to_vec();
        let out = network.layers[1].as_dense().unwrap();
        assert_eq!(&out.biased_input()[1..], hidden.as_slice());
    }

    #[test]
    fn wrong_input_width_and_empty_network_fail() {
        let mut network = weighted_2_2_1();
        assert!(network.set_input(&[1.0]).is_err());
        assert!(network.predict(&[1.0, 2.0, 3.0]).is_err());
        assert!(Network::new(2, 1).predict(&[0.0, 0.0]).is_err());
    }

    #[test]
    fn mismatched_output_width_is_invalid() {
        let network = Network::new(2, 3).add_hidden_layer(2, ActivationFunction::Sigmoid);
        assert!(network.validate().is_err());
    }
}
