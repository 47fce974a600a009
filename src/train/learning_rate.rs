use crate::error::{NnError, Result};
use crate::layers::{LayerShape, LearningRate};
use crate::math::Matrix;

/// Per-layer rate storage used when individual learning rates are on.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerRates {
    /// Dense layer: one rate per weight cell, shaped like the weights.
    PerWeight(Matrix),
    /// Sparse layer: one rate per neuron.
    PerNeuron(Vec<f64>),
}

impl LayerRates {
    fn for_shape(shape: LayerShape, rate: f64) -> LayerRates {
        match shape {
            LayerShape::Dense { inputs, outputs } => {
                LayerRates::PerWeight(Matrix::filled(outputs, inputs + 1, rate))
            }
            LayerShape::Sparse { outputs, .. } => LayerRates::PerNeuron(vec![rate; outputs]),
        }
    }

    fn fill(&mut self, rate: f64) {
        match self {
            LayerRates::PerWeight(m) => m.fill(rate),
            LayerRates::PerNeuron(v) => v.iter_mut().for_each(|r| *r = rate),
        }
    }
}

/// Learning-rate policy: one scalar for every weight, or independently
/// settable rates per weight (dense) and per neuron (sparse).
///
/// Accessors fail with `InvalidAccess` when used in the wrong mode.
#[derive(Debug, Clone, PartialEq)]
pub struct LearningRates {
    scalar: f64,
    individual: bool,
    /// Network shape the per-layer rates were allocated for.
    shape: Vec<LayerShape>,
    layers: Vec<LayerRates>,
}

impl LearningRates {
    pub fn new(scalar: f64) -> LearningRates {
        LearningRates { scalar, individual: false, shape: Vec::new(), layers: Vec::new() }
    }

    pub fn is_individual(&self) -> bool {
        self.individual
    }

    /// True when per-layer rates exist for a bound network.
    pub fn is_allocated(&self) -> bool {
        !self.shape.is_empty() && self.layers.len() == self.shape.len()
    }

    /// The shared rate.  Fails while individual rates are on.
    pub fn scalar(&self) -> Result<f64> {
        if self.individual {
            return Err(NnError::InvalidAccess(
                "the scalar learning rate is unavailable while individual learning rates are on".into(),
            ));
        }
        Ok(self.scalar)
    }

    /// Sets the shared rate.  With individual rates on, every allocated rate is
    /// overwritten with it as well.
    pub fn set_scalar(&mut self, rate: f64) {
        self.scalar = rate;
        if self.individual {
            self.layers.iter_mut().for_each(|l| l.fill(rate));
        }
    }

    /// Raw scalar value, regardless of mode.
    pub(crate) fn scalar_value(&self) -> f64 {
        self.scalar
    }

    /// Switches storage mode.  Turning individual rates on for a bound shape
    /// allocates them filled with the scalar rate.
    pub fn set_individual(&mut self, individual: bool) {
        self.individual = individual;
        if individual {
            let shape = std::mem::take(&mut self.shape);
            self.allocate(shape);
        } else {
            self.layers.clear();
        }
    }

    /// Binds the rates to a network shape.  Individual rates survive a re-bind
    /// to an identical shape and are re-allocated otherwise.
    pub fn bind(&mut self, shape: &[LayerShape]) {
        if self.shape == shape && (self.is_allocated() || !self.individual) {
            return;
        }
        self.allocate(shape.to_vec());
    }

    fn allocate(&mut self, shape: Vec<LayerShape>) {
        self.layers = if self.individual {
            shape.iter().map(|&s| LayerRates::for_shape(s, self.scalar)).collect()
        } else {
            Vec::new()
        };
        self.shape = shape;
    }

    /// Rate of the weight joining biased input `input_index` (0 = bias) to
    /// neuron `output_index` of dense layer `layer`.
    pub fn weight_rate(&self, layer: usize, input_index: usize, output_index: usize) -> Result<f64> {
        let rates = self.dense_rates(layer)?;
        check_cell(rates, input_index, output_index)?;
        Ok(rates[(output_index, input_index)])
    }

    pub fn set_weight_rate(
        &mut self,
        layer: usize,
        input_index: usize,
        output_index: usize,
        rate: f64,
    ) -> Result<()> {
        let rates = self.dense_rates_mut(layer)?;
        check_cell(rates, input_index, output_index)?;
        rates[(output_index, input_index)] = rate;
        Ok(())
    }

    /// Rate of neuron `index` of sparse layer `layer`.
    pub fn neuron_rate(&self, layer: usize, index: usize) -> Result<f64> {
        let rates = self.sparse_rates(layer)?;
        rates
            .get(index)
            .copied()
            .ok_or_else(|| NnError::out_of_range("neuron learning rate", index, rates.len()))
    }

    pub fn set_neuron_rate(&mut self, layer: usize, index: usize, rate: f64) -> Result<()> {
        let rates = self.sparse_rates_mut(layer)?;
        let len = rates.len();
        let cell = rates
            .get_mut(index)
            .ok_or_else(|| NnError::out_of_range("neuron learning rate", index, len))?;
        *cell = rate;
        Ok(())
    }

    /// The rate to hand a layer's gradient when applying its deltas.
    pub fn for_layer(&self, layer: usize) -> Result<LearningRate<'_>> {
        if !self.individual {
            return Ok(LearningRate::Scalar(self.scalar));
        }
        match self.layer_rates(layer)? {
            LayerRates::PerWeight(m) => Ok(LearningRate::PerWeight(m)),
            LayerRates::PerNeuron(_) => Err(NnError::NotImplemented("sparse layer learning rates")),
        }
    }

    fn layer_rates(&self, layer: usize) -> Result<&LayerRates> {
        self.check_individual()?;
        self.layers
            .get(layer)
            .ok_or_else(|| NnError::out_of_range("learning rate layer", layer, self.layers.len()))
    }

    fn layer_rates_mut(&mut self, layer: usize) -> Result<&mut LayerRates> {
        self.check_individual()?;
        let len = self.layers.len();
        self.layers
            .get_mut(layer)
            .ok_or_else(|| NnError::out_of_range("learning rate layer", layer, len))
    }

    fn dense_rates(&self, layer: usize) -> Result<&Matrix> {
        match self.layer_rates(layer)? {
            LayerRates::PerWeight(m) => Ok(m),
            LayerRates::PerNeuron(_) => Err(kind_mismatch(layer, "sparse", "(layer, index)")),
        }
    }

    fn dense_rates_mut(&mut self, layer: usize) -> Result<&mut Matrix> {
        match self.layer_rates_mut(layer)? {
            LayerRates::PerWeight(m) => Ok(m),
            LayerRates::PerNeuron(_) => Err(kind_mismatch(layer, "sparse", "(layer, index)")),
        }
    }

    fn sparse_rates(&self, layer: usize) -> Result<&Vec<f64>> {
        match self.layer_rates(layer)? {
            LayerRates::PerNeuron(v) => Ok(v),
            LayerRates::PerWeight(_) => {
                Err(kind_mismatch(layer, "dense", "(layer, input, output)"))
            }
        }
    }

    fn sparse_rates_mut(&mut self, layer: usize) -> Result<&mut Vec<f64>> {
        match self.layer_rates_mut(layer)? {
            LayerRates::PerNeuron(v) => Ok(v),
            LayerRates::PerWeight(_) => {
                Err(kind_mismatch(layer, "dense", "(layer, input, output)"))
            }
        }
    }

    fn check_individual(&self) -> Result<()> {
        if !self.individual {
            return Err(NnError::InvalidAccess(
                "indexed learning rates need individual learning rates to be on".into(),
            ));
        }
        if !self.is_allocated() {
            return Err(NnError::InvalidAccess(
                "individual learning rates are allocated when a network is bound".into(),
            ));
        }
        Ok(())
    }
}

fn check_cell(rates: &Matrix, input_index: usize, output_index: usize) -> Result<()> {
    if input_index >= rates.cols {
        return Err(NnError::out_of_range("learning rate input", input_index, rates.cols));
    }
    if output_index >= rates.rows {
        return Err(NnError::out_of_range("learning rate output", output_index, rates.rows));
    }
    Ok(())
}

fn kind_mismatch(layer: usize, kind: &str, addressing: &str) -> NnError {
    NnError::InvalidAccess(format!(
        "layer {layer} is {kind}; address its learning rates by {addressing}"
    ))
}
