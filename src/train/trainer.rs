use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, trace, warn};

use crate::data::{DataPoint, DataSet, DataSetKind};
use crate::error::{check_len, NnError, Result};
use crate::layers::{Gradient, Layer, LayerShape};
use crate::loss::LossFunction;
use crate::network::Network;
use crate::train::batch::BatchSelector;
use crate::train::evaluation::Evaluation;
use crate::train::initialiser::Initialiser;
use crate::train::learning_rate::LearningRates;
use crate::train::regulariser::Regulariser;
use crate::train::termination::{EpochLimit, TerminationCondition, TrainingProgress};
use crate::train::train_config::TrainConfig;

/// Lifecycle of a `Trainer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerState {
    /// At least one readiness requirement is unmet (see `troubleshoot`).
    Unconfigured,
    Ready,
    Training,
    /// The last run stopped on a termination condition.
    Finished,
}

/// Backpropagation trainer for feedforward networks.
///
/// Requirements before `train` may run: a bound network, an initialiser, a
/// loss function, a positive scalar learning rate (or allocated individual
/// rates), at least one termination condition, a batch selector and a
/// non-zero evaluation frequency.
///
/// Every run re-initialises the weights, allocates one `Gradient` per layer,
/// and then repeats epochs until any termination condition reports finished.
/// An epoch keeps drawing batches until it has consumed as many points as the
/// training set holds.
pub struct Trainer {
    learning_rates: LearningRates,
    initialiser: Option<Initialiser>,
    loss: Option<LossFunction>,
    regularisers: Vec<Regulariser>,
    termination: Vec<Box<dyn TerminationCondition>>,
    batch_selector: Option<BatchSelector>,
    stochastic: bool,
    evaluation_frequency: usize,
    rng: StdRng,

    /// Shape of the bound network.
    network: Option<Vec<LayerShape>>,
    epoch: usize,
    evaluations: Vec<Evaluation>,
    training: bool,
    finished: bool,
}

impl Default for Trainer {
    fn default() -> Self {
        Trainer::from_config(&TrainConfig::default())
    }
}

impl Trainer {
    pub fn new() -> Trainer {
        Trainer::default()
    }

    pub fn from_config(config: &TrainConfig) -> Trainer {
        let mut learning_rates = LearningRates::new(config.learning_rate);
        learning_rates.set_individual(config.individual_learning_rates);

        let mut termination: Vec<Box<dyn TerminationCondition>> = Vec::new();
        if let Some(limit) = config.epoch_limit {
            termination.push(Box::new(EpochLimit(limit)));
        }

        Trainer {
            learning_rates,
            initialiser: config.initialiser.clone(),
            loss: config.loss,
            regularisers: config.regularisers.clone(),
            termination,
            batch_selector: None,
            stochastic: config.stochastic,
            evaluation_frequency: config.evaluation_frequency,
            rng: config.seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64),
            network: None,
            epoch: 0,
            evaluations: Vec::new(),
            training: false,
            finished: false,
        }
    }

    // ---------------------------------------------------------------------------
    // Configuration
    // ---------------------------------------------------------------------------

    pub fn set_initialiser(&mut self, initialiser: Initialiser) {
        self.initialiser = Some(initialiser);
    }

    pub fn set_loss(&mut self, loss: LossFunction) {
        self.loss = Some(loss);
    }

    pub fn loss_function(&self) -> Option<LossFunction> {
        self.loss
    }

    pub fn add_regulariser(&mut self, regulariser: Regulariser) {
        self.regularisers.push(regulariser);
    }

    pub fn regularisers(&self) -> &[Regulariser] {
        &self.regularisers
    }

    pub fn add_termination_condition<T>(&mut self, condition: T)
    where
        T: TerminationCondition + 'static,
    {
        self.termination.push(Box::new(condition));
    }

    /// Registers a closure as a termination condition.
    pub fn stop_when<F>(&mut self, condition: F)
    where
        F: Fn(&TrainingProgress<'_>) -> bool + 'static,
    {
        self.add_termination_condition(condition);
    }

    pub fn set_batch_selector(&mut self, selector: BatchSelector) {
        self.batch_selector = Some(selector);
    }

    pub fn set_stochastic(&mut self, stochastic: bool) {
        self.stochastic = stochastic;
    }

    pub fn is_stochastic(&self) -> bool {
        self.stochastic
    }

    pub fn set_evaluation_frequency(&mut self, epochs: usize) {
        self.evaluation_frequency = epochs;
    }

    pub fn evaluation_frequency(&self) -> usize {
        self.evaluation_frequency
    }

    /// Reseeds the trainer's RNG.
    pub fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Records the network's shape so layer kinds and individual learning
    /// rates can be queried before training.  `train` binds automatically.
    pub fn bind(&mut self, network: &Network) {
        let shape = network.shape();
        self.learning_rates.bind(&shape);
        self.network = Some(shape);
    }

    // ---------------------------------------------------------------------------
    // Learning rates
    // ---------------------------------------------------------------------------

    /// The shared learning rate.  Fails while individual rates are on.
    pub fn learning_rate(&self) -> Result<f64> {
        self.learning_rates.scalar()
    }

    /// Sets the shared learning rate; with individual rates on, every rate is
    /// overwritten with it.
    pub fn set_learning_rate(&mut self, rate: f64) {
        self.learning_rates.set_scalar(rate);
    }

    pub fn individual_learning_rates(&self) -> bool {
        self.learning_rates.is_individual()
    }

    /// Switches rate storage.  Turning individual rates on re-allocates them,
    /// filled with the scalar rate, for the bound network.
    pub fn set_individual_learning_rates(&mut self, individual: bool) {
        self.learning_rates.set_individual(individual);
    }

    /// Rate of the weight joining biased input `input_index` (0 = bias) to
    /// neuron `output_index` of a dense layer.
    pub fn weight_learning_rate(
        &self,
        layer: usize,
        input_index: usize,
        output_index: usize,
    ) -> Result<f64> {
        self.learning_rates.weight_rate(layer, input_index, output_index)
    }

    pub fn set_weight_learning_rate(
        &mut self,
        layer: usize,
        input_index: usize,
        output_index: usize,
        rate: f64,
    ) -> Result<()> {
        self.learning_rates.set_weight_rate(layer, input_index, output_index, rate)
    }

    /// Rate of one neuron of a sparse layer.
    pub fn neuron_learning_rate(&self, layer: usize, index: usize) -> Result<f64> {
        self.learning_rates.neuron_rate(layer, index)
    }

    pub fn set_neuron_learning_rate(&mut self, layer: usize, index: usize, rate: f64) -> Result<()> {
        self.learning_rates.set_neuron_rate(layer, index, rate)
    }

    // ---------------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------------

    pub fn is_dense_layer(&self, layer: usize) -> Result<bool> {
        Ok(matches!(self.bound_layer(layer)?, LayerShape::Dense { .. }))
    }

    pub fn is_sparse_layer(&self, layer: usize) -> Result<bool> {
        Ok(matches!(self.bound_layer(layer)?, LayerShape::Sparse { .. }))
    }

    fn bound_layer(&self, layer: usize) -> Result<LayerShape> {
        let shape = self
            .network
            .as_ref()
            .ok_or_else(|| NnError::InvalidAccess("the trainer has not been given a network".into()))?;
        shape
            .get(layer)
            .copied()
            .ok_or_else(|| NnError::out_of_range("layer", layer, shape.len()))
    }

    /// Epochs completed in the current or last run.
    pub fn epoch(&self) -> usize {
        self.epoch
    }

    pub fn state(&self) -> TrainerState {
        if self.training {
            TrainerState::Training
        } else if self.finished {
            TrainerState::Finished
        } else if self.is_ready() {
            TrainerState::Ready
        } else {
            TrainerState::Unconfigured
        }
    }

    pub fn is_ready(&self) -> bool {
        self.issues().is_empty()
    }

    /// Every unmet readiness requirement, or the single entry
    /// `"no visible issues"`.
    pub fn troubleshoot(&self) -> Vec<String> {
        let issues = self.issues();
        if issues.is_empty() {
            vec!["no visible issues".to_string()]
        } else {
            issues
        }
    }

    fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.network.is_none() {
            issues.push("no network");
        }
        if self.initialiser.is_none() {
            issues.push("no initialiser");
        }
        if self.loss.is_none() {
            issues.push("no loss function");
        }
        if self.learning_rates.is_individual() {
            if !self.learning_rates.is_allocated() {
                issues.push("individual learning rates is true, but no learning rate lists");
            }
        } else if self.learning_rates.scalar_value() <= 0.0 {
            issues.push("learning rate is 0 or negative");
        }
        if self.termination.is_empty() {
            issues.push("no termination conditions");
        }
        if self.batch_selector.is_none() {
            issues.push("no batch selector");
        }
        if self.evaluation_frequency == 0 {
            issues.push("evaluation frequency is 0");
        }
        issues.into_iter().map(String::from).collect()
    }

    /// Evaluation log of the current or last run, oldest first.
    pub fn evaluations(&self) -> &[Evaluation] {
        &self.evaluations
    }

    pub fn evaluations_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.evaluations)?)
    }

    // ---------------------------------------------------------------------------
    // Loss
    // ---------------------------------------------------------------------------

    /// Loss of the network on one point, regulariser penalties included.
    pub fn loss(&self, network: &Network, point: &DataPoint) -> Result<f64> {
        let penalty = self.penalty(network)?;
        Ok(self.point_error(network, point)? + penalty)
    }

    /// Mean loss over the training set; `None` when it is empty.
    pub fn training_loss(&self, network: &Network, data: &DataSet) -> Result<Option<f64>> {
        self.mean_loss(network, data.training())
    }

    pub fn validation_loss(&self, network: &Network, data: &DataSet) -> Result<Option<f64>> {
        self.mean_loss(network, data.validation())
    }

    pub fn test_loss(&self, network: &Network, data: &DataSet) -> Result<Option<f64>> {
        self.mean_loss(network, data.test())
    }

    /// Snapshot of the current epoch with training and validation losses.
    pub fn evaluate_network(&self, network: &Network, data: &DataSet) -> Result<Evaluation> {
        Ok(Evaluation {
            epoch: self.epoch,
            training_loss: self.training_loss(network, data)?,
            validation_loss: self.validation_loss(network, data)?,
        })
    }

    fn mean_loss(&self, network: &Network, points: &[DataPoint]) -> Result<Option<f64>> {
        if points.is_empty() {
            return Ok(None);
        }
        // The penalty does not depend on the point.
        let penalty = self.penalty(network)?;
        let mut total = 0.0;
        for point in points {
            total += self.point_error(network, point)? + penalty;
        }
        Ok(Some(total / points.len() as f64))
    }

    fn point_error(&self, network: &Network, point: &DataPoint) -> Result<f64> {
        let loss = self.loss_fn()?;
        let output = network.predict(&point.input)?;
        loss.error(&output, point.target()?)
    }

    fn penalty(&self, network: &Network) -> Result<f64> {
        self.regularisers.iter().map(|r| r.loss(network)).sum()
    }

    fn loss_fn(&self) -> Result<LossFunction> {
        self.loss.ok_or_else(|| NnError::NotReady(vec!["no loss function".into()]))
    }

    // ---------------------------------------------------------------------------
    // Training
    // ---------------------------------------------------------------------------

    /// Trains `network` on `data` until a termination condition is met.
    ///
    /// Fails with `NotReady` (listing every unmet requirement) before touching
    /// the network if the trainer is not ready.  Data sets whose widths do not
    /// match the network, or whose training and validation points lack
    /// targets, are rejected before the weights are initialised as well.
    pub fn train(&mut self, network: &mut Network, data: &DataSet) -> Result<()> {
        self.bind(network);
        let issues = self.issues();
        if !issues.is_empty() {
            return Err(NnError::NotReady(issues));
        }
        network.validate()?;
        check_len("data set inputs", network.inputs(), data.inputs())?;
        if data.kind() != DataSetKind::Unsupervised {
            check_len("data set outputs", network.outputs(), data.outputs())?;
        }
        if data.training().iter().chain(data.validation()).any(|p| p.target.is_none()) {
            return Err(NnError::MissingTarget);
        }

        if let Some(initialiser) = &self.initialiser {
            initialiser.initialise(network, &mut self.rng)?;
        }
        let mut gradients = network
            .layers()
            .iter()
            .map(Layer::gradient)
            .collect::<Result<Vec<Gradient>>>()?;

        self.epoch = 0;
        self.evaluations.clear();
        self.finished = false;
        self.training = true;

        if data.training().is_empty() {
            warn!("training set is empty; epochs will not update any weights");
        }
        info!(
            layers = network.layers().len(),
            training = data.training().len(),
            validation = data.validation().len(),
            stochastic = self.stochastic,
            "training started"
        );

        let outcome = self.run(network, data, &mut gradients);
        self.training = false;
        outcome?;
        self.finished = true;

        info!(
            epochs = self.epoch,
            evaluation = ?self.evaluations.last(),
            "training finished"
        );
        Ok(())
    }

    fn run(&mut self, network: &mut Network, data: &DataSet, gradients: &mut [Gradient]) -> Result<()> {
        while !self.has_finished() {
            if self.epoch % self.evaluation_frequency == 0 {
                let evaluation = self.evaluate_network(network, data)?;
                self.record(evaluation);
            }
            self.perform_epoch(network, data, gradients)?;
        }
        Ok(())
    }

    fn has_finished(&self) -> bool {
        let progress = TrainingProgress { epoch: self.epoch, evaluations: &self.evaluations };
        self.termination.iter().any(|c| c.has_finished(&progress))
    }

    fn record(&mut self, evaluation: Evaluation) {
        debug!(
            epoch = evaluation.epoch,
            training_loss = ?evaluation.training_loss,
            validation_loss = ?evaluation.validation_loss,
            "evaluation"
        );
        if !evaluation.is_finite() {
            warn!(epoch = evaluation.epoch, "evaluation recorded a non-finite loss");
        }
        self.evaluations.push(evaluation);
    }

    fn perform_epoch(
        &mut self,
        network: &mut Network,
        data: &DataSet,
        gradients: &mut [Gradient],
    ) -> Result<()> {
        self.epoch += 1;
        let size = data.training().len();
        let mut consumed = 0;
        let mut iteration = 0;

        while consumed < size {
            iteration += 1;
            let selector = self
                .batch_selector
                .as_mut()
                .ok_or_else(|| NnError::NotReady(vec!["no batch selector".into()]))?;
            let batch = selector.select(data, &mut self.rng);
            if batch.is_empty() {
                return Err(NnError::EmptyBatch);
            }
            consumed += batch.len();
            trace!(epoch = self.epoch, iteration, batch = batch.len(), consumed, "iteration");

            for point in batch {
                self.backpropagate(network, point, gradients)?;
                if self.stochastic {
                    self.apply_deltas(network, gradients)?;
                }
            }
            if !self.stochastic {
                self.apply_deltas(network, gradients)?;
            }
        }
        Ok(())
    }

    /// Forward pass on the point, then backpropagation from the output layer
    /// down to the first, each step chaining from the gradient after it.
    fn backpropagate(
        &self,
        network: &mut Network,
        point: &DataPoint,
        gradients: &mut [Gradient],
    ) -> Result<()> {
        let loss = self.loss_fn()?;
        let target = point.target()?;
        network.set_input(&point.input)?;

        let layers = network.layers();
        let last = gradients.len() - 1;
        gradients[last].backpropagate_output(layers[last].as_dense()?, target, &loss, &self.regularisers)?;

        for i in (0..last).rev() {
            let (head, tail) = gradients.split_at_mut(i + 1);
            head[i].backpropagate_hidden(layers[i].as_dense()?, &tail[0], &self.regularisers)?;
        }
        Ok(())
    }

    fn apply_deltas(&self, network: &mut Network, gradients: &mut [Gradient]) -> Result<()> {
        for (i, gradient) in gradients.iter_mut().enumerate() {
            let rate = self.learning_rates.for_layer(i)?;
            gradient.apply_deltas(network.layer_mut(i)?.as_dense_mut()?, rate)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::ActivationFunction;
    use crate::math::Matrix;

    fn line_data() -> DataSet {
        let mut data = DataSet::regression(1, 1);
        for x in [-1.0, -0.5, 0.0, 0.5, 1.0] {
            data.add_regression_point(vec![x], vec![2.0 * x + 1.0]).unwrap();
        }
        data.assign_data_points(1.0, 0.0, 0.0, &mut StdRng::seed_from_u64(0)).unwrap();
        data
    }

    fn line_trainer(epochs: usize) -> Trainer {
        let mut trainer = Trainer::from_config(&TrainConfig {
            learning_rate: 0.05,
            seed: Some(7),
            loss: Some(LossFunction::SquaredError),
            initialiser: Some(Initialiser::Uniform { min: -0.2, max: 0.2, zero_bias: false }),
            epoch_limit: Some(epochs),
            ..TrainConfig::default()
        });
        trainer.set_batch_selector(BatchSelector::full_training_set());
        trainer
    }

    fn line_network() -> Network {
        Network::new(1, 1).add_output_layer(ActivationFunction::Identity)
    }

    #[test]
    fn fits_a_line() {
        let data = line_data();
        let mut network = line_network();
        let mut trainer = line_trainer(500);
        trainer.train(&mut network, &data).unwrap();

        let w = network.layers()[0].weights().unwrap();
        assert!((w[(0, 0)] - 1.0).abs() < 1e-3);
        assert!((w[(0, 1)] - 2.0).abs() < 1e-3);
        assert_eq!(trainer.state(), TrainerState::Finished);
    }

    #[test]
    fn epoch_limit_runs_one_extra_epoch() {
        let data = line_data();
        let mut network = line_network();
        let mut trainer = line_trainer(20);
        trainer.train(&mut network, &data).unwrap();

        assert_eq!(trainer.epoch(), 21);
        let epochs: Vec<usize> = trainer.evaluations().iter().map(|e| e.epoch).collect();
        assert_eq!(epochs, vec![0, 10, 20]);
        assert!(trainer.evaluations().iter().all(|e| e.validation_loss.is_none()));
    }

    #[test]
    fn losses_decrease_over_training() {
        let data = line_data();
        let mut network = line_network();
        let mut trainer = line_trainer(100);
        trainer.train(&mut network, &data).unwrap();

        let log = trainer.evaluations();
        let first = log[0].training_loss.unwrap();
        let last = log[log.len() - 1].training_loss.unwrap();
        assert!(last < first);
        assert!(trainer.training_loss(&network, &data).unwrap().unwrap() <= last);
        assert_eq!(trainer.test_loss(&network, &data).unwrap(), None);
    }

    #[test]
    fn regularised_loss_adds_the_penalty() {
        let data = line_data();
        let mut network = line_network();
        network
            .layer_mut(0)
            .unwrap()
            .set_weights(Matrix::from_data(vec![vec![1.0, 2.0]]).unwrap())
            .unwrap();
        let mut trainer = line_trainer(1);
        assert_eq!(trainer.loss(&network, &data.training()[0]).unwrap(), 0.0);

        trainer.add_regulariser(Regulariser::L2 { strength: 0.2 });
        let loss = trainer.loss(&network, &data.training()[0]).unwrap();
        assert!((loss - 0.5).abs() < 1e-12);
    }

    #[test]
    fn stochastic_updates_reach_the_same_fit() {
        let data = line_data();
        let mut network = line_network();
        let mut trainer = line_trainer(300);
        trainer.set_stochastic(true);
        trainer.train(&mut network, &data).unwrap();

        let prediction = network.predict(&[0.25]).unwrap()[0];
        assert!((prediction - 1.5).abs() < 1e-2);
    }

    #[test]
    fn retraining_resets_epoch_and_log() {
        let data = line_data();
        let mut network = line_network();
        let mut trainer = line_trainer(15);
        trainer.train(&mut network, &data).unwrap();
        let first = network.layers()[0].weights().unwrap().clone();

        trainer.seed(7);
        trainer.train(&mut network, &data).unwrap();
        assert_eq!(trainer.epoch(), 16);
        assert_eq!(trainer.evaluations().len(), 2);
        // same seed, same initial weights, same run
        assert_eq!(network.layers()[0].weights().unwrap(), &first);
    }

    #[test]
    fn empty_batches_are_an_error() {
        let data = line_data();
        let mut network = line_network();
        let mut trainer = line_trainer(5);
        trainer.set_batch_selector(BatchSelector::new(|_, _| Vec::new()));
        assert!(matches!(trainer.train(&mut network, &data), Err(NnError::EmptyBatch)));
        assert_ne!(trainer.state(), TrainerState::Training);
    }

    #[test]
    fn closures_stop_training() {
        let data = line_data();
        let mut network = line_network();
        let mut trainer = line_trainer(1_000);
        trainer.stop_when(|progress| progress.epoch >= 3);
        trainer.train(&mut network, &data).unwrap();
        assert_eq!(trainer.epoch(), 3);
    }

    #[test]
    fn sparse_networks_are_not_trainable() {
        let data = line_data();
        let mut network = Network::new(1, 1)
            .add_sparse_layer(2, ActivationFunction::ReLU)
            .add_output_layer(ActivationFunction::Identity);
        let mut trainer = line_trainer(5);
        let err = trainer.train(&mut network, &data).unwrap_err();
        assert!(matches!(err, NnError::NotImplemented(_)));
        assert!(trainer.is_sparse_layer(0).unwrap());
        assert!(trainer.is_dense_layer(1).unwrap());
        assert!(trainer.is_dense_layer(2).is_err());
    }
}
