use rand::{rngs::StdRng, SeedableRng};
use strata_nn::{
    ActivationFunction, BatchSelector, DataSet, Initialiser, LossFunction, Network, Result,
    Trainer,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut data = DataSet::regression(2, 1);
    data.add_regression_point(vec![0.0, 0.0], vec![0.0])?;
    data.add_regression_point(vec![1.0, 0.0], vec![1.0])?;
    data.add_regression_point(vec![0.0, 1.0], vec![1.0])?;
    data.add_regression_point(vec![1.0, 1.0], vec![0.0])?;
    data.assign_data_points(1.0, 0.0, 0.0, &mut StdRng::seed_from_u64(0))?;

    let mut network = Network::new(2, 1)
        .add_hidden_layer(5, ActivationFunction::Sigmoid)
        .add_output_layer(ActivationFunction::Sigmoid);

    let mut trainer = Trainer::new();
    trainer.seed(1);
    trainer.set_learning_rate(0.15);
    trainer.set_loss(LossFunction::SquaredError);
    trainer.set_initialiser(Initialiser::Uniform { min: -0.2, max: 0.2, zero_bias: false });
    trainer.set_batch_selector(BatchSelector::full_training_set());
    trainer.set_evaluation_frequency(5_000);
    trainer.stop_when(|progress| progress.epoch > 50_000);

    for issue in trainer.troubleshoot() {
        println!("readiness: {issue}");
    }
    trainer.train(&mut network, &data)?;

    for point in data.training() {
        let output = network.predict(&point.input)?;
        println!("Input: {:?} -> Output: {:.4}", point.input, output[0]);
    }
    Ok(())
}
