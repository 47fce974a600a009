use rand::{rngs::StdRng, Rng, SeedableRng};
use strata_nn::{
    BatchSelector, DataNormaliser, DataPoint, DataSet, Initialiser, LossFunction, NetworkSpec,
    Regulariser, Result, StandardScore, TrainConfig, Trainer,
};

/// Fits y = sin(x) on [-3, 3] with a small tanh network built from a JSON
/// architecture description.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let mut rng = StdRng::seed_from_u64(17);
    let mut data = DataSet::regression(1, 1);
    for _ in 0..400 {
        let x: f64 = rng.gen_range(-3.0..3.0);
        data.add_regression_point(vec![x], vec![x.sin()])?;
    }
    data.assign_data_points(0.7, 0.2, 0.1, &mut rng)?;

    let mut normaliser = StandardScore::new();
    data.normalise_by(&mut normaliser)?;

    let spec: NetworkSpec = serde_json::from_str(
        r#"{
            "name": "sine",
            "inputs": 1,
            "outputs": 1,
            "hidden": [
                { "nodes": 12, "activation": "Tanh" },
                { "nodes": 12, "activation": "Tanh" }
            ],
            "output_activation": "Identity"
        }"#,
    )?;
    let mut network = spec.build()?;

    let mut trainer = Trainer::from_config(&TrainConfig {
        learning_rate: 0.002,
        evaluation_frequency: 100,
        seed: Some(17),
        loss: Some(LossFunction::SquaredError),
        initialiser: Some(Initialiser::Xavier),
        regularisers: vec![Regulariser::L2 { strength: 1e-5 }],
        epoch_limit: Some(2_000),
        ..TrainConfig::default()
    });
    trainer.set_batch_selector(BatchSelector::random_training_subset(16));
    trainer.train(&mut network, &data)?;

    println!("{}", trainer.evaluations_json()?);
    match trainer.test_loss(&network, &data)? {
        Some(loss) => println!("test loss: {loss:.6}"),
        None => println!("test set is empty"),
    }

    for x in [-2.5, -1.0, 0.0, 1.0, 2.5] {
        let mut point = DataPoint::unsupervised(vec![x]);
        normaliser.normalise(&mut point)?;
        let y = network.predict(&point.input)?[0];
        println!("sin({x:+.1}) ~ {y:+.4} (exact {:+.4})", f64::sin(x));
    }
    Ok(())
}
