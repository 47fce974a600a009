use strata_nn::{
    ActivationFunction, Gradient, Layer, LearningRate, LossFunction, Matrix, Network, Regulariser,
};

const STEP: f64 = 1e-5;
const TOLERANCE: f64 = 1e-4;

fn network() -> Network {
    let mut network = Network::new(2, 1)
        .add_hidden_layer(2, ActivationFunction::Sigmoid)
        .add_output_layer(ActivationFunction::Sigmoid);
    network
        .layer_mut(0)
        .unwrap()
        .set_weights(Matrix::from_data(vec![vec![0.1, -0.4, 0.7], vec![-0.3, 0.5, 0.2]]).unwrap())
        .unwrap();
    network
        .layer_mut(1)
        .unwrap()
        .set_weights(Matrix::from_data(vec![vec![0.25, -0.6, 0.9]]).unwrap())
        .unwrap();
    network
}

fn loss(network: &Network, input: &[f64], target: &[f64], regularisers: &[Regulariser]) -> f64 {
    let output = network.predict(input).unwrap();
    let penalty: f64 = regularisers.iter().map(|r| r.loss(network).unwrap()).sum();
    LossFunction::SquaredError.error(&output, target).unwrap() + penalty
}

/// One backpropagation pass over the whole network.
fn analytic_deltas(
    network: &mut Network,
    input: &[f64],
    target: &[f64],
    regularisers: &[Regulariser],
) -> Vec<Matrix> {
    let mut gradients: Vec<Gradient> =
        network.layers().iter().map(|l| l.gradient().unwrap()).collect();
    network.set_input(input).unwrap();

    let layers = network.layers();
    gradients[1]
        .backpropagate_output(
            layers[1].as_dense().unwrap(),
            target,
            &LossFunction::SquaredError,
            regularisers,
        )
        .unwrap();
    let (hidden, output) = gradients.split_at_mut(1);
    hidden[0]
        .backpropagate_hidden(layers[0].as_dense().unwrap(), &output[0], regularisers)
        .unwrap();

    gradients.iter().map(|g| g.weight_deltas().clone()).collect()
}

fn perturbed(network: &Network, layer: usize, row: usize, col: usize, by: f64) -> Network {
    let mut copy = network.clone();
    let mut weights = copy.layers()[layer].weights().unwrap().clone();
    weights[(row, col)] += by;
    copy.layer_mut(layer).unwrap().set_weights(weights).unwrap();
    copy
}

fn check(regularisers: &[Regulariser]) {
    let input = [0.8, -0.35];
    let target = [0.3];
    let mut network = network();
    let deltas = analytic_deltas(&mut network, &input, &target, regularisers);

    for (l, layer) in network.layers().iter().enumerate() {
        let weights = match layer {
            Layer::Dense(dense) => dense.weights(),
            Layer::Sparse(_) => unreachable!(),
        };
        for row in 0..weights.rows {
            for col in 0..weights.cols {
                let plus = loss(&perturbed(&network, l, row, col, STEP), &input, &target, regularisers);
                let minus = loss(&perturbed(&network, l, row, col, -STEP), &input, &target, regularisers);
                let numeric = (plus - minus) / (2.0 * STEP);
                let analytic = deltas[l][(row, col)];

                let scale = numeric.abs().max(analytic.abs()).max(1e-8);
                assert!(
                    (numeric - analytic).abs() / scale < TOLERANCE,
                    "layer {l} weight ({row}, {col}): analytic {analytic}, numeric {numeric}"
                );
            }
        }
    }
}

#[test]
fn backpropagation_matches_finite_differences() {
    check(&[]);
}

#[test]
fn regularised_backpropagation_matches_finite_differences() {
    check(&[Regulariser::L2 { strength: 0.01 }]);
}

#[test]
fn deltas_and_derivatives_are_zero_after_apply() {
    let input = [0.8, -0.35];
    let mut network = network();
    let mut gradient = network.layers()[1].gradient().unwrap();
    network.set_input(&input).unwrap();
    gradient
        .backpropagate_output(
            network.layers()[1].as_dense().unwrap(),
            &[0.3],
            &LossFunction::SquaredError,
            &[],
        )
        .unwrap();
    assert!(gradient.weight_deltas().iter().any(|d| d != 0.0));

    let layer = network.layer_mut(1).unwrap().as_dense_mut().unwrap();
    gradient.apply_deltas(layer, LearningRate::Scalar(0.1)).unwrap();
    assert!(gradient.weight_deltas().iter().all(|d| d == 0.0));
    assert!(gradient.input_error_derivatives().iter().all(|&d| d == 0.0));
    assert!(gradient.output_error_derivatives().iter().all(|&d| d == 0.0));
}
