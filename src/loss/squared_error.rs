/// Half the squared Euclidean distance between output and target.
pub struct SquaredError;

impl SquaredError {
    /// Scalar loss: ½·Σ(output − target)²
    pub fn error(output: &[f64], target: &[f64]) -> f64 {
        0.5 * output.iter().zip(target)
            .map(|(y, t)| (y - t).powi(2))
            .sum::<f64>()
    }

    /// ∂loss/∂output[i] = output[i] − target[i]
    pub fn derivative(output: &[f64], target: &[f64], i: usize) -> f64 {
        output[i] - target[i]
    }
}
