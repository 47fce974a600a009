/// Negative log-probability of the target class; pair with a Softmax output.
///
/// The target is expected to be one-hot.  No epsilon is added inside the
/// logarithm, so a zero probability on the target class yields infinity.
pub struct NegativeLogProb;

impl NegativeLogProb {
    /// Scalar loss: −Σ target[i]·ln(output[i])
    pub fn error(output: &[f64], target: &[f64]) -> f64 {
        output.iter().zip(target)
            .filter(|&(_, &t)| t != 0.0)
            .map(|(y, t)| -t * y.ln())
            .sum()
    }

    /// ∂loss/∂output[i] = −target[i] / output[i]
    pub fn derivative(output: &[f64], target: &[f64], i: usize) -> f64 {
        -target[i] / output[i]
    }
}
