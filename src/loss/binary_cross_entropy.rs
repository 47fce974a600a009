/// Two-class cross-entropy for a network with a single output in (0, 1)
/// and a target of 0 or 1.
pub struct BinaryCrossEntropy;

impl BinaryCrossEntropy {
    /// Scalar loss: −(t·ln(p) + (1 − t)·ln(1 − p))
    pub fn error(p: f64, t: f64) -> f64 {
        -(t * p.ln() + (1.0 - t) * (1.0 - p).ln())
    }

    /// ∂loss/∂p = (t − 1)/(p − 1) − t/p
    pub fn derivative(p: f64, t: f64) -> f64 {
        (t - 1.0) / (p - 1.0) - t / p
    }
}
