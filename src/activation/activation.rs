use serde::{Serialize, Deserialize};
use std::f64::consts::E;

/// The activation applied to a layer's pre-activation vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActivationFunction {
    Sigmoid,
    ReLU,
    Identity,
    Tanh,
    LeakyReLU { alpha: f64 },
    /// Vector-valued: every output depends on the whole pre-activation.
    /// No max-subtraction is performed, so very large pre-activations overflow.
    Softmax,
}

impl ActivationFunction {
    /// True iff some off-diagonal derivative can be non-zero.
    pub fn is_interdependent(&self) -> bool {
        matches!(self, ActivationFunction::Softmax)
    }

    /// Element-wise value for the diagonal functions.  `None` for Softmax,
    /// which needs the whole vector (see `Activation::peek`).
    fn scalar(&self, x: f64) -> Option<f64> {
        let v = match self {
            ActivationFunction::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            ActivationFunction::ReLU => if x > 0.0 { x } else { 0.0 },
            ActivationFunction::Identity => x,
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { x } else { alpha * x },
            ActivationFunction::Softmax => return None,
        };
        Some(v)
    }
}

/// An activation function together with the last pre-activation vector it was
/// shown.
///
/// `peek` must run with the current vector before `value` or `derivative`;
/// both read the peeked state and panic on an index past its length.
#[derive(Debug, Clone, PartialEq)]
pub struct Activation {
    function: ActivationFunction,
    pre_activation: Vec<f64>,
    values: Vec<f64>,
}

impl Activation {
    pub fn new(function: ActivationFunction) -> Activation {
        Activation {
            function,
            pre_activation: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn function(&self) -> ActivationFunction {
        self.function
    }

    pub fn is_interdependent(&self) -> bool {
        self.function.is_interdependent()
    }

    /// Records `pre_activation` and does the vector-wide work (the softmax
    /// normalising sum).
    pub fn peek(&mut self, pre_activation: &[f64]) {
        self.pre_activation.clear();
        self.pre_activation.extend_from_slice(pre_activation);

        self.values = match self.function {
            ActivationFunction::Softmax => {
                let exps: Vec<f64> = pre_activation.iter().map(|z| z.exp()).collect();
                let sum: f64 = exps.iter().sum();
                exps.into_iter().map(|e| e / sum).collect()
            }
            f => pre_activation
                .iter()
                .map(|&z| f.scalar(z).unwrap_or(z))
                .collect(),
        };
    }

    /// Activated output `i` for the peeked vector.
    pub fn value(&self, i: usize) -> f64 {
        self.values[i]
    }

    /// All activated outputs for the peeked vector.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// ∂output[j] / ∂pre_activation[i].
    pub fn derivative(&self, i: usize, j: usize) -> f64 {
        match self.function {
            ActivationFunction::Softmax => {
                let kronecker = if i == j { 1.0 } else { 0.0 };
                self.value(i) * (kronecker - self.value(j))
            }
            _ if i == j => self.diagonal_derivative(i),
            _ => 0.0,
        }
    }

    /// ∂output[i] / ∂pre_activation[i], the only term the backpropagation
    /// chain uses.
    pub fn diagonal_derivative(&self, i: usize) -> f64 {
        let z = self.pre_activation[i];
        let v = self.values[i];
        match self.function {
            ActivationFunction::Sigmoid | ActivationFunction::Softmax => v * (1.0 - v),
            // Sub-gradient at 0 is 0.
            ActivationFunction::ReLU => if z > 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::Identity => 1.0,
            ActivationFunction::Tanh => 1.0 - v * v,
            ActivationFunction::LeakyReLU { alpha } => if z > 0.0 { 1.0 } else { alpha },
        }
    }
}

impl From<ActivationFunction> for Activation {
    fn from(function: ActivationFunction) -> Self {
        Activation::new(function)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    fn peeked(function: ActivationFunction, z: &[f64]) -> Activation {
        let mut a = Activation::new(function);
        a.peek(z);
        a
    }

    #[test]
    fn sigmoid_derivative_uses_output() {
        let a = peeked(ActivationFunction::Sigmoid, &[0.0, 2.0]);
        assert!((a.value(0) - 0.5).abs() < TOL);
        assert!((a.diagonal_derivative(0) - 0.25).abs() < TOL);
        let v = a.value(1);
        assert!((a.derivative(1, 1) - v * (1.0 - v)).abs() < TOL);
        assert_eq!(a.derivative(0, 1), 0.0);
        assert!(!a.is_interdependent());
    }

    #[test]
    fn relu_subgradient_at_zero_is_zero() {
        let a = peeked(ActivationFunction::ReLU, &[-1.0, 0.0, 3.0]);
        assert_eq!(a.values(), &[0.0, 0.0, 3.0]);
        assert_eq!(a.diagonal_derivative(0), 0.0);
        assert_eq!(a.diagonal_derivative(1), 0.0);
        assert_eq!(a.diagonal_derivative(2), 1.0);
    }

    #[test]
    fn softmax_sums_to_one_and_has_dense_jacobian() {
        let a = peeked(ActivationFunction::Softmax, &[1.0, 2.0, 0.5]);
        let total: f64 = a.values().iter().sum();
        assert!((total - 1.0).abs() < TOL);
        assert!(a.is_interdependent());

        let (v0, v1) = (a.value(0), a.value(1));
        assert!((a.derivative(0, 1) + v0 * v1).abs() < TOL);
        assert!((a.derivative(1, 1) - v1 * (1.0 - v1)).abs() < TOL);
        assert!((a.diagonal_derivative(0) - v0 * (1.0 - v0)).abs() < TOL);
    }

    #[test]
    fn softmax_does_not_rescale_large_inputs() {
        let a = peeked(ActivationFunction::Softmax, &[1000.0, 1.0]);
        assert!(a.value(0).is_nan());
    }

    #[test]
    fn peek_replaces_previous_vector() {
        let mut a = peeked(ActivationFunction::Tanh, &[0.3, 0.1]);
        a.peek(&[0.0]);
        assert_eq!(a.values(), &[0.0]);
        assert_eq!(a.diagonal_derivative(0), 1.0);
    }
}
