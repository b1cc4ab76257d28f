//! Closed set of activation functions bound per layer.
use crate::error::{NetError, Result};

fn relu(x: f64) -> f64 {
    x.max(0.0)
}

fn relu_derivative(x: f64) -> f64 {
    (x > 0.0) as u8 as f64
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn sigmoid_derivative(x: f64) -> f64 {
    let s = sigmoid(x);
    s * (1.0 - s)
}

/// Activation variant bound to a layer at construction.
///
/// `None` is a valid configuration for the input layer (a pure carrier of
/// externally supplied values); evaluating it is a state error. Extending the
/// set means adding a variant and its two match arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Activation {
    #[default]
    None,
    ReLU,
    Sigmoid,
}

impl Activation {
    /// Evaluate the activation at `x`.
    pub fn apply(self, x: f64) -> Result<f64> {
        match self {
            Activation::ReLU => Ok(relu(x)),
            Activation::Sigmoid => Ok(sigmoid(x)),
            Activation::None => Err(NetError::state("no activation function bound")),
        }
    }

    /// Evaluate the activation derivative at `x`.
    pub fn derivative(self, x: f64) -> Result<f64> {
        match self {
            Activation::ReLU => Ok(relu_derivative(x)),
            Activation::Sigmoid => Ok(sigmoid_derivative(x)),
            Activation::None => Err(NetError::state("no activation derivative bound")),
        }
    }

    /// Whether an apply/derivative pair is bound.
    pub fn is_bound(self) -> bool {
        !matches!(self, Activation::None)
    }
}
