//! Layer state: per-unit scratch vectors, biases, and the bound activation.
use crate::activations::Activation;
use crate::error::{NetError, Result};

/// One layer of the network.
///
/// Layer 0 is the input layer: it only carries externally supplied values in
/// `a` and never owns biases, gradient scratch, or an activation. Every other
/// layer owns zero-initialized `bias` and `gradient` vectors and the
/// activation variant it was constructed with.
#[derive(Debug, Clone)]
pub struct Layer {
    /// Position in the network, 0 = input.
    pub index: usize,
    /// Number of units.
    pub size: usize,
    /// Pre-activation values, overwritten each forward pass.
    pub z: Vec<f64>,
    /// Activation outputs, overwritten each forward pass.
    pub a: Vec<f64>,
    /// Biases; empty for the input layer.
    pub bias: Vec<f64>,
    /// Backprop scratch; empty for the input layer.
    pub gradient: Vec<f64>,
    activation: Activation,
}

impl Layer {
    /// Create a layer. `size` must be positive; the input layer (index 0)
    /// ignores `activation` and binds nothing.
    pub fn new(index: usize, size: usize, activation: Activation) -> Result<Self> {
        if size == 0 {
            return Err(NetError::config(format!(
                "layer {} size must be positive",
                index
            )));
        }
        let (bias, gradient, activation) = if index == 0 {
            (Vec::new(), Vec::new(), Activation::None)
        } else {
            (vec![0.0; size], vec![0.0; size], activation)
        };
        Ok(Self {
            index,
            size,
            z: vec![0.0; size],
            a: vec![0.0; size],
            bias,
            gradient,
            activation,
        })
    }

    /// The bound activation variant.
    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn has_activation(&self) -> bool {
        self.activation.is_bound()
    }

    /// Evaluate the bound activation; state error when nothing is bound.
    pub fn apply_activation(&self, x: f64) -> Result<f64> {
        self.activation.apply(x).map_err(|_| {
            NetError::state(format!("layer {} has no activation function", self.index))
        })
    }

    /// Evaluate the bound activation derivative; state error when nothing is bound.
    pub fn apply_activation_derivative(&self, x: f64) -> Result<f64> {
        self.activation.derivative(x).map_err(|_| {
            NetError::state(format!("layer {} has no activation derivative", self.index))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_is_config_error() {
        assert!(matches!(
            Layer::new(0, 0, Activation::None),
            Err(NetError::Config(_))
        ));
        assert!(matches!(
            Layer::new(1, 0, Activation::ReLU),
            Err(NetError::Config(_))
        ));
    }

    #[test]
    fn input_layer_carries_no_bias_or_gradient() {
        // activation argument is ignored for index 0
        let layer = Layer::new(0, 4, Activation::Sigmoid).unwrap();
        assert!(layer.bias.is_empty());
        assert!(layer.gradient.is_empty());
        assert!(!layer.has_activation());
        assert!(matches!(
            layer.apply_activation(1.0),
            Err(NetError::State(_))
        ));
        assert_eq!(layer.a.len(), 4);
        assert_eq!(layer.z.len(), 4);
    }

    #[test]
    fn hidden_layer_allocates_zeroed_bias_and_gradient() {
        let layer = Layer::new(1, 3, Activation::ReLU).unwrap();
        assert_eq!(layer.bias, vec![0.0; 3]);
        assert_eq!(layer.gradient, vec![0.0; 3]);
        assert_eq!(layer.activation(), Activation::ReLU);
        assert_eq!(layer.apply_activation(-2.0).unwrap(), 0.0);
        assert_eq!(layer.apply_activation_derivative(2.0).unwrap(), 1.0);
    }

    #[test]
    fn hidden_layer_with_none_activation_is_a_state_error_on_use() {
        let layer = Layer::new(2, 3, Activation::None).unwrap();
        assert!(matches!(
            layer.apply_activation(0.5),
            Err(NetError::State(_))
        ));
        assert!(matches!(
            layer.apply_activation_derivative(0.5),
            Err(NetError::State(_))
        ));
    }
}
