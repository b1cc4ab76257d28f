//! A dense feed-forward neural network engine: layered activation/weight
//! model, forward propagation, mini-batch backpropagation with a decaying
//! learning rate, and parameter serialization.
//!
//! - `Network` over `Layer`s connected by weight `Matrix`es, trained with
//!   sigmoid + binary cross-entropy on the output layer
//! - CSV sensor-dataset loading with shuffled train/test splitting
//! - Binary confusion matrix with accuracy/precision/recall/F1
//! - Model persistence as `type,layer,row,col,value` CSV records

pub mod activations;
pub mod datasets;
pub mod error;
pub mod layers;
pub mod loss;
pub mod matrix;
pub mod metrics;
pub mod network;
pub mod utils;

pub use activations::Activation;
pub use datasets::{is_collision_label, load_sensor_data, split, SensorSet, SensorSplit};
pub use error::{NetError, Result};
pub use layers::Layer;
pub use loss::{bce_loss, bce_output_gradient};
pub use matrix::Matrix;
pub use metrics::{evaluate_binary, ConfusionMatrix};
pub use network::{decayed_learning_rate, Network, TrainingSummary};
pub use utils::{synthetic_linearly_separable, synthetic_readings};
