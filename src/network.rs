//! Feed-forward network: forward inference, mini-batch training, persistence.
use crate::error::{NetError, Result};
use crate::layers::Layer;
use crate::loss::{bce_loss, bce_output_gradient};
use crate::matrix::Matrix;
use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};

/// Per-epoch multiplicative learning-rate decay.
const LR_DECAY: f64 = 0.996;
/// Floor keeping the learning rate from vanishing.
const MIN_LR: f64 = 1e-4;

/// Learning rate for a given epoch: `max(MIN_LR, base · 0.996^epoch)`.
pub fn decayed_learning_rate(base_lr: f64, epoch: usize) -> f64 {
    (base_lr * LR_DECAY.powi(epoch as i32)).max(MIN_LR)
}

/// Figures reported after a completed training run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingSummary {
    /// Number of epochs run.
    pub epochs: usize,
    /// Mean BCE over the final epoch (total loss / dataset size).
    pub final_bce: f64,
    /// Wall-clock training time.
    pub elapsed: Duration,
}

/// A dense feed-forward network.
///
/// `weights[l]` connects layer `l` to layer `l + 1`, so
/// `weights[l].rows == layers[l].size` and `weights[l].cols == layers[l + 1].size`
/// for the lifetime of the network.
#[derive(Debug, Clone)]
pub struct Network {
    /// Ordered layers, input first.
    pub layers: Vec<Layer>,
    /// One weight matrix per connection; `layers.len() - 1` entries.
    pub weights: Vec<Matrix>,
}

impl Network {
    /// Build a network from an ordered layer sequence, initializing weights
    /// from the process-level random source.
    pub fn new(layers: Vec<Layer>) -> Result<Self> {
        Self::with_rng(layers, &mut rand::thread_rng())
    }

    /// Build a network with an explicit random source for weight
    /// initialization, so tests can be made deterministic.
    ///
    /// Weights are drawn uniformly from [-1, 1) and scaled by
    /// `sqrt(2 / rows)` (He-style scaling for the fan-in).
    pub fn with_rng<R: Rng + ?Sized>(layers: Vec<Layer>, rng: &mut R) -> Result<Self> {
        if layers.len() < 2 {
            return Err(NetError::config(format!(
                "a network needs at least 2 layers, got {}",
                layers.len()
            )));
        }
        for (position, layer) in layers.iter().enumerate() {
            if layer.index != position {
                return Err(NetError::config(format!(
                    "layer at position {} has index {}",
                    position, layer.index
                )));
            }
        }
        let mut weights = Vec::with_capacity(layers.len() - 1);
        for pair in layers.windows(2) {
            let mut w = Matrix::new(pair[0].size, pair[1].size)?;
            w.fill_random(rng, -1.0, 1.0);
            w.scale_in_place((2.0 / w.rows() as f64).sqrt());
            weights.push(w);
        }
        Ok(Self { layers, weights })
    }

    /// Layer sizes from input to output.
    pub fn topology(&self) -> Vec<usize> {
        self.layers.iter().map(|l| l.size).collect()
    }

    fn input_size(&self) -> usize {
        self.layers[0].size
    }

    fn output_index(&self) -> usize {
        self.layers.len() - 1
    }

    /// Forward pass: copies `input` into layer 0 and propagates
    /// `z[l+1][j] = bias[l+1][j] + Σ_i a[l][i]·weights[l](i,j)` through every
    /// connection. Returns a copy of the output layer's activations.
    pub fn forward(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        if input.len() != self.input_size() {
            return Err(NetError::shape(format!(
                "input length {} does not match input layer size {}",
                input.len(),
                self.input_size()
            )));
        }
        self.layers[0].a.copy_from_slice(input);

        for l in 0..self.weights.len() {
            let (lower, upper) = self.layers.split_at_mut(l + 1);
            let src = &lower[l];
            let dst = &mut upper[0];
            let w = &self.weights[l];
            for j in 0..w.cols() {
                let mut sum = dst.bias[j];
                for i in 0..w.rows() {
                    sum += src.a[i] * w[(i, j)];
                }
                dst.z[j] = sum;
                dst.a[j] = dst.apply_activation(sum)?;
            }
        }
        Ok(self.layers[self.output_index()].a.clone())
    }

    /// Alias for [`forward`](Network::forward).
    pub fn predict(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        self.forward(input)
    }

    /// Mini-batch gradient descent with a decaying learning rate.
    ///
    /// Samples are consumed in caller order, in batches of `batch_size` (the
    /// final batch is truncated to the remaining count). Each batch applies
    /// one update from the gradient averaged over that batch's actual sample
    /// count. The output layer is assumed to be sigmoid trained against
    /// binary cross-entropy.
    pub fn train(
        &mut self,
        inputs: &[Vec<f64>],
        targets: &[Vec<f64>],
        learning_rate: f64,
        epochs: usize,
        batch_size: usize,
        verbose: bool,
    ) -> Result<TrainingSummary> {
        if inputs.len() != targets.len() {
            return Err(NetError::config(format!(
                "input and target counts don't match: {} vs {}",
                inputs.len(),
                targets.len()
            )));
        }
        if inputs.is_empty() {
            return Err(NetError::config("training set is empty"));
        }
        if learning_rate <= 0.0 {
            return Err(NetError::config("learning rate must be positive"));
        }
        if epochs == 0 {
            return Err(NetError::config("epoch count must be positive"));
        }
        if batch_size == 0 {
            return Err(NetError::config("batch size must be positive"));
        }
        let in_size = self.input_size();
        let out_size = self.layers[self.output_index()].size;
        for (k, (input, target)) in inputs.iter().zip(targets).enumerate() {
            if input.len() != in_size {
                return Err(NetError::shape(format!(
                    "sample {}: feature length {} does not match input layer size {}",
                    k,
                    input.len(),
                    in_size
                )));
            }
            if target.len() != out_size {
                return Err(NetError::shape(format!(
                    "sample {}: target length {} does not match output layer size {}",
                    k,
                    target.len(),
                    out_size
                )));
            }
        }

        let dataset_size = inputs.len();
        let start = Instant::now();
        if verbose {
            info!(
                "training: lr = {}, decay = {:.1}% per epoch, epochs = {}, dataset = {}, batch = {}",
                learning_rate,
                (1.0 - LR_DECAY) * 100.0,
                epochs,
                dataset_size,
                batch_size
            );
        }

        let mut epoch_bce = 0.0;
        for epoch in 0..epochs {
            let lr = decayed_learning_rate(learning_rate, epoch);
            let mut total_loss = 0.0;

            let mut batch_start = 0;
            while batch_start < dataset_size {
                let actual_batch_size = batch_size.min(dataset_size - batch_start);

                // Fresh zeroed accumulators for this batch.
                let mut weight_grads = Vec::with_capacity(self.weights.len());
                for w in &self.weights {
                    weight_grads.push(Matrix::new(w.rows(), w.cols())?);
                }
                let mut bias_grads: Vec<Vec<f64>> = self.layers[1..]
                    .iter()
                    .map(|l| vec![0.0; l.size])
                    .collect();

                for k in batch_start..batch_start + actual_batch_size {
                    self.forward(&inputs[k])?;

                    let last = self.output_index();
                    for i in 0..self.layers[last].size {
                        let y = targets[k][i];
                        let p = self.layers[last].a[i];
                        total_loss += bce_loss(p, y);
                        self.layers[last].gradient[i] = bce_output_gradient(p, y);
                    }

                    // Hidden-layer gradients, last hidden layer down to the first.
                    for l in (1..last).rev() {
                        let (lower, upper) = self.layers.split_at_mut(l + 1);
                        let cur = &mut lower[l];
                        let next = &upper[0];
                        let w = &self.weights[l];
                        for i in 0..w.rows() {
                            let mut err = 0.0;
                            for j in 0..w.cols() {
                                err += next.gradient[j] * w[(i, j)];
                            }
                            cur.gradient[i] = err * cur.apply_activation_derivative(cur.z[i])?;
                        }
                    }

                    // Accumulate weight and bias gradients.
                    for l in 0..self.weights.len() {
                        let next = &self.layers[l + 1];
                        let acts: &[f64] = if l == 0 { &inputs[k] } else { &self.layers[l].a };
                        let wg = &mut weight_grads[l];
                        for i in 0..wg.rows() {
                            for j in 0..wg.cols() {
                                wg[(i, j)] += next.gradient[j] * acts[i];
                            }
                        }
                        for i in 0..next.size {
                            bias_grads[l][i] += next.gradient[i];
                        }
                    }
                }

                // One update per batch, averaged over its actual sample count.
                let step = lr / actual_batch_size as f64;
                for l in 0..self.weights.len() {
                    let w = &mut self.weights[l];
                    let wg = &weight_grads[l];
                    for i in 0..w.rows() {
                        for j in 0..w.cols() {
                            w[(i, j)] -= step * wg[(i, j)];
                        }
                    }
                    for (b, g) in self.layers[l + 1].bias.iter_mut().zip(&bias_grads[l]) {
                        *b -= step * g;
                    }
                }

                batch_start += actual_batch_size;
            }

            epoch_bce = total_loss / dataset_size as f64;
            if verbose && epoch % 100 == 0 {
                info!(
                    "[{}%] epoch {} | BCE: {:.6}",
                    100 * epoch / epochs,
                    epoch,
                    epoch_bce
                );
            }
        }

        let elapsed = start.elapsed();
        if verbose {
            info!(
                "training done: final BCE {:.6} in {} ms",
                epoch_bce,
                elapsed.as_millis()
            );
        }
        Ok(TrainingSummary {
            epochs,
            final_bce: epoch_bce,
            elapsed,
        })
    }

    /// Save weights and biases as CSV records (`type,layer,row,col,value`).
    ///
    /// For each destination layer `l = 1..L-1` in order: every entry of
    /// `weights[l-1]` row-major, then layer `l`'s biases with `col = 0`.
    /// No topology metadata is written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for l in 1..self.layers.len() {
            let w = &self.weights[l - 1];
            for i in 0..w.rows() {
                for j in 0..w.cols() {
                    writer.serialize(ParamRecord {
                        kind: ParamKind::Weight,
                        layer: l,
                        row: i,
                        col: j,
                        value: w[(i, j)],
                    })?;
                }
            }
            for (i, &b) in self.layers[l].bias.iter().enumerate() {
                writer.serialize(ParamRecord {
                    kind: ParamKind::Bias,
                    layer: l,
                    row: i,
                    col: 0,
                    value: b,
                })?;
            }
        }
        writer.flush()?;
        Ok(())
    }

    /// Load parameters saved by [`save`](Network::save) into this network.
    ///
    /// Every record is validated against the current topology; a record whose
    /// layer/row/col falls outside it is a shape error, leaving already
    /// applied records in place.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)?;
        for record in reader.deserialize() {
            let record: ParamRecord = record?;
            if record.layer == 0 || record.layer >= self.layers.len() {
                return Err(NetError::shape(format!(
                    "record layer {} outside topology {:?}",
                    record.layer,
                    self.topology()
                )));
            }
            match record.kind {
                ParamKind::Weight => {
                    *self.weights[record.layer - 1].get_mut(record.row, record.col)? =
                        record.value;
                }
                ParamKind::Bias => {
                    let bias = &mut self.layers[record.layer].bias;
                    if record.row >= bias.len() {
                        return Err(NetError::shape(format!(
                            "bias row {} out of bounds for layer {} (size {})",
                            record.row,
                            record.layer,
                            bias.len()
                        )));
                    }
                    bias[record.row] = record.value;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Network {:?}", self.topology())
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ParamKind {
    Weight,
    Bias,
}

/// One line of the model file.
#[derive(Debug, Serialize, Deserialize)]
struct ParamRecord {
    #[serde(rename = "type")]
    kind: ParamKind,
    layer: usize,
    row: usize,
    col: usize,
    value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activations::Activation;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn layer(index: usize, size: usize, act: Activation) -> Layer {
        Layer::new(index, size, act).unwrap()
    }

    fn small_net(seed: u64) -> Network {
        let layers = vec![
            layer(0, 2, Activation::None),
            layer(1, 3, Activation::ReLU),
            layer(2, 1, Activation::Sigmoid),
        ];
        Network::with_rng(layers, &mut StdRng::seed_from_u64(seed)).unwrap()
    }

    #[test]
    fn weight_shapes_match_layer_sizes() {
        let net = small_net(1);
        assert_eq!(net.weights.len(), 2);
        assert_eq!(net.weights[0].rows(), 2);
        assert_eq!(net.weights[0].cols(), 3);
        assert_eq!(net.weights[1].rows(), 3);
        assert_eq!(net.weights[1].cols(), 1);
    }

    #[test]
    fn construction_is_deterministic_with_equal_seeds() {
        let a = small_net(9);
        let b = small_net(9);
        for (wa, wb) in a.weights.iter().zip(&b.weights) {
            assert_eq!(wa, wb);
        }
    }

    #[test]
    fn single_layer_network_is_config_error() {
        let layers = vec![layer(0, 2, Activation::None)];
        let result = Network::with_rng(layers, &mut StdRng::seed_from_u64(0));
        assert!(matches!(result, Err(NetError::Config(_))));
    }

    #[test]
    fn out_of_order_layer_indices_are_config_error() {
        let layers = vec![layer(0, 2, Activation::None), layer(2, 1, Activation::Sigmoid)];
        let result = Network::with_rng(layers, &mut StdRng::seed_from_u64(0));
        assert!(matches!(result, Err(NetError::Config(_))));
    }

    #[test]
    fn forward_rejects_wrong_input_length() {
        let mut net = small_net(2);
        assert!(matches!(
            net.forward(&[1.0, 2.0, 3.0]),
            Err(NetError::Shape(_))
        ));
        assert!(matches!(net.predict(&[1.0]), Err(NetError::Shape(_))));
    }

    #[test]
    fn forward_is_a_pure_function_of_the_input() {
        let mut net = small_net(3);
        let first = net.forward(&[0.3, -0.8]).unwrap();
        // interleave an unrelated input; scratch must not leak across calls
        net.forward(&[5.0, 5.0]).unwrap();
        let second = net.forward(&[0.3, -0.8]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn forward_output_is_a_probability() {
        let mut net = small_net(4);
        let out = net.forward(&[0.5, 0.5]).unwrap();
        assert_eq!(out.len(), 1);
        assert!(out[0] > 0.0 && out[0] < 1.0);
    }

    #[test]
    fn forward_matches_hand_computation() {
        // [1] -> [1 sigmoid], fixed parameters
        let layers = vec![layer(0, 1, Activation::None), layer(1, 1, Activation::Sigmoid)];
        let mut net = Network::with_rng(layers, &mut StdRng::seed_from_u64(0)).unwrap();
        net.weights[0][(0, 0)] = 0.5;
        net.layers[1].bias[0] = -0.25;
        let out = net.forward(&[2.0]).unwrap();
        let z: f64 = 0.5 * 2.0 - 0.25;
        assert_relative_eq!(out[0], 1.0 / (1.0 + (-z).exp()));
        assert_relative_eq!(net.layers[1].z[0], z);
    }

    #[test]
    fn learning_rate_schedule_decays_to_a_floor() {
        assert_relative_eq!(decayed_learning_rate(0.1, 0), 0.1);
        assert_relative_eq!(
            decayed_learning_rate(0.1, 100),
            0.1 * 0.996f64.powi(100),
            epsilon = 1e-12
        );
        assert!(decayed_learning_rate(0.1, 100) < 0.068);
        assert!(decayed_learning_rate(0.1, 100) > 0.066);
        // strictly decreasing until the floor
        for epoch in 0..500 {
            let here = decayed_learning_rate(0.1, epoch);
            let next = decayed_learning_rate(0.1, epoch + 1);
            assert!(next <= here);
            assert!(next >= MIN_LR);
        }
        assert_eq!(decayed_learning_rate(0.1, 100_000), MIN_LR);
    }

    #[test]
    fn train_validates_its_configuration() {
        let mut net = small_net(5);
        let x = vec![vec![0.0, 1.0]];
        let y = vec![vec![1.0]];
        assert!(matches!(
            net.train(&x, &[], 0.1, 1, 1, false),
            Err(NetError::Config(_))
        ));
        assert!(matches!(
            net.train(&[], &[], 0.1, 1, 1, false),
            Err(NetError::Config(_))
        ));
        assert!(matches!(
            net.train(&x, &y, 0.0, 1, 1, false),
            Err(NetError::Config(_))
        ));
        assert!(matches!(
            net.train(&x, &y, 0.1, 0, 1, false),
            Err(NetError::Config(_))
        ));
        assert!(matches!(
            net.train(&x, &y, 0.1, 1, 0, false),
            Err(NetError::Config(_))
        ));
    }

    #[test]
    fn train_rejects_misshapen_samples() {
        let mut net = small_net(6);
        let bad_input = vec![vec![0.0, 1.0, 2.0]];
        let bad_target = vec![vec![1.0, 0.0]];
        let y = vec![vec![1.0]];
        let x = vec![vec![0.0, 1.0]];
        assert!(matches!(
            net.train(&bad_input, &y, 0.1, 1, 1, false),
            Err(NetError::Shape(_))
        ));
        assert!(matches!(
            net.train(&x, &bad_target, 0.1, 1, 1, false),
            Err(NetError::Shape(_))
        ));
    }

    #[test]
    fn full_batch_update_is_the_mean_of_per_sample_gradients() {
        // [1] -> [1 sigmoid] with fixed parameters; one epoch, one batch.
        let layers = vec![layer(0, 1, Activation::None), layer(1, 1, Activation::Sigmoid)];
        let mut net = Network::with_rng(layers, &mut StdRng::seed_from_u64(0)).unwrap();
        let w0 = 0.4;
        let b0 = -0.1;
        net.weights[0][(0, 0)] = w0;
        net.layers[1].bias[0] = b0;

        let inputs = vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0]];
        let targets = vec![vec![0.0], vec![1.0], vec![0.0], vec![1.0]];
        let lr = 0.5; // epoch 0: effective lr equals the base rate

        let mut grad_w = 0.0;
        let mut grad_b = 0.0;
        for (x, y) in inputs.iter().zip(&targets) {
            let p = 1.0 / (1.0 + (-(w0 * x[0] + b0)).exp());
            let g = p - y[0];
            grad_w += g * x[0];
            grad_b += g;
        }
        let n = inputs.len() as f64;

        net.train(&inputs, &targets, lr, 1, inputs.len(), false).unwrap();
        assert_relative_eq!(net.weights[0][(0, 0)], w0 - lr * grad_w / n, epsilon = 1e-12);
        assert_relative_eq!(net.layers[1].bias[0], b0 - lr * grad_b / n, epsilon = 1e-12);
    }

    #[test]
    fn truncated_final_batch_averages_over_its_own_count() {
        // 3 samples, batch of 2: the second batch holds a single sample and
        // must be divided by 1, not 2.
        let layers = vec![layer(0, 1, Activation::None), layer(1, 1, Activation::Sigmoid)];
        let mut net = Network::with_rng(layers, &mut StdRng::seed_from_u64(0)).unwrap();
        let w0 = 0.2;
        net.weights[0][(0, 0)] = w0;
        net.layers[1].bias[0] = 0.0;

        let inputs = vec![vec![1.0], vec![-1.0], vec![2.0]];
        let targets = vec![vec![1.0], vec![0.0], vec![1.0]];
        let lr = 0.1;

        // Replay the exact update sequence by hand.
        let mut w = w0;
        let mut b = 0.0;
        for chunk in [&[0usize, 1][..], &[2][..]] {
            let mut gw = 0.0;
            let mut gb = 0.0;
            for &k in chunk {
                let p = 1.0 / (1.0 + (-(w * inputs[k][0] + b)).exp());
                let g = p - targets[k][0];
                gw += g * inputs[k][0];
                gb += g;
            }
            let n = chunk.len() as f64;
            w -= lr * gw / n;
            b -= lr * gb / n;
        }

        net.train(&inputs, &targets, lr, 1, 2, false).unwrap();
        assert_relative_eq!(net.weights[0][(0, 0)], w, epsilon = 1e-12);
        assert_relative_eq!(net.layers[1].bias[0], b, epsilon = 1e-12);
    }
}
