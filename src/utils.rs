//! Synthetic data generation for demos and tests.
use rand::Rng;

/// Two-feature, linearly separable binary dataset: label 1.0 when
/// `x0 + x1 > 0`, with a margin keeping samples off the boundary.
pub fn synthetic_linearly_separable<R: Rng + ?Sized>(
    n_samples: usize,
    rng: &mut R,
) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
    let mut inputs = Vec::with_capacity(n_samples);
    let mut targets = Vec::with_capacity(n_samples);
    for _ in 0..n_samples {
        let positive = rng.gen_bool(0.5);
        let (x0, x1) = loop {
            let x0 = rng.gen_range(-1.0..1.0);
            let x1 = rng.gen_range(-1.0..1.0);
            let sum = x0 + x1;
            if positive && sum > 0.2 {
                break (x0, x1);
            }
            if !positive && sum < -0.2 {
                break (x0, x1);
            }
        };
        inputs.push(vec![x0, x1]);
        targets.push(vec![positive as u8 as f64]);
    }
    (inputs, targets)
}

/// Separable dataset with an arbitrary feature count: positive samples draw
/// their readings from a high band, negative ones from a low band.
pub fn synthetic_readings<R: Rng + ?Sized>(
    n_samples: usize,
    n_features: usize,
    rng: &mut R,
) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
    let mut inputs = Vec::with_capacity(n_samples);
    let mut targets = Vec::with_capacity(n_samples);
    for _ in 0..n_samples {
        let positive = rng.gen_bool(0.5);
        let band = if positive { 0.6..1.0 } else { 0.0..0.4 };
        let features = (0..n_features)
            .map(|_| rng.gen_range(band.clone()))
            .collect();
        inputs.push(features);
        targets.push(vec![positive as u8 as f64]);
    }
    (inputs, targets)
}
