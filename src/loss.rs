//! Binary cross-entropy loss and its output-layer gradient.

/// Clamp bound keeping `ln` away from zero.
pub const PROB_EPSILON: f64 = 1e-7;

/// Clamp a prediction into `[PROB_EPSILON, 1 - PROB_EPSILON]`.
pub fn clamp_probability(p: f64) -> f64 {
    p.clamp(PROB_EPSILON, 1.0 - PROB_EPSILON)
}

/// Binary cross-entropy for a single prediction/target pair.
///
/// `L = -(y·ln(p) + (1-y)·ln(1-p))`, with `p` clamped so the loss stays finite.
pub fn bce_loss(pred: f64, target: f64) -> f64 {
    let p = clamp_probability(pred);
    -(target * p.ln() + (1.0 - target) * (1.0 - p).ln())
}

/// Output-layer gradient for a sigmoid output trained with BCE.
///
/// `p - y` is the fused derivative of sigmoid + BCE. It is only valid under
/// that pairing; for any other loss/activation combination the loss gradient
/// and the activation derivative must be chained separately.
pub fn bce_output_gradient(pred: f64, target: f64) -> f64 {
    clamp_probability(pred) - target
}
