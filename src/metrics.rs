//! Binary-classification evaluation: confusion matrix and derived scores.
use crate::error::Result;
use crate::network::Network;
use std::fmt;

/// Probability cutoff turning a prediction into a binary decision.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Confusion counts for a two-class problem.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub true_pos: usize,
    pub false_pos: usize,
    pub true_neg: usize,
    pub false_neg: usize,
}

impl ConfusionMatrix {
    /// Tally one decision against its ground truth.
    pub fn record(&mut self, predicted: bool, actual: bool) {
        match (predicted, actual) {
            (true, true) => self.true_pos += 1,
            (true, false) => self.false_pos += 1,
            (false, false) => self.true_neg += 1,
            (false, true) => self.false_neg += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.true_pos + self.false_pos + self.true_neg + self.false_neg
    }

    pub fn accuracy(&self) -> f64 {
        if self.total() == 0 {
            return 0.0;
        }
        (self.true_pos + self.true_neg) as f64 / self.total() as f64
    }

    pub fn precision(&self) -> f64 {
        let denom = self.true_pos + self.false_pos;
        if denom == 0 {
            return 0.0;
        }
        self.true_pos as f64 / denom as f64
    }

    pub fn recall(&self) -> f64 {
        let denom = self.true_pos + self.false_neg;
        if denom == 0 {
            return 0.0;
        }
        self.true_pos as f64 / denom as f64
    }

    pub fn f1_score(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            return 0.0;
        }
        2.0 * p * r / (p + r)
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TP: {} | FP: {}", self.true_pos, self.false_pos)?;
        writeln!(f, "FN: {} | TN: {}", self.false_neg, self.true_neg)?;
        writeln!(f, "Accuracy : {:.4}%", self.accuracy() * 100.0)?;
        writeln!(f, "Precision: {:.4}%", self.precision() * 100.0)?;
        writeln!(f, "Recall   : {:.4}%", self.recall() * 100.0)?;
        write!(f, "F1 Score : {:.4}%", self.f1_score() * 100.0)
    }
}

/// Run `predict` over a test set, thresholding the scalar output at
/// [`DECISION_THRESHOLD`] against 0.0/1.0 labels.
pub fn evaluate_binary(
    network: &mut Network,
    features: &[Vec<f64>],
    labels: &[Vec<f64>],
) -> Result<ConfusionMatrix> {
    let mut matrix = ConfusionMatrix::default();
    for (input, label) in features.iter().zip(labels) {
        let p = network.predict(input)?[0];
        matrix.record(p >= DECISION_THRESHOLD, label[0] >= DECISION_THRESHOLD);
    }
    Ok(matrix)
}
