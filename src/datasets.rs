//! Sensor-dataset ingestion: CSV rows of numeric readings plus a text label,
//! split into disjoint train/test subsets.
use crate::error::{NetError, Result};
use csv::ReaderBuilder;
use log::{info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use std::path::Path;

/// Readings per row in the sensor CSV.
pub const SENSOR_FEATURES: usize = 24;

const NO_COLLISION_LABEL: &str = "Move-Forward";

/// Any label other than `Move-Forward` counts as a collision.
pub fn is_collision_label(label: &str) -> bool {
    label.trim() != NO_COLLISION_LABEL
}

/// Parallel feature rows, single-value 0.0/1.0 label rows, and original row ids.
#[derive(Debug, Clone, Default)]
pub struct SensorSet {
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<Vec<f64>>,
    pub ids: Vec<usize>,
}

impl SensorSet {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// (positive, negative) sample counts.
    pub fn class_balance(&self) -> (usize, usize) {
        let positive = self
            .labels
            .iter()
            .filter(|l| l.first().copied().unwrap_or(0.0) >= 0.5)
            .count();
        (positive, self.len() - positive)
    }
}

/// Disjoint training/testing subsets of one source file.
#[derive(Debug, Clone)]
pub struct SensorSplit {
    pub train: SensorSet,
    pub test: SensorSet,
}

/// Read a headerless sensor CSV. Rows that don't carry exactly
/// [`SENSOR_FEATURES`] finite numeric readings plus a label are skipped.
pub fn load_sensor_data<P: AsRef<Path>>(path: P) -> Result<SensorSet> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path.as_ref())?;
    let mut set = SensorSet::default();
    let mut skipped = 0usize;

    for (id, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() != SENSOR_FEATURES + 1 {
            skipped += 1;
            continue;
        }
        let mut features = Vec::with_capacity(SENSOR_FEATURES);
        let mut parsed = true;
        for field in record.iter().take(SENSOR_FEATURES) {
            match field.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => features.push(v),
                _ => {
                    parsed = false;
                    break;
                }
            }
        }
        if !parsed {
            skipped += 1;
            continue;
        }
        let label = is_collision_label(&record[SENSOR_FEATURES]) as u8 as f64;
        set.features.push(features);
        set.labels.push(vec![label]);
        set.ids.push(id);
    }

    if skipped > 0 {
        warn!(
            "skipped {} malformed rows in {}",
            skipped,
            path.as_ref().display()
        );
    }
    if set.is_empty() {
        return Err(NetError::config(format!(
            "no usable samples in {}",
            path.as_ref().display()
        )));
    }
    let (positive, negative) = set.class_balance();
    info!(
        "loaded {} samples: {} collision ({:.1}%), {} no-collision ({:.1}%)",
        set.len(),
        positive,
        100.0 * positive as f64 / set.len() as f64,
        negative,
        100.0 * negative as f64 / set.len() as f64
    );
    Ok(set)
}

/// Shuffle and partition a dataset; the first `train_fraction` of the
/// shuffled order becomes the training subset, the rest the test subset.
pub fn split<R: Rng + ?Sized>(
    data: &SensorSet,
    train_fraction: f64,
    rng: &mut R,
) -> Result<SensorSplit> {
    if !(0.0..=1.0).contains(&train_fraction) {
        return Err(NetError::config(format!(
            "train fraction must be in [0, 1], got {}",
            train_fraction
        )));
    }
    let mut order: Vec<usize> = (0..data.len()).collect();
    order.shuffle(rng);
    let cut = (data.len() as f64 * train_fraction) as usize;

    let mut train = SensorSet::default();
    let mut test = SensorSet::default();
    for (position, &idx) in order.iter().enumerate() {
        let subset = if position < cut { &mut train } else { &mut test };
        subset.features.push(data.features[idx].clone());
        subset.labels.push(data.labels[idx].clone());
        subset.ids.push(data.ids[idx]);
    }
    Ok(SensorSplit { train, test })
}
