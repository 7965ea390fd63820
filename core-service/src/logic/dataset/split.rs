//! Train/test splitting and matrix assembly

use std::collections::BTreeMap;

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::record::DatasetRecord;
use crate::error::{Result, RockfallError};
use crate::logic::features::FEATURE_COUNT;

/// Row indices of a split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Stratified shuffle split.
///
/// Each class contributes `round(count * test_ratio)` rows to the test side,
/// kept in `[1, count - 1]` so classes with two or more rows appear on both sides.
/// Singleton classes go to train.
pub fn stratified_split(labels: &[usize], test_ratio: f64, seed: u64) -> Result<SplitIndices> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(RockfallError::invalid("test_ratio", format!("{test_ratio} is not in (0, 1)")));
    }
    if labels.len() < 2 {
        return Err(RockfallError::invalid("dataset", "need at least 2 rows to split"));
    }

    let mut by_class: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, &label) in labels.iter().enumerate() {
        by_class.entry(label).or_default().push(i);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();

    for (class, mut rows) in by_class {
        rows.shuffle(&mut rng);
        let count = rows.len();
        let n_test = if count < 2 {
            log::warn!("Class {} has a single row, keeping it in train", class);
            0
        } else {
            ((count as f64 * test_ratio).round() as usize).clamp(1, count - 1)
        };
        test.extend_from_slice(&rows[..n_test]);
        train.extend_from_slice(&rows[n_test..]);
    }

    train.shuffle(&mut rng);
    test.shuffle(&mut rng);
    Ok(SplitIndices { train, test })
}

/// Feature matrix for the given rows, in layout order
pub fn to_matrix(records: &[DatasetRecord], rows: &[usize]) -> Result<Array2<f64>> {
    let mut x = Array2::zeros((rows.len(), FEATURE_COUNT));
    for (r, &idx) in rows.iter().enumerate() {
        let record = records
            .get(idx)
            .ok_or_else(|| RockfallError::invalid("dataset", format!("row {idx} out of range")))?;
        for (c, value) in record.features()?.into_iter().enumerate() {
            x[[r, c]] = value;
        }
    }
    Ok(x)
}

/// Labels for the given rows
pub fn select<T: Copy>(labels: &[T], rows: &[usize]) -> Vec<T> {
    rows.iter().map(|&i| labels[i]).collect()
}
