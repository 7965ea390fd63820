//! Dataset Construction
//!
//! Generate a labeled synthetic dataset, or relabel an existing one under a
//! different scoring policy without touching its features.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::record::DatasetRecord;
use crate::error::{Result, RockfallError};
use crate::logic::features::{derived, DerivedFeatures};
use crate::logic::generator::{SampleGenerator, SamplingProfile};
use crate::logic::scoring::{BinaryRiskLabel, Normalization, RiskLabel, RiskScorer, ScoringPolicy};

/// `n` samples from the dataset profile, labeled with batch normalization.
/// Label noise continues the generator's seeded stream.
pub fn generate_dataset(n: usize, seed: u64, policy: ScoringPolicy) -> Result<Vec<DatasetRecord>> {
    let mut generator = SampleGenerator::seeded(SamplingProfile::dataset(), seed);
    let raws = generator.generate_batch(n);

    let derived: Vec<DerivedFeatures> = raws.iter().map(derived::compute).collect::<Result<_>>()?;

    let scorer = RiskScorer::new(policy);
    let scored = scorer.label_batch(&derived, &Normalization::Batch, generator.rng_mut())?;

    let records: Vec<DatasetRecord> = raws
        .iter()
        .zip(&derived)
        .zip(&scored)
        .map(|((raw, d), s)| DatasetRecord::from_parts(raw, d, s))
        .collect();

    log::info!(
        "Generated {} samples (seed {}, {} policy): {}",
        records.len(),
        seed,
        policy,
        LabelDistribution::of(&records)
    );
    Ok(records)
}

/// Overwrite targets using the stored derived columns
pub fn relabel(records: &mut [DatasetRecord], policy: ScoringPolicy, seed: u64) -> Result<()> {
    if records.is_empty() {
        return Err(RockfallError::invalid("dataset", "cannot relabel an empty dataset"));
    }

    let derived: Vec<DerivedFeatures> = records.iter().map(DatasetRecord::derived).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    let scored = RiskScorer::new(policy).label_batch(&derived, &Normalization::Batch, &mut rng)?;

    for (record, s) in records.iter_mut().zip(&scored) {
        record.apply_labels(s);
    }

    log::info!(
        "Relabeled {} samples (seed {}, {} policy): {}",
        records.len(),
        seed,
        policy,
        LabelDistribution::of(records)
    );
    Ok(())
}

/// Target counts, for logs and the training report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelDistribution {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub rockfall: usize,
    pub no_rockfall: usize,
}

impl LabelDistribution {
    pub fn of(records: &[DatasetRecord]) -> Self {
        let mut dist = Self::default();
        for r in records {
            match r.risk_level {
                RiskLabel::Low => dist.low += 1,
                RiskLabel::Medium => dist.medium += 1,
                RiskLabel::High => dist.high += 1,
            }
            match r.rockfall_binary {
                BinaryRiskLabel::Rockfall => dist.rockfall += 1,
                BinaryRiskLabel::NoRockfall => dist.no_rockfall += 1,
            }
        }
        dist
    }
}

impl std::fmt::Display for LabelDistribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Low={} Medium={} High={} | rockfall={} no_rockfall={}",
            self.low, self.medium, self.high, self.rockfall, self.no_rockfall
        )
    }
}
