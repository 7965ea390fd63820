//! Risk Scorer
//!
//! Weighted sum of four normalized derived features:
//! `score = Σ wᵢ · featureᵢ / maxᵢ` over steepness, weakness, weather, stress.
//!
//! Maxima come either from the batch being scored (ground-truth construction)
//! or from a fixed reference table (single-sample scoring).

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use super::label::{BinaryRiskLabel, RiskLabel};
use super::policy::ScoringPolicy;
use crate::error::{Result, RockfallError};
use crate::logic::features::DerivedFeatures;

/// Normalizing maxima for the four scored features
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceMaxima {
    pub steepness: f64,
    pub weakness: f64,
    pub weather: f64,
    pub stress: f64,
}

impl Default for ReferenceMaxima {
    /// Upper bounds implied by the `dataset` sampling profile
    fn default() -> Self {
        Self {
            steepness: 85f64.to_radians().tan() * 200.0,
            weakness: (100.0 - 10.0) / 0.1,
            weather: 50.0 * 30.0 / 1.0,
            stress: 10.0 / 11.0 * (59.0 / 60.0),
        }
    }
}

impl ReferenceMaxima {
    /// Column maxima over a batch; needs at least two samples
    pub fn from_batch(batch: &[DerivedFeatures]) -> Result<Self> {
        if batch.len() < 2 {
            return Err(RockfallError::NormalizationAmbiguity(format!(
                "batch normalization needs at least 2 samples, got {}",
                batch.len()
            )));
        }

        let max_of = |f: fn(&DerivedFeatures) -> f64| batch.iter().map(f).fold(f64::NEG_INFINITY, f64::max);

        Ok(Self {
            steepness: max_of(|d| d.slope_steepness_factor),
            weakness: max_of(|d| d.geological_weakness),
            weather: max_of(|d| d.weather_risk_score),
            stress: max_of(|d| d.operational_stress),
        })
    }
}

/// Where the normalizing maxima come from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Normalization {
    /// Maxima over the batch being scored, computed before any sample
    Batch,
    /// Fixed table
    Reference(ReferenceMaxima),
}

impl Default for Normalization {
    fn default() -> Self {
        Normalization::Reference(ReferenceMaxima::default())
    }
}

impl Normalization {
    pub fn resolve(&self, batch: &[DerivedFeatures]) -> Result<ReferenceMaxima> {
        match self {
            Normalization::Batch => ReferenceMaxima::from_batch(batch),
            Normalization::Reference(maxima) => Ok(*maxima),
        }
    }
}

/// Score with its derived labels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredSample {
    pub risk_score: f64,
    pub risk_level: RiskLabel,
    pub rockfall_binary: BinaryRiskLabel,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RiskScorer {
    policy: ScoringPolicy,
}

impl RiskScorer {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ScoringPolicy {
        self.policy
    }

    /// Noiseless score of one sample
    pub fn score(&self, features: &DerivedFeatures, maxima: &ReferenceMaxima) -> f64 {
        self.policy.finalize(self.weighted(features, maxima))
    }

    pub fn score_batch(&self, batch: &[DerivedFeatures], normalization: &Normalization) -> Result<Vec<f64>> {
        let maxima = normalization.resolve(batch)?;
        Ok(batch.iter().map(|d| self.score(d, &maxima)).collect())
    }

    /// Ground-truth labels: score, add the policy's one-time Gaussian noise, then label
    pub fn label_batch<R: Rng + ?Sized>(
        &self,
        batch: &[DerivedFeatures],
        normalization: &Normalization,
        rng: &mut R,
    ) -> Result<Vec<ScoredSample>> {
        let maxima = normalization.resolve(batch)?;
        let params = self.policy.params().noise;
        let noise = Normal::new(params.mean, params.std_dev)
            .map_err(|e| RockfallError::Model(format!("invalid noise distribution: {}", e)))?;

        let labeled = batch
            .iter()
            .map(|d| {
                let noisy = self.policy.finalize(self.weighted(d, &maxima) + noise.sample(rng));
                self.scored(noisy)
            })
            .collect();

        log::debug!("Labeled {} samples with {} policy", batch.len(), self.policy);
        Ok(labeled)
    }

    fn weighted(&self, d: &DerivedFeatures, maxima: &ReferenceMaxima) -> f64 {
        let w = self.policy.params().weights;
        w.steepness * ratio(d.slope_steepness_factor, maxima.steepness)
            + w.weakness * ratio(d.geological_weakness, maxima.weakness)
            + w.weather * ratio(d.weather_risk_score, maxima.weather)
            + w.stress * ratio(d.operational_stress, maxima.stress)
    }

    fn scored(&self, risk_score: f64) -> ScoredSample {
        ScoredSample {
            risk_score,
            risk_level: self.policy.label(risk_score),
            rockfall_binary: self.policy.binary(risk_score),
        }
    }
}

/// Non-positive maximum contributes 0
fn ratio(value: f64, max: f64) -> f64 {
    if max > 0.0 {
        value / max
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn derived(steep: f64, weak: f64, weather: f64, stress: f64) -> DerivedFeatures {
        DerivedFeatures {
            stability_index: 1.0,
            weather_risk_score: weather,
            operational_stress: stress,
            geological_weakness: weak,
            slope_steepness_factor: steep,
        }
    }

    #[test]
    fn test_score_at_maxima_is_weight_sum() {
        let scorer = RiskScorer::new(ScoringPolicy::Initial);
        let maxima = ReferenceMaxima { steepness: 10.0, weakness: 20.0, weather: 30.0, stress: 0.5 };
        let score = scorer.score(&derived(10.0, 20.0, 30.0, 0.5), &maxima);
        assert!((score - 1.0).abs() < 1e-12);

        let half = scorer.score(&derived(5.0, 0.0, 0.0, 0.0), &maxima);
        assert!((half - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_non_positive_max_contributes_zero() {
        let scorer = RiskScorer::new(ScoringPolicy::Initial);
        let maxima = ReferenceMaxima { steepness: 0.0, weakness: -1.0, weather: 30.0, stress: 1.0 };
        let score = scorer.score(&derived(5.0, 5.0, 30.0, 0.0), &maxima);
        assert!((score - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_batch_of_one_is_ambiguous() {
        let scorer = RiskScorer::new(ScoringPolicy::Initial);
        let batch = [derived(1.0, 1.0, 1.0, 0.1)];
        let err = scorer.score_batch(&batch, &Normalization::Batch).unwrap_err();
        assert!(matches!(err, RockfallError::NormalizationAmbiguity(_)));

        // a fixed reference table makes a single sample scorable
        assert!(scorer.score_batch(&batch, &Normalization::default()).is_ok());
    }

    #[test]
    fn test_batch_normalization_uses_batch_max() {
        let scorer = RiskScorer::new(ScoringPolicy::Initial);
        let batch = [derived(2.0, 4.0, 6.0, 0.2), derived(4.0, 8.0, 12.0, 0.4)];
        let scores = scorer.score_batch(&batch, &Normalization::Batch).unwrap();
        assert!((scores[1] - 1.0).abs() < 1e-12);
        assert!((scores[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_rebalanced_labels_stay_in_unit_interval() {
        let scorer = RiskScorer::new(ScoringPolicy::Rebalanced);
        let batch: Vec<DerivedFeatures> = (0..200)
            .map(|i| derived(i as f64, (200 - i) as f64, (i % 17) as f64, (i % 5) as f64 / 10.0))
            .collect();
        let mut rng = StdRng::seed_from_u64(123);
        let labeled = scorer.label_batch(&batch, &Normalization::Batch, &mut rng).unwrap();

        assert_eq!(labeled.len(), 200);
        for s in &labeled {
            assert!((0.0..=1.0).contains(&s.risk_score));
            assert_eq!(s.risk_level, ScoringPolicy::Rebalanced.label(s.risk_score));
        }
    }

    #[test]
    fn test_label_noise_is_seeded() {
        let scorer = RiskScorer::new(ScoringPolicy::Initial);
        let batch = [derived(2.0, 4.0, 6.0, 0.2), derived(4.0, 8.0, 12.0, 0.4)];

        let a = scorer.label_batch(&batch, &Normalization::Batch, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = scorer.label_batch(&batch, &Normalization::Batch, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);

        // noise never leaks into plain scoring
        let plain = scorer.score_batch(&batch, &Normalization::Batch).unwrap();
        let again = scorer.score_batch(&batch, &Normalization::Batch).unwrap();
        assert_eq!(plain, again);
    }

    #[test]
    fn test_default_reference_maxima() {
        let m = ReferenceMaxima::default();
        assert!((m.weakness - 900.0).abs() < 1e-9);
        assert!((m.weather - 1500.0).abs() < 1e-9);
        assert!(m.steepness > 2000.0 && m.steepness < 2400.0);
        assert!(m.stress > 0.89 && m.stress < 0.9);
    }
}
