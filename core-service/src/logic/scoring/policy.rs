//! Scoring Policies
//!
//! Two labeling policies exist: the initial one and the rebalanced one used to
//! relabel the dataset. Each carries its own weights, noise, clamping and
//! thresholds; both are selectable at run time.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::label::{BinaryRiskLabel, RiskLabel};
use crate::error::{Result, RockfallError};

/// Weights applied to the normalized derived features
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub steepness: f64,
    pub weakness: f64,
    pub weather: f64,
    pub stress: f64,
}

/// Gaussian label noise `N(mean, std_dev)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseSpec {
    pub mean: f64,
    pub std_dev: f64,
}

/// Category bounds: `score < medium` is Low, `score < high` is Medium, else High
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelThresholds {
    pub medium: f64,
    pub high: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyParams {
    pub weights: ScoreWeights,
    pub noise: NoiseSpec,
    /// Clamp the final score to `[0, 1]`
    pub clamp: bool,
    pub thresholds: LabelThresholds,
    /// `score > cutoff` ⇒ rockfall
    pub binary_cutoff: f64,
}

const INITIAL_PARAMS: PolicyParams = PolicyParams {
    weights: ScoreWeights { steepness: 0.40, weakness: 0.25, weather: 0.20, stress: 0.15 },
    noise: NoiseSpec { mean: 0.0, std_dev: 0.1 },
    clamp: false,
    thresholds: LabelThresholds { medium: 0.3, high: 0.7 },
    binary_cutoff: 0.6,
};

const REBALANCED_PARAMS: PolicyParams = PolicyParams {
    weights: ScoreWeights { steepness: 0.35, weakness: 0.30, weather: 0.20, stress: 0.15 },
    noise: NoiseSpec { mean: 0.15, std_dev: 0.2 },
    clamp: true,
    thresholds: LabelThresholds { medium: 0.4, high: 0.7 },
    binary_cutoff: 0.55,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringPolicy {
    #[default]
    Initial,
    Rebalanced,
}

impl ScoringPolicy {
    pub fn params(&self) -> &'static PolicyParams {
        match self {
            ScoringPolicy::Initial => &INITIAL_PARAMS,
            ScoringPolicy::Rebalanced => &REBALANCED_PARAMS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringPolicy::Initial => "initial",
            ScoringPolicy::Rebalanced => "rebalanced",
        }
    }

    /// Apply the policy's clamp to a noisy or noiseless score
    pub fn finalize(&self, score: f64) -> f64 {
        if self.params().clamp {
            score.clamp(0.0, 1.0)
        } else {
            score
        }
    }

    pub fn label(&self, score: f64) -> RiskLabel {
        let t = self.params().thresholds;
        if score < t.medium {
            RiskLabel::Low
        } else if score < t.high {
            RiskLabel::Medium
        } else {
            RiskLabel::High
        }
    }

    pub fn binary(&self, score: f64) -> BinaryRiskLabel {
        if score > self.params().binary_cutoff {
            BinaryRiskLabel::Rockfall
        } else {
            BinaryRiskLabel::NoRockfall
        }
    }
}

impl std::fmt::Display for ScoringPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ScoringPolicy {
    type Err = RockfallError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "initial" | "a" => Ok(ScoringPolicy::Initial),
            "rebalanced" | "b" => Ok(ScoringPolicy::Rebalanced),
            other => Err(RockfallError::invalid("scoring_policy", format!("unknown policy '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_one() {
        for policy in [ScoringPolicy::Initial, ScoringPolicy::Rebalanced] {
            let w = policy.params().weights;
            let sum = w.steepness + w.weakness + w.weather + w.stress;
            assert!((sum - 1.0).abs() < 1e-12, "{} weights sum to {}", policy, sum);
        }
    }

    #[test]
    fn test_initial_thresholds() {
        let p = ScoringPolicy::Initial;
        assert_eq!(p.label(0.29), RiskLabel::Low);
        assert_eq!(p.label(0.3), RiskLabel::Medium);
        assert_eq!(p.label(0.69), RiskLabel::Medium);
        assert_eq!(p.label(0.7), RiskLabel::High);
        assert_eq!(p.label(-0.2), RiskLabel::Low);
        assert_eq!(p.binary(0.6), BinaryRiskLabel::NoRockfall);
        assert_eq!(p.binary(0.61), BinaryRiskLabel::Rockfall);
        // initial policy never clamps
        assert_eq!(p.finalize(1.4), 1.4);
    }

    #[test]
    fn test_rebalanced_thresholds_and_clamp() {
        let p = ScoringPolicy::Rebalanced;
        assert_eq!(p.finalize(-0.3), 0.0);
        assert_eq!(p.finalize(1.3), 1.0);
        assert_eq!(p.label(0.39), RiskLabel::Low);
        assert_eq!(p.label(0.4), RiskLabel::Medium);
        assert_eq!(p.label(0.7), RiskLabel::High);
        assert_eq!(p.label(1.0), RiskLabel::High);
        assert_eq!(p.binary(0.55), BinaryRiskLabel::NoRockfall);
        assert_eq!(p.binary(0.56), BinaryRiskLabel::Rockfall);
    }

    #[test]
    fn test_parse_policy() {
        assert_eq!("Rebalanced".parse::<ScoringPolicy>().unwrap(), ScoringPolicy::Rebalanced);
        assert_eq!("initial".parse::<ScoringPolicy>().unwrap(), ScoringPolicy::Initial);
        assert!("aggressive".parse::<ScoringPolicy>().is_err());
        assert_eq!(serde_json::to_string(&ScoringPolicy::Rebalanced).unwrap(), "\"rebalanced\"");
    }
}
