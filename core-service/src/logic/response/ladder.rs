//! Risk Ladders
//!
//! Ordered probability thresholds → alert category. Comparisons are strict
//! `>` from the top rung down.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Low => "LOW",
            AlertLevel::Medium => "MEDIUM",
            AlertLevel::High => "HIGH",
            AlertLevel::Critical => "CRITICAL",
        }
    }

    /// Dashboard colour
    pub fn color(&self) -> &'static str {
        match self {
            AlertLevel::Low => "green",
            AlertLevel::Medium => "yellow",
            AlertLevel::High => "orange",
            AlertLevel::Critical => "red",
        }
    }
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskLadder {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
}

impl RiskLadder {
    /// Live API ladder
    pub const SENSITIVE: RiskLadder = RiskLadder { critical: 0.4, high: 0.3, medium: 0.1 };

    /// Batch prediction ladder
    pub const CONSERVATIVE: RiskLadder = RiskLadder { critical: 0.8, high: 0.6, medium: 0.4 };

    pub fn classify(&self, probability: f64) -> AlertLevel {
        if probability > self.critical {
            AlertLevel::Critical
        } else if probability > self.high {
            AlertLevel::High
        } else if probability > self.medium {
            AlertLevel::Medium
        } else {
            AlertLevel::Low
        }
    }
}
