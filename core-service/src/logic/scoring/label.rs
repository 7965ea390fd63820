//! Risk Labels and Label Encoder
//!
//! KHÔNG chứa logic scoring - chỉ có các kiểu nhãn và ánh xạ nhãn ↔ mã lớp.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RockfallError};

/// Multiclass risk category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLabel {
    Low,
    Medium,
    High,
}

impl RiskLabel {
    pub const ALL: [RiskLabel; 3] = [RiskLabel::Low, RiskLabel::Medium, RiskLabel::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLabel::Low => "Low",
            RiskLabel::Medium => "Medium",
            RiskLabel::High => "High",
        }
    }
}

impl std::fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RiskLabel {
    type Err = RockfallError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Low" => Ok(RiskLabel::Low),
            "Medium" => Ok(RiskLabel::Medium),
            "High" => Ok(RiskLabel::High),
            other => Err(RockfallError::invalid("risk_level", format!("unknown label '{}'", other))),
        }
    }
}

/// Rockfall / no rockfall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum BinaryRiskLabel {
    NoRockfall,
    Rockfall,
}

impl BinaryRiskLabel {
    pub fn as_u8(&self) -> u8 {
        match self {
            BinaryRiskLabel::NoRockfall => 0,
            BinaryRiskLabel::Rockfall => 1,
        }
    }

    pub fn class_index(&self) -> usize {
        self.as_u8() as usize
    }
}

impl From<BinaryRiskLabel> for u8 {
    fn from(label: BinaryRiskLabel) -> u8 {
        label.as_u8()
    }
}

impl TryFrom<u8> for BinaryRiskLabel {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(BinaryRiskLabel::NoRockfall),
            1 => Ok(BinaryRiskLabel::Rockfall),
            other => Err(format!("binary label must be 0 or 1, got {}", other)),
        }
    }
}

// ============================================================================
// LABEL ENCODER
// ============================================================================

/// Bijection between RiskLabel names and integer codes
///
/// Codes follow the sorted class names (High=0, Low=1, Medium=2), the same
/// encoding the multiclass targets were originally trained with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<RiskLabel>,
}

impl LabelEncoder {
    /// Encoder over the classes present in `labels`
    pub fn fit(labels: &[RiskLabel]) -> Result<Self> {
        let mut classes: Vec<RiskLabel> = labels.to_vec();
        classes.sort_by_key(|l| l.as_str());
        classes.dedup();

        if classes.is_empty() {
            return Err(RockfallError::Model("cannot fit label encoder on no labels".to_string()));
        }

        Ok(Self { classes })
    }

    /// Encoder over all three classes
    pub fn standard() -> Self {
        let mut classes = RiskLabel::ALL.to_vec();
        classes.sort_by_key(|l| l.as_str());
        Self { classes }
    }

    pub fn classes(&self) -> &[RiskLabel] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn encode(&self, label: RiskLabel) -> Result<usize> {
        self.classes
            .iter()
            .position(|&c| c == label)
            .ok_or_else(|| RockfallError::invalid("risk_level", format!("label '{}' not known to encoder", label)))
    }

    pub fn decode(&self, code: usize) -> Result<RiskLabel> {
        self.classes
            .get(code)
            .copied()
            .ok_or_else(|| RockfallError::Model(format!("class code {} out of range", code)))
    }

    pub fn encode_all(&self, labels: &[RiskLabel]) -> Result<Vec<usize>> {
        labels.iter().map(|&l| self.encode(l)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_roundtrip_all_labels() {
        let encoder = LabelEncoder::standard();
        for label in RiskLabel::ALL {
            let code = encoder.encode(label).unwrap();
            assert_eq!(encoder.decode(code).unwrap(), label);
        }
    }

    #[test]
    fn test_encoder_uses_sorted_names() {
        let encoder = LabelEncoder::fit(&[RiskLabel::Medium, RiskLabel::Low, RiskLabel::High, RiskLabel::Low]).unwrap();
        assert_eq!(encoder.classes(), &[RiskLabel::High, RiskLabel::Low, RiskLabel::Medium]);
        assert_eq!(encoder, LabelEncoder::standard());
    }

    #[test]
    fn test_unknown_code_fails() {
        let encoder = LabelEncoder::fit(&[RiskLabel::Low, RiskLabel::High]).unwrap();
        assert!(encoder.decode(2).is_err());
        assert!(encoder.encode(RiskLabel::Medium).is_err());
    }

    #[test]
    fn test_binary_label_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&BinaryRiskLabel::Rockfall).unwrap(), "1");
        let parsed: BinaryRiskLabel = serde_json::from_str("0").unwrap();
        assert_eq!(parsed, BinaryRiskLabel::NoRockfall);
        assert!(serde_json::from_str::<BinaryRiskLabel>("2").is_err());
    }

    #[test]
    fn test_label_parse() {
        assert_eq!("High".parse::<RiskLabel>().unwrap(), RiskLabel::High);
        assert!("Severe".parse::<RiskLabel>().is_err());
    }
}
