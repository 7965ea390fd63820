//! Training Report
//!
//! Serializable summary of a training run plus the feature-importance table.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::logic::dataset::LabelDistribution;
use crate::logic::features::{LayoutStamp, FEATURE_LAYOUT};
use crate::logic::model::metrics::ConfusionMatrix;
use crate::logic::model::ClassifierKind;

pub const REPORT_FILE: &str = "training_report.json";
pub const FEATURE_IMPORTANCE_FILE: &str = "feature_importance.csv";

/// Held-out score of one candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub kind: ClassifierKind,
    pub accuracy: f64,
    pub auc: f64,
}

/// Candidates and winner for one task (binary or multiclass)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskReport {
    pub task: String,
    pub n_classes: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub candidates: Vec<CandidateScore>,
    pub best: ClassifierKind,
    pub confusion: ConfusionMatrix,
}

impl TaskReport {
    pub fn best_score(&self) -> Option<&CandidateScore> {
        self.candidates.iter().find(|c| c.kind == self.best)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureImportance {
    pub feature: &'static str,
    pub importance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    pub generated_at: DateTime<Utc>,
    pub layout: LayoutStamp,
    pub samples: usize,
    pub seed: u64,
    pub test_ratio: f64,
    pub distribution: LabelDistribution,
    pub binary: TaskReport,
    pub multiclass: TaskReport,
    /// Sorted descending; empty when no forest was trained for multiclass
    pub feature_importances: Vec<FeatureImportance>,
}

impl TrainingReport {
    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }
}

/// Pair importances with layout names, most important first
pub fn rank_importances(importances: &[f64]) -> Vec<FeatureImportance> {
    let mut ranked: Vec<FeatureImportance> = FEATURE_LAYOUT
        .iter()
        .zip(importances)
        .map(|(&feature, &importance)| FeatureImportance { feature, importance })
        .collect();
    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    ranked
}

/// `feature,importance` CSV
pub fn write_feature_importances(path: &Path, ranked: &[FeatureImportance]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    for row in ranked {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::FEATURE_COUNT;
    use tempfile::tempdir;

    #[test]
    fn test_rank_importances_sorted() {
        let mut importances = vec![0.0; FEATURE_COUNT];
        importances[3] = 0.5;
        importances[17] = 0.3;
        importances[0] = 0.2;

        let ranked = rank_importances(&importances);
        assert_eq!(ranked.len(), FEATURE_COUNT);
        assert_eq!(ranked[0].feature, "friction_angle_deg");
        assert_eq!(ranked[1].feature, "stability_index");
        assert_eq!(ranked[2].feature, "slope_height_m");
    }

    #[test]
    fn test_importance_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fi.csv");
        let ranked = vec![
            FeatureImportance { feature: "rainfall_mm", importance: 0.75 },
            FeatureImportance { feature: "rqd_percent", importance: 0.25 },
        ];

        write_feature_importances(&path, &ranked).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["feature,importance", "rainfall_mm,0.75", "rqd_percent,0.25"]);
    }
}
