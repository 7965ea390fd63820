//! Candidate Training and Selection
//!
//! Fits every candidate classifier on a stratified split for the binary and
//! multiclass targets, keeps the most accurate one per task and persists the
//! winners plus the label encoder into `<model_dir>/best_models/`.

use std::path::{Path, PathBuf};

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::report::{
    rank_importances, write_feature_importances, CandidateScore, TaskReport, TrainingReport,
    FEATURE_IMPORTANCE_FILE, REPORT_FILE,
};
use crate::constants::{BEST_MODELS_DIR, DEFAULT_SEED, DEFAULT_TEST_RATIO};
use crate::error::{Result, RockfallError};
use crate::logic::dataset::{select, stratified_split, to_matrix, DatasetRecord, LabelDistribution};
use crate::logic::features::LayoutStamp;
use crate::logic::model::metrics::{accuracy, report_auc, ConfusionMatrix};
use crate::logic::model::registry::save_artifact;
use crate::logic::model::{ArtifactKind, ClassifierKind, TrainedModel};
use crate::logic::scoring::{LabelEncoder, RiskLabel};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub test_ratio: f64,
    pub seed: u64,
    /// Tried in order; ties keep the earlier candidate
    pub candidates: Vec<ClassifierKind>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_ratio: DEFAULT_TEST_RATIO,
            seed: DEFAULT_SEED,
            candidates: ClassifierKind::ALL.to_vec(),
        }
    }
}

/// Winning models of a run, not yet written to disk
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub binary: TrainedModel,
    pub multiclass: TrainedModel,
    pub encoder: LabelEncoder,
    pub report: TrainingReport,
}

/// Paths written by `save_outcome`
#[derive(Debug, Clone)]
pub struct SavedArtifacts {
    pub binary_model: PathBuf,
    pub multiclass_model: PathBuf,
    pub label_encoder: PathBuf,
    pub report: PathBuf,
    pub feature_importances: Option<PathBuf>,
}

pub fn train_all(records: &[DatasetRecord], config: &TrainingConfig) -> Result<TrainingOutcome> {
    if config.candidates.is_empty() {
        return Err(RockfallError::invalid("candidates", "no classifier to train"));
    }

    let binary_labels: Vec<usize> = records.iter().map(|r| r.rockfall_binary.class_index()).collect();
    let levels: Vec<RiskLabel> = records.iter().map(|r| r.risk_level).collect();
    let encoder = LabelEncoder::fit(&levels)?;
    let multiclass_labels = encoder.encode_all(&levels)?;

    log::info!("Training on {} samples: {}", records.len(), LabelDistribution::of(records));

    let (binary, binary_report) = train_task("binary", records, &binary_labels, 2, config)?;
    let (multiclass, multiclass_report) =
        train_task("multiclass", records, &multiclass_labels, encoder.n_classes(), config)?;

    let feature_importances = multiclass
        .estimator
        .feature_importances()
        .map(rank_importances)
        .unwrap_or_default();

    let report = TrainingReport {
        generated_at: chrono::Utc::now(),
        layout: LayoutStamp::current(),
        samples: records.len(),
        seed: config.seed,
        test_ratio: config.test_ratio,
        distribution: LabelDistribution::of(records),
        binary: binary_report,
        multiclass: multiclass_report,
        feature_importances,
    };

    Ok(TrainingOutcome { binary, multiclass, encoder, report })
}

/// Split, fit each candidate, keep the best by held-out accuracy
fn train_task(
    task: &str,
    records: &[DatasetRecord],
    labels: &[usize],
    n_classes: usize,
    config: &TrainingConfig,
) -> Result<(TrainedModel, TaskReport)> {
    let split = stratified_split(labels, config.test_ratio, config.seed)?;
    let x_train = to_matrix(records, &split.train)?;
    let x_test = to_matrix(records, &split.test)?;
    let y_train = select(labels, &split.train);
    let y_test = select(labels, &split.test);

    let mut candidates = Vec::with_capacity(config.candidates.len());
    let mut best: Option<(TrainedModel, f64, Vec<usize>)> = None;

    for &kind in &config.candidates {
        let model = TrainedModel::train(kind, &x_train, &y_train, n_classes, config.seed)?;
        let (score, predictions) = evaluate(&model, &x_test, &y_test)?;

        log::info!(
            "[{}] {}: accuracy={:.3} auc={:.3}",
            task,
            kind,
            score.accuracy,
            score.auc
        );

        let better = best.as_ref().map_or(true, |(_, acc, _)| score.accuracy > *acc);
        if better {
            best = Some((model, score.accuracy, predictions));
        }
        candidates.push(score);
    }

    let (model, best_accuracy, predictions) = best
        .ok_or_else(|| RockfallError::Model(format!("no {task} candidate was trained")))?;
    log::info!("[{}] best model: {} ({:.3})", task, model.kind(), best_accuracy);

    let report = TaskReport {
        task: task.to_string(),
        n_classes,
        train_rows: split.train.len(),
        test_rows: split.test.len(),
        candidates,
        best: model.kind(),
        confusion: ConfusionMatrix::from_predictions(&y_test, &predictions, n_classes),
    };
    Ok((model, report))
}

fn evaluate(model: &TrainedModel, x_test: &Array2<f64>, y_test: &[usize]) -> Result<(CandidateScore, Vec<usize>)> {
    let proba = model.predict_proba(x_test)?;
    let predictions = model.predict(x_test)?;
    let score = CandidateScore {
        kind: model.kind(),
        accuracy: accuracy(y_test, &predictions),
        auc: report_auc(y_test, &proba),
    };
    Ok((score, predictions))
}

/// Write winners to `<model_dir>/best_models/`, report and importances to `<model_dir>/`
pub fn save_outcome(outcome: &TrainingOutcome, model_dir: &Path) -> Result<SavedArtifacts> {
    let best_dir = model_dir.join(BEST_MODELS_DIR);

    let binary_model = save_artifact(&best_dir, ArtifactKind::BinaryModel, &outcome.binary)?;
    let multiclass_model = save_artifact(&best_dir, ArtifactKind::MulticlassModel, &outcome.multiclass)?;
    let label_encoder = save_artifact(&best_dir, ArtifactKind::LabelEncoder, &outcome.encoder)?;

    let report = model_dir.join(REPORT_FILE);
    outcome.report.write_json(&report)?;

    let feature_importances = if outcome.report.feature_importances.is_empty() {
        None
    } else {
        let path = model_dir.join(FEATURE_IMPORTANCE_FILE);
        write_feature_importances(&path, &outcome.report.feature_importances)?;
        Some(path)
    };

    log::info!("Training artifacts saved under {}", model_dir.display());
    Ok(SavedArtifacts {
        binary_model,
        multiclass_model,
        label_encoder,
        report,
        feature_importances,
    })
}
