//! Classifier Abstraction
//!
//! `Classifier` trait at the seam between training and inference, `Estimator`
//! as the serializable closed set of implementations, and `TrainedModel` as
//! the artifact (scaler + estimator + layout stamp).

use std::str::FromStr;

use ndarray::{Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use super::forest::{ForestConfig, RandomForest};
use super::knn::KnnClassifier;
use super::logistic::LogisticRegression;
use super::scaler::StandardScaler;
use crate::error::{Result, RockfallError};
use crate::logic::features::{FeatureVector, LayoutStamp, FEATURE_COUNT};

// ============================================================================
// TRAIT
// ============================================================================

pub trait Classifier {
    /// Fit on rows of `x` with class codes `y` in `0..n_classes()`
    fn fit(&mut self, x: &Array2<f64>, y: &[usize]) -> Result<()>;

    /// One row per sample, one column per class; rows sum to 1
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>>;

    fn n_classes(&self) -> usize;

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.axis_iter(Axis(0)).map(|row| argmax(row)).collect())
    }
}

/// Index of the largest probability; first wins on ties
pub fn argmax(row: ArrayView1<f64>) -> usize {
    let mut best = 0;
    for (i, &p) in row.iter().enumerate() {
        if p > row[best] {
            best = i;
        }
    }
    best
}

pub(crate) fn check_training_set(x: &Array2<f64>, y: &[usize], n_classes: usize) -> Result<()> {
    if x.nrows() == 0 {
        return Err(RockfallError::Model("empty training set".to_string()));
    }
    if x.nrows() != y.len() {
        return Err(RockfallError::Model(format!(
            "{} rows but {} labels",
            x.nrows(),
            y.len()
        )));
    }
    if let Some(&bad) = y.iter().find(|&&c| c >= n_classes) {
        return Err(RockfallError::Model(format!(
            "class code {} outside 0..{}",
            bad, n_classes
        )));
    }
    Ok(())
}

// ============================================================================
// ALGORITHM SELECTION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    RandomForest,
    LogisticRegression,
    Knn,
}

impl ClassifierKind {
    pub const ALL: [ClassifierKind; 3] = [
        ClassifierKind::RandomForest,
        ClassifierKind::LogisticRegression,
        ClassifierKind::Knn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassifierKind::RandomForest => "random_forest",
            ClassifierKind::LogisticRegression => "logistic_regression",
            ClassifierKind::Knn => "knn",
        }
    }

    /// Distance- and gradient-based models train on standardized inputs
    pub fn needs_scaling(&self) -> bool {
        !matches!(self, ClassifierKind::RandomForest)
    }

    pub fn build(&self, n_classes: usize, seed: u64) -> Estimator {
        match self {
            ClassifierKind::RandomForest => Estimator::RandomForest(RandomForest::new(
                ForestConfig { seed, ..Default::default() },
                n_classes,
            )),
            ClassifierKind::LogisticRegression => {
                Estimator::LogisticRegression(LogisticRegression::new(n_classes))
            }
            ClassifierKind::Knn => Estimator::Knn(KnnClassifier::new(7, n_classes)),
        }
    }
}

impl std::fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ClassifierKind {
    type Err = RockfallError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "random_forest" | "rf" => Ok(ClassifierKind::RandomForest),
            "logistic_regression" | "logistic" | "lr" => Ok(ClassifierKind::LogisticRegression),
            "knn" => Ok(ClassifierKind::Knn),
            other => Err(RockfallError::invalid("classifier", format!("unknown classifier '{}'", other))),
        }
    }
}

// ============================================================================
// ESTIMATOR
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum Estimator {
    RandomForest(RandomForest),
    LogisticRegression(LogisticRegression),
    Knn(KnnClassifier),
}

impl Estimator {
    pub fn kind(&self) -> ClassifierKind {
        match self {
            Estimator::RandomForest(_) => ClassifierKind::RandomForest,
            Estimator::LogisticRegression(_) => ClassifierKind::LogisticRegression,
            Estimator::Knn(_) => ClassifierKind::Knn,
        }
    }

    /// Only the forest exposes importances
    pub fn feature_importances(&self) -> Option<&[f64]> {
        match self {
            Estimator::RandomForest(rf) => Some(rf.feature_importances()),
            _ => None,
        }
    }

    fn inner(&self) -> &dyn Classifier {
        match self {
            Estimator::RandomForest(m) => m,
            Estimator::LogisticRegression(m) => m,
            Estimator::Knn(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Classifier {
        match self {
            Estimator::RandomForest(m) => m,
            Estimator::LogisticRegression(m) => m,
            Estimator::Knn(m) => m,
        }
    }
}

impl Classifier for Estimator {
    fn fit(&mut self, x: &Array2<f64>, y: &[usize]) -> Result<()> {
        self.inner_mut().fit(x, y)
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.inner().predict_proba(x)
    }

    fn n_classes(&self) -> usize {
        self.inner().n_classes()
    }
}

// ============================================================================
// TRAINED MODEL ARTIFACT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    pub layout: LayoutStamp,
    pub scaler: Option<StandardScaler>,
    pub estimator: Estimator,
    pub trained_at: chrono::DateTime<chrono::Utc>,
}

impl TrainedModel {
    /// Fit the estimator for `kind`, standardizing first when it needs it
    pub fn train(kind: ClassifierKind, x: &Array2<f64>, y: &[usize], n_classes: usize, seed: u64) -> Result<Self> {
        if x.ncols() != FEATURE_COUNT {
            return Err(RockfallError::Model(format!(
                "training matrix has {} columns, layout has {}",
                x.ncols(),
                FEATURE_COUNT
            )));
        }

        let scaler = if kind.needs_scaling() { Some(StandardScaler::fit(x)?) } else { None };
        let mut estimator = kind.build(n_classes, seed);
        match &scaler {
            Some(s) => estimator.fit(&s.transform(x)?, y)?,
            None => estimator.fit(x, y)?,
        }

        Ok(Self {
            layout: LayoutStamp::current(),
            scaler,
            estimator,
            trained_at: chrono::Utc::now(),
        })
    }

    pub fn kind(&self) -> ClassifierKind {
        self.estimator.kind()
    }

    pub fn n_classes(&self) -> usize {
        self.estimator.n_classes()
    }

    /// Probabilities for raw (unscaled) rows
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        match &self.scaler {
            Some(s) => self.estimator.predict_proba(&s.transform(x)?),
            None => self.estimator.predict_proba(x),
        }
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.axis_iter(Axis(0)).map(|row| argmax(row)).collect())
    }

    /// Class probabilities for one feature vector
    pub fn predict_vector(&self, vector: &FeatureVector) -> Result<Vec<f64>> {
        self.layout.validate()?;
        if vector.version != self.layout.version || vector.layout_hash != self.layout.hash {
            return Err(RockfallError::LayoutMismatch {
                expected_version: self.layout.version,
                expected_hash: self.layout.hash,
                actual_version: vector.version,
                actual_hash: vector.layout_hash,
            });
        }

        let x = Array2::from_shape_vec((1, FEATURE_COUNT), vector.as_slice().to_vec())
            .map_err(|e| RockfallError::Model(format!("bad input shape: {}", e)))?;
        let proba = self.predict_proba(&x)?;
        Ok(proba.row(0).to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two separable blobs along the first feature
    fn blobs(n: usize) -> (Array2<f64>, Vec<usize>) {
        let mut x = Array2::zeros((n, FEATURE_COUNT));
        let mut y = Vec::with_capacity(n);
        for i in 0..n {
            let class = i % 2;
            x[[i, 0]] = if class == 1 { 10.0 + (i % 5) as f64 } else { (i % 5) as f64 };
            x[[i, 1]] = (i % 3) as f64;
            y.push(class);
        }
        (x, y)
    }

    #[test]
    fn test_every_kind_separates_blobs() {
        let (x, y) = blobs(60);
        for kind in ClassifierKind::ALL {
            let model = TrainedModel::train(kind, &x, &y, 2, 42).unwrap();
            assert_eq!(model.kind(), kind);
            assert_eq!(model.scaler.is_some(), kind.needs_scaling());

            let pred = model.predict(&x).unwrap();
            let correct = pred.iter().zip(&y).filter(|(a, b)| a == b).count();
            assert!(correct >= 57, "{} got {}/60", kind, correct);

            let proba = model.predict_proba(&x).unwrap();
            for row in proba.axis_iter(Axis(0)) {
                assert!((row.sum() - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_artifact_survives_json() {
        let (x, y) = blobs(40);
        let model = TrainedModel::train(ClassifierKind::LogisticRegression, &x, &y, 2, 1).unwrap();
        let json = serde_json::to_string(&model).unwrap();
        let restored: TrainedModel = serde_json::from_str(&json).unwrap();

        let a = model.predict_proba(&x).unwrap();
        let b = restored.predict_proba(&x).unwrap();
        for (p, q) in a.iter().zip(b.iter()) {
            assert!((p - q).abs() < 1e-12);
        }
    }

    #[test]
    fn test_rejects_wrong_width() {
        let x = Array2::zeros((4, 3));
        assert!(TrainedModel::train(ClassifierKind::Knn, &x, &[0, 1, 0, 1], 2, 0).is_err());
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!("random-forest".parse::<ClassifierKind>().unwrap(), ClassifierKind::RandomForest);
        assert_eq!("KNN".parse::<ClassifierKind>().unwrap(), ClassifierKind::Knn);
        assert!("svm".parse::<ClassifierKind>().is_err());
    }
}
