//! K-Nearest Neighbors Classifier
//!
//! Euclidean distance, uniform vote. Probabilities are vote fractions among
//! the k nearest training rows.

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use super::classifier::{check_training_set, Classifier};
use crate::error::{Result, RockfallError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnnClassifier {
    k: usize,
    n_classes: usize,
    x_train: Option<Array2<f64>>,
    y_train: Vec<usize>,
}

impl KnnClassifier {
    pub fn new(k: usize, n_classes: usize) -> Self {
        Self {
            k: k.max(1),
            n_classes,
            x_train: None,
            y_train: Vec::new(),
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }
}

fn euclidean(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum::<f64>().sqrt()
}

impl Classifier for KnnClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[usize]) -> Result<()> {
        check_training_set(x, y, self.n_classes)?;
        self.x_train = Some(x.clone());
        self.y_train = y.to_vec();
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let Some(x_train) = &self.x_train else {
            return Err(RockfallError::Model("knn classifier is not fitted".to_string()));
        };
        if x.ncols() != x_train.ncols() {
            return Err(RockfallError::Model(format!(
                "knn expects {} features, got {}",
                x_train.ncols(),
                x.ncols()
            )));
        }

        let k = self.k.min(x_train.nrows());
        let mut out = Array2::zeros((x.nrows(), self.n_classes));

        for (r, sample) in x.rows().into_iter().enumerate() {
            let mut distances: Vec<(f64, usize)> = x_train
                .rows()
                .into_iter()
                .zip(&self.y_train)
                .map(|(row, &label)| (euclidean(sample, row), label))
                .collect();
            // Stable sort keeps training order among equal distances
            distances.sort_by(|a, b| a.0.total_cmp(&b.0));

            for &(_, label) in distances.iter().take(k) {
                out[[r, label]] += 1.0 / k as f64;
            }
        }

        Ok(out)
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_vote_fractions() {
        let x = array![[0.0], [0.1], [0.2], [5.0], [5.1]];
        let y = [0, 0, 0, 1, 1];
        let mut knn = KnnClassifier::new(3, 2);
        knn.fit(&x, &y).unwrap();

        let proba = knn.predict_proba(&array![[0.05], [5.05]]).unwrap();
        assert!((proba[[0, 0]] - 1.0).abs() < 1e-12);
        assert!((proba[[1, 1]] - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(knn.predict(&array![[4.9]]).unwrap(), vec![1]);
    }

    #[test]
    fn test_k_larger_than_training_set() {
        let mut knn = KnnClassifier::new(7, 2);
        knn.fit(&array![[0.0], [1.0]], &[0, 1]).unwrap();
        let proba = knn.predict_proba(&array![[0.0]]).unwrap();
        assert!((proba[[0, 0]] - 0.5).abs() < 1e-12);
    }
}
