//! Evaluation Metrics
//!
//! Accuracy, ROC-AUC (binary and one-vs-rest macro) and confusion matrices for
//! the training report.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub fn accuracy(y_true: &[usize], y_pred: &[usize]) -> f64 {
    if y_true.is_empty() || y_true.len() != y_pred.len() {
        return 0.0;
    }
    let correct = y_true.iter().zip(y_pred).filter(|(a, b)| a == b).count();
    correct as f64 / y_true.len() as f64
}

/// Rank-based (Mann-Whitney) AUC; `None` when only one class is present
pub fn roc_auc(positive: &[bool], scores: &[f64]) -> Option<f64> {
    if positive.len() != scores.len() {
        return None;
    }

    let n_pos = positive.iter().filter(|&&p| p).count();
    let n_neg = positive.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    // Average ranks over ties
    let mut ranks = vec![0.0; scores.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg_rank;
        }
        i = j + 1;
    }

    let rank_sum: f64 = positive
        .iter()
        .zip(&ranks)
        .filter(|&(&p, _)| p)
        .map(|(_, &r)| r)
        .sum();

    let u = rank_sum - (n_pos * (n_pos + 1)) as f64 / 2.0;
    Some(u / (n_pos * n_neg) as f64)
}

/// AUC reported in training summaries: binary AUC on column 1 for two
/// classes, macro one-vs-rest otherwise. 0.5 when undefined.
pub fn report_auc(y_true: &[usize], proba: &Array2<f64>) -> f64 {
    let n_classes = proba.ncols();
    if n_classes < 2 || proba.nrows() != y_true.len() {
        return 0.5;
    }

    let classes: Vec<usize> = if n_classes == 2 { vec![1] } else { (0..n_classes).collect() };
    let aucs: Vec<f64> = classes
        .iter()
        .filter_map(|&c| {
            let positive: Vec<bool> = y_true.iter().map(|&y| y == c).collect();
            let scores = proba.column(c).to_vec();
            roc_auc(&positive, &scores)
        })
        .collect();

    if aucs.is_empty() {
        0.5
    } else {
        aucs.iter().sum::<f64>() / aucs.len() as f64
    }
}

/// Rows are true classes, columns predicted classes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    pub fn from_predictions(y_true: &[usize], y_pred: &[usize], n_classes: usize) -> Self {
        let mut counts = vec![vec![0; n_classes]; n_classes];
        for (&t, &p) in y_true.iter().zip(y_pred) {
            if t < n_classes && p < n_classes {
                counts[t][p] += 1;
            }
        }
        Self { counts }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(&[0, 1, 1, 0], &[0, 1, 0, 0]), 0.75);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }

    #[test]
    fn test_auc_perfect_and_inverted() {
        let positive = [false, false, true, true];
        assert_eq!(roc_auc(&positive, &[0.1, 0.2, 0.8, 0.9]), Some(1.0));
        assert_eq!(roc_auc(&positive, &[0.9, 0.8, 0.2, 0.1]), Some(0.0));
        assert_eq!(roc_auc(&positive, &[0.5, 0.5, 0.5, 0.5]), Some(0.5));
    }

    #[test]
    fn test_auc_undefined_for_single_class() {
        assert_eq!(roc_auc(&[true, true], &[0.2, 0.4]), None);
        let proba = array![[0.3, 0.7], [0.6, 0.4]];
        assert_eq!(report_auc(&[1, 1], &proba), 0.5);
    }

    #[test]
    fn test_confusion_matrix() {
        let cm = ConfusionMatrix::from_predictions(&[0, 1, 2, 2], &[0, 2, 2, 2], 3);
        assert_eq!(cm.counts[2][2], 2);
        assert_eq!(cm.counts[1][2], 1);
        assert_eq!(cm.total(), 4);
    }
}
