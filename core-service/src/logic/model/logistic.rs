//! Multinomial Logistic Regression
//!
//! Softmax over linear scores, full-batch gradient descent with L2 penalty.
//! Expects standardized inputs.

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use super::classifier::{check_training_set, Classifier};
use crate::error::{Result, RockfallError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    n_classes: usize,
    learning_rate: f64,
    max_iter: usize,
    tolerance: f64,
    l2: f64,
    /// `n_features × n_classes`
    weights: Option<Array2<f64>>,
    bias: Option<Array1<f64>>,
    /// Iterations actually run by the last fit
    n_iter: usize,
}

impl LogisticRegression {
    pub fn new(n_classes: usize) -> Self {
        Self {
            n_classes,
            learning_rate: 0.1,
            max_iter: 1000,
            tolerance: 1e-6,
            l2: 1e-3,
            weights: None,
            bias: None,
            n_iter: 0,
        }
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    fn logits(x: &Array2<f64>, weights: &Array2<f64>, bias: &Array1<f64>) -> Array2<f64> {
        x.dot(weights) + bias
    }
}

/// Row-wise numerically stable softmax
fn softmax(mut z: Array2<f64>) -> Array2<f64> {
    for mut row in z.axis_iter_mut(Axis(0)) {
        let max = row.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        row.mapv_inplace(|v| v / sum);
    }
    z
}

fn cross_entropy(proba: &Array2<f64>, y: &[usize]) -> f64 {
    let eps = 1e-15;
    let n = y.len() as f64;
    -y.iter()
        .enumerate()
        .map(|(i, &c)| proba[[i, c]].clamp(eps, 1.0).ln())
        .sum::<f64>()
        / n
}

impl Classifier for LogisticRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &[usize]) -> Result<()> {
        check_training_set(x, y, self.n_classes)?;

        let n = x.nrows() as f64;
        let mut weights = Array2::<f64>::zeros((x.ncols(), self.n_classes));
        let mut bias = Array1::<f64>::zeros(self.n_classes);

        let mut one_hot = Array2::<f64>::zeros((x.nrows(), self.n_classes));
        for (i, &c) in y.iter().enumerate() {
            one_hot[[i, c]] = 1.0;
        }

        let mut prev_loss = f64::INFINITY;
        let mut iterations = 0;

        for iter in 0..self.max_iter {
            iterations = iter + 1;
            let proba = softmax(Self::logits(x, &weights, &bias));
            let error = &proba - &one_hot;

            let grad_w = x.t().dot(&error) / n + &weights * self.l2;
            let grad_b = error.sum_axis(Axis(0)) / n;

            weights = weights - grad_w * self.learning_rate;
            bias = bias - grad_b * self.learning_rate;

            let loss = cross_entropy(&proba, y);
            if (prev_loss - loss).abs() < self.tolerance {
                break;
            }
            prev_loss = loss;
        }

        log::debug!("Logistic regression converged after {} iterations (loss {:.4})", iterations, prev_loss);

        self.weights = Some(weights);
        self.bias = Some(bias);
        self.n_iter = iterations;
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let (Some(weights), Some(bias)) = (&self.weights, &self.bias) else {
            return Err(RockfallError::Model("logistic regression is not fitted".to_string()));
        };
        if x.ncols() != weights.nrows() {
            return Err(RockfallError::Model(format!(
                "logistic regression expects {} features, got {}",
                weights.nrows(),
                x.ncols()
            )));
        }
        Ok(softmax(Self::logits(x, weights, bias)))
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
    fn test_softmax_rows_sum_to_one() {
        let p = softmax(array![[1.0, 2.0, 3.0], [1000.0, 1000.0, 1000.0]]);
        for row in p.axis_iter(Axis(0)) {
            assert!((row.sum() - 1.0).abs() < 1e-12);
        }
        assert!((p[[1, 0]] - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_learns_three_bands() {
        let x = array![[-3.0], [-2.8], [-2.6], [0.0], [0.1], [-0.1], [2.6], [2.8], [3.0]];
        let y = [0, 0, 0, 1, 1, 1, 2, 2, 2];
        let mut model = LogisticRegression::new(3).with_max_iter(5000).with_learning_rate(0.5);
        model.fit(&x, &y).unwrap();

        assert_eq!(model.predict(&x).unwrap(), y.to_vec());
        assert!(model.n_iter() > 0);
    }

    #[test]
    fn test_unfitted_model_errors() {
        assert!(LogisticRegression::new(2).predict_proba(&array![[0.0]]).is_err());
    }
}
