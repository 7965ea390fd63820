//! Random Forest Classifier
//!
//! Bootstrap ensemble of CART trees split on gini impurity. Each split looks
//! at a random subset of √d features. Probabilities are the mean of the leaf
//! class distributions.

use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::classifier::{check_training_set, Classifier};
use crate::error::{Result, RockfallError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features tried per split; √d when None
    pub max_features: Option<usize>,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 12,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 42,
        }
    }
}

// ============================================================================
// TREE
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum TreeNode {
    Leaf {
        probs: Vec<f64>,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    fn probs_for(&self, row: ArrayView1<f64>) -> &[f64] {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { probs } => return probs,
                TreeNode::Split { feature, threshold, left, right } => {
                    node = if row[*feature] <= *threshold { &**left } else { &**right };
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

/// Builds one tree; importances accumulate weighted impurity decrease
struct TreeBuilder<'a> {
    x: &'a Array2<f64>,
    y: &'a [usize],
    n_classes: usize,
    max_features: usize,
    config: &'a ForestConfig,
    importances: Vec<f64>,
}

impl TreeBuilder<'_> {
    fn build<R: Rng>(&mut self, indices: &mut [usize], depth: usize, rng: &mut R) -> TreeNode {
        let counts = class_counts(self.y, indices, self.n_classes);
        let impurity = gini(&counts, indices.len());

        if depth >= self.config.max_depth || indices.len() < self.config.min_samples_split || impurity < 1e-12 {
            return leaf(&counts, indices.len());
        }

        let Some(split) = self.best_split(indices, impurity, rng) else {
            return leaf(&counts, indices.len());
        };

        self.importances[split.feature] += split.gain * indices.len() as f64;

        // Partition in place: left part is `<= threshold`
        let mut boundary = 0;
        for i in 0..indices.len() {
            if self.x[[indices[i], split.feature]] <= split.threshold {
                indices.swap(i, boundary);
                boundary += 1;
            }
        }
        let (left_idx, right_idx) = indices.split_at_mut(boundary);

        let left = self.build(left_idx, depth + 1, rng);
        let right = self.build(right_idx, depth + 1, rng);

        TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Sorted sweep per candidate feature with running class counts.
    /// Keeps drawing features past `max_features` until one yields a split.
    fn best_split<R: Rng>(&self, indices: &[usize], parent_impurity: f64, rng: &mut R) -> Option<SplitCandidate> {
        let n = indices.len();
        if n < 2 {
            return None;
        }

        let mut features: Vec<usize> = (0..self.x.ncols()).collect();
        features.shuffle(rng);

        let min_leaf = self.config.min_samples_leaf.max(1);
        let mut best: Option<SplitCandidate> = None;

        for (visited, feature) in features.into_iter().enumerate() {
            if visited >= self.max_features && best.is_some() {
                break;
            }

            let mut sorted: Vec<(f64, usize)> = indices.iter().map(|&i| (self.x[[i, feature]], self.y[i])).collect();
            sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left = vec![0usize; self.n_classes];
            let mut right = class_counts(self.y, indices, self.n_classes);

            for pos in 0..n - 1 {
                let (value, class) = sorted[pos];
                left[class] += 1;
                right[class] -= 1;

                let n_left = pos + 1;
                let n_right = n - n_left;
                let next = sorted[pos + 1].0;
                if value == next || n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let weighted = (n_left as f64 * gini(&left, n_left) + n_right as f64 * gini(&right, n_right)) / n as f64;
                let gain = parent_impurity - weighted;

                if gain > best.as_ref().map_or(1e-12, |b| b.gain) {
                    best = Some(SplitCandidate {
                        feature,
                        threshold: (value + next) / 2.0,
                        gain,
                    });
                }
            }
        }

        best
    }
}

fn class_counts(y: &[usize], indices: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0; n_classes];
    for &i in indices {
        counts[y[i]] += 1;
    }
    counts
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let n = total as f64;
    1.0 - counts.iter().map(|&c| (c as f64 / n).powi(2)).sum::<f64>()
}

fn leaf(counts: &[usize], total: usize) -> TreeNode {
    let n = total.max(1) as f64;
    TreeNode::Leaf {
        probs: counts.iter().map(|&c| c as f64 / n).collect(),
    }
}

// ============================================================================
// FOREST
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    n_classes: usize,
    trees: Vec<TreeNode>,
    feature_importances: Vec<f64>,
}

impl RandomForest {
    pub fn new(config: ForestConfig, n_classes: usize) -> Self {
        Self {
            config,
            n_classes,
            trees: Vec::new(),
            feature_importances: Vec::new(),
        }
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Normalized mean impurity decrease per feature
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }
}

impl Classifier for RandomForest {
    fn fit(&mut self, x: &Array2<f64>, y: &[usize]) -> Result<()> {
        check_training_set(x, y, self.n_classes)?;

        let n = x.nrows();
        let n_features = x.ncols();
        let max_features = self
            .config
            .max_features
            .unwrap_or_else(|| (n_features as f64).sqrt().ceil() as usize)
            .clamp(1, n_features);

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut importances = vec![0.0; n_features];
        let mut trees = Vec::with_capacity(self.config.n_trees);

        for _ in 0..self.config.n_trees {
            let mut indices: Vec<usize> = if self.config.bootstrap {
                (0..n).map(|_| rng.gen_range(0..n)).collect()
            } else {
                (0..n).collect()
            };

            let mut builder = TreeBuilder {
                x,
                y,
                n_classes: self.n_classes,
                max_features,
                config: &self.config,
                importances: vec![0.0; n_features],
            };
            let root = builder.build(&mut indices, 0, &mut rng);

            let tree_total: f64 = builder.importances.iter().sum();
            if tree_total > 0.0 {
                for (acc, imp) in importances.iter_mut().zip(&builder.importances) {
                    *acc += imp / tree_total;
                }
            }
            trees.push(root);
        }

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            importances.iter_mut().for_each(|v| *v /= total);
        }

        log::debug!(
            "Random forest fitted: {} trees, max depth {}",
            trees.len(),
            trees.iter().map(TreeNode::depth).max().unwrap_or(0)
        );

        self.trees = trees;
        self.feature_importances = importances;
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if self.trees.is_empty() {
            return Err(RockfallError::Model("random forest is not fitted".to_string()));
        }
        if x.ncols() != self.feature_importances.len() {
            return Err(RockfallError::Model(format!(
                "forest expects {} features, got {}",
                self.feature_importances.len(),
                x.ncols()
            )));
        }

        let mut out = Array2::zeros((x.nrows(), self.n_classes));
        let weight = 1.0 / self.trees.len() as f64;
        for (r, row) in x.rows().into_iter().enumerate() {
            for tree in &self.trees {
                for (c, p) in tree.probs_for(row).iter().enumerate() {
                    out[[r, c]] += p * weight;
                }
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
    fn test_gini() {
        assert_eq!(gini(&[5, 0], 5), 0.0);
        assert!((gini(&[5, 5], 10) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_single_tree_fits_threshold() {
        let x = array![[1.0, 0.0], [2.0, 0.0], [3.0, 0.0], [10.0, 0.0], [11.0, 0.0], [12.0, 0.0]];
        let y = [0, 0, 0, 1, 1, 1];
        let config = ForestConfig {
            n_trees: 1,
            bootstrap: false,
            max_features: Some(2),
            ..Default::default()
        };
        let mut forest = RandomForest::new(config, 2);
        forest.fit(&x, &y).unwrap();

        assert_eq!(forest.predict(&x).unwrap(), y.to_vec());
        let importances = forest.feature_importances();
        assert!((importances[0] - 1.0).abs() < 1e-12);
        assert_eq!(importances[1], 0.0);
    }

    #[test]
    fn test_fit_is_seeded() {
        let x = array![[1.0, 5.0], [2.0, 3.0], [3.0, 1.0], [4.0, 4.0], [5.0, 2.0], [6.0, 0.0]];
        let y = [0, 1, 0, 1, 2, 2];
        let mut a = RandomForest::new(ForestConfig { n_trees: 10, ..Default::default() }, 3);
        let mut b = RandomForest::new(ForestConfig { n_trees: 10, ..Default::default() }, 3);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.predict_proba(&x).unwrap(), b.predict_proba(&x).unwrap());
    }

    #[test]
    fn test_unfitted_forest_errors() {
        let forest = RandomForest::new(ForestConfig::default(), 2);
        assert!(forest.predict_proba(&array![[1.0]]).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_labels() {
        let mut forest = RandomForest::new(ForestConfig::default(), 2);
        assert!(forest.fit(&array![[1.0], [2.0]], &[0, 2]).is_err());
    }
}
