//! Decision tree regression and the bagged forest ensemble.
//!
//! Implements CART regression trees (MSE splitting criterion, mean-value
//! leaves) and a Random Forest regressor trained on bootstrap samples.
//! The forest exposes per-member predictions so callers can derive an
//! uncertainty band from ensemble disagreement.

use crate::error::{ArrendarError, Result};
use crate::primitives::{Matrix, Vector};
use crate::traits::Estimator;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A node in a regression tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Internal decision node: samples with `feature <= threshold` go left.
    Split {
        /// Index of the feature to split on
        feature_idx: usize,
        /// Threshold value for the split
        threshold: f32,
        /// Left subtree (feature <= threshold)
        left: Box<TreeNode>,
        /// Right subtree (feature > threshold)
        right: Box<TreeNode>,
    },
    /// Leaf node predicting the mean of its training targets.
    Leaf {
        /// Predicted value (mean of y values in this leaf)
        value: f32,
        /// Number of training samples in this leaf
        n_samples: usize,
    },
}

impl TreeNode {
    /// Returns the depth of the tree rooted at this node.
    ///
    /// Leaves have depth 0, split nodes have depth 1 + max(left, right).
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Decision tree regressor using the CART algorithm.
///
/// Uses Mean Squared Error for the splitting criterion; leaves predict
/// the mean of the target values that reached them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeRegressor {
    root: Option<TreeNode>,
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
}

impl DecisionTreeRegressor {
    /// Creates a new decision tree regressor with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }

    /// Sets the maximum depth of the tree.
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Sets the minimum number of samples required to split a node.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples.max(2);
        self
    }

    /// Sets the minimum number of samples required at a leaf.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    /// Returns true once the tree has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.root.is_some()
    }

    /// Predicts the value for a single sample.
    ///
    /// # Panics
    ///
    /// Panics if called before `fit()`.
    #[must_use]
    pub fn predict_row(&self, sample: &[f32]) -> f32 {
        let mut node = self.root.as_ref().expect("Model not fitted");
        loop {
            match node {
                TreeNode::Leaf { value, .. } => return *value,
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                } => {
                    node = if sample[*feature_idx] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

impl Estimator for DecisionTreeRegressor {
    fn fit(&mut self, x: &Matrix<f32>, y: &Vector<f32>) -> Result<()> {
        let (n_samples, _) = x.shape();
        if n_samples != y.len() {
            return Err(ArrendarError::DimensionMismatch {
                expected: format!("{n_samples} targets"),
                actual: y.len().to_string(),
            });
        }
        if n_samples == 0 {
            return Err(ArrendarError::empty_input("training data"));
        }

        let indices: Vec<usize> = (0..n_samples).collect();
        let params = GrowParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
        };
        self.root = Some(grow_tree(x, y.as_slice(), &indices, 0, &params));
        Ok(())
    }

    fn predict(&self, x: &Matrix<f32>) -> Vector<f32> {
        let predictions: Vec<f32> = (0..x.n_rows()).map(|i| self.predict_row(x.row(i))).collect();
        Vector::from_vec(predictions)
    }

    fn score(&self, x: &Matrix<f32>, y: &Vector<f32>) -> f32 {
        crate::metrics::r_squared(&self.predict(x), y)
    }
}

impl Default for DecisionTreeRegressor {
    fn default() -> Self {
        Self::new()
    }
}

/// Random Forest regressor.
///
/// Ensemble of decision tree regressors trained on bootstrap samples.
/// Predictions are averaged across all trees; the per-tree spread is the
/// basis for the confidence interval in the rent estimator.
///
/// # Examples
///
/// ```
/// use arrendar::prelude::*;
///
/// let x = Matrix::from_vec(5, 1, vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
/// let y = Vector::from_slice(&[2.0, 4.0, 6.0, 8.0, 10.0]);
///
/// let mut rf = RandomForestRegressor::new(10).with_random_state(42);
/// rf.fit(&x, &y).unwrap();
/// let members = rf.tree_predictions(&[3.0]);
/// assert_eq!(members.len(), 10);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    trees: Vec<DecisionTreeRegressor>,
    n_estimators: usize,
    max_depth: Option<usize>,
    random_state: Option<u64>,
}

impl RandomForestRegressor {
    /// Creates a new Random Forest regressor with `n_estimators` trees.
    #[must_use]
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            random_state: None,
        }
    }

    /// Sets the maximum depth for each tree.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Sets the random state for reproducible bootstrap sampling.
    #[must_use]
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = Some(random_state);
        self
    }

    /// Returns the number of fitted member trees (0 before fit).
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Returns true once the forest has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Predicts the value for a single sample (mean over all trees).
    ///
    /// # Panics
    ///
    /// Panics if called before `fit()`.
    #[must_use]
    pub fn predict_row(&self, sample: &[f32]) -> f32 {
        assert!(
            self.is_fitted(),
            "Cannot predict with an unfitted Random Forest. Call fit() first."
        );
        let sum: f32 = self.trees.iter().map(|t| t.predict_row(sample)).sum();
        sum / self.trees.len() as f32
    }

    /// Returns each member tree's prediction for a single sample.
    ///
    /// The spread of these values approximates prediction uncertainty.
    ///
    /// # Panics
    ///
    /// Panics if called before `fit()`.
    #[must_use]
    pub fn tree_predictions(&self, sample: &[f32]) -> Vec<f32> {
        assert!(
            self.is_fitted(),
            "Cannot predict with an unfitted Random Forest. Call fit() first."
        );
        self.trees.iter().map(|t| t.predict_row(sample)).collect()
    }

    /// Saves the fitted forest as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the forest is unfitted or the file cannot be
    /// written.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if !self.is_fitted() {
            return Err("Cannot save an unfitted Random Forest".into());
        }
        let json = serde_json::to_string(self)
            .map_err(|e| ArrendarError::Serialization(e.to_string()))?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Loads a fitted forest from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| ArrendarError::Serialization(e.to_string()))
    }
}

impl Estimator for RandomForestRegressor {
    fn fit(&mut self, x: &Matrix<f32>, y: &Vector<f32>) -> Result<()> {
        let (n_samples, _) = x.shape();
        if n_samples != y.len() {
            return Err(ArrendarError::DimensionMismatch {
                expected: format!("{n_samples} targets"),
                actual: y.len().to_string(),
            });
        }
        if n_samples == 0 {
            return Err(ArrendarError::empty_input("training data"));
        }

        self.trees = Vec::with_capacity(self.n_estimators);

        for i in 0..self.n_estimators {
            // Each tree gets its own seed so forests are reproducible
            // while trees stay decorrelated.
            let seed = self.random_state.map(|s| s + i as u64);
            let indices = bootstrap_sample(n_samples, seed);

            let bootstrap_x = x.select_rows(&indices);
            let bootstrap_y =
                Vector::from_vec(indices.iter().map(|&idx| y[idx]).collect::<Vec<f32>>());

            let mut tree = match self.max_depth {
                Some(depth) => DecisionTreeRegressor::new().with_max_depth(depth),
                None => DecisionTreeRegressor::new(),
            };
            tree.fit(&bootstrap_x, &bootstrap_y)?;
            self.trees.push(tree);
        }

        Ok(())
    }

    fn predict(&self, x: &Matrix<f32>) -> Vector<f32> {
        assert!(
            self.is_fitted(),
            "Cannot predict with an unfitted Random Forest. Call fit() first."
        );
        let predictions: Vec<f32> = (0..x.n_rows()).map(|i| self.predict_row(x.row(i))).collect();
        Vector::from_vec(predictions)
    }

    fn score(&self, x: &Matrix<f32>, y: &Vector<f32>) -> f32 {
        crate::metrics::r_squared(&self.predict(x), y)
    }
}

impl Default for RandomForestRegressor {
    fn default() -> Self {
        Self::new(100)
    }
}

struct GrowParams {
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
}

/// Mean of targets at the given indices.
fn subset_mean(y: &[f32], indices: &[usize]) -> f32 {
    if indices.is_empty() {
        0.0
    } else {
        indices.iter().map(|&i| y[i]).sum::<f32>() / indices.len() as f32
    }
}

/// Population variance of targets at the given indices.
fn subset_variance(y: &[f32], indices: &[usize]) -> f32 {
    if indices.len() <= 1 {
        return 0.0;
    }
    let mean = subset_mean(y, indices);
    indices.iter().map(|&i| (y[i] - mean).powi(2)).sum::<f32>() / indices.len() as f32
}

fn make_leaf(y: &[f32], indices: &[usize]) -> TreeNode {
    TreeNode::Leaf {
        value: subset_mean(y, indices),
        n_samples: indices.len(),
    }
}

/// Finds the (feature, threshold) pair with the largest variance
/// reduction over the candidate rows, or None if no split improves.
///
/// Candidate thresholds are midpoints between consecutive distinct
/// feature values.
fn best_split(x: &Matrix<f32>, y: &[f32], indices: &[usize]) -> Option<(usize, f32)> {
    if indices.len() < 2 {
        return None;
    }

    let parent_variance = subset_variance(y, indices);
    let n_total = indices.len() as f32;

    let mut best: Option<(usize, f32)> = None;
    let mut best_gain = 0.0_f32;

    for feature_idx in 0..x.n_cols() {
        let mut values: Vec<f32> = indices.iter().map(|&i| x.get(i, feature_idx)).collect();
        values.sort_by(|a, b| a.partial_cmp(b).expect("feature values are finite"));
        values.dedup();

        for pair in values.windows(2) {
            let threshold = (pair[0] + pair[1]) / 2.0;

            let (left, right): (Vec<usize>, Vec<usize>) = indices
                .iter()
                .copied()
                .partition(|&i| x.get(i, feature_idx) <= threshold);
            if left.is_empty() || right.is_empty() {
                continue;
            }

            let weighted_child_variance = (left.len() as f32 / n_total)
                * subset_variance(y, &left)
                + (right.len() as f32 / n_total) * subset_variance(y, &right);
            let gain = parent_variance - weighted_child_variance;

            if gain > best_gain {
                best_gain = gain;
                best = Some((feature_idx, threshold));
            }
        }
    }

    best
}

/// Builds a regression tree recursively over a set of row indices.
fn grow_tree(
    x: &Matrix<f32>,
    y: &[f32],
    indices: &[usize],
    depth: usize,
    params: &GrowParams,
) -> TreeNode {
    let at_max_depth = params.max_depth.is_some_and(|max| depth >= max);
    if indices.len() < params.min_samples_split
        || at_max_depth
        || subset_variance(y, indices) < 1e-10
    {
        return make_leaf(y, indices);
    }

    let Some((feature_idx, threshold)) = best_split(x, y, indices) else {
        return make_leaf(y, indices);
    };

    let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&i| x.get(i, feature_idx) <= threshold);

    if left_indices.len() < params.min_samples_leaf
        || right_indices.len() < params.min_samples_leaf
    {
        return make_leaf(y, indices);
    }

    TreeNode::Split {
        feature_idx,
        threshold,
        left: Box::new(grow_tree(x, y, &left_indices, depth + 1, params)),
        right: Box::new(grow_tree(x, y, &right_indices, depth + 1, params)),
    }
}

/// Creates a bootstrap sample (random sample with replacement).
///
/// Returns indices of samples to include in the bootstrap sample.
fn bootstrap_sample(n_samples: usize, random_state: Option<u64>) -> Vec<usize> {
    use rand::distributions::{Distribution, Uniform};
    use rand::SeedableRng;

    let dist = Uniform::from(0..n_samples);
    let mut indices = Vec::with_capacity(n_samples);

    if let Some(seed) = random_state {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        for _ in 0..n_samples {
            indices.push(dist.sample(&mut rng));
        }
    } else {
        let mut rng = rand::thread_rng();
        for _ in 0..n_samples {
            indices.push(dist.sample(&mut rng));
        }
    }

    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    // Small regression dataset: y ≈ 2*x1 + 3*x2
    fn regression_data() -> (Matrix<f32>, Vector<f32>) {
        let x = Matrix::from_vec(
            8,
            2,
            vec![
                1.0, 0.0, // 2
                0.0, 1.0, // 3
                1.0, 1.0, // 5
                2.0, 0.0, // 4
                0.0, 2.0, // 6
                2.0, 1.0, // 7
                1.0, 2.0, // 8
                3.0, 1.0, // 9
            ],
        )
        .expect("regression data matrix");
        let y = Vector::from_slice(&[2.0, 3.0, 5.0, 4.0, 6.0, 7.0, 8.0, 9.0]);
        (x, y)
    }

    #[test]
    fn test_tree_fit_and_predict_exact_on_training_data() {
        let (x, y) = regression_data();
        let mut tree = DecisionTreeRegressor::new();
        tree.fit(&x, &y).expect("fit should succeed");
        assert!(tree.is_fitted());

        // With no depth limit and distinct targets, the tree memorizes
        // the training set.
        let preds = tree.predict(&x);
        for (pred, target) in preds.iter().zip(y.iter()) {
            assert!((pred - target).abs() < 1e-5, "pred {pred} vs target {target}");
        }
    }

    #[test]
    fn test_tree_max_depth_limits_depth() {
        let (x, y) = regression_data();
        let mut tree = DecisionTreeRegressor::new().with_max_depth(2);
        tree.fit(&x, &y).expect("fit should succeed");
        assert!(tree.root.as_ref().expect("fitted").depth() <= 2);
    }

    #[test]
    fn test_tree_constant_targets_yield_single_leaf() {
        let x = Matrix::from_vec(4, 1, vec![1.0, 2.0, 3.0, 4.0]).expect("matrix");
        let y = Vector::from_slice(&[5.0, 5.0, 5.0, 5.0]);
        let mut tree = DecisionTreeRegressor::new();
        tree.fit(&x, &y).expect("fit should succeed");
        assert_eq!(tree.root.as_ref().expect("fitted").depth(), 0);
        assert!((tree.predict_row(&[2.5]) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_tree_min_samples_leaf() {
        let (x, y) = regression_data();
        let mut tree = DecisionTreeRegressor::new().with_min_samples_leaf(4);
        tree.fit(&x, &y).expect("fit should succeed");
        // Splitting 8 samples with a 4-sample leaf floor allows at most
        // one level of splits.
        assert!(tree.root.as_ref().expect("fitted").depth() <= 1);
    }

    #[test]
    fn test_tree_fit_dimension_mismatch() {
        let x = Matrix::from_vec(3, 1, vec![1.0, 2.0, 3.0]).expect("matrix");
        let y = Vector::from_slice(&[1.0, 2.0]);
        let mut tree = DecisionTreeRegressor::new();
        assert!(tree.fit(&x, &y).is_err());
    }

    #[test]
    fn test_tree_fit_empty_data() {
        let x = Matrix::from_vec(0, 1, vec![]).expect("matrix");
        let y = Vector::from_vec(vec![]);
        let mut tree = DecisionTreeRegressor::new();
        assert!(tree.fit(&x, &y).is_err());
    }

    #[test]
    #[should_panic(expected = "Model not fitted")]
    fn test_tree_predict_unfitted_panics() {
        let tree = DecisionTreeRegressor::new();
        tree.predict_row(&[1.0]);
    }

    #[test]
    fn test_forest_new_sets_n_estimators() {
        let rf = RandomForestRegressor::new(5);
        assert_eq!(rf.n_estimators, 5);
        assert!(rf.trees.is_empty());
        assert!(!rf.is_fitted());
    }

    #[test]
    fn test_forest_builder_chaining() {
        let rf = RandomForestRegressor::new(10)
            .with_max_depth(3)
            .with_random_state(99);
        assert_eq!(rf.max_depth, Some(3));
        assert_eq!(rf.random_state, Some(99));
    }

    #[test]
    fn test_forest_fit_creates_correct_number_of_trees() {
        let (x, y) = regression_data();
        let mut rf = RandomForestRegressor::new(5).with_random_state(42);
        rf.fit(&x, &y).expect("fit should succeed");
        assert_eq!(rf.n_trees(), 5);
        assert!(rf.is_fitted());
    }

    #[test]
    fn test_forest_predict_returns_correct_length() {
        let (x, y) = regression_data();
        let mut rf = RandomForestRegressor::new(3)
            .with_max_depth(4)
            .with_random_state(42);
        rf.fit(&x, &y).expect("fit should succeed");
        assert_eq!(rf.predict(&x).len(), 8);
    }

    #[test]
    fn test_forest_reproducibility_with_random_state() {
        let (x, y) = regression_data();
        let mut rf1 = RandomForestRegressor::new(5).with_random_state(42);
        rf1.fit(&x, &y).expect("fit should succeed");
        let mut rf2 = RandomForestRegressor::new(5).with_random_state(42);
        rf2.fit(&x, &y).expect("fit should succeed");

        assert_eq!(
            rf1.predict(&x).as_slice(),
            rf2.predict(&x).as_slice(),
            "Same random_state should yield same predictions"
        );
    }

    #[test]
    fn test_forest_prediction_is_deterministic_after_fit() {
        let (x, y) = regression_data();
        let mut rf = RandomForestRegressor::new(10).with_random_state(7);
        rf.fit(&x, &y).expect("fit should succeed");

        let first = rf.predict_row(&[1.5, 1.0]);
        let second = rf.predict_row(&[1.5, 1.0]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_forest_tree_predictions_length_and_mean() {
        let (x, y) = regression_data();
        let mut rf = RandomForestRegressor::new(10).with_random_state(42);
        rf.fit(&x, &y).expect("fit should succeed");

        let members = rf.tree_predictions(&[1.0, 1.0]);
        assert_eq!(members.len(), 10);

        let mean = members.iter().sum::<f32>() / members.len() as f32;
        assert!((mean - rf.predict_row(&[1.0, 1.0])).abs() < 1e-5);
    }

    #[test]
    fn test_forest_single_tree() {
        let (x, y) = regression_data();
        let mut rf = RandomForestRegressor::new(1).with_random_state(42);
        rf.fit(&x, &y).expect("fit should succeed");
        assert_eq!(rf.tree_predictions(&[1.0, 1.0]).len(), 1);
    }

    #[test]
    fn test_forest_score_reasonable_on_training_data() {
        let (x, y) = regression_data();
        let mut rf = RandomForestRegressor::new(20).with_random_state(42);
        rf.fit(&x, &y).expect("fit should succeed");
        let r2 = rf.score(&x, &y);
        assert!(r2 > 0.5, "Expected decent training fit, got R² = {r2}");
    }

    #[test]
    #[should_panic(expected = "unfitted Random Forest")]
    fn test_forest_predict_unfitted_panics() {
        let rf = RandomForestRegressor::new(3);
        rf.predict_row(&[1.0]);
    }

    #[test]
    fn test_forest_save_unfitted_returns_error() {
        let rf = RandomForestRegressor::new(3);
        let result = rf.save_json("/tmp/arrendar_test_unfitted_rf.json");
        assert!(result.is_err());
        assert!(result
            .expect_err("should be error")
            .to_string()
            .contains("unfitted"));
    }

    #[test]
    fn test_forest_save_and_load_roundtrip() {
        let (x, y) = regression_data();
        let mut rf = RandomForestRegressor::new(3)
            .with_max_depth(4)
            .with_random_state(42);
        rf.fit(&x, &y).expect("fit should succeed");

        let file = tempfile::NamedTempFile::new().expect("temp file");
        rf.save_json(file.path()).expect("save should succeed");

        let loaded = RandomForestRegressor::load_json(file.path()).expect("load should succeed");
        assert_eq!(loaded.n_trees(), 3);
        assert_eq!(loaded.max_depth, Some(4));
        assert_eq!(
            rf.predict(&x).as_slice(),
            loaded.predict(&x).as_slice(),
            "Loaded model predictions should match original"
        );
    }

    #[test]
    fn test_forest_load_nonexistent_file_returns_error() {
        let result = RandomForestRegressor::load_json("/tmp/arrendar_no_such_model.json");
        assert!(result.is_err());
    }

    #[test]
    fn test_bootstrap_sample_size_and_range() {
        let indices = bootstrap_sample(10, Some(42));
        assert_eq!(indices.len(), 10);
        assert!(indices.iter().all(|&i| i < 10));
    }

    #[test]
    fn test_bootstrap_sample_seeded_is_reproducible() {
        assert_eq!(bootstrap_sample(20, Some(7)), bootstrap_sample(20, Some(7)));
    }
}
