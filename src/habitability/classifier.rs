//! Supervised classifiers behind a small fit / predict seam.
//!
//! The pipeline only needs `fit(features, labels) -> model` and
//! `predict(model, features) -> labels`. [`TreeClassifier`] supplies that with
//! a CART decision tree from `linfa-trees`; [`MajorityClassifier`] is the
//! constant baseline used to sanity-check accuracies.

use crate::error::{HabitabilityError, Result};
use linfa::prelude::*;
use linfa_trees::{DecisionTree, SplitQuality};
use ndarray::{Array1, Array2};
use std::collections::BTreeMap;
use std::time::Instant;

pub trait Classifier {
    type Model: Predictor;

    /// Human readable learner name
    fn name(&self) -> &'static str;

    /// Fit a model; the result is immutable.
    fn fit(&self, features: &Array2<f64>, labels: &Array1<usize>) -> Result<Self::Model>;
}

pub trait Predictor {
    fn predict(&self, features: &Array2<f64>) -> Result<Array1<usize>>;
}

/// Most frequent label, lowest class index on ties.
pub fn majority_class(labels: &Array1<usize>) -> Option<usize> {
    let mut counts = BTreeMap::new();
    for &label in labels {
        *counts.entry(label).or_insert(0usize) += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
        .map(|(label, _)| label)
}

fn check_training_set(features: &Array2<f64>, labels: &Array1<usize>) -> Result<()> {
    if features.nrows() != labels.len() {
        return Err(HabitabilityError::LengthMismatch {
            expected: features.nrows(),
            actual: labels.len(),
        });
    }
    if labels.is_empty() {
        return Err(HabitabilityError::DataQuality {
            column: String::new(),
            message: "cannot fit a classifier on an empty training set".to_owned(),
        });
    }
    Ok(())
}

fn check_width(expected: usize, features: &Array2<f64>) -> Result<()> {
    if features.ncols() != expected {
        return Err(HabitabilityError::Model(format!(
            "model was fitted on {expected} features, got {}",
            features.ncols()
        )));
    }
    Ok(())
}

/// Gini-split CART decision tree.
#[derive(Debug, Clone, Default)]
pub struct TreeClassifier {
    pub max_depth: Option<usize>,
    pub min_samples_split: Option<usize>,
}

impl TreeClassifier {
    pub fn new(max_depth: Option<usize>, min_samples_split: Option<usize>) -> Self {
        Self {
            max_depth,
            min_samples_split,
        }
    }
}

/// A fitted decision tree together with the width it was trained on.
#[derive(Debug, Clone)]
pub struct TrainedTree {
    tree: DecisionTree<f64, usize>,
    n_features: usize,
}

impl TrainedTree {
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn depth(&self) -> usize {
        self.tree.max_depth()
    }
}

impl Classifier for TreeClassifier {
    type Model = TrainedTree;

    fn name(&self) -> &'static str {
        "Decision Tree"
    }

    fn fit(&self, features: &Array2<f64>, labels: &Array1<usize>) -> Result<TrainedTree> {
        check_training_set(features, labels)?;
        let start = Instant::now();

        let mut params = DecisionTree::params()
            .split_quality(SplitQuality::Gini)
            .max_depth(self.max_depth);
        if let Some(min_split) = self.min_samples_split {
            params = params.min_weight_split(min_split as f32);
        }

        let dataset = Dataset::new(features.clone(), labels.clone());
        let tree = params
            .fit(&dataset)
            .map_err(|e| HabitabilityError::Model(format!("Decision Tree training failed: {e}")))?;

        tracing::debug!(
            "Fitted decision tree on {} rows x {} features (depth {}) in {:?}",
            features.nrows(),
            features.ncols(),
            tree.max_depth(),
            start.elapsed()
        );

        Ok(TrainedTree {
            tree,
            n_features: features.ncols(),
        })
    }
}

impl Predictor for TrainedTree {
    fn predict(&self, features: &Array2<f64>) -> Result<Array1<usize>> {
        check_width(self.n_features, features)?;
        Ok(self.tree.predict(features))
    }
}

/// Always predicts the most frequent training label.
#[derive(Debug, Clone, Copy, Default)]
pub struct MajorityClassifier;

#[derive(Debug, Clone, Copy)]
pub struct MajorityModel {
    class: usize,
}

impl MajorityModel {
    pub fn class(&self) -> usize {
        self.class
    }
}

impl Classifier for MajorityClassifier {
    type Model = MajorityModel;

    fn name(&self) -> &'static str {
        "Majority Class"
    }

    fn fit(&self, features: &Array2<f64>, labels: &Array1<usize>) -> Result<MajorityModel> {
        check_training_set(features, labels)?;
        let class = majority_class(labels).unwrap_or_default();
        Ok(MajorityModel { class })
    }
}

impl Predictor for MajorityModel {
    fn predict(&self, features: &Array2<f64>) -> Result<Array1<usize>> {
        Ok(Array1::from_elem(features.nrows(), self.class))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_tree_separates_threshold_data() -> anyhow::Result<()> {
        let x = array![[1.0], [2.0], [3.0], [10.0], [11.0], [12.0]];
        let y = array![0usize, 0, 0, 1, 1, 1];

        let model = TreeClassifier::default().fit(&x, &y)?;
        assert_eq!(model.n_features(), 1);
        assert_eq!(model.predict(&x)?, y);

        let unseen = array![[0.5], [20.0]];
        assert_eq!(model.predict(&unseen)?.to_vec(), vec![0, 1]);
        Ok(())
    }

    #[test]
    fn test_tree_handles_multiclass_labels() -> anyhow::Result<()> {
        let x = array![[0.0, 1.0], [0.1, 1.1], [5.0, 0.0], [5.1, 0.2], [9.0, 9.0], [9.2, 9.1]];
        let y = array![0usize, 0, 2, 2, 4, 4];
        let model = TreeClassifier::default().fit(&x, &y)?;
        assert_eq!(model.predict(&x)?, y);
        Ok(())
    }

    #[test]
    fn test_tree_rejects_wrong_width() -> anyhow::Result<()> {
        let x = array![[1.0], [2.0], [8.0], [9.0]];
        let y = array![0usize, 0, 1, 1];
        let model = TreeClassifier::default().fit(&x, &y)?;
        let wide = array![[1.0, 2.0]];
        assert!(matches!(model.predict(&wide), Err(HabitabilityError::Model(_))));
        Ok(())
    }

    #[test]
    fn test_depth_limit_is_respected() -> anyhow::Result<()> {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0], [7.0], [8.0]];
        let y = array![0usize, 1, 0, 1, 0, 1, 0, 1];
        let model = TreeClassifier::new(Some(1), None).fit(&x, &y)?;
        assert!(model.depth() <= 1);
        Ok(())
    }

    #[test]
    fn test_fit_rejects_empty_and_misaligned() {
        let empty_x = Array2::<f64>::zeros((0, 2));
        let empty_y = Array1::<usize>::zeros(0);
        assert!(TreeClassifier::default().fit(&empty_x, &empty_y).is_err());

        let x = Array2::<f64>::zeros((3, 1));
        let y = Array1::<usize>::zeros(2);
        assert!(matches!(
            TreeClassifier::default().fit(&x, &y),
            Err(HabitabilityError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_majority_classifier() -> anyhow::Result<()> {
        let x = Array2::<f64>::zeros((5, 1));
        let y = array![2usize, 1, 2, 0, 2];
        let model = MajorityClassifier.fit(&x, &y)?;
        assert_eq!(model.class(), 2);
        assert_eq!(model.predict(&Array2::zeros((3, 1)))?.to_vec(), vec![2, 2, 2]);

        // ties go to the lower class
        assert_eq!(majority_class(&array![1usize, 0, 1, 0]), Some(0));
        assert_eq!(majority_class(&Array1::<usize>::zeros(0)), None);
        Ok(())
    }
}
