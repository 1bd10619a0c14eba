//! Random forest classifier: bootstrap-aggregated CART trees voting by
//! averaged class probabilities.

use crate::decision_tree::{DecisionTree, TreeParams};
use crate::error::{Result, SentimentError};
use crate::sparse::SparseVector;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// How training samples are weighted per class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassWeight {
    /// Every sample weighs 1
    #[serde(alias = "uniform")]
    None,
    /// Weight `n_samples / (n_classes * class_count)` so rare labels count as much as common ones
    Balanced,
}

impl fmt::Display for ClassWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassWeight::None => write!(f, "None"),
            ClassWeight::Balanced => write!(f, "balanced"),
        }
    }
}

/// Hyperparameters of one forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub class_weight: ClassWeight,
    pub random_state: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        ForestParams {
            n_estimators: 100,
            max_depth: None,
            class_weight: ClassWeight::None,
            random_state: 42,
        }
    }
}

impl fmt::Display for ForestParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let depth = match self.max_depth {
            Some(d) => d.to_string(),
            None => "None".to_string(),
        };
        write!(
            f,
            "{{class_weight: {}, max_depth: {}, n_estimators: {}}}",
            self.class_weight, depth, self.n_estimators
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    params: ForestParams,
    /// Class labels in lexical order; tree outputs are indexed by position
    classes: Vec<String>,
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fit a forest on sparse `rows` of dimension `n_features` with string labels.
    ///
    /// Each tree is grown on its own bootstrap sample with
    /// `floor(sqrt(n_features))` candidate features per split. Tree seeds are
    /// drawn from `random_state` up front, so the result does not depend on
    /// how rayon schedules the trees.
    pub fn fit(
        params: ForestParams,
        rows: &[SparseVector],
        labels: &[String],
        n_features: usize,
    ) -> Result<Self> {
        if rows.is_empty() {
            return Err(SentimentError::insufficient("cannot fit a forest on zero samples"));
        }
        if rows.len() != labels.len() {
            return Err(SentimentError::insufficient(format!(
                "{} feature rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }
        if params.n_estimators == 0 {
            return Err(SentimentError::config("n_estimators must be positive"));
        }
        if let Some(dim) = rows.iter().map(SparseVector::min_dimension).max() {
            if dim > n_features {
                return Err(SentimentError::DimensionMismatch {
                    expected: n_features,
                    actual: dim,
                });
            }
        }

        let classes: Vec<String> = labels
            .iter()
            .cloned()
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect();
        let y: Vec<usize> = labels
            .iter()
            .map(|l| classes.binary_search(l).unwrap_or(0))
            .collect();
        let sample_weights = class_sample_weights(&y, classes.len(), params.class_weight);

        let tree_params = TreeParams {
            max_depth: params.max_depth,
            max_features: ((n_features as f64).sqrt() as usize).max(1),
            min_samples_split: 2,
        };

        let mut seeder = ChaCha8Rng::seed_from_u64(params.random_state);
        let seeds: Vec<u64> = (0..params.n_estimators).map(|_| seeder.gen()).collect();

        let n = rows.len();
        let n_classes = classes.len();
        let trees: Vec<DecisionTree> = seeds
            .par_iter()
            .map(|&seed| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let mut counts = vec![0usize; n];
                for _ in 0..n {
                    counts[rng.gen_range(0..n)] += 1;
                }
                let weights: Vec<f64> = counts
                    .iter()
                    .zip(&sample_weights)
                    .map(|(&c, &w)| c as f64 * w)
                    .collect();
                DecisionTree::fit(rows, &y, &weights, n_classes, &tree_params, &mut rng)
            })
            .collect();

        Ok(RandomForest {
            params,
            classes,
            n_features,
            trees,
        })
    }

    /// Averaged class probabilities, aligned with [`RandomForest::classes`].
    pub fn predict_proba(&self, row: &SparseVector) -> Vec<f64> {
        let mut proba = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (p, t) in proba.iter_mut().zip(tree.predict_proba(row)) {
                *p += t;
            }
        }
        let n_trees = self.trees.len().max(1) as f64;
        for p in &mut proba {
            *p /= n_trees;
        }
        proba
    }

    /// Most probable label; ties go to the lexically first label.
    pub fn predict(&self, row: &SparseVector) -> &str {
        let proba = self.predict_proba(row);
        let best = argmax(&proba);
        &self.classes[best]
    }

    pub fn predict_batch(&self, rows: &[SparseVector]) -> Vec<String> {
        rows.par_iter()
            .map(|row| self.predict(row).to_string())
            .collect()
    }

    /// Fraction of `rows` whose prediction matches `labels`.
    pub fn score(&self, rows: &[SparseVector], labels: &[String]) -> f64 {
        if labels.is_empty() {
            return 0.0;
        }
        let correct = self
            .predict_batch(rows)
            .iter()
            .zip(labels)
            .filter(|(p, l)| p == l)
            .count();
        correct as f64 / labels.len() as f64
    }

    /// Check a deserialized forest before it is used for prediction.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.classes.is_empty() {
            return Err("forest has no classes".to_string());
        }
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            if tree.n_classes() != self.classes.len() {
                return Err(format!(
                    "tree {} has {} classes, forest has {}",
                    i,
                    tree.n_classes(),
                    self.classes.len()
                ));
            }
            tree.validate(self.n_features)
                .map_err(|reason| format!("tree {}: {}", i, reason))?;
        }
        Ok(())
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_estimators(&self) -> usize {
        self.trees.len()
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }
}

pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

fn class_sample_weights(y: &[usize], n_classes: usize, class_weight: ClassWeight) -> Vec<f64> {
    match class_weight {
        ClassWeight::None => vec![1.0; y.len()],
        ClassWeight::Balanced => {
            let mut counts = vec![0usize; n_classes];
            for &c in y {
                counts[c] += 1;
            }
            let n = y.len() as f64;
            let per_class: Vec<f64> = counts
                .iter()
                .map(|&c| {
                    if c == 0 {
                        0.0
                    } else {
                        n / (n_classes as f64 * c as f64)
                    }
                })
                .collect();
            y.iter().map(|&c| per_class[c]).collect()
        }
    }
}
