//! Exhaustive hyperparameter search with stratified k-fold cross-validation.

use crate::error::{Result, SentimentError};
use crate::random_forest::{ForestParams, RandomForest};
use crate::sparse::SparseVector;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;

/// One train/validation partition of the training set (row indices).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Assign rows to `n_splits` folds so each fold keeps the label proportions.
///
/// Rows are not shuffled: within a label, rows go to folds in their original
/// order, and fold sizes per label are dealt round-robin over the labels
/// sorted by first appearance. Labels with fewer members than `n_splits`
/// are allowed (with a warning) as long as at least one label has enough.
pub fn stratified_kfold(labels: &[String], n_splits: usize) -> Result<Vec<Fold>> {
    if n_splits < 2 {
        return Err(SentimentError::config(format!(
            "n_splits={} should be at least 2",
            n_splits
        )));
    }
    if labels.len() < n_splits {
        return Err(SentimentError::insufficient(format!(
            "cannot have n_splits={} greater than the number of samples {}",
            n_splits,
            labels.len()
        )));
    }

    // Encode labels by order of first appearance.
    let mut codes: HashMap<&str, usize> = HashMap::new();
    let encoded: Vec<usize> = labels
        .iter()
        .map(|l| {
            let next = codes.len();
            *codes.entry(l.as_str()).or_insert(next)
        })
        .collect();
    let n_classes = codes.len();

    let mut class_counts = vec![0usize; n_classes];
    for &c in &encoded {
        class_counts[c] += 1;
    }
    if class_counts.iter().all(|&c| c < n_splits) {
        return Err(SentimentError::insufficient(format!(
            "n_splits={} cannot be greater than the number of members in each class",
            n_splits
        )));
    }
    let min_count = class_counts.iter().copied().min().unwrap_or(0);
    if min_count < n_splits {
        tracing::warn!(
            "The least populated class has only {} members, which is less than n_splits={}",
            min_count,
            n_splits
        );
    }

    // Deal the sorted class codes round-robin: fold i receives y_sorted[i::n_splits].
    let mut sorted = encoded.clone();
    sorted.sort_unstable();
    let mut allocation = vec![vec![0usize; n_classes]; n_splits];
    for (pos, &c) in sorted.iter().enumerate() {
        allocation[pos % n_splits][c] += 1;
    }

    let mut fold_of_row = vec![0usize; labels.len()];
    for class in 0..n_classes {
        let folds_for_class: Vec<usize> = (0..n_splits)
            .flat_map(|fold| std::iter::repeat(fold).take(allocation[fold][class]))
            .collect();
        let rows = encoded
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c == class)
            .map(|(i, _)| i);
        for (row, fold) in rows.zip(folds_for_class) {
            fold_of_row[row] = fold;
        }
    }

    Ok((0..n_splits)
        .map(|fold| {
            let (test, train): (Vec<usize>, Vec<usize>) =
                (0..labels.len()).partition(|&i| fold_of_row[i] == fold);
            Fold { train, test }
        })
        .collect())
}

/// Cross-validation results for one grid candidate.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateScore {
    pub params: ForestParams,
    pub fold_scores: Vec<f64>,
    pub mean_score: f64,
    pub std_score: f64,
    /// 1 is best; equal means share a rank
    pub rank: usize,
}

/// Outcome of a completed search, including the refitted best estimator.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub best_index: usize,
    pub best_params: ForestParams,
    pub best_score: f64,
    pub candidates: Vec<CandidateScore>,
    pub best_estimator: RandomForest,
}

/// Grid search over forest parameters, scored by accuracy.
pub struct GridSearch {
    candidates: Vec<ForestParams>,
    cv_folds: usize,
}

impl GridSearch {
    pub fn new(candidates: Vec<ForestParams>, cv_folds: usize) -> Self {
        GridSearch {
            candidates,
            cv_folds,
        }
    }

    pub fn candidates(&self) -> &[ForestParams] {
        &self.candidates
    }

    /// Cross-validate every candidate, pick the best mean accuracy (earliest
    /// candidate on ties), and refit it on all of `rows`.
    pub fn fit(
        &self,
        rows: &[SparseVector],
        labels: &[String],
        n_features: usize,
    ) -> Result<SearchResult> {
        if self.candidates.is_empty() {
            return Err(SentimentError::config("hyperparameter grid is empty"));
        }
        let folds = stratified_kfold(labels, self.cv_folds)?;

        println!(
            "Fitting {} folds for each of {} candidates, totalling {} fits",
            folds.len(),
            self.candidates.len(),
            folds.len() * self.candidates.len()
        );

        let jobs: Vec<(usize, &Fold)> = (0..self.candidates.len())
            .flat_map(|c| folds.iter().map(move |f| (c, f)))
            .collect();

        let scores: Vec<f64> = jobs
            .par_iter()
            .map(|&(c, fold)| -> Result<f64> {
                let (train_rows, train_labels) = subset(rows, labels, &fold.train);
                let (test_rows, test_labels) = subset(rows, labels, &fold.test);
                let forest =
                    RandomForest::fit(self.candidates[c], &train_rows, &train_labels, n_features)?;
                Ok(forest.score(&test_rows, &test_labels))
            })
            .collect::<Result<Vec<f64>>>()?;

        let mut candidates: Vec<CandidateScore> = self
            .candidates
            .iter()
            .zip(scores.chunks(folds.len()))
            .map(|(&params, fold_scores)| {
                let (mean_score, std_score) = mean_std(fold_scores);
                CandidateScore {
                    params,
                    fold_scores: fold_scores.to_vec(),
                    mean_score,
                    std_score,
                    rank: 0,
                }
            })
            .collect();
        assign_ranks(&mut candidates);

        let best_index = candidates
            .iter()
            .position(|c| c.rank == 1)
            .unwrap_or(0);
        let best_params = candidates[best_index].params;
        let best_score = candidates[best_index].mean_score;

        for (i, c) in candidates.iter().enumerate() {
            tracing::debug!(
                "candidate {} {}: mean={:.4} std={:.4} rank={}",
                i,
                c.params,
                c.mean_score,
                c.std_score,
                c.rank
            );
        }
        tracing::info!("Best CV accuracy {:.4} with {}", best_score, best_params);

        let best_estimator = RandomForest::fit(best_params, rows, labels, n_features)?;

        Ok(SearchResult {
            best_index,
            best_params,
            best_score,
            candidates,
            best_estimator,
        })
    }
}

fn subset(
    rows: &[SparseVector],
    labels: &[String],
    idx: &[usize],
) -> (Vec<SparseVector>, Vec<String>) {
    idx.iter()
        .map(|&i| (rows[i].clone(), labels[i].clone()))
        .unzip()
}

fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

/// Competition ranking on mean score: equal scores share the lowest rank.
fn assign_ranks(candidates: &mut [CandidateScore]) {
    let means: Vec<f64> = candidates.iter().map(|c| c.mean_score).collect();
    for c in candidates.iter_mut() {
        c.rank = 1 + means.iter().filter(|&&m| m > c.mean_score).count();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random_forest::ClassWeight;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_kfold_partitions_all_rows() {
        let y = labels(&["a", "b", "a", "b", "a", "b", "a", "b", "a"]);
        let folds = stratified_kfold(&y, 3).unwrap();
        assert_eq!(folds.len(), 3);

        let mut seen: Vec<usize> = folds.iter().flat_map(|f| f.test.clone()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..9).collect::<Vec<_>>());

        for fold in &folds {
            assert_eq!(fold.train.len() + fold.test.len(), 9);
            assert!(fold.test.iter().all(|i| !fold.train.contains(i)));
        }
    }

    #[test]
    fn test_kfold_is_stratified() {
        let mut y = Vec::new();
        for _ in 0..6 {
            y.push("pos".to_string());
        }
        for _ in 0..3 {
            y.push("neg".to_string());
        }
        let folds = stratified_kfold(&y, 3).unwrap();
        for fold in &folds {
            let pos = fold.test.iter().filter(|&&i| y[i] == "pos").count();
            let neg = fold.test.iter().filter(|&&i| y[i] == "neg").count();
            assert_eq!((pos, neg), (2, 1));
        }
        // Not shuffled: the first fold takes the first rows of each label.
        assert_eq!(folds[0].test, vec![0, 1, 6]);
    }

    #[test]
    fn test_kfold_rejects_tiny_classes() {
        let y = labels(&["a", "a", "b", "b"]);
        assert!(stratified_kfold(&y, 3).is_err());
        assert!(stratified_kfold(&y, 1).is_err());
    }

    #[test]
    fn test_ranks_share_ties() {
        let params = ForestParams::default();
        let mut candidates: Vec<CandidateScore> = [0.5, 0.9, 0.9, 0.1]
            .iter()
            .map(|&m| CandidateScore {
                params,
                fold_scores: vec![m],
                mean_score: m,
                std_score: 0.0,
                rank: 0,
            })
            .collect();
        assign_ranks(&mut candidates);
        let ranks: Vec<usize> = candidates.iter().map(|c| c.rank).collect();
        assert_eq!(ranks, vec![3, 1, 1, 4]);
    }

    #[test]
    fn test_grid_search_picks_a_candidate_and_refits() {
        let mut rows = Vec::new();
        let mut y = Vec::new();
        for i in 0..15 {
            let v = 0.5 + i as f64 / 30.0;
            rows.push(SparseVector::from_pairs(vec![(0, v)]));
            y.push("good".to_string());
            rows.push(SparseVector::from_pairs(vec![(1, v)]));
            y.push("bad".to_string());
        }
        let grid: Vec<ForestParams> = [None, Some(2)]
            .into_iter()
            .map(|max_depth| ForestParams {
                n_estimators: 5,
                max_depth,
                class_weight: ClassWeight::Balanced,
                random_state: 42,
            })
            .collect();

        let result = GridSearch::new(grid, 3).fit(&rows, &y, 2).unwrap();
        assert_eq!(result.candidates.len(), 2);
        assert!(result.candidates.iter().all(|c| c.fold_scores.len() == 3));
        assert!((result.best_score - 1.0).abs() < 1e-12);
        // Both candidates are perfect, so the first one wins.
        assert_eq!(result.best_index, 0);
        assert_eq!(result.best_estimator.params(), &result.best_params);
    }
}
