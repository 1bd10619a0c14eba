//! CART classification tree over sparse feature rows.
//! Gini impurity, weighted samples, random feature subsets per split.

use crate::sparse::SparseVector;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeParams {
    /// Maximum depth; `None` grows until leaves are pure
    pub max_depth: Option<usize>,
    /// Number of non-constant features examined per split
    pub max_features: usize,
    /// Minimum number of distinct rows required to split a node
    pub min_samples_split: usize,
}

/// Tree nodes live in a flat arena; children are referenced by index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Leaf {
        /// Class probabilities (weighted fractions), indexed by class id
        distribution: Vec<f64>,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    n_classes: usize,
}

struct PendingNode {
    slot: usize,
    samples: Vec<usize>,
    depth: usize,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    score: f64,
}

impl DecisionTree {
    /// Grow a tree on `rows` with class ids `y` and per-row `weights`.
    ///
    /// Rows with zero weight (e.g. left out of a bootstrap sample) are ignored.
    pub fn fit(
        rows: &[SparseVector],
        y: &[usize],
        weights: &[f64],
        n_classes: usize,
        params: &TreeParams,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let root_samples: Vec<usize> = (0..rows.len()).filter(|&i| weights[i] > 0.0).collect();

        let mut tree = DecisionTree {
            nodes: vec![Node::Leaf {
                distribution: vec![0.0; n_classes],
            }],
            n_classes,
        };

        let mut stack = vec![PendingNode {
            slot: 0,
            samples: root_samples,
            depth: 0,
        }];

        while let Some(PendingNode {
            slot,
            samples,
            depth,
        }) = stack.pop()
        {
            let dist = class_weights(&samples, y, weights, n_classes);
            let depth_reached = params.max_depth.is_some_and(|d| depth >= d);
            let pure = dist.iter().filter(|&&w| w > 0.0).count() <= 1;

            let split = if depth_reached || pure || samples.len() < params.min_samples_split {
                None
            } else {
                best_split(rows, y, weights, &samples, n_classes, params, rng)
            };

            match split {
                Some(candidate) => {
                    let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = samples
                        .iter()
                        .copied()
                        .partition(|&i| rows[i].get(candidate.feature) <= candidate.threshold);

                    let left = tree.nodes.len();
                    let right = left + 1;
                    tree.nodes.push(Node::Leaf {
                        distribution: Vec::new(),
                    });
                    tree.nodes.push(Node::Leaf {
                        distribution: Vec::new(),
                    });
                    tree.nodes[slot] = Node::Split {
                        feature: candidate.feature,
                        threshold: candidate.threshold,
                        left,
                        right,
                    };
                    stack.push(PendingNode {
                        slot: right,
                        samples: right_samples,
                        depth: depth + 1,
                    });
                    stack.push(PendingNode {
                        slot: left,
                        samples: left_samples,
                        depth: depth + 1,
                    });
                }
                None => {
                    tree.nodes[slot] = Node::Leaf {
                        distribution: normalize(dist),
                    };
                }
            }
        }

        tree
    }

    /// Class probability distribution for one row.
    pub fn predict_proba(&self, row: &SparseVector) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { distribution } => return distribution,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row.get(*feature) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Check the arena of a deserialized tree.
    ///
    /// Children always sit after their parent, so a tree that passes has no
    /// cycles and every lookup in [`DecisionTree::predict_proba`] is in range.
    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        let n_nodes = self.nodes.len();
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Leaf { distribution } => {
                    if distribution.len() != self.n_classes {
                        return Err(format!(
                            "leaf {} has {} class weights, expected {}",
                            idx,
                            distribution.len(),
                            self.n_classes
                        ));
                    }
                }
                Node::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= n_features {
                        return Err(format!(
                            "node {} splits on feature {} of {}",
                            idx, feature, n_features
                        ));
                    }
                    for &child in [left, right] {
                        if child <= idx || child >= n_nodes {
                            return Err(format!(
                                "node {} points to child {} (tree has {} nodes)",
                                idx, child, n_nodes
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((idx, depth)) = stack.pop() {
            match &self.nodes[idx] {
                Node::Leaf { .. } => max_depth = max_depth.max(depth),
                Node::Split { left, right, .. } => {
                    stack.push((*left, depth + 1));
                    stack.push((*right, depth + 1));
                }
            }
        }
        max_depth
    }
}

fn class_weights(samples: &[usize], y: &[usize], weights: &[f64], n_classes: usize) -> Vec<f64> {
    let mut dist = vec![0.0; n_classes];
    for &i in samples {
        dist[y[i]] += weights[i];
    }
    dist
}

fn normalize(mut dist: Vec<f64>) -> Vec<f64> {
    let total: f64 = dist.iter().sum();
    if total > 0.0 {
        for w in &mut dist {
            *w /= total;
        }
    }
    dist
}

/// Sum over classes of `w_c^2 / W`; larger means purer.
fn purity(dist: &[f64], total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    dist.iter().map(|w| w * w).sum::<f64>() / total
}

fn best_split(
    rows: &[SparseVector],
    y: &[usize],
    weights: &[f64],
    samples: &[usize],
    n_classes: usize,
    params: &TreeParams,
    rng: &mut ChaCha8Rng,
) -> Option<SplitCandidate> {
    // Features absent from every row in the node are constant zero.
    let mut features: Vec<usize> = samples
        .iter()
        .flat_map(|&i| rows[i].indices().iter().copied())
        .collect::<HashSet<usize>>()
        .into_iter()
        .collect();
    features.sort_unstable();
    features.shuffle(rng);

    let total_dist = class_weights(samples, y, weights, n_classes);
    let total_weight: f64 = total_dist.iter().sum();

    let mut best: Option<SplitCandidate> = None;
    let mut visited = 0;
    let mut values: Vec<(f64, usize)> = Vec::with_capacity(samples.len());

    for feature in features {
        if visited >= params.max_features {
            break;
        }

        values.clear();
        values.extend(samples.iter().map(|&i| (rows[i].get(feature), i)));
        values.sort_by(|a, b| a.0.total_cmp(&b.0));

        let (first, last) = (values[0].0, values[values.len() - 1].0);
        if first == last {
            continue;
        }
        visited += 1;

        let mut left_dist = vec![0.0; n_classes];
        let mut left_weight = 0.0;
        for k in 0..values.len() - 1 {
            let (value, i) = values[k];
            left_dist[y[i]] += weights[i];
            left_weight += weights[i];

            let next = values[k + 1].0;
            if next <= value {
                continue;
            }

            let right_dist: Vec<f64> = total_dist
                .iter()
                .zip(&left_dist)
                .map(|(t, l)| t - l)
                .collect();
            let right_weight = total_weight - left_weight;
            let score = purity(&left_dist, left_weight) + purity(&right_dist, right_weight);

            if best.as_ref().map_or(true, |b| score > b.score) {
                let mut threshold = value + (next - value) / 2.0;
                if threshold >= next {
                    threshold = value;
                }
                best = Some(SplitCandidate {
                    feature,
                    threshold,
                    score,
                });
            }
        }
    }

    best
}
