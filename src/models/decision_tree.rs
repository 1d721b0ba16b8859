//! Variance-reduction regression trees, the ensemble members of the forest

use crate::features::NUM_FEATURES;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Growth limits shared by every tree in a forest
#[derive(Debug, Clone)]
pub(crate) struct TreeParams {
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    pub split_features: usize,
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// A single fitted regression tree
#[derive(Debug, Clone)]
pub(crate) struct RegressionTree {
    root: Node,
}

impl RegressionTree {
    /// Grow a tree on the given bootstrap sample.
    ///
    /// Every stochastic step draws from the caller's seeded generator, and
    /// the squared-error reduction of each accepted split is accumulated
    /// into `importances` by split feature.
    pub(crate) fn fit(
        rows: &[[f64; NUM_FEATURES]],
        targets: &[f64],
        sample: &[usize],
        params: &TreeParams,
        rng: &mut StdRng,
        importances: &mut [f64; NUM_FEATURES],
    ) -> Self {
        let root = grow(rows, targets, sample.to_vec(), 0, params, rng, importances);
        Self { root }
    }

    /// Walk the tree for a single feature row
    pub(crate) fn predict_row(&self, row: &[f64; NUM_FEATURES]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

/// The best split found for a node
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    children_sse: f64,
}

fn grow(
    rows: &[[f64; NUM_FEATURES]],
    targets: &[f64],
    indices: Vec<usize>,
    depth: usize,
    params: &TreeParams,
    rng: &mut StdRng,
    importances: &mut [f64; NUM_FEATURES],
) -> Node {
    let n = indices.len() as f64;
    let (sum, sum_sq) = indices.iter().fold((0.0, 0.0), |(s, sq), &i| {
        (s + targets[i], sq + targets[i] * targets[i])
    });
    let mean = sum / n;
    let node_sse = (sum_sq - sum * sum / n).max(0.0);

    if depth >= params.max_depth
        || indices.len() < 2 * params.min_samples_leaf
        || node_sse <= 1e-12
    {
        return Node::Leaf { value: mean };
    }

    let split = match best_split(rows, targets, &indices, sum, sum_sq, params, rng) {
        Some(split) if split.children_sse < node_sse => split,
        _ => return Node::Leaf { value: mean },
    };

    let mut left_indices = Vec::new();
    let mut right_indices = Vec::new();
    for &i in &indices {
        if rows[i][split.feature] <= split.threshold {
            left_indices.push(i);
        } else {
            right_indices.push(i);
        }
    }
    if left_indices.is_empty() || right_indices.is_empty() {
        return Node::Leaf { value: mean };
    }

    importances[split.feature] += node_sse - split.children_sse;

    Node::Split {
        feature: split.feature,
        threshold: split.threshold,
        left: Box::new(grow(
            rows,
            targets,
            left_indices,
            depth + 1,
            params,
            rng,
            importances,
        )),
        right: Box::new(grow(
            rows,
            targets,
            right_indices,
            depth + 1,
            params,
            rng,
            importances,
        )),
    }
}

/// Scan the candidate features for the split minimizing child squared error
fn best_split(
    rows: &[[f64; NUM_FEATURES]],
    targets: &[f64],
    indices: &[usize],
    total_sum: f64,
    total_sum_sq: f64,
    params: &TreeParams,
    rng: &mut StdRng,
) -> Option<SplitCandidate> {
    let mut pool: Vec<usize> = (0..NUM_FEATURES).collect();
    let candidates: Vec<usize> = if params.split_features < NUM_FEATURES {
        let (picked, _) = pool.partial_shuffle(rng, params.split_features);
        let mut picked = picked.to_vec();
        picked.sort_unstable();
        picked
    } else {
        pool
    };

    let n = indices.len();
    let mut best: Option<SplitCandidate> = None;

    for feature in candidates {
        let mut order = indices.to_vec();
        order.sort_unstable_by(|&a, &b| rows[a][feature].total_cmp(&rows[b][feature]));

        let mut prefix_sum = 0.0;
        let mut prefix_sum_sq = 0.0;

        for i in 0..n - 1 {
            let idx = order[i];
            prefix_sum += targets[idx];
            prefix_sum_sq += targets[idx] * targets[idx];

            let left_n = i + 1;
            let right_n = n - left_n;
            if left_n < params.min_samples_leaf || right_n < params.min_samples_leaf {
                continue;
            }

            let value = rows[idx][feature];
            let next_value = rows[order[i + 1]][feature];
            if value == next_value {
                continue;
            }

            let left_sse = (prefix_sum_sq - prefix_sum * prefix_sum / left_n as f64).max(0.0);
            let right_sum = total_sum - prefix_sum;
            let right_sse = ((total_sum_sq - prefix_sum_sq)
                - right_sum * right_sum / right_n as f64)
                .max(0.0);
            let children_sse = left_sse + right_sse;

            let improves = match &best {
                Some(current) => children_sse < current.children_sse,
                None => true,
            };
            if improves {
                best = Some(SplitCandidate {
                    feature,
                    threshold: (value + next_value) / 2.0,
                    children_sse,
                });
            }
        }
    }

    best
}
