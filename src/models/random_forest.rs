//! Bagged random forest regressor for daily demand
//!
//! Demand responds to weather in thresholds rather than lines: heat only
//! matters above terrace temperature, rain only above a trace. A bagged
//! ensemble of depth-capped trees learns those step shapes and their
//! interactions without manual feature crossing, needs no scaling, and its
//! split accounting doubles as a feature-importance ranking.

use crate::error::{PredictorError, Result};
use crate::features::{FeatureVector, NUM_FEATURES};
use crate::models::decision_tree::{RegressionTree, TreeParams};
use crate::models::{DemandModel, FeatureImportance, TrainedDemandModel};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Hyperparameters of the forest.
///
/// The defaults are fixed rather than tuned per call, so repeated training
/// on identical data yields identical predictions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForestParams {
    /// Ensemble size; enough members to stabilize prediction variance
    pub trees: usize,
    /// Depth cap per tree, keeps a few thousand rows from being overfit
    pub max_depth: usize,
    /// Every leaf must cover at least this many days
    pub min_samples_leaf: usize,
    /// Features considered per split; the full set by default
    pub split_features: usize,
    /// Master seed for bootstrap and feature subsampling
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            trees: 300,
            max_depth: 8,
            min_samples_leaf: 5,
            split_features: NUM_FEATURES,
            seed: 42,
        }
    }
}

/// Untrained random forest regressor
#[derive(Debug, Clone)]
pub struct RandomForest {
    name: String,
    params: ForestParams,
}

impl RandomForest {
    /// Create a forest with validated hyperparameters
    pub fn new(params: ForestParams) -> Result<Self> {
        if params.trees == 0 {
            return Err(PredictorError::InvalidParameter(
                "ensemble must have at least one tree".to_string(),
            ));
        }
        if params.max_depth == 0 {
            return Err(PredictorError::InvalidParameter(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if params.min_samples_leaf == 0 {
            return Err(PredictorError::InvalidParameter(
                "min_samples_leaf must be at least 1".to_string(),
            ));
        }
        if params.split_features == 0 || params.split_features > NUM_FEATURES {
            return Err(PredictorError::InvalidParameter(format!(
                "split_features must be between 1 and {}",
                NUM_FEATURES
            )));
        }

        Ok(Self {
            name: format!(
                "Random Forest ({} trees, depth {})",
                params.trees, params.max_depth
            ),
            params,
        })
    }

    /// Create a forest with the standard reproducible hyperparameters
    pub fn with_defaults() -> Self {
        Self {
            name: "Random Forest (300 trees, depth 8)".to_string(),
            params: ForestParams::default(),
        }
    }

    /// The forest's hyperparameters
    pub fn params(&self) -> &ForestParams {
        &self.params
    }
}

impl DemandModel for RandomForest {
    type Trained = TrainedRandomForest;

    fn train(&self, features: &[FeatureVector], targets: &[f64]) -> Result<TrainedRandomForest> {
        if features.is_empty() {
            return Err(PredictorError::InputShape(
                "training batch is empty".to_string(),
            ));
        }
        if features.len() != targets.len() {
            return Err(PredictorError::InputShape(format!(
                "features ({}) and targets ({}) differ in length",
                features.len(),
                targets.len()
            )));
        }
        if targets.iter().any(|t| !t.is_finite() || *t < 0.0) {
            return Err(PredictorError::Data(
                "targets must be non-negative finite counts".to_string(),
            ));
        }

        let rows: Vec<[f64; NUM_FEATURES]> =
            features.iter().map(FeatureVector::to_array).collect();
        let n = rows.len();
        let tree_params = TreeParams {
            max_depth: self.params.max_depth,
            min_samples_leaf: self.params.min_samples_leaf,
            split_features: self.params.split_features,
        };

        let mut trees = Vec::with_capacity(self.params.trees);
        let mut raw_importance = [0.0; NUM_FEATURES];

        // Each tree derives its own generator from the master seed, so the
        // result does not depend on training order.
        for tree_index in 0..self.params.trees {
            let mut rng = StdRng::seed_from_u64(self.params.seed.wrapping_add(tree_index as u64));
            let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            trees.push(RegressionTree::fit(
                &rows,
                targets,
                &sample,
                &tree_params,
                &mut rng,
                &mut raw_importance,
            ));
        }

        let importance = normalize_importance(raw_importance);
        log::debug!("trained {} on {} days", self.name, n);

        Ok(TrainedRandomForest {
            name: self.name.clone(),
            trees,
            importance: FeatureImportance::new(importance),
            training_samples: n,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A trained, immutable random forest
#[derive(Debug)]
pub struct TrainedRandomForest {
    name: String,
    trees: Vec<RegressionTree>,
    importance: FeatureImportance,
    training_samples: usize,
}

impl TrainedRandomForest {
    /// Per-feature contribution weights from the ensemble's split accounting
    pub fn feature_importance(&self) -> &FeatureImportance {
        &self.importance
    }

    /// Number of days the forest was trained on
    pub fn training_samples(&self) -> usize {
        self.training_samples
    }

    /// Number of trees in the ensemble
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

impl TrainedDemandModel for TrainedRandomForest {
    fn predict(&self, features: &[FeatureVector]) -> Vec<f64> {
        features
            .iter()
            .map(|fv| {
                let row = fv.to_array();
                let sum: f64 = self.trees.iter().map(|tree| tree.predict_row(&row)).sum();
                (sum / self.trees.len() as f64).max(0.0)
            })
            .collect()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Scale raw squared-error reductions so the weights sum to one.
///
/// A forest that never split (constant targets) reports uniform weights,
/// keeping the sum-to-one contract.
fn normalize_importance(raw: [f64; NUM_FEATURES]) -> [f64; NUM_FEATURES] {
    let total: f64 = raw.iter().sum();
    if total <= 0.0 {
        return [1.0 / NUM_FEATURES as f64; NUM_FEATURES];
    }

    let mut weights = raw;
    for weight in &mut weights {
        *weight /= total;
    }
    weights
}
