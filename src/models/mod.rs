//! Regression models for daily demand

use crate::error::Result;
use crate::features::{FeatureVector, FEATURE_NAMES, NUM_FEATURES};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Debug;

/// A demand regressor that can be trained on feature vectors
pub trait DemandModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedDemandModel;

    /// Fit the model to a batch of feature vectors and their daily targets
    fn train(&self, features: &[FeatureVector], targets: &[f64]) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

/// A trained demand regressor.
///
/// Trained models are immutable: prediction is a pure read and is safe to
/// call concurrently from multiple callers.
pub trait TrainedDemandModel: Debug {
    /// Predict expected daily demand, one value per feature vector
    fn predict(&self, features: &[FeatureVector]) -> Vec<f64>;

    /// Predict expected demand for a single day
    fn predict_one(&self, features: &FeatureVector) -> f64 {
        self.predict(std::slice::from_ref(features))
            .pop()
            .unwrap_or(0.0)
    }

    /// Name of the model
    fn name(&self) -> &str;
}

/// Per-feature contribution weights read from a trained ensemble.
///
/// Weights are non-negative and sum to 1 across the fixed features. The
/// association is unordered; `ranked` is a convenience for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    weights: [f64; NUM_FEATURES],
}

impl FeatureImportance {
    pub(crate) fn new(weights: [f64; NUM_FEATURES]) -> Self {
        Self { weights }
    }

    /// Weight for a feature name, if it is one of the model's features
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|&n| n == name)
            .map(|i| self.weights[i])
    }

    /// Weights in `FEATURE_NAMES` order
    pub fn weights(&self) -> &[f64; NUM_FEATURES] {
        &self.weights
    }

    /// The unordered name-to-weight association
    pub fn to_map(&self) -> HashMap<&'static str, f64> {
        FEATURE_NAMES
            .iter()
            .zip(self.weights.iter())
            .map(|(&name, &weight)| (name, weight))
            .collect()
    }

    /// Names and weights sorted by descending weight, for display
    pub fn ranked(&self) -> Vec<(&'static str, f64)> {
        let mut pairs: Vec<(&'static str, f64)> = FEATURE_NAMES
            .iter()
            .zip(self.weights.iter())
            .map(|(&name, &weight)| (name, weight))
            .collect();
        pairs.sort_by(|a, b| b.1.total_cmp(&a.1));
        pairs
    }
}

pub(crate) mod decision_tree;
pub mod random_forest;
