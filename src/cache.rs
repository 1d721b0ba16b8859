//! Explicit cache for trained forests
//!
//! A trained model is recomputed only when its inputs change. The cache key
//! covers the full training batch and the hyperparameters, so a changed
//! batch or a changed configuration always misses; invalidation is an
//! explicit call, never an implicit global swap.

use crate::error::Result;
use crate::features::FeatureVector;
use crate::models::random_forest::{ForestParams, RandomForest, TrainedRandomForest};
use crate::models::DemandModel;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Key identifying one (training batch, hyperparameters) pair
pub type CacheKey = u64;

/// Compute the cache key for a training run
pub fn training_key(
    params: &ForestParams,
    features: &[FeatureVector],
    targets: &[f64],
) -> CacheKey {
    let mut hasher = DefaultHasher::new();
    params.hash(&mut hasher);
    features.len().hash(&mut hasher);
    for feature in features {
        for value in feature.to_array() {
            value.to_bits().hash(&mut hasher);
        }
    }
    for target in targets {
        target.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}

/// Cache of trained forests keyed by their training inputs.
///
/// Cached artifacts are shared as `Arc`s: the cache can be invalidated
/// while callers keep predicting against the model they already hold.
#[derive(Debug, Default)]
pub struct ModelCache {
    entries: HashMap<CacheKey, Arc<TrainedRandomForest>>,
}

impl ModelCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached models
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no models
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a cached model by key
    pub fn get(&self, key: CacheKey) -> Option<Arc<TrainedRandomForest>> {
        self.entries.get(&key).map(Arc::clone)
    }

    /// Return the cached model for this training input, training on a miss
    pub fn get_or_train(
        &mut self,
        forest: &RandomForest,
        features: &[FeatureVector],
        targets: &[f64],
    ) -> Result<Arc<TrainedRandomForest>> {
        let key = training_key(forest.params(), features, targets);

        if let Some(hit) = self.entries.get(&key) {
            log::debug!("model cache hit for key {:#x}", key);
            return Ok(Arc::clone(hit));
        }

        log::info!("model cache miss, training {}", forest.name());
        let trained = Arc::new(forest.train(features, targets)?);
        self.entries.insert(key, Arc::clone(&trained));
        Ok(trained)
    }

    /// Drop one cached model; returns whether it was present
    pub fn invalidate(&mut self, key: CacheKey) -> bool {
        self.entries.remove(&key).is_some()
    }

    /// Drop every cached model
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
