//! # Bun Forecast
//!
//! A Rust library for forecasting daily bun demand at a single restaurant
//! and planning the weekly supplier order.
//!
//! ## Features
//!
//! - Daily demand history loading (CSV or in-memory records)
//! - Calendar and weather feature construction with training-time imputation
//! - Random forest demand regressor with reproducible, seeded training
//! - Temporally-correct train/test split (the last year is never trained on)
//! - Evaluation with MAE, MAPE and per-day residuals
//! - Feature importance read from the ensemble's split accounting
//! - 7-day order plan with point and safety-stock quantities and cost
//!
//! ## Quick Start
//!
//! ```no_run
//! use bun_forecast::{
//!     evaluate, temporal_split, FeatureBuilder, HistoryLoader, ModelCache, RandomForest,
//! };
//!
//! fn main() -> bun_forecast::Result<()> {
//!     // Daily aggregates assembled upstream from POS and weather history
//!     let history = HistoryLoader::from_csv("daily_buns.csv")?;
//!     let (train, test) = temporal_split(&history, 12)?;
//!
//!     // Features and targets from the training year range only
//!     let (builder, features) = FeatureBuilder::fit_transform(&train)?;
//!     let targets = bun_forecast::features::target_vector(&train);
//!
//!     // Train once, reuse until the data changes
//!     let forest = RandomForest::with_defaults();
//!     let mut cache = ModelCache::new();
//!     let model = cache.get_or_train(&forest, &features, &targets)?;
//!
//!     // Score on the held-out final year
//!     let report = evaluate(model.as_ref(), &builder, &test)?;
//!     println!("MAE {:.1} buns/day, MAPE {:.1}%", report.mae, report.mape);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod data;
pub mod error;
pub mod features;
pub mod forecast;
pub mod metrics;
pub mod models;
pub mod utils;

// Re-export commonly used types
pub use crate::cache::{training_key, CacheKey, ModelCache};
pub use crate::data::{DailyBunRecord, HistoryLoader, OutlookDay};
pub use crate::error::{PredictorError, Result};
pub use crate::features::{FeatureBuilder, FeatureVector, FEATURE_NAMES, NUM_FEATURES};
pub use crate::forecast::{project_orders, ForecastDay, OrderPlan, FORECAST_HORIZON_DAYS};
pub use crate::metrics::{evaluate, DayResidual, EvaluationReport};
pub use crate::models::random_forest::{ForestParams, RandomForest, TrainedRandomForest};
pub use crate::models::{DemandModel, FeatureImportance, TrainedDemandModel};
pub use crate::utils::temporal_split;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
