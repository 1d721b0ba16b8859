//! Feature construction for the demand model
//!
//! Turns a daily record into the fixed vector of calendar and weather
//! signals the regressor is trained on.

use crate::data::DailyBunRecord;
use crate::error::{PredictorError, Result};
use crate::utils::median;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Number of model features
pub const NUM_FEATURES: usize = 8;

/// Fixed feature names, in vector order
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "day_of_week",
    "month",
    "year",
    "is_weekend",
    "temperature",
    "precipitation",
    "is_rain",
    "is_hot_sunny",
];

/// Precipitation above this counts as a rain day (mm)
pub const RAIN_THRESHOLD_MM: f64 = 1.0;

/// Temperature above this counts as a hot sunny day, terrace weather (degrees C)
pub const HOT_SUNNY_THRESHOLD_C: f64 = 25.0;

/// The fixed feature vector for a single day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// 0 = Monday ... 6 = Sunday
    pub day_of_week: f64,
    /// 1 to 12, captures seasonality
    pub month: f64,
    /// Captures the growth trend over years
    pub year: f64,
    /// 1 if Saturday or Sunday
    pub is_weekend: f64,
    /// Daily average temperature (degrees C)
    pub temperature: f64,
    /// Daily total precipitation (mm)
    pub precipitation: f64,
    /// 1 if precipitation is above the rain threshold
    pub is_rain: f64,
    /// 1 if temperature is above the hot sunny threshold
    pub is_hot_sunny: f64,
}

impl FeatureVector {
    /// Build the vector for a day with fully known weather.
    ///
    /// This is the forecast path: there is no batch to impute from, so the
    /// caller must supply concrete temperature and precipitation values.
    pub fn for_day(date: NaiveDate, temperature: f64, precipitation: f64) -> Self {
        let day_of_week = date.weekday().num_days_from_monday();

        Self {
            day_of_week: day_of_week as f64,
            month: date.month() as f64,
            year: date.year() as f64,
            is_weekend: if day_of_week >= 5 { 1.0 } else { 0.0 },
            temperature,
            precipitation,
            is_rain: if precipitation > RAIN_THRESHOLD_MM {
                1.0
            } else {
                0.0
            },
            is_hot_sunny: if temperature > HOT_SUNNY_THRESHOLD_C {
                1.0
            } else {
                0.0
            },
        }
    }

    /// Feature values in `FEATURE_NAMES` order
    pub fn to_array(&self) -> [f64; NUM_FEATURES] {
        [
            self.day_of_week,
            self.month,
            self.year,
            self.is_weekend,
            self.temperature,
            self.precipitation,
            self.is_rain,
            self.is_hot_sunny,
        ]
    }

    /// Feature names in vector order
    pub fn feature_names() -> [&'static str; NUM_FEATURES] {
        FEATURE_NAMES
    }
}

/// Builds feature vectors from daily records.
///
/// Fitting captures the median temperature of the training batch; that same
/// median fills missing temperatures in every batch transformed afterwards,
/// so held-out or future data is never imputed from its own values.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureBuilder {
    temperature_fill: f64,
}

impl FeatureBuilder {
    /// Fit the builder on a historical batch.
    ///
    /// Fails on an empty batch or a batch with no temperature observations
    /// at all, since no fill value can be derived.
    pub fn fit(history: &[DailyBunRecord]) -> Result<Self> {
        if history.is_empty() {
            return Err(PredictorError::InputShape(
                "cannot fit feature builder on an empty batch".to_string(),
            ));
        }

        let observed: Vec<f64> = history.iter().filter_map(|r| r.temperature).collect();
        let temperature_fill = median(&observed).ok_or_else(|| {
            PredictorError::InputShape(
                "historical batch has no temperature observations".to_string(),
            )
        })?;

        Ok(Self { temperature_fill })
    }

    /// The median temperature captured at fit time
    pub fn temperature_fill(&self) -> f64 {
        self.temperature_fill
    }

    /// Build one feature vector per record, in input order.
    ///
    /// Missing temperature takes the fitted median; missing precipitation
    /// takes zero. No rows are dropped.
    pub fn transform(&self, history: &[DailyBunRecord]) -> Vec<FeatureVector> {
        history
            .iter()
            .map(|record| {
                let temperature = record.temperature.unwrap_or(self.temperature_fill);
                let precipitation = record.precipitation.unwrap_or(0.0);
                FeatureVector::for_day(record.date, temperature, precipitation)
            })
            .collect()
    }

    /// Fit on a batch and transform it in one step
    pub fn fit_transform(history: &[DailyBunRecord]) -> Result<(Self, Vec<FeatureVector>)> {
        let builder = Self::fit(history)?;
        let features = builder.transform(history);
        Ok((builder, features))
    }
}

/// Extract the training targets (buns used per day) from a batch
pub fn target_vector(history: &[DailyBunRecord]) -> Vec<f64> {
    history.iter().map(|r| r.buns_used as f64).collect()
}
