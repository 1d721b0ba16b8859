//! Projection of the trained model onto the weather outlook
//!
//! Produces the weekly order plan: for each coming day a point estimate of
//! buns needed, a safety-stock quantity covering forecast uncertainty, and
//! the money it costs.

use crate::data::OutlookDay;
use crate::error::{PredictorError, Result};
use crate::features::FeatureVector;
use crate::models::TrainedDemandModel;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

/// Length of the order plan in days
pub const FORECAST_HORIZON_DAYS: usize = 7;

/// One-sided service level of the safety-stock quantity
pub const SAFETY_STOCK_SERVICE_LEVEL: f64 = 0.90;

/// One day of the order plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// The day being ordered for
    pub date: NaiveDate,
    /// Weekday name, for the order table
    pub day_name: String,
    /// Point estimate of buns needed, rounded to a whole count
    pub predicted_buns: u32,
    /// Order quantity covering the service level against forecast error
    pub safety_stock_buns: u32,
    /// Forecast daily average temperature (degrees C)
    pub temperature: f64,
    /// Readable condition label from the outlook
    pub conditions: String,
    /// Point estimate times the per-bun cost, in euros
    pub estimated_cost: f64,
}

/// The weekly order plan, one entry per outlook day in input order
#[derive(Debug, Clone, Serialize)]
pub struct OrderPlan {
    days: Vec<ForecastDay>,
    mae: f64,
}

impl OrderPlan {
    /// The per-day order rows
    pub fn days(&self) -> &[ForecastDay] {
        &self.days
    }

    /// The model error the safety stock was sized against
    pub fn mae(&self) -> f64 {
        self.mae
    }

    /// Week total of the point estimates
    pub fn total_buns(&self) -> u32 {
        self.days.iter().map(|d| d.predicted_buns).sum()
    }

    /// Week total of the safety-stock quantities
    pub fn total_safety_stock_buns(&self) -> u32 {
        self.days.iter().map(|d| d.safety_stock_buns).sum()
    }

    /// Week total of the cost estimates
    pub fn total_cost(&self) -> f64 {
        self.days.iter().map(|d| d.estimated_cost).sum()
    }

    /// Serialize the plan for the reporting layer
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Project the trained model onto a 7-day weather outlook.
///
/// The outlook must hold exactly [`FORECAST_HORIZON_DAYS`] days, each with
/// temperature and precipitation present. An order recommendation without
/// weather input is unreliable, so a missing field fails the whole call
/// instead of being imputed; no partial plan is returned.
///
/// The safety stock assumes roughly normal residuals with the mean absolute
/// error as their scale: `ceil(predicted + z * mae)` where `z` is the
/// one-sided standard-normal quantile at the service level (about 1.28 at
/// 90%).
pub fn project_orders<M: TrainedDemandModel>(
    model: &M,
    mae: f64,
    outlook: &[OutlookDay],
    bun_cost: f64,
) -> Result<OrderPlan> {
    if outlook.len() != FORECAST_HORIZON_DAYS {
        return Err(PredictorError::ForecastInput(format!(
            "expected {} days of weather outlook, got {}",
            FORECAST_HORIZON_DAYS,
            outlook.len()
        )));
    }
    if !mae.is_finite() || mae < 0.0 {
        return Err(PredictorError::InvalidParameter(format!(
            "mae must be a non-negative finite number, got {}",
            mae
        )));
    }
    if !bun_cost.is_finite() || bun_cost < 0.0 {
        return Err(PredictorError::InvalidParameter(format!(
            "bun_cost must be a non-negative finite number, got {}",
            bun_cost
        )));
    }

    let z = one_sided_z(SAFETY_STOCK_SERVICE_LEVEL)?;
    let mut days = Vec::with_capacity(outlook.len());

    for day in outlook {
        let temperature = day.temperature.ok_or_else(|| {
            PredictorError::ForecastInput(format!("missing temperature for {}", day.date))
        })?;
        let precipitation = day.precipitation.ok_or_else(|| {
            PredictorError::ForecastInput(format!("missing precipitation for {}", day.date))
        })?;

        let features = FeatureVector::for_day(day.date, temperature, precipitation);
        let predicted = model.predict_one(&features).max(0.0).round() as u32;
        let safety_stock = (predicted as f64 + z * mae).ceil() as u32;

        days.push(ForecastDay {
            date: day.date,
            day_name: day.date.format("%A").to_string(),
            predicted_buns: predicted,
            safety_stock_buns: safety_stock,
            temperature,
            conditions: day.conditions.clone(),
            estimated_cost: round_cents(predicted as f64 * bun_cost),
        });
    }

    let plan = OrderPlan { days, mae };
    log::info!(
        "projected order plan: {} buns point, {} buns safe, {:.2} cost",
        plan.total_buns(),
        plan.total_safety_stock_buns(),
        plan.total_cost()
    );
    Ok(plan)
}

/// One-sided standard-normal quantile for a service level in (0.5, 1.0)
fn one_sided_z(service_level: f64) -> Result<f64> {
    if !(0.5..1.0).contains(&service_level) {
        return Err(PredictorError::InvalidParameter(format!(
            "service level must be in [0.5, 1.0), got {}",
            service_level
        )));
    }
    let standard_normal = Normal::new(0.0, 1.0)
        .map_err(|e| PredictorError::InvalidParameter(e.to_string()))?;
    Ok(standard_normal.inverse_cdf(service_level))
}

/// Round a euro amount to whole cents
fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
