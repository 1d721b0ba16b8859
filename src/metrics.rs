//! Accuracy metrics for a trained demand model

use crate::data::DailyBunRecord;
use crate::error::{PredictorError, Result};
use crate::features::FeatureBuilder;
use crate::models::TrainedDemandModel;
use chrono::NaiveDate;
use serde::Serialize;

/// One held-out day: what happened against what the model said
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayResidual {
    /// The held-out day
    pub date: NaiveDate,
    /// Buns actually used
    pub actual: u32,
    /// Rounded model prediction
    pub predicted: u32,
    /// Signed miss; positive means the model over-ordered
    pub error: i64,
    /// Signed miss as a percentage of the actual
    pub error_pct: f64,
}

/// Accuracy of a trained model over a held-out test period
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    /// Mean absolute error in buns per day
    pub mae: f64,
    /// Mean absolute percentage error, in percent
    pub mape: f64,
    /// Per-day residuals, in test-batch order
    pub residuals: Vec<DayResidual>,
}

impl EvaluationReport {
    /// Days missed by more than twice the mean absolute error.
    ///
    /// A suggested investigate list for the reporting layer: such misses
    /// usually mean an event the calendar and weather cannot explain.
    pub fn anomalies(&self) -> Vec<&DayResidual> {
        self.residuals
            .iter()
            .filter(|r| (r.error.abs() as f64) > 2.0 * self.mae)
            .collect()
    }

    /// Headline accuracy figure, 100 minus MAPE, floored at zero
    pub fn accuracy_pct(&self) -> f64 {
        (100.0 - self.mape).max(0.0)
    }

    /// Serialize the report for the reporting layer
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Score a trained model against held-out days.
///
/// Buns are discrete, so predictions are rounded to the nearest
/// non-negative integer before any error is computed. Percentage error
/// divides by the day's actual demand; a test day with zero actual demand
/// is rejected rather than averaged as infinity.
pub fn evaluate<M: TrainedDemandModel>(
    model: &M,
    builder: &FeatureBuilder,
    test: &[DailyBunRecord],
) -> Result<EvaluationReport> {
    if test.is_empty() {
        return Err(PredictorError::InputShape(
            "test batch is empty".to_string(),
        ));
    }
    if let Some(day) = test.iter().find(|r| r.buns_used == 0) {
        return Err(PredictorError::ZeroActual(format!(
            "buns_used is 0 on {}, percentage error is undefined",
            day.date
        )));
    }

    let features = builder.transform(test);
    let raw_predictions = model.predict(&features);

    let mut residuals = Vec::with_capacity(test.len());
    let mut abs_error_sum = 0.0;
    let mut abs_pct_sum = 0.0;

    for (record, raw) in test.iter().zip(raw_predictions) {
        let predicted = raw.max(0.0).round() as u32;
        let error = predicted as i64 - record.buns_used as i64;
        let error_pct = error as f64 / record.buns_used as f64 * 100.0;

        abs_error_sum += error.abs() as f64;
        abs_pct_sum += error_pct.abs();

        residuals.push(DayResidual {
            date: record.date,
            actual: record.buns_used,
            predicted,
            error,
            error_pct,
        });
    }

    let n = residuals.len() as f64;
    let report = EvaluationReport {
        mae: abs_error_sum / n,
        mape: abs_pct_sum / n,
        residuals,
    };

    log::info!(
        "evaluated {} on {} days: MAE {:.1} buns, MAPE {:.1}%",
        model.name(),
        test.len(),
        report.mae,
        report.mape
    );
    Ok(report)
}
