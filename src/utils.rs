//! Utility functions for the bun_forecast crate

use crate::data::DailyBunRecord;
use crate::error::{PredictorError, Result};
use chrono::Months;

/// Split daily records into train and test sets on a calendar cutoff.
///
/// The cutoff is the batch's own maximum date minus `test_months` calendar
/// months: records on or before the cutoff train the model, records strictly
/// after it are held out. The standard pipeline uses 12 months, so the model
/// is always scored on a full year it has never seen.
pub fn temporal_split(
    records: &[DailyBunRecord],
    test_months: u32,
) -> Result<(Vec<DailyBunRecord>, Vec<DailyBunRecord>)> {
    if records.is_empty() {
        return Err(PredictorError::InputShape(
            "cannot split an empty batch".to_string(),
        ));
    }
    if test_months == 0 {
        return Err(PredictorError::InvalidParameter(
            "test_months must be at least 1".to_string(),
        ));
    }

    let max_date = records
        .iter()
        .map(|r| r.date)
        .max()
        .ok_or_else(|| PredictorError::InputShape("cannot split an empty batch".to_string()))?;
    let cutoff = max_date
        .checked_sub_months(Months::new(test_months))
        .ok_or_else(|| {
            PredictorError::Data(format!("cutoff underflows the calendar: {}", max_date))
        })?;

    let mut train = Vec::new();
    let mut test = Vec::new();
    for record in records {
        if record.date <= cutoff {
            train.push(record.clone());
        } else {
            test.push(record.clone());
        }
    }

    if train.is_empty() {
        return Err(PredictorError::TemporalOrdering(format!(
            "no records on or before the {} month cutoff ({})",
            test_months, cutoff
        )));
    }
    if test.is_empty() {
        return Err(PredictorError::TemporalOrdering(format!(
            "no records after the {} month cutoff ({})",
            test_months, cutoff
        )));
    }

    log::debug!(
        "temporal split at {}: {} train days, {} test days",
        cutoff,
        train.len(),
        test.len()
    );
    Ok((train, test))
}

/// Median of a slice, or `None` when it is empty
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Calendar date parsing for the loader and its callers
pub mod date_parser {
    use crate::error::{PredictorError, Result};
    use chrono::NaiveDate;

    /// Formats accepted for date columns: ISO first, then the local ones
    const FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

    /// Parse a calendar date from a string
    pub fn parse_date(raw: &str) -> Result<NaiveDate> {
        let trimmed = raw.trim();
        for format in FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
                return Ok(date);
            }
        }
        Err(PredictorError::Data(format!(
            "unparseable date: '{}'",
            raw
        )))
    }
}

/// Flat CSV exports for the reporting layer
pub mod csv_export {
    use crate::error::Result;
    use crate::forecast::OrderPlan;
    use crate::metrics::EvaluationReport;
    use std::path::Path;

    /// Write the 7-day order plan as one CSV row per day
    pub fn write_order_plan<P: AsRef<Path>>(plan: &OrderPlan, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for day in plan.days() {
            writer.serialize(day)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write the per-day residual table of an evaluation run
    pub fn write_residuals<P: AsRef<Path>>(report: &EvaluationReport, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for residual in &report.residuals {
            writer.serialize(residual)?;
        }
        writer.flush()?;
        Ok(())
    }
}
