//! Daily demand history and weather outlook data handling

use crate::error::{PredictorError, Result};
use crate::utils::date_parser;
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// One day of historical demand, joined upstream with that day's weather.
///
/// Weather fields may be missing for very recent dates; the feature layer
/// decides how missing values are filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBunRecord {
    /// Calendar day of the aggregate
    pub date: NaiveDate,
    /// Buns actually consumed that day (one per burger sold)
    pub buns_used: u32,
    /// Daily average temperature in degrees Celsius
    pub temperature: Option<f64>,
    /// Daily total precipitation in millimetres
    pub precipitation: Option<f64>,
}

impl DailyBunRecord {
    /// Create a new daily record
    pub fn new(
        date: NaiveDate,
        buns_used: u32,
        temperature: Option<f64>,
        precipitation: Option<f64>,
    ) -> Self {
        Self {
            date,
            buns_used,
            temperature,
            precipitation,
        }
    }
}

/// One day of the future weather outlook handed over by the forecast client.
///
/// `conditions` is a readable label such as `Clear`, `Clouds`, `Rain`,
/// `Snow`, `Fog` or `Thunderstorm`; it is passed through to the order plan
/// untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlookDay {
    /// Calendar day the outlook applies to
    pub date: NaiveDate,
    /// Forecast daily average temperature in degrees Celsius
    pub temperature: Option<f64>,
    /// Forecast daily total precipitation in millimetres
    pub precipitation: Option<f64>,
    /// Readable condition label from the upstream forecast client
    pub conditions: String,
}

impl OutlookDay {
    /// Create an outlook day with complete weather fields
    pub fn new(date: NaiveDate, temperature: f64, precipitation: f64, conditions: &str) -> Self {
        Self {
            date,
            temperature: Some(temperature),
            precipitation: Some(precipitation),
            conditions: conditions.to_string(),
        }
    }
}

/// Loader for historical daily aggregates
#[derive(Debug)]
pub struct HistoryLoader;

impl HistoryLoader {
    /// Load daily records from a CSV file.
    ///
    /// Columns are found by name: the date column contains `date` or `day`,
    /// the target column contains `bun`, `units` or `consumed`, and the
    /// weather columns contain `temp` and `precip`. Empty numeric cells
    /// become missing values, never zeros.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<DailyBunRecord>> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe(df)
    }

    /// Build daily records from an existing DataFrame
    pub fn from_dataframe(df: DataFrame) -> Result<Vec<DailyBunRecord>> {
        if df.height() == 0 {
            return Err(PredictorError::InputShape(
                "historical batch is empty".to_string(),
            ));
        }

        let names = df.get_column_names();
        let date_col = Self::detect_column(&names, &["date", "day"]).ok_or_else(|| {
            PredictorError::InputShape("no date column found in data".to_string())
        })?;
        let target_col =
            Self::detect_column(&names, &["bun", "units", "consumed"]).ok_or_else(|| {
                PredictorError::InputShape("no bun usage column found in data".to_string())
            })?;
        let temp_col = Self::detect_column(&names, &["temp"]).ok_or_else(|| {
            PredictorError::InputShape("no temperature column found in data".to_string())
        })?;
        let precip_col = Self::detect_column(&names, &["precip"]).ok_or_else(|| {
            PredictorError::InputShape("no precipitation column found in data".to_string())
        })?;

        let dates = Self::date_values(&df, &date_col)?;
        let targets = Self::target_values(&df, &target_col)?;
        let temperatures = Self::optional_f64_values(&df, &temp_col)?;
        let precipitations = Self::optional_f64_values(&df, &precip_col)?;

        let mut records = Vec::with_capacity(dates.len());
        for i in 0..dates.len() {
            records.push(DailyBunRecord {
                date: dates[i],
                buns_used: targets[i],
                temperature: temperatures[i],
                precipitation: precipitations[i],
            });
        }

        Self::from_records(records)
    }

    /// Validate records assembled in memory by an upstream join
    pub fn from_records(records: Vec<DailyBunRecord>) -> Result<Vec<DailyBunRecord>> {
        if records.is_empty() {
            return Err(PredictorError::InputShape(
                "historical batch is empty".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.date) {
                return Err(PredictorError::InputShape(format!(
                    "duplicate date in historical batch: {}",
                    record.date
                )));
            }
        }

        log::debug!("loaded {} daily records", records.len());
        Ok(records)
    }

    /// Find a column whose lowercased name contains one of the needles
    fn detect_column(names: &[&str], needles: &[&str]) -> Option<String> {
        for name in names {
            let lower = name.to_lowercase();
            if needles.iter().any(|needle| lower.contains(needle)) {
                return Some(name.to_string());
            }
        }
        None
    }

    /// Read the date column as calendar days
    fn date_values(df: &DataFrame, column: &str) -> Result<Vec<NaiveDate>> {
        let col = df.column(column)?;

        match col.dtype() {
            DataType::Date => col
                .date()?
                .into_iter()
                .map(|opt| {
                    let days = opt.ok_or_else(|| {
                        PredictorError::Data(format!("missing date in column '{}'", column))
                    })?;
                    epoch_days_to_date(days)
                })
                .collect(),
            DataType::Utf8 => col
                .utf8()?
                .into_iter()
                .map(|opt| {
                    let raw = opt.ok_or_else(|| {
                        PredictorError::Data(format!("missing date in column '{}'", column))
                    })?;
                    date_parser::parse_date(raw)
                })
                .collect(),
            other => Err(PredictorError::Data(format!(
                "column '{}' has unsupported date type {:?}",
                column, other
            ))),
        }
    }

    /// Read the target column as non-negative daily counts
    fn target_values(df: &DataFrame, column: &str) -> Result<Vec<u32>> {
        let values = Self::optional_f64_values(df, column)?;

        values
            .into_iter()
            .map(|opt| {
                let value = opt.ok_or_else(|| {
                    PredictorError::Data(format!("missing value in column '{}'", column))
                })?;
                if value < 0.0 || value.fract() != 0.0 {
                    return Err(PredictorError::Data(format!(
                        "column '{}' must hold non-negative whole counts, got {}",
                        column, value
                    )));
                }
                Ok(value as u32)
            })
            .collect()
    }

    /// Read a numeric column, keeping nulls as missing values
    fn optional_f64_values(df: &DataFrame, column: &str) -> Result<Vec<Option<f64>>> {
        let col = df.column(column)?;

        match col.dtype() {
            DataType::Float64 => Ok(col.f64()?.into_iter().collect()),
            DataType::Float32 => Ok(col
                .f32()?
                .into_iter()
                .map(|v| v.map(|v| v as f64))
                .collect()),
            DataType::Int64 => Ok(col
                .i64()?
                .into_iter()
                .map(|v| v.map(|v| v as f64))
                .collect()),
            DataType::Int32 => Ok(col
                .i32()?
                .into_iter()
                .map(|v| v.map(|v| v as f64))
                .collect()),
            DataType::UInt64 => Ok(col
                .u64()?
                .into_iter()
                .map(|v| v.map(|v| v as f64))
                .collect()),
            DataType::UInt32 => Ok(col
                .u32()?
                .into_iter()
                .map(|v| v.map(|v| v as f64))
                .collect()),
            other => Err(PredictorError::Data(format!(
                "column '{}' cannot be read as numbers (type {:?})",
                column, other
            ))),
        }
    }
}

/// Convert a polars day offset (days since 1970-01-01) to a calendar day
fn epoch_days_to_date(days: i32) -> Result<NaiveDate> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)
        .ok_or_else(|| PredictorError::Data("invalid epoch date".to_string()))?;
    epoch
        .checked_add_signed(chrono::Duration::days(days as i64))
        .ok_or_else(|| PredictorError::Data(format!("date offset out of range: {}", days)))
}
