use bun_forecast::features::{
    target_vector, FEATURE_NAMES, HOT_SUNNY_THRESHOLD_C, NUM_FEATURES, RAIN_THRESHOLD_MM,
};
use bun_forecast::{DailyBunRecord, FeatureBuilder, FeatureVector, PredictorError};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn record(
    date: NaiveDate,
    buns: u32,
    temperature: Option<f64>,
    precipitation: Option<f64>,
) -> DailyBunRecord {
    DailyBunRecord::new(date, buns, temperature, precipitation)
}

#[test]
fn test_calendar_features() {
    // 2024-06-03 is a Monday
    let monday = FeatureVector::for_day(day(2024, 6, 3), 18.0, 0.0);
    assert_eq!(monday.day_of_week, 0.0);
    assert_eq!(monday.month, 6.0);
    assert_eq!(monday.year, 2024.0);
    assert_eq!(monday.is_weekend, 0.0);

    // 2024-06-01 is a Saturday, 2024-06-02 a Sunday
    let saturday = FeatureVector::for_day(day(2024, 6, 1), 18.0, 0.0);
    let sunday = FeatureVector::for_day(day(2024, 6, 2), 18.0, 0.0);
    assert_eq!(saturday.day_of_week, 5.0);
    assert_eq!(saturday.is_weekend, 1.0);
    assert_eq!(sunday.day_of_week, 6.0);
    assert_eq!(sunday.is_weekend, 1.0);
}

#[rstest]
#[case(25.0, 0.0)]
#[case(24.9, 0.0)]
#[case(25.1, 1.0)]
#[case(31.0, 1.0)]
fn test_hot_sunny_threshold(#[case] temperature: f64, #[case] expected: f64) {
    let fv = FeatureVector::for_day(day(2024, 7, 10), temperature, 0.0);
    assert_eq!(fv.is_hot_sunny, expected);
}

#[rstest]
#[case(0.0, 0.0)]
#[case(1.0, 0.0)]
#[case(1.1, 1.0)]
#[case(14.0, 1.0)]
fn test_rain_threshold(#[case] precipitation: f64, #[case] expected: f64) {
    let fv = FeatureVector::for_day(day(2024, 7, 10), 15.0, precipitation);
    assert_eq!(fv.is_rain, expected);
}

#[test]
fn test_thresholds_are_the_documented_constants() {
    assert_eq!(RAIN_THRESHOLD_MM, 1.0);
    assert_eq!(HOT_SUNNY_THRESHOLD_C, 25.0);
    assert_eq!(FEATURE_NAMES.len(), NUM_FEATURES);
}

#[test]
fn test_to_array_follows_feature_name_order() {
    let fv = FeatureVector::for_day(day(2024, 7, 13), 28.0, 2.0);
    let values = fv.to_array();

    assert_eq!(values.len(), NUM_FEATURES);
    assert_eq!(values[0], fv.day_of_week);
    assert_eq!(values[1], fv.month);
    assert_eq!(values[2], fv.year);
    assert_eq!(values[3], fv.is_weekend);
    assert_eq!(values[4], fv.temperature);
    assert_eq!(values[5], fv.precipitation);
    assert_eq!(values[6], fv.is_rain);
    assert_eq!(values[7], fv.is_hot_sunny);
}

#[test]
fn test_median_imputation_uses_batch_median() {
    let history = vec![
        record(day(2024, 1, 1), 300, Some(10.0), Some(0.0)),
        record(day(2024, 1, 2), 310, None, Some(0.0)),
        record(day(2024, 1, 3), 320, Some(20.0), Some(0.0)),
        record(day(2024, 1, 4), 330, Some(30.0), Some(0.0)),
    ];

    let (builder, features) = FeatureBuilder::fit_transform(&history).unwrap();

    assert_eq!(builder.temperature_fill(), 20.0);
    assert_eq!(features.len(), history.len());
    assert_eq!(features[1].temperature, 20.0);
    assert_eq!(features[0].temperature, 10.0);
}

#[test]
fn test_missing_precipitation_becomes_zero() {
    let history = vec![record(day(2024, 1, 1), 300, Some(12.0), None)];
    let (_, features) = FeatureBuilder::fit_transform(&history).unwrap();

    assert_eq!(features[0].precipitation, 0.0);
    assert_eq!(features[0].is_rain, 0.0);
}

#[test]
fn test_scoring_uses_training_median_not_its_own() {
    let train = vec![
        record(day(2024, 1, 1), 300, Some(8.0), Some(0.0)),
        record(day(2024, 1, 2), 310, Some(10.0), Some(0.0)),
        record(day(2024, 1, 3), 320, Some(12.0), Some(0.0)),
    ];
    let builder = FeatureBuilder::fit(&train).unwrap();

    // A later batch whose own median would be 30.0
    let scoring = vec![
        record(day(2024, 8, 1), 400, Some(30.0), Some(0.0)),
        record(day(2024, 8, 2), 410, None, Some(0.0)),
    ];
    let features = builder.transform(&scoring);

    assert_eq!(features[1].temperature, 10.0);
}

#[test]
fn test_transform_is_pure_and_order_equivariant() {
    let history = vec![
        record(day(2024, 3, 1), 300, Some(5.0), Some(2.0)),
        record(day(2024, 3, 2), 350, None, None),
        record(day(2024, 3, 3), 320, Some(9.0), Some(0.4)),
    ];
    let builder = FeatureBuilder::fit(&history).unwrap();

    let first = builder.transform(&history);
    let second = builder.transform(&history);
    assert_eq!(first, second);

    let mut reversed = history.clone();
    reversed.reverse();
    let mut reversed_features = builder.transform(&reversed);
    reversed_features.reverse();
    assert_eq!(first, reversed_features);
}

#[test]
fn test_fit_rejects_empty_batch() {
    let result = FeatureBuilder::fit(&[]);
    assert!(matches!(result, Err(PredictorError::InputShape(_))));
}

#[test]
fn test_fit_rejects_batch_without_temperatures() {
    let history = vec![
        record(day(2024, 1, 1), 300, None, Some(0.0)),
        record(day(2024, 1, 2), 310, None, Some(1.0)),
    ];
    let result = FeatureBuilder::fit(&history);
    assert!(matches!(result, Err(PredictorError::InputShape(_))));
}

#[test]
fn test_target_vector() {
    let history = vec![
        record(day(2024, 1, 1), 300, Some(5.0), Some(0.0)),
        record(day(2024, 1, 2), 415, Some(6.0), Some(0.0)),
    ];
    assert_eq!(target_vector(&history), vec![300.0, 415.0]);
}
