use bun_forecast::{
    evaluate, project_orders, temporal_split, DemandModel, FeatureBuilder, FeatureVector,
    ForestParams, HistoryLoader, ModelCache, OutlookDay, RandomForest, TrainedDemandModel,
};
use bun_forecast::features::target_vector;
use bun_forecast::DailyBunRecord;
use chrono::{Datelike, Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

/// Stub model used as the naive baseline: always predicts one value
#[derive(Debug)]
struct ConstantModel {
    value: f64,
}

impl TrainedDemandModel for ConstantModel {
    fn predict(&self, features: &[FeatureVector]) -> Vec<f64> {
        vec![self.value; features.len()]
    }

    fn name(&self) -> &str {
        "Constant"
    }
}

/// Four years of synthetic daily history with the patterns the model is
/// meant to pick up: weekend lift, yearly growth, a rain dip and a
/// hot-weather terrace lift, plus Gaussian noise.
fn synthetic_history(days: usize, seed: u64) -> Vec<DailyBunRecord> {
    let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 12.0).unwrap();

    (0..days)
        .map(|i| {
            let date = start + Duration::days(i as i64);
            let day_of_year = date.ordinal() as f64;

            // Mild winters, warm summers, a couple of degrees of noise
            let seasonal =
                11.0 - 10.0 * (2.0 * std::f64::consts::PI * day_of_year / 365.0).cos();
            let temperature = seasonal + rng.gen_range(-3.0..3.0);

            let rainy = rng.gen_bool(0.3);
            let precipitation: f64 = if rainy { rng.gen_range(1.5..12.0) } else { 0.0 };

            let weekend = date.weekday().num_days_from_monday() >= 5;
            let mut demand = if weekend { 430.0 } else { 320.0 };
            demand *= 1.0 + 0.06 * (date.year() - 2022) as f64;
            if precipitation > 1.0 {
                demand *= 0.8;
            }
            if temperature > 25.0 {
                demand *= 1.15;
            }
            demand += noise.sample(&mut rng);

            DailyBunRecord::new(
                date,
                demand.round().max(150.0) as u32,
                Some((temperature * 10.0).round() / 10.0),
                Some((precipitation * 10.0).round() / 10.0),
            )
        })
        .collect()
}

fn scenario_forest() -> RandomForest {
    RandomForest::new(ForestParams {
        trees: 50,
        ..ForestParams::default()
    })
    .unwrap()
}

#[test]
fn test_model_beats_the_global_mean_baseline() {
    let history = synthetic_history(1460, 7);
    let (train, test) = temporal_split(&history, 12).unwrap();
    assert_eq!(train.len(), 1095);
    assert_eq!(test.len(), 365);

    let (builder, features) = FeatureBuilder::fit_transform(&train).unwrap();
    let targets = target_vector(&train);

    let model = scenario_forest().train(&features, &targets).unwrap();
    let report = evaluate(&model, &builder, &test).unwrap();

    let train_mean = targets.iter().sum::<f64>() / targets.len() as f64;
    let baseline = evaluate(&ConstantModel { value: train_mean }, &builder, &test).unwrap();

    // The learned model has to be materially better than always ordering
    // the historical average.
    assert!(report.mape < 0.75 * baseline.mape);
    assert!(report.mae < baseline.mae);
}

#[test]
fn test_repeated_training_is_reproducible_end_to_end() {
    let history = synthetic_history(400, 21);
    let (train, test) = temporal_split(&history, 6).unwrap();
    let (builder, features) = FeatureBuilder::fit_transform(&train).unwrap();
    let targets = target_vector(&train);

    let forest = RandomForest::new(ForestParams {
        trees: 15,
        ..ForestParams::default()
    })
    .unwrap();

    let first = forest.train(&features, &targets).unwrap();
    let second = forest.train(&features, &targets).unwrap();

    let test_features = builder.transform(&test);
    assert_eq!(first.predict(&test_features), second.predict(&test_features));
    assert_eq!(
        first.feature_importance().weights(),
        second.feature_importance().weights()
    );
}

#[test]
fn test_model_cache_reuses_and_invalidates() {
    let history = synthetic_history(300, 3);
    let (_, features) = FeatureBuilder::fit_transform(&history).unwrap();
    let targets = target_vector(&history);

    let forest = RandomForest::new(ForestParams {
        trees: 10,
        ..ForestParams::default()
    })
    .unwrap();
    let mut cache = ModelCache::new();

    let first = cache.get_or_train(&forest, &features, &targets).unwrap();
    let second = cache.get_or_train(&forest, &features, &targets).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 1);

    // A changed batch is a different key, so the stale model is not reused
    let mut changed_targets = targets.clone();
    changed_targets[0] += 1.0;
    let retrained = cache
        .get_or_train(&forest, &features, &changed_targets)
        .unwrap();
    assert!(!Arc::ptr_eq(&first, &retrained));
    assert_eq!(cache.len(), 2);

    let key = bun_forecast::training_key(forest.params(), &features, &targets);
    assert!(cache.invalidate(key));
    assert!(cache.get(key).is_none());
    assert_eq!(cache.len(), 1);

    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn test_full_workflow_from_csv_to_order_plan() {
    // 1. Write two years of history to a CSV file
    let history = synthetic_history(730, 11);
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "day,actual_buns_used,temperature,precipitation").unwrap();
    for r in &history {
        writeln!(
            file,
            "{},{},{},{}",
            r.date,
            r.buns_used,
            r.temperature.unwrap(),
            r.precipitation.unwrap()
        )
        .unwrap();
    }
    file.flush().unwrap();

    // 2. Load and split it
    let loaded = HistoryLoader::from_csv(file.path()).unwrap();
    assert_eq!(loaded.len(), history.len());
    let (train, test) = temporal_split(&loaded, 12).unwrap();

    // 3. Train and evaluate
    let (builder, features) = FeatureBuilder::fit_transform(&train).unwrap();
    let targets = target_vector(&train);
    let model = scenario_forest().train(&features, &targets).unwrap();
    let report = evaluate(&model, &builder, &test).unwrap();
    assert!(report.mae > 0.0);
    assert!(!report.residuals.is_empty());

    // 4. Importance is a proper distribution and sees the weekend signal
    let importance = model.feature_importance();
    let total: f64 = importance.weights().iter().sum();
    assert!((total - 1.0).abs() < 1e-6);
    let calendar_weight = importance.get("is_weekend").unwrap()
        + importance.get("day_of_week").unwrap();
    assert!(calendar_weight > 0.2);

    // 5. Project the next week's order plan
    let last_date = loaded.iter().map(|r| r.date).max().unwrap();
    let outlook: Vec<OutlookDay> = (1..=7)
        .map(|i| {
            OutlookDay::new(
                last_date + Duration::days(i),
                18.0,
                if i == 2 { 5.0 } else { 0.0 },
                if i == 2 { "Rain" } else { "Clouds" },
            )
        })
        .collect();
    let plan = project_orders(&model, report.mae, &outlook, 0.35).unwrap();

    assert_eq!(plan.days().len(), 7);
    assert!(plan.total_buns() > 0);
    assert!(plan.total_safety_stock_buns() >= plan.total_buns());
    for day in plan.days() {
        assert!(day.predicted_buns > 100);
        assert!(day.safety_stock_buns >= day.predicted_buns);
    }
}
