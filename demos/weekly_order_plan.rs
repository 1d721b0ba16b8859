use bun_forecast::features::target_vector;
use bun_forecast::{
    evaluate, project_orders, temporal_split, DailyBunRecord, DemandModel, FeatureBuilder,
    OutlookDay, RandomForest,
};
use chrono::{Datelike, Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Bun Forecast: Weekly Order Plan Example");
    println!("=======================================\n");

    // Four years of synthetic history standing in for the POS + weather join
    println!("Generating sample history...");
    let history = sample_history(1460);
    println!("Sample history: {} days\n", history.len());

    // Train on everything except the final year, test on that year
    let (train, test) = temporal_split(&history, 12)?;
    println!(
        "Temporal split: {} train days, {} test days",
        train.len(),
        test.len()
    );

    let (builder, features) = FeatureBuilder::fit_transform(&train)?;
    let targets = target_vector(&train);

    println!("Training model...");
    let forest = RandomForest::with_defaults();
    let model = forest.train(&features, &targets)?;
    println!("Model trained: {}\n", forest.name());

    // Accuracy on the held-out year
    let report = evaluate(&model, &builder, &test)?;
    println!(
        "Test accuracy: MAE {:.1} buns/day, MAPE {:.1}% ({:.1}% accurate)",
        report.mae,
        report.mape,
        report.accuracy_pct()
    );
    println!(
        "Days worth investigating (miss > 2x MAE): {}\n",
        report.anomalies().len()
    );

    // What drives the prediction
    println!("Feature importance:");
    for (name, weight) in model.feature_importance().ranked() {
        println!("  {:<14} {:>5.1}%", name, weight * 100.0);
    }
    println!();

    // Next week's outlook, as the forecast client would hand it over
    let last_date = history.last().map(|r| r.date).unwrap_or_default();
    let outlook: Vec<OutlookDay> = (1..=7)
        .map(|i| {
            let date = last_date + Duration::days(i);
            match i {
                3 => OutlookDay::new(date, 27.5, 0.0, "Clear"),
                5 => OutlookDay::new(date, 16.0, 7.5, "Rain"),
                _ => OutlookDay::new(date, 21.0, 0.0, "Clouds"),
            }
        })
        .collect();

    let plan = project_orders(&model, report.mae, &outlook, 0.35)?;

    println!("Order plan for the next 7 days:");
    println!("  Day        Date        P50   P90   Temp   Weather  Cost");
    for day in plan.days() {
        println!(
            "  {:<9} {}  {:>5} {:>5}  {:>4.1}C  {:<7} {:>6.2}",
            day.day_name,
            day.date,
            day.predicted_buns,
            day.safety_stock_buns,
            day.temperature,
            day.conditions,
            day.estimated_cost
        );
    }
    println!(
        "\nWeek totals: {} buns (P50), {} buns (P90), {:.2} cost",
        plan.total_buns(),
        plan.total_safety_stock_buns(),
        plan.total_cost()
    );

    Ok(())
}

/// Synthetic daily history with weekend, growth and weather effects
fn sample_history(days: usize) -> Vec<DailyBunRecord> {
    let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    let noise = Normal::new(0.0, 12.0).unwrap();

    (0..days)
        .map(|i| {
            let date = start + Duration::days(i as i64);
            let day_of_year = date.ordinal() as f64;

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
