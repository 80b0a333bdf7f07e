use chrono::{Duration, NaiveDate};
use price_forecast::models::{RandomForestRegressor, RegressionTree};
use price_forecast::{forecast, ModelArtifact, PriceSeries};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Price Forecast: Simple Forecast Example");
    println!("=======================================\n");

    // Three weeks of onion prices drifting upwards with a weekly dip
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("bad start date")?;
    let history = PriceSeries::from_pairs((0..21).map(|day| {
        let weekly_dip = if day % 7 == 6 { -40.0 } else { 0.0 };
        (start + Duration::days(day), 1500.0 + day as f64 * 12.0 + weekly_dip)
    }))?;

    // A tiny hand-made forest: split on lag_1 (feature 3) and roll_mean_7 (feature 6)
    let forest = RandomForestRegressor::new(vec![
        RegressionTree::stump(3, 1650.0, 1640.0, 1700.0),
        RegressionTree::stump(6, 1620.0, 1610.0, 1690.0),
        RegressionTree::leaf(1660.0),
    ])?
    .with_name("demo forest");
    let model = ModelArtifact::RandomForest(forest);

    println!("Model artifact:\n{}\n", model.to_json()?);

    let table = forecast(&model, &history, 7)?;
    println!("{:<12} {:>15}", "Date", "Predicted_Price");
    for row in table.rows() {
        println!("{:<12} {:>15.2}", row.date.to_string(), row.predicted_price);
    }

    Ok(())
}
