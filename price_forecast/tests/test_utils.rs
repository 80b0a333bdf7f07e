use chrono::{Duration, NaiveDate};
use pretty_assertions::assert_eq;
use price_forecast::forecast;
use price_forecast::models::LinearRegressor;
use price_forecast::utils::{future_dates, parse_date, ChartFrame, ChartRow, DateOrder};
use price_forecast::PriceSeries;
use std::fs;
use tempfile::tempdir;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn series(start: NaiveDate, prices: &[f64]) -> PriceSeries {
    PriceSeries::from_pairs(
        prices
            .iter()
            .enumerate()
            .map(|(i, p)| (start + Duration::days(i as i64), *p)),
    )
    .unwrap()
}

/// Repeats lag_1
fn echo_model() -> LinearRegressor {
    let mut coefficients = vec![0.0; 9];
    coefficients[3] = 1.0;
    LinearRegressor::new(0.0, coefficients).unwrap()
}

#[test]
fn test_future_dates_cross_month_and_leap_day() {
    assert_eq!(
        future_dates(ymd(2024, 2, 27), 4).unwrap(),
        vec![ymd(2024, 2, 28), ymd(2024, 2, 29), ymd(2024, 3, 1), ymd(2024, 3, 2)]
    );
    assert_eq!(
        future_dates(ymd(2023, 12, 31), 1).unwrap(),
        vec![ymd(2024, 1, 1)]
    );
    assert!(future_dates(ymd(2023, 12, 31), 0).unwrap().is_empty());
}

#[test]
fn test_future_dates_overflow() {
    assert!(future_dates(NaiveDate::MAX, 1).is_err());
}

#[test]
fn test_parse_date_formats() {
    let order = DateOrder::MonthFirst;
    assert_eq!(parse_date("2023-12-25", order), Some(ymd(2023, 12, 25)));
    assert_eq!(parse_date("12/25/2023", order), Some(ymd(2023, 12, 25)));
    assert_eq!(parse_date("25 Dec 2023", order), Some(ymd(2023, 12, 25)));
    assert_eq!(parse_date("December 25, 2023", order), Some(ymd(2023, 12, 25)));
    assert_eq!(parse_date("not a date", order), None);
    assert_eq!(parse_date("", order), None);
    assert_eq!(parse_date("13/13/2023", order), None);
}

#[test]
fn test_chart_frame_merges_on_date() {
    let history = series(ymd(2024, 1, 1), &[100.0, 110.0, 120.0, 130.0]);
    let table = forecast(&echo_model(), &history, 2).unwrap();

    let frame = ChartFrame::merge(&history, &table, 2);
    assert_eq!(
        frame.rows(),
        &[
            ChartRow {
                date: ymd(2024, 1, 3),
                historical_price: Some(120.0),
                predicted_price: None,
            },
            ChartRow {
                date: ymd(2024, 1, 4),
                historical_price: Some(130.0),
                predicted_price: None,
            },
            ChartRow {
                date: ymd(2024, 1, 5),
                historical_price: None,
                predicted_price: Some(130.0),
            },
            ChartRow {
                date: ymd(2024, 1, 6),
                historical_price: None,
                predicted_price: Some(130.0),
            },
        ]
    );
}

#[test]
fn test_chart_frame_window_larger_than_history() {
    let history = series(ymd(2024, 1, 1), &[100.0, 110.0]);
    let table = forecast(&echo_model(), &history, 1).unwrap();

    let frame = ChartFrame::merge(&history, &table, 90);
    assert_eq!(frame.len(), 3);
    assert_eq!(frame.rows()[0].date, ymd(2024, 1, 1));
}

#[test]
fn test_chart_frame_csv() {
    let history = series(ymd(2024, 1, 1), &[100.0, 110.0]);
    let table = forecast(&echo_model(), &history, 1).unwrap();
    let frame = ChartFrame::merge(&history, &table, 90);

    let df = frame.to_dataframe().unwrap();
    assert_eq!(df.height(), 3);
    assert_eq!(
        df.get_column_names(),
        vec!["date", "historical_price", "predicted_price"]
    );

    let dir = tempdir().unwrap();
    let path = dir.path().join("chart.csv");
    frame.write_csv(&path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("date,historical_price,predicted_price"));
    assert_eq!(lines.count(), 3);
}
