//! Utility functions for the price_forecast crate

use crate::error::{ForecastError, Result};
use crate::forecast_service::ForecastTable;
use crate::series::PriceSeries;
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

/// Preferred field order for ambiguous numeric dates such as `03/04/2024`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    /// `03/04/2024` is March 4th
    #[default]
    MonthFirst,
    /// `03/04/2024` is April 3rd
    DayFirst,
}

const ISO_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

const NAMED_MONTH_FORMATS: [&str; 11] = [
    "%d %b %Y",
    "%d %B %Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d-%b-%Y",
    "%d/%b/%Y",
    "%d %b, %Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%d-%b-%y",
    "%d %b %y",
];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Parse a date string leniently.
///
/// Returns `None` for anything that cannot be read as a calendar date. A
/// trailing time component is discarded.
pub fn parse_date(raw: &str, order: DateOrder) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    let year_first = s
        .split(|c: char| c == '-' || c == '/' || c == '.')
        .next()
        .map_or(false, |head| head.len() == 4);
    if year_first {
        for fmt in ISO_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
                return Some(date);
            }
        }
    }

    if let Some(date) = parse_numeric_date(s, order) {
        return Some(date);
    }

    for fmt in NAMED_MONTH_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    if s.contains(':') {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.date_naive());
        }
        for fmt in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(dt.date());
            }
        }
        // "31/01/2024 10:00" and similar
        let (date_part, time_part) = s.split_once(|c: char| c == ' ' || c == 'T')?;
        if time_part.contains(':') && !date_part.contains(':') {
            return parse_date(date_part, order);
        }
    }

    None
}

/// Three numeric fields separated by `/`, `-` or `.`, year last
fn parse_numeric_date(s: &str, order: DateOrder) -> Option<NaiveDate> {
    let sep = ['/', '-', '.'].into_iter().find(|c| s.contains(*c))?;
    let parts: Vec<&str> = s.split(sep).collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit())) {
        return None;
    }
    if parts[0].len() > 2 || parts[1].len() > 2 {
        return None;
    }

    let first: u32 = parts[0].parse().ok()?;
    let second: u32 = parts[1].parse().ok()?;
    let year = match parts[2].len() {
        2 => {
            let yy: i32 = parts[2].parse().ok()?;
            // POSIX %y pivot
            if yy <= 68 {
                2000 + yy
            } else {
                1900 + yy
            }
        }
        4 => parts[2].parse().ok()?,
        _ => return None,
    };

    let (preferred, fallback) = match order {
        DateOrder::MonthFirst => ((first, second), (second, first)),
        DateOrder::DayFirst => ((second, first), (first, second)),
    };

    NaiveDate::from_ymd_opt(year, preferred.0, preferred.1)
        .or_else(|| NaiveDate::from_ymd_opt(year, fallback.0, fallback.1))
}

/// Daily dates following `last_date`, one per step of the horizon
pub fn future_dates(last_date: NaiveDate, horizon: usize) -> Result<Vec<NaiveDate>> {
    (1..=horizon as u64)
        .map(|i| {
            last_date.checked_add_days(Days::new(i)).ok_or_else(|| {
                ForecastError::ValidationError(format!(
                    "Date overflow adding {} days to {}",
                    i, last_date
                ))
            })
        })
        .collect()
}

/// One date of the history/forecast chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRow {
    pub date: NaiveDate,
    pub historical_price: Option<f64>,
    pub predicted_price: Option<f64>,
}

/// Recent history merged with the forecast, ready for plotting
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartFrame {
    rows: Vec<ChartRow>,
}

impl ChartFrame {
    /// Outer-join the last `history_window_days` points of history with the
    /// forecast on date.
    pub fn merge(history: &PriceSeries, forecast: &ForecastTable, history_window_days: usize) -> Self {
        let mut merged: BTreeMap<NaiveDate, ChartRow> = BTreeMap::new();

        for point in history.tail(history_window_days) {
            merged.insert(
                point.date,
                ChartRow {
                    date: point.date,
                    historical_price: Some(point.price),
                    predicted_price: None,
                },
            );
        }

        for row in forecast.rows() {
            merged
                .entry(row.date)
                .or_insert(ChartRow {
                    date: row.date,
                    historical_price: None,
                    predicted_price: None,
                })
                .predicted_price = Some(row.predicted_price);
        }

        Self {
            rows: merged.into_values().collect(),
        }
    }

    pub fn rows(&self) -> &[ChartRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Convert to a polars DataFrame with `date`, `historical_price` and
    /// `predicted_price` columns
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let dates: Vec<String> = self.rows.iter().map(|r| r.date.to_string()).collect();
        let historical: Vec<Option<f64>> = self.rows.iter().map(|r| r.historical_price).collect();
        let predicted: Vec<Option<f64>> = self.rows.iter().map(|r| r.predicted_price).collect();

        let df = DataFrame::new(vec![
            Series::new("date", dates),
            Series::new("historical_price", historical),
            Series::new("predicted_price", predicted),
        ])?;

        Ok(df)
    }

    /// Write the frame as CSV
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut df = self.to_dataframe()?;
        let mut file = File::create(path)?;
        CsvWriter::new(&mut file).has_header(true).finish(&mut df)?;
        Ok(())
    }
}
