//! Raw mandi records and their per-date aggregation

use crate::error::{ForecastError, Result};
use crate::series::{PricePoint, PriceSeries};
use crate::utils::{parse_date, DateOrder};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// One market report as it appears in the source dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Date as written in the source, parsed during aggregation
    pub date: String,
    pub modal_price: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Market identifier
    pub market: String,
}

impl RawRecord {
    pub fn new(date: &str, modal_price: f64, min_price: f64, max_price: f64, market: &str) -> Self {
        Self {
            date: date.to_string(),
            modal_price: Some(modal_price),
            min_price: Some(min_price),
            max_price: Some(max_price),
            market: market.to_string(),
        }
    }
}

/// Aggregated prices for one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPrice {
    pub date: NaiveDate,
    /// Mean modal price across the day's reports
    pub avg_modal_price: f64,
    /// Mean of the reported minimum prices
    pub min_price: Option<f64>,
    /// Mean of the reported maximum prices
    pub max_price: Option<f64>,
    /// Distinct markets reporting that day
    pub num_markets: usize,
}

/// One row per date, ascending
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DailyPriceTable {
    rows: Vec<DailyPrice>,
}

/// Column positions found in the CSV header
#[derive(Debug)]
struct ColumnLayout {
    date: usize,
    modal_price: usize,
    min_price: Option<usize>,
    max_price: Option<usize>,
    market: Option<usize>,
}

/// Data loader for raw mandi price reports
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load raw records from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<RawRecord>> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            ForecastError::DataError(format!("Cannot open dataset {}: {}", path.display(), e))
        })?;
        let records = Self::from_reader(file)?;
        info!(path = %path.display(), records = records.len(), "loaded raw price records");
        Ok(records)
    }

    /// Load raw records from any CSV source with a header row
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<RawRecord>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let layout = Self::detect_columns(&headers)?;

        let mut records = Vec::new();
        for row in csv_reader.records() {
            let row = row?;
            let text = |idx: Option<usize>| idx.and_then(|i| row.get(i)).unwrap_or("");

            records.push(RawRecord {
                date: text(Some(layout.date)).to_string(),
                modal_price: parse_number(text(Some(layout.modal_price))),
                min_price: parse_number(text(layout.min_price)),
                max_price: parse_number(text(layout.max_price)),
                market: text(layout.market).to_string(),
            });
        }

        Ok(records)
    }

    /// Load a CSV file and aggregate it to one row per date
    pub fn load_daily<P: AsRef<Path>>(path: P, order: DateOrder) -> Result<DailyPriceTable> {
        let records = Self::from_csv(path)?;
        Ok(aggregate(&records, order))
    }

    fn detect_columns(headers: &csv::StringRecord) -> Result<ColumnLayout> {
        let names: Vec<String> = headers.iter().map(normalize_header).collect();
        // candidates are in priority order, so a generic `Price` only wins without `Modal_Price`
        let find = |candidates: &[&str]| {
            candidates
                .iter()
                .find_map(|c| names.iter().position(|n| n == c))
        };

        let date = find(&["date", "arrivaldate", "pricedate", "reporteddate"]).ok_or_else(|| {
            ForecastError::DataError("No date column found in data".to_string())
        })?;
        let modal_price = find(&["modalprice", "modal", "price"]).ok_or_else(|| {
            ForecastError::DataError("No modal price column found in data".to_string())
        })?;

        Ok(ColumnLayout {
            date,
            modal_price,
            min_price: find(&["minprice", "minimumprice"]),
            max_price: find(&["maxprice", "maximumprice"]),
            market: find(&["market", "marketname"]),
        })
    }
}

fn normalize_header(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '_' | ' ' | '-' | '.'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Lenient numeric cell: thousands separators allowed, empty, junk or
/// negative is missing
fn parse_number(cell: &str) -> Option<f64> {
    let cleaned: String = cell.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// Records built in code bypass `parse_number`, so screen them again
fn usable(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v >= 0.0)
}

#[derive(Debug, Default)]
struct DayAccumulator {
    modal_sum: f64,
    modal_count: usize,
    min_sum: f64,
    min_count: usize,
    max_sum: f64,
    max_count: usize,
    markets: BTreeSet<String>,
}

impl DayAccumulator {
    fn add(&mut self, record: &RawRecord) {
        if let Some(v) = usable(record.modal_price) {
            self.modal_sum += v;
            self.modal_count += 1;
        }
        if let Some(v) = usable(record.min_price) {
            self.min_sum += v;
            self.min_count += 1;
        }
        if let Some(v) = usable(record.max_price) {
            self.max_sum += v;
            self.max_count += 1;
        }
        let market = record.market.trim();
        if !market.is_empty() {
            self.markets.insert(market.to_string());
        }
    }

    fn mean(sum: f64, count: usize) -> Option<f64> {
        (count > 0).then(|| sum / count as f64)
    }

    fn finish(self, date: NaiveDate) -> Option<DailyPrice> {
        Some(DailyPrice {
            date,
            avg_modal_price: Self::mean(self.modal_sum, self.modal_count)?,
            min_price: Self::mean(self.min_sum, self.min_count),
            max_price: Self::mean(self.max_sum, self.max_count),
            num_markets: self.markets.len(),
        })
    }
}

/// Collapse raw reports into one row per date.
///
/// Records whose date cannot be parsed are dropped. Missing numeric cells are
/// left out of their mean; a date with no modal price at all is dropped.
pub fn aggregate(records: &[RawRecord], order: DateOrder) -> DailyPriceTable {
    let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();
    let mut dropped = 0usize;

    for record in records {
        match parse_date(&record.date, order) {
            Some(date) => days.entry(date).or_default().add(record),
            None => {
                debug!(date = %record.date, market = %record.market, "dropping record with unparseable date");
                dropped += 1;
            }
        }
    }

    let mut without_price = 0usize;
    let rows: Vec<DailyPrice> = days
        .into_iter()
        .filter_map(|(date, acc)| {
            let row = acc.finish(date);
            if row.is_none() {
                without_price += 1;
            }
            row
        })
        .collect();

    if dropped > 0 || without_price > 0 {
        info!(
            dropped_records = dropped,
            dates_without_price = without_price,
            "skipped unusable records during aggregation"
        );
    }

    DailyPriceTable { rows }
}

impl DailyPriceTable {
    /// Get the rows, ascending by date
    pub fn rows(&self) -> &[DailyPrice] {
        &self.rows
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of dates
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Average modal price per date as a forecasting history
    pub fn price_series(&self) -> Result<PriceSeries> {
        PriceSeries::from_points(
            self.rows
                .iter()
                .map(|r| PricePoint::new(r.date, r.avg_modal_price))
                .collect(),
        )
    }

    /// Convert to a polars DataFrame
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let dates: Vec<String> = self.rows.iter().map(|r| r.date.to_string()).collect();
        let modal: Vec<f64> = self.rows.iter().map(|r| r.avg_modal_price).collect();
        let min: Vec<Option<f64>> = self.rows.iter().map(|r| r.min_price).collect();
        let max: Vec<Option<f64>> = self.rows.iter().map(|r| r.max_price).collect();
        let markets: Vec<u64> = self.rows.iter().map(|r| r.num_markets as u64).collect();

        let df = DataFrame::new(vec![
            Series::new("date", dates),
            Series::new("avg_modal_price", modal),
            Series::new("min_price", min),
            Series::new("max_price", max),
            Series::new("num_markets", markets),
        ])?;

        Ok(df)
    }
}
