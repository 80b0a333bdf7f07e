//! Ordered price series used as forecasting history

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single dated price observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Calendar date of the observation
    pub date: NaiveDate,
    /// Price on that date, finite and non-negative
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

fn check_price(date: NaiveDate, price: f64) -> Result<()> {
    if !price.is_finite() {
        return Err(ForecastError::ValidationError(format!(
            "Price for {} is not finite",
            date
        )));
    }
    if price < 0.0 {
        return Err(ForecastError::ValidationError(format!(
            "Price for {} is negative ({})",
            date, price
        )));
    }
    Ok(())
}

/// Chronologically ordered price series with unique dates.
///
/// Dates need not be contiguous. Lag and rolling features index the series
/// by position, so a gap in the calendar is invisible to them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Create an empty series
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Build a series from points in any order.
    ///
    /// Points are sorted by date. Duplicate dates and negative or non-finite
    /// prices are rejected.
    pub fn from_points(mut points: Vec<PricePoint>) -> Result<Self> {
        for point in &points {
            check_price(point.date, point.price)?;
        }

        points.sort_by_key(|p| p.date);

        if let Some(pair) = points.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(ForecastError::ValidationError(format!(
                "Duplicate date {} in price series",
                pair[0].date
            )));
        }

        Ok(Self { points })
    }

    /// Build a series from `(date, price)` pairs
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self::from_points(
            pairs
                .into_iter()
                .map(|(date, price)| PricePoint::new(date, price))
                .collect(),
        )
    }

    /// Append a point after the current last date
    pub fn push(&mut self, date: NaiveDate, price: f64) -> Result<()> {
        check_price(date, price)?;

        if let Some(last) = self.last_date() {
            if date <= last {
                return Err(ForecastError::ValidationError(format!(
                    "Date {} must be after the last date in the series ({})",
                    date, last
                )));
            }
        }

        self.points.push(PricePoint::new(date, price));
        Ok(())
    }

    /// Get the points in date order
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Get the prices in date order
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    /// Get the dates in order
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Most recent date, if any
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Earliest date, if any
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    /// Price recorded on `date`
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|idx| self.points[idx].price)
    }

    /// Last `n` points (or all of them when the series is shorter)
    pub fn tail(&self, n: usize) -> &[PricePoint] {
        let start = self.points.len().saturating_sub(n);
        &self.points[start..]
    }

    /// Series without its last `n` points
    pub fn truncated(&self, n: usize) -> Self {
        let end = self.points.len().saturating_sub(n);
        Self {
            points: self.points[..end].to_vec(),
        }
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of points in the series
    pub fn len(&self) -> usize {
        self.points.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_from_points_sorts() {
        let series = PriceSeries::from_pairs(vec![(date(3), 3.0), (date(1), 1.0), (date(2), 2.0)])
            .unwrap();
        assert_eq!(series.values(), vec![1.0, 2.0, 3.0]);
        assert_eq!(series.first_date(), Some(date(1)));
        assert_eq!(series.last_date(), Some(date(3)));
    }

    #[test]
    fn test_duplicate_dates_rejected() {
        let result = PriceSeries::from_pairs(vec![(date(1), 1.0), (date(1), 2.0)]);
        assert!(matches!(result, Err(ForecastError::ValidationError(_))));
    }

    #[test]
    fn test_push_requires_later_date() {
        let mut series = PriceSeries::from_pairs(vec![(date(5), 10.0)]).unwrap();
        assert!(series.push(date(5), 11.0).is_err());
        assert!(series.push(date(4), 11.0).is_err());
        series.push(date(9), 12.0).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.get(date(9)), Some(12.0));
    }

    #[test]
    fn test_push_rejects_nan() {
        let mut series = PriceSeries::new();
        assert!(series.push(date(1), f64::NAN).is_err());
        assert!(series.is_empty());
    }

    #[test]
    fn test_negative_prices_rejected() {
        let result = PriceSeries::from_pairs(vec![(date(1), 10.0), (date(2), -500.0)]);
        assert!(matches!(result, Err(ForecastError::ValidationError(_))));

        let mut series = PriceSeries::from_pairs(vec![(date(1), 0.0)]).unwrap();
        assert!(matches!(
            series.push(date(2), -0.01),
            Err(ForecastError::ValidationError(_))
        ));
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_tail_and_truncated() {
        let series =
            PriceSeries::from_pairs((1..=5).map(|d| (date(d), d as f64))).unwrap();
        assert_eq!(series.tail(2).len(), 2);
        assert_eq!(series.tail(10).len(), 5);
        assert_eq!(series.truncated(2).values(), vec![1.0, 2.0, 3.0]);
        assert!(series.truncated(9).is_empty());
    }
}
