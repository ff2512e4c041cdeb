//! Shared time-series helpers: date ordering, exact-date lookup, trailing
//! windows and guarded arithmetic.

use crate::domain::price::PricePoint;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Copy of `prices` ordered ascending by date. Equal dates keep input order.
pub fn sort_by_date(prices: &[PricePoint]) -> Vec<PricePoint> {
    let mut sorted = prices.to_vec();
    sorted.sort_by_key(|p| p.date);
    sorted
}

/// The last `n` items, or all of them when fewer exist.
pub fn trailing<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}

/// `num / den`, or 0 when `den` is exactly zero.
pub fn safe_div(num: f64, den: f64) -> f64 {
    if den == 0.0 { 0.0 } else { num / den }
}

/// Percentage change from `base` to `current`; 0 on a zero base.
pub fn pct_change(base: f64, current: f64) -> f64 {
    safe_div(current - base, base) * 100.0
}

/// Day-over-day simple returns. Output is one shorter than the input.
pub fn simple_returns(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .map(|w| safe_div(w[1] - w[0], w[0]))
        .collect()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by N).
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Exact-date close lookup for one instrument. No interpolation between dates.
#[derive(Debug, Clone, Default)]
pub struct DateIndex {
    closes: HashMap<NaiveDate, Option<f64>>,
}

impl DateIndex {
    /// Builds the index. With duplicate dates the first occurrence wins.
    pub fn from_prices(prices: &[PricePoint]) -> Self {
        let mut closes = HashMap::with_capacity(prices.len());
        for p in prices {
            closes.entry(p.date).or_insert(p.close);
        }
        Self { closes }
    }

    /// Close on exactly `date`, if that day exists and carries a close.
    pub fn close_on(&self, date: NaiveDate) -> Option<f64> {
        self.closes.get(&date).copied().flatten()
    }
}
