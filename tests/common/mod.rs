#![allow(dead_code)]

use chrono::NaiveDate;
pub use pegtrack::domain::earnings::EarningsRecord;
use pegtrack::domain::error::PegtrackError;
pub use pegtrack::domain::price::PricePoint;
use pegtrack::ports::data_port::DataPort;
use std::cell::RefCell;
use std::collections::HashMap;

pub struct MockDataPort {
    pub prices: HashMap<String, Vec<PricePoint>>,
    pub earnings: HashMap<String, Vec<EarningsRecord>>,
    pub errors: HashMap<String, String>,
    pub fetched: RefCell<Vec<String>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            prices: HashMap::new(),
            earnings: HashMap::new(),
            errors: HashMap::new(),
            fetched: RefCell::new(Vec::new()),
        }
    }

    pub fn with_prices(mut self, symbol: &str, prices: Vec<PricePoint>) -> Self {
        self.prices.insert(symbol.to_string(), prices);
        self
    }

    pub fn with_earnings(mut self, symbol: &str, earnings: Vec<EarningsRecord>) -> Self {
        self.earnings.insert(symbol.to_string(), earnings);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_prices(&self, symbol: &str) -> Result<Vec<PricePoint>, PegtrackError> {
        self.fetched.borrow_mut().push(symbol.to_string());
        if let Some(reason) = self.errors.get(symbol) {
            return Err(PegtrackError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self.prices.get(symbol).cloned().unwrap_or_default())
    }

    fn fetch_earnings(&self, symbol: &str) -> Result<Vec<EarningsRecord>, PegtrackError> {
        Ok(self.earnings.get(symbol).cloned().unwrap_or_default())
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Consecutive calendar days from `start`, one point per close.
pub fn make_prices(start: &str, closes: &[f64]) -> Vec<PricePoint> {
    let start = date(start);
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| PricePoint::from_close(start + chrono::Duration::days(i as i64), c))
        .collect()
}

/// `n` closes rising by `step` from `base`.
pub fn linear_closes(n: usize, base: f64, step: f64) -> Vec<f64> {
    (0..n).map(|i| base + step * i as f64).collect()
}

/// `n` closes growing with a varying daily return so volatility is non-zero.
pub fn wavy_closes(n: usize, base: f64) -> Vec<f64> {
    let mut value = base;
    (0..n)
        .map(|i| {
            let v = value;
            value *= 1.0 + 0.001 * (i % 5) as f64 - 0.0015;
            v
        })
        .collect()
}

pub fn quarter(d: &str, est: Option<f64>, rep: Option<f64>) -> EarningsRecord {
    EarningsRecord::new(date(d), est, rep)
}

/// Eight reported quarters of 1.0 EPS, then 2024 quarters of 1.5 with the
/// last one still an estimate of 1.6.
pub fn earnings_history() -> Vec<EarningsRecord> {
    let mut quarters = Vec::new();
    for year in [2022, 2023] {
        for md in ["03-31", "06-30", "09-30", "12-31"] {
            quarters.push(quarter(&format!("{year}-{md}"), Some(1.0), Some(1.0)));
        }
    }
    quarters.push(quarter("2024-03-31", Some(1.4), Some(1.5)));
    quarters.push(quarter("2024-06-30", Some(1.5), Some(1.5)));
    quarters.push(quarter("2024-09-30", Some(1.5), Some(1.5)));
    quarters.push(quarter("2024-12-31", Some(1.6), None));
    quarters
}
