//! Quarterly earnings records from the earnings-estimate provider.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// One fiscal quarter. `reported_eps` is `None` until the quarter reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsRecord {
    pub fiscal_date_ending: NaiveDate,
    #[serde(rename = "estimatedEPS")]
    pub estimated_eps: Option<f64>,
    #[serde(rename = "reportedEPS")]
    pub reported_eps: Option<f64>,
}

impl EarningsRecord {
    pub fn new(
        fiscal_date_ending: NaiveDate,
        estimated_eps: Option<f64>,
        reported_eps: Option<f64>,
    ) -> Self {
        EarningsRecord {
            fiscal_date_ending,
            estimated_eps,
            reported_eps,
        }
    }

    /// Reported EPS, else the estimate, else 0.
    pub fn best_eps(&self) -> f64 {
        self.reported_eps.or(self.estimated_eps).unwrap_or(0.0)
    }

    /// Estimate with a missing value read as 0.
    pub fn estimate_or_zero(&self) -> f64 {
        self.estimated_eps.unwrap_or(0.0)
    }
}

/// Sum of the four quarters ending in calendar `year`, reported else
/// estimated. `None` unless exactly four quarters end in that year.
pub fn annual_eps(records: &[EarningsRecord], year: i32) -> Option<f64> {
    let quarters: Vec<&EarningsRecord> = records
        .iter()
        .filter(|r| r.fiscal_date_ending.year() == year)
        .collect();
    (quarters.len() == 4).then(|| quarters.iter().map(|q| q.best_eps()).sum())
}
