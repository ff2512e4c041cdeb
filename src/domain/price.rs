//! Daily price point as delivered by the price-history provider.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day for one instrument. Every numeric field may be absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<i64>,
}

impl PricePoint {
    /// A point carrying only a close, as most callers supply.
    pub fn from_close(date: NaiveDate, close: f64) -> Self {
        PricePoint {
            date,
            open: None,
            high: None,
            low: None,
            close: Some(close),
            volume: None,
        }
    }

    /// Close with a missing value read as 0.
    pub fn close_or_zero(&self) -> f64 {
        self.close.unwrap_or(0.0)
    }

    /// Close only when it is present and strictly positive.
    pub fn tradable_close(&self) -> Option<f64> {
        self.close.filter(|c| *c > 0.0)
    }
}
