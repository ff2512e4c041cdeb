//! CSV file data adapter.
//!
//! One file per symbol: `{price_dir}/{SYMBOL}.csv` with
//! `date,open,high,low,close,volume` and `{earnings_dir}/{SYMBOL}.csv` with
//! `fiscal_date_ending,estimated_eps,reported_eps`. Empty cells read as null.

use crate::domain::earnings::EarningsRecord;
use crate::domain::error::PegtrackError;
use crate::domain::price::PricePoint;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct CsvAdapter {
    price_dir: PathBuf,
    earnings_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct PriceRow {
    date: NaiveDate,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct EarningsRow {
    fiscal_date_ending: NaiveDate,
    estimated_eps: Option<f64>,
    reported_eps: Option<f64>,
}

impl CsvAdapter {
    pub fn new(price_dir: PathBuf, earnings_dir: Option<PathBuf>) -> Self {
        Self {
            price_dir,
            earnings_dir,
        }
    }

    fn csv_path(dir: &Path, symbol: &str) -> PathBuf {
        dir.join(format!("{}.csv", symbol.to_uppercase()))
    }
}

fn read_rows<R: DeserializeOwned>(path: &Path) -> Result<Vec<R>, PegtrackError> {
    let content = fs::read_to_string(path).map_err(|e| PegtrackError::DataSource {
        reason: format!("failed to read {}: {}", path.display(), e),
    })?;

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    rdr.deserialize()
        .map(|row| {
            row.map_err(|e| PegtrackError::DataParse {
                file: path.display().to_string(),
                reason: e.to_string(),
            })
        })
        .collect()
}

impl DataPort for CsvAdapter {
    fn fetch_prices(&self, symbol: &str) -> Result<Vec<PricePoint>, PegtrackError> {
        let path = Self::csv_path(&self.price_dir, symbol);
        let rows: Vec<PriceRow> = read_rows(&path)?;

        let mut prices: Vec<PricePoint> = rows
            .into_iter()
            .map(|r| PricePoint {
                date: r.date,
                open: r.open,
                high: r.high,
                low: r.low,
                close: r.close,
                volume: r.volume,
            })
            .collect();
        prices.sort_by_key(|p| p.date);

        info!(symbol, points = prices.len(), "loaded price history");
        Ok(prices)
    }

    fn fetch_earnings(&self, symbol: &str) -> Result<Vec<EarningsRecord>, PegtrackError> {
        let Some(dir) = &self.earnings_dir else {
            debug!(symbol, "no earnings directory configured");
            return Ok(Vec::new());
        };
        let path = Self::csv_path(dir, symbol);
        if !path.exists() {
            debug!(symbol, path = %path.display(), "no earnings file");
            return Ok(Vec::new());
        }

        let rows: Vec<EarningsRow> = read_rows(&path)?;
        let mut records: Vec<EarningsRecord> = rows
            .into_iter()
            .map(|r| EarningsRecord::new(r.fiscal_date_ending, r.estimated_eps, r.reported_eps))
            .collect();
        records.sort_by_key(|r| r.fiscal_date_ending);

        info!(symbol, quarters = records.len(), "loaded earnings history");
        Ok(records)
    }
}
