//! Portfolio definition and equity tracking.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Target weight of one instrument, as a percentage of initial capital.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationEntry {
    pub instrument: String,
    pub allocation_pct: f64,
}

impl AllocationEntry {
    pub fn new(instrument: impl Into<String>, allocation_pct: f64) -> Self {
        AllocationEntry {
            instrument: instrument.into(),
            allocation_pct,
        }
    }

    /// Share of initial capital as a fraction.
    pub fn fraction(&self) -> f64 {
        self.allocation_pct / 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AllocationError {
    #[error("empty token in allocation list")]
    EmptyToken,

    #[error("allocation for {0} is missing a weight (expected SYMBOL:PCT)")]
    MissingWeight(String),

    #[error("allocation for {instrument} has invalid weight {value:?}")]
    InvalidWeight { instrument: String, value: String },

    #[error("allocation for {instrument} is {pct}, expected 0 to 100")]
    OutOfRange { instrument: String, pct: f64 },

    #[error("duplicate instrument: {0}")]
    Duplicate(String),
}

/// Parses `AAPL:50, MSFT:30, NVDA:20`. Symbols are upper-cased.
/// Weights need not sum to 100.
pub fn parse_allocations(input: &str) -> Result<Vec<AllocationEntry>, AllocationError> {
    let mut entries = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(AllocationError::EmptyToken);
        }

        let (symbol, weight) = trimmed
            .split_once(':')
            .ok_or_else(|| AllocationError::MissingWeight(trimmed.to_uppercase()))?;
        let instrument = symbol.trim().to_uppercase();
        if instrument.is_empty() {
            return Err(AllocationError::EmptyToken);
        }

        let weight = weight.trim();
        let pct: f64 = weight
            .parse()
            .map_err(|_| AllocationError::InvalidWeight {
                instrument: instrument.clone(),
                value: weight.to_string(),
            })?;
        if !(0.0..=100.0).contains(&pct) {
            return Err(AllocationError::OutOfRange { instrument, pct });
        }

        if !seen.insert(instrument.clone()) {
            return Err(AllocationError::Duplicate(instrument));
        }
        entries.push(AllocationEntry::new(instrument, pct));
    }

    Ok(entries)
}

pub fn total_allocation(entries: &[AllocationEntry]) -> f64 {
    entries.iter().map(|e| e.allocation_pct).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_list() {
        let entries = parse_allocations("aapl:50, MSFT:30,nvda : 20").unwrap();
        assert_eq!(
            entries,
            vec![
                AllocationEntry::new("AAPL", 50.0),
                AllocationEntry::new("MSFT", 30.0),
                AllocationEntry::new("NVDA", 20.0),
            ]
        );
        assert!((total_allocation(&entries) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_allows_partial_total() {
        let entries = parse_allocations("SPY:40,QQQ:12.5").unwrap();
        assert!((total_allocation(&entries) - 52.5).abs() < f64::EPSILON);
        assert!((entries[1].fraction() - 0.125).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_rejects_empty_token() {
        assert_eq!(parse_allocations("AAPL:50,,MSFT:50"), Err(AllocationError::EmptyToken));
        assert_eq!(parse_allocations(":50"), Err(AllocationError::EmptyToken));
    }

    #[test]
    fn parse_rejects_missing_weight() {
        assert_eq!(
            parse_allocations("AAPL"),
            Err(AllocationError::MissingWeight("AAPL".into()))
        );
    }

    #[test]
    fn parse_rejects_bad_weight() {
        assert!(matches!(
            parse_allocations("AAPL:lots"),
            Err(AllocationError::InvalidWeight { .. })
        ));
        assert!(matches!(
            parse_allocations("AAPL:120"),
            Err(AllocationError::OutOfRange { .. })
        ));
        assert!(matches!(
            parse_allocations("AAPL:-5"),
            Err(AllocationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn parse_rejects_duplicates() {
        assert_eq!(
            parse_allocations("AAPL:50,aapl:50"),
            Err(AllocationError::Duplicate("AAPL".into()))
        );
    }
}
