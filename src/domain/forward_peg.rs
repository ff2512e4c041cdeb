//! Forward valuation multiples reconstructed from quarterly earnings.
//!
//! For each price date the next unreported quarter is located, and forward
//! EPS blends its estimate with the three quarters before it. A year-ago
//! trailing sum gives the growth baseline. Any ratio whose inputs are missing
//! or whose denominator is degenerate is `None`; absence is the normal
//! case for instruments with short earnings history.

use crate::domain::earnings::EarningsRecord;
use crate::domain::price::PricePoint;
use crate::domain::series::sort_by_date;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

/// Known quarters blended with the forward estimate.
const PRIOR_QUARTERS: usize = 3;
/// Quarters of history needed for the year-ago baseline.
const BASELINE_HISTORY: usize = 8;
/// Growth magnitudes at or below this leave PEG undefined.
pub const MIN_PEG_GROWTH: f64 = 0.001;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PegPoint {
    pub date: NaiveDate,
    pub price: Option<f64>,
    #[serde(rename = "forwardEPS")]
    pub forward_eps: Option<f64>,
    #[serde(rename = "forwardPE")]
    pub forward_pe: Option<f64>,
    pub growth_rate_pct: Option<f64>,
    pub peg: Option<f64>,
}

/// PEG time series for one instrument plus its headline forward EPS.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PegSeries {
    pub symbol: String,
    /// Forward EPS at the newest price date that has one.
    #[serde(rename = "currentForwardEPS")]
    pub current_forward_eps: Option<f64>,
    /// Oldest to newest.
    pub points: Vec<PegPoint>,
}

/// One point per price, oldest to newest. Prices may arrive in any order;
/// earnings are ordered by fiscal date before use.
pub fn compute_forward_peg(prices: &[PricePoint], earnings: &[EarningsRecord]) -> Vec<PegPoint> {
    let prices = sort_by_date(prices);
    let mut quarters = earnings.to_vec();
    quarters.sort_by_key(|q| q.fiscal_date_ending);

    prices.iter().map(|p| peg_point(p, &quarters)).collect()
}

pub fn compute_forward_peg_series(
    symbol: &str,
    prices: &[PricePoint],
    earnings: &[EarningsRecord],
) -> PegSeries {
    let points = compute_forward_peg(prices, earnings);
    let current_forward_eps = points.iter().rev().find_map(|p| p.forward_eps);
    if current_forward_eps.is_none() {
        debug!(
            symbol,
            quarters = earnings.len(),
            "no price date has a forward EPS"
        );
    }
    PegSeries {
        symbol: symbol.to_string(),
        current_forward_eps,
        points,
    }
}

fn peg_point(price: &PricePoint, quarters: &[EarningsRecord]) -> PegPoint {
    // Quarters ending on or before the price date; the next one is unreported.
    let next = quarters.partition_point(|q| q.fiscal_date_ending <= price.date);

    let forward_eps = forward_eps(quarters, next);
    let trailing_eps = trailing_eps(&quarters[..next]);

    let forward_pe = match (price.close, forward_eps) {
        (Some(close), Some(eps)) if eps != 0.0 => Some(close / eps),
        _ => None,
    };

    let growth = match (forward_eps, trailing_eps) {
        (Some(fwd), Some(trailing)) if trailing != 0.0 => Some(fwd / trailing - 1.0),
        _ => None,
    };

    let peg = match (forward_pe, growth) {
        (Some(pe), Some(g)) if g.abs() > MIN_PEG_GROWTH => Some(pe / (g * 100.0)),
        _ => None,
    };

    PegPoint {
        date: price.date,
        price: price.close,
        forward_eps,
        forward_pe,
        growth_rate_pct: growth.map(|g| g * 100.0),
        peg,
    }
}

/// Estimate for quarter `next` plus the three quarters before it.
fn forward_eps(quarters: &[EarningsRecord], next: usize) -> Option<f64> {
    if next >= quarters.len() || next < PRIOR_QUARTERS {
        return None;
    }
    let known: f64 = quarters[next - PRIOR_QUARTERS..next]
        .iter()
        .map(EarningsRecord::best_eps)
        .sum();
    Some(quarters[next].estimate_or_zero() + known)
}

/// Sum of the four quarters ending four to eight quarters back.
fn trailing_eps(past: &[EarningsRecord]) -> Option<f64> {
    if past.len() < BASELINE_HISTORY {
        return None;
    }
    let end = past.len() - 4;
    Some(past[end - 4..end].iter().map(EarningsRecord::best_eps).sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn quarter(d: &str, est: Option<f64>, rep: Option<f64>) -> EarningsRecord {
        EarningsRecord::new(date(d), est, rep)
    }

    /// Eight reported quarters of 1.0 EPS (2022-2023), then 2024 quarters of
    /// 1.5 with the last one still unreported.
    fn history() -> Vec<EarningsRecord> {
        vec![
            quarter("2022-03-31", Some(1.0), Some(1.0)),
            quarter("2022-06-30", Some(1.0), Some(1.0)),
            quarter("2022-09-30", Some(1.0), Some(1.0)),
            quarter("2022-12-31", Some(1.0), Some(1.0)),
            quarter("2023-03-31", Some(1.0), Some(1.0)),
            quarter("2023-06-30", Some(1.0), Some(1.0)),
            quarter("2023-09-30", Some(1.0), Some(1.0)),
            quarter("2023-12-31", Some(1.0), Some(1.0)),
            quarter("2024-03-31", Some(1.4), Some(1.5)),
            quarter("2024-06-30", Some(1.5), Some(1.5)),
            quarter("2024-09-30", Some(1.5), Some(1.5)),
            quarter("2024-12-31", Some(1.6), None),
        ]
    }

    #[test]
    fn one_point_per_price_oldest_first() {
        let prices = vec![
            PricePoint::from_close(date("2024-11-02"), 30.0),
            PricePoint::from_close(date("2024-11-01"), 29.0),
        ];
        let points = compute_forward_peg(&prices, &history());
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, date("2024-11-01"));
        assert_eq!(points[1].date, date("2024-11-02"));
    }

    #[test]
    fn forward_eps_blends_estimate_with_three_reported() {
        let prices = vec![PricePoint::from_close(date("2024-11-01"), 60.0)];
        let p = &compute_forward_peg(&prices, &history())[0];
        // 1.6 estimate + 1.5 * 3 reported
        assert_relative_eq!(p.forward_eps.unwrap(), 6.1, epsilon = 1e-9);
        assert_relative_eq!(p.forward_pe.unwrap(), 60.0 / 6.1, epsilon = 1e-9);
    }

    #[test]
    fn growth_and_peg_against_year_ago_quarters() {
        let prices = vec![PricePoint::from_close(date("2024-11-01"), 61.0)];
        let p = &compute_forward_peg(&prices, &history())[0];
        // 11 quarters known: baseline is quarters [3, 7) = 4.0
        let growth = 6.1 / 4.0 - 1.0;
        assert_relative_eq!(p.growth_rate_pct.unwrap(), growth * 100.0, epsilon = 1e-9);
        let pe = 61.0 / 6.1;
        assert_relative_eq!(p.peg.unwrap(), pe / (growth * 100.0), epsilon = 1e-9);
    }

    #[test]
    fn unreported_prior_quarter_uses_estimate() {
        let mut quarters = history();
        quarters[10].reported_eps = None;
        let prices = vec![PricePoint::from_close(date("2024-11-01"), 60.0)];
        let p = &compute_forward_peg(&prices, &quarters)[0];
        assert_relative_eq!(p.forward_eps.unwrap(), 6.1, epsilon = 1e-9);
    }

    #[test]
    fn fewer_than_three_prior_quarters_leaves_forward_eps_null() {
        let prices = vec![PricePoint::from_close(date("2022-07-15"), 20.0)];
        let p = &compute_forward_peg(&prices, &history())[0];
        assert_eq!(p.forward_eps, None);
        assert_eq!(p.forward_pe, None);
        assert_eq!(p.peg, None);
        assert_eq!(p.price, Some(20.0));
    }

    #[test]
    fn no_future_quarter_leaves_forward_eps_null() {
        let prices = vec![PricePoint::from_close(date("2025-02-01"), 20.0)];
        let p = &compute_forward_peg(&prices, &history())[0];
        assert_eq!(p.forward_eps, None);
    }

    #[test]
    fn baseline_needs_eight_quarters() {
        // 2023-08-01: 6 quarters known, forward EPS exists but no baseline.
        let prices = vec![PricePoint::from_close(date("2023-08-01"), 40.0)];
        let p = &compute_forward_peg(&prices, &history())[0];
        assert!(p.forward_eps.is_some());
        assert!(p.forward_pe.is_some());
        assert_eq!(p.growth_rate_pct, None);
        assert_eq!(p.peg, None);
    }

    #[test]
    fn flat_growth_leaves_peg_null() {
        let flat: Vec<EarningsRecord> = [
            "2022-03-31",
            "2022-06-30",
            "2022-09-30",
            "2022-12-31",
            "2023-03-31",
            "2023-06-30",
            "2023-09-30",
            "2023-12-31",
            "2024-03-31",
            "2024-06-30",
            "2024-09-30",
            "2024-12-31",
        ]
        .iter()
        .map(|d| quarter(d, Some(1.0), Some(1.0)))
        .collect();
        let prices = vec![PricePoint::from_close(date("2024-11-01"), 80.0)];
        let p = &compute_forward_peg(&prices, &flat)[0];
        assert_relative_eq!(p.growth_rate_pct.unwrap(), 0.0, epsilon = 1e-12);
        assert!(p.forward_pe.is_some());
        assert_eq!(p.peg, None);
    }

    #[test]
    fn zero_forward_eps_leaves_pe_null() {
        let quarters = vec![
            quarter("2024-03-31", None, Some(1.0)),
            quarter("2024-06-30", None, Some(-1.0)),
            quarter("2024-09-30", None, Some(0.0)),
            quarter("2024-12-31", Some(0.0), None),
        ];
        let prices = vec![PricePoint::from_close(date("2024-10-15"), 10.0)];
        let p = &compute_forward_peg(&prices, &quarters)[0];
        assert_eq!(p.forward_eps, Some(0.0));
        assert_eq!(p.forward_pe, None);
    }

    #[test]
    fn missing_close_leaves_pe_null() {
        let prices = vec![PricePoint {
            close: None,
            ..PricePoint::from_close(date("2024-11-01"), 0.0)
        }];
        let p = &compute_forward_peg(&prices, &history())[0];
        assert!(p.forward_eps.is_some());
        assert_eq!(p.price, None);
        assert_eq!(p.forward_pe, None);
        assert_eq!(p.peg, None);
    }

    #[test]
    fn no_earnings_all_null() {
        let prices = vec![
            PricePoint::from_close(date("2024-11-01"), 10.0),
            PricePoint::from_close(date("2024-11-04"), 12.0),
        ];
        let points = compute_forward_peg(&prices, &[]);
        assert_eq!(points.len(), 2);
        assert!(points.iter().all(|p| p.forward_eps.is_none() && p.peg.is_none()));
    }

    #[test]
    fn series_headline_is_newest_forward_eps() {
        let prices = vec![
            PricePoint::from_close(date("2024-05-01"), 50.0),
            PricePoint::from_close(date("2024-11-01"), 60.0),
            PricePoint::from_close(date("2025-02-01"), 70.0),
        ];
        let series = compute_forward_peg_series("ACME", &prices, &history());
        assert_eq!(series.points.len(), 3);
        // newest date has no future quarter; the one before does
        assert_relative_eq!(series.current_forward_eps.unwrap(), 6.1, epsilon = 1e-9);
    }

    #[test]
    fn price_on_fiscal_date_counts_quarter_as_past() {
        let prices = vec![PricePoint::from_close(date("2024-09-30"), 60.0)];
        let p = &compute_forward_peg(&prices, &history())[0];
        assert_relative_eq!(p.forward_eps.unwrap(), 6.1, epsilon = 1e-9);
    }
}
