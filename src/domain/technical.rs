//! Per-instrument technical statistics.
//!
//! Short histories never fail: moving averages and changes read 0 when the
//! window is not covered. That zero is part of the contract, since
//! consumers compare `price > sma` and expect a missing average to lose.

use crate::domain::chart::{self, RankBars, Sparkline};
use crate::domain::price::PricePoint;
use crate::domain::series::{pct_change, sort_by_date, trailing};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::debug;

/// Trading days treated as one year.
pub const YEAR_WINDOW: usize = 252;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalStats {
    pub instrument: String,
    #[serde(rename = "changeYTD")]
    pub change_ytd: f64,
    #[serde(rename = "change1Y")]
    pub change_1y: f64,
    #[serde(rename = "delta52wHigh")]
    pub delta_52w_high: f64,
    pub sma20: f64,
    pub sma50: f64,
    pub sma200: f64,
    /// `None` with fewer than two closes.
    #[serde(rename = "chart1Y")]
    pub chart_1y: Option<Sparkline>,
    /// `None` with fewer than five closes.
    #[serde(rename = "rsRank1M")]
    pub rs_rank_1m: Option<RankBars>,
}

/// Computes stats with the newest price date defining the current year.
/// Input order does not matter. Returns `None` for an empty history.
pub fn compute_stats(instrument: &str, prices: &[PricePoint]) -> Option<TechnicalStats> {
    let as_of = prices.iter().map(|p| p.date).max()?;
    compute_stats_as_of(instrument, prices, as_of)
}

/// Same as [`compute_stats`], with the year-to-date baseline taken from the
/// calendar year before `as_of`.
pub fn compute_stats_as_of(
    instrument: &str,
    prices: &[PricePoint],
    as_of: NaiveDate,
) -> Option<TechnicalStats> {
    if prices.is_empty() {
        debug!(instrument, "no prices, skipping technical stats");
        return None;
    }

    let sorted = sort_by_date(prices);
    let closes: Vec<f64> = sorted.iter().map(PricePoint::close_or_zero).collect();
    let recent_year = trailing(&closes, YEAR_WINDOW);

    Some(TechnicalStats {
        instrument: instrument.to_string(),
        change_ytd: change_ytd(&sorted, as_of.year()),
        change_1y: change_1y(&closes),
        delta_52w_high: delta_52w_high(&closes),
        sma20: sma(&closes, 20),
        sma50: sma(&closes, 50),
        sma200: sma(&closes, 200),
        chart_1y: chart::sparkline(recent_year),
        rs_rank_1m: chart::rank_bars(&closes),
    })
}

/// Mean of the last `n` closes; 0 when fewer than `n` exist.
pub fn sma(closes: &[f64], n: usize) -> f64 {
    if n == 0 || closes.len() < n {
        return 0.0;
    }
    trailing(closes, n).iter().sum::<f64>() / n as f64
}

/// Percent change against the close ~252 trading days back, clamped to the
/// first close on shorter histories.
pub fn change_1y(closes: &[f64]) -> f64 {
    let Some(&current) = closes.last() else {
        return 0.0;
    };
    let base = closes[closes.len().saturating_sub(YEAR_WINDOW + 1)];
    pct_change(base, current)
}

/// Percent change against the last close of `current_year - 1`. Without a
/// usable prior-year close the first close in the series is the baseline.
pub fn change_ytd(sorted: &[PricePoint], current_year: i32) -> f64 {
    let Some(last) = sorted.last() else {
        return 0.0;
    };
    let prior_year = current_year - 1;

    let mut base = sorted
        .iter()
        .rev()
        .find(|p| p.date.year() == prior_year)
        .map(PricePoint::close_or_zero)
        .unwrap_or(0.0);
    if base == 0.0 {
        base = sorted[0].close_or_zero();
    }

    pct_change(base, last.close_or_zero())
}

/// Percent distance of the last close below the max of the last 252 closes.
pub fn delta_52w_high(closes: &[f64]) -> f64 {
    let Some(&current) = closes.last() else {
        return 0.0;
    };
    let high = trailing(closes, YEAR_WINDOW)
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    pct_change(high, current)
}
