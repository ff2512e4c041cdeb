//! Buy-and-hold portfolio simulation against a benchmark.
//!
//! Shares are bought once on the common start date and held. Each benchmark
//! trading day is valued with exact-date closes; an instrument without a
//! close that day contributes nothing. Guards that fail return `None`
//! rather than partial statistics.

use crate::domain::metrics::{PortfolioStats, RISK_FREE_RATE};
use crate::domain::portfolio::{AllocationEntry, EquityPoint};
use crate::domain::price::PricePoint;
use crate::domain::series::{DateIndex, sort_by_date};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

pub const MIN_BENCHMARK_POINTS: usize = 50;
pub const MIN_CURVE_POINTS: usize = 30;

#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub start_date: NaiveDate,
    pub initial_capital: f64,
    pub risk_free_rate: f64,
}

impl BacktestConfig {
    pub fn new(start_date: NaiveDate, initial_capital: f64) -> Self {
        BacktestConfig {
            start_date,
            initial_capital,
            risk_free_rate: RISK_FREE_RATE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub instrument: String,
    pub shares: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Simulation {
    pub start_date: NaiveDate,
    pub holdings: Vec<Holding>,
    pub portfolio_curve: Vec<EquityPoint>,
    /// Benchmark rebased to initial capital on the first simulated day.
    pub benchmark_curve: Vec<EquityPoint>,
    pub stats: PortfolioStats,
}

/// Statistics only, at the fixed risk-free rate.
pub fn simulate(
    allocations: &[AllocationEntry],
    prices_by_instrument: &HashMap<String, Vec<PricePoint>>,
    benchmark: &[PricePoint],
    start_date: NaiveDate,
    initial_capital: f64,
) -> Option<PortfolioStats> {
    let config = BacktestConfig::new(start_date, initial_capital);
    run_simulation(allocations, prices_by_instrument, benchmark, &config).map(|s| s.stats)
}

pub fn run_simulation(
    allocations: &[AllocationEntry],
    prices_by_instrument: &HashMap<String, Vec<PricePoint>>,
    benchmark: &[PricePoint],
    config: &BacktestConfig,
) -> Option<Simulation> {
    if benchmark.len() < MIN_BENCHMARK_POINTS {
        debug!(
            points = benchmark.len(),
            minimum = MIN_BENCHMARK_POINTS,
            "benchmark history too short"
        );
        return None;
    }

    // Histories from the requested start; the simulation starts once every
    // instrument has data.
    let mut common_start = config.start_date;
    let mut histories: Vec<(&AllocationEntry, Vec<PricePoint>)> =
        Vec::with_capacity(allocations.len());
    for entry in allocations {
        let history: Vec<PricePoint> = prices_by_instrument
            .get(&entry.instrument)
            .map(|p| sort_by_date(p))
            .unwrap_or_default()
            .into_iter()
            .filter(|p| p.date >= config.start_date)
            .collect();
        let Some(first) = history.first() else {
            debug!(instrument = %entry.instrument, "no price history");
            return None;
        };
        common_start = common_start.max(first.date);
        histories.push((entry, history));
    }

    let bench: Vec<PricePoint> = sort_by_date(benchmark)
        .into_iter()
        .filter(|p| p.date >= common_start)
        .collect();
    let Some(anchor) = bench.first().and_then(PricePoint::tradable_close) else {
        debug!(%common_start, "benchmark has no usable close at simulation start");
        return None;
    };

    let holdings: Vec<(Holding, DateIndex)> = histories
        .iter()
        .map(|(entry, history)| {
            let index = DateIndex::from_prices(history);
            // Exact-date day-0 close; no row that day buys nothing.
            let day0 = index.close_on(common_start).filter(|c| *c > 0.0);
            let shares = match day0 {
                Some(price) => entry.fraction() * config.initial_capital / price,
                None => {
                    debug!(
                        instrument = %entry.instrument,
                        %common_start,
                        "no day-0 close, holding zero shares"
                    );
                    0.0
                }
            };
            let holding = Holding {
                instrument: entry.instrument.clone(),
                shares,
            };
            (holding, index)
        })
        .collect();

    let mut portfolio_curve = Vec::with_capacity(bench.len());
    let mut benchmark_curve = Vec::with_capacity(bench.len());
    for day in &bench {
        let value: f64 = holdings
            .iter()
            .filter_map(|(h, index)| {
                index
                    .close_on(day.date)
                    .filter(|c| *c != 0.0)
                    .map(|c| h.shares * c)
            })
            .sum();

        let Some(bench_close) = day.tradable_close() else {
            continue;
        };
        if value > 0.0 {
            portfolio_curve.push(EquityPoint {
                date: day.date,
                value,
            });
            benchmark_curve.push(EquityPoint {
                date: day.date,
                value: bench_close / anchor * config.initial_capital,
            });
        }
    }

    if portfolio_curve.len() < MIN_CURVE_POINTS {
        debug!(
            observations = portfolio_curve.len(),
            minimum = MIN_CURVE_POINTS,
            "equity curve too short"
        );
        return None;
    }

    let stats = PortfolioStats::compute(&portfolio_curve, &benchmark_curve, config.risk_free_rate);

    Some(Simulation {
        start_date: common_start,
        holdings: holdings.into_iter().map(|(h, _)| h).collect(),
        portfolio_curve,
        benchmark_curve,
        stats,
    })
}
