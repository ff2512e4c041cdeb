//! CLI definition and dispatch.
//!
//! Results go to stdout as JSON; progress and errors go through `tracing`
//! to stderr.

use chrono::{Datelike, NaiveDate};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, Simulation};
use crate::domain::config_validation::{
    DEFAULT_BENCHMARK, DEFAULT_INITIAL_CAPITAL, parse_start_date, validate_backtest_config,
    validate_data_config, validate_portfolio_config,
};
use crate::domain::earnings::{EarningsRecord, annual_eps};
use crate::domain::error::PegtrackError;
use crate::domain::forward_peg::{PegSeries, compute_forward_peg_series};
use crate::domain::metrics::RISK_FREE_RATE;
use crate::domain::portfolio::{AllocationEntry, total_allocation};
use crate::domain::price::PricePoint;
use crate::domain::technical::{TechnicalStats, compute_stats, compute_stats_as_of};
use crate::domain::weighted::{HoldingSnapshot, WeightedAverages, weighted_averages};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::portfolio_port::PortfolioPort;

#[derive(Parser, Debug)]
#[command(
    name = "pegtrack",
    about = "Technical stats, forward PEG and portfolio backtests"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Technical stats for one or more symbols
    Stats {
        #[arg(short, long)]
        config: PathBuf,
        /// Comma-separated symbols
        #[arg(long, value_delimiter = ',', required = true)]
        symbol: Vec<String>,
        /// Date whose calendar year counts as "current" for YTD
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Forward PEG time series for a symbol
    Peg {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
    },
    /// Buy-and-hold backtest of the configured portfolio
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Overrides [backtest] start_date
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Overrides [backtest] benchmark
        #[arg(long)]
        benchmark: Option<String>,
        /// Include the dated portfolio and benchmark equity curves
        #[arg(long)]
        curves: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Backtest output: statistics, the configured allocation and the
/// allocation-weighted valuation of the holdings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestReport {
    pub portfolio: Option<String>,
    pub benchmark: String,
    pub allocations: Vec<AllocationEntry>,
    pub total_allocation_pct: f64,
    pub valuation: WeightedAverages,
    #[serde(flatten)]
    pub simulation: Simulation,
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Stats {
            config,
            symbol,
            as_of,
        } => run_stats(&config, &symbol, as_of),
        Command::Peg { config, symbol } => run_peg(&config, &symbol),
        Command::Backtest {
            config,
            start,
            benchmark,
            curves,
        } => run_backtest(&config, start, benchmark.as_deref(), curves),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, PegtrackError> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path).map_err(|e| PegtrackError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Builds the CSV data port from `[data]`.
pub fn build_data_port(adapter: &dyn ConfigPort) -> Result<CsvAdapter, PegtrackError> {
    validate_data_config(adapter)?;
    let price_dir = adapter
        .get_string("data", "price_dir")
        .map(PathBuf::from)
        .ok_or_else(|| PegtrackError::ConfigMissing {
            section: "data".into(),
            key: "price_dir".into(),
        })?;
    let earnings_dir = adapter
        .get_string("data", "earnings_dir")
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from);
    Ok(CsvAdapter::new(price_dir, earnings_dir))
}

/// Builds the simulation config from `[backtest]`. `start_override` replaces
/// the configured start date, which then need not be present.
pub fn build_backtest_config(
    adapter: &dyn ConfigPort,
    start_override: Option<NaiveDate>,
) -> Result<BacktestConfig, PegtrackError> {
    let start_date = match start_override {
        Some(date) => date,
        None => {
            validate_backtest_config(adapter)?;
            parse_start_date(adapter)?
        }
    };

    let initial_capital = adapter.get_double("backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL);
    if initial_capital <= 0.0 {
        return Err(PegtrackError::config_invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    let risk_free_rate = adapter.get_double("backtest", "risk_free_rate", RISK_FREE_RATE);
    if !(0.0..1.0).contains(&risk_free_rate) {
        return Err(PegtrackError::config_invalid(
            "backtest",
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }

    Ok(BacktestConfig {
        start_date,
        initial_capital,
        risk_free_rate,
    })
}

pub fn resolve_benchmark(override_symbol: Option<&str>, adapter: &dyn ConfigPort) -> String {
    override_symbol
        .map(str::to_string)
        .or_else(|| adapter.get_string("backtest", "benchmark"))
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BENCHMARK.to_string())
        .trim()
        .to_uppercase()
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), PegtrackError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

fn run_stats(
    config_path: &Path,
    symbols: &[String],
    as_of: Option<NaiveDate>,
) -> Result<(), PegtrackError> {
    let adapter = load_config(config_path)?;
    let data_port = build_data_port(&adapter)?;
    let stats = run_stats_pipeline(&data_port, symbols, as_of)?;
    print_json(&stats)
}

/// Stats per symbol, in the order given. A symbol without prices is an error.
pub fn run_stats_pipeline(
    data_port: &dyn DataPort,
    symbols: &[String],
    as_of: Option<NaiveDate>,
) -> Result<Vec<TechnicalStats>, PegtrackError> {
    let mut results = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let symbol = symbol.trim().to_uppercase();
        let prices = data_port.fetch_prices(&symbol)?;
        let stats = match as_of {
            Some(date) => compute_stats_as_of(&symbol, &prices, date),
            None => compute_stats(&symbol, &prices),
        };
        results.push(stats.ok_or(PegtrackError::NoData { symbol })?);
    }
    Ok(results)
}

fn run_peg(config_path: &Path, symbol: &str) -> Result<(), PegtrackError> {
    let adapter = load_config(config_path)?;
    let data_port = build_data_port(&adapter)?;
    let series = run_peg_pipeline(&data_port, symbol)?;
    print_json(&series)
}

pub fn run_peg_pipeline(data_port: &dyn DataPort, symbol: &str) -> Result<PegSeries, PegtrackError> {
    let symbol = symbol.trim().to_uppercase();
    let prices = data_port.fetch_prices(&symbol)?;
    if prices.is_empty() {
        return Err(PegtrackError::NoData { symbol });
    }
    let earnings = data_port.fetch_earnings(&symbol)?;
    if earnings.is_empty() {
        warn!(symbol = %symbol, "no earnings history, forward PEG will be empty");
    }
    Ok(compute_forward_peg_series(&symbol, &prices, &earnings))
}

fn run_backtest(
    config_path: &Path,
    start_override: Option<NaiveDate>,
    benchmark_override: Option<&str>,
    include_curves: bool,
) -> Result<(), PegtrackError> {
    let adapter = load_config(config_path)?;
    let bt_config = build_backtest_config(&adapter, start_override)?;
    validate_portfolio_config(&adapter)?;
    let allocations = adapter.allocations()?;
    let benchmark = resolve_benchmark(benchmark_override, &adapter);
    let data_port = build_data_port(&adapter)?;

    let mut report = run_backtest_pipeline(
        &data_port,
        adapter.portfolio_name(),
        &allocations,
        &benchmark,
        &bt_config,
    )?;

    let stats = &report.simulation.stats;
    info!(
        cagr = stats.cagr,
        sharpe = stats.sharpe,
        max_drawdown_pct = stats.max_drawdown_pct,
        "backtest complete"
    );

    if !include_curves {
        report.simulation.portfolio_curve.clear();
        report.simulation.benchmark_curve.clear();
    }
    print_json(&report)
}

/// Loads every allocated instrument and the benchmark, simulates, and values
/// the holdings. An instrument whose history cannot be loaded is skipped with
/// a warning; the simulation then has no result and this returns `NoData`.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    portfolio_name: Option<String>,
    allocations: &[AllocationEntry],
    benchmark: &str,
    bt_config: &BacktestConfig,
) -> Result<BacktestReport, PegtrackError> {
    let total = total_allocation(allocations);
    if (total - 100.0).abs() > 1e-6 {
        warn!(total, "allocations do not sum to 100%, remainder stays uninvested");
    }

    let mut prices_by_instrument = HashMap::new();
    let mut snapshots = Vec::with_capacity(allocations.len());
    for alloc in allocations {
        let prices = match data_port.fetch_prices(&alloc.instrument) {
            Ok(p) => p,
            Err(e) => {
                warn!(symbol = %alloc.instrument, "skipping: {e}");
                continue;
            }
        };
        let earnings = data_port.fetch_earnings(&alloc.instrument).unwrap_or_else(|e| {
            warn!(symbol = %alloc.instrument, "ignoring earnings: {e}");
            Vec::new()
        });
        snapshots.push(holding_snapshot(alloc, &prices, &earnings));
        prices_by_instrument.insert(alloc.instrument.clone(), prices);
    }

    let benchmark_prices = data_port.fetch_prices(benchmark)?;
    info!(
        instruments = prices_by_instrument.len(),
        benchmark,
        start = %bt_config.start_date,
        "running backtest"
    );

    let simulation = backtest_engine::run_simulation(
        allocations,
        &prices_by_instrument,
        &benchmark_prices,
        bt_config,
    )
    .ok_or_else(|| PegtrackError::NoData {
        symbol: portfolio_name
            .clone()
            .unwrap_or_else(|| "portfolio".to_string()),
    })?;

    Ok(BacktestReport {
        portfolio: portfolio_name,
        benchmark: benchmark.to_string(),
        allocations: allocations.to_vec(),
        total_allocation_pct: total,
        valuation: weighted_averages(&snapshots),
        simulation,
    })
}

/// Valuation of one holding from its newest forward PEG point, its
/// technical stats and the calendar-year EPS around its newest price.
pub fn holding_snapshot(
    alloc: &AllocationEntry,
    prices: &[PricePoint],
    earnings: &[EarningsRecord],
) -> HoldingSnapshot {
    let series = compute_forward_peg_series(&alloc.instrument, prices, earnings);
    let latest = series.points.iter().rev().find(|p| p.forward_eps.is_some());
    let stats = compute_stats(&alloc.instrument, prices);
    let year = prices.iter().map(|p| p.date.year()).max();

    HoldingSnapshot {
        allocation_pct: alloc.allocation_pct,
        pe: latest.and_then(|p| p.forward_pe),
        peg: latest.and_then(|p| p.peg),
        growth_pct: latest.and_then(|p| p.growth_rate_pct),
        change_ytd: stats.as_ref().map(|s| s.change_ytd),
        change_1y: stats.as_ref().map(|s| s.change_1y),
        eps_current_year: year.and_then(|y| annual_eps(earnings, y)),
        eps_next_year: year.and_then(|y| annual_eps(earnings, y + 1)),
    }
}

fn run_validate(config_path: &Path) -> Result<(), PegtrackError> {
    let adapter = load_config(config_path)?;
    validate_data_config(&adapter)?;
    validate_backtest_config(&adapter)?;
    validate_portfolio_config(&adapter)?;
    let allocations = adapter.allocations()?;
    info!(
        holdings = allocations.len(),
        total_pct = total_allocation(&allocations),
        "config is valid"
    );
    Ok(())
}
