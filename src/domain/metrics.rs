//! Risk and return statistics over a simulated equity curve.

use super::portfolio::EquityPoint;
use super::series::{mean, population_std, safe_div, simple_returns};
use serde::Serialize;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
/// Annual risk-free rate used for Sharpe and Sortino.
pub const RISK_FREE_RATE: f64 = 0.04;

/// `cagr` and `std_dev` are fractions (0.12 = 12%); `max_drawdown_pct` and
/// `change_1d` are percentages. Ratios whose denominator is zero read 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioStats {
    pub cagr: f64,
    pub std_dev: f64,
    pub max_drawdown_pct: f64,
    pub sharpe: f64,
    pub sortino: f64,
    pub correlation_to_benchmark: f64,
    #[serde(rename = "change1D")]
    pub change_1d: f64,
}

impl PortfolioStats {
    /// `portfolio` and `benchmark` must be built over the same dates; daily
    /// returns are paired by index.
    pub fn compute(portfolio: &[EquityPoint], benchmark: &[EquityPoint], risk_free_rate: f64) -> Self {
        let values: Vec<f64> = portfolio.iter().map(|p| p.value).collect();
        let bench_values: Vec<f64> = benchmark.iter().map(|p| p.value).collect();

        let returns = simple_returns(&values);
        let bench_returns = simple_returns(&bench_values);

        let cagr = compute_cagr(&values);
        let std_dev = population_std(&returns) * TRADING_DAYS_PER_YEAR.sqrt();
        let downside = downside_deviation(&returns);
        let excess = cagr - risk_free_rate;

        PortfolioStats {
            cagr,
            std_dev,
            max_drawdown_pct: compute_drawdown(&values) * 100.0,
            sharpe: safe_div(excess, std_dev),
            sortino: safe_div(excess, downside),
            correlation_to_benchmark: correlation(&returns, &bench_returns),
            change_1d: change_1d(&values),
        }
    }
}

/// `(end/start)^(1/years) - 1`, with one year = 252 observations.
fn compute_cagr(values: &[f64]) -> f64 {
    let (Some(&start), Some(&end)) = (values.first(), values.last()) else {
        return 0.0;
    };
    let years = values.len() as f64 / TRADING_DAYS_PER_YEAR;
    if start <= 0.0 || years <= 0.0 {
        return 0.0;
    }
    (end / start).powf(1.0 / years) - 1.0
}

/// Most negative `(value - peak) / peak` against the running peak. Always <= 0.
fn compute_drawdown(values: &[f64]) -> f64 {
    let Some(&first) = values.first() else {
        return 0.0;
    };

    let mut peak = first;
    let mut max_dd = 0.0_f64;
    for &value in values {
        if value > peak {
            peak = value;
        }
        if peak > 0.0 {
            let dd = (value - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Annualized downside deviation. The sum of squared negative returns is
/// divided by the count of all returns, not just the negative ones.
fn downside_deviation(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = returns.iter().map(|r| r.min(0.0).powi(2)).sum();
    (sum_sq / returns.len() as f64).sqrt() * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Pearson correlation on daily returns with population moments.
fn correlation(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }
    let (a, b) = (&a[..n], &b[..n]);
    let (mean_a, mean_b) = (mean(a), mean(b));

    let cov = a
        .iter()
        .zip(b)
        .map(|(x, y)| (x - mean_a) * (y - mean_b))
        .sum::<f64>()
        / n as f64;

    safe_div(cov, population_std(a) * population_std(b))
}

fn change_1d(values: &[f64]) -> f64 {
    match values {
        [.., prev, last] if *prev > 0.0 => (last - prev) / prev * 100.0,
        _ => 0.0,
    }
}
