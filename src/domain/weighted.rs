//! Allocation-weighted valuation averages across a portfolio's holdings.

use serde::{Deserialize, Serialize};

/// Growth magnitudes (in percent) at or beyond this are left out of the
/// growth average.
pub const GROWTH_OUTLIER_PCT: f64 = 1000.0;

/// Valuation snapshot of one holding. Absent metrics are skipped per field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingSnapshot {
    pub allocation_pct: f64,
    pub pe: Option<f64>,
    pub peg: Option<f64>,
    #[serde(rename = "changeYTD")]
    pub change_ytd: Option<f64>,
    #[serde(rename = "change1Y")]
    pub change_1y: Option<f64>,
    pub eps_current_year: Option<f64>,
    pub eps_next_year: Option<f64>,
    /// Growth in percent; derived from the EPS pair when absent.
    pub growth_pct: Option<f64>,
}

impl HoldingSnapshot {
    /// Supplied growth, else `(next - current) / |current| * 100`, else 0.
    pub fn growth(&self) -> f64 {
        if let Some(g) = self.growth_pct {
            return g;
        }
        let current = self.eps_current_year.unwrap_or(0.0);
        let next = self.eps_next_year.unwrap_or(0.0);
        if current == 0.0 {
            return 0.0;
        }
        (next - current) / current.abs() * 100.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedAverages {
    pub avg_pe: Option<f64>,
    pub avg_growth_pct: Option<f64>,
    pub avg_peg: Option<f64>,
    #[serde(rename = "avgYTD")]
    pub avg_ytd: Option<f64>,
    #[serde(rename = "avg1Y")]
    pub avg_1y: Option<f64>,
}

#[derive(Default)]
struct Accumulator {
    weighted: f64,
    weight: f64,
}

impl Accumulator {
    fn add(&mut self, value: f64, weight: f64) {
        self.weighted += value * weight;
        self.weight += weight;
    }

    fn average(&self) -> Option<f64> {
        (self.weight > 0.0).then(|| self.weighted / self.weight)
    }
}

/// Averages over holdings with a positive allocation. P/E and PEG skip
/// zero values as well as absent ones.
pub fn weighted_averages(holdings: &[HoldingSnapshot]) -> WeightedAverages {
    let mut pe = Accumulator::default();
    let mut peg = Accumulator::default();
    let mut growth = Accumulator::default();
    let mut ytd = Accumulator::default();
    let mut one_year = Accumulator::default();

    let nonzero = |v: Option<f64>| v.filter(|x| *x != 0.0);

    for h in holdings.iter().filter(|h| h.allocation_pct > 0.0) {
        let w = h.allocation_pct;
        if let Some(v) = nonzero(h.pe) {
            pe.add(v, w);
        }
        if let Some(v) = nonzero(h.peg) {
            peg.add(v, w);
        }
        let g = h.growth();
        if g.abs() < GROWTH_OUTLIER_PCT {
            growth.add(g, w);
        }
        if let Some(v) = h.change_ytd {
            ytd.add(v, w);
        }
        if let Some(v) = h.change_1y {
            one_year.add(v, w);
        }
    }

    WeightedAverages {
        avg_pe: pe.average(),
        avg_growth_pct: growth.average(),
        avg_peg: peg.average(),
        avg_ytd: ytd.average(),
        avg_1y: one_year.average(),
    }
}
