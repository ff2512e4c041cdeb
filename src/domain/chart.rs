//! Compact visual summaries: a one-year price sparkline and a one-month
//! relative-rank bar strip.
//!
//! Both are derived numerically here and rendered as vector path data. The
//! caller owns the markup around the path and its colours; `Trend` and
//! `RankBar::is_max` carry the styling decisions.

use crate::domain::series::trailing;
use serde::Serialize;

pub const SPARKLINE_WIDTH: f64 = 120.0;
pub const SPARKLINE_HEIGHT: f64 = 40.0;

pub const RANK_LOOKBACK: usize = 22;
pub const RANK_MIN_POINTS: usize = 5;
pub const RANK_WIDTH: f64 = 100.0;
pub const RANK_HEIGHT: f64 = 20.0;
const RANK_MIN_BAR_HEIGHT: f64 = 2.0;
const RANK_BAR_FILL: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sparkline {
    pub width: f64,
    pub height: f64,
    pub trend: Trend,
    pub points: Vec<ChartPoint>,
    pub path: String,
}

impl Sparkline {
    pub fn is_down(&self) -> bool {
        self.trend == Trend::Down
    }
}

/// Polyline over `closes`, x spread evenly across the width and y scaled
/// between the window min (bottom) and max (top). A flat window sits at
/// mid-height. Needs at least two closes.
pub fn sparkline(closes: &[f64]) -> Option<Sparkline> {
    sparkline_sized(closes, SPARKLINE_WIDTH, SPARKLINE_HEIGHT)
}

pub fn sparkline_sized(closes: &[f64], width: f64, height: f64) -> Option<Sparkline> {
    if closes.len() < 2 {
        return None;
    }

    let (min, max) = min_max(closes);
    let range = max - min;
    let scale_x = width / (closes.len() - 1) as f64;

    let points: Vec<ChartPoint> = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let y = if range > 0.0 {
                height - (close - min) / range * height
            } else {
                height / 2.0
            };
            ChartPoint {
                x: i as f64 * scale_x,
                y,
            }
        })
        .collect();

    let trend = if closes[closes.len() - 1] < closes[0] {
        Trend::Down
    } else {
        Trend::Up
    };

    let path = points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let cmd = if i == 0 { 'M' } else { 'L' };
            format!("{}{:.1},{:.1}", cmd, p.x, p.y)
        })
        .collect::<Vec<_>>()
        .join(" ");

    Some(Sparkline {
        width,
        height,
        trend,
        points,
        path,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankBar {
    /// Position of the close inside its window, 0.0 (low) to 1.0 (high).
    pub rank: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub is_max: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankBars {
    pub width: f64,
    pub height: f64,
    pub bars: Vec<RankBar>,
    /// Bars below the window high.
    pub path: String,
    /// Bars at the window high, drawn with emphasis.
    pub highlight_path: String,
}

/// Local rank strip over the last [`RANK_LOOKBACK`] closes. Each rank is the
/// close's position between the window's own min and max, 0 on a flat window.
/// Needs at least [`RANK_MIN_POINTS`] closes in the full history.
pub fn rank_bars(closes: &[f64]) -> Option<RankBars> {
    if closes.len() < RANK_MIN_POINTS {
        return None;
    }

    let window = trailing(closes, RANK_LOOKBACK);
    let (min, max) = min_max(window);
    let range = max - min;

    let slot = RANK_WIDTH / window.len() as f64;
    let bar_width = slot * RANK_BAR_FILL;
    let offset = slot * (1.0 - RANK_BAR_FILL) / 2.0;

    let bars: Vec<RankBar> = window
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let rank = if range == 0.0 { 0.0 } else { (close - min) / range };
            let height = (rank * RANK_HEIGHT).max(RANK_MIN_BAR_HEIGHT);
            RankBar {
                rank,
                x: i as f64 * slot + offset,
                y: RANK_HEIGHT - height,
                width: bar_width,
                height,
                is_max: rank == 1.0,
            }
        })
        .collect();

    let path = bars_path(bars.iter().filter(|b| !b.is_max));
    let highlight_path = bars_path(bars.iter().filter(|b| b.is_max));

    Some(RankBars {
        width: RANK_WIDTH,
        height: RANK_HEIGHT,
        bars,
        path,
        highlight_path,
    })
}

fn bars_path<'a>(bars: impl Iterator<Item = &'a RankBar>) -> String {
    bars.map(|b| {
        format!(
            "M{:.1},{:.1}h{:.2}v{:.1}h-{:.2}Z",
            b.x, b.y, b.width, b.height, b.width
        )
    })
    .collect::<Vec<_>>()
    .join(" ")
}

fn min_max(values: &[f64]) -> (f64, f64) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (min, max)
}
