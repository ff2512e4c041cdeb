//! Core domain types and computation engines.

pub mod error;
pub mod price;
pub mod earnings;
pub mod series;
pub mod chart;
pub mod technical;
pub mod forward_peg;
pub mod portfolio;
pub mod metrics;
pub mod backtest;
pub mod weighted;
pub mod config_validation;
