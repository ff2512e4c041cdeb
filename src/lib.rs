//! pegtrack: technical stats, forward PEG projection and buy-and-hold
//! portfolio backtesting over daily price and earnings-estimate history.
//!
//! Hexagonal architecture: pure computation in [`domain`], collaborator
//! traits in [`ports`], file-backed implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
