//! Collaborator traits the engines are driven through.

pub mod config_port;
pub mod data_port;
pub mod portfolio_port;
