//! Error types for the collaborator boundary.
//!
//! The computation engines never return errors: missing history degrades to
//! zero or `None` per field. These variants cover loading data and
//! configuration around them.

/// Top-level error type for pegtrack.
#[derive(Debug, thiserror::Error)]
pub enum PegtrackError {
    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("data parse error in {file}: {reason}")]
    DataParse { file: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error(transparent)]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PegtrackError {
    pub fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        PegtrackError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&PegtrackError> for std::process::ExitCode {
    fn from(err: &PegtrackError) -> Self {
        let code: u8 = match err {
            PegtrackError::Io(_) | PegtrackError::Serialize(_) => 1,
            PegtrackError::ConfigParse { .. }
            | PegtrackError::ConfigMissing { .. }
            | PegtrackError::ConfigInvalid { .. } => 2,
            PegtrackError::DataSource { .. } | PegtrackError::DataParse { .. } => 3,
            PegtrackError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
