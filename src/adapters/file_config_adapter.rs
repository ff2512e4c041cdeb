//! INI file configuration adapter.

use crate::domain::error::PegtrackError;
use crate::domain::portfolio::{AllocationEntry, parse_allocations};
use crate::ports::config_port::ConfigPort;
use crate::ports::portfolio_port::PortfolioPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }
}

impl PortfolioPort for FileConfigAdapter {
    fn portfolio_name(&self) -> Option<String> {
        self.get_string("portfolio", "name")
            .filter(|s| !s.trim().is_empty())
    }

    fn allocations(&self) -> Result<Vec<AllocationEntry>, PegtrackError> {
        let raw = self
            .get_string("portfolio", "allocations")
            .ok_or_else(|| PegtrackError::ConfigMissing {
                section: "portfolio".into(),
                key: "allocations".into(),
            })?;
        parse_allocations(&raw)
            .map_err(|e| PegtrackError::config_invalid("portfolio", "allocations", e.to_string()))
    }
}
