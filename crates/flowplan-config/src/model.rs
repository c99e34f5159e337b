use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ConfigError;

const DATA_DIR_NAME: &str = ".flowplan";

/// Planner preferences persisted as `config/config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_horizon_months_value")]
    pub default_horizon_months: u32,
    #[serde(default = "Config::default_history_capacity_value")]
    pub history_capacity: usize,
    #[serde(default)]
    pub default_starting_balance: f64,
    #[serde(default = "Config::default_log_filter_value")]
    pub log_filter: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional custom root directory for scenario data. Defaults to `~/.flowplan`.
    pub data_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_horizon_months: Self::default_horizon_months_value(),
            history_capacity: Self::default_history_capacity_value(),
            default_starting_balance: 0.0,
            log_filter: Self::default_log_filter_value(),
            data_root: None,
        }
    }
}

impl Config {
    pub fn default_horizon_months_value() -> u32 {
        12
    }

    pub fn default_history_capacity_value() -> usize {
        15
    }

    pub fn default_log_filter_value() -> String {
        "flowplan=info".into()
    }

    pub fn resolve_data_root(&self) -> PathBuf {
        if let Some(path) = &self.data_root {
            return path.clone();
        }

        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DATA_DIR_NAME)
    }

    /// Rejects values the planner cannot operate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_capacity == 0 {
            return Err(ConfigError::Invalid(
                "history_capacity must be at least 1".into(),
            ));
        }
        if !self.default_starting_balance.is_finite() {
            return Err(ConfigError::Invalid(
                "default_starting_balance must be a finite number".into(),
            ));
        }
        Ok(())
    }
}
