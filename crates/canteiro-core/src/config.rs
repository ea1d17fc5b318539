//! Configuration file (`canteiro.toml`)
//!
//! Every section has defaults, so an empty file (or no file) is valid.
//!
//! ```toml
//! [ingest]
//! placeholder_sheets = ["Planilha1", "Resumo"]
//!
//! [status]
//! behind_below = 40
//!
//! [status.thresholds.execution]
//! ahead = 90
//! on_time = 70
//!
//! [trend]
//! sample_interval_days = 10
//! horizon_days = 90
//!
//! [[budget]]
//! code = "R200-1"
//! approved = 100000
//! realized = 150000
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::budget::{BudgetEntry, BudgetTable};
use crate::status::StatusRules;
use crate::ConfigError;

/// Top-level configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ingest: IngestConfig,
    pub status: StatusRules,
    pub trend: TrendConfig,
    pub budget: Vec<BudgetEntry>,
}

impl Config {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    /// Read and parse a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Budget entries as a correlation table
    pub fn budget_table(&self) -> BudgetTable {
        BudgetTable::from(self.budget.as_slice())
    }
}

/// Sheet handling
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Sheet names never turned into projects (compared case-insensitively)
    pub placeholder_sheets: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            placeholder_sheets: vec!["Planilha1".to_string()],
        }
    }
}

/// S-curve sampling
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Days between samples
    pub sample_interval_days: u32,
    /// Minimum days past today the curve extends to
    pub horizon_days: u32,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            sample_interval_days: 10,
            horizon_days: 90,
        }
    }
}
