//! Configuration file
//!
//! ```json
//! {
//!   "storage": "file",
//!   "data_path": "cabinet.db",
//!   "validation": "default",
//!   "rules": null,
//!   "log_filter": "warn"
//! }
//! ```
//!
//! Every key is optional. A missing file means all defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use super::errors::{CliError, CliResult};
use crate::validation::{ValidationPipeline, ValidationProfile, ValidationRules};

/// Which backend commands run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Slot file at `data_path`
    #[default]
    File,
    /// In-memory store loaded from and saved to a JSON-lines snapshot at
    /// `data_path`
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageKind,

    #[serde(default = "default_data_path")]
    pub data_path: String,

    /// Named rule set, used when `rules` is absent
    #[serde(default)]
    pub validation: ValidationProfile,

    /// Explicit thresholds; missing keys fall back to the default rule set
    #[serde(default)]
    pub rules: Option<ValidationRules>,

    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_data_path() -> String {
    "cabinet.db".to_string()
}

fn default_log_filter() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageKind::default(),
            data_path: default_data_path(),
            validation: ValidationProfile::default(),
            rules: None,
            log_filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Load configuration from file, or defaults if the file does not exist
    pub fn load(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> CliResult<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> CliResult<()> {
        if self.data_path.trim().is_empty() {
            return Err(CliError::config_error("data_path must not be empty"));
        }

        EnvFilter::try_new(&self.log_filter).map_err(|e| {
            CliError::config_error(format!("Invalid log_filter '{}': {}", self.log_filter, e))
        })?;

        let rules = self.effective_rules();
        if rules.first_name.min > rules.first_name.max
            || rules.last_name.min > rules.last_name.max
            || rules.height.min > rules.height.max
            || rules.salary.min > rules.salary.max
            || rules
                .date_of_birth
                .to
                .map_or(false, |to| rules.date_of_birth.from > to)
        {
            return Err(CliError::config_error("rules: a minimum exceeds its maximum"));
        }
        if rules.sex.is_empty() {
            return Err(CliError::config_error("rules: sex must allow at least one value"));
        }

        Ok(())
    }

    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_path)
    }

    pub fn effective_rules(&self) -> ValidationRules {
        self.rules
            .clone()
            .unwrap_or_else(|| self.validation.rules())
    }

    pub fn validator(&self) -> ValidationPipeline {
        ValidationPipeline::from_rules(&self.effective_rules())
    }
}
