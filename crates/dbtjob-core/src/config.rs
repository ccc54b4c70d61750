//! Configuration schema (dbtjob.toml)

use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::task::TaskOptions;

/// Main configuration structure
///
/// Every field is optional in the file; command-line flags override what is set here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// dbt target passed as `--target` to every command
    #[serde(default)]
    pub target: Option<String>,

    /// Extra flags appended to every dbt command
    #[serde(default)]
    pub extra_dbt_command_options: Option<String>,

    /// Generate tasks for dbt tests
    #[serde(default = "default_true")]
    pub run_tests: bool,

    /// Options shared by every generated task
    #[serde(default)]
    pub task: TaskOptions,
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: None,
            extra_dbt_command_options: None,
            run_tests: true,
            task: TaskOptions::default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.display().to_string(), e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    IoError(String, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}
