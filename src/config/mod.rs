//! Configuration system
//!
//! Handles TOML config file parsing and merging with environment and CLI
//! arguments.

pub mod builder;
pub mod file;

pub use builder::ConfigBuilder;
pub use file::ConfigFile;

use crate::cli::args::{ColorMode, OutputFormat};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Environment variable naming an external diff program, shared with `kubectl diff`
pub const EXTERNAL_DIFF_ENV: &str = "KUBECTL_EXTERNAL_DIFF";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Output settings
    pub output: OutputConfig,
    /// Diff settings
    pub diff: DiffConfig,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format of `get`
    pub format: OutputFormat,
    /// When to colorize output
    pub color: ColorMode,
}

/// Diff configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Unchanged lines shown around each change
    pub context_lines: usize,
    /// External diff command line, e.g. `dyff between --omit-header`
    pub external: Option<String>,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            context_lines: 3,
            external: None,
        }
    }
}

impl Config {
    /// Check values that cannot be expressed in the types
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(external) = &self.diff.external {
            if external.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: "diff.external".to_string(),
                    message: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }
}
