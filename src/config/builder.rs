//! Configuration builder
//!
//! Merges configuration from files, environment and CLI arguments.

use crate::cli::args::{ColorMode, OutputFormat};
use crate::config::{Config, ConfigFile};
use crate::error::ConfigError;
use std::path::Path;

/// Builder for merging configuration sources
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Load configuration from a file
    ///
    /// An explicit path must exist. Without one, the default locations are
    /// tried and a missing file is not an error.
    pub fn with_file(mut self, path: Option<&Path>) -> Result<Self, ConfigError> {
        let file_config = match path {
            Some(path) => Some(ConfigFile::load(path)?),
            None => ConfigFile::load_default()?,
        };

        if let Some(cfg) = file_config {
            self.config = cfg;
        }

        Ok(self)
    }

    /// Override with the external diff program from the environment
    pub fn with_external_diff(mut self, program: Option<String>) -> Self {
        if let Some(p) = program.filter(|p| !p.trim().is_empty()) {
            self.config.diff.external = Some(p);
        }
        self
    }

    /// Override with CLI color mode
    pub fn with_color(mut self, color: Option<ColorMode>) -> Self {
        if let Some(c) = color {
            self.config.output.color = c;
        }
        self
    }

    /// Override with CLI output format
    pub fn with_output_format(mut self, format: Option<OutputFormat>) -> Self {
        if let Some(f) = format {
            self.config.output.format = f;
        }
        self
    }

    /// Override with CLI context lines
    pub fn with_context_lines(mut self, lines: Option<usize>) -> Self {
        if let Some(l) = lines {
            self.config.diff.context_lines = l;
        }
        self
    }

    /// Build the final configuration
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
