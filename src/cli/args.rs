//! CLI argument definitions using clap derive
//!
//! Defines all command-line arguments and subcommands.

use crate::cli::flags::ConfigFlags;
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Time-travel through your cluster
#[derive(Parser, Debug)]
#[command(name = "history")]
#[command(long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub config_flags: ConfigFlags,

    /// Log level verbosity
    #[arg(short = 'v', long = "v", global = true, value_name = "LEVEL", default_value_t = 0)]
    pub verbosity: u8,

    /// Path to the kubectl-history configuration file
    #[arg(long, global = true, env = "KUBECTL_HISTORY_CONFIG", value_name = "PATH")]
    pub history_config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log level selected by `-v`, if any
    ///
    /// Without `-v` the `RUST_LOG` environment variable decides.
    pub fn log_level(&self) -> Option<LevelFilter> {
        match self.verbosity {
            0 => None,
            1..=3 => Some(LevelFilter::Info),
            4 | 5 => Some(LevelFilter::Debug),
            _ => Some(LevelFilter::Trace),
        }
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare two revisions of a workload
    Diff(DiffArgs),

    /// List the revisions of a workload or show a single revision
    Get(GetArgs),

    /// Print the version of kubectl-history
    #[command(
        long_about = "The version command prints the source version that was used to build the binary.\n\
            Note that the version string's format can be different depending on how the binary was built.\n\
            E.g., release builds inject the version via KUBECTL_HISTORY_VERSION at compile time, while\n\
            other builds report the crate's package version."
    )]
    Version,

    /// Generate the autocompletion script for the specified shell
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for the diff command
#[derive(Parser, Debug)]
#[command(
    after_help = "Examples:\n  \
        # Compare the previous and the latest revision\n  \
        kubectl history diff deployment nginx\n\n  \
        # Compare revision 3 with the revision before it\n  \
        kubectl history diff sts/web 3\n\n  \
        # Compare two revisions; 0 is the latest, -1 the one before it\n  \
        kubectl history diff ds agent 2 -1"
)]
pub struct DiffArgs {
    /// TYPE NAME [REVISION_A [REVISION_B]] or TYPE/NAME [REVISION_A [REVISION_B]]
    #[arg(required = true, num_args = 1..=4, allow_negative_numbers = true, value_name = "ARGS")]
    pub args: Vec<String>,

    /// Number of unchanged lines shown around each change
    #[arg(short = 'U', long)]
    pub context_lines: Option<usize>,

    /// When to colorize the diff
    #[arg(long, value_enum)]
    pub color: Option<ColorMode>,
}

/// Arguments for the get command
#[derive(Parser, Debug)]
#[command(
    after_help = "Examples:\n  \
        # List all revisions of a deployment\n  \
        kubectl history get deploy nginx\n\n  \
        # Show the pod template of the latest revision\n  \
        kubectl history get deploy nginx 0 -o yaml"
)]
pub struct GetArgs {
    /// TYPE NAME [REVISION] or TYPE/NAME [REVISION]
    #[arg(required = true, num_args = 1..=3, allow_negative_numbers = true, value_name = "ARGS")]
    pub args: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,
}

/// Output format
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Table with additional columns
    Wide,
    /// YAML documents including the pod templates
    Yaml,
    /// JSON including the pod templates
    Json,
    /// Resource names only
    Name,
}

/// Color mode
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Colorize when writing to a terminal
    #[default]
    Auto,
    /// Always colorize
    Always,
    /// Never colorize
    Never,
}

impl ColorMode {
    /// Whether to colorize, given whether the target allows color
    pub fn enabled(self, allowed: bool) -> bool {
        match self {
            ColorMode::Auto => allowed,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}
