//! CLI argument parsing and output formatting
//!
//! Uses clap for ergonomic CLI argument definitions.

pub mod args;
pub mod flags;
pub mod output;
pub mod root;

pub use args::{Cli, Commands};
pub use flags::ConfigFlags;
pub use output::IoStreams;
