//! Command handlers
//!
//! Each command handler orchestrates the execution of a CLI command.

pub mod diff;
pub mod get;
pub mod version;

pub use diff::run_diff;
pub use get::run_get;
pub use version::run_version;
