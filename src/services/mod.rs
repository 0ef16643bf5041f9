//! Business logic services
//!
//! Services implement the command logic on top of domain types, independent
//! of argument parsing and output formatting.

pub mod diff;

pub use diff::DiffService;
