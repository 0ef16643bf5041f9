//! kubectl-history - revision history for cluster workloads
//!
//! This library provides the core functionality of the `kubectl history`
//! plugin: listing past revisions of Deployments, StatefulSets and
//! DaemonSets and showing diffs between them.
//!
//! # Modules
//!
//! - [`cli`]: Command-line interface definitions and root command assembly
//! - [`cluster`]: Kubernetes client, revision lookups and API warnings
//! - [`commands`]: Command handlers
//! - [`config`]: Configuration system
//! - [`domain`]: Domain models with validation
//! - [`error`]: Error types
//! - [`services`]: Diff rendering

pub mod cli;
pub mod cluster;
pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;

#[cfg(test)]
pub mod mock;

pub use error::{AppError, Result};
