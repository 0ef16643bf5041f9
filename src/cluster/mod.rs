//! Cluster access layer
//!
//! Provides trait-based abstractions over the kube client for testability.

pub mod client;
pub mod traits;
pub mod warnings;

pub use client::KubeClient;
pub use traits::RevisionSource;
pub use warnings::{WarningHandler, WarningLayer, WarningWriter, WarningWriterOptions};
