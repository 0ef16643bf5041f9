//! Trait definitions for revision lookups
//!
//! These traits abstract over the cluster client to enable testing with mocks.

use crate::domain::{RevisionList, Target};
use crate::error::ClusterError;
use async_trait::async_trait;

/// Source of workload revision histories
///
/// Implemented by the kube-backed [`KubeClient`](crate::cluster::KubeClient)
/// in production and by an in-memory mock in tests.
#[async_trait]
pub trait RevisionSource: Send + Sync {
    /// Namespace the source resolves targets in
    fn namespace(&self) -> &str;

    /// Fetch all recorded revisions of `target`
    ///
    /// Returns `ClusterError::NotFound` if the workload itself does not
    /// exist. A workload without history yields an empty list.
    async fn revisions(&self, target: &Target) -> Result<RevisionList, ClusterError>;
}
