//! Mock implementations for testing
//!
//! Provides an in-memory revision source for unit testing without a cluster.

use crate::cluster::RevisionSource;
use crate::domain::{Revision, RevisionList, Target};
use crate::error::ClusterError;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Mock revision source for testing
#[derive(Debug, Default)]
pub struct MockSource {
    namespace: String,
    histories: HashMap<Target, Vec<Revision>>,
    requests: Mutex<Vec<Target>>,
}

impl MockSource {
    /// Create an empty source resolving targets in `namespace`
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    /// Builder: register a workload and its revisions
    pub fn with_history(mut self, target: Target, revisions: Vec<Revision>) -> Self {
        self.histories.insert(target, revisions);
        self
    }

    /// Targets requested so far
    pub fn requests(&self) -> Vec<Target> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RevisionSource for MockSource {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn revisions(&self, target: &Target) -> Result<RevisionList, ClusterError> {
        self.requests.lock().unwrap().push(target.clone());

        self.histories
            .get(target)
            .map(|revisions| RevisionList::new(revisions.clone()))
            .ok_or_else(|| ClusterError::NotFound {
                kind: target.kind.to_string(),
                name: target.name.clone(),
                namespace: self.namespace.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WorkloadKind;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_source() {
        let target = Target::new(WorkloadKind::Deployment, "web");
        let source = MockSource::new("default").with_history(
            target.clone(),
            vec![
                Revision::new(2, "web-2", json!({})),
                Revision::new(1, "web-1", json!({})),
            ],
        );

        let revisions = source.revisions(&target).await.unwrap();
        assert_eq!(revisions.latest().unwrap().revision, 2);
        assert_eq!(source.requests(), vec![target]);
    }

    #[tokio::test]
    async fn test_mock_source_not_found() {
        let source = MockSource::new("default");
        let err = source
            .revisions(&Target::new(WorkloadKind::DaemonSet, "agent"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClusterError::NotFound { .. }));
    }
}
