//! Workload kinds that keep a revision history

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Workload resource types with a rollout history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkloadKind {
    Deployment,
    StatefulSet,
    DaemonSet,
}

impl WorkloadKind {
    /// Kind name as used in API objects
    pub const fn as_str(&self) -> &'static str {
        match self {
            WorkloadKind::Deployment => "Deployment",
            WorkloadKind::StatefulSet => "StatefulSet",
            WorkloadKind::DaemonSet => "DaemonSet",
        }
    }

    /// Lowercase resource name used in `kubectl get` style references
    pub const fn resource(&self) -> &'static str {
        match self {
            WorkloadKind::Deployment => "deployment",
            WorkloadKind::StatefulSet => "statefulset",
            WorkloadKind::DaemonSet => "daemonset",
        }
    }

    /// Resource type that stores this kind's revisions
    pub const fn revision_resource(&self) -> &'static str {
        match self {
            WorkloadKind::Deployment => "replicaset.apps",
            WorkloadKind::StatefulSet | WorkloadKind::DaemonSet => "controllerrevision.apps",
        }
    }
}

impl FromStr for WorkloadKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        let name = lower.strip_suffix(".apps").unwrap_or(&lower);

        match name {
            "deploy" | "deployment" | "deployments" => Ok(WorkloadKind::Deployment),
            "sts" | "statefulset" | "statefulsets" => Ok(WorkloadKind::StatefulSet),
            "ds" | "daemonset" | "daemonsets" => Ok(WorkloadKind::DaemonSet),
            _ => Err(DomainError::UnsupportedKind(s.to_string())),
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
