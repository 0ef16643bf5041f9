//! Revision domain types
//!
//! A revision is one recorded version of a workload's pod template, as kept
//! by the cluster in ReplicaSets or ControllerRevisions.

use crate::error::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// One historical revision of a workload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revision {
    /// Revision number
    pub revision: i64,
    /// Name of the object holding this revision
    pub name: String,
    /// Creation time of the holding object
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    /// Value of the `kubernetes.io/change-cause` annotation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_cause: Option<String>,
    /// Pod template recorded for this revision
    pub template: Value,
}

impl Revision {
    /// Create a revision with the given number, object name and template
    pub fn new(revision: i64, name: impl Into<String>, template: Value) -> Self {
        Self {
            revision,
            name: name.into(),
            created: None,
            change_cause: None,
            template,
        }
    }

    /// Builder: set creation time
    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }

    /// Builder: set change cause
    pub fn with_change_cause(mut self, cause: impl Into<String>) -> Self {
        self.change_cause = Some(cause.into());
        self
    }

    /// Container images referenced by the template, init containers first
    pub fn images(&self) -> Vec<String> {
        let spec = &self.template["spec"];
        ["initContainers", "containers"]
            .iter()
            .filter_map(|key| spec[*key].as_array())
            .flatten()
            .filter_map(|c| c["image"].as_str())
            .map(str::to_string)
            .collect()
    }
}

/// Revisions of a single workload, ordered by ascending revision number
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RevisionList {
    revisions: Vec<Revision>,
}

impl RevisionList {
    /// Create a list, sorting by revision number
    pub fn new(mut revisions: Vec<Revision>) -> Self {
        revisions.sort_by_key(|r| r.revision);
        Self { revisions }
    }

    /// All revisions, oldest first
    pub fn revisions(&self) -> &[Revision] {
        &self.revisions
    }

    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    /// Most recent revision
    pub fn latest(&self) -> Option<&Revision> {
        self.revisions.last()
    }

    /// Revision by absolute number
    pub fn get(&self, revision: i64) -> Option<&Revision> {
        self.revisions.iter().find(|r| r.revision == revision)
    }

    /// Revision immediately older than `revision`
    pub fn predecessor(&self, revision: i64) -> Result<&Revision, DomainError> {
        let idx = self.position(revision)?;
        idx.checked_sub(1)
            .map(|i| &self.revisions[i])
            .ok_or(DomainError::NoPredecessor(revision))
    }

    /// Resolve a selector against this list
    pub fn resolve(&self, selector: RevisionSelector) -> Result<&Revision, DomainError> {
        match selector {
            RevisionSelector::Absolute(n) => self.get(n).ok_or_else(|| self.not_found(n)),
            RevisionSelector::Relative(offset) => {
                let back = offset.unsigned_abs() as usize;
                self.revisions
                    .len()
                    .checked_sub(back + 1)
                    .map(|i| &self.revisions[i])
                    .ok_or_else(|| self.not_found(offset))
            }
        }
    }

    fn position(&self, revision: i64) -> Result<usize, DomainError> {
        self.revisions
            .iter()
            .position(|r| r.revision == revision)
            .ok_or_else(|| self.not_found(revision))
    }

    fn not_found(&self, requested: i64) -> DomainError {
        let available = if self.revisions.is_empty() {
            "none".to_string()
        } else {
            self.revisions
                .iter()
                .map(|r| r.revision.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        DomainError::RevisionNotFound {
            requested,
            available,
        }
    }
}

/// Revision reference given on the command line
///
/// Positive numbers address a revision directly. Zero and negative numbers
/// count back from the latest revision: `0` is the latest, `-1` the one
/// before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionSelector {
    Absolute(i64),
    Relative(i64),
}

impl RevisionSelector {
    pub const LATEST: RevisionSelector = RevisionSelector::Relative(0);
    pub const PREVIOUS: RevisionSelector = RevisionSelector::Relative(-1);
}

impl FromStr for RevisionSelector {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: i64 = s
            .trim()
            .parse()
            .map_err(|_| DomainError::InvalidRevision(s.to_string()))?;
        Ok(if n > 0 {
            RevisionSelector::Absolute(n)
        } else {
            RevisionSelector::Relative(n)
        })
    }
}

impl fmt::Display for RevisionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevisionSelector::Absolute(n) | RevisionSelector::Relative(n) => write!(f, "{}", n),
        }
    }
}
