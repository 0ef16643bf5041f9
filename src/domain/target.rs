//! Workload references parsed from positional arguments

use crate::domain::{RevisionSelector, WorkloadKind};
use crate::error::DomainError;
use std::fmt;

/// A workload whose history is inspected
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    pub kind: WorkloadKind,
    pub name: String,
}

impl Target {
    /// Create a new target
    pub fn new(kind: WorkloadKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind.resource(), self.name)
    }
}

/// Target plus revision selectors, as given on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceArgs {
    pub target: Target,
    pub revisions: Vec<RevisionSelector>,
}

impl ResourceArgs {
    /// Parse `TYPE NAME [REV...]` or `TYPE/NAME [REV...]`, accepting at most
    /// `max_revisions` revision arguments.
    pub fn parse(args: &[String], max_revisions: usize) -> Result<Self, DomainError> {
        let (target, rest) = match args {
            [] => {
                return Err(DomainError::InvalidArguments(
                    "you must specify a resource type and name".to_string(),
                ))
            }
            [first, rest @ ..] if first.contains('/') => {
                let (kind, name) = first.split_once('/').unwrap_or_default();
                (Self::target(kind, name)?, rest)
            }
            [kind, name, rest @ ..] => (Self::target(kind, name)?, rest),
            [kind] => {
                // A bare type is still validated so unsupported kinds get the better error.
                kind.parse::<WorkloadKind>()?;
                return Err(DomainError::InvalidArguments(format!(
                    "you must specify the name of the {}",
                    kind
                )));
            }
        };

        if rest.len() > max_revisions {
            return Err(DomainError::InvalidArguments(format!(
                "expected at most {} revision(s), got {}",
                max_revisions,
                rest.len()
            )));
        }

        let revisions = rest
            .iter()
            .map(|r| r.parse::<RevisionSelector>())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { target, revisions })
    }

    fn target(kind: &str, name: &str) -> Result<Target, DomainError> {
        let kind = kind.parse::<WorkloadKind>()?;
        if name.is_empty() {
            return Err(DomainError::InvalidArguments(format!(
                "you must specify the name of the {}",
                kind.resource()
            )));
        }
        Ok(Target::new(kind, name))
    }
}
