//! Domain models for kubectl-history
//!
//! Workload references, revisions and revision selectors.
//! Types are validated on construction (fail-fast pattern).

pub mod kind;
pub mod revision;
pub mod target;

pub use kind::WorkloadKind;
pub use revision::{Revision, RevisionList, RevisionSelector};
pub use target::{ResourceArgs, Target};
