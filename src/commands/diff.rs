//! Diff command implementation
//!
//! Compares two revisions of a workload.

use crate::cli::args::DiffArgs;
use crate::cli::output::IoStreams;
use crate::cluster::RevisionSource;
use crate::domain::{ResourceArgs, Revision, RevisionList, RevisionSelector};
use crate::error::{DomainError, Result};
use crate::services::DiffService;

/// Execute the diff command
pub async fn run_diff<S: RevisionSource>(
    source: &S,
    args: &DiffArgs,
    service: &DiffService,
    streams: &mut IoStreams<'_>,
) -> Result<()> {
    let parsed = ResourceArgs::parse(&args.args, 2)?;
    let target = parsed.target;

    log::debug!(
        "fetching revisions of {} in namespace {}",
        target,
        source.namespace()
    );
    let revisions = source.revisions(&target).await?;
    if revisions.is_empty() {
        return Err(DomainError::NoRevisions(target.to_string()).into());
    }

    let (from, to) = select_pair(&revisions, &parsed.revisions)?;
    log::info!(
        "comparing revision {} ({}) with revision {} ({})",
        from.revision,
        from.name,
        to.revision,
        to.name
    );

    service.write_diff(&mut *streams.out, &target, from, to)?;
    Ok(())
}

/// Pick the revisions to compare
///
/// No selector compares the previous and the latest revision, a single
/// selector compares that revision with its predecessor, two selectors are
/// compared in the given order.
pub fn select_pair<'a>(
    revisions: &'a RevisionList,
    selectors: &[RevisionSelector],
) -> std::result::Result<(&'a Revision, &'a Revision), DomainError> {
    match selectors {
        [] => {
            let to = revisions.resolve(RevisionSelector::LATEST)?;
            Ok((revisions.predecessor(to.revision)?, to))
        }
        [selector] => {
            let to = revisions.resolve(*selector)?;
            Ok((revisions.predecessor(to.revision)?, to))
        }
        [from, to, ..] => Ok((revisions.resolve(*from)?, revisions.resolve(*to)?)),
    }
}
