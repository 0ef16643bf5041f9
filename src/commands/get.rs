//! Get command implementation
//!
//! Lists the revisions of a workload or prints a single revision.

use crate::cli::args::{GetArgs, OutputFormat};
use crate::cli::output::{write_output, IoStreams, RevisionDetail, RevisionHistory};
use crate::cluster::RevisionSource;
use crate::domain::ResourceArgs;
use crate::error::{DomainError, Result};
use chrono::Utc;

/// Execute the get command
pub async fn run_get<S: RevisionSource>(
    source: &S,
    args: &GetArgs,
    format: OutputFormat,
    streams: &mut IoStreams<'_>,
) -> Result<()> {
    let parsed = ResourceArgs::parse(&args.args, 1)?;
    let target = parsed.target;

    log::debug!(
        "fetching revisions of {} in namespace {}",
        target,
        source.namespace()
    );
    let revisions = source.revisions(&target).await?;
    let now = Utc::now();

    if let Some(selector) = parsed.revisions.first() {
        if revisions.is_empty() {
            return Err(DomainError::NoRevisions(target.to_string()).into());
        }

        let detail = RevisionDetail {
            revision: revisions.resolve(*selector)?.clone(),
            kind: target.kind,
            now,
        };
        return write_output(&mut *streams.out, &detail, format);
    }

    if revisions.is_empty() && !matches!(format, OutputFormat::Json | OutputFormat::Yaml) {
        writeln!(
            streams.err_out,
            "No revisions found for {} in namespace {}.",
            target,
            source.namespace()
        )?;
        return Ok(());
    }

    let history = RevisionHistory {
        kind: target.kind,
        name: target.name.clone(),
        namespace: source.namespace().to_string(),
        revisions: revisions.revisions().to_vec(),
        now,
    };
    write_output(&mut *streams.out, &history, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Revision, Target, WorkloadKind};
    use crate::error::{AppError, ClusterError};
    use crate::mock::MockSource;
    use serde_json::json;

    fn get_args(args: &[&str]) -> GetArgs {
        GetArgs {
            args: args.iter().map(|s| s.to_string()).collect(),
            output: None,
        }
    }

    fn source() -> MockSource {
        MockSource::new("default").with_history(
            Target::new(WorkloadKind::Deployment, "web"),
            vec![
                Revision::new(1, "web-aaa", json!({"spec": {"containers": [{"image": "nginx:1.24"}]}})),
                Revision::new(2, "web-bbb", json!({"spec": {"containers": [{"image": "nginx:1.25"}]}}))
                    .with_change_cause("upgrade"),
            ],
        )
    }

    async fn run(
        source: &MockSource,
        args: &[&str],
        format: OutputFormat,
    ) -> (Result<()>, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = {
            let mut streams = IoStreams::new(&mut out, &mut err);
            run_get(source, &get_args(args), format, &mut streams).await
        };
        (
            result,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_get_lists_revisions() {
        let (result, out, _) = run(&source(), &["deploy", "web"], OutputFormat::Table).await;
        result.unwrap();

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("1 "));
        assert!(lines[2].contains("web-bbb"));
        assert!(lines[2].ends_with("upgrade"));
    }

    #[tokio::test]
    async fn test_get_single_revision_yaml() {
        let (result, out, _) = run(&source(), &["deployment/web", "-1"], OutputFormat::Yaml).await;
        result.unwrap();

        assert!(out.starts_with("revision: 1\n"));
        assert!(out.contains("nginx:1.24"));
        assert!(!out.contains("nginx:1.25"));
    }

    #[tokio::test]
    async fn test_get_names() {
        let (result, out, _) = run(&source(), &["deploy", "web", "2"], OutputFormat::Name).await;
        result.unwrap();
        assert_eq!(out, "replicaset.apps/web-bbb\n");
    }

    #[tokio::test]
    async fn test_get_missing_revision() {
        let (result, _, _) = run(&source(), &["deploy", "web", "9"], OutputFormat::Table).await;
        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::RevisionNotFound { requested: 9, .. }))
        ));
    }

    #[tokio::test]
    async fn test_get_empty_history() {
        let source = MockSource::new("prod")
            .with_history(Target::new(WorkloadKind::DaemonSet, "agent"), vec![]);

        let (result, out, err) = run(&source, &["ds", "agent"], OutputFormat::Table).await;
        result.unwrap();
        assert!(out.is_empty());
        assert_eq!(err, "No revisions found for daemonset/agent in namespace prod.\n");

        let (result, out, _) = run(&source, &["ds", "agent"], OutputFormat::Json).await;
        result.unwrap();
        assert!(out.contains("\"revisions\": []"));
    }

    #[tokio::test]
    async fn test_get_revision_of_empty_history() {
        let source = MockSource::new("prod")
            .with_history(Target::new(WorkloadKind::DaemonSet, "agent"), vec![]);

        let (result, out, _) = run(&source, &["ds", "agent", "0"], OutputFormat::Yaml).await;
        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::NoRevisions(_)))
        ));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_get_unknown_workload() {
        let (result, _, _) = run(&source(), &["sts", "db"], OutputFormat::Table).await;
        assert!(matches!(
            result,
            Err(AppError::Cluster(ClusterError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_get_invalid_arguments() {
        let (result, _, _) = run(&source(), &["pods", "web"], OutputFormat::Table).await;
        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::UnsupportedKind(_)))
        ));
    }
}
