//! Revision diff service
//!
//! Renders two revisions as YAML and compares them, either with the
//! built-in unified diff or with an external diff program.

use crate::domain::{Revision, Target};
use crate::error::DiffError;
use nu_ansi_term::Color;
use similar::TextDiff;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Compares revisions of one workload
#[derive(Debug, Clone)]
pub struct DiffService {
    context_lines: usize,
    color: bool,
    external: Option<String>,
}

impl DiffService {
    /// Create a service using the built-in diff
    pub fn new(context_lines: usize, color: bool) -> Self {
        Self {
            context_lines,
            color,
            external: None,
        }
    }

    /// Use an external program instead of the built-in diff
    pub fn with_external(mut self, command_line: Option<String>) -> Self {
        self.external = command_line;
        self
    }

    /// Render a revision's template as YAML
    pub fn render(revision: &Revision) -> Result<String, DiffError> {
        Ok(serde_yaml::to_string(&revision.template)?)
    }

    /// Label identifying one side of the diff
    pub fn label(target: &Target, revision: &Revision) -> String {
        format!("{} revision {} ({})", target, revision.revision, revision.name)
    }

    /// Unified diff between two revisions; empty if they are identical
    pub fn unified(
        &self,
        target: &Target,
        from: &Revision,
        to: &Revision,
    ) -> Result<String, DiffError> {
        let old = Self::render(from)?;
        let new = Self::render(to)?;
        if old == new {
            return Ok(String::new());
        }

        let diff = TextDiff::from_lines(&old, &new)
            .unified_diff()
            .context_radius(self.context_lines)
            .header(&Self::label(target, from), &Self::label(target, to))
            .to_string();

        Ok(if self.color { colorize(&diff) } else { diff })
    }

    /// Write the comparison of `from` and `to` to `out`
    pub fn write_diff(
        &self,
        out: &mut dyn Write,
        target: &Target,
        from: &Revision,
        to: &Revision,
    ) -> Result<(), DiffError> {
        match &self.external {
            Some(command_line) => self.run_external(out, command_line, target, from, to),
            None => {
                let diff = self.unified(target, from, to)?;
                out.write_all(diff.as_bytes())?;
                Ok(())
            }
        }
    }

    fn run_external(
        &self,
        out: &mut dyn Write,
        command_line: &str,
        target: &Target,
        from: &Revision,
        to: &Revision,
    ) -> Result<(), DiffError> {
        let mut parts = command_line.split_whitespace();
        let program = parts.next().ok_or_else(|| DiffError::ExternalProgram {
            program: command_line.to_string(),
            message: "empty command".to_string(),
        })?;

        let workdir = tempfile::Builder::new()
            .prefix("kubectl-history-")
            .tempdir()?;
        let from_dir = stage(workdir.path(), "from", target, from)?;
        let to_dir = stage(workdir.path(), "to", target, to)?;

        log::debug!(
            "running external diff {:?} on {} and {}",
            command_line,
            from_dir.display(),
            to_dir.display()
        );

        let output = Command::new(program)
            .args(parts)
            .arg(&from_dir)
            .arg(&to_dir)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| DiffError::ExternalProgram {
                program: program.to_string(),
                message: e.to_string(),
            })?;

        out.write_all(&output.stdout)?;

        // Exit status 1 means the inputs differ
        match output.status.code() {
            Some(0) | Some(1) => Ok(()),
            code => Err(DiffError::ExternalStatus {
                program: program.to_string(),
                code: code.unwrap_or(-1),
            }),
        }
    }
}

/// Write a revision to `<root>/<side>-revision-<n>/<resource>-<name>.yaml`
fn stage(root: &Path, side: &str, target: &Target, revision: &Revision) -> Result<PathBuf, DiffError> {
    let dir = root.join(format!("{}-revision-{}", side, revision.revision));
    std::fs::create_dir_all(&dir)?;

    let file = dir.join(format!("{}-{}.yaml", target.kind.resource(), target.name));
    std::fs::write(&file, DiffService::render(revision)?)?;

    Ok(dir)
}

fn colorize(diff: &str) -> String {
    diff.lines()
        .map(|line| {
            let styled = if line.starts_with("+++") || line.starts_with("---") {
                Color::White.bold().paint(line).to_string()
            } else if line.starts_with('+') {
                Color::Green.paint(line).to_string()
            } else if line.starts_with('-') {
                Color::Red.paint(line).to_string()
            } else if line.starts_with("@@") {
                Color::Cyan.paint(line).to_string()
            } else {
                line.to_string()
            };
            styled + "\n"
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WorkloadKind;
    use serde_json::json;

    fn target() -> Target {
        Target::new(WorkloadKind::Deployment, "web")
    }

    fn revision(n: i64, image: &str) -> Revision {
        Revision::new(
            n,
            format!("web-{}", n),
            json!({
                "metadata": {"labels": {"app": "web"}},
                "spec": {"containers": [{"name": "app", "image": image}]}
            }),
        )
    }

    #[test]
    fn test_unified_diff() {
        let service = DiffService::new(3, false);
        let diff = service
            .unified(&target(), &revision(1, "nginx:1.24"), &revision(2, "nginx:1.25"))
            .unwrap();

        assert!(diff.starts_with("--- deployment/web revision 1 (web-1)\n"));
        assert!(diff.contains("+++ deployment/web revision 2 (web-2)\n"));
        assert!(diff
            .lines()
            .any(|l| l.starts_with('-') && l.contains("image: nginx:1.24")));
        assert!(diff
            .lines()
            .any(|l| l.starts_with('+') && l.contains("image: nginx:1.25")));
        assert!(!diff.contains('\u{1b}'));
    }

    #[test]
    fn test_identical_revisions_produce_no_output() {
        let service = DiffService::new(3, true);
        let mut out = Vec::new();
        service
            .write_diff(
                &mut out,
                &target(),
                &revision(1, "nginx:1.25"),
                &revision(2, "nginx:1.25"),
            )
            .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_context_lines() {
        let narrow = DiffService::new(0, false)
            .unified(&target(), &revision(1, "a"), &revision(2, "b"))
            .unwrap();
        let wide = DiffService::new(10, false)
            .unified(&target(), &revision(1, "a"), &revision(2, "b"))
            .unwrap();

        assert!(!narrow.contains("app: web"));
        assert!(wide.contains("app: web"));
    }

    #[test]
    fn test_colorized_diff() {
        let diff = DiffService::new(3, true)
            .unified(&target(), &revision(1, "a"), &revision(2, "b"))
            .unwrap();
        assert!(diff
            .lines()
            .any(|l| l.starts_with("\u{1b}[32m+") && l.contains("image: b")));
        assert!(diff
            .lines()
            .any(|l| l.starts_with("\u{1b}[31m-") && l.contains("image: a")));
    }

    #[test]
    fn test_external_missing_program() {
        let service = DiffService::new(3, false)
            .with_external(Some("kubectl-history-no-such-diff-program".to_string()));
        let mut out = Vec::new();
        let err = service
            .write_diff(&mut out, &target(), &revision(1, "a"), &revision(2, "b"))
            .unwrap_err();
        assert!(matches!(err, DiffError::ExternalProgram { .. }));
    }

    #[cfg(unix)]
    fn script(dir: &Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-diff");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.display().to_string()
    }

    #[cfg(unix)]
    #[test]
    fn test_external_diff_receives_staged_revisions() {
        let dir = tempfile::tempdir().unwrap();
        let program = script(dir.path(), "cat \"$1\"/deployment-web.yaml \"$2\"/deployment-web.yaml\nexit 1");
        let service = DiffService::new(3, false).with_external(Some(program));

        let mut out = Vec::new();
        service
            .write_diff(&mut out, &target(), &revision(1, "a"), &revision(2, "b"))
            .unwrap();

        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("image: a"));
        assert!(output.contains("image: b"));
    }

    #[cfg(unix)]
    #[test]
    fn test_external_diff_failure_status() {
        let dir = tempfile::tempdir().unwrap();
        let program = script(dir.path(), "exit 2");
        let service = DiffService::new(3, false).with_external(Some(program));

        let err = service
            .write_diff(&mut Vec::new(), &target(), &revision(1, "a"), &revision(2, "b"))
            .unwrap_err();
        assert!(matches!(err, DiffError::ExternalStatus { code: 2, .. }));
    }
}
