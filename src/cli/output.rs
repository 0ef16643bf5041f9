//! Output formatting utilities
//!
//! Provides table, YAML, JSON and name output for CLI commands.

use crate::cli::args::OutputFormat;
use crate::domain::{Revision, WorkloadKind};
use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

/// Output streams handed to every command
pub struct IoStreams<'a> {
    pub out: &'a mut dyn Write,
    pub err_out: &'a mut dyn Write,
}

impl<'a> IoStreams<'a> {
    pub fn new(out: &'a mut dyn Write, err_out: &'a mut dyn Write) -> Self {
        Self { out, err_out }
    }
}

/// Format and write output based on the selected format
pub fn write_output<T: Serialize + TableDisplay>(
    out: &mut dyn Write,
    data: &T,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Table => write!(out, "{}", data.to_table(false))?,
        OutputFormat::Wide => write!(out, "{}", data.to_table(true))?,
        OutputFormat::Name => write!(out, "{}", data.to_names())?,
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(data)
                .map_err(|e| AppError::Render(e.to_string()))?;
            writeln!(out, "{}", json)?;
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(data).map_err(|e| AppError::Render(e.to_string()))?;
            write!(out, "{}", yaml)?;
        }
    }

    Ok(())
}

/// Trait for types that can be displayed as a table
pub trait TableDisplay {
    /// Format as a table string; `wide` adds extra columns
    fn to_table(&self, wide: bool) -> String;

    /// Format as `resource/name` lines
    fn to_names(&self) -> String;
}

/// Revision history of one workload
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionHistory {
    pub kind: WorkloadKind,
    pub name: String,
    pub namespace: String,
    pub revisions: Vec<Revision>,
    #[serde(skip)]
    pub now: DateTime<Utc>,
}

impl TableDisplay for RevisionHistory {
    fn to_table(&self, wide: bool) -> String {
        revision_table(&self.revisions, self.now, wide)
    }

    fn to_names(&self) -> String {
        self.revisions
            .iter()
            .map(|r| format!("{}/{}\n", self.kind.revision_resource(), r.name))
            .collect()
    }
}

/// A single revision
#[derive(Debug, Clone, Serialize)]
pub struct RevisionDetail {
    #[serde(flatten)]
    pub revision: Revision,
    #[serde(skip)]
    pub kind: WorkloadKind,
    #[serde(skip)]
    pub now: DateTime<Utc>,
}

impl TableDisplay for RevisionDetail {
    fn to_table(&self, wide: bool) -> String {
        revision_table(std::slice::from_ref(&self.revision), self.now, wide)
    }

    fn to_names(&self) -> String {
        format!("{}/{}\n", self.kind.revision_resource(), self.revision.name)
    }
}

fn revision_table(revisions: &[Revision], now: DateTime<Utc>, wide: bool) -> String {
    let mut header = vec!["REVISION", "NAME", "AGE", "CHANGE-CAUSE"];
    if wide {
        header.push("IMAGES");
    }

    let rows: Vec<Vec<String>> = revisions
        .iter()
        .map(|r| {
            let mut row = vec![
                r.revision.to_string(),
                r.name.clone(),
                r.created
                    .map(|c| format_age(now - c))
                    .unwrap_or_else(|| "<unknown>".to_string()),
                r.change_cause.clone().unwrap_or_else(|| "<none>".to_string()),
            ];
            if wide {
                row.push(r.images().join(","));
            }
            row
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut output = String::new();
    let header: Vec<String> = header.iter().map(|h| h.to_string()).collect();
    for row in std::iter::once(&header).chain(rows.iter()) {
        let last = row.len() - 1;
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                if i == last {
                    cell.clone()
                } else {
                    format!("{:<width$}", cell, width = widths[i])
                }
            })
            .collect();
        output.push_str(&line.join("   "));
        output.push('\n');
    }

    output
}

/// Human-readable age in the style of `kubectl get`
pub fn format_age(age: chrono::Duration) -> String {
    let seconds = age.num_seconds().max(0);
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;
    let years = days / 365;

    if seconds < 120 {
        format!("{}s", seconds)
    } else if minutes < 10 {
        let s = seconds % 60;
        if s == 0 {
            format!("{}m", minutes)
        } else {
            format!("{}m{}s", minutes, s)
        }
    } else if hours < 3 {
        format!("{}m", minutes)
    } else if hours < 8 {
        let m = minutes % 60;
        if m == 0 {
            format!("{}h", hours)
        } else {
            format!("{}h{}m", hours, m)
        }
    } else if hours < 48 {
        format!("{}h", hours)
    } else if hours < 24 * 8 {
        let h = hours % 24;
        if h == 0 {
            format!("{}d", days)
        } else {
            format!("{}d{}h", days, h)
        }
    } else if years < 2 {
        format!("{}d", days)
    } else if years < 8 {
        let d = days % 365;
        if d == 0 {
            format!("{}y", years)
        } else {
            format!("{}y{}d", years, d)
        }
    } else {
        format!("{}y", years)
    }
}
