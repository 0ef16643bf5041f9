//! Version command implementation
//!
//! Reports the version the binary was built from.

use crate::error::Result;
use std::io::Write;

/// Version injected at build time, e.g.
/// `KUBECTL_HISTORY_VERSION=v0.3.0 cargo build --release`
const INJECTED_VERSION: Option<&str> = option_env!("KUBECTL_HISTORY_VERSION");

const PACKAGE_VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");

/// Pick the injected version if present, else the package version
pub fn resolve_version(injected: Option<&str>, package: Option<&str>) -> Option<String> {
    injected
        .filter(|v| !v.is_empty())
        .or(package.filter(|v| !v.is_empty()))
        .map(str::to_string)
}

/// Version of this binary, if known
pub fn version() -> Option<String> {
    resolve_version(INJECTED_VERSION, PACKAGE_VERSION)
}

/// Execute the version command
pub fn run_version(out: &mut dyn Write) -> Result<()> {
    write_version(out, version().as_deref())
}

fn write_version(out: &mut dyn Write, version: Option<&str>) -> Result<()> {
    match version {
        Some(v) => writeln!(out, "kubectl-history {}", v)?,
        None => writeln!(out, "could not determine build information")?,
    }
    Ok(())
}
