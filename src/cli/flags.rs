//! Kubeconfig client flags shared by every subcommand
//!
//! Mirrors the generic flags kubectl itself accepts so that
//! `kubectl history --context prod get deploy web` behaves as users expect.

use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

/// Client connection flags
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigFlags {
    /// Path to the kubeconfig file to use for CLI requests
    #[arg(long, global = true, value_name = "PATH")]
    pub kubeconfig: Option<PathBuf>,

    /// The name of the kubeconfig context to use
    #[arg(long, global = true)]
    pub context: Option<String>,

    /// The name of the kubeconfig cluster to use
    #[arg(long, global = true)]
    pub cluster: Option<String>,

    /// The name of the kubeconfig user to use
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// If present, the namespace scope for this CLI request
    #[arg(short = 'n', long, global = true)]
    pub namespace: Option<String>,

    /// The address and port of the Kubernetes API server
    #[arg(short = 's', long, global = true)]
    pub server: Option<String>,

    /// Bearer token for authentication to the API server
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Username to impersonate for the operation
    #[arg(long = "as", global = true, value_name = "USER")]
    pub impersonate: Option<String>,

    /// Group to impersonate for the operation, can be repeated
    #[arg(long = "as-group", global = true, value_name = "GROUP")]
    pub impersonate_groups: Vec<String>,

    /// Server name to use for server certificate validation
    #[arg(long, global = true)]
    pub tls_server_name: Option<String>,

    /// If true, the server's certificate will not be checked for validity
    #[arg(long, global = true)]
    pub insecure_skip_tls_verify: bool,

    /// How long to wait for a single request (e.g. 1s, 2m, 3h); 0 disables the timeout
    #[arg(long, global = true, value_parser = parse_request_timeout, value_name = "DURATION")]
    pub request_timeout: Option<Duration>,

    /// Username for basic authentication to the API server (deprecated)
    #[arg(long, global = true, hide = true)]
    pub username: Option<String>,

    /// Password for basic authentication to the API server (deprecated)
    #[arg(long, global = true, hide = true)]
    pub password: Option<String>,
}

/// Parse a kubectl-style request timeout
///
/// A bare integer is a number of seconds; anything else must carry units,
/// e.g. `250ms`, `2m` or `1m30s`.
pub fn parse_request_timeout(value: &str) -> Result<Duration, String> {
    let value = value.trim();
    if let Ok(seconds) = value.parse::<u64>() {
        return Ok(Duration::from_secs(seconds));
    }

    humantime::parse_duration(value).map_err(|e| format!("invalid duration {:?}: {}", value, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request_timeout() {
        assert_eq!(parse_request_timeout("0"), Ok(Duration::ZERO));
        assert_eq!(parse_request_timeout("30"), Ok(Duration::from_secs(30)));
        assert_eq!(parse_request_timeout("2m"), Ok(Duration::from_secs(120)));
        assert_eq!(parse_request_timeout("1h"), Ok(Duration::from_secs(3600)));
        assert_eq!(parse_request_timeout("250ms"), Ok(Duration::from_millis(250)));
    }

    #[test]
    fn test_parse_request_timeout_invalid() {
        assert!(parse_request_timeout("").is_err());
        assert!(parse_request_timeout("abc").is_err());
        assert!(parse_request_timeout("-5").is_err());
    }

    #[test]
    fn test_parse_request_timeout_compound() {
        assert_eq!(parse_request_timeout("1m30s"), Ok(Duration::from_secs(90)));
        assert_eq!(parse_request_timeout(" 45s "), Ok(Duration::from_secs(45)));
    }

    #[test]
    fn test_parse_request_timeout_overflow() {
        assert!(parse_request_timeout("9999999999999999999h").is_err());
    }
}
