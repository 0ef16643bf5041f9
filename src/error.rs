//! Unified error types for kubectl-history
//!
//! This module defines all error types used throughout the application.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Error talking to the cluster
    #[error("{0}")]
    Cluster(#[from] ClusterError),

    /// Error from configuration parsing/validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from argument or revision validation
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Error from the diff service
    #[error("Diff failed: {0}")]
    Diff(#[from] DiffError),

    /// Serializing an object for output failed
    #[error("Failed to render output: {0}")]
    Render(String),

    /// IO error (file operations, writing output)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the cluster client layer
#[derive(Error, Debug)]
pub enum ClusterError {
    /// Kubeconfig could not be loaded or is incomplete
    #[error("Invalid kubeconfig: {0}")]
    Kubeconfig(String),

    /// A client flag had a value the client cannot use
    #[error("Invalid value for --{flag}: {message}")]
    InvalidFlag { flag: String, message: String },

    /// The workload does not exist
    #[error("{kind} \"{name}\" not found in namespace \"{namespace}\"")]
    NotFound {
        kind: String,
        name: String,
        namespace: String,
    },

    /// A revision object could not be interpreted
    #[error("Invalid revision data in {name}: {reason}")]
    InvalidRevision { name: String, reason: String },

    /// Request failed in the kube client
    #[error("Kubernetes API request failed: {0}")]
    Api(#[from] kube::Error),
}

/// Errors from argument and revision validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Resource type is not one that keeps a revision history
    #[error("Unsupported resource type: {0} (supported: deployment, statefulset, daemonset)")]
    UnsupportedKind(String),

    /// Positional resource arguments are malformed
    #[error("Invalid resource arguments: {0}")]
    InvalidArguments(String),

    /// Revision argument is not an integer
    #[error("Invalid revision: {0:?} (must be an integer)")]
    InvalidRevision(String),

    /// Requested revision does not exist
    #[error("Revision {requested} not found (available: {available})")]
    RevisionNotFound { requested: i64, available: String },

    /// Revision has no older revision to compare against
    #[error("Revision {0} has no previous revision to compare with")]
    NoPredecessor(i64),

    /// Workload has no revisions at all
    #[error("No revisions found for {0}")]
    NoRevisions(String),
}

/// Errors from configuration parsing and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Invalid config value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Errors from rendering diffs
#[derive(Error, Debug)]
pub enum DiffError {
    /// Converting a template to YAML failed
    #[error("failed to render revision as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// External diff command is empty or cannot be started
    #[error("failed to run external diff program {program:?}: {message}")]
    ExternalProgram { program: String, message: String },

    /// External diff exited with a status other than 0 or 1
    #[error("external diff program {program:?} exited with status {code}")]
    ExternalStatus { program: String, code: i32 },

    /// IO error while staging files
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Whether the error is a write to a closed pipe, e.g. output piped into `head`
    pub fn is_broken_pipe(&self) -> bool {
        let io = match self {
            AppError::Io(e) => e,
            AppError::Diff(DiffError::Io(e)) => e,
            _ => return false,
        };
        io.kind() == std::io::ErrorKind::BrokenPipe
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_display() {
        let err = DomainError::UnsupportedKind("pods".to_string());
        assert!(err.to_string().contains("pods"));
        assert!(err.to_string().contains("statefulset"));
    }

    #[test]
    fn test_not_found_display() {
        let err = ClusterError::NotFound {
            kind: "Deployment".to_string(),
            name: "nginx".to_string(),
            namespace: "default".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Deployment \"nginx\" not found in namespace \"default\""
        );
    }

    #[test]
    fn test_revision_not_found_display() {
        let err = DomainError::RevisionNotFound {
            requested: 7,
            available: "1, 2, 3".to_string(),
        };
        assert!(err.to_string().contains("Revision 7"));
        assert!(err.to_string().contains("1, 2, 3"));
    }

    #[test]
    fn test_error_conversion() {
        let domain_err = DomainError::NoPredecessor(1);
        let app_err: AppError = domain_err.into();
        assert!(matches!(app_err, AppError::Domain(_)));
    }

    #[test]
    fn test_is_broken_pipe() {
        let pipe = || std::io::Error::from(std::io::ErrorKind::BrokenPipe);

        assert!(AppError::Io(pipe()).is_broken_pipe());
        assert!(AppError::Diff(DiffError::Io(pipe())).is_broken_pipe());
        assert!(!AppError::Io(std::io::Error::from(std::io::ErrorKind::NotFound)).is_broken_pipe());
        assert!(!AppError::Domain(DomainError::NoPredecessor(1)).is_broken_pipe());
    }
}
