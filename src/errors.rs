//! Error types for the provisioner library.
//!
//! Domain and configuration failures are fatal to a sync run and surface as
//! [`SyncError`]; remote failures are per-repository and surface as
//! [`RemoteError`]. Callers branch on variants, never on message text.

use thiserror::Error;

/// Invalid input rejected during value-object construction.
///
/// Raised while building domain entities these are fatal to the whole batch;
/// the dedicated validation pass accumulates them instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("project path cannot be empty")]
    EmptyProjectPath,

    /// The path does not have exactly one `namespace/project` separator.
    #[error("invalid project path format: {path}, expected namespace/project")]
    ProjectPathFormat { path: String },

    /// One of the two path segments is empty.
    #[error("invalid project path: {path}")]
    ProjectPathSegments { path: String },

    /// A segment contains characters outside `[A-Za-z0-9_.-]`.
    #[error("invalid characters in project path: {path}")]
    ProjectPathCharacters { path: String },

    #[error("branch name cannot be empty")]
    EmptyBranchName,

    #[error("invalid branch name '{branch}': {reason}")]
    InvalidBranchName {
        branch: String,
        reason: &'static str,
    },

    #[error("visibility must be one of: private, internal, public (got '{value}')")]
    InvalidVisibility { value: String },
}

/// Violations of the configuration aggregate's invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Two entries share the same full path. Detected at aggregate
    /// construction, before any remote call.
    #[error("configuration contains duplicate repository path: {0}")]
    DuplicatePath(String),
}

/// Tagged outcome errors for remote repository operations.
///
/// `NotFound` means the path does not exist on the remote host; `Api` covers
/// transport, protocol and unexpected failures, with the HTTP status when one
/// was received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("repository not found: {path}")]
    NotFound { path: String },

    #[error("GitLab API error: {message}")]
    Api {
        status: Option<u16>,
        message: String,
    },
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        RemoteError::Api {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

/// Fatal, batch-level sync failures.
///
/// Per-repository failures are not represented here; they are recorded in the
/// run's summary and never abort the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
