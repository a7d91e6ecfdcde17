//! GitLab Repository Provisioner
//!
//! Synchronizes a declarative list of repository settings (path, default
//! branch, visibility, description) against the GitLab API. The desired state
//! is read from a YAML manifest; the provisioner compares it to the remote
//! state and issues the minimal set of updates to converge them.
//!
//! ## Core Features
//!
//! - **Declarative Input**: YAML manifest of repositories and their settings
//! - **Validated Domain Model**: project paths and branch names are parsed
//!   and validated before any remote call is made
//! - **Idempotent Reconciliation**: repositories already in the desired state
//!   are skipped without mutation
//! - **Isolated Failures**: one repository's error never aborts the batch
//!
//! ## Modules
//!
//! - [`config`]: manifest input and process settings
//! - [`domain`]: value objects, repository entity and configuration aggregate
//! - [`errors`]: typed error taxonomy
//! - [`gitlab`]: remote repository port and REST adapter
//! - [`sync`]: reconciliation engine
//! - [`validate`]: structural manifest validation

pub mod config;
pub mod domain;
pub mod errors;
pub mod gitlab;
pub mod sync;
pub mod validate;

pub use config::{Manifest, RepositoryEntry, Settings};
pub use domain::{BranchName, ProjectPath, Repository, RepositoryConfiguration, Visibility};
pub use errors::{ConfigError, DomainError, RemoteError, SyncError};
pub use gitlab::{GitLabClient, RemoteRepositories};
pub use sync::{SyncEngine, SyncFailure, SyncSummary};
pub use validate::{validate, FieldError, ValidationReport};
