//! Sync engine - reconciles the manifest against remote state.
//!
//! Repositories are processed one at a time, in manifest order. A failure on
//! one item is recorded and never aborts the batch; only invalid input
//! (malformed entries, duplicate paths) is fatal, and that is detected
//! before the first remote call.

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Manifest;
use crate::domain::{BranchName, ProjectPath, Repository, RepositoryConfiguration, Visibility};
use crate::errors::{RemoteError, SyncError};
use crate::gitlab::RemoteRepositories;

/// A per-repository failure recorded in the summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFailure {
    pub path: String,
    pub error: String,
}

/// Results from a complete sync run. Returned once per invocation and never
/// persisted.
#[derive(Debug, Clone)]
pub struct SyncSummary {
    pub total_repositories: usize,
    pub updated_repositories: usize,
    pub skipped_repositories: usize,
    pub errors: Vec<SyncFailure>,
    pub duration: Duration,
}

impl SyncSummary {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// What happened to a single repository.
enum Outcome {
    Updated,
    Skipped,
}

/// Failure while reconciling a single repository. Recorded, not propagated.
#[derive(Debug, Error)]
enum ItemError {
    #[error("repository does not exist: {path}")]
    Missing { path: String },

    #[error("failed to check repository existence: {0}")]
    Exists(RemoteError),

    #[error("failed to read default branch: {0}")]
    ReadBranch(RemoteError),

    #[error("failed to update default branch: {0}")]
    Update(RemoteError),
}

/// The reconciliation engine. Owns a handle to the remote port; everything
/// else is per-run state.
pub struct SyncEngine {
    remote: Arc<dyn RemoteRepositories>,
}

impl SyncEngine {
    pub fn new(remote: Arc<dyn RemoteRepositories>) -> Self {
        Self { remote }
    }

    /// Run a full reconciliation of the manifest.
    ///
    /// Fails fast, before any remote call, if an entry does not parse into
    /// the domain model or if two entries share a path. Per-repository
    /// failures afterwards are collected into the summary.
    pub async fn execute(&self, manifest: &Manifest) -> Result<SyncSummary, SyncError> {
        let start = Instant::now();
        let configuration = build_configuration(manifest)?;

        info!(
            "Syncing {} repositories across {} namespaces",
            configuration.len(),
            configuration.unique_namespaces().len()
        );

        let mut updated_repositories = 0;
        let mut skipped_repositories = 0;
        let mut errors = Vec::new();

        for repository in configuration.repositories() {
            match self.process_repository(repository).await {
                Ok(Outcome::Updated) => updated_repositories += 1,
                Ok(Outcome::Skipped) => skipped_repositories += 1,
                Err(error) => {
                    warn!("Sync failed for {}: {}", repository.full_path(), error);
                    errors.push(SyncFailure {
                        path: repository.full_path().to_string(),
                        error: error.to_string(),
                    });
                }
            }
        }

        let summary = SyncSummary {
            total_repositories: configuration.len(),
            updated_repositories,
            skipped_repositories,
            errors,
            duration: start.elapsed(),
        };

        info!(
            "Sync completed in {:.2}s: {} updated, {} skipped, {} failed",
            summary.duration.as_secs_f64(),
            summary.updated_repositories,
            summary.skipped_repositories,
            summary.errors.len()
        );

        Ok(summary)
    }

    /// Reconcile one repository: existence check, branch read, then the
    /// minimal mutation. Each step short-circuits into a recorded error.
    async fn process_repository(&self, repository: &Repository) -> Result<Outcome, ItemError> {
        let path = repository.full_path();
        debug!("Reconciling {}", path);

        let exists = self.remote.exists(path).await.map_err(ItemError::Exists)?;
        if !exists {
            return Err(ItemError::Missing {
                path: path.to_string(),
            });
        }

        let current_branch = self
            .remote
            .default_branch(path)
            .await
            .map_err(ItemError::ReadBranch)?;

        if !repository.needs_update(&current_branch) {
            debug!("{} already on '{}', skipping", path, current_branch);
            return Ok(Outcome::Skipped);
        }

        self.remote
            .set_default_branch(path, repository.default_branch().value())
            .await
            .map_err(ItemError::Update)?;

        info!(
            "{}: default branch '{}' -> '{}'",
            path,
            current_branch,
            repository.default_branch()
        );
        Ok(Outcome::Updated)
    }
}

/// Build the validated configuration aggregate from raw manifest entries.
fn build_configuration(manifest: &Manifest) -> Result<RepositoryConfiguration, SyncError> {
    let mut repositories = Vec::with_capacity(manifest.repositories.len());

    for entry in &manifest.repositories {
        let path = ProjectPath::new(&entry.path)?;
        let default_branch = BranchName::new(&entry.default_branch)?;
        let visibility = match entry.visibility.as_deref() {
            Some(raw) => Visibility::parse(raw)?,
            None => Visibility::default(),
        };

        repositories.push(Repository::new(
            path,
            default_branch,
            entry.description.clone(),
            visibility,
        ));
    }

    Ok(RepositoryConfiguration::new(repositories)?)
}
