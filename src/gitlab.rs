//! GitLab API integration.
//!
//! Defines the remote repository port the sync engine depends on, plus the
//! reqwest-backed client that implements it against the GitLab v4 REST API.
//! Every operation returns a tagged [`RemoteError`] outcome so callers are
//! forced to handle both branches; no retries or backoff happen here.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::Settings;
use crate::domain::{BranchName, ProjectPath, Repository, Visibility};
use crate::errors::RemoteError;

/// Remote repository capability consumed by the sync engine.
///
/// Implementations map "the path does not exist" to
/// [`RemoteError::NotFound`] and every other failure to
/// [`RemoteError::Api`].
#[async_trait]
pub trait RemoteRepositories: Send + Sync {
    /// Whether a project exists at the given full path.
    async fn exists(&self, path: &str) -> Result<bool, RemoteError>;

    /// The project's current default branch.
    async fn default_branch(&self, path: &str) -> Result<String, RemoteError>;

    /// Point the project's default branch at `branch`.
    async fn set_default_branch(&self, path: &str, branch: &str) -> Result<(), RemoteError>;

    /// The project's current settings as a domain entity.
    async fn repository(&self, path: &str) -> Result<Repository, RemoteError>;
}

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// GitLab v4 REST adapter implementing [`RemoteRepositories`].
pub struct GitLabClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

/// The subset of GitLab's project payload this tool reads.
#[derive(Debug, Deserialize)]
struct ProjectPayload {
    path_with_namespace: String,
    default_branch: Option<String>,
    description: Option<String>,
    visibility: Option<String>,
}

impl GitLabClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("gitlab-provisioner/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            token: settings.token.clone(),
        })
    }

    fn project_url(&self, path: &str) -> String {
        // Path segments are restricted to [A-Za-z0-9_.-], so escaping the
        // separator is the only encoding the project id needs.
        format!(
            "{}/api/v4/projects/{}",
            self.endpoint,
            path.replace('/', "%2F")
        )
    }

    async fn fetch_project(&self, path: &str) -> Result<ProjectPayload, RemoteError> {
        debug!("Fetching project: {}", path);

        let response = self
            .http
            .get(self.project_url(path))
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(RemoteError::NotFound {
                path: path.to_string(),
            }),
            status if status.is_success() => Ok(response.json().await?),
            status => Err(api_error(status, response).await),
        }
    }
}

#[async_trait]
impl RemoteRepositories for GitLabClient {
    async fn exists(&self, path: &str) -> Result<bool, RemoteError> {
        match self.fetch_project(path).await {
            Ok(_) => Ok(true),
            Err(RemoteError::NotFound { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    async fn default_branch(&self, path: &str) -> Result<String, RemoteError> {
        let project = self.fetch_project(path).await?;

        project.default_branch.ok_or_else(|| RemoteError::Api {
            status: None,
            message: format!("project {path} has no default branch"),
        })
    }

    async fn set_default_branch(&self, path: &str, branch: &str) -> Result<(), RemoteError> {
        debug!("Updating default branch: {} -> {}", path, branch);

        let response = self
            .http
            .put(self.project_url(path))
            .header("PRIVATE-TOKEN", &self.token)
            .json(&serde_json::json!({ "default_branch": branch }))
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(RemoteError::NotFound {
                path: path.to_string(),
            }),
            status if status.is_success() => {
                info!("Updated default branch of {} to '{}'", path, branch);
                Ok(())
            }
            status => Err(api_error(status, response).await),
        }
    }

    async fn repository(&self, path: &str) -> Result<Repository, RemoteError> {
        let project = self.fetch_project(path).await?;

        let project_path =
            ProjectPath::new(&project.path_with_namespace).map_err(invalid_payload)?;

        let default_branch = match project.default_branch.as_deref() {
            Some(branch) => BranchName::new(branch).map_err(invalid_payload)?,
            None => {
                return Err(RemoteError::Api {
                    status: None,
                    message: format!("project {path} has no default branch"),
                })
            }
        };

        let visibility = match project.visibility.as_deref() {
            Some(raw) => Visibility::parse(raw).map_err(invalid_payload)?,
            None => Visibility::default(),
        };

        Ok(Repository::new(
            project_path,
            default_branch,
            project.description,
            visibility,
        ))
    }
}

async fn api_error(status: StatusCode, response: reqwest::Response) -> RemoteError {
    let body = response.text().await.unwrap_or_default();
    let message = if body.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status}: {body}")
    };

    RemoteError::Api {
        status: Some(status.as_u16()),
        message,
    }
}

fn invalid_payload(err: impl std::fmt::Display) -> RemoteError {
    RemoteError::Api {
        status: None,
        message: format!("unusable project payload: {err}"),
    }
}
