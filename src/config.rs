//! Manifest input and process settings.
//!
//! The manifest is the declarative YAML document listing desired repository
//! settings. Entries here are raw strings; domain construction happens later
//! in the sync engine, after structural validation.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use tracing::warn;

/// Default GitLab endpoint when `GITLAB_ENDPOINT` is not set.
pub const DEFAULT_ENDPOINT: &str = "https://gitlab.com";

/// A single repository entry as written in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryEntry {
    pub path: String,
    pub default_branch: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
}

/// The declarative manifest (`repositories.yml`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Manifest {
    #[serde(default)]
    pub repositories: Vec<RepositoryEntry>,
}

impl Manifest {
    /// Load a manifest from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest file: {:?}", path))?;

        Self::from_yaml(&content).with_context(|| format!("Failed to parse manifest: {:?}", path))
    }

    /// Parse a manifest from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Invalid YAML manifest")
    }
}

/// Process-level settings for the GitLab API adapter.
///
/// Built once at startup from the environment and passed by reference into
/// the client; never held as global state.
#[derive(Debug, Clone)]
pub struct Settings {
    pub endpoint: String,
    pub token: String,
}

impl Settings {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: token.into(),
        }
    }

    /// Read settings from `GITLAB_TOKEN` (required) and `GITLAB_ENDPOINT`
    /// (optional).
    pub fn from_env() -> Result<Self> {
        let token =
            env::var("GITLAB_TOKEN").context("GITLAB_TOKEN environment variable is required")?;

        if token.is_empty() {
            bail!("GITLAB_TOKEN is empty");
        }

        if !token.starts_with("glpat-") {
            warn!("GITLAB_TOKEN doesn't look like a personal access token (expected glpat- prefix)");
        }

        let endpoint =
            env::var("GITLAB_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());

        Ok(Self { endpoint, token })
    }
}
