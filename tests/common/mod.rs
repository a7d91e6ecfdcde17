//! Common test utilities and helpers for gitlab-provisioner tests

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use gitlab_provisioner::{
    BranchName, ProjectPath, RemoteError, RemoteRepositories, Repository, RepositoryEntry,
    Visibility,
};

/// A project as the fake remote stores it.
#[derive(Debug, Clone)]
pub struct FakeProject {
    pub default_branch: String,
    pub description: Option<String>,
    pub visibility: String,
}

/// Every port call the fake remote has observed, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Exists(String),
    DefaultBranch(String),
    SetDefaultBranch(String, String),
    Repository(String),
}

/// In-memory stand-in for the GitLab API with call recording.
///
/// Projects live in a map keyed by full path; every trait call is recorded
/// so tests can assert which remote operations a run actually issued.
#[derive(Default)]
pub struct FakeRemote {
    projects: Mutex<BTreeMap<String, FakeProject>>,
    calls: Mutex<Vec<Call>>,
    failure: Mutex<Option<RemoteError>>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style: seed a project with the given current default branch.
    pub fn with_project(self, path: &str, default_branch: &str) -> Self {
        self.projects.lock().unwrap().insert(
            path.to_string(),
            FakeProject {
                default_branch: default_branch.to_string(),
                description: None,
                visibility: "private".to_string(),
            },
        );
        self
    }

    /// Make every subsequent call fail with the given error.
    pub fn fail_with(&self, error: RemoteError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// The `(path, branch)` pairs of every update issued.
    pub fn update_calls(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::SetDefaultBranch(path, branch) => Some((path, branch)),
                _ => None,
            })
            .collect()
    }

    pub fn current_branch(&self, path: &str) -> Option<String> {
        self.projects
            .lock()
            .unwrap()
            .get(path)
            .map(|p| p.default_branch.clone())
    }

    fn record(&self, call: Call) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(call);
        match self.failure.lock().unwrap().as_ref() {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteRepositories for FakeRemote {
    async fn exists(&self, path: &str) -> Result<bool, RemoteError> {
        self.record(Call::Exists(path.to_string()))?;
        Ok(self.projects.lock().unwrap().contains_key(path))
    }

    async fn default_branch(&self, path: &str) -> Result<String, RemoteError> {
        self.record(Call::DefaultBranch(path.to_string()))?;
        self.current_branch(path).ok_or(RemoteError::NotFound {
            path: path.to_string(),
        })
    }

    async fn set_default_branch(&self, path: &str, branch: &str) -> Result<(), RemoteError> {
        self.record(Call::SetDefaultBranch(path.to_string(), branch.to_string()))?;

        let mut projects = self.projects.lock().unwrap();
        match projects.get_mut(path) {
            Some(project) => {
                project.default_branch = branch.to_string();
                Ok(())
            }
            None => Err(RemoteError::NotFound {
                path: path.to_string(),
            }),
        }
    }

    async fn repository(&self, path: &str) -> Result<Repository, RemoteError> {
        self.record(Call::Repository(path.to_string()))?;

        let project = self
            .projects
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or(RemoteError::NotFound {
                path: path.to_string(),
            })?;

        let invalid = |err: gitlab_provisioner::DomainError| RemoteError::Api {
            status: None,
            message: err.to_string(),
        };

        Ok(Repository::new(
            ProjectPath::new(path).map_err(invalid)?,
            BranchName::new(&project.default_branch).map_err(invalid)?,
            project.description,
            Visibility::parse(&project.visibility).map_err(invalid)?,
        ))
    }
}

/// Shorthand for a raw manifest entry.
pub fn entry(path: &str, branch: &str) -> RepositoryEntry {
    RepositoryEntry {
        path: path.to_string(),
        default_branch: branch.to_string(),
        description: None,
        visibility: None,
    }
}
