//! Core domain model: value objects, the repository entity and the
//! configuration aggregate.
//!
//! All types here are constructed through validating constructors and are
//! immutable afterwards. Raw strings never reach the sync engine.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, DomainError};

static SEGMENT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("segment pattern is valid"));

/// Characters git forbids anywhere in a branch name.
const FORBIDDEN_BRANCH_CHARS: [char; 8] = ['~', '^', ':', '?', '*', '[', '\\', '|'];

/// A validated `namespace/project` path, the primary key for a repository
/// on the remote host.
///
/// Input is trimmed, then validated: non-empty, exactly one `/`, both
/// segments non-empty and matching `[A-Za-z0-9_.-]+`. The first violated
/// rule determines the error.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectPath(String);

impl ProjectPath {
    pub fn new(raw: &str) -> Result<Self, DomainError> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(DomainError::EmptyProjectPath);
        }

        let (namespace, project) = match value.split_once('/') {
            Some(parts) => parts,
            None => {
                return Err(DomainError::ProjectPathFormat {
                    path: value.to_string(),
                })
            }
        };
        if project.contains('/') {
            return Err(DomainError::ProjectPathFormat {
                path: value.to_string(),
            });
        }

        if namespace.is_empty() || project.is_empty() {
            return Err(DomainError::ProjectPathSegments {
                path: value.to_string(),
            });
        }

        if !SEGMENT_PATTERN.is_match(namespace) || !SEGMENT_PATTERN.is_match(project) {
            return Err(DomainError::ProjectPathCharacters {
                path: value.to_string(),
            });
        }

        Ok(Self(value.to_string()))
    }

    /// The full `namespace/project` string.
    pub fn value(&self) -> &str {
        &self.0
    }

    pub fn namespace(&self) -> &str {
        self.0.split_once('/').map(|(ns, _)| ns).unwrap_or(&self.0)
    }

    pub fn project_name(&self) -> &str {
        self.0
            .split_once('/')
            .map(|(_, name)| name)
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for ProjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ProjectPath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// A validated git branch name.
///
/// Input is trimmed, then checked against the git ref-name rules this tool
/// cares about, in order: non-empty, no `..`, none of `~^:?*[\|`, no leading
/// or trailing `/`, no `.lock` suffix, no `@{`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BranchName(String);

impl BranchName {
    pub fn new(raw: &str) -> Result<Self, DomainError> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(DomainError::EmptyBranchName);
        }

        let invalid = |reason: &'static str| DomainError::InvalidBranchName {
            branch: value.to_string(),
            reason,
        };

        if value.contains("..") {
            return Err(invalid("must not contain '..'"));
        }
        if value.chars().any(|c| FORBIDDEN_BRANCH_CHARS.contains(&c)) {
            return Err(invalid("contains a character forbidden in git refs"));
        }
        if value.starts_with('/') || value.ends_with('/') {
            return Err(invalid("must not start or end with '/'"));
        }
        if value.ends_with(".lock") {
            return Err(invalid("must not end with '.lock'"));
        }
        if value.contains("@{") {
            return Err(invalid("must not contain '@{'"));
        }

        Ok(Self(value.to_string()))
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BranchName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Repository visibility level, in GitLab's wire form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Private,
    Internal,
    Public,
}

impl Visibility {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        match raw {
            "private" => Ok(Visibility::Private),
            "internal" => Ok(Visibility::Internal),
            "public" => Ok(Visibility::Public),
            other => Err(DomainError::InvalidVisibility {
                value: other.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Internal => "internal",
            Visibility::Public => "public",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Desired state for a single repository.
///
/// Built from validated value objects only; there is no raw-string
/// constructor. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    path: ProjectPath,
    default_branch: BranchName,
    description: Option<String>,
    visibility: Visibility,
}

impl Repository {
    pub fn new(
        path: ProjectPath,
        default_branch: BranchName,
        description: Option<String>,
        visibility: Visibility,
    ) -> Self {
        Self {
            path,
            default_branch,
            description,
            visibility,
        }
    }

    pub fn path(&self) -> &ProjectPath {
        &self.path
    }

    /// The `namespace/project` identifier used against the remote API.
    pub fn full_path(&self) -> &str {
        self.path.value()
    }

    pub fn namespace(&self) -> &str {
        self.path.namespace()
    }

    pub fn project_name(&self) -> &str {
        self.path.project_name()
    }

    pub fn default_branch(&self) -> &BranchName {
        &self.default_branch
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// True iff the remote's current default branch differs from the desired
    /// one. Comparison is exact and case-sensitive.
    pub fn needs_update(&self, remote_branch: &str) -> bool {
        self.default_branch.value() != remote_branch
    }
}

/// Ordered collection of desired repositories for one sync run.
///
/// The constructor enforces full-path uniqueness; a configuration holding
/// duplicates cannot be built.
#[derive(Debug, Clone)]
pub struct RepositoryConfiguration {
    repositories: Vec<Repository>,
    created_at: DateTime<Utc>,
}

impl RepositoryConfiguration {
    pub fn new(repositories: Vec<Repository>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for repository in &repositories {
            if !seen.insert(repository.full_path()) {
                return Err(ConfigError::DuplicatePath(
                    repository.full_path().to_string(),
                ));
            }
        }

        Ok(Self {
            repositories,
            created_at: Utc::now(),
        })
    }

    pub fn repositories(&self) -> &[Repository] {
        &self.repositories
    }

    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn repository_by_path(&self, path: &str) -> Option<&Repository> {
        self.repositories.iter().find(|r| r.full_path() == path)
    }

    /// Invariant query: no two entries share a full path. Always holds for a
    /// constructed configuration since `new` rejects duplicates.
    pub fn has_unique_paths(&self) -> bool {
        let paths: HashSet<&str> = self.repositories.iter().map(|r| r.full_path()).collect();
        paths.len() == self.repositories.len()
    }

    /// The distinct namespaces referenced by this configuration.
    pub fn unique_namespaces(&self) -> BTreeSet<&str> {
        self.repositories.iter().map(|r| r.namespace()).collect()
    }
}
