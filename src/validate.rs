//! Structural validation of a manifest, before domain construction.
//!
//! Unlike the sync engine, which aborts on the first invalid entry, this pass
//! accumulates every violation across every entry so a user can fix the whole
//! manifest in one edit. It is side-effect free and builds no domain
//! entities.

use std::collections::HashSet;

use crate::config::Manifest;
use crate::domain::{BranchName, ProjectPath, Visibility};

/// A single violation, tagged with the field path it was found at
/// (e.g. `repositories[2].path`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Accumulated result of a validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<FieldError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

fn field(index: usize, name: &str) -> String {
    format!("repositories[{index}].{name}")
}

/// Validate a manifest's structure against the domain rules.
///
/// Duplicate-path detection is a plain string-set check over the raw entries,
/// independent of whether the path itself parses; the first occurrence wins
/// and the error is reported against the later index.
pub fn validate(manifest: &Manifest) -> ValidationReport {
    let mut errors = Vec::new();

    if manifest.repositories.is_empty() {
        errors.push(FieldError {
            field: "repositories".to_string(),
            message: "at least one repository must be specified".to_string(),
        });
    }

    let mut seen_paths: HashSet<&str> = HashSet::new();

    for (index, entry) in manifest.repositories.iter().enumerate() {
        if entry.path.trim().is_empty() {
            errors.push(FieldError {
                field: field(index, "path"),
                message: "path is required".to_string(),
            });
        } else {
            if let Err(err) = ProjectPath::new(&entry.path) {
                errors.push(FieldError {
                    field: field(index, "path"),
                    message: err.to_string(),
                });
            }

            if !seen_paths.insert(entry.path.as_str()) {
                errors.push(FieldError {
                    field: field(index, "path"),
                    message: format!("duplicate path: {}", entry.path),
                });
            }
        }

        if entry.default_branch.trim().is_empty() {
            errors.push(FieldError {
                field: field(index, "defaultBranch"),
                message: "default branch is required".to_string(),
            });
        } else if let Err(err) = BranchName::new(&entry.default_branch) {
            errors.push(FieldError {
                field: field(index, "defaultBranch"),
                message: err.to_string(),
            });
        }

        if let Some(visibility) = &entry.visibility {
            if let Err(err) = Visibility::parse(visibility) {
                errors.push(FieldError {
                    field: field(index, "visibility"),
                    message: err.to_string(),
                });
            }
        }
    }

    ValidationReport { errors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RepositoryEntry;

    fn entry(path: &str, branch: &str) -> RepositoryEntry {
        RepositoryEntry {
            path: path.to_string(),
            default_branch: branch.to_string(),
            description: None,
            visibility: None,
        }
    }

    #[test]
    fn test_valid_manifest_passes() {
        let manifest = Manifest {
            repositories: vec![entry("g/p1", "main"), entry("g/p2", "develop")],
        };

        let report = validate(&manifest);
        assert!(report.is_valid());
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_empty_repository_list_is_exactly_one_error() {
        let manifest = Manifest {
            repositories: vec![],
        };

        let report = validate(&manifest);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].field, "repositories");
    }

    #[test]
    fn test_all_violations_are_accumulated() {
        let manifest = Manifest {
            repositories: vec![
                entry("not-a-path", "bad..branch"),
                entry("g/p1", "main"),
                entry("", ""),
            ],
        };

        let report = validate(&manifest);
        assert!(!report.is_valid());

        let fields: Vec<&str> = report.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "repositories[0].path",
                "repositories[0].defaultBranch",
                "repositories[2].path",
                "repositories[2].defaultBranch",
            ]
        );
    }

    #[test]
    fn test_duplicate_path_reported_on_second_occurrence() {
        let manifest = Manifest {
            repositories: vec![entry("g/p1", "main"), entry("g/p1", "develop")],
        };

        let report = validate(&manifest);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].field, "repositories[1].path");
        assert!(report.errors[0].message.contains("duplicate path: g/p1"));
    }

    #[test]
    fn test_duplicate_check_is_independent_of_path_parsing() {
        // The shared path is malformed; both the parse error and the
        // duplicate are reported for the second entry.
        let manifest = Manifest {
            repositories: vec![entry("bad path/x", "main"), entry("bad path/x", "main")],
        };

        let report = validate(&manifest);
        let second_entry_errors: Vec<&FieldError> = report
            .errors
            .iter()
            .filter(|e| e.field == "repositories[1].path")
            .collect();
        assert_eq!(second_entry_errors.len(), 2);
    }

    #[test]
    fn test_invalid_visibility_is_reported() {
        let mut invalid = entry("g/p1", "main");
        invalid.visibility = Some("secret".to_string());

        let report = validate(&Manifest {
            repositories: vec![invalid],
        });
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].field, "repositories[0].visibility");
        assert!(report.errors[0].message.contains("private, internal, public"));
    }

    #[test]
    fn test_known_visibility_values_pass() {
        for value in ["private", "internal", "public"] {
            let mut e = entry("g/p1", "main");
            e.visibility = Some(value.to_string());
            assert!(validate(&Manifest {
                repositories: vec![e]
            })
            .is_valid());
        }
    }
}
