//! Internal implementation for store module
//!
//! Handles ~/.kiln/registry.toml. Every operation re-reads the file so two
//! stores pointed at the same path see each other's writes.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::{Environment, EnvironmentStore, Project, ProjectStore, StoreError};

/// Registry format version.
const REGISTRY_VERSION: u32 = 1;

/// The registry document.
///
/// Format:
/// ```toml
/// version = 1
///
/// [projects.acme]
/// created = "2026-01-01T00:00:00Z"
///
/// [projects.acme.environments.test]
/// public_load_balancer = true
/// created = "2026-01-01T00:05:00Z"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Registry {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    projects: BTreeMap<String, ProjectRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProjectRecord {
    created: String,
    #[serde(default)]
    environments: BTreeMap<String, EnvironmentRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EnvironmentRecord {
    public_load_balancer: bool,
    created: String,
}

fn default_version() -> u32 {
    REGISTRY_VERSION
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            version: REGISTRY_VERSION,
            projects: BTreeMap::new(),
        }
    }
}

impl Registry {
    fn load_from(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let registry: Self = toml::from_str(&content).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if registry.version != REGISTRY_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: registry.version,
                expected: REGISTRY_VERSION,
            });
        }

        Ok(registry)
    }

    fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let header = "# kiln registry\n\
                      # Projects and the environments provisioned for them\n\n";
        let content = toml::to_string_pretty(self)?;

        fs::write(path, format!("{header}{content}")).map_err(write_err)
    }
}

/// TOML-file-backed project and environment store.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `~/.kiln/registry.toml`
    pub fn open_default() -> Self {
        Self::new(crate::paths::registry_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProjectStore for FileStore {
    fn create_project(&self, project: &Project) -> Result<(), StoreError> {
        let mut registry = Registry::load_from(&self.path)?;
        if registry.projects.contains_key(&project.name) {
            return Err(StoreError::ProjectExists(project.name.clone()));
        }

        registry.projects.insert(
            project.name.clone(),
            ProjectRecord {
                created: Utc::now().to_rfc3339(),
                environments: BTreeMap::new(),
            },
        );
        registry.save_to(&self.path)?;
        tracing::debug!(project = %project.name, "registered project");
        Ok(())
    }

    fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        let registry = Registry::load_from(&self.path)?;
        Ok(registry.projects.into_keys().map(Project::new).collect())
    }
}

impl EnvironmentStore for FileStore {
    fn create_environment(&self, environment: &Environment) -> Result<(), StoreError> {
        let mut registry = Registry::load_from(&self.path)?;
        let project = registry
            .projects
            .get_mut(&environment.project)
            .ok_or_else(|| StoreError::ProjectNotFound(environment.project.clone()))?;

        if project.environments.contains_key(&environment.name) {
            return Err(StoreError::EnvironmentExists {
                project: environment.project.clone(),
                environment: environment.name.clone(),
            });
        }

        project.environments.insert(
            environment.name.clone(),
            EnvironmentRecord {
                public_load_balancer: environment.public_load_balancer,
                created: Utc::now().to_rfc3339(),
            },
        );
        registry.save_to(&self.path)?;
        tracing::debug!(
            project = %environment.project,
            environment = %environment.name,
            "registered environment"
        );
        Ok(())
    }

    fn list_environments(&self, project: &str) -> Result<Vec<Environment>, StoreError> {
        let registry = Registry::load_from(&self.path)?;
        let Some(record) = registry.projects.get(project) else {
            return Ok(Vec::new());
        };

        Ok(record
            .environments
            .iter()
            .map(|(name, env)| Environment {
                project: project.to_string(),
                name: name.clone(),
                public_load_balancer: env.public_load_balancer,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(tmp: &TempDir) -> FileStore {
        FileStore::new(tmp.path().join("registry.toml"))
    }

    fn test_env(project: &str) -> Environment {
        Environment {
            project: project.to_string(),
            name: "test".to_string(),
            public_load_balancer: true,
        }
    }

    #[test]
    fn test_missing_registry_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        assert!(store.list_projects().unwrap().is_empty());
        assert!(store.list_environments("acme").unwrap().is_empty());
    }

    #[test]
    fn test_create_and_list_projects() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);

        store.create_project(&Project::new("acme")).unwrap();
        store.create_project(&Project::new("beta")).unwrap();

        let names: Vec<String> = store
            .list_projects()
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["acme", "beta"]);
    }

    #[test]
    fn test_duplicate_project_is_distinct_error() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);

        store.create_project(&Project::new("acme")).unwrap();
        let err = store.create_project(&Project::new("acme")).unwrap_err();
        assert!(matches!(err, StoreError::ProjectExists(ref name) if name == "acme"));
    }

    #[test]
    fn test_environment_lifecycle() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);

        let err = store.create_environment(&test_env("acme")).unwrap_err();
        assert!(matches!(err, StoreError::ProjectNotFound(_)));

        store.create_project(&Project::new("acme")).unwrap();
        store.create_environment(&test_env("acme")).unwrap();

        let envs = store.list_environments("acme").unwrap();
        assert_eq!(envs, vec![test_env("acme")]);

        let err = store.create_environment(&test_env("acme")).unwrap_err();
        assert!(matches!(err, StoreError::EnvironmentExists { .. }));
    }

    #[test]
    fn test_registry_file_format() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        store.create_project(&Project::new("acme")).unwrap();
        store.create_environment(&test_env("acme")).unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        assert!(content.contains("version = 1"));
        assert!(content.contains("[projects.acme]"));
        assert!(content.contains("[projects.acme.environments.test]"));
    }

    #[test]
    fn test_unsupported_version() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        fs::write(store.path(), "version = 2\n").unwrap();

        let err = store.list_projects().unwrap_err();
        assert!(matches!(
            err,
            StoreError::UnsupportedVersion {
                found: 2,
                expected: 1
            }
        ));
    }

    #[test]
    fn test_corrupt_registry() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        fs::write(store.path(), "projects = [").unwrap();
        assert!(matches!(
            store.list_projects().unwrap_err(),
            StoreError::Parse { .. }
        ));
    }
}
