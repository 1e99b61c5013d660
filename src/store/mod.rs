//! Store module - durable records of projects and their environments
//!
//! The orchestrator only sees the [`ProjectStore`] and [`EnvironmentStore`]
//! traits. [`FileStore`] implements both on top of a versioned TOML
//! registry at `~/.kiln/registry.toml`.
//!
//! # Example
//!
//! ```no_run
//! use kiln::store::{FileStore, Project, ProjectStore};
//!
//! let store = FileStore::open_default();
//! store.create_project(&Project::new("acme"))?;
//! for project in store.list_projects()? {
//!     println!("{}", project.name);
//! }
//! # Ok::<(), kiln::store::StoreError>(())
//! ```

mod internal;

use std::path::PathBuf;
use thiserror::Error;

use crate::error::Conflict;

pub use internal::FileStore;

/// Top-level namespace grouping applications and their environments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub name: String,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A named deployment target owned by exactly one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub project: String,
    pub name: String,
    pub public_load_balancer: bool,
}

impl Environment {
    /// Name of the infrastructure stack backing this environment.
    pub fn stack_name(&self) -> String {
        format!("{}-{}", self.project, self.name)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("project '{0}' already exists")]
    ProjectExists(String),
    #[error("project '{0}' not found")]
    ProjectNotFound(String),
    #[error("environment '{environment}' already exists in project '{project}'")]
    EnvironmentExists {
        project: String,
        environment: String,
    },
    #[error("unsupported registry version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("failed to read registry {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse registry {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to write registry {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize registry")]
    Serialize(#[from] toml::ser::Error),
}

impl Conflict for StoreError {
    fn is_conflict(&self) -> bool {
        matches!(
            self,
            StoreError::ProjectExists(_) | StoreError::EnvironmentExists { .. }
        )
    }
}

/// Durable store of project records.
pub trait ProjectStore {
    /// Create a project. Fails with [`StoreError::ProjectExists`] when the
    /// name is taken.
    fn create_project(&self, project: &Project) -> Result<(), StoreError>;

    /// All known projects, in no particular order.
    fn list_projects(&self) -> Result<Vec<Project>, StoreError>;
}

/// Durable store of environment records, scoped to a project.
pub trait EnvironmentStore {
    fn create_environment(&self, environment: &Environment) -> Result<(), StoreError>;

    fn list_environments(&self, project: &str) -> Result<Vec<Environment>, StoreError>;
}
