//! Internal implementation for workspace module
//!
//! Path definitions are in the paths module - this module contains behavior.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::{Summary, Workspace, WorkspaceError};
use crate::paths;

/// Contents of `.kiln/workspace.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Binding {
    project: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created: Option<String>,
}

/// Workspace rooted at a local directory.
#[derive(Debug, Clone)]
pub struct LocalWorkspace {
    root: PathBuf,
}

impl LocalWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Workspace rooted at the current directory.
    pub fn current() -> Result<Self, WorkspaceError> {
        let root = std::env::current_dir().map_err(|source| WorkspaceError::Io {
            path: PathBuf::from("."),
            source,
        })?;
        Ok(Self::new(root))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read_binding(&self) -> Result<Option<Binding>, WorkspaceError> {
        let path = paths::workspace::binding_path(&self.root);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|source| WorkspaceError::Io {
            path: path.clone(),
            source,
        })?;
        let binding = toml::from_str(&content)
            .map_err(|source| WorkspaceError::Parse { path, source })?;
        Ok(Some(binding))
    }
}

fn write_file(path: &Path, content: &[u8]) -> Result<(), WorkspaceError> {
    let io_err = |source| WorkspaceError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, content).map_err(io_err)
}

impl Workspace for LocalWorkspace {
    fn summary(&self) -> Result<Summary, WorkspaceError> {
        match self.read_binding()? {
            Some(binding) => Ok(Summary {
                project_name: binding.project,
            }),
            None => Err(WorkspaceError::NotBound {
                root: self.root.clone(),
            }),
        }
    }

    fn create(&self, project: &str) -> Result<(), WorkspaceError> {
        if let Some(binding) = self.read_binding()? {
            if binding.project == project {
                tracing::debug!(project, "workspace already bound");
                return Ok(());
            }
            return Err(WorkspaceError::BoundToOther {
                bound: binding.project,
                requested: project.to_string(),
            });
        }

        let binding = Binding {
            project: project.to_string(),
            created: Some(Utc::now().to_rfc3339()),
        };
        let content = toml::to_string_pretty(&binding)?;
        write_file(
            &paths::workspace::binding_path(&self.root),
            content.as_bytes(),
        )?;
        tracing::debug!(project, root = %self.root.display(), "bound workspace");
        Ok(())
    }

    fn write_manifest(&self, content: &[u8], app: &str) -> Result<PathBuf, WorkspaceError> {
        let path = paths::workspace::manifest_path(&self.root, app);
        write_file(&path, content)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_unbound_workspace() {
        let tmp = TempDir::new().unwrap();
        let ws = LocalWorkspace::new(tmp.path());
        assert!(matches!(
            ws.summary().unwrap_err(),
            WorkspaceError::NotBound { .. }
        ));
    }

    #[test]
    fn test_create_binds_project() {
        let tmp = TempDir::new().unwrap();
        let ws = LocalWorkspace::new(tmp.path());

        ws.create("acme").unwrap();
        assert_eq!(ws.summary().unwrap().project_name, "acme");
        assert!(paths::workspace::binding_path(tmp.path()).exists());
    }

    #[test]
    fn test_create_is_idempotent_for_same_project() {
        let tmp = TempDir::new().unwrap();
        let ws = LocalWorkspace::new(tmp.path());

        ws.create("acme").unwrap();
        ws.create("acme").unwrap();
        assert_eq!(ws.summary().unwrap().project_name, "acme");
    }

    #[test]
    fn test_create_refuses_other_project() {
        let tmp = TempDir::new().unwrap();
        let ws = LocalWorkspace::new(tmp.path());

        ws.create("acme").unwrap();
        let err = ws.create("beta").unwrap_err();
        assert!(matches!(
            err,
            WorkspaceError::BoundToOther { ref bound, ref requested }
                if bound == "acme" && requested == "beta"
        ));
    }

    #[test]
    fn test_write_manifest() {
        let tmp = TempDir::new().unwrap();
        let ws = LocalWorkspace::new(tmp.path());

        let path = ws.write_manifest(b"name: api\n", "api").unwrap();
        assert_eq!(path, paths::workspace::manifest_path(tmp.path(), "api"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "name: api\n");
    }

    #[test]
    fn test_corrupt_binding() {
        let tmp = TempDir::new().unwrap();
        let path = paths::workspace::binding_path(tmp.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "project = ").unwrap();

        let ws = LocalWorkspace::new(tmp.path());
        assert!(matches!(
            ws.summary().unwrap_err(),
            WorkspaceError::Parse { .. }
        ));
    }
}
