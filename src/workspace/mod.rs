//! Workspace module - local directory bound to a project
//!
//! A workspace is the operator's working directory once `kiln init` has
//! run in it: `.kiln/workspace.toml` records which project it belongs to,
//! and `kiln/<app>/manifest.yml` holds one manifest per application.
//!
//! # Example
//!
//! ```no_run
//! use kiln::workspace::{LocalWorkspace, Workspace};
//!
//! let ws = LocalWorkspace::current()?;
//! match ws.summary() {
//!     Ok(summary) => println!("Bound to {}", summary.project_name),
//!     Err(_) => ws.create("acme")?,
//! }
//! # Ok::<(), kiln::workspace::WorkspaceError>(())
//! ```

mod internal;

use std::path::PathBuf;
use thiserror::Error;

pub use internal::LocalWorkspace;

/// Read-only view of the project a workspace is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub project_name: String,
}

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("{} is not bound to a project", root.display())]
    NotBound { root: PathBuf },
    #[error("workspace already belongs to project '{bound}', cannot bind it to '{requested}'")]
    BoundToOther { bound: String, requested: String },
    #[error("failed to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to serialize workspace binding")]
    Serialize(#[from] toml::ser::Error),
}

/// Local workspace operations used by `init`.
pub trait Workspace {
    /// The project this workspace is bound to. Fails when there is none.
    fn summary(&self) -> Result<Summary, WorkspaceError>;

    /// Bind the workspace to a project. Re-binding to the same project is
    /// a no-op.
    fn create(&self, project: &str) -> Result<(), WorkspaceError>;

    /// Persist an application manifest and return where it was written.
    fn write_manifest(&self, content: &[u8], app: &str) -> Result<PathBuf, WorkspaceError>;
}
