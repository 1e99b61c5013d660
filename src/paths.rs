//! Single source of truth for the kiln filesystem layout.
//!
//! This module defines WHERE data lives. It has no I/O, no validation,
//! no business logic.
//!
//! # User-Level Paths (~/.kiln/)
//!
//! ```text
//! ~/.kiln/
//! ├── config.toml              # Global config
//! ├── registry.toml            # Projects and their environments
//! └── stacks/                  # Provisioned environment stacks
//!     └── {project}-{env}/
//!         ├── template.yml     # Rendered stack template
//!         ├── stack.toml       # Status record
//!         └── outputs.toml     # Written once provisioning completes
//! ```
//!
//! # Workspace-Level Paths
//!
//! ```text
//! workspace/
//! ├── .kiln/workspace.toml     # Binds the directory to a project
//! └── kiln/{app}/manifest.yml  # One manifest per application
//! ```

use std::path::{Path, PathBuf};

/// Environment variable that relocates the kiln home directory.
pub const HOME_ENV: &str = "KILN_HOME";

// =============================================================================
// User Level (~/.kiln/)
// =============================================================================

/// User's kiln home directory: `$KILN_HOME` or `~/.kiln/`
pub fn kiln_home() -> PathBuf {
    if let Some(home) = std::env::var_os(HOME_ENV) {
        return PathBuf::from(home);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".kiln")
}

/// Global config file: `~/.kiln/config.toml`
pub fn config_path() -> PathBuf {
    kiln_home().join("config.toml")
}

/// Project and environment registry: `~/.kiln/registry.toml`
pub fn registry_path() -> PathBuf {
    kiln_home().join("registry.toml")
}

/// Stack paths, relative to a stacks root.
pub mod stacks {
    use super::*;

    /// All provisioned stacks: `~/.kiln/stacks/`
    pub fn root() -> PathBuf {
        kiln_home().join("stacks")
    }

    /// One stack: `{root}/{stack}/`
    pub fn stack_dir(root: &Path, stack: &str) -> PathBuf {
        root.join(stack)
    }

    /// Status record: `{root}/{stack}/stack.toml`
    pub fn record_path(root: &Path, stack: &str) -> PathBuf {
        stack_dir(root, stack).join("stack.toml")
    }

    /// Rendered template: `{root}/{stack}/template.yml`
    pub fn template_path(root: &Path, stack: &str) -> PathBuf {
        stack_dir(root, stack).join("template.yml")
    }

    /// Provisioning outputs: `{root}/{stack}/outputs.toml`
    pub fn outputs_path(root: &Path, stack: &str) -> PathBuf {
        stack_dir(root, stack).join("outputs.toml")
    }
}

// =============================================================================
// Workspace Level
// =============================================================================

/// Workspace-level paths, relative to a workspace root.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use kiln::paths::workspace;
///
/// let root = Path::new("/home/user/acme");
/// let manifest = workspace::manifest_path(root, "api");
/// assert_eq!(manifest, Path::new("/home/user/acme/kiln/api/manifest.yml"));
/// ```
pub mod workspace {
    use super::*;

    /// Workspace metadata directory: `.kiln/`
    pub fn kiln_dir(root: &Path) -> PathBuf {
        root.join(".kiln")
    }

    /// Project binding: `.kiln/workspace.toml`
    pub fn binding_path(root: &Path) -> PathBuf {
        kiln_dir(root).join("workspace.toml")
    }

    /// Application manifests: `kiln/`
    pub fn manifests_dir(root: &Path) -> PathBuf {
        root.join("kiln")
    }

    /// One application manifest: `kiln/{app}/manifest.yml`
    pub fn manifest_path(root: &Path, app: &str) -> PathBuf {
        manifests_dir(root).join(app).join("manifest.yml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_level_paths() {
        let home = kiln_home();
        assert!(config_path().starts_with(&home));
        assert!(registry_path().ends_with("registry.toml"));
        assert!(stacks::root().ends_with("stacks"));
    }

    #[test]
    fn test_stack_paths() {
        let root = Path::new("/tmp/stacks");
        assert_eq!(
            stacks::record_path(root, "acme-test"),
            PathBuf::from("/tmp/stacks/acme-test/stack.toml")
        );
        assert_eq!(
            stacks::template_path(root, "acme-test"),
            PathBuf::from("/tmp/stacks/acme-test/template.yml")
        );
    }

    #[test]
    fn test_workspace_paths() {
        let root = Path::new("/tmp/acme");
        assert_eq!(
            workspace::binding_path(root),
            PathBuf::from("/tmp/acme/.kiln/workspace.toml")
        );
        assert_eq!(
            workspace::manifest_path(root, "api"),
            PathBuf::from("/tmp/acme/kiln/api/manifest.yml")
        );
    }
}
