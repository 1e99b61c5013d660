//! Execute: the only phase with side effects.

use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use super::{Bootstrap, Summary};
use crate::error::{tolerate_conflict, Applied};
use crate::manifest::Manifest;
use crate::store::Project;

impl Bootstrap<'_> {
    /// Create the project, bind the workspace, write the manifest and
    /// optionally deploy the test environment, stopping at the first
    /// failure. Completed steps are not rolled back.
    pub fn execute(&mut self) -> Result<Summary> {
        if self.request.project.is_empty() {
            bail!("project name is required");
        }

        let project = self.create_project()?;
        self.init_workspace()?;
        let manifest = self.create_app()?;
        let environment = self.deploy_env()?;

        Ok(Summary {
            project,
            manifest,
            environment,
        })
    }

    /// Register the project. An existing project is not an error.
    pub fn create_project(&mut self) -> Result<Applied> {
        let project = Project::new(&self.request.project);
        let applied = tolerate_conflict(self.deps.projects.create_project(&project))
            .with_context(|| format!("failed to create project {}", project.name))?;

        match applied {
            Applied::Created => tracing::info!(project = %project.name, "created project"),
            Applied::AlreadyExisted => {
                tracing::info!(project = %project.name, "project already exists, reusing it")
            }
        }
        Ok(applied)
    }

    /// Bind the local workspace to the project.
    pub fn init_workspace(&mut self) -> Result<()> {
        self.deps
            .workspace
            .create(&self.request.project)
            .context("failed to initialize the workspace")?;
        tracing::debug!(project = %self.request.project, "workspace bound");
        Ok(())
    }

    /// Derive the application manifest and write it into the workspace.
    pub fn create_app(&mut self) -> Result<PathBuf> {
        let manifest = Manifest::create(&self.request.app_name, &self.request.app_kind)
            .context("failed to generate a manifest")?;
        let content = manifest
            .marshal()
            .context("failed to marshal the manifest file")?;

        let path = self
            .deps
            .workspace
            .write_manifest(&content, &self.request.app_name)
            .with_context(|| format!("failed to write the manifest for {}", self.request.app_name))?;
        tracing::info!(app = %self.request.app_name, path = %path.display(), "wrote manifest");
        Ok(path)
    }
}
