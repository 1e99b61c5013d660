//! Prepare, Ask and Validate: resolve the request without side effects.

use anyhow::{Context, Result};

use super::Bootstrap;
use crate::manifest::AppKind;
use crate::names::{validate_application_name, validate_project_name, NameError};

const PROJECT_SELECT_PROMPT: &str = "Which project should we use?";
const PROJECT_SELECT_HELP: &str = "Choose a project to create a new application in. \
    Applications in the same project share the same network and cluster \
    and can discover each other.";
const PROJECT_NAME_PROMPT: &str = "What is your project's name?";
const PROJECT_NAME_HELP: &str = "Applications under the same project share the same network \
    and cluster and can discover each other.";
const APP_NAME_PROMPT: &str = "What is your application's name?";
const APP_NAME_HELP: &str = "A deployable service with one job to do. \
    Must be unique within a project.";
const APP_KIND_PROMPT: &str = "Which template would you like to use?";
const APP_KIND_HELP: &str = "Pre-defined infrastructure templates.";

/// Empty means "not provided yet" and is left for Ask.
fn reject_malformed(field: &str, result: Result<(), NameError>) -> Result<()> {
    match result {
        Ok(()) | Err(NameError::Empty) => Ok(()),
        Err(e) => Err(anyhow::Error::new(e).context(format!("{field} name invalid"))),
    }
}

impl Bootstrap<'_> {
    /// Fill the project without prompting where possible.
    ///
    /// Priority: explicit input, then the workspace binding, then the
    /// registry's project list for the selection prompt. A registry
    /// listing failure counts as "no existing projects".
    pub fn prepare(&mut self) {
        if !self.request.project.is_empty() {
            tracing::debug!(project = %self.request.project, "project given explicitly");
            return;
        }

        match self.deps.workspace.summary() {
            Ok(summary) => {
                tracing::debug!(project = %summary.project_name, "using workspace project");
                self.request.project = summary.project_name.clone();
                self.request.workspace_project = Some(summary.project_name);
                return;
            }
            Err(e) => tracing::debug!(error = %e, "workspace not bound"),
        }

        let names = match self.deps.projects.list_projects() {
            Ok(projects) => projects.into_iter().map(|p| p.name).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "could not list existing projects");
                Vec::new()
            }
        };
        tracing::debug!(count = names.len(), "staged existing projects");
        self.request.existing_projects = Some(names);
    }

    /// Prompt for every required field that is still unset.
    ///
    /// Fields already set are never re-prompted. The first prompt failure
    /// aborts the phase.
    pub fn ask(&mut self) -> Result<()> {
        if self.request.project.is_empty() {
            self.ask_project()?;
        }

        if self.request.app_name.is_empty() {
            self.request.app_name = self
                .deps
                .prompter
                .get(APP_NAME_PROMPT, APP_NAME_HELP, validate_application_name)
                .context("failed to get application name")?;
        }

        if self.request.app_kind.is_empty() {
            self.request.app_kind = self
                .deps
                .prompter
                .select_one(APP_KIND_PROMPT, APP_KIND_HELP, &AppKind::options())
                .context("failed to get template selection")?;
        }

        Ok(())
    }

    fn ask_project(&mut self) -> Result<()> {
        let project = match self.request.existing_projects.as_deref() {
            Some(names) if !names.is_empty() => self
                .deps
                .prompter
                .select_one(PROJECT_SELECT_PROMPT, PROJECT_SELECT_HELP, names)
                .context("failed to get project selection")?,
            _ => self
                .deps
                .prompter
                .get(PROJECT_NAME_PROMPT, PROJECT_NAME_HELP, validate_project_name)
                .context("failed to get project name")?,
        };
        self.request.project = project;
        Ok(())
    }

    /// Reject malformed values supplied as flags.
    pub fn validate(&self) -> Result<()> {
        reject_malformed("project", validate_project_name(&self.request.project))?;
        reject_malformed("application", validate_application_name(&self.request.app_name))?;

        if !self.request.app_kind.is_empty() {
            self.request
                .app_kind
                .parse::<AppKind>()
                .context("application type invalid")?;
        }
        Ok(())
    }
}
