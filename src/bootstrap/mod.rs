//! Bootstrap a project, an application in it, and its first environment
//!
//! The workflow runs in four phases, each a method on [`Bootstrap`]:
//!
//! 1. **Prepare**: fill the project name from the workspace binding, or
//!    stage the registry's project names for the prompt
//! 2. **Ask**: prompt for every field still unset
//! 3. **Validate**: reject malformed names supplied as flags
//! 4. **Execute**: create the project, bind the workspace, write the
//!    manifest, then optionally provision a test environment
//!
//! Only Execute has side effects. Each Execute step aborts the rest on
//! failure, without undoing earlier steps. Two conditions are absorbed as
//! success: the project already exists, and the environment stack
//! already exists.
//!
//! # Example
//!
//! ```no_run
//! use kiln::bootstrap::{Bootstrap, BootstrapRequest, Collaborators, EnvironmentSettings};
//! # fn deps<'a>() -> Collaborators<'a> { unimplemented!() }
//!
//! let request = BootstrapRequest::new("acme", "api", "");
//! let mut init = Bootstrap::new(request, EnvironmentSettings::default(), deps());
//! init.prepare();
//! init.ask()?;
//! init.validate()?;
//! let summary = init.execute()?;
//! println!("Manifest written to {}", summary.manifest.display());
//! # Ok::<(), anyhow::Error>(())
//! ```

mod environment;
mod execute;
mod phases;

use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use crate::config::{DeploySection, PromptErrorPolicy};
use crate::deploy::EnvironmentDeployer;
use crate::error::Applied;
use crate::store::{Environment, EnvironmentStore, ProjectStore};
use crate::term::{Progress, PromptError, Prompter};
use crate::workspace::Workspace;

/// Whether to provision a test environment after creating the app.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeployIntent {
    /// Ask the operator.
    #[default]
    Ask,
    /// Provision without asking.
    Deploy,
    /// Never provision.
    Skip,
}

impl DeployIntent {
    /// Resolve the `--deploy` / `--skip-deploy` flags. Skip wins when both
    /// are set.
    pub fn from_flags(deploy: bool, skip_deploy: bool) -> Self {
        match (deploy, skip_deploy) {
            (true, true) => {
                tracing::warn!("both --deploy and --skip-deploy given, skipping deployment");
                DeployIntent::Skip
            }
            (_, true) => DeployIntent::Skip,
            (true, false) => DeployIntent::Deploy,
            (false, false) => DeployIntent::Ask,
        }
    }
}

/// Everything one `init` invocation collects before executing.
///
/// Empty strings mean "not provided yet".
#[derive(Debug, Clone, Default)]
pub struct BootstrapRequest {
    pub project: String,
    pub app_name: String,
    pub app_kind: String,
    pub deploy: DeployIntent,
    existing_projects: Option<Vec<String>>,
    workspace_project: Option<String>,
}

impl BootstrapRequest {
    pub fn new(
        project: impl Into<String>,
        app_name: impl Into<String>,
        app_kind: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            app_name: app_name.into(),
            app_kind: app_kind.into(),
            ..Default::default()
        }
    }

    pub fn with_deploy(mut self, deploy: DeployIntent) -> Self {
        self.deploy = deploy;
        self
    }

    /// Project names staged by Prepare for the selection prompt. `None`
    /// when nothing was staged, `Some(&[])` when the registry was empty.
    pub fn existing_projects(&self) -> Option<&[String]> {
        self.existing_projects.as_deref()
    }

    /// Project adopted from the workspace binding, if any.
    pub fn workspace_project(&self) -> Option<&str> {
        self.workspace_project.as_deref()
    }
}

/// Attributes of the environment created on first deploy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentSettings {
    pub name: String,
    pub public_load_balancer: bool,
    pub on_prompt_error: PromptErrorPolicy,
}

impl Default for EnvironmentSettings {
    fn default() -> Self {
        Self::from(&DeploySection::default())
    }
}

impl From<&DeploySection> for EnvironmentSettings {
    fn from(section: &DeploySection) -> Self {
        Self {
            name: section.environment.clone(),
            public_load_balancer: section.public_load_balancer,
            on_prompt_error: section.on_prompt_error,
        }
    }
}

impl EnvironmentSettings {
    pub fn environment_for(&self, project: &str) -> Environment {
        Environment {
            project: project.to_string(),
            name: self.name.clone(),
            public_load_balancer: self.public_load_balancer,
        }
    }
}

/// Answer to a yes/no prompt, keeping input failures apart from "no".
#[derive(Debug)]
pub enum Confirmation {
    Accepted,
    Declined,
    Failed(PromptError),
}

impl From<Result<bool, PromptError>> for Confirmation {
    fn from(answer: Result<bool, PromptError>) -> Self {
        match answer {
            Ok(true) => Confirmation::Accepted,
            Ok(false) => Confirmation::Declined,
            Err(e) => Confirmation::Failed(e),
        }
    }
}

/// What happened to the test environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentOutcome {
    /// Deployment was skipped by flag.
    Skipped,
    /// The project already had an environment.
    AlreadyPresent,
    /// The operator said no, or the confirmation could not be read.
    Declined,
    /// The stack was provisioned by an earlier run.
    AlreadyProvisioned(String),
    /// This run provisioned and registered the environment.
    Deployed(String),
}

/// Result of a successful Execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub project: Applied,
    pub manifest: PathBuf,
    pub environment: EnvironmentOutcome,
}

/// External systems the workflow drives.
pub struct Collaborators<'a> {
    pub projects: &'a dyn ProjectStore,
    pub environments: &'a dyn EnvironmentStore,
    pub deployer: &'a dyn EnvironmentDeployer,
    pub workspace: &'a dyn Workspace,
    pub prompter: &'a dyn Prompter,
    pub progress: &'a mut dyn Progress,
}

/// One `init` invocation.
pub struct Bootstrap<'a> {
    pub request: BootstrapRequest,
    settings: EnvironmentSettings,
    deps: Collaborators<'a>,
    cancel: CancellationToken,
    interrupts: bool,
}

impl<'a> Bootstrap<'a> {
    pub fn new(
        request: BootstrapRequest,
        settings: EnvironmentSettings,
        deps: Collaborators<'a>,
    ) -> Self {
        Self {
            request,
            settings,
            deps,
            cancel: CancellationToken::new(),
            interrupts: false,
        }
    }

    /// Token checked before deploying and while waiting for the
    /// environment to provision.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Cancel the token on Ctrl+C, but only while waiting for the
    /// environment. Prompts keep the default signal behavior.
    pub fn cancel_on_interrupt(mut self) -> Self {
        self.interrupts = true;
        self
    }
}
