//! Conditional deployment of the project's first environment.

use anyhow::Result;
use colored::Colorize;

use super::{Bootstrap, Confirmation, DeployIntent, EnvironmentOutcome};
use crate::config::PromptErrorPolicy;
use crate::deploy::DeployError;
use crate::error::{tolerate_conflict, Applied};
use crate::interrupt;
use crate::names::validate_environment_name;
use crate::store::Environment;

const DEPLOY_HELP: &str = "An environment with your application deployed to it. \
    This will allow you to test your application before placing it in production.";

const PREPARING: &str = "Preparing deployment...";
const DEPLOYING: &str = "Deploying env...";
const DONE: &str = "Done!";
const FAILED: &str = "Error!";

impl Bootstrap<'_> {
    /// Provision a test environment unless deployment is skipped, the
    /// project already has an environment, or the operator declines.
    ///
    /// An already-provisioned stack counts as success and leaves the
    /// registry untouched.
    pub fn deploy_env(&mut self) -> Result<EnvironmentOutcome> {
        if self.request.deploy == DeployIntent::Skip {
            tracing::debug!("deployment skipped by flag");
            return Ok(EnvironmentOutcome::Skipped);
        }

        let project = self.request.project.clone();
        let existing = match self.deps.environments.list_environments(&project) {
            Ok(envs) => envs,
            Err(e) => {
                tracing::warn!(project = %project, error = %e, "could not list environments, assuming none");
                Vec::new()
            }
        };
        if !existing.is_empty() {
            tracing::debug!(project = %project, count = existing.len(), "project already has environments");
            return Ok(EnvironmentOutcome::AlreadyPresent);
        }

        if self.request.deploy == DeployIntent::Ask && !self.confirm_deploy()? {
            return Ok(EnvironmentOutcome::Declined);
        }

        let env = self.settings.environment_for(&project);
        self.provision(env)
    }

    /// Resolve the confirmation prompt through the prompt error policy.
    fn confirm_deploy(&self) -> Result<bool> {
        let prompt = format!("Would you like to deploy a {} environment?", self.settings.name);
        let answer = Confirmation::from(self.deps.prompter.confirm(&prompt, DEPLOY_HELP));

        match answer {
            Confirmation::Accepted => Ok(true),
            Confirmation::Declined => Ok(false),
            Confirmation::Failed(e) => match self.settings.on_prompt_error {
                PromptErrorPolicy::Decline => {
                    tracing::warn!(error = %e, "could not read deploy confirmation, not deploying");
                    println!(
                        "{} Could not read an answer ({}), skipping deployment.",
                        "⚠".yellow(),
                        e
                    );
                    Ok(false)
                }
                PromptErrorPolicy::Abort => {
                    Err(anyhow::Error::new(e).context("failed to confirm deployment"))
                }
            },
        }
    }

    fn provision(&mut self, env: Environment) -> Result<EnvironmentOutcome> {
        validate_environment_name(&env.name).map_err(|e| {
            anyhow::Error::new(e).context(format!("environment name '{}' invalid", env.name))
        })?;
        if self.cancel.is_cancelled() {
            return Err(anyhow::Error::new(DeployError::Cancelled(env.stack_name()))
                .context("deployment cancelled before it started"));
        }

        self.deps.progress.start(PREPARING);
        let begun = tolerate_conflict(self.deps.deployer.deploy_environment(&env));
        match begun {
            Ok(Applied::Created) => self.deps.progress.stop(DONE),
            Ok(Applied::AlreadyExisted) => {
                self.deps.progress.stop(DONE);
                tracing::info!(stack = %env.stack_name(), "stack already provisioned");
                println!(
                    "The environment {} already exists under project {}.",
                    env.name.bold(),
                    env.project.bold()
                );
                return Ok(EnvironmentOutcome::AlreadyProvisioned(env.name));
            }
            Err(e) => {
                self.deps.progress.stop(FAILED);
                return Err(anyhow::Error::new(e)
                    .context(format!("failed to deploy environment {}", env.name)));
            }
        }

        self.deps.progress.start(DEPLOYING);
        let waited = {
            let _interrupts = self
                .interrupts
                .then(|| interrupt::install(self.cancel.clone()));
            self.deps
                .deployer
                .wait_for_environment_creation(&env, &self.cancel)
        };
        if let Err(e) = waited {
            self.deps.progress.stop(FAILED);
            return Err(anyhow::Error::new(e)
                .context(format!("failed to wait for environment {} creation", env.name)));
        }

        if let Err(e) = self.deps.environments.create_environment(&env) {
            self.deps.progress.stop(FAILED);
            return Err(anyhow::Error::new(e)
                .context(format!("failed to register environment {}", env.name)));
        }
        self.deps.progress.stop(DONE);

        tracing::info!(project = %env.project, environment = %env.name, "environment deployed");
        Ok(EnvironmentOutcome::Deployed(env.name))
    }
}
