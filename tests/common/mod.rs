//! Recording fakes for driving the bootstrap workflow in tests
//!
//! One [`Fake`] stands in for every collaborator and appends each call to a
//! journal shared with [`FakeProgress`], so tests can assert call order
//! across collaborators.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::rc::Rc;

use kiln::bootstrap::{Bootstrap, BootstrapRequest, Collaborators, EnvironmentSettings};
use kiln::deploy::{DeployError, EnvironmentDeployer};
use kiln::store::{Environment, EnvironmentStore, Project, ProjectStore, StoreError};
use kiln::term::{Progress, PromptError, Prompter, Validator};
use kiln::workspace::{Summary, Workspace, WorkspaceError};
use tokio_util::sync::CancellationToken;

pub type Journal = Rc<RefCell<Vec<String>>>;

pub const WEB_APP: &str = "Load Balanced Web App";

#[derive(Default)]
pub struct Fake {
    journal: Journal,

    pub projects: RefCell<Vec<String>>,
    pub environments: RefCell<Vec<Environment>>,
    pub bound: RefCell<Option<String>>,
    pub manifests: RefCell<Vec<(String, Vec<u8>)>>,
    pub stacks: RefCell<Vec<String>>,

    answers: RefCell<VecDeque<String>>,
    confirms: RefCell<VecDeque<Result<bool, PromptError>>>,
    pub offered: RefCell<Vec<Vec<String>>>,

    pub fail_list_projects: Cell<bool>,
    pub fail_list_environments: Cell<bool>,
    pub create_project_error: RefCell<Option<StoreError>>,
    pub create_environment_error: RefCell<Option<StoreError>>,
    pub workspace_error: RefCell<Option<WorkspaceError>>,
    pub deploy_error: RefCell<Option<DeployError>>,
    pub wait_error: RefCell<Option<DeployError>>,
}

impl Fake {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_projects(names: &[&str]) -> Self {
        let fake = Self::new();
        fake.projects
            .borrow_mut()
            .extend(names.iter().map(|n| n.to_string()));
        fake
    }

    pub fn register_environment(&self, project: &str, name: &str) {
        self.environments.borrow_mut().push(Environment {
            project: project.to_string(),
            name: name.to_string(),
            public_load_balancer: true,
        });
    }

    /// Queue an answer for the next text or selection prompt.
    pub fn answer(&self, value: &str) {
        self.answers.borrow_mut().push_back(value.to_string());
    }

    pub fn answer_confirm(&self, value: Result<bool, PromptError>) {
        self.confirms.borrow_mut().push_back(value);
    }

    pub fn progress(&self) -> FakeProgress {
        FakeProgress {
            journal: Rc::clone(&self.journal),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.journal.borrow().clone()
    }

    pub fn called(&self, prefix: &str) -> bool {
        self.journal.borrow().iter().any(|c| c.starts_with(prefix))
    }

    /// Calls whose name starts with one of `prefixes`, in order.
    pub fn calls_matching(&self, prefixes: &[&str]) -> Vec<String> {
        self.journal
            .borrow()
            .iter()
            .filter(|c| prefixes.iter().any(|p| c.starts_with(p)))
            .cloned()
            .collect()
    }

    fn record(&self, call: impl Into<String>) {
        self.journal.borrow_mut().push(call.into());
    }

    fn next_answer(&self) -> Result<String, PromptError> {
        self.answers.borrow_mut().pop_front().ok_or(PromptError::Eof)
    }
}

pub fn collaborators<'a>(fake: &'a Fake, progress: &'a mut FakeProgress) -> Collaborators<'a> {
    Collaborators {
        projects: fake,
        environments: fake,
        deployer: fake,
        workspace: fake,
        prompter: fake,
        progress,
    }
}

pub fn bootstrap<'a>(
    fake: &'a Fake,
    progress: &'a mut FakeProgress,
    request: BootstrapRequest,
) -> Bootstrap<'a> {
    Bootstrap::new(
        request,
        EnvironmentSettings::default(),
        collaborators(fake, progress),
    )
}

pub fn store_failure() -> StoreError {
    StoreError::Read {
        path: PathBuf::from("registry.toml"),
        source: std::io::Error::other("disk unavailable"),
    }
}

impl ProjectStore for Fake {
    fn create_project(&self, project: &Project) -> Result<(), StoreError> {
        self.record(format!("create_project:{}", project.name));
        if let Some(e) = self.create_project_error.borrow_mut().take() {
            return Err(e);
        }
        let mut projects = self.projects.borrow_mut();
        if projects.contains(&project.name) {
            return Err(StoreError::ProjectExists(project.name.clone()));
        }
        projects.push(project.name.clone());
        Ok(())
    }

    fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        self.record("list_projects");
        if self.fail_list_projects.get() {
            return Err(store_failure());
        }
        Ok(self.projects.borrow().iter().map(Project::new).collect())
    }
}

impl EnvironmentStore for Fake {
    fn create_environment(&self, environment: &Environment) -> Result<(), StoreError> {
        self.record(format!(
            "create_environment:{}/{}",
            environment.project, environment.name
        ));
        if let Some(e) = self.create_environment_error.borrow_mut().take() {
            return Err(e);
        }
        self.environments.borrow_mut().push(environment.clone());
        Ok(())
    }

    fn list_environments(&self, project: &str) -> Result<Vec<Environment>, StoreError> {
        self.record(format!("list_environments:{project}"));
        if self.fail_list_environments.get() {
            return Err(store_failure());
        }
        Ok(self
            .environments
            .borrow()
            .iter()
            .filter(|e| e.project == project)
            .cloned()
            .collect())
    }
}

impl EnvironmentDeployer for Fake {
    fn deploy_environment(&self, env: &Environment) -> Result<(), DeployError> {
        self.record(format!("deploy:{}", env.stack_name()));
        if let Some(e) = self.deploy_error.borrow_mut().take() {
            return Err(e);
        }
        self.stacks.borrow_mut().push(env.stack_name());
        Ok(())
    }

    fn wait_for_environment_creation(
        &self,
        env: &Environment,
        _cancel: &CancellationToken,
    ) -> Result<(), DeployError> {
        self.record(format!("wait:{}", env.stack_name()));
        match self.wait_error.borrow_mut().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Workspace for Fake {
    fn summary(&self) -> Result<Summary, WorkspaceError> {
        self.record("workspace_summary");
        match self.bound.borrow().as_ref() {
            Some(project) => Ok(Summary {
                project_name: project.clone(),
            }),
            None => Err(WorkspaceError::NotBound {
                root: PathBuf::from("/work"),
            }),
        }
    }

    fn create(&self, project: &str) -> Result<(), WorkspaceError> {
        self.record(format!("workspace_create:{project}"));
        if let Some(e) = self.workspace_error.borrow_mut().take() {
            return Err(e);
        }
        *self.bound.borrow_mut() = Some(project.to_string());
        Ok(())
    }

    fn write_manifest(&self, content: &[u8], app: &str) -> Result<PathBuf, WorkspaceError> {
        self.record(format!("write_manifest:{app}"));
        self.manifests
            .borrow_mut()
            .push((app.to_string(), content.to_vec()));
        Ok(PathBuf::from(format!("kiln/{app}/manifest.yml")))
    }
}

impl Prompter for Fake {
    fn get(&self, _prompt: &str, _help: &str, validate: Validator) -> Result<String, PromptError> {
        self.record("prompt_get");
        let answer = self.next_answer()?;
        match validate(&answer) {
            Ok(()) => Ok(answer),
            Err(_) => Err(PromptError::TooManyAttempts(1)),
        }
    }

    fn select_one(
        &self,
        _prompt: &str,
        _help: &str,
        options: &[String],
    ) -> Result<String, PromptError> {
        self.record("prompt_select");
        self.offered.borrow_mut().push(options.to_vec());
        let answer = self.next_answer()?;
        if options.contains(&answer) {
            Ok(answer)
        } else {
            Err(PromptError::TooManyAttempts(1))
        }
    }

    fn confirm(&self, _prompt: &str, _help: &str) -> Result<bool, PromptError> {
        self.record("prompt_confirm");
        self.confirms
            .borrow_mut()
            .pop_front()
            .unwrap_or(Err(PromptError::Eof))
    }
}

/// Progress reporter that journals start/stop labels.
pub struct FakeProgress {
    journal: Journal,
}

impl Progress for FakeProgress {
    fn start(&mut self, label: &str) {
        self.journal.borrow_mut().push(format!("progress_start:{label}"));
    }

    fn stop(&mut self, label: &str) {
        self.journal.borrow_mut().push(format!("progress_stop:{label}"));
    }
}
