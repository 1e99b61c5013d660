//! Local stack provisioning under `~/.kiln/stacks/`
//!
//! Beginning a deployment renders the environment template, records the
//! stack as `create-in-progress` and hands provisioning to a worker
//! thread. Waiting polls the record until the worker marks it
//! `create-complete` or `create-failed`.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::{DeployError, EnvironmentDeployer};
use crate::paths::stacks;
use crate::store::Environment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StackStatus {
    CreateInProgress,
    CreateComplete,
    CreateFailed,
}

/// Contents of `stack.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StackRecord {
    stack: String,
    project: String,
    environment: String,
    status: StackStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    created: String,
    updated: String,
}

impl StackRecord {
    fn load(path: &Path) -> Result<Option<Self>, DeployError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(|source| DeployError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let record = toml::from_str(&content).map_err(|source| DeployError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Some(record))
    }

    fn save(&self, path: &Path) -> Result<(), DeployError> {
        let content = toml::to_string_pretty(self)?;
        write_atomic(path, content.as_bytes())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ResourceKind {
    Network,
    Cluster,
    LoadBalancer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Resource {
    name: String,
    #[serde(rename = "type")]
    kind: ResourceKind,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    properties: BTreeMap<String, String>,
}

/// Rendered `template.yml`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StackTemplate {
    description: String,
    parameters: BTreeMap<String, String>,
    resources: Vec<Resource>,
}

fn render_template(env: &Environment) -> StackTemplate {
    let parameters = BTreeMap::from([
        ("project".to_string(), env.project.clone()),
        ("environment".to_string(), env.name.clone()),
    ]);

    let scheme = if env.public_load_balancer {
        "internet-facing"
    } else {
        "internal"
    };

    StackTemplate {
        description: format!(
            "Shared infrastructure for the {} environment of project {}",
            env.name, env.project
        ),
        parameters,
        resources: vec![
            Resource {
                name: "network".to_string(),
                kind: ResourceKind::Network,
                properties: BTreeMap::from([("cidr".to_string(), "10.0.0.0/16".to_string())]),
            },
            Resource {
                name: "cluster".to_string(),
                kind: ResourceKind::Cluster,
                properties: BTreeMap::new(),
            },
            Resource {
                name: "load-balancer".to_string(),
                kind: ResourceKind::LoadBalancer,
                properties: BTreeMap::from([("scheme".to_string(), scheme.to_string())]),
            },
        ],
    }
}

fn write_atomic(path: &Path, content: &[u8]) -> Result<(), DeployError> {
    let io_err = |source| DeployError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, content).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)
}

/// Create every resource in the rendered template and record its outputs.
fn provision(root: &Path, stack: &str) -> Result<(), DeployError> {
    let template_path = stacks::template_path(root, stack);
    let content = fs::read_to_string(&template_path).map_err(|source| DeployError::Io {
        path: template_path.clone(),
        source,
    })?;
    let template: StackTemplate = serde_yaml::from_str(&content)?;

    let mut outputs = BTreeMap::new();
    for resource in &template.resources {
        let id = Uuid::new_v4().simple().to_string();
        let key = format!("{}-id", resource.name);
        if resource.kind == ResourceKind::LoadBalancer {
            outputs.insert(
                "load-balancer-dns".to_string(),
                format!("{stack}-{}.lb.kiln.local", &id[..8]),
            );
        }
        outputs.insert(key, id);
    }
    write_atomic(
        &stacks::outputs_path(root, stack),
        toml::to_string_pretty(&outputs)?.as_bytes(),
    )?;

    set_status(root, stack, StackStatus::CreateComplete, None)
}

fn set_status(
    root: &Path,
    stack: &str,
    status: StackStatus,
    reason: Option<String>,
) -> Result<(), DeployError> {
    let path = stacks::record_path(root, stack);
    let mut record =
        StackRecord::load(&path)?.ok_or_else(|| DeployError::StackNotFound(stack.to_string()))?;
    record.status = status;
    record.reason = reason;
    record.updated = Utc::now().to_rfc3339();
    record.save(&path)
}

/// Shortest wait between stack status checks.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Provisions environment stacks into a local directory.
#[derive(Debug, Clone)]
pub struct LocalStackDeployer {
    root: PathBuf,
    poll_interval: Duration,
}

impl LocalStackDeployer {
    pub fn new(root: impl Into<PathBuf>, poll_interval: Duration) -> Self {
        Self {
            root: root.into(),
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
        }
    }

    /// Deployer for `~/.kiln/stacks/`
    pub fn open_default(poll_interval: Duration) -> Self {
        Self::new(stacks::root(), poll_interval)
    }

    /// Current status of a stack, if it exists.
    pub fn status(&self, stack: &str) -> Result<Option<StackStatus>, DeployError> {
        Ok(StackRecord::load(&stacks::record_path(&self.root, stack))?.map(|r| r.status))
    }
}

impl EnvironmentDeployer for LocalStackDeployer {
    fn deploy_environment(&self, env: &Environment) -> Result<(), DeployError> {
        let stack = env.stack_name();
        let record_path = stacks::record_path(&self.root, &stack);
        if record_path.exists() {
            return Err(DeployError::StackExists(stack));
        }

        let template = serde_yaml::to_string(&render_template(env))?;
        write_atomic(&stacks::template_path(&self.root, &stack), template.as_bytes())?;

        let now = Utc::now().to_rfc3339();
        StackRecord {
            stack: stack.clone(),
            project: env.project.clone(),
            environment: env.name.clone(),
            status: StackStatus::CreateInProgress,
            reason: None,
            created: now.clone(),
            updated: now,
        }
        .save(&record_path)?;
        tracing::info!(%stack, "stack creation started");

        let root = self.root.clone();
        let worker_stack = stack.clone();
        thread::Builder::new()
            .name(format!("provision-{stack}"))
            .spawn(move || {
                if let Err(e) = provision(&root, &worker_stack) {
                    tracing::warn!(stack = %worker_stack, error = %e, "provisioning failed");
                    let reason = Some(e.to_string());
                    if let Err(e) = set_status(&root, &worker_stack, StackStatus::CreateFailed, reason) {
                        tracing::error!(stack = %worker_stack, error = %e, "could not record failure");
                    }
                }
            })
            .map_err(|source| DeployError::Io {
                path: stacks::stack_dir(&self.root, &stack),
                source,
            })?;

        Ok(())
    }

    fn wait_for_environment_creation(
        &self,
        env: &Environment,
        cancel: &CancellationToken,
    ) -> Result<(), DeployError> {
        let stack = env.stack_name();
        let record_path = stacks::record_path(&self.root, &stack);

        loop {
            if cancel.is_cancelled() {
                return Err(DeployError::Cancelled(stack));
            }

            let record = StackRecord::load(&record_path)?
                .ok_or_else(|| DeployError::StackNotFound(stack.clone()))?;

            match record.status {
                StackStatus::CreateComplete => {
                    tracing::info!(%stack, "stack created");
                    return Ok(());
                }
                StackStatus::CreateFailed => {
                    return Err(DeployError::StackFailed {
                        stack,
                        reason: record.reason.unwrap_or_else(|| "unknown".to_string()),
                    });
                }
                StackStatus::CreateInProgress => {
                    tracing::debug!(%stack, "stack still creating");
                    thread::sleep(self.poll_interval);
                }
            }
        }
    }
}
