pub mod local;

use std::path::PathBuf;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::error::Conflict;
use crate::store::Environment;

pub use local::LocalStackDeployer;

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("stack '{0}' already exists")]
    StackExists(String),
    #[error("stack '{0}' not found")]
    StackNotFound(String),
    #[error("stack '{stack}' failed to create: {reason}")]
    StackFailed { stack: String, reason: String },
    #[error("cancelled while waiting for stack '{0}'")]
    Cancelled(String),
    #[error("failed to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse stack record {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to serialize stack record")]
    Serialize(#[from] toml::ser::Error),
    #[error("failed to render stack template")]
    Render(#[from] serde_yaml::Error),
}

impl Conflict for DeployError {
    fn is_conflict(&self) -> bool {
        matches!(self, DeployError::StackExists(_))
    }
}

/// Trait for environment infrastructure provisioning
pub trait EnvironmentDeployer {
    /// Start provisioning the environment's stack. Fails with
    /// [`DeployError::StackExists`] when the stack is already there.
    fn deploy_environment(&self, env: &Environment) -> Result<(), DeployError>;

    /// Block until the stack reaches a terminal state. Returns
    /// [`DeployError::Cancelled`] once `cancel` fires.
    fn wait_for_environment_creation(
        &self,
        env: &Environment,
        cancel: &CancellationToken,
    ) -> Result<(), DeployError>;
}
