//! Global configuration stored in `~/.kiln/config.toml`
//!
//! All sections are optional with defaults, so a missing or partial file
//! still loads.
//!
//! ```toml
//! [deploy]
//! environment = "test"
//! public_load_balancer = true
//! poll_interval_ms = 500
//! on_prompt_error = "decline"
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::names::validate_environment_name;

/// Configuration for kiln
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub deploy: DeploySection,
}

/// What to do when the deploy confirmation cannot be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptErrorPolicy {
    /// Treat the failure as "no" and carry on.
    #[default]
    Decline,
    /// Fail the command with the prompt error.
    Abort,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploySection {
    /// Name of the first environment created for a project
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Whether the environment's load balancer is internet-facing
    #[serde(default = "default_public_load_balancer")]
    pub public_load_balancer: bool,
    /// How often to poll a stack while it is being created
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default)]
    pub on_prompt_error: PromptErrorPolicy,
}

fn default_environment() -> String {
    "test".to_string()
}
fn default_public_load_balancer() -> bool {
    true
}
fn default_poll_interval_ms() -> u64 {
    500
}

impl Default for DeploySection {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            public_load_balancer: default_public_load_balancer(),
            poll_interval_ms: default_poll_interval_ms(),
            on_prompt_error: PromptErrorPolicy::default(),
        }
    }
}

impl DeploySection {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Config {
    /// Load configuration from `~/.kiln/config.toml`
    pub fn load() -> Result<Self> {
        Self::load_from(&crate::paths::config_path())
    }

    /// Load configuration from a path, or return defaults if not found.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        validate_environment_name(&self.deploy.environment).with_context(|| {
            format!("invalid [deploy] environment '{}'", self.deploy.environment)
        })?;
        if self.deploy.poll_interval_ms == 0 {
            bail!("[deploy] poll_interval_ms must be at least 1");
        }
        Ok(())
    }
}
