//! Application manifests
//!
//! A manifest is a pure function of the application name and its template
//! kind. It is serialized as YAML and written into the workspace by the
//! caller.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Supported application templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppKind {
    #[serde(rename = "Load Balanced Web App")]
    LoadBalancedWebApp,
}

impl AppKind {
    pub const ALL: &'static [AppKind] = &[AppKind::LoadBalancedWebApp];

    pub fn as_str(self) -> &'static str {
        match self {
            AppKind::LoadBalancedWebApp => "Load Balanced Web App",
        }
    }

    /// Display names for a selection prompt.
    pub fn options() -> Vec<String> {
        Self::ALL.iter().map(|k| k.as_str().to_string()).collect()
    }
}

impl fmt::Display for AppKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppKind {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ManifestError::UnknownKind(s.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("unsupported application type '{0}'")]
    UnknownKind(String),
    #[error("failed to serialize manifest")]
    Marshal(#[from] serde_yaml::Error),
}

/// Application manifest written to `kiln/<app>/manifest.yml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AppKind,
    pub image: ImageSection,
    pub http: HttpSection,
    pub cpu: u32,
    pub memory: u32,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSection {
    /// Dockerfile used to build the application image
    pub build: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSection {
    /// Requests matching this path are routed to the application
    pub path: String,
    #[serde(rename = "healthcheck")]
    pub health_check: String,
}

impl Manifest {
    /// Derive the manifest for an application of the given kind.
    pub fn create(name: &str, kind: &str) -> Result<Self, ManifestError> {
        let kind: AppKind = kind.parse()?;
        Ok(match kind {
            AppKind::LoadBalancedWebApp => Self {
                name: name.to_string(),
                kind,
                image: ImageSection {
                    build: "Dockerfile".to_string(),
                    port: 80,
                },
                http: HttpSection {
                    path: "*".to_string(),
                    health_check: "/".to_string(),
                },
                cpu: 256,
                memory: 512,
                count: 1,
            },
        })
    }

    pub fn marshal(&self) -> Result<Vec<u8>, ManifestError> {
        let body = serde_yaml::to_string(self)?;
        let header = format!(
            "# The manifest for the \"{}\" application.\n# Read by kiln when building and deploying it.\n",
            self.name
        );
        Ok(format!("{header}{body}").into_bytes())
    }
}
