//! docker-compose project configuration
//!
//! The compose tool itself resolves the project (merging files, interpolating
//! variables, normalizing short forms); this module only decodes the JSON it
//! prints and picks out the fields needed to drive `docker buildx build`.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::process::Command;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::model::{BuildArg, Service, ServiceBuild};


#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("Service {0} not found in docker-compose config")]
    ServiceNotFound(String),
}

/// Fully rendered compose project, as printed by `docker-compose config`
#[derive(Debug, Clone)]
pub struct ComposeConfig {
    services: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawProject {
    #[serde(default)]
    services: Map<String, Value>,
}

// Only the keys listed in these records are read; anything else the compose
// tool emits is ignored.

#[derive(Debug, Deserialize)]
struct RawService {
    image: Option<String>,
    build: Option<RawBuild>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawBuild {
    Context(String),
    Section(RawBuildSection),
}

#[derive(Debug, Deserialize)]
struct RawBuildSection {
    dockerfile: Option<String>,
    context: Option<String>,
    #[serde(default)]
    args: Option<RawArgs>,
    #[serde(default)]
    ssh: Option<RawSsh>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawArgs {
    Map(Map<String, Value>),
    List(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawSsh {
    List(Vec<String>),
    Map(Map<String, Value>),
}

impl ComposeConfig {
    /// Render the project with the configured compose command and decode it
    pub fn load(config: &Config) -> Result<Self> {
        let (program, args) = config
            .compose_command
            .split_first()
            .context("compose_command must not be empty")?;

        let mut cmd = Command::new(program);
        cmd.args(args).args(["config", "--format", "json"]);

        debug!("Running command: {:?}", cmd);
        let output = cmd
            .output()
            .with_context(|| format!("Failed to execute {}", program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("{} config failed ({}): {}", program, output.status, stderr.trim());
        }

        // Interpolation warnings (unset variables and the like) still matter on success.
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            if !line.trim().is_empty() {
                warn!("{}", line);
            }
        }

        let json = String::from_utf8(output.stdout)
            .with_context(|| format!("{} config printed invalid UTF-8", program))?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let project: RawProject =
            serde_json::from_str(json).context("Failed to parse docker-compose config")?;
        Ok(Self {
            services: project.services,
        })
    }

    /// Service names in declaration order
    pub fn service_names(&self) -> Vec<String> {
        self.services.keys().cloned().collect()
    }

    pub fn get_service(&self, name: &str) -> Result<Service> {
        let raw = self
            .services
            .get(name)
            .ok_or_else(|| ComposeError::ServiceNotFound(name.to_string()))?;

        let raw: RawService = serde_json::from_value(raw.clone())
            .with_context(|| format!("Invalid docker-compose config for service {}", name))?;

        Ok(Service {
            name: name.to_string(),
            image: raw.image,
            build: raw.build.map(RawBuild::into_service_build),
        })
    }
}

impl RawBuild {
    fn into_service_build(self) -> ServiceBuild {
        let defaults = ServiceBuild::default();
        match self {
            RawBuild::Context(context) => ServiceBuild {
                context: PathBuf::from(context),
                ..defaults
            },
            RawBuild::Section(section) => ServiceBuild {
                dockerfile: section
                    .dockerfile
                    .map(PathBuf::from)
                    .unwrap_or(defaults.dockerfile),
                context: section
                    .context
                    .map(PathBuf::from)
                    .unwrap_or(defaults.context),
                args: section.args.map(RawArgs::into_build_args).unwrap_or_default(),
                ssh: section.ssh.map(RawSsh::into_specs).unwrap_or_default(),
            },
        }
    }
}

impl RawArgs {
    fn into_build_args(self) -> Vec<BuildArg> {
        match self {
            RawArgs::Map(map) => map
                .into_iter()
                .map(|(name, value)| BuildArg {
                    name,
                    value: scalar_to_string(value),
                })
                .collect(),
            RawArgs::List(list) => list
                .into_iter()
                .map(|entry| match entry.split_once('=') {
                    Some((name, value)) => BuildArg::new(name, value),
                    None => BuildArg {
                        name: entry,
                        value: None,
                    },
                })
                .collect(),
        }
    }
}

impl RawSsh {
    fn into_specs(self) -> Vec<String> {
        match self {
            RawSsh::List(list) => list,
            RawSsh::Map(map) => map
                .into_iter()
                .map(|(id, path)| match scalar_to_string(path) {
                    Some(path) if !path.is_empty() => format!("{}={}", id, path),
                    _ => id,
                })
                .collect(),
        }
    }
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}
