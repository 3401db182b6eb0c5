use std::path::PathBuf;

use crate::constants::build::{DEFAULT_CONTEXT, DEFAULT_DOCKERFILE};

/// One `--build-arg`; a missing value lets buildx read it from its environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArg {
    pub name: String,
    pub value: Option<String>,
}

impl BuildArg {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// Value of the `--build-arg` flag
    pub fn flag_value(&self) -> String {
        match &self.value {
            Some(value) => format!("{}={}", self.name, value),
            None => self.name.clone(),
        }
    }
}

/// The `build` section of a compose service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceBuild {
    pub dockerfile: PathBuf,
    pub context: PathBuf,
    pub args: Vec<BuildArg>,
    pub ssh: Vec<String>,
}

impl Default for ServiceBuild {
    fn default() -> Self {
        Self {
            dockerfile: PathBuf::from(DEFAULT_DOCKERFILE),
            context: PathBuf::from(DEFAULT_CONTEXT),
            args: Vec::new(),
            ssh: Vec::new(),
        }
    }
}

/// A compose service; only services with a `build` section produce images
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    pub name: String,
    pub image: Option<String>,
    pub build: Option<ServiceBuild>,
}
