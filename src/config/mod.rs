use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::command::{DOCKER, DOCKER_COMPOSE};


#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Docker binary providing `buildx`
    #[serde(default = "default_docker")]
    pub docker: String,

    /// Program and leading arguments used to render the compose project
    #[serde(default = "default_compose_command")]
    pub compose_command: Vec<String>,
}

fn default_docker() -> String {
    DOCKER.to_string()
}

fn default_compose_command() -> Vec<String> {
    if which::which(DOCKER_COMPOSE).is_ok() {
        vec![DOCKER_COMPOSE.to_string()]
    } else {
        vec![DOCKER.to_string(), "compose".to_string()]
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            docker: default_docker(),
            compose_command: default_compose_command(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("compose-buildx").join("config.toml");
            if config_path.exists() {
                return Self::load_from(&config_path);
            }
        }
        Ok(Config::default())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        if config.compose_command.is_empty() {
            anyhow::bail!("compose_command in {} must not be empty", path.display());
        }
        Ok(config)
    }
}
