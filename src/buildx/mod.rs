use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, error, info};

use crate::architecture::Architecture;
use crate::config::Config;
use crate::model::{BuildArg, ServiceBuild};


/// One `docker buildx build` invocation for a service and architecture
#[derive(Debug, Clone)]
pub struct BuildxCommand {
    service: String,
    architecture: Architecture,
    load: bool,
    no_cache: bool,
    build_args: Vec<BuildArg>,
    tags: Vec<String>,
    target: Option<String>,
    ssh: Vec<String>,
    dockerfile: PathBuf,
    context: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStatus {
    Succeeded,
    /// `code` is `None` when the build was killed by a signal
    Failed { code: Option<i32> },
}

impl BuildxCommand {
    pub fn new(service: &str, architecture: Architecture, build: &ServiceBuild) -> Self {
        Self {
            service: service.to_string(),
            architecture,
            load: architecture.is_current_architecture(),
            no_cache: false,
            build_args: build.args.clone(),
            tags: Vec::new(),
            target: None,
            ssh: build.ssh.clone(),
            dockerfile: build.dockerfile.clone(),
            context: build.context.clone(),
        }
    }

    /// Decide `--load` as if running on `machine` instead of the host
    pub fn on_machine(mut self, machine: &str) -> Self {
        self.load = self.architecture.matches_machine(machine);
        self
    }

    /// Accepts a single tag (`Some(tag)`), no tag (`None`) or a list
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_target(mut self, target: Option<String>) -> Self {
        self.target = target;
        self
    }

    pub fn with_no_cache(mut self, no_cache: bool) -> Self {
        self.no_cache = no_cache;
        self
    }

    /// Arguments passed to the docker binary, starting with `buildx build`
    pub fn args(&self) -> Result<Vec<String>> {
        let mut args: Vec<String> = vec![
            "buildx".into(),
            "build".into(),
            "--platform".into(),
            self.architecture.platform().into(),
        ];

        // Images for a foreign CPU cannot be loaded into the local store.
        if self.load {
            args.push("--load".into());
        }
        if self.no_cache {
            args.push("--no-cache".into());
        }
        for build_arg in &self.build_args {
            args.push("--build-arg".into());
            args.push(build_arg.flag_value());
        }
        for tag in &self.tags {
            args.push("--tag".into());
            args.push(tag.clone());
        }
        if let Some(target) = &self.target {
            args.push("--target".into());
            args.push(target.clone());
        }
        for ssh in &self.ssh {
            args.push("--ssh".into());
            args.push(ssh.clone());
        }

        let context = absolute(&self.context)?;
        let dockerfile = if self.dockerfile.is_absolute() {
            self.dockerfile.clone()
        } else {
            context.join(&self.dockerfile)
        };
        args.push("-f".into());
        args.push(dockerfile.to_string_lossy().into_owned());
        args.push(context.to_string_lossy().into_owned());

        Ok(args)
    }

    pub fn run(&self, config: &Config) -> Result<BuildStatus> {
        let args = self.args()?;
        let command_line = format_command(&config.docker, &args);

        let msg = format!("Building {} {} image", self.service, self.architecture);
        info!("{}", banner(&msg));
        info!("{}", msg);
        debug!("{}", command_line);
        info!("{}", banner(&msg));

        let status = Command::new(&config.docker)
            .args(&args)
            .status()
            .with_context(|| format!("Failed to execute {}", config.docker))?;

        if status.success() {
            return Ok(BuildStatus::Succeeded);
        }

        let msg = format!(
            "Docker build failed for {} {} image !",
            self.service, self.architecture
        );
        error!("{}", banner(&msg));
        error!("{}", msg);
        error!("{}", command_line);

        Ok(BuildStatus::Failed {
            code: status.code(),
        })
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path)
        .with_context(|| format!("Failed to resolve build path {}", path.display()))
}

/// Separator line as wide as the longest line of `msg`
pub fn banner(msg: &str) -> String {
    let width = msg.lines().map(|line| line.chars().count()).max().unwrap_or(0);
    "=".repeat(width)
}

/// Render a command with every flag on its own indented line
pub fn format_command(program: &str, args: &[String]) -> String {
    let mut out = program.to_string();
    for arg in args {
        if arg.starts_with('-') {
            out.push_str("\n\t");
        } else {
            out.push(' ');
        }
        out.push_str(arg);
    }
    out
}
