//! Build service for orchestrating the build process
//!
//! Expands the requested services and architectures into individual
//! `docker buildx build` runs, one at a time.

use anyhow::Result;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    architecture::{host_machine, Architecture},
    buildx::{BuildStatus, BuildxCommand},
    compose::ComposeConfig,
    config::Config,
    model::Service,
};

/// What to build and how
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Services to build; empty means every service in the project
    pub services: Vec<String>,
    pub all_architectures: bool,
    pub ignore_errors: bool,
    /// Overrides the `image` of every selected service
    pub tag: Option<String>,
    pub target: Option<String>,
    pub no_cache: bool,
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Docker build failed for {service} {architecture} image")]
    Failed {
        service: String,
        architecture: Architecture,
        code: Option<i32>,
    },
}

/// Outcome of a run where no failure aborted the loop
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub attempted: usize,
    pub failed: Vec<(String, Architecture)>,
}

/// Service for orchestrating the build process
pub struct BuildService;

impl BuildService {
    pub fn run(
        compose: &ComposeConfig,
        config: &Config,
        options: &BuildOptions,
    ) -> Result<BuildReport> {
        Self::run_on_machine(compose, config, options, host_machine())
    }

    /// Same as [`BuildService::run`], treating `machine` as the host CPU
    pub fn run_on_machine(
        compose: &ComposeConfig,
        config: &Config,
        options: &BuildOptions,
        machine: &str,
    ) -> Result<BuildReport> {
        let architectures = Architecture::selected(options.all_architectures, machine);
        if architectures.is_empty() {
            warn!(
                "No supported architecture matches this machine ({}); use --all-arch to build anyway",
                machine
            );
        }

        let service_names = if options.services.is_empty() {
            compose.service_names()
        } else {
            options.services.clone()
        };
        // Resolve everything up front so a typo fails before any build starts.
        let services = service_names
            .iter()
            .map(|name| compose.get_service(name))
            .collect::<Result<Vec<Service>>>()?;

        if services.len() > 1 && (options.tag.is_some() || options.target.is_some()) {
            warn!("Using --tag or --target likely only makes sense when building just one service !");
        }

        let mut report = BuildReport::default();
        for service in &services {
            let Some(build) = &service.build else {
                debug!("Service {} has no build section, skipping", service.name);
                continue;
            };

            let tag = non_empty(&options.tag).or_else(|| non_empty(&service.image));
            if tag.is_none() {
                warn!(
                    "Service {} has no image name and no --tag was given; the image will be untagged",
                    service.name
                );
            }

            for &architecture in &architectures {
                let command = BuildxCommand::new(&service.name, architecture, build)
                    .on_machine(machine)
                    .with_tags(tag.clone())
                    .with_target(non_empty(&options.target))
                    .with_no_cache(options.no_cache);

                report.attempted += 1;
                if let BuildStatus::Failed { code } = command.run(config)? {
                    if !options.ignore_errors {
                        return Err(BuildError::Failed {
                            service: service.name.clone(),
                            architecture,
                            code,
                        }
                        .into());
                    }
                    report.failed.push((service.name.clone(), architecture));
                }
            }
        }

        info!(
            "Finished {} build(s), {} failed",
            report.attempted,
            report.failed.len()
        );
        Ok(report)
    }
}

/// An empty `--tag ""` or `--target ""` counts as not given
fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|value| !value.is_empty())
}
