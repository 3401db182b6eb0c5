use clap::Parser;

use crate::architecture::host_machine;
use crate::service::BuildOptions;

#[derive(Parser)]
#[command(name = "compose-buildx")]
#[command(author, version, about = "Docker Compose 'buildx' helper", long_about = None)]
pub struct Cli {
    /// Services to build (all services with a build section by default)
    #[arg(value_name = "SRV")]
    pub services: Vec<String>,

    #[arg(long = "all-arch", help = all_arch_help())]
    pub all_architectures: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Continue building even on errors
    #[arg(long)]
    pub ignore_errors: bool,

    /// Just build selected target stage of Dockerfile
    #[arg(long, value_name = "STAGE")]
    pub target: Option<String>,

    /// Use given tag instead of the image/tag configured by docker compose
    #[arg(long)]
    pub tag: Option<String>,

    /// Don't use previously cached layers while building
    #[arg(long)]
    pub no_cache: bool,
}

fn all_arch_help() -> String {
    format!(
        "Build for all architectures, not just for {}",
        host_machine()
    )
}

impl Cli {
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            services: self.services.clone(),
            all_architectures: self.all_architectures,
            ignore_errors: self.ignore_errors,
            tag: self.tag.clone(),
            target: self.target.clone(),
            no_cache: self.no_cache,
        }
    }
}
