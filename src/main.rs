use anyhow::Result;
use clap::Parser;
use compose_buildx::{
    cli::Cli,
    compose::ComposeConfig,
    config::Config,
    service::{BuildError, BuildService},
};
use std::io::IsTerminal;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging to stderr
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .init();

    let config = Config::load()?;
    let compose = ComposeConfig::load(&config)?;

    match BuildService::run(&compose, &config, &cli.build_options()) {
        Ok(report) => {
            if !report.failed.is_empty() {
                info!("Ignored failures:");
                for (service, architecture) in &report.failed {
                    info!("  {} {}", service, architecture);
                }
            }
            Ok(())
        }
        // The failing build has already been reported in full.
        Err(err) if err.downcast_ref::<BuildError>().is_some() => std::process::exit(1),
        Err(err) => Err(err),
    }
}
