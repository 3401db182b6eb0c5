//! Service layer for business logic orchestration
//!
//! Turns parsed command line options and the loaded compose project into a
//! sequence of buildx runs, keeping that logic out of main.rs.

pub mod build;

pub use build::{BuildError, BuildOptions, BuildReport, BuildService};
