pub mod architecture;
pub mod buildx;
pub mod cli;
pub mod compose;
pub mod config;
pub mod constants;
pub mod model;
pub mod service;

pub use anyhow::Result;
