//! ECR Image Runner Library
//!
//! This file serves as the library root for the ecr-image-runner crate,
//! organizing and exposing the modules that make up the application.

pub mod cli;
pub mod config;
pub mod docker;
pub mod error;
pub mod output;
pub mod registry;
pub mod telemetry;

pub use config::RunnerConfig;
pub use error::{Result, RunnerError};
pub use output::OutputManager;
