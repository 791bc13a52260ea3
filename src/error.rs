//! Error handling module for the ECR image runner

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Parse error: {0}")]
    Parse(String),

    /// A checked external command finished with a non-zero exit code.
    #[error("Command `{command}` failed with return code {code}: {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("Telemetry error: {0}")]
    Telemetry(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RunnerError>;
