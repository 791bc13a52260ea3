//! Configuration for a single pull-and-run invocation

use crate::error::{Result, RunnerError};

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Region the authorization token is requested for, e.g. `ap-south-1`.
    pub region: String,
    /// Fully qualified image reference: `registry-host/repository:tag`.
    pub image_uri: String,
    /// Authorization API base URL; derived from the region when not set.
    pub auth_api: Option<String>,
    /// Remote telemetry ingest URL; telemetry is a no-op when unset.
    pub telemetry_url: Option<String>,
    /// Binary used for login/pull/run invocations.
    pub docker_bin: String,
    pub skip_tls: bool,
    pub verbose: bool,
}

impl RunnerConfig {
    pub fn new(
        region: String,
        image_uri: String,
        auth_api: Option<String>,
        telemetry_url: Option<String>,
        docker_bin: String,
        skip_tls: bool,
        verbose: bool,
    ) -> Result<Self> {
        let config = RunnerConfig {
            region,
            image_uri,
            auth_api,
            telemetry_url,
            docker_bin,
            skip_tls,
            verbose,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.region.is_empty() {
            return Err(RunnerError::Configuration(
                "Region cannot be empty".to_string(),
            ));
        }

        if self.image_uri.is_empty() {
            return Err(RunnerError::Configuration(
                "Image URI cannot be empty".to_string(),
            ));
        }

        if !self.image_uri.contains('/') {
            return Err(RunnerError::Configuration(format!(
                "Invalid image URI '{}'. Expected: registry-host/repository:tag",
                self.image_uri
            )));
        }

        // A colon after the last slash is a tag separator and the tag must be non-empty
        if let Some(path) = self.image_uri.rsplit('/').next() {
            if let Some((_, tag)) = path.split_once(':') {
                if tag.is_empty() {
                    return Err(RunnerError::Configuration(format!(
                        "Image URI '{}' has an empty tag",
                        self.image_uri
                    )));
                }
            }
        }

        if self.docker_bin.is_empty() {
            return Err(RunnerError::Configuration(
                "Docker binary cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Authorization API endpoint, explicit override or derived from the region.
    pub fn auth_api_url(&self) -> String {
        match &self.auth_api {
            Some(url) => url.clone(),
            None => format!("https://api.ecr.{}.amazonaws.com/", self.region),
        }
    }
}
