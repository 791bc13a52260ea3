//! Pipeline runner sequencing resolve, login, pull and run
//!
//! Login and pull are checked: a failure there aborts the remaining stages
//! and surfaces as the overall result. The run stage is best effort and never
//! aborts. Whatever path is taken, the telemetry session is closed exactly
//! once before control returns to the caller.

use crate::config::RunnerConfig;
use crate::docker::{self, CommandRunner};
use crate::error::Result;
use crate::output::OutputManager;
use crate::registry::AuthClient;
use crate::telemetry::TelemetrySink;

pub struct Runner {
    config: RunnerConfig,
    output: OutputManager,
}

impl Runner {
    pub fn new(config: RunnerConfig, output: OutputManager) -> Self {
        Self { config, output }
    }

    /// Run the full pipeline and close the telemetry session.
    pub async fn run(&self, telemetry: &mut dyn TelemetrySink) -> Result<()> {
        let result = self.run_pipeline(&*telemetry).await;

        match &result {
            Ok(()) => self
                .output
                .success("Docker image pulled and run command executed successfully"),
            Err(e) => self.output.error(&format!("An error occurred: {}", e)),
        }

        // Always reached, on the success path and on the error path alike
        if let Err(e) = telemetry.close().await {
            self.output
                .warning(&format!("Failed to close telemetry session: {}", e));
        }

        result
    }

    async fn run_pipeline(&self, telemetry: &dyn TelemetrySink) -> Result<()> {
        self.output.section("ECR Image Runner");
        self.output
            .info(&format!("Image: {}", self.config.image_uri));

        // Stage 1: resolve a short-lived credential for the region
        self.output.step("Resolving registry credentials");
        let auth = AuthClient::new(&self.config.auth_api_url(), self.config.skip_tls)?;
        let credential = auth.resolve_credentials(&self.output).await?;

        let runner = CommandRunner::new(&self.config.docker_bin, self.output.clone());

        // Stage 2: login, hard failure aborts the sequence
        self.output.step("Logging in to the registry");
        runner
            .run_checked(&docker::login_args(
                &credential.username,
                &credential.password,
                &credential.endpoint,
            ))
            .await?;
        self.output
            .info(&format!("Logged in to {}", credential.endpoint));

        // Stage 3: pull, hard failure aborts the sequence
        self.output.step("Pulling the image");
        runner
            .run_checked(&docker::pull_args(&self.config.image_uri))
            .await?;
        self.output
            .info(&format!("Pulled {}", self.config.image_uri));

        // Stage 4: run, best effort. The exit code is recorded in both sinks
        // by the logged runner but does not change the overall outcome.
        self.output.step("Running the image");
        let exit_code = runner
            .run_logged(&docker::run_args(&self.config.image_uri), telemetry)
            .await;
        if let Some(code) = exit_code {
            self.output
                .detail(&format!("Run step finished with exit code {}", code));
        }

        Ok(())
    }
}
