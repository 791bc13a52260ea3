//! Command-line argument parsing

use crate::config::RunnerConfig;
use crate::error::{Result, RunnerError};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "ecr-image-runner")]
#[command(about = "Authenticate against an ECR-style registry, pull a container image and run it")]
#[command(version)]
pub struct Args {
    /// Registry region
    #[arg(
        long = "region",
        short = 'r',
        help = "Region to request an authorization token for, e.g. ap-south-1"
    )]
    pub region: Option<String>,

    /// Image reference
    #[arg(
        long = "image",
        short = 'i',
        help = "Fully qualified image reference: registry-host/repository:tag"
    )]
    pub image: Option<String>,

    /// Authorization API override
    #[arg(
        long = "auth-api",
        help = "Authorization API base URL (default derived from the region)"
    )]
    pub auth_api: Option<String>,

    /// Telemetry ingest URL
    #[arg(
        long = "telemetry-url",
        help = "Remote telemetry ingest URL; telemetry is disabled when omitted"
    )]
    pub telemetry_url: Option<String>,

    /// Docker binary
    #[arg(
        long = "docker-bin",
        default_value = "docker",
        help = "Binary used for the login, pull and run invocations"
    )]
    pub docker_bin: String,

    /// Skip TLS verification
    #[arg(
        long = "skip-tls",
        short = 'k',
        default_value = "false",
        help = "Skip TLS certificate verification for the authorization API"
    )]
    pub skip_tls: bool,

    /// Verbose output
    #[arg(long = "verbose", short = 'v', help = "Enable verbose output")]
    pub verbose: bool,

    /// Quiet output
    #[arg(long = "quiet", short = 'q', help = "Only print warnings and errors")]
    pub quiet: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Args::parse()
    }

    /// Load missing values from environment variables
    pub fn from_env(mut self) -> Self {
        if self.region.is_none() {
            self.region = std::env::var("IMAGE_RUNNER_REGION").ok();
        }

        if self.image.is_none() {
            self.image = std::env::var("IMAGE_RUNNER_IMAGE").ok();
        }

        if self.telemetry_url.is_none() {
            self.telemetry_url = std::env::var("IMAGE_RUNNER_TELEMETRY_URL").ok();
        }

        if std::env::var("IMAGE_RUNNER_VERBOSE").is_ok() {
            self.verbose = true;
        }

        self
    }

    /// Build the runner configuration, validating the arguments.
    pub fn into_config(self) -> Result<RunnerConfig> {
        let region = self.region.ok_or_else(|| {
            RunnerError::Configuration(
                "Region is required (--region or IMAGE_RUNNER_REGION)".to_string(),
            )
        })?;
        let image = self.image.ok_or_else(|| {
            RunnerError::Configuration(
                "Image is required (--image or IMAGE_RUNNER_IMAGE)".to_string(),
            )
        })?;

        RunnerConfig::new(
            region,
            image,
            self.auth_api,
            self.telemetry_url,
            self.docker_bin,
            self.skip_tls,
            self.verbose,
        )
    }

    /// Print usage examples
    pub fn print_examples() {
        println!("Examples:");
        println!("  # Pull and run an image from an ECR registry");
        println!("  ecr-image-runner -r ap-south-1 \\");
        println!("                   -i 975049994612.dkr.ecr.ap-south-1.amazonaws.com/mnist:latest");
        println!();
        println!("  # Stream command output to a telemetry session");
        println!("  ecr-image-runner -r ap-south-1 -i registry.example.com/app:v1.0 \\");
        println!("                   --telemetry-url https://telemetry.example.com/");
        println!();
        println!("  # Using environment variables");
        println!("  export IMAGE_RUNNER_REGION=ap-south-1");
        println!("  export IMAGE_RUNNER_IMAGE=registry.example.com/app:latest");
        println!("  ecr-image-runner");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_from(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn builds_config_from_flags() {
        let args = args_from(&[
            "ecr-image-runner",
            "-r",
            "ap-south-1",
            "-i",
            "975049994612.dkr.ecr.ap-south-1.amazonaws.com/mnist:latest",
        ]);
        let config = args.into_config().unwrap();
        assert_eq!(config.region, "ap-south-1");
        assert_eq!(config.docker_bin, "docker");
        assert!(config.telemetry_url.is_none());
    }

    #[test]
    fn missing_region_is_a_configuration_error() {
        let args = args_from(&["ecr-image-runner", "-i", "registry.example.com/app:latest"]);
        assert!(matches!(
            args.into_config(),
            Err(RunnerError::Configuration(_))
        ));
    }

    #[test]
    fn missing_image_is_a_configuration_error() {
        let args = args_from(&["ecr-image-runner", "-r", "ap-south-1"]);
        assert!(matches!(
            args.into_config(),
            Err(RunnerError::Configuration(_))
        ));
    }
}
