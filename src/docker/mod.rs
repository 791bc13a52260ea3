//! External Docker CLI invocation
//!
//! Two execution variants are provided: checked execution, where a non-zero
//! exit code aborts the caller, and logged execution, which records the
//! outcome to the console and the telemetry sink and never fails.

use crate::error::{Result, RunnerError};
use crate::output::OutputManager;
use crate::telemetry::TelemetrySink;
use tokio::process::Command;

/// Captured result of a single external command execution.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Full command line, program included.
    pub command: Vec<String>,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }
}

/// Arguments for `docker login -u <user> -p <password> <endpoint>`.
pub fn login_args(username: &str, password: &str, endpoint: &str) -> Vec<String> {
    vec![
        "login".to_string(),
        "-u".to_string(),
        username.to_string(),
        "-p".to_string(),
        password.to_string(),
        endpoint.to_string(),
    ]
}

/// Arguments for `docker pull <image>`.
pub fn pull_args(image_uri: &str) -> Vec<String> {
    vec!["pull".to_string(), image_uri.to_string()]
}

/// Arguments for `docker run -it <image>`.
pub fn run_args(image_uri: &str) -> Vec<String> {
    vec!["run".to_string(), "-it".to_string(), image_uri.to_string()]
}

/// Render a command line for logging, masking the value after `-p`.
pub fn masked_command_line(command: &[String]) -> String {
    let mut rendered = Vec::with_capacity(command.len());
    let mut mask_next = false;
    for part in command {
        if mask_next {
            rendered.push("***".to_string());
            mask_next = false;
        } else {
            rendered.push(part.clone());
        }
        if part == "-p" || part == "--password" {
            mask_next = true;
        }
    }
    rendered.join(" ")
}

pub struct CommandRunner {
    program: String,
    output: OutputManager,
}

impl CommandRunner {
    pub fn new(program: &str, output: OutputManager) -> Self {
        Self {
            program: program.to_string(),
            output,
        }
    }

    fn full_command(&self, args: &[String]) -> Vec<String> {
        let mut command = Vec::with_capacity(args.len() + 1);
        command.push(self.program.clone());
        command.extend(args.iter().cloned());
        command
    }

    /// Spawn the program with the given arguments and wait for it to exit,
    /// capturing both output streams.
    async fn execute(&self, args: &[String]) -> Result<CommandOutput> {
        let command = self.full_command(args);

        let result = Command::new(&self.program)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await?;

        Ok(CommandOutput {
            command,
            // Termination by signal carries no code
            exit_code: result.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&result.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&result.stderr).into_owned(),
        })
    }

    /// Checked execution: any spawn failure or non-zero exit is a hard error.
    pub async fn run_checked(&self, args: &[String]) -> Result<CommandOutput> {
        let command_line = masked_command_line(&self.full_command(args));
        self.output
            .verbose(&format!("Running command: {}", command_line));

        let result = self.execute(args).await?;

        if result.exit_code != 0 {
            return Err(RunnerError::CommandFailed {
                command: command_line,
                code: result.exit_code,
                stderr: result.stderr.trim_end().to_string(),
            });
        }

        Ok(result)
    }

    /// Logged execution: the outcome is written to the console and the
    /// telemetry sink, and nothing raised here reaches the caller. Returns the
    /// exit code when the process ran, `None` when it could not be spawned.
    pub async fn run_logged(
        &self,
        args: &[String],
        telemetry: &dyn TelemetrySink,
    ) -> Option<i32> {
        let command_line = masked_command_line(&self.full_command(args));

        self.report_info(telemetry, &format!("Running command: {}", command_line))
            .await;

        match self.execute(args).await {
            Ok(result) => {
                self.report_info(telemetry, &format!("Output: {}", result.stdout))
                    .await;

                if !result.stderr.is_empty() {
                    self.report_error(telemetry, &format!("Error: {}", result.stderr))
                        .await;
                }

                if result.exit_code != 0 {
                    self.report_error(
                        telemetry,
                        &format!("Command failed with return code: {}", result.exit_code),
                    )
                    .await;
                }

                Some(result.exit_code)
            }
            Err(e) => {
                self.report_error(telemetry, &format!("An error occurred: {}", e))
                    .await;
                None
            }
        }
    }

    async fn report_info(&self, telemetry: &dyn TelemetrySink, line: &str) {
        self.output.info(line);
        self.append_best_effort(telemetry, line).await;
    }

    async fn report_error(&self, telemetry: &dyn TelemetrySink, line: &str) {
        self.output.error(line);
        self.append_best_effort(telemetry, line).await;
    }

    async fn append_best_effort(&self, telemetry: &dyn TelemetrySink, line: &str) {
        if let Err(e) = telemetry.append_line(line).await {
            self.output
                .warning(&format!("Telemetry line dropped: {}", e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::NullTelemetry;

    #[test]
    fn login_args_match_docker_cli() {
        let args = login_args(
            "AWS",
            "abc123",
            "https://975049994612.dkr.ecr.ap-south-1.amazonaws.com",
        );
        assert_eq!(
            args,
            vec![
                "login",
                "-u",
                "AWS",
                "-p",
                "abc123",
                "https://975049994612.dkr.ecr.ap-south-1.amazonaws.com"
            ]
        );
    }

    #[test]
    fn pull_and_run_args_match_docker_cli() {
        let image = "975049994612.dkr.ecr.ap-south-1.amazonaws.com/mnist:latest";
        assert_eq!(pull_args(image), vec!["pull", image]);
        assert_eq!(run_args(image), vec!["run", "-it", image]);
    }

    #[test]
    fn masked_command_line_hides_password() {
        let mut command = vec!["docker".to_string()];
        command.extend(login_args("AWS", "abc123", "https://registry.example.com"));
        let rendered = masked_command_line(&command);
        assert!(!rendered.contains("abc123"));
        assert_eq!(
            rendered,
            "docker login -u AWS -p *** https://registry.example.com"
        );
    }

    #[tokio::test]
    async fn run_checked_captures_stdout_on_success() {
        let runner = CommandRunner::new("echo", OutputManager::new_quiet());
        let result = runner
            .run_checked(&["login".to_string(), "succeeded".to_string()])
            .await
            .unwrap();
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout.trim(), "login succeeded");
    }

    #[tokio::test]
    async fn run_checked_fails_on_non_zero_exit() {
        let runner = CommandRunner::new("false", OutputManager::new_quiet());
        let err = runner.run_checked(&[]).await.unwrap_err();
        match err {
            RunnerError::CommandFailed { code, .. } => assert_ne!(code, 0),
            other => panic!("expected CommandFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn run_logged_reports_non_zero_exit_without_failing() {
        let runner = CommandRunner::new("false", OutputManager::new_quiet());
        let telemetry = NullTelemetry::new();
        let exit_code = runner.run_logged(&[], &telemetry).await;
        assert_eq!(exit_code, Some(1));
    }

    #[tokio::test]
    async fn run_logged_absorbs_spawn_failures() {
        let runner = CommandRunner::new(
            "definitely-not-a-real-binary",
            OutputManager::new_quiet(),
        );
        let telemetry = NullTelemetry::new();
        let exit_code = runner.run_logged(&[], &telemetry).await;
        assert_eq!(exit_code, None);
    }
}
