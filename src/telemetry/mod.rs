//! Remote telemetry session with an explicit open/close lifecycle
//!
//! Every pipeline stage reports text lines to a [`TelemetrySink`] alongside the
//! local console output. The session is opened by the caller before the
//! pipeline starts and must be closed exactly once on every exit path;
//! [`TelemetrySink::close`] is idempotent so a defensive double close stays a
//! single remote close.

use crate::config::RunnerConfig;
use crate::error::{Result, RunnerError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use url::Url;
use uuid::Uuid;

#[async_trait]
pub trait TelemetrySink: Send + Sync {
    /// Append a single text line to the remote session.
    async fn append_line(&self, line: &str) -> Result<()>;

    /// Close the session. Subsequent calls are no-ops.
    async fn close(&mut self) -> Result<()>;
}

/// Telemetry session backed by a remote HTTP ingest service.
pub struct HttpTelemetry {
    client: Client,
    base_url: Url,
    session_id: String,
    closed: bool,
}

impl HttpTelemetry {
    /// Open a new session against the ingest service.
    pub async fn open(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| RunnerError::Configuration(format!("Invalid telemetry URL: {}", e)))?;
        let client = Client::new();
        let session_id = Uuid::new_v4().to_string();

        let url = Self::endpoint(&base_url, "v1/sessions")?;
        let response = client
            .post(url)
            .json(&json!({ "session_id": session_id }))
            .send()
            .await
            .map_err(|e| RunnerError::Telemetry(format!("Failed to open session: {}", e)))?;

        if !response.status().is_success() {
            return Err(RunnerError::Telemetry(format!(
                "Session open rejected with status: {}",
                response.status()
            )));
        }

        Ok(Self {
            client,
            base_url,
            session_id,
            closed: false,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    fn endpoint(base_url: &Url, path: &str) -> Result<Url> {
        base_url
            .join(path)
            .map_err(|e| RunnerError::Telemetry(format!("Invalid telemetry endpoint: {}", e)))
    }
}

#[async_trait]
impl TelemetrySink for HttpTelemetry {
    async fn append_line(&self, line: &str) -> Result<()> {
        let path = format!("v1/sessions/{}/lines", self.session_id);
        let url = Self::endpoint(&self.base_url, &path)?;
        let response = self
            .client
            .post(url)
            .json(&json!({ "line": line }))
            .send()
            .await
            .map_err(|e| RunnerError::Telemetry(format!("Failed to append line: {}", e)))?;

        if !response.status().is_success() {
            return Err(RunnerError::Telemetry(format!(
                "Line append rejected with status: {}",
                response.status()
            )));
        }

        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        // Mark closed up front so a failed close is not retried into a double close
        self.closed = true;

        let path = format!("v1/sessions/{}/close", self.session_id);
        let url = Self::endpoint(&self.base_url, &path)?;
        let response = self
            .client
            .post(url)
            .send()
            .await
            .map_err(|e| RunnerError::Telemetry(format!("Failed to close session: {}", e)))?;

        if !response.status().is_success() {
            return Err(RunnerError::Telemetry(format!(
                "Session close rejected with status: {}",
                response.status()
            )));
        }

        Ok(())
    }
}

/// Sink used when no telemetry URL is configured. Same lifecycle, no I/O.
#[derive(Debug, Default)]
pub struct NullTelemetry {
    closed: bool,
}

impl NullTelemetry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TelemetrySink for NullTelemetry {
    async fn append_line(&self, _line: &str) -> Result<()> {
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

/// Open the sink selected by the configuration.
pub async fn open_sink(config: &RunnerConfig) -> Result<Box<dyn TelemetrySink>> {
    match &config.telemetry_url {
        Some(url) => Ok(Box::new(HttpTelemetry::open(url).await?)),
        None => Ok(Box::new(NullTelemetry::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn null_sink_accepts_lines_and_closes() {
        let mut sink = NullTelemetry::new();
        sink.append_line("Running command: docker pull app:latest")
            .await
            .unwrap();
        sink.close().await.unwrap();
        sink.close().await.unwrap();
        assert!(sink.closed);
    }

    #[tokio::test]
    async fn open_rejects_malformed_url() {
        let result = HttpTelemetry::open("not a url").await;
        assert!(matches!(result, Err(RunnerError::Configuration(_))));
    }
}
