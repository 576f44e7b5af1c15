//! Claude Code CLI Provider
//!
//! Runs the local `claude` CLI as a subprocess for each generation call.
//! The prompt goes through `-p`, output comes back as a JSON envelope on
//! stdout. The child is spawned with kill-on-drop so an expired timeout
//! forcibly terminates it rather than leaving an orphan.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

use super::GenerationProvider;
use crate::config::AiConfig;
use crate::types::{ErrorCategory, ErrorClassifier, ProviderError, Result};

const PROVIDER_NAME: &str = "claude-code";
const DEFAULT_MODEL: &str = "haiku";

pub struct ClaudeCodeProvider {
    model: String,
    timeout_secs: u64,
}

impl ClaudeCodeProvider {
    pub fn new(config: &AiConfig) -> Self {
        Self {
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout_secs: config.timeout_secs,
        }
    }

    async fn execute(&self, prompt: &str) -> Result<String> {
        debug!("Executing claude CLI (model={})", self.model);

        let child = Command::new("claude")
            .arg("-p")
            .arg(prompt)
            .arg("--output-format")
            .arg("json")
            .arg("--model")
            .arg(&self.model)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ProviderError::with_provider(
                    ErrorCategory::Unavailable,
                    format!("Failed to spawn claude CLI: {}. Is it installed?", e),
                    PROVIDER_NAME,
                )
            })?;

        // Timeout expiry drops the child future, which kills the process
        let output = timeout(
            Duration::from_secs(self.timeout_secs),
            child.wait_with_output(),
        )
        .await
        .map_err(|_| {
            ProviderError::with_provider(
                ErrorCategory::Network,
                format!("claude CLI timed out after {}s", self.timeout_secs),
                PROVIDER_NAME,
            )
            .retry_after(Duration::from_secs(5))
        })?
        .map_err(|e| {
            ProviderError::with_provider(
                ErrorCategory::Unavailable,
                format!("claude CLI execution failed: {}", e),
                PROVIDER_NAME,
            )
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);

        if !output.status.success() {
            // The envelope may carry the real error even on non-zero exit
            if let Ok(envelope) = serde_json::from_str::<Value>(&stdout)
                && envelope
                    .get("is_error")
                    .and_then(|v| v.as_bool())
                    .unwrap_or(false)
            {
                let message = envelope
                    .get("result")
                    .and_then(|v| v.as_str())
                    .unwrap_or("Unknown API error");
                return Err(ErrorClassifier::classify(message, PROVIDER_NAME).into());
            }

            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = if stderr.trim().is_empty() {
                "Process exited with non-zero status"
            } else {
                stderr.trim()
            };
            return Err(ErrorClassifier::classify(message, PROVIDER_NAME).into());
        }

        Ok(extract_result(&stdout, PROVIDER_NAME)?)
    }
}

/// Pull the generated text out of the CLI's JSON envelope. Output that is
/// not valid JSON is taken verbatim, so plain-text responses still work.
fn extract_result(stdout: &str, provider: &str) -> std::result::Result<String, ProviderError> {
    let envelope: Value = match serde_json::from_str(stdout) {
        Ok(value) => value,
        Err(_) => return Ok(stdout.trim().to_string()),
    };

    if envelope
        .get("is_error")
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
    {
        let message = envelope
            .get("result")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown API error");
        return Err(ErrorClassifier::classify(message, provider));
    }

    match envelope.get("result").and_then(|v| v.as_str()) {
        Some(result) => Ok(result.to_string()),
        None => Ok(stdout.trim().to_string()),
    }
}

#[async_trait]
impl GenerationProvider for ClaudeCodeProvider {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.execute(prompt).await
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool> {
        let output = Command::new("claude")
            .arg("--version")
            .output()
            .await
            .map_err(|e| {
                ProviderError::with_provider(
                    ErrorCategory::Unavailable,
                    format!("claude CLI not found: {}", e),
                    PROVIDER_NAME,
                )
            })?;

        if output.status.success() {
            let version = String::from_utf8_lossy(&output.stdout);
            info!("claude CLI available: {}", version.trim());
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
