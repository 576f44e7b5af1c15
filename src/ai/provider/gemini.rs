//! Gemini API Provider
//!
//! HTTP provider against the Gemini `generateContent` endpoint. The API key
//! is held as a SecretString and only exposed when the request URL is built;
//! it never appears in logs or debug output. Gemini rate limits aggressively
//! on free tiers, so this provider asks the orchestrator for spacing between
//! consecutive requests.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::GenerationProvider;
use crate::config::AiConfig;
use crate::constants::provider::REQUEST_SPACING_MS;
use crate::types::{DriftError, ErrorCategory, ErrorClassifier, ProviderError, Result};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const PROVIDER_NAME: &str = "gemini";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

pub struct GeminiProvider {
    api_key: SecretString,
    model: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

impl GeminiProvider {
    /// A missing API key is a configuration error, not a provider error:
    /// the build must refuse to start rather than fail per group.
    pub fn new(config: &AiConfig) -> Result<Self> {
        let key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .ok_or_else(|| {
                DriftError::Config(
                    "GEMINI_API_KEY not found. Set it in the environment or config".to_string(),
                )
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DriftError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: SecretString::from(key),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            client,
        })
    }

    fn build_request(&self, prompt: &str) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                max_output_tokens: 16384,
            },
        }
    }
}

/// Interpret a Gemini response payload, mapping every known failure shape
/// to a categorized error
fn extract_text(payload: &Value) -> std::result::Result<String, ProviderError> {
    if let Some(text) = payload["candidates"][0]["content"]["parts"][0]["text"].as_str() {
        return Ok(text.to_string());
    }

    // Error payload inside a 200 response
    if let Some(error) = payload.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(ErrorClassifier::classify(&message, PROVIDER_NAME));
    }

    let candidate = &payload["candidates"][0];
    match candidate["finishReason"].as_str() {
        Some("SAFETY") => Err(ProviderError::with_provider(
            ErrorCategory::BadRequest,
            "Response blocked by safety filter",
            PROVIDER_NAME,
        )),
        // Gemini sometimes stops cleanly with no parts at all
        Some("STOP") => Err(ProviderError::with_provider(
            ErrorCategory::Transient,
            "Empty response content (try again or simplify the prompt)",
            PROVIDER_NAME,
        )
        .retry_after(Duration::from_secs(2))),
        _ if payload["candidates"]
            .as_array()
            .is_none_or(|c| c.is_empty()) =>
        {
            Err(ProviderError::with_provider(
                ErrorCategory::Transient,
                "Empty response, no candidates (possible rate limit)",
                PROVIDER_NAME,
            )
            .retry_after(Duration::from_secs(2)))
        }
        _ => Err(ProviderError::with_provider(
            ErrorCategory::Unknown,
            format!(
                "Unexpected response shape: {}",
                payload.to_string().chars().take(200).collect::<String>()
            ),
            PROVIDER_NAME,
        )),
    }
}

#[async_trait]
impl GenerationProvider for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!("Sending request to Gemini (model={})", self.model);

        let url = format!(
            "{}/{}:generateContent?key={}",
            API_BASE,
            self.model,
            self.api_key.expose_secret()
        );

        let response = self
            .client
            .post(&url)
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(|e| {
                ErrorClassifier::classify(&format!("Request failed: {}", e), PROVIDER_NAME)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!("Gemini API error ({}): {}", status.as_u16(), body),
                PROVIDER_NAME,
            )
            .into());
        }

        let payload: Value = response.json().await.map_err(|e| {
            ProviderError::with_provider(
                ErrorCategory::Transient,
                format!("Invalid JSON response: {}", e),
                PROVIDER_NAME,
            )
        })?;

        Ok(extract_text(&payload)?)
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}?key={}", API_BASE, self.api_key.expose_secret());
        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn request_spacing(&self) -> Option<Duration> {
        Some(Duration::from_millis(REQUEST_SPACING_MS))
    }
}
