//! Generation Provider Abstraction
//!
//! Defines the trait implemented by every document generation backend. A
//! provider turns one prompt into one markdown document; retry and pacing
//! policy live in the build orchestrator, so implementations are single-shot.

mod claude_code;
mod gemini;

pub use claude_code::ClaudeCodeProvider;
pub use gemini::GeminiProvider;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::AiConfig;
use crate::types::{DriftError, Result};

/// Shared provider handle passed through the build pipeline
pub type SharedProvider = Arc<dyn GenerationProvider>;

/// One document generation backend
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Produce markdown for one prompt. Single-shot; callers retry.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Provider name for logging and error attribution
    fn name(&self) -> &str;

    /// Model identifier currently in use
    fn model(&self) -> &str;

    /// Check that the backend is reachable before a build starts
    async fn health_check(&self) -> Result<bool>;

    /// Minimum spacing to observe between consecutive successful requests
    fn request_spacing(&self) -> Option<Duration> {
        None
    }
}

/// Create a shared provider from configuration
pub fn create_provider(config: &AiConfig) -> Result<SharedProvider> {
    match config.provider.as_str() {
        "claude-code" => Ok(Arc::new(ClaudeCodeProvider::new(config))),
        "gemini" => Ok(Arc::new(GeminiProvider::new(config)?)),
        _ => Err(DriftError::Config(format!(
            "Unknown provider: {}. Supported: claude-code, gemini",
            config.provider
        ))),
    }
}
