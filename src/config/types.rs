//! Configuration Types
//!
//! All configuration structures with sensible defaults. Persisted as
//! `.docdrift/config.json`; unknown keys are ignored and missing keys fall
//! back to defaults at load time.

use serde::{Deserialize, Serialize};

use crate::types::Category;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Configuration schema version
    pub version: String,

    /// Output directory for generated documentation, relative to the root
    pub docs_dir: String,

    /// Include glob patterns for trackable source files
    pub source_patterns: Vec<String>,

    /// Exclude glob patterns; always override includes
    pub ignore_patterns: Vec<String>,

    /// Ordered path-prefix rules assigning document categories
    pub categories: Vec<CategoryRule>,

    /// Language the generated documents are written in
    pub language: String,

    /// External tool integration flags
    pub integrations: IntegrationsConfig,

    /// Generation provider settings
    pub ai: AiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            docs_dir: "docs".to_string(),
            source_patterns: vec![
                "src/**/*.{ts,tsx,js,jsx}".to_string(),
                "lib/**/*.ts".to_string(),
            ],
            ignore_patterns: vec![
                "**/*.test.ts".to_string(),
                "**/*.spec.ts".to_string(),
                "**/node_modules/**".to_string(),
            ],
            categories: vec![
                CategoryRule::new("src/lib/", Category::Features),
                CategoryRule::new("src/components/", Category::Features),
                CategoryRule::new("src/hooks/", Category::Features),
                CategoryRule::new("src/api/", Category::Api),
                CategoryRule::new("src/agents/", Category::Architecture),
            ],
            language: "en".to_string(),
            integrations: IntegrationsConfig::default(),
            ai: AiConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `DriftError::Config` on validation failure.
    pub fn validate(&self) -> crate::types::Result<()> {
        if self.docs_dir.is_empty() {
            return Err(crate::types::DriftError::Config(
                "docsDir must not be empty".to_string(),
            ));
        }

        if self.ai.timeout_secs == 0 {
            return Err(crate::types::DriftError::Config(
                "ai.timeoutSecs must be greater than 0".to_string(),
            ));
        }

        if !matches!(self.ai.provider.as_str(), "claude-code" | "gemini") {
            return Err(crate::types::DriftError::Config(format!(
                "Unknown provider: {}. Supported: claude-code, gemini",
                self.ai.provider
            )));
        }

        Ok(())
    }
}

// =============================================================================
// Category Rules
// =============================================================================

/// One ordered (path prefix, category) assignment rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    /// Relative path prefix, forward-slash separated
    pub prefix: String,
    /// Category assigned on first prefix match
    pub category: Category,
}

impl CategoryRule {
    pub fn new(prefix: impl Into<String>, category: Category) -> Self {
        Self {
            prefix: prefix.into(),
            category,
        }
    }
}

// =============================================================================
// Integrations
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IntegrationsConfig {
    /// Emit Claude Code hook configuration on init
    pub claude_code: bool,
    /// Reserved: git hook installation
    pub git: bool,
}

// =============================================================================
// AI Provider Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AiConfig {
    /// Provider type: "claude-code" or "gemini"
    pub provider: String,

    /// Model identifier (provider-specific); None uses the provider default
    pub model: Option<String>,

    /// API key for HTTP providers. Never serialized back to disk; prefer
    /// the environment variable.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Hard wall-clock timeout for one generation call (seconds)
    pub timeout_secs: u64,

    /// Re-run detection-driven regeneration automatically after builds
    pub auto_update: bool,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: "claude-code".to_string(),
            model: None,
            api_key: None,
            timeout_secs: crate::constants::provider::DEFAULT_TIMEOUT_SECS,
            auto_update: true,
        }
    }
}
