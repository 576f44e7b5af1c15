//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Project config (.docdrift/config.json)
//! 3. Environment variables (DOCDRIFT_* prefix)
//!
//! A corrupt or unreadable config file is not fatal: the loader logs a
//! warning and falls back to defaults, so a damaged project can still run.

use std::fs;
use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};
use tracing::{debug, warn};

use super::types::Config;
use crate::project::ProjectPaths;
use crate::types::{DriftError, Result};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a project: defaults → config.json → env vars.
    /// Never fails; parse errors degrade to defaults with a warning.
    pub fn load(paths: &ProjectPaths) -> Config {
        let config_path = paths.config_path();

        match Self::extract(&config_path) {
            Ok(config) => match config.validate() {
                Ok(()) => config,
                Err(e) => {
                    warn!("Invalid configuration, using defaults: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                warn!(
                    "Failed to load {}, using defaults: {}",
                    config_path.display(),
                    e
                );
                Config::default()
            }
        }
    }

    /// Strict variant for callers that must distinguish failure (init)
    pub fn try_load(paths: &ProjectPaths) -> Result<Config> {
        let config = Self::extract(&paths.config_path())?;
        config.validate()?;
        Ok(config)
    }

    /// Persist configuration as pretty-printed JSON
    pub fn save(paths: &ProjectPaths, config: &Config) -> Result<()> {
        fs::create_dir_all(paths.data_dir())?;
        let json = serde_json::to_string_pretty(config)?;
        fs::write(paths.config_path(), json)?;
        debug!("Saved config to {}", paths.config_path().display());
        Ok(())
    }

    fn extract(config_path: &Path) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if config_path.exists() {
            debug!("Loading project config from: {}", config_path.display());
            figment = figment.merge(Json::file(config_path));
        }

        // e.g. DOCDRIFT_AI_PROVIDER -> ai.provider
        figment = figment.merge(Env::prefixed("DOCDRIFT_").split("_").lowercase(true));

        figment
            .extract()
            .map_err(|e| DriftError::Config(format!("Configuration error: {}", e)))
    }
}
