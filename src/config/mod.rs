//! Configuration
//!
//! Typed configuration with documented defaults, loaded through Figment.

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{AiConfig, CategoryRule, Config, IntegrationsConfig};
