//! docdrift - Documentation Drift Tracker
//!
//! Keeps generated documentation honest: fingerprints tracked source files,
//! detects when code drifts away from its docs, and regenerates the affected
//! documents through an AI provider.
//!
//! ## How it works
//!
//! 1. `add` puts source files under tracking (SHA-256 fingerprint per file)
//! 2. `detect` compares fingerprints and records a pending change-set
//! 3. `build` groups tracked files into documentation units and regenerates
//!    the documents the pending set marks as stale
//!
//! ## Modules
//!
//! - [`pattern`]: glob compiler for include/exclude path matching
//! - [`store`]: durable tracking state (metadata and pending change-set)
//! - [`detect`]: fingerprint comparison and affected-document mapping
//! - [`group`]: partitioning tracked files into documentation groups
//! - [`build`]: sequential generation with retry and rate-limit pacing
//! - [`ai`]: provider abstraction (claude CLI subprocess, Gemini HTTP)

pub mod ai;
pub mod build;
pub mod cli;
pub mod config;
pub mod constants;
pub mod detect;
pub mod group;
pub mod pattern;
pub mod project;
pub mod scan;
pub mod store;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

pub use config::{Config, ConfigLoader};
pub use project::ProjectPaths;
pub use types::{Category, DriftError, ErrorCategory, Result};

pub use detect::{ChangeDetector, ChangeReport};
pub use group::{FileGroup, group_by_feature};
pub use store::{MetadataStore, PendingStore, TrackOutcome};

pub use ai::{GenerationProvider, SharedProvider, create_provider};
pub use build::{BuildOptions, BuildSummary, DocumentBuilder};
