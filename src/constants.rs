//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Store and metadata constants
pub mod store {
    /// Metadata document schema version
    pub const METADATA_VERSION: &str = "1.0.0";

    /// Hex length of the stable snippet identifier
    pub const SNIPPET_ID_LEN: usize = 12;
}

/// Provider call constants
pub mod provider {
    /// Default hard wall-clock timeout for one generation call (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

    /// Spacing between successive requests to rate-limited providers (ms)
    pub const REQUEST_SPACING_MS: u64 = 6_500;

    /// Maximum retries for a retryable provider error within one group
    pub const MAX_RETRIES: usize = 2;

    /// Base delay for exponential backoff (milliseconds)
    pub const BASE_DELAY_MS: u64 = 500;

    /// Maximum delay between retries (seconds)
    pub const MAX_DELAY_SECS: u64 = 60;
}

/// Directory scan constants
pub mod scan {
    /// Directories never descended into during auto-scan
    pub const SKIP_DIRS: &[&str] = &["node_modules", "dist", "build", "target", "vendor"];
}
