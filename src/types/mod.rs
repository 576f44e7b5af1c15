//! Core Data Model
//!
//! Persisted tracking state: tracked source files, generated documents, and
//! the pending change-set produced by drift detection. All serialized forms
//! use camelCase keys to stay compatible with the on-disk state format.

pub mod error;

pub use error::{DriftError, ErrorCategory, ErrorClassifier, ProviderError, Result};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Tracked File
// =============================================================================

/// One source file under documentation tracking.
///
/// At most one entry exists per `path`. The fingerprint is refreshed only
/// when drift is confirmed and consumed by a successful regeneration; a file
/// that disappears from disk is flagged missing, never silently removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedFile {
    /// Stable identifier derived from (path, line range)
    pub id: String,
    /// Path relative to the project root, forward-slash separated
    pub path: String,
    /// Inclusive [start, end] line bounds under tracking
    pub lines: [u32; 2],
    /// SHA-256 hex of file content at last observation; None if unreadable
    pub hash: Option<String>,
    /// Timestamp of last fingerprint refresh
    pub updated_at: DateTime<Utc>,
}

impl TrackedFile {
    /// Known line count for this file (the tracked range end)
    pub fn line_count(&self) -> u32 {
        self.lines[1]
    }
}

// =============================================================================
// Generated Document
// =============================================================================

/// One produced documentation artifact.
///
/// `references` records the tracked file paths the document was synthesized
/// from; it is replaced wholesale each time the document is rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedDocument {
    /// Output path relative to the project root; unique
    pub path: String,
    /// Tracked file paths this document was derived from
    #[serde(default)]
    pub references: Vec<String>,
    /// Last write timestamp
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Pending Change-Set
// =============================================================================

/// Durable snapshot of drift since the last clear.
///
/// Recomputed in full by every detection run; absence of the pending file
/// means "no detection performed yet", distinct from an empty-but-present
/// set. Cleared only after a build pass generates at least one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PendingChangeSet {
    /// When the detection ran; None for the never-computed sentinel
    pub timestamp: Option<DateTime<Utc>>,
    /// Tracked paths whose fingerprint differs from the stored one
    pub changed_files: Vec<String>,
    /// Document paths whose references intersect the changed set
    pub affected_docs: Vec<String>,
    /// Tracked paths no longer present on disk
    pub missing_files: Vec<String>,
}

impl PendingChangeSet {
    /// True when nothing changed and nothing is missing
    pub fn is_empty(&self) -> bool {
        self.changed_files.is_empty() && self.missing_files.is_empty()
    }

    /// Check whether a document path is awaiting regeneration
    pub fn affects(&self, doc_path: &str) -> bool {
        self.affected_docs.iter().any(|d| d == doc_path)
    }
}

// =============================================================================
// Document Category
// =============================================================================

/// Fixed set of documentation buckets assigned by path-prefix rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Architecture,
    #[default]
    Features,
    Api,
    Database,
    Deployment,
    Security,
    Testing,
    Guides,
}

impl Category {
    /// Directory name used under the docs output root
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Architecture => "architecture",
            Self::Features => "features",
            Self::Api => "api",
            Self::Database => "database",
            Self::Deployment => "deployment",
            Self::Security => "security",
            Self::Testing => "testing",
            Self::Guides => "guides",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "architecture" => Ok(Self::Architecture),
            "features" => Ok(Self::Features),
            "api" => Ok(Self::Api),
            "database" => Ok(Self::Database),
            "deployment" => Ok(Self::Deployment),
            "security" => Ok(Self::Security),
            "testing" => Ok(Self::Testing),
            "guides" => Ok(Self::Guides),
            _ => Err(format!(
                "Unknown category: {}. Valid values: architecture, features, api, database, deployment, security, testing, guides",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_roundtrip() {
        for category in [
            Category::Architecture,
            Category::Features,
            Category::Api,
            Category::Database,
            Category::Deployment,
            Category::Security,
            Category::Testing,
            Category::Guides,
        ] {
            let parsed: Category = category.as_str().parse().unwrap();
            assert_eq!(parsed, category);
        }
        assert!("widgets".parse::<Category>().is_err());
    }

    #[test]
    fn test_pending_set_defaults() {
        let pending = PendingChangeSet::default();
        assert!(pending.timestamp.is_none());
        assert!(pending.is_empty());
        assert!(!pending.affects("docs/features/auth.md"));
    }

    #[test]
    fn test_pending_serialized_keys_are_camel_case() {
        let pending = PendingChangeSet {
            timestamp: Some(Utc::now()),
            changed_files: vec!["src/a.ts".into()],
            affected_docs: vec!["docs/features/a.md".into()],
            missing_files: vec![],
        };

        let json = serde_json::to_string(&pending).unwrap();
        assert!(json.contains("\"changedFiles\""));
        assert!(json.contains("\"affectedDocs\""));
        assert!(json.contains("\"missingFiles\""));
    }

    #[test]
    fn test_tracked_file_serialized_shape() {
        let file = TrackedFile {
            id: "abc123".into(),
            path: "src/lib/auth.ts".into(),
            lines: [1, 120],
            hash: None,
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["lines"][0], 1);
        assert_eq!(json["lines"][1], 120);
        assert!(json["hash"].is_null());
        assert!(json.get("updatedAt").is_some());
    }
}
