//! Drift Detection
//!
//! Compares current file fingerprints against the stored ones, classifies
//! each tracked file as unchanged, changed, or missing, and maps the changed
//! set onto the generated documents that depend on it. Detection is a pure
//! read of the tree plus one pending-set write; it never mutates stored
//! fingerprints. The core emits tracing events only, no terminal output.

use std::collections::BTreeSet;

use chrono::Utc;
use tracing::{debug, info};

use crate::store::{MetadataStore, PendingStore, file_fingerprint};
use crate::types::{PendingChangeSet, Result};

// =============================================================================
// Report Types
// =============================================================================

/// One tracked file whose content diverged from its stored fingerprint
#[derive(Debug, Clone, PartialEq)]
pub struct ChangedFile {
    pub path: String,
    pub old_hash: Option<String>,
    pub new_hash: String,
}

/// Classification of every tracked file in one detection pass
#[derive(Debug, Clone, Default)]
pub struct ChangeReport {
    pub changed: Vec<ChangedFile>,
    pub missing: Vec<String>,
    pub total_tracked: usize,
}

impl ChangeReport {
    pub fn is_clean(&self) -> bool {
        self.changed.is_empty() && self.missing.is_empty()
    }
}

/// Detection pass result: the raw report plus the persisted pending set
#[derive(Debug, Clone)]
pub struct DetectionOutcome {
    pub report: ChangeReport,
    pub pending: PendingChangeSet,
}

// =============================================================================
// Change Detector
// =============================================================================

/// Drift detector over a metadata store
pub struct ChangeDetector<'a> {
    store: &'a MetadataStore,
    docs_dir: &'a str,
}

impl<'a> ChangeDetector<'a> {
    pub fn new(store: &'a MetadataStore, docs_dir: &'a str) -> Self {
        Self { store, docs_dir }
    }

    /// Classify every tracked file against current disk content.
    ///
    /// A file absent from disk is missing. A readable file whose current
    /// fingerprint differs from the stored one is changed; an unreadable
    /// file with a stored fingerprint of None stays unchanged, so a file
    /// that was never readable does not flag drift on every run.
    pub fn detect_changes(&self, paths: &crate::project::ProjectPaths) -> ChangeReport {
        let mut report = ChangeReport {
            total_tracked: self.store.snippets().len(),
            ..Default::default()
        };

        for snippet in self.store.snippets() {
            let absolute = paths.root().join(&snippet.path);
            if !absolute.is_file() {
                debug!(path = %snippet.path, "Tracked file missing from disk");
                report.missing.push(snippet.path.clone());
                continue;
            }

            match file_fingerprint(&absolute) {
                Some(current) if snippet.hash.as_deref() != Some(current.as_str()) => {
                    debug!(path = %snippet.path, "Fingerprint drift");
                    report.changed.push(ChangedFile {
                        path: snippet.path.clone(),
                        old_hash: snippet.hash.clone(),
                        new_hash: current,
                    });
                }
                _ => {}
            }
        }

        info!(
            changed = report.changed.len(),
            missing = report.missing.len(),
            tracked = report.total_tracked,
            "Detection pass complete"
        );
        report
    }

    /// Documents whose references intersect the changed path set, deduplicated
    pub fn find_affected_documents(&self, changed_paths: &[String]) -> Vec<String> {
        let mut affected = BTreeSet::new();
        for path in changed_paths {
            for doc in self.store.find_documents_referencing(path, self.docs_dir) {
                affected.insert(doc);
            }
        }
        affected.into_iter().collect()
    }

    /// Full detection run: classify, map to documents, and persist the
    /// pending set (overwriting any previous one, even when clean).
    pub fn run_detection(
        &self,
        paths: &crate::project::ProjectPaths,
        pending_store: &PendingStore,
    ) -> Result<DetectionOutcome> {
        let report = self.detect_changes(paths);
        let changed_paths: Vec<String> = report.changed.iter().map(|c| c.path.clone()).collect();

        let pending = PendingChangeSet {
            timestamp: Some(Utc::now()),
            affected_docs: self.find_affected_documents(&changed_paths),
            changed_files: changed_paths,
            missing_files: report.missing.clone(),
        };
        pending_store.save(&pending)?;

        Ok(DetectionOutcome { report, pending })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ProjectPaths;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(temp: &TempDir, rel: &str, content: &str) {
        let path = temp.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn tracked_project() -> (TempDir, ProjectPaths, MetadataStore) {
        let temp = TempDir::new().unwrap();
        let paths = ProjectPaths::at(temp.path());
        write(&temp, "src/a.ts", "v1\n");
        write(&temp, "src/b.ts", "v1\n");
        let mut store = MetadataStore::open(paths.clone());
        store.add_tracked(Path::new("src/a.ts"), [1, 1]).unwrap();
        store.add_tracked(Path::new("src/b.ts"), [1, 1]).unwrap();
        (temp, paths, store)
    }

    #[test]
    fn test_unchanged_files_report_clean() {
        let (_temp, paths, store) = tracked_project();
        let report = ChangeDetector::new(&store, "docs").detect_changes(&paths);
        assert!(report.is_clean());
        assert_eq!(report.total_tracked, 2);
    }

    #[test]
    fn test_modified_file_is_flagged() {
        let (temp, paths, store) = tracked_project();
        write(&temp, "src/a.ts", "v2\n");

        let report = ChangeDetector::new(&store, "docs").detect_changes(&paths);
        assert_eq!(report.changed.len(), 1);
        assert_eq!(report.changed[0].path, "src/a.ts");
        assert!(report.changed[0].old_hash.is_some());
        assert_ne!(
            report.changed[0].old_hash.as_deref(),
            Some(report.changed[0].new_hash.as_str())
        );
    }

    #[test]
    fn test_deleted_file_is_missing_not_changed() {
        let (temp, paths, store) = tracked_project();
        fs::remove_file(temp.path().join("src/a.ts")).unwrap();

        let report = ChangeDetector::new(&store, "docs").detect_changes(&paths);
        assert!(report.changed.is_empty());
        assert_eq!(report.missing, vec!["src/a.ts"]);
    }

    #[test]
    fn test_detection_does_not_update_fingerprints() {
        let (temp, paths, store) = tracked_project();
        write(&temp, "src/a.ts", "v2\n");
        let stored = store.snippets()[0].hash.clone();

        ChangeDetector::new(&store, "docs").detect_changes(&paths);
        assert_eq!(store.snippets()[0].hash, stored);

        // A second pass still reports the same drift
        let report = ChangeDetector::new(&store, "docs").detect_changes(&paths);
        assert_eq!(report.changed.len(), 1);
    }

    #[test]
    fn test_affected_documents_deduplicated() {
        let (_temp, _paths, mut store) = tracked_project();
        store.add_document(
            "docs/features/shared.md",
            vec!["src/a.ts".into(), "src/b.ts".into()],
        );

        let detector = ChangeDetector::new(&store, "docs");
        let affected =
            detector.find_affected_documents(&["src/a.ts".into(), "src/b.ts".into()]);
        assert_eq!(affected, vec!["docs/features/shared.md"]);
    }

    #[test]
    fn test_run_detection_persists_pending() {
        let (temp, paths, mut store) = tracked_project();
        store.add_document("docs/features/a.md", vec!["src/a.ts".into()]);
        write(&temp, "src/a.ts", "v2\n");

        let pending_store = PendingStore::new(paths.clone());
        let outcome = ChangeDetector::new(&store, "docs")
            .run_detection(&paths, &pending_store)
            .unwrap();

        assert_eq!(outcome.pending.changed_files, vec!["src/a.ts"]);
        assert_eq!(outcome.pending.affected_docs, vec!["docs/features/a.md"]);

        let loaded = pending_store.load();
        assert!(loaded.timestamp.is_some());
        assert_eq!(loaded.changed_files, vec!["src/a.ts"]);
    }

    #[test]
    fn test_clean_run_overwrites_stale_pending() {
        let (temp, paths, store) = tracked_project();
        let pending_store = PendingStore::new(paths.clone());

        write(&temp, "src/a.ts", "v2\n");
        ChangeDetector::new(&store, "docs")
            .run_detection(&paths, &pending_store)
            .unwrap();
        assert!(!pending_store.load().is_empty());

        // Revert; the next run replaces the pending set with an empty one
        write(&temp, "src/a.ts", "v1\n");
        ChangeDetector::new(&store, "docs")
            .run_detection(&paths, &pending_store)
            .unwrap();
        let pending = pending_store.load();
        assert!(pending.is_empty());
        assert!(pending.timestamp.is_some());
    }
}
