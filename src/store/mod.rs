//! Tracking State Store
//!
//! Owns the durable metadata document (`.docdrift/metadata.json`): the set
//! of tracked source files with their content fingerprints, and the set of
//! generated documents with their source references. An explicit store
//! object is constructed per invocation; all mutation goes through it and
//! nothing is persisted until `save()`.

pub mod fingerprint;
mod pending;

pub use fingerprint::{file_fingerprint, line_count, snippet_id};
pub use pending::PendingStore;

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::store::METADATA_VERSION;
use crate::project::ProjectPaths;
use crate::types::{DriftError, GeneratedDocument, Result, TrackedFile};

// =============================================================================
// Metadata Document
// =============================================================================

/// On-disk shape of the metadata document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metadata {
    /// Schema version of this document
    pub version: String,
    /// Timestamp of the last save
    pub last_updated: Option<DateTime<Utc>>,
    /// Tracked source files, one entry per path
    pub snippets: Vec<TrackedFile>,
    /// Generated documents, one entry per output path
    pub documents: Vec<GeneratedDocument>,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            version: METADATA_VERSION.to_string(),
            last_updated: None,
            snippets: Vec::new(),
            documents: Vec::new(),
        }
    }
}

// =============================================================================
// Track Outcome
// =============================================================================

/// Result of a tracking request
#[derive(Debug, Clone, PartialEq)]
pub enum TrackOutcome {
    /// File was not tracked before; entry created
    Added(TrackedFile),
    /// Path already has an entry; existing state untouched
    AlreadyTracked(String),
}

// =============================================================================
// Metadata Store
// =============================================================================

/// Handle over the metadata document.
///
/// Loads the full document on open and holds it in memory; callers batch
/// mutations and persist once with `save()`.
#[derive(Debug)]
pub struct MetadataStore {
    paths: ProjectPaths,
    metadata: Metadata,
}

impl MetadataStore {
    /// Open the store, loading existing metadata. An absent file starts
    /// empty; a corrupt file is logged and replaced on the next save.
    pub fn open(paths: ProjectPaths) -> Self {
        let metadata_path = paths.metadata_path();
        let metadata = if metadata_path.is_file() {
            match fs::read_to_string(&metadata_path) {
                Ok(text) => match serde_json::from_str(&text) {
                    Ok(metadata) => metadata,
                    Err(e) => {
                        warn!(
                            "Corrupt metadata at {}, starting fresh: {}",
                            metadata_path.display(),
                            e
                        );
                        Metadata::default()
                    }
                },
                Err(e) => {
                    warn!("Cannot read {}: {}", metadata_path.display(), e);
                    Metadata::default()
                }
            }
        } else {
            Metadata::default()
        };

        Self { paths, metadata }
    }

    /// Persist the current state as pretty-printed JSON
    pub fn save(&mut self) -> Result<()> {
        self.metadata.last_updated = Some(Utc::now());
        fs::create_dir_all(self.paths.data_dir())?;
        let json = serde_json::to_string_pretty(&self.metadata)?;
        fs::write(self.paths.metadata_path(), json)?;
        debug!(
            snippets = self.metadata.snippets.len(),
            documents = self.metadata.documents.len(),
            "Saved metadata"
        );
        Ok(())
    }

    pub fn snippets(&self) -> &[TrackedFile] {
        &self.metadata.snippets
    }

    pub fn documents(&self) -> &[GeneratedDocument] {
        &self.metadata.documents
    }

    pub fn is_tracked(&self, path: &str) -> bool {
        self.metadata.snippets.iter().any(|s| s.path == path)
    }

    // =========================================================================
    // Tracked Files
    // =========================================================================

    /// Start tracking a file. Tracking an already-tracked path is a no-op
    /// that reports `AlreadyTracked` and never disturbs the stored hash.
    pub fn add_tracked(&mut self, path: &Path, lines: [u32; 2]) -> Result<TrackOutcome> {
        let absolute = self.paths.absolute(path);
        if !absolute.is_file() {
            return Err(DriftError::PathNotFound(path.display().to_string()));
        }

        let relative = self.paths.relative(&absolute);
        if self.is_tracked(&relative) {
            return Ok(TrackOutcome::AlreadyTracked(relative));
        }

        let file = TrackedFile {
            id: snippet_id(&relative, lines),
            path: relative,
            lines,
            hash: file_fingerprint(&absolute),
            updated_at: Utc::now(),
        };
        debug!(path = %file.path, id = %file.id, "Tracking file");
        self.metadata.snippets.push(file.clone());
        Ok(TrackOutcome::Added(file))
    }

    /// Stop tracking a path; returns whether an entry was removed
    pub fn remove_tracked(&mut self, path: &str) -> bool {
        let before = self.metadata.snippets.len();
        self.metadata.snippets.retain(|s| s.path != path);
        self.metadata.snippets.len() != before
    }

    /// Look up a tracked entry by exact path or by suffix, so both
    /// `src/lib/auth.ts` and `auth.ts` resolve the same entry.
    pub fn find_by_path(&self, path: &str) -> Option<&TrackedFile> {
        self.metadata
            .snippets
            .iter()
            .find(|s| s.path == path)
            .or_else(|| {
                self.metadata
                    .snippets
                    .iter()
                    .find(|s| s.path.ends_with(path) || path.ends_with(&s.path))
            })
    }

    /// Re-fingerprint the named tracked paths against current disk content
    pub fn refresh_fingerprints(&mut self, paths: &[String]) {
        let root = self.paths.root().to_path_buf();
        for snippet in &mut self.metadata.snippets {
            if paths.iter().any(|p| p == &snippet.path) {
                snippet.hash = file_fingerprint(&root.join(&snippet.path));
                snippet.updated_at = Utc::now();
            }
        }
    }

    // =========================================================================
    // Generated Documents
    // =========================================================================

    /// Record a generated document, replacing its references wholesale if an
    /// entry for the path exists. Returns true when a new entry was created.
    pub fn add_document(&mut self, path: &str, references: Vec<String>) -> bool {
        if let Some(existing) = self.metadata.documents.iter_mut().find(|d| d.path == path) {
            existing.references = references;
            existing.updated_at = Utc::now();
            return false;
        }

        self.metadata.documents.push(GeneratedDocument {
            path: path.to_string(),
            references,
            updated_at: Utc::now(),
        });
        true
    }

    /// Find generated documents affected by a change to `source_path`.
    ///
    /// Primary signal is the structured `references` list; a text scan of
    /// the markdown under the docs root catches documents that mention the
    /// path (plain or as a `file://` link) without a recorded reference.
    /// Unreadable documents are skipped.
    pub fn find_documents_referencing(&self, source_path: &str, docs_dir: &str) -> Vec<String> {
        let mut affected: BTreeSet<String> = self
            .metadata
            .documents
            .iter()
            .filter(|d| d.references.iter().any(|r| r == source_path))
            .map(|d| d.path.clone())
            .collect();

        let docs_root = self.paths.docs_dir(docs_dir);
        let link_form = format!("file://{}", source_path);
        scan_markdown_for(&docs_root, source_path, &link_form, &self.paths, &mut affected);

        affected.into_iter().collect()
    }
}

fn scan_markdown_for(
    dir: &Path,
    needle: &str,
    link_form: &str,
    paths: &ProjectPaths,
    affected: &mut BTreeSet<String>,
) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            scan_markdown_for(&path, needle, link_form, paths, affected);
        } else if path.extension().is_some_and(|ext| ext == "md") {
            match fs::read_to_string(&path) {
                Ok(content) => {
                    if content.contains(needle) || content.contains(link_form) {
                        affected.insert(paths.relative(&path));
                    }
                }
                Err(e) => {
                    warn!("Skipping unreadable document {}: {}", path.display(), e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project() -> (TempDir, MetadataStore) {
        let temp = TempDir::new().unwrap();
        let store = MetadataStore::open(ProjectPaths::at(temp.path()));
        (temp, store)
    }

    fn write_source(temp: &TempDir, rel: &str, content: &str) {
        let path = temp.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_add_tracked_creates_entry_with_fingerprint() {
        let (temp, mut store) = project();
        write_source(&temp, "src/lib/auth.ts", "export const login = () => {};\n");

        let outcome = store
            .add_tracked(Path::new("src/lib/auth.ts"), [1, 1])
            .unwrap();
        match outcome {
            TrackOutcome::Added(file) => {
                assert_eq!(file.path, "src/lib/auth.ts");
                assert!(file.hash.is_some());
                assert_eq!(file.id.len(), crate::constants::store::SNIPPET_ID_LEN);
            }
            other => panic!("expected Added, got {:?}", other),
        }
        assert!(store.is_tracked("src/lib/auth.ts"));
    }

    #[test]
    fn test_duplicate_add_is_noop() {
        let (temp, mut store) = project();
        write_source(&temp, "src/a.ts", "const a = 1;\n");

        store.add_tracked(Path::new("src/a.ts"), [1, 1]).unwrap();
        let original_hash = store.snippets()[0].hash.clone();

        write_source(&temp, "src/a.ts", "const a = 2;\n");
        let outcome = store.add_tracked(Path::new("src/a.ts"), [1, 1]).unwrap();

        assert_eq!(
            outcome,
            TrackOutcome::AlreadyTracked("src/a.ts".to_string())
        );
        assert_eq!(store.snippets().len(), 1);
        // Stored hash must not be disturbed by the duplicate add
        assert_eq!(store.snippets()[0].hash, original_hash);
    }

    #[test]
    fn test_add_tracked_rejects_missing_path() {
        let (_temp, mut store) = project();
        let err = store
            .add_tracked(Path::new("src/nope.ts"), [1, 1])
            .unwrap_err();
        assert!(matches!(err, DriftError::PathNotFound(_)));
    }

    #[test]
    fn test_remove_tracked() {
        let (temp, mut store) = project();
        write_source(&temp, "src/a.ts", "x\n");
        store.add_tracked(Path::new("src/a.ts"), [1, 1]).unwrap();

        assert!(store.remove_tracked("src/a.ts"));
        assert!(!store.remove_tracked("src/a.ts"));
        assert!(!store.is_tracked("src/a.ts"));
    }

    #[test]
    fn test_find_by_path_suffix_match() {
        let (temp, mut store) = project();
        write_source(&temp, "src/lib/auth.ts", "x\n");
        store
            .add_tracked(Path::new("src/lib/auth.ts"), [1, 1])
            .unwrap();

        assert!(store.find_by_path("src/lib/auth.ts").is_some());
        assert!(store.find_by_path("lib/auth.ts").is_some());
        assert!(store.find_by_path("other.ts").is_none());
    }

    #[test]
    fn test_save_and_reopen() {
        let (temp, mut store) = project();
        write_source(&temp, "src/a.ts", "x\n");
        store.add_tracked(Path::new("src/a.ts"), [1, 1]).unwrap();
        store.add_document("docs/features/a.md", vec!["src/a.ts".into()]);
        store.save().unwrap();

        let reopened = MetadataStore::open(ProjectPaths::at(temp.path()));
        assert_eq!(reopened.snippets().len(), 1);
        assert_eq!(reopened.documents().len(), 1);
        assert_eq!(reopened.metadata.version, METADATA_VERSION);
        assert!(reopened.metadata.last_updated.is_some());
    }

    #[test]
    fn test_corrupt_metadata_starts_fresh() {
        let temp = TempDir::new().unwrap();
        let paths = ProjectPaths::at(temp.path());
        fs::create_dir_all(paths.data_dir()).unwrap();
        fs::write(paths.metadata_path(), "not json").unwrap();

        let store = MetadataStore::open(paths);
        assert!(store.snippets().is_empty());
    }

    #[test]
    fn test_add_document_updates_references_in_place() {
        let (_temp, mut store) = project();
        assert!(store.add_document("docs/features/a.md", vec!["src/a.ts".into()]));
        assert!(!store.add_document("docs/features/a.md", vec!["src/b.ts".into()]));

        assert_eq!(store.documents().len(), 1);
        assert_eq!(store.documents()[0].references, vec!["src/b.ts".to_string()]);
    }

    #[test]
    fn test_refresh_fingerprints() {
        let (temp, mut store) = project();
        write_source(&temp, "src/a.ts", "v1\n");
        store.add_tracked(Path::new("src/a.ts"), [1, 1]).unwrap();
        let before = store.snippets()[0].hash.clone();

        write_source(&temp, "src/a.ts", "v2\n");
        store.refresh_fingerprints(&["src/a.ts".to_string()]);
        assert_ne!(store.snippets()[0].hash, before);
    }

    #[test]
    fn test_find_documents_referencing_structured_and_text() {
        let (temp, mut store) = project();
        store.add_document("docs/features/auth.md", vec!["src/lib/auth.ts".into()]);

        // A document with no recorded reference but a textual mention
        let docs = temp.path().join("docs").join("guides");
        fs::create_dir_all(&docs).unwrap();
        fs::write(
            docs.join("overview.md"),
            "See [auth](file://src/lib/auth.ts) for details.\n",
        )
        .unwrap();
        fs::write(docs.join("unrelated.md"), "Nothing relevant here.\n").unwrap();

        let affected = store.find_documents_referencing("src/lib/auth.ts", "docs");
        assert!(affected.contains(&"docs/features/auth.md".to_string()));
        assert!(affected.contains(&"docs/guides/overview.md".to_string()));
        assert!(!affected.contains(&"docs/guides/unrelated.md".to_string()));
    }
}
