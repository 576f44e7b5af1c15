//! Pending Change-Set Persistence
//!
//! Reads and writes `.docdrift/pending.json`. File absence means "no
//! detection performed yet" and loads as the default (empty, no timestamp)
//! set; a corrupt file degrades the same way rather than failing the run.

use std::fs;

use tracing::{debug, warn};

use crate::project::ProjectPaths;
use crate::types::{PendingChangeSet, Result};

/// Handle over the durable pending change-set
#[derive(Debug, Clone)]
pub struct PendingStore {
    paths: ProjectPaths,
}

impl PendingStore {
    pub fn new(paths: ProjectPaths) -> Self {
        Self { paths }
    }

    /// True when a pending set has been persisted (even an empty one)
    pub fn exists(&self) -> bool {
        self.paths.pending_path().is_file()
    }

    /// Load the pending set; absent or corrupt files load as the default
    pub fn load(&self) -> PendingChangeSet {
        let path = self.paths.pending_path();
        if !path.is_file() {
            return PendingChangeSet::default();
        }

        match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(pending) => pending,
                Err(e) => {
                    warn!("Corrupt pending set at {}, ignoring: {}", path.display(), e);
                    PendingChangeSet::default()
                }
            },
            Err(e) => {
                warn!("Cannot read pending set at {}: {}", path.display(), e);
                PendingChangeSet::default()
            }
        }
    }

    /// Persist the pending set, fully overwriting any prior one
    pub fn save(&self, pending: &PendingChangeSet) -> Result<()> {
        fs::create_dir_all(self.paths.data_dir())?;
        let json = serde_json::to_string_pretty(pending)?;
        fs::write(self.paths.pending_path(), json)?;
        debug!(
            changed = pending.changed_files.len(),
            affected = pending.affected_docs.len(),
            missing = pending.missing_files.len(),
            "Persisted pending change-set"
        );
        Ok(())
    }

    /// Delete the pending file; returns whether one existed
    pub fn clear(&self) -> Result<bool> {
        let path = self.paths.pending_path();
        if path.is_file() {
            fs::remove_file(&path)?;
            debug!("Cleared pending change-set");
            return Ok(true);
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn store() -> (TempDir, PendingStore) {
        let temp = TempDir::new().unwrap();
        let store = PendingStore::new(ProjectPaths::at(temp.path()));
        (temp, store)
    }

    #[test]
    fn test_absent_loads_default() {
        let (_temp, store) = store();
        assert!(!store.exists());
        let pending = store.load();
        assert!(pending.timestamp.is_none());
        assert!(pending.is_empty());
    }

    #[test]
    fn test_save_load_round_trip() {
        let (_temp, store) = store();
        let pending = PendingChangeSet {
            timestamp: Some(Utc::now()),
            changed_files: vec!["src/a.ts".into()],
            affected_docs: vec!["docs/features/a.md".into()],
            missing_files: vec!["src/gone.ts".into()],
        };

        store.save(&pending).unwrap();
        assert!(store.exists());
        let loaded = store.load();
        assert_eq!(loaded.changed_files, pending.changed_files);
        assert_eq!(loaded.affected_docs, pending.affected_docs);
        assert_eq!(loaded.missing_files, pending.missing_files);
    }

    #[test]
    fn test_save_overwrites_prior_set() {
        let (_temp, store) = store();
        let first = PendingChangeSet {
            timestamp: Some(Utc::now()),
            changed_files: vec!["src/a.ts".into(), "src/b.ts".into()],
            ..Default::default()
        };
        store.save(&first).unwrap();

        let second = PendingChangeSet {
            timestamp: Some(Utc::now()),
            changed_files: vec!["src/c.ts".into()],
            ..Default::default()
        };
        store.save(&second).unwrap();

        assert_eq!(store.load().changed_files, vec!["src/c.ts".to_string()]);
    }

    #[test]
    fn test_clear() {
        let (_temp, store) = store();
        assert!(!store.clear().unwrap());
        store.save(&PendingChangeSet::default()).unwrap();
        assert!(store.clear().unwrap());
        assert!(!store.exists());
    }

    #[test]
    fn test_corrupt_file_loads_default() {
        let (_temp, store) = store();
        fs::create_dir_all(store.paths.data_dir()).unwrap();
        fs::write(store.paths.pending_path(), "}{").unwrap();
        assert!(store.load().is_empty());
    }
}
