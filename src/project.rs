//! Project Paths
//!
//! Locates the project root (the nearest ancestor holding the `.docdrift`
//! data directory) and derives the paths of the persisted JSON documents.
//! Constructed once per invocation and passed by handle; no ambient statics.

use std::path::{Path, PathBuf};

use crate::types::Result;

/// Hidden per-project data directory name
pub const DATA_DIR: &str = ".docdrift";

/// Metadata document file name
pub const METADATA_FILE: &str = "metadata.json";

/// Config document file name
pub const CONFIG_FILE: &str = "config.json";

/// Pending change-set file name
pub const PENDING_FILE: &str = "pending.json";

/// Resolved project root and data-file locations
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    root: PathBuf,
}

impl ProjectPaths {
    /// Anchor at an explicit root (tests, init)
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Walk up from the current directory looking for `.docdrift/`; falls
    /// back to the current directory when no ancestor is initialized.
    pub fn discover() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let mut dir = cwd.clone();
        loop {
            if dir.join(DATA_DIR).is_dir() {
                return Ok(Self { root: dir });
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(Self { root: cwd })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join(DATA_DIR)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.data_dir().join(METADATA_FILE)
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir().join(CONFIG_FILE)
    }

    pub fn pending_path(&self) -> PathBuf {
        self.data_dir().join(PENDING_FILE)
    }

    /// Docs output root for a configured directory name
    pub fn docs_dir(&self, docs_dir: &str) -> PathBuf {
        self.root.join(docs_dir)
    }

    pub fn is_initialized(&self) -> bool {
        self.data_dir().is_dir()
    }

    /// Resolve a path to an absolute path under this project
    pub fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Project-relative, forward-slash-normalized form of a path.
    /// Paths outside the root are returned as given (normalized).
    pub fn relative(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative.to_string_lossy().replace('\\', "/")
    }
}
