//! Source File Scanner
//!
//! Walks the project tree collecting trackable source files. Respects
//! `.gitignore`, skips hidden entries and well-known build output
//! directories, and never descends into the docs output root or the data
//! directory. Traversal errors (permission denied, dangling symlinks) are
//! logged and skipped; a scan never aborts mid-walk.

use ignore::WalkBuilder;
use tracing::{debug, warn};

use crate::constants::scan::SKIP_DIRS;
use crate::pattern::PatternSet;
use crate::project::{DATA_DIR, ProjectPaths};
use crate::types::Result;

/// Project tree walker yielding trackable relative paths
pub struct FileScanner<'a> {
    paths: &'a ProjectPaths,
    patterns: PatternSet,
    docs_dir: String,
}

impl<'a> FileScanner<'a> {
    /// Compile the include/exclude patterns for a scan
    pub fn new(
        paths: &'a ProjectPaths,
        include: &[String],
        exclude: &[String],
        docs_dir: &str,
    ) -> Result<Self> {
        Ok(Self {
            paths,
            patterns: PatternSet::new(include, exclude)?,
            docs_dir: docs_dir.to_string(),
        })
    }

    /// Walk the tree and return matching paths, sorted for stable output
    pub fn scan(&self) -> Vec<String> {
        let docs_dir = self.docs_dir.clone();
        let walker = WalkBuilder::new(self.paths.root())
            .git_ignore(true)
            .follow_links(false)
            .hidden(true)
            .filter_entry(move |entry| {
                let name = entry.file_name().to_string_lossy();
                if entry.file_type().is_some_and(|t| t.is_dir()) {
                    if name == DATA_DIR || name == docs_dir {
                        return false;
                    }
                    if SKIP_DIRS.contains(&name.as_ref()) {
                        return false;
                    }
                }
                true
            })
            .build();

        let mut found = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry during scan: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let relative = self.paths.relative(entry.path());
            if self.patterns.is_trackable(&relative) {
                found.push(relative);
            }
        }

        found.sort();
        debug!(count = found.len(), "Scan complete");
        found
    }
}
