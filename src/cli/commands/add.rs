//! Add Command
//!
//! Puts files under documentation tracking. A single file is added directly;
//! a directory requires `--recursive` and is filtered through the configured
//! source and ignore patterns.

use std::path::{Path, PathBuf};

use crate::cli::Output;
use crate::config::ConfigLoader;
use crate::project::ProjectPaths;
use crate::scan::FileScanner;
use crate::store::{MetadataStore, TrackOutcome, line_count};
use crate::types::{DriftError, Result};

pub fn run(target: PathBuf, recursive: bool) -> Result<()> {
    let output = Output::new();
    let paths = ProjectPaths::discover()?;
    if !paths.is_initialized() {
        return Err(DriftError::NotInitialized);
    }

    let absolute = paths.absolute(&target);
    if !absolute.exists() {
        return Err(DriftError::PathNotFound(target.display().to_string()));
    }

    let config = ConfigLoader::load(&paths);
    let mut store = MetadataStore::open(paths.clone());

    if absolute.is_dir() {
        if !recursive {
            output.info("Use -r or --recursive to add directory contents.");
            return Ok(());
        }

        let scanner = FileScanner::new(
            &paths,
            &config.source_patterns,
            &config.ignore_patterns,
            &config.docs_dir,
        )?;
        let prefix = paths.relative(&absolute);
        let mut added = 0;
        for relative in scanner.scan() {
            if !prefix.is_empty() && !relative.starts_with(&format!("{}/", prefix)) {
                continue;
            }
            if track_one(&mut store, &paths, Path::new(&relative), &output)? {
                added += 1;
            }
        }
        store.save()?;
        println!();
        output.success(&format!("Added {} files to tracking.", added));
    } else {
        track_one(&mut store, &paths, &absolute, &output)?;
        store.save()?;
    }

    Ok(())
}

/// Track a single file; duplicate adds are reported, not errors
fn track_one(
    store: &mut MetadataStore,
    paths: &ProjectPaths,
    path: &Path,
    output: &Output,
) -> Result<bool> {
    let absolute = paths.absolute(path);
    let lines = line_count(&absolute);
    match store.add_tracked(path, [1, lines.max(1)])? {
        TrackOutcome::Added(file) => {
            output.success(&format!("Added: {}", file.path));
            Ok(true)
        }
        TrackOutcome::AlreadyTracked(path) => {
            output.info(&format!("Already tracked: {}", path));
            Ok(false)
        }
    }
}
