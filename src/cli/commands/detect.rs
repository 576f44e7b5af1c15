//! Detect Command
//!
//! Runs a drift detection pass and persists the pending change-set. With
//! `--quiet` only the exit state is reported through logging, so the command
//! can run from editor hooks without polluting the terminal.

use crate::cli::Output;
use crate::config::ConfigLoader;
use crate::detect::ChangeDetector;
use crate::project::ProjectPaths;
use crate::store::{MetadataStore, PendingStore};
use crate::types::{DriftError, Result};

pub fn run(quiet: bool) -> Result<()> {
    let output = Output::new();
    let paths = ProjectPaths::discover()?;
    if !paths.is_initialized() {
        return Err(DriftError::NotInitialized);
    }

    let config = ConfigLoader::load(&paths);
    let store = MetadataStore::open(paths.clone());
    let pending_store = PendingStore::new(paths.clone());

    let detector = ChangeDetector::new(&store, &config.docs_dir);
    let outcome = detector.run_detection(&paths, &pending_store)?;

    if quiet {
        return Ok(());
    }

    if outcome.report.is_clean() {
        output.success(&format!(
            "No drift detected ({} tracked files).",
            outcome.report.total_tracked
        ));
        return Ok(());
    }

    if !outcome.report.changed.is_empty() {
        output.section(&format!("Changed files ({})", outcome.report.changed.len()));
        for changed in &outcome.report.changed {
            println!("  - {}", changed.path);
        }
    }

    if !outcome.report.missing.is_empty() {
        output.section(&format!("Missing files ({})", outcome.report.missing.len()));
        for missing in &outcome.report.missing {
            println!("  - {}", missing);
        }
    }

    if !outcome.pending.affected_docs.is_empty() {
        output.section(&format!(
            "Affected documents ({})",
            outcome.pending.affected_docs.len()
        ));
        for doc in &outcome.pending.affected_docs {
            println!("  - {}", doc);
        }
    }

    println!();
    output.info("Run 'docdrift build' to regenerate affected documentation.");
    Ok(())
}
