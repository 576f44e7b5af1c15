//! Status Command
//!
//! Shows tracking counts and the current pending change-set.

use crate::cli::Output;
use crate::project::ProjectPaths;
use crate::store::{MetadataStore, PendingStore};
use crate::types::Result;

pub fn run() -> Result<()> {
    let output = Output::new();
    let paths = ProjectPaths::discover()?;

    if !paths.is_initialized() {
        println!("docdrift Status");
        println!("===============");
        println!("Not initialized. Run 'docdrift init' first.");
        return Ok(());
    }

    let store = MetadataStore::open(paths.clone());
    let pending = PendingStore::new(paths).load();

    println!();
    println!("docdrift Status");
    println!("===============");
    println!("Tracked files:    {}", store.snippets().len());
    println!("Documents:        {}", store.documents().len());
    println!("Pending updates:  {}", pending.changed_files.len());

    if !pending.changed_files.is_empty() {
        output.section("Pending changes");
        for file in &pending.changed_files {
            println!("  - {}", file);
        }
    }

    if !pending.affected_docs.is_empty() {
        output.section("Affected documents");
        for doc in &pending.affected_docs {
            println!("  - {}", doc);
        }
    }

    if !pending.missing_files.is_empty() {
        output.section("Missing files");
        for file in &pending.missing_files {
            println!("  - {}", file);
        }
    }

    println!();
    Ok(())
}
