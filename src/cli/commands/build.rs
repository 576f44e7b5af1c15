//! Build Command
//!
//! Full generation pass: scan for untracked source files, group everything,
//! verify the provider is reachable, then generate documents sequentially.
//! Provider misconfiguration or an unreachable backend aborts before any
//! generation is attempted; per-group failures are tallied and reported.

use std::path::Path;

use crate::ai::create_provider;
use crate::build::{BuildOptions, DocumentBuilder};
use crate::cli::Output;
use crate::config::ConfigLoader;
use crate::group::{default_rules, group_by_feature};
use crate::project::ProjectPaths;
use crate::scan::FileScanner;
use crate::store::{MetadataStore, PendingStore, TrackOutcome, line_count};
use crate::types::{DriftError, Result};

#[derive(Debug, Clone, Default)]
pub struct BuildArgs {
    pub force: bool,
    pub filter: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
}

pub async fn run(args: BuildArgs) -> Result<()> {
    let output = Output::new();
    let paths = ProjectPaths::discover()?;
    if !paths.is_initialized() {
        return Err(DriftError::NotInitialized);
    }

    let mut config = ConfigLoader::load(&paths);
    if let Some(provider) = args.provider {
        config.ai.provider = provider;
    }
    if let Some(model) = args.model {
        config.ai.model = Some(model);
    }
    config.validate()?;

    let mut store = MetadataStore::open(paths.clone());

    // Pick up trackable files added since the last run
    let scanner = FileScanner::new(
        &paths,
        &config.source_patterns,
        &config.ignore_patterns,
        &config.docs_dir,
    )?;
    let mut discovered = 0;
    for relative in scanner.scan() {
        if store.is_tracked(&relative) {
            continue;
        }
        let lines = line_count(&paths.absolute(Path::new(&relative)));
        // A file deleted mid-scan is skipped, not fatal
        match store.add_tracked(Path::new(&relative), [1, lines.max(1)]) {
            Ok(TrackOutcome::Added(_)) => discovered += 1,
            Ok(TrackOutcome::AlreadyTracked(_)) => {}
            Err(DriftError::PathNotFound(_)) => {}
            Err(e) => return Err(e),
        }
    }
    if discovered > 0 {
        output.info(&format!("Discovered {} new files to track.", discovered));
    }

    if store.snippets().is_empty() {
        output.info("No files tracked. Use 'docdrift add <path>' to add files first.");
        return Ok(());
    }

    // Misconfiguration and unreachable backends abort up front
    let provider = create_provider(&config.ai)?;
    if !provider.health_check().await? {
        return Err(DriftError::Config(format!(
            "Provider '{}' is not available. Check your installation or API key.",
            provider.name()
        )));
    }
    output.success(&format!(
        "Provider ready: {} ({})",
        provider.name(),
        provider.model()
    ));

    let rules = default_rules();
    let groups = group_by_feature(store.snippets(), &rules, &config);
    println!(
        "Building documentation: {} groups from {} tracked files\n",
        groups.len(),
        store.snippets().len()
    );

    let pending_store = PendingStore::new(paths.clone());
    let builder = DocumentBuilder::new(provider, &config, &paths);
    let options = BuildOptions {
        force: args.force,
        filter: args.filter,
    };
    let summary = builder
        .build(&groups, &options, &mut store, &pending_store)
        .await?;

    println!();
    println!("Build complete!");
    println!("  Generated: {}", summary.generated);
    println!("  Skipped:   {}", summary.skipped);
    if summary.errored > 0 {
        println!("  Errors:    {}", summary.errored);
        for (key, message) in &summary.failures {
            output.error(&format!("{}: {}", key, message));
        }
    }

    Ok(())
}
