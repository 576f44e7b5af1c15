//! Init Command
//!
//! Scaffolds the data directory, default config, empty metadata, and the
//! docs directory skeleton in the current directory.

use std::fs;

use crate::cli::Output;
use crate::config::{Config, ConfigLoader};
use crate::project::ProjectPaths;
use crate::store::MetadataStore;
use crate::types::{DriftError, Result};

pub fn run(force: bool, docs_dir: Option<String>) -> Result<()> {
    let output = Output::new();
    let root = std::env::current_dir()?;
    let paths = ProjectPaths::at(&root);

    if paths.is_initialized() && !force {
        return Err(DriftError::Config(
            "Already initialized. Use --force to overwrite.".to_string(),
        ));
    }

    fs::create_dir_all(paths.data_dir())?;
    output.success("Created .docdrift/");

    let mut config = Config::default();
    if let Some(docs_dir) = docs_dir {
        config.docs_dir = docs_dir;
    }
    config.validate()?;
    ConfigLoader::save(&paths, &config)?;
    output.success("Created .docdrift/config.json");

    let mut store = MetadataStore::open(paths.clone());
    store.save()?;
    output.success("Created .docdrift/metadata.json");

    scaffold_docs(&paths, &config)?;
    output.success(&format!("Created {}/ directory structure", config.docs_dir));

    println!();
    println!("Initialization complete!");
    println!();
    println!("Next steps:");
    println!("  docdrift add src/ -r       # Add files to track");
    println!("  docdrift status            # Check status");
    println!("  docdrift build             # Generate documentation");

    Ok(())
}

fn scaffold_docs(paths: &ProjectPaths, config: &Config) -> Result<()> {
    let docs_root = paths.docs_dir(&config.docs_dir);
    for category in ["architecture", "features", "api"] {
        fs::create_dir_all(docs_root.join(category))?;
    }

    let index = docs_root.join("index.md");
    if !index.exists() {
        fs::write(
            &index,
            "# Project Documentation\n\n\
             This documentation is managed by docdrift.\n\n\
             ## Categories\n\n\
             - [Architecture](./architecture/) - System structure and design\n\
             - [Features](./features/) - Feature documentation\n\
             - [API](./api/) - API reference\n\n\
             ## Quick Start\n\n\
             ```bash\n\
             # Check documentation status\n\
             docdrift status\n\n\
             # Add files to track\n\
             docdrift add src/lib/myService.ts\n\n\
             # Detect changes\n\
             docdrift detect\n\n\
             # Generate documentation\n\
             docdrift build\n\
             ```\n",
        )?;
    }
    Ok(())
}
