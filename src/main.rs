use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "docdrift")]
#[command(
    version,
    about = "Track documentation drift and regenerate stale docs with AI"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize docdrift in the current directory
    Init {
        #[arg(long, short, help = "Overwrite existing initialization")]
        force: bool,
        #[arg(long, help = "Documentation output directory")]
        docs_dir: Option<String>,
    },

    /// Add files to documentation tracking
    Add {
        #[arg(help = "File or directory to track")]
        path: PathBuf,
        #[arg(long, short, help = "Recurse into directories")]
        recursive: bool,
    },

    /// Detect drift between tracked files and their fingerprints
    Detect,

    /// Show tracking status and pending changes
    Status,

    /// Generate documentation for tracked files
    Build {
        #[arg(long, help = "Regenerate all documents regardless of freshness")]
        force: bool,
        #[arg(long, help = "Only build groups whose key contains this text")]
        filter: Option<String>,
        #[arg(long, help = "Provider override (claude-code, gemini)")]
        provider: Option<String>,
        #[arg(long, help = "Model override")]
        model: Option<String>,
    },

    /// Print an update prompt for the pending change-set
    Sync {
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
        #[arg(long, help = "Clear the pending change-set")]
        clear: bool,
    },
}

fn main() -> ExitCode {
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Init { force, docs_dir } => {
            docdrift::cli::commands::init::run(force, docs_dir)?;
        }
        Commands::Add { path, recursive } => {
            docdrift::cli::commands::add::run(path, recursive)?;
        }
        Commands::Detect => {
            docdrift::cli::commands::detect::run(cli.quiet)?;
        }
        Commands::Status => {
            docdrift::cli::commands::status::run()?;
        }
        Commands::Build {
            force,
            filter,
            provider,
            model,
        } => {
            let rt = Runtime::new()?;
            rt.block_on(docdrift::cli::commands::build::run(
                docdrift::cli::commands::build::BuildArgs {
                    force,
                    filter,
                    provider,
                    model,
                },
            ))?;
        }
        Commands::Sync { format, clear } => {
            docdrift::cli::commands::sync::run(&format, clear)?;
        }
    }

    Ok(())
}
