//! CLI frontend for Atlas: load and inspect mod content from the terminal.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::SourceArgs;

#[derive(Parser)]
#[command(
    name = "atlas",
    about = "Atlas: incremental loading and inspection of game mod content",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List countries with their resolved map colors
    Countries {
        #[command(flatten)]
        source: SourceArgs,

        /// Print the full load result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List country tags and the files that define them
    Tags {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Load everything and report warnings
    Check {
        #[command(flatten)]
        source: SourceArgs,

        /// Fail if any warning is reported
        #[arg(long)]
        strict: bool,
    },

    /// Parse a single script file and report syntax errors
    Lint {
        /// The file to check
        file: PathBuf,

        /// Also check the file's shape and warn about ignored values
        #[arg(long, value_enum)]
        schema: Option<commands::lint::FileKind>,
    },

    /// Poll for changes and report each reload
    Watch {
        #[command(flatten)]
        source: SourceArgs,

        /// Milliseconds between polls
        #[arg(long, default_value = "1000")]
        interval_ms: u64,

        /// Stop after this many polls (default: run until interrupted)
        #[arg(long)]
        cycles: Option<u64>,

        /// Print each load stage to stderr
        #[arg(long)]
        progress: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("ATLAS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Countries { source, json } => commands::countries::run(&source, json).await,
        Commands::Tags { source } => commands::tags::run(&source).await,
        Commands::Check { source, strict } => commands::check::run(&source, strict).await,
        Commands::Lint { file, schema } => commands::lint::run(&file, schema),
        Commands::Watch {
            source,
            interval_ms,
            cycles,
            progress,
        } => commands::watch::run(&source, interval_ms, cycles, progress).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
