//! CLI parser and dispatch.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "kenkyu")]
#[command(about = "Company research pipeline: spreadsheet ingestion, LLM enrichment, reconciliation")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database (apply pending migrations)
    Init,
    /// Run a research batch in the foreground
    Run {
        /// Sheet range to read candidates from
        #[arg(long)]
        range: Option<String>,
        /// Cap on processed records
        #[arg(long)]
        max_records: Option<u32>,
        /// Skip mirroring to the sink spreadsheet
        #[arg(long)]
        no_mirror: bool,
        /// Free-text label for the run
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Start the HTTP API server
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// List recent runs
    Runs {
        #[arg(long, default_value_t = 10)]
        limit: i64,
    },
    /// Show a stored company
    Show {
        /// Corporate number of the company
        corporate_number: String,
    },
}

/// Parse arguments and dispatch.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Init => commands::cmd_init(&settings).await,
        Commands::Run {
            range,
            max_records,
            no_mirror,
            description,
        } => commands::cmd_run(&settings, range, max_records, no_mirror, description).await,
        Commands::Serve { host, port } => crate::server::serve(&settings, &host, port).await,
        Commands::Runs { limit } => commands::cmd_runs(&settings, limit).await,
        Commands::Show { corporate_number } => commands::cmd_show(&settings, &corporate_number).await,
    }
}
