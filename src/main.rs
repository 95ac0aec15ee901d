//! kenkyu - company research pipeline.
//!
//! Ingests company identifiers from a spreadsheet, enriches each via an
//! LLM extraction service, and reconciles the results into a local store.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use company_research::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let default_filter = if cli::is_verbose() {
        "company_research=info"
    } else {
        "company_research=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Run CLI
    cli::run().await
}
