//! Web server exposing the run trigger/status API.
//!
//! The server never executes batch work in a request handler: a start
//! request creates the run row and detaches a worker, and every status read
//! goes back to the persisted row.

mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Settings;
use crate::models::RunOptions;
use crate::repository::migrations;
use crate::services::{self, ResearchService};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ResearchService>,
    /// Defaults applied to start requests that omit overrides.
    pub defaults: RunOptions,
}

impl AppState {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        Ok(Self {
            service: services::build_service(settings)?,
            defaults: settings.default_run_options(),
        })
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    migrations::run_migrations(&settings.database_url()).await?;

    let state = AppState::new(settings)?;
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
