//! Service layer for the research pipeline.
//!
//! Domain logic separated from UI concerns; services are shared by the CLI
//! and the web server.

pub mod mirror;
pub mod research;

pub use mirror::{MirrorPool, MirrorService};
pub use research::{PipelineError, ResearchService};

use std::sync::Arc;

use crate::config::Settings;
use crate::llm::ExtractionClient;
use crate::repository::{CompanyRepository, RunRepository};
use crate::sheets::SheetsClient;

/// Wire the full pipeline from settings.
///
/// The sink synchronizer is always attached; whether a given run mirrors
/// is decided by that run's options, and mirroring stays best-effort.
pub fn build_service(settings: &Settings) -> anyhow::Result<Arc<ResearchService>> {
    let pool = settings.create_pool();
    let companies = CompanyRepository::new(pool.clone());
    let runs = RunRepository::new(pool);

    let sheets = Arc::new(SheetsClient::new(settings.sheets.clone())?);
    let extractor = Arc::new(ExtractionClient::new(settings.extraction.clone())?);
    let mirror = Arc::new(MirrorService::new(sheets.clone()));

    Ok(Arc::new(ResearchService::new(
        sheets,
        extractor,
        companies,
        runs,
        Some(mirror),
        settings.log_changes,
    )))
}
