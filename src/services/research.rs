//! The research run controller.
//!
//! Drives one batch: fetch the candidate list, then per record extract,
//! normalize, reconcile, and optionally mirror. Every per-record failure is
//! caught at the record boundary, appended to the run log, and the loop
//! moves on; only a source failure (or a database error escaping the
//! boundary) fails the run. Partial success is still `completed` — callers
//! judge a run by `processed_count` against `total_count`, not status
//! alone.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::mirror::{MirrorPool, MirrorService};
use crate::llm::DocumentExtractor;
use crate::models::{
    LocationEntry, ResearchRun, RosterEntry, RunOptions, SourceRecord,
};
use crate::normalize::{extract_locations, extract_roster};
use crate::repository::{
    CompanyRepository, DieselError, ReconcileError, ReconcileOutcome, RunRepository,
};
use crate::sheets::{RecordSource, SheetsError};

/// Failures that abort a whole run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The candidate list could not be read. With no record list there is
    /// nothing to isolate per item, so the run fails with zero processed.
    #[error("source unavailable: {0}")]
    SourceUnavailable(#[from] SheetsError),
    /// A run-bookkeeping write failed; state is no longer trustworthy.
    #[error("database error: {0}")]
    Database(#[from] DieselError),
}

/// One run's background worker, shared by CLI and server.
pub struct ResearchService {
    source: Arc<dyn RecordSource>,
    extractor: Arc<dyn DocumentExtractor>,
    companies: CompanyRepository,
    runs: RunRepository,
    mirror: Option<Arc<MirrorService>>,
    log_changes: bool,
}

impl ResearchService {
    pub fn new(
        source: Arc<dyn RecordSource>,
        extractor: Arc<dyn DocumentExtractor>,
        companies: CompanyRepository,
        runs: RunRepository,
        mirror: Option<Arc<MirrorService>>,
        log_changes: bool,
    ) -> Self {
        Self {
            source,
            extractor,
            companies,
            runs,
            mirror,
            log_changes,
        }
    }

    pub fn runs(&self) -> &RunRepository {
        &self.runs
    }

    pub fn companies(&self) -> &CompanyRepository {
        &self.companies
    }

    /// Create a run and execute it on a detached worker.
    ///
    /// Returns as soon as the queued run row exists; callers poll the row
    /// for status. There is no cancellation: the worker proceeds to
    /// completion or fatal failure.
    pub async fn start(self: &Arc<Self>, options: RunOptions) -> Result<ResearchRun, DieselError> {
        let run = self.runs.create(&options).await?;

        let service = Arc::clone(self);
        let run_id = run.id.clone();
        tokio::spawn(async move {
            service.execute(&run_id, &options).await;
        });

        Ok(run)
    }

    /// Create a run and execute it in the foreground.
    pub async fn run_to_completion(
        &self,
        options: RunOptions,
    ) -> Result<ResearchRun, DieselError> {
        let run = self.runs.create(&options).await?;
        self.execute(&run.id, &options).await;
        Ok(self.runs.get(&run.id).await?.unwrap_or(run))
    }

    /// Execute one run to its terminal state.
    pub async fn execute(&self, run_id: &str, options: &RunOptions) {
        match self.run_batch(run_id, options).await {
            Ok((processed, total)) => {
                info!(run_id, processed, total, "research run completed");
            }
            Err(e) => {
                error!(run_id, error = %e, "research run failed");
                if let Err(db) = self.runs.fail(run_id, &e.to_string()).await {
                    error!(run_id, error = %db, "failed to record run failure");
                }
            }
        }
    }

    async fn run_batch(
        &self,
        run_id: &str,
        options: &RunOptions,
    ) -> Result<(u32, u32), PipelineError> {
        self.runs.mark_running(run_id).await?;

        let mut records = self.source.fetch_records(&options.source_range).await?;
        if let Some(cap) = options.max_records {
            records.truncate(cap as usize);
        }
        let total = records.len() as u32;
        self.runs.set_total(run_id, total).await?;
        info!(run_id, total, "candidate list loaded");

        let mut pool = if options.mirror_to_sink {
            self.mirror.as_ref().map(|m| MirrorPool::new(m.clone()))
        } else {
            None
        };

        let mut processed = 0u32;
        for record in &records {
            match self.process_record(record).await {
                Ok((outcome, roster, locations)) => {
                    processed += 1;
                    self.runs.update_progress(run_id, processed).await?;
                    if let Some(pool) = pool.as_mut() {
                        pool.submit(outcome.company, roster, locations).await;
                    }
                }
                Err(line) => {
                    warn!(run_id, "{line}");
                    self.runs.append_error(run_id, &line).await?;
                }
            }
        }

        if let Some(pool) = pool.take() {
            for failure in pool.drain().await {
                self.runs.append_error(run_id, &failure).await?;
            }
        }

        self.runs.complete(run_id, processed).await?;
        Ok((processed, total))
    }

    /// One record through extract → normalize → reconcile.
    ///
    /// Every failure mode becomes a log line; nothing from this path can
    /// abort the run.
    async fn process_record(
        &self,
        record: &SourceRecord,
    ) -> Result<(ReconcileOutcome, Vec<RosterEntry>, Vec<LocationEntry>), String> {
        let doc = match self.extractor.extract(record).await {
            Ok(Some(doc)) => doc,
            Ok(None) => {
                return Err(format!(
                    "extraction produced no document for {}",
                    record.identifier
                ));
            }
            Err(e) => {
                return Err(format!("extraction failed for {}: {e}", record.identifier));
            }
        };

        let roster = extract_roster(&doc);
        let locations = extract_locations(&doc);

        match self
            .companies
            .reconcile(&doc, &roster, &locations, self.log_changes)
            .await
        {
            Ok(outcome) => Ok((outcome, roster, locations)),
            Err(e @ ReconcileError::MissingIdentifier) => Err(format!(
                "reconciliation rejected for {}: {e}",
                record.identifier
            )),
            Err(e) => Err(format!(
                "reconciliation failed for {}: {e}",
                record.identifier
            )),
        }
    }
}
