//! Extraction client for structured company research.
//!
//! Wraps a single chat-completion call per company against an
//! OpenAI-compatible endpoint and parses the response into an
//! [`ExtractedDocument`](crate::models::ExtractedDocument).

mod client;
mod prompts;

pub use client::{ExtractionClient, ExtractionConfig, ExtractionError};

use async_trait::async_trait;

use crate::models::{ExtractedDocument, SourceRecord};

/// Seam for the per-record extraction stage.
///
/// Business-level failures (unparseable model output) surface as `Ok(None)`
/// so the caller can skip the record; only transport-level failures are
/// errors.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract(
        &self,
        record: &SourceRecord,
    ) -> Result<Option<ExtractedDocument>, ExtractionError>;
}

#[async_trait]
impl DocumentExtractor for ExtractionClient {
    async fn extract(
        &self,
        record: &SourceRecord,
    ) -> Result<Option<ExtractedDocument>, ExtractionError> {
        ExtractionClient::extract(self, record).await
    }
}
