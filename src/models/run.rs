//! Research run records.
//!
//! A run row is the source of truth for batch status: it is created before
//! the background worker starts, mutated only by that worker, and terminal
//! once its status leaves `running`. Callers poll the row; there is no
//! in-memory registry of workers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a research run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(Self::Queued),
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// A run is terminal once it has completed or failed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Effective configuration for one run, fixed at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOptions {
    /// Sheet/range string to read candidates from.
    pub source_range: String,
    /// Whether reconciled companies are mirrored to the sink spreadsheet.
    pub mirror_to_sink: bool,
    /// Optional cap on the number of candidate records processed.
    pub max_records: Option<u32>,
    /// Free-text label for the run.
    pub description: String,
}

/// One execution of the research batch.
#[derive(Debug, Clone, Serialize)]
pub struct ResearchRun {
    pub id: String,
    pub status: RunStatus,
    pub source_range: String,
    pub mirror_to_sink: bool,
    pub max_records: Option<u32>,
    pub description: String,
    /// Candidate count after filtering and capping; fixed once known.
    pub total_count: u32,
    /// Successfully reconciled records so far.
    pub processed_count: u32,
    /// Newline-separated per-record failure entries.
    pub error_log: String,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            RunStatus::Queued,
            RunStatus::Running,
            RunStatus::Completed,
            RunStatus::Failed,
        ] {
            assert_eq!(RunStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(RunStatus::from_str("bogus"), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!RunStatus::Queued.is_terminal());
        assert!(!RunStatus::Running.is_terminal());
        assert!(RunStatus::Completed.is_terminal());
        assert!(RunStatus::Failed.is_terminal());
    }
}
