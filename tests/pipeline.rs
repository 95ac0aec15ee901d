//! End-to-end run controller scenarios over a real SQLite store with
//! scripted source and extraction stages.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::tempdir;

use company_research::llm::{DocumentExtractor, ExtractionError};
use company_research::models::{ExtractedDocument, RunOptions, RunStatus, SourceRecord};
use company_research::repository::{
    migrations, AsyncSqlitePool, CompanyRepository, RunRepository,
};
use company_research::services::ResearchService;
use company_research::sheets::{RecordSource, SheetsError};

/// Scripted candidate list, optionally failing like a dead transport.
struct SheetSource {
    rows: Vec<Vec<String>>,
    fail: bool,
}

#[async_trait]
impl RecordSource for SheetSource {
    async fn fetch_records(&self, _range: &str) -> Result<Vec<SourceRecord>, SheetsError> {
        if self.fail {
            return Err(SheetsError::Connection("connection refused".to_string()));
        }
        Ok(self
            .rows
            .iter()
            .filter_map(|row| SourceRecord::from_cells(row))
            .collect())
    }
}

/// Per-identifier scripted extraction behavior.
enum Extraction {
    /// A document with the given officers.
    Document { officers: Vec<(&'static str, &'static str)> },
    /// Parseable transport, unusable payload.
    NoDocument,
    /// Transport failure.
    TransportError,
    /// A document that lost its key (normally impossible past the client's
    /// identifier pinning, but the controller must survive it).
    EmptyIdentifier,
}

struct ScriptedExtractor {
    behaviors: HashMap<String, Extraction>,
}

impl ScriptedExtractor {
    fn new(behaviors: Vec<(&str, Extraction)>) -> Self {
        Self {
            behaviors: behaviors
                .into_iter()
                .map(|(id, b)| (id.to_string(), b))
                .collect(),
        }
    }

    fn document(record: &SourceRecord, officers: &[(&str, &str)]) -> ExtractedDocument {
        let mut doc = ExtractedDocument::default();
        doc.identity.corporate_number = record.identifier.clone();
        doc.identity.company_name = record.name.clone();
        doc.identity.address = record.address.clone();
        for (i, (position, name)) in officers.iter().enumerate() {
            doc.roster.insert(
                format!("役職名{}", i + 1),
                serde_json::Value::String(position.to_string()),
            );
            doc.roster.insert(
                format!("役員名{}", i + 1),
                serde_json::Value::String(name.to_string()),
            );
        }
        doc
    }
}

#[async_trait]
impl DocumentExtractor for ScriptedExtractor {
    async fn extract(
        &self,
        record: &SourceRecord,
    ) -> Result<Option<ExtractedDocument>, ExtractionError> {
        match self.behaviors.get(&record.identifier) {
            Some(Extraction::Document { officers }) => {
                Ok(Some(Self::document(record, officers)))
            }
            Some(Extraction::NoDocument) => Ok(None),
            Some(Extraction::TransportError) => {
                Err(ExtractionError::Connection("timed out".to_string()))
            }
            Some(Extraction::EmptyIdentifier) => {
                let mut doc = Self::document(record, &[]);
                doc.identity.corporate_number = String::new();
                Ok(Some(doc))
            }
            None => Ok(Some(Self::document(record, &[]))),
        }
    }
}

struct Harness {
    service: Arc<ResearchService>,
    companies: CompanyRepository,
    runs: RunRepository,
    _dir: tempfile::TempDir,
}

async fn harness(rows: Vec<Vec<String>>, source_fails: bool, extractor: ScriptedExtractor) -> Harness {
    let dir = tempdir().unwrap();
    let db_url = dir.path().join("test.db").display().to_string();
    migrations::run_migrations(&db_url).await.unwrap();

    let pool = AsyncSqlitePool::new(&db_url);
    let companies = CompanyRepository::new(pool.clone());
    let runs = RunRepository::new(pool);

    let service = Arc::new(ResearchService::new(
        Arc::new(SheetSource {
            rows,
            fail: source_fails,
        }),
        Arc::new(extractor),
        companies.clone(),
        runs.clone(),
        None,
        true,
    ));

    Harness {
        service,
        companies,
        runs,
        _dir: dir,
    }
}

fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|s| s.to_string()).collect()
}

fn options() -> RunOptions {
    RunOptions {
        source_range: "会社リスト!A3:D".to_string(),
        mirror_to_sink: false,
        max_records: None,
        description: String::new(),
    }
}

#[tokio::test]
async fn scenario_single_record_with_roster() {
    let h = harness(
        vec![row(&["1234567890123", "Acme Co", "Tokyo", ""])],
        false,
        ScriptedExtractor::new(vec![(
            "1234567890123",
            Extraction::Document {
                officers: vec![("代表取締役", "山田太郎"), ("取締役", "佐藤次郎")],
            },
        )]),
    )
    .await;

    let run = h.service.run_to_completion(options()).await.unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.total_count, 1);
    assert_eq!(run.processed_count, 1);
    assert!(run.error_log.is_empty());

    let company = h.companies.get("1234567890123").await.unwrap().unwrap();
    assert_eq!(company.company_name, "Acme Co");

    let roster = h.companies.get_roster("1234567890123").await.unwrap();
    assert_eq!(roster.len(), 2);
    assert_eq!(roster[0].sort_order, 1);
    assert_eq!(roster[1].sort_order, 2);

    let locations = h.companies.get_locations("1234567890123").await.unwrap();
    assert!(locations.is_empty());
}

#[tokio::test]
async fn scenario_empty_identifier_rows_are_not_candidates() {
    let h = harness(
        vec![
            row(&["", "Nameless Co", "Osaka", ""]),
            row(&["1234567890123", "Acme Co", "Tokyo", ""]),
        ],
        false,
        ScriptedExtractor::new(vec![]),
    )
    .await;

    let run = h.service.run_to_completion(options()).await.unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.total_count, 1);
    assert_eq!(run.processed_count, 1);
}

#[tokio::test]
async fn scenario_transport_failure_skips_one_record() {
    let h = harness(
        vec![
            row(&["1111111111111", "First", "", ""]),
            row(&["2222222222222", "Second", "", ""]),
            row(&["3333333333333", "Third", "", ""]),
        ],
        false,
        ScriptedExtractor::new(vec![("2222222222222", Extraction::TransportError)]),
    )
    .await;

    let run = h.service.run_to_completion(options()).await.unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.total_count, 3);
    assert_eq!(run.processed_count, 2);

    let lines: Vec<&str> = run.error_log.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("extraction failed"));
    assert!(lines[0].contains("2222222222222"));

    // The neighbors were reconciled.
    assert!(h.companies.get("1111111111111").await.unwrap().is_some());
    assert!(h.companies.get("3333333333333").await.unwrap().is_some());
    assert!(h.companies.get("2222222222222").await.unwrap().is_none());
}

#[tokio::test]
async fn scenario_unparseable_output_skips_one_record() {
    let h = harness(
        vec![
            row(&["1111111111111", "First", "", ""]),
            row(&["2222222222222", "Second", "", ""]),
        ],
        false,
        ScriptedExtractor::new(vec![("1111111111111", Extraction::NoDocument)]),
    )
    .await;

    let run = h.service.run_to_completion(options()).await.unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.processed_count, 1);
    assert!(run.error_log.contains("no document"));
}

#[tokio::test]
async fn scenario_missing_key_is_rejected_not_fatal() {
    let h = harness(
        vec![
            row(&["1111111111111", "First", "", ""]),
            row(&["2222222222222", "Second", "", ""]),
        ],
        false,
        ScriptedExtractor::new(vec![("1111111111111", Extraction::EmptyIdentifier)]),
    )
    .await;

    let run = h.service.run_to_completion(options()).await.unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.total_count, 2);
    assert_eq!(run.processed_count, 1);
    assert!(run.error_log.contains("reconciliation rejected"));
    assert_eq!(h.companies.count().await.unwrap(), 1);
}

#[tokio::test]
async fn scenario_source_failure_fails_the_run() {
    let h = harness(vec![], true, ScriptedExtractor::new(vec![])).await;

    let run = h.service.run_to_completion(options()).await.unwrap();
    assert_eq!(run.status, RunStatus::Failed);
    assert_eq!(run.total_count, 0);
    assert_eq!(run.processed_count, 0);
    assert!(run.error_log.contains("source unavailable"));
}

#[tokio::test]
async fn scenario_max_records_caps_the_batch() {
    let h = harness(
        vec![
            row(&["1111111111111", "First", "", ""]),
            row(&["2222222222222", "Second", "", ""]),
            row(&["3333333333333", "Third", "", ""]),
        ],
        false,
        ScriptedExtractor::new(vec![]),
    )
    .await;

    let mut opts = options();
    opts.max_records = Some(2);

    let run = h.service.run_to_completion(opts).await.unwrap();
    assert_eq!(run.total_count, 2);
    assert_eq!(run.processed_count, 2);
    assert!(h.companies.get("3333333333333").await.unwrap().is_none());
}

#[tokio::test]
async fn scenario_detached_start_reaches_terminal_state() {
    let h = harness(
        vec![row(&["1234567890123", "Acme Co", "Tokyo", ""])],
        false,
        ScriptedExtractor::new(vec![]),
    )
    .await;

    let run = h.service.start(options()).await.unwrap();
    assert_eq!(run.status, RunStatus::Queued);

    // Poll the persisted row; the worker runs detached.
    let mut status = run.status;
    for _ in 0..100 {
        status = h.runs.get(&run.id).await.unwrap().unwrap().status;
        if status.is_terminal() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(status, RunStatus::Completed);
}

#[tokio::test]
async fn scenario_rerun_replaces_children() {
    let rows = vec![row(&["1234567890123", "Acme Co", "", ""])];

    let h = harness(
        rows.clone(),
        false,
        ScriptedExtractor::new(vec![(
            "1234567890123",
            Extraction::Document {
                officers: vec![("代表取締役", "一人目"), ("取締役", "二人目"), ("監査役", "三人目")],
            },
        )]),
    )
    .await;

    h.service.run_to_completion(options()).await.unwrap();
    assert_eq!(h.companies.get_roster("1234567890123").await.unwrap().len(), 3);

    // Second pass over the same store with a shrunken roster.
    let pool = AsyncSqlitePool::new(&h.companies_db_url());
    let service = Arc::new(ResearchService::new(
        Arc::new(SheetSource { rows, fail: false }),
        Arc::new(ScriptedExtractor::new(vec![(
            "1234567890123",
            Extraction::Document {
                officers: vec![("代表取締役", "一人目")],
            },
        )])),
        CompanyRepository::new(pool.clone()),
        RunRepository::new(pool),
        None,
        true,
    ));
    service.run_to_completion(options()).await.unwrap();

    let roster = h.companies.get_roster("1234567890123").await.unwrap();
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].sort_order, 1);
}

impl Harness {
    fn companies_db_url(&self) -> String {
        self._dir.path().join("test.db").display().to_string()
    }
}
