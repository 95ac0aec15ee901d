//! Research run persistence.
//!
//! The run row is the only status surface for a batch: the worker that owns
//! a run writes progress here, and every reader (CLI, HTTP API) polls the
//! row rather than any in-memory state.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use super::models::{NewRun, RunRow};
use super::pool::{AsyncSqlitePool, DieselError};
use crate::models::{ResearchRun, RunOptions, RunStatus};
use crate::schema::research_runs;

/// Diesel-based run repository.
#[derive(Clone)]
pub struct RunRepository {
    pool: AsyncSqlitePool,
}

impl RunRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Create a queued run with its effective configuration.
    pub async fn create(&self, options: &RunOptions) -> Result<ResearchRun, DieselError> {
        let mut conn = self.pool.get().await?;

        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now();
        let created_at_str = created_at.to_rfc3339();

        diesel::insert_into(research_runs::table)
            .values(&NewRun {
                id: &id,
                status: RunStatus::Queued.as_str(),
                source_range: &options.source_range,
                mirror_to_sink: options.mirror_to_sink as i32,
                max_records: options.max_records.map(|v| v as i32),
                description: &options.description,
                total_count: 0,
                processed_count: 0,
                error_log: "",
                created_at: &created_at_str,
            })
            .execute(&mut conn)
            .await?;

        Ok(ResearchRun {
            id,
            status: RunStatus::Queued,
            source_range: options.source_range.clone(),
            mirror_to_sink: options.mirror_to_sink,
            max_records: options.max_records,
            description: options.description.clone(),
            total_count: 0,
            processed_count: 0,
            error_log: String::new(),
            created_at,
            started_at: None,
            completed_at: None,
        })
    }

    /// Transition a run to `running`.
    pub async fn mark_running(&self, id: &str) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;
        let now = Utc::now().to_rfc3339();

        diesel::update(research_runs::table.find(id))
            .set((
                research_runs::status.eq(RunStatus::Running.as_str()),
                research_runs::started_at.eq(Some(&now)),
            ))
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    /// Fix the candidate total once the (possibly capped) list is known.
    pub async fn set_total(&self, id: &str, total: u32) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;

        diesel::update(research_runs::table.find(id))
            .set(research_runs::total_count.eq(total as i32))
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    /// Persist the processed counter so status reads see progress.
    pub async fn update_progress(&self, id: &str, processed: u32) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;

        diesel::update(research_runs::table.find(id))
            .set(research_runs::processed_count.eq(processed as i32))
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    /// Append one entry to the run's error log.
    pub async fn append_error(&self, id: &str, entry: &str) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;
        let line = format!("{entry}\n");

        diesel::update(research_runs::table.find(id))
            .set(research_runs::error_log.eq(research_runs::error_log.concat(line)))
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    /// Transition a run to `completed`. Partial success is still completed.
    pub async fn complete(&self, id: &str, processed: u32) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;
        let now = Utc::now().to_rfc3339();

        diesel::update(research_runs::table.find(id))
            .set((
                research_runs::status.eq(RunStatus::Completed.as_str()),
                research_runs::processed_count.eq(processed as i32),
                research_runs::completed_at.eq(Some(&now)),
            ))
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    /// Transition a run to `failed`, recording the fatal error.
    pub async fn fail(&self, id: &str, message: &str) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;
        let now = Utc::now().to_rfc3339();
        let line = format!("{message}\n");

        diesel::update(research_runs::table.find(id))
            .set((
                research_runs::status.eq(RunStatus::Failed.as_str()),
                research_runs::error_log.eq(research_runs::error_log.concat(line)),
                research_runs::completed_at.eq(Some(&now)),
            ))
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    /// Get a run by id.
    pub async fn get(&self, id: &str) -> Result<Option<ResearchRun>, DieselError> {
        let mut conn = self.pool.get().await?;

        research_runs::table
            .find(id)
            .first::<RunRow>(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(ResearchRun::from))
    }

    /// Most recent runs, newest first.
    pub async fn recent(&self, limit: i64) -> Result<Vec<ResearchRun>, DieselError> {
        let mut conn = self.pool.get().await?;

        research_runs::table
            .order(research_runs::created_at.desc())
            .limit(limit)
            .load::<RunRow>(&mut conn)
            .await
            .map(|rows| rows.into_iter().map(ResearchRun::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_test_db() -> (AsyncSqlitePool, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db_url = db_path.display().to_string();

        super::super::migrations::run_migrations(&db_url).await.unwrap();

        (AsyncSqlitePool::new(&db_url), dir)
    }

    fn options() -> RunOptions {
        RunOptions {
            source_range: "会社リスト!A3:D".to_string(),
            mirror_to_sink: false,
            max_records: Some(10),
            description: "test run".to_string(),
        }
    }

    #[tokio::test]
    async fn test_run_lifecycle() {
        let (pool, _dir) = setup_test_db().await;
        let repo = RunRepository::new(pool);

        let run = repo.create(&options()).await.unwrap();
        assert_eq!(run.status, RunStatus::Queued);
        assert_eq!(run.max_records, Some(10));

        repo.mark_running(&run.id).await.unwrap();
        repo.set_total(&run.id, 3).await.unwrap();
        repo.update_progress(&run.id, 2).await.unwrap();

        let mid = repo.get(&run.id).await.unwrap().unwrap();
        assert_eq!(mid.status, RunStatus::Running);
        assert_eq!(mid.total_count, 3);
        assert_eq!(mid.processed_count, 2);
        assert!(mid.started_at.is_some());

        repo.complete(&run.id, 2).await.unwrap();
        let done = repo.get(&run.id).await.unwrap().unwrap();
        assert_eq!(done.status, RunStatus::Completed);
        assert!(done.completed_at.is_some());
        assert!(done.status.is_terminal());
    }

    #[tokio::test]
    async fn test_error_log_accumulates() {
        let (pool, _dir) = setup_test_db().await;
        let repo = RunRepository::new(pool);

        let run = repo.create(&options()).await.unwrap();
        repo.append_error(&run.id, "extraction failed for 111: timeout")
            .await
            .unwrap();
        repo.append_error(&run.id, "reconciliation rejected for 222")
            .await
            .unwrap();

        let fetched = repo.get(&run.id).await.unwrap().unwrap();
        let lines: Vec<&str> = fetched.error_log.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("111"));
        assert!(lines[1].contains("222"));
    }

    #[tokio::test]
    async fn test_failed_run_records_message() {
        let (pool, _dir) = setup_test_db().await;
        let repo = RunRepository::new(pool);

        let run = repo.create(&options()).await.unwrap();
        repo.mark_running(&run.id).await.unwrap();
        repo.fail(&run.id, "source unavailable: connection refused")
            .await
            .unwrap();

        let failed = repo.get(&run.id).await.unwrap().unwrap();
        assert_eq!(failed.status, RunStatus::Failed);
        assert!(failed.error_log.contains("source unavailable"));
        assert!(failed.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_recent_orders_newest_first() {
        let (pool, _dir) = setup_test_db().await;
        let repo = RunRepository::new(pool);

        let first = repo.create(&options()).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = repo.create(&options()).await.unwrap();

        let recent = repo.recent(10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, second.id);
        assert_eq!(recent[1].id, first.id);
    }
}
