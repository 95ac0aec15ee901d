//! Company reconciliation and queries.
//!
//! Reconciliation is the write path of the pipeline: upsert the company row
//! by corporate number (last write wins on every scalar), then fully replace
//! both owned collections. The whole operation runs in one transaction so a
//! partial failure leaves the previous state intact.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl};

use super::models::{
    ChangeRecordRow, CompanyChanges, CompanyRecord, LocationEntryRecord, NewChangeRecord,
    NewCompany, NewLocationEntry, NewRosterEntry, RosterEntryRecord,
};
use super::pool::{AsyncSqlitePool, DieselError};
use super::parse_datetime;
use crate::models::{ChangeRecord, Company, ExtractedDocument, LocationEntry, RosterEntry};
use crate::schema::{change_records, companies, location_entries, roster_entries};

/// Result of one reconciliation.
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    /// The persisted entity with repository-owned timestamps filled in.
    pub company: Company,
    /// Whether the company row was created (vs. updated).
    pub created: bool,
    pub roster_count: usize,
    pub location_count: usize,
    /// Audit rows written this pass.
    pub changes_logged: usize,
}

/// Errors from the reconciliation path.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// The document carries no corporate number, so there is no key to
    /// reconcile under. Nothing is written.
    #[error("document has no corporate number")]
    MissingIdentifier,
    #[error("database error: {0}")]
    Database(#[from] DieselError),
}

/// Diesel-based company repository.
#[derive(Clone)]
pub struct CompanyRepository {
    pool: AsyncSqlitePool,
}

impl CompanyRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Reconcile one extracted document into the store.
    ///
    /// Scalars are overwritten unconditionally; roster and location rows are
    /// deleted and re-inserted with a dense 1-based `sort_order`. With
    /// `log_changes`, scalar transitions between two distinct non-empty
    /// values are appended to the audit trail before the overwrite.
    pub async fn reconcile(
        &self,
        doc: &ExtractedDocument,
        roster: &[RosterEntry],
        locations: &[LocationEntry],
        log_changes: bool,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let mut company = Company::from_document(doc);
        if company.corporate_number.is_empty() {
            return Err(ReconcileError::MissingIdentifier);
        }

        let mut conn = self.pool.get().await.map_err(ReconcileError::Database)?;
        let now = Utc::now();

        let (created, changes_logged, created_at) = conn
            .transaction(|conn| {
                let company = company.clone();
                let now_str = now.to_rfc3339();
                Box::pin(async move {
                    let corp = company.corporate_number.clone();

                    let existing: Option<CompanyRecord> = companies::table
                        .find(&corp)
                        .first(conn)
                        .await
                        .optional()?;

                    let created = existing.is_none();
                    let mut changes_logged = 0usize;

                    let created_at = match existing {
                        Some(old_record) => {
                            let old_created = old_record.created_at.clone();
                            let old = Company::from(old_record);

                            if log_changes {
                                let old_fields = old.scalar_fields();
                                let new_fields = company.scalar_fields();
                                let mut audit = Vec::new();
                                for ((name, old_value), (_, new_value)) in
                                    old_fields.into_iter().zip(new_fields.into_iter())
                                {
                                    if !old_value.is_empty()
                                        && !new_value.is_empty()
                                        && old_value != new_value
                                    {
                                        audit.push(NewChangeRecord {
                                            corporate_number: &corp,
                                            field_name: name,
                                            old_value,
                                            new_value,
                                            recorded_at: &now_str,
                                        });
                                    }
                                }
                                changes_logged = audit.len();
                                if !audit.is_empty() {
                                    diesel::insert_into(change_records::table)
                                        .values(&audit)
                                        .execute(conn)
                                        .await?;
                                }
                            }

                            diesel::update(companies::table.find(&corp))
                                .set(&CompanyChanges::from_domain(&company, &now_str))
                                .execute(conn)
                                .await?;

                            old_created
                        }
                        None => {
                            diesel::insert_into(companies::table)
                                .values(&NewCompany::from_domain(&company, &now_str, &now_str))
                                .execute(conn)
                                .await?;
                            now_str.clone()
                        }
                    };

                    diesel::delete(
                        roster_entries::table
                            .filter(roster_entries::corporate_number.eq(&corp)),
                    )
                    .execute(conn)
                    .await?;
                    diesel::delete(
                        location_entries::table
                            .filter(location_entries::corporate_number.eq(&corp)),
                    )
                    .execute(conn)
                    .await?;

                    let new_roster: Vec<NewRosterEntry> = roster
                        .iter()
                        .enumerate()
                        .map(|(i, e)| NewRosterEntry {
                            corporate_number: &corp,
                            position: &e.position,
                            name: &e.name,
                            name_kana: &e.name_kana,
                            sort_order: (i + 1) as i32,
                        })
                        .collect();
                    if !new_roster.is_empty() {
                        diesel::insert_into(roster_entries::table)
                            .values(&new_roster)
                            .execute(conn)
                            .await?;
                    }

                    let new_locations: Vec<NewLocationEntry> = locations
                        .iter()
                        .enumerate()
                        .map(|(i, e)| NewLocationEntry {
                            corporate_number: &corp,
                            name: &e.name,
                            postal_code: &e.postal_code,
                            address: &e.address,
                            phone: &e.phone,
                            business_content: &e.business_content,
                            sort_order: (i + 1) as i32,
                        })
                        .collect();
                    if !new_locations.is_empty() {
                        diesel::insert_into(location_entries::table)
                            .values(&new_locations)
                            .execute(conn)
                            .await?;
                    }

                    Ok::<_, DieselError>((created, changes_logged, created_at))
                })
            })
            .await?;

        company.created_at = parse_datetime(&created_at);
        company.updated_at = now;

        Ok(ReconcileOutcome {
            company,
            created,
            roster_count: roster.len(),
            location_count: locations.len(),
            changes_logged,
        })
    }

    /// Get a company by corporate number.
    pub async fn get(&self, corporate_number: &str) -> Result<Option<Company>, DieselError> {
        let mut conn = self.pool.get().await?;

        companies::table
            .find(corporate_number)
            .first::<CompanyRecord>(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(Company::from))
    }

    /// Get a company's roster, ordered by rank.
    pub async fn get_roster(
        &self,
        corporate_number: &str,
    ) -> Result<Vec<RosterEntry>, DieselError> {
        let mut conn = self.pool.get().await?;

        roster_entries::table
            .filter(roster_entries::corporate_number.eq(corporate_number))
            .order(roster_entries::sort_order.asc())
            .load::<RosterEntryRecord>(&mut conn)
            .await
            .map(|records| records.into_iter().map(RosterEntry::from).collect())
    }

    /// Get a company's locations, ordered by rank.
    pub async fn get_locations(
        &self,
        corporate_number: &str,
    ) -> Result<Vec<LocationEntry>, DieselError> {
        let mut conn = self.pool.get().await?;

        location_entries::table
            .filter(location_entries::corporate_number.eq(corporate_number))
            .order(location_entries::sort_order.asc())
            .load::<LocationEntryRecord>(&mut conn)
            .await
            .map(|records| records.into_iter().map(LocationEntry::from).collect())
    }

    /// Get the most recent audit rows for a company.
    pub async fn get_changes(
        &self,
        corporate_number: &str,
        limit: i64,
    ) -> Result<Vec<ChangeRecord>, DieselError> {
        let mut conn = self.pool.get().await?;

        change_records::table
            .filter(change_records::corporate_number.eq(corporate_number))
            .order(change_records::recorded_at.desc())
            .limit(limit)
            .load::<ChangeRecordRow>(&mut conn)
            .await
            .map(|records| records.into_iter().map(ChangeRecord::from).collect())
    }

    /// Count all companies.
    pub async fn count(&self) -> Result<i64, DieselError> {
        let mut conn = self.pool.get().await?;

        companies::table.count().get_result(&mut conn).await
    }

    /// Delete a company and its owned rows.
    pub async fn delete(&self, corporate_number: &str) -> Result<bool, DieselError> {
        let mut conn = self.pool.get().await?;

        conn.transaction(|conn| {
            Box::pin(async move {
                diesel::delete(
                    roster_entries::table
                        .filter(roster_entries::corporate_number.eq(corporate_number)),
                )
                .execute(conn)
                .await?;

                diesel::delete(
                    location_entries::table
                        .filter(location_entries::corporate_number.eq(corporate_number)),
                )
                .execute(conn)
                .await?;

                let rows = diesel::delete(companies::table.find(corporate_number))
                    .execute(conn)
                    .await?;

                Ok(rows > 0)
            })
        })
        .await
    }
}
