//! Sink synchronization: mirror reconciled companies into per-company
//! worksheets.
//!
//! Mirroring is best-effort. A failure here is logged and reported in the
//! run log, but it never changes the run's counters or terminal status.
//! Writes for distinct companies run on a small bounded pool; a write for a
//! company already in flight is never issued concurrently.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::models::{Company, LocationEntry, RosterEntry};
use crate::sheets::{SheetsClient, SheetsError};

/// Label of the marker cell a company sheet is located by.
pub const MARKER_LABEL: &str = "法人番号";

/// Range scanned per sheet when locating by marker.
const MARKER_SCAN_RANGE: &str = "A1:C60";

/// Worksheet titles are clamped to this length.
const MAX_TITLE_CHARS: usize = 100;

/// Concurrent mirror writes.
const MIRROR_WORKERS: usize = 3;

/// Writes one company's full dump into its worksheet.
pub struct MirrorService {
    sheets: Arc<SheetsClient>,
}

impl MirrorService {
    pub fn new(sheets: Arc<SheetsClient>) -> Self {
        Self { sheets }
    }

    /// Mirror one company: locate or create its sheet, then replace the
    /// content wholesale. No incremental diffing.
    pub async fn mirror(
        &self,
        company: &Company,
        roster: &[RosterEntry],
        locations: &[LocationEntry],
    ) -> Result<(), SheetsError> {
        let title = self.locate_or_create(company).await?;
        let rows = render_rows(company, roster, locations);

        self.sheets.clear_sheet(&title).await?;
        self.sheets.write_rows(&title, &rows).await?;

        debug!(corporate_number = %company.corporate_number, sheet = %title, "mirrored company");
        Ok(())
    }

    /// Find the destination sheet for a company, creating it if absent.
    ///
    /// Lookup order: a sheet titled by the corporate number, then a scan of
    /// every sheet's marker range for the `法人番号`/number pair. Sheets
    /// whose marker range cannot be read are skipped, not fatal.
    async fn locate_or_create(&self, company: &Company) -> Result<String, SheetsError> {
        let sheets = self.sheets.list_sheets().await?;
        let corp = &company.corporate_number;

        if sheets.iter().any(|s| &s.title == corp) {
            return Ok(corp.clone());
        }

        for sheet in &sheets {
            let range = format!("'{}'!{MARKER_SCAN_RANGE}", sheet.title);
            let rows = match self.sheets.fetch_range(&range).await {
                Ok(rows) => rows,
                Err(e) => {
                    debug!(sheet = %sheet.title, error = %e, "skipping unreadable sheet in marker scan");
                    continue;
                }
            };
            for row in &rows {
                if row.len() >= 3 && row[1] == MARKER_LABEL && &row[2] == corp {
                    return Ok(sheet.title.clone());
                }
            }
        }

        let existing: Vec<String> = sheets.into_iter().map(|s| s.title).collect();
        let base = if corp.is_empty() {
            &company.company_name
        } else {
            corp
        };
        let title = unique_title(base, &existing);
        self.sheets.add_sheet(&title).await?;
        Ok(title)
    }
}

/// Pick a sheet title that does not collide, suffixing `_2`, `_3`, ... as
/// needed.
fn unique_title(base: &str, existing: &[String]) -> String {
    let mut safe: String = base.chars().take(MAX_TITLE_CHARS).collect();
    if safe.is_empty() {
        safe = "Company".to_string();
    }

    if !existing.iter().any(|t| t == &safe) {
        return safe;
    }

    let mut index = 2;
    loop {
        let candidate = format!("{safe}_{index}");
        if !existing.iter().any(|t| t == &candidate) {
            return candidate;
        }
        index += 1;
    }
}

/// Lay out the full flat dump: every section in a fixed order, one
/// label/value row per scalar, one row per roster/location entry.
fn render_rows(
    company: &Company,
    roster: &[RosterEntry],
    locations: &[LocationEntry],
) -> Vec<Vec<String>> {
    fn section(title: &str, fields: &[(&str, &str)], rows: &mut Vec<Vec<String>>) {
        for (i, (label, value)) in fields.iter().enumerate() {
            let head = if i == 0 { title } else { "" };
            rows.push(vec![head.to_string(), label.to_string(), value.to_string()]);
        }
    }

    let mut rows: Vec<Vec<String>> = Vec::new();

    section(
        "基本情報",
        &[
            (MARKER_LABEL, &company.corporate_number),
            ("会社名", &company.company_name),
            ("会社名かな", &company.company_name_kana),
            ("英文企業名", &company.english_name),
            ("代表者名", &company.representative_name),
            ("代表者かな", &company.representative_kana),
            ("代表者年齢", &company.representative_age),
            ("代表者生年月日", &company.representative_birth),
            ("代表者出身大学", &company.representative_university),
            ("郵便番号", &company.postal_code),
            ("住所", &company.address),
            ("電話番号", &company.phone),
            ("登記住所", &company.registered_address),
            ("FAX番号", &company.fax),
            ("URL", &company.url),
            ("創業", &company.founded),
            ("設立", &company.established),
            ("資本金", &company.capital),
            ("出資金", &company.investment),
            ("会員数", &company.member_count),
            ("組合員数", &company.union_member_count),
            ("上場市場", &company.stock_market),
            ("証券コード", &company.stock_code),
            ("決算期", &company.fiscal_year_end),
        ],
        &mut rows,
    );

    section(
        "財務情報",
        &[
            ("売上高", &company.revenue),
            ("純利益", &company.net_profit),
            ("預金量", &company.deposits),
            ("従業員数", &company.employee_count),
            ("平均年齢", &company.average_age),
            ("平均年収", &company.average_salary),
            ("役員数", &company.executive_count),
            ("株主数", &company.shareholder_count),
            ("取引銀行", &company.main_bank),
        ],
        &mut rows,
    );

    section(
        "事業情報",
        &[
            ("業種", &company.industry),
            ("事業内容", &company.business_content),
            ("主要事業", &company.main_business),
            ("事業エリア", &company.business_area),
            ("系列", &company.group_affiliation),
            ("販売先", &company.sales_destination),
            ("仕入先", &company.supplier),
        ],
        &mut rows,
    );

    section(
        "規模",
        &[
            ("事業所数", &company.office_count),
            ("店舗数", &company.store_count),
        ],
        &mut rows,
    );

    for entry in roster {
        rows.push(vec![
            format!("役員{}", entry.sort_order),
            entry.position.clone(),
            entry.name.clone(),
            entry.name_kana.clone(),
        ]);
    }

    for entry in locations {
        rows.push(vec![
            format!("拠点{}", entry.sort_order),
            entry.name.clone(),
            entry.postal_code.clone(),
            entry.address.clone(),
            entry.phone.clone(),
            entry.business_content.clone(),
        ]);
    }

    section(
        "URL",
        &[
            ("会社概要ページURL", &company.company_overview_url),
            ("拠点・事業所ページURL", &company.office_list_url),
            ("組織図ページURL", &company.organization_chart_url),
            ("関係会社ページURL", &company.related_companies_url),
        ],
        &mut rows,
    );

    rows
}

/// Bounded pool of in-flight mirror writes for one run.
///
/// Distinct companies are written concurrently up to the worker cap.
/// Submitting a company that is already in flight first waits for the
/// earlier write to finish, so the same sheet is never written twice at
/// once.
pub struct MirrorPool {
    service: Arc<MirrorService>,
    permits: Arc<Semaphore>,
    tasks: JoinSet<(String, Result<(), SheetsError>)>,
    in_flight: HashSet<String>,
    failures: Vec<String>,
}

impl MirrorPool {
    pub fn new(service: Arc<MirrorService>) -> Self {
        Self {
            service,
            permits: Arc::new(Semaphore::new(MIRROR_WORKERS)),
            tasks: JoinSet::new(),
            in_flight: HashSet::new(),
            failures: Vec::new(),
        }
    }

    /// Queue one company for mirroring.
    pub async fn submit(
        &mut self,
        company: Company,
        roster: Vec<RosterEntry>,
        locations: Vec<LocationEntry>,
    ) {
        let key = company.corporate_number.clone();

        while self.in_flight.contains(&key) {
            if !self.join_one().await {
                // No tasks left to join; the tracking set is stale.
                self.in_flight.clear();
                break;
            }
        }

        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .expect("mirror semaphore closed");

        self.in_flight.insert(key.clone());
        let service = self.service.clone();
        self.tasks.spawn(async move {
            let _permit = permit;
            let result = service.mirror(&company, &roster, &locations).await;
            (key, result)
        });

        // Reap already-finished writes without blocking.
        while let Some(joined) = self.tasks.try_join_next() {
            self.record(joined);
        }
    }

    /// Wait for all queued writes and return the collected failure lines.
    pub async fn drain(mut self) -> Vec<String> {
        while let Some(joined) = self.tasks.join_next().await {
            self.record(joined);
        }
        self.failures
    }

    async fn join_one(&mut self) -> bool {
        match self.tasks.join_next().await {
            Some(joined) => {
                self.record(joined);
                true
            }
            None => false,
        }
    }

    fn record(
        &mut self,
        joined: Result<(String, Result<(), SheetsError>), tokio::task::JoinError>,
    ) {
        match joined {
            Ok((key, Ok(()))) => {
                self.in_flight.remove(&key);
            }
            Ok((key, Err(e))) => {
                self.in_flight.remove(&key);
                warn!(corporate_number = %key, error = %e, "sink mirror failed");
                self.failures.push(format!("sink mirror failed for {key}: {e}"));
            }
            Err(e) => {
                warn!(error = %e, "mirror task aborted");
                self.failures.push(format!("sink mirror task aborted: {e}"));
            }
        }
    }
}
