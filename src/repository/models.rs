//! Diesel ORM models for database tables.
//!
//! These models provide compile-time type checking for database operations.
//! Timestamps are stored as RFC 3339 text; boolean flags as integers.

use diesel::prelude::*;

use super::{parse_datetime, parse_datetime_opt};
use crate::models::{
    ChangeRecord, Company, LocationEntry, ResearchRun, RosterEntry, RunStatus,
};
use crate::schema;

/// Company row from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::companies)]
#[diesel(primary_key(corporate_number))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CompanyRecord {
    pub corporate_number: String,
    pub company_name: String,
    pub company_name_kana: String,
    pub english_name: String,
    pub representative_name: String,
    pub representative_kana: String,
    pub representative_age: String,
    pub representative_birth: String,
    pub representative_university: String,
    pub postal_code: String,
    pub address: String,
    pub phone: String,
    pub registered_address: String,
    pub fax: String,
    pub url: String,
    pub founded: String,
    pub established: String,
    pub capital: String,
    pub investment: String,
    pub member_count: String,
    pub union_member_count: String,
    pub stock_market: String,
    pub stock_code: String,
    pub fiscal_year_end: String,
    pub revenue: String,
    pub net_profit: String,
    pub deposits: String,
    pub employee_count: String,
    pub average_age: String,
    pub average_salary: String,
    pub executive_count: String,
    pub shareholder_count: String,
    pub main_bank: String,
    pub industry: String,
    pub business_content: String,
    pub main_business: String,
    pub business_area: String,
    pub group_affiliation: String,
    pub sales_destination: String,
    pub supplier: String,
    pub office_count: String,
    pub store_count: String,
    pub company_overview_url: String,
    pub office_list_url: String,
    pub organization_chart_url: String,
    pub related_companies_url: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CompanyRecord> for Company {
    fn from(r: CompanyRecord) -> Self {
        Company {
            corporate_number: r.corporate_number,
            company_name: r.company_name,
            company_name_kana: r.company_name_kana,
            english_name: r.english_name,
            representative_name: r.representative_name,
            representative_kana: r.representative_kana,
            representative_age: r.representative_age,
            representative_birth: r.representative_birth,
            representative_university: r.representative_university,
            postal_code: r.postal_code,
            address: r.address,
            phone: r.phone,
            registered_address: r.registered_address,
            fax: r.fax,
            url: r.url,
            founded: r.founded,
            established: r.established,
            capital: r.capital,
            investment: r.investment,
            member_count: r.member_count,
            union_member_count: r.union_member_count,
            stock_market: r.stock_market,
            stock_code: r.stock_code,
            fiscal_year_end: r.fiscal_year_end,
            revenue: r.revenue,
            net_profit: r.net_profit,
            deposits: r.deposits,
            employee_count: r.employee_count,
            average_age: r.average_age,
            average_salary: r.average_salary,
            executive_count: r.executive_count,
            shareholder_count: r.shareholder_count,
            main_bank: r.main_bank,
            industry: r.industry,
            business_content: r.business_content,
            main_business: r.main_business,
            business_area: r.business_area,
            group_affiliation: r.group_affiliation,
            sales_destination: r.sales_destination,
            supplier: r.supplier,
            office_count: r.office_count,
            store_count: r.store_count,
            company_overview_url: r.company_overview_url,
            office_list_url: r.office_list_url,
            organization_chart_url: r.organization_chart_url,
            related_companies_url: r.related_companies_url,
            created_at: parse_datetime(&r.created_at),
            updated_at: parse_datetime(&r.updated_at),
        }
    }
}

/// New company row for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::companies)]
pub struct NewCompany<'a> {
    pub corporate_number: &'a str,
    pub company_name: &'a str,
    pub company_name_kana: &'a str,
    pub english_name: &'a str,
    pub representative_name: &'a str,
    pub representative_kana: &'a str,
    pub representative_age: &'a str,
    pub representative_birth: &'a str,
    pub representative_university: &'a str,
    pub postal_code: &'a str,
    pub address: &'a str,
    pub phone: &'a str,
    pub registered_address: &'a str,
    pub fax: &'a str,
    pub url: &'a str,
    pub founded: &'a str,
    pub established: &'a str,
    pub capital: &'a str,
    pub investment: &'a str,
    pub member_count: &'a str,
    pub union_member_count: &'a str,
    pub stock_market: &'a str,
    pub stock_code: &'a str,
    pub fiscal_year_end: &'a str,
    pub revenue: &'a str,
    pub net_profit: &'a str,
    pub deposits: &'a str,
    pub employee_count: &'a str,
    pub average_age: &'a str,
    pub average_salary: &'a str,
    pub executive_count: &'a str,
    pub shareholder_count: &'a str,
    pub main_bank: &'a str,
    pub industry: &'a str,
    pub business_content: &'a str,
    pub main_business: &'a str,
    pub business_area: &'a str,
    pub group_affiliation: &'a str,
    pub sales_destination: &'a str,
    pub supplier: &'a str,
    pub office_count: &'a str,
    pub store_count: &'a str,
    pub company_overview_url: &'a str,
    pub office_list_url: &'a str,
    pub organization_chart_url: &'a str,
    pub related_companies_url: &'a str,
    pub created_at: &'a str,
    pub updated_at: &'a str,
}

impl<'a> NewCompany<'a> {
    pub fn from_domain(c: &'a Company, created_at: &'a str, updated_at: &'a str) -> Self {
        Self {
            corporate_number: &c.corporate_number,
            company_name: &c.company_name,
            company_name_kana: &c.company_name_kana,
            english_name: &c.english_name,
            representative_name: &c.representative_name,
            representative_kana: &c.representative_kana,
            representative_age: &c.representative_age,
            representative_birth: &c.representative_birth,
            representative_university: &c.representative_university,
            postal_code: &c.postal_code,
            address: &c.address,
            phone: &c.phone,
            registered_address: &c.registered_address,
            fax: &c.fax,
            url: &c.url,
            founded: &c.founded,
            established: &c.established,
            capital: &c.capital,
            investment: &c.investment,
            member_count: &c.member_count,
            union_member_count: &c.union_member_count,
            stock_market: &c.stock_market,
            stock_code: &c.stock_code,
            fiscal_year_end: &c.fiscal_year_end,
            revenue: &c.revenue,
            net_profit: &c.net_profit,
            deposits: &c.deposits,
            employee_count: &c.employee_count,
            average_age: &c.average_age,
            average_salary: &c.average_salary,
            executive_count: &c.executive_count,
            shareholder_count: &c.shareholder_count,
            main_bank: &c.main_bank,
            industry: &c.industry,
            business_content: &c.business_content,
            main_business: &c.main_business,
            business_area: &c.business_area,
            group_affiliation: &c.group_affiliation,
            sales_destination: &c.sales_destination,
            supplier: &c.supplier,
            office_count: &c.office_count,
            store_count: &c.store_count,
            company_overview_url: &c.company_overview_url,
            office_list_url: &c.office_list_url,
            organization_chart_url: &c.organization_chart_url,
            related_companies_url: &c.related_companies_url,
            created_at,
            updated_at,
        }
    }
}

/// Scalar overwrite for an existing company row.
///
/// Excludes the key and `created_at`, which are preserved across updates.
#[derive(AsChangeset, Debug)]
#[diesel(table_name = schema::companies)]
pub struct CompanyChanges<'a> {
    pub company_name: &'a str,
    pub company_name_kana: &'a str,
    pub english_name: &'a str,
    pub representative_name: &'a str,
    pub representative_kana: &'a str,
    pub representative_age: &'a str,
    pub representative_birth: &'a str,
    pub representative_university: &'a str,
    pub postal_code: &'a str,
    pub address: &'a str,
    pub phone: &'a str,
    pub registered_address: &'a str,
    pub fax: &'a str,
    pub url: &'a str,
    pub founded: &'a str,
    pub established: &'a str,
    pub capital: &'a str,
    pub investment: &'a str,
    pub member_count: &'a str,
    pub union_member_count: &'a str,
    pub stock_market: &'a str,
    pub stock_code: &'a str,
    pub fiscal_year_end: &'a str,
    pub revenue: &'a str,
    pub net_profit: &'a str,
    pub deposits: &'a str,
    pub employee_count: &'a str,
    pub average_age: &'a str,
    pub average_salary: &'a str,
    pub executive_count: &'a str,
    pub shareholder_count: &'a str,
    pub main_bank: &'a str,
    pub industry: &'a str,
    pub business_content: &'a str,
    pub main_business: &'a str,
    pub business_area: &'a str,
    pub group_affiliation: &'a str,
    pub sales_destination: &'a str,
    pub supplier: &'a str,
    pub office_count: &'a str,
    pub store_count: &'a str,
    pub company_overview_url: &'a str,
    pub office_list_url: &'a str,
    pub organization_chart_url: &'a str,
    pub related_companies_url: &'a str,
    pub updated_at: &'a str,
}

impl<'a> CompanyChanges<'a> {
    pub fn from_domain(c: &'a Company, updated_at: &'a str) -> Self {
        Self {
            company_name: &c.company_name,
            company_name_kana: &c.company_name_kana,
            english_name: &c.english_name,
            representative_name: &c.representative_name,
            representative_kana: &c.representative_kana,
            representative_age: &c.representative_age,
            representative_birth: &c.representative_birth,
            representative_university: &c.representative_university,
            postal_code: &c.postal_code,
            address: &c.address,
            phone: &c.phone,
            registered_address: &c.registered_address,
            fax: &c.fax,
            url: &c.url,
            founded: &c.founded,
            established: &c.established,
            capital: &c.capital,
            investment: &c.investment,
            member_count: &c.member_count,
            union_member_count: &c.union_member_count,
            stock_market: &c.stock_market,
            stock_code: &c.stock_code,
            fiscal_year_end: &c.fiscal_year_end,
            revenue: &c.revenue,
            net_profit: &c.net_profit,
            deposits: &c.deposits,
            employee_count: &c.employee_count,
            average_age: &c.average_age,
            average_salary: &c.average_salary,
            executive_count: &c.executive_count,
            shareholder_count: &c.shareholder_count,
            main_bank: &c.main_bank,
            industry: &c.industry,
            business_content: &c.business_content,
            main_business: &c.main_business,
            business_area: &c.business_area,
            group_affiliation: &c.group_affiliation,
            sales_destination: &c.sales_destination,
            supplier: &c.supplier,
            office_count: &c.office_count,
            store_count: &c.store_count,
            company_overview_url: &c.company_overview_url,
            office_list_url: &c.office_list_url,
            organization_chart_url: &c.organization_chart_url,
            related_companies_url: &c.related_companies_url,
            updated_at,
        }
    }
}

/// Roster row from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::roster_entries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RosterEntryRecord {
    pub id: i32,
    pub corporate_number: String,
    pub position: String,
    pub name: String,
    pub name_kana: String,
    pub sort_order: i32,
}

impl From<RosterEntryRecord> for RosterEntry {
    fn from(r: RosterEntryRecord) -> Self {
        RosterEntry {
            position: r.position,
            name: r.name,
            name_kana: r.name_kana,
            sort_order: r.sort_order,
        }
    }
}

/// New roster row for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::roster_entries)]
pub struct NewRosterEntry<'a> {
    pub corporate_number: &'a str,
    pub position: &'a str,
    pub name: &'a str,
    pub name_kana: &'a str,
    pub sort_order: i32,
}

/// Location row from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::location_entries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LocationEntryRecord {
    pub id: i32,
    pub corporate_number: String,
    pub name: String,
    pub postal_code: String,
    pub address: String,
    pub phone: String,
    pub business_content: String,
    pub sort_order: i32,
}

impl From<LocationEntryRecord> for LocationEntry {
    fn from(r: LocationEntryRecord) -> Self {
        LocationEntry {
            name: r.name,
            postal_code: r.postal_code,
            address: r.address,
            phone: r.phone,
            business_content: r.business_content,
            sort_order: r.sort_order,
        }
    }
}

/// New location row for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::location_entries)]
pub struct NewLocationEntry<'a> {
    pub corporate_number: &'a str,
    pub name: &'a str,
    pub postal_code: &'a str,
    pub address: &'a str,
    pub phone: &'a str,
    pub business_content: &'a str,
    pub sort_order: i32,
}

/// Audit row from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::change_records)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ChangeRecordRow {
    pub id: i32,
    pub corporate_number: String,
    pub field_name: String,
    pub old_value: String,
    pub new_value: String,
    pub recorded_at: String,
}

impl From<ChangeRecordRow> for ChangeRecord {
    fn from(r: ChangeRecordRow) -> Self {
        ChangeRecord {
            corporate_number: r.corporate_number,
            field_name: r.field_name,
            old_value: r.old_value,
            new_value: r.new_value,
            recorded_at: parse_datetime(&r.recorded_at),
        }
    }
}

/// New audit row for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::change_records)]
pub struct NewChangeRecord<'a> {
    pub corporate_number: &'a str,
    pub field_name: &'a str,
    pub old_value: &'a str,
    pub new_value: &'a str,
    pub recorded_at: &'a str,
}

/// Run row from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::research_runs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RunRow {
    pub id: String,
    pub status: String,
    pub source_range: String,
    pub mirror_to_sink: i32,
    pub max_records: Option<i32>,
    pub description: String,
    pub total_count: i32,
    pub processed_count: i32,
    pub error_log: String,
    pub created_at: String,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
}

impl From<RunRow> for ResearchRun {
    fn from(r: RunRow) -> Self {
        ResearchRun {
            status: RunStatus::from_str(&r.status).unwrap_or(RunStatus::Failed),
            id: r.id,
            source_range: r.source_range,
            mirror_to_sink: r.mirror_to_sink != 0,
            max_records: r.max_records.map(|v| v.max(0) as u32),
            description: r.description,
            total_count: r.total_count.max(0) as u32,
            processed_count: r.processed_count.max(0) as u32,
            error_log: r.error_log,
            created_at: parse_datetime(&r.created_at),
            started_at: parse_datetime_opt(r.started_at),
            completed_at: parse_datetime_opt(r.completed_at),
        }
    }
}

/// New run row for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::research_runs)]
pub struct NewRun<'a> {
    pub id: &'a str,
    pub status: &'a str,
    pub source_range: &'a str,
    pub mirror_to_sink: i32,
    pub max_records: Option<i32>,
    pub description: &'a str,
    pub total_count: i32,
    pub processed_count: i32,
    pub error_log: &'a str,
    pub created_at: &'a str,
}
