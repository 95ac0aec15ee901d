//! Persisted company entities and their owned collections.
//!
//! A company is keyed by its corporate number, which is assigned externally
//! and never reassigned; name and address drift across research passes must
//! never create a second entity. Roster and location rows are owned by
//! composition and fully replaced on every reconciliation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ExtractedDocument;

/// The persisted root entity: one researched company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    /// Invariant reconciliation key.
    pub corporate_number: String,

    // Identity
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

    // Financials
    pub revenue: String,
    pub net_profit: String,
    pub deposits: String,
    pub employee_count: String,
    pub average_age: String,
    pub average_salary: String,
    pub executive_count: String,
    pub shareholder_count: String,
    pub main_bank: String,

    // Business
    pub industry: String,
    pub business_content: String,
    pub main_business: String,
    pub business_area: String,
    pub group_affiliation: String,
    pub sales_destination: String,
    pub supplier: String,

    // Scale
    pub office_count: String,
    pub store_count: String,

    // Reference URLs
    pub company_overview_url: String,
    pub office_list_url: String,
    pub organization_chart_url: String,
    pub related_companies_url: String,

    /// Set by the repository; preserved across updates.
    pub created_at: DateTime<Utc>,
    /// Set by the repository on every write.
    pub updated_at: DateTime<Utc>,
}

impl Company {
    /// Flatten an extracted document into the persisted scalar layout.
    ///
    /// Timestamps are placeholders here; the repository owns them.
    pub fn from_document(doc: &ExtractedDocument) -> Self {
        let identity = &doc.identity;
        let fin = &doc.financials;
        let biz = &doc.business;
        let scale = &doc.scale;
        let links = &doc.links;

        Self {
            corporate_number: identity.corporate_number.trim().to_string(),
            company_name: identity.company_name.clone(),
            company_name_kana: identity.company_name_kana.clone(),
            english_name: identity.english_name.clone(),
            representative_name: identity.representative_name.clone(),
            representative_kana: identity.representative_kana.clone(),
            representative_age: identity.representative_age.clone(),
            representative_birth: identity.representative_birth.clone(),
            representative_university: identity.representative_university.clone(),
            postal_code: identity.postal_code.clone(),
            address: identity.address.clone(),
            phone: identity.phone.clone(),
            registered_address: identity.registered_address.clone(),
            fax: identity.fax.clone(),
            url: identity.url.clone(),
            founded: identity.founded.clone(),
            established: identity.established.clone(),
            capital: identity.capital.clone(),
            investment: identity.investment.clone(),
            member_count: identity.member_count.clone(),
            union_member_count: identity.union_member_count.clone(),
            stock_market: identity.stock_market.clone(),
            stock_code: identity.stock_code.clone(),
            fiscal_year_end: identity.fiscal_year_end.clone(),
            revenue: fin.revenue.clone(),
            net_profit: fin.net_profit.clone(),
            deposits: fin.deposits.clone(),
            employee_count: fin.employee_count.clone(),
            average_age: fin.average_age.clone(),
            average_salary: fin.average_salary.clone(),
            executive_count: fin.executive_count.clone(),
            shareholder_count: fin.shareholder_count.clone(),
            main_bank: fin.main_bank.clone(),
            industry: biz.industry.clone(),
            business_content: biz.business_content.clone(),
            main_business: biz.main_business.clone(),
            business_area: biz.business_area.clone(),
            group_affiliation: biz.group_affiliation.clone(),
            sales_destination: biz.sales_destination.clone(),
            supplier: biz.supplier.clone(),
            office_count: scale.office_count.clone(),
            store_count: scale.store_count.clone(),
            company_overview_url: links.company_overview_url.clone(),
            office_list_url: links.office_list_url.clone(),
            organization_chart_url: links.organization_chart_url.clone(),
            related_companies_url: links.related_companies_url.clone(),
            created_at: DateTime::UNIX_EPOCH,
            updated_at: DateTime::UNIX_EPOCH,
        }
    }

    /// Every mutable scalar column as a `(column, value)` pair, in a fixed
    /// order. The corporate number is excluded: it is the key, not data.
    ///
    /// Both the reconciliation diff and the sink dump iterate this list, so
    /// old/new comparisons line up by position.
    pub fn scalar_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("company_name", &self.company_name),
            ("company_name_kana", &self.company_name_kana),
            ("english_name", &self.english_name),
            ("representative_name", &self.representative_name),
            ("representative_kana", &self.representative_kana),
            ("representative_age", &self.representative_age),
            ("representative_birth", &self.representative_birth),
            ("representative_university", &self.representative_university),
            ("postal_code", &self.postal_code),
            ("address", &self.address),
            ("phone", &self.phone),
            ("registered_address", &self.registered_address),
            ("fax", &self.fax),
            ("url", &self.url),
            ("founded", &self.founded),
            ("established", &self.established),
            ("capital", &self.capital),
            ("investment", &self.investment),
            ("member_count", &self.member_count),
            ("union_member_count", &self.union_member_count),
            ("stock_market", &self.stock_market),
            ("stock_code", &self.stock_code),
            ("fiscal_year_end", &self.fiscal_year_end),
            ("revenue", &self.revenue),
            ("net_profit", &self.net_profit),
            ("deposits", &self.deposits),
            ("employee_count", &self.employee_count),
            ("average_age", &self.average_age),
            ("average_salary", &self.average_salary),
            ("executive_count", &self.executive_count),
            ("shareholder_count", &self.shareholder_count),
            ("main_bank", &self.main_bank),
            ("industry", &self.industry),
            ("business_content", &self.business_content),
            ("main_business", &self.main_business),
            ("business_area", &self.business_area),
            ("group_affiliation", &self.group_affiliation),
            ("sales_destination", &self.sales_destination),
            ("supplier", &self.supplier),
            ("office_count", &self.office_count),
            ("store_count", &self.store_count),
            ("company_overview_url", &self.company_overview_url),
            ("office_list_url", &self.office_list_url),
            ("organization_chart_url", &self.organization_chart_url),
            ("related_companies_url", &self.related_companies_url),
        ]
    }
}

/// One officer row owned by a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub position: String,
    pub name: String,
    pub name_kana: String,
    /// 1-based rank, dense within the parent, recomputed on every write.
    pub sort_order: i32,
}

/// One office/branch row owned by a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationEntry {
    pub name: String,
    pub postal_code: String,
    pub address: String,
    pub phone: String,
    pub business_content: String,
    pub sort_order: i32,
}

/// Audit trail row for a scalar correction.
///
/// Written only when a field moves between two distinct non-empty values;
/// filling a blank (or blanking a value) is not a correction and is not
/// logged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub corporate_number: String,
    pub field_name: String,
    pub old_value: String,
    pub new_value: String,
    pub recorded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExtractedDocument;

    #[test]
    fn test_from_document_maps_sections() {
        let raw = r#"{
            "基本法人情報（識別・概要）": {
                "企業法人番号": " 1234567890123 ",
                "会社名": "株式会社テスト",
                "決算期": "3月"
            },
            "経営・財務情報": { "取引銀行": "テスト銀行" },
            "事業・業務内容": { "業種": "製造業" },
            "拠点・展開規模": { "店舗数": "12" },
            "URL": { "会社概要ページURL": "https://example.com/about" }
        }"#;
        let doc: ExtractedDocument = serde_json::from_str(raw).unwrap();
        let company = Company::from_document(&doc);

        assert_eq!(company.corporate_number, "1234567890123");
        assert_eq!(company.company_name, "株式会社テスト");
        assert_eq!(company.fiscal_year_end, "3月");
        assert_eq!(company.main_bank, "テスト銀行");
        assert_eq!(company.industry, "製造業");
        assert_eq!(company.store_count, "12");
        assert_eq!(company.company_overview_url, "https://example.com/about");
    }

    #[test]
    fn test_scalar_fields_excludes_key() {
        let doc = ExtractedDocument::default();
        let company = Company::from_document(&doc);
        let fields = company.scalar_fields();
        assert_eq!(fields.len(), 45);
        assert!(fields.iter().all(|(name, _)| *name != "corporate_number"));
    }
}
