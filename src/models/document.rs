//! The structured payload returned by the extraction service.
//!
//! The service is instructed to answer with a single JSON object whose
//! section and field names are the Japanese labels of the instruction
//! schema. Scalar sections deserialize into typed structs; the roster and
//! location sections stay as raw maps because their keys carry a variable
//! integer suffix that may be rendered in ASCII or full-width digits (see
//! `crate::normalize`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A full extraction result for one company.
///
/// Every scalar leaf is a string; absent values are empty strings, never
/// null. Unknown keys are ignored so a chatty model response does not fail
/// the parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedDocument {
    #[serde(rename = "基本法人情報（識別・概要）", default)]
    pub identity: IdentitySection,
    #[serde(rename = "経営・財務情報", default)]
    pub financials: FinancialsSection,
    #[serde(rename = "事業・業務内容", default)]
    pub business: BusinessSection,
    /// Indexed officer fields (`役職名1`/`役職名１`, ...).
    #[serde(rename = "役員名簿", default)]
    pub roster: Map<String, Value>,
    #[serde(rename = "拠点・展開規模", default)]
    pub scale: ScaleSection,
    /// Indexed office fields (`事業所名1`/`事業所名１`, ...).
    #[serde(rename = "拠点・事業所一覧", default)]
    pub locations: Map<String, Value>,
    #[serde(rename = "URL", default)]
    pub links: LinkSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentitySection {
    #[serde(rename = "企業法人番号", default)]
    pub corporate_number: String,
    #[serde(rename = "会社名", default)]
    pub company_name: String,
    #[serde(rename = "会社名かな", default)]
    pub company_name_kana: String,
    #[serde(rename = "英文企業名", default)]
    pub english_name: String,
    #[serde(rename = "代表者名", default)]
    pub representative_name: String,
    #[serde(rename = "代表者かな", default)]
    pub representative_kana: String,
    #[serde(rename = "代表者年齢", default)]
    pub representative_age: String,
    #[serde(rename = "代表者生年月日", default)]
    pub representative_birth: String,
    #[serde(rename = "代表者出身大学", default)]
    pub representative_university: String,
    #[serde(rename = "郵便番号", default)]
    pub postal_code: String,
    #[serde(rename = "住所", default)]
    pub address: String,
    #[serde(rename = "電話番号", default)]
    pub phone: String,
    #[serde(rename = "登記住所", default)]
    pub registered_address: String,
    #[serde(rename = "FAX番号", default)]
    pub fax: String,
    #[serde(rename = "URL", default)]
    pub url: String,
    #[serde(rename = "創業", default)]
    pub founded: String,
    #[serde(rename = "設立", default)]
    pub established: String,
    #[serde(rename = "資本金", default)]
    pub capital: String,
    #[serde(rename = "出資金", default)]
    pub investment: String,
    #[serde(rename = "会員数", default)]
    pub member_count: String,
    #[serde(rename = "組合員数", default)]
    pub union_member_count: String,
    #[serde(rename = "上場市場", default)]
    pub stock_market: String,
    #[serde(rename = "証券コード", default)]
    pub stock_code: String,
    #[serde(rename = "決算期", default)]
    pub fiscal_year_end: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialsSection {
    #[serde(rename = "売上高", default)]
    pub revenue: String,
    #[serde(rename = "純利益", default)]
    pub net_profit: String,
    #[serde(rename = "預金量", default)]
    pub deposits: String,
    #[serde(rename = "従業員数", default)]
    pub employee_count: String,
    #[serde(rename = "平均年齢", default)]
    pub average_age: String,
    #[serde(rename = "平均年収", default)]
    pub average_salary: String,
    #[serde(rename = "役員数", default)]
    pub executive_count: String,
    #[serde(rename = "株主数", default)]
    pub shareholder_count: String,
    #[serde(rename = "取引銀行", default)]
    pub main_bank: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BusinessSection {
    #[serde(rename = "業種", default)]
    pub industry: String,
    #[serde(rename = "事業内容", default)]
    pub business_content: String,
    #[serde(rename = "主要事業", default)]
    pub main_business: String,
    #[serde(rename = "事業エリア", default)]
    pub business_area: String,
    #[serde(rename = "系列", default)]
    pub group_affiliation: String,
    #[serde(rename = "販売先", default)]
    pub sales_destination: String,
    #[serde(rename = "仕入先", default)]
    pub supplier: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScaleSection {
    #[serde(rename = "事業所数", default)]
    pub office_count: String,
    #[serde(rename = "店舗数", default)]
    pub store_count: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkSection {
    #[serde(rename = "会社概要ページURL", default)]
    pub company_overview_url: String,
    #[serde(rename = "拠点・事業所ページURL", default)]
    pub office_list_url: String,
    #[serde(rename = "組織図ページURL", default)]
    pub organization_chart_url: String,
    #[serde(rename = "関係会社ページURL", default)]
    pub related_companies_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sections_default_to_empty() {
        let doc: ExtractedDocument = serde_json::from_str("{}").unwrap();
        assert_eq!(doc.identity.corporate_number, "");
        assert_eq!(doc.financials.revenue, "");
        assert!(doc.roster.is_empty());
        assert!(doc.locations.is_empty());
    }

    #[test]
    fn test_japanese_wire_keys() {
        let raw = r#"{
            "基本法人情報（識別・概要）": {
                "企業法人番号": "1234567890123",
                "会社名": "株式会社テスト"
            },
            "経営・財務情報": { "売上高": "10億円" },
            "役員名簿": { "役職名1": "代表取締役", "役員名１": "山田太郎" }
        }"#;
        let doc: ExtractedDocument = serde_json::from_str(raw).unwrap();
        assert_eq!(doc.identity.corporate_number, "1234567890123");
        assert_eq!(doc.identity.company_name, "株式会社テスト");
        assert_eq!(doc.financials.revenue, "10億円");
        assert_eq!(doc.roster.len(), 2);
    }
}
