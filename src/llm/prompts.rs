//! Instruction text for the extraction call.
//!
//! The preamble and the document schema are sent verbatim with every
//! request; the schema doubles as the wire contract the parser expects.
//! Indexed keys in the schema use full-width digits, but models answer
//! with either encoding, which is why `crate::normalize` probes both.

use crate::models::SourceRecord;

/// Research instructions prepended to every request.
pub const EXTRACTION_PREAMBLE: &str = r#"
各会社の調査においては、まず必ず提示された企業法人番号を利用してGoogleで検索してください。
https://info.gbiz.go.jp/hojin/ichiran?hojinBango=
の末尾に会社法人番号を追加すると、会社に関する情報が表示されます。
ここに基本的な情報があるので、これを基本的に参考にしてください。
次の URL を検索します。提示URLに表示されない情報は、再びインターネット検索で補完されます。
調査及び対照の最優先基準は、**会社法人番号（法人番号）**とします。企業法人番号は決して変更されない。会社名・住所は変更される可能性がありますので、これらを根拠に推測・確定してください。
出力形式はJSONのみであり、説明文やコメントは必要ありません。必ず指定されたJSONスキーマに従って納品してください（ファイル以外の形式は不可）。
年齢計算の基準日は2025年9月時点とし、「50代」のような数表示は避け、可能な限り**具体的な年齢（例：52歳）**で記載してください。
調査は正確さを最優先に、慎重に実施してください。
>>>>>>
"#;

/// The JSON shape the model must fill in.
pub const DOCUMENT_SCHEMA: &str = r#"{
  "基本法人情報（識別・概要）": {
    "企業法人番号": "",
    "会社名": "",
    "会社名かな": "",
    "英文企業名": "",
    "代表者名": "",
    "代表者かな": "",
    "代表者年齢": "",
    "代表者生年月日": "",
    "代表者出身大学": "",
    "郵便番号": "",
    "住所": "",
    "電話番号": "",
    "登記住所": "",
    "FAX番号": "",
    "URL": "",
    "創業": "",
    "設立": "",
    "資本金": "",
    "出資金": "",
    "会員数": "",
    "組合員数": "",
    "上場市場": "",
    "証券コード": "",
    "決算期": ""
  },
  "経営・財務情報": {
    "売上高": "",
    "純利益": "",
    "預金量": "",
    "従業員数": "",
    "平均年齢": "",
    "平均年収": "",
    "役員数": "",
    "株主数": "",
    "取引銀行": ""
  },
  "事業・業務内容": {
    "業種": "",
    "事業内容": "",
    "主要事業": "",
    "事業エリア": "",
    "系列": "",
    "販売先": "",
    "仕入先": ""
  },
  "役員名簿": {
    "役職名１": "", "役員名１": "", "ふりがな１": "",
    "役職名２": "", "役員名２": "", "ふりがな２": "",
    "役職名３": "", "役員名３": "", "ふりがな３": "",
    "役職名４": "", "役員名４": "", "ふりがな４": "",
    "役職名５": "", "役員名５": "", "ふりがな５": "",
    "役職名６": "", "役員名６": "", "ふりがな６": "",
    "役職名７": "", "役員名７": "", "ふりがな７": "",
    "役職名８": "", "役員名８": "", "ふりがな８": "",
    "役職名９": "", "役員名９": "", "ふりがな９": "",
    "役職名１０": "", "役員名１０": "", "ふりがな１０": "",
    "役職名１１": "", "役員名１１": "", "ふりがな１１": "",
    "役職名１２": "", "役員名１２": "", "ふりがな１２": "",
    "役職名１３": "", "役員名１３": "", "ふりがな１３": "",
    "役職名１４": "", "役員名１４": "", "ふりがな１４": ""
  },
  "拠点・展開規模": {
    "事業所数": "",
    "店舗数": ""
  },
  "拠点・事業所一覧": {
    "事業所名１": "", "郵便番号１": "", "住所１": "", "電話番号１": "", "扱い品目・業務内容１": "",
    "事業所名２": "", "郵便番号２": "", "住所２": "", "電話番号２": "", "扱い品目・業務内容２": "",
    "事業所名３": "", "郵便番号３": "", "住所３": "", "電話番号３": "", "扱い品目・業務内容３": "",
    "事業所名４": "", "郵便番号４": "", "住所４": "", "電話番号４": "", "扱い品目・業務内容４": "",
    "事業所名５": "", "郵便番号５": "", "住所５": "", "電話番号５": "", "扱い品目・業務内容５": "",
    "事業所名６": "", "郵便番号６": "", "住所６": "", "電話番号６": "", "扱い品目・業務内容６": "",
    "事業所名７": "", "郵便番号７": "", "住所７": "", "電話番号７": "", "扱い品目・業務内容７": "",
    "事業所名８": "", "郵便番号８": "", "住所８": "", "電話番号８": "", "扱い品目・業務内容８": "",
    "事業所名９": "", "郵便番号９": "", "住所９": "", "電話番号９": "", "扱い品目・業務内容９": "",
    "事業所名１０": "", "郵便番号１０": "", "住所１０": "", "電話番号１０": "", "扱い品目・業務内容１０": "",
    "事業所名１１": "", "郵便番号１１": "", "住所１１": "", "電話番号１１": "", "扱い品目・業務内容１１": "",
    "事業所名１２": "", "郵便番号１２": "", "住所１２": "", "電話番号１２": "", "扱い品目・業務内容１２": "",
    "事業所名１３": "", "郵便番号１３": "", "住所１３": "", "電話番号１３": "", "扱い品目・業務内容１３": "",
    "事業所名１４": "", "郵便番号１４": "", "住所１４": "", "電話番号１４": "", "扱い品目・業務内容１４": ""
  },
  "URL": {
    "会社概要ページURL": "",
    "拠点・事業所ページURL": "",
    "組織図ページURL": "",
    "関係会社ページURL": ""
  }
}"#;

/// System role message for the chat call.
pub const SYSTEM_PROMPT: &str = "あなたは会社情報を正確にJSON形式で出力するアシスタントです。";

/// Assemble the user prompt for one candidate record.
pub fn build_extraction_prompt(record: &SourceRecord) -> String {
    format!(
        "{preamble}\n企業法人番号: {identifier}\n会社名: {name}\n所在地: {address}\n補足: {note}\n\n以下のJSON形式で返してください:\n{schema}",
        preamble = EXTRACTION_PREAMBLE,
        identifier = record.identifier,
        name = record.name,
        address = record.address,
        note = record.note,
        schema = DOCUMENT_SCHEMA,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_record_fields() {
        let record = SourceRecord {
            identifier: "1234567890123".to_string(),
            name: "Acme Co".to_string(),
            address: "Tokyo".to_string(),
            note: "priority".to_string(),
        };
        let prompt = build_extraction_prompt(&record);
        assert!(prompt.contains("1234567890123"));
        assert!(prompt.contains("Acme Co"));
        assert!(prompt.contains("Tokyo"));
        assert!(prompt.contains("priority"));
        assert!(prompt.contains("企業法人番号"));
    }

    #[test]
    fn test_schema_is_valid_json() {
        let value: serde_json::Value = serde_json::from_str(DOCUMENT_SCHEMA).unwrap();
        assert!(value.get("役員名簿").is_some());
        assert!(value.get("拠点・事業所一覧").is_some());
    }
}
