//! Recovery of ordered sub-records from indexed key/value sections.
//!
//! The extraction service returns officers and offices as flat maps whose
//! keys carry a 1-based integer suffix (`役職名1`, `役員名1`, ...). The
//! suffix may be rendered in ASCII digits or full-width digits, and the
//! rendering is not consistent across fields or calls, so every field is
//! probed under both encodings.
//!
//! Scanning does not stop at the first empty index: documents sometimes
//! have sparse low indices, so a per-group floor of indices is always
//! scanned, and only after the floor does an all-empty index end the scan.
//! A hard ceiling bounds the worst case.

use serde_json::{Map, Value};

use crate::models::{ExtractedDocument, LocationEntry, RosterEntry};

/// Officer field bases probed per index, in output order.
const ROSTER_FIELDS: [&str; 3] = ["役職名", "役員名", "ふりがな"];

/// Office field bases probed per index, in output order.
const LOCATION_FIELDS: [&str; 5] = ["事業所名", "郵便番号", "住所", "電話番号", "扱い品目・業務内容"];

/// Indices always scanned for the roster group before an empty index may
/// terminate the scan.
const ROSTER_SCAN_FLOOR: usize = 5;

/// Indices always scanned for the location group.
const LOCATION_SCAN_FLOOR: usize = 3;

/// Hard upper bound on scanned indices for either group.
const GROUP_SCAN_CEILING: usize = 20;

/// Render an index in full-width digits (`12` -> `１２`).
fn to_fullwidth(index: usize) -> String {
    index
        .to_string()
        .chars()
        .map(|c| match c {
            '0'..='9' => {
                // Full-width digits are a contiguous block starting at U+FF10.
                char::from_u32(0xFF10 + (c as u32 - '0' as u32)).unwrap_or(c)
            }
            _ => c,
        })
        .collect()
}

/// Look up `{base}{index}` under both numeral encodings, first non-empty
/// hit wins. Non-string values are treated as absent.
fn probe(group: &Map<String, Value>, base: &str, index: usize) -> String {
    let ascii_key = format!("{base}{index}");
    if let Some(v) = group.get(&ascii_key).and_then(Value::as_str) {
        if !v.trim().is_empty() {
            return v.trim().to_string();
        }
    }

    let fullwidth_key = format!("{base}{}", to_fullwidth(index));
    if let Some(v) = group.get(&fullwidth_key).and_then(Value::as_str) {
        if !v.trim().is_empty() {
            return v.trim().to_string();
        }
    }

    String::new()
}

/// Scan a group map: for each index probe all field bases, collect a row
/// whenever any field is non-empty, and stop at the first all-empty index
/// past the floor.
fn scan_group<const N: usize>(
    group: &Map<String, Value>,
    fields: [&str; N],
    floor: usize,
) -> Vec<[String; N]> {
    let mut out = Vec::new();

    for index in 1..=GROUP_SCAN_CEILING {
        let values: [String; N] = std::array::from_fn(|i| probe(group, fields[i], index));

        if values.iter().all(|v| v.is_empty()) {
            if index > floor {
                break;
            }
            continue;
        }

        out.push(values);
    }

    out
}

/// Extract the ordered officer roster from a document.
pub fn extract_roster(doc: &ExtractedDocument) -> Vec<RosterEntry> {
    scan_group(&doc.roster, ROSTER_FIELDS, ROSTER_SCAN_FLOOR)
        .into_iter()
        .enumerate()
        .map(|(i, [position, name, name_kana])| RosterEntry {
            position,
            name,
            name_kana,
            sort_order: (i + 1) as i32,
        })
        .collect()
}

/// Extract the ordered office list from a document.
pub fn extract_locations(doc: &ExtractedDocument) -> Vec<LocationEntry> {
    scan_group(&doc.locations, LOCATION_FIELDS, LOCATION_SCAN_FLOOR)
        .into_iter()
        .enumerate()
        .map(
            |(i, [name, postal_code, address, phone, business_content])| LocationEntry {
                name,
                postal_code,
                address,
                phone,
                business_content,
                sort_order: (i + 1) as i32,
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_roster(pairs: &[(&str, &str)]) -> ExtractedDocument {
        let mut doc = ExtractedDocument::default();
        for (k, v) in pairs {
            doc.roster.insert(k.to_string(), Value::String(v.to_string()));
        }
        doc
    }

    fn doc_with_locations(pairs: &[(&str, &str)]) -> ExtractedDocument {
        let mut doc = ExtractedDocument::default();
        for (k, v) in pairs {
            doc.locations
                .insert(k.to_string(), Value::String(v.to_string()));
        }
        doc
    }

    #[test]
    fn test_to_fullwidth() {
        assert_eq!(to_fullwidth(1), "１");
        assert_eq!(to_fullwidth(10), "１０");
        assert_eq!(to_fullwidth(14), "１４");
    }

    #[test]
    fn test_roster_ascii_indices() {
        let doc = doc_with_roster(&[
            ("役職名1", "代表取締役"),
            ("役員名1", "山田太郎"),
            ("役職名2", "取締役"),
            ("役員名2", "佐藤次郎"),
        ]);
        let roster = extract_roster(&doc);
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].position, "代表取締役");
        assert_eq!(roster[0].sort_order, 1);
        assert_eq!(roster[1].name, "佐藤次郎");
        assert_eq!(roster[1].sort_order, 2);
    }

    #[test]
    fn test_encoding_swap_is_invariant() {
        let ascii = doc_with_roster(&[
            ("役職名1", "代表取締役"),
            ("役員名1", "山田太郎"),
            ("ふりがな1", "やまだたろう"),
        ]);
        let fullwidth = doc_with_roster(&[
            ("役職名１", "代表取締役"),
            ("役員名１", "山田太郎"),
            ("ふりがな１", "やまだたろう"),
        ]);
        assert_eq!(extract_roster(&ascii), extract_roster(&fullwidth));
    }

    #[test]
    fn test_mixed_encodings_within_one_index() {
        let doc = doc_with_roster(&[
            ("役職名1", "代表取締役"),
            ("役員名１", "山田太郎"),
            ("ふりがな1", "やまだたろう"),
        ]);
        let roster = extract_roster(&doc);
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].name, "山田太郎");
        assert_eq!(roster[0].name_kana, "やまだたろう");
    }

    #[test]
    fn test_ascii_wins_when_both_present() {
        let doc = doc_with_roster(&[("役員名1", "ascii"), ("役員名１", "fullwidth")]);
        assert_eq!(extract_roster(&doc)[0].name, "ascii");
    }

    #[test]
    fn test_sparse_low_index_within_floor() {
        // Index 2 is empty but 4 is populated; the floor keeps the scan
        // alive and the output stays dense.
        let doc = doc_with_roster(&[("役員名1", "一人目"), ("役員名4", "四人目")]);
        let roster = extract_roster(&doc);
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].name, "一人目");
        assert_eq!(roster[0].sort_order, 1);
        assert_eq!(roster[1].name, "四人目");
        assert_eq!(roster[1].sort_order, 2);
    }

    #[test]
    fn test_stops_after_floor_gap() {
        // Entry at index 9 is beyond the first empty index past the floor,
        // so it is never reached.
        let doc = doc_with_roster(&[("役員名1", "一人目"), ("役員名9", "九人目")]);
        let roster = extract_roster(&doc);
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_location_floor_is_lower() {
        // Gap at index 4 terminates the location scan (floor 3), while the
        // same gap would not terminate a roster scan.
        let doc = doc_with_locations(&[("事業所名1", "本社"), ("事業所名6", "支店")]);
        let locations = extract_locations(&doc);
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].name, "本社");
    }

    #[test]
    fn test_scan_ceiling() {
        let mut pairs = Vec::new();
        let names: Vec<String> = (1..=30).map(|i| format!("役員{i}")).collect();
        for (i, name) in names.iter().enumerate() {
            pairs.push((format!("役員名{}", i + 1), name.clone()));
        }
        let mut doc = ExtractedDocument::default();
        for (k, v) in pairs {
            doc.roster.insert(k, Value::String(v));
        }
        let roster = extract_roster(&doc);
        assert_eq!(roster.len(), 20);
    }

    #[test]
    fn test_any_field_contributes() {
        // A kana-only row still yields an entry.
        let doc = doc_with_roster(&[("ふりがな1", "やまだたろう")]);
        let roster = extract_roster(&doc);
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].position, "");
        assert_eq!(roster[0].name_kana, "やまだたろう");
    }

    #[test]
    fn test_non_string_values_are_absent() {
        let mut doc = ExtractedDocument::default();
        doc.roster
            .insert("役員名1".to_string(), Value::Number(42.into()));
        assert!(extract_roster(&doc).is_empty());
    }

    #[test]
    fn test_locations_full_fields() {
        let doc = doc_with_locations(&[
            ("事業所名1", "本社"),
            ("郵便番号１", "100-0001"),
            ("住所1", "東京都千代田区"),
            ("電話番号1", "03-1234-5678"),
            ("扱い品目・業務内容１", "管理業務"),
        ]);
        let locations = extract_locations(&doc);
        assert_eq!(locations.len(), 1);
        let loc = &locations[0];
        assert_eq!(loc.name, "本社");
        assert_eq!(loc.postal_code, "100-0001");
        assert_eq!(loc.address, "東京都千代田区");
        assert_eq!(loc.phone, "03-1234-5678");
        assert_eq!(loc.business_content, "管理業務");
        assert_eq!(loc.sort_order, 1);
    }
}
