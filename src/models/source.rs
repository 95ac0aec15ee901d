//! Candidate rows read from the company list spreadsheet.

use serde::{Deserialize, Serialize};

/// One row of the company list: `[identifier, name, address, note]`.
///
/// The corporate number is the only required cell; everything else is
/// advisory context passed through to the extraction prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Corporate number, the invariant reconciliation key.
    pub identifier: String,
    pub name: String,
    pub address: String,
    pub note: String,
}

impl SourceRecord {
    /// Build a record from a raw spreadsheet row.
    ///
    /// Rows may arrive with fewer than 4 cells; missing trailing cells are
    /// treated as empty. Returns `None` when the trimmed identifier is empty,
    /// which drops the row from the candidate list without counting it as a
    /// failure.
    pub fn from_cells(cells: &[String]) -> Option<Self> {
        let cell = |i: usize| cells.get(i).map(|s| s.as_str()).unwrap_or("");

        let identifier = cell(0).trim();
        if identifier.is_empty() {
            return None;
        }

        Some(Self {
            identifier: identifier.to_string(),
            name: cell(1).to_string(),
            address: cell(2).to_string(),
            note: cell(3).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_short_rows_are_padded() {
        let record = SourceRecord::from_cells(&row(&["1234567890123"])).unwrap();
        assert_eq!(record.identifier, "1234567890123");
        assert_eq!(record.name, "");
        assert_eq!(record.address, "");
        assert_eq!(record.note, "");
    }

    #[test]
    fn test_full_row() {
        let record =
            SourceRecord::from_cells(&row(&["1234567890123", "Acme Co", "Tokyo", "note"])).unwrap();
        assert_eq!(record.name, "Acme Co");
        assert_eq!(record.address, "Tokyo");
        assert_eq!(record.note, "note");
    }

    #[test]
    fn test_empty_identifier_is_dropped() {
        assert!(SourceRecord::from_cells(&row(&["", "Acme Co"])).is_none());
        assert!(SourceRecord::from_cells(&row(&["   ", "Acme Co"])).is_none());
        assert!(SourceRecord::from_cells(&row(&[])).is_none());
    }

    #[test]
    fn test_identifier_is_trimmed() {
        let record = SourceRecord::from_cells(&row(&[" 1234567890123 ", "Acme"])).unwrap();
        assert_eq!(record.identifier, "1234567890123");
    }
}
