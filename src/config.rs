//! Configuration management.
//!
//! Settings come from an optional TOML file plus environment overrides for
//! the secrets (`.env` is loaded by the binary before this runs). Module
//! concerns own their own config structs; this just composes them.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::llm::ExtractionConfig;
use crate::models::RunOptions;
use crate::repository::AsyncSqlitePool;
use crate::sheets::SheetsConfig;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "company-research.toml";

/// Default candidate-list range.
pub const DEFAULT_SOURCE_RANGE: &str = "会社リスト!A3:D";

fn default_database_path() -> PathBuf {
    PathBuf::from("company-research.db")
}

fn default_source_range() -> String {
    DEFAULT_SOURCE_RANGE.to_string()
}

fn default_true() -> bool {
    true
}

/// Application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    /// Spreadsheet access (source list and sink sheets).
    #[serde(default)]
    pub sheets: SheetsConfig,
    /// Extraction service access.
    #[serde(default)]
    pub extraction: ExtractionConfig,
    /// Default range for the candidate list.
    #[serde(default = "default_source_range")]
    pub source_range: String,
    /// Whether runs mirror reconciled companies to the sink by default.
    #[serde(default = "default_true")]
    pub mirror_to_sink: bool,
    /// Default cap on records per run.
    #[serde(default)]
    pub max_records: Option<u32>,
    /// Whether scalar corrections are written to the audit trail.
    #[serde(default = "default_true")]
    pub log_changes: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            sheets: SheetsConfig::default(),
            extraction: ExtractionConfig::default(),
            source_range: default_source_range(),
            mirror_to_sink: true,
            max_records: None,
            log_changes: true,
        }
    }
}

impl Settings {
    /// Load settings from a config file (explicit path, or the default file
    /// if present), then apply environment overrides.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)?
                } else {
                    Self::default()
                }
            }
        };

        settings.apply_env_overrides();
        Ok(settings)
    }

    fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
        let settings = toml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))?;
        Ok(settings)
    }

    /// Environment variables win over the file for deployment secrets.
    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("COMPANY_RESEARCH_DB") {
            self.database_path = PathBuf::from(path);
        }
        if let Ok(key) = std::env::var("SHEETS_API_KEY") {
            self.sheets.api_key = key;
        }
        if let Ok(id) = std::env::var("SPREADSHEET_ID") {
            self.sheets.spreadsheet_id = id;
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.extraction.api_key = Some(key);
        }
        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            self.extraction.model = model;
        }
        if let Ok(endpoint) = std::env::var("OPENAI_ENDPOINT") {
            self.extraction.endpoint = endpoint;
        }
    }

    /// Database URL for migrations and connections.
    pub fn database_url(&self) -> String {
        self.database_path.display().to_string()
    }

    /// Connection factory for the configured database.
    pub fn create_pool(&self) -> AsyncSqlitePool {
        AsyncSqlitePool::from_path(&self.database_path)
    }

    /// Run options derived from the configured defaults.
    pub fn default_run_options(&self) -> RunOptions {
        RunOptions {
            source_range: self.source_range.clone(),
            mirror_to_sink: self.mirror_to_sink,
            max_records: self.max_records,
            description: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.source_range, DEFAULT_SOURCE_RANGE);
        assert!(settings.mirror_to_sink);
        assert!(settings.log_changes);
        assert!(settings.max_records.is_none());
    }

    #[test]
    fn test_parse_partial_file() {
        let raw = r#"
            database_path = "/tmp/research.db"
            max_records = 25

            [sheets]
            spreadsheet_id = "sheet-id"

            [extraction]
            model = "gpt-4o"
        "#;
        let settings: Settings = toml::from_str(raw).unwrap();
        assert_eq!(settings.database_path, PathBuf::from("/tmp/research.db"));
        assert_eq!(settings.max_records, Some(25));
        assert_eq!(settings.sheets.spreadsheet_id, "sheet-id");
        assert_eq!(settings.extraction.model, "gpt-4o");
        // Untouched fields keep their defaults.
        assert_eq!(settings.source_range, DEFAULT_SOURCE_RANGE);
        assert!(settings.extraction.enabled);
    }

    #[test]
    fn test_default_run_options() {
        let mut settings = Settings::default();
        settings.max_records = Some(5);
        settings.mirror_to_sink = false;

        let options = settings.default_run_options();
        assert_eq!(options.max_records, Some(5));
        assert!(!options.mirror_to_sink);
        assert_eq!(options.source_range, DEFAULT_SOURCE_RANGE);
    }
}
