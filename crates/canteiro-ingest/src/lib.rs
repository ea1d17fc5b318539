//! # canteiro-ingest
//!
//! Workbook loading and task extraction for canteiro.
//!
//! This crate provides:
//! - A loosely-typed cell model with permissive coercions (`cell`)
//! - Header-driven row extraction into `Task` records (`extract`)
//! - Sheet classification by "- F" / "- E" suffix and grouping by project code (`classify`)
//! - Workbook sources: spreadsheets via calamine (`xlsx`) and JSON (`json`)
//!
//! ## Example
//!
//! ```rust
//! use canteiro_core::config::IngestConfig;
//! use canteiro_ingest::{group_sheets, parse_json};
//!
//! let workbook = parse_json(r#"{
//!     "sheets": [
//!         { "name": "R200-1 - F", "rows": [ { "Nome": "Obra X", "Nível": 1 } ] },
//!         { "name": "Planilha1", "rows": [ { "Nome": "rascunho" } ] }
//!     ]
//! }"#).unwrap();
//!
//! let groups = group_sheets(&workbook, &IngestConfig::default());
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].code, "R200-1");
//! ```

pub mod cell;
pub mod classify;
pub mod extract;
pub mod json;
pub mod xlsx;

pub use cell::CellValue;
pub use classify::{classify_sheet, group_sheets, IgnoreReason, Sheet, SheetGroup, SheetRole};
pub use extract::{extract_sheet, extract_task, ColumnMap, Field};
pub use json::{parse_json, JsonFile};
pub use xlsx::SpreadsheetFile;

use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// Workbook model
// ============================================================================

/// One raw table: a header row and positionally aligned data rows
#[derive(Clone, Debug, PartialEq)]
pub struct RawSheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawSheet {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    /// Build a sheet from key/value records.
    ///
    /// Headers are the union of keys in first-seen order; keys missing from a
    /// record become empty cells.
    pub fn from_records<K: AsRef<str>>(
        name: impl Into<String>,
        records: Vec<Vec<(K, CellValue)>>,
    ) -> Self {
        let mut headers: Vec<String> = Vec::new();
        for record in &records {
            for (key, _) in record {
                if !headers.iter().any(|h| h == key.as_ref()) {
                    headers.push(key.as_ref().to_string());
                }
            }
        }

        let rows = records
            .into_iter()
            .map(|record| {
                let mut row = vec![CellValue::Empty; headers.len()];
                for (key, value) in record {
                    if let Some(i) = headers.iter().position(|h| h == key.as_ref()) {
                        row[i] = value;
                    }
                }
                row
            })
            .collect();

        Self::new(name, headers, rows)
    }
}

/// Ordered sequence of named sheets
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<RawSheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<RawSheet>) -> Self {
        Self { sheets }
    }

    pub fn sheet(&self, name: &str) -> Option<&RawSheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

// ============================================================================
// Sources
// ============================================================================

/// Something a workbook can be loaded from
pub trait WorkbookSource {
    /// Human-readable location for messages
    fn describe(&self) -> String;

    fn load(&self) -> Result<Workbook, IngestError>;
}

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// .xlsx, .xlsm, .xlsb, .xls, .ods
    Spreadsheet,
    /// JSON document with a `sheets` array
    Json,
}

/// Detect file format from extension
pub fn detect_format(path: &Path) -> Option<FileFormat> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(FileFormat::Spreadsheet),
        "json" => Some(FileFormat::Json),
        _ => None,
    }
}

/// Source for a path, chosen by extension
pub fn source_for(path: &Path) -> Result<Box<dyn WorkbookSource>, IngestError> {
    match detect_format(path) {
        Some(FileFormat::Spreadsheet) => Ok(Box::new(SpreadsheetFile::new(path))),
        Some(FileFormat::Json) => Ok(Box::new(JsonFile::new(path))),
        None => Err(IngestError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Load a workbook from a path (auto-detects format)
pub fn load_workbook(path: &Path) -> Result<Workbook, IngestError> {
    source_for(path)?.load()
}

// ============================================================================
// Errors
// ============================================================================

/// Load-level failure; row and column problems never surface here
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported workbook format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("cannot read workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    #[error("invalid JSON workbook: {0}")]
    Json(#[from] serde_json::Error),
}
