//! JSON workbooks
//!
//! ```json
//! { "sheets": [ { "name": "R200-1 - F", "rows": [ { "Nome": "Obra X", "Nível": 1 } ] } ] }
//! ```
//!
//! Rows are key/value records with loosely-typed values. Strings holding an
//! ISO date (`2024-01-15` or `2024-01-15T08:00:00`) are read as native dates.

use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cell::CellValue;
use crate::xlsx::parse_iso;
use crate::{IngestError, RawSheet, Workbook, WorkbookSource};

#[derive(Debug, Deserialize)]
struct JsonWorkbook {
    sheets: Vec<JsonSheet>,
}

#[derive(Debug, Deserialize)]
struct JsonSheet {
    name: String,
    #[serde(default)]
    rows: Vec<serde_json::Map<String, Value>>,
}

/// JSON workbook file on disk
#[derive(Clone, Debug)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl WorkbookSource for JsonFile {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Workbook, IngestError> {
        read_json(&self.path)
    }
}

/// Read a JSON workbook file
pub fn read_json(path: &Path) -> Result<Workbook, IngestError> {
    let content = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let workbook = parse_json(&content)?;
    info!(path = %path.display(), sheets = workbook.sheets.len(), "workbook loaded");
    Ok(workbook)
}

/// Parse a JSON workbook document
pub fn parse_json(input: &str) -> Result<Workbook, IngestError> {
    let doc: JsonWorkbook = serde_json::from_str(input)?;
    let sheets = doc
        .sheets
        .into_iter()
        .map(|sheet| {
            let records: Vec<Vec<(String, CellValue)>> = sheet
                .rows
                .into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|(key, value)| (key, cell_from_json(&value)))
                        .collect()
                })
                .collect();
            RawSheet::from_records(sheet.name, records)
        })
        .collect();
    Ok(Workbook::new(sheets))
}

/// Map a JSON value to the loose cell model
pub fn cell_from_json(value: &Value) -> CellValue {
    match value {
        Value::Null => CellValue::Empty,
        Value::Bool(b) => CellValue::Bool(*b),
        Value::Number(n) => n.as_f64().map_or(CellValue::Empty, CellValue::Number),
        Value::String(s) => parse_iso(s).map_or_else(|| CellValue::Text(s.clone()), CellValue::Date),
        other => CellValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn json_values_map_to_cells() {
        assert_eq!(cell_from_json(&json!(null)), CellValue::Empty);
        assert_eq!(cell_from_json(&json!(3)), CellValue::Number(3.0));
        assert_eq!(cell_from_json(&json!("SIM")), CellValue::Text("SIM".into()));
        assert_eq!(cell_from_json(&json!(true)), CellValue::Bool(true));
        assert_eq!(cell_from_json(&json!("2024-01-15")).as_serial(), 45306.0);
    }

    #[test]
    fn parses_sheets_and_rows() {
        let workbook = parse_json(
            r#"{"sheets": [
                {"name": "A - F", "rows": [{"Nome": "Obra A", "Nível": 1}]},
                {"name": "A - E"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(workbook.sheet_names(), vec!["A - F", "A - E"]);
        let sheet = workbook.sheet("A - F").unwrap();
        assert_eq!(sheet.rows.len(), 1);
        assert!(sheet.headers.contains(&"Nome".to_string()));
        assert!(workbook.sheet("A - E").unwrap().rows.is_empty());
    }

    #[test]
    fn keys_keep_document_order() {
        let workbook = parse_json(
            r#"{"sheets": [
                {"name": "A - E", "rows": [
                    {"Nome": "t", "Nível": 3, "Percentual Concluído": 40, "% Físico": 70}
                ]}
            ]}"#,
        )
        .unwrap();

        let sheet = workbook.sheet("A - E").unwrap();
        assert_eq!(sheet.headers, vec!["Nome", "Nível", "Percentual Concluído", "% Físico"]);

        let tasks = crate::extract_sheet(sheet, canteiro_core::Origin::Execution);
        assert_eq!(tasks[0].percent_complete, 40.0);
    }

    #[test]
    fn malformed_document_is_error() {
        assert!(matches!(parse_json("{"), Err(IngestError::Json(_))));
        assert!(matches!(parse_json(r#"{"tabs": []}"#), Err(IngestError::Json(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_json(Path::new("/nonexistent/obras.json")).unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
    }
}
