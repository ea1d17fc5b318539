//! Spreadsheet workbooks (xlsx, xlsm, xlsb, xls, ods) via calamine
//!
//! The first row of every sheet is its header row. Native date cells are
//! delivered as day serials, which is what the extractor wants anyway.

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::cell::CellValue;
use crate::{IngestError, RawSheet, Workbook, WorkbookSource};

/// Spreadsheet file on disk
#[derive(Clone, Debug)]
pub struct SpreadsheetFile {
    path: PathBuf,
}

impl SpreadsheetFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl WorkbookSource for SpreadsheetFile {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Workbook, IngestError> {
        read_spreadsheet(&self.path)
    }
}

/// Read every sheet of a spreadsheet file
pub fn read_spreadsheet(path: &Path) -> Result<Workbook, IngestError> {
    let workbook_error = |message: String| IngestError::Workbook {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| workbook_error(e.to_string()))?;
    let names: Vec<String> = workbook.sheet_names().to_vec();

    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| workbook_error(format!("sheet '{}': {}", name, e)))?;

        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .map(|header| header.iter().map(|c| cell_from_data(c).as_text()).collect())
            .unwrap_or_default();
        let data: Vec<Vec<CellValue>> = rows
            .map(|row| row.iter().map(cell_from_data).collect())
            .collect();

        debug!(sheet = %name, columns = headers.len(), rows = data.len(), "sheet read");
        sheets.push(RawSheet::new(name, headers, data));
    }

    info!(path = %path.display(), sheets = sheets.len(), "workbook loaded");
    Ok(Workbook::new(sheets))
}

/// Map a calamine cell to the loose cell model
pub fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => parse_iso(s).map_or_else(|| CellValue::Text(s.clone()), CellValue::Date),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        // keeps the "#..." marker so date coercion rejects it
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

/// ISO date or date-time, as written by ODS and JSON producers
pub(crate) fn parse_iso(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
