//! Row extraction
//!
//! Turns a raw sheet into [`Task`] records. Columns are located by header
//! name, not position: each field has a matching rule over the folded
//! header text and binds to the first column that satisfies it. A field with
//! no matching column keeps its zero value; that is never fatal.

use canteiro_core::{fold_text, Origin, Task};
use tracing::debug;

use crate::cell::CellValue;
use crate::RawSheet;

/// Task attribute a column can bind to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Edt,
    Name,
    Level,
    ParentSummary,
    Start,
    End,
    BaselineStart,
    BaselineEnd,
    PercentComplete,
    Milestone,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::Edt,
        Field::Name,
        Field::Level,
        Field::ParentSummary,
        Field::Start,
        Field::End,
        Field::BaselineStart,
        Field::BaselineEnd,
        Field::PercentComplete,
        Field::Milestone,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Does a folded header (lower-case, no accents) name this field?
    pub fn matches(self, header: &str) -> bool {
        let h = header.trim();
        let has = |needle: &str| h.contains(needle);
        let baseline = has("base");
        let start_word = has("inicio") || has("start");
        let end_word = has("termino") || has("fim") || has("finish");

        match self {
            Field::Edt => has("edt") || has("wbs"),
            Field::Name => {
                (has("nome") || has("tarefa") || has("name"))
                    && !has("resumo")
                    && !has("summary")
                    && !has("%")
            }
            Field::Level => has("nivel") || has("level"),
            Field::ParentSummary => has("resumo") || has("summary"),
            Field::Start => {
                !baseline && ((has("data") && has("inicio")) || h == "inicio" || has("start"))
            }
            Field::End => {
                !baseline
                    && ((has("data") && (has("termino") || has("fim")))
                        || h == "termino"
                        || h == "fim"
                        || has("finish"))
            }
            Field::BaselineStart => baseline && start_word,
            Field::BaselineEnd => baseline && end_word,
            Field::PercentComplete => has("%") || has("concluido") || has("complete"),
            Field::Milestone => has("marco") || has("milestone"),
        }
    }
}

/// Column index per field for one header row
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnMap {
    columns: [Option<usize>; 10],
}

impl ColumnMap {
    /// Bind each field to the first header matching its rule
    pub fn resolve<S: AsRef<str>>(headers: &[S]) -> Self {
        let folded: Vec<String> = headers.iter().map(|h| fold_text(h.as_ref())).collect();
        let mut map = Self::default();
        for field in Field::ALL {
            map.columns[field.index()] = folded.iter().position(|h| field.matches(h));
        }
        map
    }

    pub fn get(&self, field: Field) -> Option<usize> {
        self.columns[field.index()]
    }

    /// Fields with no matching column
    pub fn missing(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }

    fn cell<'r>(&self, row: &'r [CellValue], field: Field) -> Option<&'r CellValue> {
        self.get(field).and_then(|i| row.get(i))
    }

    fn text(&self, row: &[CellValue], field: Field) -> String {
        self.cell(row, field).map(CellValue::as_text).unwrap_or_default()
    }

    fn serial(&self, row: &[CellValue], field: Field) -> f64 {
        self.cell(row, field).map(CellValue::as_serial).unwrap_or(0.0)
    }

    /// Build a task from a positionally aligned row; `None` for nameless rows
    pub fn extract(&self, row: &[CellValue], origin: Origin) -> Option<Task> {
        let name = self.text(row, Field::Name);
        if name.is_empty() {
            return None;
        }

        let milestone = self
            .get(Field::Milestone)
            .map(|i| row.get(i).is_some_and(CellValue::as_flag));

        Some(Task {
            edt: self.text(row, Field::Edt),
            name,
            level: self.cell(row, Field::Level).map(CellValue::as_level).unwrap_or(0),
            parent_summary: self.text(row, Field::ParentSummary),
            start: self.serial(row, Field::Start),
            end: self.serial(row, Field::End),
            baseline_start: self.serial(row, Field::BaselineStart),
            baseline_end: self.serial(row, Field::BaselineEnd),
            percent_complete: self
                .cell(row, Field::PercentComplete)
                .map(CellValue::as_percent)
                .unwrap_or(0.0),
            milestone,
            origin,
        })
    }
}

/// Extract one task from a header row and a data row
pub fn extract_task<S: AsRef<str>>(headers: &[S], row: &[CellValue], origin: Origin) -> Option<Task> {
    ColumnMap::resolve(headers).extract(row, origin)
}

/// Extract every named row of a sheet, in order
pub fn extract_sheet(sheet: &RawSheet, origin: Origin) -> Vec<Task> {
    let columns = ColumnMap::resolve(sheet.headers.as_slice());
    let missing = columns.missing();
    if !missing.is_empty() {
        debug!(sheet = %sheet.name, ?missing, "columns not found, fields default to zero");
    }

    let tasks: Vec<Task> = sheet
        .rows
        .iter()
        .filter_map(|row| columns.extract(row, origin))
        .collect();

    let dropped = sheet.rows.len() - tasks.len();
    if dropped > 0 {
        debug!(sheet = %sheet.name, dropped, "rows without a task name skipped");
    }
    tasks
}
