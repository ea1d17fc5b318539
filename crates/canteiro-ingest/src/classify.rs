//! Sheet classification and grouping
//!
//! Sheet names follow a `<code> - F` / `<code> - E` convention: the suffix
//! says whether the sheet tracks oversight (fiscalização) or execution
//! (execução), and the prefix is the project code shared by the pair.
//! Placeholder sheets and names without a suffix are ignored.

use canteiro_core::config::IngestConfig;
use canteiro_core::{Origin, ProjectCode, Task};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::extract::extract_sheet;
use crate::{RawSheet, Workbook};

/// Why a sheet does not take part in project formation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Name listed in `placeholder_sheets`
    Placeholder,
    /// No trailing "- F" / "- E"
    NoSuffix,
}

/// Classification of one sheet name
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SheetRole {
    Side { code: ProjectCode, origin: Origin },
    Ignored(IgnoreReason),
}

/// Classify a sheet name against the suffix convention
pub fn classify_sheet(name: &str, placeholders: &[String]) -> SheetRole {
    let trimmed = name.trim();
    if placeholders
        .iter()
        .any(|p| p.trim().eq_ignore_ascii_case(trimmed))
    {
        return SheetRole::Ignored(IgnoreReason::Placeholder);
    }
    match split_suffix(trimmed) {
        Some((code, origin)) => SheetRole::Side {
            code: code.to_string(),
            origin,
        },
        None => SheetRole::Ignored(IgnoreReason::NoSuffix),
    }
}

/// "R200-1 - F" -> ("R200-1", Oversight)
fn split_suffix(name: &str) -> Option<(&str, Origin)> {
    let (idx, side) = name.char_indices().next_back()?;
    let origin = match side {
        'F' | 'f' => Origin::Oversight,
        'E' | 'e' => Origin::Execution,
        _ => return None,
    };
    let code = name[..idx].trim_end().strip_suffix('-')?.trim();
    if code.is_empty() {
        None
    } else {
        Some((code, origin))
    }
}

/// A classified sheet with its extracted tasks
#[derive(Clone, Debug, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub code: ProjectCode,
    pub origin: Origin,
    pub tasks: Vec<Task>,
}

/// Oversight and execution sheets sharing a project code
#[derive(Clone, Debug, PartialEq)]
pub struct SheetGroup {
    pub code: ProjectCode,
    pub oversight: Option<Sheet>,
    pub execution: Option<Sheet>,
}

impl SheetGroup {
    fn new(code: ProjectCode) -> Self {
        Self {
            code,
            oversight: None,
            execution: None,
        }
    }

    pub fn oversight_tasks(&self) -> &[Task] {
        self.oversight.as_ref().map(|s| s.tasks.as_slice()).unwrap_or_default()
    }

    pub fn execution_tasks(&self) -> &[Task] {
        self.execution.as_ref().map(|s| s.tasks.as_slice()).unwrap_or_default()
    }

    /// No tasks on either side
    pub fn is_empty(&self) -> bool {
        self.oversight_tasks().is_empty() && self.execution_tasks().is_empty()
    }

    fn slot(&mut self, origin: Origin) -> &mut Option<Sheet> {
        match origin {
            Origin::Oversight => &mut self.oversight,
            Origin::Execution => &mut self.execution,
        }
    }
}

/// Classify every sheet, extract its tasks and group the sides by code.
///
/// Groups come back ordered by code. Groups without a single task are
/// dropped. When two sheets claim the same side of a code, the first one
/// in workbook order is kept.
pub fn group_sheets(workbook: &Workbook, config: &IngestConfig) -> Vec<SheetGroup> {
    let mut groups: BTreeMap<ProjectCode, SheetGroup> = BTreeMap::new();

    for raw in &workbook.sheets {
        let (code, origin) = match classify_sheet(&raw.name, &config.placeholder_sheets) {
            SheetRole::Side { code, origin } => (code, origin),
            SheetRole::Ignored(reason) => {
                debug!(sheet = %raw.name, ?reason, "sheet ignored");
                continue;
            }
        };

        let group = groups
            .entry(code.clone())
            .or_insert_with(|| SheetGroup::new(code.clone()));
        let slot = group.slot(origin);
        if let Some(existing) = slot.as_ref() {
            warn!(
                sheet = %raw.name,
                kept = %existing.name,
                %code,
                "duplicate {} sheet ignored",
                origin
            );
            continue;
        }
        *slot = Some(into_sheet(raw, code, origin));
    }

    groups
        .into_values()
        .filter(|group| {
            if group.is_empty() {
                debug!(code = %group.code, "group without tasks dropped");
                false
            } else {
                true
            }
        })
        .collect()
}

fn into_sheet(raw: &RawSheet, code: ProjectCode, origin: Origin) -> Sheet {
    Sheet {
        name: raw.name.clone(),
        code,
        origin,
        tasks: extract_sheet(raw, origin),
    }
}
