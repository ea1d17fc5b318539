//! # canteiro-core
//!
//! Core domain model for the canteiro construction progress dashboard.
//!
//! This crate provides:
//! - Domain types: `Task`, `Origin`, `Project`, `ProjectMetrics`
//! - Day-serial date codec (`serial`)
//! - Metrics and financial efficiency (`metrics`, `budget`)
//! - Heuristic project status classification (`status`)
//! - TOML configuration (`config`)
//! - The `Renderer` trait and error types
//!
//! ## Example
//!
//! ```rust
//! use canteiro_core::{Origin, Task};
//! use canteiro_core::metrics::ProjectMetrics;
//! use canteiro_core::budget::FinancialEfficiency;
//!
//! let tasks = vec![
//!     Task::new("Fundações", Origin::Execution).level(3).complete(100.0),
//!     Task::new("Estrutura", Origin::Execution).level(3).complete(40.0),
//! ];
//! let metrics = ProjectMetrics::from_tasks(&tasks, FinancialEfficiency::Unavailable);
//! assert_eq!(metrics.progress_general, 50);
//! ```

pub mod budget;
pub mod config;
pub mod metrics;
pub mod serial;
pub mod status;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::metrics::ProjectMetrics;
use crate::status::ProjectStatus;

// ============================================================================
// Type Aliases
// ============================================================================

/// Day count since 1899-12-30; `0` means "no date"
pub type Serial = f64;

/// Project code shared by an oversight/execution sheet pair (e.g. "R200-1")
pub type ProjectCode = String;

// ============================================================================
// Task
// ============================================================================

/// Which tracking sheet a task came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Fiscalização sheet ("- F")
    Oversight,
    /// Execução sheet ("- E")
    Execution,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Oversight => "Fiscalização",
            Origin::Execution => "Execução",
        }
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One schedule row.
///
/// Percent complete is kept exactly as read; metrics compare with `>= 100`
/// so out-of-range source values are never clamped here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Work-breakdown code (e.g. "1.2.3")
    pub edt: String,
    pub name: String,
    /// 1 = project root, 2 = summary group, >2 = executable task
    pub level: u32,
    /// Name of the containing summary row
    pub parent_summary: String,
    pub start: Serial,
    pub end: Serial,
    pub baseline_start: Serial,
    pub baseline_end: Serial,
    pub percent_complete: f64,
    /// `None` when the sheet has no milestone column
    pub milestone: Option<bool>,
    pub origin: Origin,
}

impl Task {
    /// Create a task with the given name; everything else zeroed
    pub fn new(name: impl Into<String>, origin: Origin) -> Self {
        Self {
            edt: String::new(),
            name: name.into(),
            level: 0,
            parent_summary: String::new(),
            start: 0.0,
            end: 0.0,
            baseline_start: 0.0,
            baseline_end: 0.0,
            percent_complete: 0.0,
            milestone: None,
            origin,
        }
    }

    pub fn edt(mut self, edt: impl Into<String>) -> Self {
        self.edt = edt.into();
        self
    }

    pub fn level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn summary(mut self, parent: impl Into<String>) -> Self {
        self.parent_summary = parent.into();
        self
    }

    /// Set actual/forecast start and end
    pub fn dates(mut self, start: Serial, end: Serial) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn baseline(mut self, start: Serial, end: Serial) -> Self {
        self.baseline_start = start;
        self.baseline_end = end;
        self
    }

    pub fn complete(mut self, percent: f64) -> Self {
        self.percent_complete = percent;
        self
    }

    pub fn milestone(mut self, milestone: bool) -> Self {
        self.milestone = Some(milestone);
        self
    }

    /// Leaf work item (level > 2)
    pub fn is_executable(&self) -> bool {
        self.level > 2
    }

    pub fn is_complete(&self) -> bool {
        self.percent_complete >= 100.0
    }

    pub fn is_milestone(&self) -> bool {
        self.milestone == Some(true)
    }

    /// Both start and end are present
    pub fn has_dates(&self) -> bool {
        self.start > 0.0 && self.end > 0.0
    }

    /// Baseline end, or the current end when no baseline was recorded
    pub fn planned_end(&self) -> Serial {
        if self.baseline_end > 0.0 {
            self.baseline_end
        } else {
            self.end
        }
    }

    /// Baseline start, or the current start when no baseline was recorded
    pub fn planned_start(&self) -> Serial {
        if self.baseline_start > 0.0 {
            self.baseline_start
        } else {
            self.start
        }
    }
}

// ============================================================================
// Project
// ============================================================================

/// A unified oversight + execution project
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Project {
    pub code: ProjectCode,
    /// Level-1 oversight task name, or the code
    pub name: String,
    pub oversight_tasks: Vec<Task>,
    pub execution_tasks: Vec<Task>,
    pub status: ProjectStatus,
    pub metrics: ProjectMetrics,
}

impl Project {
    /// All tasks, oversight first
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.oversight_tasks.iter().chain(self.execution_tasks.iter())
    }

    pub fn has_execution(&self) -> bool {
        !self.execution_tasks.is_empty()
    }
}

// ============================================================================
// Text helpers
// ============================================================================

/// Lower-case and strip Portuguese diacritics so "Início" matches "inicio"
pub fn fold_text(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

// ============================================================================
// Traits
// ============================================================================

/// Output rendering
pub trait Renderer {
    type Output;
    type Input: ?Sized;

    /// Render computed dashboard data to the output format
    fn render(&self, input: &Self::Input) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

// ============================================================================
// Tests
// ============================================================================
