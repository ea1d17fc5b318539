//! Project metrics
//!
//! Counts and percentages computed over a project's unified task list.
//! Executable tasks are those below the summary level (`level > 2`);
//! milestones are tasks whose "Marco" column read "SIM".

use serde::{Deserialize, Serialize};

use crate::budget::FinancialEfficiency;
use crate::Task;

/// Aggregate metrics for one project
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMetrics {
    /// Executable tasks at 100%, as a rounded percentage; 0 without tasks
    pub progress_general: u8,
    /// Milestones at 100%, as a rounded percentage; 0 without milestones
    pub physical_advancement: u8,
    /// Executable (level > 2) tasks across both sides
    pub total_tasks: usize,
    pub tasks_completed: usize,
    pub total_milestones: usize,
    pub milestones_completed: usize,
    pub financial: FinancialEfficiency,
}

impl ProjectMetrics {
    /// Compute metrics over an ordered task list
    pub fn from_tasks<'a>(
        tasks: impl IntoIterator<Item = &'a Task>,
        financial: FinancialEfficiency,
    ) -> Self {
        let mut total_tasks = 0usize;
        let mut tasks_completed = 0usize;
        let mut total_milestones = 0usize;
        let mut milestones_completed = 0usize;

        for task in tasks {
            if task.is_executable() {
                total_tasks += 1;
                if task.is_complete() {
                    tasks_completed += 1;
                }
            }
            if task.is_milestone() {
                total_milestones += 1;
                if task.is_complete() {
                    milestones_completed += 1;
                }
            }
        }

        Self {
            progress_general: percentage(tasks_completed, total_tasks).unwrap_or(0),
            physical_advancement: percentage(milestones_completed, total_milestones).unwrap_or(0),
            total_tasks,
            tasks_completed,
            total_milestones,
            milestones_completed,
            financial,
        }
    }

    /// Overall progress, `None` when there are no executable tasks
    pub fn progress(&self) -> Option<u8> {
        percentage(self.tasks_completed, self.total_tasks)
    }

    /// Physical advancement, `None` when there are no milestones
    pub fn physical(&self) -> Option<u8> {
        percentage(self.milestones_completed, self.total_milestones)
    }

    pub fn is_finished(&self) -> bool {
        self.progress_general >= 100
    }
}

/// round(100 * part / whole), `None` for an empty whole
pub fn percentage(part: usize, whole: usize) -> Option<u8> {
    if whole == 0 {
        return None;
    }
    let pct = (100.0 * part as f64 / whole as f64).round();
    Some(pct.clamp(0.0, 100.0) as u8)
}
