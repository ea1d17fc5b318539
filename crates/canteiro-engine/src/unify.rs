//! Project unification
//!
//! Merges the oversight and execution sides of a [`SheetGroup`] into one
//! [`Project`] and computes its metrics and status over the combined list.

use canteiro_core::budget::{BudgetSource, FinancialEfficiency};
use canteiro_core::metrics::ProjectMetrics;
use canteiro_core::status::{classify, StatusRules};
use canteiro_core::{Project, Task};
use canteiro_ingest::SheetGroup;
use tracing::debug;

/// Build a project from a grouped sheet pair
pub fn unify(group: SheetGroup, budget: &dyn BudgetSource, rules: &StatusRules) -> Project {
    let code = group.code;
    let oversight_tasks = group.oversight.map(|s| s.tasks).unwrap_or_default();
    let execution_tasks = group.execution.map(|s| s.tasks).unwrap_or_default();

    let name = project_name(&oversight_tasks).unwrap_or_else(|| code.clone());
    let financial = FinancialEfficiency::from_figures(budget.correlate(&code, &name).as_ref());

    let all = || oversight_tasks.iter().chain(execution_tasks.iter());
    let metrics = ProjectMetrics::from_tasks(all(), financial);
    let status = classify(all(), metrics.progress_general, rules);

    debug!(
        %code,
        %name,
        tasks = metrics.total_tasks,
        progress = metrics.progress_general,
        %status,
        "project unified"
    );

    Project {
        code,
        name,
        oversight_tasks,
        execution_tasks,
        status,
        metrics,
    }
}

/// Name of the first level-1 oversight task, if it has one
pub fn project_name(oversight: &[Task]) -> Option<String> {
    oversight
        .iter()
        .find(|t| t.level == 1)
        .map(|t| t.name.trim().to_string())
        .filter(|name| !name.is_empty())
}
