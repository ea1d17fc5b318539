//! Dashboard aggregation and load state
//!
//! [`build_dashboard`] runs the whole pipeline over one workbook.
//! [`Dashboard`] holds the result across reloads: a reload either replaces
//! every project at once or leaves the previous data in place and records
//! why it failed.

use canteiro_core::budget::BudgetSource;
use canteiro_core::config::Config;
use canteiro_core::{Project, ProjectCode, Serial};
use canteiro_ingest::{group_sheets, IngestError, Workbook, WorkbookSource};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::trend::{generate, Trend};
use crate::unify::unify;

// ============================================================================
// Data
// ============================================================================

/// Aggregate figures across every project of a load
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub total_projects: usize,
    /// Projects with at least one execution task
    pub projects_with_execution: usize,
    /// Rounded mean of `progress_general`
    pub average_progress: u8,
    /// Rounded mean of `physical_advancement`
    pub average_physical_advancement: u8,
    pub total_milestones: usize,
    pub completed_milestones: usize,
}

impl DashboardSummary {
    pub fn from_projects<'a>(projects: impl IntoIterator<Item = &'a Project>) -> Self {
        let mut summary = Self::default();
        let mut progress_sum = 0u64;
        let mut physical_sum = 0u64;

        for project in projects {
            summary.total_projects += 1;
            if project.has_execution() {
                summary.projects_with_execution += 1;
            }
            progress_sum += u64::from(project.metrics.progress_general);
            physical_sum += u64::from(project.metrics.physical_advancement);
            summary.total_milestones += project.metrics.total_milestones;
            summary.completed_milestones += project.metrics.milestones_completed;
        }

        summary.average_progress = mean(progress_sum, summary.total_projects);
        summary.average_physical_advancement = mean(physical_sum, summary.total_projects);
        summary
    }
}

fn mean(sum: u64, count: usize) -> u8 {
    if count == 0 {
        return 0;
    }
    (sum as f64 / count as f64).round().clamp(0.0, 100.0) as u8
}

/// Everything one load produces
#[derive(Clone, Debug, Serialize)]
pub struct DashboardData {
    /// Projects keyed by code
    pub projects: BTreeMap<ProjectCode, Project>,
    pub summary: DashboardSummary,
}

impl DashboardData {
    pub fn from_projects(projects: impl IntoIterator<Item = Project>) -> Self {
        let projects: BTreeMap<ProjectCode, Project> =
            projects.into_iter().map(|p| (p.code.clone(), p)).collect();
        let summary = DashboardSummary::from_projects(projects.values());
        Self { projects, summary }
    }

    pub fn project(&self, code: &str) -> Option<&Project> {
        self.projects.get(code.trim())
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Trend of one project as seen on `today`
    pub fn trend(&self, code: &str, today: Serial, config: &Config) -> Option<Trend> {
        self.project(code)
            .map(|project| generate(project.tasks(), today, &config.trend))
    }
}

/// Run grouping and unification over a loaded workbook
pub fn build_dashboard(workbook: &Workbook, config: &Config, budget: &dyn BudgetSource) -> DashboardData {
    let groups = group_sheets(workbook, &config.ingest);
    let projects = groups
        .into_iter()
        .map(|group| unify(group, budget, &config.status));
    let data = DashboardData::from_projects(projects);

    info!(
        projects = data.summary.total_projects,
        with_execution = data.summary.projects_with_execution,
        average_progress = data.summary.average_progress,
        "dashboard built"
    );
    data
}

// ============================================================================
// State
// ============================================================================

/// Where the dashboard stands after the latest load attempt
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DashboardState {
    /// Nothing loaded yet
    Empty,
    /// Latest load succeeded
    Loaded { source: String },
    /// Latest load failed; data from an earlier load, if any, is still served
    Failed { source: String, message: String },
}

/// Holds the current dashboard data across reloads
pub struct Dashboard {
    config: Config,
    budget: Box<dyn BudgetSource>,
    data: Option<DashboardData>,
    state: DashboardState,
}

impl Dashboard {
    /// Dashboard using the config's budget table
    pub fn new(config: Config) -> Self {
        let budget = Box::new(config.budget_table());
        Self {
            config,
            budget,
            data: None,
            state: DashboardState::Empty,
        }
    }

    /// Replace the budget correlation source
    pub fn with_budget(mut self, budget: Box<dyn BudgetSource>) -> Self {
        self.budget = budget;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn data(&self) -> Option<&DashboardData> {
        self.data.as_ref()
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Load a workbook and replace all projects.
    ///
    /// On failure the previous data stays untouched and the state records
    /// the message.
    pub fn reload(&mut self, source: &dyn WorkbookSource) -> Result<&DashboardData, IngestError> {
        let location = source.describe();
        match source.load() {
            Ok(workbook) => {
                let data = build_dashboard(&workbook, &self.config, self.budget.as_ref());
                self.state = DashboardState::Loaded { source: location };
                Ok(&*self.data.insert(data))
            }
            Err(err) => {
                warn!(source = %location, error = %err, "load failed, keeping previous data");
                self.state = DashboardState::Failed {
                    source: location,
                    message: err.to_string(),
                };
                Err(err)
            }
        }
    }
}
