//! # canteiro-render
//!
//! Rendering backends for canteiro dashboards.
//!
//! This crate provides:
//! - Plain-text summary table and project detail (`TextRenderer`)
//! - Excel workbook with a projects sheet and per-project trend sheets (`ExcelRenderer`)
//!
//! Both implement [`canteiro_core::Renderer`] over a computed
//! [`DashboardData`].
//!
//! ## Example
//!
//! ```rust
//! use canteiro_core::budget::NoBudget;
//! use canteiro_core::config::Config;
//! use canteiro_core::Renderer;
//! use canteiro_engine::build_dashboard;
//! use canteiro_ingest::parse_json;
//! use canteiro_render::TextRenderer;
//!
//! let workbook = parse_json(r#"{"sheets": [
//!     {"name": "R200-1 - F", "rows": [{"Nome": "Obra X", "Nível": 1}]}
//! ]}"#).unwrap();
//! let data = build_dashboard(&workbook, &Config::default(), &NoBudget);
//!
//! let text = TextRenderer::new().today(45306.0).render(&data).unwrap();
//! assert!(text.contains("Obra X"));
//! ```

pub mod excel;

pub use excel::ExcelRenderer;

use canteiro_core::budget::FinancialEfficiency;
use canteiro_core::config::TrendConfig;
use canteiro_core::{serial, Project, RenderError, Renderer, Serial};
use canteiro_engine::trend::{generate, Trend, TrendSeries};
use canteiro_engine::DashboardData;

/// Plain-text renderer.
///
/// Renders the cross-project summary table, or the detail of a single
/// project when one is selected with [`TextRenderer::project`].
#[derive(Clone, Debug)]
pub struct TextRenderer {
    /// Reference date for the trend split between actual and projected
    pub today: Serial,
    pub trend: TrendConfig,
    /// Project code to detail instead of the summary
    pub project: Option<String>,
    /// Include the sampled points under the trend figures
    pub show_trend_table: bool,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            today: serial::today(),
            trend: TrendConfig::default(),
            project: None,
            show_trend_table: true,
        }
    }
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn today(mut self, today: Serial) -> Self {
        self.today = today;
        self
    }

    pub fn trend(mut self, trend: TrendConfig) -> Self {
        self.trend = trend;
        self
    }

    /// Render one project's detail
    pub fn project(mut self, code: impl Into<String>) -> Self {
        self.project = Some(code.into());
        self
    }

    /// Trend figures only, without the per-sample table
    pub fn no_trend_table(mut self) -> Self {
        self.show_trend_table = false;
        self
    }

    /// Summary header and one line per project
    pub fn render_summary(&self, data: &DashboardData) -> String {
        let summary = &data.summary;
        let mut out = String::new();

        out.push_str("Painel de Obras\n");
        out.push_str("===============\n");
        out.push_str(&format!(
            "Projetos: {} ({} com execução)\n",
            summary.total_projects, summary.projects_with_execution
        ));
        out.push_str(&format!("Progresso médio: {}%\n", summary.average_progress));
        out.push_str(&format!(
            "Avanço físico médio: {}%\n",
            summary.average_physical_advancement
        ));
        out.push_str(&format!(
            "Marcos: {}/{} concluídos\n",
            summary.completed_milestones, summary.total_milestones
        ));

        if data.is_empty() {
            out.push_str("\nNenhum projeto encontrado.\n");
            return out;
        }

        let code_width = column_width("Código", data.projects.keys().map(String::as_str));
        let name_width = column_width("Projeto", data.projects.values().map(|p| p.name.as_str()));

        out.push('\n');
        out.push_str(&format!(
            "{:<cw$}  {:<nw$}  {:>9}  {:>6}  {:>7}  {:<16}  {}\n",
            "Código",
            "Projeto",
            "Progresso",
            "Avanço",
            "Marcos",
            "Eficiência",
            "Status",
            cw = code_width,
            nw = name_width
        ));
        for project in data.projects.values() {
            let m = &project.metrics;
            out.push_str(&format!(
                "{:<cw$}  {:<nw$}  {:>8}%  {:>5}%  {:>7}  {:<16}  {}\n",
                project.code,
                project.name,
                m.progress_general,
                m.physical_advancement,
                format!("{}/{}", m.milestones_completed, m.total_milestones),
                efficiency_label(&m.financial),
                project.status,
                cw = code_width,
                nw = name_width
            ));
        }
        out
    }

    /// Metrics, status and trend for one project
    pub fn render_project(&self, project: &Project) -> String {
        let m = &project.metrics;
        let mut out = String::new();

        let title = format!("{} - {}", project.code, project.name);
        out.push_str(&format!("{}\n{}\n", title, "=".repeat(title.chars().count())));
        out.push_str(&format!("Status: {}\n", project.status));
        out.push_str(&format!(
            "Progresso geral: {} ({}/{} tarefas)\n",
            optional_percent(m.progress()),
            m.tasks_completed,
            m.total_tasks
        ));
        out.push_str(&format!(
            "Avanço físico: {} ({}/{} marcos)\n",
            optional_percent(m.physical()),
            m.milestones_completed,
            m.total_milestones
        ));
        out.push_str(&format!("Eficiência financeira: {}\n", efficiency_label(&m.financial)));
        out.push_str(&format!(
            "Tarefas: {} fiscalização, {} execução\n",
            project.oversight_tasks.len(),
            project.execution_tasks.len()
        ));

        out.push('\n');
        match generate(project.tasks(), self.today, &self.trend) {
            Trend::InsufficientData => out.push_str("Tendência: dados insuficientes\n"),
            Trend::Curve(series) => self.render_trend(&series, &mut out),
        }
        out
    }

    fn render_trend(&self, series: &TrendSeries, out: &mut String) {
        out.push_str(&format!("Tendência (referência {})\n", format_serial(self.today)));
        out.push_str(&format!("  Progresso real: {:.1}%\n", series.current_progress));
        match (series.current_deviation, series.deviation_status) {
            (Some(deviation), Some(status)) => {
                out.push_str(&format!("  Desvio: {:+.1} p.p. ({})\n", deviation, status));
            }
            _ => out.push_str("  Desvio: n/d\n"),
        }
        out.push_str(&format!(
            "  Previsão de conclusão: {}\n",
            series
                .forecast_completion
                .map_or_else(|| "n/d".to_string(), format_serial)
        ));

        if !self.show_trend_table {
            return;
        }
        out.push_str(&format!(
            "\n  {:<10}  {:>9}  {:>6}  {:>9}  {:>6}\n",
            "Data", "Planejado", "Real", "Projetado", "Marcos"
        ));
        for point in &series.points {
            out.push_str(&format!(
                "  {:<10}  {:>9.1}  {:>6}  {:>9}  {:>6}\n",
                format_serial(point.serial),
                point.planned,
                optional_number(point.actual),
                optional_number(point.projected),
                format!("{}/{}", point.milestones_accumulated, point.milestones_planned)
            ));
        }
    }
}

impl Renderer for TextRenderer {
    type Output = String;
    type Input = DashboardData;

    fn render(&self, data: &DashboardData) -> Result<String, RenderError> {
        match &self.project {
            None => Ok(self.render_summary(data)),
            Some(code) => data
                .project(code)
                .map(|project| self.render_project(project))
                .ok_or_else(|| RenderError::InvalidData(format!("unknown project code '{}'", code))),
        }
    }
}

// ============================================================================
// Formatting helpers
// ============================================================================

/// `dd/mm/yyyy`, or `-` for an invalid serial
pub fn format_serial(value: Serial) -> String {
    serial::to_date(value).map_or_else(|| "-".to_string(), |d| d.format("%d/%m/%Y").to_string())
}

/// "150% (Atenção)" or "n/d"
pub fn efficiency_label(financial: &FinancialEfficiency) -> String {
    match financial {
        FinancialEfficiency::Unavailable => "n/d".to_string(),
        FinancialEfficiency::Available { percent, category } => format!("{}% ({})", percent, category),
    }
}

fn optional_percent(value: Option<u8>) -> String {
    value.map_or_else(|| "sem dados".to_string(), |v| format!("{}%", v))
}

fn optional_number(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.1}", v))
}

fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values
        .map(|v| v.chars().count())
        .chain(std::iter::once(header.chars().count()))
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use canteiro_core::budget::EfficiencyCategory;

    #[test]
    fn serial_formatting() {
        assert_eq!(format_serial(45306.0), "15/01/2024");
        assert_eq!(format_serial(0.0), "-");
    }

    #[test]
    fn efficiency_labels() {
        assert_eq!(efficiency_label(&FinancialEfficiency::Unavailable), "n/d");
        let available = FinancialEfficiency::Available {
            percent: 150,
            category: EfficiencyCategory::Attention,
        };
        assert_eq!(efficiency_label(&available), "150% (Atenção)");
    }

    #[test]
    fn width_covers_header() {
        assert_eq!(column_width("Código", ["A", "B"].into_iter()), 6);
        assert_eq!(column_width("Código", ["R200-1-LONGO"].into_iter()), 12);
    }

    #[test]
    fn optional_values() {
        assert_eq!(optional_percent(None), "sem dados");
        assert_eq!(optional_percent(Some(67)), "67%");
        assert_eq!(optional_number(Some(20.0)), "20.0");
        assert_eq!(optional_number(None), "-");
    }
}
