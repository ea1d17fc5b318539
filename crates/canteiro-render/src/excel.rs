//! Excel dashboard export
//!
//! Generates an XLSX workbook with:
//! - Resumo: cross-project totals and averages
//! - Projetos: one row per project with metrics, efficiency and status
//! - One trend sheet per project with dated tasks ("Tendência <code>")
//!
//! Day serials are written as numbers with a date format, which is how the
//! spreadsheet stores dates natively.
//!
//! ```text
//! Sheet: Projetos
//! | Código | Projeto | Status                    | Progresso | Avanço | ... |
//! |--------|---------|---------------------------|-----------|--------|-----|
//! | R200-1 | Obra X  | Execução - No Prazo       | 67        | 67     | ... |
//! ```

use canteiro_core::budget::FinancialEfficiency;
use canteiro_core::config::TrendConfig;
use canteiro_core::{serial, Project, RenderError, Renderer, Serial};
use canteiro_engine::trend::{generate, TrendSeries};
use canteiro_engine::DashboardData;
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};
use std::collections::HashSet;

/// Longest sheet name the format accepts
const MAX_SHEET_NAME: usize = 31;

/// Excel dashboard renderer
#[derive(Clone, Debug)]
pub struct ExcelRenderer {
    /// Reference date for the trend sheets
    pub today: Serial,
    pub trend: TrendConfig,
    /// Whether to add one trend sheet per project
    pub include_trends: bool,
}

impl Default for ExcelRenderer {
    fn default() -> Self {
        Self {
            today: serial::today(),
            trend: TrendConfig::default(),
            include_trends: true,
        }
    }
}

struct ExcelFormats {
    header: Format,
    text: Format,
    integer: Format,
    percent: Format,
    date: Format,
}

fn xlsx(err: XlsxError) -> RenderError {
    RenderError::Format(err.to_string())
}

impl ExcelRenderer {
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

    /// Projects and summary only
    pub fn no_trends(mut self) -> Self {
        self.include_trends = false;
        self
    }

    /// Generate workbook bytes
    pub fn render_to_bytes(&self, data: &DashboardData) -> Result<Vec<u8>, RenderError> {
        let mut workbook = Workbook::new();
        let formats = Self::create_formats();

        self.add_summary_sheet(&mut workbook, data, &formats)?;
        self.add_projects_sheet(&mut workbook, data, &formats)?;

        if self.include_trends {
            let mut used: HashSet<String> = ["Resumo", "Projetos"].iter().map(|s| s.to_lowercase()).collect();
            for project in data.projects.values() {
                if let Some(series) = generate(project.tasks(), self.today, &self.trend).series() {
                    let name = unique_sheet_name(&format!("Tendência {}", project.code), &mut used);
                    self.add_trend_sheet(&mut workbook, &name, series, &formats)?;
                }
            }
        }

        workbook
            .save_to_buffer()
            .map_err(|e| RenderError::Format(format!("Failed to create Excel: {e}")))
    }

    fn create_formats() -> ExcelFormats {
        ExcelFormats {
            header: Format::new()
                .set_bold()
                .set_align(FormatAlign::Center)
                .set_background_color(0x4472C4)
                .set_font_color(0xFFFFFF)
                .set_border(FormatBorder::Thin),
            text: Format::new().set_border(FormatBorder::Thin),
            integer: Format::new().set_num_format("0").set_border(FormatBorder::Thin),
            percent: Format::new().set_num_format("0.0").set_border(FormatBorder::Thin),
            date: Format::new()
                .set_num_format("dd/mm/yyyy")
                .set_border(FormatBorder::Thin),
        }
    }

    fn add_summary_sheet(
        &self,
        workbook: &mut Workbook,
        data: &DashboardData,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Resumo").map_err(xlsx)?;

        let s = &data.summary;
        let rows: [(&str, f64); 6] = [
            ("Projetos", s.total_projects as f64),
            ("Projetos com execução", s.projects_with_execution as f64),
            ("Progresso médio (%)", f64::from(s.average_progress)),
            ("Avanço físico médio (%)", f64::from(s.average_physical_advancement)),
            ("Marcos", s.total_milestones as f64),
            ("Marcos concluídos", s.completed_milestones as f64),
        ];

        write_headers(sheet, &["Indicador", "Valor"], &formats.header)?;
        for (i, (label, value)) in rows.iter().enumerate() {
            let row = i as u32 + 1;
            sheet.write_with_format(row, 0, *label, &formats.text).map_err(xlsx)?;
            sheet.write_with_format(row, 1, *value, &formats.integer).map_err(xlsx)?;
        }

        sheet.set_column_width(0, 28).ok();
        sheet.set_column_width(1, 10).ok();
        Ok(())
    }

    fn add_projects_sheet(
        &self,
        workbook: &mut Workbook,
        data: &DashboardData,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Projetos").map_err(xlsx)?;

        let headers = [
            "Código",
            "Projeto",
            "Status",
            "Progresso (%)",
            "Avanço Físico (%)",
            "Tarefas",
            "Concluídas",
            "Marcos",
            "Marcos Concluídos",
            "Eficiência (%)",
            "Categoria",
        ];
        write_headers(sheet, &headers, &formats.header)?;

        for (i, project) in data.projects.values().enumerate() {
            write_project_row(sheet, i as u32 + 1, project, formats)?;
        }

        let widths = [12, 32, 36, 14, 18, 10, 12, 10, 18, 14, 12];
        for (col, width) in widths.iter().enumerate() {
            sheet.set_column_width(col as u16, *width).ok();
        }
        sheet.set_freeze_panes(1, 2).ok();
        Ok(())
    }

    fn add_trend_sheet(
        &self,
        workbook: &mut Workbook,
        name: &str,
        series: &TrendSeries,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        let sheet = workbook.add_worksheet();
        sheet.set_name(name).map_err(xlsx)?;

        let headers = [
            "Data",
            "Planejado (%)",
            "Real (%)",
            "Projetado (%)",
            "Vel. Planejada",
            "Vel. Real",
            "Marcos Acumulados",
            "Marcos Planejados",
            "Desvio (p.p.)",
        ];
        write_headers(sheet, &headers, &formats.header)?;

        for (i, point) in series.points.iter().enumerate() {
            let row = i as u32 + 1;
            sheet
                .write_number_with_format(row, 0, point.serial, &formats.date)
                .map_err(xlsx)?;
            sheet
                .write_number_with_format(row, 1, point.planned, &formats.percent)
                .map_err(xlsx)?;
            write_optional(sheet, row, 2, point.actual, formats)?;
            write_optional(sheet, row, 3, point.projected, formats)?;
            sheet
                .write_number_with_format(row, 4, point.velocity_planned, &formats.percent)
                .map_err(xlsx)?;
            write_optional(sheet, row, 5, point.velocity_actual, formats)?;
            sheet
                .write_number_with_format(row, 6, point.milestones_accumulated as f64, &formats.integer)
                .map_err(xlsx)?;
            sheet
                .write_number_with_format(row, 7, point.milestones_planned as f64, &formats.integer)
                .map_err(xlsx)?;
            write_optional(sheet, row, 8, point.deviation, formats)?;
        }

        sheet.set_column_width(0, 12).ok();
        for col in 1..headers.len() as u16 {
            sheet.set_column_width(col, 16).ok();
        }
        sheet.set_freeze_panes(1, 1).ok();
        Ok(())
    }
}

fn write_headers(sheet: &mut Worksheet, headers: &[&str], format: &Format) -> Result<(), RenderError> {
    for (col, header) in headers.iter().enumerate() {
        sheet
            .write_with_format(0, col as u16, *header, format)
            .map_err(xlsx)?;
    }
    Ok(())
}

fn write_project_row(
    sheet: &mut Worksheet,
    row: u32,
    project: &Project,
    formats: &ExcelFormats,
) -> Result<(), RenderError> {
    let m = &project.metrics;
    sheet.write_with_format(row, 0, &project.code, &formats.text).map_err(xlsx)?;
    sheet.write_with_format(row, 1, &project.name, &formats.text).map_err(xlsx)?;
    sheet
        .write_with_format(row, 2, project.status.to_string(), &formats.text)
        .map_err(xlsx)?;

    let counts = [
        f64::from(m.progress_general),
        f64::from(m.physical_advancement),
        m.total_tasks as f64,
        m.tasks_completed as f64,
        m.total_milestones as f64,
        m.milestones_completed as f64,
    ];
    for (offset, value) in counts.iter().enumerate() {
        sheet
            .write_number_with_format(row, 3 + offset as u16, *value, &formats.integer)
            .map_err(xlsx)?;
    }

    // unavailable efficiency leaves the cells blank, never 0
    match m.financial {
        FinancialEfficiency::Available { percent, category } => {
            sheet
                .write_number_with_format(row, 9, percent as f64, &formats.integer)
                .map_err(xlsx)?;
            sheet
                .write_with_format(row, 10, category.as_str(), &formats.text)
                .map_err(xlsx)?;
        }
        FinancialEfficiency::Unavailable => {
            sheet.write_blank(row, 9, &formats.integer).map_err(xlsx)?;
            sheet.write_blank(row, 10, &formats.text).map_err(xlsx)?;
        }
    }
    Ok(())
}

fn write_optional(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: Option<f64>,
    formats: &ExcelFormats,
) -> Result<(), RenderError> {
    match value {
        Some(v) => sheet.write_number_with_format(row, col, v, &formats.percent),
        None => sheet.write_blank(row, col, &formats.percent),
    }
    .map_err(xlsx)?;
    Ok(())
}

/// Valid, unique worksheet name derived from `base`
pub fn unique_sheet_name(base: &str, used: &mut HashSet<String>) -> String {
    let clean: String = base
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            other => other,
        })
        .collect();
    let clean = clean.trim_matches('\'').trim();
    let clean = if clean.is_empty() { "Planilha" } else { clean };

    let mut candidate: String = clean.chars().take(MAX_SHEET_NAME).collect();
    let mut n = 2;
    while used.contains(&candidate.to_lowercase()) {
        let suffix = format!(" ({})", n);
        let keep = MAX_SHEET_NAME - suffix.chars().count();
        candidate = clean.chars().take(keep).collect::<String>() + &suffix;
        n += 1;
    }
    used.insert(candidate.to_lowercase());
    candidate
}

impl Renderer for ExcelRenderer {
    type Output = Vec<u8>;
    type Input = DashboardData;

    fn render(&self, data: &DashboardData) -> Result<Vec<u8>, RenderError> {
        if data.is_empty() {
            return Err(RenderError::InvalidData("No projects to export".into()));
        }
        self.render_to_bytes(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_names_are_sanitized_and_truncated() {
        let mut used = HashSet::new();
        assert_eq!(unique_sheet_name("Tendência A/B", &mut used), "Tendência A_B");

        let long = unique_sheet_name("Tendência SUBESTACAO-NORTE-EXPANSAO-2024", &mut used);
        assert_eq!(long.chars().count(), MAX_SHEET_NAME);
        assert!(long.starts_with("Tendência SUBESTACAO"));
    }

    #[test]
    fn sheet_name_collisions_get_suffix() {
        let mut used = HashSet::new();
        let first = unique_sheet_name("Tendência SUBESTACAO-NORTE-EXPANSAO-1", &mut used);
        let second = unique_sheet_name("Tendência SUBESTACAO-NORTE-EXPANSAO-2", &mut used);
        assert_ne!(first, second);
        assert!(second.ends_with(" (2)"));
        assert_eq!(second.chars().count(), MAX_SHEET_NAME);
    }

    #[test]
    fn reserved_names_are_avoided() {
        let mut used: HashSet<String> = ["resumo".to_string()].into_iter().collect();
        assert_eq!(unique_sheet_name("Resumo", &mut used), "Resumo (2)");
        assert_eq!(unique_sheet_name("''", &mut used), "Planilha");
    }
}
