//! Tests for the text and Excel renderers

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use canteiro_core::budget::NoBudget;
use canteiro_core::config::Config;
use canteiro_core::{RenderError, Renderer};
use canteiro_engine::{build_dashboard, DashboardData};
use canteiro_ingest::parse_json;
use canteiro_render::{ExcelRenderer, TextRenderer};
use pretty_assertions::assert_eq;
use std::io::Cursor;

const TODAY: f64 = 45320.0;

fn dashboard() -> DashboardData {
    let workbook = parse_json(
        r#"{ "sheets": [
            { "name": "R200-1 - F", "rows": [
                { "Nome": "Obra X", "Nível": 1 },
                { "Nome": "Vistoria", "Nível": 3, "% Concluído": 100, "Marco": "SIM",
                  "Nome do Resumo": "Obra civil",
                  "Data de Início": 45300, "Data de Término": 45310 }
            ] },
            { "name": "R200-1 - E", "rows": [
                { "Nome": "Estrutura", "Nível": 3, "% Concluído": 50, "Marco": "SIM",
                  "Nome do Resumo": "Obra civil",
                  "Data de Início": 45300, "Data de Término": 45400 }
            ] },
            { "name": "SEM-DATAS - F", "rows": [
                { "Nome": "Subestação", "Nível": 1 },
                { "Nome": "Licenciamento", "Nível": 3, "% Concluído": 100 }
            ] }
        ] }"#,
    )
    .unwrap();
    let config = Config::from_toml_str(
        r#"
        [[budget]]
        code = "R200-1"
        approved = 200000
        realized = 250000
        "#,
    )
    .unwrap();
    build_dashboard(&workbook, &config, &config.budget_table())
}

fn open(bytes: Vec<u8>) -> Xlsx<Cursor<Vec<u8>>> {
    open_workbook_from_rs(Cursor::new(bytes)).unwrap()
}

// ============================================================================
// Text Renderer Tests
// ============================================================================

#[test]
fn text_summary_lists_every_project() {
    let text = TextRenderer::new().today(TODAY).render(&dashboard()).unwrap();

    assert!(text.contains("Projetos: 2 (1 com execução)"));
    assert!(text.contains("Obra X"));
    assert!(text.contains("Subestação"));
    assert!(text.contains("125% (Atenção)"));
    assert!(text.contains("n/d"));
    assert!(text.contains("Concluído"));
}

#[test]
fn text_project_detail_with_trend() {
    let text = TextRenderer::new()
        .today(TODAY)
        .project("R200-1")
        .render(&dashboard())
        .unwrap();

    assert!(text.starts_with("R200-1 - Obra X\n"));
    assert!(text.contains("Progresso geral: 50% (1/2 tarefas)"));
    assert!(text.contains("Avanço físico: 50% (1/2 marcos)"));
    assert!(text.contains("Tendência (referência 29/01/2024)"));
    assert!(text.contains("Previsão de conclusão:"));
    assert!(text.contains("Planejado"));
    assert!(text.contains("09/01/2024"));
}

#[test]
fn text_project_without_dates_reports_insufficient_data() {
    let text = TextRenderer::new()
        .today(TODAY)
        .project("SEM-DATAS")
        .no_trend_table()
        .render(&dashboard())
        .unwrap();

    assert!(text.contains("Tendência: dados insuficientes"));
    assert!(text.contains("Avanço físico: sem dados (0/0 marcos)"));
}

#[test]
fn text_unknown_project_is_invalid_data() {
    let err = TextRenderer::new()
        .project("NOPE")
        .render(&dashboard())
        .unwrap_err();
    assert!(matches!(err, RenderError::InvalidData(_)));
    assert!(err.to_string().contains("NOPE"));
}

// ============================================================================
// Excel Renderer Tests
// ============================================================================

#[test]
fn excel_has_summary_projects_and_trend_sheets() {
    let bytes = ExcelRenderer::new().today(TODAY).render(&dashboard()).unwrap();
    assert!(bytes.starts_with(b"PK"));

    let workbook = open(bytes);
    assert_eq!(
        workbook.sheet_names(),
        vec!["Resumo", "Projetos", "Tendência R200-1"]
    );
}

#[test]
fn excel_project_rows() {
    let bytes = ExcelRenderer::new().today(TODAY).no_trends().render(&dashboard()).unwrap();
    let mut workbook = open(bytes);
    assert_eq!(workbook.sheet_names().len(), 2);

    let range = workbook.worksheet_range("Projetos").unwrap();
    assert_eq!(range.get_value((0, 0)), Some(&Data::String("Código".into())));
    assert_eq!(range.get_value((1, 0)), Some(&Data::String("R200-1".into())));
    assert_eq!(range.get_value((1, 1)), Some(&Data::String("Obra X".into())));
    assert_eq!(range.get_value((1, 3)), Some(&Data::Float(50.0)));
    assert_eq!(range.get_value((1, 9)), Some(&Data::Float(125.0)));
    assert_eq!(range.get_value((1, 10)), Some(&Data::String("Atenção".into())));

    // no budget: blank, not zero
    assert_eq!(range.get_value((2, 0)), Some(&Data::String("SEM-DATAS".into())));
    assert!(matches!(range.get_value((2, 9)), None | Some(Data::Empty)));
}

#[test]
fn excel_trend_sheet_rows() {
    let bytes = ExcelRenderer::new().today(TODAY).render(&dashboard()).unwrap();
    let mut workbook = open(bytes);
    let range = workbook.worksheet_range("Tendência R200-1").unwrap();

    // header plus samples 45300..=45410 every 10 days
    assert_eq!(range.height(), 13);
    assert_eq!(range.get_value((0, 2)), Some(&Data::String("Real (%)".into())));
    match range.get_value((1, 0)) {
        Some(Data::DateTime(dt)) => assert_eq!(dt.as_f64(), 45300.0),
        other => panic!("expected a date cell, got {:?}", other),
    }
}

#[test]
fn excel_refuses_empty_dashboard() {
    let empty = DashboardData::from_projects(Vec::new());
    let err = ExcelRenderer::new().render(&empty).unwrap_err();
    assert!(matches!(err, RenderError::InvalidData(_)));
    assert!(build_dashboard(&Default::default(), &Config::default(), &NoBudget).is_empty());
}
