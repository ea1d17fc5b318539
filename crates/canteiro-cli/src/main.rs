//! canteiro CLI - Construction Progress Dashboard
//!
//! Command-line interface for loading a project workbook and reporting
//! progress, physical advancement, efficiency, status and S-curve trends.

use anyhow::{Context, Result};
use canteiro_core::config::Config;
use canteiro_core::metrics::ProjectMetrics;
use canteiro_core::status::ProjectStatus;
use canteiro_core::{serial, Renderer};
use canteiro_engine::trend::{generate, Trend};
use canteiro_engine::{Dashboard, DashboardData, DashboardSummary};
use canteiro_render::{ExcelRenderer, TextRenderer};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "canteiro")]
#[command(author, version, about = "Construction progress dashboard", long_about = None)]
struct Cli {
    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE", env = "CANTEIRO_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Reference date for trends, instead of the local date
    #[arg(long, value_name = "YYYY-MM-DD", global = true)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize every project in a workbook
    Summary {
        /// Workbook path (.xlsx, .xls, .ods, .json)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show one project's metrics and trend
    Project {
        /// Workbook path (.xlsx, .xls, .ods, .json)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Project code (e.g. R200-1)
        code: String,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Export the dashboard to an Excel workbook
    Export {
        /// Workbook path (.xlsx, .xls, .ods, .json)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output .xlsx path
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    let today = cli.today.map_or_else(serial::today, serial::from_date);

    match cli.command {
        Commands::Summary { file, format } => {
            let dashboard = load_dashboard(&file, config)?;
            let data = loaded(&dashboard)?;
            match format {
                OutputFormat::Text => print!("{}", TextRenderer::new().today(today).render(data)?),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary_output(data))?),
            }
        }
        Commands::Project { file, code, format } => {
            let dashboard = load_dashboard(&file, config)?;
            let data = loaded(&dashboard)?;
            let project = data.project(&code).with_context(|| {
                let known: Vec<&str> = data.projects.keys().map(String::as_str).collect();
                format!("project '{}' not found (available: {})", code, known.join(", "))
            })?;
            let trend_config = dashboard.config().trend;
            match format {
                OutputFormat::Text => {
                    let renderer = TextRenderer::new().today(today).trend(trend_config);
                    print!("{}", renderer.render_project(project));
                }
                OutputFormat::Json => {
                    let output = ProjectOutput {
                        project,
                        status_label: project.status.to_string(),
                        trend: generate(project.tasks(), today, &trend_config),
                    };
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
            }
        }
        Commands::Export { file, output } => {
            let dashboard = load_dashboard(&file, config)?;
            let data = loaded(&dashboard)?;
            let bytes = ExcelRenderer::new()
                .today(today)
                .trend(dashboard.config().trend)
                .render(data)
                .context("failed to render workbook")?;
            std::fs::write(&output, bytes)
                .with_context(|| format!("failed to write {}", output.display()))?;
            info!(path = %output.display(), projects = data.projects.len(), "workbook exported");
            println!("Exported {} projects to {}", data.projects.len(), output.display());
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            let config = Config::load(path)?;
            debug!(path = %path.display(), budget_entries = config.budget.len(), "config loaded");
            Ok(config)
        }
        None => Ok(Config::default()),
    }
}

fn load_dashboard(file: &Path, config: Config) -> Result<Dashboard> {
    let source = canteiro_ingest::source_for(file)?;
    let mut dashboard = Dashboard::new(config);
    dashboard
        .reload(source.as_ref())
        .with_context(|| format!("failed to load {}", file.display()))?;
    Ok(dashboard)
}

fn loaded(dashboard: &Dashboard) -> Result<&DashboardData> {
    dashboard.data().context("no dashboard data loaded")
}

// ============================================================================
// JSON output
// ============================================================================

#[derive(Serialize)]
struct SummaryOutput<'a> {
    summary: &'a DashboardSummary,
    projects: Vec<ProjectOverview<'a>>,
}

#[derive(Serialize)]
struct ProjectOverview<'a> {
    code: &'a str,
    name: &'a str,
    status: &'a ProjectStatus,
    status_label: String,
    metrics: &'a ProjectMetrics,
}

#[derive(Serialize)]
struct ProjectOutput<'a> {
    project: &'a canteiro_core::Project,
    status_label: String,
    trend: Trend,
}

fn summary_output(data: &DashboardData) -> SummaryOutput<'_> {
    SummaryOutput {
        summary: &data.summary,
        projects: data
            .projects
            .values()
            .map(|p| ProjectOverview {
                code: &p.code,
                name: &p.name,
                status: &p.status,
                status_label: p.status.to_string(),
                metrics: &p.metrics,
            })
            .collect(),
    }
}
