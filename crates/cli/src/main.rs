//! # attendance-cli
//!
//! Command-line interface for attendance consolidation and the
//! physician/technician cross-reference report.

use anyhow::{Context, Result};
use attendance_core::day::canonical_day_label;
use attendance_core::kpi::{status_share_by_provider, visits_by_provider};
use attendance_core::pipeline::{analyze_file, consolidate_file, run_report, Analysis};
use attendance_core::{AnalysisConfig, ConsolidatedTable, FilterCriteria, Kpis, StatusCategory};
use attendance_sheet::Book;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// attend - consolidate daily attendance workbooks and cross-reference visits
#[derive(Parser)]
#[command(name = "attend")]
#[command(author, version, about = "Attendance consolidation and cross-reference", long_about = None)]
struct Cli {
    /// YAML configuration file (defaults apply when omitted)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the cross-reference workbook and, optionally, charts
    Report {
        /// Production workbook (one sheet per day)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output workbook path
        #[arg(short, long, default_value = "cruzamento_atendimentos.xlsx")]
        output: PathBuf,

        /// Directory for per-provider chart files
        #[arg(long, value_name = "DIR")]
        charts_dir: Option<PathBuf>,
    },

    /// Print the match summary, per-provider statistics and KPIs
    Summary {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output format
        #[arg(short = 'f', long = "format", default_value = "table")]
        format: OutputFormat,
    },

    /// Export the consolidated table, optionally filtered
    Export {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output file; `.xlsx` writes a workbook, anything else CSV
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        filter: FilterArgs,
    },
}

/// Output format for summaries.
#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    /// JSON output
    Json,
    /// Colored text (default)
    #[default]
    Table,
}

/// Filter flags for `export`. An omitted flag keeps every value.
#[derive(clap::Args, Default)]
struct FilterArgs {
    /// Day sheet (`Dia 3` and `Dia 03` are equivalent)
    #[arg(long = "day", value_name = "DAY")]
    days: Vec<String>,

    #[arg(long = "month", value_name = "MONTH")]
    months: Vec<String>,

    #[arg(long = "provider", value_name = "NAME")]
    providers: Vec<String>,

    #[arg(long = "specialty", value_name = "TEAM")]
    specialties: Vec<String>,

    /// Visit_Occurred, No_Show, Dropped_Out or "Not informed"
    #[arg(long = "status", value_name = "STATUS")]
    statuses: Vec<StatusCategory>,
}

impl FilterArgs {
    fn criteria(&self, table: &ConsolidatedTable) -> FilterCriteria {
        let mut criteria = FilterCriteria::all(table);
        if !self.days.is_empty() {
            criteria.days = self.days.iter().map(|d| canonical_day_label(d)).collect();
        }
        if !self.months.is_empty() {
            criteria.months = to_set(&self.months);
        }
        if !self.providers.is_empty() {
            criteria.providers = to_set(&self.providers);
        }
        if !self.specialties.is_empty() {
            criteria.specialties = to_set(&self.specialties);
        }
        if !self.statuses.is_empty() {
            criteria.statuses = self.statuses.iter().copied().collect();
        }
        criteria
    }
}

fn to_set(values: &[String]) -> BTreeSet<String> {
    values.iter().map(|v| v.trim().to_string()).collect()
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Report {
            input,
            output,
            charts_dir,
        } => run_report_command(&input, &output, charts_dir.as_deref(), &config),
        Command::Summary { input, format } => {
            let analysis = analyze_file(&input, &config)
                .with_context(|| format!("Failed to analyze {}", input.display()))?;
            print_summary(&analysis, format)
        }
        Command::Export {
            input,
            output,
            filter,
        } => export(&input, &output, &filter, &config),
    }
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => AnalysisConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => Ok(AnalysisConfig::default()),
    }
}

fn run_report_command(
    input: &Path,
    output: &Path,
    charts_dir: Option<&Path>,
    config: &AnalysisConfig,
) -> Result<()> {
    let (analysis, files) = run_report(input, output, charts_dir, config)
        .with_context(|| format!("Failed to build report for {}", input.display()))?;

    print_skipped(&analysis.consolidation.skipped);
    let summary = &analysis.cross.summary;
    println!(
        "{} {} realized physician visits, {} without a same-day technician visit",
        "Report:".cyan().bold(),
        summary.realized_physician_rows,
        summary.bypassed.to_string().red().bold()
    );
    println!("  {} {}", "workbook".green(), files.workbook.display());
    for chart in &files.charts {
        println!("  {} {}", "chart".green(), chart.display());
    }
    Ok(())
}

fn print_summary(analysis: &Analysis, format: OutputFormat) -> Result<()> {
    let table = &analysis.consolidation.table;
    let records: Vec<_> = table.records.iter().collect();
    let kpis = Kpis::compute(&records);

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "month": table.month_label,
                "days": table.day_labels,
                "skipped": analysis.consolidation.skipped,
                "summary": analysis.cross.summary,
                "providers": analysis.stats,
                "kpis": kpis,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Table => {
            print_skipped(&analysis.consolidation.skipped);
            println!(
                "{} {} ({} days, {} rows)",
                "Month:".cyan().bold(),
                table.month_label,
                table.day_labels.len(),
                table.len()
            );

            let s = &analysis.cross.summary;
            println!("\n{}", "Physician visits".cyan().bold());
            println!("  total               {}", s.total_physician_rows);
            println!("  realized            {}", s.realized_physician_rows);
            println!("  excluded by status  {}", s.excluded_physician_rows);
            println!("  with technician     {}", s.matched.to_string().green());
            println!("  without technician  {}", s.bypassed.to_string().red());

            println!("\n{}", "By provider".cyan().bold());
            for p in &analysis.stats {
                println!(
                    "  {:<32} {:>5} {:>6}% {:>6}%",
                    p.provider,
                    p.total_visits,
                    p.matched_pct.to_string().green(),
                    p.bypassed_pct.to_string().red()
                );
            }

            println!("\n{}", "Indicators".cyan().bold());
            println!("  realized visits     {}", kpis.realized_visits);
            println!("  average per day     {:.2}", kpis.average_per_day);
            println!("  no-show             {}%", kpis.no_show_pct);
            println!("  dropout             {}%", kpis.dropout_pct);

            let top = visits_by_provider(&records);
            if let Some((provider, count)) = top.first() {
                println!("  busiest provider    {provider} ({count})");
            }
            let no_show = status_share_by_provider(&records, StatusCategory::NoShow);
            if let Some(share) = no_show.first().filter(|s| s.count > 0) {
                println!(
                    "  highest no-show     {} ({}%)",
                    share.provider, share.pct
                );
            }
        }
    }
    Ok(())
}

fn print_skipped(skipped: &[(String, String)]) {
    for (sheet, reason) in skipped {
        println!("{} skipped sheet '{sheet}': {reason}", "Warning:".yellow().bold());
    }
}

fn export(input: &Path, output: &Path, filter: &FilterArgs, config: &AnalysisConfig) -> Result<()> {
    let consolidation = consolidate_file(input, config)
        .with_context(|| format!("Failed to consolidate {}", input.display()))?;
    print_skipped(&consolidation.skipped);

    let table = &consolidation.table;
    let view = filter.criteria(table).apply(table);
    let rows = view.len();
    let sheet = table.view_to_sheet(view)?;

    let is_xlsx = output
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));
    if is_xlsx {
        let mut book = Book::new();
        book.add_sheet("Consolidado", sheet)?;
        book.save_as_xlsx(output)
    } else {
        sheet.save_as_csv(output)
    }
    .with_context(|| format!("Failed to write {}", output.display()))?;

    info!(path = %output.display(), rows, "Exported consolidated view");
    println!("{} {rows} rows to {}", "Exported".green().bold(), output.display());
    Ok(())
}
