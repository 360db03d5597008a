//! Cross-reference report: workbook sheets and charts.

use crate::error::{AttendanceError, Result};
use crate::matching::MatchedVisit;
use crate::stats::ProviderStats;
use attendance_sheet::{Book, CellValue, Sheet};
use attendance_viz::{
    ChartFiles, ChartKind, ChartOptions, ChartSpec, Dataset, BYPASSED_COLOR, MATCHED_COLOR,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const INVESTIGATION_SHEET: &str = "Pacientes para Investigação";
pub const STATS_SHEET: &str = "Estatísticas por Médico";
pub const ALL_VISITS_SHEET: &str = "Todos Atendimentos Médicos";

/// Stem of the chart covering every provider.
pub const ALL_PROVIDERS_CHART: &str = "Todos_Medicos";

const VISIT_COLUMNS: [&str; 5] = [
    "Paciente",
    "Prontuário",
    "Dia de Atendimento",
    "Médico",
    "Status do Atendimento",
];
const WENT_THROUGH: &str = "Passou pelo Técnico";
const SKIPPED: &str = "Não Passou pelo Técnico";

/// Visits ordered by provider, then day, then patient name.
fn sorted_visits<'a, I>(visits: I) -> Vec<&'a MatchedVisit>
where
    I: IntoIterator<Item = &'a MatchedVisit>,
{
    let mut sorted: Vec<&MatchedVisit> = visits.into_iter().collect();
    sorted.sort_by(|a, b| {
        let (a, b) = (&a.record, &b.record);
        a.provider
            .cmp(&b.provider)
            .then_with(|| a.day_label.cmp(&b.day_label))
            .then_with(|| a.patient_name.cmp(&b.patient_name))
    });
    sorted
}

fn visit_row(visit: &MatchedVisit) -> Vec<CellValue> {
    let record = &visit.record;
    vec![
        CellValue::from(record.patient_name.as_str()),
        record
            .patient_id
            .as_ref()
            .map_or(CellValue::Null, |id| CellValue::from(id.as_str())),
        CellValue::from(record.day_label.as_str()),
        CellValue::from(record.provider.as_str()),
        record
            .status
            .as_deref()
            .map_or(CellValue::Null, CellValue::from),
    ]
}

/// Bypassed visits only.
pub fn investigation_sheet(visits: &[MatchedVisit]) -> Result<Sheet> {
    let mut sheet = Sheet::with_header(INVESTIGATION_SHEET, &VISIT_COLUMNS);
    for visit in sorted_visits(visits.iter().filter(|v| v.bypassed_technician)) {
        sheet.row_append(visit_row(visit))?;
    }
    Ok(sheet)
}

/// Per-provider statistics, in the order given.
pub fn stats_sheet(stats: &[ProviderStats]) -> Result<Sheet> {
    let header = [
        "Médico",
        "Total de Atendimentos",
        WENT_THROUGH,
        SKIPPED,
        "% Passou pelo Técnico",
        "% Não Passou pelo Técnico",
    ];
    let mut sheet = Sheet::with_header(STATS_SHEET, &header);
    for s in stats {
        sheet.row_append(vec![
            CellValue::from(s.provider.as_str()),
            CellValue::from(s.total_visits),
            CellValue::from(s.matched_count),
            CellValue::from(s.bypassed_count),
            CellValue::from(s.matched_pct),
            CellValue::from(s.bypassed_pct),
        ])?;
    }
    Ok(sheet)
}

/// Every realized physician visit with whether it went through the technician.
pub fn all_visits_sheet(visits: &[MatchedVisit]) -> Result<Sheet> {
    let header: Vec<&str> = VISIT_COLUMNS.into_iter().chain([WENT_THROUGH]).collect();
    let mut sheet = Sheet::with_header(ALL_VISITS_SHEET, &header);
    for visit in sorted_visits(visits) {
        let mut row = visit_row(visit);
        row.push(CellValue::Bool(!visit.bypassed_technician));
        sheet.row_append(row)?;
    }
    Ok(sheet)
}

/// The three-sheet report workbook.
pub fn build_report_book(visits: &[MatchedVisit], stats: &[ProviderStats]) -> Result<Book> {
    let mut book = Book::with_name("cruzamento_atendimentos");
    book.add_sheet(INVESTIGATION_SHEET, investigation_sheet(visits)?)?;
    book.add_sheet(STATS_SHEET, stats_sheet(stats)?)?;
    book.add_sheet(ALL_VISITS_SHEET, all_visits_sheet(visits)?)?;
    Ok(book)
}

/// Write the report workbook as xlsx.
pub fn write_report(path: &Path, visits: &[MatchedVisit], stats: &[ProviderStats]) -> Result<()> {
    let book = build_report_book(visits, stats)?;
    book.save_as_xlsx(path)?;
    info!(
        path = %path.display(),
        investigate = visits.iter().filter(|v| v.bypassed_technician).count(),
        "Wrote cross-reference workbook"
    );
    Ok(())
}

/// Bar chart of one provider's matched vs bypassed visits.
pub fn provider_chart(stats: &ProviderStats) -> Result<ChartSpec> {
    let mut chart = ChartSpec::new(
        ChartKind::Bar,
        format!("Atendimentos Médicos - {}", stats.provider),
    )
    .with_labels([
        format!("{WENT_THROUGH} ({}%)", stats.matched_pct),
        format!("{SKIPPED} ({}%)", stats.bypassed_pct),
    ])
    .with_options(ChartOptions {
        subtitle: Some(format!("Total: {} atendimentos", stats.total_visits)),
        y_axis_label: Some("Quantidade de Atendimentos".to_string()),
        ..ChartOptions::default()
    });

    chart
        .push_dataset(
            Dataset::new(
                "Atendimentos",
                vec![stats.matched_count as f64, stats.bypassed_count as f64],
            )
            .with_colors(&[MATCHED_COLOR, BYPASSED_COLOR]),
        )
        .map_err(chart_error)?;
    Ok(chart)
}

/// Stacked bar chart across all providers.
pub fn all_providers_chart(stats: &[ProviderStats]) -> Result<ChartSpec> {
    let total: usize = stats.iter().map(|s| s.total_visits).sum();
    let mut chart = ChartSpec::new(
        ChartKind::Bar,
        "Cruzamento de Atendimentos - Todos os Médicos",
    )
    .with_labels(stats.iter().map(|s| s.provider.clone()))
    .with_options(ChartOptions {
        subtitle: Some(format!("Total de atendimentos médicos: {total}")),
        x_axis_label: Some("Médico".to_string()),
        y_axis_label: Some("Quantidade de Atendimentos".to_string()),
        show_legend: true,
        stacked: true,
        horizontal: false,
    });

    let matched = stats.iter().map(|s| s.matched_count as f64).collect();
    let bypassed = stats.iter().map(|s| s.bypassed_count as f64).collect();
    chart
        .push_dataset(Dataset::new(WENT_THROUGH, matched).with_color(MATCHED_COLOR))
        .map_err(chart_error)?;
    chart
        .push_dataset(Dataset::new(SKIPPED, bypassed).with_color(BYPASSED_COLOR))
        .map_err(chart_error)?;
    Ok(chart)
}

/// Write one chart per provider plus the combined chart into `dir`.
///
/// Returns the paths of the files written.
pub fn write_charts(dir: &Path, stats: &[ProviderStats]) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for s in stats {
        let files = provider_chart(s)?
            .save(dir, &s.provider)
            .map_err(chart_error)?;
        debug!(provider = %s.provider, path = %files.html.display(), "Wrote provider chart");
        push_files(&mut written, files);
    }

    let files = all_providers_chart(stats)?
        .save(dir, ALL_PROVIDERS_CHART)
        .map_err(chart_error)?;
    push_files(&mut written, files);

    info!(dir = %dir.display(), charts = stats.len() + 1, "Wrote charts");
    Ok(written)
}

fn push_files(written: &mut Vec<PathBuf>, files: ChartFiles) {
    written.push(files.html);
    written.push(files.json);
}

fn chart_error(e: attendance_viz::VizError) -> AttendanceError {
    AttendanceError::Export(e.to_string())
}
