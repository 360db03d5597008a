//! End-to-end batch runs: load, consolidate, cross-reference, report.

use crate::config::AnalysisConfig;
use crate::consolidate::{consolidate, ConsolidatedTable};
use crate::error::Result;
use crate::loader::load_path;
use crate::matching::{cross_reference, CrossReference};
use crate::report::{write_charts, write_report};
use crate::stats::{provider_stats, ProviderStats};
use std::path::{Path, PathBuf};

/// A consolidated file plus the day sheets that were skipped.
#[derive(Debug, Clone)]
pub struct Consolidation {
    pub table: ConsolidatedTable,
    pub skipped: Vec<(String, String)>,
}

/// Everything computed for one input file.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub consolidation: Consolidation,
    pub cross: CrossReference,
    pub stats: Vec<ProviderStats>,
}

/// Files produced by [`run_report`].
#[derive(Debug, Clone, Default)]
pub struct ReportFiles {
    pub workbook: PathBuf,
    pub charts: Vec<PathBuf>,
}

/// Load and consolidate one workbook file.
pub fn consolidate_file(path: &Path, config: &AnalysisConfig) -> Result<Consolidation> {
    let loaded = load_path(path, config)?;
    let table = consolidate(&loaded, config)?;
    Ok(Consolidation {
        table,
        skipped: loaded.skipped,
    })
}

/// Consolidate, cross-reference and aggregate one workbook file.
pub fn analyze_file(path: &Path, config: &AnalysisConfig) -> Result<Analysis> {
    let consolidation = consolidate_file(path, config)?;
    let cross = cross_reference(&consolidation.table, config)?;
    let stats = provider_stats(&cross.visits);
    Ok(Analysis {
        consolidation,
        cross,
        stats,
    })
}

/// Analyze a file and write the report workbook, plus charts when a
/// chart directory is given.
pub fn run_report(
    input: &Path,
    output: &Path,
    charts_dir: Option<&Path>,
    config: &AnalysisConfig,
) -> Result<(Analysis, ReportFiles)> {
    let analysis = analyze_file(input, config)?;

    write_report(output, &analysis.cross.visits, &analysis.stats)?;
    let charts = match charts_dir {
        Some(dir) => write_charts(dir, &analysis.stats)?,
        None => Vec::new(),
    };

    let files = ReportFiles {
        workbook: output.to_path_buf(),
        charts,
    };
    Ok((analysis, files))
}
