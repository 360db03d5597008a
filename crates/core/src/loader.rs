//! Workbook loading: day-sheet discovery and month-marker detection.

use crate::config::AnalysisConfig;
use crate::error::{AttendanceError, Result};
use attendance_sheet::{Book, CellValue, Sheet, XlsxReadOptions, XlsxWorkbook};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use std::path::Path;
use tracing::{debug, info, warn};

/// Month names indexed by calendar month (0 = January).
pub const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// A tabular workbook the loader can read sheet by sheet.
pub trait WorkbookSource {
    /// Sheet names in workbook order.
    fn sheet_names(&self) -> Vec<String>;

    /// Read one sheet with its first row naming the columns.
    fn read_table(&mut self, name: &str) -> attendance_sheet::Result<Sheet>;

    /// Read cell A1 of a sheet. Empty sheets read as `Null`.
    fn read_first_cell(&mut self, name: &str) -> attendance_sheet::Result<CellValue>;
}

impl WorkbookSource for XlsxWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        XlsxWorkbook::sheet_names(self).to_vec()
    }

    fn read_table(&mut self, name: &str) -> attendance_sheet::Result<Sheet> {
        self.read_sheet(name, &XlsxReadOptions::default().with_headers(true))
    }

    fn read_first_cell(&mut self, name: &str) -> attendance_sheet::Result<CellValue> {
        self.read_cell(name, 0, 0)
    }
}

impl WorkbookSource for Book {
    fn sheet_names(&self) -> Vec<String> {
        Book::sheet_names(self)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    fn read_table(&mut self, name: &str) -> attendance_sheet::Result<Sheet> {
        let mut sheet = self.get_sheet(name)?.clone();
        if sheet.column_names().is_none() && !sheet.is_empty() {
            sheet.name_columns_by_row(0)?;
        }
        Ok(sheet)
    }

    fn read_first_cell(&mut self, name: &str) -> attendance_sheet::Result<CellValue> {
        let sheet = self.get_sheet(name)?;
        Ok(sheet.get(0, 0).cloned().unwrap_or(CellValue::Null))
    }
}

/// Result of reading a workbook.
#[derive(Debug, Clone, Default)]
pub struct LoadedWorkbook {
    /// Every sheet in the file, in workbook order.
    pub sheet_names: Vec<String>,
    /// Day sheets that parsed, keyed by their sheet name.
    pub day_tables: Book,
    /// Month detected from the marker sheet.
    pub month: Option<String>,
    /// Day sheets that failed to parse, with the reason.
    pub skipped: Vec<(String, String)>,
}

/// Read the day sheets and the month marker from a workbook source.
///
/// Individual day sheets that fail to parse are skipped with a warning.
/// Fails with `NoDataSheets` only when no sheet name carries the day prefix.
pub fn load_workbook<S: WorkbookSource>(
    source: &mut S,
    config: &AnalysisConfig,
) -> Result<LoadedWorkbook> {
    let rules = &config.sheets;
    let sheet_names = source.sheet_names();

    let day_names: Vec<&String> = sheet_names
        .iter()
        .filter(|name| rules.is_day_sheet(name))
        .collect();
    if day_names.is_empty() {
        return Err(AttendanceError::NoDataSheets {
            available: sheet_names.clone(),
        });
    }

    let month = detect_month(source, &sheet_names, config);

    let mut day_tables = Book::new();
    let mut skipped = Vec::new();

    for name in day_names {
        match source.read_table(name) {
            Ok(sheet) if sheet.column_names().is_none() => {
                debug!(sheet = %name, "Empty day sheet contributes no rows");
            }
            Ok(sheet) => {
                debug!(sheet = %name, rows = sheet.row_count().saturating_sub(1), "Read day sheet");
                day_tables.add_sheet(name, sheet)?;
            }
            Err(e) => {
                let failure = AttendanceError::SheetReadFailure {
                    sheet: name.clone(),
                    reason: e.to_string(),
                };
                warn!("{failure}; skipping");
                skipped.push((name.clone(), e.to_string()));
            }
        }
    }

    info!(
        sheets = sheet_names.len(),
        day_sheets = day_tables.sheet_count(),
        skipped = skipped.len(),
        month = month.as_deref().unwrap_or("-"),
        "Loaded workbook"
    );

    Ok(LoadedWorkbook {
        sheet_names,
        day_tables,
        month,
        skipped,
    })
}

/// Open a workbook file and load it.
pub fn load_path<P: AsRef<Path>>(path: P, config: &AnalysisConfig) -> Result<LoadedWorkbook> {
    let mut workbook = XlsxWorkbook::open(path.as_ref())?;
    load_workbook(&mut workbook, config)
}

/// Load a workbook held in memory (e.g. an upload).
pub fn load_bytes(bytes: Vec<u8>, config: &AnalysisConfig) -> Result<LoadedWorkbook> {
    let mut workbook = XlsxWorkbook::from_bytes(bytes)?;
    load_workbook(&mut workbook, config)
}

/// Find the month from A1 of the marker sheets. When several resolve, the
/// last one in workbook order wins.
fn detect_month<S: WorkbookSource>(
    source: &mut S,
    sheet_names: &[String],
    config: &AnalysisConfig,
) -> Option<String> {
    let mut month: Option<String> = None;

    for name in sheet_names
        .iter()
        .filter(|name| config.sheets.is_month_candidate(name))
    {
        let cell = match source.read_first_cell(name) {
            Ok(cell) => cell,
            Err(e) => {
                debug!(sheet = %name, error = %e, "Month marker unreadable");
                continue;
            }
        };

        match (resolve_month(&cell), &month) {
            (Some(found), None) => {
                debug!(sheet = %name, month = found, "Month marker found");
                month = Some(found.to_string());
            }
            (Some(found), Some(previous)) => {
                debug!(
                    sheet = %name,
                    month = found,
                    previous = %previous,
                    "Later month marker replaces earlier one"
                );
                month = Some(found.to_string());
            }
            (None, _) => debug!(sheet = %name, "Sheet A1 is not a month marker"),
        }
    }

    month
}

/// Resolve a marker cell to a month name.
///
/// Dates (Excel dates, ISO strings or `dd/mm/yyyy`) map by calendar month;
/// text equal to a month name is taken as is.
pub fn resolve_month(cell: &CellValue) -> Option<&'static str> {
    match cell {
        CellValue::DateTime(dt) => month_name(dt.month0()),
        CellValue::String(s) => {
            let text = s.trim();
            parse_date_text(text)
                .and_then(|d| month_name(d.month0()))
                .or_else(|| MONTH_NAMES.iter().copied().find(|m| *m == text))
        }
        _ => None,
    }
}

fn month_name(month0: u32) -> Option<&'static str> {
    MONTH_NAMES.get(usize::try_from(month0).ok()?).copied()
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];
    const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(text, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
                .map(|dt| dt.date())
        })
}
