//! Consolidation of day sheets into one typed table.

use crate::config::AnalysisConfig;
use crate::day::{canonical_day_label, day_number};
use crate::error::{AttendanceError, Result};
use crate::loader::LoadedWorkbook;
use crate::record::{AttendanceRecord, PatientId, NOT_INFORMED};
use attendance_sheet::{CellValue, ConsolidateOptions, Sheet};
use indexmap::IndexSet;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Column holding the source sheet name while stacking. A source column of
/// the same name is overwritten by the sheet name.
const SOURCE_COLUMN: &str = "Dia";

/// Derived columns appended by [`ConsolidatedTable::to_sheet`].
pub const DERIVED_COLUMNS: [&str; 5] = [
    "Dia",
    "Dia_Numero",
    "Dia_Atendimento",
    "Mês",
    "Status_Consolidado",
];

/// Positions of the known fields among the source columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldPositions {
    pub patient_id: Option<usize>,
    pub patient_name: Option<usize>,
    pub provider: usize,
    pub specialty: usize,
    pub status: usize,
}

/// The consolidated dataset for one workbook. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsolidatedTable {
    /// Outer union of the day sheets' columns, first-seen order.
    pub columns: Vec<String>,
    pub records: Vec<AttendanceRecord>,
    pub month_label: String,
    /// Canonical day labels in sheet order.
    pub day_labels: Vec<String>,
    fields: FieldPositions,
}

/// Stack the loaded day sheets and derive the typed fields.
pub fn consolidate(loaded: &LoadedWorkbook, config: &AnalysisConfig) -> Result<ConsolidatedTable> {
    if loaded.day_tables.is_empty() {
        return Err(AttendanceError::NoDataSheets {
            available: loaded.sheet_names.clone(),
        });
    }

    let options = config.sheets.dropped_columns.iter().fold(
        ConsolidateOptions::default().with_source_column(SOURCE_COLUMN),
        |opts, column| opts.dropping(column),
    );
    let stacked = loaded.day_tables.consolidate_with_options(&options)?;

    let columns: Vec<String> = stacked
        .column_names()
        .map(|names| names.iter().skip(1).cloned().collect())
        .unwrap_or_default();

    let fields = locate_fields(&columns, config)?;
    let month_label = loaded
        .month
        .clone()
        .unwrap_or_else(|| NOT_INFORMED.to_string());

    let mut records = Vec::with_capacity(stacked.row_count());
    let mut blank_rows = 0usize;

    for row in stacked.data_rows() {
        let Some((source, cells)) = row.split_first() else {
            continue;
        };
        if cells.iter().all(CellValue::is_blank) {
            blank_rows += 1;
            continue;
        }
        let sheet_name = source.as_str();
        records.push(build_record(
            &sheet_name,
            cells.to_vec(),
            &fields,
            &month_label,
            config,
        ));
    }

    if blank_rows > 0 {
        debug!(blank_rows, "Dropped fully blank rows");
    }

    let day_labels: IndexSet<String> = loaded
        .day_tables
        .sheet_names()
        .into_iter()
        .map(canonical_day_label)
        .collect();

    info!(
        records = records.len(),
        columns = columns.len(),
        days = day_labels.len(),
        month = %month_label,
        "Consolidated day sheets"
    );

    Ok(ConsolidatedTable {
        columns,
        records,
        month_label,
        day_labels: day_labels.into_iter().collect(),
        fields,
    })
}

fn locate_fields(columns: &[String], config: &AnalysisConfig) -> Result<FieldPositions> {
    let position = |name: &str| columns.iter().position(|c| c == name);
    let require = |name: &str| {
        position(name).ok_or_else(|| AttendanceError::missing_column(name, columns))
    };

    let names = &config.columns;
    Ok(FieldPositions {
        patient_id: position(&names.patient_id),
        patient_name: position(&names.patient_name),
        provider: require(&names.provider)?,
        specialty: require(&names.specialty)?,
        status: require(&names.status)?,
    })
}

fn build_record(
    sheet_name: &str,
    cells: Vec<CellValue>,
    fields: &FieldPositions,
    month_label: &str,
    config: &AnalysisConfig,
) -> AttendanceRecord {
    let text = |pos: usize| cells.get(pos).and_then(CellValue::as_text);

    let patient_id = fields
        .patient_id
        .and_then(|p| cells.get(p))
        .and_then(|cell| PatientId::from_cell(cell, config.patient_id_width));
    let patient_name = fields.patient_name.and_then(text).unwrap_or_default();
    let provider = text(fields.provider).unwrap_or_else(|| NOT_INFORMED.to_string());
    let specialty = text(fields.specialty).unwrap_or_else(|| NOT_INFORMED.to_string());
    let status = text(fields.status);

    let status_realized = config.statuses.is_realized(status.as_deref());
    let status_consolidated = config.statuses.classify(status.as_deref());

    AttendanceRecord {
        sheet_name: sheet_name.to_string(),
        patient_id,
        patient_name,
        provider,
        specialty,
        status,
        status_realized,
        status_consolidated,
        day_label: canonical_day_label(sheet_name),
        day_number: day_number(sheet_name),
        month_label: month_label.to_string(),
        cells,
    }
}

impl ConsolidatedTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn fields(&self) -> &FieldPositions {
        &self.fields
    }

    /// Distinct providers, sorted.
    pub fn providers(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.provider.as_str()))
    }

    /// Distinct specialties ("teams"), sorted.
    pub fn specialties(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.specialty.as_str()))
    }

    /// Distinct informed months, sorted.
    pub fn months(&self) -> Vec<String> {
        distinct(
            self.records
                .iter()
                .map(|r| r.month_label.as_str())
                .filter(|m| *m != NOT_INFORMED),
        )
    }

    /// Month shown as the file's reference: the alphabetically first informed month.
    pub fn reference_month(&self) -> Option<String> {
        self.months().into_iter().next()
    }

    /// Render the table with canonical ids, filled provider/specialty and
    /// the derived columns appended.
    pub fn to_sheet(&self) -> Result<Sheet> {
        sheet_of(&self.columns, &self.fields, self.records.iter())
    }

    /// Render a subset of records (a filtered view) the same way as [`Self::to_sheet`].
    pub fn view_to_sheet<'a, I>(&self, records: I) -> Result<Sheet>
    where
        I: IntoIterator<Item = &'a AttendanceRecord>,
    {
        sheet_of(&self.columns, &self.fields, records)
    }
}

fn sheet_of<'a, I>(columns: &[String], fields: &FieldPositions, records: I) -> Result<Sheet>
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    // Derived columns replace source columns of the same name.
    let kept: Vec<bool> = columns
        .iter()
        .map(|c| !DERIVED_COLUMNS.contains(&c.as_str()))
        .collect();

    let header: Vec<&str> = columns
        .iter()
        .zip(&kept)
        .filter(|(_, keep)| **keep)
        .map(|(c, _)| c.as_str())
        .chain(DERIVED_COLUMNS)
        .collect();
    let mut sheet = Sheet::with_header("Consolidado", &header);

    for record in records {
        let mut cells = record.cells.clone();
        cells.resize(columns.len(), CellValue::Null);

        if let Some(p) = fields.patient_id {
            cells[p] = record
                .patient_id
                .as_ref()
                .map_or(CellValue::Null, |id| CellValue::from(id.as_str()));
        }
        cells[fields.provider] = CellValue::from(record.provider.as_str());
        cells[fields.specialty] = CellValue::from(record.specialty.as_str());

        let mut row: Vec<CellValue> = cells
            .into_iter()
            .zip(&kept)
            .filter_map(|(cell, keep)| (*keep).then_some(cell))
            .collect();
        row.extend([
            CellValue::from(record.sheet_name.as_str()),
            record.day_number.map_or(CellValue::Null, CellValue::from),
            CellValue::from(record.day_label.as_str()),
            CellValue::from(record.month_label.as_str()),
            CellValue::from(record.status_consolidated.label()),
        ]);
        sheet.row_append(row)?;
    }

    Ok(sheet)
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_workbook;
    use crate::record::StatusCategory;
    use attendance_sheet::Book;

    const HEADER: [&str; 6] = [
        "Unnamed: 0",
        "Número Prontuário",
        "Paciente",
        "Profissional",
        "Especialidade",
        "Status",
    ];

    fn day(rows: &[[CellValue; 6]]) -> Sheet {
        let mut data = vec![HEADER.iter().map(|h| CellValue::from(*h)).collect::<Vec<_>>()];
        data.extend(rows.iter().map(|r| r.to_vec()));
        Sheet::from_data(data)
    }

    fn row(id: CellValue, provider: Option<&str>, status: Option<&str>) -> [CellValue; 6] {
        [
            CellValue::Int(0),
            id,
            CellValue::from("Ana"),
            provider.map_or(CellValue::Null, CellValue::from),
            CellValue::from("MÉDICO DA ESTRATÉGIA DE SAÚDE DA FAMÍLIA"),
            status.map_or(CellValue::Null, CellValue::from),
        ]
    }

    fn build(book: &mut Book) -> ConsolidatedTable {
        let config = AnalysisConfig::default();
        let loaded = load_workbook(book, &config).unwrap();
        consolidate(&loaded, &config).unwrap()
    }

    #[test]
    fn test_consolidate_derives_fields() {
        let mut book = Book::new();
        book.add_sheet("Março", Sheet::from_data(vec![vec!["Março"]]))
            .unwrap();
        book.add_sheet(
            "Dia 5",
            day(&[
                row(CellValue::Int(123), Some("DRA ANA"), Some("ATENDIMENTO FINALIZADO")),
                row(CellValue::from("0456"), None, Some("FALTOSO")),
            ]),
        )
        .unwrap();
        book.add_sheet("Dia extra", day(&[row(CellValue::Null, None, None)]))
            .unwrap();

        let table = build(&mut book);

        assert_eq!(table.len(), 3);
        assert!(!table.columns.contains(&"Unnamed: 0".to_string()));
        assert_eq!(table.month_label, "Março");
        assert_eq!(table.day_labels, vec!["Dia 05", "Dia extra"]);

        let first = &table.records[0];
        assert_eq!(first.patient_id.as_ref().unwrap().as_str(), "0000000123");
        assert_eq!(first.day_label, "Dia 05");
        assert_eq!(first.day_number, Some(5));
        assert_eq!(first.sheet_name, "Dia 5");
        assert!(first.status_realized);
        assert_eq!(first.status_consolidated, StatusCategory::VisitOccurred);

        let second = &table.records[1];
        assert_eq!(second.provider, NOT_INFORMED);
        assert_eq!(second.status_consolidated, StatusCategory::NoShow);

        let third = &table.records[2];
        assert_eq!(third.day_label, "Dia extra");
        assert_eq!(third.day_number, None);
        assert!(third.patient_id.is_none());
        assert_eq!(third.status_consolidated, StatusCategory::NotInformed);
    }

    #[test]
    fn test_missing_month_is_not_informed() {
        let mut book = Book::new();
        book.add_sheet("Dia 01", day(&[row(CellValue::Int(1), Some("X"), None)]))
            .unwrap();

        let table = build(&mut book);
        assert_eq!(table.month_label, NOT_INFORMED);
        assert_eq!(table.reference_month(), None);
    }

    #[test]
    fn test_missing_specialty_column_is_reported() {
        let mut book = Book::new();
        book.add_sheet(
            "Dia 01",
            Sheet::from_data(vec![vec!["Profissional", "Status"], vec!["X", "AGENDADO"]]),
        )
        .unwrap();

        let config = AnalysisConfig::default();
        let loaded = load_workbook(&mut book, &config).unwrap();
        let err = consolidate(&loaded, &config).unwrap_err();

        match err {
            AttendanceError::MissingExpectedColumn { column, available } => {
                assert_eq!(column, "Especialidade");
                assert_eq!(available, vec!["Profissional", "Status"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_all_sheets_skipped_is_no_data() {
        let loaded = LoadedWorkbook {
            sheet_names: vec!["Dia 01".to_string()],
            ..LoadedWorkbook::default()
        };
        let err = consolidate(&loaded, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, AttendanceError::NoDataSheets { .. }));
    }

    #[test]
    fn test_consolidation_is_idempotent() {
        let mut book = Book::new();
        book.add_sheet("Dia 01", day(&[row(CellValue::Int(7), Some("X"), Some("EVADIDO"))]))
            .unwrap();
        book.add_sheet("Dia 02", day(&[row(CellValue::Int(8), Some("Y"), Some("AGENDADO"))]))
            .unwrap();

        assert_eq!(build(&mut book.clone()), build(&mut book));
    }

    #[test]
    fn test_to_sheet_appends_derived_columns() {
        let mut book = Book::new();
        book.add_sheet(
            "Dia 3",
            day(&[row(CellValue::Float(42.0), None, Some("EVADIDO"))]),
        )
        .unwrap();

        let table = build(&mut book);
        let sheet = table.to_sheet().unwrap();

        let names = sheet.column_names().unwrap();
        assert_eq!(&names[names.len() - 5..], &DERIVED_COLUMNS);
        assert_eq!(
            sheet.get_by_name(1, "Número Prontuário").unwrap().as_str(),
            "0000000042"
        );
        assert_eq!(sheet.get_by_name(1, "Profissional").unwrap().as_str(), NOT_INFORMED);
        assert_eq!(sheet.get_by_name(1, "Dia").unwrap().as_str(), "Dia 3");
        assert_eq!(sheet.get_by_name(1, "Dia_Numero").unwrap(), &CellValue::Int(3));
        assert_eq!(sheet.get_by_name(1, "Dia_Atendimento").unwrap().as_str(), "Dia 03");
        assert_eq!(
            sheet.get_by_name(1, "Status_Consolidado").unwrap().as_str(),
            "Dropped_Out"
        );
    }

    #[test]
    fn test_source_day_and_month_columns_are_replaced() {
        let mut book = Book::new();
        book.add_sheet(
            "Dia 01",
            Sheet::from_data(vec![
                vec!["Dia", "Mês", "Profissional", "Especialidade", "Status"],
                vec!["segunda", "antigo", "DRA ANA", "MED", "AGENDADO"],
            ]),
        )
        .unwrap();
        book.add_sheet(
            "Dia 02",
            Sheet::from_data(vec![
                vec!["Profissional", "Especialidade", "Status"],
                vec!["DR RUI", "MED", "FALTOSO"],
            ]),
        )
        .unwrap();

        let table = build(&mut book);
        assert_eq!(table.len(), 2);
        assert_eq!(table.columns, vec!["Mês", "Profissional", "Especialidade", "Status"]);
        assert_eq!(table.records[0].sheet_name, "Dia 01");
        assert_eq!(table.records[1].day_label, "Dia 02");

        let sheet = table.to_sheet().unwrap();
        let names = sheet.column_names().unwrap();
        assert_eq!(names.iter().filter(|n| *n == "Dia").count(), 1);
        assert_eq!(names.iter().filter(|n| *n == "Mês").count(), 1);
        assert_eq!(names[0], "Profissional");
        assert_eq!(sheet.get_by_name(1, "Dia").unwrap().as_str(), "Dia 01");
        assert_eq!(sheet.get_by_name(1, "Mês").unwrap().as_str(), NOT_INFORMED);
    }
}
