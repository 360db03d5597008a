use crate::book::Book;
use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use crate::sheet::Sheet;
use calamine::{open_workbook_auto_from_rs, Data, Reader, Sheets};
use chrono::NaiveDateTime;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::io::Cursor;
use std::path::Path;

/// Options for reading Excel files
#[derive(Debug, Clone, Default)]
pub struct XlsxReadOptions {
    /// Whether the first row contains headers
    pub has_headers: bool,
}

impl XlsxReadOptions {
    /// Set whether the first row contains headers
    #[must_use]
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }
}

/// Convert calamine Data to CellValue
fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Null,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map_or(CellValue::Float(dt.as_f64()), CellValue::DateTime),
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map_or_else(|| CellValue::String(s.clone()), CellValue::DateTime),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(format!("#ERROR: {e:?}")),
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// A spreadsheet workbook held in memory (xlsx, xlsm, xls or ods).
///
/// Opening only parses the workbook directory; sheets are decoded one at a
/// time so a damaged sheet does not prevent reading the others.
pub struct XlsxWorkbook {
    inner: Sheets<Cursor<Vec<u8>>>,
    sheet_names: Vec<String>,
}

impl XlsxWorkbook {
    /// Open a workbook from a file on disk
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is not a workbook.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_bytes(bytes)
    }

    /// Open a workbook from raw bytes (e.g. an uploaded file)
    ///
    /// # Errors
    ///
    /// Returns error if the bytes are not a supported workbook format.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let inner = open_workbook_auto_from_rs(Cursor::new(bytes))?;
        let sheet_names = inner.sheet_names();
        Ok(XlsxWorkbook { inner, sheet_names })
    }

    /// Sheet names in workbook order
    #[must_use]
    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    /// Read one sheet
    ///
    /// # Errors
    ///
    /// Returns error if the sheet is missing, cannot be decoded, or has
    /// duplicate header names when `has_headers` is set.
    pub fn read_sheet(&mut self, sheet_name: &str, options: &XlsxReadOptions) -> Result<Sheet> {
        if !self.sheet_names.iter().any(|n| n == sheet_name) {
            return Err(SheetError::SheetNotFound {
                name: sheet_name.to_string(),
            });
        }

        let range = self.inner.worksheet_range(sheet_name)?;

        let data: Vec<Vec<CellValue>> = range
            .rows()
            .map(|row| row.iter().map(data_to_cell_value).collect())
            .collect();

        let mut sheet = Sheet::with_name(sheet_name);
        *sheet.data_mut() = data;

        if options.has_headers && sheet.row_count() > 0 {
            sheet.name_columns_by_row(0)?;
        }

        Ok(sheet)
    }

    /// Read a single cell by absolute (0-based) position.
    ///
    /// Cells outside the used range read as `Null`.
    pub fn read_cell(&mut self, sheet_name: &str, row: u32, col: u32) -> Result<CellValue> {
        let range = self.inner.worksheet_range(sheet_name)?;
        Ok(range
            .get_value((row, col))
            .map_or(CellValue::Null, data_to_cell_value))
    }
}

impl Book {
    /// Save the book to an Excel file
    ///
    /// A sheet with named columns gets a bold header row.
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be created or written.
    pub fn save_as_xlsx<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();

        for (name, sheet) in self.sheets() {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(name)?;
            write_to_worksheet(sheet, worksheet, &header_format)?;
        }

        workbook.save(path.as_ref())?;
        Ok(())
    }
}

/// Write sheet data to a worksheet
fn write_to_worksheet(sheet: &Sheet, worksheet: &mut Worksheet, header: &Format) -> Result<()> {
    let has_header = sheet.column_names().is_some();

    for (row_idx, row) in sheet.rows().enumerate() {
        let row_num = u32::try_from(row_idx)
            .map_err(|_| SheetError::Workbook("Row index overflow".to_string()))?;

        for (col_idx, cell) in row.iter().enumerate() {
            let col_num = u16::try_from(col_idx)
                .map_err(|_| SheetError::Workbook("Column index overflow".to_string()))?;

            if has_header && row_idx == 0 {
                worksheet.write_string_with_format(row_num, col_num, cell.as_str(), header)?;
                continue;
            }

            match cell {
                CellValue::Null => {} // Leave empty
                CellValue::Bool(b) => {
                    worksheet.write_boolean(row_num, col_num, *b)?;
                }
                CellValue::Int(i) => {
                    // Note: Excel stores all numbers as f64, so integers > 2^53
                    // may lose precision
                    worksheet.write_number(row_num, col_num, *i as f64)?;
                }
                CellValue::Float(f) => {
                    worksheet.write_number(row_num, col_num, *f)?;
                }
                CellValue::String(s) => {
                    worksheet.write_string(row_num, col_num, s)?;
                }
                CellValue::DateTime(_) => {
                    worksheet.write_string(row_num, col_num, cell.as_str())?;
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_book_xlsx_roundtrip_keeps_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("book.xlsx");

        let mut book = Book::new();
        book.add_sheet("Dia 02", Sheet::from_data(vec![vec![1, 2, 3]]))
            .unwrap();
        book.add_sheet("Dia 01", Sheet::from_data(vec![vec!["a", "b", "c"]]))
            .unwrap();
        book.save_as_xlsx(&path).unwrap();

        let mut workbook = XlsxWorkbook::open(&path).unwrap();
        assert_eq!(workbook.sheet_names(), ["Dia 02", "Dia 01"]);

        let first = workbook
            .read_sheet("Dia 01", &XlsxReadOptions::default())
            .unwrap();
        assert_eq!(first.get(0, 2).unwrap().as_str(), "c");
    }

    #[test]
    fn test_read_sheet_with_headers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("headers.xlsx");

        let mut book = Book::new();
        let mut sheet = Sheet::from_data(vec![
            vec![CellValue::from("Paciente"), CellValue::from("Número Prontuário")],
            vec![CellValue::from("Ana"), CellValue::Int(123)],
        ]);
        sheet.name_columns_by_row(0).unwrap();
        book.add_sheet("Dia 01", sheet).unwrap();
        book.save_as_xlsx(&path).unwrap();

        let mut workbook = XlsxWorkbook::open(&path).unwrap();
        let loaded = workbook
            .read_sheet("Dia 01", &XlsxReadOptions::default().with_headers(true))
            .unwrap();

        assert_eq!(loaded.data_rows().count(), 1);
        // Integers come back as floats from Excel
        assert_eq!(
            loaded.get_by_name(1, "Número Prontuário").unwrap().as_int(),
            Some(123)
        );
    }

    #[test]
    fn test_read_cell_and_missing_sheet() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cell.xlsx");

        let mut book = Book::new();
        book.add_sheet("Mês", Sheet::from_data(vec![vec!["Março"]]))
            .unwrap();
        book.save_as_xlsx(&path).unwrap();

        let mut workbook = XlsxWorkbook::open(&path).unwrap();
        assert_eq!(
            workbook.read_cell("Mês", 0, 0).unwrap(),
            CellValue::String("Março".to_string())
        );
        assert!(workbook.read_cell("Mês", 5, 5).unwrap().is_null());
        assert!(matches!(
            workbook.read_sheet("Nope", &XlsxReadOptions::default()),
            Err(SheetError::SheetNotFound { .. })
        ));
    }

    #[test]
    fn test_not_a_workbook() {
        let result = XlsxWorkbook::from_bytes(b"plain text".to_vec());
        assert!(matches!(result, Err(SheetError::Workbook(_))));
    }
}
