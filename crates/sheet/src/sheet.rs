use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use std::collections::HashMap;

/// A sheet representing a 2D grid of cells (row-major storage)
///
/// When columns are named from a header row, that row stays in the data as
/// row 0; [`Sheet::data_rows`] skips it.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    name: String,
    data: Vec<Vec<CellValue>>,
    column_names: Option<Vec<String>>,
    column_index: Option<HashMap<String, usize>>,
    header_row: Option<usize>,
}

impl Sheet {
    /// Create a new empty sheet
    #[must_use]
    pub fn new() -> Self {
        Self::with_name("Sheet1")
    }

    /// Create a new empty sheet with a name
    #[must_use]
    pub fn with_name(name: &str) -> Self {
        Sheet {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Create a sheet from a 2D vector of values
    #[must_use]
    pub fn from_data<T: Into<CellValue>>(data: Vec<Vec<T>>) -> Self {
        let converted: Vec<Vec<CellValue>> = data
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();

        let mut sheet = Sheet::new();
        sheet.data = converted;
        sheet
    }

    /// Create a sheet whose first row is the given header, with columns named
    #[must_use]
    pub fn with_header(name: &str, header: &[&str]) -> Self {
        let mut sheet = Sheet::with_name(name);
        sheet
            .data
            .push(header.iter().map(|h| CellValue::from(*h)).collect());
        sheet.set_column_names(header.iter().map(|h| (*h).to_string()).collect());
        sheet.header_row = Some(0);
        sheet
    }

    /// Get the sheet name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Get the number of rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Get the number of columns
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.data.first().map_or(0, Vec::len)
    }

    /// Check if the sheet is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // ===== Cell Access =====

    /// Get a cell value by row and column index (0-based)
    pub fn get(&self, row: usize, col: usize) -> Result<&CellValue> {
        self.data
            .get(row)
            .and_then(|r| r.get(col))
            .ok_or(SheetError::IndexOutOfBounds {
                row,
                col,
                rows: self.row_count(),
                cols: self.col_count(),
            })
    }

    /// Get a cell value by row index and column name
    pub fn get_by_name(&self, row: usize, col_name: &str) -> Result<&CellValue> {
        let col = self.column_index_by_name(col_name)?;
        self.get(row, col)
    }

    // ===== Row Operations =====

    /// Get an entire row by index (0-based)
    pub fn row(&self, index: usize) -> Result<&Vec<CellValue>> {
        self.data.get(index).ok_or(SheetError::RowIndexOutOfBounds {
            index,
            count: self.row_count(),
        })
    }

    /// Append a row to the end of the sheet
    pub fn row_append<T: Into<CellValue>>(&mut self, data: Vec<T>) -> Result<()> {
        let row: Vec<CellValue> = data.into_iter().map(Into::into).collect();

        // Ensure consistent column count
        if !self.data.is_empty() && row.len() != self.col_count() {
            return Err(SheetError::LengthMismatch {
                expected: self.col_count(),
                actual: row.len(),
            });
        }

        self.data.push(row);
        Ok(())
    }

    // ===== Named Access =====

    /// Use the specified row as column headers
    ///
    /// Blank header cells are named `Unnamed: <index>`, the way spreadsheet
    /// exports label an index column written without a title.
    ///
    /// # Errors
    ///
    /// Returns `SheetError::DuplicateColumnName` if the header row contains duplicate names.
    pub fn name_columns_by_row(&mut self, row_index: usize) -> Result<()> {
        let header_row = self.row(row_index)?;
        let names: Vec<String> = header_row
            .iter()
            .enumerate()
            .map(|(i, c)| c.as_text().unwrap_or_else(|| format!("Unnamed: {i}")))
            .collect();

        let mut seen = HashMap::new();
        for (i, name) in names.iter().enumerate() {
            if seen.insert(name.clone(), i).is_some() {
                return Err(SheetError::DuplicateColumnName { name: name.clone() });
            }
        }

        self.set_column_names(names);
        self.header_row = Some(row_index);
        Ok(())
    }

    fn set_column_names(&mut self, names: Vec<String>) {
        let index_map = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
        self.column_names = Some(names);
        self.column_index = Some(index_map);
    }

    /// Get column names (if set)
    #[must_use]
    pub fn column_names(&self) -> Option<&Vec<String>> {
        self.column_names.as_ref()
    }

    /// Position of a named column, if columns are named and the name exists
    #[must_use]
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.column_index.as_ref()?.get(name).copied()
    }

    /// Get the column index by name
    fn column_index_by_name(&self, name: &str) -> Result<usize> {
        self.column_index
            .as_ref()
            .ok_or_else(|| {
                SheetError::ColumnsNotNamed("Call name_columns_by_row() first".to_string())
            })?
            .get(name)
            .copied()
            .ok_or_else(|| SheetError::ColumnNotFound {
                name: name.to_string(),
            })
    }

    /// Get an entire column by name, header row excluded
    pub fn column_by_name(&self, name: &str) -> Result<Vec<CellValue>> {
        let index = self.column_index_by_name(name)?;
        Ok(self
            .data_rows()
            .map(|row| row.get(index).cloned().unwrap_or_default())
            .collect())
    }

    // ===== Iteration =====

    /// Iterate over all rows, header included
    pub fn rows(&self) -> impl Iterator<Item = &Vec<CellValue>> {
        self.data.iter()
    }

    /// Iterate over the rows below the header row (all rows when unnamed)
    pub fn data_rows(&self) -> impl Iterator<Item = &Vec<CellValue>> {
        let skip = self.header_row.map_or(0, |h| h + 1);
        self.data.iter().skip(skip)
    }

    /// Get the raw data
    #[must_use]
    pub fn data(&self) -> &Vec<Vec<CellValue>> {
        &self.data
    }

    /// Get mutable access to the raw data
    ///
    /// Column naming is dropped since the header row may change.
    pub fn data_mut(&mut self) -> &mut Vec<Vec<CellValue>> {
        self.column_names = None;
        self.column_index = None;
        self.header_row = None;
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sheet() {
        let sheet = Sheet::new();
        assert_eq!(sheet.name(), "Sheet1");
        assert!(sheet.is_empty());
        assert_eq!(sheet.row_count(), 0);
        assert_eq!(sheet.col_count(), 0);
    }

    #[test]
    fn test_from_data() {
        let sheet = Sheet::from_data(vec![vec![1, 2, 3], vec![4, 5, 6]]);

        assert_eq!(sheet.row_count(), 2);
        assert_eq!(sheet.col_count(), 3);
        assert_eq!(sheet.get(1, 2).unwrap(), &CellValue::Int(6));
    }

    #[test]
    fn test_name_columns_by_row() {
        let mut sheet = Sheet::from_data(vec![vec!["Name", "Age"], vec!["Alice", "30"]]);
        sheet.name_columns_by_row(0).unwrap();

        assert_eq!(
            sheet.column_names(),
            Some(&vec!["Name".to_string(), "Age".to_string()])
        );
        assert_eq!(sheet.get_by_name(1, "Age").unwrap().as_str(), "30");
        assert_eq!(sheet.column_by_name("Name").unwrap().len(), 1);
        assert_eq!(sheet.data_rows().count(), 1);
    }

    #[test]
    fn test_blank_header_is_unnamed() {
        let mut sheet = Sheet::from_data(vec![
            vec![CellValue::Null, CellValue::from("Paciente")],
            vec![CellValue::Int(0), CellValue::from("Ana")],
        ]);
        sheet.name_columns_by_row(0).unwrap();

        assert_eq!(sheet.column_position("Unnamed: 0"), Some(0));
        assert_eq!(sheet.column_position("Paciente"), Some(1));
    }

    #[test]
    fn test_duplicate_header_rejected() {
        let mut sheet = Sheet::from_data(vec![vec!["Status", "Status"]]);
        let result = sheet.name_columns_by_row(0);
        assert!(matches!(
            result,
            Err(SheetError::DuplicateColumnName { name }) if name == "Status"
        ));
    }

    #[test]
    fn test_with_header_and_append() {
        let mut sheet = Sheet::with_header("Out", &["a", "b"]);
        sheet.row_append(vec!["1", "2"]).unwrap();

        assert_eq!(sheet.name(), "Out");
        assert_eq!(sheet.row_count(), 2);
        assert_eq!(sheet.get_by_name(1, "b").unwrap().as_str(), "2");

        let result = sheet.row_append(vec!["only one"]);
        assert!(matches!(
            result,
            Err(SheetError::LengthMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_unnamed_lookup_errors() {
        let sheet = Sheet::from_data(vec![vec![1]]);
        assert!(matches!(
            sheet.get_by_name(0, "x"),
            Err(SheetError::ColumnsNotNamed(_))
        ));
        assert_eq!(sheet.column_position("x"), None);
    }
}
