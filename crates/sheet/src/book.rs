use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use crate::sheet::Sheet;
use indexmap::{IndexMap, IndexSet};

/// A book containing multiple sheets (preserves insertion order)
#[derive(Debug, Clone)]
pub struct Book {
    name: String,
    sheets: IndexMap<String, Sheet>,
}

impl Book {
    /// Create a new empty book
    #[must_use]
    pub fn new() -> Self {
        Self::with_name("Book1")
    }

    /// Create a new empty book with a name
    #[must_use]
    pub fn with_name(name: &str) -> Self {
        Book {
            name: name.to_string(),
            sheets: IndexMap::new(),
        }
    }

    /// Get the book name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of sheets
    #[must_use]
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Check if the book is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Get all sheet names in order
    #[must_use]
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.keys().map(String::as_str).collect()
    }

    /// Check if a sheet exists
    #[must_use]
    pub fn has_sheet(&self, name: &str) -> bool {
        self.sheets.contains_key(name)
    }

    /// Get a sheet by name
    pub fn get_sheet(&self, name: &str) -> Result<&Sheet> {
        self.sheets
            .get(name)
            .ok_or_else(|| SheetError::SheetNotFound {
                name: name.to_string(),
            })
    }

    /// Add a sheet to the book
    pub fn add_sheet(&mut self, name: &str, sheet: Sheet) -> Result<()> {
        if self.sheets.contains_key(name) {
            return Err(SheetError::SheetAlreadyExists {
                name: name.to_string(),
            });
        }

        let mut sheet = sheet;
        sheet.set_name(name);
        self.sheets.insert(name.to_string(), sheet);
        Ok(())
    }

    // ===== Consolidation =====

    /// Consolidate all sheets into a single sheet by stacking rows vertically.
    ///
    /// All sheets must have named columns. Columns are aligned by name
    /// (outer union, first-seen order). Missing columns in a sheet are filled
    /// with Null. Header rows are not repeated in the output.
    ///
    /// A sheet column with the same name as the source column is overwritten
    /// by the sheet name.
    pub fn consolidate_with_options(&self, options: &ConsolidateOptions) -> Result<Sheet> {
        let mut all_columns: IndexSet<String> = IndexSet::new();

        for (name, sheet) in self.sheets() {
            let col_names = sheet.column_names().ok_or_else(|| {
                SheetError::ColumnsNotNamed(format!(
                    "Sheet '{}' does not have named columns. All sheets must have named columns for consolidate.",
                    name
                ))
            })?;

            for col in col_names {
                if !options.drop_columns.contains(col) {
                    all_columns.insert(col.clone());
                }
            }
        }

        let final_columns: Vec<String> = match &options.source_column {
            Some(source) => {
                all_columns.shift_remove(source);
                std::iter::once(source.clone())
                    .chain(all_columns.iter().cloned())
                    .collect()
            }
            None => all_columns.iter().cloned().collect(),
        };

        let header: Vec<&str> = final_columns.iter().map(String::as_str).collect();
        let mut result = Sheet::with_header("consolidated", &header);

        for (sheet_name, sheet) in self.sheets() {
            // Source column index per output column (None = absent in this sheet)
            let positions: Vec<Option<usize>> = final_columns
                .iter()
                .enumerate()
                .map(|(i, col)| {
                    if options.source_column.is_some() && i == 0 {
                        None
                    } else {
                        sheet.column_position(col)
                    }
                })
                .collect();

            for row in sheet.data_rows() {
                let new_row: Vec<CellValue> = positions
                    .iter()
                    .enumerate()
                    .map(|(i, pos)| {
                        if options.source_column.is_some() && i == 0 {
                            CellValue::String(sheet_name.to_string())
                        } else {
                            pos.and_then(|p| row.get(p).cloned())
                                .unwrap_or(CellValue::Null)
                        }
                    })
                    .collect();
                result.row_append(new_row)?;
            }
        }

        Ok(result)
    }

    // ===== Iteration =====

    /// Iterate over sheets
    pub fn sheets(&self) -> impl Iterator<Item = (&str, &Sheet)> {
        self.sheets.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Options for consolidating sheets
#[derive(Debug, Clone, Default)]
pub struct ConsolidateOptions {
    /// Prepend a column holding the source sheet name
    pub source_column: Option<String>,
    /// Columns left out of the union
    pub drop_columns: Vec<String>,
}

impl ConsolidateOptions {
    /// Enable adding a source column with a custom name
    #[must_use]
    pub fn with_source_column(mut self, name: &str) -> Self {
        self.source_column = Some(name.to_string());
        self
    }

    /// Leave a column out of the consolidated sheet
    #[must_use]
    pub fn dropping(mut self, name: &str) -> Self {
        self.drop_columns.push(name.to_string());
        self
    }
}

impl Default for Book {
    fn default() -> Self {
        Self::new()
    }
}
