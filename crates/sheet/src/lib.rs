//! Sheet/Book primitives for attendance workbooks
//!
//! Provides a small pyexcel-like API for the tabular data held in clinic
//! attendance spreadsheets: reading workbooks sheet by sheet, naming columns
//! from a header row, stacking sheets with an outer union of their columns,
//! and writing results back out as xlsx or CSV.
//!
//! # Examples
//!
//! ## Creating a sheet from data
//!
//! ```
//! use attendance_sheet::{Sheet, CellValue};
//!
//! let mut sheet = Sheet::from_data(vec![
//!     vec!["Paciente", "Status"],
//!     vec!["Ana", "ATENDIMENTO FINALIZADO"],
//! ]);
//! sheet.name_columns_by_row(0).unwrap();
//!
//! assert_eq!(sheet.row_count(), 2);
//! assert_eq!(sheet.get_by_name(1, "Paciente").unwrap(), &CellValue::from("Ana"));
//! ```
//!
//! ## Stacking day sheets
//!
//! ```
//! use attendance_sheet::{Book, ConsolidateOptions, Sheet};
//!
//! let mut book = Book::new();
//! for (name, patient) in [("Dia 01", "Ana"), ("Dia 02", "Rui")] {
//!     let mut sheet = Sheet::from_data(vec![vec!["Paciente"], vec![patient]]);
//!     sheet.name_columns_by_row(0).unwrap();
//!     book.add_sheet(name, sheet).unwrap();
//! }
//!
//! let stacked = book
//!     .consolidate_with_options(&ConsolidateOptions::default().with_source_column("Dia"))
//!     .unwrap();
//! assert_eq!(stacked.data_rows().count(), 2);
//! ```
//!
//! ## Loading a workbook
//!
//! ```no_run
//! use attendance_sheet::{XlsxReadOptions, XlsxWorkbook};
//!
//! let mut workbook = XlsxWorkbook::open("producao.xlsx").unwrap();
//! let names = workbook.sheet_names().to_vec();
//! let first = workbook
//!     .read_sheet(&names[0], &XlsxReadOptions::default().with_headers(true))
//!     .unwrap();
//! ```

mod book;
mod cell;
mod csv;
mod error;
mod sheet;
mod xlsx;

/// Re-export book types and options.
pub use book::{Book, ConsolidateOptions};
/// Re-export cell value type.
pub use cell::CellValue;
/// Re-export CSV options.
pub use csv::CsvOptions;
/// Re-export sheet error types.
pub use error::{Result, SheetError};
/// Re-export sheet type.
pub use sheet::Sheet;
/// Re-export workbook reader and its options.
pub use xlsx::{XlsxReadOptions, XlsxWorkbook};
