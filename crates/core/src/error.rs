//! Error types for attendance processing.

use attendance_sheet::SheetError;
use thiserror::Error;

/// Result type for attendance operations.
pub type Result<T> = std::result::Result<T, AttendanceError>;

/// Errors that can occur while loading, consolidating or cross-referencing.
#[derive(Debug, Error)]
pub enum AttendanceError {
    /// No sheet name starts with the day prefix; nothing to consolidate.
    #[error("No day sheets found (expected names like 'Dia 01'); sheets in file: {}", .available.join(", "))]
    NoDataSheets { available: Vec<String> },

    /// A single day sheet could not be parsed. The loader skips such sheets.
    #[error("Failed to read sheet '{sheet}': {reason}")]
    SheetReadFailure { sheet: String, reason: String },

    /// The matching stage found no realized physician visit.
    #[error(
        "No realized physician visits found ({physician_rows} physician rows among {total_rows} records)"
    )]
    NoRealizedPhysicianVisits {
        physician_rows: usize,
        total_rows: usize,
    },

    /// A column required by a stage is absent from the consolidated data.
    #[error("Missing expected column '{column}'; available columns: {}", .available.join(", "))]
    MissingExpectedColumn {
        column: String,
        available: Vec<String>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Export error.
    #[error("Export error: {0}")]
    Export(String),

    /// Sheet/workbook error.
    #[error(transparent)]
    Sheet(#[from] SheetError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML configuration parse error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AttendanceError {
    /// Create a missing-column error.
    pub fn missing_column(column: impl Into<String>, available: &[String]) -> Self {
        Self::MissingExpectedColumn {
            column: column.into(),
            available: available.to_vec(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
