//! Typed attendance records.

use attendance_sheet::CellValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sentinel for missing provider, specialty, month and status values.
pub const NOT_INFORMED: &str = "Not informed";

/// Largest float that still converts to an integer id exactly.
const MAX_EXACT_FLOAT_ID: f64 = 9_007_199_254_740_992.0;

/// Canonical medical-record number.
///
/// Numeric ids are rendered as fixed-width zero-padded text whatever the
/// source cell type, so `123`, `123.0` and `"000123"` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(String);

impl PatientId {
    /// Canonicalize a cell. Blank cells have no id.
    pub fn from_cell(cell: &CellValue, width: usize) -> Option<Self> {
        match cell {
            CellValue::Null => None,
            CellValue::Int(i) if *i >= 0 => Some(Self::padded(&i.to_string(), width)),
            CellValue::Float(f)
                if f.is_finite() && f.fract() == 0.0 && (0.0..MAX_EXACT_FLOAT_ID).contains(f) =>
            {
                let n = *f as i64;
                Some(Self::padded(&n.to_string(), width))
            }
            CellValue::String(s) => Self::from_text(s, width),
            other => Self::from_text(&other.as_str(), width),
        }
    }

    /// Canonicalize free text: digit strings (optionally with a `.0` tail) are padded.
    pub fn from_text(text: &str, width: usize) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }

        let digits = match trimmed.split_once('.') {
            Some((int, frac)) if !frac.is_empty() && frac.bytes().all(|b| b == b'0') => int,
            _ => trimmed,
        };

        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            Some(Self::padded(digits, width))
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    fn padded(digits: &str, width: usize) -> Self {
        let stripped = digits.trim_start_matches('0');
        let stripped = if stripped.is_empty() { "0" } else { stripped };
        Self(format!("{stripped:0>width$}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reporting classification of a visit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatusCategory {
    #[serde(rename = "Visit_Occurred")]
    VisitOccurred,
    #[serde(rename = "No_Show")]
    NoShow,
    #[serde(rename = "Dropped_Out")]
    DroppedOut,
    #[serde(rename = "Not informed")]
    NotInformed,
}

impl StatusCategory {
    pub const ALL: [StatusCategory; 4] = [
        StatusCategory::VisitOccurred,
        StatusCategory::NoShow,
        StatusCategory::DroppedOut,
        StatusCategory::NotInformed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StatusCategory::VisitOccurred => "Visit_Occurred",
            StatusCategory::NoShow => "No_Show",
            StatusCategory::DroppedOut => "Dropped_Out",
            StatusCategory::NotInformed => NOT_INFORMED,
        }
    }
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StatusCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StatusCategory::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown status category '{s}'"))
    }
}

/// One row of the consolidated dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceRecord {
    /// Raw cells aligned with the table's source columns.
    #[serde(skip)]
    pub cells: Vec<CellValue>,
    /// Source sheet name as it appears in the workbook.
    pub sheet_name: String,
    pub patient_id: Option<PatientId>,
    pub patient_name: String,
    pub provider: String,
    pub specialty: String,
    pub status: Option<String>,
    pub status_realized: bool,
    pub status_consolidated: StatusCategory,
    /// Canonical day label, the temporal join key.
    pub day_label: String,
    pub day_number: Option<u32>,
    pub month_label: String,
}

impl AttendanceRecord {
    /// Whether this row is a realized visit for the given specialty label.
    pub fn is_realized_for(&self, specialty: &str) -> bool {
        self.status_realized && self.specialty == specialty
    }

    /// Status text for display, `Not informed` when missing.
    pub fn status_display(&self) -> &str {
        self.status.as_deref().unwrap_or(NOT_INFORMED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(cell: CellValue) -> Option<String> {
        PatientId::from_cell(&cell, 10).map(|p| p.as_str().to_string())
    }

    #[test]
    fn test_numeric_and_text_ids_agree() {
        let expected = Some("0000000123".to_string());
        assert_eq!(id(CellValue::Int(123)), expected);
        assert_eq!(id(CellValue::Float(123.0)), expected);
        assert_eq!(id(CellValue::from("123")), expected);
        assert_eq!(id(CellValue::from(" 000123 ")), expected);
        assert_eq!(id(CellValue::from("123.0")), expected);
    }

    #[test]
    fn test_blank_ids_are_absent() {
        assert_eq!(id(CellValue::Null), None);
        assert_eq!(id(CellValue::from("   ")), None);
    }

    #[test]
    fn test_non_numeric_ids_trimmed() {
        assert_eq!(id(CellValue::from(" AB-12 ")), Some("AB-12".to_string()));
        assert_eq!(id(CellValue::Float(12.5)), Some("12.5".to_string()));
    }

    #[test]
    fn test_long_ids_not_truncated() {
        assert_eq!(
            PatientId::from_text("123456789012", 10).unwrap().as_str(),
            "123456789012"
        );
        assert_eq!(PatientId::from_text("0", 4).unwrap().as_str(), "0000");
    }

    #[test]
    fn test_status_category_labels() {
        assert_eq!(StatusCategory::NoShow.to_string(), "No_Show");
        assert_eq!("dropped_out".parse::<StatusCategory>(), Ok(StatusCategory::DroppedOut));
        assert_eq!("Not informed".parse::<StatusCategory>(), Ok(StatusCategory::NotInformed));
        assert!("Faltoso".parse::<StatusCategory>().is_err());
    }
}
