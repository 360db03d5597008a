//! Analysis configuration.
//!
//! Defaults describe the workbooks exported by the unit's scheduling system:
//! Portuguese column headers, the two Family Health Strategy role labels and
//! the upper-case status vocabulary. Any of it can be overridden from YAML.

use crate::error::{AttendanceError, Result};
use crate::record::StatusCategory;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Upper bound for the canonical patient id width.
const MAX_ID_WIDTH: usize = 32;

/// Top-level configuration for loading and cross-referencing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub columns: ColumnNames,
    pub roles: RoleLabels,
    pub statuses: StatusLabels,
    pub sheets: SheetRules,
    /// Width of the zero-padded canonical patient id.
    pub patient_id_width: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            columns: ColumnNames::default(),
            roles: RoleLabels::default(),
            statuses: StatusLabels::default(),
            sheets: SheetRules::default(),
            patient_id_width: 10,
        }
    }
}

/// Source column headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnNames {
    pub patient_id: String,
    pub patient_name: String,
    pub provider: String,
    pub specialty: String,
    pub status: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            patient_id: "Número Prontuário".to_string(),
            patient_name: "Paciente".to_string(),
            provider: "Profissional".to_string(),
            specialty: "Especialidade".to_string(),
            status: "Status".to_string(),
        }
    }
}

/// Specialty labels that identify the two roles being cross-referenced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoleLabels {
    pub physician: String,
    pub technician: String,
}

impl Default for RoleLabels {
    fn default() -> Self {
        Self {
            physician: "MÉDICO DA ESTRATÉGIA DE SAÚDE DA FAMÍLIA".to_string(),
            technician: "TÉCNICO DE ENFERMAGEM DA ESTRATÉGIA DE SAÚDE DA FAMÍLIA".to_string(),
        }
    }
}

/// Status vocabulary. Values are compared trimmed and upper-cased.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StatusLabels {
    /// Statuses meaning the encounter took place; only these take part in matching.
    pub realized: Vec<String>,
    /// Further statuses reported as `Visit_Occurred`. Statuses outside every
    /// list are reported the same way but logged as unrecognised.
    pub occurred: Vec<String>,
    pub no_show: Vec<String>,
    pub dropped_out: Vec<String>,
}

impl Default for StatusLabels {
    fn default() -> Self {
        Self {
            realized: vec![
                "ATENDIMENTO FINALIZADO".to_string(),
                "REALIZANDO PROCEDIMENTO/EXAME".to_string(),
            ],
            occurred: vec![
                "AGENDADO".to_string(),
                "AGUARDANDO ATENDIMENTO".to_string(),
            ],
            no_show: vec!["FALTOSO".to_string()],
            dropped_out: vec!["EVADIDO".to_string()],
        }
    }
}

/// Normalize a raw status for comparison.
pub fn normalize_status(raw: &str) -> String {
    raw.trim().to_uppercase()
}

fn contains_status(list: &[String], normalized: &str) -> bool {
    list.iter().any(|s| normalize_status(s) == normalized)
}

impl StatusLabels {
    /// Whether the status says the visit actually took place.
    pub fn is_realized(&self, raw: Option<&str>) -> bool {
        raw.map(normalize_status)
            .is_some_and(|s| contains_status(&self.realized, &s))
    }

    /// Whether the status appears in one of the configured lists.
    pub fn is_recognized(&self, raw: Option<&str>) -> bool {
        raw.map(normalize_status).is_some_and(|s| {
            [&self.realized, &self.occurred, &self.no_show, &self.dropped_out]
                .into_iter()
                .any(|list| contains_status(list, &s))
        })
    }

    /// Three-way reporting classification (plus `NotInformed` for a missing status).
    ///
    /// Statuses outside every list fall into `VisitOccurred`.
    pub fn classify(&self, raw: Option<&str>) -> StatusCategory {
        let Some(status) = raw.map(normalize_status).filter(|s| !s.is_empty()) else {
            return StatusCategory::NotInformed;
        };

        if contains_status(&self.no_show, &status) {
            StatusCategory::NoShow
        } else if contains_status(&self.dropped_out, &status) {
            StatusCategory::DroppedOut
        } else {
            if !self.is_recognized(Some(&status)) {
                debug!(status = %status, "Unrecognised status counted as Visit_Occurred");
            }
            StatusCategory::VisitOccurred
        }
    }
}

/// Workbook layout rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetRules {
    /// Literal prefix of day sheet names.
    pub day_prefix: String,
    /// Sheets never considered as month markers.
    pub ignored_sheets: Vec<String>,
    /// Export artifacts removed before processing.
    pub dropped_columns: Vec<String>,
}

impl Default for SheetRules {
    fn default() -> Self {
        Self {
            day_prefix: "Dia".to_string(),
            ignored_sheets: vec!["Consolidado".to_string()],
            dropped_columns: vec!["Unnamed: 0".to_string()],
        }
    }
}

impl SheetRules {
    /// Whether a sheet holds one day of attendance rows.
    pub fn is_day_sheet(&self, name: &str) -> bool {
        name.starts_with(&self.day_prefix)
    }

    /// Whether a sheet may carry the month marker in A1.
    pub fn is_month_candidate(&self, name: &str) -> bool {
        !self.is_day_sheet(name) && !self.ignored_sheets.iter().any(|s| s == name)
    }
}

impl AnalysisConfig {
    /// Parse a configuration from YAML text. Missing keys keep their defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    /// Check the configuration for values that would make matching meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.roles.physician.trim().is_empty() || self.roles.technician.trim().is_empty() {
            return Err(AttendanceError::config("role labels must not be empty"));
        }
        if self.roles.physician == self.roles.technician {
            return Err(AttendanceError::config(
                "physician and technician labels must differ",
            ));
        }
        if self.statuses.realized.is_empty() {
            return Err(AttendanceError::config(
                "at least one realized status is required",
            ));
        }
        if self.sheets.day_prefix.is_empty() {
            return Err(AttendanceError::config("day sheet prefix must not be empty"));
        }
        if self.patient_id_width == 0 || self.patient_id_width > MAX_ID_WIDTH {
            return Err(AttendanceError::config(format!(
                "patient_id_width must be between 1 and {MAX_ID_WIDTH}"
            )));
        }
        Ok(())
    }
}
