//! Physician/technician cross-reference.
//!
//! A realized physician visit counts as matched when the same patient has a
//! realized technician visit under the same canonical day label. Days never
//! leak into each other, and rows without a patient id never match.

use crate::config::AnalysisConfig;
use crate::consolidate::ConsolidatedTable;
use crate::error::{AttendanceError, Result};
use crate::record::{AttendanceRecord, PatientId};
use serde::Serialize;
use std::collections::HashSet;
use tracing::info;

/// A realized physician visit with its cross-reference outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedVisit {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    /// No same-day realized technician visit exists for this patient.
    pub bypassed_technician: bool,
}

/// Counts gathered while matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    pub total_rows: usize,
    pub total_physician_rows: usize,
    pub realized_physician_rows: usize,
    /// Physician rows left out because their status is not realized.
    pub excluded_physician_rows: usize,
    pub realized_technician_rows: usize,
    pub matched: usize,
    pub bypassed: usize,
}

/// Output of [`cross_reference`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossReference {
    pub visits: Vec<MatchedVisit>,
    pub summary: MatchSummary,
}

/// Match every realized physician visit against realized technician visits.
///
/// Fails when the patient id column is absent or no realized physician
/// visit exists. The consolidated table stays usable in both cases.
pub fn cross_reference(table: &ConsolidatedTable, config: &AnalysisConfig) -> Result<CrossReference> {
    if table.fields().patient_id.is_none() {
        return Err(AttendanceError::missing_column(
            &config.columns.patient_id,
            &table.columns,
        ));
    }

    let roles = &config.roles;
    let total_physician_rows = table
        .records
        .iter()
        .filter(|r| r.specialty == roles.physician)
        .count();

    let physicians: Vec<&AttendanceRecord> = table
        .records
        .iter()
        .filter(|r| r.is_realized_for(&roles.physician))
        .collect();

    if physicians.is_empty() {
        return Err(AttendanceError::NoRealizedPhysicianVisits {
            physician_rows: total_physician_rows,
            total_rows: table.len(),
        });
    }

    let technicians: Vec<&AttendanceRecord> = table
        .records
        .iter()
        .filter(|r| r.is_realized_for(&roles.technician))
        .collect();

    let seen_by_technician: HashSet<(&PatientId, &str)> = technicians
        .iter()
        .filter_map(|r| r.patient_id.as_ref().map(|id| (id, r.day_label.as_str())))
        .collect();

    let visits: Vec<MatchedVisit> = physicians
        .into_iter()
        .map(|record| {
            let matched = record
                .patient_id
                .as_ref()
                .is_some_and(|id| seen_by_technician.contains(&(id, record.day_label.as_str())));
            MatchedVisit {
                record: record.clone(),
                bypassed_technician: !matched,
            }
        })
        .collect();

    let bypassed = visits.iter().filter(|v| v.bypassed_technician).count();
    let summary = MatchSummary {
        total_rows: table.len(),
        total_physician_rows,
        realized_physician_rows: visits.len(),
        excluded_physician_rows: total_physician_rows - visits.len(),
        realized_technician_rows: technicians.len(),
        matched: visits.len() - bypassed,
        bypassed,
    };

    info!(
        physician_rows = summary.total_physician_rows,
        realized = summary.realized_physician_rows,
        excluded = summary.excluded_physician_rows,
        technician_rows = summary.realized_technician_rows,
        matched = summary.matched,
        bypassed = summary.bypassed,
        "Cross-referenced physician visits"
    );

    Ok(CrossReference { visits, summary })
}
