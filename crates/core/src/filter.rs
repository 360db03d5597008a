//! Record filtering for dashboard views.

use crate::consolidate::ConsolidatedTable;
use crate::record::{AttendanceRecord, StatusCategory};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Selected values per dimension.
///
/// An empty `months` set applies no month filter, since many files carry no
/// month marker. Every other empty set selects nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    /// Canonical day labels.
    pub days: BTreeSet<String>,
    pub months: BTreeSet<String>,
    pub providers: BTreeSet<String>,
    pub specialties: BTreeSet<String>,
    pub statuses: BTreeSet<StatusCategory>,
}

impl FilterCriteria {
    /// Criteria selecting every record of the table.
    pub fn all(table: &ConsolidatedTable) -> Self {
        Self {
            days: table.records.iter().map(|r| r.day_label.clone()).collect(),
            months: table.months().into_iter().collect(),
            providers: table.providers().into_iter().collect(),
            specialties: table.specialties().into_iter().collect(),
            statuses: StatusCategory::ALL.into_iter().collect(),
        }
    }

    pub fn matches(&self, record: &AttendanceRecord) -> bool {
        self.days.contains(&record.day_label)
            && self.providers.contains(&record.provider)
            && self.specialties.contains(&record.specialty)
            && self.statuses.contains(&record.status_consolidated)
            && (self.months.is_empty() || self.months.contains(&record.month_label))
    }

    /// Records passing every filter, in table order.
    pub fn apply<'a>(&self, table: &'a ConsolidatedTable) -> Vec<&'a AttendanceRecord> {
        table.records.iter().filter(|r| self.matches(r)).collect()
    }
}
