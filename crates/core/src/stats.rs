//! Per-provider match statistics.

use crate::matching::MatchedVisit;
use serde::Serialize;
use std::collections::BTreeMap;

/// Matched/bypassed counts for one provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderStats {
    pub provider: String,
    pub total_visits: usize,
    pub matched_count: usize,
    pub bypassed_count: usize,
    pub matched_pct: f64,
    pub bypassed_pct: f64,
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Share of `part` in `total` as a percentage, 0 for an empty total.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Group visits by provider, most visits first.
///
/// Groups are formed in ascending provider order; the sort by total is
/// stable so ties keep that order.
pub fn provider_stats(visits: &[MatchedVisit]) -> Vec<ProviderStats> {
    let mut groups: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for visit in visits {
        let entry = groups.entry(visit.record.provider.as_str()).or_default();
        entry.0 += 1;
        if visit.bypassed_technician {
            entry.1 += 1;
        }
    }

    let mut stats: Vec<ProviderStats> = groups
        .into_iter()
        .map(|(provider, (total, bypassed))| {
            let matched = total - bypassed;
            ProviderStats {
                provider: provider.to_string(),
                total_visits: total,
                matched_count: matched,
                bypassed_count: bypassed,
                matched_pct: round2(percentage(matched, total)),
                bypassed_pct: round2(percentage(bypassed, total)),
            }
        })
        .collect();

    stats.sort_by(|a, b| b.total_visits.cmp(&a.total_visits));
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{AttendanceRecord, StatusCategory};

    fn visit(provider: &str, bypassed: bool) -> MatchedVisit {
        MatchedVisit {
            record: AttendanceRecord {
                cells: Vec::new(),
                sheet_name: "Dia 01".to_string(),
                patient_id: None,
                patient_name: String::new(),
                provider: provider.to_string(),
                specialty: String::new(),
                status: None,
                status_realized: true,
                status_consolidated: StatusCategory::VisitOccurred,
                day_label: "Dia 01".to_string(),
                day_number: Some(1),
                month_label: String::new(),
            },
            bypassed_technician: bypassed,
        }
    }

    #[test]
    fn test_counts_and_percentages() {
        let visits = vec![
            visit("DR B", true),
            visit("DR A", false),
            visit("DR A", true),
            visit("DR A", false),
        ];

        let stats = provider_stats(&visits);

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].provider, "DR A");
        assert_eq!(stats[0].total_visits, 3);
        assert_eq!(stats[0].matched_count, 2);
        assert_eq!(stats[0].bypassed_count, 1);
        assert!((stats[0].matched_pct - 66.67).abs() < 1e-9);
        assert!((stats[0].bypassed_pct - 33.33).abs() < 1e-9);
        assert!((stats[1].bypassed_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_ties_keep_provider_order() {
        let visits = vec![visit("ZÉ", false), visit("ANA", true), visit("LIA", false)];
        let names: Vec<String> = provider_stats(&visits)
            .into_iter()
            .map(|s| s.provider)
            .collect();
        assert_eq!(names, vec!["ANA", "LIA", "ZÉ"]);
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        let visits: Vec<MatchedVisit> = (0..7).map(|i| visit("X", i % 3 == 0)).collect();
        let stats = provider_stats(&visits);
        let s = &stats[0];
        assert_eq!(s.matched_count + s.bypassed_count, s.total_visits);
        assert!((s.matched_pct + s.bypassed_pct - 100.0).abs() <= 0.01 + 1e-9);
    }

    #[test]
    fn test_round2() {
        assert!((round2(12.345_6) - 12.35).abs() < 1e-9);
        assert!((percentage(1, 0)).abs() < 1e-9);
    }
}
