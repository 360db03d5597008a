//! Headline indicators and breakdowns over a filtered view.

use crate::record::{AttendanceRecord, StatusCategory};
use crate::stats::{percentage, round2};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// KPI tiles for a filtered view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Kpis {
    pub total_rows: usize,
    /// Rows classified `Visit_Occurred`.
    pub realized_visits: usize,
    pub no_shows: usize,
    pub dropouts: usize,
    pub distinct_days: usize,
    pub average_per_day: f64,
    pub no_show_pct: f64,
    pub dropout_pct: f64,
}

impl Kpis {
    pub fn compute(records: &[&AttendanceRecord]) -> Self {
        let count = |category: StatusCategory| {
            records
                .iter()
                .filter(|r| r.status_consolidated == category)
                .count()
        };

        let total_rows = records.len();
        let realized_visits = count(StatusCategory::VisitOccurred);
        let no_shows = count(StatusCategory::NoShow);
        let dropouts = count(StatusCategory::DroppedOut);
        let distinct_days = records
            .iter()
            .map(|r| r.day_label.as_str())
            .collect::<BTreeSet<_>>()
            .len();

        let average_per_day = if distinct_days == 0 {
            0.0
        } else {
            realized_visits as f64 / distinct_days as f64
        };

        Self {
            total_rows,
            realized_visits,
            no_shows,
            dropouts,
            distinct_days,
            average_per_day,
            no_show_pct: percentage(no_shows, total_rows),
            dropout_pct: percentage(dropouts, total_rows),
        }
    }
}

/// One provider's share of a status category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderShare {
    pub provider: String,
    pub count: usize,
    /// Percentage of the provider's filtered rows, two decimals.
    pub pct: f64,
}

/// Count of rows in `category` per provider, relative to that provider's rows.
///
/// Providers without such rows are omitted. Sorted by percentage, highest first.
pub fn status_share_by_provider(
    records: &[&AttendanceRecord],
    category: StatusCategory,
) -> Vec<ProviderShare> {
    let mut totals: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for record in records {
        let entry = totals.entry(record.provider.as_str()).or_default();
        entry.0 += 1;
        if record.status_consolidated == category {
            entry.1 += 1;
        }
    }

    let mut shares: Vec<ProviderShare> = totals
        .into_iter()
        .filter(|(_, (_, hits))| *hits > 0)
        .map(|(provider, (total, hits))| ProviderShare {
            provider: provider.to_string(),
            count: hits,
            pct: round2(percentage(hits, total)),
        })
        .collect();

    shares.sort_by(|a, b| b.pct.total_cmp(&a.pct));
    shares
}

fn occurred_counts<'a, F>(records: &[&'a AttendanceRecord], key: F) -> Vec<(String, usize)>
where
    F: Fn(&'a AttendanceRecord) -> &'a str,
{
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records
        .iter()
        .filter(|r| r.status_consolidated == StatusCategory::VisitOccurred)
    {
        *counts.entry(key(*record)).or_default() += 1;
    }

    let mut counts: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(k, n)| (k.to_string(), n))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Occurred visits per provider, most first.
pub fn visits_by_provider(records: &[&AttendanceRecord]) -> Vec<(String, usize)> {
    occurred_counts(records, |r| r.provider.as_str())
}

/// Occurred visits per specialty, most first.
pub fn visits_by_specialty(records: &[&AttendanceRecord]) -> Vec<(String, usize)> {
    occurred_counts(records, |r| r.specialty.as_str())
}

/// Occurred visits per day and provider.
///
/// Every day present in the view is paired with every given provider, with
/// zero where a provider saw nobody that day. Days are in label order.
pub fn daily_evolution(
    records: &[&AttendanceRecord],
    providers: &[String],
) -> IndexMap<String, IndexMap<String, usize>> {
    let days: BTreeSet<&str> = records.iter().map(|r| r.day_label.as_str()).collect();

    let mut grid: IndexMap<String, IndexMap<String, usize>> = days
        .into_iter()
        .map(|day| {
            let row = providers.iter().map(|p| (p.clone(), 0)).collect();
            (day.to_string(), row)
        })
        .collect();

    for record in records
        .iter()
        .filter(|r| r.status_consolidated == StatusCategory::VisitOccurred)
    {
        if let Some(count) = grid
            .get_mut(&record.day_label)
            .and_then(|row| row.get_mut(&record.provider))
        {
            *count += 1;
        }
    }

    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(day: &str, provider: &str, specialty: &str, category: StatusCategory) -> AttendanceRecord {
        AttendanceRecord {
            cells: Vec::new(),
            sheet_name: day.to_string(),
            patient_id: None,
            patient_name: String::new(),
            provider: provider.to_string(),
            specialty: specialty.to_string(),
            status: None,
            status_realized: false,
            status_consolidated: category,
            day_label: day.to_string(),
            day_number: None,
            month_label: String::new(),
        }
    }

    fn sample() -> Vec<AttendanceRecord> {
        use StatusCategory::{DroppedOut, NoShow, VisitOccurred};
        vec![
            rec("Dia 01", "ANA", "MED", VisitOccurred),
            rec("Dia 01", "ANA", "MED", NoShow),
            rec("Dia 01", "RUI", "ENF", VisitOccurred),
            rec("Dia 02", "RUI", "ENF", DroppedOut),
            rec("Dia 02", "ANA", "MED", VisitOccurred),
        ]
    }

    #[test]
    fn test_kpis() {
        let data = sample();
        let view: Vec<&AttendanceRecord> = data.iter().collect();
        let kpis = Kpis::compute(&view);

        assert_eq!(kpis.total_rows, 5);
        assert_eq!(kpis.realized_visits, 3);
        assert_eq!(kpis.distinct_days, 2);
        assert!((kpis.average_per_day - 1.5).abs() < 1e-9);
        assert!((kpis.no_show_pct - 20.0).abs() < 1e-9);
        assert!((kpis.dropout_pct - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_kpis_empty_view() {
        let kpis = Kpis::compute(&[]);
        assert_eq!(kpis, Kpis::default());
    }

    #[test]
    fn test_status_share() {
        let data = sample();
        let view: Vec<&AttendanceRecord> = data.iter().collect();

        let shares = status_share_by_provider(&view, StatusCategory::NoShow);
        assert_eq!(shares.len(), 1);
        assert_eq!(shares[0].provider, "ANA");
        assert_eq!(shares[0].count, 1);
        assert!((shares[0].pct - 33.33).abs() < 1e-9);
    }

    #[test]
    fn test_visit_breakdowns() {
        let data = sample();
        let view: Vec<&AttendanceRecord> = data.iter().collect();

        assert_eq!(
            visits_by_provider(&view),
            vec![("ANA".to_string(), 2), ("RUI".to_string(), 1)]
        );
        assert_eq!(
            visits_by_specialty(&view),
            vec![("MED".to_string(), 2), ("ENF".to_string(), 1)]
        );
    }

    #[test]
    fn test_daily_evolution_zero_fills() {
        let data = sample();
        let view: Vec<&AttendanceRecord> = data.iter().collect();
        let providers = vec!["ANA".to_string(), "RUI".to_string()];

        let grid = daily_evolution(&view, &providers);

        assert_eq!(grid.len(), 2);
        assert_eq!(grid["Dia 01"]["ANA"], 1);
        assert_eq!(grid["Dia 01"]["RUI"], 1);
        assert_eq!(grid["Dia 02"]["ANA"], 1);
        assert_eq!(grid["Dia 02"]["RUI"], 0);
    }
}
