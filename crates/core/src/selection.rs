//! Dashboard selection state as a pure reducer.
//!
//! Teams are specialties. Changing the team selection cascades to the
//! provider selection: providers of added teams are selected, providers of
//! removed teams are deselected, going from no team to some teams selects
//! exactly their providers, and clearing the teams clears the providers.

use crate::consolidate::ConsolidatedTable;
use crate::filter::FilterCriteria;
use crate::record::StatusCategory;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Selectable values of one table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub days: Vec<String>,
    pub months: Vec<String>,
    pub teams: Vec<String>,
    pub providers: Vec<String>,
    /// Team of each provider, taken from the provider's first row.
    pub team_of: IndexMap<String, String>,
}

impl Catalog {
    pub fn from_table(table: &ConsolidatedTable) -> Self {
        let mut team_of = IndexMap::new();
        for record in &table.records {
            team_of
                .entry(record.provider.clone())
                .or_insert_with(|| record.specialty.clone());
        }

        let days: BTreeSet<String> = table
            .day_labels
            .iter()
            .cloned()
            .chain(table.records.iter().map(|r| r.day_label.clone()))
            .collect();

        Self {
            days: days.into_iter().collect(),
            months: table.months(),
            teams: table.specialties(),
            providers: table.providers(),
            team_of,
        }
    }

    /// Providers whose team is in `teams`.
    pub fn providers_of<'a>(&'a self, teams: &'a BTreeSet<String>) -> impl Iterator<Item = &'a String> {
        self.team_of
            .iter()
            .filter(move |(_, team)| teams.contains(*team))
            .map(|(provider, _)| provider)
    }
}

/// Current selection in every filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    pub days: BTreeSet<String>,
    pub months: BTreeSet<String>,
    pub teams: BTreeSet<String>,
    pub providers: BTreeSet<String>,
    pub statuses: BTreeSet<StatusCategory>,
}

/// A user action on the filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionEvent {
    SelectAllDays,
    ClearDays,
    SetDays(BTreeSet<String>),
    SetMonths(BTreeSet<String>),
    SelectAllTeams,
    ClearTeams,
    SetTeams(BTreeSet<String>),
    /// Select every provider of the selected teams, or every provider when no team is selected.
    SelectAllProviders,
    ClearProviders,
    ToggleProvider { provider: String, selected: bool },
    SetStatuses(BTreeSet<StatusCategory>),
}

impl SelectionState {
    /// Everything selected.
    pub fn initial(catalog: &Catalog) -> Self {
        Self {
            days: catalog.days.iter().cloned().collect(),
            months: catalog.months.iter().cloned().collect(),
            teams: catalog.teams.iter().cloned().collect(),
            providers: catalog.providers.iter().cloned().collect(),
            statuses: StatusCategory::ALL.into_iter().collect(),
        }
    }

    /// Filter criteria for this selection.
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            days: self.days.clone(),
            months: self.months.clone(),
            providers: self.providers.clone(),
            specialties: self.teams.clone(),
            statuses: self.statuses.clone(),
        }
    }
}

/// Apply one event, returning the next selection.
pub fn reduce(state: &SelectionState, event: SelectionEvent, catalog: &Catalog) -> SelectionState {
    let mut next = state.clone();

    match event {
        SelectionEvent::SelectAllDays => next.days = catalog.days.iter().cloned().collect(),
        SelectionEvent::ClearDays => next.days.clear(),
        SelectionEvent::SetDays(days) => next.days = days,
        SelectionEvent::SetMonths(months) => next.months = months,
        SelectionEvent::SelectAllTeams => {
            return reduce(
                state,
                SelectionEvent::SetTeams(catalog.teams.iter().cloned().collect()),
                catalog,
            );
        }
        SelectionEvent::ClearTeams => {
            next.teams.clear();
            next.providers.clear();
        }
        SelectionEvent::SetTeams(teams) => {
            if teams != state.teams {
                next.providers = cascade_providers(state, &teams, catalog);
                next.teams = teams;
            }
        }
        SelectionEvent::SelectAllProviders => {
            next.providers = if state.teams.is_empty() {
                catalog.providers.iter().cloned().collect()
            } else {
                catalog.providers_of(&state.teams).cloned().collect()
            };
        }
        SelectionEvent::ClearProviders => next.providers.clear(),
        SelectionEvent::ToggleProvider { provider, selected } => {
            if selected {
                next.providers.insert(provider);
            } else {
                next.providers.remove(&provider);
            }
        }
        SelectionEvent::SetStatuses(statuses) => next.statuses = statuses,
    }

    next
}

fn cascade_providers(
    state: &SelectionState,
    teams: &BTreeSet<String>,
    catalog: &Catalog,
) -> BTreeSet<String> {
    if teams.is_empty() {
        return BTreeSet::new();
    }
    if state.teams.is_empty() {
        return catalog.providers_of(teams).cloned().collect();
    }

    let removed: BTreeSet<String> = state.teams.difference(teams).cloned().collect();
    let added: BTreeSet<String> = teams.difference(&state.teams).cloned().collect();

    let dropped: BTreeSet<&String> = catalog.providers_of(&removed).collect();
    state
        .providers
        .iter()
        .filter(|p| !dropped.contains(p))
        .cloned()
        .chain(catalog.providers_of(&added).cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    fn catalog() -> Catalog {
        let team_of: IndexMap<String, String> = [
            ("ANA", "MED"),
            ("BIA", "MED"),
            ("RUI", "ENF"),
            ("LEO", "ODO"),
        ]
        .into_iter()
        .map(|(p, t)| (p.to_string(), t.to_string()))
        .collect();

        Catalog {
            days: vec!["Dia 01".to_string(), "Dia 02".to_string()],
            months: vec!["Março".to_string()],
            teams: vec!["ENF".to_string(), "MED".to_string(), "ODO".to_string()],
            providers: vec![
                "ANA".to_string(),
                "BIA".to_string(),
                "LEO".to_string(),
                "RUI".to_string(),
            ],
            team_of,
        }
    }

    #[test]
    fn test_initial_selects_everything() {
        let catalog = catalog();
        let state = SelectionState::initial(&catalog);
        assert_eq!(state.providers.len(), 4);
        assert_eq!(state.teams.len(), 3);
        assert_eq!(state.statuses.len(), 4);
    }

    #[test]
    fn test_removing_team_drops_its_providers() {
        let catalog = catalog();
        let state = SelectionState::initial(&catalog);

        let next = reduce(&state, SelectionEvent::SetTeams(set(&["ENF", "ODO"])), &catalog);

        assert_eq!(next.teams, set(&["ENF", "ODO"]));
        assert_eq!(next.providers, set(&["LEO", "RUI"]));
    }

    #[test]
    fn test_adding_team_keeps_manual_choices() {
        let catalog = catalog();
        let state = SelectionState {
            teams: set(&["ENF"]),
            providers: set(&[]),
            ..SelectionState::initial(&catalog)
        };

        let next = reduce(&state, SelectionEvent::SetTeams(set(&["ENF", "MED"])), &catalog);

        assert_eq!(next.providers, set(&["ANA", "BIA"]));
    }

    #[test]
    fn test_first_teams_select_exactly_their_providers() {
        let catalog = catalog();
        let state = SelectionState {
            teams: set(&[]),
            providers: set(&["LEO"]),
            ..SelectionState::default()
        };

        let next = reduce(&state, SelectionEvent::SetTeams(set(&["MED"])), &catalog);

        assert_eq!(next.providers, set(&["ANA", "BIA"]));
    }

    #[test]
    fn test_empty_team_set_clears_providers() {
        let catalog = catalog();
        let state = SelectionState::initial(&catalog);

        let next = reduce(&state, SelectionEvent::SetTeams(set(&[])), &catalog);
        assert!(next.providers.is_empty());

        let cleared = reduce(&state, SelectionEvent::ClearTeams, &catalog);
        assert!(cleared.teams.is_empty());
        assert!(cleared.providers.is_empty());
    }

    #[test]
    fn test_unchanged_teams_leave_providers_alone() {
        let catalog = catalog();
        let state = SelectionState {
            providers: set(&["ANA"]),
            ..SelectionState::initial(&catalog)
        };

        let next = reduce(&state, SelectionEvent::SetTeams(state.teams.clone()), &catalog);
        assert_eq!(next, state);
    }

    #[test]
    fn test_select_all_providers_respects_teams() {
        let catalog = catalog();
        let state = SelectionState {
            teams: set(&["ENF"]),
            providers: set(&[]),
            ..SelectionState::initial(&catalog)
        };

        let next = reduce(&state, SelectionEvent::SelectAllProviders, &catalog);
        assert_eq!(next.providers, set(&["RUI"]));

        let none = SelectionState::default();
        let all = reduce(&none, SelectionEvent::SelectAllProviders, &catalog);
        assert_eq!(all.providers.len(), 4);
    }

    #[test]
    fn test_toggle_provider_and_days() {
        let catalog = catalog();
        let state = SelectionState::initial(&catalog);

        let next = reduce(
            &state,
            SelectionEvent::ToggleProvider {
                provider: "ANA".to_string(),
                selected: false,
            },
            &catalog,
        );
        assert!(!next.providers.contains("ANA"));

        let next = reduce(&next, SelectionEvent::ClearDays, &catalog);
        assert!(next.days.is_empty());
        let next = reduce(&next, SelectionEvent::SelectAllDays, &catalog);
        assert_eq!(next.days.len(), 2);
    }

    #[test]
    fn test_criteria_mirrors_selection() {
        let catalog = catalog();
        let state = SelectionState::initial(&catalog);
        let criteria = state.criteria();
        assert_eq!(criteria.specialties, state.teams);
        assert_eq!(criteria.providers, state.providers);
    }
}
