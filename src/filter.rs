//! Country filter and explicit record selection

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::City;

/// Quiet period after the last keystroke before the text filter runs.
pub const FILTER_DEBOUNCE_MS: u64 = 300;

/// What narrowed the table
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum FilterQuery {
    /// Free text matched against country names
    Text(String),
    /// One record picked from the suggestions
    Selection(u64),
}

/// Filter lifecycle.
///
/// `Unfiltered` ⇄ `Filtered` on apply/clear. A filter that matches nothing
/// moves to `Reloading`: the list is dropped and fetched again from offset 0,
/// and the first page that arrives (or the failure) returns to `Unfiltered`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub enum FilterState {
    #[default]
    Unfiltered,
    Filtered {
        query: FilterQuery,
        /// Rows displayed before the filter, restored verbatim on clear
        base: Vec<City>,
    },
    Reloading,
}

impl FilterState {
    pub fn is_active(&self) -> bool {
        matches!(self, FilterState::Filtered { .. })
    }

    pub fn is_selection(&self) -> bool {
        matches!(
            self,
            FilterState::Filtered {
                query: FilterQuery::Selection(_),
                ..
            }
        )
    }

    pub fn is_reloading(&self) -> bool {
        matches!(self, FilterState::Reloading)
    }

    /// Whether a newly fetched record belongs in the displayed rows
    pub fn admits(&self, city: &City) -> bool {
        match self {
            FilterState::Filtered {
                query: FilterQuery::Text(text),
                ..
            } => country_matches(city, &text.trim().to_lowercase()),
            FilterState::Filtered {
                query: FilterQuery::Selection(id),
                ..
            } => city.id == *id,
            _ => true,
        }
    }
}

fn country_matches(city: &City, needle: &str) -> bool {
    city.country.to_lowercase().contains(needle)
}

/// Records whose country name contains `query`, ignoring case. City names
/// are not searched.
pub fn filter_by_country(cities: &[City], query: &str) -> Vec<City> {
    let needle = query.trim().to_lowercase();
    cities
        .iter()
        .filter(|city| country_matches(city, &needle))
        .cloned()
        .collect()
}

pub fn filter_by_id(cities: &[City], id: u64) -> Vec<City> {
    cities.iter().filter(|city| city.id == id).cloned().collect()
}

/// Label of a suggestion entry
pub fn suggestion_label(city: &City) -> String {
    format!("{} - {} ({})", city.country, city.id, city.name)
}
