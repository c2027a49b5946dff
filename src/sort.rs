//! Column sorting for the city table

use std::cmp::Ordering;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::City;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum SortColumn {
    Name,
    Country,
    Population,
    Timezone,
}

impl SortColumn {
    pub const ALL: [SortColumn; 4] = [
        SortColumn::Name,
        SortColumn::Country,
        SortColumn::Population,
        SortColumn::Timezone,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SortColumn::Name => "City Name",
            SortColumn::Country => "Country Name",
            SortColumn::Population => "Population",
            SortColumn::Timezone => "Timezone",
        }
    }

    /// Column bound to the digit keys 1-4
    pub fn from_digit(digit: char) -> Option<Self> {
        let index = digit.to_digit(10)?.checked_sub(1)?;
        Self::ALL.get(index as usize).copied()
    }

    fn compare(&self, a: &City, b: &City) -> Ordering {
        match self {
            SortColumn::Name => a.name.cmp(&b.name),
            SortColumn::Country => a.country.cmp(&b.country),
            SortColumn::Population => a.population.cmp(&b.population),
            SortColumn::Timezone => a.timezone.cmp(&b.timezone),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flip(&self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

/// Active sort column and direction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SortState {
    pub column: Option<SortColumn>,
    pub direction: SortDirection,
}

impl SortState {
    /// Next state after activating `column`: the same column flips direction,
    /// any other column starts ascending.
    pub fn toggle(&self, column: SortColumn) -> Self {
        let direction = if self.column == Some(column) {
            self.direction.flip()
        } else {
            SortDirection::Ascending
        };
        Self {
            column: Some(column),
            direction,
        }
    }

    /// Direction shown on a column header
    pub fn direction_for(&self, column: SortColumn) -> Option<SortDirection> {
        (self.column == Some(column)).then_some(self.direction)
    }
}

/// Stable sort: equal keys keep their relative order in both directions.
pub fn sort_cities(cities: &mut [City], column: SortColumn, direction: SortDirection) {
    cities.sort_by(|a, b| {
        let ordering = column.compare(a, b);
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}
