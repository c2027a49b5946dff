//! Effects - side effects declared by the reducer

use crate::state::WeatherRequest;

/// Side effects that can be triggered by actions
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Fetch one page of cities at the given offset
    FetchCities { offset: usize },
    /// Fetch current weather for a city in a unit system
    FetchWeather(WeatherRequest),
    /// Drop any outstanding weather request
    CancelWeather,
    /// Apply the text filter once typing has paused
    DebounceFilter { query: String },
    /// Drop a pending debounced filter
    CancelFilter,
}
