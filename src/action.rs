//! Actions: user intents and async results

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::api::FetchError;
use crate::sort::SortColumn;
use crate::state::{City, WeatherRequest, WeatherSnapshot};

/// Application actions with automatic category inference
#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[action(infer_categories)]
pub enum Action {
    // ===== Cities category =====
    /// Intent: load the page at the cursor (startup, retry, scroll trigger)
    CitiesFetch,

    /// Result: one page arrived
    CitiesDidLoad { offset: usize, cities: Vec<City> },

    /// Result: the page request failed
    CitiesDidError { offset: usize, error: FetchError },

    // ===== Table category =====
    /// Move the selection by a number of rows
    TableMove(i16),

    /// Move the selection by whole viewports
    TablePage(i16),

    TableJumpTop,

    TableJumpBottom,

    /// Sort by a column (same column again flips direction)
    TableSort(SortColumn),

    // ===== Filter category =====
    FilterOpen,

    FilterClose,

    /// Filter text changed (debounced before it is applied)
    FilterQueryChange(String),

    /// Debounce elapsed: apply the text filter
    FilterApply(String),

    /// Highlight a suggestion (by index)
    FilterHighlight(usize),

    /// Pick one record by id, or clear with `None`
    FilterSelect(Option<u64>),

    FilterClear,

    // ===== Detail category =====
    /// Open the weather view for the selected row
    DetailOpen,

    DetailClose,

    // ===== Weather category =====
    /// Intent: (re)fetch weather for the open city
    WeatherFetch,

    WeatherDidLoad {
        request: WeatherRequest,
        snapshot: WeatherSnapshot,
    },

    WeatherDidError {
        request: WeatherRequest,
        error: FetchError,
    },

    // ===== UI category =====
    /// Switch metric/imperial (re-fetches on the detail screen)
    UiToggleUnits,

    UiTerminalResize(u16, u16),

    UiDismissNotification,

    /// Force a re-render (for cursor movement, etc.)
    Render,

    // ===== Uncategorized (global) =====
    /// Periodic tick: spinner frames and toast expiry
    Tick,

    Quit,
}
