//! Application state - single source of truth

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tui_dispatch::DataResource;

use crate::api::FetchError;
use crate::filter::{filter_by_country, suggestion_label, FilterState};
use crate::notify::Notifications;
use crate::pagination::PageCursor;
use crate::sort::SortState;

/// Interval of the global tick subscription (spinner + toast expiry).
pub const TICK_MS: u64 = 100;

/// Rows taken by the table screen around the table body:
/// title, filter bar, table borders (2), header row, status bar.
pub const TABLE_CHROME_ROWS: u16 = 6;

/// Geographic position of a city
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// A city record as delivered by the cities API.
///
/// Records are never mutated after they arrive. Two records are equal when
/// they carry the same geoname id, whatever their other fields say.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct City {
    pub id: u64,
    pub name: String,
    pub country: String,
    pub population: u64,
    pub timezone: String,
    pub coordinates: Option<Coordinates>,
}

impl PartialEq for City {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for City {}

/// Unit system requested from the weather API
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn toggle(&self) -> Self {
        match self {
            UnitSystem::Metric => UnitSystem::Imperial,
            UnitSystem::Imperial => UnitSystem::Metric,
        }
    }

    /// Value of the `units` query parameter
    pub fn as_param(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    pub fn temperature(&self, value: f32) -> String {
        match self {
            UnitSystem::Metric => format!("{:.1}°C", value),
            UnitSystem::Imperial => format!("{:.1}°F", value),
        }
    }

    pub fn speed(&self, value: f32) -> String {
        match self {
            UnitSystem::Metric => format!("{:.1} m/s", value),
            UnitSystem::Imperial => format!("{:.1} mph", value),
        }
    }

    /// Temperature converted to Celsius, used only to pick display colors.
    pub fn to_celsius(&self, value: f32) -> f32 {
        match self {
            UnitSystem::Metric => value,
            UnitSystem::Imperial => (value - 32.0) * 5.0 / 9.0,
        }
    }
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_param())
    }
}

/// One weather request: a city name and the unit system it was asked in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct WeatherRequest {
    pub city: String,
    pub units: UnitSystem,
}

/// Point-in-time weather reading for one city
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WeatherSnapshot {
    pub city: String,
    pub country: String,
    /// Condition group, e.g. "Rain"
    pub condition: String,
    pub description: String,
    pub temperature: f32,
    pub feels_like: f32,
    pub temp_min: f32,
    pub temp_max: f32,
    /// hPa
    pub pressure: u32,
    /// Percent
    pub humidity: u8,
    pub wind_speed: f32,
    /// Meteorological degrees
    pub wind_deg: u16,
    pub wind_gust: Option<f32>,
    /// Percent
    pub cloudiness: u8,
    /// Unix seconds, UTC
    pub sunrise: i64,
    pub sunset: i64,
    /// Shift from UTC in seconds
    pub timezone_offset: i32,
    pub coordinates: Coordinates,
    pub units: UnitSystem,
}

impl WeatherSnapshot {
    pub fn sunrise_local(&self) -> String {
        local_clock(self.sunrise, self.timezone_offset)
    }

    pub fn sunset_local(&self) -> String {
        local_clock(self.sunset, self.timezone_offset)
    }

    pub fn wind_compass(&self) -> &'static str {
        compass_point(self.wind_deg)
    }
}

/// `HH:MM` wall-clock time at the city for a UTC unix timestamp.
pub fn local_clock(unix: i64, offset_secs: i32) -> String {
    let secs = (unix + i64::from(offset_secs)).rem_euclid(86_400);
    format!("{:02}:{:02}", secs / 3600, secs % 3600 / 60)
}

pub fn compass_point(deg: u16) -> &'static str {
    const POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    let index = ((f32::from(deg % 360) + 22.5) / 45.0) as usize % POINTS.len();
    POINTS[index]
}

/// Which screen is showing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Screen {
    #[default]
    Table,
    Detail,
}

/// Application state - everything the UI needs to render
#[derive(Clone, Debug, tui_dispatch::DebugState, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppState {
    #[debug(section = "App", label = "Screen", debug_fmt)]
    pub screen: Screen,

    #[debug(section = "App", label = "Terminal", debug_fmt)]
    pub terminal_size: (u16, u16),

    // --- City list ---
    /// Every record fetched so far, in arrival order
    #[debug(skip)]
    pub cities: Vec<City>,

    /// Rows currently shown in the table (filtered and/or sorted)
    #[debug(skip)]
    pub rows: Vec<City>,

    #[debug(section = "Cities", label = "Cursor", debug_fmt)]
    pub cursor: PageCursor,

    #[debug(section = "Cities", label = "Load error", debug_fmt)]
    pub load_error: Option<FetchError>,

    #[debug(section = "Cities", label = "Selected")]
    pub selected: usize,

    /// First visible table row
    #[debug(section = "Cities", label = "Scroll top")]
    pub scroll_top: usize,

    #[debug(section = "Cities", label = "Sort", debug_fmt)]
    pub sort: SortState,

    // --- Filter ---
    #[debug(section = "Filter", label = "State", debug_fmt)]
    pub filter: FilterState,

    /// Whether the filter overlay is open
    #[debug(skip)]
    pub filter_mode: bool,

    /// Text shown in the filter input
    #[debug(section = "Filter", label = "Input")]
    pub filter_input: String,

    /// Highlighted suggestion in the overlay
    #[debug(skip)]
    pub filter_selected: usize,

    // --- Detail ---
    /// Record handed over from the table when the detail screen opened
    #[debug(section = "Weather", label = "City", debug_fmt)]
    pub detail: Option<City>,

    /// Weather lifecycle: Empty → Loading → Loaded/Failed
    #[debug(section = "Weather", label = "Data", debug_fmt)]
    pub weather: DataResource<WeatherSnapshot>,

    /// The request whose answer is awaited or displayed
    #[debug(section = "Weather", label = "Request", debug_fmt)]
    pub weather_request: Option<WeatherRequest>,

    #[debug(section = "Weather", label = "Units", debug_fmt)]
    pub units: UnitSystem,

    // --- Toasts + animation ---
    #[debug(skip)]
    pub notifications: Notifications,

    #[debug(skip)]
    pub tick_count: u32,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(UnitSystem::default())
    }
}

impl AppState {
    pub fn new(units: UnitSystem) -> Self {
        Self {
            screen: Screen::Table,
            terminal_size: (80, 24),
            cities: Vec::new(),
            rows: Vec::new(),
            cursor: PageCursor::default(),
            load_error: None,
            selected: 0,
            scroll_top: 0,
            sort: SortState::default(),
            filter: FilterState::Unfiltered,
            filter_mode: false,
            filter_input: String::new(),
            filter_selected: 0,
            detail: None,
            weather: DataResource::Empty,
            weather_request: None,
            units,
            notifications: Notifications::default(),
            tick_count: 0,
        }
    }

    /// Number of table body rows visible at the current terminal size
    pub fn table_viewport_rows(&self) -> usize {
        usize::from(self.terminal_size.1.saturating_sub(TABLE_CHROME_ROWS).max(1))
    }

    pub fn selected_city(&self) -> Option<&City> {
        self.rows.get(self.selected)
    }

    /// Rows the filter works from: the stored pre-filter rows while a filter
    /// is active, the displayed rows otherwise.
    pub fn unfiltered_rows(&self) -> &[City] {
        match &self.filter {
            FilterState::Filtered { base, .. } => base,
            _ => &self.rows,
        }
    }

    /// Suggestions offered by the filter overlay, matched against the text
    /// currently in the input rather than the last applied filter. An empty
    /// input, or the label of the current selection, offers every record.
    pub fn filter_suggestions(&self) -> Vec<City> {
        let base = self.unfiltered_rows();
        let query = self.filter_input.trim();
        let shows_selection = self.filter.is_selection()
            && self.rows.first().map(suggestion_label).as_deref() == Some(query);
        if query.is_empty() || shows_selection {
            base.to_vec()
        } else {
            filter_by_country(base, query)
        }
    }

    pub fn is_busy(&self) -> bool {
        self.cursor.loading || self.weather.is_loading()
    }

    /// Move the selection, keeping it inside the viewport.
    pub fn set_selected(&mut self, index: usize) -> bool {
        if self.rows.is_empty() {
            let changed = self.selected != 0 || self.scroll_top != 0;
            self.selected = 0;
            self.scroll_top = 0;
            return changed;
        }
        let bounded = index.min(self.rows.len() - 1);
        let before = (self.selected, self.scroll_top);
        self.selected = bounded;
        self.clamp_scroll();
        before != (self.selected, self.scroll_top)
    }

    pub fn clamp_scroll(&mut self) {
        let viewport = self.table_viewport_rows();
        if self.selected < self.scroll_top {
            self.scroll_top = self.selected;
        } else if self.selected >= self.scroll_top + viewport {
            self.scroll_top = self.selected + 1 - viewport;
        }
        let max_top = self.rows.len().saturating_sub(viewport);
        self.scroll_top = self.scroll_top.min(max_top);
    }

    pub fn reset_selection(&mut self) {
        self.selected = 0;
        self.scroll_top = 0;
    }
}
