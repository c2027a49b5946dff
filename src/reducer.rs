//! Reducer - pure function: (state, action) -> DispatchResult

use tui_dispatch::{DataResource, DispatchResult};

use crate::action::Action;
use crate::api::MISSING_CITY_MESSAGE;
use crate::effect::Effect;
use crate::filter::{filter_by_country, filter_by_id, suggestion_label, FilterQuery, FilterState};
use crate::notify::ErrorCategory;
use crate::pagination::should_load_more;
use crate::sort::sort_cities;
use crate::state::{AppState, City, Screen, WeatherRequest};

/// The reducer handles all state transitions
pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        // ===== Cities actions =====
        Action::CitiesFetch => {
            if !state.cursor.has_more && state.load_error.is_none() {
                return DispatchResult::unchanged();
            }
            match start_page_load(state) {
                Some(effect) => DispatchResult::changed_with(effect),
                None => DispatchResult::unchanged(),
            }
        }

        Action::CitiesDidLoad { offset, cities } => {
            if !state.cursor.awaits(offset) {
                return DispatchResult::unchanged();
            }
            state.cursor.complete(cities.len());
            state.load_error = None;
            if state.filter.is_reloading() {
                state.filter = FilterState::Unfiltered;
            }
            if let FilterState::Filtered { base, .. } = &mut state.filter {
                base.extend(cities.iter().cloned());
            }
            let admitted: Vec<City> = cities
                .iter()
                .filter(|city| state.filter.admits(city))
                .cloned()
                .collect();
            state.rows.extend(admitted);
            state.cities.extend(cities);
            apply_sort(state);
            state.notifications.success("Cities fetched successfully!");
            DispatchResult::changed()
        }

        Action::CitiesDidError { offset, error } => {
            if !state.cursor.awaits(offset) {
                return DispatchResult::unchanged();
            }
            state.cursor.fail();
            if state.filter.is_reloading() {
                state.filter = FilterState::Unfiltered;
            }
            state.notifications.fetch_error(&error);
            state.load_error = Some(error);
            DispatchResult::changed()
        }

        // ===== Table actions =====
        Action::TableMove(delta) => {
            let target = offset_index(state.selected, isize::from(delta));
            scroll_to(state, target)
        }

        Action::TablePage(pages) => {
            let viewport = state.table_viewport_rows() as isize;
            let target = offset_index(state.selected, isize::from(pages) * viewport);
            scroll_to(state, target)
        }

        Action::TableJumpTop => scroll_to(state, 0),

        Action::TableJumpBottom => {
            let last = state.rows.len().saturating_sub(1);
            scroll_to(state, last)
        }

        Action::TableSort(column) => {
            state.sort = state.sort.toggle(column);
            apply_sort(state);
            DispatchResult::changed()
        }

        // ===== Filter actions =====
        Action::FilterOpen => {
            state.filter_mode = true;
            state.filter_selected = 0;
            DispatchResult::changed()
        }

        Action::FilterClose => {
            state.filter_mode = false;
            DispatchResult::changed()
        }

        Action::FilterQueryChange(query) => {
            state.filter_input = query.clone();
            state.filter_selected = 0;
            DispatchResult::changed_with(Effect::DebounceFilter { query })
        }

        Action::FilterApply(query) => {
            if state.filter.is_reloading() {
                return DispatchResult::unchanged();
            }
            if query.trim().is_empty() {
                clear_filter(state);
                return DispatchResult::changed();
            }
            let base = state.unfiltered_rows().to_vec();
            let matches = filter_by_country(&base, &query);
            if matches.is_empty() {
                return DispatchResult::changed_with_many(begin_reload(state, &query));
            }
            state.rows = matches;
            state.filter = FilterState::Filtered {
                query: FilterQuery::Text(query),
                base,
            };
            state.filter_selected = 0;
            state.reset_selection();
            DispatchResult::changed()
        }

        Action::FilterHighlight(index) => {
            if index < state.filter_suggestions().len() && index != state.filter_selected {
                state.filter_selected = index;
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::FilterSelect(Some(id)) => {
            if state.filter.is_reloading() {
                return DispatchResult::unchanged();
            }
            state.filter_mode = false;
            let base = state.unfiltered_rows().to_vec();
            let matches = filter_by_id(&base, id);
            let Some(first) = matches.first() else {
                let mut effects = vec![Effect::CancelFilter];
                effects.extend(begin_reload(state, &id.to_string()));
                return DispatchResult::changed_with_many(effects);
            };
            state.filter_input = suggestion_label(first);
            state.rows = matches;
            state.filter = FilterState::Filtered {
                query: FilterQuery::Selection(id),
                base,
            };
            state.filter_selected = 0;
            state.reset_selection();
            DispatchResult::changed_with(Effect::CancelFilter)
        }

        Action::FilterSelect(None) | Action::FilterClear => {
            clear_filter(state);
            state.filter_input.clear();
            state.filter_selected = 0;
            state.filter_mode = false;
            DispatchResult::changed_with(Effect::CancelFilter)
        }

        // ===== Detail actions =====
        Action::DetailOpen => {
            let Some(city) = state.selected_city().cloned() else {
                return DispatchResult::unchanged();
            };
            state.screen = Screen::Detail;
            state.detail = Some(city);
            state.filter_mode = false;
            start_weather_fetch(state)
        }

        Action::DetailClose => {
            if state.screen != Screen::Detail {
                return DispatchResult::unchanged();
            }
            state.screen = Screen::Table;
            state.detail = None;
            state.weather = DataResource::Empty;
            state.weather_request = None;
            DispatchResult::changed_with(Effect::CancelWeather)
        }

        // ===== Weather actions =====
        Action::WeatherFetch => {
            if state.screen != Screen::Detail {
                return DispatchResult::unchanged();
            }
            start_weather_fetch(state)
        }

        Action::WeatherDidLoad { request, snapshot } => {
            if state.weather_request.as_ref() != Some(&request) {
                return DispatchResult::unchanged();
            }
            state.notifications.success(format!(
                "Latest weather updates for {} retrieved successfully.",
                request.city
            ));
            state.weather = DataResource::Loaded(snapshot);
            DispatchResult::changed()
        }

        Action::WeatherDidError { request, error } => {
            if state.weather_request.as_ref() != Some(&request) {
                return DispatchResult::unchanged();
            }
            state.notifications.fetch_error(&error);
            state.weather = DataResource::Failed(error.to_string());
            DispatchResult::changed()
        }

        // ===== UI actions =====
        Action::UiToggleUnits => {
            state.units = state.units.toggle();
            if state.screen == Screen::Detail && state.detail.is_some() {
                start_weather_fetch(state)
            } else {
                DispatchResult::changed()
            }
        }

        Action::UiTerminalResize(width, height) => {
            state.terminal_size = (width, height);
            state.clamp_scroll();
            match maybe_load_more(state) {
                Some(effect) => DispatchResult::changed_with(effect),
                None => DispatchResult::changed(),
            }
        }

        Action::UiDismissNotification => {
            if state.notifications.dismiss_oldest() {
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Render => DispatchResult::changed(),

        // ===== Global actions =====
        Action::Tick => {
            let expired = state.notifications.tick();
            let animating = state.is_busy();
            if animating {
                state.tick_count = state.tick_count.wrapping_add(1);
            }
            if expired || animating {
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

/// Close the loading gate and declare the page request, unless one is
/// already in flight.
fn start_page_load(state: &mut AppState) -> Option<Effect> {
    let offset = state.cursor.begin()?;
    state.load_error = None;
    Some(Effect::FetchCities { offset })
}

/// Scroll trigger, evaluated after every selection move and resize.
fn maybe_load_more(state: &mut AppState) -> Option<Effect> {
    if state.filter != FilterState::Unfiltered || state.load_error.is_some() {
        return None;
    }
    let fire = should_load_more(
        state.scroll_top,
        state.table_viewport_rows(),
        state.rows.len(),
        state.cursor.loading,
        state.cursor.has_more,
    );
    if fire {
        start_page_load(state)
    } else {
        None
    }
}

fn scroll_to(state: &mut AppState, index: usize) -> DispatchResult<Effect> {
    let moved = state.set_selected(index);
    match maybe_load_more(state) {
        Some(effect) => DispatchResult::changed_with(effect),
        None if moved => DispatchResult::changed(),
        None => DispatchResult::unchanged(),
    }
}

fn offset_index(current: usize, delta: isize) -> usize {
    if delta < 0 {
        current.saturating_sub(delta.unsigned_abs())
    } else {
        current.saturating_add(delta as usize)
    }
}

/// Keep the displayed rows, and the rows a filter will restore, in the
/// active column order. Arrival order breaks ties.
fn apply_sort(state: &mut AppState) {
    let Some(column) = state.sort.column else {
        return;
    };
    let direction = state.sort.direction;
    sort_cities(&mut state.rows, column, direction);
    if let FilterState::Filtered { base, .. } = &mut state.filter {
        sort_cities(base, column, direction);
    }
}

/// Put back the rows shown before the filter. No-op unless filtered.
fn clear_filter(state: &mut AppState) {
    match std::mem::take(&mut state.filter) {
        FilterState::Filtered { base, .. } => {
            state.rows = base;
            state.reset_selection();
        }
        other => state.filter = other,
    }
}

/// A filter matched nothing: drop the list and fetch it again from the start.
fn begin_reload(state: &mut AppState, label: &str) -> Vec<Effect> {
    state.cities.clear();
    state.rows.clear();
    state.cursor.reset();
    state.load_error = None;
    state.filter = FilterState::Reloading;
    state.filter_input.clear();
    state.filter_selected = 0;
    state.reset_selection();
    state
        .notifications
        .info(format!("No cities match \"{}\". Reloading the list.", label.trim()));
    start_page_load(state).into_iter().collect()
}

fn start_weather_fetch(state: &mut AppState) -> DispatchResult<Effect> {
    let city = state
        .detail
        .as_ref()
        .map(|city| city.name.trim().to_string())
        .unwrap_or_default();
    if city.is_empty() {
        state.weather = DataResource::Empty;
        state.weather_request = None;
        state
            .notifications
            .error(ErrorCategory::Request, MISSING_CITY_MESSAGE);
        return DispatchResult::changed();
    }

    let request = WeatherRequest {
        city,
        units: state.units,
    };
    state.weather = DataResource::Loading;
    state.weather_request = Some(request.clone());
    state.tick_count = 0;
    DispatchResult::changed_with(Effect::FetchWeather(request))
}
