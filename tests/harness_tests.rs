//! Integrated store + component + render flows with EffectStoreTestHarness

use cityweather::{
    action::Action,
    api::FetchError,
    components::{
        CityTable, CityTableProps, Component, FilterOverlay, FilterOverlayProps, WeatherReport,
        WeatherReportProps,
    },
    effect::Effect,
    filter::FilterState,
    pagination::PAGE_SIZE,
    reducer::reducer,
    state::{AppState, City, Coordinates, Screen, UnitSystem, WeatherRequest, WeatherSnapshot},
};
use tui_dispatch::NumericComponentId;
use tui_dispatch::testing::*;

fn cities() -> Vec<City> {
    [
        (2988507, "Paris", "France", 2_138_551),
        (2950159, "Berlin", "Germany", 3_644_826),
        (2996944, "Lyon", "France", 522_969),
        (3117735, "Madrid", "Spain", 3_255_944),
    ]
    .into_iter()
    .map(|(id, name, country, population)| City {
        id,
        name: name.into(),
        country: country.into(),
        population,
        timezone: "Europe/Paris".into(),
        coordinates: Some(Coordinates { lat: 48.0, lon: 2.0 }),
    })
    .collect()
}

fn snapshot(units: UnitSystem, temperature: f32) -> WeatherSnapshot {
    WeatherSnapshot {
        city: "Paris".into(),
        country: "FR".into(),
        condition: "Clear".into(),
        description: "clear sky".into(),
        temperature,
        feels_like: temperature,
        temp_min: temperature - 1.0,
        temp_max: temperature + 1.0,
        pressure: 1020,
        humidity: 40,
        wind_speed: 3.0,
        wind_deg: 90,
        wind_gust: None,
        cloudiness: 0,
        sunrise: 1_700_000_000,
        sunset: 1_700_030_000,
        timezone_offset: 3600,
        coordinates: Coordinates {
            lat: 48.85,
            lon: 2.35,
        },
        units,
    }
}

/// State after the first (and only) page arrived
fn loaded_state() -> AppState {
    let mut state = AppState::default();
    reducer(&mut state, Action::CitiesFetch);
    reducer(
        &mut state,
        Action::CitiesDidLoad {
            offset: 0,
            cities: cities(),
        },
    );
    state
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_initial_load_flow() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);

    harness.dispatch_collect(Action::CitiesFetch);
    harness.assert_state(|s| s.cursor.loading);

    let effects = harness.drain_effects();
    effects.effects_count(1);
    effects.effects_first_matches(|e| matches!(e, Effect::FetchCities { offset: 0 }));

    harness.complete_action(Action::CitiesDidLoad {
        offset: 0,
        cities: cities(),
    });
    let (changed, total) = harness.process_emitted();
    assert_eq!(total, 1);
    assert_eq!(changed, 1);

    harness.assert_state(|s| s.rows.len() == 4 && !s.cursor.loading);
    harness.assert_state(|s| !s.cursor.has_more);
}

#[test]
fn test_duplicate_intents_while_loading_send_one_request() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);

    harness.dispatch_collect(Action::CitiesFetch);
    harness.dispatch_collect(Action::CitiesFetch);
    harness.dispatch_collect(Action::CitiesFetch);

    let effects = harness.drain_effects();
    effects.effects_count(1);
}

#[test]
fn test_scrolling_to_the_end_requests_next_page() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::UiTerminalResize(80, 16));
    harness.dispatch_collect(Action::CitiesFetch);
    harness.drain_effects();
    harness.complete_action(Action::CitiesDidLoad {
        offset: 0,
        cities: (0..PAGE_SIZE as u64)
            .map(|id| City {
                id,
                name: format!("City {id}"),
                ..Default::default()
            })
            .collect(),
    });
    harness.process_emitted();

    harness.dispatch_collect(Action::TableJumpBottom);
    let effects = harness.drain_effects();
    effects.effects_count(1);
    effects.effects_first_matches(
        |e| matches!(e, Effect::FetchCities { offset } if *offset == PAGE_SIZE),
    );
}

// ============================================================================
// Filter
// ============================================================================

#[test]
fn test_typing_debounces_then_filters() {
    let mut harness = EffectStoreTestHarness::new(loaded_state(), reducer);
    let mut overlay = FilterOverlay::new();

    harness.dispatch_collect(Action::FilterOpen);
    let actions = harness.send_keys::<NumericComponentId, _, _>("f", |state, event| {
        overlay.set_open(state.filter_mode);
        let suggestions = state.filter_suggestions();
        let props = FilterOverlayProps {
            query: &state.filter_input,
            suggestions: &suggestions,
            selected: state.filter_selected,
            is_focused: true,
            is_reloading: state.filter.is_reloading(),
        };
        overlay
            .handle_event(&event.kind, props)
            .into_iter()
            .collect::<Vec<_>>()
    });
    actions.assert_first(Action::FilterQueryChange("f".into()));

    harness.dispatch_collect(Action::FilterQueryChange("fra".into()));
    let effects = harness.drain_effects();
    effects.effects_all_match(|e| matches!(e, Effect::DebounceFilter { .. }));
    harness.assert_state(|s| s.rows.len() == 4);

    // The debounce task fires with the latest text
    harness.complete_action(Action::FilterApply("fra".into()));
    harness.process_emitted();
    harness.assert_state(|s| s.rows.len() == 2);
    harness.assert_state(|s| s.rows.iter().all(|c| c.country == "France"));
}

#[test]
fn test_unmatched_filter_reloads_then_settles() {
    let mut harness = EffectStoreTestHarness::new(loaded_state(), reducer);

    harness.dispatch_collect(Action::FilterApply("atlantis".into()));
    harness.assert_state(|s| s.filter == FilterState::Reloading);
    harness.assert_state(|s| s.rows.is_empty() && s.filter_input.is_empty());
    let effects = harness.drain_effects();
    effects.effects_first_matches(|e| matches!(e, Effect::FetchCities { offset: 0 }));

    harness.complete_action(Action::CitiesDidLoad {
        offset: 0,
        cities: cities(),
    });
    harness.process_emitted();
    harness.assert_state(|s| s.filter == FilterState::Unfiltered);
    harness.assert_state(|s| s.rows.len() == 4);
}

#[test]
fn test_selecting_a_suggestion() {
    let mut harness = EffectStoreTestHarness::new(loaded_state(), reducer);

    harness.dispatch_collect(Action::FilterApply("france".into()));
    harness.dispatch_collect(Action::FilterHighlight(1));
    harness.dispatch_collect(Action::FilterSelect(Some(2996944)));

    harness.assert_state(|s| s.rows.len() == 1 && s.rows[0].name == "Lyon");
    harness.assert_state(|s| s.filter_input == "France - 2996944 (Lyon)");
    harness.assert_state(|s| !s.filter_mode);

    harness.dispatch_collect(Action::FilterSelect(None));
    harness.assert_state(|s| s.rows.len() == 4 && s.filter_input.is_empty());
}

// ============================================================================
// Weather
// ============================================================================

#[test]
fn test_weather_flow_from_table_key() {
    let mut harness = EffectStoreTestHarness::new(loaded_state(), reducer);
    let mut table = CityTable;

    let actions = harness.send_keys::<NumericComponentId, _, _>("enter", |state, event| {
        let props = CityTableProps {
            state,
            is_focused: true,
        };
        table
            .handle_event(&event.kind, props)
            .into_iter()
            .collect::<Vec<_>>()
    });
    for action in actions {
        harness.dispatch_collect(action);
    }

    harness.assert_state(|s| s.screen == Screen::Detail && s.weather.is_loading());
    let effects = harness.drain_effects();
    effects.effects_first_matches(|e| {
        matches!(e, Effect::FetchWeather(request) if request.city == "Paris")
    });

    harness.complete_action(Action::WeatherDidLoad {
        request: WeatherRequest {
            city: "Paris".into(),
            units: UnitSystem::Metric,
        },
        snapshot: snapshot(UnitSystem::Metric, 21.0),
    });
    harness.process_emitted();
    harness.assert_state(|s| s.weather.is_loaded());
    harness.assert_state(|s| {
        s.notifications.last().map(|n| n.message.as_str())
            == Some("Latest weather updates for Paris retrieved successfully.")
    });
}

#[test]
fn test_unit_toggle_refetches_and_ignores_stale_answer() {
    let mut harness = EffectStoreTestHarness::new(loaded_state(), reducer);
    harness.dispatch_collect(Action::DetailOpen);
    harness.drain_effects();

    harness.dispatch_collect(Action::UiToggleUnits);
    let effects = harness.drain_effects();
    effects.effects_first_matches(|e| {
        matches!(e, Effect::FetchWeather(request) if request.units == UnitSystem::Imperial)
    });

    // The metric answer arrives after the toggle and is dropped
    harness.complete_action(Action::WeatherDidLoad {
        request: WeatherRequest {
            city: "Paris".into(),
            units: UnitSystem::Metric,
        },
        snapshot: snapshot(UnitSystem::Metric, 21.0),
    });
    let (changed, _) = harness.process_emitted();
    assert_eq!(changed, 0);
    harness.assert_state(|s| s.weather.is_loading());
}

#[test]
fn test_weather_error_is_reported() {
    let mut harness = EffectStoreTestHarness::new(loaded_state(), reducer);
    harness.dispatch_collect(Action::DetailOpen);

    harness.complete_action(Action::WeatherDidError {
        request: WeatherRequest {
            city: "Paris".into(),
            units: UnitSystem::Metric,
        },
        error: FetchError::Api {
            status: 404,
            message: "city not found".into(),
        },
    });
    harness.process_emitted();

    harness.assert_state(|s| s.weather.is_failed());
    harness.assert_state(|s| s.weather.error() == Some("API Error: city not found"));

    let mut report = WeatherReport;
    let output = harness.render_plain(80, 30, |frame, area, state| {
        let props = WeatherReportProps {
            state,
            is_focused: true,
        };
        report.render(frame, area, props);
    });
    assert!(
        output.contains("No data"),
        "Failure should be visible in output:\n{}",
        output
    );
}

#[test]
fn test_render_unit_toggle_changes_display() {
    let mut harness = EffectStoreTestHarness::new(loaded_state(), reducer);
    harness.dispatch_collect(Action::DetailOpen);
    harness.complete_action(Action::WeatherDidLoad {
        request: WeatherRequest {
            city: "Paris".into(),
            units: UnitSystem::Metric,
        },
        snapshot: snapshot(UnitSystem::Metric, 21.0),
    });
    harness.process_emitted();

    let mut report = WeatherReport;
    let metric = harness.render_plain(80, 40, |frame, area, state| {
        report.render(
            frame,
            area,
            WeatherReportProps {
                state,
                is_focused: true,
            },
        );
    });
    assert!(metric.contains("m/s"));

    harness.dispatch_collect(Action::UiToggleUnits);
    harness.complete_action(Action::WeatherDidLoad {
        request: WeatherRequest {
            city: "Paris".into(),
            units: UnitSystem::Imperial,
        },
        snapshot: snapshot(UnitSystem::Imperial, 69.8),
    });
    harness.process_emitted();

    let imperial = harness.render_plain(80, 40, |frame, area, state| {
        report.render(
            frame,
            area,
            WeatherReportProps {
                state,
                is_focused: true,
            },
        );
    });
    assert!(imperial.contains("mph"));
    assert_ne!(metric, imperial);
}
