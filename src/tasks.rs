//! Effect runner - turns declared effects into keyed background tasks

use std::sync::Arc;
use std::time::Duration;

use tui_dispatch::{TaskKey, TaskManager};

use crate::action::Action;
use crate::api::ApiClient;
use crate::effect::Effect;
use crate::filter::FILTER_DEBOUNCE_MS;

pub const CITIES_TASK: &str = "cities";
pub const WEATHER_TASK: &str = "weather";
pub const FILTER_TASK: &str = "filter";

/// Each concern has one task key, so a new request replaces the one in
/// flight and a new keystroke restarts the filter's quiet period.
pub fn run_effect(effect: Effect, tasks: &mut TaskManager<Action>, client: &Arc<ApiClient>) {
    match effect {
        Effect::FetchCities { offset } => {
            let client = Arc::clone(client);
            tasks.spawn(CITIES_TASK, async move {
                match client.fetch_cities_page(offset).await {
                    Ok(cities) => {
                        tracing::info!(offset, count = cities.len(), "cities page loaded");
                        Action::CitiesDidLoad { offset, cities }
                    }
                    Err(error) => {
                        tracing::warn!(offset, %error, "cities page failed");
                        Action::CitiesDidError { offset, error }
                    }
                }
            });
        }
        Effect::FetchWeather(request) => {
            let client = Arc::clone(client);
            tasks.spawn(WEATHER_TASK, async move {
                match client.fetch_weather(&request).await {
                    Ok(snapshot) => {
                        tracing::info!(
                            city = %request.city,
                            units = %request.units,
                            "weather loaded"
                        );
                        Action::WeatherDidLoad { request, snapshot }
                    }
                    Err(error) => {
                        tracing::warn!(city = %request.city, %error, "weather request failed");
                        Action::WeatherDidError { request, error }
                    }
                }
            });
        }
        Effect::CancelWeather => {
            tasks.cancel(&TaskKey::new(WEATHER_TASK));
        }
        Effect::DebounceFilter { query } => {
            tasks.debounce(
                FILTER_TASK,
                Duration::from_millis(FILTER_DEBOUNCE_MS),
                async move { Action::FilterApply(query) },
            );
        }
        Effect::CancelFilter => {
            tasks.cancel(&TaskKey::new(FILTER_TASK));
        }
    }
}
