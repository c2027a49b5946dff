use artbox::{
    Alignment as ArtAlignment, Fill, LinearGradient, Renderer, fonts,
    integrations::ratatui::ArtBox,
};
use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};
use tui_dispatch::{DataResource, EventKind};
use tui_dispatch_components::{
    StatusBar, StatusBarHint, StatusBarProps, StatusBarSection, StatusBarStyle,
};

use super::report_header::{HEADER_OVERHEAD, gradient_colors};
use super::{CityMap, CityMapProps, Component, ReportHeader, ReportHeaderProps, spinner};
use crate::action::Action;
use crate::api::MISSING_CITY_MESSAGE;
use crate::state::{AppState, City, UnitSystem, WeatherSnapshot};

pub const ERROR_ICON: &str = "\u{26a0}\u{fe0f}";

/// Narrower terminals drop the map and give the report the full width.
const MAP_MIN_WIDTH: u16 = 90;

/// FIGlet caps: terminus is 6 rows tall, miniwi 4.
const HEADER_CAP: u16 = 6 + HEADER_OVERHEAD;
const TEMP_CAP: u16 = 4;

pub struct WeatherReportProps<'a> {
    pub state: &'a AppState,
    pub is_focused: bool,
}

/// Detail screen: weather for the city picked in the table
#[derive(Default)]
pub struct WeatherReport;

impl Component<Action> for WeatherReport {
    type Props<'a> = WeatherReportProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused {
            return None;
        }

        match event {
            EventKind::Key(key) => match key.code {
                KeyCode::Char('r') | KeyCode::F(5) => Some(Action::WeatherFetch),
                KeyCode::Char('u') => Some(Action::UiToggleUnits),
                KeyCode::Esc | KeyCode::Backspace | KeyCode::Left | KeyCode::Char('b') => {
                    Some(Action::DetailClose)
                }
                KeyCode::Char('x') => Some(Action::UiDismissNotification),
                KeyCode::Char('q') => Some(Action::Quit),
                _ => None,
            },
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: WeatherReportProps<'_>) {
        let state = props.state;
        let chunks = Layout::vertical([
            Constraint::Min(1),    // Report (+ map)
            Constraint::Length(1), // Help bar
        ])
        .split(area);

        let city = state.detail.as_ref();
        let body = if chunks[0].width >= MAP_MIN_WIDTH {
            let columns =
                Layout::horizontal([Constraint::Fill(3), Constraint::Fill(2)]).split(chunks[0]);
            let mut map = CityMap;
            map.render(
                frame,
                columns[1],
                CityMapProps {
                    label: city.map(|c| c.name.as_str()).unwrap_or("Map"),
                    coordinates: map_coordinates(state),
                },
            );
            columns[0]
        } else {
            chunks[0]
        };

        match (&state.weather, city) {
            (DataResource::Loaded(weather), Some(city)) => {
                render_ready(frame, body, state, city, weather);
            }
            (DataResource::Loading, Some(city)) => render_loading(frame, body, state, city),
            (DataResource::Failed(error), Some(city)) => {
                render_error(frame, body, state, city, error);
            }
            _ => render_missing(frame, body),
        }

        let mut status_bar = StatusBar::new();
        <StatusBar as Component<Action>>::render(
            &mut status_bar,
            frame,
            chunks[1],
            StatusBarProps {
                left: StatusBarSection::empty(),
                center: StatusBarSection::hints(&[
                    StatusBarHint::new("esc", "back"),
                    StatusBarHint::new("r", "refresh"),
                    StatusBarHint::new("u", units_hint(state.units)),
                    StatusBarHint::new("q", "quit"),
                ]),
                right: StatusBarSection::empty(),
                style: StatusBarStyle::default(),
                is_focused: false,
            },
        );
    }
}

fn units_hint(units: UnitSystem) -> &'static str {
    match units {
        UnitSystem::Metric => "imperial",
        UnitSystem::Imperial => "metric",
    }
}

/// Weather payload coordinates win over the record's, which may be absent.
fn map_coordinates(state: &AppState) -> Option<crate::state::Coordinates> {
    state
        .weather
        .data()
        .map(|weather| weather.coordinates)
        .or_else(|| state.detail.as_ref().and_then(|city| city.coordinates))
}

fn render_header(frame: &mut Frame, area: Rect, state: &AppState, city: &City) {
    let celsius = state
        .weather
        .data()
        .map(|weather| weather.units.to_celsius(weather.temperature));
    ReportHeader.render(
        frame,
        area,
        ReportHeaderProps {
            name: &city.name,
            country: &city.country,
            coordinates: city.coordinates,
            celsius,
            is_animating: state.weather.is_loading(),
            tick_count: state.tick_count,
        },
    );
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn reading(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:>12}  "), Style::default().fg(Color::DarkGray)),
        Span::styled(value, Style::default().fg(Color::White)),
    ])
}

fn readings(weather: &WeatherSnapshot) -> Vec<Line<'static>> {
    let units = weather.units;
    let wind = match weather.wind_gust {
        Some(gust) => format!(
            "{} {} ({}°), gusts {}",
            units.speed(weather.wind_speed),
            weather.wind_compass(),
            weather.wind_deg,
            units.speed(gust)
        ),
        None => format!(
            "{} {} ({}°)",
            units.speed(weather.wind_speed),
            weather.wind_compass(),
            weather.wind_deg
        ),
    };

    vec![
        Line::from(Span::styled(
            format!("{} · {}", weather.condition, capitalize(&weather.description)),
            Style::default().fg(Color::Gray),
        ))
        .centered(),
        Line::default(),
        reading("Feels like", units.temperature(weather.feels_like)),
        reading(
            "Min / Max",
            format!(
                "{} / {}",
                units.temperature(weather.temp_min),
                units.temperature(weather.temp_max)
            ),
        ),
        reading("Humidity", format!("{}%", weather.humidity)),
        reading("Pressure", format!("{} hPa", weather.pressure)),
        reading("Wind", wind),
        reading("Clouds", format!("{}%", weather.cloudiness)),
        reading(
            "Sun",
            format!("↑ {}   ↓ {}", weather.sunrise_local(), weather.sunset_local()),
        ),
    ]
}

fn render_ready(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    city: &City,
    weather: &WeatherSnapshot,
) {
    let lines = readings(weather);
    let chunks = Layout::vertical([
        Constraint::Max(HEADER_CAP),
        Constraint::Length(1),
        Constraint::Max(TEMP_CAP),
        Constraint::Length(1),
        Constraint::Length(lines.len() as u16),
    ])
    .flex(Flex::Center)
    .split(area);

    render_header(frame, chunks[0], state, city);

    let (start, end) = gradient_colors(Some(weather.units.to_celsius(weather.temperature)));
    let renderer = Renderer::new(fonts::stack(&["miniwi"]))
        .with_plain_fallback()
        .with_alignment(ArtAlignment::Center)
        .with_fill(Fill::Linear(LinearGradient::horizontal(start, end)));
    frame.render_widget(
        ArtBox::new(&renderer, &weather.units.temperature(weather.temperature)),
        chunks[2],
    );

    // Summary line, then the readings as a centered column
    let (summary, rest) = lines.split_at(2);
    let width = rest.iter().map(Line::width).max().unwrap_or(0) as u16;
    let [summary_area, readings_area] =
        Layout::vertical([Constraint::Length(2), Constraint::Fill(1)]).areas(chunks[4]);
    let [column] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(readings_area);
    frame.render_widget(Paragraph::new(summary.to_vec()), summary_area);
    frame.render_widget(Paragraph::new(rest.to_vec()), column);
}

fn render_loading(frame: &mut Frame, area: Rect, state: &AppState, city: &City) {
    let chunks = Layout::vertical([
        Constraint::Max(HEADER_CAP),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .flex(Flex::Center)
    .split(area);

    render_header(frame, chunks[0], state, city);
    let message = Line::from(vec![
        Span::styled(
            format!("{} ", spinner(state.tick_count)),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("Loading weather for {}...", city.name),
            Style::default().fg(Color::DarkGray),
        ),
    ])
    .centered();
    frame.render_widget(Paragraph::new(message), chunks[2]);
}

fn render_error(frame: &mut Frame, area: Rect, state: &AppState, city: &City, error: &str) {
    let chunks = Layout::vertical([
        Constraint::Max(HEADER_CAP),
        Constraint::Length(1), // blank
        Constraint::Length(1), // "No data"
        Constraint::Length(1), // message
        Constraint::Length(1), // blank
        Constraint::Length(1), // hint
    ])
    .flex(Flex::Center)
    .split(area);

    render_header(frame, chunks[0], state, city);
    frame.render_widget(
        Paragraph::new(
            Line::from(vec![
                Span::raw(format!("{ERROR_ICON} ")),
                Span::styled("No data", Style::default().fg(Color::Red).bold()),
            ])
            .centered(),
        ),
        chunks[2],
    );
    frame.render_widget(
        Paragraph::new(
            Line::from(Span::styled(
                error.to_string(),
                Style::default().fg(Color::Rgb(200, 100, 100)),
            ))
            .centered(),
        ),
        chunks[3],
    );
    frame.render_widget(Paragraph::new(retry_hint()), chunks[5]);
}

fn render_missing(frame: &mut Frame, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .flex(Flex::Center)
    .split(area);

    frame.render_widget(
        Paragraph::new(
            Line::from(vec![
                Span::raw(format!("{ERROR_ICON} ")),
                Span::styled(MISSING_CITY_MESSAGE, Style::default().fg(Color::Red)),
            ])
            .centered(),
        ),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new(
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::DarkGray)),
                Span::styled("esc", Style::default().fg(Color::Cyan).bold()),
                Span::styled(" to go back", Style::default().fg(Color::DarkGray)),
            ])
            .centered(),
        ),
        chunks[2],
    );
}

fn retry_hint() -> Line<'static> {
    Line::from(vec![
        Span::styled("Press ", Style::default().fg(Color::DarkGray)),
        Span::styled("r", Style::default().fg(Color::Cyan).bold()),
        Span::styled(" to retry", Style::default().fg(Color::DarkGray)),
    ])
    .centered()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Coordinates, Screen};
    use tui_dispatch::testing::*;

    fn detail_state(weather: DataResource<WeatherSnapshot>) -> AppState {
        AppState {
            screen: Screen::Detail,
            detail: Some(City {
                id: 2988507,
                name: "Paris".into(),
                country: "France".into(),
                population: 2_138_551,
                timezone: "Europe/Paris".into(),
                coordinates: Some(Coordinates {
                    lat: 48.85,
                    lon: 2.35,
                }),
            }),
            weather,
            ..Default::default()
        }
    }

    fn snapshot() -> WeatherSnapshot {
        WeatherSnapshot {
            city: "Paris".into(),
            country: "FR".into(),
            condition: "Clouds".into(),
            description: "broken clouds".into(),
            temperature: 18.4,
            feels_like: 17.9,
            temp_min: 16.0,
            temp_max: 20.1,
            pressure: 1014,
            humidity: 63,
            wind_speed: 4.1,
            wind_deg: 240,
            wind_gust: None,
            cloudiness: 75,
            sunrise: 0,
            sunset: 0,
            timezone_offset: 7200,
            coordinates: Coordinates {
                lat: 48.85,
                lon: 2.35,
            },
            units: UnitSystem::Metric,
        }
    }

    fn events(code: &str) -> Vec<Action> {
        let state = detail_state(DataResource::Empty);
        WeatherReport
            .handle_event(
                &EventKind::Key(key(code)),
                WeatherReportProps {
                    state: &state,
                    is_focused: true,
                },
            )
            .into_iter()
            .collect()
    }

    #[test]
    fn test_handle_event_keys() {
        events("r").assert_first(Action::WeatherFetch);
        events("u").assert_first(Action::UiToggleUnits);
        events("esc").assert_first(Action::DetailClose);
        events("q").assert_first(Action::Quit);
        events("z").assert_empty();
    }

    #[test]
    fn test_render_readings() {
        let state = detail_state(DataResource::Loaded(snapshot()));
        let mut render = RenderHarness::new(80, 40);
        let output = render.render_to_string_plain(|frame| {
            WeatherReport.render(
                frame,
                frame.area(),
                WeatherReportProps {
                    state: &state,
                    is_focused: true,
                },
            );
        });

        assert!(output.contains("Broken clouds"));
        assert!(output.contains("63%"));
        assert!(output.contains("1014 hPa"));
        assert!(output.contains("4.1 m/s SW"));
    }

    #[test]
    fn test_render_failure_offers_retry() {
        let state = detail_state(DataResource::Failed("API Error: city not found".into()));
        let mut render = RenderHarness::new(80, 30);
        let output = render.render_to_string_plain(|frame| {
            WeatherReport.render(
                frame,
                frame.area(),
                WeatherReportProps {
                    state: &state,
                    is_focused: true,
                },
            );
        });

        assert!(output.contains("No data"));
        assert!(output.contains("city not found"));
        assert!(output.contains("to retry"));
    }
}
