use artbox::{
    Alignment as ArtAlignment, Color as ArtColor, ColorStop, Fill, LinearGradient, Renderer,
    fonts, integrations::ratatui::ArtBox,
};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use super::Component;
use crate::action::Action;
use crate::state::Coordinates;

/// Ticks for one full sweep of the gradient while a request is in flight
const SHIMMER_CYCLE_TICKS: u32 = 24;

/// City name in FIGlet letters, with country and coordinates below.
pub struct ReportHeader;

pub struct ReportHeaderProps<'a> {
    pub name: &'a str,
    pub country: &'a str,
    pub coordinates: Option<Coordinates>,
    /// Current temperature in Celsius, picks the gradient
    pub celsius: Option<f32>,
    pub is_animating: bool,
    pub tick_count: u32,
}

/// Rows below the FIGlet name: country/coordinates line.
pub const HEADER_OVERHEAD: u16 = 1;

pub(crate) fn gradient_colors(celsius: Option<f32>) -> (ArtColor, ArtColor) {
    match celsius {
        Some(t) if t < 0.0 => (ArtColor::rgb(150, 200, 255), ArtColor::rgb(200, 230, 255)),
        Some(t) if t < 15.0 => (ArtColor::rgb(100, 180, 255), ArtColor::rgb(150, 220, 200)),
        Some(t) if t < 25.0 => (ArtColor::rgb(100, 200, 150), ArtColor::rgb(255, 220, 100)),
        Some(t) if t < 35.0 => (ArtColor::rgb(255, 180, 80), ArtColor::rgb(255, 120, 80)),
        Some(_) => (ArtColor::rgb(255, 100, 80), ArtColor::rgb(255, 60, 60)),
        None => (ArtColor::rgb(180, 180, 180), ArtColor::rgb(220, 220, 220)),
    }
}

fn shimmer(colors: (ArtColor, ArtColor), phase: f32) -> Fill {
    let phase = phase.rem_euclid(1.0);
    let edge = colors.0.interpolate(colors.1, 0.1);
    let base = [(0.0, edge), (0.4, colors.0), (0.6, colors.1), (1.0, edge)];

    let wrap = sample(&base, 1.0 - phase).unwrap_or(edge);
    let mut stops: Vec<(f32, ArtColor)> = base
        .iter()
        .map(|(pos, color)| ((pos + phase) % 1.0, *color))
        .collect();
    stops.push((0.0, wrap));
    stops.push((1.0, wrap));
    stops.sort_by(|a, b| a.0.total_cmp(&b.0));

    Fill::Linear(LinearGradient::new(
        5.0,
        stops
            .into_iter()
            .map(|(pos, color)| ColorStop::new(pos, color))
            .collect(),
    ))
}

/// Color at `position` along a sorted list of stops.
fn sample(stops: &[(f32, ArtColor)], position: f32) -> Option<ArtColor> {
    let pos = position.clamp(0.0, 1.0);
    let mut prev = *stops.first()?;
    for stop in stops {
        if stop.0 >= pos {
            let span = stop.0 - prev.0;
            if span.abs() < f32::EPSILON {
                return Some(stop.1);
            }
            return Some(prev.1.interpolate(stop.1, (pos - prev.0) / span));
        }
        prev = *stop;
    }
    stops.last().map(|stop| stop.1)
}

fn coordinates_label(coordinates: Option<Coordinates>) -> String {
    match coordinates {
        Some(Coordinates { lat, lon }) => {
            let ns = if lat < 0.0 { 'S' } else { 'N' };
            let ew = if lon < 0.0 { 'W' } else { 'E' };
            format!("{:.2}°{ns}, {:.2}°{ew}", lat.abs(), lon.abs())
        }
        None => "no coordinates".to_string(),
    }
}

impl Component<Action> for ReportHeader {
    type Props<'a> = ReportHeaderProps<'a>;

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let chunks = Layout::vertical([
            Constraint::Fill(1),   // FIGlet name
            Constraint::Length(1), // Country + coordinates
        ])
        .split(area);

        let phase = if props.is_animating {
            (props.tick_count % SHIMMER_CYCLE_TICKS) as f32 / SHIMMER_CYCLE_TICKS as f32
        } else {
            0.0
        };
        let renderer = Renderer::new(fonts::stack(&["terminus", "miniwi"]))
            .with_plain_fallback()
            .with_alignment(ArtAlignment::Center)
            .with_fill(shimmer(gradient_colors(props.celsius), phase));
        frame.render_widget(ArtBox::new(&renderer, props.name), chunks[0]);

        let line = Line::from(vec![
            Span::styled(props.country.to_string(), Style::default().fg(Color::Gray)),
            Span::styled("  ·  ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                coordinates_label(props.coordinates),
                Style::default().fg(Color::DarkGray),
            ),
        ])
        .centered();
        frame.render_widget(Paragraph::new(line), chunks[1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_label_hemispheres() {
        let label = coordinates_label(Some(Coordinates {
            lat: -33.87,
            lon: 151.21,
        }));
        assert_eq!(label, "33.87°S, 151.21°E");
        assert_eq!(coordinates_label(None), "no coordinates");
    }

    #[test]
    fn test_sample_handles_empty_stops() {
        assert!(sample(&[], 0.5).is_none());
    }
}
