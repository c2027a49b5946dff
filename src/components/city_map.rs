use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Block,
        canvas::{Canvas, Map, MapResolution, Points},
    },
};

use super::Component;
use crate::action::Action;
use crate::state::Coordinates;

/// World map with a marker on the city
pub struct CityMap;

pub struct CityMapProps<'a> {
    pub label: &'a str,
    pub coordinates: Option<Coordinates>,
}

/// Visible window around the marker, in degrees. The whole world when there
/// is nothing to point at.
fn bounds(coordinates: Option<Coordinates>) -> ([f64; 2], [f64; 2]) {
    match coordinates {
        Some(Coordinates { lat, lon }) => {
            const HALF_LON: f64 = 40.0;
            const HALF_LAT: f64 = 20.0;
            let west = (lon - HALF_LON).clamp(-180.0, 180.0 - 2.0 * HALF_LON);
            let south = (lat - HALF_LAT).clamp(-90.0, 90.0 - 2.0 * HALF_LAT);
            ([west, west + 2.0 * HALF_LON], [south, south + 2.0 * HALF_LAT])
        }
        None => ([-180.0, 180.0], [-90.0, 90.0]),
    }
}

impl Component<Action> for CityMap {
    type Props<'a> = CityMapProps<'a>;

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let (x_bounds, y_bounds) = bounds(props.coordinates);
        let title = Line::from(Span::styled(
            format!(" {} ", props.label),
            Style::default().fg(Color::Cyan),
        ));
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(Color::DarkGray));

        let canvas = Canvas::default()
            .block(block)
            .marker(Marker::Braille)
            .x_bounds(x_bounds)
            .y_bounds(y_bounds)
            .paint(|ctx| {
                ctx.draw(&Map {
                    color: Color::Rgb(80, 110, 90),
                    resolution: MapResolution::High,
                });
                if let Some(Coordinates { lat, lon }) = props.coordinates {
                    ctx.layer();
                    ctx.draw(&Points {
                        coords: &[(lon, lat)],
                        color: Color::Red,
                    });
                    ctx.print(lon, lat, Span::styled("●", Style::default().fg(Color::Red)));
                }
            });
        frame.render_widget(canvas, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tui_dispatch::testing::*;

    #[test]
    fn test_bounds_stay_inside_the_world() {
        let (x, y) = bounds(Some(Coordinates {
            lat: 78.2,
            lon: 15.6,
        }));
        assert!(y[1] <= 90.0);
        assert_eq!(y[1] - y[0], 40.0);
        assert!(x[0] >= -180.0);

        let (x, y) = bounds(None);
        assert_eq!(x, [-180.0, 180.0]);
        assert_eq!(y, [-90.0, 90.0]);
    }

    #[test]
    fn test_render_titles_the_map() {
        let mut render = RenderHarness::new(40, 12);
        let output = render.render_to_string_plain(|frame| {
            CityMap.render(
                frame,
                frame.area(),
                CityMapProps {
                    label: "Paris",
                    coordinates: Some(Coordinates {
                        lat: 48.85,
                        lon: 2.35,
                    }),
                },
            );
        });
        assert!(output.contains("Paris"));
    }
}
