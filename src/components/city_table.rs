use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Layout},
    prelude::{Frame, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Cell, Paragraph, Row, Table, TableState},
};
use tui_dispatch::EventKind;
use tui_dispatch_components::{
    StatusBar, StatusBarHint, StatusBarProps, StatusBarSection, StatusBarStyle,
};

use super::{Component, group_thousands, spinner};
use crate::action::Action;
use crate::filter::{FilterQuery, FilterState};
use crate::sort::SortColumn;
use crate::state::AppState;

/// Props for CityTable - read-only view of state
pub struct CityTableProps<'a> {
    pub state: &'a AppState,
    pub is_focused: bool,
}

/// The city list screen: title, filter bar, table and help bar
#[derive(Default)]
pub struct CityTable;

impl Component<Action> for CityTable {
    type Props<'a> = CityTableProps<'a>;

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
                KeyCode::Down | KeyCode::Char('j') => Some(Action::TableMove(1)),
                KeyCode::Up | KeyCode::Char('k') => Some(Action::TableMove(-1)),
                KeyCode::PageDown => Some(Action::TablePage(1)),
                KeyCode::PageUp => Some(Action::TablePage(-1)),
                KeyCode::Home | KeyCode::Char('g') => Some(Action::TableJumpTop),
                KeyCode::End | KeyCode::Char('G') => Some(Action::TableJumpBottom),
                KeyCode::Enter => Some(Action::DetailOpen),
                KeyCode::Char('/') => Some(Action::FilterOpen),
                KeyCode::Char('c') => Some(Action::FilterClear),
                KeyCode::Char(digit @ '1'..='4') => {
                    SortColumn::from_digit(digit).map(Action::TableSort)
                }
                KeyCode::Char('r') | KeyCode::F(5) => Some(Action::CitiesFetch),
                KeyCode::Char('u') => Some(Action::UiToggleUnits),
                KeyCode::Char('x') => Some(Action::UiDismissNotification),
                KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
                _ => None,
            },
            EventKind::Scroll { delta, .. } => Some(Action::TableMove((*delta * 3) as i16)),
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: CityTableProps<'_>) {
        let state = props.state;
        let chunks = Layout::vertical([
            Constraint::Length(1), // Title
            Constraint::Length(1), // Filter bar
            Constraint::Min(1),    // Table
            Constraint::Length(1), // Help bar
        ])
        .split(area);

        render_title(frame, chunks[0], state);
        render_filter_bar(frame, chunks[1], state);
        render_table(frame, chunks[2], state);

        let mut status_bar = StatusBar::new();
        <StatusBar as Component<Action>>::render(
            &mut status_bar,
            frame,
            chunks[3],
            StatusBarProps {
                left: StatusBarSection::empty(),
                center: StatusBarSection::hints(&[
                    StatusBarHint::new("enter", "weather"),
                    StatusBarHint::new("/", "filter"),
                    StatusBarHint::new("c", "clear"),
                    StatusBarHint::new("1-4", "sort"),
                    StatusBarHint::new("r", "retry"),
                    StatusBarHint::new("q", "quit"),
                ]),
                right: StatusBarSection::empty(),
                style: StatusBarStyle::default(),
                is_focused: false,
            },
        );
    }
}

fn render_title(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut right = vec![Span::styled(
        format!("{} shown · {} loaded", state.rows.len(), state.cities.len()),
        Style::default().fg(Color::DarkGray),
    )];
    if state.cursor.loading {
        right.insert(
            0,
            Span::styled(
                format!("{} ", spinner(state.tick_count)),
                Style::default().fg(Color::Cyan),
            ),
        );
    }

    let chunks = Layout::horizontal([Constraint::Fill(1), Constraint::Length(32)]).split(area);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "Cities Weather Forecast Table",
            Style::default().fg(Color::Cyan).bold(),
        ))),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new(Line::from(right)).alignment(Alignment::Right),
        chunks[1],
    );
}

fn render_filter_bar(frame: &mut Frame, area: Rect, state: &AppState) {
    let dim = Style::default().fg(Color::DarkGray);
    let line = match &state.filter {
        FilterState::Reloading => Line::from(Span::styled("Reloading cities...", dim)),
        FilterState::Filtered { query, .. } => {
            let label = match query {
                FilterQuery::Text(_) => "Country: ",
                FilterQuery::Selection(_) => "Selected: ",
            };
            Line::from(vec![
                Span::styled(label, dim),
                Span::styled(
                    state.filter_input.clone(),
                    Style::default().fg(Color::Yellow),
                ),
                Span::styled("  (c to clear)", dim),
            ])
        }
        FilterState::Unfiltered if !state.filter_input.trim().is_empty() => Line::from(vec![
            Span::styled("Country: ", dim),
            Span::raw(state.filter_input.clone()),
        ]),
        FilterState::Unfiltered => Line::from(vec![
            Span::styled("Press ", dim),
            Span::styled("/", Style::default().fg(Color::Cyan).bold()),
            Span::styled(" to filter by country", dim),
        ]),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn header_cell(state: &AppState, column: SortColumn, index: usize) -> Cell<'static> {
    let arrow = state
        .sort
        .direction_for(column)
        .map(|direction| format!(" {}", direction.arrow()))
        .unwrap_or_default();
    Cell::from(Line::from(vec![
        Span::styled(format!("{} ", index + 1), Style::default().fg(Color::DarkGray)),
        Span::styled(column.label(), Style::default().bold()),
        Span::styled(arrow, Style::default().fg(Color::Yellow)),
    ]))
}

fn render_table(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut block = Block::bordered().border_style(Style::default().fg(Color::DarkGray));
    if let Some(error) = &state.load_error {
        block = block.title_bottom(
            Line::from(vec![
                Span::styled(
                    format!(" Failed to load data: {error} "),
                    Style::default().fg(Color::Red),
                ),
                Span::styled("r", Style::default().fg(Color::Cyan).bold()),
                Span::styled(" to retry ", Style::default().fg(Color::Red)),
            ])
            .centered(),
        );
    } else if state.cursor.loading {
        block = block.title_bottom(
            Line::from(Span::styled(
                format!(" {} Loading... ", spinner(state.tick_count)),
                Style::default().fg(Color::Cyan),
            ))
            .centered(),
        );
    } else if !state.cursor.has_more {
        block = block.title_bottom(
            Line::from(Span::styled(
                " End of list ",
                Style::default().fg(Color::DarkGray),
            ))
            .centered(),
        );
    }

    let header = Row::new(
        SortColumn::ALL
            .iter()
            .enumerate()
            .map(|(index, column)| header_cell(state, *column, index)),
    );

    let rows = state.rows.iter().map(|city| {
        Row::new(vec![
            Cell::from(city.name.clone()),
            Cell::from(city.country.clone()),
            Cell::from(Line::from(group_thousands(city.population)).alignment(Alignment::Right)),
            Cell::from(city.timezone.clone()),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Fill(3),
            Constraint::Fill(3),
            Constraint::Length(14),
            Constraint::Fill(3),
        ],
    )
    .header(header)
    .block(block)
    .column_spacing(2)
    .row_highlight_style(
        Style::default()
            .bg(Color::Rgb(50, 50, 60))
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("› ");

    let mut table_state = TableState::default()
        .with_offset(state.scroll_top)
        .with_selected(if state.rows.is_empty() {
            None
        } else {
            Some(state.selected)
        });
    frame.render_stateful_widget(table, area, &mut table_state);

    if state.rows.is_empty() {
        let message = if state.cursor.loading {
            "Loading cities..."
        } else if state.load_error.is_some() {
            "No cities loaded"
        } else {
            "No cities"
        };
        let inner = Rect {
            y: area.y.saturating_add(area.height / 2),
            height: 1.min(area.height),
            ..area
        };
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                message,
                Style::default().fg(Color::DarkGray),
            )))
            .alignment(Alignment::Center),
            inner,
        );
    }
}
