use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use tui_dispatch::EventKind;
use tui_dispatch_components::{
    BaseStyle, Modal, ModalBehavior, ModalProps, ModalStyle, Padding, ScrollbarStyle, SelectList,
    SelectListBehavior, SelectListProps, SelectListStyle, SelectionStyle, TextInput,
    TextInputProps, TextInputStyle, centered_rect, highlight_substring,
};

use super::Component;
use crate::action::Action;
use crate::filter::suggestion_label;
use crate::state::City;

const PLACEHOLDER: &str = "Filter by country...";

/// Country filter popup: a text input over a list of matching records
pub struct FilterOverlay {
    input: TextInput,
    list: SelectList,
    modal: Modal,
    was_open: bool,
}

pub struct FilterOverlayProps<'a> {
    pub query: &'a str,
    pub suggestions: &'a [City],
    pub selected: usize,
    pub is_focused: bool,
    pub is_reloading: bool,
}

impl Default for FilterOverlay {
    fn default() -> Self {
        Self {
            input: TextInput::new(),
            list: SelectList::new(),
            modal: Modal::new(),
            was_open: false,
        }
    }
}

impl FilterOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track open/close transitions so each opening starts with fresh widgets.
    pub fn set_open(&mut self, is_open: bool) {
        if is_open && !self.was_open {
            self.input = TextInput::new();
            self.list = SelectList::new();
        }
        self.was_open = is_open;
    }

    fn suggestion_items(suggestions: &[City], query: &str) -> Vec<Line<'static>> {
        let base = Style::default().fg(Color::Reset);
        let highlight = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);
        suggestions
            .iter()
            .map(|city| {
                highlight_substring(&suggestion_label(city), query.trim(), base, highlight)
            })
            .collect()
    }

    fn list_style(padding: Padding) -> SelectListStyle {
        SelectListStyle {
            base: BaseStyle {
                border: None,
                padding,
                bg: None,
                fg: None,
            },
            selection: SelectionStyle::default(),
            scrollbar: ScrollbarStyle::default(),
        }
    }
}

impl Component<Action> for FilterOverlay {
    type Props<'a> = FilterOverlayProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused {
            return Vec::new();
        }

        let EventKind::Key(key) = event else {
            return Vec::new();
        };

        match key.code {
            KeyCode::Esc => return vec![Action::FilterClose],
            KeyCode::Enter => {
                // Pick the highlighted record; with nothing listed, an empty input clears
                if let Some(city) = props.suggestions.get(props.selected) {
                    return vec![Action::FilterSelect(Some(city.id))];
                }
                if props.query.trim().is_empty() {
                    return vec![Action::FilterSelect(None)];
                }
                return vec![Action::FilterClose];
            }
            KeyCode::Down | KeyCode::Up => {
                if props.suggestions.is_empty() {
                    return Vec::new();
                }
                let items = Self::suggestion_items(props.suggestions, props.query);
                let list_props = SelectListProps {
                    items: &items,
                    count: items.len(),
                    selected: props.selected,
                    is_focused: true,
                    style: Self::list_style(Padding::xy(1, 1)),
                    behavior: SelectListBehavior::default(),
                    on_select: Action::FilterHighlight,
                    render_item: &|item| item.clone(),
                };
                return self
                    .list
                    .handle_event(event, list_props)
                    .into_iter()
                    .collect();
            }
            _ => {}
        }

        let style = TextInputStyle {
            base: BaseStyle {
                border: None,
                padding: Padding::new(1, 0, 1, 0),
                bg: None,
                fg: None,
            },
            placeholder_style: None,
            cursor_style: None,
        };
        let input_props = TextInputProps {
            value: props.query,
            placeholder: PLACEHOLDER,
            is_focused: true,
            style,
            on_change: Action::FilterQueryChange,
            on_submit: Action::FilterApply,
            on_cursor_move: Some(|_| Action::Render),
        };
        self.input
            .handle_event(event, input_props)
            .into_iter()
            .collect()
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        if area.width < 20 || area.height < 8 {
            return;
        }

        let FilterOverlay {
            input, list, modal, ..
        } = self;
        let modal_area = centered_rect(64, 14, area);
        let mut render_content = |frame: &mut Frame, content_area: Rect| {
            let chunks = Layout::vertical([
                Constraint::Length(3), // Input
                Constraint::Min(1),    // Suggestions
            ])
            .split(content_area);

            let style = TextInputStyle {
                base: BaseStyle {
                    border: None,
                    padding: Padding::all(1),
                    bg: Some(Color::Rgb(50, 50, 60)),
                    fg: None,
                },
                placeholder_style: None,
                cursor_style: None,
            };
            let input_props = TextInputProps {
                value: props.query,
                placeholder: PLACEHOLDER,
                is_focused: props.is_focused,
                style,
                on_change: Action::FilterQueryChange,
                on_submit: Action::FilterApply,
                on_cursor_move: Some(|_| Action::Render),
            };
            input.render(frame, chunks[0], input_props);

            if props.is_reloading || props.suggestions.is_empty() {
                let message = if props.is_reloading {
                    "No match. Reloading cities..."
                } else if props.query.trim().is_empty() {
                    "Type a country name"
                } else {
                    "Waiting for matches..."
                };
                let hint = Paragraph::new(Line::from(Span::styled(
                    message,
                    Style::default().fg(Color::DarkGray),
                )))
                .centered();
                let hint_area = Rect {
                    y: chunks[1].y.saturating_add(1),
                    height: 1.min(chunks[1].height),
                    ..chunks[1]
                };
                frame.render_widget(hint, hint_area);
                return;
            }

            let items = FilterOverlay::suggestion_items(props.suggestions, props.query);
            let list_props = SelectListProps {
                items: &items,
                count: items.len(),
                selected: props.selected,
                is_focused: props.is_focused,
                style: FilterOverlay::list_style(Padding::all(1)),
                behavior: SelectListBehavior::default(),
                on_select: Action::FilterHighlight,
                render_item: &|item| item.clone(),
            };
            list.render(frame, chunks[1], list_props);
        };

        modal.render(
            frame,
            area,
            ModalProps {
                is_open: true,
                is_focused: props.is_focused,
                area: modal_area,
                style: ModalStyle {
                    base: BaseStyle {
                        bg: Some(Color::Rgb(28, 34, 44)),
                        padding: Padding::default(),
                        border: None,
                        fg: None,
                    },
                    ..Default::default()
                },
                behavior: ModalBehavior::default(),
                on_close: || Action::FilterClose,
                render_content: &mut render_content,
            },
        );
    }
}
