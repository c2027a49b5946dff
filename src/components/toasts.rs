use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph, Wrap},
};

use super::{Component, ERROR_ICON};
use crate::action::Action;
use crate::notify::{ErrorCategory, Notification, NotificationKind, Notifications};

const TOAST_WIDTH: u16 = 46;
const TOAST_HEIGHT: u16 = 4;

/// Stacked notifications in the top-right corner, newest on top
pub struct Toasts;

pub struct ToastsProps<'a> {
    pub notifications: &'a Notifications,
}

fn accent(kind: NotificationKind) -> (Color, &'static str) {
    match kind {
        NotificationKind::Success => (Color::Green, "✓ Success"),
        NotificationKind::Info => (Color::Cyan, "ℹ Info"),
        NotificationKind::Error(ErrorCategory::Api) => (Color::Red, "API error"),
        NotificationKind::Error(ErrorCategory::Network) => (Color::Red, "Network error"),
        NotificationKind::Error(ErrorCategory::Request) => (Color::Yellow, "Request error"),
    }
}

fn render_toast(frame: &mut Frame, area: Rect, toast: &Notification) {
    let (color, label) = accent(toast.kind);
    let title = match toast.kind {
        NotificationKind::Error(_) => format!(" {ERROR_ICON} {label} "),
        _ => format!(" {label} "),
    };
    let block = Block::bordered()
        .title(Line::from(Span::styled(title, Style::default().fg(color).bold())))
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(Color::Rgb(30, 30, 38)));

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(toast.message.as_str())
            .wrap(Wrap { trim: true })
            .block(block),
        area,
    );
}

impl Component<Action> for Toasts {
    type Props<'a> = ToastsProps<'a>;

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        if props.notifications.is_empty() || area.width < 20 {
            return;
        }
        let width = TOAST_WIDTH.min(area.width);
        let x = area.x + area.width - width;

        for (slot, toast) in props.notifications.iter().rev().enumerate() {
            let y = area.y + 1 + slot as u16 * TOAST_HEIGHT;
            if y + TOAST_HEIGHT > area.y + area.height {
                break;
            }
            render_toast(frame, Rect::new(x, y, width, TOAST_HEIGHT), toast);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tui_dispatch::testing::*;

    #[test]
    fn test_newest_toast_renders_first() {
        let mut notifications = Notifications::default();
        notifications.success("Cities fetched successfully!");
        notifications.error(ErrorCategory::Network, "Network Error");

        let mut render = RenderHarness::new(80, 20);
        let output = render.render_to_string_plain(|frame| {
            Toasts.render(
                frame,
                frame.area(),
                ToastsProps {
                    notifications: &notifications,
                },
            );
        });

        let network = output.find("Network error").expect("error toast");
        let success = output.find("Cities fetched").expect("success toast");
        assert!(network < success);
    }

    #[test]
    fn test_nothing_rendered_without_toasts() {
        let notifications = Notifications::default();
        let mut render = RenderHarness::new(60, 10);
        let output = render.render_to_string_plain(|frame| {
            Toasts.render(
                frame,
                frame.area(),
                ToastsProps {
                    notifications: &notifications,
                },
            );
        });
        assert!(output.trim().is_empty());
    }
}
