//! Transient notifications (toasts)

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::api::FetchError;
use crate::state::TICK_MS;

pub const SUCCESS_TTL_MS: u64 = 2_000;
pub const ERROR_TTL_MS: u64 = 4_000;

/// Oldest toasts are dropped beyond this many.
pub const MAX_NOTIFICATIONS: usize = 4;

/// Which side of the request failed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ErrorCategory {
    /// The server answered with a failure status or payload
    Api,
    /// No response arrived
    Network,
    /// The request could not be built or sent
    Request,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum NotificationKind {
    Success,
    Info,
    Error(ErrorCategory),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
    pub remaining_ticks: u32,
}

/// Toast stack, oldest first
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Notifications {
    items: Vec<Notification>,
    next_id: u64,
}

impl Notifications {
    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.push(NotificationKind::Success, message.into(), SUCCESS_TTL_MS)
    }

    pub fn info(&mut self, message: impl Into<String>) -> u64 {
        self.push(NotificationKind::Info, message.into(), SUCCESS_TTL_MS)
    }

    pub fn error(&mut self, category: ErrorCategory, message: impl Into<String>) -> u64 {
        self.push(NotificationKind::Error(category), message.into(), ERROR_TTL_MS)
    }

    pub fn fetch_error(&mut self, error: &FetchError) -> u64 {
        self.error(error.category(), error.to_string())
    }

    fn push(&mut self, kind: NotificationKind, message: String, ttl_ms: u64) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(Notification {
            id,
            kind,
            message,
            remaining_ticks: ttl_ticks(ttl_ms),
        });
        if self.items.len() > MAX_NOTIFICATIONS {
            let overflow = self.items.len() - MAX_NOTIFICATIONS;
            self.items.drain(..overflow);
        }
        id
    }

    /// Age every toast by one tick. Returns true when any expired.
    pub fn tick(&mut self) -> bool {
        let before = self.items.len();
        for item in &mut self.items {
            item.remaining_ticks = item.remaining_ticks.saturating_sub(1);
        }
        self.items.retain(|item| item.remaining_ticks > 0);
        self.items.len() != before
    }

    pub fn dismiss_oldest(&mut self) -> bool {
        if self.items.is_empty() {
            return false;
        }
        self.items.remove(0);
        true
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn count(&self, kind: NotificationKind) -> usize {
        self.items.iter().filter(|item| item.kind == kind).count()
    }

    pub fn last(&self) -> Option<&Notification> {
        self.items.last()
    }
}

fn ttl_ticks(ttl_ms: u64) -> u32 {
    (ttl_ms / TICK_MS.max(1)).max(1) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toasts_expire() {
        let mut toasts = Notifications::default();
        toasts.success("done");
        toasts.error(ErrorCategory::Network, "offline");

        let success_ticks = ttl_ticks(SUCCESS_TTL_MS);
        for _ in 0..success_ticks - 1 {
            assert!(!toasts.tick());
        }
        assert!(toasts.tick(), "success toast expires first");
        assert_eq!(toasts.len(), 1);
        assert_eq!(
            toasts.last().map(|n| n.kind),
            Some(NotificationKind::Error(ErrorCategory::Network))
        );
    }

    #[test]
    fn test_stack_is_bounded() {
        let mut toasts = Notifications::default();
        for i in 0..(MAX_NOTIFICATIONS + 2) {
            toasts.info(format!("toast {i}"));
        }
        assert_eq!(toasts.len(), MAX_NOTIFICATIONS);
        assert_eq!(toasts.iter().next().map(|n| n.id), Some(2));
    }

    #[test]
    fn test_iter_newest_first() {
        let mut toasts = Notifications::default();
        toasts.info("older");
        toasts.success("newer");
        let messages: Vec<&str> = toasts.iter().rev().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["newer", "older"]);
    }

    #[test]
    fn test_dismiss_oldest() {
        let mut toasts = Notifications::default();
        assert!(!toasts.dismiss_oldest());
        toasts.info("a");
        toasts.info("b");
        assert!(toasts.dismiss_oldest());
        assert_eq!(toasts.last().map(|n| n.message.as_str()), Some("b"));
        assert_eq!(toasts.len(), 1);
    }

    #[test]
    fn test_count_by_kind() {
        let mut toasts = Notifications::default();
        toasts.error(ErrorCategory::Api, "a");
        toasts.error(ErrorCategory::Network, "b");
        toasts.success("c");
        assert_eq!(
            toasts.count(NotificationKind::Error(ErrorCategory::Network)),
            1
        );
        assert_eq!(toasts.count(NotificationKind::Success), 1);
    }
}
