//! Offset pagination for the city list

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Records requested per page. A shorter page means the list is exhausted.
pub const PAGE_SIZE: usize = 20;

/// Fraction of the table that must be scrolled past before the next page loads.
pub const LOAD_MORE_THRESHOLD: f64 = 0.8;

/// Position in the remote city list plus the in-flight gate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PageCursor {
    /// Offset of the next page to request
    pub offset: usize,
    pub has_more: bool,
    /// Set while a page request is outstanding; no second request is issued.
    pub loading: bool,
}

impl Default for PageCursor {
    fn default() -> Self {
        Self {
            offset: 0,
            has_more: true,
            loading: false,
        }
    }
}

impl PageCursor {
    /// Close the gate and hand out the offset to request, or `None` while a
    /// request is already in flight.
    pub fn begin(&mut self) -> Option<usize> {
        if self.loading {
            return None;
        }
        self.loading = true;
        Some(self.offset)
    }

    /// Whether a result for `offset` answers the outstanding request.
    pub fn awaits(&self, offset: usize) -> bool {
        self.loading && self.offset == offset
    }

    /// Record a successful page of `page_len` records.
    pub fn complete(&mut self, page_len: usize) {
        self.loading = false;
        self.offset += PAGE_SIZE;
        self.has_more = page_len >= PAGE_SIZE;
    }

    /// Record a failed request. The offset stays put so a retry asks again.
    pub fn fail(&mut self) {
        self.loading = false;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Scroll trigger: the bottom edge of the viewport has reached the threshold
/// of the table height and a page can be requested.
pub fn should_load_more(
    scroll_top: usize,
    viewport_height: usize,
    total_height: usize,
    loading: bool,
    has_more: bool,
) -> bool {
    if loading || !has_more {
        return false;
    }
    (scroll_top + viewport_height) as f64 >= total_height as f64 * LOAD_MORE_THRESHOLD
}
