//! Screen-reader announcements.
//!
//! Announcements are appended to a bounded rolling buffer; the newest one is
//! the live announcement a host mirrors into its live region.

use std::collections::VecDeque;

use tracing::debug;

/// Default number of announcements kept.
pub const DEFAULT_ANNOUNCEMENT_CAPACITY: usize = 5;

#[derive(Clone, Debug)]
pub struct Announcer {
    buffer: VecDeque<String>,
    capacity: usize,
}

impl Default for Announcer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_ANNOUNCEMENT_CAPACITY)
    }
}

impl Announcer {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn announce(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!(%message, "announce");
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(message);
    }

    /// The most recent announcement.
    pub fn live(&self) -> Option<&str> {
        self.buffer.back().map(String::as_str)
    }

    /// Buffered announcements, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.buffer.iter().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

/// "Dialogue 3 of 7 selected, speaker: Narrator" (1-based position).
pub fn selection_message(index: usize, total: usize, speaker: Option<&str>) -> String {
    match speaker {
        Some(speaker) => format!(
            "Dialogue {} of {} selected, speaker: {}",
            index + 1,
            total,
            speaker
        ),
        None => format!("Dialogue {} of {} selected", index + 1, total),
    }
}
