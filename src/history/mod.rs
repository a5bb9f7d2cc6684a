//! Append-only calculation history with a replay cursor.

mod entry;

pub use entry::HistoryEntry;

use tracing::debug;

/// Direction of a history step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Towards older entries (-1).
    Back,
    /// Towards newer entries and finally the live buffer (+1).
    Forward,
}

impl TryFrom<i32> for Direction {
    type Error = i32;

    fn try_from(step: i32) -> Result<Self, Self::Error> {
        match step {
            -1 => Ok(Self::Back),
            1 => Ok(Self::Forward),
            other => Err(other),
        }
    }
}

/// Where a history step landed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Position<'a> {
    /// On a recorded entry.
    Entry(&'a HistoryEntry),
    /// Past the newest entry, back at live editing.
    Live,
}

/// Ordered log of finalized calculations.
///
/// The cursor ranges over `0..=len`; `len` means the user is editing live
/// rather than replaying an entry.
#[derive(Clone, Debug, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
    cursor: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finalized entry and return to live editing.
    pub fn record(&mut self, entry: HistoryEntry) {
        debug!(expression = %entry.expression, result = ?entry.result, "recording history entry");
        self.entries.push(entry);
        self.reset_cursor();
    }

    /// Move the cursor one step, clamped to `0..=len`.
    ///
    /// Returns `None` when the cursor was already at the boundary.
    pub fn navigate(&mut self, direction: Direction) -> Option<Position<'_>> {
        let next = match direction {
            Direction::Back => self.cursor.checked_sub(1)?,
            Direction::Forward if self.cursor < self.entries.len() => self.cursor + 1,
            Direction::Forward => return None,
        };
        self.cursor = next;
        debug!(cursor = next, len = self.entries.len(), "history step");

        Some(match self.entries.get(next) {
            Some(entry) => Position::Entry(entry),
            None => Position::Live,
        })
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }

    /// Return to live editing without moving through the entries.
    pub fn reset_cursor(&mut self) {
        self.cursor = self.entries.len();
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if the cursor is past the newest entry.
    pub fn is_live(&self) -> bool {
        self.cursor == self.entries.len()
    }
}
