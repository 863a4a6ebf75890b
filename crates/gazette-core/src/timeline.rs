//! The authored timeline, consumed in chronological order.
//!
//! Entries are sorted once by due time with a stable sort, so entries due
//! at the same moment keep their declaration order. A single cursor
//! separates fired entries from pending ones and only ever moves forward:
//! every entry fires exactly once.

use chrono::{NaiveDateTime, NaiveTime};
use gazette_content::schedule::ScheduledEvent;
use gazette_types::ScheduleState;
use tracing::debug;

#[derive(Debug, Clone)]
struct Entry {
    at: NaiveDateTime,
    event: ScheduledEvent,
}

/// Ordered, date-indexed authored events advanced by the game clock.
#[derive(Debug, Clone)]
pub struct ScheduledTimeline {
    /// Entries in due order.
    entries: Vec<Entry>,
    /// Entries before this position have fired.
    cursor: usize,
    /// Latest time passed to [`advance_to`](Self::advance_to).
    reached: Option<NaiveDateTime>,
}

impl ScheduledTimeline {
    /// Build a timeline; entries without a time are due at `untimed`.
    pub fn new(events: Vec<ScheduledEvent>, untimed: NaiveTime) -> Self {
        let mut entries: Vec<Entry> = events
            .into_iter()
            .map(|event| Entry {
                at: event.at(untimed),
                event,
            })
            .collect();
        entries.sort_by_key(|e| e.at);
        Self {
            entries,
            cursor: 0,
            reached: None,
        }
    }

    /// Fire every pending entry due at or before `now`, in due order.
    ///
    /// A `now` earlier than a previous call fires nothing.
    pub fn advance_to(&mut self, now: NaiveDateTime) -> Vec<ScheduledEvent> {
        if self.reached.is_some_and(|reached| now < reached) {
            debug!(%now, "Timeline asked to move backwards; ignoring");
            return Vec::new();
        }
        self.reached = Some(now);

        let pending = self.entries.get(self.cursor..).unwrap_or_default();
        let due = pending.iter().take_while(|e| e.at <= now).count();
        let fired: Vec<ScheduledEvent> = pending
            .iter()
            .take(due)
            .map(|e| e.event.clone())
            .collect();
        self.cursor = self.cursor.saturating_add(due);
        fired
    }

    /// State of the entry declared at `index` in the content file.
    pub fn state(&self, index: usize) -> Option<ScheduleState> {
        self.entries
            .iter()
            .position(|e| e.event.index == index)
            .map(|pos| {
                if pos < self.cursor {
                    ScheduleState::Fired
                } else {
                    ScheduleState::Pending
                }
            })
    }

    /// Entries not yet fired, in due order.
    pub fn pending(&self) -> impl Iterator<Item = &ScheduledEvent> {
        self.entries
            .get(self.cursor..)
            .unwrap_or_default()
            .iter()
            .map(|e| &e.event)
    }

    /// Due time of the next pending entry.
    pub fn next_due(&self) -> Option<NaiveDateTime> {
        self.entries.get(self.cursor).map(|e| e.at)
    }

    /// Number of entries that have fired.
    pub const fn fired_count(&self) -> usize {
        self.cursor
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the timeline has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mark every entry pending again.
    pub const fn reset(&mut self) {
        self.cursor = 0;
        self.reached = None;
    }
}
