//! Enumeration types for the Gazette engine.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Event categories
// ---------------------------------------------------------------------------

/// Top-level narrative tone bucket of a procedural news event.
///
/// The set is closed: every subtype in the catalog belongs to exactly one
/// of these four categories, and the sampler always assigns each of them a
/// strictly positive weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum EventCategory {
    /// Good news: festivals, investments, infrastructure openings.
    Positive,
    /// Bad news: disasters, crime waves, strikes.
    Negative,
    /// Flavor news with mild or no market pressure.
    Neutral,
    /// Strange, supernatural, or absurd happenings.
    Surreal,
}

impl EventCategory {
    /// Every category, in declaration order.
    pub const ALL: [Self; 4] = [Self::Positive, Self::Negative, Self::Neutral, Self::Surreal];

    /// The lowercase name used as a key in content files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
            Self::Surreal => "surreal",
        }
    }

    /// Parse a content-file category key. Matching is case-insensitive.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "positive" => Some(Self::Positive),
            "negative" => Some(Self::Negative),
            "neutral" => Some(Self::Neutral),
            "surreal" => Some(Self::Surreal),
            _ => None,
        }
    }
}

impl core::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Timeline state
// ---------------------------------------------------------------------------

/// Lifecycle state of one authored timeline entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ScheduleState {
    /// Not yet reached by the timeline cursor.
    Pending,
    /// Emitted once; never replayed.
    Fired,
}
