//! Parsing of the authored, date-anchored timeline (`realNews`).
//!
//! Entries carry an English and an Italian title/description, a
//! `DD/MM/YYYY` date, an optional `HH:MM` time, an optional integer soul
//! delta and an optional market effect. An entry that cannot be parsed is
//! rejected with a warning; the remaining entries still load.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use gazette_types::{EffectSpec, Locale};
use serde::Deserialize;
use tracing::warn;

use crate::catalog::check_effect;

/// Date format used by the content file.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Time-of-day format used by the content file.
pub const TIME_FORMAT: &str = "%H:%M";

/// One `realNews` entry as written in the content file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawScheduledEvent {
    /// English title.
    pub title: String,
    /// Italian title.
    #[serde(default, alias = "title_it")]
    pub title_it: Option<String>,
    /// English description.
    #[serde(default)]
    pub desc: Option<String>,
    /// Italian description.
    #[serde(default, rename = "desc_it", alias = "descIt")]
    pub desc_it: Option<String>,
    /// Calendar date, `DD/MM/YYYY`.
    pub date: String,
    /// Optional time of day, `HH:MM`.
    #[serde(default)]
    pub time: Option<String>,
    /// Optional narrative-tone delta.
    #[serde(default)]
    pub soul: Option<i32>,
    /// Optional price multiplier.
    #[serde(default)]
    pub price_effect: Option<f64>,
    /// Optional occupancy multiplier.
    #[serde(default)]
    pub occupancy_effect: Option<f64>,
    /// Optional effect lifetime in game hours.
    #[serde(default)]
    pub duration: Option<u64>,
}

/// A validated timeline entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledEvent {
    /// Position in the content file; breaks ties between equal times.
    pub index: usize,
    /// Title per locale.
    pub title: BTreeMap<Locale, String>,
    /// Description per locale (absent locales fall back).
    pub description: BTreeMap<Locale, String>,
    /// Calendar date.
    pub date: NaiveDate,
    /// Time of day, if authored.
    pub time: Option<NaiveTime>,
    /// Explicit soul delta.
    pub soul: Option<i32>,
    /// Market-wide effect applied when the entry fires.
    pub effect: Option<EffectSpec>,
}

impl ScheduledEvent {
    /// The moment this entry is due, using `untimed` when no time was authored.
    pub fn at(&self, untimed: NaiveTime) -> NaiveDateTime {
        self.date.and_time(self.time.unwrap_or(untimed))
    }
}

/// An entry dropped during parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedEvent {
    /// Position in the content file.
    pub index: usize,
    /// Why the entry was dropped.
    pub reason: String,
}

/// Parsed timeline: accepted entries in declaration order plus rejections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schedule {
    /// Entries that parsed successfully.
    pub events: Vec<ScheduledEvent>,
    /// Entries that were dropped.
    pub rejected: Vec<RejectedEvent>,
}

/// Parse the `realNews` array, rejecting malformed entries individually.
pub fn parse_schedule(entries: Vec<serde_json::Value>) -> Schedule {
    let mut schedule = Schedule::default();
    for (index, value) in entries.into_iter().enumerate() {
        let parsed = serde_json::from_value::<RawScheduledEvent>(value)
            .map_err(|e| format!("malformed entry: {e}"))
            .and_then(|raw| parse_entry(index, raw));
        match parsed {
            Ok(event) => schedule.events.push(event),
            Err(reason) => {
                warn!(index, %reason, "Rejected scheduled event");
                schedule.rejected.push(RejectedEvent { index, reason });
            }
        }
    }
    schedule
}

fn parse_entry(index: usize, raw: RawScheduledEvent) -> Result<ScheduledEvent, String> {
    let date = NaiveDate::parse_from_str(raw.date.trim(), DATE_FORMAT)
        .map_err(|e| format!("invalid date {:?}: {e}", raw.date))?;
    let time = raw
        .time
        .as_deref()
        .map(|t| {
            NaiveTime::parse_from_str(t.trim(), TIME_FORMAT)
                .map_err(|e| format!("invalid time {t:?}: {e}"))
        })
        .transpose()?;

    let effect = match (raw.price_effect, raw.occupancy_effect, raw.duration) {
        (None, None, None) => None,
        (Some(price_effect), Some(occupancy_effect), Some(duration_hours)) => {
            let spec = EffectSpec {
                price_effect,
                occupancy_effect,
                duration_hours,
                soul_tendency_modifier: 0.0,
            };
            check_effect(&spec)?;
            Some(spec)
        }
        _ => {
            return Err(
                "priceEffect, occupancyEffect and duration must be given together".to_owned(),
            );
        }
    };

    let mut title = BTreeMap::new();
    title.insert(Locale::english(), raw.title);
    if let Some(text) = raw.title_it {
        title.insert(Locale::italian(), text);
    }

    let mut description = BTreeMap::new();
    if let Some(text) = raw.desc {
        description.insert(Locale::english(), text);
    }
    if let Some(text) = raw.desc_it {
        description.insert(Locale::italian(), text);
    }

    Ok(ScheduledEvent {
        index,
        title,
        description,
        date,
        time,
        soul: raw.soul,
        effect,
    })
}
