//! Core data structs shared between the content loader, the market model,
//! and the engine session.
//!
//! Field names on the wire follow the content format (`priceEffect`,
//! `occupancyEffect`, ...) so the same structs can be read from content
//! files and handed to the UI.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::EventCategory;
use crate::ids::{EffectId, PropertyId};
use crate::locale::Locale;

// ---------------------------------------------------------------------------
// Effects
// ---------------------------------------------------------------------------

/// Numeric market impact of an event.
///
/// Multipliers are strictly positive (checked at load time by the content
/// crate). `duration_hours` bounds how long the effect stays active before
/// it expires on its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct EffectSpec {
    /// Multiplier applied to property prices, typically 0.7 to 1.3.
    pub price_effect: f64,
    /// Multiplier applied to occupancy, typically 0.2 to 1.5.
    pub occupancy_effect: f64,
    /// Lifetime of the effect in game hours (> 0).
    #[serde(rename = "duration")]
    pub duration_hours: u64,
    /// Narrative-tone delta contributed each time the event occurs.
    #[serde(default)]
    pub soul_tendency_modifier: f64,
}

impl EffectSpec {
    /// Hour at which an effect applied at `applied_at` expires.
    pub const fn expires_at(&self, applied_at: u64) -> u64 {
        applied_at.saturating_add(self.duration_hours)
    }
}

/// What an active effect applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(tag = "kind", content = "id")]
#[ts(export, export_to = "bindings/")]
pub enum EffectTarget {
    /// The whole market: every listing plus the market-wide index.
    Market,
    /// A single registered listing.
    Property(PropertyId),
}

/// Combined price and occupancy multipliers for one target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MarketMultipliers {
    /// Product of every active price effect on the target.
    pub price: f64,
    /// Product of every active occupancy effect on the target.
    pub occupancy: f64,
}

impl MarketMultipliers {
    /// Multipliers with no effect applied.
    pub const NEUTRAL: Self = Self {
        price: 1.0,
        occupancy: 1.0,
    };

    /// Compose another effect into these multipliers.
    pub fn compose(self, spec: &EffectSpec) -> Self {
        Self {
            price: self.price * spec.price_effect,
            occupancy: self.occupancy * spec.occupancy_effect,
        }
    }
}

impl Default for MarketMultipliers {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// An instantiated, time-bounded application of an [`EffectSpec`].
///
/// The effect keeps the text it was rendered with, so switching the UI
/// locale later does not alter effects that are already running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ActiveEffect {
    /// Unique id of this application.
    pub id: EffectId,
    /// Headline of the event that caused the effect.
    pub source: String,
    /// The numeric effect being applied.
    pub spec: EffectSpec,
    /// Targets the effect applies to.
    pub targets: Vec<EffectTarget>,
    /// Game hour the effect was applied.
    pub applied_at: u64,
    /// Game hour at which the effect is removed.
    pub expires_at: u64,
}

impl ActiveEffect {
    /// Whether the effect is live at game hour `now` (`applied_at <= now < expires_at`).
    pub const fn is_active_at(&self, now: u64) -> bool {
        self.applied_at <= now && now < self.expires_at
    }

    /// Whether this effect contributes to the multipliers of `target`.
    ///
    /// Market-wide effects contribute to every target. Property effects
    /// only contribute to their own listing.
    pub fn affects(&self, target: EffectTarget) -> bool {
        self.targets
            .iter()
            .any(|t| *t == EffectTarget::Market || *t == target)
    }
}

// ---------------------------------------------------------------------------
// Market
// ---------------------------------------------------------------------------

/// A property registered by the external property module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PropertyListing {
    /// Listing identifier.
    pub id: PropertyId,
    /// Display name, used for the `{property}` binding.
    pub name: String,
    /// Location name, used for the `{location}` binding.
    pub location: String,
    /// Price before any event effect.
    pub base_price: f64,
    /// Occupancy rate (0..1) before any event effect.
    pub base_occupancy: f64,
}

// ---------------------------------------------------------------------------
// Rendered news
// ---------------------------------------------------------------------------

/// A procedural event rendered into a concrete headline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RenderedEvent {
    /// The rendered headline, with every placeholder filled.
    pub text: String,
    /// Effect carried by the event's subtype.
    pub effect: EffectSpec,
    /// Category the event was drawn from.
    pub category: EventCategory,
    /// Subtype name within the category.
    pub subtype: String,
    /// Locale the headline was rendered in.
    pub locale: Locale,
}

/// An authored timeline entry, rendered for display when it fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ScheduledNews {
    /// Declaration index in the content file.
    pub index: usize,
    /// Localized title.
    pub headline: String,
    /// Localized description (may be empty).
    pub description: String,
    /// In-game moment the event is anchored to.
    pub at: NaiveDateTime,
    /// Explicit narrative-tone delta, if authored.
    pub soul: Option<i32>,
    /// Market-wide effect, if authored.
    pub effect: Option<EffectSpec>,
}
