//! Shared type definitions for the Gazette engine.
//!
//! This crate is the single source of truth for the types that cross crate
//! boundaries: content loading, the market model, the engine session, and
//! the UI. Types flow downstream to `TypeScript` via `ts-rs` so the UI can
//! consume rendered events and effect snapshots directly.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for listings and effects
//! - [`enums`] -- Event categories and timeline states
//! - [`locale`] -- Normalized locale codes
//! - [`structs`] -- Effects, listings, and rendered news

pub mod enums;
pub mod ids;
pub mod locale;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{EventCategory, ScheduleState};
pub use ids::{EffectId, ParseIdError, PropertyId};
pub use locale::Locale;
pub use structs::{
    ActiveEffect, EffectSpec, EffectTarget, MarketMultipliers, PropertyListing, RenderedEvent,
    ScheduledNews,
};
