//! Session logic for the Gazette news and market-impact engine.
//!
//! This crate turns static content into a running session: it samples
//! procedural news biased by the city's mood, fires the authored timeline
//! as the game clock passes it, and pushes every event's effect into the
//! market.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `gazette-config.yaml` into
//!   strongly-typed structs.
//! - [`clock`] -- Game clock mapping ticks to hours and calendar time.
//! - [`soul`] -- The narrative-tone accumulator.
//! - [`bindings`] -- [`BindingSource`] trait and [`MarketBindings`].
//! - [`sampler`] -- Category weights and [`WeightedEventSampler`].
//! - [`timeline`] -- [`ScheduledTimeline`] over the authored events.
//! - [`engine`] -- [`EventEngine`], the session object, and [`TickSummary`].
//!
//! [`BindingSource`]: bindings::BindingSource
//! [`MarketBindings`]: bindings::MarketBindings
//! [`WeightedEventSampler`]: sampler::WeightedEventSampler
//! [`ScheduledTimeline`]: timeline::ScheduledTimeline
//! [`EventEngine`]: engine::EventEngine
//! [`TickSummary`]: engine::TickSummary

pub mod bindings;
pub mod clock;
pub mod config;
pub mod engine;
pub mod sampler;
pub mod soul;
pub mod timeline;
