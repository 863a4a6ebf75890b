//! The event engine session.
//!
//! [`EventEngine`] owns every piece of mutable session state: the game
//! clock, the timeline cursor, the active effects and market, the soul
//! accumulator, the seeded RNG, and the current locale. There is no global
//! state; a new game is a new `init` or a `reset`.
//!
//! # Tick order
//!
//! 1. Advance the clock.
//! 2. Fire due scheduled events and apply their market-wide effects.
//! 3. Maybe draw one procedural event, biased by the current soul.
//! 4. Expire stale effects.
//! 5. Integrate the tick's soul deltas.

use std::sync::Arc;

use chrono::NaiveDateTime;
use gazette_content::catalog::{EventCatalog, EventSubtype};
use gazette_content::error::ContentError;
use gazette_content::localization::LocalizationResolver;
use gazette_content::pack::ContentPack;
use gazette_content::schedule::ScheduledEvent;
use gazette_market::{EffectEngine, MarketError, MarketView, MultiplierBand};
use gazette_types::{
    ActiveEffect, EffectId, EffectTarget, EventCategory, Locale, PropertyId, PropertyListing,
    RenderedEvent, ScheduledNews,
};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::bindings::MarketBindings;
use crate::clock::{ClockError, GameClock};
use crate::config::{ConfigError, GazetteConfig};
use crate::sampler::{SampleError, WeightedEventSampler};
use crate::soul::SoulAccumulator;
use crate::timeline::ScheduledTimeline;

/// Errors that can occur while initializing or driving the engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The configuration is invalid.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// A market or effect operation failed.
    #[error("market error: {source}")]
    Market {
        /// The underlying market error.
        #[from]
        source: MarketError,
    },

    /// A catalog lookup failed.
    #[error("content error: {source}")]
    Content {
        /// The underlying content error.
        #[from]
        source: ContentError,
    },

    /// A forced event could not be rendered.
    #[error("sample error: {source}")]
    Sample {
        /// The underlying sampling error.
        #[from]
        source: SampleError,
    },
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Game hour at the end of the tick.
    pub hour: u64,
    /// In-game date-time at the end of the tick.
    pub now: NaiveDateTime,
    /// Authored events that fired, in due order.
    pub scheduled: Vec<ScheduledNews>,
    /// The procedural event drawn this tick, if any.
    pub procedural: Option<RenderedEvent>,
    /// Effects started this tick.
    pub applied: Vec<ActiveEffect>,
    /// Effects that expired this tick.
    pub expired: Vec<EffectId>,
    /// Soul after this tick's deltas.
    pub soul: f64,
}

impl TickSummary {
    /// Every headline produced this tick, scheduled first.
    pub fn headlines(&self) -> impl Iterator<Item = &str> {
        self.scheduled
            .iter()
            .map(|n| n.headline.as_str())
            .chain(self.procedural.iter().map(|e| e.text.as_str()))
    }
}

/// A running news and market-impact session.
#[derive(Debug)]
pub struct EventEngine {
    config: GazetteConfig,
    catalog: Arc<EventCatalog>,
    resolver: Arc<LocalizationResolver>,
    sampler: WeightedEventSampler,
    timeline: ScheduledTimeline,
    effects: EffectEngine,
    soul: SoulAccumulator,
    clock: GameClock,
    rng: SmallRng,
    locale: Locale,
}

impl EventEngine {
    /// Validate the configuration and build a fresh session over `content`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] for invalid settings,
    /// [`EngineError::Clock`] for an unusable calendar, and
    /// [`EngineError::Market`] for an invalid multiplier band.
    pub fn init(config: GazetteConfig, content: ContentPack) -> Result<Self, EngineError> {
        config.validate()?;
        let clock = GameClock::new(&config.session)?;
        let band = MultiplierBand::new(config.effects.min_multiplier, config.effects.max_multiplier)?;
        let untimed = config.session.untimed_event_time()?;

        let catalog = Arc::new(content.catalog);
        let resolver = Arc::new(LocalizationResolver::new(
            content.ui,
            config.locale.fallback.clone(),
        ));
        let sampler = WeightedEventSampler::new(
            Arc::clone(&catalog),
            Arc::clone(&resolver),
            config.sampler.clone(),
        );
        let timeline = ScheduledTimeline::new(content.schedule.events, untimed);
        let locale = config.locale.default.clone();

        info!(
            seed = config.session.seed,
            %locale,
            subtypes = catalog.subtype_count(),
            scheduled = timeline.len(),
            start = %clock.now(),
            hours_per_tick = clock.hours_per_tick(),
            "Event engine initialized"
        );

        Ok(Self {
            rng: SmallRng::seed_from_u64(config.session.seed),
            catalog,
            resolver,
            sampler,
            timeline,
            effects: EffectEngine::new(band),
            soul: SoulAccumulator::new(),
            clock,
            locale,
            config,
        })
    }

    /// Start a new game: soul, timeline, effects, clock, and RNG return to
    /// their initial state. Registered listings stay, at neutral multipliers.
    pub fn reset(&mut self) {
        self.soul.reset();
        self.timeline.reset();
        self.effects.clear();
        self.clock.reset();
        self.rng = SmallRng::seed_from_u64(self.config.session.seed);
        info!(listings = self.effects.market().len(), "Event engine reset");
    }

    /// Run one tick.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Clock`] if the clock can not advance. A
    /// procedural event that fails to render is logged and skipped.
    pub fn tick(&mut self) -> Result<TickSummary, EngineError> {
        let hour = self.clock.advance()?;
        let tick = self.clock.tick();
        let now = self.clock.now();
        debug!(tick, hour, %now, "Tick started");

        let mut applied = Vec::new();
        let mut soul_deltas: Vec<f64> = Vec::new();

        // --- Scheduled events ---
        let fired = self.timeline.advance_to(now);
        let mut scheduled = Vec::with_capacity(fired.len());
        for event in fired {
            let news = self.localize(&event);
            info!(tick, index = news.index, headline = %news.headline, "Scheduled news");
            if let Some(spec) = event.effect {
                applied.push(self.effects.apply(
                    spec,
                    vec![EffectTarget::Market],
                    news.headline.clone(),
                    hour,
                )?);
            }
            if let Some(delta) = event.soul {
                if delta.unsigned_abs() > self.config.effects.soul_outlier_threshold {
                    warn!(
                        index = event.index,
                        delta,
                        threshold = self.config.effects.soul_outlier_threshold,
                        "Scheduled soul delta is an outlier"
                    );
                }
                soul_deltas.push(f64::from(delta));
            }
            scheduled.push(news);
        }

        // --- Procedural event ---
        let mut procedural = None;
        if self.rng.random_bool(self.config.sampler.procedural_event_chance) {
            match self.emit(None, hour) {
                Ok((event, effect)) => {
                    info!(
                        tick,
                        category = %event.category,
                        subtype = %event.subtype,
                        headline = %event.text,
                        "Procedural news"
                    );
                    soul_deltas.push(event.effect.soul_tendency_modifier);
                    applied.push(effect);
                    procedural = Some(event);
                }
                Err(EngineError::Sample { source }) => {
                    warn!(tick, error = %source, "Skipped procedural event");
                }
                Err(other) => return Err(other),
            }
        }

        // --- Expiry ---
        let expired = self.effects.tick(hour);

        // --- Soul ---
        for delta in soul_deltas {
            self.soul.integrate(delta);
        }

        Ok(TickSummary {
            tick,
            hour,
            now,
            scheduled,
            procedural,
            applied,
            expired,
            soul: self.soul.current(),
        })
    }

    /// Force one procedural event of a specific subtype right now.
    ///
    /// The event is rendered, its effect applied, and its soul delta
    /// integrated immediately.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Content`] for an unknown subtype and
    /// [`EngineError::Sample`] if no template could be rendered.
    pub fn trigger(
        &mut self,
        category: EventCategory,
        subtype: &str,
    ) -> Result<RenderedEvent, EngineError> {
        let catalog = Arc::clone(&self.catalog);
        let subtype = catalog.get_subtype(category, subtype)?;
        let (event, _) = self.emit(Some(subtype), self.clock.hour())?;
        self.soul.integrate(event.effect.soul_tendency_modifier);
        info!(
            category = %event.category,
            subtype = %event.subtype,
            headline = %event.text,
            "Triggered news"
        );
        Ok(event)
    }

    /// Render a procedural event and apply its effect at `hour`.
    fn emit(
        &mut self,
        forced: Option<&EventSubtype>,
        hour: u64,
    ) -> Result<(RenderedEvent, ActiveEffect), EngineError> {
        let year = self.clock.year();
        let (event, location) = {
            let mut bindings =
                MarketBindings::new(self.effects.market(), &self.resolver, &self.locale, year);
            let event = match forced {
                Some(subtype) => {
                    self.sampler
                        .render(subtype, &self.locale, &mut bindings, &mut self.rng)?
                }
                None => self.sampler.sample(
                    self.soul.current(),
                    &self.locale,
                    &mut bindings,
                    &mut self.rng,
                )?,
            };
            (event, bindings.bound_location().map(str::to_owned))
        };

        // An event placed at a listing's location moves only that location.
        let targets: Vec<EffectTarget> = location
            .map(|loc| {
                self.effects
                    .market()
                    .at_location(&loc)
                    .into_iter()
                    .map(EffectTarget::Property)
                    .collect()
            })
            .unwrap_or_else(|| vec![EffectTarget::Market]);

        let effect = self
            .effects
            .apply(event.effect, targets, event.text.clone(), hour)?;
        Ok((event, effect))
    }

    fn localize(&self, event: &ScheduledEvent) -> ScheduledNews {
        let headline = self
            .resolver
            .pick(&event.title, &self.locale)
            .map(|(_, text)| text.clone())
            .unwrap_or_default();
        let description = self
            .resolver
            .pick(&event.description, &self.locale)
            .map(|(_, text)| text.clone())
            .unwrap_or_default();
        ScheduledNews {
            index: event.index,
            headline,
            description,
            at: event.at(self.untimed()),
            soul: event.soul,
            effect: event.effect,
        }
    }

    fn untimed(&self) -> chrono::NaiveTime {
        // Validated in init().
        self.config
            .session
            .untimed_event_time()
            .unwrap_or(chrono::NaiveTime::MIN)
    }

    // -------------------------------------------------------------------
    // Locale
    // -------------------------------------------------------------------

    /// The locale new events are rendered in.
    pub const fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Switch the locale. Effects already running keep their text.
    pub fn set_locale(&mut self, locale: Locale) {
        if !self.resolver.locales().any(|l| *l == locale) {
            warn!(%locale, "No UI strings for locale; fallback chain will be used");
        }
        info!(from = %self.locale, to = %locale, "Locale switched");
        self.locale = locale;
    }

    /// Look up a UI string in the current locale.
    pub fn ui_string(&self, key: &str) -> String {
        self.resolver.resolve(&self.locale, key)
    }

    // -------------------------------------------------------------------
    // Market
    // -------------------------------------------------------------------

    /// Register a listing from the property module.
    pub fn register_property(&mut self, listing: PropertyListing) -> Result<(), EngineError> {
        debug!(id = %listing.id, name = %listing.name, location = %listing.location, "Property registered");
        self.effects.register_property(listing)?;
        Ok(())
    }

    /// Remove a listing.
    pub fn remove_property(&mut self, id: PropertyId) -> Result<PropertyListing, EngineError> {
        Ok(self.effects.remove_property(id)?)
    }

    /// The market and its current multipliers.
    pub const fn market(&self) -> &MarketView {
        self.effects.market()
    }

    // -------------------------------------------------------------------
    // Read-only state
    // -------------------------------------------------------------------

    /// Active effects and multipliers.
    pub const fn effects(&self) -> &EffectEngine {
        &self.effects
    }

    /// Current soul value.
    pub const fn soul(&self) -> f64 {
        self.soul.current()
    }

    /// The game clock.
    pub const fn clock(&self) -> &GameClock {
        &self.clock
    }

    /// The authored timeline.
    pub const fn timeline(&self) -> &ScheduledTimeline {
        &self.timeline
    }

    /// The procedural sampler.
    pub const fn sampler(&self) -> &WeightedEventSampler {
        &self.sampler
    }

    /// The event catalog.
    pub fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    /// The configuration the session was built with.
    pub const fn config(&self) -> &GazetteConfig {
        &self.config
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn engine_with(config: GazetteConfig) -> EventEngine {
        EventEngine::init(config, ContentPack::builtin().unwrap()).unwrap()
    }

    fn quiet() -> GazetteConfig {
        let mut config = GazetteConfig::default();
        config.sampler.procedural_event_chance = 0.0;
        config
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = GazetteConfig::default();
        config.sampler.procedural_event_chance = 2.0;
        assert!(matches!(
            EventEngine::init(config, ContentPack::builtin().unwrap()),
            Err(EngineError::Config { .. })
        ));
    }

    #[test]
    fn unrenderable_procedural_event_is_skipped() {
        // Every word list is Italian only, so no English template can bind.
        let subtype = serde_json::json!({
            "templates": { "en": ["{omen} over the harbour"] },
            "omen": { "it": ["Un presagio"] },
            "priceEffect": 1.1,
            "occupancyEffect": 1.1,
            "duration": 24
        });
        let doc = serde_json::json!({
            "events": {
                "positive": { "omen": subtype.clone() },
                "negative": { "omen": subtype.clone() },
                "neutral": { "omen": subtype.clone() },
                "surreal": { "omen": subtype }
            }
        });
        let pack = ContentPack::from_json_str(&doc.to_string()).unwrap();
        let mut config = GazetteConfig::default();
        config.sampler.procedural_event_chance = 1.0;
        let mut engine = EventEngine::init(config, pack).unwrap();

        for _ in 0..5 {
            let summary = engine.tick().unwrap();
            assert!(summary.procedural.is_none());
            assert!(summary.applied.is_empty());
        }
        assert!(engine.effects().active().is_empty());
        assert!(engine.soul().abs() < f64::EPSILON);
        assert_eq!(engine.clock().tick(), 5);
    }

    #[test]
    fn first_scheduled_event_fires_on_its_hour() {
        let mut engine = engine_with(quiet());
        // Builtin: first entry is 01/01/2025 09:00; clock starts at 00:00.
        for _ in 0..8 {
            assert!(engine.tick().unwrap().scheduled.is_empty());
        }
        let summary = engine.tick().unwrap();
        assert_eq!(summary.hour, 9);
        assert_eq!(summary.scheduled.len(), 1);
        assert_eq!(summary.scheduled[0].headline, "New harbour master appointed");
        assert!((summary.soul - 1.0).abs() < 1e-12);
    }

    #[test]
    fn scheduled_effect_applies_to_whole_market() {
        let mut config = quiet();
        config.session.hours_per_tick = 24;
        let mut engine = engine_with(config);
        // Tick 3 reaches 04/01 00:00, past both 03/01 entries.
        engine.tick().unwrap();
        engine.tick().unwrap();
        let summary = engine.tick().unwrap();
        assert_eq!(summary.scheduled.len(), 2);
        assert_eq!(summary.applied.len(), 2);
        for effect in &summary.applied {
            assert_eq!(effect.targets, vec![EffectTarget::Market]);
        }
        let m = engine.effects().multipliers(EffectTarget::Market);
        assert!((m.price - 1.05 * 0.98).abs() < 1e-12);
    }

    #[test]
    fn ui_strings_follow_locale() {
        let mut engine = engine_with(quiet());
        assert_eq!(engine.ui_string("news.header"), "Latest news");
        engine.set_locale(Locale::italian());
        assert_eq!(engine.ui_string("news.header"), "Ultime notizie");
        engine.set_locale(Locale::new("fr"));
        assert_eq!(engine.ui_string("news.header"), "Latest news");
        assert_eq!(engine.ui_string("no.such.key"), "no.such.key");
    }

    #[test]
    fn trigger_targets_listing_location() {
        let mut engine = engine_with(quiet());
        let harbour = PropertyListing {
            id: PropertyId::new(),
            name: "Blue Anchor Inn".to_owned(),
            location: "Harbour".to_owned(),
            base_price: 100.0,
            base_occupancy: 0.5,
        };
        let harbour_id = harbour.id;
        engine.register_property(harbour).unwrap();

        // Every festival template names {location}.
        let event = engine.trigger(EventCategory::Positive, "festival").unwrap();
        assert!(event.text.contains("Harbour"));
        let effect = engine.effects().active().last().unwrap();
        assert_eq!(effect.targets, vec![EffectTarget::Property(harbour_id)]);
        assert!((engine.soul() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn trigger_unknown_subtype_fails() {
        let mut engine = engine_with(quiet());
        assert!(matches!(
            engine.trigger(EventCategory::Surreal, "unicorns"),
            Err(EngineError::Content { .. })
        ));
    }

    #[test]
    fn same_seed_same_session() {
        let mut config = GazetteConfig::default();
        config.sampler.procedural_event_chance = 1.0;
        let mut a = engine_with(config.clone());
        let mut b = engine_with(config);
        for _ in 0..50 {
            let x = a.tick().unwrap();
            let y = b.tick().unwrap();
            assert_eq!(
                x.procedural.map(|e| e.text),
                y.procedural.map(|e| e.text)
            );
        }
    }
}
