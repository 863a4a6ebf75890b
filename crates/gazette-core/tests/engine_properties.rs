//! Behavioral properties of the event engine over the built-in content.
//!
//! These exercise the engine end to end: every template renders without
//! leaking a placeholder, soul biasing shifts category frequencies, the
//! timeline fires each entry once and in order, and effects expire and
//! stay inside the multiplier band no matter how they stack.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use std::collections::BTreeMap;
use std::sync::Arc;

use gazette_content::localization::LocalizationResolver;
use gazette_content::pack::ContentPack;
use gazette_core::bindings::MarketBindings;
use gazette_core::config::{GazetteConfig, SamplerConfig};
use gazette_core::engine::EventEngine;
use gazette_core::sampler::WeightedEventSampler;
use gazette_market::MarketView;
use gazette_types::{
    EffectTarget, EventCategory, Locale, MarketMultipliers, PropertyId, PropertyListing,
    ScheduleState,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;

fn quiet() -> GazetteConfig {
    let mut config = GazetteConfig::default();
    config.sampler.procedural_event_chance = 0.0;
    config
}

fn pack_without_schedule() -> ContentPack {
    let mut pack = ContentPack::builtin().unwrap();
    pack.schedule.events.clear();
    pack
}

fn listing(name: &str, location: &str) -> PropertyListing {
    PropertyListing {
        id: PropertyId::new(),
        name: name.to_owned(),
        location: location.to_owned(),
        base_price: 150.0,
        base_occupancy: 0.6,
    }
}

fn builtin_sampler(config: SamplerConfig) -> (WeightedEventSampler, Arc<LocalizationResolver>) {
    let pack = ContentPack::builtin().unwrap();
    let resolver = Arc::new(LocalizationResolver::new(pack.ui, vec![Locale::english()]));
    let sampler = WeightedEventSampler::new(Arc::new(pack.catalog), Arc::clone(&resolver), config);
    (sampler, resolver)
}

fn category_counts(
    sampler: &WeightedEventSampler,
    resolver: &LocalizationResolver,
    soul: f64,
    samples: usize,
) -> BTreeMap<EventCategory, usize> {
    let market = MarketView::new();
    let locale = Locale::english();
    let mut rng = SmallRng::seed_from_u64(2025);
    let mut counts = BTreeMap::new();
    for _ in 0..samples {
        let mut bindings = MarketBindings::new(&market, resolver, &locale, 2025);
        let event = sampler.sample(soul, &locale, &mut bindings, &mut rng).unwrap();
        *counts.entry(event.category).or_insert(0_usize) += 1;
    }
    counts
}

#[allow(clippy::cast_precision_loss)]
fn share(counts: &BTreeMap<EventCategory, usize>, category: EventCategory, total: usize) -> f64 {
    counts.get(&category).copied().unwrap_or(0) as f64 / total as f64
}

// =============================================================================
// Rendering
// =============================================================================

#[test]
fn no_template_leaks_a_placeholder() {
    let (sampler, resolver) = builtin_sampler(SamplerConfig::default());
    let mut market = MarketView::new();
    market.register(listing("Blue Anchor Inn", "Harbour")).unwrap();
    let empty = MarketView::new();
    let mut rng = SmallRng::seed_from_u64(7);

    for subtype in sampler.catalog().iter() {
        for locale in subtype.templates.keys() {
            for market in [&market, &empty] {
                for _ in 0..60 {
                    let mut bindings = MarketBindings::new(market, &resolver, locale, 2025);
                    let event = sampler
                        .render(subtype, locale, &mut bindings, &mut rng)
                        .unwrap();
                    assert!(
                        !event.text.contains('{') && !event.text.contains('}'),
                        "{}/{} leaked a placeholder: {}",
                        subtype.category,
                        subtype.name,
                        event.text
                    );
                    assert_eq!(&event.locale, locale);
                }
            }
        }
    }
}

// =============================================================================
// Soul biasing
// =============================================================================

#[test]
fn positive_soul_shifts_draws_to_negative_and_surreal() {
    let (sampler, resolver) = builtin_sampler(SamplerConfig::default());
    let samples = 10_000;
    let counts = category_counts(&sampler, &resolver, 50.0, samples);

    assert!(share(&counts, EventCategory::Negative, samples) > 0.25);
    assert!(share(&counts, EventCategory::Surreal, samples) > 0.25);
    assert!(share(&counts, EventCategory::Positive, samples) < 0.25);
}

#[test]
fn every_category_stays_reachable_at_extreme_soul() {
    let config = SamplerConfig {
        mean_reversion: 2.0,
        ..SamplerConfig::default()
    };
    let (sampler, _) = builtin_sampler(config);

    for soul in [1e9, -1e9, f64::INFINITY, f64::NEG_INFINITY] {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut seen = BTreeMap::new();
        for _ in 0..20_000 {
            *seen
                .entry(sampler.sample_category(soul, &mut rng))
                .or_insert(0_u32) += 1;
        }
        for category in EventCategory::ALL {
            assert!(
                seen.contains_key(&category),
                "{category} never drawn at soul {soul}"
            );
        }
    }
}

// =============================================================================
// Timeline
// =============================================================================

#[test]
fn timeline_fires_each_entry_once_in_order() {
    let mut config = quiet();
    config.session.hours_per_tick = 5;
    let mut engine = EventEngine::init(config, ContentPack::builtin().unwrap()).unwrap();
    let total = engine.timeline().len();

    let mut fired = Vec::new();
    for _ in 0..200 {
        fired.extend(engine.tick().unwrap().scheduled);
    }

    assert_eq!(fired.len(), total);
    assert!(fired.windows(2).all(|w| w[0].at <= w[1].at));
    for news in &fired {
        assert_eq!(engine.timeline().state(news.index), Some(ScheduleState::Fired));
    }
}

#[test]
fn soul_outliers_are_integrated_as_is() {
    let mut config = quiet();
    config.session.hours_per_tick = 24;
    let mut engine = EventEngine::init(config, ContentPack::builtin().unwrap()).unwrap();

    // Six days reach 07/01 00:00: deltas 1, 3, -2 and the 500 outlier.
    let mut summary = engine.tick().unwrap();
    for _ in 1..6 {
        summary = engine.tick().unwrap();
    }
    assert!((summary.soul - 502.0).abs() < 1e-9);
    assert!((engine.soul() - 502.0).abs() < 1e-9);
}

// =============================================================================
// Effects
// =============================================================================

#[test]
fn festival_effect_expires_after_its_duration() {
    let mut engine = EventEngine::init(quiet(), pack_without_schedule()).unwrap();
    let event = engine.trigger(EventCategory::Positive, "festival").unwrap();
    let effect_id = engine.effects().active()[0].id;
    assert!((event.effect.occupancy_effect - 1.25).abs() < 1e-12);

    for _ in 0..167 {
        assert!(engine.tick().unwrap().expired.is_empty());
    }
    let m = engine.market().multipliers(EffectTarget::Market).unwrap();
    assert!((m.occupancy - 1.25).abs() < 1e-12);
    assert!((m.price - 1.06).abs() < 1e-12);

    let summary = engine.tick().unwrap();
    assert_eq!(summary.hour, 168);
    assert_eq!(summary.expired, vec![effect_id]);
    assert_eq!(
        engine.market().multipliers(EffectTarget::Market).unwrap(),
        MarketMultipliers::NEUTRAL
    );
}

#[test]
fn stacked_effects_stay_inside_the_band() {
    let mut engine = EventEngine::init(quiet(), pack_without_schedule()).unwrap();
    let inn = listing("Blue Anchor Inn", "Harbour");
    let inn_id = inn.id;
    engine.register_property(inn).unwrap();

    for _ in 0..200 {
        engine.trigger(EventCategory::Positive, "festival").unwrap();
    }
    let band = engine.effects().band();
    let m = engine.market().multipliers(EffectTarget::Property(inn_id)).unwrap();
    assert!((m.price - band.max()).abs() < 1e-12);
    assert!((m.occupancy - band.max()).abs() < 1e-12);

    engine.reset();
    for _ in 0..200 {
        engine.trigger(EventCategory::Negative, "disaster").unwrap();
    }
    let m = engine.market().multipliers(EffectTarget::Property(inn_id)).unwrap();
    assert!(m.price >= band.min() && m.price <= band.max());
    assert!((m.occupancy - band.min()).abs() < 1e-12);
}

// =============================================================================
// Session lifecycle
// =============================================================================

#[test]
fn reset_replays_the_same_session() {
    let mut config = GazetteConfig::default();
    config.sampler.procedural_event_chance = 1.0;
    let mut engine = EventEngine::init(config, ContentPack::builtin().unwrap()).unwrap();
    engine.register_property(listing("Old Mill", "Old Town")).unwrap();

    let first: Vec<String> = (0..30)
        .flat_map(|_| engine.tick().unwrap().headlines().map(str::to_owned).collect::<Vec<_>>())
        .collect();

    engine.reset();
    assert!(engine.soul().abs() < f64::EPSILON);
    assert!(engine.effects().active().is_empty());
    assert_eq!(engine.clock().tick(), 0);
    assert_eq!(engine.timeline().fired_count(), 0);
    assert_eq!(engine.market().len(), 1);

    let second: Vec<String> = (0..30)
        .flat_map(|_| engine.tick().unwrap().headlines().map(str::to_owned).collect::<Vec<_>>())
        .collect();
    assert_eq!(first, second);
}

#[test]
fn locale_switch_keeps_running_effects() {
    let mut engine = EventEngine::init(quiet(), pack_without_schedule()).unwrap();
    let english = engine.trigger(EventCategory::Surreal, "magical").unwrap();
    assert_eq!(english.locale, Locale::english());

    engine.set_locale(Locale::italian());
    let italian = engine.trigger(EventCategory::Surreal, "magical").unwrap();
    assert_eq!(italian.locale, Locale::italian());

    let active = engine.effects().active();
    assert_eq!(active.len(), 2);
    assert_eq!(active[0].source, english.text);
    assert_eq!(active[1].source, italian.text);
}
