//! Time-bounded multiplicative effects on the market.
//!
//! Every applied effect is live on the half-open window
//! `[applied_at, applied_at + duration)` in game hours. Per target the
//! combined multiplier is the product of every live effect that reaches
//! it, clamped into a [`MultiplierBand`]. After each [`apply`] and
//! [`tick`] the clamped values are written back into the owned
//! [`MarketView`]. A target entering the clamped state is logged at warn;
//! while it stays there, later refreshes log at debug.
//!
//! [`apply`]: EffectEngine::apply
//! [`tick`]: EffectEngine::tick

use std::collections::BTreeSet;

use gazette_types::{
    ActiveEffect, EffectId, EffectSpec, EffectTarget, MarketMultipliers, PropertyId,
    PropertyListing,
};
use tracing::{debug, warn};

use crate::error::MarketError;
use crate::market::MarketView;

/// Default lower bound on any combined multiplier.
pub const DEFAULT_MIN_MULTIPLIER: f64 = 0.1;

/// Default upper bound on any combined multiplier.
pub const DEFAULT_MAX_MULTIPLIER: f64 = 5.0;

/// Inclusive bounds applied to every combined multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultiplierBand {
    min: f64,
    max: f64,
}

impl MultiplierBand {
    /// Create a band; both bounds must be finite, positive, and ordered.
    pub const fn new(min: f64, max: f64) -> Result<Self, MarketError> {
        if !(min.is_finite() && max.is_finite() && min > 0.0 && min <= max) {
            return Err(MarketError::InvalidBand { min, max });
        }
        Ok(Self { min, max })
    }

    /// Lower bound.
    pub const fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound.
    pub const fn max(&self) -> f64 {
        self.max
    }

    /// Clamp `value` into the band, reporting whether it had to move.
    ///
    /// Underflow to zero clamps to `min`; overflow to infinity clamps to
    /// `max`. NaN maps to the band value nearest to neutral.
    pub fn clamp(&self, value: f64) -> (f64, bool) {
        if value.is_nan() {
            return (1.0_f64.clamp(self.min, self.max), true);
        }
        let clamped = value.clamp(self.min, self.max);
        (clamped, value < self.min || value > self.max)
    }
}

impl Default for MultiplierBand {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_MULTIPLIER,
            max: DEFAULT_MAX_MULTIPLIER,
        }
    }
}

/// Validate an effect's numeric invariants.
pub fn validate_spec(spec: &EffectSpec) -> Result<(), MarketError> {
    let positive = |v: f64| v.is_finite() && v > 0.0;
    if !positive(spec.price_effect) {
        return Err(MarketError::InvalidEffect {
            reason: format!("price effect {} is not a positive number", spec.price_effect),
        });
    }
    if !positive(spec.occupancy_effect) {
        return Err(MarketError::InvalidEffect {
            reason: format!(
                "occupancy effect {} is not a positive number",
                spec.occupancy_effect
            ),
        });
    }
    if spec.duration_hours == 0 {
        return Err(MarketError::InvalidEffect {
            reason: "duration must be at least one hour".to_owned(),
        });
    }
    Ok(())
}

/// Owns the set of active effects and the market they act on.
#[derive(Debug, Clone, Default)]
pub struct EffectEngine {
    band: MultiplierBand,
    /// Live effects in application order.
    active: Vec<ActiveEffect>,
    market: MarketView,
    /// Targets whose last refresh was clamped.
    clamped: BTreeSet<EffectTarget>,
}

impl EffectEngine {
    /// Create an engine over an empty market.
    pub const fn new(band: MultiplierBand) -> Self {
        Self {
            band,
            active: Vec::new(),
            market: MarketView::new(),
            clamped: BTreeSet::new(),
        }
    }

    /// The clamp band in use.
    pub const fn band(&self) -> MultiplierBand {
        self.band
    }

    /// Read-only view of the market and its current multipliers.
    pub const fn market(&self) -> &MarketView {
        &self.market
    }

    /// Register a listing; effects already running on the whole market
    /// reach it immediately.
    pub fn register_property(&mut self, listing: PropertyListing) -> Result<(), MarketError> {
        self.market.register(listing)?;
        self.refresh();
        Ok(())
    }

    /// Remove a listing. Effects that named it keep running on their
    /// remaining targets.
    pub fn remove_property(&mut self, id: PropertyId) -> Result<PropertyListing, MarketError> {
        let listing = self.market.remove(id)?;
        self.refresh();
        Ok(listing)
    }

    /// Start an effect at game hour `now`.
    ///
    /// An empty `targets` list means the whole market.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidEffect`] for a spec with a non-positive
    /// multiplier or zero duration, and [`MarketError::UnknownProperty`]
    /// when a target is not registered.
    pub fn apply(
        &mut self,
        spec: EffectSpec,
        targets: Vec<EffectTarget>,
        source: impl Into<String>,
        now: u64,
    ) -> Result<ActiveEffect, MarketError> {
        validate_spec(&spec)?;
        for target in &targets {
            if let EffectTarget::Property(id) = *target {
                if !self.market.contains(id) {
                    return Err(MarketError::UnknownProperty(id));
                }
            }
        }
        let targets = if targets.is_empty() {
            vec![EffectTarget::Market]
        } else {
            targets
        };

        let effect = ActiveEffect {
            id: EffectId::new(),
            source: source.into(),
            spec,
            targets,
            applied_at: now,
            expires_at: spec.expires_at(now),
        };
        debug!(
            effect_id = %effect.id,
            source = %effect.source,
            price = spec.price_effect,
            occupancy = spec.occupancy_effect,
            expires_at = effect.expires_at,
            "Effect applied"
        );
        self.active.push(effect.clone());
        self.refresh();
        Ok(effect)
    }

    /// Remove every effect with `expires_at <= now`, returning their ids.
    pub fn tick(&mut self, now: u64) -> Vec<EffectId> {
        let mut expired = Vec::new();
        self.active.retain(|effect| {
            if effect.expires_at <= now {
                expired.push(effect.id);
                false
            } else {
                true
            }
        });
        if !expired.is_empty() {
            debug!(count = expired.len(), now, "Effects expired");
        }
        self.refresh();
        expired
    }

    /// Every live effect, in application order.
    pub fn active(&self) -> &[ActiveEffect] {
        &self.active
    }

    /// Live effects that reach `target`.
    pub fn active_for(&self, target: EffectTarget) -> impl Iterator<Item = &ActiveEffect> {
        self.active.iter().filter(move |e| e.affects(target))
    }

    /// Clamped combined multipliers for `target`.
    pub fn multipliers(&self, target: EffectTarget) -> MarketMultipliers {
        self.combined(target).0
    }

    /// Whether the stacked multipliers for `target` currently sit on the
    /// band edge.
    pub fn is_clamped(&self, target: EffectTarget) -> bool {
        self.clamped.contains(&target)
    }

    /// Drop every effect and return all multipliers to neutral.
    pub fn clear(&mut self) {
        self.active.clear();
        self.refresh();
    }

    /// Clamped multipliers plus the raw product when clamping applied.
    fn combined(&self, target: EffectTarget) -> (MarketMultipliers, Option<MarketMultipliers>) {
        let raw = self
            .active_for(target)
            .fold(MarketMultipliers::NEUTRAL, |acc, e| acc.compose(&e.spec));
        let (price, price_clamped) = self.band.clamp(raw.price);
        let (occupancy, occupancy_clamped) = self.band.clamp(raw.occupancy);
        let clamped = (price_clamped || occupancy_clamped).then_some(raw);
        (MarketMultipliers { price, occupancy }, clamped)
    }

    fn settle(&mut self, target: EffectTarget) -> MarketMultipliers {
        let (multipliers, raw) = self.combined(target);
        match raw {
            Some(raw) => {
                if self.clamped.insert(target) {
                    warn!(
                        ?target,
                        raw_price = raw.price,
                        raw_occupancy = raw.occupancy,
                        price = multipliers.price,
                        occupancy = multipliers.occupancy,
                        "Stacked multiplier clamped to band"
                    );
                } else {
                    debug!(
                        ?target,
                        raw_price = raw.price,
                        raw_occupancy = raw.occupancy,
                        "Stacked multiplier still clamped"
                    );
                }
            }
            None => {
                if self.clamped.remove(&target) {
                    debug!(?target, "Stacked multiplier back inside band");
                }
            }
        }
        multipliers
    }

    fn refresh(&mut self) {
        let index = self.settle(EffectTarget::Market);
        let ids: Vec<PropertyId> = self.market.listings().map(|s| s.listing.id).collect();
        // Removed listings can not stay clamped.
        self.clamped.retain(|target| match target {
            EffectTarget::Market => true,
            EffectTarget::Property(id) => ids.contains(id),
        });
        // Listings iterate in id order both times, so the zip lines up.
        let updates: Vec<MarketMultipliers> = ids
            .into_iter()
            .map(|id| self.settle(EffectTarget::Property(id)))
            .collect();

        self.market.set_index(index);
        for (state, multipliers) in self.market.listings_mut().zip(updates) {
            state.multipliers = multipliers;
        }
    }
}
