//! Registry of property listings and their current multipliers.
//!
//! Listings are registered by the property module. The [`EffectEngine`]
//! is the only writer of multipliers; everyone else reads them through
//! [`MarketView`].
//!
//! [`EffectEngine`]: crate::effects::EffectEngine

use std::collections::BTreeMap;

use gazette_types::{EffectTarget, MarketMultipliers, PropertyId, PropertyListing};
use serde::Serialize;

use crate::error::MarketError;

/// A listing together with the multipliers currently applied to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingState {
    /// The registered listing.
    pub listing: PropertyListing,
    /// Clamped product of every active effect that targets it.
    pub multipliers: MarketMultipliers,
}

impl ListingState {
    /// Base price scaled by the current price multiplier.
    pub fn effective_price(&self) -> f64 {
        self.listing.base_price * self.multipliers.price
    }

    /// Base occupancy scaled by the current multiplier, capped to `0..=1`.
    pub fn effective_occupancy(&self) -> f64 {
        (self.listing.base_occupancy * self.multipliers.occupancy).clamp(0.0, 1.0)
    }
}

/// All registered listings plus the market-wide index.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketView {
    listings: BTreeMap<PropertyId, ListingState>,
    index: MarketMultipliers,
}

impl MarketView {
    /// Create an empty market.
    pub const fn new() -> Self {
        Self {
            listings: BTreeMap::new(),
            index: MarketMultipliers::NEUTRAL,
        }
    }

    /// Register a listing with neutral multipliers.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::DuplicateProperty`] if the id is taken.
    pub fn register(&mut self, listing: PropertyListing) -> Result<(), MarketError> {
        let id = listing.id;
        if self.listings.contains_key(&id) {
            return Err(MarketError::DuplicateProperty(id));
        }
        self.listings.insert(
            id,
            ListingState {
                listing,
                multipliers: MarketMultipliers::NEUTRAL,
            },
        );
        Ok(())
    }

    /// Remove a listing, returning it.
    pub fn remove(&mut self, id: PropertyId) -> Result<PropertyListing, MarketError> {
        self.listings
            .remove(&id)
            .map(|state| state.listing)
            .ok_or(MarketError::UnknownProperty(id))
    }

    /// Look up a listing and its multipliers.
    pub fn get(&self, id: PropertyId) -> Option<&ListingState> {
        self.listings.get(&id)
    }

    /// Whether a listing is registered.
    pub fn contains(&self, id: PropertyId) -> bool {
        self.listings.contains_key(&id)
    }

    /// Iterate over every listing in id order.
    pub fn listings(&self) -> impl Iterator<Item = &ListingState> {
        self.listings.values()
    }

    /// Ids of every listing whose location equals `location`.
    pub fn at_location(&self, location: &str) -> Vec<PropertyId> {
        self.listings
            .values()
            .filter(|s| s.listing.location == location)
            .map(|s| s.listing.id)
            .collect()
    }

    /// Number of registered listings.
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    /// Whether no listing is registered.
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Current multipliers for a target; `None` for unknown listings.
    pub fn multipliers(&self, target: EffectTarget) -> Option<MarketMultipliers> {
        match target {
            EffectTarget::Market => Some(self.index),
            EffectTarget::Property(id) => self.listings.get(&id).map(|s| s.multipliers),
        }
    }

    pub(crate) fn set_index(&mut self, multipliers: MarketMultipliers) {
        self.index = multipliers;
    }

    pub(crate) fn listings_mut(&mut self) -> impl Iterator<Item = &mut ListingState> {
        self.listings.values_mut()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn listing(name: &str, location: &str) -> PropertyListing {
        PropertyListing {
            id: PropertyId::new(),
            name: name.to_owned(),
            location: location.to_owned(),
            base_price: 100.0,
            base_occupancy: 0.8,
        }
    }

    #[test]
    fn register_and_lookup() {
        let mut market = MarketView::new();
        let inn = listing("Blue Anchor Inn", "Harbour");
        let id = inn.id;
        market.register(inn).unwrap();

        assert_eq!(market.len(), 1);
        let state = market.get(id).unwrap();
        assert_eq!(state.multipliers, MarketMultipliers::NEUTRAL);
        assert!((state.effective_price() - 100.0).abs() < 1e-12);
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut market = MarketView::new();
        let inn = listing("Blue Anchor Inn", "Harbour");
        market.register(inn.clone()).unwrap();
        assert!(matches!(
            market.register(inn),
            Err(MarketError::DuplicateProperty(_))
        ));
    }

    #[test]
    fn remove_unknown_fails() {
        let mut market = MarketView::new();
        assert!(matches!(
            market.remove(PropertyId::new()),
            Err(MarketError::UnknownProperty(_))
        ));
    }

    #[test]
    fn at_location_filters_by_name() {
        let mut market = MarketView::new();
        let a = listing("A", "Harbour");
        let a_id = a.id;
        market.register(a).unwrap();
        market.register(listing("B", "Old Town")).unwrap();

        assert_eq!(market.at_location("Harbour"), vec![a_id]);
        assert!(market.at_location("Nowhere").is_empty());
    }

    #[test]
    fn occupancy_is_capped_at_full() {
        let state = ListingState {
            listing: listing("A", "Harbour"),
            multipliers: MarketMultipliers {
                price: 1.0,
                occupancy: 2.0,
            },
        };
        assert!((state.effective_occupancy() - 1.0).abs() < 1e-12);
    }
}
