//! Structural binding sources.
//!
//! Placeholders such as `{location}` or `{amount}` are not backed by a
//! word-list in the catalog; the sampler asks a [`BindingSource`] for them
//! at render time. [`MarketBindings`] draws them from the live market.

use gazette_content::localization::LocalizationResolver;
use gazette_content::template::Bindings;
use gazette_market::MarketView;
use gazette_types::{Locale, PropertyListing};
use rand::seq::IteratorRandom;
use rand::{Rng, RngCore};

/// UI key used for `{location}` when no listing is registered.
pub const FALLBACK_LOCATION_KEY: &str = "fallback_location";

/// UI key used for `{property}` when no listing is registered.
pub const FALLBACK_PROPERTY_KEY: &str = "fallback_property";

/// Supplies values for structural placeholders.
pub trait BindingSource {
    /// Produce a value for `name`, or `None` if this source can not.
    fn bind(&mut self, name: &str, rng: &mut dyn RngCore) -> Option<String>;

    /// Called before each template attempt; forget anything recorded by a
    /// discarded one.
    fn begin_attempt(&mut self) {}
}

/// A fixed map of values. Useful for previews and tests.
impl BindingSource for Bindings {
    fn bind(&mut self, name: &str, _rng: &mut dyn RngCore) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Binds structural placeholders from registered listings.
///
/// One listing is drawn on the first `{location}` or `{property}` request
/// and reused for the rest of the render, so both placeholders describe
/// the same place.
#[derive(Debug)]
pub struct MarketBindings<'a> {
    market: &'a MarketView,
    resolver: &'a LocalizationResolver,
    locale: &'a Locale,
    year: i32,
    listing: Option<&'a PropertyListing>,
    drawn: bool,
    bound_location: Option<&'a str>,
}

impl<'a> MarketBindings<'a> {
    /// Bind against `market`, resolving fallbacks in `locale`.
    pub const fn new(
        market: &'a MarketView,
        resolver: &'a LocalizationResolver,
        locale: &'a Locale,
        year: i32,
    ) -> Self {
        Self {
            market,
            resolver,
            locale,
            year,
            listing: None,
            drawn: false,
            bound_location: None,
        }
    }

    /// The listing location consumed by a `{location}` placeholder, if any.
    pub const fn bound_location(&self) -> Option<&'a str> {
        self.bound_location
    }

    fn listing(&mut self, rng: &mut dyn RngCore) -> Option<&'a PropertyListing> {
        if !self.drawn {
            self.drawn = true;
            self.listing = self.market.listings().map(|s| &s.listing).choose(rng);
        }
        self.listing
    }
}

impl BindingSource for MarketBindings<'_> {
    fn begin_attempt(&mut self) {
        self.bound_location = None;
    }

    fn bind(&mut self, name: &str, rng: &mut dyn RngCore) -> Option<String> {
        match name {
            "location" => Some(match self.listing(rng) {
                Some(listing) => {
                    self.bound_location = Some(&listing.location);
                    listing.location.clone()
                }
                None => self.resolver.resolve(self.locale, FALLBACK_LOCATION_KEY),
            }),
            "property" => Some(match self.listing(rng) {
                Some(listing) => listing.name.clone(),
                None => self.resolver.resolve(self.locale, FALLBACK_PROPERTY_KEY),
            }),
            "amount" => Some(rng.random_range(1_000_u32..=50_000).to_string()),
            "number" => Some(rng.random_range(2_u32..=99).to_string()),
            "percent" => Some(rng.random_range(5_u32..=60).to_string()),
            "year" => Some(self.year.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use gazette_types::PropertyId;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn resolver() -> LocalizationResolver {
        let mut en = BTreeMap::new();
        en.insert(FALLBACK_LOCATION_KEY.to_owned(), "the city centre".to_owned());
        en.insert(FALLBACK_PROPERTY_KEY.to_owned(), "a local inn".to_owned());
        let mut tables = BTreeMap::new();
        tables.insert(Locale::english(), en);
        LocalizationResolver::new(tables, vec![Locale::english()])
    }

    #[test]
    fn empty_market_uses_localized_fallbacks() {
        let market = MarketView::new();
        let resolver = resolver();
        let locale = Locale::italian();
        let mut rng = SmallRng::seed_from_u64(1);
        let mut b = MarketBindings::new(&market, &resolver, &locale, 2025);

        assert_eq!(b.bind("location", &mut rng).unwrap(), "the city centre");
        assert_eq!(b.bind("property", &mut rng).unwrap(), "a local inn");
        assert!(b.bound_location().is_none());
    }

    #[test]
    fn location_and_property_come_from_one_listing() {
        let mut market = MarketView::new();
        for (name, location) in [("Inn A", "Harbour"), ("Inn B", "Old Town"), ("Inn C", "Hills")] {
            market
                .register(PropertyListing {
                    id: PropertyId::new(),
                    name: name.to_owned(),
                    location: location.to_owned(),
                    base_price: 100.0,
                    base_occupancy: 0.5,
                })
                .unwrap();
        }
        let resolver = resolver();
        let locale = Locale::english();
        let mut rng = SmallRng::seed_from_u64(99);

        for _ in 0..20 {
            let mut b = MarketBindings::new(&market, &resolver, &locale, 2025);
            let property = b.bind("property", &mut rng).unwrap();
            let location = b.bind("location", &mut rng).unwrap();
            let expected = market
                .listings()
                .find(|s| s.listing.name == property)
                .map(|s| s.listing.location.clone())
                .unwrap();
            assert_eq!(location, expected);
            assert_eq!(b.bound_location(), Some(expected.as_str()));
        }
    }

    #[test]
    fn numeric_bindings_stay_in_range() {
        let market = MarketView::new();
        let resolver = resolver();
        let locale = Locale::english();
        let mut rng = SmallRng::seed_from_u64(5);
        let mut b = MarketBindings::new(&market, &resolver, &locale, 2031);

        for _ in 0..200 {
            let amount: u32 = b.bind("amount", &mut rng).unwrap().parse().unwrap();
            let number: u32 = b.bind("number", &mut rng).unwrap().parse().unwrap();
            let percent: u32 = b.bind("percent", &mut rng).unwrap().parse().unwrap();
            assert!((1_000..=50_000).contains(&amount));
            assert!((2..=99).contains(&number));
            assert!((5..=60).contains(&percent));
        }
        assert_eq!(b.bind("year", &mut rng).unwrap(), "2031");
        assert!(b.bind("festival", &mut rng).is_none());
    }

    #[test]
    fn fixed_bindings_return_their_values() {
        let mut fixed = Bindings::new();
        fixed.insert("location".to_owned(), "Harbour".to_owned());
        let mut rng = SmallRng::seed_from_u64(0);
        assert_eq!(fixed.bind("location", &mut rng).as_deref(), Some("Harbour"));
        assert!(fixed.bind("year", &mut rng).is_none());
    }
}
