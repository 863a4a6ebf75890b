//! Locale resolution with an explicit fallback chain.
//!
//! Lookups try the requested locale first, then each configured fallback
//! locale in order. A UI key missing from every locale in the chain
//! resolves to the key itself, so a gap in a translation shows up as a
//! visible diagnostic instead of an error in the middle of a tick.

use std::collections::BTreeMap;

use gazette_types::Locale;
use tracing::debug;

/// UI strings for every locale: `locale -> key -> text`.
pub type StringTables = BTreeMap<Locale, BTreeMap<String, String>>;

/// Resolves UI keys and per-locale content through a fallback chain.
#[derive(Debug, Clone, Default)]
pub struct LocalizationResolver {
    /// UI strings keyed by locale.
    tables: StringTables,
    /// Locales tried, in order, after the requested one.
    fallback: Vec<Locale>,
}

impl LocalizationResolver {
    /// Create a resolver over the given UI tables and fallback chain.
    pub const fn new(tables: StringTables, fallback: Vec<Locale>) -> Self {
        Self { tables, fallback }
    }

    /// Create a resolver with no UI tables, for content-only lookups.
    pub const fn with_fallback(fallback: Vec<Locale>) -> Self {
        Self {
            tables: BTreeMap::new(),
            fallback,
        }
    }

    /// The configured fallback chain.
    pub fn fallback(&self) -> &[Locale] {
        &self.fallback
    }

    /// Locales that have a UI table.
    pub fn locales(&self) -> impl Iterator<Item = &Locale> {
        self.tables.keys()
    }

    /// The ordered, de-duplicated list of locales tried for `locale`.
    pub fn chain<'a>(&'a self, locale: &'a Locale) -> Vec<&'a Locale> {
        let mut chain: Vec<&Locale> = Vec::with_capacity(self.fallback.len().saturating_add(1));
        for candidate in std::iter::once(locale).chain(self.fallback.iter()) {
            if !chain.contains(&candidate) {
                chain.push(candidate);
            }
        }
        chain
    }

    /// Resolve a UI key, falling back through the chain and finally to the
    /// raw key.
    pub fn resolve(&self, locale: &Locale, key: &str) -> String {
        for candidate in self.chain(locale) {
            if let Some(text) = self.tables.get(candidate).and_then(|t| t.get(key)) {
                return text.clone();
            }
        }
        debug!(%locale, key, "UI key missing from every locale in the chain");
        key.to_owned()
    }

    /// Pick the first entry of a per-locale map along the chain for `locale`.
    pub fn pick<'m, T>(
        &self,
        map: &'m BTreeMap<Locale, T>,
        locale: &Locale,
    ) -> Option<(&'m Locale, &'m T)> {
        self.chain(locale)
            .into_iter()
            .find_map(|candidate| map.get_key_value(candidate))
    }

    /// Like [`pick`](Self::pick), skipping locales whose list is empty.
    pub fn pick_list<'m, T>(
        &self,
        map: &'m BTreeMap<Locale, Vec<T>>,
        locale: &Locale,
    ) -> Option<(&'m Locale, &'m [T])> {
        self.chain(locale).into_iter().find_map(|candidate| {
            map.get_key_value(candidate)
                .filter(|(_, list)| !list.is_empty())
                .map(|(found, list)| (found, list.as_slice()))
        })
    }
}
