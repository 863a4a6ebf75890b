//! The event catalog: category -> subtype -> templates, word-lists, effect.
//!
//! The catalog is read once from the `events` section of a content pack and
//! is immutable afterwards. Validation is eager: a template that names a
//! placeholder with no word-list and no structural binding, an effect with
//! a non-positive multiplier, or a category without subtypes all fail the
//! load with the offending entry named, rather than surfacing mid-game.

use std::collections::BTreeMap;
use std::path::Path;

use gazette_types::{EffectSpec, EventCategory, Locale};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ContentError;
use crate::template;

/// Localized word-list: `locale -> words`.
pub type WordList = BTreeMap<Locale, Vec<String>>;

/// Typical price multiplier band; values outside load with a warning.
const TYPICAL_PRICE_EFFECT: (f64, f64) = (0.7, 1.3);

/// Typical occupancy multiplier band; values outside load with a warning.
const TYPICAL_OCCUPANCY_EFFECT: (f64, f64) = (0.2, 1.5);

/// One subtype as it appears in the content file.
///
/// Every key that is not a known field is a word-list, so the remainder is
/// captured by the flattened map and checked separately.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSubtype {
    #[serde(default)]
    templates: BTreeMap<Locale, Vec<String>>,
    price_effect: f64,
    occupancy_effect: f64,
    duration: u64,
    #[serde(default)]
    soul_tendency_modifier: f64,
    #[serde(default = "default_weight")]
    weight: f64,
    #[serde(flatten)]
    word_lists: BTreeMap<String, serde_json::Value>,
}

const fn default_weight() -> f64 {
    1.0
}

/// A named flavor of event within one category.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSubtype {
    /// Subtype name, e.g. `festival`.
    pub name: String,
    /// The owning category.
    pub category: EventCategory,
    /// Headline templates per locale.
    pub templates: BTreeMap<Locale, Vec<String>>,
    /// Word-lists keyed by placeholder name.
    pub word_lists: BTreeMap<String, WordList>,
    /// Market effect of one occurrence.
    pub effect: EffectSpec,
    /// Relative selection weight within the category (> 0).
    pub weight: f64,
}

impl EventSubtype {
    /// Look up a word-list by placeholder name.
    pub fn word_list(&self, name: &str) -> Option<&WordList> {
        self.word_lists.get(name)
    }

    /// Total number of templates across every locale.
    pub fn template_count(&self) -> usize {
        self.templates.values().map(Vec::len).sum()
    }
}

/// Validated, immutable registry of every event subtype.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventCatalog {
    subtypes: BTreeMap<EventCategory, Vec<EventSubtype>>,
}

impl EventCatalog {
    /// Build and validate a catalog from the `events` JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ContentError> {
        let raw: BTreeMap<String, BTreeMap<String, serde_json::Value>> =
            serde_json::from_value(value)?;

        let mut subtypes: BTreeMap<EventCategory, Vec<EventSubtype>> = BTreeMap::new();
        for (category_key, entries) in raw {
            let category = EventCategory::parse(&category_key).ok_or_else(|| {
                ContentError::UnknownCategory {
                    name: category_key.clone(),
                }
            })?;
            let list = subtypes.entry(category).or_default();
            for (name, entry) in entries {
                list.push(validate_subtype(category, name, entry)?);
            }
        }

        for category in EventCategory::ALL {
            if subtypes.get(&category).is_none_or(Vec::is_empty) {
                return Err(ContentError::EmptyCategory { category });
            }
        }

        let catalog = Self { subtypes };
        debug!(subtypes = catalog.subtype_count(), "Event catalog validated");
        Ok(catalog)
    }

    /// Parse and validate a catalog from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ContentError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Read, parse, and validate a catalog file.
    pub fn from_file(path: &Path) -> Result<Self, ContentError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Look up one subtype.
    pub fn get_subtype(
        &self,
        category: EventCategory,
        name: &str,
    ) -> Result<&EventSubtype, ContentError> {
        self.all_subtypes(category)
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| ContentError::UnknownSubtype {
                category,
                name: name.to_owned(),
            })
    }

    /// Every subtype of a category, in name order.
    pub fn all_subtypes(&self, category: EventCategory) -> &[EventSubtype] {
        self.subtypes.get(&category).map_or(&[], Vec::as_slice)
    }

    /// Iterate over every subtype in every category.
    pub fn iter(&self) -> impl Iterator<Item = &EventSubtype> {
        self.subtypes.values().flatten()
    }

    /// Number of subtypes across all categories.
    pub fn subtype_count(&self) -> usize {
        self.subtypes.values().map(Vec::len).sum()
    }
}

/// Check an effect's numeric invariants, warning on atypical values.
///
/// Returns a description of the first violated invariant.
pub fn check_effect(effect: &EffectSpec) -> Result<(), String> {
    if !(effect.price_effect.is_finite() && effect.price_effect > 0.0) {
        return Err(format!(
            "priceEffect must be a positive number, got {}",
            effect.price_effect
        ));
    }
    if !(effect.occupancy_effect.is_finite() && effect.occupancy_effect > 0.0) {
        return Err(format!(
            "occupancyEffect must be a positive number, got {}",
            effect.occupancy_effect
        ));
    }
    if effect.duration_hours == 0 {
        return Err("duration must be at least one hour".to_owned());
    }
    if !effect.soul_tendency_modifier.is_finite() {
        return Err("soulTendencyModifier must be finite".to_owned());
    }

    if !in_band(effect.price_effect, TYPICAL_PRICE_EFFECT) {
        warn!(price_effect = effect.price_effect, "priceEffect outside the typical band");
    }
    if !in_band(effect.occupancy_effect, TYPICAL_OCCUPANCY_EFFECT) {
        warn!(
            occupancy_effect = effect.occupancy_effect,
            "occupancyEffect outside the typical band"
        );
    }
    Ok(())
}

fn in_band(value: f64, (low, high): (f64, f64)) -> bool {
    (low..=high).contains(&value)
}

fn validate_subtype(
    category: EventCategory,
    name: String,
    entry: serde_json::Value,
) -> Result<EventSubtype, ContentError> {
    let invalid = |template: Option<&str>, reason: String| ContentError::Validation {
        category: category.as_str().to_owned(),
        subtype: name.clone(),
        template: template.map(str::to_owned),
        reason,
    };

    let raw: RawSubtype =
        serde_json::from_value(entry).map_err(|e| invalid(None, format!("malformed entry: {e}")))?;

    let effect = EffectSpec {
        price_effect: raw.price_effect,
        occupancy_effect: raw.occupancy_effect,
        duration_hours: raw.duration,
        soul_tendency_modifier: raw.soul_tendency_modifier,
    };
    check_effect(&effect).map_err(|reason| invalid(None, reason))?;

    if !(raw.weight.is_finite() && raw.weight > 0.0) {
        return Err(invalid(None, format!("weight must be positive, got {}", raw.weight)));
    }

    let mut word_lists: BTreeMap<String, WordList> = BTreeMap::new();
    for (list_name, value) in raw.word_lists {
        let list: WordList = serde_json::from_value(value).map_err(|e| {
            invalid(
                None,
                format!("word list `{list_name}` is not a locale -> [string] map: {e}"),
            )
        })?;
        for (locale, words) in &list {
            if words.is_empty() {
                return Err(invalid(
                    None,
                    format!("word list `{list_name}` is empty for locale {locale}"),
                ));
            }
            if let Some(word) = words.iter().find(|w| w.contains(['{', '}'])) {
                return Err(invalid(
                    None,
                    format!("word list `{list_name}` entry {word:?} contains a brace"),
                ));
            }
        }
        word_lists.insert(list_name, list);
    }

    if raw.templates.values().all(Vec::is_empty) {
        return Err(invalid(None, "subtype has no templates".to_owned()));
    }
    for (locale, templates) in &raw.templates {
        if templates.is_empty() {
            return Err(invalid(None, format!("template list for locale {locale} is empty")));
        }
        for text in templates {
            let names = template::placeholders(text)
                .map_err(|e| invalid(Some(text), e.to_string()))?;
            for placeholder in &names {
                if !word_lists.contains_key(placeholder) && !template::is_structural(placeholder) {
                    return Err(invalid(
                        Some(text),
                        format!(
                            "placeholder {{{placeholder}}} in {locale} template {text:?} has no word list or structural binding"
                        ),
                    ));
                }
            }
        }
    }

    Ok(EventSubtype {
        name,
        category,
        templates: raw.templates,
        word_lists,
        effect,
        weight: raw.weight,
    })
}
