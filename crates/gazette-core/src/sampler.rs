//! Soul-biased weighted sampling of procedural news.
//!
//! Sampling runs in three weighted draws: a category from
//! [`weights`], a subtype by its catalog `weight`, then a uniform template
//! in the active locale. Placeholders are filled from the subtype's
//! word-lists or, for structural names, from a [`BindingSource`].
//!
//! The category bias pushes *against* the current tone: a city in a good
//! mood draws more negative and surreal news, a gloomy one more positive
//! news. No category is ever unreachable.

use std::sync::Arc;

use gazette_content::catalog::{EventCatalog, EventSubtype};
use gazette_content::localization::LocalizationResolver;
use gazette_content::template::{self, Bindings, TemplateError};
use gazette_types::{EventCategory, Locale, RenderedEvent};
use rand::RngCore;
use rand::seq::{IndexedRandom, SliceRandom};
use tracing::debug;

use crate::bindings::BindingSource;
use crate::config::SamplerConfig;

/// Errors that can occur while sampling or rendering an event.
#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    /// Every template tried had a placeholder that could not be bound.
    #[error("no template of {category}/{subtype} rendered after {attempts} attempts")]
    Exhausted {
        /// Category of the subtype.
        category: EventCategory,
        /// Subtype name.
        subtype: String,
        /// Templates tried.
        attempts: u32,
    },

    /// The category has no subtypes to draw from.
    #[error("event category {category} has no subtypes")]
    EmptyCategory {
        /// The empty category.
        category: EventCategory,
    },

    /// The subtype has no template in any locale of the fallback chain.
    #[error("{category}/{subtype} has no templates for locale {locale}")]
    NoTemplates {
        /// Category of the subtype.
        category: EventCategory,
        /// Subtype name.
        subtype: String,
        /// Locale requested.
        locale: Locale,
    },
}

/// Steering direction of each category relative to the current tone.
pub const fn bias(category: EventCategory) -> f64 {
    match category {
        EventCategory::Positive => -1.0,
        EventCategory::Negative => 1.0,
        EventCategory::Neutral => 0.0,
        EventCategory::Surreal => 0.5,
    }
}

/// Category weights for the given soul value.
///
/// `w[c] = base[c] * (1 + mean_reversion * bias[c] * tanh(soul / soul_scale))`,
/// with any weight at or below `weight_epsilon` (or not finite) raised to
/// `weight_epsilon`.
pub fn weights(soul: f64, config: &SamplerConfig) -> [(EventCategory, f64); 4] {
    let tone = (soul / config.soul_scale).tanh();
    EventCategory::ALL.map(|category| {
        let w = config.base_weights.get(category)
            * config.mean_reversion.mul_add(bias(category) * tone, 1.0);
        let w = if w.is_finite() && w > config.weight_epsilon {
            w
        } else {
            config.weight_epsilon
        };
        (category, w)
    })
}

/// Draws and renders procedural events from a shared catalog.
#[derive(Debug, Clone)]
pub struct WeightedEventSampler {
    catalog: Arc<EventCatalog>,
    resolver: Arc<LocalizationResolver>,
    config: SamplerConfig,
}

impl WeightedEventSampler {
    /// Create a sampler.
    pub const fn new(
        catalog: Arc<EventCatalog>,
        resolver: Arc<LocalizationResolver>,
        config: SamplerConfig,
    ) -> Self {
        Self {
            catalog,
            resolver,
            config,
        }
    }

    /// The catalog being sampled.
    pub fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    /// Category weights for `soul` under this sampler's configuration.
    pub fn weights(&self, soul: f64) -> [(EventCategory, f64); 4] {
        weights(soul, &self.config)
    }

    /// Draw a category for `soul`.
    pub fn sample_category(&self, soul: f64, rng: &mut dyn RngCore) -> EventCategory {
        let table = self.weights(soul);
        table
            .choose_weighted(rng, |(_, w)| *w)
            .map_or(EventCategory::Neutral, |(category, _)| *category)
    }

    /// Draw, fill, and render one procedural event.
    ///
    /// # Errors
    ///
    /// Returns [`SampleError::EmptyCategory`] if the drawn category has no
    /// subtypes, [`SampleError::NoTemplates`] if the drawn subtype has no
    /// template in the locale chain, or [`SampleError::Exhausted`] if no
    /// template could be fully bound.
    pub fn sample(
        &self,
        soul: f64,
        locale: &Locale,
        bindings: &mut dyn BindingSource,
        rng: &mut dyn RngCore,
    ) -> Result<RenderedEvent, SampleError> {
        let category = self.sample_category(soul, rng);
        let subtype = self
            .catalog
            .all_subtypes(category)
            .choose_weighted(rng, |s| s.weight)
            .map_err(|_err| SampleError::EmptyCategory { category })?;
        debug!(%category, subtype = %subtype.name, soul, "Sampled procedural event");
        self.render(subtype, locale, bindings, rng)
    }

    /// Render one event of a given subtype.
    ///
    /// Templates are tried in random order; a template with an unbindable
    /// placeholder is skipped, up to `max_render_attempts` templates.
    pub fn render(
        &self,
        subtype: &EventSubtype,
        locale: &Locale,
        bindings: &mut dyn BindingSource,
        rng: &mut dyn RngCore,
    ) -> Result<RenderedEvent, SampleError> {
        let (found, templates) = self
            .resolver
            .pick_list(&subtype.templates, locale)
            .ok_or_else(|| SampleError::NoTemplates {
                category: subtype.category,
                subtype: subtype.name.clone(),
                locale: locale.clone(),
            })?;

        let mut order: Vec<&String> = templates.iter().collect();
        order.shuffle(rng);

        let mut attempts: u32 = 0;
        for text in order {
            if attempts >= self.config.max_render_attempts {
                break;
            }
            attempts = attempts.saturating_add(1);
            bindings.begin_attempt();

            match self.fill(subtype, text, found, bindings, rng) {
                Ok(rendered) => {
                    return Ok(RenderedEvent {
                        text: rendered,
                        effect: subtype.effect,
                        category: subtype.category,
                        subtype: subtype.name.clone(),
                        locale: found.clone(),
                    });
                }
                Err(err) => {
                    debug!(
                        category = %subtype.category,
                        subtype = %subtype.name,
                        template = %text,
                        %err,
                        "Template discarded"
                    );
                }
            }
        }

        Err(SampleError::Exhausted {
            category: subtype.category,
            subtype: subtype.name.clone(),
            attempts,
        })
    }

    fn fill(
        &self,
        subtype: &EventSubtype,
        text: &str,
        locale: &Locale,
        source: &mut dyn BindingSource,
        rng: &mut dyn RngCore,
    ) -> Result<String, TemplateError> {
        let mut values = Bindings::new();
        for name in template::placeholders(text)? {
            let value = match subtype.word_list(&name) {
                Some(list) => self
                    .resolver
                    .pick_list(list, locale)
                    .and_then(|(_, words)| words.choose(rng))
                    .cloned(),
                None => source.bind(&name, rng),
            };
            if let Some(value) = value {
                values.insert(name, value);
            }
        }
        template::render(text, &values)
    }
}
