//! Configuration loading and typed config structures for the Gazette engine.
//!
//! The canonical configuration lives in `gazette-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, a loader that reads the file, and [`GazetteConfig::validate`]
//! which rejects values the engine can not run with.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveTime};
use gazette_content::schedule::{DATE_FORMAT, TIME_FORMAT};
use gazette_types::{EventCategory, Locale};
use serde::Deserialize;

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is outside its allowed range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Which setting is wrong and why.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration.
///
/// Mirrors the structure of `gazette-config.yaml`. Every field has a
/// default, so an empty document is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GazetteConfig {
    /// Seed, calendar start, and tick length.
    #[serde(default)]
    pub session: SessionConfig,

    /// Active locale and fallback chain.
    #[serde(default)]
    pub locale: LocaleConfig,

    /// Procedural event sampling.
    #[serde(default)]
    pub sampler: SamplerConfig,

    /// Effect stacking bounds and soul outlier reporting.
    #[serde(default)]
    pub effects: EffectsConfig,

    /// Where the content pack is read from.
    #[serde(default)]
    pub content: ContentConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Headless runner settings.
    #[serde(default)]
    pub runner: RunnerConfig,

    /// Listings registered at startup.
    #[serde(default)]
    pub market: MarketConfig,
}

impl GazetteConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// An empty or whitespace-only document yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Check every value the engine depends on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.session.start_date()?;
        self.session.untimed_event_time()?;
        if self.session.hours_per_tick == 0 {
            return Err(invalid("session.hours_per_tick must be at least 1"));
        }

        if self.locale.default.as_str().is_empty() {
            return Err(invalid("locale.default must not be empty"));
        }

        let s = &self.sampler;
        if !(s.soul_scale.is_finite() && s.soul_scale > 0.0) {
            return Err(invalid("sampler.soul_scale must be a positive number"));
        }
        if !(s.mean_reversion.is_finite() && s.mean_reversion >= 0.0) {
            return Err(invalid("sampler.mean_reversion must be a non-negative number"));
        }
        if !(s.weight_epsilon.is_finite() && s.weight_epsilon > 0.0) {
            return Err(invalid("sampler.weight_epsilon must be a positive number"));
        }
        if !(0.0..=1.0).contains(&s.procedural_event_chance) {
            return Err(invalid("sampler.procedural_event_chance must be within 0..=1"));
        }
        if s.max_render_attempts == 0 {
            return Err(invalid("sampler.max_render_attempts must be at least 1"));
        }
        for category in EventCategory::ALL {
            let w = s.base_weights.get(category);
            if !(w.is_finite() && w > 0.0) {
                return Err(ConfigError::Invalid {
                    reason: format!("sampler.base_weights.{category} must be a positive number"),
                });
            }
        }

        let e = &self.effects;
        if !(e.min_multiplier.is_finite()
            && e.max_multiplier.is_finite()
            && e.min_multiplier > 0.0
            && e.min_multiplier <= e.max_multiplier)
        {
            return Err(invalid(
                "effects.min_multiplier and effects.max_multiplier must satisfy 0 < min <= max",
            ));
        }

        if self.runner.tick_interval_ms == 0 {
            return Err(invalid("runner.tick_interval_ms must be at least 1"));
        }

        for listing in &self.market.listings {
            if !(listing.base_price.is_finite() && listing.base_price >= 0.0) {
                return Err(ConfigError::Invalid {
                    reason: format!("market listing {:?} has an invalid base_price", listing.name),
                });
            }
            if !(0.0..=1.0).contains(&listing.base_occupancy) {
                return Err(ConfigError::Invalid {
                    reason: format!(
                        "market listing {:?} base_occupancy must be within 0..=1",
                        listing.name
                    ),
                });
            }
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.to_owned(),
    }
}

/// Seed, calendar anchor, and tick length.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    /// Random seed for reproducible sessions.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// In-game calendar date of hour 0, `DD/MM/YYYY`.
    #[serde(default = "default_start_date")]
    pub start_date: String,

    /// Game hours added by each tick.
    #[serde(default = "default_hours_per_tick")]
    pub hours_per_tick: u64,

    /// Time of day used for scheduled events authored without one, `HH:MM`.
    #[serde(default = "default_untimed_event_time")]
    pub untimed_event_time: String,
}

impl SessionConfig {
    /// Parsed [`start_date`](Self::start_date).
    pub fn start_date(&self) -> Result<NaiveDate, ConfigError> {
        NaiveDate::parse_from_str(self.start_date.trim(), DATE_FORMAT).map_err(|e| {
            ConfigError::Invalid {
                reason: format!("session.start_date {:?}: {e}", self.start_date),
            }
        })
    }

    /// Parsed [`untimed_event_time`](Self::untimed_event_time).
    pub fn untimed_event_time(&self) -> Result<NaiveTime, ConfigError> {
        NaiveTime::parse_from_str(self.untimed_event_time.trim(), TIME_FORMAT).map_err(|e| {
            ConfigError::Invalid {
                reason: format!("session.untimed_event_time {:?}: {e}", self.untimed_event_time),
            }
        })
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            start_date: default_start_date(),
            hours_per_tick: default_hours_per_tick(),
            untimed_event_time: default_untimed_event_time(),
        }
    }
}

/// Locale selection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LocaleConfig {
    /// Locale the session starts in.
    #[serde(default)]
    pub default: Locale,

    /// Locales tried, in order, when a string is missing.
    #[serde(default = "default_fallback")]
    pub fallback: Vec<Locale>,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            default: Locale::default(),
            fallback: default_fallback(),
        }
    }
}

/// Base weight per event category before soul biasing.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CategoryWeights {
    /// Base weight of positive news.
    #[serde(default = "default_base_weight")]
    pub positive: f64,
    /// Base weight of negative news.
    #[serde(default = "default_base_weight")]
    pub negative: f64,
    /// Base weight of neutral news.
    #[serde(default = "default_base_weight")]
    pub neutral: f64,
    /// Base weight of surreal news.
    #[serde(default = "default_base_weight")]
    pub surreal: f64,
}

impl CategoryWeights {
    /// The base weight of one category.
    pub const fn get(&self, category: EventCategory) -> f64 {
        match category {
            EventCategory::Positive => self.positive,
            EventCategory::Negative => self.negative,
            EventCategory::Neutral => self.neutral,
            EventCategory::Surreal => self.surreal,
        }
    }
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            positive: default_base_weight(),
            negative: default_base_weight(),
            neutral: default_base_weight(),
            surreal: default_base_weight(),
        }
    }
}

/// Procedural event sampling parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SamplerConfig {
    /// Soul value at which the tone reaches `tanh(1)`.
    #[serde(default = "default_soul_scale")]
    pub soul_scale: f64,

    /// Strength of the pull away from the current tone.
    #[serde(default = "default_mean_reversion")]
    pub mean_reversion: f64,

    /// Floor every category weight is clamped to.
    #[serde(default = "default_weight_epsilon")]
    pub weight_epsilon: f64,

    /// Probability that a tick produces a procedural event.
    #[serde(default = "default_procedural_event_chance")]
    pub procedural_event_chance: f64,

    /// Templates tried per subtype before giving up on a render.
    #[serde(default = "default_max_render_attempts")]
    pub max_render_attempts: u32,

    /// Category weights before soul biasing.
    #[serde(default)]
    pub base_weights: CategoryWeights,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            soul_scale: default_soul_scale(),
            mean_reversion: default_mean_reversion(),
            weight_epsilon: default_weight_epsilon(),
            procedural_event_chance: default_procedural_event_chance(),
            max_render_attempts: default_max_render_attempts(),
            base_weights: CategoryWeights::default(),
        }
    }
}

/// Effect stacking bounds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EffectsConfig {
    /// Lower bound on any combined multiplier.
    #[serde(default = "default_min_multiplier")]
    pub min_multiplier: f64,

    /// Upper bound on any combined multiplier.
    #[serde(default = "default_max_multiplier")]
    pub max_multiplier: f64,

    /// Scheduled soul deltas larger than this in magnitude are logged.
    #[serde(default = "default_soul_outlier_threshold")]
    pub soul_outlier_threshold: u32,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            min_multiplier: default_min_multiplier(),
            max_multiplier: default_max_multiplier(),
            soul_outlier_threshold: default_soul_outlier_threshold(),
        }
    }
}

/// Content pack location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContentConfig {
    /// Path to a content pack JSON file; the built-in pack when absent.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), overridden by `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Headless runner settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunnerConfig {
    /// Real-time milliseconds between ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Maximum number of ticks before the run ends (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            max_ticks: 0,
        }
    }
}

/// Listings registered before the first tick.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MarketConfig {
    /// Demo listings.
    #[serde(default)]
    pub listings: Vec<ListingConfig>,
}

/// One configured listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ListingConfig {
    /// Display name.
    pub name: String,
    /// Location name.
    pub location: String,
    /// Price before any effect.
    #[serde(default = "default_base_price")]
    pub base_price: f64,
    /// Occupancy rate before any effect.
    #[serde(default = "default_base_occupancy")]
    pub base_occupancy: f64,
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_seed() -> u64 {
    42
}

fn default_start_date() -> String {
    "01/01/2025".to_owned()
}

const fn default_hours_per_tick() -> u64 {
    1
}

fn default_untimed_event_time() -> String {
    "12:00".to_owned()
}

fn default_fallback() -> Vec<Locale> {
    vec![Locale::english()]
}

const fn default_base_weight() -> f64 {
    1.0
}

const fn default_soul_scale() -> f64 {
    25.0
}

const fn default_mean_reversion() -> f64 {
    0.8
}

const fn default_weight_epsilon() -> f64 {
    0.01
}

const fn default_procedural_event_chance() -> f64 {
    0.3
}

const fn default_max_render_attempts() -> u32 {
    8
}

const fn default_min_multiplier() -> f64 {
    0.1
}

const fn default_max_multiplier() -> f64 {
    5.0
}

const fn default_soul_outlier_threshold() -> u32 {
    100
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_tick_interval_ms() -> u64 {
    1000
}

const fn default_base_price() -> f64 {
    100.0
}

const fn default_base_occupancy() -> f64 {
    0.6
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = GazetteConfig::default();
        assert_eq!(config.session.seed, 42);
        assert_eq!(config.session.hours_per_tick, 1);
        assert_eq!(config.locale.default, Locale::english());
        assert_eq!(config.sampler.max_render_attempts, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let config = GazetteConfig::parse(include_str!("../../../gazette-config.yaml")).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.session, SessionConfig::default());
        assert_eq!(config.sampler, SamplerConfig::default());
        assert_eq!(config.effects, EffectsConfig::default());
        assert!(config.content.path.is_none());
        assert_eq!(config.market.listings.len(), 3);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
session:
  seed: 7
  start_date: "15/03/2025"
  hours_per_tick: 6
  untimed_event_time: "08:00"

locale:
  default: IT
  fallback: [en]

sampler:
  soul_scale: 10.0
  mean_reversion: 0.5
  weight_epsilon: 0.05
  procedural_event_chance: 1.0
  max_render_attempts: 3
  base_weights:
    positive: 2.0
    surreal: 0.5

effects:
  min_multiplier: 0.5
  max_multiplier: 2.0
  soul_outlier_threshold: 20

content:
  path: "data/custom.json"

logging:
  level: debug
  json: true

runner:
  tick_interval_ms: 250
  max_ticks: 100

market:
  listings:
    - name: "Blue Anchor Inn"
      location: "Harbour"
      base_price: 120.0
      base_occupancy: 0.7
    - name: "Old Mill"
      location: "Old Town"
"#;
        let config = GazetteConfig::parse(yaml).unwrap();
        assert_eq!(config.session.seed, 7);
        assert_eq!(
            config.session.start_date().unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
        );
        assert_eq!(config.locale.default, Locale::italian());
        assert_eq!(config.sampler.max_render_attempts, 3);
        assert!((config.sampler.base_weights.positive - 2.0).abs() < f64::EPSILON);
        assert!((config.sampler.base_weights.negative - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.effects.soul_outlier_threshold, 20);
        assert_eq!(config.content.path, Some(PathBuf::from("data/custom.json")));
        assert!(config.logging.json);
        assert_eq!(config.runner.max_ticks, 100);
        assert_eq!(config.market.listings.len(), 2);
        assert!((config.market.listings[1].base_price - 100.0).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = GazetteConfig::parse("session:\n  seed: 9\n").unwrap();
        assert_eq!(config.session.seed, 9);
        assert_eq!(config.session.start_date, "01/01/2025");
        assert_eq!(config.runner.tick_interval_ms, 1000);
        assert!(config.content.path.is_none());
    }

    #[test]
    fn parse_empty_yaml() {
        let config = GazetteConfig::parse("").unwrap();
        assert_eq!(config, GazetteConfig::default());
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        assert!(matches!(
            GazetteConfig::parse("session: [unclosed"),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    fn out_of_range_values_fail_validation() {
        let mut config = GazetteConfig::default();
        config.sampler.procedural_event_chance = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));

        let mut config = GazetteConfig::default();
        config.effects.min_multiplier = 0.0;
        assert!(config.validate().is_err());

        let mut config = GazetteConfig::default();
        config.session.start_date = "2025-01-01".to_owned();
        assert!(config.validate().is_err());

        let mut config = GazetteConfig::default();
        config.session.hours_per_tick = 0;
        assert!(config.validate().is_err());

        let mut config = GazetteConfig::default();
        config.sampler.base_weights.neutral = -1.0;
        assert!(config.validate().is_err());
    }
}
