//! The content pack: one JSON document holding the event catalog, the
//! authored timeline and the UI string tables.

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::catalog::EventCatalog;
use crate::error::ContentError;
use crate::localization::StringTables;
use crate::schedule::{Schedule, parse_schedule};

/// The content pack compiled into the binary.
pub const BUILTIN_CONTENT: &str = include_str!("../data/news.json");

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPack {
    events: serde_json::Value,
    #[serde(default)]
    real_news: Vec<serde_json::Value>,
    #[serde(default)]
    ui: StringTables,
}

/// Loaded and validated content.
#[derive(Debug, Clone)]
pub struct ContentPack {
    /// The procedural event catalog.
    pub catalog: EventCatalog,
    /// The authored timeline, in declaration order.
    pub schedule: Schedule,
    /// UI strings per locale.
    pub ui: StringTables,
}

impl ContentPack {
    /// Load the pack shipped inside the binary.
    pub fn builtin() -> Result<Self, ContentError> {
        Self::from_json_str(BUILTIN_CONTENT)
    }

    /// Parse and validate a pack from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ContentError> {
        let raw: RawPack = serde_json::from_str(json)?;
        let catalog = EventCatalog::from_value(raw.events)?;
        let schedule = parse_schedule(raw.real_news);

        info!(
            subtypes = catalog.subtype_count(),
            scheduled = schedule.events.len(),
            rejected = schedule.rejected.len(),
            ui_locales = raw.ui.len(),
            "Content pack loaded"
        );

        Ok(Self {
            catalog,
            schedule,
            ui: raw.ui,
        })
    }

    /// Read and validate a pack file.
    pub fn from_file(path: &Path) -> Result<Self, ContentError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }
}
