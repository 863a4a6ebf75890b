//! Error types for the `gazette-content` crate.
//!
//! Loading is fail-fast: any [`ContentError`] aborts startup. The one
//! exception is a scheduled event with a bad date or time, which is
//! logged and dropped without failing the rest of the pack.

use std::path::PathBuf;

use gazette_types::EventCategory;

/// Errors that can occur while loading or querying content.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// Failed to read a content file from disk.
    #[error("failed to read content file {path}: {source}")]
    Io {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The content document is not valid JSON or has the wrong shape.
    #[error("failed to parse content JSON: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// A catalog entry failed validation.
    #[error("catalog validation failed for {category}/{subtype}: {reason}")]
    Validation {
        /// Category key of the offending entry.
        category: String,
        /// Subtype name of the offending entry.
        subtype: String,
        /// The template text, when the failure is template-specific.
        template: Option<String>,
        /// What is wrong.
        reason: String,
    },

    /// A top-level catalog key is not one of the four categories.
    #[error("unknown event category: {name}")]
    UnknownCategory {
        /// The unrecognized key.
        name: String,
    },

    /// A category has no subtypes, which would make it unreachable.
    #[error("event category {category} has no subtypes")]
    EmptyCategory {
        /// The empty category.
        category: EventCategory,
    },

    /// A lookup named a subtype the catalog does not contain.
    #[error("unknown subtype {category}/{name}")]
    UnknownSubtype {
        /// Category searched.
        category: EventCategory,
        /// Subtype name requested.
        name: String,
    },
}
