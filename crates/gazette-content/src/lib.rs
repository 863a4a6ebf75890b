//! Static content for the Gazette engine.
//!
//! Everything in this crate is loaded once and read-only afterwards:
//!
//! - [`template`] -- `{placeholder}` scanning and rendering
//! - [`localization`] -- locale fallback chain and UI string lookup
//! - [`catalog`] -- the validated category/subtype registry
//! - [`schedule`] -- the authored, date-anchored timeline entries
//! - [`pack`] -- the JSON document bundling all of the above
//!
//! The only I/O happens in the explicit `from_file` loaders.

pub mod catalog;
pub mod error;
pub mod localization;
pub mod pack;
pub mod schedule;
pub mod template;

pub use catalog::{EventCatalog, EventSubtype, WordList};
pub use error::ContentError;
pub use localization::{LocalizationResolver, StringTables};
pub use pack::{BUILTIN_CONTENT, ContentPack};
pub use schedule::{RejectedEvent, Schedule, ScheduledEvent};
pub use template::{Bindings, TemplateError};
