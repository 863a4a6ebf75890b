//! Locale codes.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A locale code such as `en` or `it`.
///
/// Codes are normalized to lowercase, including when deserialized, so
/// content files and configuration may spell them either way. The wrapper
/// serializes as a bare string, which lets it act as a map key in JSON and
/// YAML.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(from = "String", into = "String")]
#[ts(export, export_to = "bindings/")]
pub struct Locale(String);

impl Locale {
    /// English, the default fallback locale.
    pub const ENGLISH: &'static str = "en";

    /// Italian, the second shipped locale.
    pub const ITALIAN: &'static str = "it";

    /// Create a locale from a code, trimming whitespace and lowercasing it.
    pub fn new(code: &str) -> Self {
        Self(code.trim().to_lowercase())
    }

    /// The English locale.
    pub fn english() -> Self {
        Self(Self::ENGLISH.to_owned())
    }

    /// The Italian locale.
    pub fn italian() -> Self {
        Self(Self::ITALIAN.to_owned())
    }

    /// Return the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::english()
    }
}

impl core::fmt::Display for Locale {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Locale {
    fn from(code: String) -> Self {
        Self::new(&code)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.0
    }
}

impl From<&str> for Locale {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_normalized() {
        assert_eq!(Locale::new(" IT "), Locale::italian());
        assert_eq!(Locale::from("En").as_str(), "en");
    }

    #[test]
    fn deserialization_normalizes_case() {
        let locale: Option<Locale> = serde_json::from_str("\"IT\"").ok();
        assert_eq!(locale, Some(Locale::italian()));
    }

    #[test]
    fn serializes_as_bare_string() {
        let json = serde_json::to_string(&Locale::italian()).ok();
        assert_eq!(json.as_deref(), Some("\"it\""));
    }
}
