//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Listings registered by the property module and effects created by the
//! engine each carry a strongly-typed ID so the two can never be mixed up
//! at a call site. All IDs use UUID v7 (time-ordered).

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Returned when a string is neither `<prefix>-<uuid>` nor a bare UUID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} id: {input:?}")]
pub struct ParseIdError {
    /// Which id type was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub input: String,
}

/// Declares a v7 UUID id whose display form carries a short prefix, so a
/// log line reads `effect=fx-0190...` rather than a bare UUID.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[serde(transparent)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(Uuid);

        impl $name {
            /// Display prefix.
            pub const PREFIX: &'static str = $prefix;

            /// A fresh time-ordered id.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// The underlying UUID.
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", Self::PREFIX, self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s
                    .strip_prefix(Self::PREFIX)
                    .and_then(|rest| rest.strip_prefix('-'))
                    .unwrap_or(s);
                Uuid::parse_str(raw).map(Self).map_err(|_err| ParseIdError {
                    kind: stringify!($name),
                    input: s.to_owned(),
                })
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

define_id! {
    /// A property listing registered in the market view.
    PropertyId, "prop"
}

define_id! {
    /// One running, time-bounded market effect.
    EffectId, "fx"
}
