//! Error types for the `gazette-market` crate.

use gazette_types::PropertyId;

/// Errors that can occur while registering listings or applying effects.
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    /// An effect or lookup named a listing that is not registered.
    #[error("property not found: {0}")]
    UnknownProperty(PropertyId),

    /// A listing with the same id is already registered.
    #[error("duplicate property id: {0}")]
    DuplicateProperty(PropertyId),

    /// An effect spec violates its numeric invariants.
    #[error("invalid effect: {reason}")]
    InvalidEffect {
        /// What is wrong with the effect.
        reason: String,
    },

    /// A multiplier band is empty, non-positive, or not finite.
    #[error("invalid multiplier band [{min}, {max}]")]
    InvalidBand {
        /// Requested lower bound.
        min: f64,
        /// Requested upper bound.
        max: f64,
    },
}
