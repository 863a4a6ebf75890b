//! The simulated property market and the effects that move it.
//!
//! - [`market`] -- [`MarketView`], the registry of listings and their
//!   current multipliers
//! - [`effects`] -- [`EffectEngine`], which applies, stacks, clamps, and
//!   expires time-bounded effects
//!
//! All times are game hours supplied by the caller; nothing here reads a
//! clock.

pub mod effects;
pub mod error;
pub mod market;

pub use effects::{
    DEFAULT_MAX_MULTIPLIER, DEFAULT_MIN_MULTIPLIER, EffectEngine, MultiplierBand, validate_spec,
};
pub use error::MarketError;
pub use market::{ListingState, MarketView};
