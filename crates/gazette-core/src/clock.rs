//! Game clock: tick counter, game hours, and the in-game calendar.
//!
//! Hour 0 is midnight of the configured start date. Each tick adds
//! `hours_per_tick` game hours. The tick number is the source of truth;
//! hours and date-times are derived from it with checked arithmetic.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use crate::config::{ConfigError, SessionConfig};

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// The tick or hour counter would overflow.
    #[error("clock overflow: cannot advance beyond the representable range")]
    Overflow,

    /// Invalid session configuration (e.g. zero hours per tick).
    #[error("invalid clock configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<ConfigError> for ClockError {
    fn from(err: ConfigError) -> Self {
        Self::InvalidConfig {
            reason: err.to_string(),
        }
    }
}

/// Clock tracking the session's position in game time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameClock {
    /// Ticks completed since the session started.
    tick: u64,

    /// Game hours added per tick.
    hours_per_tick: u64,

    /// Calendar moment of hour 0.
    epoch: NaiveDateTime,
}

impl GameClock {
    /// Create a clock from the session configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if the start date does not
    /// parse or `hours_per_tick` is 0.
    pub fn new(config: &SessionConfig) -> Result<Self, ClockError> {
        Self::from_parts(config.start_date()?, config.hours_per_tick)
    }

    /// Create a clock at tick 0 from explicit parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `hours_per_tick` is 0.
    pub fn from_parts(start_date: NaiveDate, hours_per_tick: u64) -> Result<Self, ClockError> {
        if hours_per_tick == 0 {
            return Err(ClockError::InvalidConfig {
                reason: "hours_per_tick must be at least 1".to_owned(),
            });
        }
        Ok(Self {
            tick: 0,
            hours_per_tick,
            epoch: start_date.and_time(chrono::NaiveTime::MIN),
        })
    }

    /// Advance by one tick. Returns the new game hour.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Overflow`] if the tick, the hour, or the
    /// calendar date would leave its range. The clock is unchanged on error.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        let next = self.tick.checked_add(1).ok_or(ClockError::Overflow)?;
        let hour = next
            .checked_mul(self.hours_per_tick)
            .ok_or(ClockError::Overflow)?;
        date_time_at(self.epoch, hour)?;
        self.tick = next;
        Ok(hour)
    }

    /// Ticks completed.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Game hours elapsed since the session start.
    pub const fn hour(&self) -> u64 {
        // advance() checked this product before committing the tick.
        self.tick.saturating_mul(self.hours_per_tick)
    }

    /// Game hours added per tick.
    pub const fn hours_per_tick(&self) -> u64 {
        self.hours_per_tick
    }

    /// Calendar moment of hour 0.
    pub const fn epoch(&self) -> NaiveDateTime {
        self.epoch
    }

    /// The current in-game calendar date-time.
    pub fn now(&self) -> NaiveDateTime {
        date_time_at(self.epoch, self.hour()).unwrap_or(NaiveDateTime::MAX)
    }

    /// The in-game year, used for the `{year}` binding.
    pub fn year(&self) -> i32 {
        chrono::Datelike::year(&self.now())
    }

    /// Return to tick 0.
    pub const fn reset(&mut self) {
        self.tick = 0;
    }
}

fn date_time_at(epoch: NaiveDateTime, hour: u64) -> Result<NaiveDateTime, ClockError> {
    let hours = i64::try_from(hour).map_err(|_err| ClockError::Overflow)?;
    let delta = TimeDelta::try_hours(hours).ok_or(ClockError::Overflow)?;
    epoch.checked_add_signed(delta).ok_or(ClockError::Overflow)
}
