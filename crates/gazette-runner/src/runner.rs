//! Real-time tick loop around [`EventEngine::tick`].
//!
//! The engine is synchronous; this module only supplies the clock. Each
//! period of a `tokio` interval runs one tick and hands the summary to a
//! [`TickCallback`]. The run ends when `max_ticks` is reached or on Ctrl-C,
//! whichever comes first.

use std::time::Duration;

use gazette_core::config::{ListingConfig, RunnerConfig};
use gazette_core::engine::{EventEngine, TickSummary};
use gazette_types::{EffectTarget, PropertyId, PropertyListing};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::error::RunnerError;

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The configured `max_ticks` limit was reached.
    MaxTicksReached,
    /// Ctrl-C was received.
    Interrupted,
}

/// Outcome of [`run_session`].
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Why the run stopped.
    pub end_reason: EndReason,
    /// Summary of the last tick that ran, if any.
    pub final_summary: Option<TickSummary>,
    /// Ticks executed by this run.
    pub total_ticks: u64,
}

/// Receives every tick summary as it is produced.
pub trait TickCallback {
    /// Called after each tick with the summary and the engine state.
    fn on_tick(&mut self, summary: &TickSummary, engine: &EventEngine);
}

/// Callback that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _engine: &EventEngine) {}
}

/// Callback that logs every headline and the market multipliers.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogCallback;

impl TickCallback for LogCallback {
    fn on_tick(&mut self, summary: &TickSummary, engine: &EventEngine) {
        for headline in summary.headlines() {
            info!(tick = summary.tick, now = %summary.now, "{headline}");
        }
        for id in &summary.expired {
            info!(tick = summary.tick, effect = %id, "Effect expired");
        }
        if let Some(m) = engine.market().multipliers(EffectTarget::Market) {
            debug!(
                tick = summary.tick,
                soul = summary.soul,
                price = m.price,
                occupancy = m.occupancy,
                "Market multipliers"
            );
        }
    }
}

/// Register the configured demo listings; returns how many were added.
pub fn register_listings(
    engine: &mut EventEngine,
    listings: &[ListingConfig],
) -> Result<usize, RunnerError> {
    for listing in listings {
        engine.register_property(PropertyListing {
            id: PropertyId::new(),
            name: listing.name.clone(),
            location: listing.location.clone(),
            base_price: listing.base_price,
            base_occupancy: listing.base_occupancy,
        })?;
    }
    Ok(listings.len())
}

/// Drive `engine` until the tick limit or Ctrl-C.
///
/// The first tick runs immediately; later ticks run every
/// `tick_interval_ms` milliseconds. A `max_ticks` of zero means no limit.
pub async fn run_session(
    engine: &mut EventEngine,
    config: &RunnerConfig,
    callback: &mut dyn TickCallback,
) -> Result<RunResult, RunnerError> {
    let period = Duration::from_millis(config.tick_interval_ms.max(1));
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut total_ticks: u64 = 0;
    let mut last_summary: Option<TickSummary> = None;

    info!(
        tick_interval_ms = config.tick_interval_ms,
        max_ticks = config.max_ticks,
        "Session loop starting"
    );

    loop {
        if config.max_ticks > 0 && total_ticks >= config.max_ticks {
            info!(total_ticks, max_ticks = config.max_ticks, "Tick limit reached");
            return Ok(RunResult {
                end_reason: EndReason::MaxTicksReached,
                final_summary: last_summary,
                total_ticks,
            });
        }

        tokio::select! {
            result = &mut shutdown => {
                if let Err(err) = result {
                    warn!(error = %err, "Ctrl-C listener failed; stopping");
                }
                info!(total_ticks, "Interrupted");
                return Ok(RunResult {
                    end_reason: EndReason::Interrupted,
                    final_summary: last_summary,
                    total_ticks,
                });
            }
            _ = interval.tick() => {}
        }

        let summary = engine.tick()?;
        total_ticks = total_ticks.saturating_add(1);
        callback.on_tick(&summary, engine);
        last_summary = Some(summary);
    }
}

/// Log how a run ended.
pub fn log_run_end(result: &RunResult, engine: &EventEngine) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        "Session ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            now = %summary.now,
            soul = summary.soul,
            active_effects = engine.effects().active().len(),
            fired = engine.timeline().fired_count(),
            pending = engine.timeline().pending().count(),
            "Final state"
        );
    } else {
        warn!("Session ended with no ticks executed");
    }
}
