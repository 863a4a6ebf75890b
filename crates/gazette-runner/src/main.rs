//! Headless runner for a Gazette session.
//!
//! Loads `gazette-config.yaml` and a content pack, registers the configured
//! demo listings, then ticks the event engine on a real-time timer, logging
//! every headline as it is published.
//!
//! # Usage
//!
//! ```text
//! gazette-runner [CONFIG_PATH]
//! ```
//!
//! The configuration path comes from the first argument, then the
//! `GAZETTE_CONFIG` environment variable. Without either, the runner reads
//! `gazette-config.yaml` from the working directory and falls back to the
//! defaults when that file is absent. `RUST_LOG` overrides the configured
//! log level.

mod error;
mod runner;

use std::path::{Path, PathBuf};

use gazette_content::ContentPack;
use gazette_core::config::{GazetteConfig, LoggingConfig};
use gazette_core::engine::EventEngine;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::RunnerError;
use crate::runner::{LogCallback, log_run_end, register_listings, run_session};

/// Configuration file read when no path is given.
const DEFAULT_CONFIG_PATH: &str = "gazette-config.yaml";

/// Environment variable naming the configuration file.
const CONFIG_ENV: &str = "GAZETTE_CONFIG";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the configuration or content can not be loaded, the
/// engine rejects them, or a tick fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    init_logging(&config.logging);

    info!(
        seed = config.session.seed,
        locale = %config.locale.default,
        hours_per_tick = config.session.hours_per_tick,
        tick_interval_ms = config.runner.tick_interval_ms,
        "gazette-runner starting"
    );

    let content = match config.content.path.as_deref() {
        Some(path) => {
            info!(path = %path.display(), "Loading content pack");
            ContentPack::from_file(path)?
        }
        None => ContentPack::builtin()?,
    };

    let runner_config = config.runner.clone();
    let listings = config.market.listings.clone();
    let mut engine = EventEngine::init(config, content)?;
    let registered = register_listings(&mut engine, &listings)?;
    info!(registered, "Demo listings registered");

    let result = run_session(&mut engine, &runner_config, &mut LogCallback).await?;
    log_run_end(&result, &engine);
    Ok(())
}

/// Install the global `tracing` subscriber.
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_err| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Resolve and load the configuration file.
fn load_config() -> Result<GazetteConfig, RunnerError> {
    let requested = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_ENV).ok())
        .map(PathBuf::from);

    match requested {
        Some(path) if !path.exists() => Err(RunnerError::MissingConfig {
            path: path.display().to_string(),
        }),
        Some(path) => Ok(GazetteConfig::from_file(&path)?),
        None => {
            let path = Path::new(DEFAULT_CONFIG_PATH);
            if path.exists() {
                Ok(GazetteConfig::from_file(path)?)
            } else {
                Ok(GazetteConfig::default())
            }
        }
    }
}
