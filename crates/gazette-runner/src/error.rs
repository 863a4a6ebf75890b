//! Error types for the headless runner.
//!
//! Every failure that can stop a run surfaces here, from loading the
//! configuration file to a tick that can not advance the clock.

use gazette_content::ContentError;
use gazette_core::config::ConfigError;
use gazette_core::engine::EngineError;

/// Errors that can occur while setting up or driving a session.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The configuration file could not be read or is invalid.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The content pack could not be loaded.
    #[error("content error: {0}")]
    Content(#[from] ContentError),

    /// The engine failed to initialize or to run a tick.
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// An explicitly requested configuration file does not exist.
    #[error("config file not found: {path}")]
    MissingConfig {
        /// The path that was requested.
        path: String,
    },
}
