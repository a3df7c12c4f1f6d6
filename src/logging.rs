//! Tracing subscriber setup.
//!
//! The library only emits `tracing` events; binaries call [`init_tracing`]
//! once to print them. The filter comes from `SCHWARZSCHILD_LOG`, then
//! `RUST_LOG`, then the configured default level.

use std::io::IsTerminal;
use std::sync::OnceLock;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Crate-specific filter variable, checked before `RUST_LOG`.
pub const LOG_ENV_VAR: &str = "SCHWARZSCHILD_LOG";

/// Level used when neither variable is set and nothing is configured.
pub const DEFAULT_LEVEL: &str = "warn";

static INITIALISED: OnceLock<()> = OnceLock::new();

/// Errors emitted when configuring the tracing subscriber.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    /// [`init_tracing`] was already called in this process.
    #[error("tracing has already been initialised")]
    AlreadyInitialised,
    /// The configured level is not a valid filter directive.
    #[error("invalid log filter '{directive}': {source}")]
    Filter {
        /// Rejected directive.
        directive: String,
        /// Parser error.
        source: tracing_subscriber::filter::ParseError,
    },
    /// Another global subscriber is already installed.
    #[error("failed to install subscriber: {0}")]
    Install(String),
}

/// Build the filter from the environment, falling back to `default_level`.
///
/// # Errors
///
/// Returns [`InitError::Filter`] if `default_level` is needed and invalid.
pub fn resolve_filter(default_level: &str) -> Result<EnvFilter, InitError> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV_VAR) {
        return Ok(filter);
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(default_level).map_err(|source| InitError::Filter {
        directive: default_level.to_string(),
        source,
    })
}

/// Configures the global tracing subscriber. Output goes to stderr.
///
/// # Errors
///
/// Returns [`InitError::AlreadyInitialised`] on a second call, or an error if
/// the filter is invalid or another subscriber owns the global slot.
pub fn init_tracing(default_level: &str) -> Result<(), InitError> {
    INITIALISED
        .set(())
        .map_err(|()| InitError::AlreadyInitialised)?;

    let filter = resolve_filter(default_level)?;
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);

    Registry::default()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| InitError::Install(e.to_string()))
}
