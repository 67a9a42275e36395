//! Diagnostic logging for the client.
//!
//! Daemon replies always go to stdout. The formatter named by
//! `-logFormatter` only controls the client's own `tracing` events, which are
//! written to stderr so they never mix with replies.

use std::io::{self, IsTerminal};

use countfloyd_config::{DEFAULT_LOG_FILTER, LOG_FILTER_ENV, LogFormat};
use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

/// Handle returned when telemetry has been initialised.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct TelemetryHandle;

/// Errors encountered while configuring telemetry.
#[derive(Debug, Error)]
pub(crate) enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Filter(String),
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Installs the global subscriber for `format` the first time it is called.
///
/// [`LogFormat::Null`] installs nothing, leaving `tracing` events disabled.
/// Later calls return a fresh handle without touching the global state.
pub(crate) fn initialise(format: LogFormat) -> Result<TelemetryHandle, TelemetryError> {
    if format == LogFormat::Null {
        return Ok(TelemetryHandle);
    }
    TELEMETRY_GUARD
        .get_or_try_init(|| install_subscriber(format))
        .map(|_| TelemetryHandle)
}

fn log_filter() -> Result<EnvFilter, TelemetryError> {
    match std::env::var(LOG_FILTER_ENV) {
        Ok(expression) => EnvFilter::try_new(expression),
        Err(_) => EnvFilter::try_new(DEFAULT_LOG_FILTER),
    }
    .map_err(|error| TelemetryError::Filter(error.to_string()))
}

fn install_subscriber(format: LogFormat) -> Result<(), TelemetryError> {
    let filter = log_filter()?;

    let builder = |filter: EnvFilter| {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .with_writer(io::stderr)
            .with_ansi(io::stderr().is_terminal())
            .with_timer(fmt::time::UtcTime::rfc_3339())
    };

    let subscriber: Box<dyn Subscriber + Send + Sync> = match format {
        LogFormat::Json => Box::new(builder(filter).json().flatten_event(true).finish()),
        LogFormat::Text | LogFormat::Null => Box::new(builder(filter).compact().finish()),
    };

    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
}
