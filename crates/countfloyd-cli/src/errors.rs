//! Error types and diagnostics helpers for the CLI runtime.

use std::ffi::OsString;
use std::io;

use countfloyd_wire::WireError;
use thiserror::Error;

use crate::files::FeatureFilesError;
use crate::registry::ExitOutcome;
use crate::transport::TransportError;

/// Failures raised inside a command handler.
#[derive(Debug, Error)]
pub(crate) enum CommandError {
    #[error("populate requires -featuresDir or -featuresFiles")]
    MissingFeatureFiles,
    #[error(transparent)]
    FeatureFiles(#[from] FeatureFilesError),
    #[error(transparent)]
    Serialise(#[from] WireError),
    #[error("error getting a response from the countfloyd server: {0}")]
    Transport(#[from] TransportError),
    #[error("failed to spawn countfloyd server binary '{binary:?}': {source}")]
    Launch {
        binary: OsString,
        #[source]
        source: io::Error,
    },
    #[error("failed to write command output: {0}")]
    Output(#[source] io::Error),
}

impl CommandError {
    /// Outcome reported for this error at the handler boundary.
    pub(crate) const fn outcome(&self) -> ExitOutcome {
        match self {
            Self::MissingFeatureFiles => ExitOutcome::UsageError,
            _ => ExitOutcome::Failure,
        }
    }

    /// Short error classification recorded with the failure event.
    pub(crate) const fn kind(&self) -> &'static str {
        match self {
            Self::MissingFeatureFiles => "usage",
            Self::FeatureFiles(_) => "feature_files",
            Self::Serialise(_) => "serialization",
            Self::Transport(error) if error.is_timeout() => "timeout",
            Self::Transport(error) if error.is_connection() => "connection",
            Self::Transport(_) => "response",
            Self::Launch { .. } => "launch",
            Self::Output(_) => "output",
        }
    }
}

/// Failures raised while resolving which command to run.
#[derive(Debug, Error)]
pub(crate) enum DispatchError {
    #[error("no command given")]
    MissingCommand,
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error(transparent)]
    Usage(#[from] clap::Error),
}
