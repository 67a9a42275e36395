//! Resolves the command named on the command line and runs it.

use std::ffi::OsString;

use clap::Parser;
use clap::error::ErrorKind;
use tracing::debug;

use crate::IoStreams;
use crate::cli::{TopLevelArgs, normalise_arguments, split_top_level_arguments};
use crate::errors::DispatchError;
use crate::registry::{ExitOutcome, Registry, TOP_LEVEL_GROUP, TOP_LEVEL_PRIORITY};
use crate::session::SessionContext;
use crate::telemetry;

const DISPATCH_TARGET: &str = "cfc::dispatch";

/// Drives one invocation: top-level flags first, then a single command.
pub struct Dispatcher<'r> {
    registry: &'r Registry,
}

impl<'r> Dispatcher<'r> {
    /// Creates a dispatcher over `registry`.
    #[must_use]
    pub const fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// Runs the command named in `args` and returns its outcome.
    ///
    /// `args` includes the program name. Errors are reported on `io.stderr`
    /// before the outcome is returned.
    pub fn dispatch<I>(&self, args: I, io: &mut IoStreams<'_>) -> ExitOutcome
    where
        I: IntoIterator<Item = OsString>,
    {
        let args = normalise_arguments(args);
        let split = split_top_level_arguments(&args);

        let session = match self.apply_top_level(split.top_level, io) {
            (ExitOutcome::Continue, Some(session)) => session,
            (outcome, _) => return outcome,
        };

        let Some((name, rest)) = split.command.split_first() else {
            return self.usage_error(&DispatchError::MissingCommand, io);
        };
        let name = name.to_string_lossy();
        let Some(found) = self.registry.find(&name) else {
            return self.usage_error(&DispatchError::UnknownCommand(name.into_owned()), io);
        };

        debug!(
            target: DISPATCH_TARGET,
            group = found.group,
            command = found.command.name(),
            priority = found.command.priority(),
            "dispatching command"
        );

        match found.command.options().try_get_matches_from(rest) {
            Ok(matches) => found.command.run(&session, &matches, io),
            Err(error) => report_clap_error(error, io),
        }
    }

    /// Parses the top-level flags and installs telemetry.
    ///
    /// Yields [`ExitOutcome::Continue`] together with the session when the
    /// invocation should proceed to a command.
    fn apply_top_level(
        &self,
        args: Vec<OsString>,
        io: &mut IoStreams<'_>,
    ) -> (ExitOutcome, Option<SessionContext>) {
        let parsed = match TopLevelArgs::try_parse_from(args) {
            Ok(parsed) => parsed,
            Err(error) => {
                let help = is_help(&error);
                let outcome = report_clap_error(error, io);
                if help {
                    let _ = self.registry.write_usage(io.stdout);
                }
                return (outcome, None);
            }
        };
        let session = SessionContext::from(parsed);

        if let Err(error) = telemetry::initialise(session.log_format()) {
            let _ = writeln!(io.stderr, "{}: {error}", crate::BINARY_NAME);
        }
        debug!(
            target: DISPATCH_TARGET,
            group = TOP_LEVEL_GROUP,
            priority = TOP_LEVEL_PRIORITY,
            local = %session.local(),
            socket = %session.socket(),
            timeout_ms = session.timeout().as_millis(),
            "session configured"
        );
        (ExitOutcome::Continue, Some(session))
    }

    fn usage_error(&self, error: &DispatchError, io: &mut IoStreams<'_>) -> ExitOutcome {
        let _ = writeln!(io.stderr, "{}: {error}", crate::BINARY_NAME);
        let _ = writeln!(io.stderr);
        let _ = self.registry.write_usage(io.stderr);
        ExitOutcome::UsageError
    }
}

fn is_help(error: &clap::Error) -> bool {
    matches!(
        error.kind(),
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
    )
}

/// Help requests go to stdout and succeed; every other parse failure is a
/// usage error on stderr.
fn report_clap_error(error: clap::Error, io: &mut IoStreams<'_>) -> ExitOutcome {
    if is_help(&error) {
        let _ = write!(io.stdout, "{}", error.render());
        return ExitOutcome::Success;
    }
    let error = DispatchError::from(error);
    let _ = write!(io.stderr, "{error}");
    ExitOutcome::UsageError
}
