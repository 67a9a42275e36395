//! Command-line control client for the countfloyd daemon.
//!
//! The runtime resolves a command from the process arguments, builds the
//! session shared by every command in the invocation, and hands the
//! command's payload to a one-shot Unix socket exchange with the daemon. The
//! interface is designed to be exercised both from the binary entrypoint and
//! from tests where the IO streams can be substituted.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

mod cli;
mod commands;
mod dispatch;
mod errors;
mod files;
mod registry;
mod session;
mod telemetry;
mod transport;

pub use dispatch::Dispatcher;
pub use registry::{ExitOutcome, Registry};
pub use session::SessionContext;

/// Name the client reports for itself in usage and version output.
pub const BINARY_NAME: &str = "cfc";

/// Bundles the IO streams provided to the CLI runtime.
///
/// Commands write daemon replies to `stdout` and diagnostics to `stderr`.
pub struct IoStreams<'a> {
    pub(crate) stdout: &'a mut dyn Write,
    pub(crate) stderr: &'a mut dyn Write,
}

impl<'a> IoStreams<'a> {
    /// Wraps the given writers.
    pub fn new(stdout: &'a mut dyn Write, stderr: &'a mut dyn Write) -> Self {
        Self { stdout, stderr }
    }
}

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let registry = Registry::standard();
    let mut io = IoStreams::new(stdout, stderr);
    let outcome = Dispatcher::new(&registry).dispatch(args, &mut io);
    let _ = io.stdout.flush();
    let _ = io.stderr.flush();
    ExitCode::from(outcome)
}

#[cfg(test)]
mod tests;
