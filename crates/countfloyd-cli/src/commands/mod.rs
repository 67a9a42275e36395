//! The `control` and `action` command groups.
//!
//! Every handler reports its own failures: the error is logged, written to
//! stderr, and converted to an [`ExitOutcome`] at this boundary.


use clap::Args;
use countfloyd_wire::Payload;
use tracing::error;

use crate::IoStreams;
use crate::errors::CommandError;
use crate::files::FeatureFiles;
use crate::registry::{CommandGroup, ExitOutcome};
use crate::session::SessionContext;
use crate::transport;

mod action;
mod control;
mod start;

const COMMAND_TARGET: &str = "cfc::command";

/// Priority of the group holding the server lifecycle and query commands.
pub(crate) const CONTROL_PRIORITY: i32 = 1;
/// Priority of the group holding the commands that change server state.
pub(crate) const ACTION_PRIORITY: i32 = 2;

pub(crate) fn control_group() -> CommandGroup {
    CommandGroup::new("control", CONTROL_PRIORITY)
        .with(start::command())
        .with(control::stop())
        .with(control::status())
        .with(control::query())
        .with(control::version())
}

pub(crate) fn action_group() -> CommandGroup {
    CommandGroup::new("action", ACTION_PRIORITY)
        .with(action::populate())
        .with(action::apply())
}

/// Options for commands that take none.
#[derive(Debug, Args)]
pub(crate) struct NoOptions {}

/// Feature file flags shared by `start` and `populate`.
#[derive(Debug, Args)]
pub(crate) struct FeatureFileArgs {
    /// A directory to read features from.
    #[arg(long = "featuresDir", value_name = "DIR")]
    features_dir: Option<std::path::PathBuf>,
    /// A comma delimited list of feature files.
    #[arg(long = "featuresFiles", value_name = "FILES")]
    features_files: Option<String>,
}

impl From<FeatureFileArgs> for FeatureFiles {
    fn from(args: FeatureFileArgs) -> Self {
        Self::new(args.features_dir, args.features_files)
    }
}

/// Converts a handler result into an outcome, reporting any error.
fn finish(command: &str, result: Result<(), CommandError>, io: &mut IoStreams<'_>) -> ExitOutcome {
    match result {
        Ok(()) => ExitOutcome::Success,
        Err(failure) => {
            error!(
                target: COMMAND_TARGET,
                command,
                kind = failure.kind(),
                error = %failure,
                "command failed"
            );
            let _ = writeln!(io.stderr, "{failure}");
            failure.outcome()
        }
    }
}

/// Sends `payload` over a fresh channel and prints the reply.
fn send(
    session: &SessionContext,
    payload: &Payload,
    io: &mut IoStreams<'_>,
) -> Result<(), CommandError> {
    let request = payload.encode()?;
    let response = transport::exchange(
        session.local(),
        session.socket(),
        &request,
        session.timeout(),
    )?;
    write_response(&response, io)
}

fn write_response(response: &[u8], io: &mut IoStreams<'_>) -> Result<(), CommandError> {
    io.stdout.write_all(response).map_err(CommandError::Output)?;
    if !response.ends_with(b"\n") {
        io.stdout.write_all(b"\n").map_err(CommandError::Output)?;
    }
    Ok(())
}
