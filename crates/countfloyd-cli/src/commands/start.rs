//! Launches a countfloyd server in the background.
//!
//! The server is told which socket to listen on and which log formatter to
//! use, and optionally which feature files to load at startup. The client
//! does not wait for it or check that it came up.

use std::env;
use std::ffi::{OsStr, OsString};
use std::process::{Child, Command, Stdio};

use clap::Args;
use countfloyd_config::{DEFAULT_SERVER_BINARY, SERVER_BINARY_ENV};
use tracing::info;

use super::{COMMAND_TARGET, FeatureFileArgs, finish};
use crate::IoStreams;
use crate::errors::CommandError;
use crate::files::FeatureFiles;
use crate::registry::{CommandSpec, ExitOutcome};
use crate::session::SessionContext;

pub(super) const fn command() -> CommandSpec<StartArgs> {
    CommandSpec::new("start", "start a countfloyd server", 1, run_start)
}

#[derive(Debug, Args)]
pub(super) struct StartArgs {
    #[command(flatten)]
    files: FeatureFileArgs,
}

fn run_start(session: &SessionContext, args: StartArgs, io: &mut IoStreams<'_>) -> ExitOutcome {
    let files = FeatureFiles::from(args.files);
    let result = server_arguments(session, &files)
        .and_then(|arguments| spawn_server(&arguments, None))
        .map(|child| {
            info!(
                target: COMMAND_TARGET,
                pid = child.id(),
                socket = %session.socket(),
                "countfloyd server launched"
            );
        });
    finish("start", result, io)
}

/// Arguments passed to the server binary.
fn server_arguments(
    session: &SessionContext,
    files: &FeatureFiles,
) -> Result<Vec<OsString>, CommandError> {
    let mut arguments: Vec<OsString> = vec![
        "-socket".into(),
        session.socket().as_os_str().to_owned(),
        "-logFormatter".into(),
        session.log_formatter().into(),
    ];
    if !files.is_empty() {
        let joined = files.joined()?;
        if !joined.is_empty() {
            arguments.push("-populateFiles".into());
            arguments.push(joined.into());
        }
    }
    arguments.push("start".into());
    Ok(arguments)
}

fn spawn_server(
    arguments: &[OsString],
    binary_override: Option<&OsStr>,
) -> Result<Child, CommandError> {
    let binary = resolve_server_binary(binary_override);
    Command::new(&binary)
        .args(arguments)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|source| CommandError::Launch { binary, source })
}

fn resolve_server_binary(binary_override: Option<&OsStr>) -> OsString {
    binary_override
        .map(OsString::from)
        .or_else(|| env::var_os(SERVER_BINARY_ENV))
        .unwrap_or_else(|| OsString::from(DEFAULT_SERVER_BINARY))
}
