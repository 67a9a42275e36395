//! Commands that query or stop a running server over raw control verbs.


use clap::Args;
use countfloyd_wire::{ControlVerb, Payload};

use super::{NoOptions, finish, send};
use crate::IoStreams;
use crate::errors::CommandError;
use crate::registry::{CommandSpec, ExitOutcome};
use crate::session::SessionContext;

const VERSION_TAG: &str = match option_env!("CFC_VERSION_TAG") {
    Some(tag) => tag,
    None => "No Tag",
};
const VERSION_HASH: &str = match option_env!("CFC_VERSION_HASH") {
    Some(hash) => hash,
    None => "No Hash",
};
const VERSION_DATE: &str = match option_env!("CFC_VERSION_DATE") {
    Some(date) => date,
    None => "No Date",
};

pub(super) const fn stop() -> CommandSpec<NoOptions> {
    CommandSpec::new("stop", "stop a countfloyd server", 2, run_stop)
}

pub(super) const fn status() -> CommandSpec<NoOptions> {
    CommandSpec::new("status", "the status of a countfloyd server", 3, run_status)
}

pub(super) const fn query() -> CommandSpec<QueryArgs> {
    CommandSpec::new(
        "query",
        "query a countfloyd server for feature information",
        4,
        run_query,
    )
}

pub(super) const fn version() -> CommandSpec<NoOptions> {
    CommandSpec::new("version", "print the client version", 5, run_version)
}

#[derive(Debug, Args)]
pub(super) struct QueryArgs {
    /// Return information for this specified feature.
    #[arg(long, default_value = "")]
    feature: String,
}

fn run_stop(session: &SessionContext, _: NoOptions, io: &mut IoStreams<'_>) -> ExitOutcome {
    let result = send(session, &Payload::control(ControlVerb::Quit, None), io);
    finish("stop", result, io)
}

fn run_status(session: &SessionContext, _: NoOptions, io: &mut IoStreams<'_>) -> ExitOutcome {
    let result = send(session, &Payload::control(ControlVerb::Status, None), io);
    finish("status", result, io)
}

fn run_query(session: &SessionContext, args: QueryArgs, io: &mut IoStreams<'_>) -> ExitOutcome {
    // The separator is sent even when no feature is named.
    let payload = Payload::control(ControlVerb::Query, Some(args.feature.as_str()));
    let result = send(session, &payload, io);
    finish("query", result, io)
}

fn run_version(_: &SessionContext, _: NoOptions, io: &mut IoStreams<'_>) -> ExitOutcome {
    let result = writeln!(
        io.stdout,
        "{} {} ({}, {}, {})",
        crate::BINARY_NAME,
        env!("CARGO_PKG_VERSION"),
        VERSION_TAG,
        VERSION_HASH,
        VERSION_DATE
    )
    .map_err(CommandError::Output);
    finish("version", result, io)
}
