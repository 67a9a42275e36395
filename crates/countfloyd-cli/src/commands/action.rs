//! Commands that send structured payloads changing the server's state.

use camino::Utf8PathBuf;
use clap::Args;
use countfloyd_wire::{Payload, StructuredPayload};

use super::{FeatureFileArgs, finish, send};
use crate::IoStreams;
use crate::errors::CommandError;
use crate::files::FeatureFiles;
use crate::registry::{CommandSpec, ExitOutcome};
use crate::session::SessionContext;

pub(super) const fn populate() -> CommandSpec<PopulateArgs> {
    CommandSpec::new(
        "populate",
        "populate a countfloyd server with features and/or constructors",
        1,
        run_populate,
    )
}

pub(super) const fn apply() -> CommandSpec<ApplyArgs> {
    CommandSpec::new("apply", "apply a set of features", 2, run_apply)
}

#[derive(Debug, Args)]
pub(super) struct PopulateArgs {
    #[command(flatten)]
    files: FeatureFileArgs,
}

#[derive(Debug, Args)]
pub(super) struct ApplyArgs {
    /// A number value for meta.number.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    number: i64,
    /// A comma delimited list of features to apply.
    #[arg(long, default_value = "")]
    features: String,
    /// Specify a local path for communication to the server.
    #[arg(long)]
    local: Option<Utf8PathBuf>,
    /// Specify the socket path of the server.
    #[arg(long)]
    socket: Option<Utf8PathBuf>,
}

fn run_populate(
    session: &SessionContext,
    args: PopulateArgs,
    io: &mut IoStreams<'_>,
) -> ExitOutcome {
    let files = FeatureFiles::from(args.files);
    let result = populate_payload(&files).and_then(|payload| send(session, &payload, io));
    finish("populate", result, io)
}

fn populate_payload(files: &FeatureFiles) -> Result<Payload, CommandError> {
    if files.is_empty() {
        return Err(CommandError::MissingFeatureFiles);
    }
    let joined = files.joined()?;
    Ok(StructuredPayload::populate_from_files(&joined).into())
}

fn run_apply(session: &SessionContext, args: ApplyArgs, io: &mut IoStreams<'_>) -> ExitOutcome {
    let session = session.with_overrides(args.local.as_deref(), args.socket.as_deref());
    let payload = Payload::from(StructuredPayload::apply(args.number, &args.features));
    let result = send(&session, &payload, io);
    finish("apply", result, io)
}
