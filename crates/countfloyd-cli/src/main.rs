//! CLI entrypoint for the countfloyd control client.
//!
//! The binary delegates to [`countfloyd_cli::run`], which resolves the
//! requested command, talks to the daemon socket, and maps the outcome to the
//! process exit code.

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    // Unlocked handles: the telemetry subscriber also writes to stderr.
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    countfloyd_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
