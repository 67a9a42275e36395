//! Test support utilities for dispatcher and command coverage.
//!
//! Supplies a fake countfloyd server on a Unix socket and a harness that runs
//! the CLI with captured output so tests stay focused on their assertions.

#[cfg(unix)]
mod fake_daemon;

use std::ffi::OsString;
use std::process::ExitCode;

use camino::{Utf8Path, Utf8PathBuf};
use rstest::fixture;
use tempfile::TempDir;

#[cfg(unix)]
pub(crate) use fake_daemon::{FakeDaemon, Reply};

/// Output captured from one CLI run.
pub(super) struct RunOutput {
    pub exit: ExitCode,
    pub stdout: String,
    pub stderr: String,
}

/// Runs the CLI with `args` (program name excluded) and captures its output.
pub(super) fn run_cli<I, S>(args: I) -> RunOutput
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let argv = std::iter::once(OsString::from("cfc")).chain(args.into_iter().map(Into::into));
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let exit = crate::run(argv, &mut stdout, &mut stderr);
    RunOutput {
        exit,
        stdout: String::from_utf8(stdout).expect("stdout utf8"),
        stderr: String::from_utf8(stderr).expect("stderr utf8"),
    }
}

/// Socket paths inside a private temporary directory.
pub(crate) struct SocketPaths {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl SocketPaths {
    pub fn local(&self) -> Utf8PathBuf {
        self.root.join("cfc.sock")
    }

    pub fn server(&self) -> Utf8PathBuf {
        self.root.join("cfs.sock")
    }

    pub fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    /// Top-level flags pointing the client at these paths.
    pub fn session_args(&self, timeout_ms: u64) -> Vec<String> {
        session_args(&self.local(), &self.server(), timeout_ms)
    }
}

pub(super) fn session_args(local: &Utf8Path, socket: &Utf8Path, timeout_ms: u64) -> Vec<String> {
    vec![
        String::from("-local"),
        local.to_string(),
        String::from("-socket"),
        socket.to_string(),
        String::from("-timeout"),
        timeout_ms.to_string(),
    ]
}

#[fixture]
pub(crate) fn socket_paths() -> SocketPaths {
    let dir = TempDir::new().expect("create socket dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp dir");
    SocketPaths { _dir: dir, root }
}
