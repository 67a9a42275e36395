//! Session state shared by every command in a single invocation.

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use countfloyd_config::{LogFormat, default_local_path, default_socket_path, default_timeout};

/// Values derived from the top-level flags.
///
/// Built once by the top-level group and passed by reference to the command
/// handler; nothing mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    log_formatter: String,
    local: Utf8PathBuf,
    socket: Utf8PathBuf,
    timeout: Duration,
}

impl SessionContext {
    /// Creates a session from explicit values.
    #[must_use]
    pub fn new(
        log_formatter: impl Into<String>,
        local: impl Into<Utf8PathBuf>,
        socket: impl Into<Utf8PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            log_formatter: log_formatter.into(),
            local: local.into(),
            socket: socket.into(),
            timeout,
        }
    }

    /// Formatter name as given on the command line.
    #[must_use]
    pub fn log_formatter(&self) -> &str {
        &self.log_formatter
    }

    /// Diagnostic format selected by the formatter name.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        LogFormat::from_formatter_name(&self.log_formatter)
    }

    /// Path the client binds before connecting.
    #[must_use]
    pub fn local(&self) -> &Utf8Path {
        &self.local
    }

    /// Path of the daemon socket.
    #[must_use]
    pub fn socket(&self) -> &Utf8Path {
        &self.socket
    }

    /// How long to wait for a reply.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Copy of the session with per-command socket paths applied.
    #[must_use]
    pub fn with_overrides(&self, local: Option<&Utf8Path>, socket: Option<&Utf8Path>) -> Self {
        Self {
            log_formatter: self.log_formatter.clone(),
            local: local.map_or_else(|| self.local.clone(), Utf8Path::to_path_buf),
            socket: socket.map_or_else(|| self.socket.clone(), Utf8Path::to_path_buf),
            timeout: self.timeout,
        }
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(
            String::new(),
            default_local_path(),
            default_socket_path(),
            default_timeout(),
        )
    }
}
