use std::time::Duration;

use camino::Utf8PathBuf;

/// Path the client binds its own socket to before connecting.
pub const DEFAULT_LOCAL_PATH: &str = "/tmp/cfc";

/// Path of the daemon's listening socket.
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/countfloyd_0_0-socket";

/// Milliseconds the client waits for a daemon reply.
pub const DEFAULT_TIMEOUT_MS: u64 = 2_000;

/// Executable launched by `cfc start`.
pub const DEFAULT_SERVER_BINARY: &str = "cfs";

/// Environment variable overriding [`DEFAULT_SERVER_BINARY`].
pub const SERVER_BINARY_ENV: &str = "CFC_SERVER_BIN";

/// Log filter used when [`LOG_FILTER_ENV`] is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Environment variable holding a `tracing` filter expression.
pub const LOG_FILTER_ENV: &str = "CFC_LOG";

/// Default local socket path as an owned path.
#[must_use]
pub fn default_local_path() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_LOCAL_PATH)
}

/// Default daemon socket path as an owned path.
#[must_use]
pub fn default_socket_path() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_SOCKET_PATH)
}

/// Default reply timeout.
#[must_use]
pub const fn default_timeout() -> Duration {
    Duration::from_millis(DEFAULT_TIMEOUT_MS)
}
