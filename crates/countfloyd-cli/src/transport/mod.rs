//! Socket transport for a single request/response exchange with the daemon.
//!
//! The client binds its own filesystem address before connecting so the
//! daemon can tell clients apart. That address is released on every exit
//! path, including timeouts and failed connects.

use std::io;
use std::time::Duration;

use camino::Utf8Path;
use thiserror::Error;

#[cfg(unix)]
mod unix;


const TRANSPORT_TARGET: &str = "cfc::transport";

/// Once the first bytes arrive, the reply is complete when the daemon closes
/// the connection or stays quiet for this long.
const DRAIN_WINDOW: Duration = Duration::from_millis(25);

const READ_CHUNK: usize = 4096;

/// Errors raised while exchanging a message with the daemon.
#[derive(Debug, Error)]
pub(crate) enum TransportError {
    #[error("failed to create local endpoint {path}: {source}")]
    Endpoint {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to bind local endpoint {path}: {source}")]
    Bind {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to connect to countfloyd server at {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to send request: {0}")]
    Send(#[source] io::Error),
    #[error("request truncated: wrote {written} of {expected} bytes")]
    PartialWrite { written: usize, expected: usize },
    #[error("time out after {} ms", .timeout.as_millis())]
    Timeout { timeout: Duration },
    #[error("failed to read response: {0}")]
    ReadResponse(#[source] io::Error),
    #[error("response reader stopped without a result")]
    ReaderLost,
    #[cfg(not(unix))]
    #[error("platform does not support Unix sockets")]
    Unsupported,
}

impl TransportError {
    /// Whether the exchange failed because no reply arrived in time.
    pub(crate) const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether the exchange failed while establishing or writing to the
    /// connection.
    pub(crate) const fn is_connection(&self) -> bool {
        matches!(
            self,
            Self::Endpoint { .. }
                | Self::Bind { .. }
                | Self::Connect { .. }
                | Self::Send(_)
                | Self::PartialWrite { .. }
        )
    }
}

/// Sends `payload` from `local` to `remote` and waits up to `timeout` for the
/// reply to start.
///
/// The reply is whatever the daemon sends before closing the connection or
/// going quiet; no framing is assumed. If no bytes arrive before the deadline
/// the exchange fails with [`TransportError::Timeout`]. Once the reply has
/// started it may keep streaming for up to another `timeout`, after which the
/// bytes read so far are returned.
#[cfg(unix)]
pub(crate) fn exchange(
    local: &Utf8Path,
    remote: &Utf8Path,
    payload: &[u8],
    timeout: Duration,
) -> Result<Vec<u8>, TransportError> {
    use std::net::Shutdown;
    use std::sync::mpsc::{self, RecvTimeoutError};
    use std::thread;

    use tracing::debug;

    use unix::Drained;

    let endpoint = unix::LocalEndpoint::connect(local, remote)?;
    endpoint.send(payload, timeout)?;
    debug!(
        target: TRANSPORT_TARGET,
        local = %local,
        remote = %remote,
        bytes = payload.len(),
        "request sent"
    );

    let reader = endpoint
        .stream()
        .try_clone()
        .map_err(TransportError::ReadResponse)?;
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        // The receiver is gone once the deadline has fired; the late result
        // is dropped with the channel.
        let started = sender.clone();
        let result = unix::drain_response(reader, move || {
            let _ = started.send(Drained::FirstBytes);
        });
        let _ = sender.send(Drained::Finished(result));
    });

    let result = match receiver.recv_timeout(timeout) {
        Ok(Drained::Finished(result)) => result,
        Ok(Drained::FirstBytes) => unix::finish_drain(endpoint.stream(), &receiver, timeout)?,
        Err(RecvTimeoutError::Timeout) => {
            // Unblocks the reader thread so it exits promptly.
            let _ = endpoint.stream().shutdown(Shutdown::Both);
            debug!(
                target: TRANSPORT_TARGET,
                timeout_ms = timeout.as_millis(),
                "response timed out"
            );
            return Err(TransportError::Timeout { timeout });
        }
        Err(RecvTimeoutError::Disconnected) => return Err(TransportError::ReaderLost),
    };

    let response = result.map_err(TransportError::ReadResponse)?;
    debug!(
        target: TRANSPORT_TARGET,
        bytes = response.len(),
        "response received"
    );
    Ok(response)
}

#[cfg(not(unix))]
pub(crate) fn exchange(
    _local: &Utf8Path,
    _remote: &Utf8Path,
    _payload: &[u8],
    _timeout: Duration,
) -> Result<Vec<u8>, TransportError> {
    Err(TransportError::Unsupported)
}
