//! Unix socket plumbing behind [`exchange`](super::exchange).

use std::fs;
use std::io::{self, Read, Write};
use std::net::Shutdown;
use std::os::fd::OwnedFd;
use std::os::unix::net::UnixStream;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use socket2::{Domain, SockAddr, Socket, Type};
use tracing::warn;

use super::{DRAIN_WINDOW, READ_CHUNK, TRANSPORT_TARGET, TransportError};

/// Scoped owner of the client's bound socket path.
///
/// Fields drop in order: the stream closes before the path is removed.
pub(super) struct LocalEndpoint {
    stream: UnixStream,
    _path: BoundPath,
}

impl LocalEndpoint {
    /// Binds `local` and connects to `remote`.
    ///
    /// The path is claimed once the bind succeeds, so it is removed when
    /// the connect fails but a path bound by someone else is left alone.
    pub(super) fn connect(
        local: &Utf8Path,
        remote: &Utf8Path,
    ) -> Result<Self, TransportError> {
        let socket = Socket::new(Domain::UNIX, Type::STREAM, None).map_err(|source| {
            TransportError::Endpoint {
                path: local.to_string(),
                source,
            }
        })?;
        let local_address = SockAddr::unix(local).map_err(|source| TransportError::Bind {
            path: local.to_string(),
            source,
        })?;
        socket
            .bind(&local_address)
            .map_err(|source| TransportError::Bind {
                path: local.to_string(),
                source,
            })?;
        let path = BoundPath(local.to_path_buf());
        let connect_error = |source| TransportError::Connect {
            endpoint: remote.to_string(),
            source,
        };
        let remote_address = SockAddr::unix(remote).map_err(connect_error)?;
        socket.connect(&remote_address).map_err(connect_error)?;
        Ok(Self {
            stream: UnixStream::from(OwnedFd::from(socket)),
            _path: path,
        })
    }

    pub(super) const fn stream(&self) -> &UnixStream {
        &self.stream
    }

    /// Writes the payload in one send; a short write is not retried.
    ///
    /// A daemon that stops reading fails the send after `timeout`.
    pub(super) fn send(
        &self,
        payload: &[u8],
        timeout: Duration,
    ) -> Result<(), TransportError> {
        if !timeout.is_zero() {
            self.stream
                .set_write_timeout(Some(timeout))
                .map_err(TransportError::Send)?;
        }
        let mut writer = &self.stream;
        let written = writer.write(payload).map_err(TransportError::Send)?;
        if written != payload.len() {
            return Err(TransportError::PartialWrite {
                written,
                expected: payload.len(),
            });
        }
        writer.flush().map_err(TransportError::Send)
    }
}

struct BoundPath(Utf8PathBuf);

impl Drop for BoundPath {
    fn drop(&mut self) {
        match fs::remove_file(&self.0) {
            Err(error) if error.kind() != io::ErrorKind::NotFound => {
                warn!(
                    target: TRANSPORT_TARGET,
                    path = %self.0,
                    error = %error,
                    "failed to remove local socket path"
                );
            }
            _ => {}
        }
    }
}

/// Progress reported by the reader thread.
pub(super) enum Drained {
    /// The reply has started.
    FirstBytes,
    /// The reply ended or reading failed.
    Finished(io::Result<Vec<u8>>),
}

/// Blocks for the first chunk, then reads until EOF or until the daemon
/// stays quiet for [`DRAIN_WINDOW`]. `on_first_bytes` runs once data has
/// started arriving.
pub(super) fn drain_response(
    mut stream: UnixStream,
    on_first_bytes: impl FnOnce(),
) -> io::Result<Vec<u8>> {
    let mut response = Vec::new();
    let mut chunk = [0_u8; READ_CHUNK];
    let first = read_chunk(&mut stream, &mut chunk)?;
    if first == 0 {
        return Ok(response);
    }
    response.extend_from_slice(&chunk[..first]);
    on_first_bytes();

    stream.set_read_timeout(Some(DRAIN_WINDOW))?;
    loop {
        match read_chunk(&mut stream, &mut chunk) {
            Ok(0) => break,
            Ok(read) => response.extend_from_slice(&chunk[..read]),
            Err(error)
                if matches!(
                    error.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                ) =>
            {
                break;
            }
            Err(error) => return Err(error),
        }
    }
    Ok(response)
}

/// Waits for a reply that has already started.
///
/// A daemon still streaming after `limit` has its connection shut for
/// reading, which ends the drain with the bytes received so far.
pub(super) fn finish_drain(
    stream: &UnixStream,
    receiver: &Receiver<Drained>,
    limit: Duration,
) -> Result<io::Result<Vec<u8>>, TransportError> {
    let event = match receiver.recv_timeout(limit) {
        Err(RecvTimeoutError::Timeout) => {
            let _ = stream.shutdown(Shutdown::Read);
            receiver.recv().map_err(|_| TransportError::ReaderLost)?
        }
        Err(RecvTimeoutError::Disconnected) => return Err(TransportError::ReaderLost),
        Ok(event) => event,
    };
    match event {
        Drained::Finished(result) => Ok(result),
        Drained::FirstBytes => Err(TransportError::ReaderLost),
    }
}

fn read_chunk(stream: &mut UnixStream, chunk: &mut [u8]) -> io::Result<usize> {
    loop {
        match stream.read(chunk) {
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            result => return result,
        }
    }
}
