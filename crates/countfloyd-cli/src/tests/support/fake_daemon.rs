//! A fake countfloyd server for exercising real socket exchanges.
//!
//! The server accepts one connection, records the request bytes and the
//! client's bound address, then replies according to [`Reply`].

use std::io::{self, Read, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};

const ACCEPT_DEADLINE: Duration = Duration::from_secs(2);

/// How the fake server answers the request it receives.
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    /// Writes the bytes and closes the connection.
    Bytes(Vec<u8>),
    /// Waits for `delay`, writes the bytes, then keeps the connection open
    /// until the client hangs up.
    Hold { delay: Duration, bytes: Vec<u8> },
    /// Never answers; waits for the client to hang up.
    Silent,
    /// Closes the connection without answering.
    Close,
}

impl Reply {
    pub fn text(text: &str) -> Self {
        Self::Bytes(text.as_bytes().to_vec())
    }
}

/// A request observed by the fake server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Recorded {
    pub payload: String,
    pub client: Option<Utf8PathBuf>,
}

pub(crate) struct FakeDaemon {
    requests: Arc<Mutex<Vec<Recorded>>>,
    result: Arc<Mutex<Option<Result<()>>>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl FakeDaemon {
    /// Listens on `path` and serves a single connection in the background.
    pub fn spawn(path: &Utf8Path, reply: Reply) -> Result<Self> {
        let listener = UnixListener::bind(path).context("bind fake server")?;
        listener
            .set_nonblocking(true)
            .context("fake server nonblocking")?;
        let requests = Arc::new(Mutex::new(Vec::new()));
        let result = Arc::new(Mutex::new(None));
        let requests_clone = Arc::clone(&requests);
        let result_clone = Arc::clone(&result);
        let handle = thread::spawn(move || {
            let outcome = Self::serve_client(&listener, &reply, &requests_clone);
            if let Ok(mut guard) = result_clone.lock() {
                *guard = Some(outcome);
            }
        });
        Ok(Self {
            requests,
            result,
            handle: Some(handle),
        })
    }

    /// Waits for the server thread and returns every recorded request.
    pub fn take_requests(&mut self) -> Result<Vec<Recorded>> {
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| anyhow!("fake server thread panicked"))?;
        }
        if let Some(outcome) = self
            .result
            .lock()
            .map_err(|error| anyhow!("lock fake server result: {error}"))?
            .take()
        {
            outcome.context("fake server failed")?;
        }
        let requests = self
            .requests
            .lock()
            .map_err(|error| anyhow!("lock requests: {error}"))?;
        Ok(requests.clone())
    }

    fn serve_client(
        listener: &UnixListener,
        reply: &Reply,
        requests: &Arc<Mutex<Vec<Recorded>>>,
    ) -> Result<()> {
        let deadline = Instant::now() + ACCEPT_DEADLINE;
        loop {
            match listener.accept() {
                Ok((stream, address)) => {
                    stream
                        .set_nonblocking(false)
                        .context("fake server blocking stream")?;
                    let client = address
                        .as_pathname()
                        .and_then(|path| Utf8Path::from_path(path))
                        .map(Utf8Path::to_path_buf);
                    Self::record_request(&stream, client, requests)?;
                    return Self::respond(stream, reply);
                }
                Err(ref error)
                    if error.kind() == io::ErrorKind::WouldBlock && Instant::now() < deadline =>
                {
                    thread::sleep(Duration::from_millis(5));
                }
                // Nobody connected; the CLI failed before reaching the server.
                Err(ref error) if error.kind() == io::ErrorKind::WouldBlock => return Ok(()),
                Err(error) => return Err(error).context("accept connection"),
            }
        }
    }

    fn record_request(
        mut stream: &UnixStream,
        client: Option<Utf8PathBuf>,
        requests: &Arc<Mutex<Vec<Recorded>>>,
    ) -> Result<()> {
        let mut buffer = [0_u8; 4096];
        let read = stream.read(&mut buffer).context("read request")?;
        let payload = String::from_utf8_lossy(&buffer[..read]).into_owned();
        requests
            .lock()
            .map_err(|error| anyhow!("lock requests: {error}"))?
            .push(Recorded { payload, client });
        Ok(())
    }

    fn respond(mut stream: UnixStream, reply: &Reply) -> Result<()> {
        match reply {
            Reply::Bytes(bytes) => {
                stream.write_all(bytes).context("write reply")?;
                stream.flush().context("flush reply")
            }
            Reply::Hold { delay, bytes } => {
                thread::sleep(*delay);
                stream.write_all(bytes).context("write held reply")?;
                wait_for_hangup(&mut stream);
                Ok(())
            }
            Reply::Silent => {
                wait_for_hangup(&mut stream);
                Ok(())
            }
            Reply::Close => Ok(()),
        }
    }
}

impl Drop for FakeDaemon {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Returns once the client shuts the connection down.
fn wait_for_hangup(stream: &mut UnixStream) {
    let mut sink = Vec::new();
    let _ = stream.read_to_end(&mut sink);
}
