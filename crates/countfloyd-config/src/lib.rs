//! Shared defaults for the countfloyd control client.
//!
//! The client and the `cfs` daemon agree on a pair of filesystem socket paths
//! and a handful of naming conventions. This crate keeps those values in one
//! place alongside the parser for log formatter names.

mod defaults;
mod logging;

pub use defaults::{
    DEFAULT_LOCAL_PATH, DEFAULT_LOG_FILTER, DEFAULT_SERVER_BINARY, DEFAULT_SOCKET_PATH,
    DEFAULT_TIMEOUT_MS, LOG_FILTER_ENV, SERVER_BINARY_ENV, default_local_path,
    default_socket_path, default_timeout,
};
pub use logging::LogFormat;
