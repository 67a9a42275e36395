//! Top-level argument handling for the countfloyd client.
//!
//! Flags are accepted in the daemon's single-dash spelling (`-socket`) as
//! well as the usual `--socket`. Leading flags belong to the top-level group;
//! the first bare word names the command and everything after it is parsed
//! against that command's own options.

use std::ffi::OsString;
use std::time::Duration;

use camino::Utf8PathBuf;
use clap::Parser;
use countfloyd_config::{DEFAULT_LOCAL_PATH, DEFAULT_SOCKET_PATH, DEFAULT_TIMEOUT_MS};

use crate::session::SessionContext;

/// Top-level flags that consume a following value.
///
/// MAINTENANCE: keep in sync with the value-taking fields of
/// [`TopLevelArgs`].
const TOP_LEVEL_VALUE_FLAGS: &[&str] = &["--logFormatter", "--local", "--socket", "--timeout"];

/// Flags shared by every command in the invocation.
#[derive(Parser, Debug)]
#[command(
    name = "cfc",
    about = "Control client for the countfloyd server",
    disable_help_subcommand = true
)]
pub(crate) struct TopLevelArgs {
    /// Sets the environment logger formatter.
    #[arg(long = "logFormatter", env = "CFC_LOG_FORMATTER", default_value = "")]
    log_formatter: String,
    /// Specify a local path for communication to the server.
    #[arg(long = "local", env = "CFC_LOCAL", default_value = DEFAULT_LOCAL_PATH)]
    local: Utf8PathBuf,
    /// Specify the socket path of the server.
    #[arg(long = "socket", env = "CFC_SOCKET", default_value = DEFAULT_SOCKET_PATH)]
    socket: Utf8PathBuf,
    /// Milliseconds to wait for a server response.
    #[arg(
        long = "timeout",
        env = "CFC_TIMEOUT_MS",
        value_name = "MILLISECONDS",
        default_value_t = DEFAULT_TIMEOUT_MS
    )]
    timeout_ms: u64,
}

impl From<TopLevelArgs> for SessionContext {
    fn from(args: TopLevelArgs) -> Self {
        Self::new(
            args.log_formatter,
            args.local,
            args.socket,
            Duration::from_millis(args.timeout_ms),
        )
    }
}

/// Rewrites single-dash long flags (`-socket`) into `--socket`.
///
/// Short flags such as `-h`, negative numbers, and everything after a bare
/// `--` are left untouched.
pub(crate) fn normalise_arguments<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut passthrough = false;
    args.into_iter()
        .enumerate()
        .map(|(index, argument)| {
            if index == 0 || passthrough {
                return argument;
            }
            if argument == "--" {
                passthrough = true;
                return argument;
            }
            match argument.to_str() {
                Some(text) if is_single_dash_long_flag(text) => OsString::from(format!("-{text}")),
                _ => argument,
            }
        })
        .collect()
}

fn is_single_dash_long_flag(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next() == Some('-')
        && chars.next().is_some_and(char::is_alphabetic)
        && chars.next().is_some()
}

/// Arguments split into the top-level part and the command part.
#[derive(Debug)]
pub(crate) struct ArgumentSplit {
    /// Program name followed by the top-level flags.
    pub(crate) top_level: Vec<OsString>,
    /// Command name followed by its arguments.
    pub(crate) command: Vec<OsString>,
}

/// Splits normalised arguments at the first bare word.
pub(crate) fn split_top_level_arguments(args: &[OsString]) -> ArgumentSplit {
    let Some((program, rest)) = args.split_first() else {
        return ArgumentSplit {
            top_level: Vec::new(),
            command: Vec::new(),
        };
    };

    let mut top_level = vec![program.clone()];
    let mut index = 0usize;
    while let Some(argument) = rest.get(index) {
        let text = argument.to_string_lossy();
        if !text.starts_with('-') {
            break;
        }
        top_level.push(argument.clone());
        index += 1;
        if TOP_LEVEL_VALUE_FLAGS.contains(&&*text)
            && let Some(value) = rest.get(index)
        {
            top_level.push(value.clone());
            index += 1;
        }
    }

    ArgumentSplit {
        top_level,
        command: rest.get(index..).unwrap_or_default().to_vec(),
    }
}
