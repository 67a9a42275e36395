//! Named, grouped commands and the registry that holds them.
//!
//! Each command owns its option schema as a `clap` argument struct. Groups
//! carry a priority: lower values are consulted first, and the top-level
//! group, which builds the [`SessionContext`], runs before all of them.

use std::io::Write;
use std::process::ExitCode;

use clap::{ArgMatches, Args, FromArgMatches};

use crate::IoStreams;
use crate::session::SessionContext;

/// Name of the group that builds the session from the global flags.
pub(crate) const TOP_LEVEL_GROUP: &str = "top";
/// Priority of the top-level group; it precedes every numbered group.
pub(crate) const TOP_LEVEL_PRIORITY: i32 = -1;

/// Result of running one command handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// The command did what was asked.
    Success,
    /// The command ran but failed; the error has been reported.
    Failure,
    /// The command line was missing or invalid.
    UsageError,
    /// Nothing user-visible happened; dispatch carries on.
    Continue,
}

impl ExitOutcome {
    /// Process exit status for this outcome.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Success | Self::Continue => 0,
            Self::Failure => 1,
            Self::UsageError => 2,
        }
    }
}

impl From<ExitOutcome> for ExitCode {
    fn from(outcome: ExitOutcome) -> Self {
        Self::from(outcome.code())
    }
}

/// A named command with its own option schema and handler.
pub(crate) trait Command {
    fn name(&self) -> &'static str;
    fn about(&self) -> &'static str;
    fn priority(&self) -> i32;
    /// Option schema used to parse the arguments following the name.
    fn options(&self) -> clap::Command;
    fn run(
        &self,
        session: &SessionContext,
        matches: &ArgMatches,
        io: &mut IoStreams<'_>,
    ) -> ExitOutcome;
}

pub(crate) type Handler<O> = fn(&SessionContext, O, &mut IoStreams<'_>) -> ExitOutcome;

/// A [`Command`] whose options are described by the `clap` struct `O`.
pub(crate) struct CommandSpec<O> {
    name: &'static str,
    about: &'static str,
    priority: i32,
    handler: Handler<O>,
}

impl<O> CommandSpec<O> {
    pub(crate) const fn new(
        name: &'static str,
        about: &'static str,
        priority: i32,
        handler: Handler<O>,
    ) -> Self {
        Self {
            name,
            about,
            priority,
            handler,
        }
    }
}

impl<O> Command for CommandSpec<O>
where
    O: Args + FromArgMatches,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn about(&self) -> &'static str {
        self.about
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn options(&self) -> clap::Command {
        O::augment_args(
            clap::Command::new(self.name)
                .about(self.about)
                .no_binary_name(true)
                .disable_version_flag(true),
        )
    }

    fn run(
        &self,
        session: &SessionContext,
        matches: &ArgMatches,
        io: &mut IoStreams<'_>,
    ) -> ExitOutcome {
        match O::from_arg_matches(matches) {
            Ok(options) => (self.handler)(session, options, io),
            Err(error) => {
                let _ = write!(io.stderr, "{}", error.render());
                ExitOutcome::UsageError
            }
        }
    }
}

/// An ordered group of commands.
pub(crate) struct CommandGroup {
    name: &'static str,
    priority: i32,
    commands: Vec<Box<dyn Command>>,
}

impl CommandGroup {
    pub(crate) const fn new(name: &'static str, priority: i32) -> Self {
        Self {
            name,
            priority,
            commands: Vec::new(),
        }
    }

    /// Adds a command, keeping the group ordered by command priority.
    #[must_use]
    pub(crate) fn with(mut self, command: impl Command + 'static) -> Self {
        self.commands.push(Box::new(command));
        self.commands.sort_by_key(|entry| entry.priority());
        self
    }
}

/// A command found in the registry together with its group name.
pub(crate) struct Registered<'a> {
    pub(crate) group: &'static str,
    pub(crate) command: &'a dyn Command,
}

/// Every command group known to the client, ordered by priority.
#[derive(Default)]
pub struct Registry {
    groups: Vec<CommandGroup>,
}

impl Registry {
    /// The `control` and `action` groups shipped with `cfc`.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::default();
        registry.register(crate::commands::control_group());
        registry.register(crate::commands::action_group());
        registry
    }

    pub(crate) fn register(&mut self, group: CommandGroup) {
        self.groups.push(group);
        self.groups.sort_by_key(|entry| entry.priority);
    }

    /// Finds `name`, consulting groups in priority order.
    pub(crate) fn find(&self, name: &str) -> Option<Registered<'_>> {
        self.groups.iter().find_map(|group| {
            group
                .commands
                .iter()
                .find(|command| command.name() == name)
                .map(|command| Registered {
                    group: group.name,
                    command: command.as_ref(),
                })
        })
    }

    /// Writes the grouped command listing.
    pub(crate) fn write_usage(&self, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(out, "Usage: {} [top-level flags] <command> [flags]", crate::BINARY_NAME)?;
        for group in &self.groups {
            writeln!(out)?;
            writeln!(out, "{}:", group.name)?;
            for command in &group.commands {
                writeln!(out, "  {:<10} {}", command.name(), command.about())?;
            }
        }
        Ok(())
    }
}
