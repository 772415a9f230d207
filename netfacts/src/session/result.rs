//! Result of a single command execution.

use std::time::Duration;

use crate::error::CommandError;

/// Outcome of running one command on a session.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandResult {
    /// The command that was sent.
    pub command: String,

    /// Output with the command echo and trailing prompt removed.
    pub output: String,

    /// Everything read from the channel for this command.
    pub raw_output: String,

    /// The prompt that ended the output.
    pub prompt: String,

    pub elapsed: Duration,

    /// Why the command failed, if it did.
    pub error: Option<CommandError>,
}

impl CommandResult {
    pub(crate) fn completed(
        command: impl Into<String>,
        output: impl Into<String>,
        raw_output: impl Into<String>,
        prompt: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            command: command.into(),
            output: output.into(),
            raw_output: raw_output.into(),
            prompt: prompt.into(),
            elapsed,
            error: None,
        }
    }

    /// A failed result with no output.
    pub(crate) fn failed(command: impl Into<String>, elapsed: Duration, error: CommandError) -> Self {
        Self {
            command: command.into(),
            output: String::new(),
            raw_output: String::new(),
            prompt: String::new(),
            elapsed,
            error: Some(error),
        }
    }

    pub(crate) fn with_error(mut self, error: CommandError) -> Self {
        self.error = Some(error);
        self
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// The output, or the error that prevented it.
    pub fn into_output(self) -> Result<String, CommandError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.output),
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.output.lines()
    }

    pub fn contains(&self, pattern: &str) -> bool {
        self.output.contains(pattern)
    }
}

impl std::fmt::Display for CommandResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.output)
    }
}
