//! Command execution on an established session.

use std::time::Instant;

use log::{debug, warn};

use super::result::CommandResult;
use super::{Session, SessionState};
use crate::channel::ShellChannel;
use crate::error::{ChannelError, CommandError};

impl<C: ShellChannel> Session<C> {
    /// Send one command and wait for the prompt to come back.
    ///
    /// Never returns early with an error: failures are carried in
    /// [`CommandResult::error`]. After a channel failure the session is
    /// marked broken and every later call fails with
    /// [`CommandError::SessionUnusable`] until a new session is created.
    /// After a timeout the next call first drains the late output; if the
    /// prompt does not come back the session is marked broken.
    pub async fn run(&mut self, command: &str) -> CommandResult {
        let start = Instant::now();

        if self.state != SessionState::Active {
            return CommandResult::failed(
                command,
                start.elapsed(),
                CommandError::SessionUnusable {
                    command: command.to_string(),
                },
            );
        }

        if self.resync_pending {
            if let Err(e) = self.resync().await {
                return self.channel_failure(command, start, e);
            }
        }

        debug!("{}: sending {:?}", self.host, command);

        let line = format!("{}{}", command, self.family.line_terminator);
        if let Err(e) = self.channel.write(line.as_bytes()).await {
            return self.channel_failure(command, start, e);
        }

        let data = match self.channel.read_until(&self.prompt_pattern, self.timeout).await {
            Ok(data) => data,
            Err(ChannelError::PatternTimeout(timeout)) => {
                // Late output cannot be attributed to this command.
                self.channel.discard_pending();
                self.resync_pending = true;
                warn!("{}: '{}' timed out after {:?}", self.host, command, timeout);
                return CommandResult::failed(
                    command,
                    start.elapsed(),
                    CommandError::Timeout {
                        command: command.to_string(),
                        timeout,
                    },
                );
            }
            Err(e) => return self.channel_failure(command, start, e),
        };

        let elapsed = start.elapsed();
        let raw_output = String::from_utf8_lossy(&data).into_owned();
        let output = normalize_output(&raw_output);
        let prompt = raw_output.lines().last().unwrap_or_default().trim().to_string();

        debug!("{}: '{}' completed in {:?} ({} bytes)", self.host, command, elapsed, data.len());

        let result = CommandResult::completed(command, output, raw_output, prompt, elapsed);
        match self.family.detect_failure(&result.output) {
            Some(marker) => {
                warn!("{}: '{}' rejected: {}", self.host, command, marker);
                let error = CommandError::Rejected {
                    command: command.to_string(),
                    marker: marker.to_string(),
                };
                result.with_error(error)
            }
            None => result,
        }
    }

    /// Run commands in order, stopping after the first one that leaves the
    /// session unusable.
    pub async fn run_many(&mut self, commands: &[&str]) -> Vec<CommandResult> {
        let mut results = Vec::with_capacity(commands.len());
        for command in commands {
            let result = self.run(command).await;
            let fatal = result.error.as_ref().is_some_and(CommandError::is_fatal);
            results.push(result);
            if fatal {
                break;
            }
        }
        results
    }

    /// Drain the output of a timed-out command before sending the next one.
    ///
    /// The device still owes the timed-out command's prompt, plus one more
    /// for the line terminator sent here. Both must show up within the
    /// command timeout.
    async fn resync(&mut self) -> Result<(), ChannelError> {
        debug!("{}: resynchronizing after timeout", self.host);
        self.channel.write(self.family.line_terminator.as_bytes()).await?;

        let deadline = Instant::now() + self.timeout;
        let mut prompts = 0;
        while prompts < 2 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let data = self.channel.read_until(&self.prompt_pattern, remaining).await?;
            prompts += data
                .split(|&b| b == b'\n')
                .filter(|line| self.prompt_pattern.is_match(line))
                .count();
        }

        self.channel.discard_pending();
        self.resync_pending = false;
        Ok(())
    }

    fn channel_failure(&mut self, command: &str, start: Instant, error: ChannelError) -> CommandResult {
        warn!("{}: channel failed during '{}': {}", self.host, command, error);
        self.state = SessionState::Broken;
        CommandResult::failed(
            command,
            start.elapsed(),
            CommandError::Channel {
                command: command.to_string(),
                message: error.to_string(),
            },
        )
    }
}

/// Strip the echoed command (first line) and the trailing prompt (last line)
/// from raw command output.
pub fn normalize_output(raw: &str) -> String {
    let text = raw.replace("\r\n", "\n").replace('\r', "");

    let Some((_echo, rest)) = text.split_once('\n') else {
        return String::new();
    };

    match rest.rfind('\n') {
        Some(pos) => rest[..pos].trim_end_matches('\n').to_string(),
        None => String::new(),
    }
}
