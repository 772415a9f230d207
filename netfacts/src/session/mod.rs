//! Session lifecycle: connect, prompt detection, disconnect.
//!
//! A [`Session`] owns one shell channel to one device. Commands are sent
//! through [`Session::run`], which takes `&mut self`: a session never has
//! more than one command in flight.

mod builder;
mod executor;
mod result;

pub use builder::{SessionBuilder, SessionConfig};
pub use executor::normalize_output;
pub use result::CommandResult;

use std::time::Duration;

use log::{debug, info, warn};
use regex::bytes::Regex;

use crate::channel::{PatternBuffer, ShellChannel, exact_prompt_pattern};
use crate::error::{ChannelError, ConnectError, Result};
use crate::family::DeviceFamily;
use crate::transport::SshShell;

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Ready for commands.
    Active,

    /// The channel failed; the session must be disconnected.
    Broken,

    /// Disconnected.
    Closed,
}

/// An authenticated, prompt-synchronized shell session on one device.
pub struct Session<C: ShellChannel = SshShell> {
    channel: C,
    family: DeviceFamily,
    host: String,
    prompt: String,
    prompt_pattern: Regex,
    timeout: Duration,
    state: SessionState,
    /// A command timed out; its output may still arrive.
    resync_pending: bool,
}

impl<C: ShellChannel> Session<C> {
    /// Take over an authenticated channel: wait for the first prompt, derive
    /// the exact prompt pattern from it, and run the family's session
    /// preparation commands.
    pub async fn establish(
        host: impl Into<String>,
        mut channel: C,
        family: DeviceFamily,
        timeout: Duration,
    ) -> std::result::Result<Self, ConnectError> {
        let host = host.into();

        let banner = match channel.read_until(&family.prompt_pattern, timeout).await {
            Ok(data) => data,
            Err(e) => {
                let _ = channel.close().await;
                return Err(connect_error(&host, e));
            }
        };

        let mut buffer = PatternBuffer::default();
        buffer.extend(&banner);
        let prompt = buffer.last_line();
        let prompt_pattern = exact_prompt_pattern(&prompt, &family.prompt_terminators)
            .unwrap_or_else(|| {
                debug!("{}: using family prompt pattern for {:?}", host, prompt);
                family.prompt_pattern.clone()
            });

        debug!("{}: detected prompt {:?}", host, prompt);

        let mut session = Self {
            channel,
            family,
            host,
            prompt,
            prompt_pattern,
            timeout,
            state: SessionState::Active,
            resync_pending: false,
        };

        for command in session.family.on_open_commands.clone() {
            let result = session.run(&command).await;
            if let Some(error) = result.error {
                if error.is_fatal() {
                    let _ = session.disconnect().await;
                    return Err(ConnectError::channel(&session.host, error));
                }
                warn!("{}: session preparation '{}' failed: {}", session.host, command, error);
            }
        }

        Ok(session)
    }

    /// Close the channel. Safe to call more than once.
    pub async fn disconnect(&mut self) -> std::result::Result<(), ChannelError> {
        if self.state == SessionState::Closed {
            return Ok(());
        }
        self.state = SessionState::Closed;
        debug!("{}: disconnecting", self.host);
        self.channel.close().await
    }

    /// Host this session is connected to.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Family the session was created with.
    pub fn family(&self) -> &DeviceFamily {
        &self.family
    }

    /// Device type tag.
    pub fn device_type(&self) -> &str {
        &self.family.name
    }

    /// Prompt detected after login.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Pattern used to detect command completion.
    pub fn prompt_pattern(&self) -> &Regex {
        &self.prompt_pattern
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the login is still in place. A session only exists after
    /// successful authentication; this turns false once it is disconnected.
    pub fn is_authenticated(&self) -> bool {
        self.state != SessionState::Closed && self.channel.is_open()
    }

    /// Whether commands can still be sent.
    pub fn is_usable(&self) -> bool {
        self.state == SessionState::Active && self.channel.is_open()
    }

    /// Command timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }
}

impl<C: ShellChannel> Drop for Session<C> {
    fn drop(&mut self) {
        if self.state != SessionState::Closed {
            warn!("session to {} dropped without disconnect()", self.host);
        }
    }
}

/// Run `f` on a session and disconnect afterwards, whether `f` succeeded or
/// not.
pub async fn with_session<C, T, F>(mut session: Session<C>, f: F) -> Result<T>
where
    C: ShellChannel,
    F: AsyncFnOnce(&mut Session<C>) -> Result<T>,
{
    let result = f(&mut session).await;
    if let Err(e) = session.disconnect().await {
        warn!("{}: disconnect failed: {}", session.host, e);
    } else {
        info!("Disconnected from {}", session.host);
    }
    result
}

fn connect_error(host: &str, error: ChannelError) -> ConnectError {
    match error {
        ChannelError::PatternTimeout(timeout) => ConnectError::Timeout {
            target: host.to_string(),
            timeout,
        },
        other => ConnectError::channel(host, other),
    }
}
