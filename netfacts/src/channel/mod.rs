//! Shell channel layer.
//!
//! A shell channel is a bidirectional byte stream to an interactive,
//! prompt-driven device shell. The session layer only needs three things
//! from it: write bytes, read until a pattern shows up at the end of the
//! received data, and close.

mod buffer;
mod patterns;
mod stream;

pub use buffer::PatternBuffer;
pub use patterns::{compile_prompt_pattern, exact_prompt_pattern};
pub use stream::{ChannelConfig, StreamChannel};

use std::future::Future;
use std::time::Duration;

use regex::bytes::Regex;

use crate::error::ChannelError;

/// Capability for talking to an interactive remote shell.
///
/// Implementations are used by exactly one session and are never shared
/// across tasks.
pub trait ShellChannel: Send {
    /// Write raw bytes to the remote shell.
    fn write(&mut self, data: &[u8]) -> impl Future<Output = Result<(), ChannelError>> + Send;

    /// Read until `pattern` matches the tail of the received data.
    ///
    /// Returns everything received up to and including the match. Fails with
    /// [`ChannelError::PatternTimeout`] if the pattern does not appear within
    /// `timeout`, and with [`ChannelError::Closed`] if the remote side closes.
    fn read_until(
        &mut self,
        pattern: &Regex,
        timeout: Duration,
    ) -> impl Future<Output = Result<Vec<u8>, ChannelError>> + Send;

    /// Drop any output received but not yet returned.
    fn discard_pending(&mut self);

    /// Close the channel. Closing an already closed channel is a no-op.
    fn close(&mut self) -> impl Future<Output = Result<(), ChannelError>> + Send;

    /// Whether the channel is still open.
    fn is_open(&self) -> bool;
}
