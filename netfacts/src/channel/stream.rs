//! Shell channel over any async byte stream.

use std::time::Duration;

use bytes::BytesMut;
use log::{debug, trace};
use regex::bytes::Regex;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::{Instant, timeout_at};

use super::ShellChannel;
use super::buffer::PatternBuffer;
use crate::error::ChannelError;

/// Configuration for stream channel behavior.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Bytes from the end of the output searched for the prompt.
    pub search_depth: usize,

    /// Size of a single read from the stream.
    pub read_chunk: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            search_depth: 1000,
            read_chunk: 8192,
        }
    }
}

/// [`ShellChannel`] implementation over an `AsyncRead + AsyncWrite` stream.
///
/// Used with an SSH PTY channel stream in production and with scripted
/// in-memory streams in tests.
pub struct StreamChannel<T> {
    stream: T,
    config: ChannelConfig,
    buffer: PatternBuffer,
    read_buf: BytesMut,
    open: bool,
}

impl<T> StreamChannel<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap a stream with default configuration.
    pub fn new(stream: T) -> Self {
        Self::with_config(stream, ChannelConfig::default())
    }

    /// Wrap a stream with the given configuration.
    pub fn with_config(stream: T, config: ChannelConfig) -> Self {
        Self {
            stream,
            buffer: PatternBuffer::new(config.search_depth),
            read_buf: BytesMut::with_capacity(config.read_chunk),
            config,
            open: true,
        }
    }

    /// Output received so far that has not been returned yet.
    pub fn pending(&self) -> &[u8] {
        self.buffer.as_slice()
    }
}

impl<T> ShellChannel for StreamChannel<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn write(&mut self, data: &[u8]) -> Result<(), ChannelError> {
        if !self.open {
            return Err(ChannelError::Closed);
        }
        trace!("channel write: {:?}", String::from_utf8_lossy(data));
        self.stream.write_all(data).await?;
        self.stream.flush().await?;
        Ok(())
    }

    async fn read_until(&mut self, pattern: &Regex, timeout: Duration) -> Result<Vec<u8>, ChannelError> {
        let deadline = Instant::now() + timeout;

        loop {
            if self.buffer.tail_matches(pattern) {
                return Ok(self.buffer.take());
            }

            if !self.open {
                return Err(ChannelError::Closed);
            }

            self.read_buf.reserve(self.config.read_chunk);
            let read = timeout_at(deadline, self.stream.read_buf(&mut self.read_buf))
                .await
                .map_err(|_| ChannelError::PatternTimeout(timeout))?;

            let n = match read {
                Ok(n) => n,
                Err(e) => {
                    self.open = false;
                    return Err(ChannelError::Io(e));
                }
            };

            if n == 0 {
                debug!("channel: remote closed with {} bytes pending", self.buffer.len());
                self.open = false;
                return Err(ChannelError::Closed);
            }

            let chunk = self.read_buf.split();
            trace!("channel read: {} bytes", chunk.len());
            self.buffer.extend(&chunk);
        }
    }

    fn discard_pending(&mut self) {
        self.buffer.clear();
        self.read_buf.clear();
    }

    async fn close(&mut self) -> Result<(), ChannelError> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        self.stream.shutdown().await?;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }
}
