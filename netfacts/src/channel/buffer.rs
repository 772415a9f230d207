//! Output accumulation with tail-only prompt search.
//!
//! Devices can return very large outputs (full running configs, routing
//! tables). The prompt always sits at the end of the output, so only the last
//! `search_depth` bytes are searched after every read.

use std::borrow::Cow;

use memchr::{memchr, memrchr};
use regex::bytes::Regex;

/// Accumulates channel output and searches its tail for prompt patterns.
#[derive(Debug)]
pub struct PatternBuffer {
    buffer: Vec<u8>,

    /// How many bytes from the end are searched for patterns.
    search_depth: usize,
}

impl PatternBuffer {
    /// Create a buffer that searches the last `search_depth` bytes.
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
            search_depth,
        }
    }

    /// Append data, dropping ANSI escape sequences and control characters.
    ///
    /// Only `\n` survives as a line break (`\r` is removed). Tabs become
    /// spaces so whitespace-separated fields stay apart.
    pub fn extend(&mut self, data: &[u8]) {
        let data = match memchr(b'\t', data) {
            Some(_) => Cow::Owned(
                data.iter()
                    .map(|&b| if b == b'\t' { b' ' } else { b })
                    .collect::<Vec<u8>>(),
            ),
            None => Cow::Borrowed(data),
        };
        let cleaned = strip_ansi_escapes::strip(&data);
        self.buffer.extend_from_slice(&cleaned);
    }

    /// Whether `pattern` matches somewhere in the tail.
    pub fn tail_matches(&self, pattern: &Regex) -> bool {
        pattern.is_match(self.tail())
    }

    /// The last line of the buffer (text after the final newline), with
    /// surrounding whitespace removed.
    pub fn last_line(&self) -> String {
        let start = memrchr(b'\n', &self.buffer).map_or(0, |pos| pos + 1);
        String::from_utf8_lossy(&self.buffer[start..])
            .trim()
            .to_string()
    }

    /// Take the contents and reset.
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buffer)
    }

    /// Buffer contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    fn tail(&self) -> &[u8] {
        let start = self.buffer.len().saturating_sub(self.search_depth);
        &self.buffer[start..]
    }
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new(1000)
    }
}
