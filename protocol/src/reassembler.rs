//! Client-side reassembly of a relay event stream into one growing message.

use log::{debug, warn};

use crate::errors::StreamError;
use crate::frame::{decode_line, StreamEvent};

/// Splits an arbitrarily chunked byte stream into `\n` terminated lines.
///
/// Bytes are held until a newline arrives, so a UTF-8 sequence cut by a read
/// boundary is only decoded once it is complete.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `chunk` and drains every line it completed, without the newline.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let scanned = self.pending.len();
        self.pending.extend_from_slice(chunk);
        // Only the appended bytes can hold a new newline.
        let Some(last_newline) = chunk
            .iter()
            .rposition(|b| *b == b'\n')
            .map(|offset| scanned + offset)
        else {
            return Vec::new();
        };
        let rest = self.pending.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.pending, rest);
        complete[..last_newline]
            .split(|b| *b == b'\n')
            .map(|line| String::from_utf8_lossy(line).into_owned())
            .collect()
    }

    /// Returns whatever is left once the stream has ended.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        Some(String::from_utf8_lossy(&rest).into_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReassemblyState {
    Streaming,
    /// `[DONE]` seen, or the stream ended cleanly.
    Finished,
    Failed(String),
    Cancelled,
}

/// Accumulates fragments from one exchange.
///
/// Once the state leaves [`ReassemblyState::Streaming`] the content is frozen
/// and further input is ignored.
#[derive(Debug)]
pub struct Reassembler {
    lines: LineBuffer,
    content: String,
    fragments: usize,
    skipped: usize,
    state: ReassemblyState,
}

impl Default for Reassembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Reassembler {
    pub fn new() -> Self {
        Self {
            lines: LineBuffer::new(),
            content: String::new(),
            fragments: 0,
            skipped: 0,
            state: ReassemblyState::Streaming,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn state(&self) -> &ReassemblyState {
        &self.state
    }

    pub fn is_streaming(&self) -> bool {
        self.state == ReassemblyState::Streaming
    }

    /// Number of fragment events applied so far, empty ones included.
    pub fn fragment_count(&self) -> usize {
        self.fragments
    }

    /// Number of `data: ` lines dropped because their payload was malformed.
    pub fn skipped_lines(&self) -> usize {
        self.skipped
    }

    /// Feeds one network read; returns how many fragments it applied.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<usize, StreamError> {
        self.feed_with(chunk, |_| {})
    }

    /// Feeds one network read, calling `publish` with the full accumulated
    /// content after every fragment.
    pub fn feed_with(
        &mut self,
        chunk: &[u8],
        mut publish: impl FnMut(&str),
    ) -> Result<usize, StreamError> {
        if !self.is_streaming() {
            return Ok(0);
        }
        let mut applied = 0;
        for line in self.lines.push(chunk) {
            if self.apply_line(&line, &mut publish)? {
                applied += 1;
            }
            if !self.is_streaming() {
                break;
            }
        }
        Ok(applied)
    }

    /// Marks the end of the byte stream. A stream that ends without `[DONE]`
    /// is still a clean end.
    pub fn finish(&mut self) -> Result<&str, StreamError> {
        self.finish_with(|_| {})
    }

    pub fn finish_with(&mut self, mut publish: impl FnMut(&str)) -> Result<&str, StreamError> {
        if self.is_streaming() {
            if let Some(line) = self.lines.finish() {
                self.apply_line(&line, &mut publish)?;
            }
        }
        if self.is_streaming() {
            debug!("event stream ended without sentinel after {} fragments", self.fragments);
            self.state = ReassemblyState::Finished;
        }
        match &self.state {
            ReassemblyState::Failed(message) => Err(StreamError::Provider(message.clone())),
            ReassemblyState::Cancelled => Err(StreamError::Cancelled),
            ReassemblyState::Streaming | ReassemblyState::Finished => Ok(&self.content),
        }
    }

    /// Stops accepting input. Content stays at the last applied fragment.
    pub fn cancel(&mut self) {
        if self.is_streaming() {
            self.state = ReassemblyState::Cancelled;
        }
    }

    fn apply_line(
        &mut self,
        line: &str,
        publish: &mut impl FnMut(&str),
    ) -> Result<bool, StreamError> {
        match decode_line(line) {
            None => Ok(false),
            Some(Ok(StreamEvent::Done)) => {
                self.state = ReassemblyState::Finished;
                Ok(false)
            }
            Some(Ok(StreamEvent::Error(message))) => {
                self.state = ReassemblyState::Failed(message.clone());
                Err(StreamError::Provider(message))
            }
            Some(Ok(StreamEvent::Fragment(text))) if text.is_empty() => Ok(false),
            Some(Ok(StreamEvent::Fragment(text))) => {
                self.content.push_str(&text);
                self.fragments += 1;
                publish(&self.content);
                Ok(true)
            }
            Some(Err(e)) => {
                warn!("skipping event stream line: {e}");
                self.skipped += 1;
                Ok(false)
            }
        }
    }
}
