//! Newline-delimited frame extraction.
//!
//! The stdio transport delivers arbitrary chunks: a chunk may hold part of a
//! message, several messages, or both. [`FrameReader`] carries unterminated
//! bytes over between calls so that frame boundaries never depend on how the
//! stream was chunked.
//!
//! The buffer is unbounded. A single local client is assumed; a peer that never
//! sends a newline grows the buffer without limit.

/// Accumulates stream bytes and yields complete frames.
#[derive(Debug, Default)]
pub struct FrameReader {
    /// Carry-over bytes not yet terminated by a newline.
    buffer: Vec<u8>,
    /// Prefix of `buffer` already known to contain no newline.
    scanned: usize,
}

impl FrameReader {
    /// Creates an empty frame reader.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            scanned: 0,
        }
    }

    /// Appends `chunk` and returns every frame it completes, in order.
    ///
    /// Frames are trimmed of surrounding whitespace; blank lines produce no
    /// frame. Bytes after the last newline are retained for the next call.
    /// Invalid UTF-8 is replaced rather than rejected, so the codec reports
    /// such frames as parse errors.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        let mut start = 0;
        let mut search_from = self.scanned;

        while let Some(offset) = self.buffer[search_from..].iter().position(|&b| b == b'\n') {
            let end = search_from + offset;
            let line = String::from_utf8_lossy(&self.buffer[start..end]);
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                frames.push(trimmed.to_owned());
            }
            start = end + 1;
            search_from = start;
        }

        self.buffer.drain(..start);
        self.scanned = self.buffer.len();

        frames
    }

    /// Returns the number of buffered bytes awaiting a newline.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Discards any unterminated remainder, returning how many bytes were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.buffer.len();
        self.buffer.clear();
        self.scanned = 0;
        dropped
    }
}
