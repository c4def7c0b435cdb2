//! Output accumulation with bounded tail search.
//!
//! Prompt patterns only ever appear at the end of the stream, so searches
//! are restricted to the last `search_depth` bytes. Large outputs (full
//! running-configs and the like) stay cheap to poll.

use regex::bytes::Regex;

use super::ansi::strip_ansi;

/// Accumulates channel output and searches its tail for prompt patterns.
#[derive(Debug)]
pub struct PatternBuffer {
    buffer: Vec<u8>,

    /// How many bytes from the end are searched for patterns.
    search_depth: usize,
}

impl PatternBuffer {
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
            search_depth,
        }
    }

    /// Append a chunk of raw channel data, stripping ANSI escapes.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(&strip_ansi(data));
    }

    /// Search the last `search_depth` bytes for `pattern`.
    pub fn search_tail(&self, pattern: &Regex) -> Option<regex::bytes::Match<'_>> {
        let start = self.buffer.len().saturating_sub(self.search_depth);
        pattern.find(&self.buffer[start..])
    }

    /// Whether the buffer tail contains a match for `pattern`.
    pub fn tail_contains(&self, pattern: &Regex) -> bool {
        self.search_tail(pattern).is_some()
    }

    /// Take ownership of the accumulated bytes, leaving the buffer empty.
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buffer)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Buffer contents as text (lossy UTF-8).
    pub fn as_str_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.buffer)
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
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extend_strips_ansi() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"\x1b[1mSwitch\x1b[0m>");
        assert_eq!(buffer.as_slice(), b"Switch>");
    }

    #[test]
    fn test_tail_search_finds_prompt() {
        let mut buffer = PatternBuffer::new(20);
        buffer.extend(&[b'x'; 200]);
        buffer.extend(b"\r\nSwitch#");

        let pattern = Regex::new(r"Switch#").unwrap();
        assert!(buffer.tail_contains(&pattern));
    }

    #[test]
    fn test_tail_search_ignores_old_data() {
        let mut buffer = PatternBuffer::new(10);
        buffer.extend(b"Switch#");
        buffer.extend(&[b'x'; 200]);

        let pattern = Regex::new(r"Switch#").unwrap();
        assert!(!buffer.tail_contains(&pattern));
    }

    #[test]
    fn test_take_resets() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"some output");
        assert_eq!(buffer.take(), b"some output");
        assert!(buffer.is_empty());
    }
}
