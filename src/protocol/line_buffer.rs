//! Incremental line splitter for chunked byte streams.
//!
//! Network reads do not respect event boundaries: a read can end in the
//! middle of a line, or even in the middle of a UTF-8 sequence. `LineBuffer`
//! holds three pieces of state:
//! - `pending`: trailing bytes of an incomplete UTF-8 sequence;
//! - `partial`: decoded text after the last newline;
//! - `lines`: complete lines not yet consumed.

use std::collections::VecDeque;

/// Byte-to-line state machine.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
    partial: String,
    lines: VecDeque<String>,
}

impl LineBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk of bytes.
    pub fn push(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);
        self.decode_pending();
        self.split_lines();
    }

    /// Next complete line, without its terminator (`\n` or `\r\n`).
    pub fn next_line(&mut self) -> Option<String> {
        self.lines.pop_front()
    }

    /// End of input: flush whatever is left as a last line.
    ///
    /// Incomplete UTF-8 at the very end is replaced with U+FFFD.
    pub fn finish(&mut self) -> Option<String> {
        if !self.pending.is_empty() {
            self.partial.push_str(&String::from_utf8_lossy(&self.pending));
            self.pending.clear();
        }
        self.split_lines();
        if !self.partial.is_empty() {
            let last = std::mem::take(&mut self.partial);
            self.lines.push_back(trim_terminator(last));
        }
        self.lines.pop_front()
    }

    fn decode_pending(&mut self) {
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    self.partial.push_str(text);
                    self.pending.clear();
                    return;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    self.partial
                        .push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match err.error_len() {
                        Some(invalid) => {
                            self.partial.push(char::REPLACEMENT_CHARACTER);
                            self.pending = self.pending.split_off(valid + invalid);
                        }
                        None => {
                            // Sequence cut by the read boundary; wait for more bytes.
                            self.pending = self.pending.split_off(valid);
                            return;
                        }
                    }
                }
            }
        }
    }

    fn split_lines(&mut self) {
        while let Some(pos) = self.partial.find('\n') {
            let rest = self.partial.split_off(pos + 1);
            let line = std::mem::replace(&mut self.partial, rest);
            self.lines.push_back(trim_terminator(line));
        }
    }
}

fn trim_terminator(mut line: String) -> String {
    if line.ends_with('\n') {
        line.pop();
    }
    if line.ends_with('\r') {
        line.pop();
    }
    line
}
