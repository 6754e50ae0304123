//! Newline-framed line codec.
//!
//! Wire format: one UTF-8 JSON document per line, `\n` terminated
//! (`\r\n` tolerated).  The decoder accumulates incoming bytes into a
//! bounded buffer and yields complete lines.  This handles partial
//! reads gracefully — a single socket read may return part of a line
//! or several lines concatenated.
//!
//! An over-long line cannot be valid; the decoder discards bytes until
//! the next terminator and resumes framing there.

use heapless::Vec;
use log::warn;

/// Maximum line length (protects against memory exhaustion).
pub const MAX_LINE: usize = 512;

/// Streaming line decoder.
pub struct LineDecoder {
    buf: Vec<u8, MAX_LINE>,
    /// Inside an over-long line, skipping to the next terminator.
    discarding: bool,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            discarding: false,
        }
    }

    /// Feed bytes into the decoder, invoking `on_line` once per
    /// complete line (terminator stripped, empty lines skipped).
    pub fn feed(&mut self, data: &[u8], mut on_line: impl FnMut(&str)) {
        for &byte in data {
            if byte == b'\n' {
                if self.discarding {
                    self.discarding = false;
                } else {
                    let mut line = self.buf.as_slice();
                    if line.last() == Some(&b'\r') {
                        line = &line[..line.len() - 1];
                    }
                    match core::str::from_utf8(line) {
                        Ok("") => {}
                        Ok(text) => on_line(text),
                        Err(_) => warn!("Dropping non-UTF-8 line"),
                    }
                }
                self.buf.clear();
                continue;
            }

            if !self.discarding && self.buf.push(byte).is_err() {
                warn!("Line exceeds {MAX_LINE} bytes, discarding to next terminator");
                self.buf.clear();
                self.discarding = true;
            }
        }
    }

    /// Reset decoder state (e.g. after a client reconnect).
    pub fn reset(&mut self) {
        self.buf.clear();
        self.discarding = false;
    }
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}
