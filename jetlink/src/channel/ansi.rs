//! ANSI/VT escape stripping.
//!
//! JetStream firmware decorates some output with color and cursor codes.
//! Prompt regexes must see plain text, so every chunk is run through a vte
//! parser that keeps printable characters and ordinary control characters
//! and discards escape sequences.

use vte::{Parser, Perform};

/// Remove ANSI escape sequences from `data`, keeping printable text plus
/// `\r`, `\n`, `\t`, and backspace.
pub fn strip_ansi(data: &[u8]) -> Vec<u8> {
    let mut parser = Parser::new();
    let mut sink = PlainText {
        out: Vec::with_capacity(data.len()),
    };
    parser.advance(&mut sink, data);
    sink.out
}

struct PlainText {
    out: Vec<u8>,
}

impl Perform for PlainText {
    fn print(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
    }

    fn execute(&mut self, byte: u8) {
        if matches!(byte, b'\r' | b'\n' | b'\t' | 0x08) {
            self.out.push(byte);
        }
    }
}
