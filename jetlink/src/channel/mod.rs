//! Buffered pattern matching over the raw byte stream.
//!
//! The device speaks an unframed character protocol; everything the driver
//! knows about session state it learns by matching patterns against
//! accumulated output. This module owns that accumulation: ANSI stripping
//! on ingest and bounded tail searches for prompt patterns.

mod ansi;
mod buffer;

pub use ansi::strip_ansi;
pub use buffer::PatternBuffer;
