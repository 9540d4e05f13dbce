//! Serialized size measurement

use serde::Serialize;
use std::io;

/// Measures how large a value is once serialized
///
/// Implementations must be total: a value that cannot be serialized should
/// measure as `usize::MAX` so that any size limit rejects it.
pub trait SizeMeter {
    /// Serialized length of `value` in bytes
    fn serialized_len<T: Serialize + ?Sized>(&self, value: &T) -> usize;
}

/// Compact JSON size meter
///
/// Counts the bytes `serde_json` would write without building the text.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSizeMeter;

impl SizeMeter for JsonSizeMeter {
    fn serialized_len<T: Serialize + ?Sized>(&self, value: &T) -> usize {
        let mut counter = ByteCounter::default();
        match serde_json::to_writer(&mut counter, value) {
            Ok(()) => counter.written,
            Err(_) => usize::MAX,
        }
    }
}

/// Writer that discards bytes and keeps a count
#[derive(Debug, Default)]
struct ByteCounter {
    written: usize,
}

impl io::Write for ByteCounter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written = self.written.saturating_add(buf.len());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
