//! crates/logging-sink/src/memory.rs
//! In-process destination that keeps every written byte.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared growable byte buffer usable as a sink destination.
///
/// Clones share storage, so a test can keep one clone for inspection and
/// hand another to a [`SinkWriter`](crate::SinkWriter).
#[derive(Clone, Debug, Default)]
pub struct MemoryBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl MemoryBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.bytes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a copy of everything written so far.
    #[must_use]
    pub fn contents(&self) -> Vec<u8> {
        self.lock().clone()
    }

    /// Returns the contents decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.lock()).into_owned()
    }

    /// Returns the contents split into lines without terminators.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.to_string_lossy().lines().map(str::to_owned).collect()
    }

    /// Reports whether nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Discards the contents.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl Write for MemoryBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
