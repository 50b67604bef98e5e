//! crates/logging-sink/src/writer.rs
//! Cloneable handle to a single output destination.

use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use crate::memory::MemoryBuffer;

type Destination = Arc<Mutex<Box<dyn Write + Send>>>;

/// Shared handle to a destination that accepts rendered log records.
///
/// Cloning the handle shares the destination. Equality is identity of the
/// destination, which is what registry snapshots compare.
#[derive(Clone)]
pub struct SinkWriter {
    destination: Destination,
    label: Arc<str>,
}

impl SinkWriter {
    /// Wraps an arbitrary writer.
    #[must_use]
    pub fn new<W>(writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Self::with_label("custom", writer)
    }

    /// Wraps a writer and records a label shown in `Debug` output.
    #[must_use]
    pub fn with_label<W>(label: &str, writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Self {
            destination: Arc::new(Mutex::new(Box::new(writer))),
            label: Arc::from(label),
        }
    }

    /// Handle to the process's standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::with_label("stdout", io::stdout())
    }

    /// Handle to the process's standard error.
    #[must_use]
    pub fn stderr() -> Self {
        Self::with_label("stderr", io::stderr())
    }

    /// Opens `path` for appending, creating it when missing.
    pub fn append_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::with_label(&path.display().to_string(), file))
    }

    /// Returns the label given at construction.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Writes one complete record and flushes the destination.
    ///
    /// The destination lock is held for the whole record so records from
    /// concurrent callers never interleave.
    pub fn write_record(&self, record: &[u8]) -> io::Result<()> {
        let mut destination = self
            .destination
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        destination.write_all(record)?;
        destination.flush()
    }

    /// Reports whether both handles refer to the same destination.
    #[must_use]
    pub fn same_destination(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.destination, &other.destination)
    }
}

impl PartialEq for SinkWriter {
    fn eq(&self, other: &Self) -> bool {
        self.same_destination(other)
    }
}

impl Eq for SinkWriter {}

impl fmt::Debug for SinkWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SinkWriter").field(&self.label).finish()
    }
}

impl From<MemoryBuffer> for SinkWriter {
    fn from(buffer: MemoryBuffer) -> Self {
        Self::with_label("memory", buffer)
    }
}
