//! crates/test-support/src/lib.rs
//! Writers and fixtures shared by the workspace's integration tests.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tempfile::TempDir;

/// Writer whose every operation fails with a fixed error kind.
#[derive(Clone, Copy, Debug)]
pub struct FailingWriter {
    kind: io::ErrorKind,
}

impl FailingWriter {
    /// Creates a writer failing with `kind`.
    pub fn new(kind: io::ErrorKind) -> Self {
        Self { kind }
    }
}

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(self.kind, "injected write failure"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(self.kind, "injected flush failure"))
    }
}

/// Writer that discards bytes but counts `write_all`-level records.
///
/// Counting happens on `flush`, which sink writers issue once per record.
#[derive(Clone, Debug, Default)]
pub struct CountingWriter {
    records: Arc<AtomicUsize>,
}

impl CountingWriter {
    /// Creates a writer with a zero count.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records flushed so far.
    pub fn records(&self) -> usize {
        self.records.load(Ordering::SeqCst)
    }
}

impl Write for CountingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.records.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Temporary directory for file-backed sinks, removed on drop.
pub struct TempLogDir {
    dir: TempDir,
}

impl TempLogDir {
    /// Creates a fresh directory.
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temporary log directory"),
        }
    }

    /// Path of the directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Reads a file inside the directory as UTF-8.
    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.dir.path().join(name)).expect("read log file")
    }
}

impl Default for TempLogDir {
    fn default() -> Self {
        Self::new()
    }
}
