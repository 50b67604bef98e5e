#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! crates/logging-sink/src/lib.rs
//!
//! # Overview
//!
//! `logging-sink` provides the writer side of the multi-sink logger. A
//! [`SinkWriter`] is a cloneable handle to one output destination; cloning
//! it shares the destination rather than duplicating it, so a registry
//! snapshot and the live registry write to the same file or stream.
//!
//! # Design
//!
//! Each handle wraps an `Arc<Mutex<Box<dyn Write + Send>>>`. A record is
//! written with a single [`write_record`](SinkWriter::write_record) call
//! under the mutex, so concurrent callers never interleave partial lines on
//! one destination. [`MemoryBuffer`] is an in-process destination used by
//! tests and by callers that want to inspect output. [`LineMode`] controls
//! whether a rendered record is terminated by a newline.
//!
//! # Invariants
//!
//! - Two handles compare equal iff they share one destination.
//! - A poisoned destination lock is recovered, not propagated: the data
//!   behind it is a byte stream with no invariant a panic could break.
//!
//! # Errors
//!
//! Writes surface the [`std::io::Error`] of the underlying writer unchanged.
//!
//! # Examples
//!
//! ```
//! use logging_sink::{MemoryBuffer, SinkWriter};
//!
//! let buffer = MemoryBuffer::new();
//! let writer = SinkWriter::from(buffer.clone());
//! let shared = writer.clone();
//!
//! writer.write_record(b"first\n").unwrap();
//! shared.write_record(b"second\n").unwrap();
//!
//! assert_eq!(buffer.lines(), vec!["first", "second"]);
//! assert_eq!(writer, shared);
//! ```

mod line_mode;
mod memory;
mod writer;

pub use line_mode::LineMode;
pub use memory::MemoryBuffer;
pub use writer::SinkWriter;
