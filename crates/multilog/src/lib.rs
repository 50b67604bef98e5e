#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! crates/multilog/src/lib.rs
//!
//! # Overview
//!
//! `multilog` is a structured logging core. A [`Dispatcher`] owns a
//! registry of named [`Sink`]s; every call is fanned out to each enabled
//! sink whose accepted [`LevelSet`] contains the call's [`Severity`], and
//! rendered either as a separator-joined text line or as a JSON record.
//!
//! # Design
//!
//! - Severities and layout options are elementary capabilities from the
//!   [`capability`] crate, so a sink accepts an arbitrary set of severities
//!   rather than a threshold. [`LevelSetExt`] supplies threshold and `-v`
//!   count constructors for the common cases.
//! - Destinations are [`logging_sink::SinkWriter`] handles. One record is one
//!   locked write, so concurrent calls never interleave within a destination.
//! - The registry is copy-on-write: a call snapshots it under a read lock and
//!   writes without holding any dispatcher lock.
//! - Caller frames come from a [`FrameResolver`]. They are resolved lazily,
//!   at most once per call, and only when some sink accepts the record.
//! - Panic and fatal side effects are returned as an [`Outcome`] by
//!   [`Dispatcher::dispatch`] and applied by the severity methods, so callers
//!   that need to intercept them can.
//!
//! # Invariants
//!
//! - A rejected registry mutation leaves the registry unchanged.
//! - A write failure on one sink never prevents delivery to the others.
//! - A panic-severity call always unwinds with the message as a `String`
//!   payload, even when no sink accepted it.
//! - A fatal-severity call runs the exit hook exactly once when the exit code
//!   is positive and returns normally otherwise.
//!
//! # Errors
//!
//! Registry mutations return [`RegistryError`]; configuration loading returns
//! [`ConfigError`]. Write failures are not returned to the caller; they are
//! reported as `tracing` warnings.
//!
//! # Examples
//!
//! Route info to a text sink and errors to a JSON sink:
//!
//! ```
//! use logging_sink::MemoryBuffer;
//! use multilog::{Dispatcher, LevelSet, Severity, Sink, Style, error_log, info_log};
//!
//! let text = MemoryBuffer::new();
//! let json = MemoryBuffer::new();
//!
//! let log = Dispatcher::new();
//! log.register([
//!     Sink::new("text")
//!         .with_writer(text.clone())
//!         .with_levels(LevelSet::from(Severity::Info) | Severity::Debug)
//!         .with_timestamp_format(""),
//!     Sink::new("json")
//!         .with_writer(json.clone())
//!         .with_levels(LevelSet::from(Severity::Error) | Severity::Fatal)
//!         .with_style(Style::Json),
//! ])
//! .unwrap();
//!
//! info_log!(log, "ready");
//! error_log!(log, "boom {}", 7);
//!
//! assert_eq!(text.lines(), [" INFO ready"]);
//! let record: serde_json::Value = serde_json::from_str(&json.lines()[0]).unwrap();
//! assert_eq!(record["message"], "boom 7");
//! assert_eq!(record["level"], "error");
//! ```
//!
//! # Features
//!
//! - `serde`: `Serialize`/`Deserialize` for [`DispatcherConfig`] and the
//!   types it contains.
//! - `tracing`: [`MultilogLayer`] and [`init_tracing`], forwarding `tracing`
//!   events into a dispatcher.

mod config;
mod dispatcher;
mod error;
mod frame;
mod layout;
mod macros;
mod registry;
pub mod render;
mod severity;
mod sink;

#[cfg(feature = "tracing")]
mod tracing_bridge;

pub use capability::{Capability, CapabilityError, CapabilitySet, Flag};
pub use config::{Destination, DispatcherConfig, SinkConfig};
pub use dispatcher::{
    DEFAULT_CALLER_SKIP, DEFAULT_EXIT_CODE, Dispatcher, ExitHook, Outcome, STDOUT_SINK,
};
pub use error::{ConfigError, RegistryError};
pub use frame::{
    BacktraceResolver, FixedResolver, Frame, FrameError, FrameResolver, MAX_CALLER_SKIP, UNKNOWN,
};
pub use layout::{Layout, LayoutSet};
pub use logging_sink::LineMode;
pub use registry::Registry;
pub use severity::{LevelSet, LevelSetExt, ParseSeverityError, Severity};
pub use sink::{
    DEFAULT_LEVEL_FORMAT, DEFAULT_SEPARATOR, DEFAULT_TIMESTAMP_FORMAT, LEVEL_PLACEHOLDER,
    ParseStyleError, Sink, Style,
};

#[cfg(feature = "tracing")]
pub use tracing_bridge::{MultilogLayer, init_tracing, init_tracing_with_filter};
