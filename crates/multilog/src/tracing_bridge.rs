//! crates/multilog/src/tracing_bridge.rs
//! Forwards `tracing` events into a [`Dispatcher`].
//!
//! Libraries that already use the standard `tracing` macros can have their
//! events written to the same sinks as direct dispatcher calls.
//!
//! # Architecture
//!
//! - [`MultilogLayer`]: a `tracing-subscriber` layer that formats each event
//!   and dispatches it at the mapped [`Severity`]
//! - `tracing` has no panic or fatal levels, so forwarded events never unwind
//!   or exit
//! - The caller frame is the event's file and line from its metadata rather
//!   than a stack walk, which would land inside the subscriber
//! - Events emitted by this crate (write-failure warnings, registry
//!   diagnostics) are ignored so a failing sink cannot feed itself
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use multilog::{Dispatcher, init_tracing};
//!
//! let log = Arc::new(Dispatcher::with_stdout());
//! init_tracing(Arc::clone(&log)).expect("no global subscriber yet");
//!
//! tracing::info!(peer = "10.0.0.4", "connection accepted");
//! ```

use std::fmt::{self, Write as _};
use std::sync::Arc;

use tracing::{Level, Metadata, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::TryInitError;

use crate::dispatcher::{Dispatcher, Outcome};
use crate::frame::Frame;
use crate::severity::Severity;

/// Target prefix of events this crate emits about itself.
const OWN_TARGET: &str = env!("CARGO_CRATE_NAME");

/// A tracing layer that writes events through a [`Dispatcher`].
pub struct MultilogLayer {
    dispatcher: Arc<Dispatcher>,
}

impl MultilogLayer {
    /// Creates a layer writing to `dispatcher`.
    #[must_use]
    pub const fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    /// The dispatcher events are written to.
    #[must_use]
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Map a tracing level to a severity.
    const fn severity_for(level: &Level) -> Severity {
        match *level {
            Level::ERROR => Severity::Error,
            Level::WARN => Severity::Warn,
            Level::INFO => Severity::Info,
            Level::DEBUG => Severity::Debug,
            Level::TRACE => Severity::Trace,
        }
    }

    /// The event's source position; the function is never known.
    fn frame_for(metadata: &Metadata<'_>) -> Frame {
        match metadata.file() {
            Some(file) => Frame::from_source(file, metadata.line().unwrap_or(0)),
            None => Frame::unknown(),
        }
    }

    fn is_own_target(target: &str) -> bool {
        target
            .strip_prefix(OWN_TARGET)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
    }
}

impl fmt::Debug for MultilogLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultilogLayer").finish_non_exhaustive()
    }
}

impl<S> Layer<S> for MultilogLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if Self::is_own_target(metadata.target()) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let severity = Self::severity_for(metadata.level());
        let frame = Self::frame_for(metadata);

        let outcome =
            self.dispatcher
                .dispatch_from(severity, &frame, format_args!("{}", visitor.finish()));
        debug_assert_eq!(outcome, Outcome::Continue);
    }
}

/// Collects the `message` field and renders other fields as `key=value`.
#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
    fields: String,
}

impl MessageVisitor {
    fn push_field(&mut self, name: &str, value: fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{name}={value}");
    }

    fn finish(self) -> String {
        match (self.message, self.fields.is_empty()) {
            (Some(message), true) => message,
            (Some(message), false) => format!("{message} {}", self.fields),
            (None, _) => self.fields,
        }
    }
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        } else {
            self.push_field(field.name(), format_args!("{value:?}"));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_owned());
        } else {
            self.push_field(field.name(), format_args!("{value}"));
        }
    }
}

/// Installs a global subscriber that forwards every event to `dispatcher`.
///
/// # Errors
///
/// Fails if a global subscriber has already been set.
pub fn init_tracing(dispatcher: Arc<Dispatcher>) -> Result<(), TryInitError> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(MultilogLayer::new(dispatcher))
        .try_init()
}

/// Like [`init_tracing`], with an additional filter layer in front.
///
/// # Errors
///
/// Fails if a global subscriber has already been set.
pub fn init_tracing_with_filter<F>(dispatcher: Arc<Dispatcher>, filter: F) -> Result<(), TryInitError>
where
    F: Layer<tracing_subscriber::Registry> + Send + Sync + 'static,
{
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(filter)
        .with(MultilogLayer::new(dispatcher))
        .try_init()
}
