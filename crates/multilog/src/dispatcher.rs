//! crates/multilog/src/dispatcher.rs
//! Fans one log call out to every accepting sink and applies the
//! severity's side effect.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use logging_sink::SinkWriter;
use time::OffsetDateTime;

use crate::error::RegistryError;
use crate::frame::{BacktraceResolver, Frame, FrameResolver, MAX_CALLER_SKIP};
use crate::registry::Registry;
use crate::render::{RenderContext, render};
use crate::severity::{LevelSet, LevelSetExt, Severity};
use crate::sink::Sink;

/// Exit code used by [`Severity::Fatal`] unless configured otherwise.
pub const DEFAULT_EXIT_CODE: i32 = 1;

/// Skip depth that makes frames name the caller of a severity method.
///
/// Counted from [`Dispatcher::dispatch`]: `dispatch`, the severity method
/// (or [`Dispatcher::log`]), then the caller.
pub const DEFAULT_CALLER_SKIP: usize = 2;

/// Name of the sink created by [`Dispatcher::with_stdout`].
pub const STDOUT_SINK: &str = "stdout";

/// Callback invoked with the exit code after a fatal record is written.
pub type ExitHook = Arc<dyn Fn(i32) + Send + Sync>;

/// Side effect owed by a dispatched call.
///
/// [`Dispatcher::dispatch`] only writes records; the caller decides how to
/// honor the outcome, usually through [`apply`](Self::apply).
#[derive(Clone, Debug, Eq, PartialEq)]
#[must_use = "panic and fatal outcomes are lost unless applied"]
pub enum Outcome {
    /// Nothing further to do.
    Continue,
    /// Terminate the process with this code.
    Abort(i32),
    /// Unwind with this message as the panic payload.
    Unwind(String),
}

impl Outcome {
    /// Performs the side effect.
    ///
    /// `Abort` calls `exit` exactly once; `Unwind` panics with the message
    /// (a `String` payload).
    pub fn apply(self, exit: &dyn Fn(i32)) {
        match self {
            Self::Continue => {}
            Self::Abort(code) => exit(code),
            Self::Unwind(message) => std::panic::panic_any(message),
        }
    }
}

#[derive(Clone, Debug)]
struct State {
    registry: Arc<Registry>,
    prefix: Arc<str>,
    caller_skip: usize,
    exit_code: i32,
}

impl Default for State {
    fn default() -> Self {
        Self {
            registry: Arc::default(),
            prefix: Arc::from(""),
            caller_skip: DEFAULT_CALLER_SKIP,
            exit_code: DEFAULT_EXIT_CODE,
        }
    }
}

/// A set of named sinks plus the shared prefix, caller-skip depth and exit
/// code applied to every call.
///
/// All methods take `&self`; the dispatcher is `Send + Sync` and is meant to
/// be shared (for example behind an [`Arc`]). Each call snapshots the
/// registry under a read lock and writes without holding it, so slow sinks
/// never block registration. Records from concurrent calls never interleave
/// within one destination.
///
/// [`Clone`] produces an independent dispatcher: later changes to either
/// registry are invisible to the other, while both keep writing to the same
/// destinations.
///
/// # Examples
///
/// ```
/// use logging_sink::MemoryBuffer;
/// use multilog::{Dispatcher, LevelSet, LevelSetExt, Severity, Sink, info_log};
///
/// let buffer = MemoryBuffer::new();
/// let log = Dispatcher::new();
/// log.register([Sink::new("mem")
///     .with_writer(buffer.clone())
///     .with_levels(LevelSet::at_least(Severity::Info))
///     .with_timestamp_format("")])
///     .unwrap();
/// log.set_prefix("app");
///
/// info_log!(log, "listening on {}", 8080);
/// log.debug(format_args!("filtered out"));
///
/// assert_eq!(buffer.lines(), [" app INFO listening on 8080"]);
/// ```
pub struct Dispatcher {
    state: RwLock<State>,
    resolver: Arc<dyn FrameResolver>,
    exit_hook: ExitHook,
}

impl Dispatcher {
    /// Creates a dispatcher with no sinks, an empty prefix, exit code
    /// [`DEFAULT_EXIT_CODE`] and caller skip [`DEFAULT_CALLER_SKIP`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
            resolver: Arc::new(BacktraceResolver::new()),
            exit_hook: Arc::new(|code| std::process::exit(code)),
        }
    }

    /// Creates a dispatcher with one text sink named [`STDOUT_SINK`] that
    /// accepts info and everything more severe.
    #[must_use]
    pub fn with_stdout() -> Self {
        let mut registry = Registry::new();
        let stdout = Sink::new(STDOUT_SINK)
            .with_writer(logging_sink::SinkWriter::stdout())
            .with_levels(LevelSet::at_least(Severity::Info));
        if let Err(error) = registry.register([stdout]) {
            tracing::warn!(%error, "default stdout sink rejected");
        }
        let dispatcher = Self::new();
        dispatcher.write_state().registry = Arc::new(registry);
        dispatcher
    }

    /// Replaces the caller-frame resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: impl FrameResolver + 'static) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    /// Replaces the hook run for fatal records; the default exits the process.
    #[must_use]
    pub fn with_exit_hook(mut self, hook: impl Fn(i32) + Send + Sync + 'static) -> Self {
        self.exit_hook = Arc::new(hook);
        self
    }

    fn read_state(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the whole registry with `sinks`. See [`Registry::register`].
    ///
    /// # Errors
    ///
    /// Returns the first validation failure; the previous registry stays in
    /// place in that case.
    pub fn register<I>(&self, sinks: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = Sink>,
    {
        let mut fresh = Registry::new();
        fresh.register(sinks)?;
        let count = fresh.len();
        self.write_state().registry = Arc::new(fresh);
        tracing::debug!(count, "registered sinks");
        Ok(())
    }

    /// Applies partial sink updates. See [`Registry::edit`].
    ///
    /// # Errors
    ///
    /// Returns the first validation failure; no sink is changed in that case.
    pub fn edit<I>(&self, updates: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = Sink>,
    {
        let updates: Vec<Sink> = updates.into_iter().collect();
        let count = updates.len();
        let mut state = self.write_state();
        Arc::make_mut(&mut state.registry).edit(updates)?;
        tracing::debug!(count, "edited sinks");
        Ok(())
    }

    /// Removes sinks by name, returning how many existed.
    pub fn delete<I, S>(&self, names: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut state = self.write_state();
        let removed = Arc::make_mut(&mut state.registry).delete(names);
        tracing::debug!(removed, "deleted sinks");
        removed
    }

    /// Copies of every sink, sorted by name.
    #[must_use]
    pub fn list(&self) -> Vec<Sink> {
        self.snapshot().list()
    }

    /// Copies of the named sinks in request order.
    pub fn get<I, S>(&self, names: I) -> Vec<Sink>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.snapshot().get(names)
    }

    /// The registry as of this instant.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Registry> {
        Arc::clone(&self.read_state().registry)
    }

    /// Sets the prefix rendered before each record.
    pub fn set_prefix(&self, prefix: impl AsRef<str>) {
        self.write_state().prefix = Arc::from(prefix.as_ref());
    }

    /// Current prefix.
    #[must_use]
    pub fn prefix(&self) -> String {
        self.read_state().prefix.to_string()
    }

    /// Sets the exit code used by fatal records.
    ///
    /// Codes of `0` or below make fatal records behave like errors: the
    /// record is written and the call returns.
    pub fn set_exit_code(&self, code: i32) {
        self.write_state().exit_code = code;
    }

    /// Current exit code.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.read_state().exit_code
    }

    /// Sets how many frames above [`dispatch`](Self::dispatch) the caller
    /// frame is taken from, returning the depth actually stored.
    ///
    /// The request is capped at [`MAX_CALLER_SKIP`], then lowered until the
    /// resolver can produce a frame at that depth from here.
    pub fn set_caller_skip(&self, skip: usize) -> usize {
        let mut effective = skip.min(MAX_CALLER_SKIP);
        while effective > 0 && self.resolver.resolve(effective).is_err() {
            effective -= 1;
        }
        if effective != skip {
            tracing::debug!(requested = skip, effective, "clamped caller skip");
        }
        self.write_state().caller_skip = effective;
        effective
    }

    /// Current caller skip depth.
    #[must_use]
    pub fn caller_skip(&self) -> usize {
        self.read_state().caller_skip
    }

    /// Writes `args` to every enabled sink that accepts `severity` and
    /// reports the side effect the severity calls for.
    ///
    /// The caller frame is resolved at most once, and only when some sink
    /// accepts the record. The timestamp is taken once so every sink sees
    /// the same instant. A write failure on one sink is reported through
    /// `tracing` and does not stop delivery to the others.
    #[inline(never)]
    pub fn dispatch(&self, severity: Severity, args: fmt::Arguments<'_>) -> Outcome {
        let call = self.begin(severity, args);
        let mut frame: Option<Frame> = None;

        for (sink, writer) in call.accepting() {
            // Resolved here rather than in a helper: the skip depth counts
            // from this function.
            if frame.is_none() {
                frame = Some(match self.resolver.resolve(call.skip) {
                    Ok(resolved) => resolved,
                    Err(error) => {
                        tracing::trace!(%error, skip = call.skip, "caller frame unavailable");
                        Frame::unknown()
                    }
                });
            }
            if let Some(frame) = &frame {
                call.deliver(sink, writer, frame);
            }
        }

        call.finish()
    }

    /// Like [`dispatch`](Self::dispatch), with the caller frame supplied
    /// instead of resolved.
    ///
    /// Used when the source position is already known, for example from
    /// `tracing` event metadata. The configured caller skip is ignored.
    pub fn dispatch_from(
        &self,
        severity: Severity,
        frame: &Frame,
        args: fmt::Arguments<'_>,
    ) -> Outcome {
        let call = self.begin(severity, args);
        for (sink, writer) in call.accepting() {
            call.deliver(sink, writer, frame);
        }
        call.finish()
    }

    fn begin(&self, severity: Severity, args: fmt::Arguments<'_>) -> Call {
        let state = self.read_state();
        Call {
            registry: Arc::clone(&state.registry),
            prefix: Arc::clone(&state.prefix),
            skip: state.caller_skip,
            exit_code: state.exit_code,
            severity,
            message: fmt::format(args),
            timestamp: now(),
        }
    }

    // The methods below call `dispatch` directly and use its result, so each
    // is exactly one frame between `dispatch` and the caller.

    /// Dispatches and applies the outcome with the configured exit hook.
    #[inline(never)]
    pub fn log(&self, severity: Severity, args: fmt::Arguments<'_>) {
        self.dispatch(severity, args).apply(&*self.exit_hook);
    }

    /// Logs at [`Severity::Panic`], then panics with the message.
    #[inline(never)]
    pub fn panic(&self, args: fmt::Arguments<'_>) {
        self.dispatch(Severity::Panic, args).apply(&*self.exit_hook);
    }

    /// Logs at [`Severity::Fatal`], then runs the exit hook when the exit
    /// code is positive.
    #[inline(never)]
    pub fn fatal(&self, args: fmt::Arguments<'_>) {
        self.dispatch(Severity::Fatal, args).apply(&*self.exit_hook);
    }

    /// Logs at [`Severity::Error`].
    #[inline(never)]
    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.dispatch(Severity::Error, args).apply(&*self.exit_hook);
    }

    /// Logs at [`Severity::Warn`].
    #[inline(never)]
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.dispatch(Severity::Warn, args).apply(&*self.exit_hook);
    }

    /// Logs at [`Severity::Info`].
    #[inline(never)]
    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.dispatch(Severity::Info, args).apply(&*self.exit_hook);
    }

    /// Logs at [`Severity::Debug`].
    #[inline(never)]
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.dispatch(Severity::Debug, args).apply(&*self.exit_hook);
    }

    /// Logs at [`Severity::Trace`].
    #[inline(never)]
    pub fn trace(&self, args: fmt::Arguments<'_>) {
        self.dispatch(Severity::Trace, args).apply(&*self.exit_hook);
    }
}

/// One log call: the state snapshot plus the formatted message.
struct Call {
    registry: Arc<Registry>,
    prefix: Arc<str>,
    skip: usize,
    exit_code: i32,
    severity: Severity,
    message: String,
    timestamp: OffsetDateTime,
}

impl Call {
    /// Enabled sinks that accept the severity and have a writer.
    fn accepting(&self) -> impl Iterator<Item = (&Sink, &SinkWriter)> + '_ {
        self.registry.iter().filter_map(move |sink| {
            if !sink.is_enabled() {
                return None;
            }
            match sink.levels().has(self.severity) {
                Ok(true) => {}
                Ok(false) => return None,
                Err(error) => {
                    tracing::warn!(sink = sink.name(), %error, "skipping sink with invalid levels");
                    return None;
                }
            }
            sink.writer().map(|writer| (sink, writer))
        })
    }

    fn deliver(&self, sink: &Sink, writer: &SinkWriter, frame: &Frame) {
        let ctx = RenderContext {
            prefix: &self.prefix,
            severity: self.severity,
            timestamp: self.timestamp,
            frame,
            message: &self.message,
        };
        let record = match render(&ctx, sink) {
            Ok(record) => record,
            Err(error) => {
                tracing::warn!(sink = sink.name(), %error, "failed to render log record");
                return;
            }
        };
        if let Err(error) = writer.write_record(record.as_bytes()) {
            tracing::warn!(
                sink = sink.name(),
                destination = writer.label(),
                %error,
                "failed to write log record"
            );
        }
    }

    fn finish(self) -> Outcome {
        match self.severity {
            Severity::Panic => Outcome::Unwind(self.message),
            Severity::Fatal if self.exit_code > 0 => Outcome::Abort(self.exit_code),
            _ => Outcome::Continue,
        }
    }
}

fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Dispatcher {
    fn clone(&self) -> Self {
        Self {
            state: RwLock::new(self.read_state().clone()),
            resolver: Arc::clone(&self.resolver),
            exit_hook: Arc::clone(&self.exit_hook),
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read_state();
        f.debug_struct("Dispatcher")
            .field("registry", &state.registry)
            .field("prefix", &state.prefix)
            .field("caller_skip", &state.caller_skip)
            .field("exit_code", &state.exit_code)
            .finish_non_exhaustive()
    }
}
