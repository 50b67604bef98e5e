//! crates/multilog/src/frame.rs
//! Caller-frame lookup used to annotate log lines with source positions.

use std::panic::Location;
use std::path::Path;

/// Placeholder used for any frame component that could not be determined.
pub const UNKNOWN: &str = "???";

/// Largest skip depth the dispatcher will probe when clamping.
pub const MAX_CALLER_SKIP: usize = 64;

/// Source position of the code that issued a log call.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Frame {
    /// Source file path as recorded in debug information.
    pub file: String,
    /// Fully qualified function name.
    pub function: String,
    /// One-based line number, `0` when unknown.
    pub line: u32,
    /// Address of the function's symbol, `0` when unknown.
    pub address: usize,
}

impl Frame {
    /// Frame used when resolution fails.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            file: UNKNOWN.to_owned(),
            function: UNKNOWN.to_owned(),
            line: 0,
            address: 0,
        }
    }

    /// Builds a frame from a known file and line, leaving the function and
    /// address unknown.
    #[must_use]
    pub fn from_source(file: &str, line: u32) -> Self {
        Self {
            file: file.to_owned(),
            line,
            ..Self::unknown()
        }
    }

    /// Builds a frame from a `#[track_caller]` location.
    ///
    /// Locations carry no function information, so the name and address are
    /// left unknown.
    ///
    /// # Examples
    ///
    /// A wrapper that reports its own caller without counting frames:
    ///
    /// ```
    /// use std::panic::Location;
    /// use logging_sink::MemoryBuffer;
    /// use multilog::{Dispatcher, Frame, Layout, LayoutSet, LevelSet, Severity, Sink};
    ///
    /// #[track_caller]
    /// fn audit(log: &Dispatcher, what: &str) {
    ///     let frame = Frame::from_location(Location::caller());
    ///     log.dispatch_from(Severity::Info, &frame, format_args!("audit: {what}"))
    ///         .apply(&|_| {});
    /// }
    ///
    /// let buffer = MemoryBuffer::new();
    /// let log = Dispatcher::new();
    /// log.register([Sink::new("mem")
    ///     .with_writer(buffer.clone())
    ///     .with_levels(LevelSet::full())
    ///     .with_timestamp_format("")
    ///     .with_layout(LayoutSet::from(Layout::LineNumber))])
    ///     .unwrap();
    ///
    /// let line = line!() + 1;
    /// audit(&log, "login");
    /// assert_eq!(buffer.lines(), [format!(" INFO {line} audit: login")]);
    /// ```
    #[must_use]
    pub fn from_location(location: &Location<'_>) -> Self {
        Self::from_source(location.file(), location.line())
    }

    /// Final component of [`file`](Self::file).
    #[must_use]
    pub fn short_file(&self) -> &str {
        Path::new(&self.file)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.file)
    }

    /// Function address in `0x`-prefixed hexadecimal.
    #[must_use]
    pub fn address_hex(&self) -> String {
        format!("{:#x}", self.address)
    }
}

/// Error returned by a [`FrameResolver`].
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum FrameError {
    /// The stack is shallower than the requested skip depth.
    #[error("no caller frame at skip depth {skip}")]
    DepthExceeded {
        /// The depth that was requested.
        skip: usize,
    },
    /// The stack could not be walked or symbolized.
    #[error("caller frames are unavailable in this build")]
    Unavailable,
}

/// Looks up the caller frame `skip` levels above the resolver's caller.
///
/// Skip `0` names the function that called [`resolve`](Self::resolve).
/// Implementations must fail rather than return a guessed frame; the
/// dispatcher relies on that boundary when clamping its skip depth.
pub trait FrameResolver: Send + Sync {
    /// Resolves the frame at `skip`.
    fn resolve(&self, skip: usize) -> Result<Frame, FrameError>;
}

/// Resolver that walks the live stack with the `backtrace` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct BacktraceResolver {
    _private: (),
}

/// Demangled symbols of [`BacktraceResolver::resolve`] and its closures contain this.
const ANCHOR: &str = "BacktraceResolver as ";

enum Walk {
    Searching,
    Anchored(usize),
}

impl BacktraceResolver {
    /// Creates the resolver.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

impl FrameResolver for BacktraceResolver {
    /// Walks the stack from this call.
    ///
    /// A frame without a file or line means the binary carries no line
    /// tables; that is reported as [`FrameError::Unavailable`] because the
    /// logical frame count cannot be trusted without inlining information.
    #[inline(never)]
    fn resolve(&self, skip: usize) -> Result<Frame, FrameError> {
        let mut walk = Walk::Searching;
        let mut found: Option<Result<Frame, FrameError>> = None;

        backtrace::trace(|raw| {
            // Inlined calls show up as several symbols for one raw frame;
            // each counts as a logical frame.
            backtrace::resolve_frame(raw, |symbol| {
                if found.is_some() {
                    return;
                }
                let name = symbol
                    .name()
                    .map(|name| format!("{name:#}"))
                    .unwrap_or_default();
                if name.contains(ANCHOR) {
                    walk = Walk::Anchored(skip);
                    return;
                }
                match &mut walk {
                    Walk::Searching => {}
                    Walk::Anchored(0) => {
                        found = Some(match (symbol.filename(), symbol.lineno()) {
                            (Some(path), Some(line)) => Ok(Frame {
                                file: path.display().to_string(),
                                function: if name.is_empty() {
                                    UNKNOWN.to_owned()
                                } else {
                                    name
                                },
                                line,
                                address: symbol.addr().map_or(0, |addr| addr as usize),
                            }),
                            _ => Err(FrameError::Unavailable),
                        });
                    }
                    Walk::Anchored(remaining) => *remaining -= 1,
                }
            });
            found.is_none()
        });

        match (found, walk) {
            (Some(result), _) => result,
            (None, Walk::Searching) => Err(FrameError::Unavailable),
            (None, Walk::Anchored(_)) => Err(FrameError::DepthExceeded { skip }),
        }
    }
}

/// Resolver returning one configured frame, for deterministic output.
///
/// Skips beyond `max_skip` fail with [`FrameError::DepthExceeded`], which
/// lets tests exercise skip clamping.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FixedResolver {
    frame: Frame,
    max_skip: usize,
}

impl FixedResolver {
    /// Resolves every skip depth to `frame`.
    #[must_use]
    pub fn new(frame: Frame) -> Self {
        Self {
            frame,
            max_skip: usize::MAX,
        }
    }

    /// Limits the deepest resolvable skip.
    #[must_use]
    pub fn with_max_skip(mut self, max_skip: usize) -> Self {
        self.max_skip = max_skip;
        self
    }
}

impl FrameResolver for FixedResolver {
    fn resolve(&self, skip: usize) -> Result<Frame, FrameError> {
        if skip > self.max_skip {
            return Err(FrameError::DepthExceeded { skip });
        }
        Ok(self.frame.clone())
    }
}
