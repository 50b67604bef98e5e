//! crates/multilog/src/severity.rs
//! Severity levels and the level sets sinks accept.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use capability::{Capability, CapabilitySet};

/// Severity of a log call, from most to least severe.
///
/// Each severity is one elementary capability so a sink's accepted levels
/// are an arbitrary [`LevelSet`], not a threshold. Ordering follows
/// severity: `Panic > Fatal > ... > Trace`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[repr(u32)]
pub enum Severity {
    /// Logs, then unwinds with the message as panic payload.
    Panic = 1,
    /// Logs, then terminates the process with the dispatcher's exit code.
    Fatal = 2,
    /// An operation failed.
    Error = 4,
    /// Something unexpected that the program recovered from.
    Warn = 8,
    /// Normal operational messages.
    Info = 16,
    /// Diagnostics for developers.
    Debug = 32,
    /// Very fine-grained diagnostics.
    Trace = 64,
}

/// Set of severities, used for a sink's accepted levels.
pub type LevelSet = CapabilitySet<Severity>;

impl Severity {
    /// Lowercase name, as used in structured records and configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use multilog::Severity;
    ///
    /// assert_eq!(Severity::Warn.as_str(), "warn");
    /// ```
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Panic => "panic",
            Self::Fatal => "fatal",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    /// Uppercase name substituted into a sink's level format.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Panic => "PANIC",
            Self::Fatal => "FATAL",
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        }
    }

    /// ANSI SGR sequence used when a sink renders colored labels.
    #[must_use]
    pub const fn ansi_color(self) -> &'static str {
        match self {
            Self::Panic | Self::Fatal => "\x1b[1;31m",
            Self::Error => "\x1b[31m",
            Self::Warn => "\x1b[33m",
            Self::Info => "\x1b[32m",
            Self::Debug => "\x1b[36m",
            Self::Trace => "\x1b[35m",
        }
    }
}

impl Capability for Severity {
    const KIND: &'static str = "level";
    const ALL: &'static [Self] = &[
        Self::Panic,
        Self::Fatal,
        Self::Error,
        Self::Warn,
        Self::Info,
        Self::Debug,
        Self::Trace,
    ];

    fn bits(self) -> u32 {
        self as u32
    }

    fn name(self) -> &'static str {
        self.as_str()
    }

    fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("warning") {
            return Some(Self::Warn);
        }
        Self::ALL
            .iter()
            .copied()
            .find(|severity| severity.as_str().eq_ignore_ascii_case(name))
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> Ordering {
        // Lower bits are more severe.
        (*other as u32).cmp(&(*self as u32))
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`Severity`] from a string fails.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unrecognised log severity: {input:?}")]
pub struct ParseSeverityError {
    input: String,
}

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        <Self as Capability>::from_name(input.trim()).ok_or_else(|| ParseSeverityError {
            input: input.to_owned(),
        })
    }
}

/// Constructors for commonly used [`LevelSet`] shapes.
pub trait LevelSetExt: Sized {
    /// Every severity at least as severe as `threshold`.
    fn at_least(threshold: Severity) -> Self;

    /// Maps a `-v` style count onto a level set.
    ///
    /// `0` keeps panic, fatal and error; each step adds the next severity
    /// (warn, info, debug) and `4` or more enables everything.
    fn from_verbosity(verbosity: u8) -> Self;
}

impl LevelSetExt for LevelSet {
    fn at_least(threshold: Severity) -> Self {
        Severity::ALL
            .iter()
            .copied()
            .filter(|severity| *severity >= threshold)
            .collect()
    }

    fn from_verbosity(verbosity: u8) -> Self {
        let threshold = match verbosity {
            0 => Severity::Error,
            1 => Severity::Warn,
            2 => Severity::Info,
            3 => Severity::Debug,
            _ => Severity::Trace,
        };
        Self::at_least(threshold)
    }
}
