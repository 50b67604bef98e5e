//! crates/multilog/src/config.rs
//! Declarative dispatcher configuration.
//!
//! [`DispatcherConfig`] describes a dispatcher as plain data so it can be
//! built from command-line flags, assembled in code, or (with the `serde`
//! feature) deserialized from a configuration file.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use logging_sink::{LineMode, SinkWriter};

use crate::dispatcher::Dispatcher;
use crate::error::ConfigError;
use crate::layout::{Layout, LayoutSet};
use crate::severity::{LevelSet, LevelSetExt};
use crate::sink::{Sink, Style};

/// Where a configured sink writes.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub enum Destination {
    /// Standard output.
    #[default]
    Stdout,
    /// Standard error.
    Stderr,
    /// A file opened in append mode, created if missing.
    File(PathBuf),
}

impl Destination {
    /// Opens the destination.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Open`] if a file destination cannot be opened.
    pub fn open(&self) -> Result<SinkWriter, ConfigError> {
        match self {
            Self::Stdout => Ok(SinkWriter::stdout()),
            Self::Stderr => Ok(SinkWriter::stderr()),
            Self::File(path) => SinkWriter::append_file(path).map_err(|source| ConfigError::Open {
                path: path.clone(),
                source,
            }),
        }
    }
}

impl FromStr for Destination {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdout" | "-" => Ok(Self::Stdout),
            "stderr" => Ok(Self::Stderr),
            _ => match s.strip_prefix("file:") {
                Some(path) if !path.is_empty() => Ok(Self::File(PathBuf::from(path))),
                _ => Err(ConfigError::InvalidDestination(s.to_owned())),
            },
        }
    }
}

impl TryFrom<String> for Destination {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Destination> for String {
    fn from(destination: Destination) -> Self {
        destination.to_string()
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("stdout"),
            Self::Stderr => f.write_str("stderr"),
            Self::File(path) => write!(f, "file:{}", path.display()),
        }
    }
}

/// One sink in a [`DispatcherConfig`].
///
/// Unset options take the registry defaults.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct SinkConfig {
    /// Unique sink name.
    pub name: String,
    /// Output destination.
    pub destination: Destination,
    /// Whether the sink starts enabled.
    pub enabled: Option<bool>,
    /// Accepted severities.
    pub levels: LevelSet,
    /// Rendered caller details.
    pub layout: LayoutSet,
    /// Text or JSON.
    pub style: Option<Style>,
    /// Colored severity labels.
    pub color: Option<bool>,
    /// Render the dispatcher prefix.
    pub show_prefix: Option<bool>,
    /// Text element separator.
    pub separator: Option<String>,
    /// Timestamp format description; empty omits timestamps.
    pub timestamp_format: Option<String>,
    /// Level format containing `{level}`.
    pub level_format: Option<String>,
    /// Terminate records with a newline.
    pub newline: Option<bool>,
}

impl SinkConfig {
    /// Creates a configuration with only a name and destination.
    pub fn new(name: impl Into<String>, destination: Destination) -> Self {
        Self {
            name: name.into(),
            destination,
            ..Self::default()
        }
    }

    /// Applies one `key=value` option, as accepted on a command line.
    ///
    /// Keys: `destination`, `enabled`, `levels`, `layout`, `style`, `color`,
    /// `prefix`, `separator`, `timestamp`, `level-format`, `newline`.
    /// Level and layout values are comma or `|` separated name lists.
    ///
    /// # Examples
    ///
    /// ```
    /// use multilog::{Destination, LevelSet, Severity, SinkConfig, Style};
    ///
    /// let mut config = SinkConfig::new("audit", Destination::Stderr);
    /// config.apply_option("levels=error,fatal").unwrap();
    /// config.apply_option("style=json").unwrap();
    ///
    /// assert_eq!(config.levels, LevelSet::from(Severity::Error) | Severity::Fatal);
    /// assert_eq!(config.style, Some(Style::Json));
    /// assert!(config.apply_option("volume=11").is_err());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] for unknown keys, a missing
    /// `=`, or values that do not parse.
    pub fn apply_option(&mut self, token: &str) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidOption {
            token: token.to_owned(),
            reason,
        };
        let (key, value) = token
            .split_once('=')
            .ok_or_else(|| invalid("expected key=value".to_owned()))?;

        match key.trim() {
            "destination" => self.destination = value.parse()?,
            "enabled" => self.enabled = Some(parse_bool(value).map_err(invalid)?),
            "levels" => {
                self.levels = LevelSet::parse_list(value).map_err(|e| invalid(e.to_string()))?;
            }
            "layout" => {
                self.layout = LayoutSet::parse_list(value).map_err(|e| invalid(e.to_string()))?;
            }
            "style" => {
                self.style = Some(value.parse::<Style>().map_err(|e| invalid(e.to_string()))?);
            }
            "color" => self.color = Some(parse_bool(value).map_err(invalid)?),
            "prefix" => self.show_prefix = Some(parse_bool(value).map_err(invalid)?),
            "separator" => self.separator = Some(value.to_owned()),
            "timestamp" => self.timestamp_format = Some(value.to_owned()),
            "level-format" => self.level_format = Some(value.to_owned()),
            "newline" => self.newline = Some(parse_bool(value).map_err(invalid)?),
            other => return Err(invalid(format!("unknown key {other:?}"))),
        }
        Ok(())
    }

    /// Opens the destination and builds the sink descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Open`] if the destination cannot be opened.
    pub fn to_sink(&self) -> Result<Sink, ConfigError> {
        let mut sink = Sink::new(self.name.clone())
            .with_writer(self.destination.open()?)
            .with_levels(self.levels)
            .with_layout(self.layout);
        if let Some(enabled) = self.enabled {
            sink = sink.with_enabled(enabled);
        }
        if let Some(style) = self.style {
            sink = sink.with_style(style);
        }
        if let Some(color) = self.color {
            sink = sink.with_color(color);
        }
        if let Some(show_prefix) = self.show_prefix {
            sink = sink.with_show_prefix(show_prefix);
        }
        if let Some(separator) = &self.separator {
            sink = sink.with_separator(separator.clone());
        }
        if let Some(format) = &self.timestamp_format {
            sink = sink.with_timestamp_format(format.clone());
        }
        if let Some(format) = &self.level_format {
            sink = sink.with_level_format(format.clone());
        }
        if let Some(newline) = self.newline {
            sink = sink.with_line_mode(LineMode::from(newline));
        }
        Ok(sink)
    }
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        other => Err(format!("expected a boolean, found {other:?}")),
    }
}

/// Everything needed to build a [`Dispatcher`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct DispatcherConfig {
    /// Prefix rendered before each record.
    pub prefix: String,
    /// Exit code for fatal records; unset keeps the default.
    pub exit_code: Option<i32>,
    /// Caller skip depth; unset keeps the default.
    pub caller_skip: Option<usize>,
    /// Sinks to register.
    pub sinks: Vec<SinkConfig>,
}

impl DispatcherConfig {
    /// Creates a configuration with a single stderr sink for a `-v` count.
    ///
    /// The level set follows [`LevelSetExt::from_verbosity`]. Level 3 adds
    /// the short source path and line number; level 4 and above also add the
    /// function name.
    #[must_use]
    pub fn from_verbose_level(level: u8) -> Self {
        let mut sink = SinkConfig::new("stderr", Destination::Stderr);
        sink.levels = LevelSet::from_verbosity(level);
        sink.layout = match level {
            0..=2 => LayoutSet::empty(),
            3 => LayoutSet::from(Layout::ShortPath) | Layout::LineNumber,
            _ => LayoutSet::from(Layout::ShortPath) | Layout::FuncName | Layout::LineNumber,
        };

        Self {
            sinks: vec![sink],
            ..Self::default()
        }
    }

    /// Builds a dispatcher from this configuration.
    ///
    /// # Errors
    ///
    /// Fails if a destination cannot be opened or the registry rejects the
    /// sinks.
    pub fn build(&self) -> Result<Dispatcher, ConfigError> {
        Dispatcher::from_config(self)
    }
}

impl Dispatcher {
    /// Builds a dispatcher from a configuration.
    ///
    /// # Errors
    ///
    /// Fails if a destination cannot be opened or the registry rejects the
    /// sinks; no dispatcher is returned in that case.
    pub fn from_config(config: &DispatcherConfig) -> Result<Self, ConfigError> {
        let sinks = config
            .sinks
            .iter()
            .map(SinkConfig::to_sink)
            .collect::<Result<Vec<_>, _>>()?;

        let dispatcher = Self::new();
        dispatcher.register(sinks)?;
        dispatcher.set_prefix(&config.prefix);
        if let Some(code) = config.exit_code {
            dispatcher.set_exit_code(code);
        }
        if let Some(skip) = config.caller_skip {
            dispatcher.set_caller_skip(skip);
        }
        Ok(dispatcher)
    }
}
