//! crates/multilog/src/sink.rs
//! Sink descriptors: a named destination plus its filtering and formatting
//! options.
//!
//! Optional fields distinguish "not supplied" from an explicit value so the
//! same descriptor type serves registration (unset fields take defaults) and
//! partial edits (unset fields keep the current value). Level and layout sets
//! have no separate unset state; an empty set means "not supplied".

use std::fmt;
use std::str::FromStr;

use capability::{Capability, CapabilityError};
use logging_sink::{LineMode, SinkWriter};
use time::format_description;

use crate::error::RegistryError;
use crate::layout::{Layout, LayoutSet};
use crate::severity::{LevelSet, Severity};

/// Separator placed before each element of a text record.
pub const DEFAULT_SEPARATOR: &str = " ";

/// Timestamp format used when a sink does not supply one.
///
/// The syntax is the `time` crate's format description language. An empty
/// format omits the timestamp from records.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "[year]-[month]-[day] [hour]:[minute]:[second]";

/// Placeholder replaced by the severity label in a level format.
pub const LEVEL_PLACEHOLDER: &str = "{level}";

/// Level format used when a sink does not supply one.
pub const DEFAULT_LEVEL_FORMAT: &str = LEVEL_PLACEHOLDER;

/// Output style of a sink.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(rename_all = "lowercase")
)]
pub enum Style {
    /// Separator-joined plain text.
    #[default]
    Text,
    /// One JSON object per record.
    Json,
}

impl Style {
    /// Lowercase name used in configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown [`Style`] name.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown sink style {input:?}; expected \"text\" or \"json\"")]
pub struct ParseStyleError {
    input: String,
}

impl FromStr for Style {
    type Err = ParseStyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" | "structured" => Ok(Self::Json),
            _ => Err(ParseStyleError {
                input: s.to_owned(),
            }),
        }
    }
}

/// A named log destination and its options.
///
/// Built with the `with_*` methods; accessors report the effective value,
/// substituting the documented default for anything left unset.
///
/// # Examples
///
/// ```
/// use multilog::{LevelSet, Severity, Sink, Style};
/// use logging_sink::MemoryBuffer;
///
/// let buffer = MemoryBuffer::new();
/// let sink = Sink::new("audit")
///     .with_writer(buffer.clone())
///     .with_levels(LevelSet::from(Severity::Error) | Severity::Fatal)
///     .with_style(Style::Json);
///
/// assert_eq!(sink.name(), "audit");
/// assert_eq!(sink.style(), Style::Json);
/// assert!(sink.is_enabled());
/// assert_eq!(sink.separator(), " ");
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Sink {
    name: String,
    writer: Option<SinkWriter>,
    enabled: Option<bool>,
    levels: LevelSet,
    layout: LayoutSet,
    style: Option<Style>,
    color: Option<bool>,
    show_prefix: Option<bool>,
    separator: Option<String>,
    timestamp_format: Option<String>,
    level_format: Option<String>,
    line_mode: Option<LineMode>,
}

impl Sink {
    /// Creates a descriptor with only a name set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the destination writer.
    #[must_use]
    pub fn with_writer(mut self, writer: impl Into<SinkWriter>) -> Self {
        self.writer = Some(writer.into());
        self
    }

    /// Enables or disables the sink without removing it.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Sets the severities the sink accepts.
    #[must_use]
    pub fn with_levels(mut self, levels: LevelSet) -> Self {
        self.levels = levels;
        self
    }

    /// Sets which caller details appear in records.
    #[must_use]
    pub fn with_layout(mut self, layout: LayoutSet) -> Self {
        self.layout = layout;
        self
    }

    /// Sets the output style.
    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    /// Wraps severity labels in ANSI color sequences (text style only).
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = Some(color);
        self
    }

    /// Controls whether the dispatcher's prefix is rendered.
    #[must_use]
    pub fn with_show_prefix(mut self, show_prefix: bool) -> Self {
        self.show_prefix = Some(show_prefix);
        self
    }

    /// Sets the text separator.
    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    /// Sets the timestamp format. An empty string omits timestamps.
    #[must_use]
    pub fn with_timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = Some(format.into());
        self
    }

    /// Sets the level format; [`LEVEL_PLACEHOLDER`] is replaced by the label.
    #[must_use]
    pub fn with_level_format(mut self, format: impl Into<String>) -> Self {
        self.level_format = Some(format.into());
        self
    }

    /// Sets the newline policy.
    #[must_use]
    pub fn with_line_mode(mut self, line_mode: LineMode) -> Self {
        self.line_mode = Some(line_mode);
        self
    }

    /// Unique name of the sink.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Destination writer, if one was supplied.
    #[must_use]
    pub const fn writer(&self) -> Option<&SinkWriter> {
        self.writer.as_ref()
    }

    /// Whether the sink receives records. Defaults to `true`.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    /// Accepted severities.
    #[must_use]
    pub const fn levels(&self) -> LevelSet {
        self.levels
    }

    /// Rendered caller details.
    #[must_use]
    pub const fn layout(&self) -> LayoutSet {
        self.layout
    }

    /// Output style. Defaults to [`Style::Text`].
    #[must_use]
    pub fn style(&self) -> Style {
        self.style.unwrap_or_default()
    }

    /// Whether labels are colored. Defaults to `false`.
    #[must_use]
    pub fn color(&self) -> bool {
        self.color.unwrap_or(false)
    }

    /// Whether the prefix is rendered. Defaults to `true`.
    #[must_use]
    pub fn show_prefix(&self) -> bool {
        self.show_prefix.unwrap_or(true)
    }

    /// Text separator. Defaults to [`DEFAULT_SEPARATOR`].
    #[must_use]
    pub fn separator(&self) -> &str {
        self.separator.as_deref().unwrap_or(DEFAULT_SEPARATOR)
    }

    /// Timestamp format. Defaults to [`DEFAULT_TIMESTAMP_FORMAT`].
    #[must_use]
    pub fn timestamp_format(&self) -> &str {
        self.timestamp_format
            .as_deref()
            .unwrap_or(DEFAULT_TIMESTAMP_FORMAT)
    }

    /// Level format. Defaults to [`DEFAULT_LEVEL_FORMAT`].
    #[must_use]
    pub fn level_format(&self) -> &str {
        self.level_format.as_deref().unwrap_or(DEFAULT_LEVEL_FORMAT)
    }

    /// Newline policy. Defaults to [`LineMode::WithNewline`].
    #[must_use]
    pub fn line_mode(&self) -> LineMode {
        self.line_mode.unwrap_or_default()
    }

    /// Replaces every unset option with its default.
    pub(crate) fn fill_defaults(&mut self) {
        self.enabled.get_or_insert(true);
        self.style.get_or_insert_with(Style::default);
        self.color.get_or_insert(false);
        self.show_prefix.get_or_insert(true);
        self.separator
            .get_or_insert_with(|| DEFAULT_SEPARATOR.to_owned());
        self.timestamp_format
            .get_or_insert_with(|| DEFAULT_TIMESTAMP_FORMAT.to_owned());
        self.level_format
            .get_or_insert_with(|| DEFAULT_LEVEL_FORMAT.to_owned());
        self.line_mode.get_or_insert_with(LineMode::default);
    }

    /// Overwrites options with every value `update` supplies.
    pub(crate) fn merge_from(&mut self, update: &Self) {
        if let Some(writer) = &update.writer {
            self.writer = Some(writer.clone());
        }
        if !update.levels.is_empty() {
            self.levels = update.levels;
        }
        if !update.layout.is_empty() {
            self.layout = update.layout;
        }
        merge_option(&mut self.enabled, update.enabled);
        merge_option(&mut self.style, update.style);
        merge_option(&mut self.color, update.color);
        merge_option(&mut self.show_prefix, update.show_prefix);
        merge_option(&mut self.separator, update.separator.clone());
        merge_option(&mut self.timestamp_format, update.timestamp_format.clone());
        merge_option(&mut self.level_format, update.level_format.clone());
        merge_option(&mut self.line_mode, update.line_mode);
    }

    /// Checks the descriptor. Registration also requires a writer.
    pub(crate) fn validate(&self, require_writer: bool) -> Result<(), RegistryError> {
        if self.name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if require_writer && self.writer.is_none() {
            return Err(RegistryError::MissingWriter {
                name: self.name.clone(),
            });
        }
        if !self.levels.is_valid() {
            return Err(RegistryError::InvalidLevels {
                name: self.name.clone(),
                source: CapabilityError::InvalidSet {
                    kind: Severity::KIND,
                    value: self.levels.bits(),
                },
            });
        }
        if !self.layout.is_valid() {
            return Err(RegistryError::InvalidLayout {
                name: self.name.clone(),
                source: CapabilityError::InvalidSet {
                    kind: Layout::KIND,
                    value: self.layout.bits(),
                },
            });
        }
        if let Some(format) = self.timestamp_format.as_deref() {
            validate_timestamp_format(format).map_err(|reason| {
                RegistryError::InvalidTimestampFormat {
                    name: self.name.clone(),
                    format: format.to_owned(),
                    reason,
                }
            })?;
        }
        Ok(())
    }
}

fn merge_option<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

fn validate_timestamp_format(format: &str) -> Result<(), String> {
    if format.is_empty() {
        return Ok(());
    }
    format_description::parse(format)
        .map(drop)
        .map_err(|error| error.to_string())
}
