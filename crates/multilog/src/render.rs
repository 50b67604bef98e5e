//! crates/multilog/src/render.rs
//! Turns one log call into the bytes a sink writes.
//!
//! Text records join the present elements with the sink's separator, each
//! element preceded by it:
//!
//! ```text
//! <sep>prefix<sep>LABEL<sep>timestamp<sep>path<sep>func:line<sep>0xaddr<sep>message\n
//! ```
//!
//! Elements that are disabled or empty are left out together with their
//! separator. JSON records always carry the same eight string-valued keys.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::{self, well_known::Rfc3339};

use crate::frame::Frame;
use crate::layout::Layout;
use crate::severity::Severity;
use crate::sink::{LEVEL_PLACEHOLDER, Sink, Style};

const ANSI_RESET: &str = "\x1b[0m";

/// Everything known about a log call at render time.
#[derive(Clone, Copy, Debug)]
pub struct RenderContext<'a> {
    /// Dispatcher prefix; may be empty.
    pub prefix: &'a str,
    /// Severity of the call.
    pub severity: Severity,
    /// Time the call was made.
    pub timestamp: OffsetDateTime,
    /// Resolved caller.
    pub frame: &'a Frame,
    /// Formatted user message.
    pub message: &'a str,
}

/// Structured record written by [`Style::Json`] sinks.
///
/// All values are strings so consumers can decode records without knowing
/// which layout options the sink had enabled.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Dispatcher prefix, or empty when the sink hides it.
    pub prefix: String,
    /// Lowercase severity name.
    pub level: String,
    /// Formatted timestamp, or empty when the sink omits it.
    pub timestamp: String,
    /// The user message.
    pub message: String,
    /// Full source path of the caller.
    pub file_path: String,
    /// Caller function name.
    pub func_name: String,
    /// Caller line number in decimal.
    pub line_number: String,
    /// Caller instruction address in `0x` hex.
    pub func_address: String,
}

impl Record {
    /// Builds the record for `ctx` as `sink` would write it.
    #[must_use]
    pub fn new(ctx: &RenderContext<'_>, sink: &Sink) -> Self {
        Self {
            prefix: if sink.show_prefix() {
                ctx.prefix.to_owned()
            } else {
                String::new()
            },
            level: ctx.severity.as_str().to_owned(),
            timestamp: format_timestamp(ctx.timestamp, sink.timestamp_format()),
            message: ctx.message.to_owned(),
            file_path: ctx.frame.file.clone(),
            func_name: ctx.frame.function.clone(),
            line_number: ctx.frame.line.to_string(),
            func_address: ctx.frame.address_hex(),
        }
    }
}

/// Renders `ctx` in the sink's style, applying its newline policy.
///
/// # Errors
///
/// Returns the serializer error if a JSON record cannot be encoded.
pub fn render(ctx: &RenderContext<'_>, sink: &Sink) -> Result<String, serde_json::Error> {
    match sink.style() {
        Style::Text => Ok(render_text(ctx, sink)),
        Style::Json => render_json(ctx, sink),
    }
}

/// Renders a separator-joined text record.
///
/// # Examples
///
/// ```
/// use multilog::render::{RenderContext, render_text};
/// use multilog::{Frame, Severity, Sink};
/// use time::macros::datetime;
///
/// let frame = Frame::unknown();
/// let sink = Sink::new("stdout").with_timestamp_format("");
/// let ctx = RenderContext {
///     prefix: "app",
///     severity: Severity::Warn,
///     timestamp: datetime!(2024-01-01 00:00 UTC),
///     frame: &frame,
///     message: "disk low",
/// };
/// assert_eq!(render_text(&ctx, &sink), " app WARN disk low\n");
/// ```
#[must_use]
pub fn render_text(ctx: &RenderContext<'_>, sink: &Sink) -> String {
    let separator = sink.separator();
    let layout = sink.layout();
    let frame = ctx.frame;
    let mut line = String::with_capacity(ctx.message.len() + 64);
    let mut push = |element: &str| {
        line.push_str(separator);
        line.push_str(element);
    };

    if sink.show_prefix() && !ctx.prefix.is_empty() {
        push(ctx.prefix);
    }

    push(&format_level(ctx.severity, sink.level_format(), sink.color()));

    let timestamp = format_timestamp(ctx.timestamp, sink.timestamp_format());
    if !timestamp.is_empty() {
        push(&timestamp);
    }

    if layout.contains(Layout::FullPath) {
        push(&frame.file);
    } else if layout.contains(Layout::ShortPath) {
        push(frame.short_file());
    }

    match (
        layout.contains(Layout::FuncName),
        layout.contains(Layout::LineNumber),
    ) {
        (true, true) => push(&format!("{}:{}", frame.function, frame.line)),
        (true, false) => push(&frame.function),
        (false, true) => push(&frame.line.to_string()),
        (false, false) => {}
    }

    if layout.contains(Layout::FuncAddress) {
        push(&frame.address_hex());
    }

    push(ctx.message);

    sink.line_mode().terminate(&mut line);
    line
}

/// Renders a single-line JSON record.
///
/// # Errors
///
/// Returns the serializer error if the record cannot be encoded.
pub fn render_json(ctx: &RenderContext<'_>, sink: &Sink) -> Result<String, serde_json::Error> {
    let mut line = serde_json::to_string(&Record::new(ctx, sink))?;
    sink.line_mode().terminate(&mut line);
    Ok(line)
}

/// Substitutes the severity label into `level_format`, optionally wrapped in
/// the severity's ANSI color.
#[must_use]
pub fn format_level(severity: Severity, level_format: &str, color: bool) -> String {
    let label = if color {
        format!("{}{}{ANSI_RESET}", severity.ansi_color(), severity.label())
    } else {
        severity.label().to_owned()
    };
    level_format.replace(LEVEL_PLACEHOLDER, &label)
}

/// Formats `timestamp` with a `time` format description.
///
/// An empty format yields an empty string. A format that fails to parse or
/// apply falls back to RFC 3339; registration rejects unparsable formats, so
/// the fallback only covers descriptors rendered directly.
#[must_use]
pub fn format_timestamp(timestamp: OffsetDateTime, format: &str) -> String {
    if format.is_empty() {
        return String::new();
    }
    format_description::parse(format)
        .ok()
        .and_then(|items| timestamp.format(&items[..]).ok())
        .or_else(|| timestamp.format(&Rfc3339).ok())
        .unwrap_or_default()
}
