//! Integration tests for multi-sink fan-out.
//!
//! These tests verify that one call reaches every enabled sink whose level
//! set contains the call's severity, and nothing else.

use std::io;

use logging_sink::{MemoryBuffer, SinkWriter};
use multilog::{
    Dispatcher, FixedResolver, Frame, Layout, LayoutSet, LevelSet, LevelSetExt, Outcome, Severity,
    Sink, Style, error_log, info_log, warn_log,
};
use test_support::{CountingWriter, FailingWriter};

fn fixed_frame() -> Frame {
    Frame {
        file: "/srv/app/src/server.rs".to_owned(),
        function: "app::server::accept".to_owned(),
        line: 88,
        address: 0xbeef,
    }
}

fn text_sink(name: &str, buffer: &MemoryBuffer, levels: LevelSet) -> Sink {
    Sink::new(name)
        .with_writer(buffer.clone())
        .with_levels(levels)
        .with_timestamp_format("")
}

// ============================================================================
// Routing Tests
// ============================================================================

/// Verifies a text sink and a JSON sink each receive only their severities.
#[test]
fn text_and_json_sinks_split_by_severity() {
    let a = MemoryBuffer::new();
    let b = MemoryBuffer::new();
    let log = Dispatcher::new();
    log.register([
        text_sink("a", &a, LevelSet::from(Severity::Info) | Severity::Debug),
        Sink::new("b")
            .with_writer(b.clone())
            .with_levels(LevelSet::from(Severity::Error) | Severity::Fatal)
            .with_style(Style::Json),
    ])
    .unwrap();

    info_log!(log, "started");
    error_log!(log, "boom {}", 7);
    warn_log!(log, "unrouted");

    assert_eq!(a.lines(), [" INFO started"]);

    let lines = b.lines();
    assert_eq!(lines.len(), 1);
    let record: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(record["message"], "boom 7");
    assert_eq!(record["level"], "error");
}

/// Verifies level sets are arbitrary subsets rather than thresholds.
#[test]
fn level_sets_are_not_thresholds() {
    let buffer = MemoryBuffer::new();
    let log = Dispatcher::new();
    log.register([text_sink(
        "gaps",
        &buffer,
        LevelSet::from(Severity::Error) | Severity::Debug,
    )])
    .unwrap();

    log.error(format_args!("e"));
    log.warn(format_args!("w"));
    log.info(format_args!("i"));
    log.debug(format_args!("d"));

    assert_eq!(buffer.lines(), [" ERROR e", " DEBUG d"]);
}

/// Verifies a warning reaches a sink listing warn and skips an error-only sink.
#[test]
fn warn_reaches_only_sinks_that_list_it() {
    let broad = MemoryBuffer::new();
    let errors_only = MemoryBuffer::new();
    let log = Dispatcher::new();
    log.register([
        text_sink(
            "broad",
            &broad,
            LevelSet::from(Severity::Info) | Severity::Warn | Severity::Error,
        ),
        text_sink("errors-only", &errors_only, LevelSet::from(Severity::Error)),
    ])
    .unwrap();

    warn_log!(log, "disk {}% full", 91);

    assert_eq!(broad.lines(), [" WARN disk 91% full"]);
    assert!(errors_only.is_empty());
}

/// Verifies a sink with an empty level set receives nothing.
#[test]
fn empty_level_set_receives_nothing() {
    let buffer = MemoryBuffer::new();
    let log = Dispatcher::new();
    log.register([text_sink("none", &buffer, LevelSet::empty())])
        .unwrap();

    log.error(format_args!("e"));
    log.trace(format_args!("t"));

    assert!(buffer.is_empty());
}

/// Verifies disabling a sink through an edit stops delivery to it.
#[test]
fn disabled_sink_is_skipped_until_reenabled() {
    let buffer = MemoryBuffer::new();
    let log = Dispatcher::new();
    log.register([text_sink("a", &buffer, LevelSet::full())])
        .unwrap();

    log.edit([Sink::new("a").with_enabled(false)]).unwrap();
    log.info(format_args!("hidden"));
    log.edit([Sink::new("a").with_enabled(true)]).unwrap();
    log.info(format_args!("shown"));

    assert_eq!(buffer.lines(), [" INFO shown"]);
}

/// Verifies a dispatcher with no sinks accepts non-diverging calls.
#[test]
fn no_sinks_is_not_an_error() {
    let log = Dispatcher::new();
    log.error(format_args!("nowhere"));
    log.trace(format_args!("nowhere"));
}

// ============================================================================
// Failure Isolation Tests
// ============================================================================

/// Verifies a failing destination does not stop delivery to later sinks.
#[test]
fn failing_sink_does_not_block_others() {
    let good = MemoryBuffer::new();
    let log = Dispatcher::new();
    log.register([
        Sink::new("a-broken")
            .with_writer(SinkWriter::with_label(
                "broken",
                FailingWriter::new(io::ErrorKind::BrokenPipe),
            ))
            .with_levels(LevelSet::full()),
        text_sink("b-good", &good, LevelSet::full()),
    ])
    .unwrap();

    log.error(format_args!("still delivered"));

    assert_eq!(good.lines(), [" ERROR still delivered"]);
}

/// Verifies each accepting sink receives exactly one record per call.
#[test]
fn one_record_per_sink_per_call() {
    let counter = CountingWriter::new();
    let log = Dispatcher::new();
    log.register([Sink::new("count")
        .with_writer(SinkWriter::new(counter.clone()))
        .with_levels(LevelSet::at_least(Severity::Warn))])
    .unwrap();

    for _ in 0..5 {
        log.warn(format_args!("w"));
        log.info(format_args!("filtered"));
    }

    assert_eq!(counter.records(), 5);
}

/// Verifies two sinks sharing one destination each write their own record.
#[test]
fn shared_destination_receives_both_records() {
    let buffer = MemoryBuffer::new();
    let writer = SinkWriter::from(buffer.clone());
    let log = Dispatcher::new();
    log.register([
        Sink::new("one")
            .with_writer(writer.clone())
            .with_levels(LevelSet::full())
            .with_timestamp_format("")
            .with_show_prefix(false),
        Sink::new("two")
            .with_writer(writer)
            .with_levels(LevelSet::full())
            .with_timestamp_format("")
            .with_level_format("<{level}>"),
    ])
    .unwrap();

    log.info(format_args!("x"));

    assert_eq!(buffer.lines(), [" INFO x", " <INFO> x"]);
}

// ============================================================================
// Prefix and Layout Tests
// ============================================================================

/// Verifies the prefix is rendered only by sinks that show it.
#[test]
fn prefix_visibility_is_per_sink() {
    let shown = MemoryBuffer::new();
    let hidden = MemoryBuffer::new();
    let log = Dispatcher::new();
    log.set_prefix("worker-3");
    log.register([
        text_sink("shown", &shown, LevelSet::full()),
        text_sink("hidden", &hidden, LevelSet::full()).with_show_prefix(false),
    ])
    .unwrap();

    log.info(format_args!("tick"));

    assert_eq!(shown.lines(), [" worker-3 INFO tick"]);
    assert_eq!(hidden.lines(), [" INFO tick"]);
}

/// Verifies layout elements come from the configured resolver.
#[test]
fn layout_uses_resolved_frame() {
    let buffer = MemoryBuffer::new();
    let log = Dispatcher::new().with_resolver(FixedResolver::new(fixed_frame()));
    log.register([text_sink("a", &buffer, LevelSet::full()).with_layout(
        LayoutSet::from(Layout::ShortPath) | Layout::FuncName | Layout::LineNumber,
    )])
    .unwrap();

    log.warn(format_args!("slow client"));

    assert_eq!(
        buffer.lines(),
        [" WARN server.rs app::server::accept:88 slow client"]
    );
}

/// Verifies a supplied frame is rendered and the resolver is bypassed.
#[test]
fn dispatch_from_uses_supplied_frame() {
    let buffer = MemoryBuffer::new();
    let log = Dispatcher::new().with_resolver(FixedResolver::new(fixed_frame()));
    log.register([text_sink("a", &buffer, LevelSet::full())
        .with_layout(LayoutSet::from(Layout::ShortPath) | Layout::LineNumber)])
    .unwrap();

    let supplied = Frame {
        file: "/srv/app/src/pool.rs".to_owned(),
        line: 12,
        ..Frame::unknown()
    };
    let outcome = log.dispatch_from(Severity::Error, &supplied, format_args!("drained"));

    assert_eq!(outcome, Outcome::Continue);
    assert_eq!(buffer.lines(), [" ERROR pool.rs 12 drained"]);
}

/// Verifies full path wins over short path when both are enabled.
#[test]
fn full_path_takes_precedence() {
    let buffer = MemoryBuffer::new();
    let log = Dispatcher::new().with_resolver(FixedResolver::new(fixed_frame()));
    log.register([text_sink("a", &buffer, LevelSet::full())
        .with_layout(LayoutSet::from(Layout::FullPath) | Layout::ShortPath | Layout::FuncAddress)])
    .unwrap();

    log.info(format_args!("m"));

    assert_eq!(buffer.lines(), [" INFO /srv/app/src/server.rs 0xbeef m"]);
}

/// Verifies the default timestamp renders as a date and time.
#[test]
fn default_timestamp_has_date_and_time() {
    let buffer = MemoryBuffer::new();
    let log = Dispatcher::new();
    log.register([Sink::new("a")
        .with_writer(buffer.clone())
        .with_levels(LevelSet::full())
        .with_show_prefix(false)])
    .unwrap();

    log.info(format_args!("m"));

    let line = &buffer.lines()[0];
    let parts: Vec<&str> = line.split(' ').collect();
    // ["", "INFO", "YYYY-MM-DD", "HH:MM:SS", "m"]
    assert_eq!(parts.len(), 5);
    assert_eq!(parts[2].len(), 10);
    assert_eq!(parts[3].len(), 8);
    assert_eq!(parts[4], "m");
}
