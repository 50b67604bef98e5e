//! Integration tests for panic and fatal side effects.
//!
//! Panic-severity calls must always unwind with the message as a `String`
//! payload; fatal-severity calls must run the exit hook exactly once when
//! the exit code is positive.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use logging_sink::MemoryBuffer;
use multilog::{Dispatcher, LevelSet, Outcome, Severity, Sink, fatal_log, panic_log};

fn recording_dispatcher() -> (Dispatcher, Arc<Mutex<Vec<i32>>>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&calls);
    let log = Dispatcher::new().with_exit_hook(move |code| {
        seen.lock().unwrap().push(code);
    });
    (log, calls)
}

fn panic_payload(f: impl FnOnce()) -> String {
    let error = panic::catch_unwind(AssertUnwindSafe(f)).expect_err("call must unwind");
    match error.downcast::<String>() {
        Ok(message) => *message,
        Err(_) => panic!("payload is not a String"),
    }
}

// ============================================================================
// Panic Tests
// ============================================================================

/// Verifies the panic payload is the formatted message.
#[test]
fn panic_unwinds_with_message() {
    let buffer = MemoryBuffer::new();
    let log = Dispatcher::new();
    log.register([Sink::new("a")
        .with_writer(buffer.clone())
        .with_levels(LevelSet::full())
        .with_timestamp_format("")])
    .unwrap();

    let payload = panic_payload(|| panic_log!(log, "corrupt index {}", 12));

    assert_eq!(payload, "corrupt index 12");
    assert_eq!(buffer.lines(), [" PANIC corrupt index 12"]);
}

/// Verifies panic unwinds even with no sinks registered.
#[test]
fn panic_without_sinks_still_unwinds() {
    let log = Dispatcher::new();
    assert_eq!(panic_payload(|| log.panic(format_args!("alone"))), "alone");
}

/// Verifies panic unwinds when every sink is disabled or filters it out.
#[test]
fn panic_with_no_accepting_sink_still_unwinds() {
    let buffer = MemoryBuffer::new();
    let log = Dispatcher::new();
    log.register([
        Sink::new("off")
            .with_writer(buffer.clone())
            .with_levels(LevelSet::full())
            .with_enabled(false),
        Sink::new("info-only")
            .with_writer(buffer.clone())
            .with_levels(Severity::Info.into()),
    ])
    .unwrap();

    assert_eq!(panic_payload(|| log.panic(format_args!("x"))), "x");
    assert!(buffer.is_empty());
}

/// Verifies the dispatcher stays usable after a panic call unwinds.
#[test]
fn dispatcher_survives_unwinding() {
    let buffer = MemoryBuffer::new();
    let log = Dispatcher::new();
    log.register([Sink::new("a")
        .with_writer(buffer.clone())
        .with_levels(LevelSet::full())
        .with_timestamp_format("")])
    .unwrap();

    let _ = panic_payload(|| log.panic(format_args!("first")));
    log.info(format_args!("after"));

    assert_eq!(buffer.lines(), [" PANIC first", " INFO after"]);
}

// ============================================================================
// Fatal Tests
// ============================================================================

/// Verifies the exit hook runs once with the configured code.
#[test]
fn fatal_runs_exit_hook_once() {
    let (log, calls) = recording_dispatcher();
    log.set_exit_code(4);

    fatal_log!(log, "cannot continue");

    assert_eq!(*calls.lock().unwrap(), [4]);
}

/// Verifies the record is written before the exit hook runs.
#[test]
fn fatal_writes_before_exiting() {
    let buffer = MemoryBuffer::new();
    let observed = Arc::new(Mutex::new(String::new()));
    let probe = buffer.clone();
    let sink_view = Arc::clone(&observed);
    let log = Dispatcher::new().with_exit_hook(move |_| {
        *sink_view.lock().unwrap() = probe.to_string_lossy();
    });
    log.register([Sink::new("a")
        .with_writer(buffer.clone())
        .with_levels(Severity::Fatal.into())
        .with_timestamp_format("")])
    .unwrap();

    log.fatal(format_args!("last words"));

    assert_eq!(*observed.lock().unwrap(), " FATAL last words\n");
}

/// Verifies fatal runs the exit hook even with no sinks.
#[test]
fn fatal_without_sinks_still_exits() {
    let (log, calls) = recording_dispatcher();
    log.fatal(format_args!("x"));
    assert_eq!(*calls.lock().unwrap(), [1]);
}

/// Verifies non-positive exit codes make fatal return normally.
#[test]
fn fatal_with_non_positive_code_returns() {
    for code in [0, -1, i32::MIN] {
        let (log, calls) = recording_dispatcher();
        log.set_exit_code(code);
        log.fatal(format_args!("soft"));
        assert!(calls.lock().unwrap().is_empty());
        assert_eq!(
            log.dispatch(Severity::Fatal, format_args!("soft")),
            Outcome::Continue
        );
    }
}

/// Verifies ordinary severities never invoke the exit hook.
#[test]
fn ordinary_severities_have_no_side_effect() {
    let (log, calls) = recording_dispatcher();
    for severity in [
        Severity::Error,
        Severity::Warn,
        Severity::Info,
        Severity::Debug,
        Severity::Trace,
    ] {
        assert_eq!(log.dispatch(severity, format_args!("m")), Outcome::Continue);
        log.log(severity, format_args!("m"));
    }
    assert!(calls.lock().unwrap().is_empty());
}

/// Verifies outcomes can be applied with any exit function.
#[test]
fn outcome_apply_uses_given_exit() {
    let seen = Mutex::new(None);
    Outcome::Abort(9).apply(&|code| *seen.lock().unwrap() = Some(code));
    assert_eq!(*seen.lock().unwrap(), Some(9));

    Outcome::Continue.apply(&|_| panic!("continue must not exit"));
}
