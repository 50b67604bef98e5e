//! Integration tests for registry mutations through a dispatcher.
//!
//! Every rejected register or edit must leave the registry exactly as it
//! was; these tests compare full snapshots before and after.

use logging_sink::MemoryBuffer;
use multilog::{
    Dispatcher, Layout, LayoutSet, LevelSet, RegistryError, Severity, Sink, Style,
};
use proptest::prelude::*;

fn sink(name: &str) -> Sink {
    Sink::new(name).with_writer(MemoryBuffer::new())
}

fn seeded() -> Dispatcher {
    let log = Dispatcher::new();
    log.register([sink("alpha"), sink("beta")]).unwrap();
    log
}

// ============================================================================
// Register Tests
// ============================================================================

/// Verifies a duplicate within one batch rejects the whole batch.
#[test]
fn duplicate_in_batch_rejects_all() {
    let log = seeded();
    let before = log.snapshot();

    let result = log.register([sink("gamma"), sink("delta"), sink("gamma")]);

    assert_eq!(
        result,
        Err(RegistryError::DuplicateName {
            name: "gamma".to_owned()
        })
    );
    assert_eq!(*log.snapshot(), *before);
}

/// Verifies a successful register replaces the registry instead of merging.
#[test]
fn register_replaces_whole_registry() {
    let log = seeded();

    log.register([sink("gamma")]).unwrap();

    let names: Vec<String> = log.list().iter().map(|s| s.name().to_owned()).collect();
    assert_eq!(names, ["gamma"]);
}

/// Verifies a name from the previous registry may be registered again.
#[test]
fn existing_name_is_accepted() {
    let log = seeded();
    log.register([sink("beta").with_style(Style::Json)]).unwrap();

    let sinks = log.list();
    assert_eq!(sinks.len(), 1);
    assert_eq!(sinks[0].name(), "beta");
    assert_eq!(sinks[0].style(), Style::Json);
}

/// Verifies an empty batch clears the registry.
#[test]
fn empty_register_clears_registry() {
    let log = seeded();
    log.register(Vec::<Sink>::new()).unwrap();
    assert!(log.list().is_empty());
}

/// Verifies each validation failure leaves the registry untouched.
#[test]
fn invalid_descriptors_leave_registry_unchanged() {
    let log = seeded();
    let before = log.snapshot();

    let failures = [
        log.register([sink("ok"), Sink::new("")]),
        log.register([sink("ok"), Sink::new("no-writer")]),
        log.register([sink("ok"), sink("bad-levels").with_levels(LevelSet::from_bits(0x100))]),
        log.register([sink("ok"), sink("bad-layout").with_layout(LayoutSet::from_bits(0x20))]),
        log.register([sink("ok"), sink("bad-ts").with_timestamp_format("[hour")]),
    ];

    assert!(failures.iter().all(Result::is_err));
    assert_eq!(*log.snapshot(), *before);
    assert!(log.get(["ok"]).is_empty());
}

// ============================================================================
// Edit Tests
// ============================================================================

/// Verifies an unknown name anywhere in an edit batch aborts every update.
#[test]
fn edit_with_unknown_name_changes_nothing() {
    let log = seeded();
    let before = log.snapshot();

    let result = log.edit([
        Sink::new("alpha").with_style(Style::Json),
        Sink::new("missing").with_enabled(false),
    ]);

    assert_eq!(
        result,
        Err(RegistryError::SinkNotFound {
            name: "missing".to_owned()
        })
    );
    assert_eq!(*log.snapshot(), *before);
    assert_eq!(log.get(["alpha"])[0].style(), Style::Text);
}

/// Verifies an invalid option in a later update aborts earlier ones.
#[test]
fn edit_with_invalid_option_changes_nothing() {
    let log = seeded();
    let before = log.snapshot();

    let result = log.edit([
        Sink::new("alpha").with_color(true),
        Sink::new("beta").with_timestamp_format("[nonsense]"),
    ]);

    assert!(matches!(
        result,
        Err(RegistryError::InvalidTimestampFormat { .. })
    ));
    assert_eq!(*log.snapshot(), *before);
}

/// Verifies an edit only changes the fields it supplies.
#[test]
fn edit_is_partial() {
    let log = Dispatcher::new();
    log.register([sink("a")
        .with_levels(LevelSet::from(Severity::Warn))
        .with_separator(" | ")])
    .unwrap();

    log.edit([Sink::new("a").with_layout(Layout::LineNumber.into())])
        .unwrap();

    let stored = &log.get(["a"])[0];
    assert_eq!(stored.levels(), LevelSet::from(Severity::Warn));
    assert_eq!(stored.separator(), " | ");
    assert_eq!(stored.layout(), LayoutSet::from(Layout::LineNumber));
}

/// Verifies an edit can swap a sink's writer.
#[test]
fn edit_replaces_writer() {
    let first = MemoryBuffer::new();
    let second = MemoryBuffer::new();
    let log = Dispatcher::new();
    log.register([Sink::new("a")
        .with_writer(first.clone())
        .with_levels(LevelSet::full())
        .with_timestamp_format("")])
    .unwrap();

    log.info(format_args!("one"));
    log.edit([Sink::new("a").with_writer(second.clone())]).unwrap();
    log.info(format_args!("two"));

    assert_eq!(first.lines(), [" INFO one"]);
    assert_eq!(second.lines(), [" INFO two"]);
}

// ============================================================================
// Query Tests
// ============================================================================

/// Verifies list is sorted and get follows request order.
#[test]
fn list_is_sorted_and_get_is_ordered() {
    let log = Dispatcher::new();
    log.register([sink("zeta"), sink("eta"), sink("theta")])
        .unwrap();

    let listed: Vec<String> = log.list().iter().map(|s| s.name().to_owned()).collect();
    assert_eq!(listed, ["eta", "theta", "zeta"]);

    let got: Vec<String> = log
        .get(["zeta", "unknown", "eta"])
        .iter()
        .map(|s| s.name().to_owned())
        .collect();
    assert_eq!(got, ["zeta", "eta"]);
}

/// Verifies delete reports how many sinks existed.
#[test]
fn delete_counts_removed_sinks() {
    let log = seeded();
    assert_eq!(log.delete(["alpha", "alpha", "nope"]), 1);
    assert_eq!(log.delete(Vec::<String>::new()), 0);
    assert_eq!(log.list().len(), 1);
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Any batch containing one invalid entry leaves the registry unchanged.
    #[test]
    fn rejected_batches_never_partially_apply(
        valid in proptest::collection::vec("[a-z]{1,8}", 0..6),
        bad_position in 0usize..6,
    ) {
        let log = seeded();
        let before = log.snapshot();

        let mut batch: Vec<Sink> = valid.iter().map(|name| sink(&format!("new-{name}"))).collect();
        let position = bad_position.min(batch.len());
        batch.insert(position, Sink::new("missing-writer"));

        prop_assert!(log.register(batch).is_err());
        prop_assert_eq!(&*log.snapshot(), &*before);
    }
}
