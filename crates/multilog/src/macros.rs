//! crates/multilog/src/macros.rs
//! Formatting macros for the dispatcher's severity methods.
//!
//! Each macro takes the dispatcher expression followed by `format!`-style
//! arguments and calls the matching method, so the caller frame lands at the
//! default skip depth.

/// Logs at panic severity, then unwinds with the message as payload.
///
/// # Example
/// ```should_panic
/// use multilog::{Dispatcher, panic_log};
///
/// let log = Dispatcher::new();
/// panic_log!(log, "invariant broken: {}", 42);
/// ```
#[macro_export]
macro_rules! panic_log {
    ($log:expr, $($arg:tt)+) => {
        $log.panic(::std::format_args!($($arg)+))
    };
}

/// Logs at fatal severity, then runs the exit hook if the exit code is
/// positive.
///
/// # Example
/// ```ignore
/// fatal_log!(log, "cannot bind {}", addr);
/// ```
#[macro_export]
macro_rules! fatal_log {
    ($log:expr, $($arg:tt)+) => {
        $log.fatal(::std::format_args!($($arg)+))
    };
}

/// Logs at error severity.
///
/// # Example
/// ```ignore
/// error_log!(log, "request {} failed", id);
/// ```
#[macro_export]
macro_rules! error_log {
    ($log:expr, $($arg:tt)+) => {
        $log.error(::std::format_args!($($arg)+))
    };
}

/// Logs at warn severity.
///
/// # Example
/// ```ignore
/// warn_log!(log, "retrying in {}s", delay);
/// ```
#[macro_export]
macro_rules! warn_log {
    ($log:expr, $($arg:tt)+) => {
        $log.warn(::std::format_args!($($arg)+))
    };
}

/// Logs at info severity.
///
/// # Example
/// ```ignore
/// info_log!(log, "listening on {}", addr);
/// ```
#[macro_export]
macro_rules! info_log {
    ($log:expr, $($arg:tt)+) => {
        $log.info(::std::format_args!($($arg)+))
    };
}

/// Logs at debug severity.
///
/// # Example
/// ```ignore
/// debug_log!(log, "cache hit for {}", key);
/// ```
#[macro_export]
macro_rules! debug_log {
    ($log:expr, $($arg:tt)+) => {
        $log.debug(::std::format_args!($($arg)+))
    };
}

/// Logs at trace severity.
///
/// # Example
/// ```ignore
/// trace_log!(log, "frame {} decoded", seq);
/// ```
#[macro_export]
macro_rules! trace_log {
    ($log:expr, $($arg:tt)+) => {
        $log.trace(::std::format_args!($($arg)+))
    };
}

#[cfg(test)]
mod tests {
    use crate::{Dispatcher, LevelSet, Sink};
    use logging_sink::MemoryBuffer;

    #[test]
    fn macros_route_to_matching_severity() {
        let buffer = MemoryBuffer::new();
        let log = Dispatcher::new();
        log.register([Sink::new("mem")
            .with_writer(buffer.clone())
            .with_levels(LevelSet::full())
            .with_timestamp_format("")])
            .unwrap();

        error_log!(log, "e{}", 1);
        warn_log!(log, "w");
        info_log!(log, "i {} {}", "a", 2);
        debug_log!(&log, "d");
        trace_log!(log, "t");

        assert_eq!(
            buffer.lines(),
            [" ERROR e1", " WARN w", " INFO i a 2", " DEBUG d", " TRACE t"]
        );
    }
}
