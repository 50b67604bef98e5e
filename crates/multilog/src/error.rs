//! crates/multilog/src/error.rs
//! Errors reported by the sink registry and configuration loading.

use std::io;
use std::path::PathBuf;

use capability::CapabilityError;

/// Error returned when a registry mutation is rejected.
///
/// A rejected call never modifies the registry.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum RegistryError {
    /// A sink was supplied without a name.
    #[error("sink name must not be empty")]
    EmptyName,

    /// A sink was registered without a destination writer.
    #[error("sink {name:?} has no writer")]
    MissingWriter {
        /// Name of the offending sink.
        name: String,
    },

    /// Two sinks in one call share a name.
    #[error("sink {name:?} appears more than once")]
    DuplicateName {
        /// The repeated name.
        name: String,
    },

    /// An edit named a sink that is not registered.
    #[error("sink {name:?} is not registered")]
    SinkNotFound {
        /// The missing name.
        name: String,
    },

    /// The accepted-levels mask is out of range.
    #[error("sink {name:?} has invalid levels: {source}")]
    InvalidLevels {
        /// Name of the offending sink.
        name: String,
        /// The underlying validity failure.
        #[source]
        source: CapabilityError,
    },

    /// The layout mask is out of range.
    #[error("sink {name:?} has invalid layout: {source}")]
    InvalidLayout {
        /// Name of the offending sink.
        name: String,
        /// The underlying validity failure.
        #[source]
        source: CapabilityError,
    },

    /// The timestamp format is not a valid format description.
    #[error("sink {name:?} has invalid timestamp format {format:?}: {reason}")]
    InvalidTimestampFormat {
        /// Name of the offending sink.
        name: String,
        /// The rejected format string.
        format: String,
        /// Parser message.
        reason: String,
    },
}

impl RegistryError {
    /// Name of the sink the error refers to, if any.
    #[must_use]
    pub fn sink_name(&self) -> Option<&str> {
        match self {
            Self::EmptyName => None,
            Self::MissingWriter { name }
            | Self::DuplicateName { name }
            | Self::SinkNotFound { name }
            | Self::InvalidLevels { name, .. }
            | Self::InvalidLayout { name, .. }
            | Self::InvalidTimestampFormat { name, .. } => Some(name),
        }
    }
}

/// Error returned when a configuration cannot be turned into a dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A file destination could not be opened for appending.
    #[error("failed to open log file {}: {source}", path.display())]
    Open {
        /// The file that was requested.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// A destination string is not `stdout`, `stderr` or `file:<path>`.
    #[error("invalid destination {0:?}; expected \"stdout\", \"stderr\" or \"file:<path>\"")]
    InvalidDestination(String),

    /// A `key=value` sink option could not be applied.
    #[error("invalid sink option {token:?}: {reason}")]
    InvalidOption {
        /// The option as supplied.
        token: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The resulting sinks were rejected by the registry.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_quotes_sink_names() {
        let error = RegistryError::DuplicateName {
            name: "audit".to_owned(),
        };
        assert_eq!(error.to_string(), "sink \"audit\" appears more than once");
        assert_eq!(error.sink_name(), Some("audit"));
    }

    #[test]
    fn empty_name_has_no_sink() {
        assert_eq!(RegistryError::EmptyName.sink_name(), None);
    }

    #[test]
    fn capability_failure_is_the_source() {
        use std::error::Error as _;

        let error = RegistryError::InvalidLevels {
            name: "stdout".to_owned(),
            source: CapabilityError::InvalidSet {
                kind: "level",
                value: 0x80,
            },
        };
        let source = error.source().expect("source is set");
        assert_eq!(source.to_string(), "invalid level set: 0x80");
    }

    #[test]
    fn open_error_names_the_path() {
        let error = ConfigError::Open {
            path: PathBuf::from("/var/log/app.log"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert!(error.to_string().starts_with("failed to open log file /var/log/app.log: "));
    }

    #[test]
    fn registry_errors_convert_transparently() {
        let error = ConfigError::from(RegistryError::EmptyName);
        assert_eq!(error.to_string(), "sink name must not be empty");
    }
}
