//! crates/capability/src/error.rs
//! Errors reported by the flag algebra.

/// Error returned when a flag, set, or declaration violates the algebra's rules.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum CapabilityError {
    /// The value is not a single declared elementary flag.
    #[error("invalid {kind} flag: {value:#x}")]
    InvalidFlag {
        /// Domain of the flag, such as `level` or `layout`.
        kind: &'static str,
        /// The raw value that was rejected.
        value: u32,
    },

    /// The value has bits outside the declared range.
    #[error("invalid {kind} set: {value:#x}")]
    InvalidSet {
        /// Domain of the set.
        kind: &'static str,
        /// The raw value that was rejected.
        value: u32,
    },

    /// A textual token did not name any declared capability.
    #[error("unknown {kind} name: {name:?}")]
    UnknownName {
        /// Domain the token was parsed for.
        kind: &'static str,
        /// The token as supplied.
        name: String,
    },

    /// The enum implementing [`Capability`](crate::Capability) is not a
    /// contiguous run of single bits.
    #[error("invalid {kind} declaration: {reason}")]
    InvalidDeclaration {
        /// Domain of the declaration.
        kind: &'static str,
        /// What the check found.
        reason: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_flag_display_uses_hex() {
        let error = CapabilityError::InvalidFlag {
            kind: "level",
            value: 3,
        };
        assert_eq!(error.to_string(), "invalid level flag: 0x3");
    }

    #[test]
    fn unknown_name_display_quotes_token() {
        let error = CapabilityError::UnknownName {
            kind: "layout",
            name: "colour".to_owned(),
        };
        assert_eq!(error.to_string(), "unknown layout name: \"colour\"");
    }
}
