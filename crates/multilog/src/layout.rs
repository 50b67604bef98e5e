//! crates/multilog/src/layout.rs
//! Caller-frame elements a plain-text sink can include in each line.

use capability::{Capability, CapabilitySet};

/// One optional element of a plain-text line.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[repr(u32)]
pub enum Layout {
    /// The caller's full source path.
    FullPath = 1,
    /// The final component of the caller's source path.
    ShortPath = 2,
    /// The caller's function name.
    FuncName = 4,
    /// The caller's function address in hexadecimal.
    FuncAddress = 8,
    /// The caller's line number.
    LineNumber = 16,
}

/// Set of layout elements rendered by a plain-text sink.
pub type LayoutSet = CapabilitySet<Layout>;

impl Capability for Layout {
    const KIND: &'static str = "layout";
    const ALL: &'static [Self] = &[
        Self::FullPath,
        Self::ShortPath,
        Self::FuncName,
        Self::FuncAddress,
        Self::LineNumber,
    ];

    fn bits(self) -> u32 {
        self as u32
    }

    fn name(self) -> &'static str {
        match self {
            Self::FullPath => "fullpath",
            Self::ShortPath => "shortpath",
            Self::FuncName => "funcname",
            Self::FuncAddress => "funcaddress",
            Self::LineNumber => "linenumber",
        }
    }
}
