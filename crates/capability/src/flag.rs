//! crates/capability/src/flag.rs
//! Elementary capabilities and the raw single-flag value.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::error::CapabilityError;

/// A domain of elementary capabilities.
///
/// Implementors are `#[repr(u32)]` enums whose explicit discriminants are
/// `1, 2, 4, ...` in declaration order. The compiler already rejects two
/// variants sharing a discriminant; [`check_declaration`] verifies the
/// remaining shape (single bits, contiguous from bit zero).
pub trait Capability: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Domain name used in error messages.
    const KIND: &'static str;

    /// Every elementary capability, lowest bit first.
    const ALL: &'static [Self];

    /// The single bit representing this capability.
    fn bits(self) -> u32;

    /// Lowercase token used when parsing and displaying sets.
    fn name(self) -> &'static str;

    /// Looks up a capability by its token, ignoring ASCII case.
    fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|capability| capability.name().eq_ignore_ascii_case(name))
    }

    /// Looks up the capability whose bit equals `bits`.
    fn from_bits(bits: u32) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|capability| capability.bits() == bits)
    }
}

/// Number of declared capabilities, capped to the width of the backing integer.
pub(crate) fn declared_count<C: Capability>() -> u32 {
    (C::ALL.len() as u32).min(u32::BITS)
}

/// The largest valid elementary value, `2^(k-1)`.
pub(crate) fn max_flag_bits<C: Capability>() -> u32 {
    match declared_count::<C>() {
        0 => 0,
        k => 1 << (k - 1),
    }
}

/// The union of every declared capability, `2^k - 1`.
pub(crate) fn full_bits<C: Capability>() -> u32 {
    match declared_count::<C>() {
        0 => 0,
        k => u32::MAX >> (u32::BITS - k),
    }
}

/// Verifies that `C` is a contiguous run of single-bit values.
///
/// Run this from a unit test next to every [`Capability`] implementation:
/// a declaration that places two variants on the same bit or skips a bit
/// would otherwise only surface as confusing runtime answers.
pub fn check_declaration<C: Capability>() -> Result<(), CapabilityError> {
    let invalid = |reason| CapabilityError::InvalidDeclaration {
        kind: C::KIND,
        reason,
    };

    if C::ALL.is_empty() {
        return Err(invalid("no capabilities declared"));
    }
    if C::ALL.len() > u32::BITS as usize {
        return Err(invalid("more capabilities than bits in u32"));
    }

    for (index, capability) in C::ALL.iter().enumerate() {
        let bits = capability.bits();
        if bits.count_ones() != 1 {
            return Err(invalid("capability is not a single bit"));
        }
        if bits != 1 << index {
            return Err(invalid("capabilities are not contiguous in declaration order"));
        }
    }

    Ok(())
}

/// A raw elementary value in the domain `C`.
///
/// Flags built from `C` are always valid. [`Flag::from_bits`] accepts any
/// integer so callers holding untrusted values (configuration, FFI, wire
/// data) can have them rejected by the set operations instead of silently
/// truncated.
pub struct Flag<C> {
    bits: u32,
    _domain: PhantomData<fn() -> C>,
}

impl<C> Flag<C> {
    /// The "no capability" sentinel.
    pub const NONE: Self = Self::from_bits(0);

    /// Wraps a raw value without validating it.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self {
            bits,
            _domain: PhantomData,
        }
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.bits
    }

    /// Reports whether this is the [`NONE`](Self::NONE) sentinel.
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.bits == 0
    }
}

impl<C: Capability> Flag<C> {
    /// Builds the flag for a declared capability.
    #[must_use]
    pub fn new(capability: C) -> Self {
        Self::from_bits(capability.bits())
    }

    /// Reports whether exactly one bit is set and it lies within the declared range.
    #[must_use]
    pub fn is_valid(self) -> bool {
        self.bits.count_ones() == 1 && self.bits <= max_flag_bits::<C>()
    }

    /// Returns the declared capability this flag names, if any.
    #[must_use]
    pub fn capability(self) -> Option<C> {
        C::from_bits(self.bits)
    }

    pub(crate) fn checked_bits(self) -> Result<u32, CapabilityError> {
        if self.is_valid() {
            Ok(self.bits)
        } else {
            Err(CapabilityError::InvalidFlag {
                kind: C::KIND,
                value: self.bits,
            })
        }
    }
}

impl<C: Capability> From<C> for Flag<C> {
    fn from(capability: C) -> Self {
        Self::new(capability)
    }
}

impl<C> Clone for Flag<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Flag<C> {}

impl<C> PartialEq for Flag<C> {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl<C> Eq for Flag<C> {}

impl<C> Hash for Flag<C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits.hash(state);
    }
}

impl<C: Capability> fmt::Debug for Flag<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.capability() {
            Some(capability) => write!(f, "Flag({}:{})", C::KIND, capability.name()),
            None if self.is_none() => write!(f, "Flag({}:none)", C::KIND),
            None => write!(f, "Flag({}:{:#x})", C::KIND, self.bits),
        }
    }
}
