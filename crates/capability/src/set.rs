//! crates/capability/src/set.rs
//! Bitmask over a capability domain and its query/mutation algebra.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

use crate::error::CapabilityError;
use crate::flag::{Capability, Flag, full_bits};

/// Zero or more capabilities of domain `C` combined by bitwise OR.
///
/// The value is stored raw so out-of-range masks coming from outside the
/// program can be represented and reported by [`is_valid`](Self::is_valid)
/// and the fallible operations.
pub struct CapabilitySet<C> {
    bits: u32,
    _domain: PhantomData<fn() -> C>,
}

impl<C> CapabilitySet<C> {
    /// Wraps a raw mask without validating it.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self {
            bits,
            _domain: PhantomData,
        }
    }

    /// The empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self::from_bits(0)
    }

    /// Returns the raw mask.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.bits
    }

    /// Reports whether no capability is present.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }
}

impl<C: Capability> CapabilitySet<C> {
    /// The set containing every declared capability.
    #[must_use]
    pub fn full() -> Self {
        Self::from_bits(full_bits::<C>())
    }

    /// Reports whether the mask lies within `0..=2^k - 1`.
    #[must_use]
    pub fn is_valid(self) -> bool {
        self.bits <= full_bits::<C>()
    }

    /// Infallible membership test for a declared capability.
    #[must_use]
    pub fn contains(self, capability: C) -> bool {
        self.bits & capability.bits() != 0
    }

    /// Returns a copy of the set with `capability` added.
    #[must_use]
    pub fn with(self, capability: C) -> Self {
        Self::from_bits(self.bits | capability.bits())
    }

    /// Returns a copy of the set with `capability` removed.
    #[must_use]
    pub fn without(self, capability: C) -> Self {
        Self::from_bits(self.bits & !capability.bits())
    }

    /// Reports whether the set contains `flag`.
    ///
    /// [`Flag::NONE`] always yields `false`. Any other invalid flag fails with
    /// [`CapabilityError::InvalidFlag`]; an out-of-range set fails with
    /// [`CapabilityError::InvalidSet`].
    pub fn has(self, flag: impl Into<Flag<C>>) -> Result<bool, CapabilityError> {
        let flag = flag.into();
        if flag.is_none() {
            return Ok(false);
        }
        let bits = flag.checked_bits()?;
        self.checked()?;
        Ok(self.bits & bits != 0)
    }

    /// Replaces the set with the union of `flags`.
    ///
    /// Duplicates are ignored. On the first invalid flag the call fails and
    /// the set keeps its previous value.
    pub fn set<I, F>(&mut self, flags: I) -> Result<(), CapabilityError>
    where
        I: IntoIterator<Item = F>,
        F: Into<Flag<C>>,
    {
        self.bits = union_of(flags)?;
        Ok(())
    }

    /// Adds every flag in `flags` to the set, atomically.
    pub fn add<I, F>(&mut self, flags: I) -> Result<(), CapabilityError>
    where
        I: IntoIterator<Item = F>,
        F: Into<Flag<C>>,
    {
        let union = union_of(flags)?;
        self.checked()?;
        self.bits |= union;
        Ok(())
    }

    /// Removes every flag in `flags` from the set, atomically.
    pub fn delete<I, F>(&mut self, flags: I) -> Result<(), CapabilityError>
    where
        I: IntoIterator<Item = F>,
        F: Into<Flag<C>>,
    {
        let union = union_of(flags)?;
        self.checked()?;
        self.bits &= !union;
        Ok(())
    }

    /// Reports whether every flag is present.
    ///
    /// Stops at the first missing flag or the first error. An empty list is
    /// vacuously `true`.
    pub fn all<I, F>(self, flags: I) -> Result<bool, CapabilityError>
    where
        I: IntoIterator<Item = F>,
        F: Into<Flag<C>>,
    {
        for flag in flags {
            if !self.has(flag)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Reports whether at least one flag is present.
    ///
    /// Stops at the first present flag or the first error. An empty list is
    /// `false`.
    pub fn any<I, F>(self, flags: I) -> Result<bool, CapabilityError>
    where
        I: IntoIterator<Item = F>,
        F: Into<Flag<C>>,
    {
        for flag in flags {
            if self.has(flag)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Iterates the declared capabilities present in the set, lowest bit first.
    pub fn iter(self) -> Iter<C> {
        Iter {
            bits: self.bits,
            index: 0,
            _domain: PhantomData,
        }
    }

    /// Parses a list of capability names separated by `,` or `|`.
    ///
    /// The tokens `all` and `none` stand for the full and the empty set.
    /// Whitespace around tokens is ignored and an empty string parses to the
    /// empty set.
    pub fn parse_list(input: &str) -> Result<Self, CapabilityError> {
        let mut bits = 0;
        for token in input.split([',', '|']).map(str::trim) {
            if token.is_empty() || token.eq_ignore_ascii_case("none") {
                continue;
            }
            if token.eq_ignore_ascii_case("all") {
                bits |= full_bits::<C>();
                continue;
            }
            let capability = C::from_name(token).ok_or_else(|| CapabilityError::UnknownName {
                kind: C::KIND,
                name: token.to_owned(),
            })?;
            bits |= capability.bits();
        }
        Ok(Self::from_bits(bits))
    }

    fn checked(self) -> Result<(), CapabilityError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(CapabilityError::InvalidSet {
                kind: C::KIND,
                value: self.bits,
            })
        }
    }
}

/// Folds `flags` into one mask, skipping [`Flag::NONE`] and rejecting anything else invalid.
fn union_of<C, I, F>(flags: I) -> Result<u32, CapabilityError>
where
    C: Capability,
    I: IntoIterator<Item = F>,
    F: Into<Flag<C>>,
{
    let mut union = 0;
    for flag in flags {
        let flag = flag.into();
        if flag.is_none() {
            continue;
        }
        union |= flag.checked_bits()?;
    }
    Ok(union)
}

/// Iterator over the capabilities in a [`CapabilitySet`].
pub struct Iter<C> {
    bits: u32,
    index: usize,
    _domain: PhantomData<fn() -> C>,
}

impl<C: Capability> Iterator for Iter<C> {
    type Item = C;

    fn next(&mut self) -> Option<C> {
        while let Some(capability) = C::ALL.get(self.index) {
            self.index += 1;
            if self.bits & capability.bits() != 0 {
                return Some(*capability);
            }
        }
        None
    }
}

impl<C: Capability> FusedIterator for Iter<C> {}

impl<C: Capability> IntoIterator for CapabilitySet<C> {
    type Item = C;
    type IntoIter = Iter<C>;

    fn into_iter(self) -> Iter<C> {
        self.iter()
    }
}

impl<C> Clone for CapabilitySet<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for CapabilitySet<C> {}

impl<C> Default for CapabilitySet<C> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<C> PartialEq for CapabilitySet<C> {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl<C> Eq for CapabilitySet<C> {}

impl<C> Hash for CapabilitySet<C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits.hash(state);
    }
}

impl<C: Capability> From<C> for CapabilitySet<C> {
    fn from(capability: C) -> Self {
        Self::from_bits(capability.bits())
    }
}

impl<C: Capability> FromIterator<C> for CapabilitySet<C> {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

impl<C: Capability> Extend<C> for CapabilitySet<C> {
    fn extend<I: IntoIterator<Item = C>>(&mut self, iter: I) {
        for capability in iter {
            self.bits |= capability.bits();
        }
    }
}

impl<C: Capability> BitOr for CapabilitySet<C> {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self::from_bits(self.bits | rhs.bits)
    }
}

impl<C: Capability> BitOr<C> for CapabilitySet<C> {
    type Output = Self;

    fn bitor(self, rhs: C) -> Self {
        self.with(rhs)
    }
}

impl<C: Capability> BitOrAssign<C> for CapabilitySet<C> {
    fn bitor_assign(&mut self, rhs: C) {
        self.bits |= rhs.bits();
    }
}

impl<C: Capability> fmt::Display for CapabilitySet<C> {
    /// Renders member names joined by `|`, `none` for the empty set, and the
    /// raw mask in hex for out-of-range values.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return write!(f, "{:#x}", self.bits);
        }
        if self.is_empty() {
            return f.write_str("none");
        }
        for (position, capability) in self.iter().enumerate() {
            if position > 0 {
                f.write_str("|")?;
            }
            f.write_str(capability.name())?;
        }
        Ok(())
    }
}

impl<C: Capability> fmt::Debug for CapabilitySet<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CapabilitySet<{}>({self})", C::KIND)
    }
}

impl<C: Capability> FromStr for CapabilitySet<C> {
    type Err = CapabilityError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::parse_list(input)
    }
}

#[cfg(feature = "serde")]
impl<C: Capability> serde::Serialize for CapabilitySet<C> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de, C: Capability> serde::Deserialize<'de> for CapabilitySet<C> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
