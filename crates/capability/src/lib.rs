#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! crates/capability/src/lib.rs
//!
//! # Overview
//!
//! `capability` implements the bitflag algebra shared by the logging
//! workspace. A [`Capability`] is a small `#[repr(u32)]` enum whose explicit
//! discriminants are single bits; a [`Flag`] carries one raw elementary value
//! and a [`CapabilitySet`] carries a raw bitmask over the same domain. Both are
//! parameterised by the concrete enum so severities and layout elements reuse
//! one implementation.
//!
//! # Invariants
//!
//! - A [`Flag`] is valid iff exactly one bit is set and that bit does not
//!   exceed the largest declared elementary value.
//! - A [`CapabilitySet`] is valid iff its value lies in `0..=2^k - 1` where
//!   `k` is the number of declared capabilities. The empty set is always
//!   valid.
//! - [`Flag::NONE`] denotes absence: [`CapabilitySet::has`] answers `false`
//!   for it and the mutators skip it.
//! - Mutators are atomic. A call either applies every flag or leaves the set
//!   untouched and reports the first offending flag.
//!
//! # Errors
//!
//! Every fallible operation returns [`CapabilityError`].
//!
//! # Examples
//!
//! ```
//! use capability::{Capability, CapabilitySet, Flag};
//!
//! #[derive(Clone, Copy, Debug, Eq, PartialEq)]
//! #[repr(u32)]
//! enum Shape {
//!     Circle = 1,
//!     Square = 2,
//! }
//!
//! impl Capability for Shape {
//!     const KIND: &'static str = "shape";
//!     const ALL: &'static [Self] = &[Self::Circle, Self::Square];
//!
//!     fn bits(self) -> u32 {
//!         self as u32
//!     }
//!
//!     fn name(self) -> &'static str {
//!         match self {
//!             Self::Circle => "circle",
//!             Self::Square => "square",
//!         }
//!     }
//! }
//!
//! let mut shapes = CapabilitySet::<Shape>::empty();
//! shapes.add([Shape::Circle]).unwrap();
//! assert!(shapes.has(Shape::Circle).unwrap());
//! assert!(!shapes.has(Flag::<Shape>::NONE).unwrap());
//!
//! // Three is two bits at once and therefore not an elementary flag.
//! assert!(shapes.add([Flag::<Shape>::from_bits(3)]).is_err());
//! assert_eq!(shapes.bits(), 1);
//! ```

mod error;
mod flag;
mod set;

pub use error::CapabilityError;
pub use flag::{Capability, Flag, check_declaration};
pub use set::{CapabilitySet, Iter};
