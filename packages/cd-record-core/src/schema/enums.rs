//! Numeric-coded enums and bitfield sets.
//!
//! A stored code either names a known constant or it does not. [`Coded`]
//! carries both facts at once, so a reader that meets a code written by a
//! newer producer still sees the exact bit pattern.

use std::fmt;
use std::marker::PhantomData;

/// An enum whose constants map to numeric codes stored in a record.
///
/// Implemented by [`cd_enum!`](crate::cd_enum) and [`cd_flags!`](crate::cd_flags).
pub trait CodeEnum: Copy + Eq + fmt::Debug + 'static {
    /// Domain name recorded in schema descriptors that use this enum.
    const DOMAIN: &'static str;

    /// All known constants in declaration order.
    fn values() -> &'static [Self];

    /// Numeric code (or bit value) of this constant.
    fn code(self) -> u64;

    /// Finds the constant with the given code.
    fn from_code(code: u64) -> Option<Self> {
        Self::values().iter().copied().find(|v| v.code() == code)
    }
}

/// Marker for enums whose constants are OR-able bit values.
///
/// Constants are not required to be single bits. A constant is considered set
/// when all of its bits are set. Bits reserved for mask/shift sub-fields must
/// stay outside [`BitFlag::domain_mask`].
pub trait BitFlag: CodeEnum {
    /// Union of the bits of every known constant.
    fn domain_mask() -> u64 {
        Self::values().iter().fold(0, |mask, f| mask | f.code())
    }
}

/// Decoded single-valued enum field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Coded<E> {
    /// The stored code names a known constant.
    Known(E),
    /// The stored code is not among the known constants.
    Unknown(u64),
}

impl<E: CodeEnum> Coded<E> {
    pub fn from_raw(raw: u64) -> Self {
        match E::from_code(raw) {
            Some(value) => Coded::Known(value),
            None => Coded::Unknown(raw),
        }
    }

    /// Stored bit pattern, known or not.
    pub fn raw(self) -> u64 {
        match self {
            Coded::Known(value) => value.code(),
            Coded::Unknown(raw) => raw,
        }
    }

    pub fn known(self) -> Option<E> {
        match self {
            Coded::Known(value) => Some(value),
            Coded::Unknown(_) => None,
        }
    }

    pub fn is_known(self) -> bool {
        matches!(self, Coded::Known(_))
    }
}

impl<E: CodeEnum> From<E> for Coded<E> {
    fn from(value: E) -> Self {
        Coded::Known(value)
    }
}

/// Decoded bitfield set.
///
/// Keeps the whole stored word so bits without a known constant survive a
/// read-modify-write cycle.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlagSet<F> {
    raw: u64,
    _marker: PhantomData<F>,
}

impl<F: BitFlag> FlagSet<F> {
    pub fn empty() -> Self {
        Self::from_raw(0)
    }

    /// Set containing every known constant.
    pub fn all() -> Self {
        Self::from_raw(F::domain_mask())
    }

    pub fn from_raw(raw: u64) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    pub fn from_flags(flags: impl IntoIterator<Item = F>) -> Self {
        let raw = flags.into_iter().fold(0, |acc, f| acc | f.code());
        Self::from_raw(raw)
    }

    pub fn contains(&self, flag: F) -> bool {
        let bits = flag.code();
        bits != 0 && self.raw & bits == bits
    }

    pub fn insert(&mut self, flag: F) {
        self.raw |= flag.code();
    }

    pub fn remove(&mut self, flag: F) {
        self.raw &= !flag.code();
    }

    /// Known constants present in the set, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = F> + '_ {
        F::values().iter().copied().filter(move |f| self.contains(*f))
    }

    pub fn to_vec(&self) -> Vec<F> {
        self.iter().collect()
    }

    /// Stored word including bits without a known constant.
    pub fn raw(&self) -> u64 {
        self.raw
    }

    /// Bits of the known constants only.
    pub fn known_bits(&self) -> u64 {
        self.raw & F::domain_mask()
    }

    pub fn unknown_bits(&self) -> u64 {
        self.raw & !F::domain_mask()
    }

    /// True when no known constant is present.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

impl<F: BitFlag> Default for FlagSet<F> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<F: BitFlag> FromIterator<F> for FlagSet<F> {
    fn from_iter<I: IntoIterator<Item = F>>(iter: I) -> Self {
        Self::from_flags(iter)
    }
}

impl<F: BitFlag> fmt::Debug for FlagSet<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut set = f.debug_set();
        set.entries(self.iter());
        if self.unknown_bits() != 0 {
            set.entry(&format_args!("{:#x}", self.unknown_bits()));
        }
        set.finish()
    }
}
