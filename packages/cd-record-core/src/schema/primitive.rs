//! Little-endian primitive integer encodings.
//!
//! | Type | Width | Signed | Aliases |
//! |------|-------|--------|---------|
//! | u8   | 1     | no     | BYTE    |
//! | i8   | 1     | yes    |         |
//! | u16  | 2     | no     | WORD    |
//! | i16  | 2     | yes    | SWORD   |
//! | u32  | 4     | no     | DWORD   |
//! | i32  | 4     | yes    | LONG    |
//! | u64  | 8     | no     | QWORD   |
//! | i64  | 8     | yes    |         |

use std::fmt;

use serde::{Deserialize, Serialize};

/// Primitive integer type of a fixed field or array element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
}

impl Primitive {
    /// Width in bytes.
    pub const fn width(self) -> usize {
        match self {
            Primitive::U8 | Primitive::I8 => 1,
            Primitive::U16 | Primitive::I16 => 2,
            Primitive::U32 | Primitive::I32 => 4,
            Primitive::U64 | Primitive::I64 => 8,
        }
    }

    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            Primitive::I8 | Primitive::I16 | Primitive::I32 | Primitive::I64
        )
    }

    /// Bit mask covering the full width.
    pub const fn mask(self) -> u64 {
        match self.width() {
            8 => u64::MAX,
            w => (1u64 << (w * 8)) - 1,
        }
    }

    /// Smallest representable value.
    pub const fn min(self) -> i128 {
        if self.is_signed() {
            -(1i128 << (self.width() * 8 - 1))
        } else {
            0
        }
    }

    /// Largest representable value.
    pub const fn max(self) -> i128 {
        if self.is_signed() {
            (1i128 << (self.width() * 8 - 1)) - 1
        } else {
            self.mask() as i128
        }
    }

    /// Reads the zero-extended bit pattern from the first `width` bytes of `src`.
    ///
    /// # Panics
    /// Panics if `src` is shorter than the width. Callers bounds-check first.
    pub fn read_bits(self, src: &[u8]) -> u64 {
        let width = self.width();
        let mut buf = [0u8; 8];
        buf[..width].copy_from_slice(&src[..width]);
        u64::from_le_bytes(buf)
    }

    /// Writes the low `width` bytes of `bits` into `dst`.
    ///
    /// # Panics
    /// Panics if `dst` is shorter than the width. Callers bounds-check first.
    pub fn write_bits(self, dst: &mut [u8], bits: u64) {
        let width = self.width();
        dst[..width].copy_from_slice(&bits.to_le_bytes()[..width]);
    }

    /// Interprets a bit pattern according to the signedness of this type.
    pub fn sign_extend(self, bits: u64) -> i128 {
        let bits = bits & self.mask();
        if self.is_signed() {
            let shift = 64 - (self.width() as u32 * 8);
            (((bits << shift) as i64) >> shift) as i128
        } else {
            bits as i128
        }
    }

    /// Converts a numeric value into this type's bit pattern, if it fits.
    pub fn encode(self, value: i128) -> Option<u64> {
        if value < self.min() || value > self.max() {
            return None;
        }
        Some((value as u64) & self.mask())
    }

    /// Parses a type identifier, accepting the legacy C aliases.
    pub fn parse(type_id: &str) -> Option<Self> {
        let primitive = match type_id {
            "u8" | "BYTE" => Primitive::U8,
            "i8" => Primitive::I8,
            "u16" | "WORD" => Primitive::U16,
            "i16" | "SWORD" => Primitive::I16,
            "u32" | "DWORD" => Primitive::U32,
            "i32" | "LONG" => Primitive::I32,
            "u64" | "QWORD" => Primitive::U64,
            "i64" => Primitive::I64,
            _ => return None,
        };
        Some(primitive)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Primitive::U8 => "u8",
            Primitive::I8 => "i8",
            Primitive::U16 => "u16",
            Primitive::I16 => "i16",
            Primitive::U32 => "u32",
            Primitive::I32 => "i32",
            Primitive::U64 => "u64",
            Primitive::I64 => "i64",
        };
        f.write_str(name)
    }
}
