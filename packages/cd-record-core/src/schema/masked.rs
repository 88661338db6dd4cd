//! Sub-ranges packed into a flags word via mask and shift.

/// A derived accessor over part of a raw integer field.
///
/// Example: a two-bit border type stored in bits 8..10 of a `Flags` word is
/// `MaskedField { source: "Flags", mask: 0x0300, shift: 8 }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedField {
    pub name: String,
    /// Path of the integer or flags field holding the bits
    pub source: String,
    pub mask: u64,
    pub shift: u32,
}

impl MaskedField {
    pub fn new(name: impl Into<String>, source: impl Into<String>, mask: u64, shift: u32) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            mask,
            shift,
        }
    }

    /// Extracts the sub-field value from the source word.
    pub fn extract(&self, raw: u64) -> u64 {
        (raw & self.mask) >> self.shift
    }

    /// Replaces the sub-field bits in `raw`, leaving every other bit alone.
    ///
    /// Returns `None` if `value` does not fit the mask.
    pub fn insert(&self, raw: u64, value: u64) -> Option<u64> {
        let shifted = value.checked_shl(self.shift)?;
        if shifted >> self.shift != value || shifted & !self.mask != 0 {
            return None;
        }
        Some((raw & !self.mask) | shifted)
    }
}
