//! Record headers.
//!
//! Every record starts with one of three headers. The high byte of the first
//! little-endian word selects the kind:
//!
//! | high byte | kind   | layout                    | header bytes |
//! |-----------|--------|---------------------------|--------------|
//! | `0xFF`    | `WSIG` | u16 signature, u16 length | 4            |
//! | `0x00`    | `LSIG` | u16 signature, u32 length | 6            |
//! | other     | `BSIG` | u8 signature, u8 length   | 2            |
//!
//! A `BSIG` length byte never equals `0x00` or `0xFF` for a real record, which
//! is what makes the high-byte test unambiguous.

use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::error::CdError;
use crate::schema::{FieldKind, Primitive, StructureSchema};

/// Header form of a record kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderKind {
    /// `BSIG`: byte signature, byte length
    Byte,
    /// `WSIG`: word signature, word length
    Word,
    /// `LSIG`: word signature, dword length
    Long,
}

impl HeaderKind {
    /// Size of the header in bytes.
    pub const fn size(self) -> usize {
        match self {
            HeaderKind::Byte => 2,
            HeaderKind::Word => 4,
            HeaderKind::Long => 6,
        }
    }

    /// Largest total record length the header can declare.
    pub const fn max_length(self) -> usize {
        match self {
            HeaderKind::Byte => u8::MAX as usize,
            HeaderKind::Word => u16::MAX as usize,
            HeaderKind::Long => u32::MAX as usize,
        }
    }

    /// Structure name of the header.
    pub const fn structure_name(self) -> &'static str {
        match self {
            HeaderKind::Byte => "BSIG",
            HeaderKind::Word => "WSIG",
            HeaderKind::Long => "LSIG",
        }
    }

    /// Shared header schema with `Signature` and `Length` fields.
    pub fn schema(self) -> Arc<StructureSchema> {
        static BSIG: OnceLock<Arc<StructureSchema>> = OnceLock::new();
        static WSIG: OnceLock<Arc<StructureSchema>> = OnceLock::new();
        static LSIG: OnceLock<Arc<StructureSchema>> = OnceLock::new();

        let (cell, signature, length) = match self {
            HeaderKind::Byte => (&BSIG, Primitive::U8, Primitive::U8),
            HeaderKind::Word => (&WSIG, Primitive::U16, Primitive::U16),
            HeaderKind::Long => (&LSIG, Primitive::U16, Primitive::U32),
        };
        let schema = cell.get_or_init(|| {
            Arc::new(StructureSchema::packed(
                self.structure_name(),
                &[
                    ("Signature", FieldKind::Integer(signature)),
                    ("Length", FieldKind::Integer(length)),
                ],
            ))
        });
        Arc::clone(schema)
    }

    /// Bit pattern stored in the `Signature` field for a normalized signature.
    pub const fn stored_signature(self, signature: u16) -> u16 {
        match self {
            HeaderKind::Byte => signature & 0x00FF,
            HeaderKind::Word | HeaderKind::Long => signature,
        }
    }
}

/// Parsed record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub kind: HeaderKind,
    /// Normalized signature: the full word for `WSIG`/`LSIG`, the low byte for `BSIG`
    pub signature: u16,
    /// Declared total record length in bytes, header included
    pub length: usize,
}

impl RecordHeader {
    /// Parses the header of the record starting at `offset` in `data`.
    ///
    /// # Returns
    /// `Err(CdError::Truncated)` if `data` ends inside the header.
    pub fn parse(data: &[u8], offset: usize) -> Result<Self, CdError> {
        let truncated = |needed: usize| CdError::Truncated {
            offset,
            reason: format!(
                "header needs {} bytes, {} available",
                needed,
                data.len().saturating_sub(offset)
            ),
        };

        let first = data.get(offset..offset + 2).ok_or_else(|| truncated(2))?;
        let word = u16::from_le_bytes([first[0], first[1]]);

        let header = match word >> 8 {
            0xFF => {
                let rest = data.get(offset + 2..offset + 4).ok_or_else(|| truncated(4))?;
                RecordHeader {
                    kind: HeaderKind::Word,
                    signature: word,
                    length: u16::from_le_bytes([rest[0], rest[1]]) as usize,
                }
            }
            0x00 => {
                let rest = data.get(offset + 2..offset + 6).ok_or_else(|| truncated(6))?;
                RecordHeader {
                    kind: HeaderKind::Long,
                    signature: word,
                    length: u32::from_le_bytes([rest[0], rest[1], rest[2], rest[3]]) as usize,
                }
            }
            length => RecordHeader {
                kind: HeaderKind::Byte,
                signature: word & 0x00FF,
                length: length as usize,
            },
        };
        Ok(header)
    }

    /// Size of this header in bytes.
    pub fn size(&self) -> usize {
        self.kind.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_schemas() {
        assert_eq!(HeaderKind::Byte.schema().fixed_size(), 2);
        assert_eq!(HeaderKind::Word.schema().fixed_size(), 4);
        assert_eq!(HeaderKind::Long.schema().fixed_size(), 6);
        assert!(Arc::ptr_eq(
            &HeaderKind::Word.schema(),
            &HeaderKind::Word.schema()
        ));
        assert_eq!(HeaderKind::Long.schema().field("Length").unwrap().size, 4);
    }

    #[test]
    fn test_parse_each_kind() {
        let word = RecordHeader::parse(&[0xD6, 0xFF, 0x20, 0x00], 0).unwrap();
        assert_eq!(word.kind, HeaderKind::Word);
        assert_eq!(word.signature, 0xFFD6);
        assert_eq!(word.length, 32);

        let long = RecordHeader::parse(&[0x10, 0x00, 0x00, 0x00, 0x01, 0x00], 0).unwrap();
        assert_eq!(long.kind, HeaderKind::Long);
        assert_eq!(long.signature, 0x0010);
        assert_eq!(long.length, 0x0001_0000);

        let byte = RecordHeader::parse(&[0x6D, 0x06], 0).unwrap();
        assert_eq!(byte.kind, HeaderKind::Byte);
        assert_eq!(byte.signature, 0x6D);
        assert_eq!(byte.length, 6);
    }

    #[test]
    fn test_parse_at_offset() {
        let data = [0xAA, 0xBB, 0x6D, 0x04, 0x00, 0x00];
        let header = RecordHeader::parse(&data, 2).unwrap();
        assert_eq!(header.signature, 0x6D);
        assert_eq!(header.length, 4);
    }

    #[test]
    fn test_parse_truncated() {
        assert!(matches!(
            RecordHeader::parse(&[0x01], 0),
            Err(CdError::Truncated { offset: 0, .. })
        ));
        assert!(matches!(
            RecordHeader::parse(&[0xD6, 0xFF, 0x20], 0),
            Err(CdError::Truncated { .. })
        ));
    }

    #[test]
    fn test_stored_signature() {
        assert_eq!(HeaderKind::Byte.stored_signature(0x006D), 0x6D);
        assert_eq!(HeaderKind::Word.stored_signature(0xFFD6), 0xFFD6);
    }
}
