//! Fixed-region field descriptors.

use std::sync::Arc;

use super::primitive::Primitive;
use super::structure::StructureSchema;

/// Semantic kind and storage of a fixed field.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Plain signed or unsigned integer
    Integer(Primitive),
    /// Single-valued enum decoded by matching the stored code
    Enum {
        primitive: Primitive,
        domain: String,
    },
    /// Bitfield whose bits map independently to constants
    Flags {
        primitive: Primitive,
        domain: String,
    },
    /// Fixed-length array of integers
    Array { element: Primitive, len: usize },
    /// Fixed-length, NUL-padded character array
    Chars { len: usize },
    /// Embedded fixed-size sub-structure
    Struct(Arc<StructureSchema>),
}

impl FieldKind {
    /// Width in bytes of the stored field.
    pub fn width(&self) -> usize {
        match self {
            FieldKind::Integer(p) => p.width(),
            FieldKind::Enum { primitive, .. } | FieldKind::Flags { primitive, .. } => {
                primitive.width()
            }
            FieldKind::Array { element, len } => element.width() * len,
            FieldKind::Chars { len } => *len,
            FieldKind::Struct(schema) => schema.fixed_size(),
        }
    }

    /// Scalar primitive backing this field, if it has one.
    pub fn primitive(&self) -> Option<Primitive> {
        match self {
            FieldKind::Integer(p) => Some(*p),
            FieldKind::Enum { primitive, .. } | FieldKind::Flags { primitive, .. } => {
                Some(*primitive)
            }
            _ => None,
        }
    }

    /// Type string as it would appear in a schema declaration.
    pub fn describe(&self) -> String {
        match self {
            FieldKind::Integer(p) => p.to_string(),
            FieldKind::Enum { primitive, domain } => format!("{} enum {}", primitive, domain),
            FieldKind::Flags { primitive, domain } => format!("{} flags {}", primitive, domain),
            FieldKind::Array { element, len } => format!("{}[{}]", element, len),
            FieldKind::Chars { len } => format!("char[{}]", len),
            FieldKind::Struct(schema) => schema.name().to_string(),
        }
    }
}

/// Field definition within a structure's fixed region.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Field name
    pub name: String,
    /// Byte offset within the fixed region (prefix sum of earlier widths)
    pub offset: usize,
    /// Field size in bytes (derived from kind)
    pub size: usize,
    /// Semantic kind
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub(crate) fn new(name: String, kind: FieldKind, offset: usize) -> Self {
        Self {
            name,
            offset,
            size: kind.width(),
            kind,
        }
    }

    /// Returns the end offset of this field (offset + size).
    pub fn end_offset(&self) -> usize {
        self.offset + self.size
    }

    pub fn primitive(&self) -> Option<Primitive> {
        self.kind.primitive()
    }
}
