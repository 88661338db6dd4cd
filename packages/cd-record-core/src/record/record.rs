//! Owned, resizable records.

use std::sync::Arc;

use crate::codec::{FormulaCodec, TextCodec};
use crate::config::CodecConfig;
use crate::error::CdError;
use crate::registry::RecordType;
use crate::schema::{LengthSource, StructureSchema, VariableKind};

use super::access::{self, FieldAccess, FieldAccessMut};
use super::buffer::{RecordBuffer, ViewHandle};
use super::tail::{self, TailLayout};
use super::view::{RecordMut, RecordRef};

/// A record that owns its bytes and can grow or shrink its variable tail.
///
/// The buffer always holds exactly the declared length. Resizing builds the
/// new storage first and swaps it in only once every length field has been
/// updated, so a rejected resize leaves the record unchanged.
#[derive(Debug, Clone)]
pub struct Record {
    schema: Arc<StructureSchema>,
    buffer: RecordBuffer,
    /// Configured upper bound on the total length
    limit: usize,
}

impl Record {
    /// Creates a zero-filled record holding only the fixed region.
    ///
    /// If the structure has a header, its `Length` is set to the fixed size.
    pub fn new(schema: Arc<StructureSchema>) -> Result<Self, CdError> {
        let len = schema.fixed_size();
        let mut record = Self {
            schema,
            buffer: RecordBuffer::zeroed(len),
            limit: CodecConfig::default().max_record_length as usize,
        };
        if let Some(max) = record.schema.max_length() {
            if len > max {
                return Err(CdError::SizeLimitExceeded {
                    structure: record.schema.name().to_string(),
                    requested: len,
                    limit: max,
                });
            }
            let (schema, bytes) = record.parts_mut();
            access::write_raw(schema, bytes, "Header.Length", len as u64)?;
        }
        Ok(record)
    }

    /// Creates an empty record of a registered type, signature included.
    pub fn for_type(record_type: &RecordType) -> Result<Self, CdError> {
        let mut record = Self::new(Arc::clone(&record_type.schema))?;
        if let Some(kind) = record.schema.header() {
            record.set_raw(
                "Header.Signature",
                kind.stored_signature(record_type.key.signature) as u64,
            )?;
        }
        Ok(record)
    }

    /// Wraps existing bytes. Bytes past the declared length are dropped.
    pub fn from_bytes(schema: Arc<StructureSchema>, mut bytes: Vec<u8>) -> Result<Self, CdError> {
        let fixed = schema.fixed_size();
        if bytes.len() < fixed {
            return Err(CdError::OutOfBounds {
                start: 0,
                end: fixed,
                len: bytes.len(),
            });
        }
        let declared = tail::declared_length(&schema, &bytes)?;
        if declared > bytes.len() {
            return Err(CdError::OutOfBounds {
                start: 0,
                end: declared,
                len: bytes.len(),
            });
        }
        if declared < fixed {
            return Err(CdError::LengthMismatch {
                structure: schema.name().to_string(),
                declared,
                computed: fixed,
            });
        }
        bytes.truncate(declared);
        Ok(Self {
            schema,
            buffer: RecordBuffer::new(bytes),
            limit: CodecConfig::default().max_record_length as usize,
        })
    }

    /// Caps the total length at `limit` bytes, in addition to the header's
    /// own maximum.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Largest total length a resize may produce.
    pub fn limit(&self) -> usize {
        self.schema
            .max_length()
            .map_or(self.limit, |max| max.min(self.limit))
    }

    pub fn schema_arc(&self) -> &Arc<StructureSchema> {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer.into_vec()
    }

    /// Storage generation. Changes on every write and resize.
    pub fn generation(&self) -> u64 {
        self.buffer.generation()
    }

    pub fn view(&self) -> RecordRef<'_> {
        RecordRef::new(&self.schema, self.buffer.as_slice())
    }

    /// Mutable view over the fixed fields. Cannot resize.
    pub fn view_mut(&mut self) -> RecordMut<'_> {
        RecordMut::new(&self.schema, self.buffer.as_mut_slice())
    }

    /// Replaces the content of a variable field, resizing the record.
    ///
    /// The field's length (or element count) and the header length are
    /// updated, and every other variable field keeps its bytes. Padding
    /// follows the convention already present in the record.
    ///
    /// # Errors
    /// - `CdError::SizeLimitExceeded` if the new total exceeds [`Record::limit`]
    ///   or the value does not fit its length field
    /// - `CdError::InvalidVariableLength` if a list is not a whole number of
    ///   elements or a trailing block has the wrong size
    pub fn set_variable(&mut self, name: &str, data: &[u8]) -> Result<(), CdError> {
        let schema = Arc::clone(&self.schema);
        let index = schema
            .variables()
            .iter()
            .position(|v| v.name == name)
            .ok_or_else(|| CdError::FieldNotFound {
                structure: schema.name().to_string(),
                field: name.to_string(),
            })?;
        let field = &schema.variables()[index];

        let stored = match &field.length {
            LengthSource::Field(length_field) => Some((length_field.as_str(), data.len())),
            LengthSource::Counted {
                count_field,
                element_size,
            } => {
                if data.len() % element_size != 0 {
                    return Err(CdError::InvalidVariableLength {
                        field: name.to_string(),
                        len: data.len(),
                        reason: format!("not a multiple of the {}-byte element", element_size),
                    });
                }
                Some((count_field.as_str(), data.len() / element_size))
            }
            LengthSource::Remainder => None,
            LengthSource::Trailing { size } => {
                if !data.is_empty() && data.len() != *size {
                    return Err(CdError::InvalidVariableLength {
                        field: name.to_string(),
                        len: data.len(),
                        reason: format!("trailing block is {} bytes or absent", size),
                    });
                }
                None
            }
        };

        if let Some((length_field, value)) = stored {
            let max = schema
                .locate(length_field)
                .and_then(|(_, d)| d.primitive())
                .map_or(0, |p| p.max());
            if value as i128 > max {
                return Err(CdError::SizeLimitExceeded {
                    structure: schema.name().to_string(),
                    requested: data.len(),
                    limit: max as usize,
                });
            }
        }

        let layout = TailLayout::resolve(&schema, self.buffer.as_slice())?;
        let span = *layout.span(index).ok_or_else(|| CdError::FieldNotFound {
            structure: schema.name().to_string(),
            field: name.to_string(),
        })?;
        let declared = layout.declared_length();
        let extent = field.extent(data.len(), layout.pads_present());
        let total = declared - span.extent + extent;
        let limit = self.limit();
        if total > limit {
            return Err(CdError::SizeLimitExceeded {
                structure: schema.name().to_string(),
                requested: total,
                limit,
            });
        }

        let current = self.buffer.as_slice();
        let mut next = Vec::with_capacity(total);
        next.extend_from_slice(&current[..span.start]);
        next.extend_from_slice(data);
        next.resize(span.start + extent, 0);
        next.extend_from_slice(&current[span.end()..declared]);

        if let Some((length_field, value)) = stored {
            access::write_raw(&schema, &mut next, length_field, value as u64)?;
        }
        if schema.header().is_some() {
            access::write_raw(&schema, &mut next, "Header.Length", total as u64)?;
        }

        tracing::trace!(
            "Resized '{}.{}': {} -> {} bytes (record {} -> {})",
            schema.name(),
            name,
            span.len,
            data.len(),
            declared,
            total
        );
        self.buffer.replace(next);
        Ok(())
    }

    /// Empties a variable field.
    pub fn clear_variable(&mut self, name: &str) -> Result<(), CdError> {
        self.set_variable(name, &[])
    }

    /// Encodes `text` through `codec` into a text variable field.
    pub fn set_text(&mut self, name: &str, text: &str, codec: &dyn TextCodec) -> Result<(), CdError> {
        self.expect_kind(name, "text", |k| matches!(k, VariableKind::Text))?;
        let encoded = codec.encode(text)?;
        self.set_variable(name, &encoded)
    }

    /// Compiles `formula` through `codec` into a formula variable field.
    pub fn set_formula(
        &mut self,
        name: &str,
        formula: &str,
        codec: &dyn FormulaCodec,
    ) -> Result<(), CdError> {
        self.expect_kind(name, "formula", |k| matches!(k, VariableKind::Formula))?;
        let compiled = if formula.is_empty() {
            Vec::new()
        } else {
            codec.compile(formula)?
        };
        self.set_variable(name, &compiled)
    }

    /// Takes a detached handle on the current bytes of a variable field.
    ///
    /// The handle stops resolving after any write to the record.
    pub fn variable_handle(&self, name: &str) -> Result<ViewHandle, CdError> {
        let index = self.schema.variable_index(name).ok_or_else(|| CdError::FieldNotFound {
            structure: self.schema.name().to_string(),
            field: name.to_string(),
        })?;
        let layout = self.tail()?;
        let range = layout
            .span(index)
            .map(|span| span.range())
            .unwrap_or(0..0);
        self.buffer.handle(range)
    }

    /// Resolves a handle from [`Record::variable_handle`].
    pub fn resolve(&self, handle: &ViewHandle) -> Result<&[u8], CdError> {
        self.buffer.resolve(handle)
    }

    fn expect_kind(
        &self,
        name: &str,
        expected: &str,
        accepts: impl Fn(&VariableKind) -> bool,
    ) -> Result<(), CdError> {
        let field = self.schema.variable(name).ok_or_else(|| CdError::FieldNotFound {
            structure: self.schema.name().to_string(),
            field: name.to_string(),
        })?;
        if !accepts(&field.kind) {
            return Err(CdError::KindMismatch {
                structure: self.schema.name().to_string(),
                field: name.to_string(),
                expected: expected.to_string(),
                actual: field.kind.describe(),
            });
        }
        Ok(())
    }
}

impl FieldAccess for Record {
    fn schema(&self) -> &StructureSchema {
        &self.schema
    }

    fn bytes(&self) -> &[u8] {
        self.buffer.as_slice()
    }
}

impl FieldAccessMut for Record {
    fn parts_mut(&mut self) -> (&StructureSchema, &mut [u8]) {
        (self.schema.as_ref(), self.buffer.as_mut_slice())
    }
}
