//! Variable tail layout.
//!
//! Tail positions are never stored. Each access walks the variable fields in
//! order, reading the current length fields, and sums the extents.

use std::ops::Range;

use crate::error::CdError;
use crate::schema::{LengthSource, StructureSchema};

/// Position of one variable field within the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TailSpan {
    /// Index into [`StructureSchema::variables`]
    pub index: usize,
    /// Absolute offset of the first value byte
    pub start: usize,
    /// Value length in bytes
    pub len: usize,
    /// Stored length including any pad byte
    pub extent: usize,
}

impl TailSpan {
    /// Value bytes, excluding padding.
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.len
    }

    /// Offset just past the stored extent.
    pub fn end(&self) -> usize {
        self.start + self.extent
    }
}

/// Resolved positions of every variable field of one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailLayout {
    spans: Vec<TailSpan>,
    declared_length: usize,
    pads_present: bool,
    end: usize,
}

impl TailLayout {
    /// Walks the tail of the record in `bytes` described by `schema`.
    ///
    /// Padding is decided once per record: when the declared length matches
    /// the padded sum pad bytes are assumed throughout, when it matches the
    /// unpadded sum they are not. Records ending in an open-ended field take
    /// the padded form whenever it fits.
    ///
    /// # Returns
    /// `Err(CdError::LengthMismatch)` if the fields run past the declared
    /// length. Unused bytes before the declared end are tolerated and logged.
    pub fn resolve(schema: &StructureSchema, bytes: &[u8]) -> Result<Self, CdError> {
        let declared = declared_length(schema, bytes)?;
        if declared > bytes.len() {
            return Err(CdError::OutOfBounds {
                start: 0,
                end: declared,
                len: bytes.len(),
            });
        }
        let fixed = schema.fixed_size();
        if declared < fixed {
            return Err(CdError::LengthMismatch {
                structure: schema.name().to_string(),
                declared,
                computed: fixed,
            });
        }

        let overrun = || overflow(schema, declared);
        let variables = schema.variables();
        let mut lengths = Vec::with_capacity(variables.len());
        for variable in variables {
            let len = match &variable.length {
                LengthSource::Field(field) => read_length(schema, bytes, field)?,
                LengthSource::Counted {
                    count_field,
                    element_size,
                } => read_length(schema, bytes, count_field)?
                    .checked_mul(*element_size)
                    .ok_or_else(overrun)?,
                LengthSource::Remainder | LengthSource::Trailing { .. } => 0,
            };
            lengths.push(len);
        }

        let mut unpadded = fixed;
        let mut padded = fixed;
        for (variable, len) in variables.iter().zip(&lengths) {
            unpadded = unpadded.checked_add(*len).ok_or_else(overrun)?;
            padded = padded
                .checked_add(variable.extent(*len, true))
                .ok_or_else(overrun)?;
        }

        let open_ended = variables
            .last()
            .is_some_and(|v| v.length.is_open_ended());
        let pads_present = if padded == unpadded || open_ended {
            padded <= declared
        } else if padded == declared {
            true
        } else if unpadded == declared {
            false
        } else {
            padded <= declared
        };

        let mut spans = Vec::with_capacity(variables.len());
        let mut cursor = fixed;
        for (index, (variable, len)) in variables.iter().zip(lengths).enumerate() {
            let remaining = declared.saturating_sub(cursor);
            let (len, extent) = match variable.length {
                LengthSource::Remainder => (remaining, remaining),
                LengthSource::Trailing { size } if remaining >= size => (size, size),
                LengthSource::Trailing { .. } => (0, 0),
                _ => (len, variable.extent(len, pads_present)),
            };
            spans.push(TailSpan {
                index,
                start: cursor,
                len,
                extent,
            });
            cursor = cursor.checked_add(extent).ok_or_else(overrun)?;
        }

        if cursor > declared {
            return Err(CdError::LengthMismatch {
                structure: schema.name().to_string(),
                declared,
                computed: cursor,
            });
        }
        if cursor < declared {
            tracing::warn!(
                "Record '{}' declares {} bytes, layout accounts for {}",
                schema.name(),
                declared,
                cursor
            );
        }

        Ok(Self {
            spans,
            declared_length: declared,
            pads_present,
            end: cursor,
        })
    }

    pub fn spans(&self) -> &[TailSpan] {
        &self.spans
    }

    /// Span of the variable field at `index`.
    pub fn span(&self, index: usize) -> Option<&TailSpan> {
        self.spans.get(index)
    }

    /// Whether odd-length padded fields carry their pad byte in this record.
    pub fn pads_present(&self) -> bool {
        self.pads_present
    }

    pub fn declared_length(&self) -> usize {
        self.declared_length
    }

    /// Fixed size plus the stored extents of every variable field.
    pub fn computed_length(&self) -> usize {
        self.end
    }

    /// Requires the declared and computed lengths to agree exactly.
    pub fn check_exact(&self, schema: &StructureSchema) -> Result<(), CdError> {
        if self.end != self.declared_length {
            return Err(CdError::LengthMismatch {
                structure: schema.name().to_string(),
                declared: self.declared_length,
                computed: self.end,
            });
        }
        Ok(())
    }
}

/// Total length declared by the header, or the buffer length for header-less
/// structures.
pub(crate) fn declared_length(schema: &StructureSchema, bytes: &[u8]) -> Result<usize, CdError> {
    if schema.header().is_none() {
        return Ok(bytes.len());
    }
    read_length(schema, bytes, "Header.Length")
}

fn read_length(schema: &StructureSchema, bytes: &[u8], path: &str) -> Result<usize, CdError> {
    let (offset, descriptor) = schema.locate(path).ok_or_else(|| CdError::FieldNotFound {
        structure: schema.name().to_string(),
        field: path.to_string(),
    })?;
    let primitive = descriptor.primitive().ok_or_else(|| CdError::KindMismatch {
        structure: schema.name().to_string(),
        field: path.to_string(),
        expected: "integer".to_string(),
        actual: descriptor.kind.describe(),
    })?;
    let end = offset + primitive.width();
    let src = bytes.get(offset..end).ok_or(CdError::OutOfBounds {
        start: offset,
        end,
        len: bytes.len(),
    })?;
    let bits = primitive.read_bits(src);
    usize::try_from(bits).map_err(|_| CdError::ValueOutOfRange {
        field: path.to_string(),
        value: bits as i128,
        primitive,
    })
}

fn overflow(schema: &StructureSchema, declared: usize) -> CdError {
    CdError::LengthMismatch {
        structure: schema.name().to_string(),
        declared,
        computed: usize::MAX,
    }
}
