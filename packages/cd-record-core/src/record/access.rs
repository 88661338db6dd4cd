//! Typed field accessors shared by owned records and borrowed views.
//!
//! Every accessor goes through the schema: a name (or dotted path) resolves
//! to an offset and a kind, the kind is checked against the accessor, and the
//! bytes are read or written little-endian. Enum and flags accessors always
//! have a raw counterpart so unknown codes survive a round trip.

use crate::codec::{FormulaCodec, TextCodec};
use crate::error::CdError;
use crate::schema::{
    BitFlag, CodeEnum, Coded, Confidence, FieldDescriptor, FieldKind, FlagSet, LengthSource,
    Primitive, StructureSchema, VariableField, VariableKind,
};

use super::tail::{self, TailLayout};
use super::view::{RecordMut, RecordRef};

/// Bytes of one variable field together with how far they can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableValue<'a> {
    pub bytes: &'a [u8],
    pub confidence: Confidence,
}

/// Read access to a record laid out by a [`StructureSchema`].
pub trait FieldAccess {
    fn schema(&self) -> &StructureSchema;

    fn bytes(&self) -> &[u8];

    /// Bit pattern of any scalar field (integer, enum or flags), zero-extended.
    fn get_raw(&self, path: &str) -> Result<u64, CdError> {
        let schema = self.schema();
        let (offset, descriptor) = locate(schema, path)?;
        let primitive = scalar(schema, path, descriptor)?;
        let src = slice_at(self.bytes(), offset, primitive.width())?;
        Ok(primitive.read_bits(src))
    }

    /// Integer field converted to `T`, honoring the field's signedness.
    fn get_int<T: TryFrom<i128>>(&self, path: &str) -> Result<T, CdError> {
        let schema = self.schema();
        let (_, descriptor) = locate(schema, path)?;
        let primitive = match descriptor.kind {
            FieldKind::Integer(p) => p,
            _ => return Err(kind_mismatch(schema, path, "integer", descriptor)),
        };
        let value = primitive.sign_extend(self.get_raw(path)?);
        T::try_from(value).map_err(|_| CdError::ValueOutOfRange {
            field: path.to_string(),
            value,
            primitive,
        })
    }

    /// Single-valued enum field. Unknown codes come back as [`Coded::Unknown`].
    fn get_enum<E: CodeEnum>(&self, path: &str) -> Result<Coded<E>, CdError> {
        let schema = self.schema();
        let (_, descriptor) = locate(schema, path)?;
        match &descriptor.kind {
            FieldKind::Enum { domain, .. } if domain == E::DOMAIN => {}
            _ => return Err(kind_mismatch(schema, path, &format!("enum {}", E::DOMAIN), descriptor)),
        }
        Ok(Coded::from_raw(self.get_raw(path)?))
    }

    /// Bitfield decoded against `F`. The full stored word is kept.
    fn get_flags<F: BitFlag>(&self, path: &str) -> Result<FlagSet<F>, CdError> {
        let schema = self.schema();
        let (_, descriptor) = locate(schema, path)?;
        match &descriptor.kind {
            FieldKind::Flags { domain, .. } if domain == F::DOMAIN => {}
            _ => {
                return Err(kind_mismatch(
                    schema,
                    path,
                    &format!("flags {}", F::DOMAIN),
                    descriptor,
                ))
            }
        }
        Ok(FlagSet::from_raw(self.get_raw(path)?))
    }

    /// Mask/shift sub-field value.
    fn get_masked(&self, name: &str) -> Result<u64, CdError> {
        let masked = self
            .schema()
            .masked(name)
            .ok_or_else(|| not_found(self.schema(), name))?;
        Ok(masked.extract(self.get_raw(&masked.source)?))
    }

    /// Mask/shift sub-field decoded as an enum.
    fn get_masked_enum<E: CodeEnum>(&self, name: &str) -> Result<Coded<E>, CdError> {
        Ok(Coded::from_raw(self.get_masked(name)?))
    }

    /// Elements of a fixed-length integer array, zero-extended.
    fn get_array(&self, path: &str) -> Result<Vec<u64>, CdError> {
        let schema = self.schema();
        let (offset, descriptor) = locate(schema, path)?;
        let (element, len) = match descriptor.kind {
            FieldKind::Array { element, len } => (element, len),
            _ => return Err(kind_mismatch(schema, path, "array", descriptor)),
        };
        let src = slice_at(self.bytes(), offset, descriptor.size)?;
        Ok((0..len)
            .map(|i| element.read_bits(&src[i * element.width()..]))
            .collect())
    }

    /// Fixed character array up to the first NUL.
    fn get_chars(&self, path: &str, codec: &dyn TextCodec) -> Result<String, CdError> {
        let schema = self.schema();
        let (offset, descriptor) = locate(schema, path)?;
        if !matches!(descriptor.kind, FieldKind::Chars { .. }) {
            return Err(kind_mismatch(schema, path, "chars", descriptor));
        }
        let src = slice_at(self.bytes(), offset, descriptor.size)?;
        let end = src.iter().position(|&b| b == 0).unwrap_or(src.len());
        codec.decode(&src[..end])
    }

    /// View of an embedded sub-structure.
    fn substructure(&self, path: &str) -> Result<RecordRef<'_>, CdError> {
        let schema = self.schema();
        let (offset, descriptor) = locate(schema, path)?;
        match &descriptor.kind {
            FieldKind::Struct(inner) => {
                let bytes = slice_at(self.bytes(), offset, descriptor.size)?;
                Ok(RecordRef::new(inner, bytes))
            }
            _ => Err(kind_mismatch(schema, path, "structure", descriptor)),
        }
    }

    /// Current positions of every variable field.
    fn tail(&self) -> Result<TailLayout, CdError> {
        TailLayout::resolve(self.schema(), self.bytes())
    }

    /// Bytes of a variable field, excluding any pad byte.
    fn variable(&self, name: &str) -> Result<VariableValue<'_>, CdError> {
        let schema = self.schema();
        let index = schema
            .variable_index(name)
            .ok_or_else(|| not_found(schema, name))?;
        let field = &schema.variables()[index];
        let layout = self.tail()?;
        let span = layout
            .span(index)
            .ok_or_else(|| not_found(schema, name))?;
        if field.confidence == Confidence::VersionDependent {
            tracing::debug!(
                "Reading version-dependent field '{}.{}' ({} bytes)",
                schema.name(),
                name,
                span.len
            );
        }
        Ok(VariableValue {
            bytes: slice_at(self.bytes(), span.start, span.len)?,
            confidence: field.confidence,
        })
    }

    /// Variable text field decoded through `codec`.
    fn get_text(&self, name: &str, codec: &dyn TextCodec) -> Result<String, CdError> {
        expect_variable(self.schema(), name, "text", |k| {
            matches!(k, VariableKind::Text)
        })?;
        codec.decode(self.variable(name)?.bytes)
    }

    /// Compiled formula decompiled through `codec`. An empty formula is the
    /// empty string.
    fn get_formula(&self, name: &str, codec: &dyn FormulaCodec) -> Result<String, CdError> {
        expect_variable(self.schema(), name, "formula", |k| {
            matches!(k, VariableKind::Formula)
        })?;
        let bytes = self.variable(name)?.bytes;
        if bytes.is_empty() {
            return Ok(String::new());
        }
        codec.decompile(bytes)
    }

    /// Elements of a variable list of sub-structures.
    fn list(&self, name: &str) -> Result<Vec<RecordRef<'_>>, CdError> {
        let field = expect_variable(self.schema(), name, "list", |k| {
            matches!(k, VariableKind::List(_))
        })?;
        let element = match &field.kind {
            VariableKind::List(element) => element,
            _ => return Err(not_found(self.schema(), name)),
        };
        let bytes = self.variable(name)?.bytes;
        Ok(bytes
            .chunks_exact(element.fixed_size())
            .map(|chunk| RecordRef::new(element, chunk))
            .collect())
    }

    /// Normalized signature from the header, if the structure has one.
    fn signature(&self) -> Result<Option<u16>, CdError> {
        if self.schema().header().is_none() {
            return Ok(None);
        }
        Ok(Some(self.get_raw("Header.Signature")? as u16))
    }

    /// Total length declared by the header, or the byte length without one.
    fn declared_length(&self) -> Result<usize, CdError> {
        tail::declared_length(self.schema(), self.bytes())
    }

    /// Checks that the declared length equals the fixed size plus every
    /// variable extent.
    fn validate(&self) -> Result<(), CdError> {
        self.tail()?.check_exact(self.schema())
    }
}

/// Write access to fixed fields.
///
/// Writes never change the record length. Variable fields are resized
/// through [`Record::set_variable`](super::Record::set_variable).
pub trait FieldAccessMut: FieldAccess {
    /// Schema and bytes borrowed together for in-place writes.
    fn parts_mut(&mut self) -> (&StructureSchema, &mut [u8]);

    /// Writes the bit pattern of any scalar field. Bits outside the field
    /// width are rejected.
    ///
    /// `Header.Length` and the fields holding variable lengths or counts are
    /// refused with `CdError::LengthControlled`; they change only through
    /// [`Record::set_variable`](super::Record::set_variable).
    fn set_raw(&mut self, path: &str, bits: u64) -> Result<(), CdError> {
        let (schema, bytes) = self.parts_mut();
        if controls_length(schema, path) {
            return Err(CdError::LengthControlled {
                structure: schema.name().to_string(),
                field: path.to_string(),
            });
        }
        write_raw(schema, bytes, path, bits)
    }

    /// Writes an integer field, range-checked against its width and
    /// signedness.
    fn set_int<T: Into<i128>>(&mut self, path: &str, value: T) -> Result<(), CdError> {
        let value = value.into();
        let schema = self.schema();
        let (_, descriptor) = locate(schema, path)?;
        let primitive = match descriptor.kind {
            FieldKind::Integer(p) => p,
            _ => return Err(kind_mismatch(schema, path, "integer", descriptor)),
        };
        let bits = primitive
            .encode(value)
            .ok_or_else(|| CdError::ValueOutOfRange {
                field: path.to_string(),
                value,
                primitive,
            })?;
        self.set_raw(path, bits)
    }

    /// Stores the code of a known enum constant.
    fn set_enum<E: CodeEnum>(&mut self, path: &str, value: E) -> Result<(), CdError> {
        let schema = self.schema();
        let (_, descriptor) = locate(schema, path)?;
        match &descriptor.kind {
            FieldKind::Enum { domain, .. } if domain == E::DOMAIN => {}
            _ => return Err(kind_mismatch(schema, path, &format!("enum {}", E::DOMAIN), descriptor)),
        }
        self.set_raw(path, value.code())
    }

    /// Stores a bitfield. Bits outside `F`'s known constants keep their
    /// stored values, so masked sub-fields sharing the word are untouched.
    fn set_flags<F: BitFlag>(&mut self, path: &str, flags: &FlagSet<F>) -> Result<(), CdError> {
        let current = self.get_flags::<F>(path)?.raw();
        let domain = F::domain_mask();
        self.set_raw(path, (current & !domain) | (flags.raw() & domain))
    }

    /// Replaces a mask/shift sub-field, leaving the other bits of the word.
    fn set_masked(&mut self, name: &str, value: u64) -> Result<(), CdError> {
        let masked = self
            .schema()
            .masked(name)
            .cloned()
            .ok_or_else(|| not_found(self.schema(), name))?;
        let current = self.get_raw(&masked.source)?;
        let updated = masked.insert(current, value).ok_or_else(|| {
            let primitive = self
                .schema()
                .locate(&masked.source)
                .and_then(|(_, d)| d.primitive())
                .unwrap_or(Primitive::U64);
            CdError::ValueOutOfRange {
                field: name.to_string(),
                value: value as i128,
                primitive,
            }
        })?;
        self.set_raw(&masked.source, updated)
    }

    /// Writes an integer array. Shorter input is zero-filled.
    fn set_array(&mut self, path: &str, values: &[u64]) -> Result<(), CdError> {
        let (schema, bytes) = self.parts_mut();
        let (offset, descriptor) = locate(schema, path)?;
        let (element, len) = match descriptor.kind {
            FieldKind::Array { element, len } => (element, len),
            _ => return Err(kind_mismatch(schema, path, "array", descriptor)),
        };
        if values.len() > len {
            return Err(CdError::ValueTooLong {
                field: path.to_string(),
                got: values.len(),
                capacity: len,
            });
        }
        if let Some(&bad) = values.iter().find(|&&v| v & !element.mask() != 0) {
            return Err(CdError::ValueOutOfRange {
                field: path.to_string(),
                value: bad as i128,
                primitive: element,
            });
        }
        let dst = slice_at_mut(bytes, offset, descriptor.size)?;
        dst.fill(0);
        for (i, value) in values.iter().enumerate() {
            element.write_bits(&mut dst[i * element.width()..], *value);
        }
        Ok(())
    }

    /// Writes a fixed character array, NUL-filling the remainder.
    fn set_chars(&mut self, path: &str, text: &str, codec: &dyn TextCodec) -> Result<(), CdError> {
        let encoded = codec.encode(text)?;
        let (schema, bytes) = self.parts_mut();
        let (offset, descriptor) = locate(schema, path)?;
        if !matches!(descriptor.kind, FieldKind::Chars { .. }) {
            return Err(kind_mismatch(schema, path, "chars", descriptor));
        }
        if encoded.len() > descriptor.size {
            return Err(CdError::ValueTooLong {
                field: path.to_string(),
                got: encoded.len(),
                capacity: descriptor.size,
            });
        }
        let dst = slice_at_mut(bytes, offset, descriptor.size)?;
        dst.fill(0);
        dst[..encoded.len()].copy_from_slice(&encoded);
        Ok(())
    }

    /// Mutable view of an embedded sub-structure.
    fn substructure_mut(&mut self, path: &str) -> Result<RecordMut<'_>, CdError> {
        let (schema, bytes) = self.parts_mut();
        let (offset, descriptor) = locate(schema, path)?;
        match &descriptor.kind {
            FieldKind::Struct(inner) => {
                let bytes = slice_at_mut(bytes, offset, descriptor.size)?;
                Ok(RecordMut::new(inner, bytes))
            }
            _ => Err(kind_mismatch(schema, path, "structure", descriptor)),
        }
    }
}

/// Whether `path` is the header length or the length/count field of a
/// variable field.
fn controls_length(schema: &StructureSchema, path: &str) -> bool {
    if schema.header().is_some() && path == "Header.Length" {
        return true;
    }
    schema.variables().iter().any(|v| match &v.length {
        LengthSource::Field(field) => field == path,
        LengthSource::Counted { count_field, .. } => count_field == path,
        LengthSource::Remainder | LengthSource::Trailing { .. } => false,
    })
}

/// Writes a scalar field without the length-field guard.
pub(crate) fn write_raw(
    schema: &StructureSchema,
    bytes: &mut [u8],
    path: &str,
    bits: u64,
) -> Result<(), CdError> {
    let (offset, descriptor) = locate(schema, path)?;
    let primitive = scalar(schema, path, descriptor)?;
    if bits & !primitive.mask() != 0 {
        return Err(CdError::ValueOutOfRange {
            field: path.to_string(),
            value: bits as i128,
            primitive,
        });
    }
    let dst = slice_at_mut(bytes, offset, primitive.width())?;
    primitive.write_bits(dst, bits);
    Ok(())
}

fn locate<'s>(
    schema: &'s StructureSchema,
    path: &str,
) -> Result<(usize, &'s FieldDescriptor), CdError> {
    schema.locate(path).ok_or_else(|| not_found(schema, path))
}

fn scalar(
    schema: &StructureSchema,
    path: &str,
    descriptor: &FieldDescriptor,
) -> Result<Primitive, CdError> {
    descriptor
        .primitive()
        .ok_or_else(|| kind_mismatch(schema, path, "scalar", descriptor))
}

fn expect_variable<'s>(
    schema: &'s StructureSchema,
    name: &str,
    expected: &str,
    accepts: impl Fn(&VariableKind) -> bool,
) -> Result<&'s VariableField, CdError> {
    let field = schema.variable(name).ok_or_else(|| not_found(schema, name))?;
    if !accepts(&field.kind) {
        return Err(CdError::KindMismatch {
            structure: schema.name().to_string(),
            field: name.to_string(),
            expected: expected.to_string(),
            actual: field.kind.describe(),
        });
    }
    Ok(field)
}

pub(crate) fn slice_at(bytes: &[u8], start: usize, len: usize) -> Result<&[u8], CdError> {
    let end = start.saturating_add(len);
    bytes.get(start..end).ok_or(CdError::OutOfBounds {
        start,
        end,
        len: bytes.len(),
    })
}

fn slice_at_mut(bytes: &mut [u8], start: usize, len: usize) -> Result<&mut [u8], CdError> {
    let end = start.saturating_add(len);
    let total = bytes.len();
    bytes.get_mut(start..end).ok_or(CdError::OutOfBounds {
        start,
        end,
        len: total,
    })
}

fn not_found(schema: &StructureSchema, field: &str) -> CdError {
    CdError::FieldNotFound {
        structure: schema.name().to_string(),
        field: field.to_string(),
    }
}

pub(crate) fn kind_mismatch(
    schema: &StructureSchema,
    path: &str,
    expected: &str,
    descriptor: &FieldDescriptor,
) -> CdError {
    CdError::KindMismatch {
        structure: schema.name().to_string(),
        field: path.to_string(),
        expected: expected.to_string(),
        actual: descriptor.kind.describe(),
    }
}
