//! Declarative schema construction.

use std::sync::Arc;

use super::enums::{BitFlag, CodeEnum};
use super::error::SchemaError;
use super::field::{FieldDescriptor, FieldKind};
use super::masked::MaskedField;
use super::primitive::Primitive;
use super::structure::StructureSchema;
use super::validation;
use super::variable::VariableField;
use crate::record::HeaderKind;

/// Builds a [`StructureSchema`] from an ordered field list.
///
/// Fixed fields are packed in declaration order with no alignment padding;
/// each offset is the sum of the widths declared before it.
///
/// ```ignore
/// let schema = SchemaBuilder::new("CDFRAME")
///     .header(HeaderKind::Word)
///     .flags::<FrameFlag>("Flags", Primitive::U32)
///     .int("FrameNameLength", Primitive::U16)
///     .variable(VariableField::text("FrameName", "FrameNameLength"))
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    name: String,
    header: Option<HeaderKind>,
    fields: Vec<(String, FieldKind)>,
    variables: Vec<VariableField>,
    masked: Vec<MaskedField>,
}

impl SchemaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            header: None,
            fields: Vec::new(),
            variables: Vec::new(),
            masked: Vec::new(),
        }
    }

    /// Prepends the record header as an embedded structure named `Header`.
    pub fn header(mut self, kind: HeaderKind) -> Self {
        if self.header.is_none() {
            self.fields
                .insert(0, ("Header".to_string(), FieldKind::Struct(kind.schema())));
        }
        self.header = Some(kind);
        self
    }

    /// Adds a field of any kind.
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push((name.into(), kind));
        self
    }

    pub fn int(self, name: impl Into<String>, primitive: Primitive) -> Self {
        self.field(name, FieldKind::Integer(primitive))
    }

    /// Adds a single-valued enum field decoded against `E`.
    pub fn enumeration<E: CodeEnum>(self, name: impl Into<String>, primitive: Primitive) -> Self {
        self.field(
            name,
            FieldKind::Enum {
                primitive,
                domain: E::DOMAIN.to_string(),
            },
        )
    }

    /// Adds a bitfield decoded against `F`.
    pub fn flags<F: BitFlag>(self, name: impl Into<String>, primitive: Primitive) -> Self {
        self.field(
            name,
            FieldKind::Flags {
                primitive,
                domain: F::DOMAIN.to_string(),
            },
        )
    }

    pub fn array(self, name: impl Into<String>, element: Primitive, len: usize) -> Self {
        self.field(name, FieldKind::Array { element, len })
    }

    pub fn chars(self, name: impl Into<String>, len: usize) -> Self {
        self.field(name, FieldKind::Chars { len })
    }

    pub fn substructure(self, name: impl Into<String>, schema: Arc<StructureSchema>) -> Self {
        self.field(name, FieldKind::Struct(schema))
    }

    /// Adds a mask/shift accessor over the integer or flags field at `source`.
    pub fn masked(
        mut self,
        name: impl Into<String>,
        source: impl Into<String>,
        mask: u64,
        shift: u32,
    ) -> Self {
        self.masked.push(MaskedField::new(name, source, mask, shift));
        self
    }

    /// Appends a field to the variable tail.
    pub fn variable(mut self, field: VariableField) -> Self {
        self.variables.push(field);
        self
    }

    /// Places every fixed field and validates the result.
    pub fn build(self) -> Result<StructureSchema, SchemaError> {
        let mut offset = 0usize;
        let mut descriptors = Vec::with_capacity(self.fields.len());

        for (name, kind) in self.fields {
            let descriptor = FieldDescriptor::new(name, kind, offset);
            offset = offset.checked_add(descriptor.size).ok_or_else(|| {
                SchemaError::InvalidDeclaration(format!(
                    "fixed region of '{}' overflows at field '{}'",
                    self.name, descriptor.name
                ))
            })?;
            descriptors.push(descriptor);
        }

        let schema = StructureSchema::from_parts(
            self.name,
            self.header,
            descriptors,
            self.variables,
            self.masked,
            offset,
        );
        validation::validate_schema(&schema)?;

        tracing::debug!(
            "Built schema '{}' ({} fixed bytes, {} variable fields)",
            schema.name(),
            schema.fixed_size(),
            schema.variables().len()
        );
        Ok(schema)
    }
}
