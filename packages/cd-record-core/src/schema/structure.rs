//! Immutable per-kind structure schemas.

use serde::Serialize;

use super::field::{FieldDescriptor, FieldKind};
use super::masked::MaskedField;
use super::variable::{Confidence, LengthSource, Padding, VariableField};
use crate::record::HeaderKind;

/// Layout of one structure kind: the fixed region, the ordered variable tail
/// and any mask/shift sub-fields.
///
/// Built once by [`SchemaBuilder`](super::SchemaBuilder), shared behind an
/// `Arc`, never mutated.
#[derive(Debug)]
pub struct StructureSchema {
    name: String,
    header: Option<HeaderKind>,
    fields: Vec<FieldDescriptor>,
    variables: Vec<VariableField>,
    masked: Vec<MaskedField>,
    fixed_size: usize,
}

impl StructureSchema {
    /// Assembles a schema from already-placed parts. Validation is the
    /// builder's job.
    pub(crate) fn from_parts(
        name: String,
        header: Option<HeaderKind>,
        fields: Vec<FieldDescriptor>,
        variables: Vec<VariableField>,
        masked: Vec<MaskedField>,
        fixed_size: usize,
    ) -> Self {
        Self {
            name,
            header,
            fields,
            variables,
            masked,
            fixed_size,
        }
    }

    /// Builds a header-less schema of plain fields laid out back to back.
    pub(crate) fn packed(name: &str, fields: &[(&str, FieldKind)]) -> Self {
        let mut offset = 0;
        let mut descriptors = Vec::with_capacity(fields.len());
        for (field_name, kind) in fields {
            let descriptor = FieldDescriptor::new(field_name.to_string(), kind.clone(), offset);
            offset = descriptor.end_offset();
            descriptors.push(descriptor);
        }
        Self::from_parts(
            name.to_string(),
            None,
            descriptors,
            Vec::new(),
            Vec::new(),
            offset,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn header(&self) -> Option<HeaderKind> {
        self.header
    }

    /// Fixed fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Looks up a top-level fixed field.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Resolves a dotted path through embedded sub-structures.
    ///
    /// Returns the offset relative to this structure's start together with
    /// the descriptor of the final field.
    pub fn locate(&self, path: &str) -> Option<(usize, &FieldDescriptor)> {
        match path.split_once('.') {
            None => self.field(path).map(|f| (f.offset, f)),
            Some((head, rest)) => {
                let outer = self.field(head)?;
                match &outer.kind {
                    FieldKind::Struct(inner) => {
                        let (offset, descriptor) = inner.locate(rest)?;
                        Some((outer.offset + offset, descriptor))
                    }
                    _ => None,
                }
            }
        }
    }

    /// Variable fields in tail order.
    pub fn variables(&self) -> &[VariableField] {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&VariableField> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub(crate) fn variable_index(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v.name == name)
    }

    pub fn masked(&self, name: &str) -> Option<&MaskedField> {
        self.masked.iter().find(|m| m.name == name)
    }

    pub fn masked_fields(&self) -> &[MaskedField] {
        &self.masked
    }

    /// Width of the fixed region in bytes.
    pub fn fixed_size(&self) -> usize {
        self.fixed_size
    }

    pub fn has_variable_tail(&self) -> bool {
        !self.variables.is_empty()
    }

    /// Largest total length the header can represent, if the structure has one.
    pub fn max_length(&self) -> Option<usize> {
        self.header.map(|h| h.max_length())
    }

    /// Serializable summary of the layout.
    pub fn describe(&self) -> SchemaDescription {
        SchemaDescription {
            name: self.name.clone(),
            header: self.header,
            fixed_size: self.fixed_size,
            fields: self
                .fields
                .iter()
                .map(|f| FieldDescription {
                    name: f.name.clone(),
                    offset: f.offset,
                    size: f.size,
                    r#type: f.kind.describe(),
                })
                .collect(),
            variables: self
                .variables
                .iter()
                .map(|v| VariableDescription {
                    name: v.name.clone(),
                    kind: v.kind.describe(),
                    length: match &v.length {
                        LengthSource::Field(name) => format!("field:{}", name),
                        LengthSource::Counted {
                            count_field,
                            element_size,
                        } => format!("count:{}x{}", count_field, element_size),
                        LengthSource::Remainder => "remainder".to_string(),
                        LengthSource::Trailing { size } => format!("trailing:{}", size),
                    },
                    padding: v.padding,
                    confidence: v.confidence,
                })
                .collect(),
            masked: self
                .masked
                .iter()
                .map(|m| MaskedDescription {
                    name: m.name.clone(),
                    source: m.source.clone(),
                    mask: m.mask,
                    shift: m.shift,
                })
                .collect(),
        }
    }
}

/// Schema summary for tooling output.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaDescription {
    pub name: String,
    pub header: Option<HeaderKind>,
    pub fixed_size: usize,
    pub fields: Vec<FieldDescription>,
    pub variables: Vec<VariableDescription>,
    pub masked: Vec<MaskedDescription>,
}

/// Fixed field summary.
#[derive(Debug, Clone, Serialize)]
pub struct FieldDescription {
    pub name: String,
    pub offset: usize,
    pub size: usize,
    pub r#type: String,
}

/// Variable field summary.
#[derive(Debug, Clone, Serialize)]
pub struct VariableDescription {
    pub name: String,
    pub kind: String,
    pub length: String,
    pub padding: Padding,
    pub confidence: Confidence,
}

/// Masked sub-field summary.
#[derive(Debug, Clone, Serialize)]
pub struct MaskedDescription {
    pub name: String,
    pub source: String,
    pub mask: u64,
    pub shift: u32,
}
