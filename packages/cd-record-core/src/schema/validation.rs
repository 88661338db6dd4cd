//! Construction-time validation of structure schemas.

use std::collections::HashSet;

use super::error::SchemaError;
use super::field::{FieldDescriptor, FieldKind};
use super::structure::StructureSchema;
use super::variable::LengthSource;

/// Runs every structural check on a freshly assembled schema.
pub(crate) fn validate_schema(schema: &StructureSchema) -> Result<(), SchemaError> {
    validate_unique_names(schema)?;
    validate_field_layout(schema.name(), schema.fields())?;
    validate_variables(schema)?;
    validate_masks(schema)?;
    Ok(())
}

/// Field, variable and masked names share one namespace.
fn validate_unique_names(schema: &StructureSchema) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    let names = schema
        .fields()
        .iter()
        .map(|f| f.name.as_str())
        .chain(schema.variables().iter().map(|v| v.name.as_str()))
        .chain(schema.masked_fields().iter().map(|m| m.name.as_str()));

    for name in names {
        if !seen.insert(name) {
            return Err(SchemaError::DuplicateField {
                structure: schema.name().to_string(),
                field: name.to_string(),
            });
        }
    }
    Ok(())
}

/// Validates widths and that offsets are the prefix sums of earlier widths.
fn validate_field_layout(structure: &str, fields: &[FieldDescriptor]) -> Result<(), SchemaError> {
    let mut expected = 0usize;
    for field in fields {
        if field.size == 0 {
            return Err(SchemaError::ZeroWidth {
                structure: structure.to_string(),
                field: field.name.clone(),
            });
        }
        if field.offset != expected {
            return Err(SchemaError::InvalidDeclaration(format!(
                "field '{}' in '{}' at offset {}, expected {}",
                field.name, structure, field.offset, expected
            )));
        }
        expected = field.end_offset();
    }
    Ok(())
}

/// Length references must name scalar integer fields; open-ended fields
/// must come last.
fn validate_variables(schema: &StructureSchema) -> Result<(), SchemaError> {
    let variables = schema.variables();
    for (index, variable) in variables.iter().enumerate() {
        if let Some(target) = variable.length.field() {
            let is_integer = matches!(
                schema.locate(target).map(|(_, f)| &f.kind),
                Some(FieldKind::Integer(_))
            );
            if !is_integer {
                return Err(SchemaError::InvalidReference {
                    structure: schema.name().to_string(),
                    field: variable.name.clone(),
                    target: target.to_string(),
                });
            }
        }

        let zero_sized = match variable.length {
            LengthSource::Counted { element_size, .. } => element_size == 0,
            LengthSource::Trailing { size } => size == 0,
            _ => false,
        };
        if zero_sized {
            return Err(SchemaError::ZeroWidth {
                structure: schema.name().to_string(),
                field: variable.name.clone(),
            });
        }

        if variable.length.is_open_ended() && index + 1 != variables.len() {
            return Err(SchemaError::MisplacedVariable {
                structure: schema.name().to_string(),
                field: variable.name.clone(),
            });
        }
    }
    Ok(())
}

/// A mask must sit inside its source word and start at or above its shift.
fn validate_masks(schema: &StructureSchema) -> Result<(), SchemaError> {
    for masked in schema.masked_fields() {
        let primitive = match schema.locate(&masked.source).map(|(_, f)| &f.kind) {
            Some(FieldKind::Integer(p)) => *p,
            Some(FieldKind::Flags { primitive, .. }) => *primitive,
            _ => {
                return Err(SchemaError::InvalidReference {
                    structure: schema.name().to_string(),
                    field: masked.name.clone(),
                    target: masked.source.clone(),
                })
            }
        };

        let fits = masked.mask != 0
            && masked.mask & !primitive.mask() == 0
            && masked.mask.trailing_zeros() >= masked.shift;
        if !fits {
            return Err(SchemaError::InvalidMask {
                structure: schema.name().to_string(),
                field: masked.name.clone(),
                mask: masked.mask,
                shift: masked.shift,
            });
        }
    }
    Ok(())
}
