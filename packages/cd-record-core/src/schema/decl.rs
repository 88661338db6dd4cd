//! Schema declaration files.
//!
//! A declaration names every field by a type string so schemas can be kept
//! as data:
//!
//! ```toml
//! name = "CDEXAMPLE"
//! header = "word"
//!
//! [[fields]]
//! name = "Flags"
//! type = "DWORD"
//! flags = "ExampleFlag"
//!
//! [[fields]]
//! name = "TitleLen"
//! type = "WORD"
//!
//! [[fields]]
//! name = "Color"
//! type = "COLOR_VALUE"
//!
//! [[variables]]
//! name = "Title"
//! kind = "text"
//! length_field = "TitleLen"
//! padding = "word"
//! ```

use serde::{Deserialize, Serialize};

use super::builder::SchemaBuilder;
use super::cache::SchemaCache;
use super::error::SchemaError;
use super::field::FieldKind;
use super::primitive::Primitive;
use super::structure::StructureSchema;
use super::variable::{LengthSource, Padding, VariableField, VariableKind};
use crate::record::HeaderKind;

/// Declarative form of a structure schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDecl {
    pub name: String,
    #[serde(default)]
    pub header: Option<HeaderKind>,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    #[serde(default)]
    pub variables: Vec<VariableDecl>,
    #[serde(default)]
    pub masked: Vec<MaskedDecl>,
}

/// Fixed field declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    /// Primitive, `T[N]`, `char[N]`, or a cached structure name
    #[serde(rename = "type")]
    pub type_id: String,
    /// Enum domain for a single-valued enum field
    #[serde(default, rename = "enum")]
    pub enumeration: Option<String>,
    /// Enum domain for a bitfield
    #[serde(default)]
    pub flags: Option<String>,
}

/// Variable tail field declaration. Exactly one length source must be given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDecl {
    pub name: String,
    /// `text`, `formula`, `script`, `blob` or `list:<STRUCTURE>`
    pub kind: String,
    #[serde(default)]
    pub length_field: Option<String>,
    #[serde(default)]
    pub count_field: Option<String>,
    #[serde(default)]
    pub remainder: bool,
    #[serde(default)]
    pub trailing_size: Option<usize>,
    #[serde(default)]
    pub padding: Padding,
    #[serde(default)]
    pub version_dependent: bool,
}

/// Mask/shift sub-field declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskedDecl {
    pub name: String,
    pub source: String,
    pub mask: u64,
    pub shift: u32,
}

impl SchemaDecl {
    pub fn from_toml(toml_str: &str) -> Result<Self, SchemaError> {
        toml::from_str(toml_str)
            .map_err(|e| SchemaError::InvalidDeclaration(format!("Invalid TOML: {}", e)))
    }

    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(json)
            .map_err(|e| SchemaError::InvalidDeclaration(format!("Invalid JSON: {}", e)))
    }

    /// Resolves every type string against `cache` and builds the schema.
    ///
    /// Structure-typed fields and list elements must already be cached.
    pub fn build(&self, cache: &SchemaCache) -> Result<StructureSchema, SchemaError> {
        let mut builder = SchemaBuilder::new(self.name.clone());
        if let Some(header) = self.header {
            builder = builder.header(header);
        }
        for field in &self.fields {
            builder = builder.field(field.name.clone(), self.resolve_field(field, cache)?);
        }
        for variable in &self.variables {
            builder = builder.variable(self.resolve_variable(variable, cache)?);
        }
        for masked in &self.masked {
            builder = builder.masked(
                masked.name.clone(),
                masked.source.clone(),
                masked.mask,
                masked.shift,
            );
        }
        builder.build()
    }

    fn resolve_field(&self, field: &FieldDecl, cache: &SchemaCache) -> Result<FieldKind, SchemaError> {
        let unresolvable = || SchemaError::UnresolvableType {
            structure: self.name.clone(),
            field: field.name.clone(),
            type_id: field.type_id.clone(),
        };
        let type_id = field.type_id.trim();

        if let Some((base, rest)) = type_id.split_once('[') {
            let len: usize = rest
                .strip_suffix(']')
                .and_then(|n| n.trim().parse().ok())
                .ok_or_else(unresolvable)?;
            if base.trim() == "char" {
                return Ok(FieldKind::Chars { len });
            }
            let element = Primitive::parse(base.trim()).ok_or_else(unresolvable)?;
            return Ok(FieldKind::Array { element, len });
        }

        if let Some(primitive) = Primitive::parse(type_id) {
            return match (&field.enumeration, &field.flags) {
                (None, None) => Ok(FieldKind::Integer(primitive)),
                (Some(domain), None) => Ok(FieldKind::Enum {
                    primitive,
                    domain: domain.clone(),
                }),
                (None, Some(domain)) => Ok(FieldKind::Flags {
                    primitive,
                    domain: domain.clone(),
                }),
                (Some(_), Some(_)) => Err(SchemaError::InvalidDeclaration(format!(
                    "field '{}' in '{}' cannot be both enum and flags",
                    field.name, self.name
                ))),
            };
        }

        cache.get(type_id).map(FieldKind::Struct).ok_or_else(unresolvable)
    }

    fn resolve_variable(
        &self,
        variable: &VariableDecl,
        cache: &SchemaCache,
    ) -> Result<VariableField, SchemaError> {
        let kind = match variable.kind.as_str() {
            "text" => VariableKind::Text,
            "formula" => VariableKind::Formula,
            "script" => VariableKind::Script,
            "blob" => VariableKind::Blob,
            other => {
                let element = other
                    .strip_prefix("list:")
                    .and_then(|name| cache.get(name.trim()))
                    .ok_or_else(|| SchemaError::UnresolvableType {
                        structure: self.name.clone(),
                        field: variable.name.clone(),
                        type_id: other.to_string(),
                    })?;
                VariableKind::List(element)
            }
        };

        let length = match (
            &variable.length_field,
            &variable.count_field,
            variable.remainder,
            variable.trailing_size,
        ) {
            (Some(field), None, false, None) => LengthSource::Field(field.clone()),
            (None, Some(count_field), false, None) => {
                let element_size = match &kind {
                    VariableKind::List(element) => element.fixed_size(),
                    _ => 1,
                };
                LengthSource::Counted {
                    count_field: count_field.clone(),
                    element_size,
                }
            }
            (None, None, true, None) => LengthSource::Remainder,
            (None, None, false, Some(size)) => LengthSource::Trailing { size },
            _ => {
                return Err(SchemaError::InvalidDeclaration(format!(
                    "variable field '{}' in '{}' needs exactly one length source",
                    variable.name, self.name
                )))
            }
        };

        let mut field = VariableField::new(variable.name.clone(), kind, length)
            .with_padding(variable.padding);
        if variable.version_dependent {
            field = field.version_dependent();
        }
        Ok(field)
    }
}
