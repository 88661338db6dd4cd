//! Structure schemas: field descriptors, offset calculation, enum domains,
//! variable tail specifications and the per-kind schema cache.

mod builder;
mod cache;
mod decl;
mod enums;
mod error;
mod field;
mod masked;
mod primitive;
mod structure;
pub(crate) mod validation;
mod variable;

pub use builder::SchemaBuilder;
pub use cache::{builtin_schemas, SchemaCache};
pub use decl::{FieldDecl, MaskedDecl, SchemaDecl, VariableDecl};
pub use enums::{BitFlag, CodeEnum, Coded, FlagSet};
pub use error::SchemaError;
pub use field::{FieldDescriptor, FieldKind};
pub use masked::MaskedField;
pub use primitive::Primitive;
pub use structure::{
    FieldDescription, MaskedDescription, SchemaDescription, StructureSchema, VariableDescription,
};
pub use variable::{Confidence, LengthSource, Padding, VariableField, VariableKind};
