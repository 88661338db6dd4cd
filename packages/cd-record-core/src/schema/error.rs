/// Error type for schema construction and registration.
///
/// Every variant is raised while a schema is built or registered, never on
/// first access to a record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("Type '{type_id}' of field '{field}' in '{structure}' cannot be resolved to a width")]
    UnresolvableType {
        structure: String,
        field: String,
        type_id: String,
    },

    #[error("Field '{field}' in '{structure}' has zero width")]
    ZeroWidth { structure: String, field: String },

    #[error("Field '{field}' declared twice in '{structure}'")]
    DuplicateField { structure: String, field: String },

    #[error("Field '{field}' in '{structure}' refers to '{target}', which is not a scalar integer field")]
    InvalidReference {
        structure: String,
        field: String,
        target: String,
    },

    #[error("Variable field '{field}' in '{structure}' must be the last variable field")]
    MisplacedVariable { structure: String, field: String },

    #[error("Masked field '{field}' in '{structure}': mask {mask:#x} >> {shift} does not fit its source")]
    InvalidMask {
        structure: String,
        field: String,
        mask: u64,
        shift: u32,
    },

    #[error("Schema '{0}' already registered")]
    AlreadyRegistered(String),

    #[error("Schema declaration is invalid: {0}")]
    InvalidDeclaration(String),
}
