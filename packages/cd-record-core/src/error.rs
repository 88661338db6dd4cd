//! Record access error types.

use thiserror::Error;

use crate::schema::{Primitive, SchemaError};

/// Record marshaling errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CdError {
    /// Field not found in structure
    #[error("Field '{field}' not found in structure '{structure}'")]
    FieldNotFound { structure: String, field: String },

    /// Field exists but has a different semantic kind than the accessor expects
    #[error("Field '{field}' in '{structure}' is {actual}, expected {expected}")]
    KindMismatch {
        structure: String,
        field: String,
        expected: String,
        actual: String,
    },

    /// Value does not fit the declared width/signedness of a field
    #[error("Value {value} out of range for field '{field}' ({primitive})")]
    ValueOutOfRange {
        field: String,
        value: i128,
        primitive: Primitive,
    },

    /// Value longer than a fixed character array or array field
    #[error("Value for field '{field}' has {got} elements, field holds {capacity}")]
    ValueTooLong {
        field: String,
        got: usize,
        capacity: usize,
    },

    /// Byte range outside the record buffer
    #[error("Access {start}..{end} exceeds record of {len} bytes")]
    OutOfBounds { start: usize, end: usize, len: usize },

    /// Resize would push the record beyond its representable length
    #[error("Record '{structure}' would grow to {requested} bytes, limit is {limit} bytes")]
    SizeLimitExceeded {
        structure: String,
        requested: usize,
        limit: usize,
    },

    /// Declared total length disagrees with fixed size plus variable extents
    #[error("Length mismatch in '{structure}': declared {declared} bytes, layout accounts for {computed}")]
    LengthMismatch {
        structure: String,
        declared: usize,
        computed: usize,
    },

    /// Direct write to a field that holds a variable field's length
    #[error("Field '{field}' in '{structure}' holds a record or variable length; resize through set_variable")]
    LengthControlled { structure: String, field: String },

    /// Data rejected by a variable field's length source
    #[error("Variable field '{field}' rejects {len} bytes: {reason}")]
    InvalidVariableLength {
        field: String,
        len: usize,
        reason: String,
    },

    /// Detached view used after the record was resized
    #[error("Stale view: created at generation {view}, record is at generation {current}")]
    StaleView { view: u64, current: u64 },

    /// Record stream ends inside a header or record body
    #[error("Truncated record stream at offset {offset}: {reason}")]
    Truncated { offset: usize, reason: String },

    /// Record type name not present in the registry
    #[error("Record type '{0}' is not registered")]
    UnknownRecordType(String),

    /// Text or formula collaborator failure
    #[error("Codec error: {0}")]
    Codec(String),

    /// Configuration load or override failure
    #[error("Configuration error: {0}")]
    Config(String),

    /// Schema construction failure
    #[error(transparent)]
    Schema(#[from] SchemaError),
}
