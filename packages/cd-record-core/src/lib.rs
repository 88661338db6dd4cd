//! Schema-driven marshaling for CD records.
//!
//! Provides structure schemas with computed field offsets, typed accessors
//! with raw passthrough for enums and bitfields, variable-length tails that
//! resize in place, and a (signature, area) registry for walking record
//! streams.

mod macros;

pub mod codec;
pub mod config;
pub mod error;
pub mod factory;
pub mod record;
pub mod records;
pub mod registry;
pub mod schema;
pub mod stream;

pub use codec::{FormulaCodec, SourceFormulaCodec, TextCodec, Utf8TextCodec};
pub use config::CodecConfig;
pub use error::CdError;
pub use factory::RecordFactory;
pub use record::{FieldAccess, FieldAccessMut, HeaderKind, Record, RecordMut, RecordRef};
pub use registry::{Area, RecordKey, RecordType, RecordTypeRegistry, Resolution};
pub use schema::{Coded, FlagSet, SchemaBuilder, StructureSchema};
pub use stream::{RecordStream, RecordStreamWriter, StreamEntry};
