//! Record factory: the entry point that wraps bytes as typed records.

use std::sync::Arc;

use crate::config::CodecConfig;
use crate::error::CdError;
use crate::record::{Record, RecordHeader};
use crate::registry::{Area, RecordKey, RecordTypeRegistry, Resolution};
use crate::schema::{builtin_schemas, SchemaCache};
use crate::stream::{RecordStream, StreamEntry};

/// Wraps byte buffers as records of registered types.
///
/// Holds the registry, the schema cache used for structure sizes, and the
/// codec configuration.
#[derive(Debug)]
pub struct RecordFactory {
    registry: Arc<RecordTypeRegistry>,
    schemas: &'static SchemaCache,
    config: CodecConfig,
}

impl RecordFactory {
    /// Creates a factory over an existing registry.
    pub fn new(registry: Arc<RecordTypeRegistry>, config: CodecConfig) -> Result<Self, CdError> {
        Ok(Self {
            registry,
            schemas: builtin_schemas()?,
            config,
        })
    }

    /// Creates a factory over the built-in record types.
    pub fn with_builtin_records(config: CodecConfig) -> Result<Self, CdError> {
        Self::new(Arc::new(RecordTypeRegistry::with_builtin_records()?), config)
    }

    pub fn registry(&self) -> &Arc<RecordTypeRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Wraps a complete record (header included) found in `area`.
    ///
    /// Bytes past the declared length are ignored. An unregistered signature
    /// comes back as [`StreamEntry::Unrecognized`], not as an error.
    pub fn wrap<'a>(&self, bytes: &'a [u8], area: Area) -> Result<StreamEntry<'a>, CdError> {
        let header = RecordHeader::parse(bytes, 0)?;
        if header.length < header.size() || header.length > bytes.len() {
            return Err(CdError::Truncated {
                offset: 0,
                reason: format!(
                    "declared length {} with {} bytes available",
                    header.length,
                    bytes.len()
                ),
            });
        }
        let entry = match self.registry.resolve_header(&header, area) {
            Resolution::Known(record_type) => StreamEntry::Known {
                record_type,
                offset: 0,
                bytes: &bytes[..header.length],
            },
            Resolution::Unrecognized(key) => StreamEntry::Unrecognized {
                key,
                offset: 0,
                length: header.length,
            },
        };
        Ok(entry)
    }

    /// Copies a record into an owned, resizable [`Record`] of the type
    /// registered at `key`.
    pub fn wrap_key(&self, key: RecordKey, bytes: Vec<u8>) -> Result<Record, CdError> {
        let record_type = match self.registry.resolve(key.signature, key.area) {
            Resolution::Known(record_type) => record_type,
            Resolution::Unrecognized(key) => return Err(CdError::UnknownRecordType(key.to_string())),
        };
        Ok(Record::from_bytes(Arc::clone(&record_type.schema), bytes)?
            .with_limit(self.config.max_record_length as usize))
    }

    /// Creates an empty record of the named type.
    pub fn create(&self, name: &str) -> Result<Record, CdError> {
        let record_type = self.registry.by_name(name)?;
        Ok(Record::for_type(&record_type)?.with_limit(self.config.max_record_length as usize))
    }

    /// Fixed size in bytes of a registered record type or cached structure.
    pub fn size_of(&self, name: &str) -> Option<usize> {
        match self.registry.by_name(name) {
            Ok(record_type) => Some(record_type.schema.fixed_size()),
            Err(_) => self.schemas.size_of(name),
        }
    }

    /// Walks a record stream using this factory's registry and configuration.
    pub fn stream<'a>(&'a self, data: &'a [u8], area: Area) -> RecordStream<'a> {
        RecordStream::new(data, area, &self.registry, &self.config)
    }
}
