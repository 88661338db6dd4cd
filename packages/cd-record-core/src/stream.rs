//! Self-describing record streams.
//!
//! A stream is a run of records, each starting with its header. Readers look
//! every record up by (signature, area); records nobody registered are
//! reported and skipped by their declared length.

use std::sync::Arc;

use crate::config::CodecConfig;
use crate::error::CdError;
use crate::record::{FieldAccess, RecordHeader, RecordRef};
use crate::registry::{Area, RecordKey, RecordType, RecordTypeRegistry, Resolution};

/// One record found in a stream.
#[derive(Debug, Clone)]
pub enum StreamEntry<'a> {
    Known {
        record_type: Arc<RecordType>,
        offset: usize,
        bytes: &'a [u8],
    },
    Unrecognized {
        key: RecordKey,
        offset: usize,
        length: usize,
    },
}

impl<'a> StreamEntry<'a> {
    /// Offset of the record's header within the stream.
    pub fn offset(&self) -> usize {
        match self {
            StreamEntry::Known { offset, .. } | StreamEntry::Unrecognized { offset, .. } => *offset,
        }
    }

    /// Declared record length.
    pub fn length(&self) -> usize {
        match self {
            StreamEntry::Known { bytes, .. } => bytes.len(),
            StreamEntry::Unrecognized { length, .. } => *length,
        }
    }

    /// Accessor view of a recognized record.
    pub fn view(&self) -> Option<RecordRef<'_>> {
        match self {
            StreamEntry::Known {
                record_type, bytes, ..
            } => Some(RecordRef::new(&record_type.schema, bytes)),
            StreamEntry::Unrecognized { .. } => None,
        }
    }
}

/// Iterator over the records of a byte stream.
///
/// Yields `Err` and then stops if a header or record body runs past the end
/// of the data. With `strict_length_check` a recognized record whose layout
/// disagrees with its declared length is reported as `Err` and the walk
/// continues with the next record.
#[derive(Debug)]
pub struct RecordStream<'a> {
    data: &'a [u8],
    offset: usize,
    area: Area,
    registry: &'a RecordTypeRegistry,
    word_aligned: bool,
    strict: bool,
    done: bool,
}

impl<'a> RecordStream<'a> {
    pub fn new(
        data: &'a [u8],
        area: Area,
        registry: &'a RecordTypeRegistry,
        config: &CodecConfig,
    ) -> Self {
        Self {
            data,
            offset: 0,
            area,
            registry,
            word_aligned: config.word_aligned_records,
            strict: config.strict_length_check,
            done: false,
        }
    }

    /// Offset of the next record.
    pub fn position(&self) -> usize {
        self.offset
    }

    fn fail(&mut self, err: CdError) -> Option<Result<StreamEntry<'a>, CdError>> {
        self.done = true;
        Some(Err(err))
    }
}

impl<'a> Iterator for RecordStream<'a> {
    type Item = Result<StreamEntry<'a>, CdError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.offset >= self.data.len() {
            return None;
        }
        let offset = self.offset;

        let header = match RecordHeader::parse(self.data, offset) {
            Ok(header) => header,
            Err(err) => return self.fail(err),
        };
        if header.length < header.size() {
            return self.fail(CdError::Truncated {
                offset,
                reason: format!(
                    "declared length {} is shorter than its {}-byte header",
                    header.length,
                    header.size()
                ),
            });
        }
        let end = offset + header.length;
        if end > self.data.len() {
            return self.fail(CdError::Truncated {
                offset,
                reason: format!(
                    "record of {} bytes, {} available",
                    header.length,
                    self.data.len() - offset
                ),
            });
        }

        let mut next = end;
        if self.word_aligned && header.length % 2 == 1 {
            next += 1;
        }
        self.offset = next.min(self.data.len());

        let bytes = &self.data[offset..end];
        match self.registry.resolve_header(&header, self.area) {
            Resolution::Known(record_type) => {
                if self.strict {
                    if let Err(err) = RecordRef::new(&record_type.schema, bytes).validate() {
                        return Some(Err(err));
                    }
                }
                Some(Ok(StreamEntry::Known {
                    record_type,
                    offset,
                    bytes,
                }))
            }
            Resolution::Unrecognized(key) => {
                tracing::debug!(
                    "Skipping unrecognized record {} ({} bytes) at offset {}",
                    key,
                    header.length,
                    offset
                );
                Some(Ok(StreamEntry::Unrecognized {
                    key,
                    offset,
                    length: header.length,
                }))
            }
        }
    }
}

/// Concatenates records into a stream.
#[derive(Debug, Clone, Default)]
pub struct RecordStreamWriter {
    data: Vec<u8>,
    word_aligned: bool,
    count: usize,
}

impl RecordStreamWriter {
    pub fn new(config: &CodecConfig) -> Self {
        Self {
            data: Vec::new(),
            word_aligned: config.word_aligned_records,
            count: 0,
        }
    }

    /// Appends a record after checking its total-length invariant.
    pub fn push(&mut self, record: &impl FieldAccess) -> Result<(), CdError> {
        record.validate()?;
        self.push_bytes(record.bytes())
    }

    /// Appends raw record bytes. The header length must match the byte count.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<(), CdError> {
        let header = RecordHeader::parse(bytes, 0)?;
        if header.length != bytes.len() {
            return Err(CdError::LengthMismatch {
                structure: format!("record {:#06x}", header.signature),
                declared: header.length,
                computed: bytes.len(),
            });
        }
        self.data.extend_from_slice(bytes);
        if self.word_aligned && bytes.len() % 2 == 1 {
            self.data.push(0);
        }
        self.count += 1;
        Ok(())
    }

    /// Number of records written so far.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn finish(self) -> Vec<u8> {
        self.data
    }
}
