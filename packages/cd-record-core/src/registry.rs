//! Record-type registry keyed by (signature, area).
//!
//! The same signature value is reused by unrelated record types in different
//! areas, so a signature alone never identifies a type.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::CdError;
use crate::record::RecordHeader;
use crate::schema::{SchemaError, StructureSchema};

/// Context a record stream belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Area {
    RichText,
    Frameset,
    TargetFrame,
    ReservedInternal,
    ViewMap,
    AltSequence,
    EmbeddedAction,
}

impl Area {
    pub const ALL: [Area; 7] = [
        Area::RichText,
        Area::Frameset,
        Area::TargetFrame,
        Area::ReservedInternal,
        Area::ViewMap,
        Area::AltSequence,
        Area::EmbeddedAction,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Area::RichText => "rich-text",
            Area::Frameset => "frameset",
            Area::TargetFrame => "target-frame",
            Area::ReservedInternal => "reserved-internal",
            Area::ViewMap => "view-map",
            Area::AltSequence => "alt-sequence",
            Area::EmbeddedAction => "embedded-action",
        }
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Area {
    type Err = CdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Area::ALL
            .into_iter()
            .find(|area| area.as_str() == normalized)
            .ok_or_else(|| CdError::Config(format!("Unknown area: {}", s)))
    }
}

/// Composite lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordKey {
    /// Normalized signature (see [`RecordHeader::signature`])
    pub signature: u16,
    pub area: Area,
}

impl RecordKey {
    pub const fn new(signature: u16, area: Area) -> Self {
        Self { signature, area }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}@{}", self.signature, self.area)
    }
}

/// A registered record type.
#[derive(Debug, Clone)]
pub struct RecordType {
    pub name: String,
    pub key: RecordKey,
    pub schema: Arc<StructureSchema>,
    /// Name of the record type this one is carried inside, if any
    pub encapsulating: Option<String>,
}

impl RecordType {
    pub fn new(key: RecordKey, schema: Arc<StructureSchema>) -> Self {
        Self {
            name: schema.name().to_string(),
            key,
            schema,
            encapsulating: None,
        }
    }

    pub fn encapsulated_by(mut self, name: impl Into<String>) -> Self {
        self.encapsulating = Some(name.into());
        self
    }
}

/// Outcome of a registry lookup. Unknown keys are not errors.
#[derive(Debug, Clone)]
pub enum Resolution {
    Known(Arc<RecordType>),
    /// No type is registered for this key; skip the record by its length
    Unrecognized(RecordKey),
}

impl Resolution {
    pub fn known(&self) -> Option<&Arc<RecordType>> {
        match self {
            Resolution::Known(record_type) => Some(record_type),
            Resolution::Unrecognized(_) => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Resolution::Known(_))
    }
}

#[derive(Debug, Default)]
struct RegistryInner {
    by_key: HashMap<RecordKey, Arc<RecordType>>,
    by_name: HashMap<String, Arc<RecordType>>,
}

/// Thread-safe record-type registry.
#[derive(Debug, Default)]
pub struct RecordTypeRegistry {
    inner: RwLock<RegistryInner>,
}

impl RecordTypeRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in record type.
    pub fn with_builtin_records() -> Result<Self, CdError> {
        let registry = Self::new();
        crate::records::register_builtin_records(&registry)?;
        Ok(registry)
    }

    /// Registers a record type.
    ///
    /// # Returns
    /// The shared entry, or `Err(SchemaError::AlreadyRegistered)` if the key
    /// or the name is taken.
    pub fn register(&self, record_type: RecordType) -> Result<Arc<RecordType>, CdError> {
        let mut inner = self.inner.write();
        if let Some(existing) = inner.by_key.get(&record_type.key) {
            return Err(SchemaError::AlreadyRegistered(format!(
                "{} ({} is {})",
                record_type.name, record_type.key, existing.name
            ))
            .into());
        }
        if inner.by_name.contains_key(&record_type.name) {
            return Err(SchemaError::AlreadyRegistered(record_type.name.clone()).into());
        }

        tracing::debug!(
            "Registered record type '{}' at {}",
            record_type.name,
            record_type.key
        );
        let record_type = Arc::new(record_type);
        inner
            .by_key
            .insert(record_type.key, Arc::clone(&record_type));
        inner
            .by_name
            .insert(record_type.name.clone(), Arc::clone(&record_type));
        Ok(record_type)
    }

    /// Looks up a (signature, area) pair.
    pub fn resolve(&self, signature: u16, area: Area) -> Resolution {
        let key = RecordKey::new(signature, area);
        match self.inner.read().by_key.get(&key) {
            Some(record_type) => Resolution::Known(Arc::clone(record_type)),
            None => Resolution::Unrecognized(key),
        }
    }

    /// Looks up the type of a parsed header.
    ///
    /// A header whose kind differs from the registered schema's header kind
    /// is treated as unrecognized.
    pub fn resolve_header(&self, header: &RecordHeader, area: Area) -> Resolution {
        match self.resolve(header.signature, area) {
            Resolution::Known(record_type) if record_type.schema.header() != Some(header.kind) => {
                Resolution::Unrecognized(record_type.key)
            }
            resolution => resolution,
        }
    }

    /// Looks up a record type by name.
    pub fn by_name(&self, name: &str) -> Result<Arc<RecordType>, CdError> {
        self.inner
            .read()
            .by_name
            .get(name)
            .cloned()
            .ok_or_else(|| CdError::UnknownRecordType(name.to_string()))
    }

    pub fn contains(&self, key: &RecordKey) -> bool {
        self.inner.read().by_key.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.read().by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().by_key.is_empty()
    }

    /// Registered keys, sorted by area then signature.
    pub fn keys(&self) -> Vec<RecordKey> {
        let mut keys: Vec<RecordKey> = self.inner.read().by_key.keys().copied().collect();
        keys.sort_by_key(|k| (k.area, k.signature));
        keys
    }

    /// Registered types, in [`RecordTypeRegistry::keys`] order.
    pub fn types(&self) -> Vec<Arc<RecordType>> {
        let inner = self.inner.read();
        let mut types: Vec<Arc<RecordType>> = inner.by_key.values().cloned().collect();
        types.sort_by_key(|t| (t.key.area, t.key.signature));
        types
    }
}
