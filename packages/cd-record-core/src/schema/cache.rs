use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use super::error::SchemaError;
use super::structure::StructureSchema;
use crate::record::HeaderKind;

/// Memoized schemas keyed by structure name.
///
/// Each kind is built at most once; every record of that kind shares the
/// same `Arc<StructureSchema>`.
#[derive(Debug, Default)]
pub struct SchemaCache {
    schemas: RwLock<HashMap<String, Arc<StructureSchema>>>,
}

impl SchemaCache {
    /// Creates a new empty schema cache.
    pub fn new() -> Self {
        Self {
            schemas: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a cache pre-seeded with the three record header structures.
    pub fn with_headers() -> Self {
        let cache = Self::new();
        {
            let mut schemas = cache.schemas.write();
            for kind in [HeaderKind::Byte, HeaderKind::Word, HeaderKind::Long] {
                let schema = kind.schema();
                schemas.insert(schema.name().to_string(), schema);
            }
        }
        cache
    }

    /// Retrieves a schema by structure name.
    pub fn get(&self, name: &str) -> Option<Arc<StructureSchema>> {
        self.schemas.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.read().contains_key(name)
    }

    /// Registers a schema under its own name.
    ///
    /// # Returns
    /// The shared schema, or `Err(SchemaError::AlreadyRegistered)`.
    pub fn insert(&self, schema: StructureSchema) -> Result<Arc<StructureSchema>, SchemaError> {
        let mut schemas = self.schemas.write();
        if schemas.contains_key(schema.name()) {
            return Err(SchemaError::AlreadyRegistered(schema.name().to_string()));
        }
        let schema = Arc::new(schema);
        schemas.insert(schema.name().to_string(), Arc::clone(&schema));
        Ok(schema)
    }

    /// Returns the cached schema for `name`, building it on first use.
    ///
    /// A build failure is returned unchanged and nothing is cached.
    pub fn get_or_try_insert_with(
        &self,
        name: &str,
        build: impl FnOnce() -> Result<StructureSchema, SchemaError>,
    ) -> Result<Arc<StructureSchema>, SchemaError> {
        if let Some(schema) = self.get(name) {
            return Ok(schema);
        }

        let schema = build()?;
        let mut schemas = self.schemas.write();
        let entry = schemas
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(schema));
        Ok(Arc::clone(entry))
    }

    /// Fixed size of the named structure in bytes.
    pub fn size_of(&self, name: &str) -> Option<usize> {
        self.schemas.read().get(name).map(|s| s.fixed_size())
    }

    /// Registered structure names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.schemas.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.schemas.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.read().is_empty()
    }
}

/// Process-wide cache holding the headers and every built-in record schema.
///
/// Built on first call. A failure here means a built-in declaration is
/// broken, and it is reported on every call.
pub fn builtin_schemas() -> Result<&'static SchemaCache, SchemaError> {
    static BUILTIN: OnceLock<Result<SchemaCache, SchemaError>> = OnceLock::new();
    BUILTIN
        .get_or_init(|| {
            let cache = SchemaCache::with_headers();
            crate::records::register_builtin_schemas(&cache)?;
            Ok(cache)
        })
        .as_ref()
        .map_err(Clone::clone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Primitive, SchemaBuilder};

    fn point() -> Result<StructureSchema, SchemaError> {
        SchemaBuilder::new("POINT")
            .int("x", Primitive::I16)
            .int("y", Primitive::I16)
            .build()
    }

    #[test]
    fn test_memoized_by_name() {
        let cache = SchemaCache::new();
        let first = cache.get_or_try_insert_with("POINT", point).unwrap();
        let second = cache
            .get_or_try_insert_with("POINT", || panic!("must not rebuild"))
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.size_of("POINT"), Some(4));
    }

    #[test]
    fn test_insert_twice_fails() {
        let cache = SchemaCache::new();
        cache.insert(point().unwrap()).unwrap();
        let err = cache.insert(point().unwrap()).unwrap_err();
        assert_eq!(err, SchemaError::AlreadyRegistered("POINT".to_string()));
    }

    #[test]
    fn test_headers_seeded() {
        let cache = SchemaCache::with_headers();
        assert_eq!(cache.size_of("BSIG"), Some(2));
        assert_eq!(cache.size_of("WSIG"), Some(4));
        assert_eq!(cache.size_of("LSIG"), Some(6));
    }

    #[test]
    fn test_builtin_schemas_build() {
        let cache = builtin_schemas().unwrap();
        assert!(cache.contains("CDACTION"));
        assert!(cache.contains("COLOR_VALUE"));
    }
}
