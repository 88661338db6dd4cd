//! Borrowed record views.

use crate::schema::StructureSchema;

use super::access::{FieldAccess, FieldAccessMut};

/// Read-only view of a record or embedded structure inside a larger buffer.
#[derive(Debug, Clone, Copy)]
pub struct RecordRef<'a> {
    schema: &'a StructureSchema,
    bytes: &'a [u8],
}

impl<'a> RecordRef<'a> {
    pub fn new(schema: &'a StructureSchema, bytes: &'a [u8]) -> Self {
        Self { schema, bytes }
    }

    /// Bytes backing the view, including any tail.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

impl FieldAccess for RecordRef<'_> {
    fn schema(&self) -> &StructureSchema {
        self.schema
    }

    fn bytes(&self) -> &[u8] {
        self.bytes
    }
}

/// Mutable view over fixed fields of a record or embedded structure.
///
/// A mutable view cannot resize; it borrows a slice whose length is fixed.
#[derive(Debug)]
pub struct RecordMut<'a> {
    schema: &'a StructureSchema,
    bytes: &'a mut [u8],
}

impl<'a> RecordMut<'a> {
    pub fn new(schema: &'a StructureSchema, bytes: &'a mut [u8]) -> Self {
        Self { schema, bytes }
    }

    /// Reborrows as a read-only view.
    pub fn as_view(&self) -> RecordRef<'_> {
        RecordRef::new(self.schema, &*self.bytes)
    }
}

impl FieldAccess for RecordMut<'_> {
    fn schema(&self) -> &StructureSchema {
        self.schema
    }

    fn bytes(&self) -> &[u8] {
        &*self.bytes
    }
}

impl FieldAccessMut for RecordMut<'_> {
    fn parts_mut(&mut self) -> (&StructureSchema, &mut [u8]) {
        (self.schema, &mut *self.bytes)
    }
}
