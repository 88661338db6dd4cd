//! Owned record storage with generation tracking.
//!
//! A resize replaces the whole byte vector. Borrowed views are protected by
//! the borrow checker; detached [`ViewHandle`]s carry the generation they were
//! taken at and fail with [`CdError::StaleView`] once the storage moves on.

use std::ops::Range;

use crate::error::CdError;

/// Byte storage of a single record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordBuffer {
    data: Vec<u8>,
    /// Incremented on every mutable access and every replacement
    generation: u64,
}

/// Detached reference to a byte range of a [`RecordBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewHandle {
    pub start: usize,
    pub len: usize,
    pub generation: u64,
}

impl ViewHandle {
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.len
    }
}

impl RecordBuffer {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            generation: 0,
        }
    }

    /// Creates a zero-filled buffer of `len` bytes.
    pub fn zeroed(len: usize) -> Self {
        Self::new(vec![0u8; len])
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Mutable access to the bytes in place.
    ///
    /// Writes may change length fields and thereby the tail layout, so any
    /// outstanding handle is invalidated.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        self.generation += 1;
        &mut self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Swaps in new storage, returning the old bytes.
    pub fn replace(&mut self, data: Vec<u8>) -> Vec<u8> {
        self.generation += 1;
        std::mem::replace(&mut self.data, data)
    }

    /// Bounds-checked slice of the current storage.
    pub fn slice(&self, range: Range<usize>) -> Result<&[u8], CdError> {
        self.data.get(range.clone()).ok_or(CdError::OutOfBounds {
            start: range.start,
            end: range.end,
            len: self.data.len(),
        })
    }

    /// Takes a detached handle on `range` at the current generation.
    pub fn handle(&self, range: Range<usize>) -> Result<ViewHandle, CdError> {
        self.slice(range.clone())?;
        Ok(ViewHandle {
            start: range.start,
            len: range.end - range.start,
            generation: self.generation,
        })
    }

    /// Resolves a handle taken earlier.
    ///
    /// # Returns
    /// `Err(CdError::StaleView)` if the buffer was mutated or replaced since.
    pub fn resolve(&self, handle: &ViewHandle) -> Result<&[u8], CdError> {
        if handle.generation != self.generation {
            return Err(CdError::StaleView {
                view: handle.generation,
                current: self.generation,
            });
        }
        self.slice(handle.range())
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}
