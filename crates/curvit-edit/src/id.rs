#![forbid(unsafe_code)]

//! Stable identifiers for curves and keys.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of a curve wrapper.
///
/// Stays the same for the lifetime of the curve in the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CurveId(pub u64);

impl CurveId {
    /// Create a curve id from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw id value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CurveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "curve#{}", self.0)
    }
}

/// Identifier of a key wrapper.
///
/// Survives moves and value edits of the same logical key, and is reused
/// when an undone insertion is redone or a deleted key is restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeyId(pub u64);

impl KeyId {
    /// Create a key id from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw id value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "key#{}", self.0)
    }
}

/// Monotonic id source.
///
/// Ids start at 1. [`reserve`](Self::reserve) makes sure an id handed in
/// from outside (a restored key) is never issued again.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    /// Create an allocator starting at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next id.
    pub fn allocate(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Mark `id` as used.
    pub fn reserve(&mut self, id: u64) {
        if id >= self.next {
            self.next = id + 1;
        }
    }

    /// The id the next call to [`allocate`](Self::allocate) returns.
    #[must_use]
    pub fn peek(&self) -> u64 {
        self.next
    }
}
