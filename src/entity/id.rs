//! `EntityId`: a strong, zero-cost handle for map entities
//!
//! Every entity in a map dataset is identified by a numeric id that is only
//! meaningful together with its kind: polyline 5 and relation 5 are unrelated.
//! `EntityId` wraps a nonzero `u64` to enforce at compile- and runtime that 0
//! is reserved as an invalid or sentinel value.
//!
//! This module provides:
//! - A transparent `EntityId` newtype around `NonZeroU64` for zero-cost
//!   memory layout guarantees.
//! - A fallible constructor and accessors.
//! - Implementations of common traits (`Debug`, `Display`, ordering,
//!   hashing) so `EntityId` can be used in maps, sets, and printed easily.

use crate::error::MapStreamError;
use std::{fmt, num::NonZeroU64};

/// Opaque numeric identifier of a single map entity.
///
/// # Memory layout
/// This type is `repr(transparent)`, meaning it has the same ABI and
/// alignment as its single field (`NonZeroU64`).
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(transparent)]
pub struct EntityId(NonZeroU64);

impl EntityId {
    /// Creates a new `EntityId` from a raw `u64` value.
    ///
    /// # Errors
    /// Returns [`MapStreamError::InvalidEntityId`] if `raw == 0`; 0 is
    /// reserved as an invalid or sentinel value.
    #[inline]
    pub fn new(raw: u64) -> Result<Self, MapStreamError> {
        NonZeroU64::new(raw)
            .map(EntityId)
            .ok_or(MapStreamError::InvalidEntityId)
    }

    /// Returns the inner `u64` value of this `EntityId`.
    ///
    /// This is a cheap, const-time getter. Use it when you need to inspect
    /// or print the raw integer, but prefer to work with `EntityId` otherwise
    /// for type safety.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

/// Custom `Debug` implementation to display as `EntityId(raw_value)`.
impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntityId").field(&self.get()).finish()
    }
}

/// Prints the numeric id without any wrapper text.
impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_id_is_rejected() {
        assert_eq!(EntityId::new(0), Err(MapStreamError::InvalidEntityId));
    }

    #[test]
    fn roundtrips_raw_value() {
        let id = EntityId::new(42).unwrap();
        assert_eq!(id.get(), 42);
        assert_eq!(id.to_string(), "42");
    }
}
