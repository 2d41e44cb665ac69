//! `MapStreamError`: unified error type for mapstream public APIs
//!
//! This error type is used throughout the mapstream library to provide robust,
//! non-panicking error handling for all public APIs. Every error is surfaced
//! synchronously to the caller of the offending operation; there is no
//! background error channel because the pipeline is strictly sequential.

use crate::entity::{EntityId, EntityKind};
use thiserror::Error;

/// Unified error type for mapstream operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MapStreamError {
    /// Attempted to construct an `EntityId` with a zero value (invalid).
    #[error("EntityId must be non-zero (0 is reserved as invalid/sentinel)")]
    InvalidEntityId,

    /// A multi-pass filter was handed an upstream that cannot replay.
    ///
    /// Raised at construction time, before any pass begins; the pipeline must
    /// be rebuilt from a resettable wrapper.
    #[error("{filter} requires a resettable upstream (can_reset() == false)")]
    SourceNotResettable {
        /// Name of the filter that needs replay capability.
        filter: &'static str,
    },

    /// `reset()` was called on a source that reports `can_reset() == false`.
    #[error("reset() is unsupported by this source (can_reset() == false)")]
    ResetUnsupported,

    /// A single-pass filter that assumes a type-sorted stream observed a
    /// kind-order inversion.
    #[error("source stream is not sorted: {found} entity after {seen}")]
    UnsortedSource {
        /// Kind of the out-of-order entity.
        found: EntityKind,
        /// Later-ranked kind already seen when `found` appeared.
        seen: EntityKind,
    },

    /// A referenced id never appeared in the upstream source.
    ///
    /// Only raised by the completion filter in strict mode; the default
    /// (lenient) mode silently omits dangling references.
    #[error("dangling reference: {kind} {id} is required but never appeared in the source")]
    MissingDependency {
        /// Kind of the missing entity.
        kind: EntityKind,
        /// Id of the missing entity.
        id: EntityId,
    },
}
