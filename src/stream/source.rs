//! Core pull contract for entity stream sources.
//!
//! A source yields entities one at a time through `advance`/`current`. A
//! filter is itself a source that wraps one or more upstream sources and
//! transforms the pulled sequence. All composition is strictly sequential and
//! synchronous; blocking happens only inside a source's own decode step.

use crate::entity::{Entity, EntityKind};
use crate::error::MapStreamError;

/// Which entity kinds an `advance` call should skip over.
///
/// Skip flags let a consumer or filter avoid decode work for uninteresting
/// kinds (e.g., jump straight to the first polyline when points are ignored).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SkipKinds {
    /// Skip point entities.
    pub points: bool,
    /// Skip polyline entities.
    pub polylines: bool,
    /// Skip relation entities.
    pub relations: bool,
}

impl SkipKinds {
    /// Skip nothing: advance to the next entity of any kind.
    #[inline]
    pub const fn none() -> Self {
        Self {
            points: false,
            polylines: false,
            relations: false,
        }
    }

    /// Skip everything except `kind`.
    #[inline]
    pub const fn all_but(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Point => Self {
                points: false,
                polylines: true,
                relations: true,
            },
            EntityKind::Polyline => Self {
                points: true,
                polylines: false,
                relations: true,
            },
            EntityKind::Relation => Self {
                points: true,
                polylines: true,
                relations: false,
            },
        }
    }

    /// Skip only `kind`, keeping the other two.
    #[inline]
    pub const fn only(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Point => Self {
                points: true,
                polylines: false,
                relations: false,
            },
            EntityKind::Polyline => Self {
                points: false,
                polylines: true,
                relations: false,
            },
            EntityKind::Relation => Self {
                points: false,
                polylines: false,
                relations: true,
            },
        }
    }

    /// True if `kind` is excluded by these flags.
    #[inline]
    pub const fn excludes(self, kind: EntityKind) -> bool {
        match kind {
            EntityKind::Point => self.points,
            EntityKind::Polyline => self.polylines,
            EntityKind::Relation => self.relations,
        }
    }
}

/// A pull-based entity stream.
///
/// # Determinism contract
/// For any source reporting `can_reset() == true`, repeated
/// `reset()` + `advance()` sequences must yield identical entities in the
/// same order. Every multi-pass filter in this crate depends on that
/// guarantee. Sources wrapping live, non-replayable feeds must report
/// `can_reset() == false`.
pub trait Source {
    /// Advances to the next entity not excluded by `skip`.
    ///
    /// Returns `Ok(false)` at exhaustion, after which [`Source::current`]
    /// must not be called until a successful `reset`.
    fn advance(&mut self, skip: SkipKinds) -> Result<bool, MapStreamError>;

    /// The entity most recently advanced to.
    ///
    /// # Panics
    /// Calling this before the first successful `advance`, or after
    /// `advance` has returned `Ok(false)`, is a usage-sequencing violation
    /// and panics. It is a programmer error, not a recoverable condition.
    fn current(&self) -> &Entity;

    /// True if this source supports deterministic replay from the beginning.
    fn can_reset(&self) -> bool;

    /// Replays the identical sequence from the beginning.
    ///
    /// # Errors
    /// [`MapStreamError::ResetUnsupported`] when `can_reset()` is false.
    fn reset(&mut self) -> Result<(), MapStreamError>;

    /// Declarative (unverified) hint that the type-order invariant holds:
    /// all points precede all polylines, which precede all relations.
    fn is_sorted(&self) -> bool;
}

impl<S: Source + ?Sized> Source for Box<S> {
    #[inline]
    fn advance(&mut self, skip: SkipKinds) -> Result<bool, MapStreamError> {
        (**self).advance(skip)
    }

    #[inline]
    fn current(&self) -> &Entity {
        (**self).current()
    }

    #[inline]
    fn can_reset(&self) -> bool {
        (**self).can_reset()
    }

    #[inline]
    fn reset(&mut self) -> Result<(), MapStreamError> {
        (**self).reset()
    }

    #[inline]
    fn is_sorted(&self) -> bool {
        (**self).is_sorted()
    }
}
