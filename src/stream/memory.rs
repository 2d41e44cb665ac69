//! In-memory implementation of the [`Source`] trait.
//!
//! `MemorySource` replays a `Vec<Entity>` and is the canonical resettable
//! source: replay is trivially byte-identical and `reset()` is O(1). It backs
//! tests, benches, and any pipeline stage that has already materialized its
//! entities. It also counts its resets so multi-pass filters can be audited.

use crate::entity::Entity;
use crate::error::MapStreamError;
use crate::stream::source::{SkipKinds, Source};

/// A resettable source over an in-memory entity sequence.
#[derive(Clone, Debug)]
pub struct MemorySource {
    entities: Vec<Entity>,
    /// Index of the *next* entity to visit.
    cursor: usize,
    /// Index of the current entity, if positioned.
    current: Option<usize>,
    sorted: bool,
    resets: usize,
}

impl MemorySource {
    /// Creates a source over `entities`, auto-detecting the sorted hint from
    /// the actual kind order of the sequence.
    pub fn new(entities: Vec<Entity>) -> Self {
        let sorted = entities.windows(2).all(|w| w[0].kind() <= w[1].kind());
        Self {
            entities,
            cursor: 0,
            current: None,
            sorted,
            resets: 0,
        }
    }

    /// Overrides the declarative sorted hint (it is never verified by the
    /// contract; tests use this to exercise sort detection).
    pub fn with_sorted_hint(mut self, sorted: bool) -> Self {
        self.sorted = sorted;
        self
    }

    /// Number of `reset()` calls served so far.
    ///
    /// Lets tests assert how many passes a multi-pass filter actually made.
    #[inline]
    pub fn resets(&self) -> usize {
        self.resets
    }

    /// Number of entities in the backing sequence.
    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// True if the backing sequence is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl FromIterator<Entity> for MemorySource {
    fn from_iter<I: IntoIterator<Item = Entity>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Source for MemorySource {
    fn advance(&mut self, skip: SkipKinds) -> Result<bool, MapStreamError> {
        while let Some(e) = self.entities.get(self.cursor) {
            self.cursor += 1;
            if !skip.excludes(e.kind()) {
                self.current = Some(self.cursor - 1);
                return Ok(true);
            }
        }
        self.current = None;
        Ok(false)
    }

    fn current(&self) -> &Entity {
        let idx = self
            .current
            .expect("current() called before advance() or after exhaustion");
        &self.entities[idx]
    }

    fn can_reset(&self) -> bool {
        true
    }

    fn reset(&mut self) -> Result<(), MapStreamError> {
        self.cursor = 0;
        self.current = None;
        self.resets += 1;
        Ok(())
    }

    fn is_sorted(&self) -> bool {
        self.sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityId, Point, Polyline};

    fn eid(raw: u64) -> EntityId {
        EntityId::new(raw).unwrap()
    }

    fn sample() -> Vec<Entity> {
        vec![
            Point::new(eid(1), 0.0, 0.0).into(),
            Point::new(eid(2), 1.0, 1.0).into(),
            Polyline::new(eid(10), vec![eid(1), eid(2)]).into(),
        ]
    }

    #[test]
    fn advances_in_order_and_exhausts() {
        let mut src = MemorySource::new(sample());
        assert!(src.advance(SkipKinds::none()).unwrap());
        assert_eq!(src.current().id(), eid(1));
        assert!(src.advance(SkipKinds::none()).unwrap());
        assert!(src.advance(SkipKinds::none()).unwrap());
        assert_eq!(src.current().id(), eid(10));
        assert!(!src.advance(SkipKinds::none()).unwrap());
    }

    #[test]
    fn skip_flags_jump_past_kinds() {
        let mut src = MemorySource::new(sample());
        assert!(src
            .advance(SkipKinds::all_but(crate::entity::EntityKind::Polyline))
            .unwrap());
        assert_eq!(src.current().id(), eid(10));
    }

    #[test]
    fn reset_replays_identically() {
        let mut src = MemorySource::new(sample());
        while src.advance(SkipKinds::none()).unwrap() {}
        src.reset().unwrap();
        assert!(src.advance(SkipKinds::none()).unwrap());
        assert_eq!(src.current().id(), eid(1));
        assert_eq!(src.resets(), 1);
    }

    #[test]
    fn detects_sorted_hint() {
        assert!(MemorySource::new(sample()).is_sorted());
        let mut unsorted = sample();
        unsorted.reverse();
        assert!(!MemorySource::new(unsorted).is_sorted());
    }

    #[test]
    #[should_panic(expected = "current() called before advance()")]
    fn current_before_advance_panics() {
        let src = MemorySource::new(sample());
        let _ = src.current();
    }
}
