//! Shared builders and stream doubles for the integration tests.
#![allow(dead_code)]

use mapstream::prelude::*;
use std::cell::Cell;
use std::rc::Rc;

pub fn eid(raw: u64) -> EntityId {
    EntityId::new(raw).expect("nonzero EntityId")
}

pub fn point(id: u64, lat: f64, lon: f64) -> Entity {
    Point::new(eid(id), lat, lon).into()
}

pub fn tagged_point(id: u64, lat: f64, lon: f64, key: &str, value: &str) -> Entity {
    Point::with_tags(eid(id), lat, lon, [(key, value)].into_iter().collect()).into()
}

pub fn polyline(id: u64, points: &[u64]) -> Entity {
    Polyline::new(eid(id), points.iter().map(|&p| eid(p)).collect()).into()
}

pub fn tagged_polyline(id: u64, points: &[u64], key: &str, value: &str) -> Entity {
    Polyline::with_tags(
        eid(id),
        points.iter().map(|&p| eid(p)).collect(),
        [(key, value)].into_iter().collect(),
    )
    .into()
}

pub fn relation(id: u64, members: &[(EntityKind, u64)]) -> Entity {
    Relation::new(
        eid(id),
        members
            .iter()
            .map(|&(kind, m)| Member::new(kind, eid(m), ""))
            .collect(),
    )
    .into()
}

pub fn tagged_relation(id: u64, members: &[(EntityKind, u64)], key: &str, value: &str) -> Entity {
    Relation::with_tags(
        eid(id),
        members
            .iter()
            .map(|&(kind, m)| Member::new(kind, eid(m), ""))
            .collect(),
        [(key, value)].into_iter().collect(),
    )
    .into()
}

/// (kind, id) projection of an output sequence, for order assertions.
pub fn keys(entities: &[Entity]) -> Vec<(EntityKind, u64)> {
    entities.iter().map(|e| (e.kind(), e.id().get())).collect()
}

/// True if the output contains the given (kind, id).
pub fn contains(entities: &[Entity], kind: EntityKind, id: u64) -> bool {
    entities.iter().any(|e| e.kind() == kind && e.id() == eid(id))
}

/// Wraps a `MemorySource` but denies the replay capability, modeling a
/// live/non-replayable feed.
#[derive(Debug)]
pub struct NonResettable(pub MemorySource);

impl Source for NonResettable {
    fn advance(&mut self, skip: SkipKinds) -> Result<bool, MapStreamError> {
        self.0.advance(skip)
    }

    fn current(&self) -> &Entity {
        self.0.current()
    }

    fn can_reset(&self) -> bool {
        false
    }

    fn reset(&mut self) -> Result<(), MapStreamError> {
        Err(MapStreamError::ResetUnsupported)
    }

    fn is_sorted(&self) -> bool {
        self.0.is_sorted()
    }
}

/// A resettable source sharing its reset counter with the test, so pass
/// counts of multi-pass filters can be asserted from outside the pipeline.
pub struct CountingSource {
    inner: MemorySource,
    resets: Rc<Cell<usize>>,
}

impl CountingSource {
    pub fn new(entities: Vec<Entity>) -> (Self, Rc<Cell<usize>>) {
        let resets = Rc::new(Cell::new(0));
        (
            Self {
                inner: MemorySource::new(entities),
                resets: Rc::clone(&resets),
            },
            resets,
        )
    }
}

impl Source for CountingSource {
    fn advance(&mut self, skip: SkipKinds) -> Result<bool, MapStreamError> {
        self.inner.advance(skip)
    }

    fn current(&self) -> &Entity {
        self.inner.current()
    }

    fn can_reset(&self) -> bool {
        true
    }

    fn reset(&mut self) -> Result<(), MapStreamError> {
        self.resets.set(self.resets.get() + 1);
        self.inner.reset()
    }

    fn is_sorted(&self) -> bool {
        self.inner.is_sorted()
    }
}
