//! Cache/snapshot store: a bounded associative store keyed by (kind, id).
//!
//! This trait abstracts how the completion filter stages dependency payloads
//! (e.g., in memory, on temp disk). The initial design keeps plain typed
//! lookups; a spilling backend can be added later without touching the
//! filter's logic. A store instance is exclusively owned by one
//! completion-filter instance and is only ever accessed sequentially, so no
//! locking discipline is required.

use crate::entity::{EntityId, EntityKind, Point, Polyline, Relation};
use std::collections::HashMap;

/// Associative staging store for entity payloads, keyed by (kind, id).
///
/// Entries are created when an entity is first recognized as a needed
/// dependency and destroyed when its reference count reaches zero or on
/// `clear`.
pub trait EntityStore {
    /// Inserts or replaces a point payload.
    fn insert_point(&mut self, point: Point);
    /// Inserts or replaces a polyline payload.
    fn insert_polyline(&mut self, polyline: Polyline);
    /// Inserts or replaces a relation payload.
    fn insert_relation(&mut self, relation: Relation);

    /// Point payload for `id`, if staged.
    fn get_point(&self, id: EntityId) -> Option<&Point>;
    /// Polyline payload for `id`, if staged.
    fn get_polyline(&self, id: EntityId) -> Option<&Polyline>;
    /// Relation payload for `id`, if staged.
    fn get_relation(&self, id: EntityId) -> Option<&Relation>;

    /// True if an entry for (kind, id) is staged.
    fn contains(&self, kind: EntityKind, id: EntityId) -> bool;

    /// Deletes the entry for (kind, id), if present.
    fn delete(&mut self, kind: EntityKind, id: EntityId);

    /// Destroys every entry.
    fn clear(&mut self);

    /// Number of staged entries across all kinds.
    fn len(&self) -> usize;

    /// True if no entries are staged.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory [`EntityStore`] backed by one hash map per id namespace.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    points: HashMap<EntityId, Point>,
    polylines: HashMap<EntityId, Polyline>,
    relations: HashMap<EntityId, Relation>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl EntityStore for InMemoryStore {
    fn insert_point(&mut self, point: Point) {
        self.points.insert(point.id, point);
    }

    fn insert_polyline(&mut self, polyline: Polyline) {
        self.polylines.insert(polyline.id, polyline);
    }

    fn insert_relation(&mut self, relation: Relation) {
        self.relations.insert(relation.id, relation);
    }

    fn get_point(&self, id: EntityId) -> Option<&Point> {
        self.points.get(&id)
    }

    fn get_polyline(&self, id: EntityId) -> Option<&Polyline> {
        self.polylines.get(&id)
    }

    fn get_relation(&self, id: EntityId) -> Option<&Relation> {
        self.relations.get(&id)
    }

    fn contains(&self, kind: EntityKind, id: EntityId) -> bool {
        match kind {
            EntityKind::Point => self.points.contains_key(&id),
            EntityKind::Polyline => self.polylines.contains_key(&id),
            EntityKind::Relation => self.relations.contains_key(&id),
        }
    }

    fn delete(&mut self, kind: EntityKind, id: EntityId) {
        match kind {
            EntityKind::Point => {
                self.points.remove(&id);
            }
            EntityKind::Polyline => {
                self.polylines.remove(&id);
            }
            EntityKind::Relation => {
                self.relations.remove(&id);
            }
        }
    }

    fn clear(&mut self) {
        self.points.clear();
        self.polylines.clear();
        self.relations.clear();
    }

    fn len(&self) -> usize {
        self.points.len() + self.polylines.len() + self.relations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eid(raw: u64) -> EntityId {
        EntityId::new(raw).unwrap()
    }

    #[test]
    fn namespaces_are_disjoint() {
        let mut store = InMemoryStore::new();
        store.insert_point(Point::new(eid(5), 0.0, 0.0));
        store.insert_polyline(Polyline::new(eid(5), vec![]));
        assert!(store.contains(EntityKind::Point, eid(5)));
        assert!(store.contains(EntityKind::Polyline, eid(5)));
        assert!(!store.contains(EntityKind::Relation, eid(5)));
        assert_eq!(store.len(), 2);

        store.delete(EntityKind::Point, eid(5));
        assert!(!store.contains(EntityKind::Point, eid(5)));
        assert!(store.contains(EntityKind::Polyline, eid(5)));
    }

    #[test]
    fn insert_replaces_existing_payload() {
        let mut store = InMemoryStore::new();
        store.insert_point(Point::new(eid(1), 0.0, 0.0));
        store.insert_point(Point::new(eid(1), 2.0, 3.0));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_point(eid(1)).unwrap().lat, 2.0);
    }

    #[test]
    fn clear_destroys_everything() {
        let mut store = InMemoryStore::new();
        store.insert_relation(Relation::new(eid(9), vec![]));
        store.clear();
        assert!(store.is_empty());
    }
}
