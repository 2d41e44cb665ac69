//! Entity predicates: the selection contract of the completion filter.

use crate::entity::Entity;

/// Boolean selection test over entities.
pub trait EntityPredicate {
    /// True if the filter should keep `entity` (plus its dependencies).
    fn accepts(&self, entity: &Entity) -> bool;
}

impl<F: Fn(&Entity) -> bool> EntityPredicate for F {
    #[inline]
    fn accepts(&self, entity: &Entity) -> bool {
        self(entity)
    }
}

/// Accepts entities carrying an exact `key=value` tag.
#[derive(Clone, Debug)]
pub struct TagPredicate {
    key: String,
    value: String,
}

impl TagPredicate {
    /// Creates a predicate matching `key=value`.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl EntityPredicate for TagPredicate {
    fn accepts(&self, entity: &Entity) -> bool {
        entity.tags().contains(&self.key, &self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityId, Point, Tags};

    #[test]
    fn tag_predicate_matches_exact_pair() {
        let tags: Tags = [("amenity", "fountain")].into_iter().collect();
        let e: Entity = Point::with_tags(EntityId::new(1).unwrap(), 0.0, 0.0, tags).into();
        assert!(TagPredicate::new("amenity", "fountain").accepts(&e));
        assert!(!TagPredicate::new("amenity", "bench").accepts(&e));
        assert!(!TagPredicate::new("highway", "fountain").accepts(&e));
    }

    #[test]
    fn closures_are_predicates() {
        let e: Entity = Point::new(EntityId::new(2).unwrap(), 0.0, 0.0).into();
        let p = |entity: &Entity| entity.id().get() == 2;
        assert!(p.accepts(&e));
    }
}
