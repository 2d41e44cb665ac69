//! Exclude combinator: removes from a primary source any (kind, id) present
//! in one or more secondary sources.
//!
//! The secondary sources are drained into per-kind exclusion sets on the
//! first `advance()`, exactly once; afterwards the primary is filtered
//! against them on each pull. `reset()` replays only the primary.

use crate::entity::{Entity, EntityId, EntityKind};
use crate::error::MapStreamError;
use crate::stream::source::{SkipKinds, Source};
use hashbrown::HashSet;
use log::debug;

/// Set-difference combinator over entity streams.
pub struct ExcludeFilter<S, X> {
    primary: S,
    secondaries: Vec<X>,
    drained: bool,
    excluded_points: HashSet<EntityId>,
    excluded_polylines: HashSet<EntityId>,
    excluded_relations: HashSet<EntityId>,
    current: Option<Entity>,
}

impl<S: Source, X: Source> ExcludeFilter<S, X> {
    /// Creates an exclude combinator; `secondaries` supply the ids to drop.
    pub fn new(primary: S, secondaries: Vec<X>) -> Self {
        Self {
            primary,
            secondaries,
            drained: false,
            excluded_points: HashSet::new(),
            excluded_polylines: HashSet::new(),
            excluded_relations: HashSet::new(),
            current: None,
        }
    }

    fn drain_secondaries(&mut self) -> Result<(), MapStreamError> {
        for s in &mut self.secondaries {
            while s.advance(SkipKinds::none())? {
                let e = s.current();
                let set = match e.kind() {
                    EntityKind::Point => &mut self.excluded_points,
                    EntityKind::Polyline => &mut self.excluded_polylines,
                    EntityKind::Relation => &mut self.excluded_relations,
                };
                set.insert(e.id());
            }
        }
        self.drained = true;
        debug!(
            "exclude filter: {} point, {} polyline, {} relation ids excluded",
            self.excluded_points.len(),
            self.excluded_polylines.len(),
            self.excluded_relations.len()
        );
        Ok(())
    }

    fn is_excluded(&self, kind: EntityKind, id: EntityId) -> bool {
        match kind {
            EntityKind::Point => self.excluded_points.contains(&id),
            EntityKind::Polyline => self.excluded_polylines.contains(&id),
            EntityKind::Relation => self.excluded_relations.contains(&id),
        }
    }
}

impl<S: Source, X: Source> Source for ExcludeFilter<S, X> {
    fn advance(&mut self, skip: SkipKinds) -> Result<bool, MapStreamError> {
        if !self.drained {
            self.drain_secondaries()?;
        }
        loop {
            if !self.primary.advance(skip)? {
                self.current = None;
                return Ok(false);
            }
            let emitted: Option<Entity> = {
                let e = self.primary.current();
                (!self.is_excluded(e.kind(), e.id())).then(|| e.clone())
            };
            if let Some(entity) = emitted {
                self.current = Some(entity);
                return Ok(true);
            }
        }
    }

    fn current(&self) -> &Entity {
        self.current
            .as_ref()
            .expect("current() called before advance() or after exhaustion")
    }

    fn can_reset(&self) -> bool {
        self.primary.can_reset()
    }

    /// Replays the primary; the exclusion sets are kept (secondaries are
    /// drained exactly once).
    fn reset(&mut self) -> Result<(), MapStreamError> {
        self.primary.reset()?;
        self.current = None;
        Ok(())
    }

    fn is_sorted(&self) -> bool {
        self.primary.is_sorted()
    }
}
