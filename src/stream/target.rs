//! Targets: pull-loop consumers at the end of a pipeline.

use crate::entity::{Entity, Point, Polyline, Relation};
use crate::error::MapStreamError;
use crate::stream::source::{SkipKinds, Source};

/// A consumer of a registered source.
///
/// `begin`/`finish` bracket the pull loop for setup and teardown (an encoder
/// would write header/footer framing there); the typed `add_*` callbacks
/// receive entities dispatched by kind.
pub trait Target {
    /// Called once before the first entity.
    fn begin(&mut self) -> Result<(), MapStreamError> {
        Ok(())
    }

    /// Consumes a point entity.
    fn add_point(&mut self, point: &Point) -> Result<(), MapStreamError>;

    /// Consumes a polyline entity.
    fn add_polyline(&mut self, polyline: &Polyline) -> Result<(), MapStreamError>;

    /// Consumes a relation entity.
    fn add_relation(&mut self, relation: &Relation) -> Result<(), MapStreamError>;

    /// Called once after exhaustion.
    fn finish(&mut self) -> Result<(), MapStreamError> {
        Ok(())
    }
}

/// Runs the pull loop: repeatedly advances `source` and dispatches each
/// entity by kind into `target`, bracketed by the lifecycle hooks.
pub fn drive<S, T>(source: &mut S, target: &mut T) -> Result<(), MapStreamError>
where
    S: Source + ?Sized,
    T: Target + ?Sized,
{
    target.begin()?;
    while source.advance(SkipKinds::none())? {
        match source.current() {
            Entity::Point(p) => target.add_point(p)?,
            Entity::Polyline(w) => target.add_polyline(w)?,
            Entity::Relation(r) => target.add_relation(r)?,
        }
    }
    target.finish()
}

/// Drains `source` into a vector, preserving order.
pub fn drain<S: Source + ?Sized>(source: &mut S) -> Result<Vec<Entity>, MapStreamError> {
    let mut out = Vec::new();
    while source.advance(SkipKinds::none())? {
        out.push(source.current().clone());
    }
    Ok(out)
}

/// A target that collects entities into a vector, preserving arrival order.
#[derive(Debug, Default)]
pub struct CollectTarget {
    entities: Vec<Entity>,
    finished: bool,
}

impl CollectTarget {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entities collected so far.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// True once `finish()` has run.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Consumes the collector, returning the collected sequence.
    pub fn into_entities(self) -> Vec<Entity> {
        self.entities
    }
}

impl Target for CollectTarget {
    fn add_point(&mut self, point: &Point) -> Result<(), MapStreamError> {
        self.entities.push(point.clone().into());
        Ok(())
    }

    fn add_polyline(&mut self, polyline: &Polyline) -> Result<(), MapStreamError> {
        self.entities.push(polyline.clone().into());
        Ok(())
    }

    fn add_relation(&mut self, relation: &Relation) -> Result<(), MapStreamError> {
        self.entities.push(relation.clone().into());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), MapStreamError> {
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityId;
    use crate::stream::memory::MemorySource;

    fn eid(raw: u64) -> EntityId {
        EntityId::new(raw).unwrap()
    }

    #[test]
    fn drive_dispatches_by_kind_and_runs_hooks() {
        let mut src = MemorySource::new(vec![
            Point::new(eid(1), 0.0, 0.0).into(),
            Polyline::new(eid(10), vec![eid(1)]).into(),
            Relation::new(eid(100), vec![]).into(),
        ]);
        let mut target = CollectTarget::new();
        drive(&mut src, &mut target).unwrap();
        assert!(target.is_finished());
        assert_eq!(target.entities().len(), 3);
        assert_eq!(target.entities()[2].id(), eid(100));
    }
}
