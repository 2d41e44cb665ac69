//! Merge combinator: concatenates multiple pipelines under a same-id
//! conflict policy.
//!
//! Emission is kind-phased (all points from every source in registration
//! order, then all polylines, then all relations), so the output is always
//! type-sorted and each kind preserves per-source relative order. That costs
//! one pass per kind over each source, hence every registered source must be
//! resettable.

use crate::entity::{Entity, EntityId, EntityKind};
use crate::error::MapStreamError;
use crate::stream::source::{SkipKinds, Source};
use hashbrown::HashSet;

/// What to do when the same (kind, id) appears in more than one source.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// The first registered source that emits an id wins; later duplicates
    /// are dropped.
    #[default]
    FirstSourceWins,
    /// No conflict handling: every occurrence is emitted.
    EmitDuplicates,
}

/// Kind-phased concatenation of several sources.
#[derive(Debug)]
pub struct MergeFilter<S> {
    sources: Vec<S>,
    policy: ConflictPolicy,
    phase: EntityKind,
    /// Index of the source currently being drained within the phase.
    index: usize,
    seen_points: HashSet<EntityId>,
    seen_polylines: HashSet<EntityId>,
    seen_relations: HashSet<EntityId>,
    current: Option<Entity>,
    done: bool,
}

impl<S: Source> MergeFilter<S> {
    /// Creates a merge over `sources` in registration order.
    ///
    /// Sources are expected to be freshly constructed (not yet advanced).
    ///
    /// # Errors
    /// [`MapStreamError::SourceNotResettable`] when any source cannot
    /// replay; kind-phased emission takes one pass per kind.
    pub fn new(sources: Vec<S>, policy: ConflictPolicy) -> Result<Self, MapStreamError> {
        if sources.iter().any(|s| !s.can_reset()) {
            return Err(MapStreamError::SourceNotResettable {
                filter: "MergeFilter",
            });
        }
        Ok(Self {
            sources,
            policy,
            phase: EntityKind::Point,
            index: 0,
            seen_points: HashSet::new(),
            seen_polylines: HashSet::new(),
            seen_relations: HashSet::new(),
            current: None,
            done: false,
        })
    }

    fn seen_for(&mut self, kind: EntityKind) -> &mut HashSet<EntityId> {
        match kind {
            EntityKind::Point => &mut self.seen_points,
            EntityKind::Polyline => &mut self.seen_polylines,
            EntityKind::Relation => &mut self.seen_relations,
        }
    }

    fn next_phase(&mut self) -> Result<(), MapStreamError> {
        self.index = 0;
        match self.phase {
            EntityKind::Point => self.phase = EntityKind::Polyline,
            EntityKind::Polyline => self.phase = EntityKind::Relation,
            EntityKind::Relation => {
                self.done = true;
                return Ok(());
            }
        }
        for s in &mut self.sources {
            s.reset()?;
        }
        Ok(())
    }
}

impl<S: Source> Source for MergeFilter<S> {
    fn advance(&mut self, skip: SkipKinds) -> Result<bool, MapStreamError> {
        loop {
            if self.done {
                self.current = None;
                return Ok(false);
            }
            if self.index >= self.sources.len() {
                self.next_phase()?;
                continue;
            }
            let phase = self.phase;
            if !self.sources[self.index].advance(SkipKinds::all_but(phase))? {
                self.index += 1;
                continue;
            }
            let entity = self.sources[self.index].current().clone();
            if self.policy == ConflictPolicy::FirstSourceWins
                && !self.seen_for(phase).insert(entity.id())
            {
                continue;
            }
            if !skip.excludes(phase) {
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
        self.sources.iter().all(Source::can_reset)
    }

    fn reset(&mut self) -> Result<(), MapStreamError> {
        for s in &mut self.sources {
            s.reset()?;
        }
        self.phase = EntityKind::Point;
        self.index = 0;
        self.seen_points.clear();
        self.seen_polylines.clear();
        self.seen_relations.clear();
        self.current = None;
        self.done = false;
        Ok(())
    }

    fn is_sorted(&self) -> bool {
        true
    }
}
