//! Dependency-completion filter.
//!
//! Given an upstream source and a predicate, emits every predicate-accepted
//! entity plus, transitively, every point/polyline/relation that an accepted
//! polyline or relation references, so a consumer of the output never meets a
//! dangling reference. Memory stays bounded by the size of the dependency set
//! (not the dataset): the upstream is sequential and only replayable, so the
//! filter works in three full passes plus interleaved reference-counted
//! eviction — a streaming mark-sweep driven by precomputed forward reference
//! counts.
//!
//! 1. *Discovery*: fixed-point reachability over ids only. Accepted polylines
//!    mark their point ids as dependencies; accepted relations mark all their
//!    member ids, with referenced polylines/relations entering a provisional
//!    frontier whose own references are resolved by repeated reset+rescan.
//!    Dependency sets are append-only and the frontier can only shrink to
//!    empty, so this terminates in at most (nesting depth + 1) passes even
//!    over cyclic relation graphs.
//! 2. *Relation staging*: one scan copies every dependency-relation payload
//!    into the cache store, so nested members can be resolved before the
//!    relation is physically re-encountered.
//! 3. *Output*: each upstream entity is emitted iff accepted or a recorded
//!    dependency. Dependencies are cached on arrival; entities that are "let
//!    go" (emitted but needed by nothing) report usage of everything they
//!    reference, decrementing per-id counters seeded during discovery and
//!    evicting cached payloads the moment their counter reaches zero.

use crate::entity::{Entity, EntityId, EntityKind, Member};
use crate::error::MapStreamError;
use crate::filter::predicate::EntityPredicate;
use crate::store::{EntityStore, InMemoryStore};
use crate::stream::source::{SkipKinds, Source};
use hashbrown::{HashMap, HashSet};
use log::debug;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Phase {
    /// Discovery and staging have not run yet.
    Unprepared,
    /// The output pass is streaming.
    Output,
    /// The upstream is exhausted.
    Exhausted,
}

/// Streaming filter that completes a predicate-selected subset with the
/// transitive closure of everything it references.
///
/// The cache store is exclusively owned by this instance; entries are created
/// when an entity is first recognized as a needed dependency and destroyed
/// when its reference count reaches zero, or wholesale at exhaustion/reset.
#[derive(Debug)]
pub struct CompleteFilter<S, P, C = InMemoryStore> {
    upstream: S,
    predicate: P,
    store: C,
    strict: bool,
    phase: Phase,
    current: Option<Entity>,
    discovery_passes: usize,

    /// Seeded forward reference counts, one map per id namespace. Presence of
    /// a key marks the id as a recorded dependency; entries decremented to
    /// zero are kept as "already released" markers for late arrivals.
    point_refs: HashMap<EntityId, usize>,
    polyline_refs: HashMap<EntityId, usize>,
    relation_refs: HashMap<EntityId, usize>,

    /// Dependency ids whose payload has not yet been observed upstream.
    pending_points: HashSet<EntityId>,
    pending_polylines: HashSet<EntityId>,
    pending_relations: HashSet<EntityId>,
}

impl<S: Source, P: EntityPredicate> CompleteFilter<S, P, InMemoryStore> {
    /// Creates a completion filter with an in-memory cache store.
    ///
    /// # Errors
    /// [`MapStreamError::SourceNotResettable`] when the upstream cannot
    /// replay; the multi-pass algorithm is impossible without replay, so this
    /// fails before any pass begins.
    pub fn new(upstream: S, predicate: P) -> Result<Self, MapStreamError> {
        Self::with_store(upstream, predicate, InMemoryStore::new())
    }
}

impl<S: Source, P: EntityPredicate, C: EntityStore> CompleteFilter<S, P, C> {
    /// Creates a completion filter staging dependencies into `store`.
    ///
    /// # Errors
    /// [`MapStreamError::SourceNotResettable`] when the upstream cannot replay.
    pub fn with_store(upstream: S, predicate: P, store: C) -> Result<Self, MapStreamError> {
        if !upstream.can_reset() {
            return Err(MapStreamError::SourceNotResettable {
                filter: "CompleteFilter",
            });
        }
        Ok(Self {
            upstream,
            predicate,
            store,
            strict: false,
            phase: Phase::Unprepared,
            current: None,
            discovery_passes: 0,
            point_refs: HashMap::new(),
            polyline_refs: HashMap::new(),
            relation_refs: HashMap::new(),
            pending_points: HashSet::new(),
            pending_polylines: HashSet::new(),
            pending_relations: HashSet::new(),
        })
    }

    /// Makes dangling references fatal: if a recorded dependency never
    /// appears upstream, exhaustion fails with
    /// [`MapStreamError::MissingDependency`] instead of silently omitting it.
    pub fn require_complete(mut self) -> Self {
        self.strict = true;
        self
    }

    /// The cache store, for inspection (e.g. asserting the eviction bound).
    pub fn store(&self) -> &C {
        &self.store
    }

    /// Number of discovery passes taken to reach the fixed point.
    /// Zero until the first `advance()`.
    pub fn discovery_passes(&self) -> usize {
        self.discovery_passes
    }

    /// Discovery (pass 1..k) and relation staging (one more pass), then a
    /// final reset leaving the upstream positioned for the output pass.
    fn prepare(&mut self) -> Result<(), MapStreamError> {
        // Ids whose own references have already been tallied; guards against
        // double-counting entities reachable both via the predicate and via
        // the frontier, and makes frontier rescans idempotent.
        let mut tallied_polylines: HashSet<EntityId> = HashSet::new();
        let mut tallied_relations: HashSet<EntityId> = HashSet::new();
        let mut frontier_polylines: HashSet<EntityId> = HashSet::new();
        let mut frontier_relations: HashSet<EntityId> = HashSet::new();

        // Pass 1: tally references of every predicate-accepted entity.
        let mut passes = 1usize;
        while self.upstream.advance(SkipKinds::none())? {
            let e = self.upstream.current();
            if !self.predicate.accepts(e) {
                continue;
            }
            match e {
                Entity::Point(_) => {}
                Entity::Polyline(w) => {
                    if tallied_polylines.insert(w.id) {
                        frontier_polylines.remove(&w.id);
                        for p in &w.points {
                            *self.point_refs.entry(*p).or_insert(0) += 1;
                        }
                    }
                }
                Entity::Relation(r) => {
                    if tallied_relations.insert(r.id) {
                        frontier_relations.remove(&r.id);
                        Self::tally_members(
                            &r.members,
                            &mut self.point_refs,
                            &mut self.polyline_refs,
                            &mut self.relation_refs,
                            &tallied_polylines,
                            &tallied_relations,
                            &mut frontier_polylines,
                            &mut frontier_relations,
                        );
                    }
                }
            }
        }

        // Fixed point: rescan while the provisional frontier is non-empty.
        // Frontier ids are pre-marked as tallied: a full pass either finds
        // them or proves they never appear, so they must not re-enter.
        while !frontier_polylines.is_empty() || !frontier_relations.is_empty() {
            let mut scan_polylines = std::mem::take(&mut frontier_polylines);
            let mut scan_relations = std::mem::take(&mut frontier_relations);
            tallied_polylines.extend(scan_polylines.iter().copied());
            tallied_relations.extend(scan_relations.iter().copied());

            self.upstream.reset()?;
            passes += 1;
            while self.upstream.advance(SkipKinds::only(EntityKind::Point))? {
                match self.upstream.current() {
                    Entity::Point(_) => {}
                    Entity::Polyline(w) => {
                        if scan_polylines.remove(&w.id) {
                            for p in &w.points {
                                *self.point_refs.entry(*p).or_insert(0) += 1;
                            }
                        }
                    }
                    Entity::Relation(r) => {
                        if scan_relations.remove(&r.id) {
                            Self::tally_members(
                                &r.members,
                                &mut self.point_refs,
                                &mut self.polyline_refs,
                                &mut self.relation_refs,
                                &tallied_polylines,
                                &tallied_relations,
                                &mut frontier_polylines,
                                &mut frontier_relations,
                            );
                        }
                    }
                }
            }
        }
        self.discovery_passes = passes;

        self.pending_points = self.point_refs.keys().copied().collect();
        self.pending_polylines = self.polyline_refs.keys().copied().collect();
        self.pending_relations = self.relation_refs.keys().copied().collect();
        debug!(
            "completion discovery: fixed point after {} passes ({} point, {} polyline, {} relation dependencies)",
            passes,
            self.pending_points.len(),
            self.pending_polylines.len(),
            self.pending_relations.len()
        );

        // Relation staging: dependency-relation payloads must be resolvable
        // before the relation is physically re-encountered.
        if !self.relation_refs.is_empty() {
            self.upstream.reset()?;
            while self
                .upstream
                .advance(SkipKinds::all_but(EntityKind::Relation))?
            {
                if let Entity::Relation(r) = self.upstream.current() {
                    if self.relation_refs.contains_key(&r.id) {
                        self.pending_relations.remove(&r.id);
                        self.store.insert_relation(r.clone());
                    }
                }
            }
            debug!(
                "completion staging: {} relation payloads cached",
                self.store.len()
            );
        }

        self.upstream.reset()?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn tally_members(
        members: &[Member],
        point_refs: &mut HashMap<EntityId, usize>,
        polyline_refs: &mut HashMap<EntityId, usize>,
        relation_refs: &mut HashMap<EntityId, usize>,
        tallied_polylines: &HashSet<EntityId>,
        tallied_relations: &HashSet<EntityId>,
        frontier_polylines: &mut HashSet<EntityId>,
        frontier_relations: &mut HashSet<EntityId>,
    ) {
        for m in members {
            match m.kind {
                EntityKind::Point => {
                    *point_refs.entry(m.id).or_insert(0) += 1;
                }
                EntityKind::Polyline => {
                    *polyline_refs.entry(m.id).or_insert(0) += 1;
                    if !tallied_polylines.contains(&m.id) {
                        frontier_polylines.insert(m.id);
                    }
                }
                EntityKind::Relation => {
                    *relation_refs.entry(m.id).or_insert(0) += 1;
                    if !tallied_relations.contains(&m.id) {
                        frontier_relations.insert(m.id);
                    }
                }
            }
        }
    }

    /// Reports one usage of each referenced (kind, id), evicting cached
    /// payloads whose counter reaches zero. Eviction of a cached polyline or
    /// relation cascades to its own references via the worklist, so the
    /// eviction bound holds transitively. Iterative on purpose: relation
    /// nesting depth is unbounded input.
    fn release(&mut self, seed: impl IntoIterator<Item = (EntityKind, EntityId)>) {
        let mut work: Vec<(EntityKind, EntityId)> = seed.into_iter().collect();
        while let Some((kind, id)) = work.pop() {
            let refs = match kind {
                EntityKind::Point => &mut self.point_refs,
                EntityKind::Polyline => &mut self.polyline_refs,
                EntityKind::Relation => &mut self.relation_refs,
            };
            let Some(cnt) = refs.get_mut(&id) else {
                continue;
            };
            if *cnt == 0 {
                // Released more often than seeded; only possible for ids
                // reported both directly and through a cascade. Nothing left
                // to evict.
                continue;
            }
            *cnt -= 1;
            if *cnt > 0 {
                continue;
            }
            match kind {
                EntityKind::Point => {}
                EntityKind::Polyline => {
                    if let Some(w) = self.store.get_polyline(id) {
                        work.extend(w.points.iter().map(|&p| (EntityKind::Point, p)));
                    }
                }
                EntityKind::Relation => {
                    if let Some(r) = self.store.get_relation(id) {
                        work.extend(r.members.iter().map(|m| (m.kind, m.id)));
                    }
                }
            }
            self.store.delete(kind, id);
        }
    }

    /// Output-pass bookkeeping for one emitted entity.
    fn account(&mut self, entity: &Entity) {
        match entity {
            Entity::Point(p) => {
                if let Some(&cnt) = self.point_refs.get(&p.id) {
                    self.pending_points.remove(&p.id);
                    if cnt > 0 {
                        self.store.insert_point(p.clone());
                    }
                    // cnt == 0: every referrer was already processed; emit
                    // without caching.
                }
            }
            Entity::Polyline(w) => match self.polyline_refs.get(&w.id).copied() {
                Some(cnt) => {
                    self.pending_polylines.remove(&w.id);
                    if cnt > 0 {
                        self.store.insert_polyline(w.clone());
                    } else {
                        self.release(w.points.iter().map(|&p| (EntityKind::Point, p)));
                    }
                }
                None => {
                    // Accepted but needed by nothing: let it go, reporting
                    // usage of every point it references.
                    self.release(w.points.iter().map(|&p| (EntityKind::Point, p)));
                }
            },
            Entity::Relation(r) => {
                if !self.relation_refs.contains_key(&r.id) {
                    let seed: Vec<_> = r.members.iter().map(|m| (m.kind, m.id)).collect();
                    self.release(seed);
                }
                // Dependency relations stay staged until released by their
                // referrer.
            }
        }
    }

    /// First (kind, id) still pending after exhaustion, if any.
    fn first_missing(&self) -> Option<(EntityKind, EntityId)> {
        let min = |s: &HashSet<EntityId>| s.iter().min().copied();
        min(&self.pending_points)
            .map(|id| (EntityKind::Point, id))
            .or_else(|| min(&self.pending_polylines).map(|id| (EntityKind::Polyline, id)))
            .or_else(|| min(&self.pending_relations).map(|id| (EntityKind::Relation, id)))
    }

    fn clear_bookkeeping(&mut self) {
        self.point_refs.clear();
        self.polyline_refs.clear();
        self.relation_refs.clear();
        self.pending_points.clear();
        self.pending_polylines.clear();
        self.pending_relations.clear();
        self.store.clear();
    }
}

impl<S: Source, P: EntityPredicate, C: EntityStore> Source for CompleteFilter<S, P, C> {
    fn advance(&mut self, skip: SkipKinds) -> Result<bool, MapStreamError> {
        if self.phase == Phase::Unprepared {
            self.prepare()?;
            self.phase = Phase::Output;
        }
        if self.phase == Phase::Exhausted {
            return Ok(false);
        }
        loop {
            if !self.upstream.advance(SkipKinds::none())? {
                self.phase = Phase::Exhausted;
                self.current = None;
                let missing = self.first_missing();
                self.clear_bookkeeping();
                if self.strict {
                    if let Some((kind, id)) = missing {
                        return Err(MapStreamError::MissingDependency { kind, id });
                    }
                }
                return Ok(false);
            }
            // Classify while the upstream borrow is live; clone only what
            // will actually be emitted.
            let emitted: Option<Entity> = {
                let e = self.upstream.current();
                let wanted = self.predicate.accepts(e)
                    || match e.kind() {
                        EntityKind::Point => self.point_refs.contains_key(&e.id()),
                        EntityKind::Polyline => self.polyline_refs.contains_key(&e.id()),
                        EntityKind::Relation => self.relation_refs.contains_key(&e.id()),
                    };
                wanted.then(|| e.clone())
            };
            let Some(entity) = emitted else {
                continue;
            };
            self.account(&entity);
            // Caller skip flags gate emission only; bookkeeping above must
            // see every kind or reference counting would drift.
            if !skip.excludes(entity.kind()) {
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
        self.upstream.can_reset()
    }

    fn reset(&mut self) -> Result<(), MapStreamError> {
        self.upstream.reset()?;
        self.clear_bookkeeping();
        self.phase = Phase::Unprepared;
        self.current = None;
        self.discovery_passes = 0;
        Ok(())
    }

    fn is_sorted(&self) -> bool {
        // Output is a subsequence of the upstream, so its order is inherited.
        self.upstream.is_sorted()
    }
}
