//! Spatial filters: area membership with boundary-preserving extra-inclusion.
//!
//! [`AreaFilter`] retains points inside an area, polylines with at least one
//! inside point, relations with at least one directly-inside member, and every
//! point/polyline that a retained polyline/relation structurally needs even if
//! it falls outside the area (geometric completeness at the boundary). It
//! needs four full passes over a resettable upstream.
//!
//! [`SortedAreaFilter`] is the stricter single-pass variant for type-sorted
//! upstreams; it cannot afford resets, so it fails fast on the first
//! kind-order inversion and performs no extra-inclusion sweep.

use crate::entity::{Entity, EntityId, EntityKind, Member, Point, Polyline, Relation};
use crate::error::MapStreamError;
use crate::geometry::Area;
use crate::stream::source::{SkipKinds, Source};
use hashbrown::HashSet;
use itertools::Itertools;
use log::debug;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Pass {
    Points,
    Polylines,
    Relations,
    Extras,
    Done,
}

/// Membership and extra-inclusion bookkeeping shared by both variants.
#[derive(Debug, Default)]
struct Membership {
    in_points: HashSet<EntityId>,
    in_polylines: HashSet<EntityId>,
    in_relations: HashSet<EntityId>,
    extra_points: HashSet<EntityId>,
    extra_polylines: HashSet<EntityId>,
    /// Relations already tested; a relation is never re-marked.
    considered_relations: HashSet<EntityId>,
}

impl Membership {
    fn clear(&mut self) {
        self.in_points.clear();
        self.in_polylines.clear();
        self.in_relations.clear();
        self.extra_points.clear();
        self.extra_polylines.clear();
        self.considered_relations.clear();
    }

    /// Pass-1 test: record a contained point. Returns true if inside.
    fn test_point<A: Area>(&mut self, area: &A, p: &Point) -> bool {
        if area.contains(p.lat, p.lon) {
            self.in_points.insert(p.id);
            true
        } else {
            false
        }
    }

    /// Pass-2 test: a polyline is in if any referenced point is in. A
    /// retained polyline must keep its full shape, so every point it
    /// references, even ones outside the area, becomes extra-to-include.
    fn test_polyline(&mut self, w: &Polyline) -> bool {
        let inside = w.points.iter().any(|p| self.in_points.contains(p));
        if inside {
            self.in_polylines.insert(w.id);
            for p in w.points.iter().copied().unique() {
                if !self.in_points.contains(&p) {
                    self.extra_points.insert(p);
                }
            }
        }
        inside
    }

    /// Pass-3 test: analogous membership over the in-sets, idempotent via
    /// the considered set, with extra-inclusion marking of point/polyline
    /// members. Relation-kind members are never extra-included.
    fn test_relation(&mut self, r: &Relation) -> bool {
        if !self.considered_relations.insert(r.id) {
            return self.in_relations.contains(&r.id);
        }
        let inside = r.members.iter().any(|m| self.member_in(m));
        if inside {
            self.in_relations.insert(r.id);
            for m in &r.members {
                match m.kind {
                    EntityKind::Point => {
                        if !self.in_points.contains(&m.id) {
                            self.extra_points.insert(m.id);
                        }
                    }
                    EntityKind::Polyline => {
                        if !self.in_polylines.contains(&m.id) {
                            self.extra_polylines.insert(m.id);
                        }
                    }
                    EntityKind::Relation => {}
                }
            }
        }
        inside
    }

    fn member_in(&self, m: &Member) -> bool {
        match m.kind {
            EntityKind::Point => self.in_points.contains(&m.id),
            EntityKind::Polyline => self.in_polylines.contains(&m.id),
            EntityKind::Relation => self.in_relations.contains(&m.id),
        }
    }
}

/// Multi-pass spatial filter over any resettable upstream.
///
/// The output is not type-sorted: the extra-inclusion sweep emits
/// boundary-supporting points and polylines after the relations, so
/// `is_sorted()` reports false. Wrap with
/// [`SortFilter`](crate::filter::SortFilter) if downstream needs order.
#[derive(Debug)]
pub struct AreaFilter<S, A> {
    upstream: S,
    area: A,
    pass: Pass,
    current: Option<Entity>,
    membership: Membership,
}

impl<S: Source, A: Area> AreaFilter<S, A> {
    /// Creates a spatial filter over `area`.
    ///
    /// # Errors
    /// [`MapStreamError::SourceNotResettable`] when the upstream cannot
    /// replay; the four-pass algorithm is impossible without replay.
    pub fn new(upstream: S, area: A) -> Result<Self, MapStreamError> {
        if !upstream.can_reset() {
            return Err(MapStreamError::SourceNotResettable {
                filter: "AreaFilter",
            });
        }
        Ok(Self {
            upstream,
            area,
            pass: Pass::Points,
            current: None,
            membership: Membership::default(),
        })
    }

    /// Advances to the next pass, replaying the upstream.
    fn next_pass(&mut self) -> Result<(), MapStreamError> {
        self.pass = match self.pass {
            Pass::Points => Pass::Polylines,
            Pass::Polylines => Pass::Relations,
            Pass::Relations => {
                debug!(
                    "area filter: {} points, {} polylines, {} relations in; {} extra points, {} extra polylines marked",
                    self.membership.in_points.len(),
                    self.membership.in_polylines.len(),
                    self.membership.in_relations.len(),
                    self.membership.extra_points.len(),
                    self.membership.extra_polylines.len()
                );
                Pass::Extras
            }
            Pass::Extras | Pass::Done => Pass::Done,
        };
        if self.pass != Pass::Done {
            self.upstream.reset()?;
        }
        Ok(())
    }
}

impl<S: Source, A: Area> Source for AreaFilter<S, A> {
    fn advance(&mut self, skip: SkipKinds) -> Result<bool, MapStreamError> {
        loop {
            let upstream_skip = match self.pass {
                Pass::Points => SkipKinds::all_but(EntityKind::Point),
                Pass::Polylines => SkipKinds::all_but(EntityKind::Polyline),
                Pass::Relations => SkipKinds::all_but(EntityKind::Relation),
                Pass::Extras => SkipKinds::only(EntityKind::Relation),
                Pass::Done => {
                    self.current = None;
                    return Ok(false);
                }
            };
            if !self.upstream.advance(upstream_skip)? {
                self.next_pass()?;
                continue;
            }
            // Bookkeeping must see every entity of the pass kind; caller
            // skip flags gate emission only.
            let emitted: Option<Entity> = {
                let e = self.upstream.current();
                let keep = match (self.pass, e) {
                    (Pass::Points, Entity::Point(p)) => {
                        self.membership.test_point(&self.area, p)
                    }
                    (Pass::Polylines, Entity::Polyline(w)) => self.membership.test_polyline(w),
                    (Pass::Relations, Entity::Relation(r)) => self.membership.test_relation(r),
                    (Pass::Extras, Entity::Point(p)) => {
                        self.membership.extra_points.contains(&p.id)
                            && !self.membership.in_points.contains(&p.id)
                    }
                    (Pass::Extras, Entity::Polyline(w)) => {
                        self.membership.extra_polylines.contains(&w.id)
                            && !self.membership.in_polylines.contains(&w.id)
                    }
                    _ => false,
                };
                (keep && !skip.excludes(e.kind())).then(|| e.clone())
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
        self.upstream.can_reset()
    }

    fn reset(&mut self) -> Result<(), MapStreamError> {
        self.upstream.reset()?;
        self.membership.clear();
        self.pass = Pass::Points;
        self.current = None;
        Ok(())
    }

    fn is_sorted(&self) -> bool {
        // The extra-inclusion sweep emits points/polylines after relations.
        false
    }
}

/// Single-pass spatial filter for type-sorted upstreams.
///
/// Assumes all points precede all polylines precede all relations and fails
/// fast with [`MapStreamError::UnsortedSource`] the instant it observes an
/// inversion, because it cannot afford resets. There is no extra-inclusion
/// sweep: a retained polyline's outside points are not back-filled.
pub struct SortedAreaFilter<S, A> {
    upstream: S,
    area: A,
    current: Option<Entity>,
    membership: Membership,
    /// Latest-ranked kind observed so far.
    seen: Option<EntityKind>,
    exhausted: bool,
}

impl<S: Source, A: Area> SortedAreaFilter<S, A> {
    /// Creates a single-pass spatial filter over `area`. No replay
    /// capability is required.
    pub fn new(upstream: S, area: A) -> Self {
        Self {
            upstream,
            area,
            current: None,
            membership: Membership::default(),
            seen: None,
            exhausted: false,
        }
    }
}

impl<S: Source, A: Area> Source for SortedAreaFilter<S, A> {
    fn advance(&mut self, skip: SkipKinds) -> Result<bool, MapStreamError> {
        if self.exhausted {
            return Ok(false);
        }
        loop {
            if !self.upstream.advance(SkipKinds::none())? {
                self.exhausted = true;
                self.current = None;
                return Ok(false);
            }
            let emitted: Option<Entity> = {
                let e = self.upstream.current();
                let kind = e.kind();
                if let Some(seen) = self.seen {
                    if kind < seen {
                        return Err(MapStreamError::UnsortedSource { found: kind, seen });
                    }
                }
                self.seen = Some(self.seen.map_or(kind, |s| s.max(kind)));
                let keep = match e {
                    Entity::Point(p) => self.membership.test_point(&self.area, p),
                    Entity::Polyline(w) => self.membership.test_polyline(w),
                    Entity::Relation(r) => self.membership.test_relation(r),
                };
                (keep && !skip.excludes(kind)).then(|| e.clone())
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
        self.upstream.can_reset()
    }

    fn reset(&mut self) -> Result<(), MapStreamError> {
        self.upstream.reset()?;
        self.membership.clear();
        self.seen = None;
        self.current = None;
        self.exhausted = false;
        Ok(())
    }

    fn is_sorted(&self) -> bool {
        true
    }
}
