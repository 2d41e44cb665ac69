//! Sort-detection filter: guarantees type-sorted output without a
//! materializing sort.
//!
//! Output order is always points, then polylines, then relations, each kind
//! preserving the upstream's relative order. The upstream's `is_sorted()`
//! hint is declarative and unverified, so it is deliberately ignored here in
//! favor of observation: while the verdict is unknown the filter emits in
//! kind-major phases, each scanning forward from a reset, and the first
//! phase (which observes every kind) settles the verdict. Once a full pass
//! confirms the upstream sorted, later drains delegate directly with no
//! rescanning. Worst case is three full passes; acceptable because point
//! volume dominates real datasets and a point-only pass is unavoidable
//! regardless of approach.

use crate::entity::{Entity, EntityKind};
use crate::error::MapStreamError;
use crate::stream::source::{SkipKinds, Source};
use log::debug;
use once_cell::sync::OnceCell;

/// Order-repairing filter with a settle-once sortedness verdict.
#[derive(Debug)]
pub struct SortFilter<S> {
    upstream: S,
    /// Unset = unknown; `true` = confirmed sorted, `false` = confirmed
    /// unsorted. Survives `reset()`: the determinism contract keeps it valid.
    verdict: OnceCell<bool>,
    /// Kind currently being emitted in phased mode.
    phase: EntityKind,
    /// Latest-ranked kind observed during the detection pass.
    seen: Option<EntityKind>,
    /// True when this drain delegates straight to a confirmed-sorted
    /// upstream (decided at construction/reset, never mid-drain).
    delegating: bool,
    current: Option<Entity>,
    done: bool,
}

impl<S: Source> SortFilter<S> {
    /// Creates a sort filter.
    ///
    /// # Errors
    /// [`MapStreamError::SourceNotResettable`] when the upstream cannot
    /// replay; re-establishing order takes up to three rescans.
    pub fn new(upstream: S) -> Result<Self, MapStreamError> {
        if !upstream.can_reset() {
            return Err(MapStreamError::SourceNotResettable {
                filter: "SortFilter",
            });
        }
        Ok(Self {
            upstream,
            verdict: OnceCell::new(),
            phase: EntityKind::Point,
            seen: None,
            delegating: false,
            current: None,
            done: false,
        })
    }

    /// The settled verdict, if any (`true` = confirmed sorted).
    pub fn verdict(&self) -> Option<bool> {
        self.verdict.get().copied()
    }

    fn next_phase(&mut self) -> Result<(), MapStreamError> {
        match self.phase {
            EntityKind::Point => {
                self.phase = EntityKind::Polyline;
                self.upstream.reset()?;
            }
            EntityKind::Polyline => {
                self.phase = EntityKind::Relation;
                self.upstream.reset()?;
            }
            EntityKind::Relation => {
                self.done = true;
            }
        }
        Ok(())
    }
}

impl<S: Source> Source for SortFilter<S> {
    fn advance(&mut self, skip: SkipKinds) -> Result<bool, MapStreamError> {
        if self.delegating {
            if self.upstream.advance(skip)? {
                self.current = Some(self.upstream.current().clone());
                return Ok(true);
            }
            self.current = None;
            return Ok(false);
        }
        loop {
            if self.done {
                self.current = None;
                return Ok(false);
            }
            // Only the first pass needs to observe every kind; once the
            // verdict is settled, later phases skip-decode straight to
            // their own kind.
            let observing = self.verdict.get().is_none();
            let upstream_skip = if observing {
                SkipKinds::none()
            } else {
                SkipKinds::all_but(self.phase)
            };
            if !self.upstream.advance(upstream_skip)? {
                if observing {
                    // A full pass with no inversion confirms the order.
                    let _ = self.verdict.set(true);
                    debug!("sort filter: upstream confirmed sorted");
                }
                self.next_phase()?;
                continue;
            }
            let emitted: Option<Entity> = {
                let e = self.upstream.current();
                let kind = e.kind();
                if observing {
                    if let Some(seen) = self.seen {
                        if kind < seen {
                            // Recoverable signal, not an error: the phased
                            // rescans compensate.
                            let _ = self.verdict.set(false);
                            debug!(
                                "sort filter: {kind} after {seen}, upstream confirmed unsorted"
                            );
                        }
                    }
                    self.seen = Some(self.seen.map_or(kind, |s| s.max(kind)));
                }
                (kind == self.phase && !skip.excludes(kind)).then(|| e.clone())
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
        self.phase = EntityKind::Point;
        self.seen = None;
        self.current = None;
        self.done = false;
        self.delegating = self.verdict.get() == Some(&true);
        Ok(())
    }

    fn is_sorted(&self) -> bool {
        true
    }
}
