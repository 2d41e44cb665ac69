//! Progress-reporting pass-through filter.

use crate::entity::Entity;
use crate::error::MapStreamError;
use crate::stream::source::{SkipKinds, Source};
use log::info;

/// Transparent delegate that logs throughput every `interval` entities and a
/// summary at exhaustion. Preserves every contract bit of its upstream.
pub struct ProgressFilter<S> {
    upstream: S,
    label: String,
    interval: u64,
    count: u64,
}

impl<S: Source> ProgressFilter<S> {
    /// Creates a progress filter logging under `label` every `interval`
    /// entities (an interval of 0 is treated as 1).
    pub fn new(upstream: S, label: impl Into<String>, interval: u64) -> Self {
        Self {
            upstream,
            label: label.into(),
            interval: interval.max(1),
            count: 0,
        }
    }

    /// Entities passed through since construction or the last reset.
    pub fn count(&self) -> u64 {
        self.count
    }
}

impl<S: Source> Source for ProgressFilter<S> {
    fn advance(&mut self, skip: SkipKinds) -> Result<bool, MapStreamError> {
        if self.upstream.advance(skip)? {
            self.count += 1;
            if self.count % self.interval == 0 {
                info!("{}: {} entities processed", self.label, self.count);
            }
            Ok(true)
        } else {
            info!("{}: finished after {} entities", self.label, self.count);
            Ok(false)
        }
    }

    fn current(&self) -> &Entity {
        self.upstream.current()
    }

    fn can_reset(&self) -> bool {
        self.upstream.can_reset()
    }

    fn reset(&mut self) -> Result<(), MapStreamError> {
        self.upstream.reset()?;
        self.count = 0;
        Ok(())
    }

    fn is_sorted(&self) -> bool {
        self.upstream.is_sorted()
    }
}
