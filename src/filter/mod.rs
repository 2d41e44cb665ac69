//! Filters: sources that wrap and transform other sources.
//!
//! Every filter implements [`Source`](crate::stream::Source) by delegating to
//! its upstream(s); `can_reset()` is the conjunction of the upstreams'.
//! Multi-pass filters ([`CompleteFilter`], [`AreaFilter`], [`SortFilter`],
//! [`MergeFilter`]) fail fast at construction when replay is unavailable.

pub mod complete;
pub mod exclude;
pub mod merge;
pub mod predicate;
pub mod progress;
pub mod sort;
pub mod spatial;
pub mod tags;

pub use complete::CompleteFilter;
pub use exclude::ExcludeFilter;
pub use merge::{ConflictPolicy, MergeFilter};
pub use predicate::{EntityPredicate, TagPredicate};
pub use progress::ProgressFilter;
pub use sort::SortFilter;
pub use spatial::{AreaFilter, SortedAreaFilter};
pub use tags::TagRemapFilter;
