//! # mapstream
//!
//! mapstream is a sequential, memory-bounded streaming filter pipeline for
//! large geospatial map datasets. Map entities (points, polylines, and
//! relations cross-referencing each other by numeric id) flow through
//! pull-based source/filter/target compositions, so exporters, editors, and
//! analysis tools can extract a filtered or reorganized subset without ever
//! materializing the whole graph.
//!
//! ## Features
//! - Pull-based [`Source`](stream::Source)/[`Target`](stream::Target)
//!   contract with deterministic replay (`reset`) and type-skip capability
//! - Dependency-completion filter: transitive closure of referenced entities
//!   for a predicate-selected subset, with reference-counted cache eviction
//! - Spatial filters: multi-pass bounding-box/area membership with
//!   boundary-preserving extra-inclusion, plus a strict single-pass variant
//!   for type-sorted streams
//! - Sort-detection filter re-establishing points/polylines/relations order
//!   without a materializing sort
//! - Merge and exclude combinators across multiple pipelines
//!
//! ## Determinism
//!
//! Every multi-pass algorithm relies on the replay contract: a source
//! reporting `can_reset() == true` must reproduce an identical entity
//! sequence after every `reset()`. Sources wrapping live feeds must report
//! `can_reset() == false`, and multi-pass filters refuse them at
//! construction rather than silently misbehaving.
//!
//! ## Concurrency
//!
//! Execution is strictly single-threaded and synchronous: no operation
//! spawns background work, and `reset()` (an O(n) replay, not a cheap seek)
//! is the only rewind primitive.

pub mod entity;
pub mod error;
pub mod filter;
pub mod geometry;
pub mod store;
pub mod stream;

pub use error::MapStreamError;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::entity::{
        Entity, EntityId, EntityKind, Member, Point, Polyline, Relation, Tags,
    };
    pub use crate::error::MapStreamError;
    pub use crate::filter::{
        AreaFilter, CompleteFilter, ConflictPolicy, EntityPredicate, ExcludeFilter, MergeFilter,
        ProgressFilter, SortFilter, SortedAreaFilter, TagPredicate, TagRemapFilter,
    };
    pub use crate::geometry::{Area, BoundingBox};
    pub use crate::store::{EntityStore, InMemoryStore};
    pub use crate::stream::{
        CollectTarget, MemorySource, SkipKinds, Source, Target, drain, drive,
    };
}
