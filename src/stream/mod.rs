//! Stream contract: pull-based sources, in-memory replay, and targets.

pub mod memory;
pub mod source;
pub mod target;

pub use memory::MemorySource;
pub use source::{SkipKinds, Source};
pub use target::{CollectTarget, Target, drain, drive};
