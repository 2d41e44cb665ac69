//! Tag-rewriting pass-through filter.
//!
//! Entities are value-immutable; this filter produces new logical values
//! with renamed or dropped tag keys. Ids, coordinates, and references are
//! untouched.

use crate::entity::{Entity, Tags};
use crate::error::MapStreamError;
use crate::stream::source::{SkipKinds, Source};
use std::collections::BTreeMap;

/// Renames and/or drops tag keys on every entity flowing through.
pub struct TagRemapFilter<S> {
    upstream: S,
    renames: BTreeMap<String, String>,
    drops: Vec<String>,
    current: Option<Entity>,
}

impl<S: Source> TagRemapFilter<S> {
    /// Creates a no-op remap; configure with [`Self::rename`] and
    /// [`Self::drop_key`].
    pub fn new(upstream: S) -> Self {
        Self {
            upstream,
            renames: BTreeMap::new(),
            drops: Vec::new(),
            current: None,
        }
    }

    /// Renames tag key `from` to `to` (values carried over).
    pub fn rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.renames.insert(from.into(), to.into());
        self
    }

    /// Drops every tag with key `key`.
    pub fn drop_key(mut self, key: impl Into<String>) -> Self {
        self.drops.push(key.into());
        self
    }

    fn remap(&self, tags: &Tags) -> Tags {
        tags.iter()
            .filter(|(k, _)| !self.drops.iter().any(|d| d == k))
            .map(|(k, v)| {
                let key = self.renames.get(k).map_or(k, String::as_str);
                (key.to_owned(), v.to_owned())
            })
            .collect()
    }
}

impl<S: Source> Source for TagRemapFilter<S> {
    fn advance(&mut self, skip: SkipKinds) -> Result<bool, MapStreamError> {
        if !self.upstream.advance(skip)? {
            self.current = None;
            return Ok(false);
        }
        let mut entity = self.upstream.current().clone();
        *entity.tags_mut() = self.remap(entity.tags());
        self.current = Some(entity);
        Ok(true)
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
        self.current = None;
        Ok(())
    }

    fn is_sorted(&self) -> bool {
        self.upstream.is_sorted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityId, Point};
    use crate::stream::{MemorySource, drain};

    #[test]
    fn renames_and_drops_keys() {
        let tags: Tags = [("highway", "residential"), ("note", "scratch")]
            .into_iter()
            .collect();
        let src = MemorySource::new(vec![
            Point::with_tags(EntityId::new(1).unwrap(), 0.0, 0.0, tags).into(),
        ]);
        let mut filter = TagRemapFilter::new(src)
            .rename("highway", "road")
            .drop_key("note");
        let out = drain(&mut filter).unwrap();
        assert_eq!(out[0].tags().get("road"), Some("residential"));
        assert_eq!(out[0].tags().get("highway"), None);
        assert_eq!(out[0].tags().get("note"), None);
    }
}
