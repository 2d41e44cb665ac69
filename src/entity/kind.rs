//! `EntityKind`: the closed set of entity variants and their sort order.

use std::fmt;

/// The three entity kinds of the map data model.
///
/// Exactly three kinds exist and are fixed; algorithms match exhaustively
/// rather than dispatching through open-ended trait objects.
///
/// The derived `Ord` is the **type-sort order**: in a sorted stream all
/// points precede all polylines, which precede all relations.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum EntityKind {
    /// A coordinate-bearing point entity.
    Point,
    /// An ordered sequence of point references.
    Polyline,
    /// A grouping of members of any kind.
    Relation,
}

impl EntityKind {
    /// Position of this kind in the type-sort order (0, 1, 2).
    #[inline]
    pub const fn rank(self) -> u8 {
        match self {
            EntityKind::Point => 0,
            EntityKind::Polyline => 1,
            EntityKind::Relation => 2,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Point => "point",
            EntityKind::Polyline => "polyline",
            EntityKind::Relation => "relation",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_matches_type_sort_order() {
        assert!(EntityKind::Point < EntityKind::Polyline);
        assert!(EntityKind::Polyline < EntityKind::Relation);
        assert_eq!(EntityKind::Point.rank(), 0);
        assert_eq!(EntityKind::Relation.rank(), 2);
    }
}
