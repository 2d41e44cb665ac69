//! Spatial filters: membership, boundary completeness, tie-breaks, and the
//! strict single-pass variant.

mod common;

use common::*;
use mapstream::prelude::*;

fn unit_box() -> BoundingBox {
    BoundingBox::new(-1.0, 1.0, -1.0, 1.0)
}

/// Scenario: boundary completeness. A polyline with one inside point is
/// retained, and its outside point is back-filled by the extra-inclusion
/// sweep.
#[test]
fn outside_point_backfilled_for_retained_polyline() {
    let src = MemorySource::new(vec![
        point(1, 0.0, 0.0),
        point(2, 5.0, 5.0),
        polyline(10, &[1, 2]),
    ]);
    let mut filter = AreaFilter::new(src, unit_box()).unwrap();
    let out = drain(&mut filter).unwrap();
    assert_eq!(
        keys(&out),
        vec![
            (EntityKind::Point, 1),
            (EntityKind::Polyline, 10),
            // geometrically outside, structurally required
            (EntityKind::Point, 2),
        ]
    );
}

/// Half-open tie-break: the minimum edge is inside, the maximum edge is
/// outside.
#[test]
fn half_open_boundary_tie_break() {
    let src = MemorySource::new(vec![
        point(1, -1.0, -1.0), // on the minimum corner: in
        point(2, 1.0, 0.0),   // on the maximum latitude edge: out
        point(3, 0.0, 1.0),   // on the maximum longitude edge: out
    ]);
    let mut filter = AreaFilter::new(src, unit_box()).unwrap();
    let out = drain(&mut filter).unwrap();
    assert_eq!(keys(&out), vec![(EntityKind::Point, 1)]);
}

/// A polyline with no inside point is dropped entirely.
#[test]
fn fully_outside_polyline_dropped() {
    let src = MemorySource::new(vec![
        point(1, 5.0, 5.0),
        point(2, 6.0, 6.0),
        polyline(10, &[1, 2]),
    ]);
    let mut filter = AreaFilter::new(src, unit_box()).unwrap();
    let out = drain(&mut filter).unwrap();
    assert!(out.is_empty());
}

/// A relation with one directly-inside member is retained and its outside
/// point/polyline members are extra-included; relation-kind members are not.
#[test]
fn relation_membership_and_extra_inclusion() {
    let src = MemorySource::new(vec![
        point(1, 0.0, 0.0),  // in
        point(3, 5.0, 5.0),  // out
        polyline(20, &[3]),  // out (no inside point)
        relation(
            100,
            &[
                (EntityKind::Point, 1),
                (EntityKind::Polyline, 20),
                (EntityKind::Relation, 999),
            ],
        ),
    ]);
    let mut filter = AreaFilter::new(src, unit_box()).unwrap();
    let out = drain(&mut filter).unwrap();
    assert!(contains(&out, EntityKind::Point, 1));
    assert!(contains(&out, EntityKind::Relation, 100));
    // outside members of a retained relation are structurally required
    assert!(contains(&out, EntityKind::Polyline, 20));
    // but a relation member is never included by extra-inclusion alone
    assert!(!contains(&out, EntityKind::Relation, 999));
}

/// A relation whose members are all outside is dropped.
#[test]
fn fully_outside_relation_dropped() {
    let src = MemorySource::new(vec![
        point(3, 5.0, 5.0),
        relation(100, &[(EntityKind::Point, 3)]),
    ]);
    let mut filter = AreaFilter::new(src, unit_box()).unwrap();
    let out = drain(&mut filter).unwrap();
    assert!(out.is_empty());
}

/// The extra-inclusion sweep is idempotent: an id both "in" and marked extra
/// is emitted exactly once.
#[test]
fn inside_entities_not_duplicated_by_sweep() {
    let src = MemorySource::new(vec![
        point(1, 0.0, 0.0),
        point(2, 0.5, 0.5),
        polyline(10, &[1, 2]),
    ]);
    let mut filter = AreaFilter::new(src, unit_box()).unwrap();
    let out = drain(&mut filter).unwrap();
    assert_eq!(
        keys(&out),
        vec![
            (EntityKind::Point, 1),
            (EntityKind::Point, 2),
            (EntityKind::Polyline, 10),
        ]
    );
}

/// The multi-pass filter refuses a non-replayable upstream.
#[test]
fn rejects_non_resettable_upstream() {
    let src = NonResettable(MemorySource::new(vec![point(1, 0.0, 0.0)]));
    let err = AreaFilter::new(src, unit_box()).unwrap_err();
    assert_eq!(
        err,
        MapStreamError::SourceNotResettable {
            filter: "AreaFilter"
        }
    );
}

/// Reset clears membership and replays the identical output.
#[test]
fn reset_replays_identical_output() {
    let entities = vec![
        point(1, 0.0, 0.0),
        point(2, 5.0, 5.0),
        polyline(10, &[1, 2]),
    ];
    let mut filter = AreaFilter::new(MemorySource::new(entities), unit_box()).unwrap();
    let first = drain(&mut filter).unwrap();
    filter.reset().unwrap();
    let second = drain(&mut filter).unwrap();
    assert_eq!(first, second);
}

/// Single-pass variant: same membership logic on a sorted stream, but no
/// extra-inclusion sweep.
#[test]
fn sorted_variant_does_not_backfill() {
    let src = MemorySource::new(vec![
        point(1, 0.0, 0.0),
        point(2, 5.0, 5.0),
        polyline(10, &[1, 2]),
    ]);
    let mut filter = SortedAreaFilter::new(src, unit_box());
    let out = drain(&mut filter).unwrap();
    assert_eq!(
        keys(&out),
        vec![(EntityKind::Point, 1), (EntityKind::Polyline, 10)]
    );
}

/// Single-pass variant: fails fast on the first kind-order inversion.
#[test]
fn sorted_variant_rejects_unsorted_stream() {
    let src = MemorySource::new(vec![
        point(1, 0.0, 0.0),
        polyline(10, &[1]),
        point(2, 0.5, 0.5), // point after polyline: inversion
    ]);
    let mut filter = SortedAreaFilter::new(src, unit_box());
    let err = drain(&mut filter).unwrap_err();
    assert_eq!(
        err,
        MapStreamError::UnsortedSource {
            found: EntityKind::Point,
            seen: EntityKind::Polyline,
        }
    );
}
