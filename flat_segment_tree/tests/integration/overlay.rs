// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end overlay scenarios exercised through the public API.

use flat_segment_tree::{FlatSegmentTree, FlatSegmentTreeError, SegmentSpan};
use pretty_assertions::assert_eq;

type Fst = FlatSegmentTree<i64, i32>;

fn span(start: i64, end: i64, value: i32) -> SegmentSpan<i64, i32> {
    SegmentSpan { start, end, value }
}

#[test]
fn overlay_scenario() {
    let mut db = Fst::new(0, 500, 0).unwrap();
    db.insert_front(10, 20, 10);
    db.insert_back(50, 70, 15);
    db.insert_back(60, 65, 5);
    db.build_tree();

    assert_eq!(db.search_tree(15).unwrap(), span(10, 20, 10));
    assert_eq!(db.search_tree(62).unwrap(), span(60, 65, 5));
    assert_eq!(db.search_tree(68).unwrap(), span(65, 70, 15));
    assert_eq!(db.search_tree(200).unwrap(), span(70, 500, 0));
}

#[test]
fn linear_and_tree_search_agree_everywhere() {
    let mut db = Fst::new(0, 120, 0).unwrap();
    db.insert_front(3, 40, 4);
    db.insert_back(20, 30, 9);
    db.insert_front(30, 90, 2);
    db.insert_back(90, 120, 7);
    db.build_tree();

    for point in 0..120 {
        let linear = db.search(point).unwrap();
        let tree = db.search_tree(point).unwrap();
        assert_eq!(linear, tree, "divergence at point {point}");
        assert!(linear.start <= point && point < linear.end);
    }
}

#[test]
fn build_tree_is_idempotent() {
    let mut db = Fst::new(0, 50, 1).unwrap();
    db.insert_front(10, 30, 2);
    db.build_tree();
    let before: Vec<_> = (0..50).map(|p| db.search_tree(p).unwrap()).collect();

    db.build_tree();
    let after: Vec<_> = (0..50).map(|p| db.search_tree(p).unwrap()).collect();
    assert_eq!(before, after);
}

#[test]
fn last_overlay_wins() {
    let mut db = Fst::new(0, 100, 0).unwrap();
    db.insert_front(0, 100, 1);
    db.insert_back(25, 75, 2);
    db.insert_front(40, 60, 3);

    assert_eq!(db.search(10).unwrap().value, 1);
    assert_eq!(db.search(30).unwrap().value, 2);
    assert_eq!(db.search(50).unwrap().value, 3);
    assert_eq!(db.search(70).unwrap().value, 2);
    assert_eq!(db.search(80).unwrap().value, 1);
}

#[test]
fn whole_domain_overlay_collapses_to_one_span() {
    let mut db = Fst::new(0, 100, 0).unwrap();
    db.insert_front(10, 20, 1);
    db.insert_back(30, 40, 2);
    db.insert_front(0, 100, 5);

    let spans: Vec<_> = db.segments().collect();
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].value, 5);
    assert_eq!(db.leaf_count(), 2);
}

#[test]
fn searches_reject_out_of_domain_points() {
    let mut db = Fst::new(10, 20, 0).unwrap();
    db.build_tree();

    for bad in [-5i64, 9, 20, 25] {
        assert_eq!(db.search(bad).unwrap_err(), FlatSegmentTreeError::OutOfRange);
        assert_eq!(
            db.search_tree(bad).unwrap_err(),
            FlatSegmentTreeError::OutOfRange
        );
    }
}

#[test]
fn boundary_overlays_meeting_at_a_key() {
    let mut db = Fst::new(0, 100, 0).unwrap();
    db.insert_front(10, 50, 1);
    db.insert_back(50, 90, 2);

    // The boundary at 50 belongs to the right-hand overlay.
    assert_eq!(db.search(49).unwrap(), span(10, 50, 1));
    assert_eq!(db.search(50).unwrap(), span(50, 90, 2));

    // Re-covering the boundary from the left moves it.
    db.insert_front(40, 60, 1);
    assert_eq!(db.search(50).unwrap(), span(10, 60, 1));
}
