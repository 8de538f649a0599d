// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stabbing-query scenarios exercised through the public API.

use pretty_assertions::assert_eq;
use segment_tree::{SegmentTree, SegmentTreeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    A,
    B,
    C,
}

#[test]
fn stabbing_scenario() {
    let mut tree: SegmentTree<i64, Tag> = SegmentTree::new();
    tree.insert(0, 10, Tag::A);
    tree.insert(5, 15, Tag::B);
    tree.insert(12, 20, Tag::C);
    tree.build_tree();

    assert_eq!(tree.search(6).unwrap(), vec![Tag::A, Tag::B]);
    assert_eq!(tree.search(13).unwrap(), vec![Tag::B, Tag::C]);
    assert_eq!(tree.search(10).unwrap(), vec![Tag::B]);

    tree.remove(&Tag::B);
    assert_eq!(tree.search(13).unwrap(), vec![Tag::C]);
    assert_eq!(tree.search(10).unwrap(), Vec::<Tag>::new());
}

#[test]
fn search_requires_a_built_tree() {
    let mut tree: SegmentTree<i64, u32> = SegmentTree::new();
    tree.insert(0, 10, 1);

    assert_eq!(tree.search(5).unwrap_err(), SegmentTreeError::TreeNotBuilt);
    tree.build_tree();
    assert_eq!(tree.search(5).unwrap(), vec![1]);

    // A new insertion invalidates the tree again.
    tree.insert(3, 7, 2);
    assert_eq!(tree.search(5).unwrap_err(), SegmentTreeError::TreeNotBuilt);
}

#[test]
fn empty_tree_searches_cleanly() {
    let mut tree: SegmentTree<i64, u32> = SegmentTree::new();
    tree.build_tree();
    assert_eq!(tree.search(42).unwrap(), Vec::<u32>::new());
}

#[test]
fn results_come_in_insertion_order() {
    let mut tree: SegmentTree<i64, u32> = SegmentTree::new();
    // Insert in an order that differs from key order.
    tree.insert(40, 60, 4);
    tree.insert(0, 100, 1);
    tree.insert(20, 80, 2);
    tree.insert(45, 55, 3);
    tree.build_tree();

    assert_eq!(tree.search(50).unwrap(), vec![4, 1, 2, 3]);
    assert_eq!(tree.search(30).unwrap(), vec![1, 2]);
}

#[test]
fn endpoints_are_half_open() {
    let mut tree: SegmentTree<i64, u32> = SegmentTree::new();
    tree.insert(10, 20, 1);
    tree.build_tree();

    assert_eq!(tree.search(9).unwrap(), Vec::<u32>::new());
    assert_eq!(tree.search(10).unwrap(), vec![1]);
    assert_eq!(tree.search(19).unwrap(), vec![1]);
    assert_eq!(tree.search(20).unwrap(), Vec::<u32>::new());
}

#[test]
fn remove_survives_rebuild() {
    let mut tree: SegmentTree<i64, u32> = SegmentTree::new();
    tree.insert(0, 10, 1);
    tree.insert(5, 15, 2);
    tree.build_tree();

    tree.remove(&2);
    assert_eq!(tree.search(7).unwrap(), vec![1]);
    assert_eq!(tree.segment_count(), 1);

    // Rebuilding must not resurrect the removed segment.
    tree.build_tree();
    assert_eq!(tree.search(7).unwrap(), vec![1]);
}

#[test]
fn remove_unknown_data_is_a_no_op() {
    let mut tree: SegmentTree<i64, u32> = SegmentTree::new();
    tree.insert(0, 10, 1);
    tree.build_tree();

    tree.remove(&99);
    assert_eq!(tree.search(5).unwrap(), vec![1]);
    assert_eq!(tree.segment_count(), 1);
}

#[test]
fn identical_intervals_with_distinct_data() {
    let mut tree: SegmentTree<i64, u32> = SegmentTree::new();
    tree.insert(0, 10, 1);
    tree.insert(0, 10, 2);
    tree.build_tree();

    assert_eq!(tree.search(5).unwrap(), vec![1, 2]);
    tree.remove(&1);
    assert_eq!(tree.search(5).unwrap(), vec![2]);
}
