// SPDX-License-Identifier: MIT OR Apache-2.0

//! Insert and search scenarios over a 2-dimensional tree.

use pretty_assertions::assert_eq;
use rtree::{CheckMode, Extent, NodeType, Point, RTree, SearchMode, TreeParams};

type Tree = RTree<f64, String, 2>;

fn small_params() -> TreeParams {
    TreeParams {
        min_node_size: 2,
        max_node_size: 4,
        max_tree_depth: 128,
    }
}

fn extent(start: [f64; 2], end: [f64; 2]) -> Extent<f64, 2> {
    Extent::new(start.into(), end.into())
}

fn sorted_values(hits: Vec<rtree::SearchHit<'_, f64, String, 2>>) -> Vec<String> {
    let mut values: Vec<String> = hits.into_iter().map(|hit| hit.value.clone()).collect();
    values.sort();
    values
}

#[test]
fn overlap_scenario() {
    let mut tree = Tree::with_params(small_params());
    tree.insert(extent([0.0, 0.0], [15.0, 20.0]), "first rectangle".into())
        .unwrap();
    tree.insert(extent([-2.0, -1.0], [1.0, 2.0]), "second rectangle".into())
        .unwrap();
    tree.insert(extent([-1.0, -1.0], [1.0, 3.0]), "third rectangle".into())
        .unwrap();
    tree.insert_point(Point::new([5.0, 6.0]), "first point".into())
        .unwrap();
    tree.check_integrity(CheckMode::FailFast).unwrap();

    let hits = tree.search(&extent([4.0, 4.0], [7.0, 7.0]), SearchMode::Overlap);
    assert_eq!(
        sorted_values(hits),
        vec!["first point".to_string(), "first rectangle".to_string()]
    );

    let hits = tree.search(&extent([0.0, 0.0], [15.0, 20.0]), SearchMode::Match);
    assert_eq!(sorted_values(hits), vec!["first rectangle".to_string()]);

    let hits = tree.search(&extent([4.0, 4.0], [7.0, 7.0]), SearchMode::Match);
    assert!(hits.is_empty());
}

#[test]
fn point_search_hits_every_containing_extent() {
    let mut tree = Tree::with_params(small_params());
    tree.insert(extent([0.0, 0.0], [10.0, 10.0]), "big".into())
        .unwrap();
    tree.insert(extent([2.0, 2.0], [4.0, 4.0]), "inner".into())
        .unwrap();
    tree.insert(extent([20.0, 20.0], [30.0, 30.0]), "far".into())
        .unwrap();

    let hits = tree.search_point(&Point::new([3.0, 3.0]));
    assert_eq!(sorted_values(hits), vec!["big".to_string(), "inner".to_string()]);

    // Boundary points are contained (closed boxes).
    let hits = tree.search_point(&Point::new([10.0, 10.0]));
    assert_eq!(sorted_values(hits), vec!["big".to_string()]);

    assert!(tree.search_point(&Point::new([50.0, 50.0])).is_empty());
}

#[test]
fn split_keeps_integrity_and_results() {
    let mut tree = Tree::with_params(small_params());
    // Enough inserts to force several splits and a root replacement.
    for i in 0..40 {
        let base = f64::from(i);
        tree.insert(
            extent([base, base], [base + 1.0, base + 1.0]),
            format!("value {i}"),
        )
        .unwrap();
        tree.check_integrity(CheckMode::FailFast).unwrap();
    }
    assert_eq!(tree.len(), 40);

    // Every value is still reachable through search.
    for i in 0..40 {
        let base = f64::from(i);
        let hits = tree.search_point(&Point::new([base + 0.5, base + 0.5]));
        assert_eq!(sorted_values(hits), vec![format!("value {i}")]);
    }

    // The root extent covers everything.
    assert!(tree.extent().contains(&extent([0.0, 0.0], [40.0, 40.0])));
}

#[test]
fn values_iterator_sees_everything() {
    let mut tree = Tree::with_params(small_params());
    for i in 0..10 {
        let base = f64::from(i) * 3.0;
        tree.insert(extent([base, 0.0], [base + 2.0, 2.0]), format!("v{i}"))
            .unwrap();
    }

    let mut seen: Vec<String> = tree.values().map(|hit| hit.value.clone()).collect();
    seen.sort();
    let mut expected: Vec<String> = (0..10).map(|i| format!("v{i}")).collect();
    expected.sort();
    assert_eq!(seen, expected);
}

#[test]
fn entry_handles_resolve_until_erased() {
    let mut tree = Tree::with_params(small_params());
    let entry = tree
        .insert(extent([0.0, 0.0], [1.0, 1.0]), "keep".into())
        .unwrap();

    let hit = tree.get(entry).unwrap();
    assert_eq!(hit.value, "keep");
    assert_eq!(hit.extent, extent([0.0, 0.0], [1.0, 1.0]));

    tree.erase(entry).unwrap();
    assert!(tree.get(entry).is_none());
}

#[test]
fn walk_visits_every_node_once() {
    let mut tree = Tree::with_params(small_params());
    for i in 0..9 {
        let base = f64::from(i) * 2.0;
        tree.insert(extent([base, 0.0], [base + 1.0, 1.0]), format!("w{i}"))
            .unwrap();
    }

    let mut values = 0;
    let mut directories = 0;
    let mut max_depth = 0;
    tree.walk(|props| {
        match props.node_type {
            NodeType::Value => values += 1,
            NodeType::DirectoryLeaf | NodeType::DirectoryNonLeaf => directories += 1,
        }
        max_depth = max_depth.max(props.depth);
        assert!(tree.extent().contains(&props.extent));
    });

    assert_eq!(values, 9);
    // With max_node_size 4 the nine values cannot fit under a single
    // directory.
    assert!(directories > 1);
    assert!(max_depth >= 2);
}

#[test]
fn dump_renders_the_hierarchy() {
    let mut tree = Tree::with_params(small_params());
    tree.insert(extent([0.0, 0.0], [1.0, 1.0]), "a".into())
        .unwrap();

    let rendered = tree.dump().to_string();
    assert!(rendered.contains("directory-leaf"));
    assert!(rendered.contains("value"));
}
