// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cross-container transfer and range swap.

use pretty_assertions::assert_eq;

use crate::helpers::{assert_consistent, blocks, counted};

#[test]
fn transfer_moves_blocks_and_values() {
    let mut src = counted(6);
    let mut dst = counted(6);
    src.set(0, 122u8).unwrap();
    src.set(1, 10i32).unwrap();
    src.set(2, 5i16).unwrap();
    assert_eq!(blocks(&src), 3);
    assert_eq!(blocks(&dst), 0);

    src.transfer(0, 2, &mut dst, 0).unwrap();

    assert_eq!(blocks(&src), 0);
    assert_eq!(blocks(&dst), 3);

    assert!(src.is_empty_at(0).unwrap());
    assert!(src.is_empty_at(1).unwrap());
    assert!(src.is_empty_at(2).unwrap());

    assert_eq!(dst.get::<u8>(0).unwrap(), 122);
    assert_eq!(dst.get::<i32>(1).unwrap(), 10);
    assert_eq!(dst.get::<i16>(2).unwrap(), 5);
    assert_consistent(&src);
    assert_consistent(&dst);
}

#[test]
fn transfer_in_two_steps_releases_the_source() {
    let mut src = counted(0);
    let mut dst = counted(6);
    for _ in 0..6 {
        src.push_back(97u8);
    }
    assert_eq!(blocks(&src), 1);
    assert_eq!(blocks(&dst), 0);

    src.transfer(0, 2, &mut dst, 0).unwrap();
    assert_eq!(blocks(&src), 1);
    assert_eq!(blocks(&dst), 1);

    src.transfer(3, 5, &mut dst, 3).unwrap();
    assert_eq!(blocks(&src), 0);
    assert_eq!(blocks(&dst), 1);
    assert_eq!(dst.block_size(), 1);
    assert_consistent(&src);
    assert_consistent(&dst);
}

#[test]
fn transfer_preserves_untouched_destination_content() {
    let mut src = counted(6);
    let mut dst = counted(6);
    src.set(0, 122u8).unwrap();
    src.set(1, 10i32).unwrap();
    src.set(2, 5i16).unwrap();
    dst.set(3, 1.1f64).unwrap();
    assert_eq!(blocks(&src), 3);
    assert_eq!(blocks(&dst), 1);

    src.transfer(0, 2, &mut dst, 0).unwrap();
    assert_eq!(blocks(&src), 0);
    assert_eq!(blocks(&dst), 4);
    assert_eq!(dst.get::<f64>(3).unwrap(), 1.1);
    assert_consistent(&dst);
}

#[test]
fn transfer_of_a_partial_block() {
    let mut src = counted(6);
    let mut dst = counted(6);
    src.set(0, 1.1f64).unwrap();
    src.set(1, 1.2f64).unwrap();
    src.set(2, 1.3f64).unwrap();
    assert_eq!(blocks(&src), 1);

    src.transfer(1, 3, &mut dst, 1).unwrap();
    assert_eq!(blocks(&src), 1);
    assert_eq!(blocks(&dst), 1);

    assert_eq!(src.get::<f64>(0).unwrap(), 1.1);
    assert!(src.is_empty_at(1).unwrap());
    assert!(src.is_empty_at(2).unwrap());
    assert_eq!(dst.get::<f64>(1).unwrap(), 1.2);
    assert_eq!(dst.get::<f64>(2).unwrap(), 1.3);
    assert!(dst.is_empty_at(3).unwrap());
    assert_consistent(&src);
    assert_consistent(&dst);
}

#[test]
fn transfer_straddling_a_block_boundary() {
    let mut src = counted(6);
    let mut dst = counted(6);
    src.set(3, 1.1f64).unwrap();
    src.set(4, 1.2f64).unwrap();
    src.set(5, 1.3f64).unwrap();
    assert_eq!(blocks(&src), 1);

    src.transfer(1, 3, &mut dst, 1).unwrap();
    assert_eq!(blocks(&src), 1);
    assert_eq!(blocks(&dst), 1);

    assert!(src.is_empty_at(3).unwrap());
    assert_eq!(src.get::<f64>(4).unwrap(), 1.2);
    assert!(dst.is_empty_at(1).unwrap());
    assert!(dst.is_empty_at(2).unwrap());
    assert_eq!(dst.get::<f64>(3).unwrap(), 1.1);
    assert_consistent(&src);
    assert_consistent(&dst);
}

#[test]
fn transfer_concatenation_is_preserved() {
    // The union of both containers' contents is unchanged by a transfer,
    // only redistributed.
    let mut src = counted(5);
    let mut dst = counted(5);
    for i in 0..5 {
        src.set(i, i as i64).unwrap();
    }
    dst.set(0, "keep".to_string()).unwrap();

    src.transfer(1, 3, &mut dst, 1).unwrap();

    let src_survivors: Vec<Option<i64>> =
        (0..5).map(|i| src.get::<i64>(i).ok()).collect();
    assert_eq!(
        src_survivors,
        vec![Some(0), None, None, None, Some(4)]
    );
    assert_eq!(dst.get::<String>(0).unwrap(), "keep");
    for i in 1..4 {
        assert_eq!(dst.get::<i64>(i).unwrap(), i as i64);
    }
    assert!(dst.is_empty_at(4).unwrap());
}

#[test]
fn swap_exchanges_whole_ranges() {
    let mut src = counted(3);
    let mut dst = counted(3);
    src.set(0, 1.1f64).unwrap();
    src.set(1, 1.2f64).unwrap();
    src.set(2, 1.3f64).unwrap();
    dst.set(0, "2.1".to_string()).unwrap();
    dst.set(1, "2.2".to_string()).unwrap();
    dst.set(2, "2.3".to_string()).unwrap();
    assert_eq!(blocks(&src), 1);
    assert_eq!(blocks(&dst), 1);

    src.swap_range(0, 2, &mut dst, 0).unwrap();
    assert_eq!(blocks(&src), 1);
    assert_eq!(blocks(&dst), 1);

    assert_eq!(src.get::<String>(0).unwrap(), "2.1");
    assert_eq!(src.get::<String>(2).unwrap(), "2.3");
    assert_eq!(dst.get::<f64>(0).unwrap(), 1.1);
    assert_eq!(dst.get::<f64>(2).unwrap(), 1.3);
    assert_consistent(&src);
    assert_consistent(&dst);
}

#[test]
fn swap_of_partial_ranges() {
    let mut src = counted(4);
    let mut dst = counted(4);
    for i in 0..4 {
        src.set(i, (i + 1) as i32).unwrap();
        dst.set(i, ((i + 1) * 10) as i32).unwrap();
    }

    src.swap_range(1, 2, &mut dst, 1).unwrap();

    let src_values: Vec<i32> = (0..4).map(|i| src.get::<i32>(i).unwrap()).collect();
    let dst_values: Vec<i32> = (0..4).map(|i| dst.get::<i32>(i).unwrap()).collect();
    assert_eq!(src_values, vec![1, 20, 30, 4]);
    assert_eq!(dst_values, vec![10, 2, 3, 40]);
    assert_eq!(blocks(&src), 1);
    assert_eq!(blocks(&dst), 1);
    assert_consistent(&src);
    assert_consistent(&dst);
}
