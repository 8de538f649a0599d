// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client-defined element categories.

use multi_type_vector::{CategoryId, Element, MultiTypeVector, MultiTypeVectorError};
use pretty_assertions::assert_eq;

/// A plain user-defined cell type.
#[derive(Debug, Clone, PartialEq)]
struct UserCell {
    value: f64,
}

impl Element for UserCell {
    const CATEGORY: CategoryId = CategoryId::user(0);
}

/// A user cell that owns heap storage, standing in for the "managed"
/// cell variants: the block owns the payload outright.
#[derive(Debug, Clone, PartialEq)]
struct ManagedCell(Box<str>);

impl Element for ManagedCell {
    const CATEGORY: CategoryId = CategoryId::user(1);
}

#[test]
fn user_categories_are_first_class() {
    let mut db = MultiTypeVector::with_size(4);
    db.set(0, UserCell { value: 1.5 }).unwrap();
    db.set(1, UserCell { value: 2.5 }).unwrap();
    db.set(3, ManagedCell("owned".into())).unwrap();

    assert_eq!(db.get_type(0).unwrap(), CategoryId::user(0));
    assert_eq!(db.get::<UserCell>(1).unwrap(), UserCell { value: 2.5 });
    assert_eq!(db.get_type(3).unwrap(), CategoryId::user(1));
    assert_eq!(db.block_size(), 3);
    db.check_integrity();
}

#[test]
fn distinct_user_categories_never_merge() {
    let mut db = MultiTypeVector::with_size(2);
    db.set(0, UserCell { value: 1.0 }).unwrap();
    db.set(1, ManagedCell("x".into())).unwrap();

    assert_eq!(db.block_size(), 2);
    assert_eq!(
        db.get::<UserCell>(1).unwrap_err(),
        MultiTypeVectorError::TypeMismatch {
            requested: CategoryId::user(0),
            stored: CategoryId::user(1),
        }
    );
}

#[test]
fn user_blocks_move_through_transfer() {
    let mut src = MultiTypeVector::with_size(3);
    let mut dst = MultiTypeVector::with_size(3);
    for i in 0..3 {
        src.set(i, UserCell { value: i as f64 }).unwrap();
    }

    src.transfer(0, 2, &mut dst, 0).unwrap();

    assert!(src.is_empty_at(0).unwrap());
    for i in 0..3 {
        assert_eq!(dst.get::<UserCell>(i).unwrap(), UserCell { value: i as f64 });
    }
    src.check_integrity();
    dst.check_integrity();
}

#[test]
fn user_blocks_mix_with_standard_categories() {
    let mut db = MultiTypeVector::new();
    db.push_back(1.0f64);
    db.push_back(UserCell { value: 2.0 });
    db.push_back(UserCell { value: 3.0 });
    db.push_back("tail".to_string());

    assert_eq!(db.size(), 4);
    assert_eq!(db.block_size(), 3);
    assert_eq!(db.get::<UserCell>(2).unwrap(), UserCell { value: 3.0 });

    // Overwriting the double with a user cell extends the user block.
    db.set(0, UserCell { value: 0.5 }).unwrap();
    assert_eq!(db.block_size(), 2);
    assert_eq!(db.get::<UserCell>(0).unwrap(), UserCell { value: 0.5 });
    db.check_integrity();
}
