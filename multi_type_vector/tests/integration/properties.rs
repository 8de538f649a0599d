// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property-based tests driving the container against a naive model.

use multi_type_vector::MultiTypeVector;
use proptest::prelude::*;

use crate::helpers::{BlockCounter, CountedVector, assert_consistent};

/// The model mirrors the container as one slot per position.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Slot {
    Empty,
    Int(i32),
    Float(u32),
    Text(u8),
}

#[derive(Debug, Clone)]
enum Op {
    Set(usize, Slot),
    SetRun(usize, usize, Slot),
    SetEmpty(usize, usize),
    Insert(usize, usize, Slot),
    InsertEmpty(usize, usize),
    Erase(usize, usize),
    Resize(usize),
    PushBack(Slot),
}

fn slot_strategy() -> impl Strategy<Value = Slot> {
    prop_oneof![
        (0..100i32).prop_map(Slot::Int),
        (0..100u32).prop_map(Slot::Float),
        (0..100u8).prop_map(Slot::Text),
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..64usize, slot_strategy()).prop_map(|(pos, slot)| Op::Set(pos, slot)),
        (0..64usize, 1..8usize, slot_strategy())
            .prop_map(|(pos, len, slot)| Op::SetRun(pos, len, slot)),
        (0..64usize, 1..8usize).prop_map(|(pos, len)| Op::SetEmpty(pos, len)),
        (0..64usize, 1..6usize, slot_strategy())
            .prop_map(|(pos, len, slot)| Op::Insert(pos, len, slot)),
        (0..64usize, 1..6usize).prop_map(|(pos, len)| Op::InsertEmpty(pos, len)),
        (0..64usize, 1..8usize).prop_map(|(pos, len)| Op::Erase(pos, len)),
        (0..48usize).prop_map(Op::Resize),
        slot_strategy().prop_map(Op::PushBack),
    ]
}

fn apply_set(db: &mut CountedVector, pos: usize, slot: Slot) {
    match slot {
        Slot::Empty => db.set_empty(pos, pos).unwrap(),
        Slot::Int(v) => db.set(pos, v).unwrap(),
        Slot::Float(v) => db.set(pos, v as f64).unwrap(),
        Slot::Text(v) => db.set(pos, format!("s{v}")).unwrap(),
    }
}

fn slot_matches(db: &CountedVector, pos: usize, slot: Slot) -> bool {
    match slot {
        Slot::Empty => db.is_empty_at(pos).unwrap(),
        Slot::Int(v) => db.get::<i32>(pos) == Ok(v),
        Slot::Float(v) => db.get::<f64>(pos) == Ok(v as f64),
        Slot::Text(v) => db.get::<String>(pos).as_deref() == Ok(format!("s{v}").as_str()),
    }
}

fn run_op(db: &mut CountedVector, model: &mut Vec<Slot>, op: &Op) {
    match *op {
        Op::Set(pos, slot) => {
            if pos < model.len() {
                apply_set(db, pos, slot);
                model[pos] = slot;
            }
        }
        Op::SetRun(pos, len, slot) => {
            if pos + len <= model.len() {
                match slot {
                    Slot::Empty => unreachable!("the strategy never yields empty runs here"),
                    Slot::Int(v) => db.set_values(pos, &vec![v; len]).unwrap(),
                    Slot::Float(v) => db.set_values(pos, &vec![v as f64; len]).unwrap(),
                    Slot::Text(v) => db.set_values(pos, &vec![format!("s{v}"); len]).unwrap(),
                }
                for slot_ref in model.iter_mut().skip(pos).take(len) {
                    *slot_ref = slot;
                }
            }
        }
        Op::SetEmpty(pos, len) => {
            if pos + len <= model.len() {
                db.set_empty(pos, pos + len - 1).unwrap();
                for slot_ref in model.iter_mut().skip(pos).take(len) {
                    *slot_ref = Slot::Empty;
                }
            }
        }
        Op::Insert(pos, len, slot) => {
            if pos <= model.len() {
                match slot {
                    Slot::Empty => unreachable!("the strategy never yields empty runs here"),
                    Slot::Int(v) => db.insert_values(pos, &vec![v; len]).unwrap(),
                    Slot::Float(v) => db.insert_values(pos, &vec![v as f64; len]).unwrap(),
                    Slot::Text(v) => db.insert_values(pos, &vec![format!("s{v}"); len]).unwrap(),
                }
                model.splice(pos..pos, std::iter::repeat(slot).take(len));
            }
        }
        Op::InsertEmpty(pos, len) => {
            if pos <= model.len() {
                db.insert_empty(pos, len).unwrap();
                model.splice(pos..pos, std::iter::repeat(Slot::Empty).take(len));
            }
        }
        Op::Erase(pos, len) => {
            if pos < model.len() {
                let end = (pos + len - 1).min(model.len() - 1);
                db.erase(pos, end).unwrap();
                model.drain(pos..=end);
            }
        }
        Op::Resize(new_size) => {
            db.resize(new_size);
            model.resize(new_size, Slot::Empty);
        }
        Op::PushBack(slot) => {
            match slot {
                Slot::Empty => db.push_back_empty(),
                Slot::Int(v) => db.push_back(v),
                Slot::Float(v) => db.push_back(v as f64),
                Slot::Text(v) => db.push_back(format!("s{v}")),
            }
            model.push(slot);
        }
    }
}

proptest::proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_container_tracks_the_model(
        initial_size in 0..32usize,
        ops in proptest::collection::vec(op_strategy(), 1..40),
    ) {
        let mut db = MultiTypeVector::with_size_and_handler(initial_size, BlockCounter::default());
        let mut model = vec![Slot::Empty; initial_size];

        for op in &ops {
            run_op(&mut db, &mut model, op);

            // Invariants and event accounting hold after every mutation.
            assert_consistent(&db);
            prop_assert_eq!(db.size(), model.len());
        }

        for (pos, &slot) in model.iter().enumerate() {
            prop_assert!(
                slot_matches(&db, pos, slot),
                "position {} diverged from the model: expected {:?}",
                pos,
                slot
            );
        }
    }

    #[test]
    fn prop_transfer_moves_content_between_models(
        size in 4..24usize,
        seeds in proptest::collection::vec(slot_strategy(), 24),
        begin in 0..12usize,
        len in 1..8usize,
        dst_pos in 0..12usize,
    ) {
        let mut src = MultiTypeVector::with_size_and_handler(size, BlockCounter::default());
        let mut dst = MultiTypeVector::with_size_and_handler(size, BlockCounter::default());
        let mut src_model = vec![Slot::Empty; size];
        let mut dst_model = vec![Slot::Empty; size];

        for (pos, &slot) in seeds.iter().take(size).enumerate() {
            apply_set(&mut src, pos, slot);
            src_model[pos] = slot;
        }
        for (pos, &slot) in seeds.iter().skip(size.min(seeds.len())).enumerate() {
            if pos >= size {
                break;
            }
            apply_set(&mut dst, pos, slot);
            dst_model[pos] = slot;
        }

        let begin = begin.min(size - 1);
        let end = (begin + len - 1).min(size - 1);
        let dst_pos = dst_pos.min(size - (end - begin + 1));

        src.transfer(begin, end, &mut dst, dst_pos).unwrap();
        for offset in 0..=(end - begin) {
            dst_model[dst_pos + offset] = src_model[begin + offset];
            src_model[begin + offset] = Slot::Empty;
        }

        assert_consistent(&src);
        assert_consistent(&dst);
        for pos in 0..size {
            prop_assert!(slot_matches(&src, pos, src_model[pos]));
            prop_assert!(slot_matches(&dst, pos, dst_model[pos]));
        }
    }
}
