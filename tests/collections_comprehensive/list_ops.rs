//! RemoteList integration tests

use crate::common::*;
use proptest::prelude::*;
use tetherdb::{ListSource, RemoteList, Value};

fn seeded(db: &tetherdb::Tether, values: &[i64]) -> RemoteList {
    let list = db.list().unwrap();
    let values: Vec<Value> = values.iter().map(|i| Value::Int(*i)).collect();
    list.extend(&values).unwrap();
    list
}

fn ints(list: &RemoteList) -> Vec<i64> {
    list.to_vec()
        .unwrap()
        .iter()
        .map(|v| v.as_int().expect("int element"))
        .collect()
}

// ============================================================================
// Trim-only deletion across every slice shape
// ============================================================================

#[test]
fn suffix_deletion_trims() {
    let db = test_db();
    let list = seeded(&db, &[1, 2, 3, 4]);
    list.remove_range(Some(2), None).unwrap(); // del seq[2:]
    assert_eq!(ints(&list), vec![1, 2]);
}

#[test]
fn prefix_deletion_trims() {
    let db = test_db();
    let list = seeded(&db, &[1, 2, 3, 4]);
    list.remove_range(None, Some(2)).unwrap(); // del seq[:2]
    assert_eq!(ints(&list), vec![3, 4]);
}

#[test]
fn full_deletion_clears() {
    let db = test_db();
    let list = seeded(&db, &[1, 2, 3]);
    list.remove_range(None, None).unwrap(); // del seq[:]
    assert!(list.is_empty().unwrap());
}

#[test]
fn mid_range_deletion_is_rejected() {
    let db = test_db();
    let list = seeded(&db, &[1, 2, 3, 4]);
    let err = list.remove_range(Some(1), Some(3)).unwrap_err(); // del seq[1:3]
    assert!(err.is_unsupported());
    assert_eq!(ints(&list), vec![1, 2, 3, 4]);
}

// ============================================================================
// Index operations
// ============================================================================

#[test]
fn get_set_with_negative_indices() {
    let db = test_db();
    let list = seeded(&db, &[10, 20, 30]);
    assert_eq!(list.get(-2).unwrap(), Value::Int(20));
    list.set(-3, &Value::Int(11)).unwrap();
    assert_eq!(ints(&list), vec![11, 20, 30]);
}

#[test]
fn out_of_bounds_access_is_not_found() {
    let db = test_db();
    let list = seeded(&db, &[1]);
    assert!(list.get(3).unwrap_err().is_not_found());
    assert!(list.set(3, &Value::Int(0)).unwrap_err().is_not_found());
}

#[test]
fn pop_at_interior_is_unsupported() {
    let db = test_db();
    let list = seeded(&db, &[1, 2, 3]);
    assert!(list.pop_at(1).unwrap_err().is_unsupported());
    assert_eq!(list.pop_at(0).unwrap(), Value::Int(1));
    assert_eq!(list.pop_at(-1).unwrap(), Value::Int(3));
    assert_eq!(ints(&list), vec![2]);
}

// ============================================================================
// Stepped reads
// ============================================================================

#[test]
fn stepped_read_matches_local_subsample() {
    let db = test_db();
    let list = seeded(&db, &[0, 1, 2, 3, 4, 5, 6]);
    assert_eq!(
        list.range_step(1, 5, 2).unwrap(),
        vec![Value::Int(1), Value::Int(3), Value::Int(5)]
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn range_step_agrees_with_vec_model(
        values in prop::collection::vec(-100i64..100, 0..12),
        step in 1usize..5,
    ) {
        let db = test_db();
        let list = seeded(&db, &values);
        let remote: Vec<i64> = list
            .range_step(0, -1, step)
            .unwrap()
            .iter()
            .map(|v| v.as_int().unwrap())
            .collect();
        let local: Vec<i64> = values.iter().copied().step_by(step).collect();
        prop_assert_eq!(remote, local);
    }
}

// ============================================================================
// Concatenation / repetition
// ============================================================================

#[test]
fn concat_and_repeat_produce_fresh_collections() {
    let db = test_db();
    let a = seeded(&db, &[1, 2]);
    let b = seeded(&db, &[3]);

    let ab = a.concat(ListSource::Remote(&b)).unwrap();
    assert_eq!(ints(&ab), vec![1, 2, 3]);

    let aa = a.repeat(2).unwrap();
    assert_eq!(ints(&aa), vec![1, 2, 1, 2]);

    let keys = [
        a.handle().key(),
        b.handle().key(),
        ab.handle().key(),
        aa.handle().key(),
    ];
    for (i, k) in keys.iter().enumerate() {
        for other in &keys[i + 1..] {
            assert_ne!(k, other, "every result gets its own remote key");
        }
    }
}
