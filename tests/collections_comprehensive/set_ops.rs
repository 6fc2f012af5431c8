//! RemoteSet integration tests

use crate::common::*;
use std::collections::HashSet;
use tetherdb::{RemoteSet, SetSource, Value};

fn seeded(db: &tetherdb::Tether, values: &[i64]) -> RemoteSet {
    let set = db.set().unwrap();
    let values: Vec<Value> = values.iter().map(|i| Value::Int(*i)).collect();
    set.extend(&values).unwrap();
    set
}

fn local(values: &[i64]) -> HashSet<Value> {
    values.iter().map(|i| Value::Int(*i)).collect()
}

// ============================================================================
// Membership
// ============================================================================

#[test]
fn insert_is_idempotent_on_membership() {
    let db = test_db();
    let set = db.set().unwrap();
    assert!(set.insert(&Value::from("x")).unwrap());
    assert!(!set.insert(&Value::from("x")).unwrap());
    assert_eq!(set.len().unwrap(), 1);
}

#[test]
fn discard_twice_state_is_stable() {
    let db = test_db();
    let set = seeded(&db, &[1, 2, 3]);
    set.discard(&Value::Int(2)).unwrap();
    let after_first = set.members().unwrap();
    set.discard(&Value::Int(2)).unwrap();
    assert_eq!(set.members().unwrap(), after_first);
    assert_eq!(after_first, local(&[1, 3]));
}

// ============================================================================
// Algebra correctness across both paths
// ============================================================================

#[test]
fn union_fast_and_fallback_agree() {
    let db = test_db();
    let a = seeded(&db, &[1, 2]);
    let b = seeded(&db, &[2, 3]);

    let fast = a.union(SetSource::Remote(&b)).unwrap();
    let plain = local(&[2, 3]);
    let fallback = a.union(SetSource::Local(&plain)).unwrap();

    assert_eq!(fast.members().unwrap(), local(&[1, 2, 3]));
    assert_eq!(fallback.members().unwrap(), local(&[1, 2, 3]));
}

#[test]
fn symmetric_difference_both_paths() {
    let db = test_db();
    let a = seeded(&db, &[1, 2, 3]);
    let b = seeded(&db, &[3, 4]);

    let remote = a.symmetric_difference(SetSource::Remote(&b)).unwrap();
    assert_eq!(remote.members().unwrap(), local(&[1, 2, 4]));

    let plain = local(&[3, 4]);
    let mixed = a.symmetric_difference(SetSource::Local(&plain)).unwrap();
    assert_eq!(mixed.members().unwrap(), local(&[1, 2, 4]));
}

#[test]
fn intersection_with_empty_operand_is_empty() {
    let db = test_db();
    let a = seeded(&db, &[1, 2]);
    let empty = db.set().unwrap();
    let result = a.intersection(SetSource::Remote(&empty)).unwrap();
    assert!(result.is_empty().unwrap());
}

// ============================================================================
// Comparisons
// ============================================================================

#[test]
fn comparisons_match_local_set_semantics() {
    let db = test_db();
    let a = seeded(&db, &[1, 2]);
    let b = seeded(&db, &[1, 2, 3]);
    let c = seeded(&db, &[4]);

    assert!(a.is_subset(SetSource::Remote(&b)).unwrap());
    assert!(!b.is_subset(SetSource::Remote(&a)).unwrap());
    assert!(b.is_superset(SetSource::Remote(&a)).unwrap());
    assert!(a.is_disjoint(SetSource::Remote(&c)).unwrap());
    assert!(!a.set_eq(SetSource::Remote(&b)).unwrap());

    assert!(a.set_eq(SetSource::Local(&local(&[1, 2]))).unwrap());
    assert!(a.is_subset(SetSource::Local(&local(&[0, 1, 2]))).unwrap());
}

// ============================================================================
// Sampling
// ============================================================================

#[test]
fn take_drains_and_then_raises() {
    let db = test_db();
    let set = seeded(&db, &[1, 2, 3]);
    let mut drained = HashSet::new();
    for _ in 0..3 {
        drained.insert(set.take().unwrap());
    }
    assert_eq!(drained, local(&[1, 2, 3]));
    assert!(set.take().is_err());
}

#[test]
fn random_sampling_is_nondestructive() {
    let db = test_db();
    let set = seeded(&db, &[1, 2, 3, 4]);
    for _ in 0..10 {
        let member = set.random_member().unwrap().unwrap();
        assert!(set.contains(&member).unwrap());
    }
    assert_eq!(set.len().unwrap(), 4);
}
