//! Write-back cache contract

use crate::common::*;
use tetherdb::Value;

#[test]
fn reads_prefer_staged_values() {
    let db = test_db();
    let mut cached = db.cached_map_named("c");
    cached.backing().set(&Value::from("k"), &Value::Int(1)).unwrap();

    cached.set(&Value::from("k"), &Value::Int(2));
    assert_eq!(
        cached.get(&Value::from("k")).unwrap(),
        Some(Value::Int(2)),
        "staged value wins over remote"
    );

    // another view of the same key still sees the remote value
    let direct = db.map_named("c");
    assert_eq!(direct.get(&Value::from("k")).unwrap(), Some(Value::Int(1)));
}

#[test]
fn sync_flushes_everything_and_clears_staging() {
    let db = test_db();
    let mut cached = db.cached_map_named("c");
    cached.set(&Value::from("a"), &Value::Int(1));
    cached.set(&Value::from("b"), &Value::Int(2));
    assert!(cached.is_dirty());

    cached.sync().unwrap();

    assert!(!cached.is_dirty());
    let direct = db.map_named("c");
    assert_eq!(direct.get(&Value::from("a")).unwrap(), Some(Value::Int(1)));
    assert_eq!(direct.get(&Value::from("b")).unwrap(), Some(Value::Int(2)));
}

#[test]
fn local_mutation_of_retrieved_value_is_observed_before_flush() {
    let db = test_db();
    let mut cached = db.cached_map_named("c");
    cached.backing().set(&Value::from("doc"), &Value::Array(vec![])).unwrap();

    // retrieve, mutate locally, re-store into the staging tier
    let mut doc = cached.fetch(&Value::from("doc")).unwrap();
    if let Value::Array(items) = &mut doc {
        items.push(Value::Int(1));
    }
    cached.set(&Value::from("doc"), &doc);

    assert_eq!(
        cached.get(&Value::from("doc")).unwrap(),
        Some(Value::Array(vec![Value::Int(1)])),
        "mutation visible locally"
    );
    assert_eq!(
        db.map_named("c").get(&Value::from("doc")).unwrap(),
        Some(Value::Array(vec![])),
        "store unchanged until sync"
    );

    cached.sync().unwrap();
    assert_eq!(
        db.map_named("c").get(&Value::from("doc")).unwrap(),
        Some(Value::Array(vec![Value::Int(1)]))
    );
}

#[test]
fn cache_is_private_to_its_handle() {
    let db = test_db();
    let mut one = db.cached_map_named("c");
    let mut two = db.cached_map_named("c");

    one.set(&Value::from("k"), &Value::Int(1));
    assert_eq!(
        two.get(&Value::from("k")).unwrap(),
        None,
        "staging tiers are not shared between handles"
    );
    one.sync().unwrap();
    assert_eq!(two.get(&Value::from("k")).unwrap(), Some(Value::Int(1)));
}
