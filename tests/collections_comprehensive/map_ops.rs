//! RemoteMap integration tests

use crate::common::*;
use tetherdb::{Error, MapSource, Value};

// ============================================================================
// Basic CRUD
// ============================================================================

#[test]
fn get_missing_returns_none() {
    let db = test_db();
    let map = db.map().unwrap();
    assert_eq!(map.get(&Value::from("k")).unwrap(), None);
}

#[test]
fn set_then_get() {
    let db = test_db();
    let map = db.map().unwrap();
    map.set(&Value::from("k"), &Value::Int(42)).unwrap();
    assert_eq!(map.get(&Value::from("k")).unwrap(), Some(Value::Int(42)));
    assert_eq!(map.len().unwrap(), 1);
}

#[test]
fn compound_keys_and_values() {
    let db = test_db();
    let map = db.map().unwrap();
    let key = Value::Array(vec![Value::Int(1), Value::from("a")]);
    let value = Value::Array(vec![Value::Bool(true), Value::Bytes(vec![9])]);
    map.set(&key, &value).unwrap();
    assert_eq!(map.get(&key).unwrap(), Some(value));
}

#[test]
fn fetch_vs_get_on_missing() {
    let db = test_db();
    let map = db.map().unwrap();
    assert_eq!(map.get(&Value::from("k")).unwrap(), None);
    assert!(map.fetch(&Value::from("k")).unwrap_err().is_not_found());
}

#[test]
fn falsy_values_are_not_misses() {
    let db = test_db();
    let map = db.map().unwrap();
    map.set(&Value::from("k"), &Value::Int(0)).unwrap();
    assert_eq!(map.get(&Value::from("k")).unwrap(), Some(Value::Int(0)));
    map.set(&Value::from("k"), &Value::Null).unwrap();
    assert_eq!(map.get(&Value::from("k")).unwrap(), Some(Value::Null));
}

// ============================================================================
// Removal
// ============================================================================

#[test]
fn remove_raises_discard_does_not() {
    let db = test_db();
    let map = db.map().unwrap();
    map.set(&Value::from("k"), &Value::Int(1)).unwrap();

    map.remove(&Value::from("k")).unwrap();
    assert!(map.remove(&Value::from("k")).unwrap_err().is_not_found());
    map.discard(&Value::from("k")).unwrap();
    map.discard(&Value::from("k")).unwrap();
}

#[test]
fn pop_is_remove_and_return() {
    let db = test_db();
    let map = db.map().unwrap();
    map.set(&Value::from("k"), &Value::from("v")).unwrap();
    assert_eq!(map.pop(&Value::from("k")).unwrap(), Value::from("v"));
    assert!(!map.contains_key(&Value::from("k")).unwrap());
    assert_eq!(
        map.pop_or(&Value::from("k"), Value::from("fallback")).unwrap(),
        Value::from("fallback")
    );
}

#[test]
fn pop_item_on_empty_is_empty_collection() {
    let db = test_db();
    let map = db.map().unwrap();
    assert!(matches!(
        map.pop_item().unwrap_err(),
        Error::EmptyCollection("map")
    ));
}

// ============================================================================
// set_default
// ============================================================================

#[test]
fn set_default_returns_current_value() {
    let db = test_db();
    let map = db.map().unwrap();
    assert_eq!(
        map.set_default(&Value::from("a"), &Value::Int(0)).unwrap(),
        Value::Int(0)
    );
    assert_eq!(map.get(&Value::from("a")).unwrap(), Some(Value::Int(0)));
}

// ============================================================================
// Bulk update
// ============================================================================

#[test]
fn update_pairs_overwrites_existing_fields() {
    let db = test_db();
    let map = db.map().unwrap();
    map.set(&Value::from("a"), &Value::Int(1)).unwrap();
    let pairs = vec![
        (Value::from("a"), Value::Int(10)),
        (Value::from("b"), Value::Int(20)),
    ];
    map.update(MapSource::Pairs(&pairs)).unwrap();
    assert_eq!(map.get(&Value::from("a")).unwrap(), Some(Value::Int(10)));
    assert_eq!(map.get(&Value::from("b")).unwrap(), Some(Value::Int(20)));
}

#[test]
fn update_from_remote_map() {
    let db = test_db();
    let src = db.map().unwrap();
    let dst = db.map().unwrap();
    src.set(&Value::from("x"), &Value::Int(7)).unwrap();
    dst.update(MapSource::Remote(&src)).unwrap();
    assert_eq!(dst.get(&Value::from("x")).unwrap(), Some(Value::Int(7)));
    assert_eq!(src.len().unwrap(), 1, "source is read, never mutated");
}

// ============================================================================
// Views
// ============================================================================

#[test]
fn named_maps_with_same_key_share_data() {
    let db = test_db();
    let a = db.map_named("config");
    let b = db.map_named("config");
    a.set(&Value::from("k"), &Value::Int(3)).unwrap();
    assert_eq!(b.get(&Value::from("k")).unwrap(), Some(Value::Int(3)));
    b.clear().unwrap();
    assert!(a.is_empty().unwrap());
}
