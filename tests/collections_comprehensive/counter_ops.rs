//! SortedCounter integration tests

use crate::common::*;
use tetherdb::{CounterSource, Value};

fn m(name: &str) -> Value {
    Value::from(name)
}

// ============================================================================
// Scores and ranks
// ============================================================================

#[test]
fn score_lifecycle() {
    let db = test_db();
    let z = db.sorted_counter().unwrap();
    z.set_score(&m("a"), 1.0).unwrap();
    assert!(z.contains(&m("a")).unwrap());
    assert_eq!(z.increment_score(&m("a"), 0.5).unwrap(), 1.5);
    z.discard_member(&m("a")).unwrap();
    assert!(!z.contains(&m("a")).unwrap());
}

#[test]
fn rank_queries_with_reverse() {
    let db = test_db();
    let z = db.sorted_counter().unwrap();
    z.set_score(&m("low"), 1.0).unwrap();
    z.set_score(&m("mid"), 5.0).unwrap();
    z.set_score(&m("high"), 9.0).unwrap();

    assert_eq!(z.get_rank(&m("low"), false).unwrap(), Some(0));
    assert_eq!(z.get_rank(&m("high"), false).unwrap(), Some(2));
    assert_eq!(z.get_rank(&m("high"), true).unwrap(), Some(0));
    assert_eq!(z.get_rank(&m("ghost"), false).unwrap(), None);
}

// ============================================================================
// Ranges
// ============================================================================

#[test]
fn rank_and_score_ranges() {
    let db = test_db();
    let z = db.sorted_counter().unwrap();
    for (name, score) in [("a", 1.0), ("b", 2.0), ("c", 3.0), ("d", 4.0)] {
        z.set_score(&m(name), score).unwrap();
    }

    assert_eq!(
        z.range_by_rank(0, 1, false).unwrap(),
        vec![(m("a"), 1.0), (m("b"), 2.0)]
    );
    assert_eq!(
        z.range_by_rank(0, 0, true).unwrap(),
        vec![(m("d"), 4.0)]
    );
    assert_eq!(
        z.range_by_score(2.0, 3.0).unwrap(),
        vec![(m("b"), 2.0), (m("c"), 3.0)]
    );
    // rank bound keeps a..c, score bound then drops a
    assert_eq!(
        z.range_by_rank_and_score(0, 2, 1.5, 10.0, false).unwrap(),
        vec![(m("b"), 2.0), (m("c"), 3.0)]
    );
}

// ============================================================================
// get_or_set_score
// ============================================================================

#[test]
fn get_or_set_score_is_read_if_present() {
    let db = test_db();
    let z = db.sorted_counter().unwrap();
    assert_eq!(z.get_or_set_score(&m("k"), 2.5).unwrap(), 2.5);
    assert_eq!(z.get_or_set_score(&m("k"), 100.0).unwrap(), 2.5);
    assert_eq!(z.len().unwrap(), 1);
}

// ============================================================================
// Bulk update
// ============================================================================

#[test]
fn update_from_pairs_and_counter() {
    let db = test_db();
    let z = db.sorted_counter().unwrap();
    let pairs = vec![(m("a"), Value::Int(1)), (m("b"), Value::Float(2.5))];
    z.update(CounterSource::Pairs(&pairs)).unwrap();

    let other = db.sorted_counter().unwrap();
    other.set_score(&m("c"), 9.0).unwrap();
    z.update(CounterSource::Remote(&other)).unwrap();

    assert_eq!(
        z.items().unwrap(),
        vec![(m("a"), 1.0), (m("b"), 2.5), (m("c"), 9.0)]
    );
}

#[test]
fn update_type_error_precedes_any_write() {
    let db = test_db();
    let z = db.sorted_counter().unwrap();
    let pairs = vec![(m("a"), Value::Int(1)), (m("b"), Value::Bool(true))];
    assert!(z.update(CounterSource::Pairs(&pairs)).is_err());
    assert!(z.is_empty().unwrap());
}

// ============================================================================
// Trims
// ============================================================================

#[test]
fn trims_report_removed_counts() {
    let db = test_db();
    let z = db.sorted_counter().unwrap();
    for (name, score) in [("a", 1.0), ("b", 2.0), ("c", 3.0)] {
        z.set_score(&m(name), score).unwrap();
    }
    assert_eq!(z.trim_by_score(0.0, 1.5).unwrap(), 1);
    assert_eq!(z.trim_by_rank(-1, -1).unwrap(), 1); // drops the highest
    assert_eq!(z.items().unwrap(), vec![(m("b"), 2.0)]);
}
