//! End-to-end scenarios spanning multiple operations

use crate::common::*;
use tetherdb::Value;

#[test]
fn map_set_default_scenario() {
    let db = test_db();
    let map = db.map().unwrap();
    assert!(map.is_empty().unwrap());

    assert_eq!(
        map.set_default(&Value::from("a"), &Value::Int(0)).unwrap(),
        Value::Int(0)
    );
    assert_eq!(map.get(&Value::from("a")).unwrap(), Some(Value::Int(0)));
    assert_eq!(
        map.set_default(&Value::from("a"), &Value::Int(99)).unwrap(),
        Value::Int(0),
        "present key keeps its value"
    );
}

#[test]
fn list_insert_clamping_scenario() {
    let db = test_db();
    let list = db.list().unwrap();
    list.extend(&[Value::Int(1), Value::Int(2), Value::Int(3)])
        .unwrap();

    list.insert(10, &Value::from("x")).unwrap();
    assert_eq!(
        list.to_vec().unwrap(),
        vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::from("x")]
    );

    list.insert(-10, &Value::from("y")).unwrap();
    assert_eq!(
        list.to_vec().unwrap(),
        vec![
            Value::from("y"),
            Value::Int(1),
            Value::Int(2),
            Value::Int(3),
            Value::from("x"),
        ]
    );
}

#[test]
fn sorted_counter_rank_scenario() {
    let db = test_db();
    let z = db.sorted_counter().unwrap();
    z.set_score(&Value::from("m1"), 1.0).unwrap();
    z.set_score(&Value::from("m2"), 2.0).unwrap();
    z.set_score(&Value::from("m3"), 30.0).unwrap();

    assert_eq!(z.get_rank(&Value::from("m3"), false).unwrap(), Some(2));
    assert_eq!(z.get_rank(&Value::from("m3"), true).unwrap(), Some(0));
    assert_eq!(
        z.get_rank(&Value::from("missing"), false).unwrap(),
        None,
        "no rank is a sentinel value, not an error"
    );
}

#[test]
fn collections_compose_on_one_backend() {
    let db = test_db();

    // a job queue, its per-job metadata, and a leaderboard share the store
    let queue = db.list_named("jobs:queue");
    let meta = db.map_named("jobs:meta");
    let scores = db.sorted_counter_named("jobs:durations");

    queue.push_back(&Value::from("job-1")).unwrap();
    queue.push_back(&Value::from("job-2")).unwrap();
    meta.set(&Value::from("job-1"), &Value::from("build")).unwrap();
    meta.set(&Value::from("job-2"), &Value::from("deploy")).unwrap();

    while let Some(job) = queue.pop_front().unwrap() {
        let kind = meta.pop(&job).unwrap();
        let duration = if kind == Value::from("build") { 90.0 } else { 15.0 };
        scores.set_score(&job, duration).unwrap();
    }

    assert!(queue.is_empty().unwrap());
    assert!(meta.is_empty().unwrap());
    assert_eq!(
        z_first(&db),
        (Value::from("job-2"), 15.0),
        "fastest job ranks first"
    );
}

fn z_first(db: &tetherdb::Tether) -> (Value, f64) {
    db.sorted_counter_named("jobs:durations")
        .range_by_rank(0, 0, false)
        .unwrap()
        .into_iter()
        .next()
        .unwrap()
}
