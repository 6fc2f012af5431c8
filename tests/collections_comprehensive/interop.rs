//! Cross-collection dispatch: fast path vs fallback, verified by
//! call-count instrumentation on the backend

use crate::common::*;
use std::collections::HashSet;
use tetherdb::{SetSource, Value};

fn local(values: &[i64]) -> HashSet<Value> {
    values.iter().map(|i| Value::Int(*i)).collect()
}

#[test]
fn same_backend_union_never_materializes_members() {
    let (db, backend) = counted_db();
    let a = db.set().unwrap();
    let b = db.set().unwrap();
    a.extend(&[Value::Int(1), Value::Int(2)]).unwrap();
    b.extend(&[Value::Int(2), Value::Int(3)]).unwrap();
    backend.reset();

    let u = a.union(SetSource::Remote(&b)).unwrap();

    assert_eq!(backend.count("SUNIONSTORE"), 1, "one native multi-key command");
    assert_eq!(backend.count("SMEMBERS"), 0, "no member enumeration");
    assert_eq!(backend.count("SADD"), 0, "no local write-back");
    assert_eq!(u.members().unwrap(), local(&[1, 2, 3]));
}

#[test]
fn local_operand_forces_the_fallback_path() {
    let (db, backend) = counted_db();
    let a = db.set().unwrap();
    a.extend(&[Value::Int(1), Value::Int(2)]).unwrap();
    let plain = local(&[2, 3]);
    backend.reset();

    let u = a.union(SetSource::Local(&plain)).unwrap();

    assert_eq!(backend.count("SUNIONSTORE"), 0);
    assert_eq!(backend.count("SMEMBERS"), 1, "remote operand fetched once");
    assert_eq!(backend.count("SADD"), 1, "result written back in one batch");
    assert_eq!(u.members().unwrap(), local(&[1, 2, 3]));
}

#[test]
fn different_backends_are_combined_locally() {
    let (db_a, backend_a) = counted_db();
    let db_b = test_db();

    let a = db_a.set().unwrap();
    let b = db_b.set().unwrap();
    a.extend(&[Value::Int(1)]).unwrap();
    b.extend(&[Value::Int(2)]).unwrap();
    backend_a.reset();

    let u = a.union(SetSource::Remote(&b)).unwrap();

    assert_eq!(
        backend_a.count("SUNIONSTORE"),
        0,
        "no native multi-key command across backends"
    );
    assert_eq!(u.members().unwrap(), local(&[1, 2]));
    assert!(
        u.handle().connection().same_backend(a.handle().connection()),
        "result is stored on the left operand's backend"
    );
}

#[test]
fn same_backend_comparison_reads_only() {
    let (db, backend) = counted_db();
    let a = db.set().unwrap();
    let b = db.set().unwrap();
    a.extend(&[Value::Int(1)]).unwrap();
    b.extend(&[Value::Int(1), Value::Int(2)]).unwrap();
    backend.reset();

    assert!(a.is_subset(SetSource::Remote(&b)).unwrap());
    assert_eq!(backend.count("SDIFF"), 1, "one consistent difference read");
    assert_eq!(backend.count("SADD"), 0, "comparisons never write");
    assert_eq!(backend.count("SMEMBERS"), 0);
}
