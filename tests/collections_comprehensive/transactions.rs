//! Transactional behavior under contention

use crate::common::*;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tetherdb::{Command, Error, RetryPolicy, Value};

// ============================================================================
// Concurrent pop_item distinctness
// ============================================================================

/// N clients racing pop_item against a hash with exactly N fields: each
/// must take a distinct field and the hash must end empty.
#[test]
fn concurrent_pop_item_takes_distinct_entries() {
    const CLIENTS: i64 = 8;

    let db = test_db();
    let seed = db.map_named("contended");
    for i in 0..CLIENTS {
        seed.set(&Value::Int(i), &Value::Int(i * 100)).unwrap();
    }

    let taken: Mutex<Vec<i64>> = Mutex::new(Vec::new());
    std::thread::scope(|scope| {
        for _ in 0..CLIENTS {
            let map = db.map_named("contended");
            let taken = &taken;
            scope.spawn(move || {
                let (key, value) = map.pop_item().unwrap();
                assert_eq!(value.as_int().unwrap(), key.as_int().unwrap() * 100);
                taken.lock().push(key.as_int().unwrap());
            });
        }
    });

    let mut taken = taken.into_inner();
    taken.sort();
    assert_eq!(taken, (0..CLIENTS).collect::<Vec<_>>(), "no field twice, none skipped");
    assert!(seed.is_empty().unwrap(), "hash must end empty");
}

// ============================================================================
// Conflict retry through the public engine
// ============================================================================

#[test]
fn injected_write_between_read_and_commit_forces_retry() {
    let db = test_db();
    let conn = db.connection();
    conn.hset("acct", b"balance".to_vec(), b"10".to_vec()).unwrap();

    let intruder = conn.clone();
    let passes = AtomicU64::new(0);

    let observed = tether_txn::run(
        conn,
        &["acct".to_string()],
        &RetryPolicy::default(),
        |t| {
            let pass = passes.fetch_add(1, Ordering::SeqCst);
            let balance = t.hget("acct", b"balance")?.expect("seeded");
            if pass == 0 {
                intruder
                    .hset("acct", b"balance".to_vec(), b"20".to_vec())
                    .unwrap();
            }
            t.stage(Command::HSet {
                key: "acct".into(),
                field: b"audited".to_vec(),
                value: balance.clone(),
            });
            Ok(balance)
        },
    )
    .unwrap();

    assert_eq!(passes.load(Ordering::SeqCst), 2, "stale pass must not commit");
    assert_eq!(observed, b"20".to_vec(), "commit must be based on fresh state");
    assert_eq!(
        db.connection().hget("acct", b"audited").unwrap(),
        Some(b"20".to_vec())
    );
}

#[test]
fn capped_retries_surface_conflict_error() {
    let backend = Arc::new(tetherdb::MemoryStore::new());
    let db = tetherdb::Tether::builder()
        .backend(backend)
        .retry(RetryPolicy::with_max_attempts(2))
        .build();

    let conn = db.connection().clone();
    conn.hset("hot", b"f".to_vec(), b"0".to_vec()).unwrap();
    let intruder = conn.clone();
    let mut tick: u8 = 0;

    let result: tetherdb::Result<()> = tether_txn::run(
        &conn,
        &["hot".to_string()],
        &RetryPolicy::with_max_attempts(2),
        |t| {
            let _ = t.hget("hot", b"f")?;
            tick = tick.wrapping_add(1);
            intruder.hset("hot", b"f".to_vec(), vec![tick]).unwrap();
            t.stage(Command::Del("hot".into()));
            Ok(())
        },
    );
    assert!(matches!(result.unwrap_err(), Error::Conflict { attempts: 2 }));
    assert!(conn.exists("hot").unwrap(), "no partial commit under permanent contention");
}

// ============================================================================
// Atomicity of adapter compound operations
// ============================================================================

#[test]
fn pop_item_never_leaves_partial_state() {
    let db = test_db();
    let map = db.map_named("m");
    map.set(&Value::from("only"), &Value::Int(1)).unwrap();

    let (k, v) = map.pop_item().unwrap();
    assert_eq!(k, Value::from("only"));
    assert_eq!(v, Value::Int(1));
    // the field is gone and nothing else was touched
    assert!(!db.connection().exists("m").unwrap());
}
