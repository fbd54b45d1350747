//! Bridge behaviour against a live store.

use memstash_core::{Config, Document, Store, Value, SYNC_FIELD};
use memstash_sync::{MemorySink, RowSink, SyncBridge, SyncConfig};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

fn store_with_users() -> Store {
    let store = Store::open(Config::default()).unwrap();
    let users = store.data_store().namespace("user", None).unwrap();
    users
        .create(Document::from([("Name", Value::from("Jane")), ("Age", Value::from(30))]))
        .unwrap();
    users
        .create(Document::from([("Name", Value::from("John")), ("Age", Value::from(35))]))
        .unwrap();
    store
}

#[test]
fn background_bridge_mirrors_documents() {
    let store = store_with_users();
    let sink = Arc::new(MemorySink::new());
    let shared: Arc<dyn RowSink> = sink.clone();

    let mut bridge = SyncBridge::start(
        store.data_store(),
        shared,
        SyncConfig::new().with_interval(Duration::from_millis(20)),
    )
    .unwrap();

    assert!(wait_until(Duration::from_secs(5), || sink.total_rows() == 2));
    bridge.stop();

    let rows = sink.rows("users");
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| !r.contains_key(SYNC_FIELD)));
    assert_eq!(rows[0].get("name"), Some(&Value::from("Jane")));

    let data = store.data_store();
    assert_eq!(data.unsynced_count(), 0);
    let users = data.namespace("user", None).unwrap();
    assert_eq!(users.query(&Document::from([(SYNC_FIELD, true)])).len(), 2);
    assert!(bridge.stats().synced >= 2);
}

#[test]
fn failed_rows_are_retried() {
    let store = store_with_users();
    let sink = MemorySink::new();
    sink.fail_next(1);

    let first = SyncBridge::run_once(&store.data_store(), &sink);
    assert_eq!(first.synced, 1);
    assert_eq!(first.failed, 1);
    assert_eq!(store.data_store().unsynced_count(), 1);

    let second = SyncBridge::run_once(&store.data_store(), &sink);
    assert_eq!(second.synced, 1);
    assert_eq!(second.failed, 0);
    assert_eq!(sink.total_rows(), 2);
    assert_eq!(sink.attempts(), 3);
    assert_eq!(store.stats().sync_failures, 1);
}

#[test]
fn failing_table_does_not_block_others() {
    let store = store_with_users();
    store
        .data_store()
        .namespace("order", None)
        .unwrap()
        .create(Document::from([("total", 12)]))
        .unwrap();

    let sink = MemorySink::new();
    sink.fail_table("orders");
    for _ in 0..3 {
        SyncBridge::run_once(&store.data_store(), &sink);
    }
    assert_eq!(sink.rows("users").len(), 2);
    assert!(sink.rows("orders").is_empty());
    assert_eq!(store.data_store().unsynced_count(), 1);

    sink.clear_failures();
    SyncBridge::run_once(&store.data_store(), &sink);
    assert_eq!(sink.rows("orders").len(), 1);
    assert_eq!(store.data_store().unsynced_count(), 0);
}

#[test]
fn updated_documents_keep_sync_flag() {
    let store = store_with_users();
    let sink = MemorySink::new();
    SyncBridge::run_once(&store.data_store(), &sink);

    let users = store.data_store().namespace("user", None).unwrap();
    users
        .update(&Document::from([("name", "Jane")]), Document::from([("age", 31)]))
        .unwrap();
    let jane = users.query(&Document::from([("name", "Jane")])).remove(0);
    assert!(jane.is_synced());

    users
        .update(
            &Document::from([("name", "Jane")]),
            Document::from([(SYNC_FIELD, false)]),
        )
        .unwrap();
    assert_eq!(SyncBridge::run_once(&store.data_store(), &sink).synced, 1);
    assert_eq!(sink.rows("users").len(), 3);
}

#[test]
fn run_immediately_syncs_without_waiting() {
    let store = store_with_users();
    let sink = Arc::new(MemorySink::new());
    let shared: Arc<dyn RowSink> = sink.clone();
    let _bridge = SyncBridge::start(
        store.data_store(),
        shared,
        SyncConfig::new()
            .with_interval(Duration::from_secs(3600))
            .with_run_immediately(true),
    )
    .unwrap();

    assert!(wait_until(Duration::from_secs(5), || sink.total_rows() == 2));
}
