use super::*;
use tempfile::TempDir;

#[test]
fn test_entry_then_exit_completes_cycle() {
    let now = Utc::now();
    let counters = CycleCounters::default().with_entry(now);
    assert_eq!(counters.total_entries, 1);
    assert_eq!(counters.total_cycles, 0);
    assert_eq!(counters.last_entry_at, Some(now));

    let counters = counters.with_exit(now);
    assert_eq!(counters.total_exits, 1);
    assert_eq!(counters.total_cycles, 1);
    assert_eq!(counters.last_exit_at, Some(now));
}

#[test]
fn test_exit_without_entry_does_not_count_cycle() {
    let counters = CycleCounters::default().with_exit(Utc::now());
    assert_eq!(counters.total_exits, 1);
    assert_eq!(counters.total_cycles, 0);
}

#[test]
fn test_cycles_track_exits() {
    let now = Utc::now();
    let mut counters = CycleCounters::default();
    for _ in 0..5 {
        counters = counters.with_entry(now).with_exit(now);
    }
    assert_eq!(counters.total_cycles, counters.total_exits);
    assert_eq!(counters.total_cycles, 5);
    assert!(counters.total_exits <= counters.total_entries);
}

#[test]
fn test_incapacitation() {
    let counters = CycleCounters::default().with_incapacitation().with_incapacitation();
    assert_eq!(counters.incapacitation_count, 2);
    assert_eq!(counters.total_entries, 0);
}

#[test]
fn test_partial_document_defaults() {
    let counters: CycleCounters = serde_json::from_str(r#"{"total_entries": 4}"#).unwrap();
    assert_eq!(counters.total_entries, 4);
    assert_eq!(counters.total_cycles, 0);
    assert!(counters.last_exit_at.is_none());
}

#[tokio::test]
async fn test_open_missing_file_yields_zeros() {
    let dir = TempDir::new().unwrap();
    let store = CounterStore::open(dir.path().join("counters.json")).await.unwrap();
    assert_eq!(store.snapshot(), CycleCounters::default());
}

#[tokio::test]
async fn test_open_malformed_file_yields_zeros() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("counters.json");
    std::fs::write(&path, "[1, 2").unwrap();

    let store = CounterStore::open(&path).await.unwrap();
    assert_eq!(store.snapshot(), CycleCounters::default());
}

#[tokio::test]
async fn test_commit_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("counters.json");

    let store = CounterStore::open(&path).await.unwrap();
    let next = store.snapshot().with_entry(Utc::now()).with_exit(Utc::now());
    store.commit(next.clone()).await.unwrap();
    assert_eq!(store.total_cycles(), 1);

    let reopened = CounterStore::open(&path).await.unwrap();
    assert_eq!(reopened.snapshot(), next);
}

#[tokio::test]
async fn test_failed_commit_keeps_memory() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    let store = CounterStore::open(data.join("counters.json")).await.unwrap();
    // A file where the data directory should be makes every write fail.
    std::fs::write(&data, "not a directory").unwrap();

    let result = store.commit(store.snapshot().with_entry(Utc::now())).await;

    assert!(result.is_err());
    assert_eq!(store.snapshot().total_entries, 0);
}

#[tokio::test]
async fn test_clear() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("counters.json");
    let store = CounterStore::open(&path).await.unwrap();
    store
        .commit(store.snapshot().with_entry(Utc::now()))
        .await
        .unwrap();

    store.clear().await.unwrap();
    assert_eq!(store.snapshot(), CycleCounters::default());
    let reopened = CounterStore::open(&path).await.unwrap();
    assert_eq!(reopened.snapshot(), CycleCounters::default());
}
