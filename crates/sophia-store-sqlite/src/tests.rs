//! Integration tests for `SqliteStore` against an in-memory database.

use std::{path::PathBuf, sync::Arc};

use sophia_core::{ErrorKind, store::{ArgumentStore, StoreError}, testing};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

// ─── Shared contract ─────────────────────────────────────────────────────────

#[tokio::test]
async fn save_then_fetch_live_roundtrips() {
  testing::save_then_fetch_live_roundtrips(&store().await).await;
}

#[tokio::test]
async fn saves_assign_distinct_ids() {
  testing::saves_assign_distinct_ids(&store().await).await;
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
  testing::unknown_ids_are_not_found(&store().await).await;
}

#[tokio::test]
async fn missing_version_is_not_found() {
  testing::missing_version_is_not_found(&store().await).await;
}

#[tokio::test]
async fn update_appends_next_version() {
  testing::update_appends_next_version(&store().await).await;
}

#[tokio::test]
async fn delete_removes_every_version() {
  testing::delete_removes_every_version(&store().await).await;
}

#[tokio::test]
async fn ids_are_not_reused_after_delete() {
  testing::ids_are_not_reused_after_delete(&store().await).await;
}

#[tokio::test]
async fn fetch_all_matches_live_conclusion() {
  testing::fetch_all_matches_live_conclusion(&store().await).await;
}

#[tokio::test]
async fn rejected_writes_leave_store_unchanged() {
  testing::rejected_writes_leave_store_unchanged(&store().await).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_updates_get_consecutive_versions() {
  testing::concurrent_updates_get_consecutive_versions(Arc::new(store().await), 64)
    .await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_updates_on_different_ids() {
  testing::concurrent_updates_on_different_ids(Arc::new(store().await)).await;
}

#[tokio::test]
async fn closed_store_rejects_operations() {
  testing::closed_store_rejects_operations(&store().await).await;
}

// ─── File-backed ─────────────────────────────────────────────────────────────

/// A fresh database path under the system temp dir, removed on drop.
struct TempDb(PathBuf);

impl TempDb {
  fn new(name: &str) -> Self {
    let nanos = std::time::SystemTime::now()
      .duration_since(std::time::UNIX_EPOCH)
      .unwrap()
      .as_nanos();
    let file = format!("sophia-{name}-{}-{nanos}.db", std::process::id());
    Self(std::env::temp_dir().join(file))
  }
}

impl Drop for TempDb {
  fn drop(&mut self) {
    for suffix in ["", "-wal", "-shm"] {
      let mut path = self.0.clone().into_os_string();
      path.push(suffix);
      let _ = std::fs::remove_file(path);
    }
  }
}

#[tokio::test]
async fn history_survives_reopen() {
  let db = TempDb::new("reopen");

  let id = {
    let s = SqliteStore::open(&db.0).await.unwrap();
    let id = s.save(testing::socrates()).await.unwrap();
    s.update_premises(id, vec!["p1".into(), "p2".into()])
      .await
      .unwrap();
    s.close().await.unwrap();
    id
  };

  let s = SqliteStore::open(&db.0).await.unwrap();
  assert_eq!(s.fetch_version(id, 1).await.unwrap(), testing::socrates());
  assert_eq!(s.fetch_live(id).await.unwrap().premises, ["p1", "p2"]);
  assert_eq!(
    s.update_premises(id, vec!["q1".into(), "q2".into()])
      .await
      .unwrap(),
    3
  );
  s.close().await.unwrap();
}

#[tokio::test]
async fn deleted_ids_stay_retired_across_reopen() {
  let db = TempDb::new("retired");

  let first = {
    let s = SqliteStore::open(&db.0).await.unwrap();
    let first = s.save(testing::socrates()).await.unwrap();
    s.delete(first).await.unwrap();
    s.close().await.unwrap();
    first
  };

  let s = SqliteStore::open(&db.0).await.unwrap();
  let second = s.save(testing::socrates()).await.unwrap();
  assert!(second > first);
  s.close().await.unwrap();
}

#[tokio::test]
async fn clones_observe_close() {
  let s = store().await;
  let clone = s.clone();
  let id = s.save(testing::socrates()).await.unwrap();

  clone.close().await.unwrap();
  let err = s.fetch_live(id).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Closed);
}
