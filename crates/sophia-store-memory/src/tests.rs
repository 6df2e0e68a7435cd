//! Runs the shared conformance checks against `MemoryStore`.

use std::sync::Arc;

use sophia_core::{store::ArgumentStore, testing};

use crate::MemoryStore;

#[tokio::test]
async fn save_then_fetch_live_roundtrips() {
  testing::save_then_fetch_live_roundtrips(&MemoryStore::new()).await;
}

#[tokio::test]
async fn saves_assign_distinct_ids() {
  testing::saves_assign_distinct_ids(&MemoryStore::new()).await;
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
  testing::unknown_ids_are_not_found(&MemoryStore::new()).await;
}

#[tokio::test]
async fn missing_version_is_not_found() {
  testing::missing_version_is_not_found(&MemoryStore::new()).await;
}

#[tokio::test]
async fn update_appends_next_version() {
  testing::update_appends_next_version(&MemoryStore::new()).await;
}

#[tokio::test]
async fn delete_removes_every_version() {
  testing::delete_removes_every_version(&MemoryStore::new()).await;
}

#[tokio::test]
async fn ids_are_not_reused_after_delete() {
  testing::ids_are_not_reused_after_delete(&MemoryStore::new()).await;
}

#[tokio::test]
async fn fetch_all_matches_live_conclusion() {
  testing::fetch_all_matches_live_conclusion(&MemoryStore::new()).await;
}

#[tokio::test]
async fn rejected_writes_leave_store_unchanged() {
  testing::rejected_writes_leave_store_unchanged(&MemoryStore::new()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_updates_get_consecutive_versions() {
  let store = Arc::new(MemoryStore::new());
  testing::concurrent_updates_get_consecutive_versions(store, 64).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_updates_on_different_ids() {
  testing::concurrent_updates_on_different_ids(Arc::new(MemoryStore::new()))
    .await;
}

#[tokio::test]
async fn closed_store_rejects_operations() {
  testing::closed_store_rejects_operations(&MemoryStore::new()).await;
}

// ─── Backend-specific ────────────────────────────────────────────────────────

#[tokio::test]
async fn clones_share_state() {
  let store = MemoryStore::new();
  let clone = store.clone();

  let id = store.save(testing::socrates()).await.unwrap();
  assert_eq!(clone.fetch_live(id).await.unwrap(), testing::socrates());

  clone.close().await.unwrap();
  assert!(store.fetch_live(id).await.is_err());
}

#[tokio::test]
async fn rejected_save_does_not_consume_an_id() {
  let store = MemoryStore::new();
  let mut invalid = testing::socrates();
  invalid.premises.truncate(1);
  assert!(store.save(invalid).await.is_err());

  assert_eq!(store.save(testing::socrates()).await.unwrap(), 1);
}
