//! Conformance checks shared by every [`ArgumentStore`] backend.
//!
//! Each check takes a freshly opened, empty store and panics on the first
//! violation. Backend crates enable the `testing` feature as a
//! dev-dependency and call every check from their own `#[tokio::test]`s, so
//! all backends are held to the same contract.

use std::sync::Arc;

use tokio::task::JoinSet;

use crate::{
  Argument, ArgumentId, ErrorKind, VersionNumber,
  store::{ArgumentStore, StoreError},
};

/// The argument used throughout the checks.
pub fn socrates() -> Argument {
  Argument::new("Socrates is mortal", [
    "Socrates is a man",
    "All men are mortal",
  ])
}

fn premises(list: &[&str]) -> Vec<String> {
  list.iter().map(|p| p.to_string()).collect()
}

#[track_caller]
fn assert_kind<T: std::fmt::Debug, E: StoreError>(
  result: Result<T, E>,
  expected: ErrorKind,
) {
  match result {
    Ok(value) => panic!("expected a {expected:?} error, got Ok({value:?})"),
    Err(e) => assert_eq!(e.kind(), expected, "unexpected error: {e}"),
  }
}

pub async fn save_then_fetch_live_roundtrips<S: ArgumentStore>(store: &S) {
  let id = store.save(socrates()).await.unwrap();
  assert!(id > 0, "ids must be positive, got {id}");

  assert_eq!(store.fetch_live(id).await.unwrap(), socrates());
  assert_eq!(store.fetch_version(id, 1).await.unwrap(), socrates());
}

pub async fn saves_assign_distinct_ids<S: ArgumentStore>(store: &S) {
  let first = store.save(socrates()).await.unwrap();
  let second = store.save(socrates()).await.unwrap();
  assert_ne!(first, second);
}

pub async fn unknown_ids_are_not_found<S: ArgumentStore>(store: &S) {
  let id: ArgumentId = 1;
  assert_kind(store.fetch_live(id).await, ErrorKind::NotFound);
  assert_kind(store.fetch_version(id, 1).await, ErrorKind::NotFound);
  assert_kind(
    store.update_premises(id, premises(&["p1", "p2"])).await,
    ErrorKind::NotFound,
  );
  assert_kind(store.delete(id).await, ErrorKind::NotFound);
}

pub async fn missing_version_is_not_found<S: ArgumentStore>(store: &S) {
  let id = store.save(socrates()).await.unwrap();
  assert_kind(store.fetch_version(id, 0).await, ErrorKind::NotFound);
  assert_kind(store.fetch_version(id, 2).await, ErrorKind::NotFound);
}

pub async fn update_appends_next_version<S: ArgumentStore>(store: &S) {
  let id = store.save(socrates()).await.unwrap();

  let v2 = store
    .update_premises(id, premises(&["p1", "p2"]))
    .await
    .unwrap();
  assert_eq!(v2, 2);

  let v3 = store
    .update_premises(id, premises(&["q1", "q2", "q3"]))
    .await
    .unwrap();
  assert_eq!(v3, 3);

  let at_v2 = store.fetch_version(id, v2).await.unwrap();
  assert_eq!(at_v2.premises, ["p1", "p2"]);
  assert_eq!(at_v2.conclusion, socrates().conclusion);

  assert_eq!(store.fetch_version(id, 1).await.unwrap(), socrates());

  let live = store.fetch_live(id).await.unwrap();
  assert_eq!(live.premises, ["q1", "q2", "q3"]);
  assert_eq!(live.conclusion, socrates().conclusion);
}

pub async fn delete_removes_every_version<S: ArgumentStore>(store: &S) {
  let id = store.save(socrates()).await.unwrap();
  store
    .update_premises(id, premises(&["p1", "p2"]))
    .await
    .unwrap();

  store.delete(id).await.unwrap();

  assert_kind(store.fetch_live(id).await, ErrorKind::NotFound);
  assert_kind(store.fetch_version(id, 1).await, ErrorKind::NotFound);
  assert_kind(store.fetch_version(id, 2).await, ErrorKind::NotFound);
  assert_kind(
    store.update_premises(id, premises(&["p1", "p2"])).await,
    ErrorKind::NotFound,
  );
  assert_kind(store.delete(id).await, ErrorKind::NotFound);
}

pub async fn ids_are_not_reused_after_delete<S: ArgumentStore>(store: &S) {
  let first = store.save(socrates()).await.unwrap();
  store.delete(first).await.unwrap();
  let second = store.save(socrates()).await.unwrap();
  assert_ne!(first, second);
  assert_kind(store.fetch_live(first).await, ErrorKind::NotFound);
}

pub async fn fetch_all_matches_live_conclusion<S: ArgumentStore>(store: &S) {
  assert!(store.fetch_all("Socrates is mortal").await.unwrap().is_empty());

  let first = store.save(socrates()).await.unwrap();
  let other = store
    .save(Argument::new("Plato is mortal", ["Plato is a man", "All men are mortal"]))
    .await
    .unwrap();
  let second = store.save(socrates()).await.unwrap();
  store
    .update_premises(second, premises(&["p1", "p2"]))
    .await
    .unwrap();

  let found = store.fetch_all("Socrates is mortal").await.unwrap();
  let ids: Vec<ArgumentId> = found.iter().map(|a| a.id).collect();
  assert_eq!(ids, [first, second]);
  assert_eq!(found[0].argument, socrates());
  assert_eq!(found[1].argument.premises, ["p1", "p2"]);
  assert!(found.iter().all(|a| a.id != other));

  store.delete(first).await.unwrap();
  let ids: Vec<ArgumentId> = store
    .fetch_all("Socrates is mortal")
    .await
    .unwrap()
    .into_iter()
    .map(|a| a.id)
    .collect();
  assert_eq!(ids, [second]);

  // Matching is exact.
  assert!(store.fetch_all("socrates is mortal").await.unwrap().is_empty());
  assert!(store.fetch_all("Socrates").await.unwrap().is_empty());
}

pub async fn rejected_writes_leave_store_unchanged<S: ArgumentStore>(
  store: &S,
) {
  assert_kind(
    store.save(Argument::new("", ["a", "b"])).await,
    ErrorKind::Invalid,
  );
  assert_kind(
    store.save(Argument::new("c", ["only one"])).await,
    ErrorKind::Invalid,
  );
  assert_kind(
    store.save(Argument::new("c", ["a", ""])).await,
    ErrorKind::Invalid,
  );
  assert!(store.fetch_all("c").await.unwrap().is_empty());

  let id = store.save(socrates()).await.unwrap();
  assert_kind(
    store.update_premises(id, premises(&["lonely"])).await,
    ErrorKind::Invalid,
  );
  assert_kind(
    store.update_premises(id, premises(&["", "p2"])).await,
    ErrorKind::Invalid,
  );
  assert_kind(store.fetch_version(id, 2).await, ErrorKind::NotFound);
  assert_eq!(store.fetch_live(id).await.unwrap(), socrates());

  // The next successful update still gets version 2.
  let v = store
    .update_premises(id, premises(&["p1", "p2"]))
    .await
    .unwrap();
  assert_eq!(v, 2);
}

/// Fire `n` updates at one id at once; every one must succeed with a distinct
/// version, and together they must fill `2..=n + 1` with no gaps.
pub async fn concurrent_updates_get_consecutive_versions<S>(
  store: Arc<S>,
  n: usize,
) where
  S: ArgumentStore + 'static,
{
  let id = store.save(socrates()).await.unwrap();

  let mut tasks = JoinSet::new();
  for i in 0..n {
    let store = Arc::clone(&store);
    tasks.spawn(async move {
      let update = vec![format!("premise {i}a"), format!("premise {i}b")];
      let version = store.update_premises(id, update.clone()).await.unwrap();
      (version, update)
    });
  }

  let mut seen = Vec::with_capacity(n);
  while let Some(joined) = tasks.join_next().await {
    let (version, update) = joined.unwrap();
    // Whatever version an update got must hold exactly its premises.
    assert_eq!(store.fetch_version(id, version).await.unwrap().premises, update);
    seen.push(version);
  }

  seen.sort_unstable();
  let expected: Vec<VersionNumber> = (2..=n as VersionNumber + 1).collect();
  assert_eq!(seen, expected);
}

/// Updates to different ids proceed independently and each id keeps its own
/// numbering.
pub async fn concurrent_updates_on_different_ids<S>(store: Arc<S>)
where
  S: ArgumentStore + 'static,
{
  let a = store.save(socrates()).await.unwrap();
  let b = store.save(socrates()).await.unwrap();

  let mut tasks = JoinSet::new();
  for id in [a, b, a, b] {
    let store = Arc::clone(&store);
    tasks.spawn(async move {
      store
        .update_premises(id, premises(&["p1", "p2"]))
        .await
        .unwrap()
    });
  }
  while let Some(joined) = tasks.join_next().await {
    joined.unwrap();
  }

  for id in [a, b] {
    store.fetch_version(id, 3).await.unwrap();
    assert_kind(store.fetch_version(id, 4).await, ErrorKind::NotFound);
  }
}

pub async fn closed_store_rejects_operations<S: ArgumentStore>(store: &S) {
  let id = store.save(socrates()).await.unwrap();

  store.close().await.unwrap();
  // Closing twice is harmless.
  store.close().await.unwrap();

  assert_kind(store.save(socrates()).await, ErrorKind::Closed);
  assert_kind(store.fetch_live(id).await, ErrorKind::Closed);
  assert_kind(store.fetch_version(id, 1).await, ErrorKind::Closed);
  assert_kind(store.fetch_all("Socrates is mortal").await, ErrorKind::Closed);
  assert_kind(
    store.update_premises(id, premises(&["p1", "p2"])).await,
    ErrorKind::Closed,
  );
  assert_kind(store.delete(id).await, ErrorKind::Closed);
}
