//! [`MemoryStore`] is the in-process implementation of [`ArgumentStore`].

use std::{
  collections::BTreeMap,
  sync::{
    Arc, Mutex, RwLock,
    atomic::{AtomicBool, AtomicI64, Ordering},
  },
};

use sophia_core::{
  Argument, ArgumentId, ArgumentWithId, Error, Result, VersionNumber,
  history::History, store::ArgumentStore, validate_argument,
};

/// One id's history. `None` once the id has been deleted, so a writer that
/// looked the slot up just before the delete cannot resurrect it.
type Slot = Arc<Mutex<Option<History>>>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// An argument store that keeps every history in memory.
///
/// The id map sits behind a read-write lock that is only held long enough to
/// find or insert a slot; each history has its own mutex, so updates to one id
/// are serialised without blocking work on other ids.
///
/// Cloning is cheap; clones share the same underlying maps.
#[derive(Clone, Default)]
pub struct MemoryStore {
  inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
  histories: RwLock<BTreeMap<ArgumentId, Slot>>,
  last_id:   AtomicI64,
  closed:    AtomicBool,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }
}

impl Inner {
  fn ensure_open(&self) -> Result<()> {
    if self.closed.load(Ordering::Acquire) {
      return Err(Error::Closed);
    }
    Ok(())
  }

  fn slot(&self, id: ArgumentId) -> Result<Slot> {
    self.ensure_open()?;
    let histories = self.histories.read().map_err(|_| Error::Poisoned)?;
    histories.get(&id).cloned().ok_or(Error::ArgumentNotFound(id))
  }

  /// Run `f` against the live history of `id` while holding its lock.
  fn with_history<T>(
    &self,
    id: ArgumentId,
    f: impl FnOnce(&mut History) -> Result<T>,
  ) -> Result<T> {
    let slot = self.slot(id)?;
    let mut guard = slot.lock().map_err(|_| Error::Poisoned)?;
    match guard.as_mut() {
      Some(history) => f(history),
      None => Err(Error::ArgumentNotFound(id)),
    }
  }

  fn save(&self, argument: Argument) -> Result<ArgumentId> {
    self.ensure_open()?;
    // Validate before taking an id so rejected input never burns one.
    validate_argument(&argument)?;

    let id = self.last_id.fetch_add(1, Ordering::AcqRel) + 1;
    let history = History::new(id, argument)?;

    let mut histories = self.histories.write().map_err(|_| Error::Poisoned)?;
    histories.insert(id, Arc::new(Mutex::new(Some(history))));
    Ok(id)
  }

  fn fetch_all(&self, conclusion: &str) -> Result<Vec<ArgumentWithId>> {
    self.ensure_open()?;
    let slots: Vec<(ArgumentId, Slot)> = {
      let histories = self.histories.read().map_err(|_| Error::Poisoned)?;
      histories
        .iter()
        .map(|(id, slot)| (*id, Arc::clone(slot)))
        .collect()
    };

    let mut found = Vec::new();
    for (id, slot) in slots {
      let guard = slot.lock().map_err(|_| Error::Poisoned)?;
      if let Some(history) = guard.as_ref()
        && history.conclusion() == conclusion
      {
        found.push(ArgumentWithId { id, argument: history.live() });
      }
    }
    Ok(found)
  }

  fn delete(&self, id: ArgumentId) -> Result<()> {
    self.ensure_open()?;
    let slot = {
      let mut histories = self.histories.write().map_err(|_| Error::Poisoned)?;
      histories.remove(&id).ok_or(Error::ArgumentNotFound(id))?
    };
    slot.lock().map_err(|_| Error::Poisoned)?.take();
    Ok(())
  }

  fn close(&self) -> Result<()> {
    if self.closed.swap(true, Ordering::AcqRel) {
      return Ok(());
    }
    let mut histories = self.histories.write().map_err(|_| Error::Poisoned)?;
    tracing::info!(arguments = histories.len(), "closing in-memory store");
    histories.clear();
    Ok(())
  }
}

// ─── ArgumentStore impl ──────────────────────────────────────────────────────

impl ArgumentStore for MemoryStore {
  type Error = Error;

  async fn save(&self, argument: Argument) -> Result<ArgumentId> {
    let id = self.inner.save(argument)?;
    tracing::debug!(id, "saved argument");
    Ok(id)
  }

  async fn fetch_live(&self, id: ArgumentId) -> Result<Argument> {
    self.inner.with_history(id, |history| Ok(history.live()))
  }

  async fn fetch_version(
    &self,
    id: ArgumentId,
    version: VersionNumber,
  ) -> Result<Argument> {
    self.inner.with_history(id, |history| {
      history
        .version(version)
        .ok_or(Error::VersionNotFound { id, version })
    })
  }

  async fn fetch_all(&self, conclusion: &str) -> Result<Vec<ArgumentWithId>> {
    self.inner.fetch_all(conclusion)
  }

  async fn update_premises(
    &self,
    id: ArgumentId,
    premises: Vec<String>,
  ) -> Result<VersionNumber> {
    let version = self
      .inner
      .with_history(id, move |history| history.append(premises))?;
    tracing::debug!(id, version, "appended argument version");
    Ok(version)
  }

  async fn delete(&self, id: ArgumentId) -> Result<()> {
    self.inner.delete(id)?;
    tracing::debug!(id, "deleted argument");
    Ok(())
  }

  async fn close(&self) -> Result<()> { self.inner.close() }
}
