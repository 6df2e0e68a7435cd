//! [`SqliteStore`] is the SQLite implementation of [`ArgumentStore`].

use std::{
  path::Path,
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  },
};

use chrono::Utc;
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use sophia_core::{
  Argument, ArgumentId, ArgumentWithId, VersionNumber, store::ArgumentStore,
  validate_argument, validate_premises,
};

use crate::{
  Error, Result,
  encode::{RawArgument, RawArgumentWithId, encode_dt, encode_premises},
  schema::SCHEMA,
};

/// Outcome computed on the connection thread. The outer `Result` carries
/// database failures, the inner one domain failures such as a missing id.
type Outcome<T> = std::result::Result<T, sophia_core::Error>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// An argument store backed by a single SQLite file.
///
/// Every mutation runs as one transaction on the connection's worker thread.
/// Once dispatched it completes even if the caller stops waiting, so a
/// dropped request can never leave half an update behind. Writes go through a
/// single connection, which serialises updates to the same id.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn:   tokio_rusqlite::Connection,
  closed: Arc<AtomicBool>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_path_buf();
    let conn = tokio_rusqlite::Connection::open(&path).await?;
    let store = Self { conn, closed: Arc::new(AtomicBool::new(false)) };
    store.init_schema().await?;
    tracing::info!(path = %path.display(), "opened sqlite store");
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, closed: Arc::new(AtomicBool::new(false)) };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  fn ensure_open(&self) -> Result<()> {
    if self.closed.load(Ordering::Acquire) {
      return Err(sophia_core::Error::Closed.into());
    }
    Ok(())
  }
}

// ─── ArgumentStore impl ──────────────────────────────────────────────────────

impl ArgumentStore for SqliteStore {
  type Error = Error;

  async fn save(&self, argument: Argument) -> Result<ArgumentId> {
    self.ensure_open()?;
    validate_argument(&argument).map_err(sophia_core::Error::from)?;

    let premises_json = encode_premises(&argument.premises)?;
    let conclusion    = argument.conclusion;
    let now           = encode_dt(Utc::now());

    let id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO arguments (conclusion, live_version, created_at)
           VALUES (?1, 1, ?2)",
          rusqlite::params![conclusion, now],
        )?;
        let id = tx.last_insert_rowid();
        tx.execute(
          "INSERT INTO argument_versions (argument_id, version, premises_json, recorded_at)
           VALUES (?1, 1, ?2, ?3)",
          rusqlite::params![id, premises_json, now],
        )?;
        tx.commit()?;
        Ok(id)
      })
      .await?;

    tracing::debug!(id, "saved argument");
    Ok(id)
  }

  async fn fetch_live(&self, id: ArgumentId) -> Result<Argument> {
    self.ensure_open()?;

    let raw: Outcome<RawArgument> = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            "SELECT a.conclusion, v.premises_json
             FROM arguments a
             JOIN argument_versions v
               ON v.argument_id = a.argument_id AND v.version = a.live_version
             WHERE a.argument_id = ?1",
            rusqlite::params![id],
            |row| {
              Ok(RawArgument {
                conclusion:    row.get(0)?,
                premises_json: row.get(1)?,
              })
            },
          )
          .optional()?;
        Ok(raw.ok_or(sophia_core::Error::ArgumentNotFound(id)))
      })
      .await?;

    raw?.into_argument()
  }

  async fn fetch_version(
    &self,
    id: ArgumentId,
    version: VersionNumber,
  ) -> Result<Argument> {
    self.ensure_open()?;

    let raw: Outcome<RawArgument> = self
      .conn
      .call(move |conn| {
        // LEFT JOIN so a missing id and a missing version are distinguishable.
        let row: Option<(String, Option<String>)> = conn
          .query_row(
            "SELECT a.conclusion, v.premises_json
             FROM arguments a
             LEFT JOIN argument_versions v
               ON v.argument_id = a.argument_id AND v.version = ?2
             WHERE a.argument_id = ?1",
            rusqlite::params![id, version],
            |row| Ok((row.get(0)?, row.get(1)?)),
          )
          .optional()?;

        Ok(match row {
          None => Err(sophia_core::Error::ArgumentNotFound(id)),
          Some((_, None)) => {
            Err(sophia_core::Error::VersionNotFound { id, version })
          }
          Some((conclusion, Some(premises_json))) => {
            Ok(RawArgument { conclusion, premises_json })
          }
        })
      })
      .await?;

    raw?.into_argument()
  }

  async fn fetch_all(&self, conclusion: &str) -> Result<Vec<ArgumentWithId>> {
    self.ensure_open()?;
    let conclusion = conclusion.to_owned();

    let raws: Vec<RawArgumentWithId> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT a.argument_id, a.conclusion, v.premises_json
           FROM arguments a
           JOIN argument_versions v
             ON v.argument_id = a.argument_id AND v.version = a.live_version
           WHERE a.conclusion = ?1
           ORDER BY a.argument_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![conclusion], |row| {
            Ok(RawArgumentWithId {
              id:  row.get(0)?,
              raw: RawArgument {
                conclusion:    row.get(1)?,
                premises_json: row.get(2)?,
              },
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawArgumentWithId::into_argument_with_id)
      .collect()
  }

  async fn update_premises(
    &self,
    id: ArgumentId,
    premises: Vec<String>,
  ) -> Result<VersionNumber> {
    self.ensure_open()?;
    validate_premises(&premises).map_err(sophia_core::Error::from)?;

    let premises_json = encode_premises(&premises)?;
    let now           = encode_dt(Utc::now());

    let version: Outcome<VersionNumber> = self
      .conn
      .call(move |conn| {
        // IMMEDIATE takes the write lock before reading the live version, so
        // no other writer can compute the same next number.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let live: Option<VersionNumber> = tx
          .query_row(
            "SELECT live_version FROM arguments WHERE argument_id = ?1",
            rusqlite::params![id],
            |row| row.get(0),
          )
          .optional()?;
        let Some(live) = live else {
          return Ok(Err(sophia_core::Error::ArgumentNotFound(id)));
        };
        let Some(next) = live.checked_add(1) else {
          return Ok(Err(sophia_core::Error::VersionOverflow(id)));
        };

        tx.execute(
          "INSERT INTO argument_versions (argument_id, version, premises_json, recorded_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id, next, premises_json, now],
        )?;
        tx.execute(
          "UPDATE arguments SET live_version = ?2 WHERE argument_id = ?1",
          rusqlite::params![id, next],
        )?;
        tx.commit()?;
        Ok(Ok(next))
      })
      .await?;

    let version = version?;
    tracing::debug!(id, version, "appended argument version");
    Ok(version)
  }

  async fn delete(&self, id: ArgumentId) -> Result<()> {
    self.ensure_open()?;

    let deleted: Outcome<()> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM argument_versions WHERE argument_id = ?1",
          rusqlite::params![id],
        )?;
        let removed = tx.execute(
          "DELETE FROM arguments WHERE argument_id = ?1",
          rusqlite::params![id],
        )?;
        if removed == 0 {
          // Nothing to undo; dropping the transaction rolls it back.
          return Ok(Err(sophia_core::Error::ArgumentNotFound(id)));
        }
        tx.commit()?;
        Ok(Ok(()))
      })
      .await?;

    deleted?;
    tracing::debug!(id, "deleted argument");
    Ok(())
  }

  async fn close(&self) -> Result<()> {
    if self.closed.swap(true, Ordering::AcqRel) {
      return Ok(());
    }
    self.conn.clone().close().await?;
    tracing::info!("closed sqlite store");
    Ok(())
  }
}
