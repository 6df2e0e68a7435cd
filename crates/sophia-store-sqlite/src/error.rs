//! Error type for `sophia-store-sqlite`.

use sophia_core::{ErrorKind, store::StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] sophia_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

impl StoreError for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Error::Core(e) => e.kind(),
      Error::Database(tokio_rusqlite::Error::ConnectionClosed) => {
        ErrorKind::Closed
      }
      Error::Database(_) | Error::Json(_) => ErrorKind::Backend,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
