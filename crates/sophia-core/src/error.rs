//! Error types for `sophia-core`.

use thiserror::Error;

use crate::argument::{ArgumentId, ValidationError, VersionNumber};

/// Coarse classification of a store failure. Callers branch on this rather
/// than on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// The input was rejected before anything was written.
  Invalid,
  /// The referenced argument, or the requested version of it, does not exist.
  NotFound,
  /// The store has been closed.
  Closed,
  /// Anything else: I/O, storage engine, or a broken internal invariant.
  Backend,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Invalid(#[from] ValidationError),

  #[error("argument {0} does not exist")]
  ArgumentNotFound(ArgumentId),

  #[error("argument {id} does not have a version {version}")]
  VersionNotFound {
    id:      ArgumentId,
    version: VersionNumber,
  },

  #[error("the store has been closed")]
  Closed,

  #[error("store lock poisoned")]
  Poisoned,

  #[error("argument {0} has no versions left to assign")]
  VersionOverflow(ArgumentId),
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::Invalid(_) => ErrorKind::Invalid,
      Self::ArgumentNotFound(_) | Self::VersionNotFound { .. } => {
        ErrorKind::NotFound
      }
      Self::Closed => ErrorKind::Closed,
      Self::Poisoned | Self::VersionOverflow(_) => ErrorKind::Backend,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
