//! The `ArgumentStore` trait.
//!
//! The trait is implemented by storage backends (`sophia-store-memory`,
//! `sophia-store-sqlite`). The API layer depends on this abstraction, not on
//! any concrete backend.

use std::future::Future;

use crate::{
  argument::{Argument, ArgumentId, ArgumentWithId, VersionNumber},
  error::{Error, ErrorKind},
};

/// Implemented by backend error types so callers can tell a missing argument
/// apart from bad input or an I/O failure without inspecting messages.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn kind(&self) -> ErrorKind;
}

impl StoreError for Error {
  fn kind(&self) -> ErrorKind { Error::kind(self) }
}

/// Abstraction over a versioned argument store.
///
/// Each logical argument is an id owning an append-only history of versions,
/// numbered contiguously from 1. The conclusion is fixed at creation; updates
/// append a new premise list. Deletion removes the id and its whole history.
///
/// Implementations must guarantee:
/// - ids are positive, unique, and never reused;
/// - concurrent updates to one id receive distinct, consecutive version
///   numbers;
/// - a version is visible to readers only once it is fully written;
/// - after [`close`](Self::close), every other method fails with an error of
///   kind [`ErrorKind::Closed`].
///
/// Every method hands back owned copies. Dropping a returned future before it
/// resolves must never leave a partial write behind.
pub trait ArgumentStore: Send + Sync {
  type Error: StoreError;

  /// Persist a new argument as version 1 and return its id.
  /// The argument is validated again before anything is written.
  fn save(
    &self,
    argument: Argument,
  ) -> impl Future<Output = Result<ArgumentId, Self::Error>> + Send + '_;

  /// The argument at its highest stored version.
  /// Fails with [`ErrorKind::NotFound`] if `id` does not exist.
  fn fetch_live(
    &self,
    id: ArgumentId,
  ) -> impl Future<Output = Result<Argument, Self::Error>> + Send + '_;

  /// The argument at exactly `version`.
  /// Fails with [`ErrorKind::NotFound`] if `id` or that version does not
  /// exist.
  fn fetch_version(
    &self,
    id: ArgumentId,
    version: VersionNumber,
  ) -> impl Future<Output = Result<Argument, Self::Error>> + Send + '_;

  /// Every argument whose live version has exactly `conclusion`, in ascending
  /// id order. Returns an empty list, never a not-found error, when nothing
  /// matches.
  fn fetch_all<'a>(
    &'a self,
    conclusion: &'a str,
  ) -> impl Future<Output = Result<Vec<ArgumentWithId>, Self::Error>> + Send + 'a;

  /// Append a new version of `id` with `premises` and return its number,
  /// which is the previous live version plus one. The premises are
  /// re-validated here.
  fn update_premises(
    &self,
    id: ArgumentId,
    premises: Vec<String>,
  ) -> impl Future<Output = Result<VersionNumber, Self::Error>> + Send + '_;

  /// Remove `id` and all of its versions.
  fn delete(
    &self,
    id: ArgumentId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Release the store's resources. Calling it again is a no-op.
  fn close(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
