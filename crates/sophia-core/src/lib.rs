//! Core types and trait definitions for the Sophia argument store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Backends implement [`store::ArgumentStore`]; the API layer depends only on
//! that abstraction.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod argument;
pub mod error;
pub mod history;
pub mod store;

#[cfg(feature = "testing")]
pub mod testing;

pub use argument::{
  Argument, ArgumentId, ArgumentWithId, ValidationError, VersionNumber,
  validate_argument, validate_premises,
};
pub use error::{Error, ErrorKind, Result};
