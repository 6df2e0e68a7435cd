//! In-process backend for the Sophia argument store.
//!
//! Holds every history in memory; nothing survives a restart. Used for
//! development and as the reference backend in tests.

mod store;

pub use store::MemoryStore;

#[cfg(test)]
mod tests;
