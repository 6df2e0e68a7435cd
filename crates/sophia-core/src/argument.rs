//! The argument value type and its validation rules.
//!
//! An argument is a conclusion supported by at least two premises. Validity is
//! a precondition of every write: nothing reaches a store without passing
//! [`validate_argument`] or [`validate_premises`] first.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity of a logical argument. Assigned by the store, always positive.
pub type ArgumentId = i64;

/// Position of a snapshot in an argument's history, starting at 1.
pub type VersionNumber = u32;

/// The smallest number of premises an argument may have.
pub const MIN_PREMISES: usize = 2;

// ─── Argument ────────────────────────────────────────────────────────────────

/// A conclusion plus the ordered premises that support it.
///
/// Missing fields deserialise as empty so that a body like
/// `{"premises": [...]}` surfaces as a [`ValidationError`] rather than a
/// parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
  #[serde(default)]
  pub conclusion: String,
  #[serde(default)]
  pub premises:   Vec<String>,
}

impl Argument {
  pub fn new(
    conclusion: impl Into<String>,
    premises: impl IntoIterator<Item = impl Into<String>>,
  ) -> Self {
    Self {
      conclusion: conclusion.into(),
      premises:   premises.into_iter().map(Into::into).collect(),
    }
  }
}

/// An argument bundled with its id, as returned by
/// [`crate::store::ArgumentStore::fetch_all`].
///
/// Serialises flat: `{"id": 1, "conclusion": "...", "premises": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentWithId {
  pub id:       ArgumentId,
  #[serde(flatten)]
  pub argument: Argument,
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// Why an argument or premise list was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("arguments must have a conclusion")]
  MissingConclusion,

  #[error("arguments must have at least {MIN_PREMISES} premises, got {0}")]
  TooFewPremises(usize),

  #[error("argument premise[{0}] is empty, but must not be")]
  EmptyPremise(usize),
}

/// Check that `argument` has a conclusion and a valid premise list.
pub fn validate_argument(argument: &Argument) -> Result<(), ValidationError> {
  if argument.conclusion.is_empty() {
    return Err(ValidationError::MissingConclusion);
  }
  validate_premises(&argument.premises)
}

/// Check that `premises` would make a valid premise list: at least
/// [`MIN_PREMISES`] entries, none of them empty. Reports the first empty
/// index.
pub fn validate_premises<S: AsRef<str>>(
  premises: &[S],
) -> Result<(), ValidationError> {
  if premises.len() < MIN_PREMISES {
    return Err(ValidationError::TooFewPremises(premises.len()));
  }
  match premises.iter().position(|p| p.as_ref().is_empty()) {
    Some(index) => Err(ValidationError::EmptyPremise(index)),
    None => Ok(()),
  }
}
