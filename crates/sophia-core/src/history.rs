//! Version history of a logical argument.
//!
//! A logical argument owns an append-only sequence of premise snapshots. The
//! conclusion is fixed when the argument is created; each update appends a
//! new premise list and never rewrites an earlier one. Version `n` lives at
//! index `n - 1`, so numbering is contiguous from 1 by construction.

use crate::{
  Error, Result,
  argument::{
    Argument, ArgumentId, VersionNumber, validate_argument, validate_premises,
  },
};

/// Every stored version of one logical argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
  id:         ArgumentId,
  conclusion: String,
  versions:   Vec<Vec<String>>,
}

impl History {
  /// Start a history at version 1. Fails if `argument` is invalid.
  pub fn new(id: ArgumentId, argument: Argument) -> Result<Self> {
    validate_argument(&argument)?;
    Ok(Self {
      id,
      conclusion: argument.conclusion,
      versions: vec![argument.premises],
    })
  }

  pub fn id(&self) -> ArgumentId { self.id }

  pub fn conclusion(&self) -> &str { &self.conclusion }

  /// The highest version number currently stored.
  pub fn live_version(&self) -> VersionNumber {
    // `append` refuses to grow past `VersionNumber::MAX`.
    self.versions.len() as VersionNumber
  }

  /// A copy of the argument at its live version.
  pub fn live(&self) -> Argument {
    let premises = self.versions.last().cloned().unwrap_or_default();
    Argument { conclusion: self.conclusion.clone(), premises }
  }

  /// A copy of the argument at exactly `version`, if it exists.
  pub fn version(&self, version: VersionNumber) -> Option<Argument> {
    let index = usize::try_from(version).ok()?.checked_sub(1)?;
    self.versions.get(index).map(|premises| Argument {
      conclusion: self.conclusion.clone(),
      premises:   premises.clone(),
    })
  }

  /// Append a new premise list and return its version number, which is always
  /// the previous live version plus one.
  pub fn append(&mut self, premises: Vec<String>) -> Result<VersionNumber> {
    validate_premises(&premises)?;
    let next = self
      .live_version()
      .checked_add(1)
      .ok_or(Error::VersionOverflow(self.id))?;
    self.versions.push(premises);
    Ok(next)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{ErrorKind, ValidationError};

  fn original() -> Argument {
    Argument::new("Socrates is mortal", [
      "Socrates is a man",
      "All men are mortal",
    ])
  }

  fn premises(list: &[&str]) -> Vec<String> {
    list.iter().map(|p| p.to_string()).collect()
  }

  #[test]
  fn new_history_starts_at_version_one() {
    let history = History::new(1, original()).unwrap();
    assert_eq!(history.live_version(), 1);
    assert_eq!(history.live(), original());
    assert_eq!(history.version(1), Some(original()));
  }

  #[test]
  fn invalid_argument_cannot_start_a_history() {
    let err = History::new(1, Argument::new("c", ["only one"])).unwrap_err();
    assert!(matches!(
      err,
      Error::Invalid(ValidationError::TooFewPremises(1))
    ));
    assert_eq!(err.kind(), ErrorKind::Invalid);
  }

  #[test]
  fn append_keeps_earlier_versions_and_conclusion() {
    let mut history = History::new(1, original()).unwrap();
    let v2 = history.append(premises(&["p1", "p2"])).unwrap();
    let v3 = history.append(premises(&["q1", "q2", "q3"])).unwrap();

    assert_eq!((v2, v3), (2, 3));
    assert_eq!(history.live_version(), 3);
    assert_eq!(history.version(1), Some(original()));
    assert_eq!(history.version(2).unwrap().premises, ["p1", "p2"]);
    assert_eq!(history.live().premises, ["q1", "q2", "q3"]);
    assert_eq!(history.live().conclusion, "Socrates is mortal");
  }

  #[test]
  fn rejected_append_leaves_history_untouched() {
    let mut history = History::new(1, original()).unwrap();
    let before = history.clone();
    assert!(history.append(premises(&["p1", ""])).is_err());
    assert_eq!(history, before);
  }

  #[test]
  fn out_of_range_versions_are_absent() {
    let history = History::new(1, original()).unwrap();
    assert_eq!(history.version(0), None);
    assert_eq!(history.version(2), None);
    assert_eq!(history.version(VersionNumber::MAX), None);
  }
}
