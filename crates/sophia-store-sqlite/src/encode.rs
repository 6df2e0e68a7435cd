//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and premise lists as compact JSON
//! arrays.

use chrono::{DateTime, Utc};
use sophia_core::{Argument, ArgumentId, ArgumentWithId};

use crate::Result;

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn encode_premises(premises: &[String]) -> Result<String> {
  Ok(serde_json::to_string(premises)?)
}

pub fn decode_premises(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Raw row types ───────────────────────────────────────────────────────────

/// A version row joined with its argument, before JSON decoding.
pub struct RawArgument {
  pub conclusion:    String,
  pub premises_json: String,
}

impl RawArgument {
  pub fn into_argument(self) -> Result<Argument> {
    Ok(Argument {
      conclusion: self.conclusion,
      premises:   decode_premises(&self.premises_json)?,
    })
  }
}

/// A live version row as returned by the conclusion lookup.
pub struct RawArgumentWithId {
  pub id:  ArgumentId,
  pub raw: RawArgument,
}

impl RawArgumentWithId {
  pub fn into_argument_with_id(self) -> Result<ArgumentWithId> {
    Ok(ArgumentWithId { id: self.id, argument: self.raw.into_argument()? })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn premises_keep_their_order() {
    let premises = vec!["b".to_string(), "a".to_string(), "c".to_string()];
    let encoded = encode_premises(&premises).unwrap();
    assert_eq!(encoded, r#"["b","a","c"]"#);
    assert_eq!(decode_premises(&encoded).unwrap(), premises);
  }

  #[test]
  fn corrupt_premises_are_an_error() {
    assert!(decode_premises("not json").is_err());
  }
}
