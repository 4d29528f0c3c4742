//! Payload codec for Faculty.
//!
//! Decodes already-fetched JSON payload text into [`RawRecord`]s. Pure
//! synchronous; no HTTP or file-system access.
//!
//! Two payload shapes are accepted:
//!
//! - the random-person generator envelope,
//!   `{"results": [...], "info": {"seed": ..., "page": ...}}`
//! - a bare JSON array, as served by the local dataset.
//!
//! # Quick start
//!
//! ```no_run
//! use faculty_source::decode;
//!
//! let payload = decode(r#"[{"id": "1", "full_name": "Ada Lovelace"}]"#).unwrap();
//! println!("{} entries, info={:?}", payload.entries.len(), payload.info);
//! ```

pub mod error;

pub use error::{Error, Result};
use faculty_core::raw::RawRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─── Public types
// ─────────────────────────────────────────────────────────────

/// Paging metadata from the generator envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadInfo {
  #[serde(default)]
  pub seed:    Option<String>,
  #[serde(default)]
  pub results: Option<u32>,
  #[serde(default)]
  pub page:    Option<u32>,
  #[serde(default)]
  pub version: Option<String>,
}

/// The result of decoding a payload.
///
/// Each entry decodes independently; a malformed entry yields `Err(…)` in the
/// corresponding position without aborting the rest.
#[derive(Debug)]
pub struct Payload {
  /// Envelope metadata, when the payload had an envelope with `info`.
  pub info:    Option<PayloadInfo>,
  pub entries: Vec<Result<RawRecord>>,
}

impl Payload {
  /// The successfully decoded records, in payload order.
  pub fn records(&self) -> impl Iterator<Item = &RawRecord> {
    self.entries.iter().filter_map(|e| e.as_ref().ok())
  }

  /// The entry-level errors, in payload order.
  pub fn errors(&self) -> impl Iterator<Item = &Error> {
    self.entries.iter().filter_map(|e| e.as_ref().err())
  }

  /// Consume the payload, keeping only decoded records.
  pub fn into_records(self) -> Vec<RawRecord> {
    self.entries.into_iter().filter_map(Result::ok).collect()
  }
}

// ─── Public API
// ───────────────────────────────────────────────────────────────

/// Decode payload text.
///
/// Fails only if `input` is not JSON or has neither accepted top-level shape.
pub fn decode(input: &str) -> Result<Payload> {
  decode_value(serde_json::from_str(input)?)
}

/// Decode an already-parsed payload.
pub fn decode_value(value: Value) -> Result<Payload> {
  let (info, items) = match value {
    Value::Array(items) => (None, items),
    Value::Object(mut map) => {
      let items = match map.remove("results") {
        Some(Value::Array(items)) => items,
        _ => return Err(Error::UnexpectedShape("an object without `results`")),
      };
      let info = map
        .remove("info")
        .and_then(|info| serde_json::from_value(info).ok());
      (info, items)
    }
    other => return Err(Error::UnexpectedShape(kind(&other))),
  };

  let entries = items
    .into_iter()
    .enumerate()
    .map(|(index, item)| {
      RawRecord::from_value(item).ok_or(Error::NotAnObject { index })
    })
    .collect();

  Ok(Payload { info, entries })
}

fn kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn generator_envelope_with_info() {
    let payload = decode(
      r#"{
        "results": [
          {"login": {"uuid": "u1"}, "name": {"first": "a", "last": "b"}},
          {"login": {"uuid": "u2"}, "name": {"first": "c", "last": "d"}}
        ],
        "info": {"seed": "teachfinder", "results": 2, "page": 1, "version": "1.4"}
      }"#,
    )
    .unwrap();

    assert_eq!(payload.entries.len(), 2);
    assert_eq!(
      payload.info,
      Some(PayloadInfo {
        seed:    Some("teachfinder".into()),
        results: Some(2),
        page:    Some(1),
        version: Some("1.4".into()),
      })
    );
    assert!(payload.records().all(|r| matches!(r, RawRecord::Generated(_))));
  }

  #[test]
  fn bare_array_of_local_records() {
    let payload = decode(r#"[{"id": 1, "full_name": "X"}, {"id": "2"}]"#).unwrap();
    assert!(payload.info.is_none());
    let ids: Vec<_> = payload.records().filter_map(RawRecord::identity).collect();
    assert_eq!(ids, ["1", "2"]);
  }

  #[test]
  fn bad_entries_do_not_abort_the_rest() {
    let payload = decode(r#"[{"id": "1"}, 42, "text", {"id": "2"}]"#).unwrap();
    assert_eq!(payload.records().count(), 2);
    let bad: Vec<_> = payload
      .errors()
      .map(|e| match e {
        Error::NotAnObject { index } => *index,
        other => panic!("unexpected error {other}"),
      })
      .collect();
    assert_eq!(bad, [1, 2]);
    assert_eq!(payload.into_records().len(), 2);
  }

  #[test]
  fn malformed_info_is_ignored() {
    let payload = decode(r#"{"results": [], "info": "n/a"}"#).unwrap();
    assert!(payload.info.is_none());
    assert!(payload.entries.is_empty());
  }

  #[test]
  fn rejected_top_level_shapes() {
    assert!(matches!(decode("not json"), Err(Error::Json(_))));
    assert!(matches!(decode("42"), Err(Error::UnexpectedShape("a number"))));
    assert!(matches!(
      decode(r#"{"people": []}"#),
      Err(Error::UnexpectedShape(_))
    ));
    assert!(matches!(
      decode(r#"{"results": {}}"#),
      Err(Error::UnexpectedShape(_))
    ));
  }
}
