//! Raw, source-shaped person records.
//!
//! Two sources feed the directory:
//!
//! - **Generated** (source A): the nested random-person generator shape, keyed
//!   by `login.uuid`.
//! - **Local** (source B): the flat, locally curated shape, keyed by `id`.
//!
//! [`RawRecord::from_value`] is the single place that decides which shape a
//! JSON object has.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
  lenient,
  teacher::{Coordinates, Timezone},
};

// ─── Source A ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Login {
  #[serde(default, deserialize_with = "lenient::string")]
  pub uuid: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName {
  #[serde(default, deserialize_with = "lenient::string")]
  pub title: Option<String>,
  #[serde(default, deserialize_with = "lenient::string")]
  pub first: Option<String>,
  #[serde(default, deserialize_with = "lenient::string")]
  pub last:  Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
  #[serde(default, deserialize_with = "lenient::string")]
  pub city:        Option<String>,
  #[serde(default, deserialize_with = "lenient::string")]
  pub state:       Option<String>,
  #[serde(default, deserialize_with = "lenient::string")]
  pub country:     Option<String>,
  #[serde(default, deserialize_with = "lenient::string")]
  pub postcode:    Option<String>,
  #[serde(default, deserialize_with = "lenient::object")]
  pub coordinates: Option<Coordinates>,
  #[serde(default, deserialize_with = "lenient::object")]
  pub timezone:    Option<Timezone>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateOfBirth {
  #[serde(default, deserialize_with = "lenient::string")]
  pub date: Option<String>,
  #[serde(default, deserialize_with = "lenient::integer")]
  pub age:  Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Picture {
  #[serde(default, deserialize_with = "lenient::string")]
  pub large:     Option<String>,
  #[serde(default, deserialize_with = "lenient::string")]
  pub thumbnail: Option<String>,
}

/// A person as emitted by the random-person generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPerson {
  #[serde(default, deserialize_with = "lenient::object")]
  pub login:    Option<Login>,
  #[serde(default, deserialize_with = "lenient::object")]
  pub name:     Option<PersonName>,
  #[serde(default, deserialize_with = "lenient::object")]
  pub location: Option<Location>,
  #[serde(default, deserialize_with = "lenient::object")]
  pub dob:      Option<DateOfBirth>,
  #[serde(default, deserialize_with = "lenient::string")]
  pub email:    Option<String>,
  #[serde(default, deserialize_with = "lenient::string")]
  pub phone:    Option<String>,
  #[serde(default, deserialize_with = "lenient::object")]
  pub picture:  Option<Picture>,
  #[serde(default, deserialize_with = "lenient::string")]
  pub gender:   Option<String>,
}

// ─── Source B ────────────────────────────────────────────────────────────────

/// A flat record from the locally curated dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalRecord {
  #[serde(default, deserialize_with = "lenient::string")]
  pub id:                Option<String>,
  #[serde(default, deserialize_with = "lenient::string")]
  pub full_name:         Option<String>,
  #[serde(default, deserialize_with = "lenient::string")]
  pub title:             Option<String>,
  #[serde(default, deserialize_with = "lenient::string")]
  pub gender:            Option<String>,
  #[serde(default, deserialize_with = "lenient::string")]
  pub city:              Option<String>,
  #[serde(default, deserialize_with = "lenient::string")]
  pub state:             Option<String>,
  #[serde(default, deserialize_with = "lenient::string")]
  pub country:           Option<String>,
  #[serde(default, deserialize_with = "lenient::string")]
  pub postcode:          Option<String>,
  #[serde(default, deserialize_with = "lenient::object")]
  pub coordinates:       Option<Coordinates>,
  #[serde(default, deserialize_with = "lenient::object")]
  pub timezone:          Option<Timezone>,
  #[serde(default, deserialize_with = "lenient::string")]
  pub email:             Option<String>,
  #[serde(default, deserialize_with = "lenient::string")]
  pub b_day:             Option<String>,
  #[serde(default, deserialize_with = "lenient::string")]
  pub b_date:            Option<String>,
  #[serde(default, deserialize_with = "lenient::integer")]
  pub age:               Option<i64>,
  #[serde(default, deserialize_with = "lenient::string")]
  pub phone:             Option<String>,
  #[serde(default, deserialize_with = "lenient::string")]
  pub picture_large:     Option<String>,
  #[serde(default, deserialize_with = "lenient::string")]
  pub picture_thumbnail: Option<String>,
  #[serde(default, deserialize_with = "lenient::flag")]
  pub favorite:          Option<bool>,
  #[serde(default, deserialize_with = "lenient::string")]
  pub course:            Option<String>,
  #[serde(default, deserialize_with = "lenient::string")]
  pub bg_color:          Option<String>,
  #[serde(default, deserialize_with = "lenient::string")]
  pub note:              Option<String>,
}

// ─── RawRecord ───────────────────────────────────────────────────────────────

/// A source record whose shape has been resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "record", rename_all = "snake_case")]
pub enum RawRecord {
  Generated(GeneratedPerson),
  Local(LocalRecord),
}

impl RawRecord {
  /// Classify and decode a JSON object.
  ///
  /// An object with a non-null `name.first` is a generated person; any other
  /// object is a local record. Returns `None` only for non-objects.
  pub fn from_value(value: Value) -> Option<Self> {
    if !value.is_object() {
      return None;
    }
    let generated = value
      .get("name")
      .and_then(|name| name.get("first"))
      .is_some_and(|first| !first.is_null());

    // Every field is lenient, so decoding an object cannot fail on shape.
    let record = if generated {
      Self::Generated(serde_json::from_value(value).unwrap_or_default())
    } else {
      Self::Local(serde_json::from_value(value).unwrap_or_default())
    };
    Some(record)
  }

  /// The identity key: `login.uuid` for generated people, `id` for local
  /// records. `None` when missing or blank.
  pub fn identity(&self) -> Option<&str> {
    let key = match self {
      Self::Generated(person) => {
        person.login.as_ref().and_then(|l| l.uuid.as_deref())
      }
      Self::Local(record) => record.id.as_deref(),
    };
    key.map(str::trim).filter(|k| !k.is_empty())
  }
}
