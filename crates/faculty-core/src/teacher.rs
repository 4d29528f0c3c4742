//! The canonical teacher record and its queryable fields.
//!
//! Every downstream consumer (query engine, statistics, the CLI) operates on
//! [`Teacher`]. Raw source records never leave the normaliser.

use std::{cmp::Ordering, str::FromStr};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{Error, Result, lenient};

/// The fixed vocabulary a missing `course` is drawn from.
pub const COURSES: [&str; 12] = [
  "Mathematics",
  "Physics",
  "English",
  "Computer Science",
  "Dancing",
  "Chess",
  "Biology",
  "Chemistry",
  "Law",
  "Art",
  "Medicine",
  "Statistics",
];

// ─── Location sub-types ──────────────────────────────────────────────────────

/// Geographic position. Kept as strings because the generator emits them
/// that way and nothing in the pipeline does arithmetic on them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
  #[serde(default, deserialize_with = "lenient::string_or_empty")]
  pub latitude:  String,
  #[serde(default, deserialize_with = "lenient::string_or_empty")]
  pub longitude: String,
}

/// UTC offset plus a human description, e.g. `+9:00` / `Tokyo, Seoul`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timezone {
  #[serde(default, deserialize_with = "lenient::string_or_empty")]
  pub offset:      String,
  #[serde(default, deserialize_with = "lenient::string_or_empty")]
  pub description: String,
}

// ─── Teacher ─────────────────────────────────────────────────────────────────

/// A unified, validated teacher profile.
///
/// Fields a source may legitimately lack are `Option`s; the validator decides
/// whether an absent value is acceptable. `course`, `bg_color`, `favorite` and
/// `note` are always populated by the normaliser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
  pub id:                String,
  pub gender:            Option<String>,
  pub title:             Option<String>,
  pub full_name:         String,
  pub city:              Option<String>,
  pub state:             Option<String>,
  pub country:           Option<String>,
  pub postcode:          Option<String>,
  pub coordinates:       Option<Coordinates>,
  pub timezone:          Option<Timezone>,
  pub email:             Option<String>,
  /// ISO-8601 date or date-time, as delivered by the source.
  pub b_date:            Option<String>,
  pub age:               Option<i64>,
  /// Digits only.
  pub phone:             String,
  pub picture_large:     Option<String>,
  pub picture_thumbnail: Option<String>,
  pub favorite:          bool,
  pub course:            String,
  /// `#rrggbb`.
  pub bg_color:          String,
  pub note:              String,
}

impl Teacher {
  /// The value of `field` on this record, or `None` when absent.
  pub fn field(&self, field: Field) -> Option<FieldValue<'_>> {
    use FieldValue::{Flag, Number, Text};

    fn text(s: &Option<String>) -> Option<FieldValue<'_>> {
      s.as_deref().map(FieldValue::Text)
    }

    match field {
      Field::Id => Some(Text(&self.id)),
      Field::Gender => text(&self.gender),
      Field::Title => text(&self.title),
      Field::FullName => Some(Text(&self.full_name)),
      Field::City => text(&self.city),
      Field::State => text(&self.state),
      Field::Country => text(&self.country),
      Field::Postcode => text(&self.postcode),
      Field::Email => text(&self.email),
      Field::BDate => text(&self.b_date),
      Field::Age => self.age.map(Number),
      Field::Phone => Some(Text(&self.phone)),
      Field::PictureLarge => text(&self.picture_large),
      Field::PictureThumbnail => text(&self.picture_thumbnail),
      Field::Favorite => Some(Flag(self.favorite)),
      Field::Course => Some(Text(&self.course)),
      Field::BgColor => Some(Text(&self.bg_color)),
      Field::Note => Some(Text(&self.note)),
    }
  }

  /// `true` if the record carries a large picture URL.
  pub fn has_photo(&self) -> bool {
    self.picture_large.as_deref().is_some_and(|p| !p.is_empty())
  }
}

// ─── Field ───────────────────────────────────────────────────────────────────

/// Scalar teacher fields addressable by name from filter criteria and sort
/// keys. `coordinates` and `timezone` are structured and not addressable.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Field {
  Id,
  Gender,
  Title,
  FullName,
  City,
  State,
  Country,
  Postcode,
  Email,
  #[strum(serialize = "b_date")]
  BDate,
  Age,
  Phone,
  PictureLarge,
  PictureThumbnail,
  Favorite,
  Course,
  BgColor,
  Note,
}

impl Field {
  /// Parse a field name, mapping failure into the crate error.
  pub fn parse(name: &str) -> Result<Self> {
    Self::from_str(name).map_err(|_| Error::UnknownField(name.to_owned()))
  }
}

/// A borrowed scalar read off a [`Teacher`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
  Text(&'a str),
  Number(i64),
  Flag(bool),
}

impl FieldValue<'_> {
  /// Ordering used by sort: numbers numerically, text case-insensitively with
  /// a byte-wise tie-break, flags `false < true`. Mixed kinds compare equal.
  pub fn compare(&self, other: &Self) -> Ordering {
    match (self, other) {
      (Self::Number(a), Self::Number(b)) => a.cmp(b),
      (Self::Flag(a), Self::Flag(b)) => a.cmp(b),
      (Self::Text(a), Self::Text(b)) => a
        .to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b)),
      _ => Ordering::Equal,
    }
  }
}
