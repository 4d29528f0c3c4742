//! Composite dashboard filter.
//!
//! A [`ViewFilter`] bundles the controls a directory listing exposes (country,
//! gender, age bracket, photo and favourite toggles, free-text search) and
//! applies them through the query engine in one call.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  query::{self, Condition, Criteria},
  teacher::Teacher,
};

/// An inclusive age range with an optional upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeBracket {
  pub min: i64,
  pub max: Option<i64>,
}

impl AgeBracket {
  /// The brackets offered by the dashboard's age selector.
  pub const PRESETS: [AgeBracket; 3] = [
    AgeBracket { min: 18, max: Some(30) },
    AgeBracket { min: 31, max: Some(45) },
    AgeBracket { min: 46, max: None },
  ];

  pub fn condition(&self) -> Condition {
    Condition::between(Some(self.min), self.max)
  }
}

/// Accepts `"18-30"`, `"46+"` and `"46-Infinity"`.
impl FromStr for AgeBracket {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let invalid = || Error::InvalidAgeBracket(s.to_owned());
    let s = s.trim();

    let (min, max) = match s.strip_suffix('+') {
      Some(min) => (min, None),
      None => {
        let (min, max) = s.split_once('-').ok_or_else(invalid)?;
        let max = max.trim();
        if max.eq_ignore_ascii_case("infinity") {
          (min, None)
        } else {
          (min, Some(max.parse::<i64>().map_err(|_| invalid())?))
        }
      }
    };
    let min = min.trim().parse::<i64>().map_err(|_| invalid())?;

    if max.is_some_and(|max| max < min) {
      return Err(invalid());
    }
    Ok(Self { min, max })
  }
}

impl fmt::Display for AgeBracket {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.max {
      Some(max) => write!(f, "{}-{}", self.min, max),
      None => write!(f, "{}+", self.min),
    }
  }
}

/// Everything a directory listing can be narrowed by. Default is "show all".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewFilter {
  pub country:        Option<String>,
  pub gender:         Option<String>,
  pub age:            Option<AgeBracket>,
  pub with_photo:     bool,
  pub favorites_only: bool,
  pub search:         Option<String>,
}

impl ViewFilter {
  /// The field criteria part of this view.
  pub fn criteria(&self) -> Criteria {
    let mut criteria = Criteria::new();
    if let Some(country) = &self.country {
      criteria.insert("country", Condition::equals(country.as_str()));
    }
    if let Some(gender) = &self.gender {
      criteria.insert("gender", Condition::equals(gender.as_str()));
    }
    if let Some(age) = &self.age {
      criteria.insert("age", age.condition());
    }
    if self.favorites_only {
      criteria.insert("favorite", Condition::equals(true));
    }
    criteria
  }
}

/// Apply `view` to `teachers`, preserving input order.
pub fn apply_view<'a, I>(teachers: I, view: &ViewFilter) -> Vec<&'a Teacher>
where
  I: IntoIterator<Item = &'a Teacher>,
{
  let criteria = view.criteria();
  let narrowed = query::filter(teachers, &criteria)
    .into_iter()
    .filter(|t| !view.with_photo || t.has_photo());
  query::search(narrowed, view.search.as_deref().unwrap_or_default())
}
