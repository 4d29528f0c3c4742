//! Query engine over a teacher collection.
//!
//! Four composable operations, none of which mutate their input:
//!
//! | Operation      | Result |
//! |----------------|--------|
//! | [`filter`]     | records satisfying every criterion |
//! | [`sort`]       | stable ordering by one field, missing values last |
//! | [`search`]     | case-insensitive substring match on name, note, age |
//! | [`percentage`] | share of records matching criteria, in `[0, 100]` |
//!
//! Each takes any iterator of `&Teacher` and returns borrowed records, so the
//! operations chain without cloning.

use std::{cmp::Ordering, collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{
  Error, Result,
  teacher::{Field, FieldValue, Teacher},
};

// ─── Criteria ────────────────────────────────────────────────────────────────

/// A literal a field is compared against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
  Flag(bool),
  Number(f64),
  Text(String),
}

impl Scalar {
  fn matches(&self, value: &FieldValue<'_>) -> bool {
    match (self, value) {
      (Self::Text(s), FieldValue::Text(v)) => s == v,
      (Self::Number(n), FieldValue::Number(v)) => *n == *v as f64,
      (Self::Flag(b), FieldValue::Flag(v)) => b == v,
      _ => false,
    }
  }

  /// Order `value` relative to this bound. `None` when the kinds differ.
  fn cmp_value(&self, value: &FieldValue<'_>) -> Option<Ordering> {
    match (self, value) {
      (Self::Text(s), FieldValue::Text(v)) => Some((*v).cmp(s.as_str())),
      (Self::Number(n), FieldValue::Number(v)) => (*v as f64).partial_cmp(n),
      (Self::Flag(b), FieldValue::Flag(v)) => Some(v.cmp(b)),
      _ => None,
    }
  }
}

impl From<&str> for Scalar {
  fn from(s: &str) -> Self { Self::Text(s.to_owned()) }
}

impl From<String> for Scalar {
  fn from(s: String) -> Self { Self::Text(s) }
}

impl From<i32> for Scalar {
  fn from(n: i32) -> Self { Self::Number(n.into()) }
}

impl From<i64> for Scalar {
  fn from(n: i64) -> Self { Self::Number(n as f64) }
}

impl From<f64> for Scalar {
  fn from(n: f64) -> Self { Self::Number(n) }
}

impl From<bool> for Scalar {
  fn from(b: bool) -> Self { Self::Flag(b) }
}

/// Inclusive bounds; either side may be open.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Range {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub min: Option<Scalar>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub max: Option<Scalar>,
}

/// What a single field must satisfy.
///
/// Deserialises from JSON as an array (membership), an object with `min`
/// and/or `max` (range), or a bare scalar (equality).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Condition {
  OneOf(Vec<Scalar>),
  Range(Range),
  Equals(Scalar),
}

impl Condition {
  pub fn equals(value: impl Into<Scalar>) -> Self { Self::Equals(value.into()) }

  pub fn one_of<I, S>(values: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<Scalar>,
  {
    Self::OneOf(values.into_iter().map(Into::into).collect())
  }

  pub fn between(min: Option<impl Into<Scalar>>, max: Option<impl Into<Scalar>>) -> Self {
    Self::Range(Range {
      min: min.map(Into::into),
      max: max.map(Into::into),
    })
  }

  fn holds(&self, value: &FieldValue<'_>) -> bool {
    match self {
      Self::Equals(expected) => expected.matches(value),
      Self::OneOf(options) => options.iter().any(|o| o.matches(value)),
      Self::Range(Range { min, max }) => {
        let above_min = min
          .as_ref()
          .is_none_or(|m| m.cmp_value(value).is_some_and(Ordering::is_ge));
        let below_max = max
          .as_ref()
          .is_none_or(|m| m.cmp_value(value).is_some_and(Ordering::is_le));
        above_min && below_max
      }
    }
  }
}

/// Field name → condition, all ANDed together.
///
/// Keys are kept as strings so criteria can be deserialised from untrusted
/// input; a key that names no field matches no record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Criteria(BTreeMap<String, Condition>);

impl Criteria {
  pub fn new() -> Self { Self::default() }

  /// Builder-style insert.
  pub fn with(mut self, field: impl Into<String>, condition: Condition) -> Self {
    self.0.insert(field.into(), condition);
    self
  }

  pub fn insert(&mut self, field: impl Into<String>, condition: Condition) {
    self.0.insert(field.into(), condition);
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  /// Parse criteria from a JSON object such as
  /// `{"country": "Germany", "age": {"min": 60}}`.
  pub fn from_json(input: &str) -> Result<Self> { Ok(serde_json::from_str(input)?) }

  /// `true` if `teacher` satisfies every criterion.
  pub fn matches(&self, teacher: &Teacher) -> bool {
    self.0.iter().all(|(name, condition)| {
      Field::parse(name)
        .ok()
        .and_then(|field| teacher.field(field))
        .is_some_and(|value| condition.holds(&value))
    })
  }
}

/// Records matching every criterion, in input order.
pub fn filter<'a, I>(teachers: I, criteria: &Criteria) -> Vec<&'a Teacher>
where
  I: IntoIterator<Item = &'a Teacher>,
{
  teachers.into_iter().filter(|t| criteria.matches(t)).collect()
}

// ─── Sort ────────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortDirection {
  #[default]
  Asc,
  Desc,
}

impl SortDirection {
  /// Flip between ascending and descending.
  pub fn toggled(self) -> Self {
    match self {
      Self::Asc => Self::Desc,
      Self::Desc => Self::Asc,
    }
  }
}

/// A sort key with direction, written `field` or `field:asc|desc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
  pub field:     Field,
  pub direction: SortDirection,
}

impl SortSpec {
  pub fn new(field: Field, direction: SortDirection) -> Self {
    Self { field, direction }
  }

  /// Clicking the same column flips direction; a new column starts
  /// ascending.
  pub fn select(self, field: Field) -> Self {
    if self.field == field {
      Self::new(field, self.direction.toggled())
    } else {
      Self::new(field, SortDirection::Asc)
    }
  }
}

impl FromStr for SortSpec {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let (name, direction) = match s.split_once(':') {
      Some((name, dir)) => {
        let direction = dir
          .trim()
          .parse()
          .map_err(|_| Error::UnknownDirection(dir.to_owned()))?;
        (name, direction)
      }
      None => (s, SortDirection::Asc),
    };
    Ok(Self::new(Field::parse(name.trim())?, direction))
  }
}

impl fmt::Display for SortSpec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.field, self.direction)
  }
}

fn compare_by(a: &Teacher, b: &Teacher, spec: SortSpec) -> Ordering {
  match (a.field(spec.field), b.field(spec.field)) {
    (Some(x), Some(y)) => {
      let ordering = x.compare(&y);
      match spec.direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
      }
    }
    (Some(_), None) => Ordering::Less,
    (None, Some(_)) => Ordering::Greater,
    (None, None) => Ordering::Equal,
  }
}

/// Stable sort by `spec`. Records missing the field go last in either
/// direction.
pub fn sort_by<'a, I>(teachers: I, spec: SortSpec) -> Vec<&'a Teacher>
where
  I: IntoIterator<Item = &'a Teacher>,
{
  let mut sorted: Vec<&Teacher> = teachers.into_iter().collect();
  sorted.sort_by(|a, b| compare_by(a, b, spec));
  sorted
}

/// Stable sort by field name. An unknown `key` leaves the order unchanged.
pub fn sort<'a, I>(teachers: I, key: &str, direction: SortDirection) -> Vec<&'a Teacher>
where
  I: IntoIterator<Item = &'a Teacher>,
{
  match Field::parse(key) {
    Ok(field) => sort_by(teachers, SortSpec::new(field, direction)),
    Err(_) => {
      tracing::debug!(key, "unknown sort key, keeping input order");
      teachers.into_iter().collect()
    }
  }
}

// ─── Search ──────────────────────────────────────────────────────────────────

/// `true` if the (already lower-cased, trimmed) `needle` occurs in the
/// teacher's full name, note, or decimal age.
fn search_matches(teacher: &Teacher, needle: &str) -> bool {
  teacher.full_name.to_lowercase().contains(needle)
    || teacher.note.to_lowercase().contains(needle)
    || teacher.age.is_some_and(|age| age.to_string().contains(needle))
}

/// Case-insensitive substring search over `full_name`, `note` and `age`.
/// A blank query matches everything.
pub fn search<'a, I>(teachers: I, query: &str) -> Vec<&'a Teacher>
where
  I: IntoIterator<Item = &'a Teacher>,
{
  let needle = query.trim().to_lowercase();
  if needle.is_empty() {
    return teachers.into_iter().collect();
  }
  teachers
    .into_iter()
    .filter(|t| search_matches(t, &needle))
    .collect()
}

// ─── Aggregates ──────────────────────────────────────────────────────────────

/// Percentage of `teachers` matching `criteria`; `0.0` for an empty
/// collection.
pub fn percentage<'a, I>(teachers: I, criteria: &Criteria) -> f64
where
  I: IntoIterator<Item = &'a Teacher>,
{
  let (total, matching) = teachers
    .into_iter()
    .fold((0usize, 0usize), |(total, matching), t| {
      (total + 1, matching + usize::from(criteria.matches(t)))
    });
  if total == 0 {
    return 0.0;
  }
  100.0 * matching as f64 / total as f64
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::tests::teacher;

  fn ages(list: &[&Teacher]) -> Vec<Option<i64>> {
    list.iter().map(|t| t.age).collect()
  }

  fn ids<'a>(list: &[&'a Teacher]) -> Vec<&'a str> {
    list.iter().map(|t| t.id.as_str()).collect()
  }

  // ── Filter ────────────────────────────────────────────────────────────────

  #[test]
  fn range_bounds_are_inclusive() {
    let people: Vec<_> = [17, 18, 30, 31]
      .into_iter()
      .map(|age| teacher(&age.to_string(), "Some One", Some(age)))
      .collect();
    let criteria = Criteria::new().with("age", Condition::between(Some(18), Some(30)));

    assert_eq!(ages(&filter(&people, &criteria)), [Some(18), Some(30)]);
  }

  #[test]
  fn open_ended_range() {
    let people = vec![teacher("a", "A A", Some(59)), teacher("b", "B B", Some(60))];
    let criteria = Criteria::new().with("age", Condition::between(Some(60), None::<i64>));
    assert_eq!(ids(&filter(&people, &criteria)), ["b"]);
  }

  #[test]
  fn scalar_set_and_range_are_anded() {
    let mut a = teacher("a", "Ann", Some(65));
    a.country = Some("Germany".into());
    let mut b = teacher("b", "Bob", Some(65));
    b.country = Some("France".into());
    let mut c = teacher("c", "Cat", Some(40));
    c.country = Some("Germany".into());
    let people = vec![a, b, c];

    let criteria = Criteria::new()
      .with("country", Condition::equals("Germany"))
      .with("age", Condition::between(Some(60), None::<i64>));
    assert_eq!(ids(&filter(&people, &criteria)), ["a"]);

    let set = Criteria::new().with("country", Condition::one_of(["France", "Spain"]));
    assert_eq!(ids(&filter(&people, &set)), ["b"]);
  }

  #[test]
  fn absent_field_excludes_record() {
    let mut with_country = teacher("a", "Ann", Some(30));
    with_country.country = Some("Norway".into());
    let mut without = teacher("b", "Bob", Some(30));
    without.country = None;
    let people = vec![with_country, without];

    let any_country = Criteria::new().with("country", Condition::Range(Range::default()));
    assert_eq!(ids(&filter(&people, &any_country)), ["a"]);
  }

  #[test]
  fn unknown_field_matches_nothing() {
    let people = vec![teacher("a", "Ann", Some(30))];
    let criteria = Criteria::new().with("shoe_size", Condition::equals(42));
    assert!(filter(&people, &criteria).is_empty());
  }

  #[test]
  fn empty_criteria_pass_everything_through() {
    let people = vec![teacher("a", "Ann", Some(30)), teacher("b", "Bob", None)];
    assert_eq!(filter(&people, &Criteria::new()).len(), 2);
  }

  #[test]
  fn flags_and_mismatched_kinds() {
    let mut fav = teacher("a", "Ann", Some(30));
    fav.favorite = true;
    let people = vec![fav, teacher("b", "Bob", Some(30))];

    let favorites = Criteria::new().with("favorite", Condition::equals(true));
    assert_eq!(ids(&filter(&people, &favorites)), ["a"]);

    let wrong_kind = Criteria::new().with("age", Condition::equals("30"));
    assert!(filter(&people, &wrong_kind).is_empty());
  }

  #[test]
  fn criteria_deserialise_from_json() {
    let criteria: Criteria = serde_json::from_value(json!({
      "country": "Germany",
      "gender": ["Male", "Female"],
      "age": { "min": 18, "max": 30 },
      "favorite": false
    }))
    .unwrap();

    let expected = Criteria::new()
      .with("country", Condition::equals("Germany"))
      .with("gender", Condition::one_of(["Male", "Female"]))
      .with("age", Condition::between(Some(18), Some(30)))
      .with("favorite", Condition::equals(false));
    assert_eq!(criteria, expected);
  }

  #[test]
  fn malformed_criteria_json_is_an_error() {
    assert!(matches!(
      Criteria::from_json(r#"{"age": {"least": 3}}"#),
      Err(Error::Serialization(_))
    ));
  }

  // ── Sort ──────────────────────────────────────────────────────────────────

  #[test]
  fn missing_values_sort_last_in_both_directions() {
    let people = vec![
      teacher("a", "A", Some(30)),
      teacher("b", "B", None),
      teacher("c", "C", Some(20)),
    ];

    assert_eq!(ages(&sort(&people, "age", SortDirection::Asc)), [
      Some(20),
      Some(30),
      None
    ]);
    assert_eq!(ages(&sort(&people, "age", SortDirection::Desc)), [
      Some(30),
      Some(20),
      None
    ]);
  }

  #[test]
  fn sort_is_stable() {
    let people = vec![
      teacher("first", "Same", Some(40)),
      teacher("other", "Other", Some(10)),
      teacher("second", "Same", Some(40)),
    ];
    assert_eq!(ids(&sort(&people, "age", SortDirection::Desc)), [
      "first", "second", "other"
    ]);
    assert_eq!(ids(&sort(&people, "full_name", SortDirection::Asc)), [
      "other", "first", "second"
    ]);
  }

  #[test]
  fn strings_sort_case_insensitively() {
    let people = vec![
      teacher("1", "bob", Some(1)),
      teacher("2", "Alice", Some(1)),
      teacher("3", "carol", Some(1)),
    ];
    assert_eq!(ids(&sort(&people, "full_name", SortDirection::Asc)), ["2", "1", "3"]);
  }

  #[test]
  fn unknown_sort_key_is_a_no_op() {
    let people = vec![teacher("b", "B", Some(2)), teacher("a", "A", Some(1))];
    assert_eq!(ids(&sort(&people, "nope", SortDirection::Asc)), ["b", "a"]);
  }

  #[test]
  fn sort_spec_parsing() {
    assert_eq!(
      "age:desc".parse::<SortSpec>().unwrap(),
      SortSpec::new(Field::Age, SortDirection::Desc)
    );
    assert_eq!(
      "full_name".parse::<SortSpec>().unwrap(),
      SortSpec::new(Field::FullName, SortDirection::Asc)
    );
    assert!(matches!("age:sideways".parse::<SortSpec>(), Err(Error::UnknownDirection(_))));
    assert!(matches!("height".parse::<SortSpec>(), Err(Error::UnknownField(_))));
    assert_eq!(SortSpec::new(Field::Age, SortDirection::Desc).to_string(), "age:desc");
  }

  #[test]
  fn selecting_a_column_toggles_direction() {
    let spec = SortSpec::new(Field::FullName, SortDirection::Asc);
    assert_eq!(spec.select(Field::FullName).direction, SortDirection::Desc);
    assert_eq!(spec.select(Field::Age), SortSpec::new(Field::Age, SortDirection::Asc));
  }

  // ── Search ────────────────────────────────────────────────────────────────

  #[test]
  fn search_is_case_insensitive() {
    let people = vec![teacher("1", "John Smith", Some(40)), teacher("2", "Jane Doe", Some(33))];
    assert_eq!(ids(&search(&people, "john")), ["1"]);
    assert_eq!(ids(&search(&people, "  SMITH ")), ["1"]);
  }

  #[test]
  fn search_covers_note_and_age() {
    let mut noted = teacher("1", "Ann", Some(40));
    noted.note = "Loves Chess".into();
    let people = vec![noted, teacher("2", "Bob", Some(33))];

    assert_eq!(ids(&search(&people, "chess")), ["1"]);
    assert_eq!(ids(&search(&people, "33")), ["2"]);
    assert_eq!(search(&people, "").len(), 2);
    assert!(search(&people, "nobody").is_empty());
  }

  #[test]
  fn search_ignores_other_fields() {
    let mut t = teacher("1", "Ann", Some(40));
    t.country = Some("Portugal".into());
    assert!(search(&[t], "portugal").is_empty());
  }

  // ── Percentage ────────────────────────────────────────────────────────────

  #[test]
  fn percentage_boundaries() {
    let criteria = Criteria::new().with("age", Condition::between(Some(20), None::<i64>));
    assert_eq!(percentage(&[], &criteria), 0.0);
    assert_eq!(percentage(&[teacher("1", "A", Some(20))], &criteria), 100.0);
  }

  #[test]
  fn percentage_of_half() {
    let people = vec![teacher("1", "A", Some(50)), teacher("2", "B", Some(20))];
    let criteria = Criteria::new().with("age", Condition::between(Some(40), None::<i64>));
    assert_eq!(percentage(&people, &criteria), 50.0);
  }
}
