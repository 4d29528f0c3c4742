//! Aggregate statistics over a teacher collection.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Datelike, NaiveDate};
use serde::Serialize;

use crate::teacher::Teacher;

/// Label used for records without a country.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// Number of teachers in one country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryCount {
  pub country: String,
  pub count:   usize,
}

/// Teachers per country, in first-seen order.
pub fn country_distribution<'a, I>(teachers: I) -> Vec<CountryCount>
where
  I: IntoIterator<Item = &'a Teacher>,
{
  let mut positions: HashMap<&str, usize> = HashMap::new();
  let mut counts: Vec<CountryCount> = Vec::new();

  for teacher in teachers {
    let country = teacher
      .country
      .as_deref()
      .filter(|c| !c.is_empty())
      .unwrap_or(UNKNOWN_COUNTRY);
    match positions.get(country) {
      Some(&i) => counts[i].count += 1,
      None => {
        positions.insert(country, counts.len());
        counts.push(CountryCount {
          country: country.to_owned(),
          count:   1,
        });
      }
    }
  }
  counts
}

/// Sorted, de-duplicated countries, skipping records without one.
pub fn distinct_countries<'a, I>(teachers: I) -> Vec<String>
where
  I: IntoIterator<Item = &'a Teacher>,
{
  teachers
    .into_iter()
    .filter_map(|t| t.country.as_deref())
    .filter(|c| !c.is_empty())
    .collect::<BTreeSet<_>>()
    .into_iter()
    .map(str::to_owned)
    .collect()
}

/// Records marked as favourites, in input order.
pub fn favorites<'a, I>(teachers: I) -> Vec<&'a Teacher>
where
  I: IntoIterator<Item = &'a Teacher>,
{
  teachers.into_iter().filter(|t| t.favorite).collect()
}

/// Average age per (country, gender) cell, for the pivot view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeCell {
  pub country:     String,
  pub gender:      String,
  pub count:       usize,
  pub average_age: f64,
}

/// Average age grouped by country then gender, sorted by both. Records
/// without an age are ignored.
pub fn age_pivot<'a, I>(teachers: I) -> Vec<AgeCell>
where
  I: IntoIterator<Item = &'a Teacher>,
{
  let mut cells: BTreeMap<(String, String), (usize, i128)> = BTreeMap::new();

  for teacher in teachers {
    let Some(age) = teacher.age else { continue };
    let country = teacher.country.clone().unwrap_or_else(|| UNKNOWN_COUNTRY.to_owned());
    let gender = teacher.gender.clone().unwrap_or_default();
    let cell = cells.entry((country, gender)).or_default();
    cell.0 += 1;
    cell.1 += i128::from(age);
  }

  cells
    .into_iter()
    .map(|((country, gender), (count, total))| AgeCell {
      country,
      gender,
      count,
      average_age: total as f64 / count as f64,
    })
    .collect()
}

// ─── Birthdays ───────────────────────────────────────────────────────────────

/// Parse a birth date given as `YYYY-MM-DD` or an RFC 3339 date-time.
pub fn parse_birth_date(b_date: &str) -> Option<NaiveDate> {
  let s = b_date.trim();
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.date_naive())
    .ok()
    .or_else(|| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
    .or_else(|| s.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
}

/// The birthday falling in `year`. 29 February maps to 1 March in common
/// years.
fn birthday_in(birth: NaiveDate, year: i32) -> Option<NaiveDate> {
  NaiveDate::from_ymd_opt(year, birth.month(), birth.day())
    .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
}

/// Days from `today` until the next birthday; `0` on the birthday itself.
/// `None` if `b_date` cannot be parsed.
pub fn days_until_birthday(b_date: &str, today: NaiveDate) -> Option<i64> {
  let birth = parse_birth_date(b_date)?;
  let mut next = birthday_in(birth, today.year())?;
  if next < today {
    next = birthday_in(birth, today.year() + 1)?;
  }
  Some((next - today).num_days())
}
