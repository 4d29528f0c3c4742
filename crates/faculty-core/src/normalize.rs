//! Field normaliser: source-shaped [`RawRecord`] → canonical [`Teacher`].
//!
//! Normalisation happens in two steps so that duplicates can be merged before
//! any defaults are generated:
//!
//!   RawRecord
//!     └─ TeacherDraft::from_raw()  → every canonical field as an `Option`
//!          └─ TeacherDraft::overlay() (merge only)
//!               └─ TeacherDraft::finish() → Teacher, defaults filled in
//!
//! [`normalize`] runs both steps for a single record.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
  raw::{GeneratedPerson, LocalRecord, RawRecord},
  teacher::{COURSES, Coordinates, Teacher, Timezone},
};

/// Placeholder note for records that arrive without one.
pub const DEFAULT_NOTE: &str = "A brief note about this teacher.";

// ─── String helpers ──────────────────────────────────────────────────────────

/// Upper-case the first character, leaving the rest untouched.
pub fn capitalize(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

/// Strip every non-digit character.
pub fn digits_only(s: &str) -> String {
  s.chars().filter(char::is_ascii_digit).collect()
}

/// `true` for `#` followed by exactly six hex digits.
pub fn is_hex_color(s: &str) -> bool {
  s.strip_prefix('#')
    .is_some_and(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

// ─── Defaults ────────────────────────────────────────────────────────────────

/// Policy for generated default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
  /// Probability that a record without an explicit `favorite` is marked as
  /// one.
  pub favorite_probability: f64,
  pub note:                 String,
}

impl Default for Defaults {
  fn default() -> Self {
    Self {
      favorite_probability: 0.2,
      note:                 DEFAULT_NOTE.to_owned(),
    }
  }
}

impl Defaults {
  pub fn random_course<R: Rng + ?Sized>(rng: &mut R) -> String {
    COURSES[rng.gen_range(0..COURSES.len())].to_owned()
  }

  pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("#{:06x}", rng.gen_range(0..=0xFF_FFFFu32))
  }

  pub fn random_favorite<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
    let p = self.favorite_probability;
    let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
    rng.gen_bool(p)
  }
}

// ─── TeacherDraft ────────────────────────────────────────────────────────────

/// A teacher record where every field may still be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeacherDraft {
  pub id:                Option<String>,
  pub gender:            Option<String>,
  pub title:             Option<String>,
  pub full_name:         Option<String>,
  pub city:              Option<String>,
  pub state:             Option<String>,
  pub country:           Option<String>,
  pub postcode:          Option<String>,
  pub coordinates:       Option<Coordinates>,
  pub timezone:          Option<Timezone>,
  pub email:             Option<String>,
  pub b_date:            Option<String>,
  pub age:               Option<i64>,
  pub phone:             Option<String>,
  pub picture_large:     Option<String>,
  pub picture_thumbnail: Option<String>,
  pub favorite:          Option<bool>,
  pub course:            Option<String>,
  pub bg_color:          Option<String>,
  pub note:              Option<String>,
}

fn cap(s: &Option<String>) -> Option<String> {
  s.as_deref().map(capitalize)
}

impl TeacherDraft {
  /// Copy every canonical field out of `raw`, capitalising names and places
  /// and stripping the phone number down to digits.
  pub fn from_raw(raw: &RawRecord) -> Self {
    match raw {
      RawRecord::Generated(person) => Self::from_generated(person),
      RawRecord::Local(record) => Self::from_local(record),
    }
  }

  fn from_generated(p: &GeneratedPerson) -> Self {
    let name = p.name.clone().unwrap_or_default();
    let location = p.location.clone().unwrap_or_default();
    let dob = p.dob.clone().unwrap_or_default();
    let picture = p.picture.clone().unwrap_or_default();

    let full_name = [&name.first, &name.last]
      .into_iter()
      .flatten()
      .map(|part| capitalize(part.trim()))
      .collect::<Vec<_>>()
      .join(" ");

    Self {
      id: p.login.as_ref().and_then(|l| l.uuid.clone()),
      gender: cap(&p.gender),
      title: name.title,
      full_name: (!full_name.is_empty()).then_some(full_name),
      city: cap(&location.city),
      state: cap(&location.state),
      country: cap(&location.country),
      postcode: location.postcode,
      coordinates: location.coordinates,
      timezone: location.timezone,
      email: p.email.clone(),
      b_date: dob.date,
      age: dob.age,
      phone: p.phone.as_deref().map(digits_only),
      picture_large: picture.large,
      picture_thumbnail: picture.thumbnail,
      favorite: None,
      course: None,
      bg_color: None,
      note: None,
    }
  }

  fn from_local(r: &LocalRecord) -> Self {
    Self {
      id: r.id.clone(),
      gender: cap(&r.gender),
      title: r.title.clone(),
      full_name: r.full_name.as_deref().map(|n| capitalize(n.trim())),
      city: cap(&r.city),
      state: cap(&r.state),
      country: cap(&r.country),
      postcode: r.postcode.clone(),
      coordinates: r.coordinates.clone(),
      timezone: r.timezone.clone(),
      email: r.email.clone(),
      b_date: r.b_day.clone().or_else(|| r.b_date.clone()),
      age: r.age,
      phone: r.phone.as_deref().map(digits_only),
      picture_large: r.picture_large.clone(),
      picture_thumbnail: r.picture_thumbnail.clone(),
      favorite: r.favorite,
      course: r.course.clone(),
      bg_color: r.bg_color.clone().filter(|c| is_hex_color(c)),
      note: r.note.clone(),
    }
  }

  /// Field-level override: every field present in `later` replaces the value
  /// in `self`; fields absent in `later` keep the earlier value.
  pub fn overlay(self, later: TeacherDraft) -> TeacherDraft {
    TeacherDraft {
      id:                later.id.or(self.id),
      gender:            later.gender.or(self.gender),
      title:             later.title.or(self.title),
      full_name:         later.full_name.or(self.full_name),
      city:              later.city.or(self.city),
      state:             later.state.or(self.state),
      country:           later.country.or(self.country),
      postcode:          later.postcode.or(self.postcode),
      coordinates:       later.coordinates.or(self.coordinates),
      timezone:          later.timezone.or(self.timezone),
      email:             later.email.or(self.email),
      b_date:            later.b_date.or(self.b_date),
      age:               later.age.or(self.age),
      phone:             later.phone.or(self.phone),
      picture_large:     later.picture_large.or(self.picture_large),
      picture_thumbnail: later.picture_thumbnail.or(self.picture_thumbnail),
      favorite:          later.favorite.or(self.favorite),
      course:            later.course.or(self.course),
      bg_color:          later.bg_color.or(self.bg_color),
      note:              later.note.or(self.note),
    }
  }

  /// Produce the canonical record, generating `course`, `bg_color`,
  /// `favorite` and `note` where they are still missing.
  ///
  /// Defaults are drawn in a fixed order so a seeded `rng` yields the same
  /// record every time.
  pub fn finish<R: Rng + ?Sized>(
    self,
    defaults: &Defaults,
    rng: &mut R,
  ) -> Teacher {
    let favorite = match self.favorite {
      Some(f) => f,
      None => defaults.random_favorite(rng),
    };
    let course = match self.course {
      Some(c) => c,
      None => Defaults::random_course(rng),
    };
    let bg_color = match self.bg_color {
      Some(c) => c,
      None => Defaults::random_color(rng),
    };

    Teacher {
      id: self.id.unwrap_or_default(),
      gender: self.gender,
      title: self.title,
      full_name: self.full_name.unwrap_or_default(),
      city: self.city,
      state: self.state,
      country: self.country,
      postcode: self.postcode,
      coordinates: self.coordinates,
      timezone: self.timezone,
      email: self.email,
      b_date: self.b_date,
      age: self.age,
      phone: self.phone.unwrap_or_default(),
      picture_large: self.picture_large,
      picture_thumbnail: self.picture_thumbnail,
      favorite,
      course,
      bg_color,
      note: self.note.unwrap_or_else(|| defaults.note.clone()),
    }
  }
}

/// Normalise a single raw record into a canonical teacher.
pub fn normalize<R: Rng + ?Sized>(
  raw: &RawRecord,
  defaults: &Defaults,
  rng: &mut R,
) -> Teacher {
  TeacherDraft::from_raw(raw).finish(defaults, rng)
}

#[cfg(test)]
mod tests {
  use rand::{SeedableRng, rngs::StdRng};
  use serde_json::json;

  use super::*;

  fn raw(value: serde_json::Value) -> RawRecord {
    RawRecord::from_value(value).unwrap()
  }

  fn rng() -> StdRng { StdRng::seed_from_u64(7) }

  #[test]
  fn capitalize_only_touches_first_char() {
    assert_eq!(capitalize("berlin"), "Berlin");
    assert_eq!(capitalize("new york"), "New york");
    assert_eq!(capitalize("élodie"), "Élodie");
    assert_eq!(capitalize(""), "");
  }

  #[test]
  fn phone_is_reduced_to_digits() {
    assert_eq!(digits_only("+1 (555) 123-4567"), "15551234567");
    assert_eq!(digits_only("ext."), "");
  }

  #[test]
  fn generated_person_maps_nested_fields() {
    let t = normalize(
      &raw(json!({
        "gender": "female",
        "login": { "uuid": "abc" },
        "name": { "title": "Mrs", "first": "maria", "last": "schmidt" },
        "location": {
          "city": "hamburg", "state": "hamburg", "country": "germany",
          "postcode": 20095,
          "coordinates": { "latitude": "53.55", "longitude": "9.99" },
          "timezone": { "offset": "+1:00", "description": "Berlin" }
        },
        "email": "maria@example.com",
        "dob": { "date": "1970-03-01T10:00:00.000Z", "age": 54 },
        "phone": "0171-555 12 34",
        "picture": { "large": "l.jpg", "thumbnail": "t.jpg" }
      })),
      &Defaults::default(),
      &mut rng(),
    );

    assert_eq!(t.id, "abc");
    assert_eq!(t.full_name, "Maria Schmidt");
    assert_eq!(t.gender.as_deref(), Some("Female"));
    assert_eq!(t.title.as_deref(), Some("Mrs"));
    assert_eq!(t.city.as_deref(), Some("Hamburg"));
    assert_eq!(t.country.as_deref(), Some("Germany"));
    assert_eq!(t.postcode.as_deref(), Some("20095"));
    assert_eq!(t.timezone.unwrap().offset, "+1:00");
    assert_eq!(t.b_date.as_deref(), Some("1970-03-01T10:00:00.000Z"));
    assert_eq!(t.age, Some(54));
    assert_eq!(t.phone, "01715551234");
    assert_eq!(t.picture_thumbnail.as_deref(), Some("t.jpg"));
    assert_eq!(t.note, DEFAULT_NOTE);
    assert!(COURSES.contains(&t.course.as_str()));
    assert!(is_hex_color(&t.bg_color));
  }

  #[test]
  fn local_record_keeps_explicit_values() {
    let t = normalize(
      &raw(json!({
        "id": "L1",
        "full_name": "ada lovelace",
        "city": "london",
        "b_day": "1815-12-10",
        "age": 36,
        "phone": "(020) 7946-0018",
        "favorite": false,
        "course": "Mathematics",
        "bg_color": "#1f2e3d",
        "note": "Wrote the first program."
      })),
      &Defaults::default(),
      &mut rng(),
    );

    assert_eq!(t.full_name, "Ada lovelace");
    assert_eq!(t.city.as_deref(), Some("London"));
    assert_eq!(t.b_date.as_deref(), Some("1815-12-10"));
    assert_eq!(t.phone, "02079460018");
    assert!(!t.favorite);
    assert_eq!(t.course, "Mathematics");
    assert_eq!(t.bg_color, "#1f2e3d");
    assert_eq!(t.note, "Wrote the first program.");
  }

  #[test]
  fn local_b_date_is_an_alias_for_b_day() {
    let t = normalize(
      &raw(json!({ "id": "L2", "b_date": "2000-01-01" })),
      &Defaults::default(),
      &mut rng(),
    );
    assert_eq!(t.b_date.as_deref(), Some("2000-01-01"));
  }

  #[test]
  fn malformed_color_is_regenerated() {
    let t = normalize(
      &raw(json!({ "id": "L3", "bg_color": "red" })),
      &Defaults::default(),
      &mut rng(),
    );
    assert_ne!(t.bg_color, "red");
    assert!(is_hex_color(&t.bg_color));
  }

  #[test]
  fn missing_required_fields_stay_empty() {
    let t = normalize(&raw(json!({ "id": "L4" })), &Defaults::default(), &mut rng());
    assert_eq!(t.full_name, "");
    assert_eq!(t.phone, "");
    assert_eq!(t.age, None);
    assert_eq!(t.email, None);
  }

  #[test]
  fn defaults_are_deterministic_for_a_seed() {
    let input = raw(json!({ "id": "same" }));
    let a = normalize(&input, &Defaults::default(), &mut rng());
    let b = normalize(&input, &Defaults::default(), &mut rng());
    assert_eq!(a, b);
  }

  #[test]
  fn favorite_probability_extremes() {
    let input = raw(json!({ "id": "fav" }));
    let always = Defaults { favorite_probability: 1.0, ..Defaults::default() };
    let never = Defaults { favorite_probability: f64::NAN, ..Defaults::default() };
    assert!(normalize(&input, &always, &mut rng()).favorite);
    assert!(!normalize(&input, &never, &mut rng()).favorite);
  }

  #[test]
  fn colors_are_always_six_digits() {
    let mut rng = rng();
    for _ in 0..500 {
      assert!(is_hex_color(&Defaults::random_color(&mut rng)));
    }
  }

  #[test]
  fn overlay_prefers_later_present_fields() {
    let earlier = TeacherDraft {
      id: Some("1".into()),
      course: Some("Math".into()),
      bg_color: Some("#000000".into()),
      ..TeacherDraft::default()
    };
    let later = TeacherDraft {
      id: Some("1".into()),
      course: Some("Art".into()),
      ..TeacherDraft::default()
    };

    let merged = earlier.overlay(later);
    assert_eq!(merged.course.as_deref(), Some("Art"));
    assert_eq!(merged.bg_color.as_deref(), Some("#000000"));
  }
}
