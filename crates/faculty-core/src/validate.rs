//! Validation rules for canonical teacher records.
//!
//! Every rule is checked independently and all violations are collected.
//! Validation never fails the pipeline: invalid records are partitioned out
//! and reported through `tracing`.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

use crate::{normalize::digits_only, teacher::Teacher};

/// Minimum number of digits a phone number must keep after normalisation.
pub const MIN_PHONE_DIGITS: usize = 5;

/// How strict the validator is.
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
pub enum ValidationMode {
  /// Name, age, email and phone rules.
  #[default]
  Standard,
  /// Standard rules plus capitalisation of `city`, `state`, `country`,
  /// `gender` and `note` when they are present.
  Strict,
}

/// A single rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
  #[error("field 'full_name' must be a non-empty string")]
  EmptyFullName,

  #[error("field 'age' must be a non-negative integer")]
  MissingAge,

  #[error("field 'age' must be non-negative, got {0}")]
  NegativeAge(i64),

  #[error("field 'email' has an invalid format")]
  InvalidEmail,

  #[error("field 'phone' is too short ({digits} digits, need at least 5)")]
  PhoneTooShort { digits: usize },

  #[error("field '{0}' must start with an upper-case letter")]
  NotCapitalized(&'static str),
}

/// The outcome of [`validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
  pub violations: Vec<Violation>,
}

impl Validation {
  pub fn is_valid(&self) -> bool { self.violations.is_empty() }

  /// Human-readable reasons, one per violation.
  pub fn errors(&self) -> Vec<String> {
    self.violations.iter().map(ToString::to_string).collect()
  }
}

/// `local@domain.tld`: exactly one `@`, no whitespace, a non-empty local part
/// and a dotted domain without empty labels.
pub fn is_valid_email(email: &str) -> bool {
  if email.chars().any(char::is_whitespace) {
    return false;
  }
  let Some((local, domain)) = email.split_once('@') else {
    return false;
  };
  !local.is_empty()
    && !domain.contains('@')
    && domain.contains('.')
    && domain.split('.').all(|label| !label.is_empty())
}

fn starts_uppercase(s: &str) -> bool {
  s.chars().next().is_some_and(char::is_uppercase)
}

/// Check `teacher` against every rule of `mode`.
pub fn validate(teacher: &Teacher, mode: ValidationMode) -> Validation {
  let mut violations = Vec::new();

  if teacher.full_name.trim().is_empty() {
    violations.push(Violation::EmptyFullName);
  }

  match teacher.age {
    None => violations.push(Violation::MissingAge),
    Some(age) if age < 0 => violations.push(Violation::NegativeAge(age)),
    Some(_) => {}
  }

  if !teacher.email.as_deref().is_some_and(is_valid_email) {
    violations.push(Violation::InvalidEmail);
  }

  let digits = digits_only(&teacher.phone).len();
  if digits < MIN_PHONE_DIGITS {
    violations.push(Violation::PhoneTooShort { digits });
  }

  if mode == ValidationMode::Strict {
    let optional = [
      ("city", teacher.city.as_deref()),
      ("state", teacher.state.as_deref()),
      ("country", teacher.country.as_deref()),
      ("gender", teacher.gender.as_deref()),
      ("note", Some(teacher.note.as_str())),
    ];
    for (name, value) in optional {
      if let Some(value) = value.filter(|v| !v.is_empty())
        && !starts_uppercase(value)
      {
        violations.push(Violation::NotCapitalized(name));
      }
    }
  }

  Validation { violations }
}

// ─── Partitioning ────────────────────────────────────────────────────────────

/// A record excluded by validation, with the reasons.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
  pub teacher: Teacher,
  pub errors:  Vec<String>,
}

/// Valid and rejected records, each in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
  pub valid:    Vec<Teacher>,
  pub rejected: Vec<Rejection>,
}

/// Normalise every phone number, then split the collection into valid and
/// rejected records.
pub fn partition_valid(teachers: Vec<Teacher>, mode: ValidationMode) -> Partition {
  let mut partition = Partition::default();
  for mut teacher in teachers {
    teacher.phone = digits_only(&teacher.phone);
    let outcome = validate(&teacher, mode);
    if outcome.is_valid() {
      partition.valid.push(teacher);
    } else {
      partition.rejected.push(Rejection {
        teacher,
        errors: outcome.errors(),
      });
    }
  }
  partition
}

/// Keep only valid records, logging a warning for each one removed.
pub fn filter_valid(teachers: Vec<Teacher>, mode: ValidationMode) -> Vec<Teacher> {
  let Partition { valid, rejected } = partition_valid(teachers, mode);
  for rejection in &rejected {
    tracing::warn!(
      id = %rejection.teacher.id,
      full_name = %rejection.teacher.full_name,
      reasons = %rejection.errors.join("; "),
      "teacher failed validation and was removed"
    );
  }
  valid
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tests::teacher;

  #[test]
  fn well_formed_teacher_passes() {
    let t = teacher("1", "John Smith", Some(40));
    let outcome = validate(&t, ValidationMode::Strict);
    assert!(outcome.is_valid(), "{:?}", outcome.errors());
  }

  #[test]
  fn all_violations_are_collected() {
    let mut t = teacher("1", "  ", Some(-4));
    t.email = Some("not-an-email".into());
    t.phone = "12".into();

    let outcome = validate(&t, ValidationMode::Standard);
    assert_eq!(
      outcome.violations,
      vec![
        Violation::EmptyFullName,
        Violation::NegativeAge(-4),
        Violation::InvalidEmail,
        Violation::PhoneTooShort { digits: 2 },
      ]
    );
    assert_eq!(outcome.errors().len(), 4);
  }

  #[test]
  fn missing_age_is_rejected() {
    let t = teacher("1", "Jane Roe", None);
    assert_eq!(validate(&t, ValidationMode::Standard).violations, vec![
      Violation::MissingAge
    ]);
  }

  #[test]
  fn zero_age_is_allowed() {
    assert!(validate(&teacher("1", "Baby Doe", Some(0)), ValidationMode::Standard).is_valid());
  }

  #[test]
  fn email_format() {
    assert!(is_valid_email("a@b.co"));
    assert!(is_valid_email("first.last@mail.example.org"));
    assert!(!is_valid_email("a@b"));
    assert!(!is_valid_email("@b.co"));
    assert!(!is_valid_email("a@@b.co"));
    assert!(!is_valid_email("a@b@c.co"));
    assert!(!is_valid_email("a@.co"));
    assert!(!is_valid_email("a@b."));
    assert!(!is_valid_email("a b@c.co"));
  }

  #[test]
  fn phone_is_judged_after_stripping() {
    let mut t = teacher("1", "John Smith", Some(30));
    t.phone = "+1 (555) 123-4567".into();
    assert!(validate(&t, ValidationMode::Standard).is_valid());

    t.phone = "(1-2-3-4)".into();
    assert_eq!(validate(&t, ValidationMode::Standard).violations, vec![
      Violation::PhoneTooShort { digits: 4 }
    ]);
  }

  #[test]
  fn strict_mode_checks_capitalisation() {
    let mut t = teacher("1", "John Smith", Some(30));
    t.city = Some("berlin".into());
    t.gender = Some(String::new());
    t.state = None;

    assert!(validate(&t, ValidationMode::Standard).is_valid());
    assert_eq!(validate(&t, ValidationMode::Strict).violations, vec![
      Violation::NotCapitalized("city")
    ]);
  }

  #[test]
  fn validation_is_idempotent() {
    let mut t = teacher("1", "", Some(12));
    t.email = None;
    let first = validate(&t, ValidationMode::Strict);
    let second = validate(&t, ValidationMode::Strict);
    assert_eq!(first, second);
  }

  #[test]
  fn partition_normalises_phone_and_keeps_order() {
    let mut good = teacher("a", "Ann Lee", Some(30));
    good.phone = "+1 (555) 123-4567".into();
    let bad = teacher("b", "", Some(30));
    let also_good = teacher("c", "Cy Young", Some(60));

    let Partition { valid, rejected } = partition_valid(
      vec![good, bad.clone(), also_good],
      ValidationMode::Standard,
    );

    assert_eq!(valid.len(), 2);
    assert_eq!(valid[0].phone, "15551234567");
    assert_eq!(valid[1].id, "c");
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].teacher, bad);
    assert_eq!(rejected[0].errors, vec![Violation::EmptyFullName.to_string()]);
  }

  #[test]
  fn filter_valid_drops_invalid_records() {
    let out = filter_valid(
      vec![teacher("a", "Ann Lee", Some(30)), teacher("b", "Bo", None)],
      ValidationMode::Standard,
    );
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].id, "a");
  }
}
