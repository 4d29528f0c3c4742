//! Error types for `faculty-core`.
//!
//! The pipeline itself is total; these errors only surface at the
//! [`Directory`](crate::directory::Directory) boundary and when parsing
//! caller-supplied query parameters.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("teacher not found: {0}")]
  TeacherNotFound(String),

  #[error("a teacher with id {0} already exists")]
  DuplicateId(String),

  #[error("teacher {id:?} rejected: {}", reasons.join("; "))]
  Rejected { id: String, reasons: Vec<String> },

  #[error("unknown teacher field: {0:?}")]
  UnknownField(String),

  #[error("unknown sort direction: {0:?}")]
  UnknownDirection(String),

  #[error("invalid age bracket: {0:?}")]
  InvalidAgeBracket(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
