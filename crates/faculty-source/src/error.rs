//! Error types for the faculty-source payload codec.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("payload must be an array or an object with a `results` array, got {0}")]
  UnexpectedShape(&'static str),

  #[error("entry {index} is not a JSON object")]
  NotAnObject { index: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
