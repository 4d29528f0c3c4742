//! Pipeline configuration.
//!
//! Deserialised by the binary from `faculty.toml` and `FACULTY_*` environment
//! variables; every field has a default so an empty source is valid.

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
  merge::MergeOrder,
  normalize::{DEFAULT_NOTE, Defaults},
  validate::ValidationMode,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
  /// Seed for generated defaults. `None` draws from OS entropy.
  pub seed:                 Option<u64>,
  pub favorite_probability: f64,
  pub default_note:         String,
  pub merge_order:          MergeOrder,
  pub validation:           ValidationMode,
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self {
      seed:                 None,
      favorite_probability: 0.2,
      default_note:         DEFAULT_NOTE.to_owned(),
      merge_order:          MergeOrder::default(),
      validation:           ValidationMode::default(),
    }
  }
}

impl PipelineConfig {
  pub fn defaults(&self) -> Defaults {
    Defaults {
      favorite_probability: self.favorite_probability,
      note:                 self.default_note.clone(),
    }
  }

  /// The generator for default values: seeded when `seed` is set.
  pub fn rng(&self) -> StdRng {
    match self.seed {
      Some(seed) => StdRng::seed_from_u64(seed),
      None => StdRng::from_entropy(),
    }
  }
}
