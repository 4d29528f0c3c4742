//! Layered configuration: TOML file, then `FACULTY_*` environment variables,
//! then command-line flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use faculty_core::{config::PipelineConfig, merge::MergeOrder, validate::ValidationMode};

/// Everything the binary needs before it can build the directory.
#[derive(Debug, Clone)]
pub struct Settings {
  pub generated: Option<PathBuf>,
  pub local:     Option<PathBuf>,
  pub pipeline:  PipelineConfig,
}

/// Values given on the command line; each one overrides the file and
/// environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
  pub generated:   Option<PathBuf>,
  pub local:       Option<PathBuf>,
  pub seed:        Option<u64>,
  pub merge_order: Option<MergeOrder>,
  pub strict:      bool,
}

impl Settings {
  pub fn load(config_path: &Path, overrides: Overrides) -> Result<Self> {
    let raw = config::Config::builder()
      .add_source(config::File::from(config_path).required(false))
      .add_source(config::Environment::with_prefix("FACULTY").try_parsing(true))
      .build()
      .with_context(|| format!("failed to read config from {}", config_path.display()))?;

    let mut pipeline: PipelineConfig = raw
      .clone()
      .try_deserialize()
      .context("failed to deserialise pipeline settings")?;

    if overrides.seed.is_some() {
      pipeline.seed = overrides.seed;
    }
    if let Some(order) = overrides.merge_order {
      pipeline.merge_order = order;
    }
    if overrides.strict {
      pipeline.validation = ValidationMode::Strict;
    }

    let path = |key: &str| raw.get_string(key).ok().map(PathBuf::from);
    Ok(Self {
      generated: overrides.generated.or_else(|| path("generated")),
      local: overrides.local.or_else(|| path("local")),
      pipeline,
    })
  }
}
