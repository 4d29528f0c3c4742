//! `faculty`: build and query a teacher directory from two JSON payloads.
//!
//! # Usage
//!
//! ```text
//! faculty --generated people.json --local teachers.json list --country Germany --sort age:desc
//! faculty --seed 7 percentage --where '{"age": {"min": 40}}'
//! faculty --config faculty.toml stats
//! ```
//!
//! Results are printed to stdout as JSON; logs go to stderr.

mod commands;
mod settings;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use faculty_core::{directory::Directory, merge::MergeOrder, raw::RawRecord};
use settings::{Overrides, Settings};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "faculty", version, about = "Build and query a teacher directory")]
struct Cli {
  /// Path to a TOML config file.
  #[arg(short, long, default_value = "faculty.toml")]
  config: PathBuf,

  /// Payload from the random-person generator.
  #[arg(long, value_name = "FILE")]
  generated: Option<PathBuf>,

  /// Payload from the local teacher dataset.
  #[arg(long, value_name = "FILE")]
  local: Option<PathBuf>,

  /// Seed for generated course, colour and favourite defaults.
  #[arg(long, env = "FACULTY_SEED")]
  seed: Option<u64>,

  /// Which source comes first when merging.
  #[arg(long, value_parser = parse_merge_order)]
  merge_order: Option<MergeOrder>,

  /// Also require capitalised city, state, country, gender and note.
  #[arg(long)]
  strict: bool,

  #[command(subcommand)]
  command: commands::Command,
}

fn parse_merge_order(s: &str) -> Result<MergeOrder, String> {
  s.parse()
    .map_err(|_| format!("expected generated_first or local_first, got {s:?}"))
}

// ─── Entry point ──────────────────────────────────────────────────────────────

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = Settings::load(&cli.config, Overrides {
    generated:   cli.generated,
    local:       cli.local,
    seed:        cli.seed,
    merge_order: cli.merge_order,
    strict:      cli.strict,
  })?;

  let generated = load_source(settings.generated.as_deref(), "generated")?;
  let local = load_source(settings.local.as_deref(), "local")?;

  let mut directory = Directory::build(&generated, &local, &settings.pipeline);
  tracing::info!(teachers = directory.len(), "directory ready");

  commands::run(cli.command, &mut directory)
}

/// Read and decode one payload file. A source that is not configured is
/// treated as empty.
fn load_source(path: Option<&Path>, label: &str) -> Result<Vec<RawRecord>> {
  let Some(path) = path else {
    tracing::warn!(source = label, "no payload configured, treating as empty");
    return Ok(Vec::new());
  };

  let text = std::fs::read_to_string(path)
    .with_context(|| format!("reading {label} payload {}", path.display()))?;
  let payload = faculty_source::decode(&text)
    .with_context(|| format!("decoding {label} payload {}", path.display()))?;

  for error in payload.errors() {
    tracing::warn!(source = label, %error, "skipping payload entry");
  }
  if let Some(info) = &payload.info {
    tracing::debug!(source = label, ?info, "payload envelope");
  }
  Ok(payload.into_records())
}
