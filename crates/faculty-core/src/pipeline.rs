//! Pipeline entry point: both raw sources in, validated teachers out.

use rand::Rng;

use crate::{
  config::PipelineConfig,
  merge::merge_all,
  raw::RawRecord,
  teacher::Teacher,
  validate::filter_valid,
};

/// Merge, normalise and validate both sources.
///
/// The result has unique ids, every record passes validation under
/// `config.validation`, and its order depends only on the input order.
/// `rng` only influences generated `course`, `bg_color` and `favorite`
/// values.
pub fn build_teacher_directory<R: Rng + ?Sized>(
  generated: &[RawRecord],
  local: &[RawRecord],
  config: &PipelineConfig,
  rng: &mut R,
) -> Vec<Teacher> {
  let merged = merge_all(
    generated,
    local,
    config.merge_order,
    &config.defaults(),
    rng,
  );
  let merged_count = merged.len();
  let valid = filter_valid(merged, config.validation);

  tracing::info!(
    generated = generated.len(),
    local = local.len(),
    merged = merged_count,
    valid = valid.len(),
    "teacher directory built"
  );
  valid
}
