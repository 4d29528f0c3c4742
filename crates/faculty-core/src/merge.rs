//! Deduplication and merge of raw records from both sources.
//!
//! Records are grouped by identity key in first-seen order. Within a group the
//! normalised drafts are folded left to right with
//! [`TeacherDraft::overlay`], so a later source refines an earlier one field
//! by field instead of replacing it wholesale. Defaults are generated only
//! once per merged group.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{
  normalize::{Defaults, TeacherDraft},
  raw::RawRecord,
  teacher::Teacher,
};

/// Which source is concatenated first, and therefore which one a later
/// duplicate overrides.
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum MergeOrder {
  /// Generated people first, local records after (local overrides).
  #[default]
  GeneratedFirst,
  /// Local records first, newest entry leading, then generated people.
  LocalFirst,
}

impl MergeOrder {
  fn concat<'a>(
    self,
    generated: &'a [RawRecord],
    local: &'a [RawRecord],
  ) -> Vec<&'a RawRecord> {
    match self {
      Self::GeneratedFirst => generated.iter().chain(local).collect(),
      Self::LocalFirst => local.iter().rev().chain(generated).collect(),
    }
  }
}

/// Group drafts by identity key, preserving first-seen order.
pub fn merge_drafts<'a, I>(records: I) -> Vec<TeacherDraft>
where
  I: IntoIterator<Item = &'a RawRecord>,
{
  let mut positions: HashMap<String, usize> = HashMap::new();
  let mut drafts: Vec<TeacherDraft> = Vec::new();
  let mut dropped = 0usize;

  for record in records {
    let Some(key) = record.identity() else {
      dropped += 1;
      tracing::debug!(?record, "dropping record without identity key");
      continue;
    };

    let mut draft = TeacherDraft::from_raw(record);
    draft.id = Some(key.to_owned());

    match positions.get(key) {
      Some(&index) => {
        let earlier = std::mem::take(&mut drafts[index]);
        drafts[index] = earlier.overlay(draft);
      }
      None => {
        positions.insert(key.to_owned(), drafts.len());
        drafts.push(draft);
      }
    }
  }

  if dropped > 0 {
    tracing::info!(dropped, "records without identity key were skipped");
  }
  drafts
}

/// Merge both sources into canonical teachers with unique ids.
pub fn merge_all<R: Rng + ?Sized>(
  generated: &[RawRecord],
  local: &[RawRecord],
  order: MergeOrder,
  defaults: &Defaults,
  rng: &mut R,
) -> Vec<Teacher> {
  let combined = order.concat(generated, local);
  let total = combined.len();

  let teachers: Vec<Teacher> = merge_drafts(combined)
    .into_iter()
    .map(|draft| draft.finish(defaults, rng))
    .collect();

  tracing::info!(
    input = total,
    merged = teachers.len(),
    %order,
    "merged teacher sources"
  );
  teachers
}
