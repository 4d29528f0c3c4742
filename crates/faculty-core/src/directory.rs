//! The in-memory teacher directory.
//!
//! [`Directory`] owns the validated collection produced by the pipeline and is
//! the only place it is mutated. Two mutations exist: toggling `favorite` and
//! adding a teacher from a form. Everything else is a read-only query.

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  config::PipelineConfig,
  lenient,
  normalize::{Defaults, digits_only, is_hex_color},
  pipeline::build_teacher_directory,
  query::{self, Criteria, SortSpec},
  raw::RawRecord,
  teacher::{Coordinates, Teacher, Timezone},
  validate::{ValidationMode, validate},
  view::{self, ViewFilter},
};

// ─── Input type ──────────────────────────────────────────────────────────────

/// A teacher as entered in the "add teacher" form.
///
/// Already in canonical shape, so it bypasses the normaliser; it is still
/// validated before it is accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTeacher {
  /// Generated when absent.
  #[serde(default, deserialize_with = "lenient::string")]
  pub id:                Option<String>,
  #[serde(default, deserialize_with = "lenient::string_or_empty")]
  pub full_name:         String,
  #[serde(default, deserialize_with = "lenient::string")]
  pub gender:            Option<String>,
  #[serde(default, deserialize_with = "lenient::string")]
  pub title:             Option<String>,
  #[serde(default, deserialize_with = "lenient::string")]
  pub city:              Option<String>,
  #[serde(default, deserialize_with = "lenient::string")]
  pub state:             Option<String>,
  #[serde(default, deserialize_with = "lenient::string")]
  pub country:           Option<String>,
  #[serde(default, deserialize_with = "lenient::string")]
  pub postcode:          Option<String>,
  #[serde(default, deserialize_with = "lenient::object")]
  pub coordinates:       Option<Coordinates>,
  #[serde(default, deserialize_with = "lenient::object")]
  pub timezone:          Option<Timezone>,
  #[serde(default, deserialize_with = "lenient::string")]
  pub email:             Option<String>,
  #[serde(default, deserialize_with = "lenient::string")]
  pub b_date:            Option<String>,
  #[serde(default, deserialize_with = "lenient::integer")]
  pub age:               Option<i64>,
  #[serde(default, deserialize_with = "lenient::string_or_empty")]
  pub phone:             String,
  #[serde(default, deserialize_with = "lenient::string")]
  pub picture_large:     Option<String>,
  #[serde(default, deserialize_with = "lenient::string")]
  pub picture_thumbnail: Option<String>,
  #[serde(default)]
  pub favorite:          bool,
  #[serde(default, deserialize_with = "lenient::string")]
  pub course:            Option<String>,
  #[serde(default, deserialize_with = "lenient::string")]
  pub bg_color:          Option<String>,
  #[serde(default, deserialize_with = "lenient::string")]
  pub note:              Option<String>,
}

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`Directory::query`]: filter, then search, then sort.
#[derive(Debug, Clone, Default)]
pub struct Query {
  pub criteria: Criteria,
  pub search:   Option<String>,
  pub sort:     Option<SortSpec>,
}

// ─── Directory ───────────────────────────────────────────────────────────────

pub struct Directory {
  teachers: Vec<Teacher>,
  defaults: Defaults,
  mode:     ValidationMode,
  rng:      StdRng,
}

impl Directory {
  /// Run the pipeline over both sources with the generator from `config`.
  pub fn build(
    generated: &[RawRecord],
    local: &[RawRecord],
    config: &PipelineConfig,
  ) -> Self {
    Self::build_with_rng(generated, local, config, config.rng())
  }

  /// Run the pipeline with a caller-supplied generator.
  pub fn build_with_rng(
    generated: &[RawRecord],
    local: &[RawRecord],
    config: &PipelineConfig,
    mut rng: StdRng,
  ) -> Self {
    let teachers = build_teacher_directory(generated, local, config, &mut rng);
    Self {
      teachers,
      defaults: config.defaults(),
      mode: config.validation,
      rng,
    }
  }

  pub fn teachers(&self) -> &[Teacher] { &self.teachers }

  pub fn len(&self) -> usize { self.teachers.len() }

  pub fn is_empty(&self) -> bool { self.teachers.is_empty() }

  pub fn into_teachers(self) -> Vec<Teacher> { self.teachers }

  pub fn get(&self, id: &str) -> Option<&Teacher> {
    self.teachers.iter().find(|t| t.id == id)
  }

  // ── Mutations ───────────────────────────────────────────────────────────

  /// Flip `favorite` on the teacher with `id`, returning the new value.
  pub fn toggle_favorite(&mut self, id: &str) -> Result<bool> {
    let teacher = self
      .teachers
      .iter_mut()
      .find(|t| t.id == id)
      .ok_or_else(|| Error::TeacherNotFound(id.to_owned()))?;
    teacher.favorite = !teacher.favorite;
    tracing::debug!(id, favorite = teacher.favorite, "toggled favorite");
    Ok(teacher.favorite)
  }

  /// Validate and append a teacher from the "add teacher" form.
  ///
  /// Missing `course`, `bg_color` and `note` are filled like the normaliser
  /// does; the phone number is reduced to digits. Duplicate ids and invalid
  /// records are refused and leave the directory unchanged.
  pub fn add_teacher(&mut self, form: NewTeacher) -> Result<&Teacher> {
    let id = form
      .id
      .as_deref()
      .map(str::trim)
      .filter(|id| !id.is_empty())
      .map(str::to_owned)
      .unwrap_or_else(|| Uuid::new_v4().to_string());
    if self.get(&id).is_some() {
      return Err(Error::DuplicateId(id));
    }

    let teacher = self.teacher_from_form(id, form);
    let outcome = validate(&teacher, self.mode);
    if !outcome.is_valid() {
      return Err(Error::Rejected {
        id:      teacher.id,
        reasons: outcome.errors(),
      });
    }

    tracing::info!(id = %teacher.id, full_name = %teacher.full_name, "teacher added");
    self.teachers.push(teacher);
    let index = self.teachers.len() - 1;
    Ok(&self.teachers[index])
  }

  fn teacher_from_form(&mut self, id: String, form: NewTeacher) -> Teacher {
    let rng = &mut self.rng;
    Teacher {
      id,
      gender: form.gender,
      title: form.title,
      full_name: form.full_name.trim().to_owned(),
      city: form.city,
      state: form.state,
      country: form.country,
      postcode: form.postcode,
      coordinates: form.coordinates,
      timezone: form.timezone,
      email: form.email,
      b_date: form.b_date,
      age: form.age,
      phone: digits_only(&form.phone),
      picture_large: form.picture_large,
      picture_thumbnail: form.picture_thumbnail,
      favorite: form.favorite,
      course: form
        .course
        .unwrap_or_else(|| Defaults::random_course(&mut *rng)),
      bg_color: form
        .bg_color
        .filter(|c| is_hex_color(c))
        .unwrap_or_else(|| Defaults::random_color(&mut *rng)),
      note: form.note.unwrap_or_else(|| self.defaults.note.clone()),
    }
  }

  // ── Reads ───────────────────────────────────────────────────────────────

  /// Filter by `q.criteria`, narrow by `q.search`, then order by `q.sort`.
  pub fn query(&self, q: &Query) -> Vec<&Teacher> {
    let filtered = query::filter(&self.teachers, &q.criteria);
    let found = query::search(filtered, q.search.as_deref().unwrap_or_default());
    match q.sort {
      Some(spec) => query::sort_by(found, spec),
      None => found,
    }
  }

  /// Apply a dashboard view, then order by `sort`.
  pub fn view(&self, filter: &ViewFilter, sort: Option<SortSpec>) -> Vec<&Teacher> {
    let shown = view::apply_view(&self.teachers, filter);
    match sort {
      Some(spec) => query::sort_by(shown, spec),
      None => shown,
    }
  }

  pub fn percentage(&self, criteria: &Criteria) -> f64 {
    query::percentage(&self.teachers, criteria)
  }
}

impl std::fmt::Debug for Directory {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Directory")
      .field("teachers", &self.teachers.len())
      .field("mode", &self.mode)
      .finish_non_exhaustive()
  }
}
