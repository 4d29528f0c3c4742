//! Subcommands. Each one reads from the built [`Directory`] and prints JSON.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Subcommand;
use faculty_core::{
  directory::{Directory, NewTeacher, Query},
  query::{self, Criteria, SortSpec},
  stats,
  teacher::Teacher,
  view::{AgeBracket, ViewFilter},
};
use serde::Serialize;

#[derive(Subcommand, Debug)]
pub enum Command {
  /// List teachers, optionally filtered, searched and sorted.
  List {
    /// Field criteria as JSON, e.g. '{"country": ["Germany", "Spain"]}'.
    #[arg(long = "where", value_name = "JSON", value_parser = parse_criteria)]
    criteria: Option<Criteria>,

    #[arg(long)]
    country: Option<String>,

    #[arg(long)]
    gender: Option<String>,

    /// Age bracket: "18-30", "31-45" or "46+".
    #[arg(long)]
    age: Option<AgeBracket>,

    /// Only teachers with a picture.
    #[arg(long)]
    with_photo: bool,

    /// Only favourites.
    #[arg(long)]
    favorites: bool,

    /// Case-insensitive match on name, note or age.
    #[arg(long, short)]
    search: Option<String>,

    /// Sort key, `field` or `field:asc|desc`.
    #[arg(long)]
    sort: Option<SortSpec>,
  },

  /// Share of teachers matching the criteria, as a percentage.
  Percentage {
    #[arg(long = "where", value_name = "JSON", value_parser = parse_criteria)]
    criteria: Criteria,
  },

  /// Country distribution and average age per country and gender.
  Stats,

  /// Upcoming birthdays, soonest first.
  Birthdays {
    /// Reference date; defaults to the local date.
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Only birthdays within this many days.
    #[arg(long, default_value_t = 30)]
    within: i64,
  },

  /// Flip the favourite flag on a teacher and print it.
  ///
  /// The directory lives only for this run; nothing is written back to the
  /// payload files.
  Favorite { id: String },

  /// Validate a teacher given as JSON and print it with defaults filled in.
  ///
  /// The directory lives only for this run; the teacher is not saved.
  Add {
    #[arg(long, value_name = "JSON")]
    form: String,
  },
}

fn parse_criteria(s: &str) -> Result<Criteria, String> {
  Criteria::from_json(s).map_err(|e| e.to_string())
}

// ─── Output shapes ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Percentage {
  matched:    usize,
  total:      usize,
  percentage: f64,
}

#[derive(Serialize)]
struct Stats {
  total:       usize,
  favorites:   usize,
  countries:   Vec<String>,
  by_country:  Vec<stats::CountryCount>,
  average_age: Vec<stats::AgeCell>,
}

#[derive(Serialize)]
struct Birthday<'a> {
  id:        &'a str,
  full_name: &'a str,
  b_date:    &'a str,
  in_days:   i64,
}

// ─── Dispatch ────────────────────────────────────────────────────────────────

pub fn run(command: Command, directory: &mut Directory) -> Result<()> {
  match command {
    Command::List {
      criteria,
      country,
      gender,
      age,
      with_photo,
      favorites,
      search,
      sort,
    } => {
      let view = ViewFilter {
        country,
        gender,
        age,
        with_photo,
        favorites_only: favorites,
        search,
      };
      let criteria = criteria.unwrap_or_default();
      let listed = query::filter(directory.view(&view, sort), &criteria);
      tracing::debug!(shown = listed.len(), "listing");
      print_json(&listed)
    }

    Command::Percentage { criteria } => {
      let matched = directory.query(&Query { criteria: criteria.clone(), ..Query::default() });
      print_json(&Percentage {
        matched:    matched.len(),
        total:      directory.len(),
        percentage: directory.percentage(&criteria),
      })
    }

    Command::Stats => {
      let teachers = directory.teachers();
      print_json(&Stats {
        total:       teachers.len(),
        favorites:   stats::favorites(teachers).len(),
        countries:   stats::distinct_countries(teachers),
        by_country:  stats::country_distribution(teachers),
        average_age: stats::age_pivot(teachers),
      })
    }

    Command::Birthdays { today, within } => {
      let today = today.unwrap_or_else(|| chrono::Local::now().date_naive());
      print_json(&upcoming_birthdays(directory.teachers(), today, within))
    }

    Command::Favorite { id } => {
      directory.toggle_favorite(&id)?;
      let teacher = directory
        .get(&id)
        .with_context(|| format!("teacher {id} vanished after toggling"))?;
      print_json(teacher)
    }

    Command::Add { form } => {
      let form: NewTeacher =
        serde_json::from_str(&form).context("form is not a JSON object")?;
      let added = directory.add_teacher(form)?;
      print_json(added)
    }
  }
}

fn upcoming_birthdays(teachers: &[Teacher], today: NaiveDate, within: i64) -> Vec<Birthday<'_>> {
  let mut upcoming: Vec<Birthday<'_>> = teachers
    .iter()
    .filter_map(|t| {
      let b_date = t.b_date.as_deref()?;
      let in_days = stats::days_until_birthday(b_date, today)?;
      (in_days <= within).then_some(Birthday {
        id: &t.id,
        full_name: &t.full_name,
        b_date,
        in_days,
      })
    })
    .collect();
  upcoming.sort_by_key(|b| b.in_days);
  upcoming
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
  let mut out = std::io::stdout().lock();
  serde_json::to_writer_pretty(&mut out, value).context("writing output")?;
  writeln!(out)?;
  Ok(())
}
