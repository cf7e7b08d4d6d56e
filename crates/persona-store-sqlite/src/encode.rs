//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, genders as their lowercase
//! label, ages as integers.

use chrono::{DateTime, Utc};
use persona_core::person::{Gender, Person, PersonId};

use crate::{Error, Result};

/// Column list shared by every statement that yields a full row.
pub const PERSON_COLUMNS: &str =
  "id, name, surname, patronymic, age, gender, nationality, created_at, updated_at";

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Gender ──────────────────────────────────────────────────────────────────

pub fn encode_gender(g: Gender) -> &'static str { g.as_str() }

pub fn decode_gender(s: &str) -> Result<Gender> {
  s.parse().map_err(|_| Error::Decode(format!("unknown gender: {s:?}")))
}

// ─── LIKE patterns ───────────────────────────────────────────────────────────

/// `%needle%` with LIKE wildcards in `needle` escaped by `\`.
pub fn contains_pattern(needle: &str) -> String {
  let mut out = String::with_capacity(needle.len() + 2);
  out.push('%');
  for c in needle.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out.push('%');
  out
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Raw values read directly from a `persons` row, in [`PERSON_COLUMNS`] order.
pub struct RawPerson {
  pub id:          i64,
  pub name:        String,
  pub surname:     String,
  pub patronymic:  Option<String>,
  pub age:         Option<i64>,
  pub gender:      Option<String>,
  pub nationality: Option<String>,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawPerson {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      name:        row.get(1)?,
      surname:     row.get(2)?,
      patronymic:  row.get(3)?,
      age:         row.get(4)?,
      gender:      row.get(5)?,
      nationality: row.get(6)?,
      created_at:  row.get(7)?,
      updated_at:  row.get(8)?,
    })
  }

  pub fn into_person(self) -> Result<Person> {
    let age = self
      .age
      .map(|a| {
        u32::try_from(a).map_err(|_| Error::Decode(format!("age out of range: {a}")))
      })
      .transpose()?;

    Ok(Person {
      id:          PersonId(self.id),
      name:        self.name,
      surname:     self.surname,
      patronymic:  self.patronymic,
      age,
      gender:      self.gender.as_deref().map(decode_gender).transpose()?,
      nationality: self.nationality,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}
