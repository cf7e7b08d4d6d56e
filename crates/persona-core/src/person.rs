//! The person aggregate and the commands that create and patch it.
//!
//! A person is built in memory from a [`CreatePerson`] command as a
//! [`NewPerson`] (no identity yet), optionally enriched, and then persisted by
//! the store, which assigns the [`PersonId`] and timestamps.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, enrich::Enrichment};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Store-assigned numeric identity of a persisted person.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PersonId(pub i64);

impl fmt::Display for PersonId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

// ─── Gender ──────────────────────────────────────────────────────────────────

/// The fixed label set reported by the gender classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
  Male,
  Female,
}

impl Gender {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Male => "male",
      Self::Female => "female",
    }
  }
}

impl fmt::Display for Gender {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Gender {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "male" => Ok(Self::Male),
      "female" => Ok(Self::Female),
      other => Err(Error::Validation(format!(
        "gender must be 'male' or 'female', got {other:?}"
      ))),
    }
  }
}

// ─── Person ──────────────────────────────────────────────────────────────────

/// A persisted person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
  pub id:          PersonId,
  pub name:        String,
  pub surname:     String,
  pub patronymic:  Option<String>,
  pub age:         Option<u32>,
  pub gender:      Option<Gender>,
  /// Two-letter upper-case country code.
  pub nationality: Option<String>,
  /// Server-assigned; never changes after creation.
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

/// A person that has not been persisted yet, or the full set of writable
/// fields handed to [`crate::store::PersonStore::update`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPerson {
  pub name:        String,
  pub surname:     String,
  pub patronymic:  Option<String>,
  pub age:         Option<u32>,
  pub gender:      Option<Gender>,
  pub nationality: Option<String>,
}

impl NewPerson {
  /// Copy the classifier results onto this person. Absent results leave the
  /// corresponding field untouched.
  pub fn enrich(&mut self, enrichment: Enrichment) {
    let Enrichment { age, gender, nationality } = enrichment;
    if age.is_some() {
      self.age = age;
    }
    if gender.is_some() {
      self.gender = gender;
    }
    if nationality.is_some() {
      self.nationality = nationality;
    }
  }
}

impl From<Person> for NewPerson {
  fn from(p: Person) -> Self {
    Self {
      name:        p.name,
      surname:     p.surname,
      patronymic:  p.patronymic,
      age:         p.age,
      gender:      p.gender,
      nationality: p.nationality,
    }
  }
}

// ─── Commands ────────────────────────────────────────────────────────────────

/// Input to [`crate::service::PersonService::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePerson {
  pub name:       String,
  pub surname:    String,
  pub patronymic: Option<String>,
}

impl CreatePerson {
  pub fn validate(&self) -> Result<()> {
    require_letters("name", &self.name)?;
    require_letters("surname", &self.surname)?;
    if let Some(p) = &self.patronymic
      && !p.is_empty()
    {
      require_letters("patronymic", p)?;
    }
    Ok(())
  }
}

impl From<CreatePerson> for NewPerson {
  fn from(cmd: CreatePerson) -> Self {
    Self {
      name: cmd.name,
      surname: cmd.surname,
      patronymic: cmd.patronymic.filter(|p| !p.is_empty()),
      ..Self::default()
    }
  }
}

/// A sparse update: only the fields that are `Some` overwrite the stored
/// value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonPatch {
  pub name:        Option<String>,
  pub surname:     Option<String>,
  /// An empty string clears the stored patronymic.
  pub patronymic:  Option<String>,
  pub age:         Option<u32>,
  pub gender:      Option<Gender>,
  pub nationality: Option<String>,
}

impl PersonPatch {
  pub fn is_empty(&self) -> bool { *self == Self::default() }

  pub fn validate(&self) -> Result<()> {
    if self.is_empty() {
      return Err(Error::Validation("no fields to update".into()));
    }
    if let Some(n) = &self.name {
      require_letters("name", n)?;
    }
    if let Some(s) = &self.surname {
      require_letters("surname", s)?;
    }
    if let Some(p) = &self.patronymic
      && !p.is_empty()
    {
      require_letters("patronymic", p)?;
    }
    if let Some(code) = &self.nationality
      && !is_country_code(code)
    {
      return Err(Error::Validation(
        "nationality must be a 2-letter country code".into(),
      ));
    }
    Ok(())
  }

  /// Overwrite every field of `target` that is present in this patch.
  pub fn apply(self, target: &mut NewPerson) {
    if let Some(name) = self.name {
      target.name = name;
    }
    if let Some(surname) = self.surname {
      target.surname = surname;
    }
    if let Some(patronymic) = self.patronymic {
      target.patronymic = Some(patronymic).filter(|p| !p.is_empty());
    }
    if self.age.is_some() {
      target.age = self.age;
    }
    if self.gender.is_some() {
      target.gender = self.gender;
    }
    if self.nationality.is_some() {
      target.nationality = self.nationality;
    }
  }
}

// ─── Validation rules ────────────────────────────────────────────────────────

fn require_letters(field: &str, value: &str) -> Result<()> {
  if value.is_empty() {
    return Err(Error::Validation(format!("{field} is required")));
  }
  if !value.chars().all(char::is_alphabetic) {
    return Err(Error::Validation(format!(
      "{field} must contain only letters"
    )));
  }
  Ok(())
}

/// ISO 3166-1 alpha-2 shape: exactly two upper-case ASCII letters.
pub fn is_country_code(s: &str) -> bool {
  s.len() == 2 && s.bytes().all(|b| b.is_ascii_uppercase())
}
