//! The three classifiers and the shapes of their JSON replies.

use std::fmt;

use persona_core::person::Gender;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classifier {
  Age,
  Gender,
  Nationality,
}

impl Classifier {
  pub const ALL: [Self; 3] = [Self::Age, Self::Gender, Self::Nationality];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Age => "age",
      Self::Gender => "gender",
      Self::Nationality => "nationality",
    }
  }
}

impl fmt::Display for Classifier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Replies ─────────────────────────────────────────────────────────────────

/// `{"age": 25}`; `null` when the name is unknown.
#[derive(Debug, Deserialize)]
pub(crate) struct AgeReply {
  pub age: Option<u32>,
}

/// `{"gender": "male"}`; `null` when the name is unknown.
#[derive(Debug, Deserialize)]
pub(crate) struct GenderReply {
  pub gender: Option<Gender>,
}

/// `{"country": [{"country_id": "GB", "probability": 0.5}, ...]}`
#[derive(Debug, Deserialize)]
pub(crate) struct NationalityReply {
  #[serde(default)]
  pub country: Vec<CountryGuess>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CountryGuess {
  pub country_id: String,
}

impl NationalityReply {
  /// The first-ranked country. The classifier orders guesses by rank.
  pub fn top_country(self) -> Option<String> {
    self.country.into_iter().next().map(|c| c.country_id)
  }
}

/// What a single successful classifier call contributes.
#[derive(Debug)]
pub(crate) enum Signal {
  Age(Option<u32>),
  Gender(Option<Gender>),
  Nationality(Option<String>),
}
