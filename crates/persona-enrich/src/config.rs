use serde::Deserialize;

use crate::Classifier;

/// What `enrich` reports when some, but not all, classifiers fail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
  /// Any failed call fails the whole enrichment with the first error by
  /// completion order; fields from the successful calls are discarded.
  #[default]
  FirstError,
  /// Keep whatever the successful calls returned and log the failures.
  Partial,
}

/// Classifier endpoints and client settings, deserialised from the
/// `[enrichment]` table of the server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EnrichConfig {
  pub age_url:         String,
  pub gender_url:      String,
  pub nationality_url: String,
  /// Per-request timeout; each classifier call is bounded independently.
  pub timeout_ms:      u64,
  pub policy:          FailurePolicy,
}

impl Default for EnrichConfig {
  fn default() -> Self {
    Self {
      age_url:         "https://api.agify.io".to_owned(),
      gender_url:      "https://api.genderize.io".to_owned(),
      nationality_url: "https://api.nationalize.io".to_owned(),
      timeout_ms:      5_000,
      policy:          FailurePolicy::FirstError,
    }
  }
}

impl EnrichConfig {
  pub fn url_for(&self, classifier: Classifier) -> &str {
    match classifier {
      Classifier::Age => &self.age_url,
      Classifier::Gender => &self.gender_url,
      Classifier::Nationality => &self.nationality_url,
    }
  }
}
