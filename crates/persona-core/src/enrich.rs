//! The `Enricher` trait: demographic guesses derived from a first name.
//!
//! Implemented by `persona-enrich`, which fans out to three external
//! classifiers. The orchestration service depends on this abstraction only.

use std::future::Future;

use crate::person::Gender;

/// Fields guessed by the classifiers. Each one is independently absent when
/// the classifier had no answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enrichment {
  pub age:         Option<u32>,
  pub gender:      Option<Gender>,
  pub nationality: Option<String>,
}

pub trait Enricher: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Guess age, gender and nationality for `name`.
  ///
  /// An `Err` means the enrichment as a whole failed and the caller must not
  /// persist anything derived from it.
  fn enrich<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Enrichment, Self::Error>> + Send + 'a;
}
