//! Error types for `persona-core`.

use thiserror::Error;

use crate::person::PersonId;

/// A boxed error from a pluggable collaborator (store or enricher).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  /// Malformed or missing input; nothing was persisted.
  #[error("validation failed: {0}")]
  Validation(String),

  #[error("person not found: {0}")]
  NotFound(PersonId),

  /// One of the demographic classifiers failed; nothing was persisted.
  #[error("enrichment failed: {0}")]
  Enrichment(#[source] BoxError),

  #[error("store error: {0}")]
  Store(#[source] BoxError),
}

impl Error {
  pub(crate) fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }

  pub(crate) fn enrichment(
    e: impl std::error::Error + Send + Sync + 'static,
  ) -> Self {
    Self::Enrichment(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
