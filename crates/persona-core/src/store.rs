//! The `PersonStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `persona-store-sqlite`).
//! Higher layers depend on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::person::{Gender, NewPerson, Person, PersonId};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`PersonStore::list`]. All filters are conjunctive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonFilter {
  /// Case-insensitive substring match on `name`.
  pub name_contains:    Option<String>,
  /// Case-insensitive substring match on `surname`.
  pub surname_contains: Option<String>,
  /// Inclusive lower bound on `age`; persons without an age never match.
  pub min_age:          Option<u32>,
  /// Inclusive upper bound on `age`; persons without an age never match.
  pub max_age:          Option<u32>,
  pub gender:           Option<Gender>,
  pub nationality:      Option<String>,
  pub offset:           u64,
  pub limit:            u64,
}

/// One window of a filtered listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPage {
  /// Ordered by id, ascending.
  pub persons: Vec<Person>,
  /// Number of rows matching the filters, independent of the window.
  pub total:   u64,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a person store backend.
///
/// "Not found" is reported through `Option`/`bool` return values so callers
/// can tell it apart from backend failures.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait PersonStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new person. The store assigns `id`, `created_at` and
  /// `updated_at`.
  fn create(
    &self,
    person: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Retrieve a person by id. Returns `None` if not found.
  fn get(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Replace every writable field of person `id`. Returns `None` if no such
  /// person exists. `created_at` is preserved.
  fn update(
    &self,
    id: PersonId,
    person: NewPerson,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Delete a person. Returns `false` if no such person existed.
  fn delete(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Filtered, paginated listing ordered by id.
  fn list(
    &self,
    filter: PersonFilter,
  ) -> impl Future<Output = Result<StoredPage, Self::Error>> + Send + '_;
}
