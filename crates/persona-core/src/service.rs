//! [`PersonService`]: enrich-then-persist on create, sparse merge-patch on
//! update, and plain forwarding for the remaining operations.

use std::sync::Arc;

use serde::Serialize;

use crate::{
  Error, Result,
  enrich::Enricher,
  person::{CreatePerson, Gender, NewPerson, Person, PersonId, PersonPatch},
  store::{PersonFilter, PersonStore},
};

// ─── Listing ─────────────────────────────────────────────────────────────────

/// Filters and 1-based pagination accepted by [`PersonService::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonQuery {
  pub name:        Option<String>,
  pub surname:     Option<String>,
  pub min_age:     Option<u32>,
  pub max_age:     Option<u32>,
  pub gender:      Option<Gender>,
  pub nationality: Option<String>,
  pub page:        u32,
  pub page_size:   u32,
}

impl Default for PersonQuery {
  fn default() -> Self {
    Self {
      name:        None,
      surname:     None,
      min_age:     None,
      max_age:     None,
      gender:      None,
      nationality: None,
      page:        1,
      page_size:   10,
    }
  }
}

impl PersonQuery {
  /// Translate the 1-based page window into the store's offset/limit pair.
  pub fn to_filter(&self) -> Result<PersonFilter> {
    if self.page < 1 {
      return Err(Error::Validation("invalid page parameter".into()));
    }
    if self.page_size < 1 {
      return Err(Error::Validation("invalid page_size parameter".into()));
    }
    if let (Some(min), Some(max)) = (self.min_age, self.max_age)
      && min > max
    {
      return Err(Error::Validation(
        "min_age must not exceed max_age".into(),
      ));
    }

    let limit = u64::from(self.page_size);
    Ok(PersonFilter {
      name_contains:    self.name.clone(),
      surname_contains: self.surname.clone(),
      min_age:          self.min_age,
      max_age:          self.max_age,
      gender:           self.gender,
      nationality:      self.nationality.clone(),
      offset:           limit * u64::from(self.page - 1),
      limit,
    })
  }
}

/// One page of persons plus the total match count and the echoed window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonPage {
  pub persons:   Vec<Person>,
  pub total:     u64,
  pub page:      u32,
  pub page_size: u32,
}

// ─── Service ─────────────────────────────────────────────────────────────────

/// Orchestrates the enricher and the store.
///
/// Cloning is cheap; both collaborators are reference-counted.
pub struct PersonService<S, E> {
  store:    Arc<S>,
  enricher: Arc<E>,
}

impl<S, E> Clone for PersonService<S, E> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), enricher: self.enricher.clone() }
  }
}

impl<S, E> PersonService<S, E>
where
  S: PersonStore,
  E: Enricher,
{
  pub fn new(store: Arc<S>, enricher: Arc<E>) -> Self {
    Self { store, enricher }
  }

  /// Enrich, then persist. Enrichment failure aborts before anything is
  /// written.
  pub async fn create(&self, cmd: CreatePerson) -> Result<Person> {
    tracing::info!(name = %cmd.name, surname = %cmd.surname, "create person");
    cmd.validate()?;

    let mut person = NewPerson::from(cmd);
    let enrichment = self
      .enricher
      .enrich(&person.name)
      .await
      .map_err(Error::enrichment)?;
    person.enrich(enrichment);

    self.store.create(person).await.map_err(Error::store)
  }

  /// Load, apply the sparse patch, persist. Enrichment is not re-run.
  pub async fn update(&self, id: PersonId, patch: PersonPatch) -> Result<Person> {
    tracing::info!(%id, ?patch, "update person");
    patch.validate()?;

    let current = self
      .store
      .get(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::NotFound(id))?;

    let mut merged = NewPerson::from(current);
    patch.apply(&mut merged);

    self
      .store
      .update(id, merged)
      .await
      .map_err(Error::store)?
      .ok_or(Error::NotFound(id))
  }

  pub async fn delete(&self, id: PersonId) -> Result<()> {
    tracing::info!(%id, "delete person");
    if self.store.delete(id).await.map_err(Error::store)? {
      Ok(())
    } else {
      Err(Error::NotFound(id))
    }
  }

  pub async fn get(&self, id: PersonId) -> Result<Person> {
    tracing::info!(%id, "get person");
    self
      .store
      .get(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::NotFound(id))
  }

  pub async fn list(&self, query: PersonQuery) -> Result<PersonPage> {
    tracing::info!(?query, "list persons");
    let filter = query.to_filter()?;
    let stored = self.store.list(filter).await.map_err(Error::store)?;
    Ok(PersonPage {
      persons:   stored.persons,
      total:     stored.total,
      page:      query.page,
      page_size: query.page_size,
    })
  }
}
