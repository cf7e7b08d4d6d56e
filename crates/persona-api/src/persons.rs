//! Handlers for `/persons` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/persons` | `?page`, `?page_size`, `?name`, `?surname`, `?min_age`, `?max_age`, `?gender`, `?nationality` |
//! | `POST`   | `/persons` | Body: [`CreateBody`]; enriches, returns 201 + stored person |
//! | `GET`    | `/persons/:id` | 404 if not found |
//! | `PUT`    | `/persons/:id` | Body: [`PatchBody`]; sparse update |
//! | `PATCH`  | `/persons/:id` | Same as `PUT` |
//! | `DELETE` | `/persons/:id` | 204 on success |

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use persona_core::{
  enrich::Enricher,
  person::{CreatePerson, Gender, Person, PersonId, PersonPatch},
  service::{PersonPage, PersonQuery, PersonService},
  store::PersonStore,
};
use serde::Deserialize;

use crate::error::ApiError;

fn person_id(path: Result<Path<i64>, PathRejection>) -> Result<PersonId, ApiError> {
  let Path(id) = path?;
  if id < 1 {
    return Err(ApiError::BadRequest("invalid id".into()));
  }
  Ok(PersonId(id))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  /// 1-based page number. Default 1.
  pub page:        Option<u32>,
  /// Default 10.
  pub page_size:   Option<u32>,
  /// Case-insensitive substring of the name.
  pub name:        Option<String>,
  /// Case-insensitive substring of the surname.
  pub surname:     Option<String>,
  pub min_age:     Option<u32>,
  pub max_age:     Option<u32>,
  pub gender:      Option<Gender>,
  pub nationality: Option<String>,
}

impl From<ListParams> for PersonQuery {
  fn from(p: ListParams) -> Self {
    let defaults = PersonQuery::default();
    PersonQuery {
      name:        p.name.filter(|s| !s.is_empty()),
      surname:     p.surname.filter(|s| !s.is_empty()),
      min_age:     p.min_age,
      max_age:     p.max_age,
      gender:      p.gender,
      nationality: p.nationality.filter(|s| !s.is_empty()),
      page:        p.page.unwrap_or(defaults.page),
      page_size:   p.page_size.unwrap_or(defaults.page_size),
    }
  }
}

/// `GET /persons[?page=..][&page_size=..][&name=..]...`
pub async fn list<S, E>(
  State(service): State<PersonService<S, E>>,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<PersonPage>, ApiError>
where
  S: PersonStore,
  E: Enricher,
{
  let Query(params) = params?;
  let page = service.list(PersonQuery::from(params)).await?;
  Ok(Json(page))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /persons/:id`
pub async fn get_one<S, E>(
  State(service): State<PersonService<S, E>>,
  id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Person>, ApiError>
where
  S: PersonStore,
  E: Enricher,
{
  let person = service.get(person_id(id)?).await?;
  Ok(Json(person))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /persons`.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:       String,
  pub surname:    String,
  pub patronymic: Option<String>,
}

impl From<CreateBody> for CreatePerson {
  fn from(b: CreateBody) -> Self {
    CreatePerson { name: b.name, surname: b.surname, patronymic: b.patronymic }
  }
}

/// `POST /persons`: returns 201 + the enriched, stored [`Person`].
pub async fn create<S, E>(
  State(service): State<PersonService<S, E>>,
  body: Result<Json<CreateBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PersonStore,
  E: Enricher,
{
  let Json(body) = body?;
  let person = service.create(CreatePerson::from(body)).await?;
  Ok((StatusCode::CREATED, Json(person)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `PUT`/`PATCH /persons/:id`. Omitted and `null`
/// fields are left untouched.
#[derive(Debug, Deserialize, Default)]
pub struct PatchBody {
  pub name:        Option<String>,
  pub surname:     Option<String>,
  pub patronymic:  Option<String>,
  pub age:         Option<u32>,
  pub gender:      Option<Gender>,
  pub nationality: Option<String>,
}

impl From<PatchBody> for PersonPatch {
  fn from(b: PatchBody) -> Self {
    PersonPatch {
      name:        b.name,
      surname:     b.surname,
      patronymic:  b.patronymic,
      age:         b.age,
      gender:      b.gender,
      nationality: b.nationality,
    }
  }
}

/// `PUT /persons/:id` and `PATCH /persons/:id`
pub async fn update<S, E>(
  State(service): State<PersonService<S, E>>,
  id: Result<Path<i64>, PathRejection>,
  body: Result<Json<PatchBody>, JsonRejection>,
) -> Result<Json<Person>, ApiError>
where
  S: PersonStore,
  E: Enricher,
{
  let id = person_id(id)?;
  let Json(body) = body?;
  let person = service.update(id, PersonPatch::from(body)).await?;
  Ok(Json(person))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /persons/:id`, 204 on success.
pub async fn delete<S, E>(
  State(service): State<PersonService<S, E>>,
  id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError>
where
  S: PersonStore,
  E: Enricher,
{
  service.delete(person_id(id)?).await?;
  Ok(StatusCode::NO_CONTENT)
}
