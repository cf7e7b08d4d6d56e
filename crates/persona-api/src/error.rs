//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use persona_core::error::BoxError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("enrichment failed: {0}")]
  Enrichment(#[source] BoxError),

  #[error("store error: {0}")]
  Store(#[source] BoxError),
}

impl From<persona_core::Error> for ApiError {
  fn from(e: persona_core::Error) -> Self {
    use persona_core::Error as Core;
    match e {
      Core::Validation(m) => ApiError::BadRequest(m),
      Core::NotFound(id) => ApiError::NotFound(format!("person {id} not found")),
      Core::Enrichment(e) => ApiError::Enrichment(e),
      Core::Store(e) => ApiError::Store(e),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(r: JsonRejection) -> Self { ApiError::BadRequest(r.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(r: QueryRejection) -> Self { ApiError::BadRequest(r.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(r: PathRejection) -> Self { ApiError::BadRequest(r.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Enrichment(e) => {
        tracing::warn!(error = %e, "enrichment failed");
        (StatusCode::BAD_GATEWAY, format!("enrichment failed: {e}"))
      }
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
