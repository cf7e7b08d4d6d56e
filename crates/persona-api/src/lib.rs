//! JSON REST API for persona.
//!
//! Exposes an axum [`Router`] backed by a [`PersonService`] over any
//! [`PersonStore`] and [`Enricher`]. Tracing, TLS and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = persona_api::api_router(service).layer(TraceLayer::new_for_http());
//! ```

pub mod error;
pub mod persons;

use axum::{Router, routing::get};
use persona_core::{enrich::Enricher, service::PersonService, store::PersonStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `service`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, E>(service: PersonService<S, E>) -> Router<()>
where
  S: PersonStore + 'static,
  E: Enricher + 'static,
{
  Router::new()
    .route("/persons", get(persons::list::<S, E>).post(persons::create::<S, E>))
    .route(
      "/persons/{id}",
      get(persons::get_one::<S, E>)
        .put(persons::update::<S, E>)
        .patch(persons::update::<S, E>)
        .delete(persons::delete::<S, E>),
    )
    .with_state(service)
}
