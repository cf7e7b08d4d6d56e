//! Core types and trait definitions for the persona service.
//!
//! No HTTP or database dependencies live here. The storage backend and the
//! enrichment engine plug in through the [`store::PersonStore`] and
//! [`enrich::Enricher`] traits; the [`service::PersonService`] sequences them.

// Trait impls use native `async fn`; the trait signatures spell out `Send`.
#![allow(async_fn_in_trait)]

pub mod enrich;
pub mod error;
pub mod person;
pub mod service;
pub mod store;

pub use error::{Error, Result};
