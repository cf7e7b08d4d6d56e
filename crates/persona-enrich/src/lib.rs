//! Demographic enrichment by name.
//!
//! [`EnrichmentClient`] queries three independent classifiers (age, gender,
//! nationality) concurrently and implements [`persona_core::enrich::Enricher`].
//! How a single classifier failure affects the result is governed by
//! [`FailurePolicy`].

mod classifier;
mod client;
mod config;

pub mod error;

pub use classifier::Classifier;
pub use client::{EnrichmentClient, EnrichmentOutcome};
pub use config::{EnrichConfig, FailurePolicy};
pub use error::{Error, Result};
