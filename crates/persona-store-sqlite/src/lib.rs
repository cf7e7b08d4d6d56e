//! SQLite implementation of [`persona_core::store::PersonStore`].
//!
//! All queries run on the [`tokio_rusqlite`] connection thread and never
//! block the async runtime.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
