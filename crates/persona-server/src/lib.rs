//! Wiring for the persona HTTP server: configuration and application
//! assembly. The binary in `main.rs` adds logging and process lifecycle.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use axum::Router;
use persona_core::service::PersonService;
use persona_enrich::{EnrichConfig, EnrichmentClient};
use persona_store_sqlite::SqliteStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `PERSONA_*` environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  /// Default log directive; `RUST_LOG` takes precedence.
  pub log_level:  String,
  pub enrichment: EnrichConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "0.0.0.0".to_string(),
      port:       8080,
      store_path: PathBuf::from("~/.local/share/persona/persona.db"),
      log_level:  "info".to_string(),
      enrichment: EnrichConfig::default(),
    }
  }
}

/// Layer the optional TOML file at `path` under the environment.
///
/// Nested keys use `__`, e.g. `PERSONA_ENRICHMENT__TIMEOUT_MS=2000`.
pub fn load_config(path: &Path) -> Result<ServerConfig, config::ConfigError> {
  config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(
      config::Environment::with_prefix("PERSONA")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    )
    .build()?
    .try_deserialize()
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Application ──────────────────────────────────────────────────────────────

/// Open the store, build the enrichment client and return the traced router.
pub async fn build_app(cfg: &ServerConfig) -> anyhow::Result<Router> {
  let store_path = expand_tilde(&cfg.store_path);
  if let Some(dir) = store_path.parent()
    && !dir.as_os_str().is_empty()
  {
    tokio::fs::create_dir_all(dir)
      .await
      .with_context(|| format!("failed to create {dir:?}"))?;
  }

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let enricher = EnrichmentClient::new(cfg.enrichment.clone())
    .context("failed to build enrichment client")?;

  tracing::info!(
    store = %store_path.display(),
    policy = ?enricher.policy(),
    "persona service ready"
  );

  let service = PersonService::new(Arc::new(store), Arc::new(enricher));
  Ok(persona_api::api_router(service).layer(TraceLayer::new_for_http()))
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use config::{Config, File, FileFormat};
  use persona_enrich::FailurePolicy;
  use tower::ServiceExt as _;

  use super::*;

  fn parse(toml: &str) -> ServerConfig {
    Config::builder()
      .add_source(File::from_str(toml, FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn empty_config_uses_defaults() {
    assert_eq!(parse(""), ServerConfig::default());
    assert_eq!(ServerConfig::default().enrichment.timeout_ms, 5_000);
    assert_eq!(
      ServerConfig::default().store_path,
      PathBuf::from("~/.local/share/persona/persona.db"),
    );
  }

  #[test]
  fn nested_enrichment_table_overrides_defaults() {
    let cfg = parse(
      r#"
        port = 9000
        store_path = "/tmp/p.db"

        [enrichment]
        age_url = "http://localhost:1/age"
        timeout_ms = 250
        policy = "partial"
      "#,
    );
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.host, "0.0.0.0");
    assert_eq!(cfg.enrichment.age_url, "http://localhost:1/age");
    assert_eq!(cfg.enrichment.gender_url, "https://api.genderize.io");
    assert_eq!(cfg.enrichment.timeout_ms, 250);
    assert_eq!(cfg.enrichment.policy, FailurePolicy::Partial);
  }

  #[test]
  fn missing_config_file_is_not_an_error() {
    let cfg = load_config(Path::new("/nonexistent/persona.toml")).unwrap();
    assert_eq!(cfg.enrichment.policy, FailurePolicy::FirstError);
  }

  #[test]
  fn tilde_is_expanded_only_at_the_start() {
    assert_eq!(expand_tilde(Path::new("/var/a~/b")), PathBuf::from("/var/a~/b"));
    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(expand_tilde(Path::new("~/x.db")), PathBuf::from(home).join("x.db"));
    }
  }

  #[tokio::test]
  async fn built_app_serves_persons() {
    let dir = std::env::temp_dir().join(format!("persona-test-{}", std::process::id()));
    let cfg = ServerConfig {
      store_path: dir.join("nested").join("persona.db"),
      ..ServerConfig::default()
    };

    let app = build_app(&cfg).await.unwrap();
    let resp = app
      .oneshot(Request::get("/persons").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let _ = std::fs::remove_dir_all(dir);
  }
}
