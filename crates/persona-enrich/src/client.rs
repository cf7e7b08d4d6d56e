//! Concurrent classifier fan-out behind [`EnrichmentClient`].

use std::{future::Future, sync::Arc, time::Duration};

use persona_core::enrich::{Enricher, Enrichment};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::task::JoinSet;

use crate::{
  Classifier, EnrichConfig, Error, FailurePolicy, Result,
  classifier::{AgeReply, GenderReply, NationalityReply, Signal},
};

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// Everything the three calls produced: the merged fields plus every failure
/// in completion order.
#[derive(Debug, Default)]
pub struct EnrichmentOutcome {
  pub enrichment: Enrichment,
  pub errors:     Vec<Error>,
}

impl EnrichmentOutcome {
  /// The failure that completed first, if any.
  pub fn first_error(&self) -> Option<&Error> { self.errors.first() }

  fn record(&mut self, signal: Signal) {
    match signal {
      Signal::Age(age) => self.enrichment.age = age,
      Signal::Gender(gender) => self.enrichment.gender = gender,
      Signal::Nationality(code) => self.enrichment.nationality = code,
    }
  }

  /// Collapse the outcome according to `policy`.
  pub fn into_result(self, policy: FailurePolicy) -> Result<Enrichment> {
    match policy {
      FailurePolicy::FirstError => match self.errors.into_iter().next() {
        Some(first) => Err(first),
        None => Ok(self.enrichment),
      },
      FailurePolicy::Partial => {
        for e in &self.errors {
          tracing::warn!(error = %e, "ignoring classifier failure");
        }
        Ok(self.enrichment)
      }
    }
  }
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Queries the age, gender and nationality classifiers concurrently.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct EnrichmentClient {
  client: Client,
  config: Arc<EnrichConfig>,
}

impl EnrichmentClient {
  pub fn new(config: EnrichConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_millis(config.timeout_ms))
      .build()
      .map_err(Error::Client)?;
    Ok(Self { client, config: Arc::new(config) })
  }

  pub fn policy(&self) -> FailurePolicy { self.config.policy }

  /// Run all three classifiers and wait for every one of them to finish.
  ///
  /// Calls are independent tasks; none is cancelled because another failed.
  /// Dropping the returned future aborts whatever is still in flight.
  pub async fn enrich_outcome(&self, name: &str) -> EnrichmentOutcome {
    let mut tasks = JoinSet::new();
    for classifier in Classifier::ALL {
      let client = self.client.clone();
      let url = self.config.url_for(classifier).to_owned();
      let name = name.to_owned();
      tasks.spawn(async move { classify(&client, classifier, &url, &name).await });
    }

    let mut outcome = EnrichmentOutcome::default();
    while let Some(joined) = tasks.join_next().await {
      match joined {
        Ok(Ok(signal)) => outcome.record(signal),
        Ok(Err(e)) => {
          tracing::debug!(error = %e, "classifier call failed");
          outcome.errors.push(e);
        }
        Err(e) => outcome.errors.push(Error::Task(e)),
      }
    }
    outcome
  }
}

impl Enricher for EnrichmentClient {
  type Error = Error;

  fn enrich<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Enrichment>> + Send + 'a {
    async move { self.enrich_outcome(name).await.into_result(self.policy()) }
  }
}

// ─── Single call ─────────────────────────────────────────────────────────────

async fn classify(
  client:     &Client,
  classifier: Classifier,
  url:        &str,
  name:       &str,
) -> Result<Signal> {
  tracing::debug!(%classifier, name, "querying classifier");

  let resp = client
    .get(url)
    .query(&[("name", name)])
    .send()
    .await
    .map_err(|source| Error::Transport { classifier, source })?;

  let status = resp.status();
  if !status.is_success() {
    return Err(Error::Status { classifier, status });
  }

  let body = resp
    .bytes()
    .await
    .map_err(|source| Error::Transport { classifier, source })?;

  Ok(match classifier {
    Classifier::Age => Signal::Age(decode::<AgeReply>(classifier, &body)?.age),
    Classifier::Gender => {
      Signal::Gender(decode::<GenderReply>(classifier, &body)?.gender)
    }
    Classifier::Nationality => Signal::Nationality(
      decode::<NationalityReply>(classifier, &body)?.top_country(),
    ),
  })
}

fn decode<T: DeserializeOwned>(classifier: Classifier, body: &[u8]) -> Result<T> {
  serde_json::from_slice(body).map_err(|source| Error::Decode { classifier, source })
}

#[cfg(test)]
mod tests {
  use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
  };

  use axum::{
    Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
  };
  use persona_core::person::Gender;
  use serde_json::json;
  use tokio::{io::AsyncReadExt as _, net::TcpListener, sync::mpsc};

  use super::*;

  // ── Mock classifiers ────────────────────────────────────────────────────

  #[derive(Clone)]
  struct Reply {
    status: StatusCode,
    body:   String,
    delay:  Duration,
  }

  impl Reply {
    fn ok(body: serde_json::Value) -> Self {
      Self { status: StatusCode::OK, body: body.to_string(), delay: Duration::ZERO }
    }

    fn status(status: StatusCode) -> Self {
      Self { status, body: json!({ "error": "nope" }).to_string(), delay: Duration::ZERO }
    }

    fn raw(body: &str) -> Self {
      Self { status: StatusCode::OK, body: body.to_owned(), delay: Duration::ZERO }
    }

    fn after(mut self, ms: u64) -> Self {
      self.delay = Duration::from_millis(ms);
      self
    }
  }

  struct Mock {
    replies: HashMap<&'static str, Reply>,
    seen:    Mutex<Vec<String>>,
  }

  async fn answer(
    State(mock): State<Arc<Mock>>,
    Path(kind): Path<String>,
    Query(params): Query<HashMap<String, String>>,
  ) -> Response {
    if let Some(name) = params.get("name") {
      mock.seen.lock().unwrap().push(name.clone());
    }
    let reply = mock.replies[kind.as_str()].clone();
    tokio::time::sleep(reply.delay).await;
    (reply.status, [(header::CONTENT_TYPE, "application/json")], reply.body)
      .into_response()
  }

  /// Serve scripted classifier replies on an ephemeral port.
  async fn start_mock(age: Reply, gender: Reply, nationality: Reply) -> (EnrichConfig, Arc<Mock>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let mock = Arc::new(Mock {
      replies: HashMap::from([("age", age), ("gender", gender), ("nationality", nationality)]),
      seen:    Mutex::default(),
    });

    let app = Router::new()
      .route("/{kind}", get(answer))
      .with_state(mock.clone());
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    let config = EnrichConfig {
      age_url:         format!("http://{addr}/age"),
      gender_url:      format!("http://{addr}/gender"),
      nationality_url: format!("http://{addr}/nationality"),
      timeout_ms:      2_000,
      policy:          FailurePolicy::FirstError,
    };
    (config, mock)
  }

  /// Accept connections and never answer; report every client hang-up.
  async fn start_silent() -> (EnrichConfig, mpsc::UnboundedReceiver<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (hangups, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
      loop {
        let Ok((mut sock, _)) = listener.accept().await else { return };
        let hangups = hangups.clone();
        tokio::spawn(async move {
          let mut buf = [0u8; 1024];
          while matches!(sock.read(&mut buf).await, Ok(n) if n > 0) {}
          let _ = hangups.send(());
        });
      }
    });

    let config = EnrichConfig {
      age_url:         format!("http://{addr}/age"),
      gender_url:      format!("http://{addr}/gender"),
      nationality_url: format!("http://{addr}/nationality"),
      timeout_ms:      60_000,
      policy:          FailurePolicy::FirstError,
    };
    (config, rx)
  }

  fn age(n: u32) -> Reply { Reply::ok(json!({ "count": 10, "name": "x", "age": n })) }

  fn gender(g: &str) -> Reply {
    Reply::ok(json!({ "count": 10, "gender": g, "probability": 0.9 }))
  }

  fn countries(list: serde_json::Value) -> Reply { Reply::ok(json!({ "country": list })) }

  fn client(config: EnrichConfig) -> EnrichmentClient { EnrichmentClient::new(config).unwrap() }

  // ── Merging ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn all_success_populates_every_field() {
    let (config, _) = start_mock(
      age(25),
      gender("male"),
      countries(json!([{ "country_id": "GB", "probability": 0.5 }])),
    )
    .await;

    let e = client(config).enrich("Test").await.unwrap();
    assert_eq!(e, Enrichment {
      age:         Some(25),
      gender:      Some(Gender::Male),
      nationality: Some("GB".into()),
    });
  }

  #[tokio::test]
  async fn empty_country_list_is_not_an_error() {
    let (config, _) = start_mock(age(40), gender("female"), countries(json!([]))).await;

    let e = client(config).enrich("X").await.unwrap();
    assert_eq!(e.age, Some(40));
    assert_eq!(e.gender, Some(Gender::Female));
    assert_eq!(e.nationality, None);
  }

  #[tokio::test]
  async fn unknown_name_leaves_fields_absent() {
    let (config, _) = start_mock(
      Reply::ok(json!({ "age": null })),
      Reply::ok(json!({ "gender": null })),
      countries(json!([])),
    )
    .await;

    let e = client(config).enrich("Zzyzx").await.unwrap();
    assert_eq!(e, Enrichment::default());
  }

  // ── Failures ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn any_single_failing_classifier_fails_enrichment() {
    for failing in Classifier::ALL {
      let pick = |c: Classifier, good: Reply| {
        if c == failing { Reply::status(StatusCode::INTERNAL_SERVER_ERROR) } else { good }
      };
      let (config, _) = start_mock(
        pick(Classifier::Age, age(30)),
        pick(Classifier::Gender, gender("male")),
        pick(Classifier::Nationality, countries(json!([]))),
      )
      .await;

      let err = client(config).enrich("Solo").await.unwrap_err();
      assert_eq!(err.classifier(), Some(failing), "{err}");
      assert!(matches!(err, Error::Status { status: StatusCode::INTERNAL_SERVER_ERROR, .. }));
    }
  }

  #[tokio::test]
  async fn connection_refused_is_a_transport_error() {
    let (mut config, _) = start_mock(age(1), gender("male"), countries(json!([]))).await;
    let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
    config.age_url = format!("http://{}/age", closed.local_addr().unwrap());
    drop(closed);

    let err = client(config).enrich("Err").await.unwrap_err();
    assert!(matches!(err, Error::Transport { classifier: Classifier::Age, .. }), "{err}");
  }

  #[tokio::test]
  async fn malformed_body_is_a_decode_error() {
    let (config, _) = start_mock(age(1), Reply::raw("<html>"), countries(json!([]))).await;

    let err = client(config).enrich("Bad").await.unwrap_err();
    assert!(matches!(err, Error::Decode { classifier: Classifier::Gender, .. }), "{err}");
  }

  #[tokio::test]
  async fn first_error_is_chosen_by_completion_order() {
    // Age is declared first but fails last.
    let (config, _) = start_mock(
      Reply::status(StatusCode::INTERNAL_SERVER_ERROR).after(300),
      Reply::status(StatusCode::SERVICE_UNAVAILABLE),
      countries(json!([])),
    )
    .await;
    let c = client(config);

    let outcome = c.enrich_outcome("Race").await;
    assert_eq!(outcome.errors.len(), 2);
    assert_eq!(outcome.first_error().and_then(Error::classifier), Some(Classifier::Gender));

    let err = c.enrich("Race").await.unwrap_err();
    assert!(matches!(err, Error::Status { status: StatusCode::SERVICE_UNAVAILABLE, .. }));
  }

  #[tokio::test]
  async fn join_waits_for_slow_successes_after_a_fast_failure() {
    let (config, _) = start_mock(
      age(33).after(200),
      Reply::status(StatusCode::BAD_GATEWAY),
      countries(json!([{ "country_id": "FR", "probability": 0.7 }])).after(100),
    )
    .await;

    let outcome = client(config).enrich_outcome("Slow").await;
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.enrichment.age, Some(33));
    assert_eq!(outcome.enrichment.nationality.as_deref(), Some("FR"));
    assert_eq!(outcome.enrichment.gender, None);
  }

  #[tokio::test]
  async fn partial_policy_keeps_successful_fields() {
    let (mut config, _) = start_mock(
      age(33),
      Reply::status(StatusCode::BAD_GATEWAY),
      countries(json!([{ "country_id": "FR", "probability": 0.7 }])),
    )
    .await;
    config.policy = FailurePolicy::Partial;

    let e = client(config).enrich("Partial").await.unwrap();
    assert_eq!(e, Enrichment {
      age:         Some(33),
      gender:      None,
      nationality: Some("FR".into()),
    });
  }

  #[tokio::test]
  async fn timeout_applies_to_each_call_independently() {
    let (mut config, _) = start_mock(
      age(50),
      gender("female"),
      countries(json!([])).after(1_500),
    )
    .await;
    config.timeout_ms = 200;

    let outcome = client(config).enrich_outcome("Slowpoke").await;
    assert_eq!(outcome.errors.len(), 1);
    match &outcome.errors[0] {
      Error::Transport { classifier: Classifier::Nationality, source } => {
        assert!(source.is_timeout(), "{source}")
      }
      other => panic!("unexpected error: {other}"),
    }
    assert_eq!(outcome.enrichment.age, Some(50));
    assert_eq!(outcome.enrichment.gender, Some(Gender::Female));
  }

  #[tokio::test]
  async fn dropping_the_caller_aborts_in_flight_calls() {
    let (config, mut hangups) = start_silent().await;
    let c = client(config);

    let abandoned = tokio::time::timeout(Duration::from_millis(300), c.enrich("Gone")).await;
    assert!(abandoned.is_err());

    // The per-request timeout is a minute, so only an abort closes these.
    for _ in Classifier::ALL {
      tokio::time::timeout(Duration::from_secs(5), hangups.recv())
        .await
        .expect("classifier connection left open after cancellation")
        .unwrap();
    }
  }

  #[tokio::test]
  async fn name_is_sent_url_encoded() {
    let (config, mock) = start_mock(age(1), gender("male"), countries(json!([]))).await;

    client(config).enrich("Anna Maria&x=1").await.unwrap();
    let seen = mock.seen.lock().unwrap().clone();
    assert_eq!(seen, vec!["Anna Maria&x=1"; 3]);
  }
}
