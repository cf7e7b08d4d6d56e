//! Error type for `persona-enrich`.

use reqwest::StatusCode;
use thiserror::Error;

use crate::Classifier;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to build HTTP client: {0}")]
  Client(#[source] reqwest::Error),

  /// DNS, connect, timeout, or a body that could not be read.
  #[error("{classifier} classifier request failed: {source}")]
  Transport {
    classifier: Classifier,
    #[source]
    source:     reqwest::Error,
  },

  #[error("{classifier} classifier returned status {status}")]
  Status {
    classifier: Classifier,
    status:     StatusCode,
  },

  #[error("{classifier} classifier returned a malformed body: {source}")]
  Decode {
    classifier: Classifier,
    #[source]
    source:     serde_json::Error,
  },

  /// A classifier task panicked or was aborted.
  #[error("classifier task failed: {0}")]
  Task(#[from] tokio::task::JoinError),
}

impl Error {
  /// The classifier this error came from, if known.
  pub fn classifier(&self) -> Option<Classifier> {
    match self {
      Self::Transport { classifier, .. }
      | Self::Status { classifier, .. }
      | Self::Decode { classifier, .. } => Some(*classifier),
      Self::Client(_) | Self::Task(_) => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
