//! Top-level error taxonomy for a reconciliation run.
//!
//! Every failure surfaced by the orchestrator or its phases collapses into
//! one of these kinds, matching the error taxonomy: configuration, auth,
//! transient remote, protocol, data, local state, and I/O. Callers (the
//! binary's `main`) only need to print the chain and pick an exit code;
//! the worker pool only needs [`DownloaderError::is_retryable`] to decide
//! whether a transient failure is worth surfacing as such.

use thiserror::Error;

use crate::ancestry::AncestryError;
use crate::config::ConfigError;
use crate::confluence::ClientError;
use crate::converter::ConvertError;
use crate::credentials::CredentialError;
use crate::staleness::StalenessError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum DownloaderError {
  #[error("configuration error: {0}")]
  Config(String),
  #[error("authentication failed: {0}")]
  Auth(String),
  #[error("transient remote error (exhausted retries): {0}")]
  Transient(String),
  #[error("protocol error: {0}")]
  Protocol(String),
  #[error("data error: {0}")]
  Data(String),
  #[error("local state error: {0}")]
  LocalState(String),
  #[error("I/O error: {0}")]
  Io(String),
}

impl From<ClientError> for DownloaderError {
  fn from(err: ClientError) -> Self {
    match &err {
      ClientError::Auth { .. } => DownloaderError::Auth(err.to_string()),
      ClientError::Server { .. } => DownloaderError::Transient(err.to_string()),
      ClientError::Conflict { .. } | ClientError::Protocol { .. } | ClientError::MissingCursor { .. } => {
        DownloaderError::Protocol(err.to_string())
      }
    }
  }
}

impl From<StoreError> for DownloaderError {
  fn from(err: StoreError) -> Self {
    match &err {
      StoreError::Write { .. } | StoreError::CreateDir { .. } | StoreError::Delete { .. } => {
        DownloaderError::Io(err.to_string())
      }
      _ => DownloaderError::LocalState(err.to_string()),
    }
  }
}

impl From<AncestryError> for DownloaderError {
  fn from(err: AncestryError) -> Self {
    DownloaderError::Data(err.to_string())
  }
}

impl From<StalenessError> for DownloaderError {
  fn from(err: StalenessError) -> Self {
    DownloaderError::Data(err.to_string())
  }
}

impl From<ConvertError> for DownloaderError {
  fn from(err: ConvertError) -> Self {
    DownloaderError::Data(err.to_string())
  }
}

impl From<CredentialError> for DownloaderError {
  fn from(err: CredentialError) -> Self {
    DownloaderError::Config(err.to_string())
  }
}

impl From<ConfigError> for DownloaderError {
  fn from(err: ConfigError) -> Self {
    DownloaderError::Config(err.to_string())
  }
}

impl From<std::io::Error> for DownloaderError {
  fn from(err: std::io::Error) -> Self {
    DownloaderError::Io(err.to_string())
  }
}
