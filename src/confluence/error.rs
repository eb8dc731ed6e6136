//! Error taxonomy for the Remote client, mirroring the HTTP status mapping
//! described in the design: 2xx success, 401 auth, 409 conflict, 5xx
//! transient/server, anything else a protocol error.

use std::fmt;

/// Errors the Remote client can return. Distinguished by kind so callers
/// (the worker pool's retry logic) can decide whether a job should be
/// requeued.
#[derive(Debug)]
pub enum ClientError {
  /// 401 response. Fatal; never retried.
  Auth { url: String },
  /// 409 response.
  Conflict { url: String },
  /// 5xx response or a network-level failure. Retried up to 3 times.
  Server { status: Option<u16>, url: String, detail: String },
  /// Any other non-2xx status, or a response that failed to decode.
  Protocol { status: u16, url: String, detail: String },
  /// A list response advertised a `_links.next` with no `cursor` query
  /// parameter.
  MissingCursor { url: String },
}

impl ClientError {
  /// Transient errors are retried by the worker pool; everything else is
  /// fatal on first failure. The design retries all errors equally up to
  /// 3 attempts (see DESIGN.md), but this still distinguishes auth/protocol
  /// failures for clearer diagnostics.
  pub fn is_retryable(&self) -> bool {
    matches!(self, ClientError::Server { .. })
  }
}

impl fmt::Display for ClientError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ClientError::Auth { url } => write!(f, "authentication failed (401) for {url}"),
      ClientError::Conflict { url } => write!(f, "conflict (409) for {url}"),
      ClientError::Server { status, url, detail } => {
        write!(f, "server error ({status:?}) for {url}: {detail}")
      }
      ClientError::Protocol { status, url, detail } => {
        write!(f, "unexpected status {status} for {url}: {detail}")
      }
      ClientError::MissingCursor { url } => {
        write!(f, "response advertised a next page but no cursor was present: {url}")
      }
    }
  }
}

impl std::error::Error for ClientError {}
