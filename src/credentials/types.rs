//! Credential types and the auth-token-cmd subprocess resolver.
//!
//! The wiki never accepts a password directly: the bearer token is always
//! produced by running a configured command and reading the first line of
//! its stdout. `username` is optional — when absent the client falls back
//! to Bearer-only auth (see [`crate::confluence::client`]).

use std::process::Command;

use thiserror::Error;

/// Resolved credential ready to hand to the Remote client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
  pub username: Option<String>,
  pub token: String,
}

/// Errors resolving a credential. All variants are configuration errors per
/// the error taxonomy: the run does not start.
#[derive(Debug, Error)]
pub enum CredentialError {
  #[error("auth-token-cmd was not configured")]
  MissingTokenCmd,
  #[error("failed to run auth-token-cmd {argv:?}: {source}")]
  Spawn {
    argv: Vec<String>,
    #[source]
    source: std::io::Error,
  },
  #[error("auth-token-cmd {argv:?} exited with status {status}")]
  NonZeroExit { argv: Vec<String>, status: i32 },
  #[error("auth-token-cmd {argv:?} produced no output")]
  EmptyOutput { argv: Vec<String> },
}

/// Run `argv` as a subprocess and return the first line of its stdout,
/// trimmed, as the bearer token.
pub fn run_token_cmd(argv: &[String]) -> Result<String, CredentialError> {
  let [program, args @ ..] = argv else {
    return Err(CredentialError::MissingTokenCmd);
  };

  let output = Command::new(program)
    .args(args)
    .output()
    .map_err(|source| CredentialError::Spawn {
      argv: argv.to_vec(),
      source,
    })?;

  if !output.status.success() {
    return Err(CredentialError::NonZeroExit {
      argv: argv.to_vec(),
      status: output.status.code().unwrap_or(-1),
    });
  }

  let stdout = String::from_utf8_lossy(&output.stdout);
  let first_line = stdout.lines().next().unwrap_or("").trim();
  if first_line.is_empty() {
    return Err(CredentialError::EmptyOutput { argv: argv.to_vec() });
  }

  Ok(first_line.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn resolves_first_line_trimmed() {
    let argv = vec!["printf".to_string(), "  secret-token  \nignored\n".to_string()];
    assert_eq!(run_token_cmd(&argv).unwrap(), "secret-token");
  }

  #[test]
  fn empty_argv_is_missing_cmd() {
    assert!(matches!(run_token_cmd(&[]), Err(CredentialError::MissingTokenCmd)));
  }

  #[test]
  fn nonzero_exit_is_an_error() {
    let argv = vec!["false".to_string()];
    assert!(matches!(run_token_cmd(&argv), Err(CredentialError::NonZeroExit { .. })));
  }

  #[test]
  fn empty_output_is_an_error() {
    let argv = vec!["true".to_string()];
    assert!(matches!(run_token_cmd(&argv), Err(CredentialError::EmptyOutput { .. })));
  }
}
