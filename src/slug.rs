//! Deterministic title→filename-slug canonicalization.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static NON_ALNUM_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9]+").unwrap());

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
  #[error("slug for title {title:?} is shorter than 2 characters")]
  TooShort { title: String },
}

/// Replace each maximal run of non-alphanumeric characters with a single
/// space, lowercase, join words with `-`, truncate to 100 characters, and
/// trim leading/trailing hyphens. Fails when fewer than 2 characters remain.
pub fn slug(title: &str) -> Result<String, SlugError> {
  let spaced = NON_ALNUM_RUN.replace_all(title, " ");
  let lowered = spaced.to_lowercase();
  let joined = lowered.split_whitespace().collect::<Vec<_>>().join("-");
  let truncated: String = joined.chars().take(100).collect();
  let trimmed = truncated.trim_matches('-');

  if trimmed.chars().count() < 2 {
    return Err(SlugError::TooShort { title: title.to_string() });
  }

  Ok(trimmed.to_string())
}
