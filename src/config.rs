//! Configuration-file layer.
//!
//! Fills in any flag the user didn't pass on the command line or through an
//! environment variable. Read order: `--config` flag, else
//! `CONFLUENCE_DL_CONFIG`, else `~/.config/confluence-dl.yaml`. A missing
//! file at the default location is not an error; a missing file at an
//! explicitly requested path is.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::cli::DownloadArgs;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config file {path}: {source}")]
  Read { path: PathBuf, source: std::io::Error },
  #[error("failed to parse config file {path}: {source}")]
  Parse { path: PathBuf, source: serde_yaml::Error },
}

/// Config-file shape. Every field is optional: absence means "let the flag
/// default or env var win."
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FileConfig {
  pub confluence_instance: Option<String>,
  pub auth_username: Option<String>,
  pub auth_token_cmd: Option<Vec<String>>,
  pub store: Option<String>,
  pub spaces: Option<Vec<String>>,
  pub post_download_cmd: Option<Vec<String>>,
  pub rate_limit: Option<usize>,
  pub workers: Option<usize>,
}

/// Resolve the config file path per the precedence above.
pub fn resolve_path(explicit: Option<&str>) -> Option<PathBuf> {
  if let Some(path) = explicit {
    return Some(PathBuf::from(path));
  }
  dirs_config_path()
}

fn dirs_config_path() -> Option<PathBuf> {
  std::env::var_os("HOME").map(|home| Path::new(&home).join(".config/confluence-dl.yaml"))
}

/// Load the config file, if any. A missing file is `Ok(FileConfig::default())`
/// unless `explicit` named one that isn't there.
pub fn load(explicit: Option<&str>) -> Result<FileConfig, ConfigError> {
  let Some(path) = resolve_path(explicit) else {
    return Ok(FileConfig::default());
  };

  let content = match std::fs::read_to_string(&path) {
    Ok(content) => content,
    Err(source) if explicit.is_none() && source.kind() == std::io::ErrorKind::NotFound => {
      return Ok(FileConfig::default());
    }
    Err(source) => return Err(ConfigError::Read { path, source }),
  };

  serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
}

/// Apply `file` as defaults for any `args` field still at its "unset" state.
/// Boolean flags already carry clap-level defaults and are intentionally
/// left alone: distinguishing "user passed --prune=true" from "default"
/// would require `Option<bool>` throughout the CLI surface, which isn't
/// worth the ergonomics cost for two flags that already default to `true`.
pub fn apply_download_defaults(args: &mut DownloadArgs, file: &FileConfig) {
  if args.connection.confluence_instance.is_none() {
    args.connection.confluence_instance = file.confluence_instance.clone();
  }
  if args.connection.auth_username.is_none() {
    args.connection.auth_username = file.auth_username.clone();
  }
  if args.connection.auth_token_cmd.is_empty()
    && let Some(cmd) = &file.auth_token_cmd
  {
    args.connection.auth_token_cmd = cmd.clone();
  }
  if args.store.is_none() {
    args.store = file.store.clone();
  }
  if args.spaces.is_empty()
    && let Some(spaces) = &file.spaces
  {
    args.spaces = spaces.clone();
  }
  if args.post_download_cmd.is_empty()
    && let Some(cmd) = &file.post_download_cmd
  {
    args.post_download_cmd = cmd.clone();
  }
  if let Some(workers) = file.workers
    && args.workers.is_none()
  {
    args.workers = Some(workers);
  }
}
