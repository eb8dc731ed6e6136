//! Local Markdown store: the on-disk cache of previously downloaded pages.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::model::{ContentId, LocalMarkdown, MarkdownHeader};

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("failed to read {path}: {source}")]
  Read { path: PathBuf, source: std::io::Error },
  #[error("failed to write {path}: {source}")]
  Write { path: PathBuf, source: std::io::Error },
  #[error("failed to delete {path}: {source}")]
  Delete { path: PathBuf, source: std::io::Error },
  #[error("failed to create directory {path}: {source}")]
  CreateDir { path: PathBuf, source: std::io::Error },
  #[error("{path} has no YAML front-matter header")]
  MissingHeader { path: PathBuf },
  #[error("{path} has a malformed front-matter header: {source}")]
  MalformedHeader {
    path: PathBuf,
    #[source]
    source: serde_yaml::Error,
  },
  #[error("{path} header has object_id {object_id} (must be >= 1)")]
  InvalidObjectId { path: PathBuf, object_id: i64 },
  #[error("{path} header has version {version} (must be >= 1)")]
  InvalidVersion { path: PathBuf, version: i64 },
  #[error("duplicate content id {id} found at both {first} and {second}")]
  DuplicateId { id: ContentId, first: PathBuf, second: PathBuf },
}

/// Recursively walk `root` for `.md` files, returning paths relative to
/// `root`. A missing root is treated as an empty store (first run).
pub fn list_markdown_files(root: &Path) -> Result<Vec<PathBuf>, StoreError> {
  let mut files = Vec::new();
  if !root.exists() {
    return Ok(files);
  }
  walk(root, root, &mut files)?;
  files.sort();
  Ok(files)
}

fn walk(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), StoreError> {
  let entries = std::fs::read_dir(dir).map_err(|source| StoreError::Read {
    path: dir.to_path_buf(),
    source,
  })?;

  for entry in entries {
    let entry = entry.map_err(|source| StoreError::Read {
      path: dir.to_path_buf(),
      source,
    })?;
    let path = entry.path();
    if path.is_dir() {
      walk(root, &path, out)?;
    } else if path.extension().and_then(|e| e.to_str()) == Some("md") {
      let relative = path
        .strip_prefix(root)
        .expect("walked path is always under root")
        .to_path_buf();
      out.push(relative);
    }
  }
  Ok(())
}

/// Parse one file's front matter into a [`LocalMarkdown`].
pub fn parse_existing(root: &Path, relative_path: &Path) -> Result<LocalMarkdown, StoreError> {
  let full_path = root.join(relative_path);
  let content = std::fs::read_to_string(&full_path).map_err(|source| StoreError::Read {
    path: full_path.clone(),
    source,
  })?;

  let mut parts = content.splitn(3, "---\n");
  let (header_yaml, _body) = match (parts.next(), parts.next(), parts.next()) {
    (Some(""), Some(header), Some(body)) => (header, body),
    _ => return Err(StoreError::MissingHeader { path: full_path }),
  };

  let header: MarkdownHeader =
    serde_yaml::from_str(header_yaml).map_err(|source| StoreError::MalformedHeader {
      path: full_path.clone(),
      source,
    })?;

  if header.object_id < 1 {
    return Err(StoreError::InvalidObjectId {
      path: full_path,
      object_id: header.object_id,
    });
  }
  if header.version < 1 {
    return Err(StoreError::InvalidVersion {
      path: full_path,
      version: header.version,
    });
  }

  Ok(LocalMarkdown {
    id: header.object_id.to_string(),
    version: header.version,
    ancestor_ids: header.ancestor_ids.iter().map(i64::to_string).collect(),
    relative_path: relative_path.to_string_lossy().replace('\\', "/"),
    content,
  })
}

/// Load every local Markdown file under `root` into a cache keyed by id.
/// Fails on a duplicate id across two files.
pub fn load_all(root: &Path) -> Result<HashMap<ContentId, LocalMarkdown>, StoreError> {
  let mut cache = HashMap::new();
  let mut paths_by_id: HashMap<ContentId, PathBuf> = HashMap::new();

  for relative in list_markdown_files(root)? {
    let parsed = parse_existing(root, &relative)?;
    if let Some(first) = paths_by_id.get(&parsed.id) {
      return Err(StoreError::DuplicateId {
        id: parsed.id,
        first: first.clone(),
        second: relative,
      });
    }
    paths_by_id.insert(parsed.id.clone(), relative);
    cache.insert(parsed.id.clone(), parsed);
  }

  debug!(count = cache.len(), "loaded local markdown cache");
  Ok(cache)
}

/// Write `markdown` under `root`, creating intermediate directories (mode
/// 0750 on unix). When `write_enabled` is false this is a dry-run no-op.
pub fn write(root: &Path, markdown: &LocalMarkdown, write_enabled: bool) -> Result<(), StoreError> {
  if !write_enabled {
    return Ok(());
  }

  let full_path = root.join(&markdown.relative_path);
  if let Some(parent) = full_path.parent() {
    create_dir_all_0750(parent).map_err(|source| StoreError::CreateDir {
      path: parent.to_path_buf(),
      source,
    })?;
  }

  std::fs::write(&full_path, &markdown.content).map_err(|source| StoreError::Write {
    path: full_path,
    source,
  })
}

#[cfg(unix)]
fn create_dir_all_0750(path: &Path) -> std::io::Result<()> {
  use std::os::unix::fs::DirBuilderExt;
  std::fs::DirBuilder::new().recursive(true).mode(0o750).create(path)
}

#[cfg(not(unix))]
fn create_dir_all_0750(path: &Path) -> std::io::Result<()> {
  std::fs::create_dir_all(path)
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use tempfile::tempdir;

  use super::*;
  use crate::confluence::models::ContentType;

  fn sample_header() -> MarkdownHeader {
    MarkdownHeader {
      title: "Hello".to_string(),
      timestamp: Utc::now(),
      version: 3,
      author: Some("Jane Doe <jane@example.com>".to_string()),
      object_id: 42,
      uri: "/wiki/spaces/ENG/pages/42".to_string(),
      status: "current".to_string(),
      object_type: ContentType::Page,
      ancestor_names: vec!["Parent".to_string()],
      ancestor_ids: vec![7],
    }
  }

  fn write_file(dir: &Path, relative: &str, header: &MarkdownHeader, body: &str) {
    let full = dir.join(relative);
    std::fs::create_dir_all(full.parent().unwrap()).unwrap();
    let yaml = serde_yaml::to_string(header).unwrap();
    std::fs::write(full, format!("---\n{yaml}---\n{body}")).unwrap();
  }

  #[test]
  fn missing_root_is_an_empty_store() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");
    assert_eq!(list_markdown_files(&missing).unwrap(), Vec::<PathBuf>::new());
  }

  #[test]
  fn round_trips_a_written_file() {
    let dir = tempdir().unwrap();
    let header = sample_header();
    write_file(dir.path(), "acme/ENG/parent/42-hello.md", &header, "Body text\n");

    let parsed = parse_existing(dir.path(), Path::new("acme/ENG/parent/42-hello.md")).unwrap();
    assert_eq!(parsed.id, "42");
    assert_eq!(parsed.version, 3);
    assert_eq!(parsed.ancestor_ids, vec!["7".to_string()]);
  }

  #[test]
  fn load_all_detects_duplicate_ids() {
    let dir = tempdir().unwrap();
    let header = sample_header();
    write_file(dir.path(), "acme/ENG/a/42-hello.md", &header, "one\n");
    write_file(dir.path(), "acme/ENG/b/42-hello-again.md", &header, "two\n");

    let result = load_all(dir.path());
    assert!(matches!(result, Err(StoreError::DuplicateId { .. })));
  }

  #[test]
  fn write_is_a_noop_when_disabled() {
    let dir = tempdir().unwrap();
    let markdown = LocalMarkdown {
      id: "1".to_string(),
      version: 1,
      ancestor_ids: vec![],
      relative_path: "acme/ENG/1-test.md".to_string(),
      content: "---\n---\nhi\n".to_string(),
    };
    write(dir.path(), &markdown, false).unwrap();
    assert!(!dir.path().join("acme/ENG/1-test.md").exists());
  }

  #[test]
  fn write_creates_intermediate_directories() {
    let dir = tempdir().unwrap();
    let markdown = LocalMarkdown {
      id: "1".to_string(),
      version: 1,
      ancestor_ids: vec![],
      relative_path: "acme/ENG/parent/1-test.md".to_string(),
      content: "---\n---\nhi\n".to_string(),
    };
    write(dir.path(), &markdown, true).unwrap();
    assert!(dir.path().join("acme/ENG/parent/1-test.md").exists());
  }
}
