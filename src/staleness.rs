//! Staleness judge: decides whether a locally cached page is still fresh.

use thiserror::Error;

use crate::model::{ContentId, LocalMarkdown, RemoteCache};

#[derive(Debug, Error)]
pub enum StalenessError {
  #[error("staleness judge queried for unknown id {id}")]
  UnknownId { id: ContentId },
}

/// Looks up `id` in both caches and reports whether the local copy is still
/// fresh. A page is fresh only when its own version matches **and** every
/// ancestor's version also matches locally — a rename anywhere in the
/// ancestor chain invalidates every descendant's cached path.
pub fn is_fresh<'a>(
  id: &ContentId,
  remote: &RemoteCache,
  local: &'a std::collections::HashMap<ContentId, LocalMarkdown>,
) -> Result<(Option<&'a LocalMarkdown>, bool), StalenessError> {
  let remote_entry = remote.get(id).ok_or_else(|| StalenessError::UnknownId { id: id.clone() })?;

  let Some(local_entry) = local.get(id) else {
    return Ok((None, false));
  };

  let remote_version = remote_entry.page.version.as_ref().map(|v| v.number).unwrap_or(0);
  if local_entry.version != remote_version {
    return Ok((Some(local_entry), false));
  }

  if local_entry.ancestor_ids != remote_entry.ancestor_ids {
    return Ok((Some(local_entry), false));
  }

  for ancestor_id in &remote_entry.ancestor_ids {
    let Some(ancestor_remote) = remote.get(ancestor_id) else {
      return Ok((Some(local_entry), false));
    };
    let Some(ancestor_local) = local.get(ancestor_id) else {
      return Ok((Some(local_entry), false));
    };
    let ancestor_remote_version = ancestor_remote.page.version.as_ref().map(|v| v.number).unwrap_or(0);
    if ancestor_local.version != ancestor_remote_version {
      return Ok((Some(local_entry), false));
    }
  }

  Ok((Some(local_entry), true))
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use crate::confluence::models::{Page, Version};
  use crate::model::RemoteObjectMetadata;

  use super::*;

  fn remote_page(id: &str, version: i64, ancestors: Vec<&str>) -> RemoteObjectMetadata {
    RemoteObjectMetadata {
      page: Page {
        id: id.to_string(),
        status: "current".to_string(),
        title: "Title".to_string(),
        space_id: "1".to_string(),
        parent_id: None,
        parent_type: None,
        author_id: "a".to_string(),
        created_at: String::new(),
        version: Some(Version {
          number: version,
          created_at: String::new(),
          author_id: "a".to_string(),
        }),
        body: Default::default(),
        links: Default::default(),
        space_key: "ENG".to_string(),
        org: "acme".to_string(),
        content_type: None,
      },
      slug: "title".to_string(),
      ancestor_ids: ancestors.into_iter().map(str::to_string).collect(),
      ancestor_slugs: Vec::new(),
    }
  }

  fn local_entry(id: &str, version: i64, ancestors: Vec<&str>) -> LocalMarkdown {
    LocalMarkdown {
      id: id.to_string(),
      version,
      ancestor_ids: ancestors.into_iter().map(str::to_string).collect(),
      relative_path: format!("acme/ENG/{id}-title.md"),
      content: String::new(),
    }
  }

  #[test]
  fn absent_locally_is_not_fresh() {
    let mut remote = RemoteCache::new();
    remote.insert("1".to_string(), remote_page("1", 1, vec![]));
    let local = HashMap::new();

    let (entry, fresh) = is_fresh(&"1".to_string(), &remote, &local).unwrap();
    assert!(entry.is_none());
    assert!(!fresh);
  }

  #[test]
  fn matching_versions_and_ancestry_is_fresh() {
    let mut remote = RemoteCache::new();
    remote.insert("1".to_string(), remote_page("1", 1, vec![]));
    remote.insert("2".to_string(), remote_page("2", 3, vec!["1"]));

    let mut local = HashMap::new();
    local.insert("1".to_string(), local_entry("1", 1, vec![]));
    local.insert("2".to_string(), local_entry("2", 3, vec!["1"]));

    let (_, fresh) = is_fresh(&"2".to_string(), &remote, &local).unwrap();
    assert!(fresh);
  }

  #[test]
  fn stale_ancestor_version_invalidates_descendant() {
    let mut remote = RemoteCache::new();
    remote.insert("1".to_string(), remote_page("1", 2, vec![]));
    remote.insert("2".to_string(), remote_page("2", 3, vec!["1"]));

    let mut local = HashMap::new();
    local.insert("1".to_string(), local_entry("1", 1, vec![]));
    local.insert("2".to_string(), local_entry("2", 3, vec!["1"]));

    let (_, fresh) = is_fresh(&"2".to_string(), &remote, &local).unwrap();
    assert!(!fresh);
  }

  #[test]
  fn unknown_id_is_an_error() {
    let remote = RemoteCache::new();
    let local = HashMap::new();
    assert!(matches!(
      is_fresh(&"1".to_string(), &remote, &local),
      Err(StalenessError::UnknownId { .. })
    ));
  }

  #[test]
  fn own_version_mismatch_is_not_fresh() {
    let mut remote = RemoteCache::new();
    remote.insert("1".to_string(), remote_page("1", 2, vec![]));
    let mut local = HashMap::new();
    local.insert("1".to_string(), local_entry("1", 1, vec![]));

    let (_, fresh) = is_fresh(&"1".to_string(), &remote, &local).unwrap();
    assert!(!fresh);
  }
}
