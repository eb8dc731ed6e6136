//! Ancestry resolver: walks `parentId` links into root-first ancestor chains.

use thiserror::Error;
use tracing::debug;

use crate::model::{ContentId, RemoteCache};
use crate::slug::{SlugError, slug};

const MAX_DEPTH: usize = 20;

#[derive(Debug, Error)]
pub enum AncestryError {
  #[error("ancestor chain for {id} exceeds the depth limit of {MAX_DEPTH} (cycle or corrupt data)")]
  DepthExceeded { id: ContentId },
  #[error("page {id} has dangling parentId {parent_id}, not present in the remote cache")]
  DanglingParent { id: ContentId, parent_id: ContentId },
  #[error("failed to compute slug for {id}: {source}")]
  Slug {
    id: ContentId,
    #[source]
    source: SlugError,
  },
}

/// For every `status = "current"` entry in `cache`, resolve its ancestor
/// chain (root-first, self excluded) and slug, writing both back into the
/// cache entry. Non-current entries get an empty ancestor list.
pub fn resolve(cache: &mut RemoteCache) -> Result<(), AncestryError> {
  let ids: Vec<ContentId> = cache.keys().cloned().collect();

  for id in ids {
    let status = cache[&id].page.status.clone();
    let title = cache[&id].page.title.clone();

    let ancestor_ids = if status == "current" {
      walk_ancestors(cache, &id)?
    } else {
      Vec::new()
    };

    let slug_value = slug(&title).map_err(|source| AncestryError::Slug { id: id.clone(), source })?;

    let entry = cache.get_mut(&id).expect("id was just read from this cache");
    entry.ancestor_ids = ancestor_ids;
    entry.slug = slug_value;
  }

  // Second pass: ancestor slugs can only be filled in once every entry in
  // the chain has its own slug assigned.
  let ids: Vec<ContentId> = cache.keys().cloned().collect();
  for id in ids {
    let ancestor_ids = cache[&id].ancestor_ids.clone();
    let ancestor_slugs = ancestor_ids
      .iter()
      .map(|ancestor_id| cache[ancestor_id].slug.clone())
      .collect();
    cache.get_mut(&id).expect("id was just read from this cache").ancestor_slugs = ancestor_slugs;
  }

  debug!(count = cache.len(), "resolved ancestry");
  Ok(())
}

fn walk_ancestors(cache: &RemoteCache, start: &ContentId) -> Result<Vec<ContentId>, AncestryError> {
  let mut chain = Vec::new();
  let mut current = start.clone();

  while let Some(parent_id) = cache
    .get(&current)
    .and_then(|meta| meta.page.parent_id.clone())
    .filter(|p| !p.is_empty())
  {
    if !cache.contains_key(&parent_id) {
      return Err(AncestryError::DanglingParent {
        id: start.clone(),
        parent_id,
      });
    }

    chain.push(parent_id.clone());
    if chain.len() > MAX_DEPTH {
      return Err(AncestryError::DepthExceeded { id: start.clone() });
    }

    current = parent_id;
  }

  chain.reverse();
  Ok(chain)
}
