//! Pruner: deletes local Markdown files that are no longer fresh, scoped
//! to the spaces a run actually reconciled.
//!
//! Only walks `<store>/<org>/<spaceKey>` for each key in `reconciled_keys`;
//! a space not touched this run is left untouched even if it holds stale
//! files, per the scoping invariant.

use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

use crate::store::{self, StoreError};

pub fn prune(store_root: &Path, org: &str, reconciled_keys: &[String], fresh: &HashSet<String>) -> Result<usize, StoreError> {
  let mut pruned = 0;

  for key in reconciled_keys {
    let space_dir = store_root.join(org).join(key);
    for relative in store::list_markdown_files(&space_dir)? {
      let full_path = space_dir.join(&relative);
      let relative_to_store = full_path
        .strip_prefix(store_root)
        .expect("space_dir is always under store_root")
        .to_string_lossy()
        .replace('\\', "/");

      if fresh.contains(&relative_to_store) {
        continue;
      }

      debug!(path = %relative_to_store, "pruning stale file");
      std::fs::remove_file(&full_path).map_err(|source| StoreError::Delete {
        path: full_path,
        source,
      })?;
      pruned += 1;
    }
  }

  Ok(pruned)
}
