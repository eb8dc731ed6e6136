//! Core domain types shared across the downloader's phases.
//!
//! These are distinct from the wire DTOs in [`crate::confluence::models`]:
//! they are the bookkeeping types the orchestrator accumulates during a run,
//! not what the API sends over the wire.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::confluence::models::{ContentType, Page};

/// Opaque identifier for a page, blogpost, or folder.
pub type ContentId = String;

/// Per-id bookkeeping collected while listing and resolving ancestry.
#[derive(Debug, Clone)]
pub struct RemoteObjectMetadata {
  pub page: Page,
  pub slug: String,
  /// Root-first, self excluded.
  pub ancestor_ids: Vec<ContentId>,
  /// Slugs of `ancestor_ids`, same order, for building the local path.
  pub ancestor_slugs: Vec<String>,
}

/// The remote metadata cache populated during Phase B and extended during
/// Phase C. Keyed by [`ContentId`].
pub type RemoteCache = HashMap<ContentId, RemoteObjectMetadata>;

/// Per-run map of author id to resolved user, populated during Phase D.
pub type UserMap = HashMap<ContentId, crate::confluence::models::User>;

/// A Markdown file already on disk, or one about to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalMarkdown {
  pub id: ContentId,
  pub version: i64,
  /// Root-first, self excluded.
  pub ancestor_ids: Vec<ContentId>,
  pub relative_path: String,
  /// Full file content, including the YAML front matter.
  pub content: String,
}

/// YAML front-matter header serialized into every output file.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MarkdownHeader {
  pub title: String,
  pub timestamp: DateTime<Utc>,
  pub version: i64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub author: Option<String>,
  pub object_id: i64,
  pub uri: String,
  pub status: String,
  pub object_type: ContentType,
  #[serde(default)]
  pub ancestor_names: Vec<String>,
  #[serde(default)]
  pub ancestor_ids: Vec<i64>,
}
