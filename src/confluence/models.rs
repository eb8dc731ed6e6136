//! Data transfer objects returned by the Confluence v2/v1 REST APIs.

use serde::{Deserialize, Serialize};

/// Content kind, used to pick an endpoint and to tag the output header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
  Page,
  Blogpost,
  Folder,
}

impl std::fmt::Display for ContentType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ContentType::Page => write!(f, "page"),
      ContentType::Blogpost => write!(f, "blogpost"),
      ContentType::Folder => write!(f, "folder"),
    }
  }
}

/// A space: the top-level grouping pages and blogposts live under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Space {
  pub id: String,
  #[serde(default)]
  pub key: String,
  #[serde(default)]
  pub name: String,
  #[serde(rename = "type", default)]
  pub space_type: String,
  #[serde(default)]
  pub status: String,
  /// Populated by the client from the run's `--confluence-instance`, not
  /// part of the wire payload.
  #[serde(skip)]
  pub org: String,
}

/// Page version metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Version {
  pub number: i64,
  #[serde(rename = "createdAt")]
  pub created_at: String,
  #[serde(rename = "authorId", default)]
  pub author_id: String,
}

/// Rendered body content under a chosen `bodyFormat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageFormat {
  pub value: String,
  #[serde(default)]
  pub representation: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Body {
  pub view: Option<StorageFormat>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageLinks {
  #[serde(default)]
  pub webui: String,
}

/// A page or blogpost. Folders only ever appear as ancestors and are
/// resolved individually via `getFolder`, so they reuse the same shape with
/// `body`/`space_id` left absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
  pub id: String,
  #[serde(default)]
  pub status: String,
  #[serde(default)]
  pub title: String,
  #[serde(rename = "spaceId", default)]
  pub space_id: String,
  #[serde(rename = "parentId", default)]
  pub parent_id: Option<String>,
  #[serde(rename = "parentType", default)]
  pub parent_type: Option<String>,
  #[serde(rename = "authorId", default)]
  pub author_id: String,
  #[serde(rename = "createdAt", default)]
  pub created_at: String,
  pub version: Option<Version>,
  #[serde(default)]
  pub body: Body,
  #[serde(rename = "_links", default)]
  pub links: PageLinks,

  /// Populated by the client from surrounding context, not the wire payload.
  #[serde(skip)]
  pub space_key: String,
  #[serde(skip)]
  pub org: String,
  #[serde(skip)]
  pub content_type: Option<ContentType>,
}

impl Page {
  pub fn content_type(&self) -> ContentType {
    self.content_type.unwrap_or(ContentType::Page)
  }
}

/// A user, as returned by the v1 user endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  #[serde(rename = "accountId")]
  pub account_id: String,
  #[serde(default)]
  pub username: String,
  #[serde(rename = "displayName", default)]
  pub display_name: String,
  #[serde(default)]
  pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct PageLink {
  #[serde(default)]
  pub next: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SpacesResponse {
  pub results: Vec<Space>,
  #[serde(rename = "_links", default)]
  pub links: PageLink,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct PagesResponse {
  pub results: Vec<Page>,
  #[serde(rename = "_links", default)]
  pub links: PageLink,
}
