//! Converter: turns a fetched [`Page`] into a [`LocalMarkdown`] ready to
//! write to the local store.
//!
//! Operates on `body.view` — rendered HTML, not storage-format XHTML — so it
//! only needs a general HTML→GFM transform plus relative-link rewriting; it
//! does not need to special-case storage-format macros.

use chrono::{DateTime, Utc};
use thiserror::Error;
use url::Url;

use crate::confluence::models::{ContentType, Page};
use crate::markdown::{MarkdownOptions, html_to_markdown};
use crate::model::{ContentId, LocalMarkdown, MarkdownHeader, RemoteCache, UserMap};
use crate::slug::{SlugError, slug};

#[derive(Debug, Error)]
pub enum ConvertError {
  #[error("page {id} has no body.view content")]
  EmptyBody { id: ContentId },
  #[error("page {id}: failed to convert HTML body: {source}")]
  HtmlConversion { id: ContentId, source: anyhow::Error },
  #[error("page {id}: unparseable version timestamp {raw:?}")]
  UnparseableTimestamp { id: ContentId, raw: String },
  #[error("page {id}: non-integer content id")]
  NonIntegerId { id: ContentId },
  #[error("page {id}: unresolved ancestor id {ancestor_id}")]
  UnresolvedAncestor { id: ContentId, ancestor_id: ContentId },
  #[error("page {id}: {source}")]
  Slug {
    id: ContentId,
    #[source]
    source: SlugError,
  },
}

/// Convert `page` (already resolved in `remote`, with `ancestor_ids`
/// assigned) into a [`LocalMarkdown`] whose content is the full
/// `---\n<yaml>\n---\n<markdown>\n` file body.
pub fn convert(
  page: &Page,
  remote: &RemoteCache,
  users: &UserMap,
  wiki_base: &Url,
) -> Result<LocalMarkdown, ConvertError> {
  let body_html = page
    .body
    .view
    .as_ref()
    .map(|v| v.value.as_str())
    .filter(|v| !v.trim().is_empty())
    .ok_or_else(|| ConvertError::EmptyBody { id: page.id.clone() })?;

  let markdown_body =
    html_to_markdown(body_html, &MarkdownOptions::default()).map_err(|source| ConvertError::HtmlConversion {
      id: page.id.clone(),
      source,
    })?;
  let markdown_body = rewrite_relative_urls(&markdown_body, wiki_base);

  let object_id: i64 = page
    .id
    .parse()
    .map_err(|_| ConvertError::NonIntegerId { id: page.id.clone() })?;

  let version = page.version.as_ref();
  let version_number = version.map(|v| v.number).unwrap_or(0);
  let timestamp_raw = version.map(|v| v.created_at.as_str()).unwrap_or(&page.created_at);
  let timestamp: DateTime<Utc> =
    DateTime::parse_from_rfc3339(timestamp_raw)
      .map(|dt| dt.with_timezone(&Utc))
      .map_err(|_| ConvertError::UnparseableTimestamp {
        id: page.id.clone(),
        raw: timestamp_raw.to_string(),
      })?;

  let entry = remote
    .get(&page.id)
    .ok_or_else(|| ConvertError::UnresolvedAncestor {
      id: page.id.clone(),
      ancestor_id: page.id.clone(),
    })?;

  let mut ancestor_names = Vec::with_capacity(entry.ancestor_ids.len());
  let mut ancestor_ids = Vec::with_capacity(entry.ancestor_ids.len());
  for ancestor_id in &entry.ancestor_ids {
    let ancestor = remote.get(ancestor_id).ok_or_else(|| ConvertError::UnresolvedAncestor {
      id: page.id.clone(),
      ancestor_id: ancestor_id.clone(),
    })?;
    ancestor_names.push(ancestor.page.title.clone());
    let ancestor_numeric: i64 = ancestor_id
      .parse()
      .map_err(|_| ConvertError::NonIntegerId { id: ancestor_id.clone() })?;
    ancestor_ids.push(ancestor_numeric);
  }

  let author = users.get(&page.author_id).map(|user| {
    if user.email.is_empty() {
      user.display_name.clone()
    } else {
      format!("{} <{}>", user.display_name, user.email)
    }
  });

  let header = MarkdownHeader {
    title: page.title.clone(),
    timestamp,
    version: version_number,
    author,
    object_id,
    uri: page.links.webui.clone(),
    status: page.status.clone(),
    object_type: page.content_type(),
    ancestor_names,
    ancestor_ids,
  };

  let author_slug_source = users.get(&page.author_id).map(|user| {
    if !user.display_name.is_empty() {
      user.display_name.clone()
    } else if !user.username.is_empty() {
      user.username.clone()
    } else {
      user.account_id.clone()
    }
  });
  let relative_path = relative_path_for(page, entry, author_slug_source.as_deref())?;

  let yaml = serde_yaml::to_string(&header).expect("MarkdownHeader always serializes");
  let content = format!("---\n{yaml}---\n{markdown_body}\n");

  Ok(LocalMarkdown {
    id: page.id.clone(),
    version: version_number,
    ancestor_ids: entry.ancestor_ids.clone(),
    relative_path,
    content,
  })
}

fn relative_path_for(page: &Page, entry: &crate::model::RemoteObjectMetadata, author_name: Option<&str>) -> Result<String, ConvertError> {
  let mut parts = vec![page.org.clone(), page.space_key.clone()];

  let is_blogpost = page.content_type() == ContentType::Blogpost;
  if is_blogpost {
    let author_slug_source = author_name.unwrap_or(&page.author_id);
    let author_slug = slug(author_slug_source).map_err(|source| ConvertError::Slug {
      id: page.id.clone(),
      source,
    })?;
    parts.push(author_slug);
  }

  for ancestor_slug in &entry.ancestor_slugs {
    parts.push(ancestor_slug.clone());
  }

  let title_slug = slug(&page.title).map_err(|source| ConvertError::Slug {
    id: page.id.clone(),
    source,
  })?;

  // A root page (no ancestors) claims a directory under its own slug, so
  // that any children it later gains nest alongside it rather than at the
  // bare space root.
  if !is_blogpost && entry.ancestor_slugs.is_empty() {
    parts.push(title_slug.clone());
  }

  parts.push(format!("{}-{}.md", page.id, title_slug));

  Ok(parts.join("/"))
}

/// Rewrite relative (scheme-less) URLs found in `[text](url)` Markdown links
/// against `wiki_base`. Absolute URLs and `data:` URIs pass through
/// unchanged.
fn rewrite_relative_urls(markdown: &str, wiki_base: &Url) -> String {
  static LINK_RE: std::sync::LazyLock<regex::Regex> =
    std::sync::LazyLock::new(|| regex::Regex::new(r"\]\(([^)]+)\)").unwrap());

  LINK_RE
    .replace_all(markdown, |caps: &regex::Captures| {
      let url = &caps[1];
      if url.starts_with("http://") || url.starts_with("https://") || url.starts_with("data:") {
        format!("]({url})")
      } else if let Ok(resolved) = wiki_base.join(url) {
        format!("]({resolved})")
      } else {
        format!("]({url})")
      }
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::confluence::models::{Body, PageLinks, StorageFormat, User, Version};
  use crate::model::RemoteObjectMetadata;

  fn base_page() -> Page {
    Page {
      id: "42".to_string(),
      status: "current".to_string(),
      title: "Hello World".to_string(),
      space_id: "1".to_string(),
      parent_id: None,
      parent_type: None,
      author_id: "author-1".to_string(),
      created_at: "2024-01-01T00:00:00Z".to_string(),
      version: Some(Version {
        number: 3,
        created_at: "2024-05-01T12:00:00Z".to_string(),
        author_id: "author-1".to_string(),
      }),
      body: Body {
        view: Some(StorageFormat {
          value: "<p>Hi <a href=\"/wiki/spaces/ENG/pages/7\">there</a></p>".to_string(),
          representation: "view".to_string(),
        }),
      },
      links: PageLinks {
        webui: "/spaces/ENG/pages/42".to_string(),
      },
      space_key: "ENG".to_string(),
      org: "acme".to_string(),
      content_type: Some(ContentType::Page),
    }
  }

  fn remote_with(page: Page, ancestor_ids: Vec<String>, ancestor_slugs: Vec<String>) -> RemoteCache {
    let mut cache = RemoteCache::new();
    cache.insert(
      page.id.clone(),
      RemoteObjectMetadata {
        page,
        slug: "hello-world".to_string(),
        ancestor_ids,
        ancestor_slugs,
      },
    );
    cache
  }

  #[test]
  fn converts_basic_page() {
    let page = base_page();
    let remote = remote_with(page.clone(), vec![], vec![]);
    let mut users = UserMap::new();
    users.insert(
      "author-1".to_string(),
      User {
        account_id: "author-1".to_string(),
        username: "jane".to_string(),
        display_name: "Jane Doe".to_string(),
        email: "jane@example.com".to_string(),
      },
    );
    let base = Url::parse("https://acme.atlassian.net").unwrap();

    let result = convert(&page, &remote, &users, &base).unwrap();
    assert_eq!(result.relative_path, "acme/ENG/hello-world/42-hello-world.md");
    assert!(result.content.contains("title: Hello World"));
    assert!(result.content.contains("Jane Doe <jane@example.com>"));
    assert!(result.content.contains("https://acme.atlassian.net/wiki/spaces/ENG/pages/7"));
  }

  #[test]
  fn missing_author_omits_author_line() {
    let page = base_page();
    let remote = remote_with(page.clone(), vec![], vec![]);
    let users = UserMap::new();
    let base = Url::parse("https://acme.atlassian.net").unwrap();

    let result = convert(&page, &remote, &users, &base).unwrap();
    assert!(!result.content.contains("author:"));
  }

  #[test]
  fn empty_body_is_an_error() {
    let mut page = base_page();
    page.body.view = None;
    let remote = remote_with(page.clone(), vec![], vec![]);
    let users = UserMap::new();
    let base = Url::parse("https://acme.atlassian.net").unwrap();

    assert!(matches!(
      convert(&page, &remote, &users, &base),
      Err(ConvertError::EmptyBody { .. })
    ));
  }
}
