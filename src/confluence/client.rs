//! HTTP client implementation for talking to the Confluence REST API.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::StatusCode;
use tokio::sync::Mutex;
use tokio::time::sleep;
use url::Url;

use super::error::ClientError;
use super::models::{Page, PagesResponse, Space, SpacesResponse, User};

/// Status filter applied to `listPages`/`listBlogposts`.
#[derive(Debug, Clone)]
pub struct PageListQuery {
  pub space_id: String,
  pub statuses: Vec<String>,
  pub cursor: Option<String>,
  pub limit: u32,
}

/// Options steering `listSpaces`.
#[derive(Debug, Clone, Default)]
pub struct ListSpacesOptions {
  pub include_personal: bool,
}

/// One page of list results plus the cursor to resume from, if any.
pub struct ListPage<T> {
  pub items: Vec<T>,
  pub next_cursor: Option<String>,
}

/// Read-only operations against the Confluence v2/v1 REST surface.
#[async_trait]
pub trait ConfluenceApi: Send + Sync {
  async fn list_spaces(&self, org: &str, options: &ListSpacesOptions) -> Result<Vec<Space>, ClientError>;
  async fn list_pages(&self, query: &PageListQuery) -> Result<ListPage<Page>, ClientError>;
  async fn list_blogposts(&self, query: &PageListQuery) -> Result<ListPage<Page>, ClientError>;
  async fn get_page(&self, id: &str) -> Result<Page, ClientError>;
  async fn get_blogpost(&self, id: &str) -> Result<Page, ClientError>;
  async fn get_folder(&self, id: &str) -> Result<Page, ClientError>;
  async fn get_user(&self, account_id: &str) -> Result<User, ClientError>;
  async fn current_user(&self) -> Result<User, ClientError>;
}

/// Confluence API client.
#[derive(Clone)]
pub struct ConfluenceClient {
  base_url: String,
  username: Option<String>,
  token: String,
  client: reqwest::Client,
  rate_limiter: Arc<RequestRateLimiter>,
}

/// Simple fixed-window rate limiter to cap the number of requests per interval.
#[derive(Debug)]
struct RequestRateLimiter {
  max_requests: usize,
  window: Duration,
  timestamps: Mutex<VecDeque<Instant>>,
}

impl RequestRateLimiter {
  fn new(max_requests: usize, window: Duration) -> Self {
    Self {
      max_requests,
      window,
      timestamps: Mutex::new(VecDeque::with_capacity(max_requests)),
    }
  }

  async fn acquire(&self) {
    loop {
      let mut timestamps = self.timestamps.lock().await;
      let now = Instant::now();

      while let Some(earliest) = timestamps.front()
        && now.duration_since(*earliest) >= self.window
      {
        timestamps.pop_front();
      }

      if timestamps.len() < self.max_requests {
        timestamps.push_back(now);
        return;
      }

      let earliest = *timestamps.front().expect("rate limiter queue should never be empty");
      let elapsed = now.duration_since(earliest);
      let wait_duration = if elapsed >= self.window {
        Duration::from_secs(0)
      } else {
        self.window - elapsed
      };

      drop(timestamps);

      if wait_duration > Duration::from_secs(0) {
        sleep(wait_duration).await;
      }
    }
  }
}

impl ConfluenceClient {
  /// Build a client. `username` is `None` when only a token is configured,
  /// in which case requests authenticate with `Authorization: Bearer`
  /// instead of HTTP Basic.
  pub fn new(
    base_url: impl Into<String>,
    username: Option<String>,
    token: impl Into<String>,
    rate_limit: usize,
  ) -> Result<Self, ClientError> {
    let base_url = base_url.into().trim_end_matches('/').to_string();
    let token = token.into();

    let client = reqwest::Client::builder()
      .user_agent(format!("confluence-dl/{}", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| ClientError::Protocol {
        status: 0,
        url: base_url.clone(),
        detail: format!("failed to build HTTP client: {e}"),
      })?;

    Ok(Self {
      base_url,
      username,
      token,
      client,
      rate_limiter: Arc::new(RequestRateLimiter::new(rate_limit.max(1), Duration::from_secs(1))),
    })
  }

  fn auth_header(&self) -> String {
    match &self.username {
      Some(username) => {
        let credentials = format!("{}:{}", username, self.token);
        format!("Basic {}", BASE64.encode(credentials.as_bytes()))
      }
      None => format!("Bearer {}", self.token),
    }
  }

  /// Extract the `cursor` query parameter out of a relative `_links.next`
  /// URL. Missing `cursor` on a present `next` link is the caller's error to
  /// surface as [`ClientError::MissingCursor`].
  fn next_cursor(&self, next: &Option<String>, url_for_error: &str) -> Result<Option<String>, ClientError> {
    let Some(next) = next else { return Ok(None) };
    if next.is_empty() {
      return Ok(None);
    }
    let joined = Url::parse(&self.base_url)
      .and_then(|base| base.join(next))
      .map_err(|e| ClientError::Protocol {
        status: 0,
        url: url_for_error.to_string(),
        detail: format!("unparseable next link {next}: {e}"),
      })?;
    match joined.query_pairs().find(|(k, _)| k == "cursor") {
      Some((_, v)) => Ok(Some(v.into_owned())),
      None => Err(ClientError::MissingCursor { url: next.clone() }),
    }
  }

  async fn get_json<T: serde::de::DeserializeOwned>(
    &self,
    url: &str,
    timeout: Duration,
  ) -> Result<T, ClientError> {
    self.rate_limiter.acquire().await;

    let response = self
      .client
      .get(url)
      .timeout(timeout)
      .header("Authorization", self.auth_header())
      .header("Accept", "application/json")
      .send()
      .await
      .map_err(|e| ClientError::Server {
        status: e.status().map(|s| s.as_u16()),
        url: url.to_string(),
        detail: e.to_string(),
      })?;

    let status = response.status();
    if status.is_success() {
      return response.json().await.map_err(|e| ClientError::Protocol {
        status: status.as_u16(),
        url: url.to_string(),
        detail: format!("failed to decode response body: {e}"),
      });
    }

    let detail = response.text().await.unwrap_or_default();
    Err(match status {
      StatusCode::UNAUTHORIZED => ClientError::Auth { url: url.to_string() },
      StatusCode::CONFLICT => ClientError::Conflict { url: url.to_string() },
      s if s.is_server_error() => ClientError::Server {
        status: Some(s.as_u16()),
        url: url.to_string(),
        detail,
      },
      s => ClientError::Protocol {
        status: s.as_u16(),
        url: url.to_string(),
        detail,
      },
    })
  }

  async fn list_content(&self, endpoint: &str, query: &PageListQuery) -> Result<ListPage<Page>, ClientError> {
    let url = match &query.cursor {
      Some(cursor) => format!(
        "{}/wiki/api/v2/{}?space-id={}&status={}&limit={}&body-format=view&cursor={}",
        self.base_url,
        endpoint,
        query.space_id,
        query.statuses.join(","),
        query.limit,
        cursor
      ),
      None => format!(
        "{}/wiki/api/v2/{}?space-id={}&status={}&limit={}&body-format=view",
        self.base_url,
        endpoint,
        query.space_id,
        query.statuses.join(","),
        query.limit
      ),
    };

    let response: PagesResponse = self.get_json(&url, Duration::from_secs(5)).await?;
    let next_cursor = self.next_cursor(&response.links.next, &url)?;
    Ok(ListPage {
      items: response.results,
      next_cursor,
    })
  }

  async fn get_content(&self, endpoint: &str, id: &str) -> Result<Page, ClientError> {
    let url = format!("{}/wiki/api/v2/{}/{}?body-format=view", self.base_url, endpoint, id);
    self.get_json(&url, Duration::from_secs(5)).await
  }
}

#[async_trait]
impl ConfluenceApi for ConfluenceClient {
  async fn list_spaces(&self, org: &str, options: &ListSpacesOptions) -> Result<Vec<Space>, ClientError> {
    let space_type = if options.include_personal { "global,personal" } else { "global" };
    let mut spaces = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
      let url = match &cursor {
        Some(c) => format!(
          "{}/wiki/api/v2/spaces?type={}&limit=100&cursor={}",
          self.base_url, space_type, c
        ),
        None => format!("{}/wiki/api/v2/spaces?type={}&limit=100", self.base_url, space_type),
      };

      let response: SpacesResponse = self.get_json(&url, Duration::from_secs(5)).await?;
      let next = self.next_cursor(&response.links.next, &url)?;
      for mut space in response.results {
        space.org = org.to_string();
        spaces.push(space);
      }
      match next {
        Some(c) => cursor = Some(c),
        None => break,
      }
    }

    Ok(spaces)
  }

  async fn list_pages(&self, query: &PageListQuery) -> Result<ListPage<Page>, ClientError> {
    self.list_content("pages", query).await
  }

  async fn list_blogposts(&self, query: &PageListQuery) -> Result<ListPage<Page>, ClientError> {
    self.list_content("blogposts", query).await
  }

  async fn get_page(&self, id: &str) -> Result<Page, ClientError> {
    self.get_content("pages", id).await
  }

  async fn get_blogpost(&self, id: &str) -> Result<Page, ClientError> {
    self.get_content("blogposts", id).await
  }

  async fn get_folder(&self, id: &str) -> Result<Page, ClientError> {
    self.get_content("folders", id).await
  }

  async fn get_user(&self, account_id: &str) -> Result<User, ClientError> {
    let url = format!("{}/wiki/rest/api/user?accountId={}", self.base_url, account_id);
    self.get_json(&url, Duration::from_secs(2)).await
  }

  async fn current_user(&self) -> Result<User, ClientError> {
    let url = format!("{}/wiki/rest/api/user/current", self.base_url);
    self.get_json(&url, Duration::from_secs(2)).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn auth_header_uses_basic_when_username_present() {
    let client = ConfluenceClient::new(
      "https://example.atlassian.net",
      Some("user@example.com".to_string()),
      "test-token",
      5,
    )
    .unwrap();
    let header = client.auth_header();
    assert!(header.starts_with("Basic "));
    let decoded = BASE64.decode(header.strip_prefix("Basic ").unwrap().as_bytes()).unwrap();
    assert_eq!(String::from_utf8(decoded).unwrap(), "user@example.com:test-token");
  }

  #[test]
  fn auth_header_falls_back_to_bearer_without_username() {
    let client = ConfluenceClient::new("https://example.atlassian.net", None, "test-token", 5).unwrap();
    assert_eq!(client.auth_header(), "Bearer test-token");
  }

  #[test]
  fn base_url_trims_trailing_slash() {
    let client =
      ConfluenceClient::new("https://example.atlassian.net/", None, "test-token", 5).unwrap();
    assert_eq!(client.base_url, "https://example.atlassian.net");
  }

  #[test]
  fn next_cursor_extracts_query_param() {
    let client = ConfluenceClient::new("https://example.atlassian.net", None, "tok", 5).unwrap();
    let next = Some("/wiki/api/v2/pages?cursor=abc123&limit=25".to_string());
    assert_eq!(
      client.next_cursor(&next, "https://example.atlassian.net").unwrap(),
      Some("abc123".to_string())
    );
  }

  #[test]
  fn next_cursor_errors_when_missing() {
    let client = ConfluenceClient::new("https://example.atlassian.net", None, "tok", 5).unwrap();
    let next = Some("/wiki/api/v2/pages?limit=25".to_string());
    assert!(matches!(
      client.next_cursor(&next, "https://example.atlassian.net"),
      Err(ClientError::MissingCursor { .. })
    ));
  }

  #[test]
  fn next_cursor_none_when_absent() {
    let client = ConfluenceClient::new("https://example.atlassian.net", None, "tok", 5).unwrap();
    assert_eq!(client.next_cursor(&None, "https://example.atlassian.net").unwrap(), None);
  }

  #[tokio::test]
  async fn rate_limiter_throttles_requests() {
    let limiter = RequestRateLimiter::new(2, Duration::from_secs(1));
    let start = Instant::now();

    limiter.acquire().await;
    limiter.acquire().await;
    limiter.acquire().await;

    assert!(start.elapsed() >= Duration::from_millis(900));
  }
}
