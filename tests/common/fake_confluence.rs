//! In-process fake standing in for the wiki REST API.
//!
//! Returns canned responses without any network I/O, seeded with whole
//! pages/blogposts/users up front (no real cursor pagination — list calls
//! always return everything available for a space in one page).

use std::collections::HashMap;

use async_trait::async_trait;
use confluence_dl::confluence::models::{Body, ContentType, PageLinks, Space, StorageFormat, User, Version};
use confluence_dl::confluence::{ClientError, ConfluenceApi, ListPage, ListSpacesOptions, PageListQuery, Page};

pub struct FakeConfluenceClient {
  pub spaces: Vec<Space>,
  pub pages: HashMap<String, Page>,
  pub blogposts: HashMap<String, Page>,
  pub users: HashMap<String, User>,
}

impl FakeConfluenceClient {
  pub fn new() -> Self {
    Self {
      spaces: Vec::new(),
      pages: HashMap::new(),
      blogposts: HashMap::new(),
      users: HashMap::new(),
    }
  }

  pub fn with_space(mut self, id: &str, key: &str) -> Self {
    self.spaces.push(Space {
      id: id.to_string(),
      key: key.to_string(),
      name: key.to_string(),
      space_type: "global".to_string(),
      status: "current".to_string(),
      org: String::new(),
    });
    self
  }

  pub fn with_page(mut self, page: Page) -> Self {
    self.pages.insert(page.id.clone(), page);
    self
  }

  pub fn with_blogpost(mut self, page: Page) -> Self {
    self.blogposts.insert(page.id.clone(), page);
    self
  }

  pub fn with_user(mut self, user: User) -> Self {
    self.users.insert(user.account_id.clone(), user);
    self
  }
}

#[async_trait]
impl ConfluenceApi for FakeConfluenceClient {
  async fn list_spaces(&self, org: &str, _options: &ListSpacesOptions) -> Result<Vec<Space>, ClientError> {
    Ok(
      self
        .spaces
        .iter()
        .cloned()
        .map(|mut s| {
          s.org = org.to_string();
          s
        })
        .collect(),
    )
  }

  async fn list_pages(&self, query: &PageListQuery) -> Result<ListPage<Page>, ClientError> {
    let items = self
      .pages
      .values()
      .filter(|p| p.space_id == query.space_id && query.statuses.contains(&p.status))
      .cloned()
      .collect();
    Ok(ListPage { items, next_cursor: None })
  }

  async fn list_blogposts(&self, query: &PageListQuery) -> Result<ListPage<Page>, ClientError> {
    let items = self
      .blogposts
      .values()
      .filter(|p| p.space_id == query.space_id && query.statuses.contains(&p.status))
      .cloned()
      .collect();
    Ok(ListPage { items, next_cursor: None })
  }

  async fn get_page(&self, id: &str) -> Result<Page, ClientError> {
    self.pages.get(id).cloned().ok_or_else(|| ClientError::Protocol {
      status: 404,
      url: id.to_string(),
      detail: "not found".to_string(),
    })
  }

  async fn get_blogpost(&self, id: &str) -> Result<Page, ClientError> {
    self.blogposts.get(id).cloned().ok_or_else(|| ClientError::Protocol {
      status: 404,
      url: id.to_string(),
      detail: "not found".to_string(),
    })
  }

  async fn get_folder(&self, id: &str) -> Result<Page, ClientError> {
    Err(ClientError::Protocol {
      status: 404,
      url: id.to_string(),
      detail: "folders not seeded in this fake".to_string(),
    })
  }

  async fn get_user(&self, account_id: &str) -> Result<User, ClientError> {
    self.users.get(account_id).cloned().ok_or_else(|| ClientError::Protocol {
      status: 404,
      url: account_id.to_string(),
      detail: "not found".to_string(),
    })
  }

  async fn current_user(&self) -> Result<User, ClientError> {
    self.users.values().next().cloned().ok_or_else(|| ClientError::Protocol {
      status: 404,
      url: "current".to_string(),
      detail: "no users seeded".to_string(),
    })
  }
}

#[allow(dead_code)]
pub fn page(id: &str, space_id: &str, title: &str, parent_id: Option<&str>, version: i64, author_id: &str) -> Page {
  Page {
    id: id.to_string(),
    status: "current".to_string(),
    title: title.to_string(),
    space_id: space_id.to_string(),
    parent_id: parent_id.map(str::to_string),
    parent_type: parent_id.map(|_| "page".to_string()),
    author_id: author_id.to_string(),
    created_at: "2024-01-01T00:00:00Z".to_string(),
    version: Some(Version {
      number: version,
      created_at: "2024-01-01T00:00:00Z".to_string(),
      author_id: author_id.to_string(),
    }),
    body: Body {
      view: Some(StorageFormat {
        value: format!("<p>{title} body</p>"),
        representation: "view".to_string(),
      }),
    },
    links: PageLinks {
      webui: format!("/spaces/x/pages/{id}"),
    },
    space_key: String::new(),
    org: String::new(),
    content_type: Some(ContentType::Page),
  }
}
