//! End-to-end reconciliation scenarios, driving the full [`Downloader`]
//! against a fake Confluence API and a temp-directory store.

mod common;

use std::path::Path;
use std::sync::Arc;

use common::fake_confluence::{FakeConfluenceClient, page};
use confluence_dl::confluence::models::User;
use confluence_dl::confluence::ConfluenceApi;
use confluence_dl::downloader::{DownloadOptions, Downloader};
use tempfile::tempdir;
use url::Url;

fn options(spaces: &[&str], include_blogposts: bool, always_download: bool) -> DownloadOptions {
  DownloadOptions {
    org: "acme".to_string(),
    spaces: spaces.iter().map(|s| s.to_string()).collect(),
    all_spaces: false,
    include_archived: false,
    include_blogposts,
    include_personal_spaces: false,
    always_download,
    write_markdown: true,
    prune: true,
    workers: 2,
  }
}

fn wiki_base() -> Url {
  Url::parse("https://acme.atlassian.net").unwrap()
}

#[tokio::test]
async fn s1_fresh_clone_writes_both_pages() {
  let client: Arc<dyn ConfluenceApi> = Arc::new(
    FakeConfluenceClient::new()
      .with_space("1", "CORE")
      .with_page(page("1", "1", "Root", None, 3, "a1"))
      .with_page(page("2", "1", "Child", Some("1"), 1, "a1")),
  );
  let dir = tempdir().unwrap();

  let downloader = Downloader::new(client, dir.path().to_path_buf(), wiki_base(), options(&["CORE"], false, false));
  let report = downloader.run().await.unwrap();

  assert_eq!(report.written, 2);
  assert_eq!(report.skipped_cached, 0);
  assert!(dir.path().join("acme/CORE/root/1-root.md").exists());
  assert!(dir.path().join("acme/CORE/root/2-child.md").exists());
}

#[tokio::test]
async fn s2_idempotent_second_run_skips_everything() {
  let client: Arc<dyn ConfluenceApi> = Arc::new(
    FakeConfluenceClient::new()
      .with_space("1", "CORE")
      .with_page(page("1", "1", "Root", None, 3, "a1"))
      .with_page(page("2", "1", "Child", Some("1"), 1, "a1")),
  );
  let dir = tempdir().unwrap();

  let first = Downloader::new(client.clone(), dir.path().to_path_buf(), wiki_base(), options(&["CORE"], false, false));
  first.run().await.unwrap();

  let second = Downloader::new(client, dir.path().to_path_buf(), wiki_base(), options(&["CORE"], false, false));
  let report = second.run().await.unwrap();

  assert_eq!(report.written, 0);
  assert_eq!(report.skipped_cached, 2);
  assert_eq!(report.pruned, 0);
}

#[tokio::test]
async fn s3_version_bump_rewrites_only_the_changed_page() {
  let client: Arc<dyn ConfluenceApi> = Arc::new(
    FakeConfluenceClient::new()
      .with_space("1", "CORE")
      .with_page(page("1", "1", "Root", None, 3, "a1"))
      .with_page(page("2", "1", "Child", Some("1"), 1, "a1")),
  );
  let dir = tempdir().unwrap();

  let first = Downloader::new(client, dir.path().to_path_buf(), wiki_base(), options(&["CORE"], false, false));
  first.run().await.unwrap();

  let client: Arc<dyn ConfluenceApi> = Arc::new(
    FakeConfluenceClient::new()
      .with_space("1", "CORE")
      .with_page(page("1", "1", "Root", None, 3, "a1"))
      .with_page(page("2", "1", "Child", Some("1"), 2, "a1")),
  );
  let second = Downloader::new(client, dir.path().to_path_buf(), wiki_base(), options(&["CORE"], false, false));
  let report = second.run().await.unwrap();

  assert_eq!(report.written, 1);
  assert_eq!(report.skipped_cached, 1);

  let content = std::fs::read_to_string(dir.path().join("acme/CORE/root/2-child.md")).unwrap();
  assert!(content.contains("version: 2"));
}

#[tokio::test]
async fn s4_ancestor_rename_moves_and_prunes_descendant() {
  let client: Arc<dyn ConfluenceApi> = Arc::new(
    FakeConfluenceClient::new()
      .with_space("1", "CORE")
      .with_page(page("1", "1", "Root", None, 3, "a1"))
      .with_page(page("2", "1", "Child", Some("1"), 1, "a1")),
  );
  let dir = tempdir().unwrap();

  let first = Downloader::new(client, dir.path().to_path_buf(), wiki_base(), options(&["CORE"], false, false));
  first.run().await.unwrap();
  assert!(dir.path().join("acme/CORE/root/1-root.md").exists());
  assert!(dir.path().join("acme/CORE/root/2-child.md").exists());

  let client: Arc<dyn ConfluenceApi> = Arc::new(
    FakeConfluenceClient::new()
      .with_space("1", "CORE")
      .with_page(page("1", "1", "Hub", None, 4, "a1"))
      .with_page(page("2", "1", "Child", Some("1"), 1, "a1")),
  );
  let second = Downloader::new(client, dir.path().to_path_buf(), wiki_base(), options(&["CORE"], false, false));
  let report = second.run().await.unwrap();

  assert_eq!(report.written, 2);
  assert!(dir.path().join("acme/CORE/hub/1-hub.md").exists());
  assert!(dir.path().join("acme/CORE/hub/2-child.md").exists());
  assert!(!dir.path().join("acme/CORE/root/1-root.md").exists());
  assert!(!dir.path().join("acme/CORE/root/2-child.md").exists());
}

#[tokio::test]
async fn s5_deleted_page_is_pruned() {
  let client: Arc<dyn ConfluenceApi> = Arc::new(
    FakeConfluenceClient::new()
      .with_space("1", "CORE")
      .with_page(page("1", "1", "Root", None, 3, "a1"))
      .with_page(page("2", "1", "Child", Some("1"), 1, "a1")),
  );
  let dir = tempdir().unwrap();

  let first = Downloader::new(client, dir.path().to_path_buf(), wiki_base(), options(&["CORE"], false, false));
  first.run().await.unwrap();

  let client: Arc<dyn ConfluenceApi> = Arc::new(
    FakeConfluenceClient::new().with_space("1", "CORE").with_page(page("1", "1", "Root", None, 3, "a1")),
  );
  let second = Downloader::new(client, dir.path().to_path_buf(), wiki_base(), options(&["CORE"], false, false));
  let report = second.run().await.unwrap();

  assert_eq!(report.pruned, 1);
  assert!(!dir.path().join("acme/CORE/root/2-child.md").exists());
  assert!(dir.path().join("acme/CORE/root/1-root.md").exists());
}

#[tokio::test]
async fn s6_blogpost_routes_under_author_slug() {
  let mut blogpost = page("3", "1", "Launch Notes", None, 1, "ada");
  blogpost.content_type = Some(confluence_dl::confluence::models::ContentType::Blogpost);

  let client: Arc<dyn ConfluenceApi> = Arc::new(
    FakeConfluenceClient::new()
      .with_space("1", "CORE")
      .with_blogpost(blogpost)
      .with_user(User {
        account_id: "ada".to_string(),
        username: "ada".to_string(),
        display_name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
      }),
  );
  let dir = tempdir().unwrap();

  let downloader = Downloader::new(client, dir.path().to_path_buf(), wiki_base(), options(&["CORE"], true, false));
  let report = downloader.run().await.unwrap();

  assert_eq!(report.written, 1);
  let path = dir.path().join("acme/blogposts/ada-lovelace/3-launch-notes.md");
  assert!(path.exists(), "expected {}", path.display());
  let content = std::fs::read_to_string(&path).unwrap();
  assert!(content.contains("Ada Lovelace <ada@example.com>"));
}

#[allow(dead_code)]
fn assert_exists(path: &Path) {
  assert!(path.exists());
}

