//! The reconciliation orchestrator: runs the six sequential phases (load
//! local cache, list pages, resolve ancestry, fetch users, fetch/convert/
//! write pages, prune) described for a `download` run, driving the
//! concurrent phases through the [`pool`] worker pool.

mod pool;

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use crate::ancestry;
use crate::confluence::models::{ContentType, Space};
use crate::confluence::{ConfluenceApi, ListSpacesOptions, PageListQuery};
use crate::converter;
use crate::error::DownloaderError;
use crate::model::{ContentId, LocalMarkdown, RemoteCache, RemoteObjectMetadata, UserMap};
use crate::pruner;
use crate::staleness;
use crate::store;

const MAX_RETRIES: u8 = 3;
const BLOGPOST_SPACE_KEY: &str = "blogposts";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContentKind {
  Page,
  Blogpost,
}

#[derive(Debug, Clone)]
enum Job {
  PagesList {
    space_id: String,
    space_key: String,
    kind: ContentKind,
    cursor: Option<String>,
    retries: u8,
  },
  UserFetch {
    account_id: String,
    retries: u8,
  },
  PageFetch {
    id: ContentId,
    kind: ContentKind,
    retries: u8,
  },
}

/// Flags and target selection for one reconciliation run, mirroring the
/// `download` subcommand's flag surface.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
  pub org: String,
  pub spaces: Vec<String>,
  pub all_spaces: bool,
  pub include_archived: bool,
  pub include_blogposts: bool,
  pub include_personal_spaces: bool,
  pub always_download: bool,
  pub write_markdown: bool,
  pub prune: bool,
  pub workers: usize,
}

/// Counts reported back to the caller after a run completes.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunReport {
  pub written: usize,
  pub skipped_cached: usize,
  pub pruned: usize,
}

pub struct Downloader {
  client: Arc<dyn ConfluenceApi>,
  store_root: PathBuf,
  wiki_base: Url,
  options: DownloadOptions,
}

impl Downloader {
  pub fn new(client: Arc<dyn ConfluenceApi>, store_root: PathBuf, wiki_base: Url, options: DownloadOptions) -> Self {
    Self {
      client,
      store_root,
      wiki_base,
      options,
    }
  }

  pub async fn run(&self) -> Result<RunReport, DownloaderError> {
    // Phase A
    let local_cache = store::load_all(&self.store_root)?;
    info!(count = local_cache.len(), phase = "load_local", "loaded local markdown cache");

    let spaces = self.resolve_spaces().await?;
    if spaces.is_empty() {
      return Err(DownloaderError::Config("no spaces selected for reconciliation".to_string()));
    }

    let statuses: Vec<String> = if self.options.include_archived {
      vec!["current".to_string(), "archived".to_string()]
    } else {
      vec!["current".to_string()]
    };

    // Phase B
    let remote: Arc<Mutex<RemoteCache>> = Arc::new(Mutex::new(RemoteCache::new()));
    let mut list_jobs = Vec::new();
    for space in &spaces {
      list_jobs.push(Job::PagesList {
        space_id: space.id.clone(),
        space_key: space.key.clone(),
        kind: ContentKind::Page,
        cursor: None,
        retries: 0,
      });
      if self.options.include_blogposts {
        list_jobs.push(Job::PagesList {
          space_id: space.id.clone(),
          space_key: space.key.clone(),
          kind: ContentKind::Blogpost,
          cursor: None,
          retries: 0,
        });
      }
    }

    {
      let client = self.client.clone();
      let remote = remote.clone();
      let org = self.options.org.clone();
      let statuses = statuses.clone();
      pool::run_jobs(list_jobs, self.options.workers, self.options.workers * 100, move |job| {
        let client = client.clone();
        let remote = remote.clone();
        let org = org.clone();
        let statuses = statuses.clone();
        async move { handle_pages_list(client, remote, org, statuses, job).await }
      })
      .await?;
    }
    info!(phase = "list_pages", count = remote.lock().await.len(), "listed remote pages");

    // Phase C
    {
      let mut remote = remote.lock().await;
      ancestry::resolve(&mut remote)?;
    }
    debug!(phase = "resolve_ancestry", "resolved ancestor chains");

    // Phase D
    let author_ids: Vec<String> = {
      let remote = remote.lock().await;
      remote
        .values()
        .map(|entry| entry.page.author_id.clone())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect()
    };
    let users: Arc<Mutex<UserMap>> = Arc::new(Mutex::new(UserMap::new()));
    let user_jobs: Vec<Job> = author_ids
      .into_iter()
      .map(|account_id| Job::UserFetch { account_id, retries: 0 })
      .collect();
    {
      let client = self.client.clone();
      let users = users.clone();
      pool::run_jobs(user_jobs, self.options.workers, self.options.workers * 3, move |job| {
        let client = client.clone();
        let users = users.clone();
        async move { handle_user_fetch(client, users, job).await }
      })
      .await?;
    }
    info!(phase = "fetch_users", count = users.lock().await.len(), "resolved authors");

    // Phase E
    let fresh: Arc<Mutex<HashSet<String>>> = Arc::new(Mutex::new(HashSet::new()));
    let local_cache = Arc::new(local_cache);
    let written = Arc::new(AtomicUsize::new(0));
    let page_jobs: Vec<Job> = {
      let remote = remote.lock().await;
      remote
        .values()
        .map(|entry| Job::PageFetch {
          id: entry.page.id.clone(),
          kind: match entry.page.content_type() {
            ContentType::Blogpost => ContentKind::Blogpost,
            _ => ContentKind::Page,
          },
          retries: 0,
        })
        .collect()
    };
    let skipped_before = page_jobs.len();

    {
      let client = self.client.clone();
      let remote = remote.clone();
      let users = users.clone();
      let fresh = fresh.clone();
      let local_cache = local_cache.clone();
      let store_root = self.store_root.clone();
      let wiki_base = self.wiki_base.clone();
      let always_download = self.options.always_download;
      let write_enabled = self.options.write_markdown;
      let written = written.clone();
      pool::run_jobs(page_jobs, self.options.workers, self.options.workers * 3, move |job| {
        let client = client.clone();
        let remote = remote.clone();
        let users = users.clone();
        let fresh = fresh.clone();
        let local_cache = local_cache.clone();
        let store_root = store_root.clone();
        let wiki_base = wiki_base.clone();
        let written = written.clone();
        async move {
          handle_page_fetch(
            client,
            remote,
            users,
            local_cache,
            fresh,
            store_root,
            wiki_base,
            always_download,
            write_enabled,
            written,
            job,
          )
          .await
        }
      })
      .await?;
    }

    let written_count = written.load(Ordering::Relaxed);
    let skipped_cached = skipped_before - written_count;
    info!(phase = "fetch_pages", written = written_count, skipped_cached, "reconciled pages");

    // Phase F
    let mut pruned = 0;
    if self.options.write_markdown && self.options.prune {
      let mut reconciled_keys: Vec<String> = spaces.iter().map(|s| s.key.clone()).collect();
      if self.options.include_blogposts {
        reconciled_keys.push(BLOGPOST_SPACE_KEY.to_string());
      }
      let fresh = fresh.lock().await;
      pruned = pruner::prune(&self.store_root, &self.options.org, &reconciled_keys, &fresh)?;
      info!(phase = "prune", pruned, "pruned stale files");
    }

    Ok(RunReport {
      written: written_count,
      skipped_cached,
      pruned,
    })
  }

  async fn resolve_spaces(&self) -> Result<Vec<Space>, DownloaderError> {
    let options = ListSpacesOptions {
      include_personal: self.options.include_personal_spaces,
    };
    let all = self.client.list_spaces(&self.options.org, &options).await?;

    if self.options.all_spaces {
      return Ok(all);
    }

    let mut selected = Vec::new();
    for key in &self.options.spaces {
      match all.iter().find(|s| &s.key == key) {
        Some(space) => selected.push(space.clone()),
        None => return Err(DownloaderError::Data(format!("space key {key} not found in this wiki"))),
      }
    }
    Ok(selected)
  }
}

async fn handle_pages_list(
  client: Arc<dyn ConfluenceApi>,
  remote: Arc<Mutex<RemoteCache>>,
  org: String,
  statuses: Vec<String>,
  job: Job,
) -> Result<Vec<Job>, DownloaderError> {
  let Job::PagesList {
    space_id,
    space_key,
    kind,
    cursor,
    retries,
  } = job
  else {
    unreachable!("handle_pages_list only receives PagesList jobs")
  };

  let query = PageListQuery {
    space_id: space_id.clone(),
    statuses,
    cursor,
    limit: 100,
  };

  let result = match kind {
    ContentKind::Page => client.list_pages(&query).await,
    ContentKind::Blogpost => client.list_blogposts(&query).await,
  };

  let list_page = match result {
    Ok(page) => page,
    Err(err) if err.is_retryable() && retries < MAX_RETRIES => {
      return Ok(vec![Job::PagesList {
        space_id,
        space_key,
        kind,
        cursor: query.cursor,
        retries: retries + 1,
      }]);
    }
    Err(err) => return Err(err.into()),
  };

  let storage_key = match kind {
    ContentKind::Page => space_key.clone(),
    ContentKind::Blogpost => BLOGPOST_SPACE_KEY.to_string(),
  };
  let content_type = match kind {
    ContentKind::Page => ContentType::Page,
    ContentKind::Blogpost => ContentType::Blogpost,
  };

  {
    let mut remote = remote.lock().await;
    for mut page in list_page.items {
      if remote.contains_key(&page.id) {
        return Err(DownloaderError::Data(format!(
          "duplicate page id {} returned while listing {space_key}",
          page.id
        )));
      }
      page.space_key = storage_key.clone();
      page.org = org.clone();
      page.content_type = Some(content_type);
      remote.insert(
        page.id.clone(),
        RemoteObjectMetadata {
          page,
          slug: String::new(),
          ancestor_ids: Vec::new(),
          ancestor_slugs: Vec::new(),
        },
      );
    }
  }

  match list_page.next_cursor {
    Some(next) => Ok(vec![Job::PagesList {
      space_id,
      space_key,
      kind,
      cursor: Some(next),
      retries: 0,
    }]),
    None => Ok(Vec::new()),
  }
}

async fn handle_user_fetch(client: Arc<dyn ConfluenceApi>, users: Arc<Mutex<UserMap>>, job: Job) -> Result<Vec<Job>, DownloaderError> {
  let Job::UserFetch { account_id, retries } = job else {
    unreachable!("handle_user_fetch only receives UserFetch jobs")
  };

  match client.get_user(&account_id).await {
    Ok(user) => {
      let mut users = users.lock().await;
      if users.contains_key(&account_id) {
        return Err(DownloaderError::Data(format!("duplicate user id {account_id} fetched twice")));
      }
      users.insert(account_id, user);
      Ok(Vec::new())
    }
    Err(err) if err.is_retryable() && retries < MAX_RETRIES => Ok(vec![Job::UserFetch {
      account_id,
      retries: retries + 1,
    }]),
    Err(err) => {
      warn!(account_id, error = %err, "failed to fetch author; author line will be omitted");
      Ok(Vec::new())
    }
  }
}

#[allow(clippy::too_many_arguments)]
async fn handle_page_fetch(
  client: Arc<dyn ConfluenceApi>,
  remote: Arc<Mutex<RemoteCache>>,
  users: Arc<Mutex<UserMap>>,
  local: Arc<std::collections::HashMap<ContentId, LocalMarkdown>>,
  fresh: Arc<Mutex<HashSet<String>>>,
  store_root: PathBuf,
  wiki_base: Url,
  always_download: bool,
  write_enabled: bool,
  written: Arc<AtomicUsize>,
  job: Job,
) -> Result<Vec<Job>, DownloaderError> {
  let Job::PageFetch { id, kind, retries } = job else {
    unreachable!("handle_page_fetch only receives PageFetch jobs")
  };

  {
    let remote_guard = remote.lock().await;
    let (existing, is_fresh) = staleness::is_fresh(&id, &remote_guard, &local)?;
    if is_fresh && !always_download {
      if let Some(existing) = existing {
        fresh.lock().await.insert(existing.relative_path.clone());
      }
      return Ok(Vec::new());
    }
  }

  let fetch_result = match kind {
    ContentKind::Page => client.get_page(&id).await,
    ContentKind::Blogpost => client.get_blogpost(&id).await,
  };

  let page = match fetch_result {
    Ok(page) => page,
    Err(err) if err.is_retryable() && retries < MAX_RETRIES => {
      return Ok(vec![Job::PageFetch {
        id,
        kind,
        retries: retries + 1,
      }]);
    }
    Err(err) => return Err(err.into()),
  };

  let markdown = {
    let remote_guard = remote.lock().await;
    let users_guard = users.lock().await;
    let metadata = remote_guard
      .get(&id)
      .ok_or_else(|| DownloaderError::Data(format!("page {id} vanished from the remote cache mid-fetch")))?;
    let mut page = page;
    page.org = metadata.page.org.clone();
    page.space_key = metadata.page.space_key.clone();
    page.content_type = metadata.page.content_type;
    converter::convert(&page, &remote_guard, &users_guard, &wiki_base)?
  };

  store::write(&store_root, &markdown, write_enabled)?;
  fresh.lock().await.insert(markdown.relative_path.clone());
  written.fetch_add(1, Ordering::Relaxed);

  Ok(Vec::new())
}
