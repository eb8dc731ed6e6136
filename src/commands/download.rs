//! `download` subcommand: reconcile a wiki into a local Markdown tree.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tokio::process::Command;
use tracing::warn;
use url::Url;

use crate::cli::DownloadArgs;
use crate::config;
use crate::confluence::{ConfluenceApi, ConfluenceClient};
use crate::credentials::run_token_cmd;
use crate::downloader::{DownloadOptions, Downloader};

pub async fn run(mut args: DownloadArgs, config_path: Option<&str>) -> Result<()> {
  let file_config = config::load(config_path)?;
  config::apply_download_defaults(&mut args, &file_config);

  let instance = args
    .connection
    .confluence_instance
    .as_deref()
    .context("--confluence-instance is required (or CONFLUENCE_DL_CONFLUENCE_INSTANCE / config file)")?;
  let store = args.store.as_deref().context("--store is required (or config file)")?;

  if !args.all_spaces && args.spaces.is_empty() {
    bail!("--spaces or --all-spaces is required");
  }

  let token = run_token_cmd(&args.connection.auth_token_cmd).context("failed to resolve auth-token-cmd")?;
  let base_url = format!("https://{instance}.atlassian.net");
  let client = ConfluenceClient::new(&base_url, args.connection.auth_username.clone(), token, args.rate_limit)
    .context("failed to build Confluence client")?;
  let client: Arc<dyn ConfluenceApi> = Arc::new(client);

  let wiki_base = Url::parse(&base_url).context("failed to parse wiki base URL")?;
  let workers = args.workers.unwrap_or_else(num_cpus);

  let downloader = Downloader::new(
    client,
    PathBuf::from(store),
    wiki_base,
    DownloadOptions {
      org: instance.to_string(),
      spaces: args.spaces.clone(),
      all_spaces: args.all_spaces,
      include_archived: args.include_archived,
      include_blogposts: args.include_blogposts,
      include_personal_spaces: args.include_personal_spaces,
      always_download: args.always_download,
      write_markdown: args.write_markdown,
      prune: args.prune,
      workers,
    },
  );

  let report = downloader.run().await?;
  println!(
    "reconciled: {} written, {} skipped (cached), {} pruned",
    report.written, report.skipped_cached, report.pruned
  );

  if !args.post_download_cmd.is_empty() {
    run_post_download_cmd(&args.post_download_cmd, store).await;
  }

  Ok(())
}

async fn run_post_download_cmd(argv: &[String], store: &str) {
  let [program, rest @ ..] = argv else { return };
  let status = Command::new(program).args(rest).current_dir(store).status().await;

  match status {
    Ok(status) if status.success() => {}
    Ok(status) => warn!(?argv, code = status.code(), "post-download-cmd exited non-zero"),
    Err(err) => warn!(?argv, error = %err, "failed to run post-download-cmd"),
  }
}

fn num_cpus() -> usize {
  std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4)
}
