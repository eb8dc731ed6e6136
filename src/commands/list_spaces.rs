//! `list-spaces` subcommand: a read-only diagnostic over the same Remote
//! client the `download` command uses.

use anyhow::{Context, Result};

use crate::cli::ConnectionArgs;
use crate::confluence::{ConfluenceApi, ConfluenceClient, ListSpacesOptions};
use crate::credentials::run_token_cmd;

pub async fn run(args: ConnectionArgs, config_path: Option<&str>, include_personal: bool) -> Result<()> {
  let file_config = crate::config::load(config_path)?;

  let instance = args
    .confluence_instance
    .or(file_config.confluence_instance)
    .context("--confluence-instance is required (or CONFLUENCE_DL_CONFLUENCE_INSTANCE / config file)")?;

  let token = run_token_cmd(&args.auth_token_cmd).context("failed to resolve auth-token-cmd")?;
  let base_url = format!("https://{instance}.atlassian.net");
  let client = ConfluenceClient::new(&base_url, args.auth_username, token, 10).context("failed to build Confluence client")?;

  let options = ListSpacesOptions { include_personal };
  let spaces = client.list_spaces(&instance, &options).await?;

  for space in spaces {
    println!("{}\t{}\t{}", space.key, space.name, space.space_type);
  }

  Ok(())
}
