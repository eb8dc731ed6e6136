//! Command-line interface definitions for confluence-dl.
//!
//! Flags use `#[arg(long, env = "CONFLUENCE_DL_...")]` so clap's own
//! flag-beats-env precedence gives the first two tiers of the configuration
//! precedence chain (flag > env > config file > built-in default) for free.
//! The config-file tier is layered in separately, before parsing finishes,
//! by [`crate::config`] pre-seeding defaults from a parsed YAML file.

use clap::{Parser, Subcommand, ValueEnum};

/// confluence-dl - mirror a Confluence wiki into local Markdown
#[derive(Debug, Parser)]
#[command(
  name = "confluence-dl",
  version,
  about = "Reconcile a Confluence wiki into a local tree of Markdown files",
  styles = get_clap_styles()
)]
pub struct Cli {
  /// Path to a YAML config file pre-seeding defaults for any flag below
  #[arg(long, global = true, env = "CONFLUENCE_DL_CONFIG", value_name = "PATH")]
  pub config: Option<String>,

  /// Increase verbosity (-v, -vv)
  #[arg(short, long, global = true, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Colorize output
  #[arg(long, global = true, value_enum, default_value = "auto", value_name = "WHEN")]
  pub color: ColorOption,

  #[command(subcommand)]
  pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
  /// Reconcile the local store against a Confluence wiki
  Download(Box<DownloadArgs>),

  /// List the spaces visible to the configured credentials
  ListSpaces(Box<ConnectionArgs>),

  /// Display version and build information
  Version {
    #[arg(long)]
    json: bool,
  },

  /// Generate shell completion scripts
  Completions {
    #[arg(value_enum)]
    shell: Shell,
  },
}

/// Flags shared by every subcommand that talks to the wiki.
#[derive(Debug, Parser)]
pub struct ConnectionArgs {
  /// Confluence instance, e.g. "example" for example.atlassian.net
  #[arg(long, env = "CONFLUENCE_DL_CONFLUENCE_INSTANCE", value_name = "INSTANCE")]
  pub confluence_instance: Option<String>,

  /// Username (email) used for HTTP Basic auth; omit for Bearer-only auth
  #[arg(long, env = "CONFLUENCE_DL_AUTH_USERNAME", value_name = "EMAIL")]
  pub auth_username: Option<String>,

  /// Argv of a subprocess whose first stdout line is the bearer token
  #[arg(long, env = "CONFLUENCE_DL_AUTH_TOKEN_CMD", value_name = "ARGV", num_args = 1..)]
  pub auth_token_cmd: Vec<String>,
}

#[derive(Debug, Parser)]
pub struct DownloadArgs {
  #[command(flatten)]
  pub connection: ConnectionArgs,

  /// Local directory the wiki is reconciled into
  #[arg(long, env = "CONFLUENCE_DL_STORE", value_name = "DIR")]
  pub store: Option<String>,

  /// Space keys to reconcile; ignored when --all-spaces is set
  #[arg(long, value_name = "KEY", num_args = 0..)]
  pub spaces: Vec<String>,

  /// Reconcile every space visible to the credentials
  #[arg(long)]
  pub all_spaces: bool,

  /// Re-convert and rewrite every page even when the cache looks fresh
  #[arg(long)]
  pub always_download: bool,

  /// Include archived pages alongside current ones
  #[arg(long)]
  pub include_archived: bool,

  /// Also reconcile each space's blogposts
  #[arg(long)]
  pub include_blogposts: bool,

  /// Include personal spaces when listing spaces
  #[arg(long)]
  pub include_personal_spaces: bool,

  /// Write Markdown to disk (disable for a dry run)
  #[arg(long, default_value = "true", action = clap::ArgAction::Set)]
  pub write_markdown: bool,

  /// Delete local files no longer present upstream
  #[arg(long, default_value = "true", action = clap::ArgAction::Set)]
  pub prune: bool,

  /// Argv to run after a successful reconciliation, with CWD set to --store
  #[arg(long, env = "CONFLUENCE_DL_POST_DOWNLOAD_CMD", value_name = "ARGV", num_args = 0..)]
  pub post_download_cmd: Vec<String>,

  /// Worker pool size; defaults to the logical CPU count
  #[arg(long, value_name = "N")]
  pub workers: Option<usize>,

  /// Max requests per second issued to the wiki
  #[arg(long, default_value = "10", value_name = "N")]
  pub rate_limit: usize,
}

/// Shell types for completion generation
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
  Bash,
  Zsh,
  Fish,
  Powershell,
  Elvish,
}

/// Color output options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorOption {
  Auto,
  Always,
  Never,
}

fn get_clap_styles() -> clap::builder::Styles {
  use clap::builder::styling::{AnsiColor, Effects};

  clap::builder::Styles::styled()
    .header(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
    .usage(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
    .literal(AnsiColor::BrightGreen.on_default())
    .placeholder(AnsiColor::BrightCyan.on_default())
    .error(AnsiColor::BrightRed.on_default() | Effects::BOLD)
    .valid(AnsiColor::BrightGreen.on_default())
    .invalid(AnsiColor::BrightRed.on_default())
}
