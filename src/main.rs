//! confluence-dl — mirror a Confluence wiki into local Markdown.

use std::process::ExitCode;

use clap::Parser;
use confluence_dl::cli::{Cli, Command};
use confluence_dl::color::ColorScheme;
use confluence_dl::commands::{completions, download, list_spaces, version};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  let colors = ColorScheme::new(cli.color);

  let result = match cli.command {
    Command::Download(args) => download::run(*args, cli.config.as_deref()).await,
    Command::ListSpaces(args) => list_spaces::run(*args, cli.config.as_deref(), false).await,
    Command::Version { json } => {
      version::run(json);
      Ok(())
    }
    Command::Completions { shell } => {
      completions::run(shell);
      Ok(())
    }
  };

  if let Err(err) = result {
    eprintln!("{} {err:#}", colors.error("error:"));
    return ExitCode::FAILURE;
  }
  ExitCode::SUCCESS
}

fn init_logging(verbose: u8) {
  let default_level = match verbose {
    0 => "info",
    1 => "debug",
    _ => "trace",
  };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("confluence_dl={default_level}")));

  tracing_subscriber::fmt().with_env_filter(filter).init();
}
