//! `version` subcommand.

pub fn run(json: bool) {
  let version = env!("CARGO_PKG_VERSION");
  if json {
    println!("{{\"version\": \"{version}\"}}");
  } else {
    println!("confluence-dl {version}");
  }
}
