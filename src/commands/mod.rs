//! CLI subcommand handlers.
//!
//! Each module wires the parsed CLI arguments into the config layer, the
//! credential resolver, and the Confluence client/Downloader, keeping
//! `main.rs` a thin dispatcher.

pub mod completions;
pub mod download;
pub mod list_spaces;
pub mod version;
