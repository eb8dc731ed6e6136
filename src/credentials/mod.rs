//! Credential resolution for wiki authentication.
//!
//! # Atlassian API Tokens
//!
//! Atlassian Cloud requires **API tokens**, not traditional passwords. The
//! token itself is never passed on the command line or stored in config: it
//! comes from running `auth-token-cmd` and reading the first line of its
//! stdout (see [`run_token_cmd`]).

mod types;

pub use types::{Credential, CredentialError, run_token_cmd};
