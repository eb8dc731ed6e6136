//! Confluence module: the remote API client, its error taxonomy, and the
//! data transfer objects it decodes responses into.

pub mod client;
pub mod error;
pub mod models;

pub use client::{ConfluenceApi, ConfluenceClient, ListPage, ListSpacesOptions, PageListQuery};
pub use error::ClientError;
pub use models::{ContentType, Page, Space, User};
