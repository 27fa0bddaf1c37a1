//! GitHub Gist API client.
//!
//! Fetches a gist, replaces the content of one named file and submits the
//! whole gist back. Used to publish playtime summaries as pinned gists.

pub mod client;
pub mod types;

pub use client::{Client, Error};
pub use types::{Gist, GistFile};
