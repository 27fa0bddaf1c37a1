//! Steam Web API client for playtime statistics.
//!
//! Provides an async client for the `IPlayerService` endpoints of the
//! [Steam Web API](https://steamcommunity.com/dev). Responses are mapped into
//! [`steambox_playtime::GameRecord`]s, and HTTP 429 surfaces as a typed
//! [`Error::RateLimited`] so callers can back off without inspecting
//! messages.

pub mod client;
pub mod types;

pub use client::{Client, Error};
pub use types::{GamesResponse, PlayedGame};
