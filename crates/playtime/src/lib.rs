//! Playtime summary core for steam-box.
//!
//! This crate turns raw per-game playtime records into display lines and
//! splices them into documents. It performs no network I/O itself: the
//! Steam and Gist clients live in their own crates and plug in through
//! [`RateLimitSignal`].
//!
//! # Pipeline
//!
//! - **Fetch** — [`backoff::retry_on_rate_limit`] wraps the upstream call
//!   with bounded exponential backoff on rate-limit errors
//! - **Rank** — [`ranking::rank_by_playtime`] keeps the top 10 by playtime
//! - **Format** — [`format::format_lines`] renders lines with icons from
//!   [`icons::IconTable`]
//! - **Patch** — [`region::patch_region`] replaces the marker-bounded region
//!   of a Markdown document

pub mod backoff;
pub mod format;
pub mod icons;
pub mod ranking;
pub mod region;
pub mod types;

// Re-export primary types for convenience.
pub use backoff::{BackoffPolicy, FetchError, RateLimitSignal, retry_on_rate_limit};
pub use format::{LineLayout, Playtime, format_lines};
pub use icons::{IconTable, UNKNOWN_GAME};
pub use ranking::{TOP_GAMES, rank_by_playtime};
pub use region::{Markers, RegionBlock, RegionError, patch_file, patch_region};
pub use types::GameRecord;
