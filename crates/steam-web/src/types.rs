//! API response types for the Steam `IPlayerService` interface.

use serde::{Deserialize, Serialize};
use steambox_playtime::GameRecord;

/// A game entry from `GetOwnedGames` or `GetRecentlyPlayedGames`.
///
/// Both endpoints share this schema; `playtime_2weeks` is only filled in by
/// the recent endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayedGame {
    pub appid: u32,
    #[serde(default)]
    pub name: String,
    /// Total minutes played, all time.
    #[serde(default)]
    pub playtime_forever: u64,
    #[serde(default)]
    pub playtime_2weeks: u64,
    #[serde(default)]
    pub img_icon_url: String,
}

impl From<PlayedGame> for GameRecord {
    fn from(game: PlayedGame) -> Self {
        GameRecord::new(game.appid, game.name, game.playtime_forever)
    }
}

/// Payload of the `response` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GamesResponse {
    /// `game_count` for owned games, `total_count` for recent games.
    #[serde(default, alias = "total_count")]
    pub game_count: u32,
    /// Absent when the profile is private or has no games.
    #[serde(default)]
    pub games: Vec<PlayedGame>,
}

/// Top-level envelope (internal).
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    #[serde(default)]
    pub response: T,
}
