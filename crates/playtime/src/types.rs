//! Domain types shared by the playtime pipeline.

use crate::icons::UNKNOWN_GAME;

/// A single game's playtime as reported by the stats provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    pub app_id: u32,
    /// Display name. Steam occasionally reports an empty name.
    pub name: String,
    pub total_playtime_minutes: u64,
}

impl GameRecord {
    pub fn new(app_id: u32, name: impl Into<String>, total_playtime_minutes: u64) -> Self {
        Self {
            app_id,
            name: name.into(),
            total_playtime_minutes,
        }
    }

    /// Replaces an empty name with the [`UNKNOWN_GAME`] sentinel.
    pub fn with_unknown_name_fallback(mut self) -> Self {
        if self.name.is_empty() {
            self.name = UNKNOWN_GAME.to_string();
        }
        self
    }
}
