//! Per-game decorative prefixes.
//!
//! The table is built once by the caller and passed by reference; it is
//! never mutated after construction.

use std::collections::HashMap;

/// Sentinel name for games Steam reports without a name.
pub const UNKNOWN_GAME: &str = "Unknown Game";

/// Prefix for [`UNKNOWN_GAME`] entries that miss the table.
const UNKNOWN_ICON: &str = "❓ ";

/// Prefix for every other game that misses the table.
const GENERIC_ICON: &str = "✨ ";

/// Built-in prefixes keyed by Steam app id.
const BUILTIN_ICONS: &[(u32, &str)] = &[
    (70, "λ "),              // Half-Life
    (220, "λ² "),            // Half-Life 2
    (500, "🧟 "),            // Left 4 Dead
    (550, "🧟 "),            // Left 4 Dead 2
    (570, "⚔️ "),            // Dota 2
    (730, "🔫 "),            // CS:GO
    (8930, "🌏 "),           // Sid Meier's Civilization V
    (252950, "🚀 "),         // Rocket League
    (269950, "✈️ "),         // X-Plane 11
    (271590, "🚓 "),         // GTA 5
    (359550, "🔫 "),         // Tom Clancy's Rainbow Six Siege
    (431960, "💻 "),         // Wallpaper Engine
    (578080, "🍳 "),         // PUBG
    (945360, "🕵️\u{200d}♂️ "), // Among Us
    (1250410, "🛩️ "),        // Microsoft Flight Simulator
    (1091500, "🦾 "),        // Cyberpunk 2077
    (594650, "🎯 "),         // Hunt: Showdown
    (230410, "🐹 "),         // Warframe
    (397540, "🤖 "),         // Borderlands 3
    (49520, "🤖 "),          // Borderlands 2
    (440, "🎯 "),            // Team Fortress 2
    (1973530, "🚌 "),        // Limbus Company
    (1454400, "🍪 "),        // Cookie Clicker
    (2420510, "🎤 "),        // HoloCure - Save the Fans!
    (459820, "💖 "),         // Crush Crush
    (629520, "🎶 "),         // Soundpad
    (368340, "⚔️ "),         // CrossCode
    (588650, "🗡️ "),         // Dead Cells
    (1145360, "🔥 "),        // Hades
    (1229490, "💣 "),        // ULTRAKILL
    (2835570, "🎯 "),        // Buckshot Roulette
    (247080, "💀 "),         // Crypt of the NecroDancer
    (400040, "📸 "),         // ShareX
    (1677740, "🤪 "),        // Stumble Guys
    (250900, "👶 "),         // The Binding of Isaac: Rebirth
    (1313140, "🐑 "),        // Cult of the Lamb
    (1388880, "📚 "),        // Doki Doki Literature Club Plus!
    (311690, "🔫 "),         // Enter the Gungeon
    (1229380, "🎹 "),        // Everhood
    (367520, "🦇 "),         // Hollow Knight
    (1061090, "👑 "),        // Jump King
    (1256670, "📖 "),        // Library Of Ruina
    (3590, "🌻 "),           // Plants vs. Zombies GOTY Edition
    (620, "🌀 "),            // Portal 2
    (646570, "🃏 "),         // Slay the Spire
    (413150, "🌾 "),         // Stardew Valley
    (105600, "🌍 "),         // Terraria
    (391540, "💔 "),         // Undertale
    (1794680, "🧛 "),        // Vampire Survivors
    (2726450, "🔪 "),        // Windowkill
];

/// Immutable mapping from Steam app id to icon prefix.
#[derive(Debug, Clone)]
pub struct IconTable {
    icons: HashMap<u32, &'static str>,
}

impl IconTable {
    /// Builds the table of known games.
    pub fn builtin() -> Self {
        Self::from_entries(BUILTIN_ICONS.iter().copied())
    }

    /// Builds a table from explicit entries. Later duplicates win.
    pub fn from_entries(entries: impl IntoIterator<Item = (u32, &'static str)>) -> Self {
        Self {
            icons: entries.into_iter().collect(),
        }
    }

    /// Returns the icon prefix registered for `app_id`, if any.
    pub fn icon(&self, app_id: u32) -> Option<&'static str> {
        self.icons.get(&app_id).copied()
    }

    /// Returns `name` prefixed with its icon.
    ///
    /// Table hits use the mapped prefix. Misses fall back to `❓` for the
    /// [`UNKNOWN_GAME`] sentinel and `✨` for everything else.
    pub fn resolve(&self, app_id: u32, name: &str) -> String {
        let prefix = match self.icon(app_id) {
            Some(icon) => icon,
            None if name == UNKNOWN_GAME => UNKNOWN_ICON,
            None => GENERIC_ICON,
        };
        format!("{prefix}{name}")
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}
