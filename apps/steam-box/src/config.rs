//! Runtime configuration read from the environment.
//!
//! Variable names match the GitHub Action inputs steam-box has always
//! used, so existing workflows keep working.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use steambox_playtime::{LineLayout, Markers};

/// Which outputs each flow updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateTarget {
    #[default]
    Gist,
    Markdown,
    GistAndMarkdown,
}

impl UpdateTarget {
    /// Parses the `GIST` variable. Unknown values select the gist only.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "MARKDOWN" => Self::Markdown,
            "GIST_AND_MARKDOWN" => Self::GistAndMarkdown,
            _ => Self::Gist,
        }
    }

    pub fn updates_gist(self) -> bool {
        matches!(self, Self::Gist | Self::GistAndMarkdown)
    }

    pub fn updates_markdown(self) -> bool {
        matches!(self, Self::Markdown | Self::GistAndMarkdown)
    }
}

/// steam-box configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub steam_api_key: String,
    pub steam_id: u64,
    /// Restricts the all-time summary to these games when non-empty.
    pub app_ids: Vec<u32>,
    pub gh_user: String,
    pub gh_token: String,
    /// Target of the all-time summary; the flow is skipped when unset.
    pub gist_id: Option<String>,
    /// Target of the recent summary; the flow is skipped when unset.
    pub gist_id_recent: Option<String>,
    pub layout: LineLayout,
    pub update: UpdateTarget,
    pub markdown_file: Option<PathBuf>,
    /// Region of the Markdown file written by the recent flow.
    pub recent_markers: Markers,
    /// Overall deadline for the run.
    pub timeout: Option<Duration>,
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let Some(steam_api_key) = non_empty("STEAM_API_KEY") else {
            bail!("STEAM_API_KEY is not set");
        };
        let steam_id = non_empty("STEAM_ID")
            .context("STEAM_ID is not set")?
            .parse::<u64>()
            .context("STEAM_ID must be a numeric SteamID64")?;

        let timeout = non_empty("STEAM_BOX_TIMEOUT_SECS")
            .map(|v| v.parse::<u64>())
            .transpose()
            .context("STEAM_BOX_TIMEOUT_SECS must be a whole number of seconds")?
            .map(Duration::from_secs);

        let recent_markers = non_empty("MARKDOWN_RECENT_MARKER")
            .map(|name| Markers::named(&name))
            .unwrap_or_else(Markers::steam_box);

        Ok(Self {
            steam_api_key,
            steam_id,
            app_ids: parse_app_ids(&lookup("APP_ID").unwrap_or_default()),
            gh_user: non_empty("GH_USER").unwrap_or_default(),
            gh_token: non_empty("GH_TOKEN").unwrap_or_default(),
            gist_id: non_empty("GIST_ID"),
            gist_id_recent: non_empty("GIST_ID_RECENT"),
            layout: LineLayout::from_multi_line(lookup("MULTILINE").as_deref() == Some("YES")),
            update: UpdateTarget::parse(&lookup("GIST").unwrap_or_default()),
            markdown_file: non_empty("MARKDOWN_FILE").map(PathBuf::from),
            recent_markers,
            timeout,
        })
    }
}

/// Parses a comma-separated app id list, skipping entries that are not ids.
pub fn parse_app_ids(value: &str) -> Vec<u32> {
    value
        .split(',')
        .filter_map(|id| id.trim().parse().ok())
        .collect()
}
