//! Application orchestrator — runs the stats flows and publishes results.
//!
//! Each flow fetches one kind of summary from Steam, renders it, and writes
//! it to the configured outputs. A failed fetch aborts the run. A failed
//! output is logged and the remaining outputs are still attempted.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use anyhow::{Context, bail};
use steambox_playtime::ranking::{retain_app_ids, take_as_reported};
use steambox_playtime::region::markdown_title;
use steambox_playtime::{
    BackoffPolicy, GameRecord, IconTable, LineLayout, Markers, RegionBlock, TOP_GAMES,
    format_lines, patch_file, rank_by_playtime, retry_on_rate_limit,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::Config;

/// The two independent summaries steam-box maintains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Top games by all-time playtime.
    AllTime,
    /// Games played in the last two weeks, most recent first.
    Recent,
}

impl Flow {
    pub const ALL: [Flow; 2] = [Flow::AllTime, Flow::Recent];

    /// Gist filename and Markdown heading.
    pub fn title(self) -> &'static str {
        match self {
            Self::AllTime => "⭐ My Most Played Steam Games",
            Self::Recent => "🔥 Recently Played Steam Games",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::AllTime => "all-time",
            Self::Recent => "recent",
        }
    }

    fn gist_id(self, config: &Config) -> Option<&str> {
        match self {
            Self::AllTime => config.gist_id.as_deref(),
            Self::Recent => config.gist_id_recent.as_deref(),
        }
    }

    fn markers(self, config: &Config) -> Markers {
        match self {
            Self::AllTime => Markers::steam_box(),
            Self::Recent => config.recent_markers.clone(),
        }
    }

    /// Only the recent flow labels nameless games as "Unknown Game"; the
    /// all-time flow renders them with the generic icon and an empty name.
    fn normalizes_empty_names(self) -> bool {
        matches!(self, Self::Recent)
    }
}

/// Turns fetched records into display lines for `flow`.
///
/// The all-time flow drops games outside `app_ids` (when non-empty) in case
/// Steam ignored the request filter.
pub fn build_lines(
    flow: Flow,
    records: Vec<GameRecord>,
    app_ids: &[u32],
    icons: &IconTable,
    layout: LineLayout,
) -> Vec<String> {
    let selected = match flow {
        Flow::AllTime => rank_by_playtime(retain_app_ids(records, app_ids), TOP_GAMES),
        Flow::Recent => take_as_reported(records, TOP_GAMES),
    };
    let selected: Vec<GameRecord> = if flow.normalizes_empty_names() {
        selected
            .into_iter()
            .map(GameRecord::with_unknown_name_fallback)
            .collect()
    } else {
        selected
    };
    format_lines(&selected, icons, layout)
}

/// Abstract gist writer.
///
/// Implemented by [`steambox_gist::Client`]; tests substitute a mock.
pub trait GistTarget: Send + Sync {
    /// Replaces one file of a gist with `lines` joined by newlines.
    fn replace_file<'a>(
        &'a self,
        gist_id: &'a str,
        filename: &'a str,
        lines: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<(), steambox_gist::Error>> + Send + 'a>>;
}

impl GistTarget for steambox_gist::Client {
    fn replace_file<'a>(
        &'a self,
        gist_id: &'a str,
        filename: &'a str,
        lines: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<(), steambox_gist::Error>> + Send + 'a>> {
        Box::pin(steambox_gist::Client::replace_file(self, gist_id, filename, lines))
    }
}

/// Where a flow's lines go.
pub struct Outputs<'a> {
    pub gist: Option<&'a dyn GistTarget>,
    pub markdown_file: Option<&'a Path>,
}

/// Writes `lines` to every configured output. Returns how many failed.
pub async fn publish(
    flow: Flow,
    gist_id: &str,
    markers: &Markers,
    lines: &[String],
    outputs: &Outputs<'_>,
) -> usize {
    let mut failures = 0;

    if let Some(gist) = outputs.gist {
        match gist.replace_file(gist_id, flow.title(), lines).await {
            Ok(()) => info!(flow = flow.label(), gist = gist_id, "updated gist"),
            Err(e) => {
                error!(flow = flow.label(), gist = gist_id, error = %e, "gist update failed");
                failures += 1;
            }
        }
    }

    if let Some(path) = outputs.markdown_file {
        let block = RegionBlock::new(markdown_title(gist_id, flow.title()), lines.to_vec());
        match patch_file(path, markers, &block).await {
            Ok(()) => info!(flow = flow.label(), path = %path.display(), "updated markdown file"),
            Err(e) => {
                error!(
                    flow = flow.label(),
                    path = %path.display(),
                    error = %e,
                    "markdown update failed"
                );
                failures += 1;
            }
        }
    }

    failures
}

/// Fetches the records for `flow`, backing off while Steam rate limits.
async fn fetch_records(
    flow: Flow,
    config: &Config,
    policy: &BackoffPolicy,
    cancel: &CancellationToken,
) -> anyhow::Result<Vec<GameRecord>> {
    let steam = steambox_steam_web::Client::new(&config.steam_api_key)?;
    let records = match flow {
        Flow::AllTime => {
            retry_on_rate_limit(policy, cancel, flow.label(), || {
                steam.get_owned_games(config.steam_id, &config.app_ids)
            })
            .await?
        }
        Flow::Recent => {
            retry_on_rate_limit(policy, cancel, flow.label(), || {
                steam.get_recently_played_games(config.steam_id, TOP_GAMES as u32)
            })
            .await?
        }
    };
    Ok(records)
}

/// Runs every configured flow until done or `cancel` fires.
pub async fn run(config: Config, cancel: CancellationToken) -> anyhow::Result<()> {
    let icons = IconTable::builtin();
    let policy = BackoffPolicy::default();

    let gist_client = if config.update.updates_gist() {
        Some(
            steambox_gist::Client::new(&config.gh_user, &config.gh_token)
                .context("gist output needs GH_USER and GH_TOKEN")?,
        )
    } else {
        None
    };
    let markdown_file = if config.update.updates_markdown() {
        config.markdown_file.as_deref()
    } else {
        None
    };
    let outputs = Outputs {
        gist: gist_client.as_ref().map(|c| c as &dyn GistTarget),
        markdown_file,
    };

    let mut failures = 0;
    for flow in Flow::ALL {
        let Some(gist_id) = flow.gist_id(&config) else {
            info!(flow = flow.label(), "no gist id configured, skipping");
            continue;
        };

        let records = fetch_records(flow, &config, &policy, &cancel)
            .await
            .with_context(|| format!("fetching {} games", flow.label()))?;
        info!(flow = flow.label(), games = records.len(), "fetched games");

        let lines = build_lines(flow, records, &config.app_ids, &icons, config.layout);
        failures += publish(flow, gist_id, &flow.markers(&config), &lines, &outputs).await;
    }

    if failures > 0 {
        bail!("{failures} output update(s) failed");
    }
    Ok(())
}
