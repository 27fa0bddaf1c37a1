//! Steam Web API client.
//!
//! Async HTTP client using `reqwest`; the API key travels as the `key`
//! query parameter.

use reqwest::StatusCode;
use reqwest::header::RETRY_AFTER;
use steambox_playtime::{GameRecord, RateLimitSignal};
use tracing::debug;

use crate::types::{ApiResponse, GamesResponse};

const DEFAULT_BASE_URL: &str = "https://api.steampowered.com";

const OWNED_GAMES_ENDPOINT: &str = "/IPlayerService/GetOwnedGames/v1/";
const RECENT_GAMES_ENDPOINT: &str = "/IPlayerService/GetRecentlyPlayedGames/v1/";

/// Errors from the Steam Web API client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP 429. `retry_after` echoes the `Retry-After` header in seconds.
    #[error("rate limited by Steam (HTTP 429)")]
    RateLimited { retry_after: Option<u64> },

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing API key")]
    InvalidKey,
}

impl RateLimitSignal for Error {
    fn is_rate_limited(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::Http(e) => e.status() == Some(StatusCode::TOO_MANY_REQUESTS),
            _ => false,
        }
    }
}

/// Steam Web API client.
pub struct Client {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl Client {
    /// Creates a new client with the given API key.
    pub fn new(api_key: &str) -> Result<Self, Error> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(Error::InvalidKey);
        }

        let http = reqwest::Client::builder().build()?;

        Ok(Self {
            http,
            api_key: api_key.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Sets a custom base URL (for testing).
    #[cfg(test)]
    pub(crate) fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Performs a keyed GET request and decodes the `response` envelope.
    async fn get_games(
        &self,
        endpoint: &str,
        mut params: Vec<(String, String)>,
    ) -> Result<GamesResponse, Error> {
        params.insert(0, ("key".into(), self.api_key.clone()));
        params.push(("format".into(), "json".into()));

        let url = format!("{}{}", self.base_url, endpoint);
        let resp = self.http.get(&url).query(&params).send().await?;
        let status = resp.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = resp
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok());
            return Err(Error::RateLimited { retry_after });
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.bytes().await?;
        let envelope: ApiResponse<GamesResponse> = serde_json::from_slice(&body)?;
        debug!(
            endpoint,
            games = envelope.response.games.len(),
            "steam response decoded"
        );
        Ok(envelope.response)
    }

    /// Returns the user's owned games with names and all-time playtime.
    ///
    /// A non-empty `app_ids` restricts the result to those games.
    pub async fn get_owned_games(
        &self,
        steam_id: u64,
        app_ids: &[u32],
    ) -> Result<Vec<GameRecord>, Error> {
        let params = owned_games_params(steam_id, app_ids);
        let resp = self.get_games(OWNED_GAMES_ENDPOINT, params).await?;
        Ok(resp.games.into_iter().map(GameRecord::from).collect())
    }

    /// Returns up to `count` games played in the last two weeks, most recent
    /// first.
    pub async fn get_recently_played_games(
        &self,
        steam_id: u64,
        count: u32,
    ) -> Result<Vec<GameRecord>, Error> {
        let params = vec![
            ("steamid".into(), steam_id.to_string()),
            ("count".into(), count.to_string()),
        ];
        let resp = self.get_games(RECENT_GAMES_ENDPOINT, params).await?;
        Ok(resp.games.into_iter().map(GameRecord::from).collect())
    }
}

/// Builds query parameters for `GetOwnedGames`.
fn owned_games_params(steam_id: u64, app_ids: &[u32]) -> Vec<(String, String)> {
    let mut params = vec![
        ("steamid".into(), steam_id.to_string()),
        ("include_appinfo".into(), "true".into()),
        ("include_played_free_games".into(), "true".into()),
    ];

    for (i, app_id) in app_ids.iter().enumerate() {
        params.push((format!("appids_filter[{i}]"), app_id.to_string()));
    }

    params
}
