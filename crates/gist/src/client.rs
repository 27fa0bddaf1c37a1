//! GitHub Gist API client.
//!
//! Async HTTP client using `reqwest` with basic authentication
//! (username + personal access token).

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use tracing::{debug, info};

use crate::types::Gist;

const DEFAULT_BASE_URL: &str = "https://api.github.com";
const USER_AGENT: &str = "steam-box";

/// Errors from the Gist client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing GitHub credentials")]
    InvalidCredentials,
}

/// GitHub Gist API client.
pub struct Client {
    http: reqwest::Client,
    username: String,
    token: String,
    base_url: String,
}

impl Client {
    /// Creates a new client authenticating as `username` with `token`.
    pub fn new(username: &str, token: &str) -> Result<Self, Error> {
        let token = token.trim();
        if token.is_empty() {
            return Err(Error::InvalidCredentials);
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            username: username.trim().to_string(),
            token: token.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Sets a custom base URL (for testing).
    #[cfg(test)]
    pub(crate) fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    fn gist_url(&self, id: &str) -> String {
        format!("{}/gists/{id}", self.base_url)
    }

    /// Turns a non-success response into [`Error::Api`].
    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(Error::Api {
            status: status.as_u16(),
            body,
        })
    }

    /// Fetches a gist by id.
    pub async fn get_gist(&self, id: &str) -> Result<Gist, Error> {
        let resp = self
            .http
            .get(self.gist_url(id))
            .basic_auth(&self.username, Some(&self.token))
            .send()
            .await?;
        let body = Self::check(resp).await?.bytes().await?;
        let gist: Gist = serde_json::from_slice(&body)?;
        debug!(gist = id, files = gist.files.len(), "gist fetched");
        Ok(gist)
    }

    /// Submits `gist` as an edit of gist `id`.
    pub async fn update_gist(&self, id: &str, gist: &Gist) -> Result<(), Error> {
        let resp = self
            .http
            .patch(self.gist_url(id))
            .basic_auth(&self.username, Some(&self.token))
            .json(gist)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    /// Replaces the content of `filename` in gist `id` with `lines` joined
    /// by newlines.
    pub async fn replace_file(&self, id: &str, filename: &str, lines: &[String]) -> Result<(), Error> {
        let mut gist = self.get_gist(id).await?;
        gist.set_file_content(filename, lines.join("\n"));
        self.update_gist(id, &gist).await?;
        info!(gist = id, filename, "gist updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// Reads one HTTP request, including a `Content-Length` body.
    async fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = vec![0u8; 8192];
        loop {
            let n = stream.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(head_end) = text.find("\r\n\r\n") {
                let content_length = text[..head_end]
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= head_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Starts a mock HTTP server answering one request per canned
    /// `(status, body)` response. The handle resolves to the raw requests.
    async fn mock_server(
        responses: Vec<(u16, String)>,
    ) -> (String, tokio::task::JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let url = format!("http://127.0.0.1:{port}");

        let handle = tokio::spawn(async move {
            let mut requests = Vec::new();
            for (status, body) in responses {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                requests.push(read_request(&mut stream).await);

                let resp = format!(
                    "HTTP/1.1 {status} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(resp.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
            requests
        });

        (url, handle)
    }

    const GIST_JSON: &str = r#"{"id":"abc","description":"stats","files":{
        "⭐ My Most Played Steam Games":{"filename":"⭐ My Most Played Steam Games","content":"old"},
        "notes.txt":{"filename":"notes.txt","content":"keep me"}
    }}"#;

    #[tokio::test]
    async fn get_gist_parses_files() {
        let (url, handle) = mock_server(vec![(200, GIST_JSON.into())]).await;

        let client = Client::new("user", "token").unwrap().with_base_url(url);
        let gist = client.get_gist("abc").await.unwrap();

        assert_eq!(gist.id, "abc");
        assert_eq!(gist.file_content("notes.txt"), Some("keep me"));

        let requests = handle.await.unwrap();
        assert!(requests[0].starts_with("GET /gists/abc "));
        let lower = requests[0].to_lowercase();
        assert!(lower.contains("authorization: basic "));
        assert!(lower.contains("user-agent: steam-box"));
    }

    #[tokio::test]
    async fn replace_file_submits_whole_gist() {
        let (url, handle) = mock_server(vec![(200, GIST_JSON.into()), (200, "{}".into())]).await;

        let client = Client::new("user", "token").unwrap().with_base_url(url);
        let lines = vec!["line one".to_string(), "line two".to_string()];
        client
            .replace_file("abc", "⭐ My Most Played Steam Games", &lines)
            .await
            .unwrap();

        let requests = handle.await.unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests[1].starts_with("PATCH /gists/abc "));

        let body = &requests[1][requests[1].find("\r\n\r\n").unwrap() + 4..];
        let sent: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(
            sent["files"]["⭐ My Most Played Steam Games"]["content"],
            "line one\nline two"
        );
        assert_eq!(sent["files"]["notes.txt"]["content"], "keep me");
        assert!(requests[1].to_lowercase().contains("content-type: application/json"));
    }

    #[tokio::test]
    async fn missing_gist_is_api_error() {
        let (url, handle) =
            mock_server(vec![(404, r#"{"message":"Not Found"}"#.into())]).await;

        let client = Client::new("user", "token").unwrap().with_base_url(url);
        let err = client.replace_file("nope", "f", &[]).await.unwrap_err();

        assert!(matches!(err, Error::Api { status: 404, .. }));
        assert_eq!(handle.await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_edit_is_reported() {
        let (url, handle) = mock_server(vec![
            (200, GIST_JSON.into()),
            (422, r#"{"message":"Validation Failed"}"#.into()),
        ])
        .await;

        let client = Client::new("user", "token").unwrap().with_base_url(url);
        let err = client.replace_file("abc", "f", &[]).await.unwrap_err();
        let err_msg = err.to_string();
        assert!(err_msg.contains("422"), "error should mention 422: {err_msg}");

        handle.abort();
    }

    #[test]
    fn empty_token_rejected() {
        assert!(matches!(Client::new("user", " "), Err(Error::InvalidCredentials)));
    }
}
