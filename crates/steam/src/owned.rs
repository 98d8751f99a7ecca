//! Client for the `IPlayerService/GetOwnedGames` Web API.

use crate::OwnedGames;
use crate::error::{ErrorKind, Result};
use crate::http::HttpOptions;
use async_trait::async_trait;
use exn::ResultExt;
use serde::Deserialize;
use sge_extract::models::{AccountId, OwnedTitle, Playtime};
use tracing::{info, instrument};

pub const DEFAULT_OWNED_GAMES_URL: &str = "https://api.steampowered.com/IPlayerService/GetOwnedGames/v0001/";

#[derive(Debug, Deserialize)]
struct Envelope {
    response: OwnedGamesResponse,
}

/// A private profile answers with an empty `response` object.
#[derive(Debug, Deserialize)]
struct OwnedGamesResponse {
    game_count: Option<u32>,
    games: Option<Vec<GameEntry>>,
}

#[derive(Debug, Deserialize)]
struct GameEntry {
    appid: u32,
    name: Option<String>,
    #[serde(default)]
    playtime_forever: u64,
    #[serde(default)]
    playtime_linux_forever: u64,
    #[serde(default)]
    playtime_mac_forever: u64,
    #[serde(default)]
    playtime_windows_forever: u64,
}
impl From<GameEntry> for OwnedTitle {
    fn from(game: GameEntry) -> Self {
        let playtime = Playtime {
            total: game.playtime_forever,
            linux: game.playtime_linux_forever,
            mac: game.playtime_mac_forever,
            windows: game.playtime_windows_forever,
        };
        OwnedTitle::new(game.appid, game.name.filter(|name| !name.trim().is_empty()), playtime)
    }
}

/// Lists the titles an account owns, free-to-play titles it has played
/// included.
///
/// One request per call: no retries and no rate limiting. Every failure other
/// than a private profile is reported as
/// [`UpstreamUnavailable`](ErrorKind::UpstreamUnavailable).
#[derive(Debug, Clone)]
pub struct OwnedGamesClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl OwnedGamesClient {
    pub fn new(api_key: impl Into<String>, options: &HttpOptions) -> Result<Self> {
        Ok(Self {
            http: options.build()?,
            url: DEFAULT_OWNED_GAMES_URL.to_string(),
            api_key: api_key.into(),
        })
    }

    /// Point the client at a different endpoint (a proxy, or a test server).
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    fn parse(body: &[u8]) -> Result<Vec<OwnedTitle>> {
        let envelope: Envelope = serde_json::from_slice(body).or_raise(|| ErrorKind::UpstreamUnavailable)?;
        match envelope.response {
            OwnedGamesResponse {
                games: None,
                game_count: None,
            } => exn::bail!(ErrorKind::AccountPrivate),
            OwnedGamesResponse { games, .. } => {
                Ok(games.unwrap_or_default().into_iter().map(OwnedTitle::from).collect())
            },
        }
    }
}

#[async_trait]
impl OwnedGames for OwnedGamesClient {
    #[instrument(skip(self))]
    async fn owned_titles(&self, account: AccountId) -> Result<Vec<OwnedTitle>> {
        let steam_id = account.to_string();
        let response = self
            .http
            .get(&self.url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("steamid", steam_id.as_str()),
                ("format", "json"),
                ("include_appinfo", "1"),
                ("include_played_free_games", "1"),
            ])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            // The URL carries the API key.
            .map_err(reqwest::Error::without_url)
            .or_raise(|| ErrorKind::UpstreamUnavailable)?;
        let body = response
            .bytes()
            .await
            .map_err(reqwest::Error::without_url)
            .or_raise(|| ErrorKind::UpstreamUnavailable)?;
        let titles = Self::parse(&body)?;
        info!(titles = titles.len(), "retrieved owned games");
        Ok(titles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::mock_server;
    use sge_extract::models::TitleId;

    const ACCOUNT: AccountId = AccountId::new(76561197960287930);

    fn client(url: String) -> OwnedGamesClient {
        OwnedGamesClient::new("test-key", &HttpOptions::default()).unwrap().with_url(url)
    }

    #[tokio::test]
    async fn test_owned_titles_in_upstream_order() {
        let json = r#"{"response": {"game_count": 2, "games": [
            {"appid": 620, "name": "Portal 2", "playtime_forever": 1200, "playtime_linux_forever": 60,
             "playtime_mac_forever": 0, "playtime_windows_forever": 1140},
            {"appid": 10, "name": "Counter-Strike", "playtime_forever": 5}
        ]}}"#;
        let (url, handle) = mock_server(200, json).await;

        let titles = client(url).owned_titles(ACCOUNT).await.unwrap();
        assert_eq!(titles.len(), 2);
        assert_eq!(titles[0].title_id, TitleId::new(620));
        assert_eq!(titles[0].name.as_deref(), Some("Portal 2"));
        assert_eq!(titles[0].playtime.linux, 60);
        assert_eq!(titles[1].title_id, TitleId::new(10));
        assert_eq!(titles[1].playtime.total, 5);
        assert_eq!(titles[1].playtime.windows, 0);

        let request = handle.await.unwrap();
        assert!(request.contains("steamid=76561197960287930"));
        assert!(request.contains("include_appinfo=1"));
        assert!(request.contains("include_played_free_games=1"));
        assert!(request.contains("key=test-key"));
    }

    #[tokio::test]
    async fn test_private_profile() {
        let (url, _handle) = mock_server(200, r#"{"response": {}}"#).await;
        let error = client(url).owned_titles(ACCOUNT).await.unwrap_err();
        assert!(matches!(&*error, ErrorKind::AccountPrivate));
        assert!(error.to_string().contains("\"Game details\" to Public"));
    }

    #[tokio::test]
    async fn test_empty_public_library() {
        let (url, _handle) = mock_server(200, r#"{"response": {"game_count": 0}}"#).await;
        assert!(client(url).owned_titles(ACCOUNT).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_server_error_is_unavailable() {
        let (url, _handle) = mock_server(500, "oops").await;
        let error = client(url).owned_titles(ACCOUNT).await.unwrap_err();
        assert!(matches!(&*error, ErrorKind::UpstreamUnavailable));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_unavailable() {
        let (url, _handle) = mock_server(200, "<html>maintenance</html>").await;
        let error = client(url).owned_titles(ACCOUNT).await.unwrap_err();
        assert!(matches!(&*error, ErrorKind::UpstreamUnavailable));
    }

    #[tokio::test]
    async fn test_unreachable_is_unavailable() {
        // Nothing listens on port 9 (discard) on the loopback interface.
        let error = client("http://127.0.0.1:9/".to_string()).owned_titles(ACCOUNT).await.unwrap_err();
        assert!(matches!(&*error, ErrorKind::UpstreamUnavailable));
    }
}
