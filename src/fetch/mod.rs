//! Upstream league data access.
//!
//! The pipeline only talks to the [`LeagueSource`] trait. [`HttpLeagueClient`]
//! is the production implementation over the public REST API;
//! [`mock::MockLeagueSource`] is an in-memory stand-in for tests.

pub mod mock;
mod wire;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::models::{
    EntryId, GameweekPicks, LeagueId, ManagerHistory, PlayerDirectory, StandingsPage,
};

pub use mock::MockLeagueSource;

/// Errors that can occur while reading from the upstream API.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("No response: {0}")]
    NoResponse(String),

    #[error("Could not decode response: {0}")]
    DecodeFailure(String),

    #[error("Upstream returned HTTP {status}")]
    UpstreamError { status: u16 },

    #[error("Fetch failed: {0}")]
    Unknown(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::DecodeFailure(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::UpstreamError {
                status: status.as_u16(),
            }
        } else if err.is_connect() || err.is_timeout() || err.is_request() {
            FetchError::NoResponse(err.to_string())
        } else {
            FetchError::Unknown(err.to_string())
        }
    }
}

/// Read operations against the league data source. All are idempotent.
#[async_trait]
pub trait LeagueSource: Send + Sync {
    /// Source name for logging.
    fn name(&self) -> &'static str;

    /// One page of classic league standings.
    async fn fetch_standings_page(
        &self,
        league_id: LeagueId,
        page: u32,
    ) -> Result<StandingsPage, FetchError>;

    /// A manager's full season history and raw chip activations.
    async fn fetch_manager_history(&self, entry_id: EntryId) -> Result<ManagerHistory, FetchError>;

    /// A manager's squad for one gameweek.
    async fn fetch_gameweek_picks(
        &self,
        entry_id: EntryId,
        event: u32,
    ) -> Result<GameweekPicks, FetchError>;

    /// Player names, used for captain lookup.
    async fn fetch_player_directory(&self) -> Result<PlayerDirectory, FetchError> {
        Ok(PlayerDirectory::default())
    }
}

/// Configuration for the HTTP client.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// API root
    pub base_url: String,

    /// Request timeout
    pub timeout: Duration,

    /// User agent string
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("league-stats/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

pub const DEFAULT_BASE_URL: &str = "https://fantasy.premierleague.com/api/";

/// HTTP implementation of [`LeagueSource`].
pub struct HttpLeagueClient {
    client: Client,
    base_url: Url,
}

impl HttpLeagueClient {
    /// Create a new client with the given configuration.
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("league-stats")),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| FetchError::Unknown(format!("could not build HTTP client: {e}")))?;

        let mut base_url = Url::parse(&config.base_url).map_err(|e| {
            FetchError::InvalidRequest(format!("bad base url {}: {e}", config.base_url))
        })?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { client, base_url })
    }

    /// Create a client with default configuration.
    pub fn with_defaults() -> Result<Self, FetchError> {
        Self::new(FetcherConfig::default())
    }

    fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(path)
            .map_err(|e| FetchError::InvalidRequest(format!("bad endpoint {path}: {e}")))
    }

    fn standings_url(&self, league_id: LeagueId, page: u32) -> Result<Url, FetchError> {
        let mut url = self.endpoint(&format!("leagues-classic/{league_id}/standings/"))?;
        url.query_pairs_mut()
            .append_pair("page_standings", &page.to_string());
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        debug!("GET {}", url);

        let response = self.client.get(url.as_str()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UpstreamError {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| FetchError::DecodeFailure(format!("{url}: {e}")))
    }
}

fn require_league(league_id: LeagueId) -> Result<(), FetchError> {
    if league_id.is_valid() {
        Ok(())
    } else {
        Err(FetchError::InvalidRequest(format!("invalid league id {league_id}")))
    }
}

fn require_entry(entry_id: EntryId) -> Result<(), FetchError> {
    if entry_id.is_valid() {
        Ok(())
    } else {
        Err(FetchError::InvalidRequest(format!("invalid entry id {entry_id}")))
    }
}

#[async_trait]
impl LeagueSource for HttpLeagueClient {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch_standings_page(
        &self,
        league_id: LeagueId,
        page: u32,
    ) -> Result<StandingsPage, FetchError> {
        require_league(league_id)?;
        if page == 0 {
            return Err(FetchError::InvalidRequest("pages start at 1".to_string()));
        }

        let url = self.standings_url(league_id, page)?;
        let response: wire::StandingsResponse = self.get_json(url).await?;
        Ok(response.into_page(league_id, page))
    }

    async fn fetch_manager_history(&self, entry_id: EntryId) -> Result<ManagerHistory, FetchError> {
        require_entry(entry_id)?;

        let url = self.endpoint(&format!("entry/{entry_id}/history/"))?;
        let response: wire::HistoryResponse = self.get_json(url).await?;
        Ok(response.into())
    }

    async fn fetch_gameweek_picks(
        &self,
        entry_id: EntryId,
        event: u32,
    ) -> Result<GameweekPicks, FetchError> {
        require_entry(entry_id)?;
        if event == 0 {
            return Err(FetchError::InvalidRequest("gameweeks start at 1".to_string()));
        }

        let url = self.endpoint(&format!("entry/{entry_id}/event/{event}/picks/"))?;
        let response: wire::PicksResponse = self.get_json(url).await?;
        Ok(response.into_picks(entry_id, event))
    }

    async fn fetch_player_directory(&self) -> Result<PlayerDirectory, FetchError> {
        let url = self.endpoint("bootstrap-static/")?;
        let response: wire::BootstrapResponse = self.get_json(url).await?;
        Ok(response.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_with_base(base: &str) -> HttpLeagueClient {
        HttpLeagueClient::new(FetcherConfig {
            base_url: base.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_fetcher_config_default() {
        let config = FetcherConfig::default();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("league-stats/"));
    }

    #[test]
    fn test_standings_url() {
        let client = client_with_base("https://example.com/api/");
        let url = client.standings_url(LeagueId::new(314), 2).unwrap();

        assert_eq!(
            url.as_str(),
            "https://example.com/api/leagues-classic/314/standings/?page_standings=2"
        );
    }

    #[test]
    fn test_base_url_without_trailing_slash() {
        let client = client_with_base("https://example.com/api");
        let url = client.endpoint("entry/7/history/").unwrap();

        assert_eq!(url.as_str(), "https://example.com/api/entry/7/history/");
    }

    #[tokio::test]
    async fn test_zero_ids_rejected_before_network() {
        let client = client_with_base("http://127.0.0.1:9/");

        let err = client
            .fetch_standings_page(LeagueId::new(0), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidRequest(_)));

        let err = client
            .fetch_manager_history(EntryId::new(0))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidRequest(_)));

        let err = client
            .fetch_gameweek_picks(EntryId::new(3), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidRequest(_)));
    }

    #[test]
    fn test_bad_base_url_rejected() {
        let result = HttpLeagueClient::new(FetcherConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(FetchError::InvalidRequest(_))));
    }

    mod against_local_server {
        use super::*;
        use axum::http::StatusCode;
        use axum::routing::get;
        use axum::Router;
        use std::net::SocketAddr;

        const STANDINGS: &str = r#"{
            "league": {"name": "Office League"},
            "standings": {
                "has_next": true,
                "results": [
                    {"entry": 11, "entry_name": "Salah Days", "player_name": "Ana",
                     "event_total": 64, "rank": 1, "last_rank": 2, "total": 1820}
                ]
            }
        }"#;

        async fn serve() -> SocketAddr {
            let app = Router::new()
                .route(
                    "/api/leagues-classic/1/standings/",
                    get(|| async { STANDINGS }),
                )
                .route(
                    "/api/leagues-classic/2/standings/",
                    get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
                )
                .route(
                    "/api/leagues-classic/3/standings/",
                    get(|| async { r#"{"standings": {"results": ["# }),
                );

            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });
            addr
        }

        fn client_for(addr: SocketAddr) -> HttpLeagueClient {
            client_with_base(&format!("http://{addr}/api/"))
        }

        #[tokio::test]
        async fn test_standings_page_decoded() {
            let client = client_for(serve().await);

            let page = client
                .fetch_standings_page(LeagueId::new(1), 1)
                .await
                .unwrap();

            assert_eq!(page.league_name.as_deref(), Some("Office League"));
            assert!(page.has_next);
            assert_eq!(page.members.len(), 1);
            assert_eq!(page.members[0].entry_id, EntryId::new(11));
            assert_eq!(page.members[0].entry_name, "Salah Days");
        }

        #[tokio::test]
        async fn test_non_success_status_is_upstream_error() {
            let client = client_for(serve().await);

            let err = client
                .fetch_standings_page(LeagueId::new(2), 1)
                .await
                .unwrap_err();
            assert_eq!(err, FetchError::UpstreamError { status: 503 });

            let err = client
                .fetch_manager_history(EntryId::new(11))
                .await
                .unwrap_err();
            assert_eq!(err, FetchError::UpstreamError { status: 404 });
        }

        #[tokio::test]
        async fn test_malformed_body_is_decode_failure() {
            let client = client_for(serve().await);

            let err = client
                .fetch_standings_page(LeagueId::new(3), 1)
                .await
                .unwrap_err();
            assert!(matches!(err, FetchError::DecodeFailure(_)));
        }

        #[tokio::test]
        async fn test_refused_connection_is_no_response() {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            drop(listener);

            let err = client_for(addr)
                .fetch_standings_page(LeagueId::new(1), 1)
                .await
                .unwrap_err();
            assert!(matches!(err, FetchError::NoResponse(_)));
        }
    }

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::UpstreamError { status: 503 };
        assert_eq!(err.to_string(), "Upstream returned HTTP 503");
    }
}
