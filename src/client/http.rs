//! HTTP transport for the listing API and artifact downloads
//!
//! Provides a unified reqwest-backed client with:
//! - Shared connection pool across listing and artifact fetches
//! - Fixed request timeout (the API stalls rather than errors under load)
//! - Randomized User-Agent header per request

use crate::client::parser::parse_list_response;
use crate::client::{
    ArtifactClient, ClientError, ClientResult, ListingClient, ListingQuery, PageResponse,
    PAGE_SIZE,
};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Default listing API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://yts.mx/api/v2/list_movies.json";

/// Per-request timeout. The listing API tends to hang rather than return
/// errors when throttling, so a short timeout keeps retries moving.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Browser User-Agent pool; one is picked at random for every request.
const USER_AGENTS: [&str; 5] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:124.0) Gecko/20100101 Firefox/124.0",
];

/// HTTP client for the YTS listing API and its artifact URLs.
pub struct YtsHttpClient {
    client: Client,
    base_url: String,
}

impl YtsHttpClient {
    /// Create a client against the production endpoint.
    ///
    /// # Errors
    /// Returns [`ClientError::NetworkError`] if the TLS backend fails to
    /// initialize.
    pub fn new() -> ClientResult<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against a custom endpoint (used by tests).
    pub fn with_base_url(base_url: impl Into<String>) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClientError::NetworkError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Pick a random User-Agent from the pool.
    fn random_user_agent() -> &'static str {
        USER_AGENTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(USER_AGENTS[0])
    }
}

#[async_trait]
impl ListingClient for YtsHttpClient {
    async fn fetch_page(&self, query: &ListingQuery, page: u32) -> ClientResult<PageResponse> {
        let params = [
            ("genre", query.genre.clone()),
            ("minimum_rating", query.minimum_rating.to_string()),
            ("sort_by", query.sort_by.as_api_token().to_string()),
            ("order_by", query.sort_by.order_token().to_string()),
            ("query_term", query.query_term.clone()),
            ("limit", PAGE_SIZE.to_string()),
            ("page", page.to_string()),
        ];

        debug!(page = page, "Fetching listing page");

        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .header(reqwest::header::USER_AGENT, Self::random_user_agent())
            .send()
            .await
            .map_err(|e| ClientError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::NetworkError(format!(
                "listing request returned {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ClientError::NetworkError(format!("Failed to read body: {e}")))?;

        parse_list_response(&body)
    }
}

#[async_trait]
impl ArtifactClient for YtsHttpClient {
    async fn fetch_bytes(&self, url: &str) -> ClientResult<Vec<u8>> {
        debug!(url = url, "Fetching artifact");

        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, Self::random_user_agent())
            .send()
            .await
            .map_err(|e| ClientError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::NetworkError(format!(
                "artifact request returned {status}"
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::NetworkError(format!("Failed to read body: {e}")))?;

        Ok(bytes.to_vec())
    }
}
