//! `OmdbClient` - OMDb API client implementation.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::instrument;
use url::Url;

use super::api::LocalOmdbApi;
use super::rate_limiter::OmdbRateLimiter;
use super::types::{
    OmdbMovieDetails, OmdbSearchResponse, OmdbSearchResult, OmdbStatus, PlotLength, SearchParams,
};

/// Default base URL for the OMDb API.
const DEFAULT_BASE_URL: &str = "https://www.omdbapi.com/";

/// Maximum number of retries for HTTP 429 responses.
const MAX_RETRIES: u32 = 3;

/// Backoff duration between retries.
const RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// OMDb API client.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct OmdbClient {
    /// HTTP client.
    http_client: Client,
    /// Endpoint URL. OMDb serves everything from a single path.
    base_url: Url,
    /// API key sent as the `apikey` query parameter.
    api_key: String,
    /// Plot length requested on title lookups.
    plot: PlotLength,
    /// Rate limiter.
    rate_limiter: Arc<Mutex<OmdbRateLimiter>>,
}

/// Builder for `OmdbClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct OmdbClientBuilder {
    base_url: Option<Url>,
    api_key: Option<String>,
    user_agent: Option<String>,
    min_interval: Option<Duration>,
    plot: PlotLength,
}

impl OmdbClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            user_agent: None,
            min_interval: None,
            plot: PlotLength::Short,
        }
    }

    /// Overrides the base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the API key (required).
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the minimum request interval (default: 100ms).
    #[must_use]
    pub const fn min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = Some(interval);
        self
    }

    /// Sets the plot length for title lookups (default: short).
    #[must_use]
    pub const fn plot(mut self, plot: PlotLength) -> Self {
        self.plot = plot;
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `api_key` is not set or blank.
    /// - `user_agent` is not set.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<OmdbClient> {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .context("api_key is required")?;
        let user_agent = self.user_agent.context("user_agent is required")?;

        let base_url = if let Some(url) = self.base_url {
            url
        } else {
            let result = Url::parse(DEFAULT_BASE_URL);
            result.context("invalid default base URL")?
        };

        let rate_limiter = self
            .min_interval
            .map_or_else(OmdbRateLimiter::default_interval, OmdbRateLimiter::new);

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .gzip(true)
            .build()
            .context("failed to build HTTP client")?;

        Ok(OmdbClient {
            http_client,
            base_url,
            api_key,
            plot: self.plot,
            rate_limiter: Arc::new(Mutex::new(rate_limiter)),
        })
    }
}

impl OmdbClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> OmdbClientBuilder {
        OmdbClientBuilder::new()
    }

    /// Sends a GET request with the API key, query params, and rate limiting.
    /// Retries up to `MAX_RETRIES` times on HTTP 429.
    ///
    /// Returns `None` when OMDb answers `"Response": "False"` with HTTP 200.
    #[instrument(skip_all)]
    async fn get_json<T: DeserializeOwned>(&self, query: &[(&str, String)]) -> Result<Option<T>> {
        self.rate_limiter.lock().await.wait().await;

        let mut retries = 0u32;
        loop {
            let request = self
                .http_client
                .get(self.base_url.clone())
                .query(&[("apikey", self.api_key.as_str())])
                .query(query)
                .build()
                .context("failed to build OMDb request")?;

            // The URL carries the API key, so only the params are logged.
            tracing::debug!(params = ?query, "OMDb API request");

            let result = self.http_client.execute(request).await;
            let response = result.context("OMDb request failed")?;

            let status = response.status();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                retries = retries.saturating_add(1);
                if retries > MAX_RETRIES {
                    bail!("OMDb API rate limit exceeded after {MAX_RETRIES} retries");
                }
                tracing::warn!(
                    retry = retries,
                    max_retries = MAX_RETRIES,
                    "OMDb API rate limited (429). Retrying..."
                );
                tokio::time::sleep(RETRY_BACKOFF.saturating_mul(retries)).await;
                self.rate_limiter.lock().await.wait().await;
                continue;
            }

            if !status.is_success() {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| String::from("<failed to read body>"));
                if let Ok(OmdbStatus {
                    error: Some(message),
                    ..
                }) = serde_json::from_str::<OmdbStatus>(&body)
                {
                    bail!("OMDb API error (HTTP {status}): {message}");
                }
                bail!("OMDb API error (HTTP {status}): {body}");
            }

            let body = response
                .text()
                .await
                .context("failed to read OMDb response body")?;

            let envelope: OmdbStatus =
                serde_json::from_str(&body).context("failed to decode OMDb response envelope")?;
            if !envelope.has_data() {
                tracing::debug!(
                    error = envelope.error.as_deref().unwrap_or("-"),
                    "OMDb returned no data"
                );
                return Ok(None);
            }

            let raw_result: std::result::Result<T, _> = serde_json::from_str(&body);
            let parsed = raw_result.context("failed to decode OMDb JSON response")?;
            return Ok(Some(parsed));
        }
    }
}

impl LocalOmdbApi for OmdbClient {
    #[instrument(skip_all, fields(query = %params.query))]
    async fn search(&self, params: &SearchParams) -> Result<Vec<OmdbSearchResult>> {
        let response: Option<OmdbSearchResponse> = self.get_json(&params.to_query()).await?;

        Ok(response.map_or_else(Vec::new, |r| {
            tracing::debug!(
                total = r.total_results.as_deref().unwrap_or("-"),
                page_len = r.search.len(),
                "OMDb search page received"
            );
            r.search
        }))
    }

    #[instrument(skip_all, fields(imdb_id = %imdb_id))]
    async fn title_by_id(&self, imdb_id: &str) -> Result<Option<OmdbMovieDetails>> {
        let query = [
            ("i", String::from(imdb_id)),
            ("plot", String::from(self.plot.as_str())),
        ];
        self.get_json(&query).await
    }
}
