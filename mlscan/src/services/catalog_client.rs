//! Discogs database search client
//!
//! Best-effort release ID lookup for albums. One client is shared by every
//! concurrent album worker; its rate limiter is the only pacing point for
//! outbound requests. Nothing here is fatal to a scan: every failure path
//! ends in "no enrichment".

use mlscan_common::config::CatalogConfig;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Catalog client errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Lookup cancelled")]
    Cancelled,
}

/// Rate limiter enforcing a minimum spacing between requests
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    /// Wait if necessary to comply with rate limit
    ///
    /// The lock is held across the sleep so concurrent callers queue up
    /// behind one another instead of all waking at the same instant.
    async fn wait(&self, cancel: &CancellationToken) -> Result<(), CatalogError> {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                debug!("Rate limiting: waiting {:?}", wait_time);
                sleep_or_cancel(wait_time, cancel).await?;
            }
        }

        *last = Some(Instant::now());
        Ok(())
    }
}

/// Exponential backoff for quota-exceeded responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub initial_delay: Duration,
    pub max_attempts: u32,
}

impl BackoffPolicy {
    /// Delay after the given failed attempt (1-based): d, 2d, 4d, ...
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.initial_delay.saturating_mul(1u32 << exponent)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    year: Option<Value>,
}

impl SearchResult {
    fn release_id(&self) -> Option<i64> {
        self.id.as_ref().and_then(Value::as_i64)
    }

    /// Discogs sends `year` as a string; accept numbers too
    fn year(&self) -> Option<i32> {
        match self.year.as_ref()? {
            Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Discogs catalog client
pub struct CatalogClient {
    http_client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    rate_limiter: RateLimiter,
    backoff: BackoffPolicy,
}

impl CatalogClient {
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let min_interval = Duration::from_millis(config.min_interval_ms);

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone().filter(|t| !t.trim().is_empty()),
            rate_limiter: RateLimiter::new(min_interval),
            backoff: BackoffPolicy {
                initial_delay: min_interval,
                max_attempts: config.max_attempts.max(1),
            },
        })
    }

    pub fn backoff(&self) -> BackoffPolicy {
        self.backoff
    }

    /// Best-effort release ID for an album
    ///
    /// Prefers a result whose year matches `year`, else the first result.
    /// Quota-exceeded answers are retried with exponential backoff; any
    /// other failure gives up immediately. Never fails the caller.
    pub async fn find_release_id(
        &self,
        artist: &str,
        album: &str,
        year: Option<i32>,
        cancel: &CancellationToken,
    ) -> Option<i64> {
        for attempt in 1..=self.backoff.max_attempts {
            match self.search(artist, album, year, cancel).await {
                Ok(Some(release_id)) => {
                    info!(artist, album, release_id, "Catalog release found");
                    // Pace the next caller; a cancel here still keeps the ID
                    let _ = sleep_or_cancel(self.rate_limiter.min_interval, cancel).await;
                    return Some(release_id);
                }
                Ok(None) => {
                    debug!(artist, album, "No catalog results");
                    return None;
                }
                Err(CatalogError::RateLimited) => {
                    let delay = self.backoff.delay_after(attempt);
                    warn!(
                        artist,
                        album,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Catalog quota exceeded, backing off"
                    );
                    if sleep_or_cancel(delay, cancel).await.is_err() {
                        return None;
                    }
                }
                Err(CatalogError::Cancelled) => return None,
                Err(e) => {
                    warn!(artist, album, error = %e, "Catalog lookup failed");
                    return None;
                }
            }
        }

        warn!(
            artist,
            album,
            attempts = self.backoff.max_attempts,
            "Catalog lookup gave up after repeated quota errors"
        );
        None
    }

    /// One rate-limited search request
    async fn search(
        &self,
        artist: &str,
        album: &str,
        year: Option<i32>,
        cancel: &CancellationToken,
    ) -> Result<Option<i64>, CatalogError> {
        self.rate_limiter.wait(cancel).await?;

        let url = format!("{}/database/search", self.base_url);
        let mut query = vec![
            ("artist", artist.to_string()),
            ("release_title", album.to_string()),
            ("type", "release".to_string()),
        ];
        if let Some(year) = year {
            query.push(("year", year.to_string()));
        }

        let mut request = self.http_client.get(&url).query(&query);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Discogs token={}", token));
        }

        debug!(url = %url, artist, album, year = ?year, "Querying catalog");

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(CatalogError::Cancelled),
            response = request.send() => {
                response.map_err(|e| CatalogError::Network(e.to_string()))?
            }
        };

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(CatalogError::RateLimited);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api(status.as_u16(), error_text));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        Ok(pick_release_id(&body.results, year))
    }
}

/// Year match first (when a year is known), then the first result
fn pick_release_id(results: &[SearchResult], year: Option<i32>) -> Option<i64> {
    if let Some(year) = year {
        let matched = results
            .iter()
            .filter(|r| r.year() == Some(year))
            .find_map(SearchResult::release_id);
        if matched.is_some() {
            return matched;
        }
    }

    results.first().and_then(SearchResult::release_id)
}

async fn sleep_or_cancel(duration: Duration, cancel: &CancellationToken) -> Result<(), CatalogError> {
    tokio::select! {
        _ = cancel.cancelled() => Err(CatalogError::Cancelled),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}
