use crate::cache::ArticleCache;
use crate::config::SourceConfig;
use crate::error::{Result, WikigraphError};
use crate::source::{extract_summary_links, ArticleRecord, ArticleSource, Lookup, NotFoundReason};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Response envelope of `action=parse` (formatversion=2)
#[derive(Debug, Deserialize)]
struct ParseResponse {
    parse: Option<ParsedPage>,
    error: Option<ApiError>,
}

/// The parsed lead section
#[derive(Debug, Deserialize)]
struct ParsedPage {
    title: String,
    #[serde(default)]
    text: String,
    /// Page properties; an object, or `[]` when the page has none
    #[serde(default)]
    properties: serde_json::Value,
}

/// API-level error (the HTTP status is still 200)
#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    #[serde(default)]
    info: String,
}

/// Failure of a single API request, kept structured for retry decisions
#[derive(Error, Debug)]
enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("MediaWiki API error {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("MediaWiki API error {code}: {info}")]
    Api { code: String, info: String },

    #[error("Failed to parse response: {0}")]
    Decode(String),
}

impl FetchError {
    /// Rate limiting (HTTP 429 or `ratelimited`/`maxlag`), server errors and
    /// transport failures are worth retrying
    fn is_retryable(&self) -> bool {
        match self {
            FetchError::Network(_) => true,
            FetchError::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            FetchError::Api { code, .. } => matches!(code.as_str(), "ratelimited" | "maxlag"),
            FetchError::Decode(_) => false,
        }
    }
}

impl From<FetchError> for WikigraphError {
    fn from(err: FetchError) -> Self {
        WikigraphError::Source(err.to_string())
    }
}

/// MediaWiki client resolving titles to their lead-section links
///
/// Follows redirects server side, treats disambiguation pages as not found,
/// and retries rate-limited or failed requests with exponential backoff.
pub struct WikipediaSource {
    client: Client,
    api_url: String,
    max_retries: usize,
    cache: Option<Arc<ArticleCache>>,
}

impl WikipediaSource {
    /// Create a new client from the `[source]` configuration
    ///
    /// The lookup cache is enabled when `cache_capacity > 0`.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| WikigraphError::Source(format!("Failed to build HTTP client: {}", e)))?;

        let cache = if config.cache_capacity > 0 {
            Some(Arc::new(ArticleCache::new(config.cache_capacity)))
        } else {
            None
        };

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            max_retries: config.max_retries,
            cache,
        })
    }

    /// Number of lookups currently cached
    pub fn cached_lookups(&self) -> usize {
        self.cache.as_ref().map_or(0, |c| c.len())
    }

    /// Make a single API request for `title`
    async fn fetch_once(&self, title: &str) -> std::result::Result<Lookup, FetchError> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("action", "parse"),
                ("page", title),
                ("prop", "text|properties"),
                ("section", "0"),
                ("redirects", "1"),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            return Err(FetchError::Status { status, body });
        }

        let parsed: ParseResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        interpret(parsed)
    }

    /// Fetch with retry on rate limiting, server errors and network errors
    async fn fetch_with_retry(&self, title: &str) -> Result<Lookup> {
        let start = std::time::Instant::now();
        let mut attempt = 0;
        let mut delay = Duration::from_millis(500);

        loop {
            match self.fetch_once(title).await {
                Ok(lookup) => {
                    log::debug!(
                        "Resolved '{}' in {:?} (attempt {})",
                        title,
                        start.elapsed(),
                        attempt + 1
                    );
                    return Ok(lookup);
                }
                Err(e) if attempt < self.max_retries && e.is_retryable() => {
                    log::warn!(
                        "Retry {}/{} for '{}' after error: {}",
                        attempt + 1,
                        self.max_retries,
                        title,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[async_trait]
impl ArticleSource for WikipediaSource {
    async fn resolve(&self, title: &str) -> Lookup {
        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get(title) {
                log::debug!("Cache hit for article: {}", title);
                return cached;
            }
        }

        let lookup = match self.fetch_with_retry(title).await {
            Ok(lookup) => lookup,
            Err(e) => {
                log::warn!("Giving up on '{}': {}", title, e);
                Lookup::NotFound(NotFoundReason::Unavailable)
            }
        };

        if let Some(cache) = &self.cache {
            cache.put(title.to_string(), lookup.clone());
        }

        lookup
    }
}

/// Turn a decoded API response into a lookup
fn interpret(response: ParseResponse) -> std::result::Result<Lookup, FetchError> {
    if let Some(error) = response.error {
        return match error.code.as_str() {
            "missingtitle" | "invalidtitle" | "nosuchsection" => {
                Ok(Lookup::NotFound(NotFoundReason::Missing))
            }
            _ => Err(FetchError::Api {
                code: error.code,
                info: error.info,
            }),
        };
    }

    let page = response
        .parse
        .ok_or_else(|| FetchError::Decode("response has neither parse nor error".to_string()))?;

    if page.properties.get("disambiguation").is_some() {
        return Ok(Lookup::NotFound(NotFoundReason::Disambiguation));
    }

    Ok(Lookup::Found(ArticleRecord {
        outbound_links: extract_summary_links(&page.text),
        canonical_title: page.title,
    }))
}
